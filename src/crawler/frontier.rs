//! Per-seed crawl frontier
//!
//! A priority queue of URLs waiting to be fetched plus the set of URLs already
//! dequeued. Product-looking URLs are served before everything else; within the
//! same class entries come out in insertion order.

use crate::url::visit_key;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use url::Url;

/// A URL waiting in the frontier
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: Url,

    /// Number of link hops from the seed (the seed is depth 0)
    pub depth: u32,

    /// Whether the URL string looked like a product page when it was enqueued
    pub likely_product: bool,

    /// Insertion counter, used as the tie-breaker
    seq: u64,
}

// BinaryHeap is a max-heap: "greater" entries are popped first
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.likely_product
            .cmp(&other.likely_product)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for FrontierEntry {}

/// Work queue and visited set for one seed
///
/// A URL is marked visited when it is dequeued, not when it is enqueued, so the
/// same URL may sit in the heap several times but is handed out at most once.
#[derive(Debug)]
pub struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    visited: HashSet<String>,
    next_seq: u64,
    max_depth: u32,
}

impl Frontier {
    pub fn new(max_depth: u32) -> Self {
        Self {
            heap: BinaryHeap::new(),
            visited: HashSet::new(),
            next_seq: 0,
            max_depth,
        }
    }

    /// Queues a URL
    ///
    /// Returns false when the entry is past the depth budget or its visit key
    /// has already been dequeued.
    pub fn push(&mut self, url: Url, depth: u32, likely_product: bool) -> bool {
        if depth > self.max_depth || self.visited.contains(&visit_key(&url)) {
            return false;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(FrontierEntry {
            url,
            depth,
            likely_product,
            seq,
        });
        true
    }

    /// Pops the highest-priority entry that has not been visited and marks it visited
    pub fn pop_unvisited(&mut self) -> Option<FrontierEntry> {
        while let Some(entry) = self.heap.pop() {
            if self.visited.insert(visit_key(&entry.url)) {
                return Some(entry);
            }
        }
        None
    }

    /// Number of distinct URLs dequeued so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Whether a URL has already been dequeued
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(&visit_key(url))
    }

    /// Entries still queued, duplicates included
    pub fn pending(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
