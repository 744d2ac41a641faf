//! Product page classifier
//!
//! Decides whether a URL is an individual product page by looking up a matcher
//! for the URL's exact hostname. Hosts without an entry never match: the table is
//! an explicit allow-list, not a heuristic.

mod patterns;

use crate::config::PatternEntry;
use crate::ConfigError;
use regex::Regex;
use std::collections::HashMap;
use url::Url;

/// Which part of the URL a host pattern is searched in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTarget {
    /// The path only (`/p/123`)
    Path,
    /// The path followed by `?` and the query, when present (`/p/123?productId=9`)
    PathAndQuery,
}

/// A compiled pattern for one host
#[derive(Debug, Clone)]
pub struct HostPattern {
    regex: Regex,
    target: MatchTarget,
}

impl HostPattern {
    /// Compiles a host pattern
    pub fn new(pattern: &str, target: MatchTarget) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            target,
        })
    }

    /// Returns true if the relevant part of `url` contains a match
    pub fn matches(&self, url: &Url) -> bool {
        match (self.target, url.query()) {
            (MatchTarget::PathAndQuery, Some(query)) => {
                self.regex.is_match(&format!("{}?{}", url.path(), query))
            }
            _ => self.regex.is_match(url.path()),
        }
    }

    /// The source pattern
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn target(&self) -> MatchTarget {
        self.target
    }
}

/// Per-host product URL classifier
///
/// Cheap enough to run on every discovered link and on every frontier entry.
///
/// # Examples
///
/// ```
/// use product_scout::ProductClassifier;
///
/// let classifier = ProductClassifier::builtin();
/// assert!(classifier.is_product("https://www2.hm.com/en_in/productpage.1234567.html"));
/// assert!(!classifier.is_product("https://www2.hm.com/en_in/men.html"));
/// assert!(!classifier.is_product("https://unknown-shop.com/products/shoe-123"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProductClassifier {
    patterns: HashMap<String, HostPattern>,
}

impl ProductClassifier {
    /// Creates a classifier with an empty table (matches nothing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a classifier loaded with the built-in e-commerce host table
    pub fn builtin() -> Self {
        let mut classifier = Self::new();
        for (host, pattern, match_query) in patterns::BUILTIN_PATTERNS {
            // Built-in patterns are fixed literals covered by tests
            if let Ok(compiled) = HostPattern::new(pattern, target_for(*match_query)) {
                classifier.patterns.insert((*host).to_string(), compiled);
            }
        }
        classifier
    }

    /// Builds the built-in table extended (and overridden) by configured entries
    pub fn from_entries(entries: &[PatternEntry]) -> Result<Self, ConfigError> {
        let mut classifier = Self::builtin();
        for entry in entries {
            classifier = classifier
                .with_pattern(&entry.host, &entry.pattern, entry.match_query)
                .map_err(|e| {
                    ConfigError::InvalidPattern(format!("{}: {}", entry.host, e))
                })?;
        }
        Ok(classifier)
    }

    /// Adds or replaces the pattern for an exact hostname
    pub fn with_pattern(
        mut self,
        host: &str,
        pattern: &str,
        match_query: bool,
    ) -> Result<Self, regex::Error> {
        let compiled = HostPattern::new(pattern, target_for(match_query))?;
        self.patterns.insert(host.to_lowercase(), compiled);
        Ok(self)
    }

    /// Returns true if `url` is a product page for a known host
    ///
    /// Unparseable URLs and URLs on hosts absent from the table return false.
    pub fn is_product(&self, url: &str) -> bool {
        Url::parse(url)
            .map(|parsed| self.is_product_url(&parsed))
            .unwrap_or(false)
    }

    /// Same as [`is_product`](Self::is_product) for an already parsed URL
    pub fn is_product_url(&self, url: &Url) -> bool {
        url.host_str()
            .and_then(|host| self.patterns.get(host))
            .is_some_and(|pattern| pattern.matches(url))
    }

    /// Frontier priority hint: true for classified product pages and for URLs
    /// whose shape is typical of product pages on any host
    ///
    /// Only orders the frontier. Never used to decide what goes into the result set.
    pub fn looks_like_product(&self, url: &Url) -> bool {
        if self.is_product_url(url) {
            return true;
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let has_hint_segment = segments
            .iter()
            .any(|seg| PRODUCT_HINT_SEGMENTS.contains(&seg.to_ascii_lowercase().as_str()));

        has_hint_segment || segments.last().is_some_and(|last| ends_with_numeric_id(last))
    }

    /// Looks up the pattern registered for an exact hostname
    pub fn pattern_for(&self, host: &str) -> Option<&HostPattern> {
        self.patterns.get(host)
    }

    /// Hostnames with a registered pattern, sorted
    pub fn hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self.patterns.keys().map(String::as_str).collect();
        hosts.sort_unstable();
        hosts
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Path segments that commonly introduce a product detail page
const PRODUCT_HINT_SEGMENTS: &[&str] = &["product", "products", "p", "item", "pd", "details", "dp"];

/// `shoe-123456`, `123456`, `productpage.1234567.html`
fn ends_with_numeric_id(segment: &str) -> bool {
    let stem = segment
        .split('.')
        .rev()
        .find(|part| *part != "html")
        .unwrap_or(segment);
    let digits = stem.chars().rev().take_while(char::is_ascii_digit).count();
    digits >= 4
}

fn target_for(match_query: bool) -> MatchTarget {
    if match_query {
        MatchTarget::PathAndQuery
    } else {
        MatchTarget::Path
    }
}
