//! URL handling module for Product-Scout
//!
//! This module provides seed scheme normalization, the visited-set key used for
//! deduplication, and the domain boundary check applied to discovered links.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_same_domain};
pub use normalize::{ensure_scheme, visit_key};
