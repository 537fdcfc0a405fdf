//! URL handling module for WebGrep
//!
//! This module provides URL normalization, host extraction for domain
//! scoping, and the link denylist.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, is_same_host};
pub use filter::LinkFilter;
pub use normalize::normalize_url;
