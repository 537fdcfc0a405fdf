//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: the lifecycle of one frontier item (pending, fetching, and
//!   its terminal classification)
//! - `DomainState`: per-host request bookkeeping used for politeness

mod domain_state;
mod page_state;

// Re-export main types
pub use domain_state::DomainState;
pub use page_state::PageState;
