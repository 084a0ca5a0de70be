//! State module for tracking crawl progress
//!
//! All mutable state shared between workers lives here. Instances are owned by
//! the caller and injected into the crawler, so separate runs never share data.
//!
//! # Components
//!
//! - `VisitedSet`: canonical URLs whose pipeline has started
//! - `ResourceRegistry`: external hosts referenced by scripts, images and stylesheets
//! - `PendingCounter`: outstanding tasks, used to detect true completion
//! - `CrawlStats`: counters for the final report

mod concurrent_set;
mod pending;
mod stats;

// Re-export main types
pub use concurrent_set::{ConcurrentSet, ResourceRegistry, VisitedSet};
pub use pending::{PendingCounter, PendingTicket};
pub use stats::{CrawlStats, StatsSnapshot};
