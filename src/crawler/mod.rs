//! Crawler module for page fetching and frontier expansion
//!
//! This module contains the core crawling logic, including:
//! - The bounded task queue and the tasks it carries
//! - Fetch and parse capabilities behind traits
//! - Link and asset extraction over the parsed tree
//! - The per-page pipeline and the worker pool that drives it

mod coordinator;
mod document;
mod extract;
mod fetcher;
mod parser;
mod pipeline;
mod queue;

pub use coordinator::Crawler;
pub use document::{DocumentTree, Node, NodeId, NodeKind, PreOrder};
pub use extract::{extract_asset_hosts, extract_links};
pub use fetcher::{build_http_client, FetchedPage, Fetcher, HttpFetcher};
pub use parser::{DocumentParser, HtmlParser};
pub use pipeline::{Expansion, PageOutcome, PagePipeline};
pub use queue::{DropReason, EnqueueOutcome, QueuedTask, Task, TaskQueue};
