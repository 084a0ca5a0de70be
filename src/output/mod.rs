//! Output module for reporting crawl results
//!
//! This module handles:
//! - Collecting the final [`CrawlReport`] from the shared state
//! - Printing the console summary
//! - Writing a markdown summary file

mod console;
mod markdown;
mod report;

pub use console::{print_report, write_report};
pub use markdown::{format_markdown_report, write_markdown_report};
pub use report::CrawlReport;

use thiserror::Error;

/// Errors that can occur while producing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
