//! Site-Atlas: a bounded-concurrency site dependency mapper
//!
//! This crate crawls the same-domain pages reachable from a seed URL up to a
//! depth limit, using a fixed pool of workers fed by a bounded task queue, and
//! records which external hosts the site pulls scripts, images and stylesheets
//! from.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Atlas operations
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Worker {id} terminated abnormally: {message}")]
    Worker { id: usize, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors (unusable references found in documents or config)
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Failures of the fetch capability, all non-fatal to the crawl
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Failures of the parse capability
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// Result type alias for Site-Atlas operations
pub type Result<T> = std::result::Result<T, AtlasError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, Task};
pub use output::CrawlReport;
pub use state::{PendingCounter, ResourceRegistry, VisitedSet};
pub use url::{asset_host, canonicalize, same_site};
