//! Configuration module for Site-Atlas
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file (or no file at all) yields a usable
//! configuration once a seed URL is supplied.
//!
//! # Example
//!
//! ```no_run
//! use site_atlas::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("atlas.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetchConfig, OutputConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, parse_config, read_config, read_config_with_hash,
};
pub use validation::{validate, validate_crawler_config};
