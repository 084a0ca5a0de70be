//! URL handling module for Site-Atlas
//!
//! This module provides reference resolution, canonicalization of dedup keys,
//! the same-domain policy and host extraction for external assets.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{asset_host, host_key, same_site};
pub use normalize::{canonicalize, parse_seed, resolve_reference};
