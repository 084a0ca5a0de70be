//! Link and asset extraction over a parsed page
//!
//! Both extractors walk the same read-only tree in pre-order and resolve every
//! reference against the page's own URL.
//!
//! **Links** (`<a href>`) expand the frontier and must stay on the page's
//! scheme and host. **Assets** (`<script src>`, `<img src>` and
//! `<link rel="stylesheet" href>`) are only inspected for the host they live
//! on. Assets never create tasks.

use crate::crawler::document::{DocumentTree, Node};
use crate::url::{asset_host, canonicalize, resolve_reference, same_site};
use url::Url;

/// Returns the canonical same-site URLs linked from the page, in document order
///
/// Duplicates are kept. The visited set deduplicates them when they are
/// dequeued. References that cannot be resolved are skipped.
pub fn extract_links(tree: &DocumentTree, page: &Url) -> Vec<Url> {
    tree.elements()
        .filter(|node| node.element_name() == Some("a"))
        .flat_map(|node| node.attr_values("href"))
        .filter_map(|href| resolve(page, href))
        .filter(|url| same_site(url, page))
        .map(canonicalize)
        .collect()
}

/// Returns the external hosts of scripts, images and stylesheets, in document order
pub fn extract_asset_hosts(tree: &DocumentTree, page: &Url) -> Vec<String> {
    tree.elements()
        .flat_map(asset_references)
        .filter_map(|reference| resolve(page, reference))
        .filter_map(|asset| asset_host(&asset, page))
        .collect()
}

/// Source references of an asset-bearing element
fn asset_references(node: &Node) -> Vec<&str> {
    match node.element_name() {
        Some("script") | Some("img") => node.attr_values("src").collect(),
        Some("link") if is_stylesheet(node) => node.attr_values("href").collect(),
        _ => Vec::new(),
    }
}

/// `rel` is a space-separated token list, e.g. `rel="preload stylesheet"`
fn is_stylesheet(node: &Node) -> bool {
    node.attr_values("rel").any(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}

fn resolve(page: &Url, reference: &str) -> Option<Url> {
    match resolve_reference(page, reference) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Skipping reference on {}: {}", page, e);
            None
        }
    }
}
