//! HTML parsing into a [`DocumentTree`]
//!
//! Parsing is delegated to `scraper` (html5ever), which recovers from broken
//! markup the way browsers do. The resulting tree is copied into the crate's
//! own arena so the extractors never depend on the parser's types.

use crate::crawler::document::DocumentTree;
use crate::ParseError;
use scraper::Html;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse capability used by the page pipeline
pub trait DocumentParser: Send + Sync {
    /// Builds a tree from a fetched body
    fn parse(&self, body: &[u8]) -> Result<DocumentTree, ParseError>;
}

/// [`DocumentParser`] for HTML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl DocumentParser for HtmlParser {
    fn parse(&self, body: &[u8]) -> Result<DocumentTree, ParseError> {
        let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);
        let text = std::str::from_utf8(body)?;
        let html = Html::parse_document(text);

        if !html.errors.is_empty() {
            tracing::trace!("html5ever recovered from {} markup errors", html.errors.len());
        }

        Ok(convert(&html))
    }
}

/// Copies elements (with their attributes) from the scraper tree
///
/// Text, comments and doctypes carry nothing the extractors look at and are
/// left out.
fn convert(html: &Html) -> DocumentTree {
    let mut tree = DocumentTree::new();
    let mut stack = vec![(html.tree.root(), tree.root())];

    while let Some((source, parent)) = stack.pop() {
        for child in source.children() {
            if let Some(element) = child.value().as_element() {
                let id = tree.append_element(parent, element.name(), element.attrs());
                stack.push((child, id));
            }
        }
    }

    tree
}
