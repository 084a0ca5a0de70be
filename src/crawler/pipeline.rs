//! Page pipeline: fetch, parse, then expand the frontier and record assets
//!
//! A pipeline run never fails from the caller's point of view. Fetch and parse
//! problems are logged and end the run early, and the outcome only says how
//! far the page got. The caller releases the page's own pending ticket once
//! `run` returns. By then every link the page produced has either been
//! enqueued with its own ticket or dropped.

use crate::crawler::document::DocumentTree;
use crate::crawler::extract::{extract_asset_hosts, extract_links};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::DocumentParser;
use crate::crawler::queue::{EnqueueOutcome, Task, TaskQueue};
use crate::state::{CrawlStats, PendingCounter, ResourceRegistry};
use crate::FetchError;
use std::sync::Arc;

/// How far a page got through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Fetch failed or returned a non-success status
    FetchFailed,

    /// Body could not be parsed
    ParseFailed,

    /// Page was analyzed
    Analyzed(Expansion),
}

/// What an analyzed page contributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Same-site links handed to the queue
    pub links_enqueued: usize,

    /// Same-site links abandoned because the queue stayed full
    pub links_dropped: usize,

    /// External hosts this page registered for the first time
    pub new_hosts: usize,
}

/// Shared by all workers; one instance per crawl run
pub struct PagePipeline {
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn DocumentParser>,
    queue: Arc<TaskQueue>,
    pending: Arc<PendingCounter>,
    registry: Arc<ResourceRegistry>,
    stats: Arc<CrawlStats>,
}

impl PagePipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        parser: Arc<dyn DocumentParser>,
        queue: Arc<TaskQueue>,
        pending: Arc<PendingCounter>,
        registry: Arc<ResourceRegistry>,
        stats: Arc<CrawlStats>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            queue,
            pending,
            registry,
            stats,
        }
    }

    /// Runs the pipeline for a task that already passed the depth and visited gates
    pub async fn run(&self, task: &Task) -> PageOutcome {
        let page = match self.fetcher.fetch(&task.url).await {
            Ok(page) if page.is_success() => page,
            Ok(page) => {
                let error = FetchError::Status {
                    url: task.url.to_string(),
                    status: page.status,
                };
                tracing::warn!("Failed to fetch {}: {}", task.url, error);
                self.stats.record_fetch_failure();
                return PageOutcome::FetchFailed;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", task.url, e);
                self.stats.record_fetch_failure();
                return PageOutcome::FetchFailed;
            }
        };

        let tree = match self.parser.parse(&page.body) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", task.url, e);
                self.stats.record_parse_failure();
                return PageOutcome::ParseFailed;
            }
        };
        self.stats.record_page_fetched();

        // Both halves read the same tree; the page is only done once both are
        let ((links_enqueued, links_dropped), new_hosts) = tokio::join!(
            self.expand_frontier(task, &tree),
            async { self.register_assets(task, &tree) }
        );

        tracing::debug!(
            "Analyzed {}: {} links enqueued, {} dropped, {} new external hosts",
            task,
            links_enqueued,
            links_dropped,
            new_hosts
        );

        PageOutcome::Analyzed(Expansion {
            links_enqueued,
            links_dropped,
            new_hosts,
        })
    }

    /// Counts and enqueues a child task for every same-site link
    ///
    /// Each child's ticket is taken before the enqueue is attempted, while the
    /// parent's ticket is still held, so the pending count cannot reach zero
    /// in between.
    async fn expand_frontier(&self, task: &Task, tree: &DocumentTree) -> (usize, usize) {
        let mut enqueued = 0;
        let mut dropped = 0;

        for url in extract_links(tree, &task.url) {
            let ticket = self.pending.ticket();
            match self.queue.enqueue(task.child(url), ticket).await {
                EnqueueOutcome::Enqueued => {
                    enqueued += 1;
                    self.stats.record_link_enqueued();
                }
                EnqueueOutcome::Dropped {
                    task: child,
                    reason,
                } => {
                    dropped += 1;
                    self.stats.record_link_dropped();
                    tracing::warn!(
                        "Dropping link {} at depth {} found on {}: {}",
                        child.url,
                        child.depth,
                        task.url,
                        reason
                    );
                }
            }
        }

        (enqueued, dropped)
    }

    /// Records hosts of external assets; never creates tasks
    fn register_assets(&self, task: &Task, tree: &DocumentTree) -> usize {
        extract_asset_hosts(tree, &task.url)
            .into_iter()
            .filter(|host| {
                let added = self.registry.add(host);
                if added {
                    tracing::debug!("New external host {} referenced by {}", host, task.url);
                }
                added
            })
            .count()
    }
}
