//! Crawler coordinator - worker pool and termination
//!
//! This module ties the crawl together:
//! - Counting and enqueueing the seed task
//! - Running a fixed pool of workers that gate tasks by depth and visited state
//! - Closing the queue once the pending count drains to zero
//! - Collecting the final report from the shared sets

use crate::config::{validate_crawler_config, Config, CrawlerConfig};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::parser::{DocumentParser, HtmlParser};
use crate::crawler::pipeline::PagePipeline;
use crate::crawler::queue::{EnqueueOutcome, Task, TaskQueue};
use crate::output::CrawlReport;
use crate::state::{CrawlStats, PendingCounter, ResourceRegistry, VisitedSet};
use crate::url::canonicalize;
use crate::{AtlasError, Result};
use chrono::Utc;
use std::sync::Arc;
use url::Url;

/// Main crawler structure
///
/// The visited set and resource registry are injected (or created fresh by
/// [`Crawler::new`]), so the caller decides whether runs share state.
pub struct Crawler {
    config: CrawlerConfig,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn DocumentParser>,
    visited: Arc<VisitedSet>,
    registry: Arc<ResourceRegistry>,
}

/// Everything a worker needs, shared by the whole pool
struct WorkerContext {
    queue: Arc<TaskQueue>,
    visited: Arc<VisitedSet>,
    pipeline: PagePipeline,
    stats: Arc<CrawlStats>,
    max_depth: u32,
}

impl Crawler {
    /// Creates a crawler with the given capabilities and empty state
    pub fn new(
        config: CrawlerConfig,
        fetcher: Arc<dyn Fetcher>,
        parser: Arc<dyn DocumentParser>,
    ) -> Self {
        Self {
            config,
            fetcher,
            parser,
            visited: Arc::new(VisitedSet::new()),
            registry: Arc::new(ResourceRegistry::new()),
        }
    }

    /// Creates a crawler that fetches over HTTP and parses HTML
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Ok(Self::new(
            config.crawler.clone(),
            Arc::new(fetcher),
            Arc::new(HtmlParser),
        ))
    }

    /// Replaces the visited set and resource registry
    pub fn with_state(mut self, visited: Arc<VisitedSet>, registry: Arc<ResourceRegistry>) -> Self {
        self.visited = visited;
        self.registry = registry;
        self
    }

    pub fn visited(&self) -> &Arc<VisitedSet> {
        &self.visited
    }

    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Crawls from `seed` until no work is pending and returns the report
    ///
    /// Fetch, parse and queue problems on individual pages are logged and
    /// leave the report short; they never fail the run. An error is returned
    /// for unusable settings, or when the whole worker pool died before the
    /// crawl drained.
    pub async fn run(&self, seed: Url) -> Result<CrawlReport> {
        validate_crawler_config(&self.config)?;

        let started_at = Utc::now();
        let seed = canonicalize(seed);

        let pending = PendingCounter::new();
        let stats = Arc::new(CrawlStats::new());
        let queue = Arc::new(TaskQueue::new(
            self.config.queue_capacity,
            self.config.enqueue_timeout(),
        ));

        tracing::info!(
            "Starting crawl of {} (max depth {}, {} workers, queue capacity {})",
            seed,
            self.config.max_depth,
            self.config.workers,
            self.config.queue_capacity
        );

        // The seed is counted before anything can observe the queue or the counter
        match queue.enqueue(Task::seed(seed.clone()), pending.ticket()).await {
            EnqueueOutcome::Enqueued => {}
            EnqueueOutcome::Dropped { task, reason } => {
                tracing::warn!("Could not enqueue seed {}: {}", task, reason);
            }
        }

        let terminator = tokio::spawn(close_when_drained(
            Arc::clone(&pending),
            Arc::clone(&queue),
        ));

        let context = Arc::new(WorkerContext {
            queue: Arc::clone(&queue),
            visited: Arc::clone(&self.visited),
            pipeline: PagePipeline::new(
                Arc::clone(&self.fetcher),
                Arc::clone(&self.parser),
                Arc::clone(&queue),
                Arc::clone(&pending),
                Arc::clone(&self.registry),
                Arc::clone(&stats),
            ),
            stats: Arc::clone(&stats),
            max_depth: self.config.max_depth,
        });

        let workers: Vec<_> = (0..self.config.workers)
            .map(|id| tokio::spawn(run_worker(id, Arc::clone(&context))))
            .collect();

        let mut failed_worker = None;
        for (id, worker) in workers.into_iter().enumerate() {
            if let Err(e) = worker.await {
                tracing::error!("Worker {} terminated abnormally: {}", id, e);
                failed_worker.get_or_insert((id, e.to_string()));
            }
        }

        // Workers only return on their own once the queue is closed
        if !queue.is_closed() {
            terminator.abort();
            let (id, message) = failed_worker.unwrap_or((0, "pool exited early".to_string()));
            return Err(AtlasError::Worker { id, message });
        }
        if let Err(e) = terminator.await {
            tracing::error!("Terminator task failed: {}", e);
        }

        let mut snapshot = stats.snapshot();
        snapshot.pending_drains = pending.drained_count() as u64;

        let report = CrawlReport::collect(
            seed,
            &self.visited,
            &self.registry,
            snapshot,
            started_at,
            Utc::now(),
        );

        tracing::info!(
            "Crawl completed: {} pages visited, {} external hosts, {} links dropped",
            report.visited.len(),
            report.external_hosts.len(),
            report.stats.links_dropped
        );

        Ok(report)
    }
}

/// Closes the queue once nothing is pending
///
/// Must be spawned after the seed's ticket is taken, otherwise it would see
/// the initial zero.
async fn close_when_drained(pending: Arc<PendingCounter>, queue: Arc<TaskQueue>) {
    pending.wait_for_zero().await;
    if queue.close() {
        tracing::debug!("No pending work left, task queue closed");
    }
}

/// One long-lived worker: receive, gate, run the pipeline, release
async fn run_worker(id: usize, context: Arc<WorkerContext>) {
    while let Some(queued) = context.queue.recv().await {
        let (task, ticket) = queued.into_parts();

        if task.depth > context.max_depth {
            tracing::trace!("[worker {}] skipping {}: too deep", id, task);
            context.stats.record_skipped_depth();
            drop(ticket);
            continue;
        }

        if !context.visited.add(task.url.as_str()) {
            tracing::trace!("[worker {}] skipping {}: already visited", id, task);
            context.stats.record_skipped_visited();
            drop(ticket);
            continue;
        }

        tracing::info!("[worker {}] analyzing {}", id, task);
        context.pipeline.run(&task).await;

        // Every child of this page is counted or dropped by now
        drop(ticket);
    }

    tracing::debug!("[worker {}] task queue closed, exiting", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::FetchedPage;
    use crate::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves canned pages, records every fetch and optionally sleeps first
    #[derive(Default)]
    struct RecordingFetcher {
        pages: HashMap<String, String>,
        delay: Duration,
        fetched: Mutex<Vec<String>>,
    }

    impl RecordingFetcher {
        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        fn delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn fetch_count(&self, url: &str) -> usize {
            self.fetched
                .lock()
                .unwrap()
                .iter()
                .filter(|fetched| fetched.as_str() == url)
                .count()
        }

        fn total_fetches(&self) -> usize {
            self.fetched.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Fetcher for RecordingFetcher {
        async fn fetch(&self, url: &Url) -> std::result::Result<FetchedPage, FetchError> {
            self.fetched.lock().unwrap().push(url.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let (status, body) = match self.pages.get(url.as_str()) {
                Some(body) => (200, body.clone()),
                None => (404, String::new()),
            };
            Ok(FetchedPage {
                status,
                final_url: url.clone(),
                body: body.into_bytes(),
            })
        }
    }

    fn config(max_depth: u32, workers: usize) -> CrawlerConfig {
        CrawlerConfig {
            max_depth,
            workers,
            ..CrawlerConfig::default()
        }
    }

    fn crawler(config: CrawlerConfig, fetcher: &Arc<RecordingFetcher>) -> Crawler {
        let fetcher: Arc<dyn Fetcher> = Arc::clone(fetcher) as Arc<dyn Fetcher>;
        Crawler::new(config, fetcher, Arc::new(HtmlParser))
    }

    fn seed(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[tokio::test]
    async fn test_single_page_site() {
        let fetcher = Arc::new(RecordingFetcher::default().page("https://site.test/", "<p>hi</p>"));
        let report = crawler(config(2, 3), &fetcher)
            .run(seed("https://site.test/"))
            .await
            .unwrap();

        assert_eq!(report.visited.len(), 1);
        assert!(report.external_hosts.is_empty());
        assert_eq!(fetcher.total_fetches(), 1);
    }

    #[tokio::test]
    async fn test_cycles_fetch_each_page_once() {
        let fetcher = Arc::new(
            RecordingFetcher::default()
                .page(
                    "https://site.test/",
                    r#"<a href="/">self</a><a href="/a">a</a><a href="/b">b</a>"#,
                )
                .page("https://site.test/a", r#"<a href="/">home</a><a href="/b">b</a>"#)
                .page("https://site.test/b", r#"<a href="/a">a</a><a href="/b#x">b</a>"#),
        );

        let report = crawler(config(5, 4), &fetcher)
            .run(seed("https://site.test/"))
            .await
            .unwrap();

        assert_eq!(report.visited.len(), 3);
        for url in ["https://site.test/", "https://site.test/a", "https://site.test/b"] {
            assert_eq!(fetcher.fetch_count(url), 1, "{} fetched more than once", url);
        }
        assert!(report.stats.skipped_visited > 0);
    }

    #[tokio::test]
    async fn test_depth_limit_prevents_fetch() {
        let fetcher = Arc::new(
            RecordingFetcher::default()
                .page("https://site.test/", r#"<a href="/d1">1</a>"#)
                .page("https://site.test/d1", r#"<a href="/d2">2</a>"#)
                .page("https://site.test/d2", r#"<a href="/d3">3</a>"#)
                .page("https://site.test/d3", "end"),
        );

        let report = crawler(config(2, 2), &fetcher)
            .run(seed("https://site.test/"))
            .await
            .unwrap();

        assert_eq!(report.visited.len(), 3);
        assert!(!report.visited.contains("https://site.test/d3"));
        assert_eq!(fetcher.fetch_count("https://site.test/d3"), 0);
        assert_eq!(report.stats.skipped_depth, 1);
    }

    #[tokio::test]
    async fn test_depth_zero_fetches_only_seed() {
        let fetcher = Arc::new(
            RecordingFetcher::default().page("https://site.test/", r#"<a href="/a">a</a>"#),
        );

        let report = crawler(config(0, 2), &fetcher)
            .run(seed("https://site.test/"))
            .await
            .unwrap();

        assert_eq!(fetcher.total_fetches(), 1);
        assert_eq!(report.visited.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_pages_still_terminate() {
        let fetcher = Arc::new(RecordingFetcher::default().page(
            "https://site.test/",
            r#"<a href="/missing">m</a><a href="/gone">g</a>"#,
        ));

        let report = crawler(config(2, 2), &fetcher)
            .run(seed("https://site.test/"))
            .await
            .unwrap();

        assert_eq!(report.visited.len(), 3);
        assert_eq!(report.stats.fetch_failures, 2);
        assert_eq!(report.stats.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_failed_seed_terminates() {
        let fetcher = Arc::new(RecordingFetcher::default());

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            crawler(config(2, 4), &fetcher).run(seed("https://site.test/")),
        )
        .await
        .expect("crawl of an unreachable seed should terminate")
        .unwrap();

        assert_eq!(report.visited.len(), 1);
        assert_eq!(report.stats.fetch_failures, 1);
    }

    #[tokio::test]
    async fn test_delays_do_not_cause_early_termination() {
        // Every fetch sleeps so parents are still expanding while siblings finish
        let mut fetcher = RecordingFetcher::default().delay(Duration::from_millis(15));
        let mut root = String::new();
        for i in 0..8 {
            root.push_str(&format!(r#"<a href="/p{}">p</a>"#, i));
            fetcher = fetcher.page(
                &format!("https://site.test/p{}", i),
                &format!(r#"<a href="/p{}/leaf">leaf</a>"#, i),
            );
        }
        let fetcher = Arc::new(fetcher.page("https://site.test/", &root));

        let report = crawler(config(2, 3), &fetcher)
            .run(seed("https://site.test/"))
            .await
            .unwrap();

        // root + 8 children + 8 leaves (leaves 404 but are still visited)
        assert_eq!(report.visited.len(), 17);
        assert_eq!(fetcher.total_fetches(), 17);
        assert_eq!(report.stats.pending_drains, 1);
    }

    #[tokio::test]
    async fn test_zero_queue_capacity_is_a_config_error() {
        let fetcher = Arc::new(RecordingFetcher::default().page("https://site.test/", "ok"));
        let config = CrawlerConfig {
            queue_capacity: 0,
            ..CrawlerConfig::default()
        };

        let result = crawler(config, &fetcher).run(seed("https://site.test/")).await;

        assert!(matches!(result, Err(AtlasError::Config(_))));
        assert_eq!(fetcher.total_fetches(), 0);
    }

    #[tokio::test]
    async fn test_zero_workers_is_a_config_error() {
        let fetcher = Arc::new(RecordingFetcher::default().page("https://site.test/", "ok"));

        let result = crawler(config(2, 0), &fetcher)
            .run(seed("https://site.test/"))
            .await;

        assert!(matches!(result, Err(AtlasError::Config(_))));
        assert_eq!(fetcher.total_fetches(), 0);
    }

    #[tokio::test]
    async fn test_queue_full_drops_links_but_completes() {
        let mut root = String::new();
        for i in 0..20 {
            root.push_str(&format!(r#"<a href="/p{}">p</a>"#, i));
        }
        let fetcher = Arc::new(
            RecordingFetcher::default()
                .delay(Duration::from_millis(5))
                .page("https://site.test/", &root),
        );
        let config = CrawlerConfig {
            max_depth: 1,
            workers: 1,
            queue_capacity: 2,
            enqueue_timeout_ms: 5,
            ..CrawlerConfig::default()
        };

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            crawler(config, &fetcher).run(seed("https://site.test/")),
        )
        .await
        .expect("crawl should finish despite dropped links")
        .unwrap();

        assert_eq!(report.stats.links_enqueued, 2);
        assert_eq!(report.stats.links_dropped, 18);
        assert_eq!(report.visited.len(), 3);
    }

    #[tokio::test]
    async fn test_external_assets_collected_across_pages() {
        let fetcher = Arc::new(
            RecordingFetcher::default()
                .page(
                    "https://site.test/",
                    r#"<script src="https://ext.test/a.js"></script><a href="/b">b</a>"#,
                )
                .page(
                    "https://site.test/b",
                    r#"<img src="https://img.test/x.png"><script src="https://ext.test/c.js"></script>"#,
                ),
        );

        let report = crawler(config(2, 2), &fetcher)
            .run(seed("https://site.test/"))
            .await
            .unwrap();

        let hosts: Vec<_> = report.external_hosts.iter().map(String::as_str).collect();
        assert_eq!(hosts, vec!["ext.test", "img.test"]);
    }

    #[tokio::test]
    async fn test_injected_state_is_used() {
        let fetcher = Arc::new(
            RecordingFetcher::default()
                .page("https://site.test/", r#"<a href="/known">k</a><a href="/new">n</a>"#),
        );
        let visited = Arc::new(VisitedSet::new());
        visited.add("https://site.test/known");
        let registry = Arc::new(ResourceRegistry::new());

        let crawler = crawler(config(2, 2), &fetcher)
            .with_state(Arc::clone(&visited), Arc::clone(&registry));
        crawler.run(seed("https://site.test/")).await.unwrap();

        assert_eq!(fetcher.fetch_count("https://site.test/known"), 0);
        assert!(visited.contains("https://site.test/new"));
        assert!(Arc::ptr_eq(crawler.visited(), &visited));
    }

    #[tokio::test]
    async fn test_seed_fragment_is_canonicalized() {
        let fetcher = Arc::new(RecordingFetcher::default().page("https://site.test/", "ok"));

        let report = crawler(config(1, 1), &fetcher)
            .run(seed("https://site.test/#top"))
            .await
            .unwrap();

        assert!(report.visited.contains("https://site.test/"));
        assert_eq!(report.seed.as_str(), "https://site.test/");
    }
}
