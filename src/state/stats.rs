use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters updated by workers during a crawl
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    parse_failures: AtomicU64,
    skipped_depth: AtomicU64,
    skipped_visited: AtomicU64,
    links_enqueued: AtomicU64,
    links_dropped: AtomicU64,
}

/// Point-in-time copy of [`CrawlStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Pages fetched with a success status and parsed
    pub pages_fetched: u64,
    /// Pages whose fetch failed or returned a non-success status
    pub fetch_failures: u64,
    /// Pages whose body could not be parsed
    pub parse_failures: u64,
    /// Tasks discarded because they were deeper than the limit
    pub skipped_depth: u64,
    /// Tasks discarded because their URL had already been visited
    pub skipped_visited: u64,
    /// Discovered links handed to the task queue
    pub links_enqueued: u64,
    /// Discovered links abandoned because the queue stayed full or closed
    pub links_dropped: u64,
    /// Times the pending count fell to zero; a finished run reports exactly one
    pub pending_drains: u64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_depth(&self) {
        self.skipped_depth.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_visited(&self) {
        self.skipped_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_link_enqueued(&self) {
        self.links_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_link_dropped(&self) {
        self.links_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            skipped_depth: self.skipped_depth.load(Ordering::Relaxed),
            skipped_visited: self.skipped_visited.load(Ordering::Relaxed),
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
            links_dropped: self.links_dropped.load(Ordering::Relaxed),
            pending_drains: 0,
        }
    }
}

impl StatsSnapshot {
    /// Pages whose pipeline ended early because of a fetch or parse failure
    pub fn failed_pages(&self) -> u64 {
        self.fetch_failures + self.parse_failures
    }
}
