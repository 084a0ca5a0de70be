use crate::state::{ResourceRegistry, StatsSnapshot, VisitedSet};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use url::Url;

/// Final result of a crawl run
///
/// Built from snapshots taken after termination, so the sets are complete
/// for the run and sorted for stable output.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Canonical seed URL
    pub seed: Url,

    /// Every URL a worker claimed, whether or not its fetch succeeded
    pub visited: BTreeSet<String>,

    /// External hosts the site loads scripts, images or stylesheets from
    pub external_hosts: BTreeSet<String>,

    /// Counters at the end of the run
    pub stats: StatsSnapshot,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Snapshots the shared sets into a report
    pub fn collect(
        seed: Url,
        visited: &VisitedSet,
        registry: &ResourceRegistry,
        stats: StatsSnapshot,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            seed,
            visited: visited.snapshot(),
            external_hosts: registry.snapshot(),
            stats,
            started_at,
            finished_at,
        }
    }

    /// Number of unique pages crawled
    pub fn pages_crawled(&self) -> usize {
        self.visited.len()
    }

    /// Wall-clock time of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
