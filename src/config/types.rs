use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Site-Atlas
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// URL the crawl starts from (may also be given on the command line)
    #[serde(rename = "seed-url")]
    pub seed_url: Option<String>,

    /// Maximum depth to crawl from the seed URL (the seed is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of long-lived workers consuming the task queue
    pub workers: usize,

    /// Capacity of the bounded task queue
    #[serde(rename = "queue-capacity")]
    pub queue_capacity: usize,

    /// How long an enqueue may wait on a full queue before the link is dropped (milliseconds)
    #[serde(rename = "enqueue-timeout-ms")]
    pub enqueue_timeout_ms: u64,
}

impl CrawlerConfig {
    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: None,
            max_depth: 2,
            workers: 10,
            queue_capacity: 100,
            enqueue_timeout_ms: 1000,
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Total time allowed for one request, body included (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("site-atlas/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the markdown report written after the crawl, if any
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}
