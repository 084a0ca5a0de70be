//! Integration tests for the crawler
//!
//! These tests drive complete crawl runs through the public API: once over
//! real HTTP against a wiremock server, and with an in-memory fetcher where
//! timing has to be controlled.

use async_trait::async_trait;
use site_atlas::config::{Config, CrawlerConfig, FetchConfig};
use site_atlas::crawler::{FetchedPage, Fetcher, HtmlParser, HttpFetcher};
use site_atlas::{Crawler, FetchError, ResourceRegistry, VisitedSet};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// In-memory site with per-path delays and a fetch log
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, (String, Duration)>,
    log: Mutex<Vec<String>>,
}

impl FakeSite {
    fn page(mut self, url: &str, body: &str) -> Self {
        self.pages
            .insert(url.to_string(), (body.to_string(), Duration::ZERO));
        self
    }

    fn slow_page(mut self, url: &str, body: &str, delay: Duration) -> Self {
        self.pages.insert(url.to_string(), (body.to_string(), delay));
        self
    }

    fn fetches_of(&self, url: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for FakeSite {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.log.lock().unwrap().push(url.to_string());
        match self.pages.get(url.as_str()) {
            Some((body, delay)) => {
                tokio::time::sleep(*delay).await;
                Ok(FetchedPage {
                    status: 200,
                    final_url: url.clone(),
                    body: body.clone().into_bytes(),
                })
            }
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

fn crawler_config(max_depth: u32, workers: usize) -> CrawlerConfig {
    CrawlerConfig {
        max_depth,
        workers,
        ..CrawlerConfig::default()
    }
}

fn in_memory_crawler(config: CrawlerConfig, site: &Arc<FakeSite>) -> Crawler {
    let fetcher: Arc<dyn Fetcher> = Arc::clone(site) as Arc<dyn Fetcher>;
    Crawler::new(config, fetcher, Arc::new(HtmlParser))
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[tokio::test]
async fn test_small_site_end_to_end() {
    let site = Arc::new(
        FakeSite::default()
            .page(
                "https://site.test/",
                r#"<html><body>
                    <a href="/about">About</a>
                    <script src="https://ext.test/a.js"></script>
                </body></html>"#,
            )
            .page("https://site.test/about", "<p>About us</p>"),
    );
    let visited = Arc::new(VisitedSet::new());
    let registry = Arc::new(ResourceRegistry::new());

    let report = in_memory_crawler(crawler_config(1, 1), &site)
        .with_state(Arc::clone(&visited), Arc::clone(&registry))
        .run(url("https://site.test/"))
        .await
        .unwrap();

    let visited: Vec<_> = visited.snapshot().into_iter().collect();
    assert_eq!(visited, vec!["https://site.test/", "https://site.test/about"]);
    let hosts: Vec<_> = registry.snapshot().into_iter().collect();
    assert_eq!(hosts, vec!["ext.test"]);
    assert_eq!(report.pages_crawled(), 2);
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<html><head>
                        <link rel="stylesheet" href="https://fonts.example.com/css">
                        <script src="/local.js"></script>
                    </head><body>
                        <a href="{}/page1">Page 1</a>
                        <a href="/page2">Page 2</a>
                        <a href="https://elsewhere.example.org/">Away</a>
                    </body></html>"#,
                    base_url
                ))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<img src="https://img.example.net/logo.png"><a href="/">Home</a>"#)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = Config {
        crawler: crawler_config(2, 3),
        fetch: FetchConfig {
            request_timeout_secs: 5,
            ..FetchConfig::default()
        },
        ..Config::default()
    };

    let report = Crawler::from_config(&config)
        .unwrap()
        .run(url(&format!("{}/", base_url)))
        .await
        .unwrap();

    assert_eq!(report.pages_crawled(), 3);
    assert!(report.visited.contains(&format!("{}/page2", base_url)));
    let hosts: Vec<_> = report.external_hosts.iter().map(String::as_str).collect();
    assert_eq!(hosts, vec!["fonts.example.com", "img.example.net"]);
    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.fetch_failures, 1);
}

#[tokio::test]
async fn test_http_fetcher_reports_final_url_after_redirect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
    let page = fetcher
        .fetch(&url(&format!("{}/old", mock_server.uri())))
        .await
        .unwrap();

    assert!(page.is_success());
    assert_eq!(page.final_url.path(), "/new");
    assert_eq!(page.body, b"moved");
}

#[tokio::test]
async fn test_duplicate_links_fetched_once() {
    let mut root = String::new();
    for _ in 0..25 {
        root.push_str(r#"<a href="/shared">s</a><a href="/shared#frag">f</a>"#);
    }
    let site = Arc::new(
        FakeSite::default()
            .page("https://site.test/", &root)
            .page("https://site.test/shared", r#"<a href="/">home</a>"#),
    );

    let report = in_memory_crawler(crawler_config(3, 8), &site)
        .run(url("https://site.test/"))
        .await
        .unwrap();

    assert_eq!(report.pages_crawled(), 2);
    assert_eq!(site.fetches_of("https://site.test/shared"), 1);
    assert_eq!(site.fetches_of("https://site.test/"), 1);
}

#[tokio::test]
async fn test_depth_limit_respected() {
    let site = Arc::new(
        FakeSite::default()
            .page("https://site.test/", r#"<a href="/l1">1</a>"#)
            .page("https://site.test/l1", r#"<a href="/l2">2</a>"#)
            .page("https://site.test/l2", "end"),
    );

    let report = in_memory_crawler(crawler_config(1, 4), &site)
        .run(url("https://site.test/"))
        .await
        .unwrap();

    assert_eq!(report.pages_crawled(), 2);
    assert_eq!(site.fetches_of("https://site.test/l2"), 0);
}

#[tokio::test]
async fn test_slow_parent_keeps_crawl_alive() {
    // The seed's only child finishes quickly while the seed is still
    // enqueueing its second child; the crawl must not end in between.
    let site = Arc::new(
        FakeSite::default()
            .page(
                "https://site.test/",
                r#"<a href="/fast">f</a><a href="/slow">s</a>"#,
            )
            .page("https://site.test/fast", "")
            .slow_page(
                "https://site.test/slow",
                r#"<a href="/late">l</a>"#,
                Duration::from_millis(50),
            )
            .page("https://site.test/late", ""),
    );

    let report = in_memory_crawler(crawler_config(3, 4), &site)
        .run(url("https://site.test/"))
        .await
        .unwrap();

    assert_eq!(report.pages_crawled(), 4);
    assert!(report.visited.contains("https://site.test/late"));
    assert_eq!(report.stats.pending_drains, 1);
}

#[tokio::test]
async fn test_full_queue_drops_links_and_terminates() {
    let mut root = String::new();
    for i in 0..50 {
        root.push_str(&format!(r#"<a href="/p{}">p</a>"#, i));
    }
    let site = Arc::new(FakeSite::default().slow_page(
        "https://site.test/",
        &root,
        Duration::from_millis(1),
    ));
    let config = CrawlerConfig {
        max_depth: 1,
        workers: 1,
        queue_capacity: 4,
        enqueue_timeout_ms: 2,
        ..CrawlerConfig::default()
    };

    let report = tokio::time::timeout(
        Duration::from_secs(10),
        in_memory_crawler(config, &site).run(url("https://site.test/")),
    )
    .await
    .expect("crawl with a saturated queue must terminate")
    .unwrap();

    assert_eq!(report.stats.links_enqueued, 4);
    assert_eq!(report.stats.links_dropped, 46);
    assert_eq!(report.pages_crawled(), 5);
}

#[tokio::test]
async fn test_fetch_failures_do_not_abort_crawl() {
    let site = Arc::new(
        FakeSite::default()
            .page(
                "https://site.test/",
                r#"<a href="/broken">b</a><a href="/ok">ok</a><img src="https://cdn.test/i.png">"#,
            )
            .page(
                "https://site.test/ok",
                r#"<script src="https://js.test/x.js"></script>"#,
            ),
    );

    let report = in_memory_crawler(crawler_config(2, 2), &site)
        .run(url("https://site.test/"))
        .await
        .unwrap();

    assert_eq!(report.pages_crawled(), 3);
    assert_eq!(report.stats.fetch_failures, 1);
    let hosts: Vec<_> = report.external_hosts.iter().map(String::as_str).collect();
    assert_eq!(hosts, vec!["cdn.test", "js.test"]);
}

#[tokio::test]
async fn test_separate_runs_do_not_share_state() {
    let site = Arc::new(
        FakeSite::default()
            .page("https://site.test/", r#"<script src="https://ext.test/a.js"></script>"#),
    );

    let first = in_memory_crawler(crawler_config(1, 2), &site)
        .run(url("https://site.test/"))
        .await
        .unwrap();
    let second = in_memory_crawler(crawler_config(1, 2), &site)
        .run(url("https://site.test/"))
        .await
        .unwrap();

    assert_eq!(first.pages_crawled(), 1);
    assert_eq!(second.pages_crawled(), 1);
    assert_eq!(site.fetches_of("https://site.test/"), 2);
}
