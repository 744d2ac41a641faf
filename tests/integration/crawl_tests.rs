//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full crawl
//! cycle end-to-end: fetch, extract, classify, enqueue and persist.

use crate::common::{html_page, test_config, CountingTier, PRODUCT_PATTERN};
use product_scout::crawler::{
    build_http_client, CrawlOptions, HttpTier, RetryPolicy, TierChain,
};
use product_scout::output::{read_snapshots, MemoryWriter, ResultSink};
use product_scout::{crawl, Coordinator, ProductClassifier, ScoutError};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, hrefs: &[String], hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(hrefs)))
        .expect(hits)
        .mount(server)
        .await;
}

fn links(base: &str, paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| format!("{base}{p}")).collect()
}

#[tokio::test]
async fn test_product_collected_and_internal_link_followed() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", &links(&base, &["/products/shoe-123", "/about"]), 1).await;
    mount_page(&server, "/about", &[], 1).await;
    // Product pages are collected, never fetched
    mount_page(&server, "/products/shoe-123", &[], 0).await;

    let mut config = test_config(dir.path());
    config.crawler.max_depth = 1;
    let output = config.output_path(None);

    let report = crawl(&config, &[base.clone()], &output, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.products, links(&base, &["/products/shoe-123"]));
    assert_eq!(report.seeds.len(), 1);
    assert_eq!(report.seeds[0].pages_visited, 2);

    let contents = std::fs::read_to_string(&output).unwrap();
    let snapshots = read_snapshots(&contents).unwrap();
    // One incremental write, one final flush
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots.last().unwrap(), &report.products);
}

#[tokio::test]
async fn test_relative_links_resolved() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <a href="/products/tee-42#reviews">Tee</a>
                <a href="mailto:shop@example.com">Mail</a>
                <a href="javascript:void(0)">Menu</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let config = test_config(dir.path());
    let report = crawl(
        &config,
        &[base.clone()],
        config.output_path(None),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.products, links(&base, &["/products/tee-42"]));
}

#[tokio::test]
async fn test_failed_http_tier_escalates_once() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let http = HttpTier::new(
        build_http_client(&config.fetch).unwrap(),
        RetryPolicy::new(3, Duration::from_millis(10)),
    );
    let (session, session_calls) =
        CountingTier::new("session", links(&base, &["/products/bag-777"]));
    let (browser, browser_calls) = CountingTier::new("browser", vec![]);

    let coordinator = Coordinator::new(
        TierChain::new()
            .with_tier(http)
            .with_tier(session)
            .with_tier(browser),
        ProductClassifier::from_entries(&config.patterns).unwrap(),
    );
    let writer = MemoryWriter::new();
    let sink = Arc::new(ResultSink::new(Arc::new(writer.clone())));

    let report = coordinator
        .crawl(
            &[base.clone()],
            &CrawlOptions::from_config(&config.crawler),
            sink,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.products, links(&base, &["/products/bag-777"]));
    assert_eq!(session_calls.load(Ordering::SeqCst), 1);
    assert_eq!(browser_calls.load(Ordering::SeqCst), 0);
    assert_eq!(report.seeds[0].links_by_tier.get("session"), Some(&1));
}

#[tokio::test]
async fn test_all_tiers_empty_is_not_an_error() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = test_config(dir.path());
    let report = crawl(
        &config,
        &[base],
        config.output_path(None),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(report.products.is_empty());
    assert_eq!(report.seeds[0].pages_failed, 1);
}

#[tokio::test]
async fn test_two_seeds_union() {
    let shop_a = MockServer::start().await;
    let shop_b = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &shop_a,
        "/",
        &links(&shop_a.uri(), &["/products/a-1", "/products/shared-9"]),
        1,
    )
    .await;
    mount_page(&shop_b, "/", &links(&shop_b.uri(), &["/products/b-2"]), 1).await;

    let config = test_config(dir.path());
    let report = crawl(
        &config,
        &[shop_a.uri(), shop_b.uri()],
        config.output_path(None),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let mut expected = links(&shop_a.uri(), &["/products/a-1", "/products/shared-9"]);
    expected.extend(links(&shop_b.uri(), &["/products/b-2"]));
    expected.sort();
    assert_eq!(report.products, expected);
    assert_eq!(report.seeds.len(), 2);
}

#[tokio::test]
async fn test_each_page_fetched_once_despite_cycles() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", &links(&base, &["/a", "/b", "/a/"]), 1).await;
    mount_page(&server, "/a", &links(&base, &["/", "/b", "/a?sort=asc"]), 1).await;
    mount_page(&server, "/b", &links(&base, &["/a", "/"]), 1).await;
    mount_page(&server, "/a/", &[], 0).await;

    let mut config = test_config(dir.path());
    config.crawler.max_depth = 5;

    let report = crawl(
        &config,
        &[base],
        config.output_path(None),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.seeds[0].pages_visited, 3);
}

#[tokio::test]
async fn test_depth_limit_respected() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", &links(&base, &["/level-1"]), 1).await;
    mount_page(&server, "/level-1", &links(&base, &["/level-2", "/products/deep-1"]), 1).await;
    mount_page(&server, "/level-2", &[], 0).await;

    let mut config = test_config(dir.path());
    config.crawler.max_depth = 1;

    let report = crawl(
        &config,
        &[base.clone()],
        config.output_path(None),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    // Products on the last level are still collected
    assert_eq!(report.products, links(&base, &["/products/deep-1"]));
}

#[tokio::test]
async fn test_external_links_ignored() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", &links(&other.uri(), &["/elsewhere"]), 1).await;
    mount_page(&other, "/elsewhere", &[], 0).await;

    let config = test_config(dir.path());
    crawl(
        &config,
        &[base],
        config.output_path(None),
        CancellationToken::new(),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_cancellation_persists_partial_results() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/", &links(&base, &["/products/first-1", "/slow"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page(&links(&base, &["/products/second-2", "/after"])))
                .set_delay(Duration::from_millis(1500)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/after", &[], 0).await;

    let mut config = test_config(dir.path());
    config.crawler.concurrency = 1;
    let output = config.output_path(Some("partial.json"));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let result = crawl(&config, &[base.clone()], &output, cancel).await;

    assert!(matches!(result, Err(ScoutError::Cancelled { discovered: 2 })));
    let contents = std::fs::read_to_string(&output).unwrap();
    let snapshots = read_snapshots(&contents).unwrap();
    assert_eq!(
        snapshots.last().unwrap(),
        &links(&base, &["/products/first-1", "/products/second-2"])
    );
}

#[tokio::test]
async fn test_seed_without_scheme() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let classifier = ProductClassifier::new()
        .with_pattern("shop.test", PRODUCT_PATTERN, false)
        .unwrap();
    let (tier, calls) = CountingTier::new("fixed", vec!["https://shop.test/products/hat-5".into()]);

    let coordinator = Coordinator::new(TierChain::new().with_tier(tier), classifier);
    let sink = Arc::new(ResultSink::json_file(config.output_path(None)));

    let report = coordinator
        .crawl(
            &["shop.test".to_string()],
            &CrawlOptions::from_config(&config.crawler),
            sink,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.seeds[0].seed, "https://shop.test/");
    assert_eq!(report.products, vec!["https://shop.test/products/hat-5"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
