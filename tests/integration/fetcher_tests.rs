//! Integration tests for the HTTP fetcher
//!
//! These tests use wiremock to create mock HTTP servers and test
//! fetching, link extraction and a small crawl end-to-end.

mod common;

use common::create_test_config;
use linkgraph::config::FetcherConfig;
use linkgraph::crawler::{Coordinator, FetchError, HttpFetcher, PageFetcher};
use linkgraph::storage::{open_store, LinkStore, RunStatus};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_config(server: &MockServer) -> FetcherConfig {
    FetcherConfig {
        base_url: format!("{}/page/html/", server.uri()),
        timeout_secs: 5,
        user_agent: "linkgraph-test".to_string(),
    }
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_fetch_extracts_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page/html/Philosophy"))
        .respond_with(html_page(
            r#"<a href="./Plato" title="Plato">Plato</a>
               <a href="./Logic">Logic</a>
               <a href="https://example.com/" title="Example">ext</a>"#,
        ))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&fetcher_config(&server), "./").unwrap();
    let page = fetcher.fetch("./Philosophy").await.unwrap();

    let links: Vec<_> = page
        .links
        .iter()
        .map(|l| (l.href.as_str(), l.title.as_str()))
        .collect();
    assert_eq!(
        links,
        vec![
            ("./Plato", "Plato"),
            ("./Logic", "Logic"),
            ("https://example.com/", "Example"),
        ]
    );
    assert!(page.content.contains("Plato"));
}

#[tokio::test]
async fn test_fetch_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&fetcher_config(&server), "./").unwrap();
    let result = fetcher.fetch("./Nowhere").await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_fetch_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page/html/Blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string("   "))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&fetcher_config(&server), "./").unwrap();
    let result = fetcher.fetch("./Blank").await;

    assert!(matches!(result, Err(FetchError::EmptyContent(_))));
}

#[tokio::test]
async fn test_fetch_rejects_external_identifier() {
    let server = MockServer::start().await;

    let fetcher = HttpFetcher::new(&fetcher_config(&server), "./").unwrap();
    let result = fetcher.fetch("https://example.com/").await;

    assert!(matches!(result, Err(FetchError::NotInternal(_))));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page/html/Home"))
        .respond_with(html_page(
            r##"<a href="./About" title="About">About</a>
                <a href="./Home#cite_note-1">[1]</a>
                <a href="https://elsewhere.org/" title="Elsewhere">out</a>"##,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page/html/About"))
        .respond_with(html_page(r#"<a href="./Home" title="Home">home</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("graph.sqlite");

    let mut config = create_test_config("./Home", db_path.to_str().unwrap());
    config.fetcher = fetcher_config(&server);

    let fetcher = HttpFetcher::new(&config.fetcher, &config.filter.internal_prefix).unwrap();
    let report = Coordinator::new(config, open_store(&db_path).unwrap(), fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.stats.pages_fetched, 2);

    let store = report.store;
    let counts = store.page_counts().unwrap();
    assert_eq!(counts.total, 3);
    assert_eq!(counts.external, 1);
    assert_eq!(store.stats().unwrap().link_count, 3);

    let about = store.get_page("./About").unwrap().unwrap();
    assert_eq!(about.display_name, "About");
    assert!(about.raw_content.unwrap().contains("./Home"));
}
