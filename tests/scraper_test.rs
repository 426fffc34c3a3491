//! Integration tests for the HTTP scraper
//!
//! Runs [`lowdown::scrape::HttpScraper`] against a local wiremock server.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lowdown::config::ScraperConfig;
use lowdown::error::Error;
use lowdown::scrape::{ContentScraper, HttpScraper};

fn test_scraper() -> HttpScraper {
    HttpScraper::new(&ScraperConfig {
        request_timeout_secs: 5,
        user_agent: "lowdown-test/0.1".to_string(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetch_extracts_article_text() {
    let server = MockServer::start().await;

    let html = r#"<html><body>
        <nav>Home | Aviation | Defense | Space | Subscribe now</nav>
        <article>
            <h1>Pentagon Accelerates Drone Program</h1>
            <p>The department awarded three contracts worth a combined two billion dollars.</p>
            <script>window.analytics = { pageView: "drone-program" };</script>
        </article>
        <footer>All rights reserved, unsubscribe at any time.</footer>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let content = test_scraper()
        .fetch(&format!("{}/story", server.uri()))
        .await
        .unwrap();

    assert!(content.contains("Pentagon Accelerates Drone Program"));
    assert!(content.contains("awarded three contracts"));
    assert!(!content.contains("Subscribe now"));
    assert!(!content.contains("analytics"));
    assert!(!content.contains("unsubscribe"));
}

#[tokio::test]
async fn test_fetch_not_found_is_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_scraper()
        .fetch(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();

    match err {
        Error::Upstream(message) => assert!(message.contains("404")),
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_server_error_is_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = test_scraper().fetch(&server.uri()).await.unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));
}

#[tokio::test]
async fn test_fetch_empty_page_is_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><p>Hi</p></body></html>"),
        )
        .mount(&server)
        .await;

    let err = test_scraper()
        .fetch(&format!("{}/empty", server.uri()))
        .await
        .unwrap_err();

    match err {
        Error::Upstream(message) => assert!(message.contains("No content")),
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_connection_refused_is_upstream_error() {
    // Reserved port with nothing listening.
    let err = test_scraper()
        .fetch("http://127.0.0.1:9/unreachable")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));
}
