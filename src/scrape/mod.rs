//! Web scraper collaborator
//!
//! Fetches a URL and extracts the main text content, dropping common page
//! clutter (scripts, navigation, forms) and short fragments. The capability
//! is behind the [`ContentScraper`] trait so the summarize workflow can be
//! exercised with a test double instead of a live HTTP client.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};

use crate::config::ScraperConfig;
use crate::error::{Error, Result};

/// Tags whose subtrees never contain article text
const NOISE_TAGS: &[&str] = &[
    "script", "style", "header", "footer", "nav", "aside", "form", "button",
];

/// Text lines at or below this length are treated as clutter
const MIN_LINE_LEN: usize = 25;

/// Capability for fetching raw article content from a URL
#[async_trait]
pub trait ContentScraper: Send + Sync {
    /// Fetch the URL and return its extracted text content
    ///
    /// # Errors
    ///
    /// Returns `Error::Upstream` on network failures, non-success status
    /// codes, or pages with no extractable content.
    async fn fetch(&self, url: &str) -> Result<String>;
}

// ============================================================================
// HTTP Implementation
// ============================================================================

/// Real scraper backed by reqwest
pub struct HttpScraper {
    client: Client,
}

impl HttpScraper {
    /// Create a scraper from configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` if the HTTP client cannot be created
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .cookie_store(true)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ContentScraper for HttpScraper {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!(url = %url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Failed to fetch {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::upstream(format!(
                "Fetching {url} returned HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::upstream(format!("Failed to read body of {url}: {e}")))?;

        let content = extract_text(&body);
        if content.is_empty() {
            return Err(Error::upstream(format!("No content found at {url}")));
        }

        tracing::debug!(url = %url, bytes = content.len(), "content extracted");
        Ok(content)
    }
}

/// Extract readable article text from an HTML page
///
/// Prefers an `<article>` container, then `<main>`, then `<body>`. Text
/// inside noise tags is skipped, and surviving lines shorter than
/// [`MIN_LINE_LEN`] are dropped.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let container = ["article", "main", "body"].iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        document.select(&selector).next()
    });

    let Some(container) = container else {
        return String::new();
    };

    let mut raw = String::new();
    collect_text(container, &mut raw);

    raw.lines()
        .map(str::trim)
        .filter(|line| line.len() > MIN_LINE_LEN)
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(&text.text);
                out.push('\n');
            }
            Node::Element(el) => {
                if !NOISE_TAGS.contains(&el.name()) {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        collect_text(child_el, out);
                    }
                }
            }
            _ => {}
        }
    }
}

// ============================================================================
// Test Doubles
// ============================================================================

/// Scraper double returning fixed content for every URL
pub struct FixedScraper {
    body: String,
}

impl FixedScraper {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl ContentScraper for FixedScraper {
    async fn fetch(&self, _url: &str) -> Result<String> {
        Ok(self.body.clone())
    }
}

/// Scraper double that always fails with an upstream error
pub struct FailingScraper;

#[async_trait]
impl ContentScraper for FailingScraper {
    async fn fetch(&self, url: &str) -> Result<String> {
        Err(Error::upstream(format!("Failed to fetch {url}: refused")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_prefers_article_container() {
        let html = r#"<html><body>
            <nav>Site navigation links that are fairly long here</nav>
            <article><p>The Air Force confirmed the retirement schedule on Monday.</p></article>
            <footer>Copyright notice text that should be excluded</footer>
        </body></html>"#;

        let text = extract_text(html);
        assert_eq!(
            text,
            "The Air Force confirmed the retirement schedule on Monday."
        );
    }

    #[test]
    fn test_extract_strips_noise_tags() {
        let html = r#"<html><body><main>
            <script>var tracking = "should never appear in output text";</script>
            <style>.hidden { display: none; color: transparent; }</style>
            <p>Lockheed Martin delivered the first upgraded airframe this quarter.</p>
            <aside>Related stories sidebar with assorted long links</aside>
        </main></body></html>"#;

        let text = extract_text(html);
        assert!(text.contains("Lockheed Martin delivered"));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("display: none"));
        assert!(!text.contains("Related stories"));
    }

    #[test]
    fn test_extract_drops_short_fragments() {
        let html = r#"<html><body>
            <p>Menu</p>
            <p>Share</p>
            <p>The department requested an additional four billion dollars for the program.</p>
        </body></html>"#;

        let text = extract_text(html);
        assert_eq!(
            text,
            "The department requested an additional four billion dollars for the program."
        );
    }

    #[test]
    fn test_extract_empty_page() {
        assert_eq!(extract_text("<html><body></body></html>"), "");
        assert_eq!(extract_text(""), "");
    }

    #[tokio::test]
    async fn test_fixed_scraper_returns_body() {
        let scraper = FixedScraper::new("canned content");
        let content = scraper.fetch("http://anything.example").await.unwrap();
        assert_eq!(content, "canned content");
    }

    #[tokio::test]
    async fn test_failing_scraper_is_upstream_error() {
        let err = FailingScraper
            .fetch("http://anything.example")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
