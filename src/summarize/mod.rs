//! Summary and highlight generation collaborator
//!
//! The newsletter uses two derived-text shapes: a compact summary block for
//! articles (starts with the 🎯 marker) and a single-sentence highlight for
//! snapshots (starts with the 🚩 marker), both ending with a `(more)` link
//! back to the source. Generation is behind the [`Summarizer`] trait; the
//! shipped implementation is a deterministic stub that excerpts the scraped
//! content instead of calling an AI model.

use crate::error::{Error, Result};

/// Marker every article summary starts with
pub const SUMMARY_MARKER: &str = "🎯";

/// Marker every snapshot highlight starts with
pub const HIGHLIGHT_MARKER: &str = "🚩";

/// Longest excerpt carried into a stub summary, in characters
const SUMMARY_EXCERPT_CHARS: usize = 300;

/// Longest sentence carried into a stub highlight, in characters
const HIGHLIGHT_SENTENCE_CHARS: usize = 200;

/// Capability for deriving newsletter text from raw article content
pub trait Summarizer: Send + Sync {
    /// Produce a formatted summary block for an article
    fn summarize(&self, title: &str, content: &str, url: &str) -> Result<String>;

    /// Produce a one-sentence highlight for a snapshot
    fn highlight(&self, content: &str, url: &str) -> Result<String>;
}

// ============================================================================
// Stub Implementation
// ============================================================================

/// Placeholder generator used until a real AI summarizer is wired in
pub struct StubSummarizer;

impl Summarizer for StubSummarizer {
    fn summarize(&self, title: &str, content: &str, url: &str) -> Result<String> {
        let heading = if title.trim().is_empty() {
            "Untitled"
        } else {
            title.trim()
        };
        let excerpt = excerpt(content, SUMMARY_EXCERPT_CHARS);

        Ok(format!(
            "{SUMMARY_MARKER} **{heading}**\n\n{excerpt} ([more]({url}))"
        ))
    }

    fn highlight(&self, content: &str, url: &str) -> Result<String> {
        let sentence = first_sentence(content, HIGHLIGHT_SENTENCE_CHARS);
        Ok(format!("{HIGHLIGHT_MARKER} {sentence} ([more]({url}))"))
    }
}

/// Take the leading part of the content, cut on a word boundary
fn excerpt(content: &str, max_chars: usize) -> String {
    let flattened = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }

    let cut: String = flattened.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) => &cut[..idx],
        None => cut.as_str(),
    };
    format!("{}...", trimmed.trim_end_matches(['.', ',', ';', ':']))
}

/// Take the first sentence of the content, bounded in length
fn first_sentence(content: &str, max_chars: usize) -> String {
    let flattened = content.split_whitespace().collect::<Vec<_>>().join(" ");
    let sentence = match flattened.find(['.', '!', '?']) {
        Some(idx) => &flattened[..=idx],
        None => flattened.as_str(),
    };

    if sentence.chars().count() <= max_chars {
        return sentence.to_string();
    }

    let cut: String = sentence.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(idx) => format!("{}...", &cut[..idx]),
        None => format!("{cut}..."),
    }
}

// ============================================================================
// Test Double
// ============================================================================

/// Summarizer double that always fails with an upstream error
pub struct FailingSummarizer;

impl Summarizer for FailingSummarizer {
    fn summarize(&self, _title: &str, _content: &str, _url: &str) -> Result<String> {
        Err(Error::upstream("summary generation failed"))
    }

    fn highlight(&self, _content: &str, _url: &str) -> Result<String> {
        Err(Error::upstream("highlight generation failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_shape() {
        let summary = StubSummarizer
            .summarize(
                "A-10s Head to the Boneyard",
                "The Air Force plans to retire the fleet early.",
                "http://example.com/a10",
            )
            .unwrap();

        assert!(summary.starts_with(SUMMARY_MARKER));
        assert!(summary.contains("**A-10s Head to the Boneyard**"));
        assert!(summary.ends_with("([more](http://example.com/a10))"));
    }

    #[test]
    fn test_summary_untitled_fallback() {
        let summary = StubSummarizer
            .summarize("  ", "Some content here.", "http://example.com")
            .unwrap();
        assert!(summary.contains("**Untitled**"));
    }

    #[test]
    fn test_summary_excerpt_is_bounded() {
        let long_content = "word ".repeat(500);
        let summary = StubSummarizer
            .summarize("Title", &long_content, "http://example.com")
            .unwrap();

        assert!(summary.contains("..."));
        assert!(summary.chars().count() < 400);
    }

    #[test]
    fn test_highlight_is_single_sentence() {
        let highlight = StubSummarizer
            .highlight(
                "Senate confirmed the nominee on Tuesday. A second vote follows next week.",
                "http://example.com/vote",
            )
            .unwrap();

        assert!(highlight.starts_with(HIGHLIGHT_MARKER));
        assert!(highlight.contains("Senate confirmed the nominee on Tuesday."));
        assert!(!highlight.contains("second vote"));
        assert!(highlight.ends_with("([more](http://example.com/vote))"));
    }

    #[test]
    fn test_highlight_without_terminator() {
        let highlight = StubSummarizer
            .highlight("fragment with no sentence end", "http://example.com")
            .unwrap();
        assert!(highlight.contains("fragment with no sentence end"));
    }

    #[test]
    fn test_failing_summarizer() {
        assert!(matches!(
            FailingSummarizer
                .summarize("t", "c", "http://example.com")
                .unwrap_err(),
            Error::Upstream(_)
        ));
    }
}
