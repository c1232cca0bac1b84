//! Crawl-side domain records.
//!
//! A `PageRecord` is produced once per crawled URL (re-rendering replaces the
//! record, it never mutates one in place). `CrawlArtifact` is the sealed
//! output of a crawl; the audit engine only ever borrows it immutably.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single anchor discovered on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub url: String,
    pub text: Option<String>,
    pub nofollow: bool,
}

/// An image discovered on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageImage {
    pub url: String,
    pub alt: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// One `<link rel="alternate" hreflang=...>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HreflangEntry {
    pub lang: String,
    pub url: String,
}

/// Per-page field metrics, attached by the pagespeed stage when enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    pub lcp_ms: Option<f64>,
    pub inp_ms: Option<f64>,
    pub cls: Option<f64>,
    pub performance_score: Option<f64>,
}

/// Everything the pipeline knows about one crawled URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRecord {
    // Identity
    pub url: String,
    pub final_url: String,
    pub status_code: u16,
    pub content_type: String,
    pub load_time_ms: u64,
    pub crawled_at: DateTime<Utc>,
    pub depth: u32,

    // Parsed head
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_robots: Option<String>,
    pub canonical_url: Option<String>,
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,

    // Link graph and media
    pub internal_links: Vec<PageLink>,
    pub external_links: Vec<PageLink>,
    pub images: Vec<PageImage>,

    // Body
    pub word_count: usize,
    pub text_content_hash: String,

    // Structured metadata
    pub structured_data: Vec<serde_json::Value>,
    pub open_graph: HashMap<String, String>,
    pub twitter_cards: HashMap<String, String>,
    pub hreflang: Vec<HreflangEntry>,

    pub html_lang: Option<String>,
    pub has_viewport_meta: bool,
    pub viewport_content: String,
    pub noindex: bool,
    pub nofollow: bool,

    pub scripts_count: usize,
    pub stylesheets_count: usize,

    // Statically derived signals consumed by the audit checks
    pub render_blocking_resources: usize,
    pub third_party_scripts: usize,
    pub has_mixed_content: bool,
    pub has_rel_next: bool,
    pub has_rel_prev: bool,
    pub has_skip_link: bool,
    pub forms_without_labels: usize,
    pub has_flash: bool,

    /// Lowercased response header map.
    pub response_headers: HashMap<String, String>,
    /// Redirect hops when observable; the fetcher follows redirects
    /// internally, so this is normally empty.
    pub redirect_chain: Vec<String>,
    /// Blob key of the stored raw HTML, when `store_html` is on.
    pub raw_html_key: Option<String>,
    pub errors: Vec<String>,

    // JS rendering
    pub js_rendered: bool,
    pub js_render_time_ms: u64,
    pub spa_detected: bool,
    pub framework_detected: Option<String>,

    /// Field metrics from the pagespeed stage, when enabled.
    pub metrics: Option<PageMetrics>,
    /// Template id assigned by the classification stage, when enabled.
    pub template_id: Option<String>,
}

impl PageRecord {
    /// Record for a URL that could not be fetched or was rate limited.
    pub fn error_page(
        url: &str,
        depth: u32,
        status_code: u16,
        load_time_ms: u64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            url: url.to_string(),
            final_url: url.to_string(),
            status_code,
            depth,
            load_time_ms,
            crawled_at: Utc::now(),
            errors: vec![error.into()],
            ..Self::default()
        }
    }

    /// True for 2xx responses.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// robots.txt state captured at the start of a crawl.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotsInfo {
    pub exists: bool,
    pub url: String,
    pub content: Option<String>,
    pub crawl_delay: Option<f64>,
    /// Sitemap URLs declared in the robots body.
    pub sitemap_urls: Vec<String>,
}

/// sitemap.xml state captured at the start of a crawl.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapInfo {
    pub exists: bool,
    pub url: Option<String>,
    pub urls: Vec<String>,
    pub url_count: usize,
    pub errors: Vec<String>,
}

/// Sealed output of a crawl. Append-only while the crawl runs, read-only
/// afterwards; the audit engine borrows it immutably.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlArtifact {
    pub base_url: String,
    pub pages: Vec<PageRecord>,
    pub robots: RobotsInfo,
    pub sitemap: SitemapInfo,
}

impl CrawlArtifact {
    /// Iterate `(url, headers)` for every page that recorded headers.
    pub fn response_headers(&self) -> impl Iterator<Item = (&str, &HashMap<String, String>)> {
        self.pages
            .iter()
            .filter(|p| !p.response_headers.is_empty())
            .map(|p| (p.url.as_str(), &p.response_headers))
    }

    /// Base URL without its trailing slash, for homepage comparisons.
    pub fn homepage(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_page_has_error_and_status() {
        let page = PageRecord::error_page("https://example.com/x", 2, 0, 30_000, "Request timed out");
        assert_eq!(page.status_code, 0);
        assert_eq!(page.depth, 2);
        assert!(!page.is_ok());
        assert_eq!(page.errors, vec!["Request timed out".to_string()]);
    }

    #[test]
    fn homepage_strips_trailing_slash() {
        let artifact = CrawlArtifact {
            base_url: "https://example.com/".to_string(),
            ..CrawlArtifact::default()
        };
        assert_eq!(artifact.homepage(), "https://example.com");
    }

    #[test]
    fn page_record_serialization_round_trips() {
        let mut page = PageRecord::default();
        page.url = "https://example.com/a".to_string();
        page.title = Some("A".to_string());
        page.h1 = vec!["A".to_string()];

        let json = serde_json::to_string(&page).unwrap();
        let back: PageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(serde_json::to_string(&back).unwrap(), json);
    }
}
