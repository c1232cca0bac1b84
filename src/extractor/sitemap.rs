//! Sitemap loading and parsing.
//!
//! Candidates are `/sitemap.xml` plus anything declared via `Sitemap:` in
//! robots.txt. XML bodies are read with a streaming event parser; bodies
//! without `<loc>` tags fall back to newline-separated URL lists. A
//! `<sitemapindex>` is followed one level deep.

use quick_xml::events::Event;
use tracing::{debug, warn};
use url::Url;

use crate::domain::page::SitemapInfo;
use crate::service::http::HttpFetcher;

pub const SITE_MAP_PATH: &str = "sitemap.xml";

/// Global cap on seed URLs taken from sitemaps.
pub const MAX_SITEMAP_URLS: usize = 50_000;

/// Child sitemaps followed from a sitemap index.
const MAX_CHILD_SITEMAPS: usize = 10;

#[derive(Debug, Clone)]
enum SitemapFormat {
    Xml,
    PlainText,
}

impl SitemapFormat {
    fn detect(text: &str) -> Self {
        match text.contains("<loc>") {
            true => SitemapFormat::Xml,
            false => SitemapFormat::PlainText,
        }
    }

    fn extract_urls(&self, text: &str) -> Vec<String> {
        match self {
            SitemapFormat::Xml => Self::extract_from_xml(text),
            SitemapFormat::PlainText => Self::extract_from_plain_text(text),
        }
    }

    fn extract_from_xml(text: &str) -> Vec<String> {
        let mut reader = quick_xml::Reader::from_str(text);
        let mut urls = Vec::new();
        let mut buf = Vec::new();
        let mut in_loc_tag = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"loc" => {
                    in_loc_tag = true;
                }
                Ok(Event::Text(e)) if in_loc_tag => {
                    match e.decode() {
                        Ok(txt) => urls.push(txt.trim().to_string()),
                        Err(e) => {
                            warn!("[SITEMAP] Invalid URL text at {:?}: {}", reader.buffer_position(), e);
                        }
                    }
                    in_loc_tag = false;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    warn!("[SITEMAP] XML parse error: {}", e);
                    break;
                }
                _ => {}
            }
            buf.clear();
        }
        urls
    }

    fn extract_from_plain_text(text: &str) -> Vec<String> {
        text.split_whitespace()
            .filter_map(|token| Url::parse(token).ok())
            .map(|url| url.to_string())
            .collect()
    }
}

fn is_sitemap_index(text: &str) -> bool {
    text.contains("<sitemapindex")
}

/// Load seed URLs from the site's sitemaps. Malformed or missing sitemaps
/// degrade to an empty seed list, never an error.
pub async fn load_sitemap(
    fetcher: &HttpFetcher,
    base_url: &Url,
    robots_sitemaps: &[String],
) -> SitemapInfo {
    let mut candidates: Vec<String> = Vec::new();
    if let Ok(default) = base_url.join(SITE_MAP_PATH) {
        candidates.push(default.to_string());
    }
    candidates.extend(robots_sitemaps.iter().cloned());

    let mut info = SitemapInfo::default();

    for candidate in candidates {
        let Ok(url) = Url::parse(&candidate) else {
            info.errors.push(format!("invalid sitemap url: {candidate}"));
            continue;
        };
        let body = match fetcher.fetch(&url).await {
            Ok(resp) if resp.status == 200 => resp.body,
            Ok(resp) => {
                debug!("[SITEMAP] {} returned {}", url, resp.status);
                continue;
            }
            Err(e) => {
                debug!("[SITEMAP] Failed to fetch {}: {}", url, e);
                continue;
            }
        };

        let mut urls = SitemapFormat::detect(&body).extract_urls(&body);

        if is_sitemap_index(&body) {
            // One level of recursion: entries of an index are sitemaps, not pages.
            let children: Vec<String> = urls.drain(..).take(MAX_CHILD_SITEMAPS).collect();
            for child in children {
                if urls.len() >= MAX_SITEMAP_URLS {
                    break;
                }
                let Ok(child_url) = Url::parse(&child) else {
                    continue;
                };
                match fetcher.fetch(&child_url).await {
                    Ok(resp) if resp.status == 200 => {
                        urls.extend(SitemapFormat::detect(&resp.body).extract_urls(&resp.body));
                    }
                    _ => debug!("[SITEMAP] Skipping child sitemap {}", child),
                }
            }
        }

        urls.truncate(MAX_SITEMAP_URLS);

        info.exists = true;
        info.url = Some(url.to_string());
        info.url_count = urls.len();
        info.urls = urls;
        debug!("[SITEMAP] Loaded {} URLs from {}", info.url_count, candidate);
        return info;
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USER_AGENT;
    use crate::service::http::{create_client, ClientType};
    use std::time::Duration;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(
            create_client(ClientType::Standard, DEFAULT_USER_AGENT, Duration::from_secs(5))
                .unwrap(),
        )
    }

    #[test]
    fn test_detect_xml_format() {
        let text = r#"<loc>https://example.com</loc>"#;
        assert!(matches!(SitemapFormat::detect(text), SitemapFormat::Xml));
    }

    #[test]
    fn test_detect_plain_text_format() {
        let text = "https://example.com\nhttps://test.com";
        assert!(matches!(SitemapFormat::detect(text), SitemapFormat::PlainText));
    }

    #[test]
    fn test_extract_plain_text_urls() {
        let text = "https://www.example.com/a\nhttps://www.example.com/b\nnot a url";
        let urls = SitemapFormat::PlainText.extract_urls(text);
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], "https://www.example.com/a");
    }

    #[test]
    fn test_extract_xml_urlset() {
        let text = r#"<?xml version="1.0"?>
<urlset>
<url><loc>https://example.com/</loc></url>
<url><loc>https://example.com/about</loc></url>
</urlset>"#;
        let urls = SitemapFormat::Xml.extract_urls(text);
        assert_eq!(urls, vec!["https://example.com/", "https://example.com/about"]);
    }

    #[tokio::test]
    async fn loads_sitemap_from_default_path() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/sitemap.xml")
            .with_status(200)
            .with_body("<urlset><url><loc>https://example.com/a</loc></url></urlset>")
            .create_async()
            .await;

        let base = Url::parse(&server.url()).unwrap();
        let info = load_sitemap(&fetcher(), &base, &[]).await;

        assert!(info.exists);
        assert_eq!(info.url_count, 1);
        assert_eq!(info.urls, vec!["https://example.com/a"]);
    }

    #[tokio::test]
    async fn follows_sitemap_index_one_level() {
        let mut server = mockito::Server::new_async().await;
        let child_loc = format!("{}/pages.xml", server.url());
        let index_body = format!(
            "<sitemapindex><sitemap><loc>{child_loc}</loc></sitemap></sitemapindex>"
        );
        let _m1 = server
            .mock("GET", "/sitemap.xml")
            .with_status(200)
            .with_body(index_body)
            .create_async()
            .await;
        let _m2 = server
            .mock("GET", "/pages.xml")
            .with_status(200)
            .with_body("<urlset><url><loc>https://example.com/p1</loc></url></urlset>")
            .create_async()
            .await;

        let base = Url::parse(&server.url()).unwrap();
        let info = load_sitemap(&fetcher(), &base, &[]).await;

        assert!(info.exists);
        assert_eq!(info.urls, vec!["https://example.com/p1"]);
    }

    #[tokio::test]
    async fn missing_sitemap_degrades_to_empty() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/sitemap.xml")
            .with_status(404)
            .create_async()
            .await;

        let base = Url::parse(&server.url()).unwrap();
        let info = load_sitemap(&fetcher(), &base, &[]).await;

        assert!(!info.exists);
        assert!(info.urls.is_empty());
    }
}
