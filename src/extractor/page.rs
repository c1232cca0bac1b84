//! Page extraction: one HTML document in, one `PageRecord` out.
//!
//! Extraction is a pure function of its inputs; the crawler supplies the
//! identity fields (URL, status, timing, depth). Selectors are cached in
//! `OnceLock`s since the same handful is applied to every page.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use url::Url;
use xxhash_rust::xxh3::xxh3_128;

use crate::domain::page::{HreflangEntry, PageImage, PageLink, PageRecord};

const MAX_INTERNAL_LINKS: usize = 200;
const MAX_EXTERNAL_LINKS: usize = 100;
const MAX_IMAGES: usize = 100;
const MAX_SECONDARY_HEADINGS: usize = 20;
const MAX_ANCHOR_TEXT: usize = 100;

macro_rules! cached_selector {
    ($sel:literal) => {{
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        SELECTOR.get_or_init(|| Selector::parse($sel).unwrap())
    }};
}

/// Inputs for one extraction.
pub struct ExtractRequest<'a> {
    pub url: &'a str,
    pub final_url: &'a Url,
    pub status_code: u16,
    pub headers: &'a HashMap<String, String>,
    pub body: &'a str,
    pub load_time_ms: u64,
    pub depth: u32,
    pub crawled_at: DateTime<Utc>,
}

/// Parse one HTML document into a `PageRecord`.
pub fn extract_page(req: &ExtractRequest) -> PageRecord {
    let html = Html::parse_document(req.body);
    let base_host = req.final_url.host_str().unwrap_or("");

    let title = select_text(&html, cached_selector!("title"));
    let meta_description = select_attr(&html, cached_selector!("meta[name='description']"), "content");
    let meta_robots = select_attr(&html, cached_selector!("meta[name='robots']"), "content");
    let canonical_url = select_attr(&html, cached_selector!("link[rel='canonical']"), "href")
        .map(|href| resolve(req.final_url, &href));

    let h1 = heading_texts(&html, cached_selector!("h1"), usize::MAX);
    let h2 = heading_texts(&html, cached_selector!("h2"), MAX_SECONDARY_HEADINGS);
    let h3 = heading_texts(&html, cached_selector!("h3"), MAX_SECONDARY_HEADINGS);

    let (internal_links, external_links) = extract_links(&html, req.final_url, base_host);
    let images = extract_images(&html, req.final_url);

    let body_text = body_text(&html);
    let word_count = body_text.split_whitespace().count();
    let text_content_hash = content_hash(&body_text);

    let structured_data = extract_json_ld(&html);
    let open_graph = prefixed_meta(&html, cached_selector!("meta[property]"), "property", "og:");
    let twitter_cards = prefixed_meta(&html, cached_selector!("meta[name]"), "name", "twitter:");
    let hreflang = extract_hreflang(&html);

    let html_lang = html
        .select(cached_selector!("html"))
        .next()
        .and_then(|el| el.value().attr("lang"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let viewport = select_attr(&html, cached_selector!("meta[name='viewport']"), "content");
    let has_viewport_meta = html.select(cached_selector!("meta[name='viewport']")).next().is_some();

    let robots_lower = meta_robots.as_deref().unwrap_or("").to_ascii_lowercase();
    let noindex = robots_lower.contains("noindex");
    let nofollow = robots_lower.contains("nofollow");

    let scripts_count = html.select(cached_selector!("script[src]")).count();
    let stylesheets_count = html.select(cached_selector!("link[rel='stylesheet']")).count();

    PageRecord {
        url: req.url.to_string(),
        final_url: req.final_url.to_string(),
        status_code: req.status_code,
        content_type: req.headers.get("content-type").cloned().unwrap_or_default(),
        load_time_ms: req.load_time_ms,
        crawled_at: req.crawled_at,
        depth: req.depth,
        title,
        meta_description,
        meta_robots,
        canonical_url,
        h1,
        h2,
        h3,
        internal_links,
        external_links,
        images,
        word_count,
        text_content_hash,
        structured_data,
        open_graph,
        twitter_cards,
        hreflang,
        html_lang,
        has_viewport_meta,
        viewport_content: viewport.unwrap_or_default(),
        noindex,
        nofollow,
        scripts_count,
        stylesheets_count,
        render_blocking_resources: render_blocking_resources(&html, stylesheets_count),
        third_party_scripts: third_party_scripts(&html, base_host, req.final_url),
        has_mixed_content: has_mixed_content(&html, req.final_url),
        has_rel_next: html.select(cached_selector!("link[rel='next']")).next().is_some(),
        has_rel_prev: html.select(cached_selector!("link[rel='prev']")).next().is_some(),
        has_skip_link: has_skip_link(&html),
        forms_without_labels: forms_without_labels(&html),
        has_flash: has_flash(&html),
        response_headers: req.headers.clone(),
        ..PageRecord::default()
    }
}

/// Internal iff the hosts match after stripping a single leading `www.` on
/// either side, or the link host is a subdomain of the base host.
pub fn is_internal_host(link_host: &str, base_host: &str) -> bool {
    if link_host.is_empty() || base_host.is_empty() {
        return false;
    }
    let strip = |h: &str| h.strip_prefix("www.").map(str::to_string).unwrap_or_else(|| h.to_string());
    let link = strip(&link_host.to_ascii_lowercase());
    let base = strip(&base_host.to_ascii_lowercase());
    link == base || link.ends_with(&format!(".{base}"))
}

fn select_text(html: &Html, selector: &Selector) -> Option<String> {
    html.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn select_attr(html: &Html, selector: &Selector, attr: &str) -> Option<String> {
    html.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn heading_texts(html: &Html, selector: &Selector, cap: usize) -> Vec<String> {
    html.select(selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .take(cap)
        .collect()
}

fn resolve(base: &Url, href: &str) -> String {
    match base.join(href) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => href.to_string(),
    }
}

fn anchor_text(element: &ElementRef) -> Option<String> {
    let mut text = element.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        if let Some(attr) = element
            .value()
            .attr("aria-label")
            .or_else(|| element.value().attr("title"))
        {
            text = attr.trim().to_string();
        }
    }
    if text.is_empty() {
        for img in element.select(cached_selector!("img")) {
            if let Some(alt) = img.value().attr("alt") {
                if !alt.trim().is_empty() {
                    text = alt.trim().to_string();
                    break;
                }
            }
        }
    }
    if text.is_empty() {
        None
    } else {
        if let Some((idx, _)) = text.char_indices().nth(MAX_ANCHOR_TEXT) {
            text.truncate(idx);
        }
        Some(text)
    }
}

fn extract_links(html: &Html, final_url: &Url, base_host: &str) -> (Vec<PageLink>, Vec<PageLink>) {
    let mut internal = Vec::new();
    let mut external = Vec::new();

    for element in html.select(cached_selector!("a[href]")) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }

        let Ok(mut resolved) = final_url.join(href) else {
            continue;
        };
        resolved.set_fragment(None);
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }

        let nofollow = element
            .value()
            .attr("rel")
            .map(|rel| rel.to_ascii_lowercase().split_whitespace().any(|r| r == "nofollow"))
            .unwrap_or(false);

        let link = PageLink {
            url: resolved.to_string(),
            text: anchor_text(&element),
            nofollow,
        };

        if is_internal_host(resolved.host_str().unwrap_or(""), base_host) {
            if internal.len() < MAX_INTERNAL_LINKS {
                internal.push(link);
            }
        } else if external.len() < MAX_EXTERNAL_LINKS {
            external.push(link);
        }
    }

    (internal, external)
}

fn extract_images(html: &Html, final_url: &Url) -> Vec<PageImage> {
    html.select(cached_selector!("img"))
        .filter_map(|element| {
            let src = element
                .value()
                .attr("src")
                .filter(|s| !s.trim().is_empty())
                .or_else(|| element.value().attr("data-src"))?
                .trim();
            if src.is_empty() {
                return None;
            }

            Some(PageImage {
                url: resolve(final_url, src),
                alt: element.value().attr("alt").map(|s| s.trim().to_string()),
                width: element.value().attr("width").and_then(|w| w.parse().ok()),
                height: element.value().attr("height").and_then(|h| h.parse().ok()),
            })
        })
        .take(MAX_IMAGES)
        .collect()
}

fn body_text(html: &Html) -> String {
    html.select(cached_selector!("body"))
        .next()
        .map(|body| body.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// 128-bit digest of the whitespace-normalized page text.
fn content_hash(text: &str) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{:032x}", xxh3_128(normalized.as_bytes()))
}

/// Parse every JSON-LD block, skipping invalid JSON and flattening
/// top-level arrays.
fn extract_json_ld(html: &Html) -> Vec<serde_json::Value> {
    let mut blocks = Vec::new();
    for script in html.select(cached_selector!("script[type='application/ld+json']")) {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(items)) => blocks.extend(items),
            Ok(value) => blocks.push(value),
            Err(_) => {}
        }
    }
    blocks
}

fn prefixed_meta(
    html: &Html,
    selector: &Selector,
    attr: &str,
    prefix: &str,
) -> HashMap<String, String> {
    html.select(selector)
        .filter_map(|el| {
            let name = el.value().attr(attr)?;
            if !name.starts_with(prefix) {
                return None;
            }
            Some((name.to_string(), el.value().attr("content").unwrap_or("").to_string()))
        })
        .collect()
}

fn extract_hreflang(html: &Html) -> Vec<HreflangEntry> {
    html.select(cached_selector!("link[rel='alternate'][hreflang]"))
        .filter_map(|el| {
            Some(HreflangEntry {
                lang: el.value().attr("hreflang")?.to_string(),
                url: el.value().attr("href")?.to_string(),
            })
        })
        .collect()
}

/// Stylesheets plus synchronous external scripts.
fn render_blocking_resources(html: &Html, stylesheets: usize) -> usize {
    let blocking_scripts = html
        .select(cached_selector!("script[src]"))
        .filter(|el| el.value().attr("async").is_none() && el.value().attr("defer").is_none())
        .count();
    stylesheets + blocking_scripts
}

fn third_party_scripts(html: &Html, base_host: &str, final_url: &Url) -> usize {
    html.select(cached_selector!("script[src]"))
        .filter_map(|el| el.value().attr("src"))
        .filter_map(|src| final_url.join(src).ok())
        .filter(|url| {
            url.host_str()
                .map(|h| !is_internal_host(h, base_host))
                .unwrap_or(false)
        })
        .count()
}

fn has_mixed_content(html: &Html, final_url: &Url) -> bool {
    if final_url.scheme() != "https" {
        return false;
    }
    let insecure = |attr: Option<&str>| attr.map(|v| v.trim().starts_with("http://")).unwrap_or(false);

    html.select(cached_selector!("img[src]"))
        .any(|el| insecure(el.value().attr("src")))
        || html
            .select(cached_selector!("script[src]"))
            .any(|el| insecure(el.value().attr("src")))
        || html
            .select(cached_selector!("link[rel='stylesheet']"))
            .any(|el| insecure(el.value().attr("href")))
}

fn has_skip_link(html: &Html) -> bool {
    html.select(cached_selector!("a[href]"))
        .filter(|el| el.value().attr("href").map(|h| h.starts_with('#')).unwrap_or(false))
        .any(|el| el.text().collect::<String>().to_ascii_lowercase().contains("skip"))
}

/// Inputs that are neither labelled via `label[for]` nor `aria-label`.
fn forms_without_labels(html: &Html) -> usize {
    let labelled_ids: HashSet<String> = html
        .select(cached_selector!("label[for]"))
        .filter_map(|el| el.value().attr("for"))
        .map(|s| s.to_string())
        .collect();

    html.select(cached_selector!("input"))
        .filter(|el| {
            let ty = el.value().attr("type").unwrap_or("text").to_ascii_lowercase();
            !matches!(ty.as_str(), "hidden" | "submit" | "button" | "image" | "reset")
        })
        .filter(|el| el.value().attr("aria-label").is_none())
        .filter(|el| {
            el.value()
                .attr("id")
                .map(|id| !labelled_ids.contains(id))
                .unwrap_or(true)
        })
        .count()
}

fn has_flash(html: &Html) -> bool {
    let flashy = |el: &ElementRef| {
        let ty = el.value().attr("type").unwrap_or("").to_ascii_lowercase();
        let src = el
            .value()
            .attr("src")
            .or_else(|| el.value().attr("data"))
            .unwrap_or("")
            .to_ascii_lowercase();
        ty.contains("shockwave-flash") || src.ends_with(".swf")
    };
    html.select(cached_selector!("object")).any(|el| flashy(&el))
        || html.select(cached_selector!("embed")).any(|el| flashy(&el))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(
        final_url: &'a Url,
        headers: &'a HashMap<String, String>,
        body: &'a str,
    ) -> ExtractRequest<'a> {
        ExtractRequest {
            url: final_url.as_str(),
            final_url,
            status_code: 200,
            headers,
            body,
            load_time_ms: 12,
            depth: 0,
            crawled_at: chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn extracts_head_fields() {
        let url = Url::parse("https://example.com/page").unwrap();
        let headers = HashMap::from([("content-type".to_string(), "text/html".to_string())]);
        let body = r#"<html lang="en"><head>
            <title> My Page </title>
            <meta name="description" content="A description.">
            <meta name="robots" content="NOINDEX, nofollow">
            <meta name="viewport" content="width=device-width, initial-scale=1">
            <link rel="canonical" href="/page">
            </head><body><h1>One</h1><h1>Two</h1><h2>Sub</h2></body></html>"#;

        let page = extract_page(&request(&url, &headers, body));

        assert_eq!(page.title.as_deref(), Some("My Page"));
        assert_eq!(page.meta_description.as_deref(), Some("A description."));
        assert_eq!(page.canonical_url.as_deref(), Some("https://example.com/page"));
        assert_eq!(page.h1, vec!["One", "Two"]);
        assert_eq!(page.h2, vec!["Sub"]);
        assert!(page.noindex);
        assert!(page.nofollow);
        assert!(page.has_viewport_meta);
        assert_eq!(page.html_lang.as_deref(), Some("en"));
        assert_eq!(page.content_type, "text/html");
    }

    #[test]
    fn classifies_links_and_skips_non_http() {
        let url = Url::parse("https://www.example.com/").unwrap();
        let headers = HashMap::new();
        let body = r##"<html><body>
            <a href="/about">About</a>
            <a href="https://example.com/contact">Contact</a>
            <a href="https://blog.example.com/post">Blog</a>
            <a href="https://other.com/x" rel="nofollow sponsored">Other</a>
            <a href="mailto:hi@example.com">Mail</a>
            <a href="tel:+123">Call</a>
            <a href="#section">Jump</a>
            <a href="/about#team">Team</a>
        </body></html>"##;

        let page = extract_page(&request(&url, &headers, body));

        // /about and /about#team collapse to the same fragment-free URL but
        // remain two anchors; subdomains count as internal.
        assert_eq!(page.internal_links.len(), 4);
        assert!(page
            .internal_links
            .iter()
            .any(|l| l.url == "https://blog.example.com/post"));
        assert_eq!(page.external_links.len(), 1);
        assert!(page.external_links[0].nofollow);
        assert!(page.internal_links.iter().all(|l| !l.url.contains('#')));
    }

    #[test]
    fn www_stripping_is_symmetric() {
        assert!(is_internal_host("example.com", "www.example.com"));
        assert!(is_internal_host("www.example.com", "example.com"));
        assert!(is_internal_host("shop.example.com", "www.example.com"));
        assert!(!is_internal_host("example.org", "example.com"));
        assert!(!is_internal_host("notexample.com", "example.com"));
    }

    #[test]
    fn parses_json_ld_and_flattens_arrays() {
        let url = Url::parse("https://example.com/").unwrap();
        let headers = HashMap::new();
        let body = r#"<html><head>
            <script type="application/ld+json">[{"@type":"Organization"},{"@type":"WebSite"}]</script>
            <script type="application/ld+json">{"@type":"BreadcrumbList"}</script>
            <script type="application/ld+json">{not json</script>
        </head><body></body></html>"#;

        let page = extract_page(&request(&url, &headers, body));
        assert_eq!(page.structured_data.len(), 3);
    }

    #[test]
    fn collects_social_meta_and_hreflang() {
        let url = Url::parse("https://example.com/").unwrap();
        let headers = HashMap::new();
        let body = r#"<html><head>
            <meta property="og:title" content="OG Title">
            <meta property="og:image" content="https://example.com/img.png">
            <meta name="twitter:card" content="summary">
            <link rel="alternate" hreflang="en" href="https://example.com/">
            <link rel="alternate" hreflang="es" href="https://example.com/es/">
        </head><body></body></html>"#;

        let page = extract_page(&request(&url, &headers, body));
        assert_eq!(page.open_graph.get("og:title").map(String::as_str), Some("OG Title"));
        assert_eq!(page.twitter_cards.get("twitter:card").map(String::as_str), Some("summary"));
        assert_eq!(page.hreflang.len(), 2);
    }

    #[test]
    fn word_count_and_hash_are_deterministic() {
        let url = Url::parse("https://example.com/").unwrap();
        let headers = HashMap::new();
        let body = "<html><body><p>alpha beta   gamma</p></body></html>";

        let first = extract_page(&request(&url, &headers, body));
        let second = extract_page(&request(&url, &headers, body));

        assert_eq!(first.word_count, 3);
        assert_eq!(first.text_content_hash, second.text_content_hash);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn derives_static_signals() {
        let url = Url::parse("https://example.com/").unwrap();
        let headers = HashMap::new();
        let body = r##"<html><head>
            <link rel="stylesheet" href="/a.css">
            <script src="https://cdn.tracker.com/t.js"></script>
            <script src="/app.js" defer></script>
            <link rel="next" href="/page/2">
        </head><body>
            <img src="http://example.com/insecure.png">
            <a href="#main">Skip to content</a>
            <form><input type="text" name="q"><input type="hidden" name="t"></form>
        </body></html>"##;

        let page = extract_page(&request(&url, &headers, body));
        assert_eq!(page.scripts_count, 2);
        assert_eq!(page.stylesheets_count, 1);
        // stylesheet + the tracker script (app.js is deferred)
        assert_eq!(page.render_blocking_resources, 2);
        assert_eq!(page.third_party_scripts, 1);
        assert!(page.has_mixed_content);
        assert!(page.has_rel_next);
        assert!(!page.has_rel_prev);
        assert!(page.has_skip_link);
        assert_eq!(page.forms_without_labels, 1);
        assert!(!page.has_flash);
    }

    #[test]
    fn caps_links_and_images() {
        let url = Url::parse("https://example.com/").unwrap();
        let headers = HashMap::new();
        let mut body = String::from("<html><body>");
        for i in 0..260 {
            body.push_str(&format!("<a href=\"/p{i}\">p{i}</a>"));
        }
        for i in 0..120 {
            body.push_str(&format!("<img src=\"/i{i}.png\" alt=\"i\">"));
        }
        body.push_str("</body></html>");

        let page = extract_page(&request(&url, &headers, &body));
        assert_eq!(page.internal_links.len(), 200);
        assert_eq!(page.images.len(), 100);
    }
}
