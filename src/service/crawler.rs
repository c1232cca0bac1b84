//! The crawl worker pool.
//!
//! `concurrency` workers drain the frontier, apply the robots policy,
//! fetch and extract pages, and enqueue discovered in-domain links. With
//! auto JS rendering, pages the SPA heuristic flags are re-rendered in a
//! second pass and their records replaced in place.

use chrono::Utc;
use dashmap::DashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{CrawlConfig, JsRenderingMode};
use crate::domain::page::{CrawlArtifact, PageRecord};
use crate::error::{AppError, Result};
use crate::extractor::page::{extract_page, ExtractRequest};
use crate::extractor::sitemap::load_sitemap;
use crate::service::frontier::Frontier;
use crate::service::http::{create_client, ClientType, FetchError, HttpFetcher};
use crate::service::pacer::AdaptivePacer;
use crate::service::renderer::{JsRenderer, RenderedPage};
use crate::service::robots::RobotsPolicy;
use crate::service::spa::{detect_spa_from_html, needs_js_rendering};
use crate::storage::{url_hash, BlobStore, CrawlScope, StoragePaths};

const JS_RERENDER_BATCH: usize = 5;

/// Crawls one site into a sealed `CrawlArtifact`.
pub struct SiteCrawler {
    config: CrawlConfig,
    fetcher: Arc<HttpFetcher>,
    renderer: Option<Arc<JsRenderer>>,
    store: Option<(Arc<dyn BlobStore>, CrawlScope)>,
}

impl SiteCrawler {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        config.validate()?;
        let client_type = if config.browser_emulation {
            ClientType::HeavyEmulation
        } else {
            ClientType::Standard
        };
        let client = create_client(client_type, &config.user_agent, config.request_timeout())?;
        Ok(Self {
            config,
            fetcher: Arc::new(HttpFetcher::new(client)),
            renderer: None,
            store: None,
        })
    }

    /// Attach the headless renderer. Without one, JS rendering modes
    /// degrade to static crawling.
    pub fn with_renderer(mut self, renderer: Arc<JsRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Store raw HTML for each crawled page under the given scope.
    pub fn with_store(mut self, store: Arc<dyn BlobStore>, scope: CrawlScope) -> Self {
        self.store = Some((store, scope));
        self
    }

    pub async fn crawl(
        &self,
        start_url: &Url,
        cancel_flag: Arc<AtomicBool>,
    ) -> Result<CrawlArtifact> {
        info!(
            "[CRAWL] Starting crawl of {} (max {} pages)",
            start_url, self.config.max_pages
        );

        let base_url = self.resolve_start_url(start_url).await;
        let base_host = base_url
            .host_str()
            .ok_or_else(|| AppError::invalid_input(format!("URL has no host: {base_url}")))?
            .to_string();

        let mut robots = RobotsPolicy::load(&self.fetcher, &base_url).await;
        robots.resolve_crawl_delay(&self.config.user_agent);

        let sitemap = load_sitemap(&self.fetcher, &base_url, robots.sitemap_urls()).await;

        let run = Arc::new(CrawlRun {
            config: self.config.clone(),
            fetcher: self.fetcher.clone(),
            renderer: self.renderer.clone(),
            store: self.store.clone(),
            robots,
            base_host,
            frontier: Frontier::new(),
            pacer: AdaptivePacer::new(&self.config),
            results: Mutex::new(Vec::new()),
            deferred_js: DashSet::new(),
            cancel_flag: cancel_flag.clone(),
        });

        run.frontier.enqueue(base_url.clone(), 0);
        let mut seeded = 0;
        for seed in &sitemap.urls {
            if seeded >= self.config.max_pages {
                break;
            }
            let Ok(url) = Url::parse(seed) else { continue };
            if crate::extractor::page::is_internal_host(url.host_str().unwrap_or(""), &run.base_host)
            {
                run.frontier.enqueue(url, 1);
                seeded += 1;
            }
        }
        if seeded > 0 {
            info!("[CRAWL] Seeded frontier with {} sitemap URLs", seeded);
        }

        let workers: Vec<_> = (0..self.config.concurrency)
            .map(|i| {
                let run = run.clone();
                tokio::spawn(async move { run.worker_loop(i).await })
            })
            .collect();
        futures::future::join_all(workers).await;

        if cancel_flag.load(Ordering::Relaxed) {
            if let Some(renderer) = &self.renderer {
                renderer.shutdown().await;
            }
            return Err(AppError::Cancelled);
        }

        // Second pass: re-render pages the SPA heuristic flagged.
        if self.config.js_rendering == JsRenderingMode::Auto && !run.deferred_js.is_empty() {
            run.rerender_deferred().await;
        }
        if let Some(renderer) = &self.renderer {
            renderer.shutdown().await;
        }

        let run = Arc::try_unwrap(run).map_err(|_| {
            AppError::Other(anyhow::anyhow!("crawl workers still hold run state"))
        })?;
        let pages = run.results.into_inner().expect("crawl results poisoned");
        let js_rendered = pages.iter().filter(|p| p.js_rendered).count();
        info!(
            "[CRAWL] Crawl complete: {} pages ({} JS-rendered)",
            pages.len(),
            js_rendered
        );

        Ok(CrawlArtifact {
            base_url: base_url.to_string(),
            pages,
            robots: run.robots.info().clone(),
            sitemap,
        })
    }

    /// Try the start URL and its www/non-www variant, adopting the
    /// redirect-resolved final URL.
    async fn resolve_start_url(&self, url: &Url) -> Url {
        let mut candidates = vec![url.clone()];
        if let Some(host) = url.host_str() {
            let alt_host = host
                .strip_prefix("www.")
                .map(str::to_string)
                .unwrap_or_else(|| format!("www.{host}"));
            let mut alt = url.clone();
            if alt.set_host(Some(&alt_host)).is_ok() {
                candidates.push(alt);
            }
        }

        for candidate in candidates {
            match self.fetcher.head(&candidate).await {
                Ok((_, final_url)) => {
                    if let Ok(resolved) = Url::parse(&final_url) {
                        if resolved != *url {
                            info!("[CRAWL] Resolved start URL {} -> {}", url, resolved);
                        }
                        return resolved;
                    }
                }
                Err(e) => debug!("[CRAWL] Start URL candidate {} failed: {}", candidate, e),
            }
        }
        url.clone()
    }
}

/// Shared state for one crawl's worker pool.
struct CrawlRun {
    config: CrawlConfig,
    fetcher: Arc<HttpFetcher>,
    renderer: Option<Arc<JsRenderer>>,
    store: Option<(Arc<dyn BlobStore>, CrawlScope)>,
    robots: RobotsPolicy,
    base_host: String,
    frontier: Frontier,
    pacer: AdaptivePacer,
    results: Mutex<Vec<PageRecord>>,
    deferred_js: DashSet<String>,
    cancel_flag: Arc<AtomicBool>,
}

impl CrawlRun {
    async fn worker_loop(self: Arc<Self>, worker: usize) {
        loop {
            if self.cancel_flag.load(Ordering::Relaxed) {
                warn!("[CRAWL] worker-{} exiting: crawl cancelled", worker);
                self.frontier.close();
                break;
            }
            let Some((url, depth)) = self.frontier.next().await else {
                break;
            };

            if self.page_count() >= self.config.max_pages {
                self.frontier.close();
                self.frontier.task_done();
                continue;
            }
            if depth > self.config.max_depth {
                debug!("[CRAWL] Discarding {} (depth {} beyond cap)", url, depth);
                self.frontier.task_done();
                continue;
            }
            if self.config.respect_robots_txt
                && !self.robots.allowed(url.as_str(), &self.config.user_agent)
            {
                debug!("[CRAWL] Blocked by robots.txt: {}", url);
                self.frontier.task_done();
                continue;
            }

            let success = self.crawl_url(&url, depth).await;
            self.frontier.task_done();

            if success {
                self.pacer.record_success();
            } else {
                self.pacer.record_failure();
            }
            self.pacer.wait(self.robots.crawl_delay()).await;
        }
    }

    fn page_count(&self) -> usize {
        self.results.lock().expect("crawl results poisoned").len()
    }

    /// Crawl one URL. Returns false only for transient failures that should
    /// trigger backoff.
    async fn crawl_url(&self, url: &Url, depth: u32) -> bool {
        if self.config.js_rendering == JsRenderingMode::Always {
            if let Some(renderer) = self.renderer.clone() {
                return self.crawl_url_with_js(&renderer, url, depth).await;
            }
        }

        let response = match self.fetcher.fetch(url).await {
            Ok(response) => response,
            Err(FetchError::ContentTooLarge { limit }) => {
                // Unparsable, but not a server problem; no backoff.
                self.push_page(PageRecord::error_page(
                    url.as_str(),
                    depth,
                    0,
                    0,
                    format!("Response body exceeded {limit} bytes"),
                ));
                return true;
            }
            Err(FetchError::Timeout) => {
                warn!("[CRAWL] Timeout: {}", url);
                self.push_page(PageRecord::error_page(
                    url.as_str(),
                    depth,
                    0,
                    self.config.request_timeout_ms,
                    "Request timed out",
                ));
                return false;
            }
            Err(e) => {
                warn!("[CRAWL] Error crawling {}: {}", url, e);
                self.push_page(PageRecord::error_page(url.as_str(), depth, 0, 0, e.to_string()));
                return false;
            }
        };

        if matches!(response.status, 429 | 503) {
            warn!("[CRAWL] Rate limited ({}): {}", response.status, url);
            self.push_page(PageRecord::error_page(
                url.as_str(),
                depth,
                response.status,
                response.load_time_ms,
                format!("Rate limited: {}", response.status),
            ));
            return false;
        }

        if !response.is_html() {
            debug!(
                "[CRAWL] Skipping non-HTML: {} ({})",
                url,
                response.content_type()
            );
            return true;
        }

        let final_url = Url::parse(&response.final_url).unwrap_or_else(|_| url.clone());
        let mut page = extract_page(&ExtractRequest {
            url: url.as_str(),
            final_url: &final_url,
            status_code: response.status,
            headers: &response.headers,
            body: &response.body,
            load_time_ms: response.load_time_ms,
            depth,
            crawled_at: Utc::now(),
        });

        if self.config.js_rendering == JsRenderingMode::Auto && self.renderer.is_some() {
            let (needs_js, reason) = needs_js_rendering(
                page.word_count,
                self.config.js_min_word_count_threshold,
                &response.body,
            );
            if needs_js {
                debug!("[CRAWL] Page needs JS rendering: {} - {}", url, reason);
                self.deferred_js.insert(url.to_string());
                let detection = detect_spa_from_html(&response.body);
                page.spa_detected = detection.is_spa;
                page.framework_detected = detection.framework;
            }
        }

        self.store_html(&mut page, &response.body).await;
        let links: Vec<String> = page.internal_links.iter().map(|l| l.url.clone()).collect();
        self.push_page(page);

        for link in links {
            if let Ok(link_url) = Url::parse(&link) {
                self.frontier.enqueue(link_url, depth + 1);
            }
        }

        true
    }

    async fn crawl_url_with_js(&self, renderer: &JsRenderer, url: &Url, depth: u32) -> bool {
        let rendered = renderer.render(url.as_str()).await;
        if !rendered.success {
            let mut page = PageRecord::error_page(
                url.as_str(),
                depth,
                0,
                rendered.load_time_ms,
                rendered.errors.join("; "),
            );
            page.js_rendered = true;
            self.push_page(page);
            return false;
        }

        let mut page = self.extract_rendered(url.as_str(), depth, &rendered, &Default::default());
        self.store_html(&mut page, &rendered.html).await;
        let links: Vec<String> = page.internal_links.iter().map(|l| l.url.clone()).collect();
        self.push_page(page);
        for link in links {
            if let Ok(link_url) = Url::parse(&link) {
                self.frontier.enqueue(link_url, depth + 1);
            }
        }
        true
    }

    /// Re-render deferred pages and replace their records by URL.
    async fn rerender_deferred(&self) {
        let Some(renderer) = self.renderer.clone() else {
            return;
        };
        let urls: Vec<String> = self.deferred_js.iter().map(|u| u.key().clone()).collect();
        info!("[CRAWL] Re-rendering {} pages with JS", urls.len());

        for (i, batch) in urls.chunks(JS_RERENDER_BATCH).enumerate() {
            if self.cancel_flag.load(Ordering::Relaxed) {
                return;
            }
            let rendered = renderer.render_batch(batch).await;
            for result in rendered {
                if !result.success {
                    debug!(
                        "[CRAWL] JS re-render failed for {}: {:?}",
                        result.url, result.errors
                    );
                    continue;
                }
                let existing = {
                    let results = self.results.lock().expect("crawl results poisoned");
                    results.iter().find(|p| p.url == result.url).cloned()
                };
                let Some(existing) = existing else { continue };

                let mut page =
                    self.extract_rendered(&result.url, existing.depth, &result, &existing.response_headers);
                page.raw_html_key = existing.raw_html_key.clone();
                self.store_html(&mut page, &result.html).await;

                debug!(
                    "[CRAWL] JS rendered: {} (word count: {} -> {})",
                    result.url, existing.word_count, page.word_count
                );
                let mut results = self.results.lock().expect("crawl results poisoned");
                replace_page(&mut results, page);
            }
            if (i + 1) * JS_RERENDER_BATCH < urls.len() {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }

    fn extract_rendered(
        &self,
        url: &str,
        depth: u32,
        rendered: &RenderedPage,
        headers: &std::collections::HashMap<String, String>,
    ) -> PageRecord {
        let final_url =
            Url::parse(&rendered.final_url).unwrap_or_else(|_| Url::parse(url).expect("crawled URL is valid"));
        let mut page = extract_page(&ExtractRequest {
            url,
            final_url: &final_url,
            status_code: rendered.status_code,
            headers,
            body: &rendered.html,
            load_time_ms: rendered.load_time_ms,
            depth,
            crawled_at: Utc::now(),
        });
        page.js_rendered = true;
        page.js_render_time_ms = rendered.render_time_ms;
        page.spa_detected = rendered.spa_detected;
        page.framework_detected = rendered.framework_detected.clone();
        page
    }

    async fn store_html(&self, page: &mut PageRecord, html: &str) {
        if !self.config.store_html {
            return;
        }
        let Some((store, scope)) = &self.store else {
            return;
        };
        let key = page
            .raw_html_key
            .clone()
            .unwrap_or_else(|| StoragePaths::page_html(scope, &url_hash(&page.url)));
        let metadata = std::collections::HashMap::from([
            ("url".to_string(), page.url.clone()),
            ("crawled_at".to_string(), page.crawled_at.to_rfc3339()),
        ]);
        match store.put(&key, html.as_bytes(), "text/html", &metadata).await {
            Ok(()) => page.raw_html_key = Some(key),
            Err(e) => warn!("[CRAWL] Failed to store HTML for {}: {}", page.url, e),
        }
    }

    fn push_page(&self, page: PageRecord) {
        let mut results = self.results.lock().expect("crawl results poisoned");
        if results.len() < self.config.max_pages {
            results.push(page);
        }
    }
}

/// Replace the record with the same URL, or append when absent.
fn replace_page(pages: &mut Vec<PageRecord>, page: PageRecord) {
    match pages.iter_mut().find(|p| p.url == page.url) {
        Some(slot) => *slot = page,
        None => pages.push(page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::page::PageRecord;

    fn page(url: &str, word_count: usize) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            final_url: url.to_string(),
            status_code: 200,
            word_count,
            ..PageRecord::default()
        }
    }

    #[test]
    fn replace_page_swaps_by_url() {
        let mut pages = vec![page("https://a.com/", 40), page("https://a.com/b", 100)];
        let mut rendered = page("https://a.com/", 1200);
        rendered.js_rendered = true;

        replace_page(&mut pages, rendered);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].word_count, 1200);
        assert!(pages[0].js_rendered);
    }

    #[test]
    fn replace_page_appends_unknown_url() {
        let mut pages = vec![page("https://a.com/", 40)];
        replace_page(&mut pages, page("https://a.com/new", 10));
        assert_eq!(pages.len(), 2);
    }

    mod crawling {
        use super::*;
        use mockito::Server;

        async fn crawl_with(
            server: &Server,
            config: CrawlConfig,
        ) -> crate::error::Result<CrawlArtifact> {
            let crawler = SiteCrawler::new(config).unwrap();
            let url = Url::parse(&server.url()).unwrap();
            crawler.crawl(&url, Arc::new(AtomicBool::new(false))).await
        }

        fn fast_config() -> CrawlConfig {
            CrawlConfig {
                max_pages: 10,
                concurrency: 2,
                request_delay_ms: 0,
                min_delay_ms: 0,
                store_html: false,
                js_rendering: JsRenderingMode::Off,
                request_timeout_ms: 5_000,
                ..CrawlConfig::default()
            }
        }

        #[tokio::test]
        async fn crawls_linked_pages_and_builds_artifact() {
            let mut server = Server::new_async().await;
            let _robots = server
                .mock("GET", "/robots.txt")
                .with_status(200)
                .with_body("User-agent: *\nAllow: /\n")
                .create_async()
                .await;
            let _sitemap = server
                .mock("GET", "/sitemap.xml")
                .with_status(404)
                .create_async()
                .await;
            let _home = server
                .mock("GET", "/")
                .with_status(200)
                .with_header("content-type", "text/html")
                .with_body(r#"<html><head><title>Home</title></head><body><a href="/about">About us</a></body></html>"#)
                .expect_at_least(1)
                .create_async()
                .await;
            let _about = server
                .mock("GET", "/about")
                .with_status(200)
                .with_header("content-type", "text/html")
                .with_body(r#"<html><head><title>About</title></head><body><p>Hello</p></body></html>"#)
                .create_async()
                .await;

            let artifact = crawl_with(&server, fast_config()).await.unwrap();

            assert_eq!(artifact.pages.len(), 2);
            assert!(artifact.robots.exists);
            assert!(!artifact.sitemap.exists);
            let about = artifact
                .pages
                .iter()
                .find(|p| p.url.ends_with("/about"))
                .unwrap();
            assert_eq!(about.depth, 1);
            assert_eq!(about.title.as_deref(), Some("About"));
        }

        #[tokio::test]
        async fn max_pages_one_crawls_only_the_homepage() {
            let mut server = Server::new_async().await;
            let _robots = server
                .mock("GET", "/robots.txt")
                .with_status(404)
                .create_async()
                .await;
            let _sitemap = server
                .mock("GET", "/sitemap.xml")
                .with_status(404)
                .create_async()
                .await;
            let _home = server
                .mock("GET", "/")
                .with_status(200)
                .with_header("content-type", "text/html")
                .with_body(r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#)
                .expect_at_least(1)
                .create_async()
                .await;

            let config = CrawlConfig {
                max_pages: 1,
                ..fast_config()
            };
            let artifact = crawl_with(&server, config).await.unwrap();
            assert_eq!(artifact.pages.len(), 1);
            assert_eq!(artifact.pages[0].depth, 0);
        }

        #[tokio::test]
        async fn robots_disallow_all_yields_zero_pages() {
            let mut server = Server::new_async().await;
            let _robots = server
                .mock("GET", "/robots.txt")
                .with_status(200)
                .with_body("User-agent: *\nDisallow: /\n")
                .create_async()
                .await;
            let _sitemap = server
                .mock("GET", "/sitemap.xml")
                .with_status(404)
                .create_async()
                .await;

            let artifact = crawl_with(&server, fast_config()).await.unwrap();
            assert!(artifact.pages.is_empty());
            assert!(artifact.robots.exists);
        }

        #[tokio::test]
        async fn transient_error_pages_are_recorded_with_status_zero() {
            let mut server = Server::new_async().await;
            let _robots = server
                .mock("GET", "/robots.txt")
                .with_status(404)
                .create_async()
                .await;
            let _sitemap = server
                .mock("GET", "/sitemap.xml")
                .with_status(404)
                .create_async()
                .await;
            let _home = server
                .mock("GET", "/")
                .with_status(200)
                .with_header("content-type", "text/html")
                .with_body(r#"<html><body><a href="/gone">gone</a></body></html>"#)
                .expect_at_least(1)
                .create_async()
                .await;
            let _gone = server
                .mock("GET", "/gone")
                .with_status(503)
                .create_async()
                .await;

            let config = CrawlConfig {
                max_delay_ms: 10,
                ..fast_config()
            };
            let artifact = crawl_with(&server, config).await.unwrap();
            let gone = artifact
                .pages
                .iter()
                .find(|p| p.url.ends_with("/gone"))
                .unwrap();
            assert_eq!(gone.status_code, 503);
            assert!(!gone.errors.is_empty());
        }
    }
}
