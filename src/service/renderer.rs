//! Headless rendering through chromiumoxide.
//!
//! One browser process serves the whole crawl; concurrent renders are
//! bounded by a semaphore sized `min(concurrency, 3)`. The handler task
//! must be aborted when the browser goes away or it runs forever. A
//! crashed browser is relaunched at most `MAX_RESTARTS` times, after which
//! rendering is disabled for the rest of the run.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CrawlConfig;
use crate::service::spa::detect_spa_from_html;

const MAX_RESTARTS: u32 = 3;
const MAX_BROWSER_PAGES: usize = 3;

/// Browser-side framework probe, evaluated after the page settles.
const FRAMEWORK_PROBE: &str = r#"(() => {
    if (window.React || document.querySelector('[data-reactroot]') ||
        document.querySelector('[data-reactid]') || window.__REACT_DEVTOOLS_GLOBAL_HOOK__) {
        return 'react';
    }
    if (window.Vue || window.__VUE__) { return 'vue'; }
    if (window.angular || window.ng || document.querySelector('[ng-version]')) { return 'angular'; }
    if (window.__NEXT_DATA__ || document.querySelector('#__next')) { return 'nextjs'; }
    if (window.__NUXT__ || document.querySelector('#__nuxt')) { return 'nuxt'; }
    if (document.querySelector('[class*="svelte-"]')) { return 'svelte'; }
    if (window.___gatsby) { return 'gatsby'; }
    if (window.Ember || document.querySelector('[id^="ember"]')) { return 'ember'; }
    if (document.querySelector('#app') || document.querySelector('#root')) {
        if (document.body.innerHTML.length < 500 && document.querySelectorAll('script').length > 3) {
            return 'unknown-spa';
        }
    }
    return '';
})()"#;

/// Result of rendering one page. Failures are results, never panics.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub final_url: String,
    pub status_code: u16,
    pub html: String,
    pub load_time_ms: u64,
    pub render_time_ms: u64,
    pub spa_detected: bool,
    pub framework_detected: Option<String>,
    pub errors: Vec<String>,
    pub success: bool,
}

impl RenderedPage {
    fn failure(url: &str, load_time_ms: u64, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            final_url: url.to_string(),
            status_code: 0,
            html: String::new(),
            load_time_ms,
            render_time_ms: 0,
            spa_detected: false,
            framework_detected: None,
            errors: vec![error.into()],
            success: false,
        }
    }
}

struct BrowserHandle {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserHandle {
    async fn shutdown(mut self) {
        self.handler.abort();
        if let Err(e) = self.browser.close().await {
            debug!("[RENDERER] Browser close error: {}", e);
        }
        let _ = self.browser.wait().await;
    }
}

/// Persistent headless browser pool for one pipeline run.
pub struct JsRenderer {
    user_agent: String,
    timeout: Duration,
    wait_after_load: Duration,
    permits: Arc<Semaphore>,
    state: Mutex<Option<BrowserHandle>>,
    restarts: AtomicU32,
    disabled: AtomicBool,
}

impl JsRenderer {
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_millis(config.js_timeout_ms),
            wait_after_load: Duration::from_millis(config.js_wait_after_load_ms),
            permits: Arc::new(Semaphore::new(config.concurrency.min(MAX_BROWSER_PAGES))),
            state: Mutex::new(None),
            restarts: AtomicU32::new(0),
            disabled: AtomicBool::new(false),
        }
    }

    /// Render one URL. Never fails the pool: errors come back as an
    /// unsuccessful `RenderedPage`.
    pub async fn render(&self, url: &str) -> RenderedPage {
        if self.disabled.load(Ordering::Acquire) {
            return RenderedPage::failure(url, 0, "Renderer disabled after repeated crashes");
        }

        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .expect("renderer semaphore closed");

        let start = Instant::now();
        let page = match self.checkout_page().await {
            Ok(page) => page,
            Err(e) => {
                return RenderedPage::failure(
                    url,
                    start.elapsed().as_millis() as u64,
                    format!("Browser unavailable: {e:#}"),
                )
            }
        };

        let result = tokio::time::timeout(self.timeout, self.render_on(&page, url, start)).await;
        if let Err(e) = page.close().await {
            debug!("[RENDERER] Page close error for {}: {}", url, e);
        }

        match result {
            Ok(rendered) => rendered,
            Err(_) => RenderedPage::failure(
                url,
                self.timeout.as_millis() as u64,
                "Timeout waiting for page to load",
            ),
        }
    }

    /// Render several URLs, bounded by the pool's permit count.
    pub async fn render_batch(&self, urls: &[String]) -> Vec<RenderedPage> {
        futures::future::join_all(urls.iter().map(|url| self.render(url))).await
    }

    /// Tear down the browser. Safe to call repeatedly; the renderer can be
    /// restarted by the next `render` call.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.state.lock().await.take() {
            info!("[RENDERER] Shutting down browser");
            handle.shutdown().await;
        }
    }

    async fn render_on(&self, page: &Page, url: &str, start: Instant) -> RenderedPage {
        let render_start = Instant::now();

        let navigated = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        }
        .await;

        if let Err(e) = navigated {
            return RenderedPage::failure(
                url,
                start.elapsed().as_millis() as u64,
                format!("Navigation failed: {e}"),
            );
        }

        // Let client-side rendering settle.
        if !self.wait_after_load.is_zero() {
            tokio::time::sleep(self.wait_after_load).await;
        }
        let render_time_ms = render_start.elapsed().as_millis() as u64;

        let html = match page.content().await {
            Ok(html) => html,
            Err(e) => {
                return RenderedPage::failure(
                    url,
                    start.elapsed().as_millis() as u64,
                    format!("Could not read DOM: {e}"),
                )
            }
        };

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        let probed: Option<String> = match page.evaluate(FRAMEWORK_PROBE).await {
            Ok(value) => value.into_value().ok(),
            Err(e) => {
                debug!("[RENDERER] Framework probe failed for {}: {}", url, e);
                None
            }
        };
        let framework = probed
            .filter(|f| !f.is_empty())
            .or_else(|| detect_spa_from_html(&html).framework);

        RenderedPage {
            url: url.to_string(),
            final_url,
            status_code: 200,
            html,
            load_time_ms: start.elapsed().as_millis() as u64,
            render_time_ms,
            spa_detected: framework.is_some(),
            framework_detected: framework,
            errors: Vec::new(),
            success: true,
        }
    }

    /// Create a fresh page, relaunching a crashed browser within the
    /// restart budget.
    async fn checkout_page(&self) -> anyhow::Result<Page> {
        let mut guard = self.state.lock().await;

        if guard.is_none() {
            *guard = Some(self.launch().await?);
        }

        let handle = guard.as_ref().expect("browser handle present");
        match handle.browser.new_page("about:blank").await {
            Ok(page) => Ok(page),
            Err(e) => {
                warn!("[RENDERER] Browser crashed ({}), attempting relaunch", e);
                if let Some(dead) = guard.take() {
                    dead.shutdown().await;
                }
                let attempt = self.restarts.fetch_add(1, Ordering::AcqRel) + 1;
                if attempt > MAX_RESTARTS {
                    self.disabled.store(true, Ordering::Release);
                    anyhow::bail!("renderer disabled after {MAX_RESTARTS} restarts");
                }
                let relaunched = self.launch().await?;
                let page = relaunched.browser.new_page("about:blank").await?;
                *guard = Some(relaunched);
                Ok(page)
            }
        }
    }

    async fn launch(&self) -> anyhow::Result<BrowserHandle> {
        info!("[RENDERER] Launching headless browser");
        let config = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080)
            .arg(format!("--user-agent={}", self.user_agent))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--mute-audio")
            .arg("--hide-scrollbars")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to launch browser: {e}"))?;

        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("[RENDERER] Browser handler error: {:?}", e);
                }
            }
            debug!("[RENDERER] Browser event handler task completed");
        });

        Ok(BrowserHandle {
            browser,
            handler: handler_task,
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_result_carries_error_and_flags() {
        let rendered = RenderedPage::failure("https://example.com/", 1200, "Navigation failed");
        assert!(!rendered.success);
        assert_eq!(rendered.status_code, 0);
        assert_eq!(rendered.errors.len(), 1);
        assert_eq!(rendered.final_url, "https://example.com/");
    }

    #[test]
    fn pool_size_is_capped_at_three() {
        let config = CrawlConfig {
            concurrency: 8,
            ..CrawlConfig::default()
        };
        let renderer = JsRenderer::new(&config);
        assert_eq!(renderer.permits.available_permits(), 3);
    }

    #[tokio::test]
    async fn disabled_renderer_short_circuits() {
        let renderer = JsRenderer::new(&CrawlConfig::default());
        renderer.disabled.store(true, Ordering::Release);
        let result = renderer.render("https://example.com/").await;
        assert!(!result.success);
        assert!(result.errors[0].contains("disabled"));
    }
}
