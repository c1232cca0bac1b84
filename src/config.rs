//! Crawl and pipeline configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AppError, Result};

pub const DEFAULT_USER_AGENT: &str =
    "SeoscopeBot/1.0 (+https://seoscope.dev/bot; respectful crawler)";

/// How the crawler uses the headless renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsRenderingMode {
    /// Never start a browser.
    Off,
    /// Render statically first, re-render pages the SPA heuristic flags.
    #[default]
    Auto,
    /// Render every page in the browser.
    Always,
}

/// Crawl configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub max_pages: usize,
    pub max_depth: u32,
    pub concurrency: usize,
    pub request_timeout_ms: u64,
    pub request_delay_ms: u64,
    pub store_html: bool,
    pub respect_robots_txt: bool,
    pub user_agent: String,
    /// Impersonate a desktop browser instead of sending the bot UA.
    pub browser_emulation: bool,

    pub adaptive_delay: bool,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,

    pub js_rendering: JsRenderingMode,
    pub js_wait_after_load_ms: u64,
    pub js_timeout_ms: u64,
    pub js_min_word_count_threshold: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 100,
            max_depth: 15,
            concurrency: 3,
            request_timeout_ms: 30_000,
            request_delay_ms: 500,
            store_html: true,
            respect_robots_txt: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browser_emulation: false,
            adaptive_delay: true,
            min_delay_ms: 200,
            max_delay_ms: 2_000,
            backoff_multiplier: 1.5,
            js_rendering: JsRenderingMode::Auto,
            js_wait_after_load_ms: 1_000,
            js_timeout_ms: 30_000,
            js_min_word_count_threshold: 50,
        }
    }
}

impl CrawlConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_pages < 1 {
            return Err(AppError::invalid_input("max_pages must be >= 1"));
        }
        if self.concurrency < 1 {
            return Err(AppError::invalid_input("concurrency must be >= 1"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(AppError::invalid_input("user_agent must not be empty"));
        }
        if self.backoff_multiplier <= 1.0 {
            return Err(AppError::invalid_input("backoff_multiplier must be > 1"));
        }
        Ok(())
    }
}

/// Options accepted by the pipeline entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub max_pages: usize,
    pub js_rendering: JsRenderingMode,
    pub generate_briefs: bool,
    pub plan_duration_weeks: u32,
    pub seed_keywords: Vec<String>,
    pub country: String,
    pub language: String,
    pub classify_templates: bool,
    pub keyword_research: bool,
    pub store_html: bool,
    pub tenant: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_pages: 100,
            js_rendering: JsRenderingMode::Auto,
            generate_briefs: true,
            plan_duration_weeks: 12,
            seed_keywords: Vec::new(),
            country: "ES".to_string(),
            language: "es".to_string(),
            classify_templates: true,
            keyword_research: true,
            store_html: true,
            tenant: None,
        }
    }
}

impl PipelineOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_pages < 1 {
            return Err(AppError::invalid_input("max_pages must be >= 1"));
        }
        if !(4..=52).contains(&self.plan_duration_weeks) {
            return Err(AppError::invalid_input(
                "plan_duration_weeks must be between 4 and 52",
            ));
        }
        Ok(())
    }

    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            max_pages: self.max_pages,
            js_rendering: self.js_rendering,
            store_html: self.store_html,
            ..CrawlConfig::default()
        }
    }
}
