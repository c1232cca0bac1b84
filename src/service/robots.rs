//! robots.txt policy.
//!
//! Fetched once per run with a short timeout. A missing or unfetchable
//! robots.txt means "no policy": everything is allowed. Matching is
//! delegated to the `robotstxt` port of Google's matcher; crawl-delay and
//! `Sitemap:` lines are read by hand since the matcher does not expose them.

use robotstxt::DefaultMatcher;
use tracing::{debug, info};
use url::Url;

use crate::domain::page::RobotsInfo;
use crate::service::http::HttpFetcher;

const ROBOTS_TXT_PATH: &str = "robots.txt";

/// Immutable robots.txt state for one crawl.
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    info: RobotsInfo,
}

impl RobotsPolicy {
    /// Fetch and parse `/robots.txt`. Network failure is treated as absence.
    pub async fn load(fetcher: &HttpFetcher, base_url: &Url) -> Self {
        let robots_url = match base_url.join(ROBOTS_TXT_PATH) {
            Ok(url) => url,
            Err(_) => return Self::default(),
        };

        match fetcher.fetch(&robots_url).await {
            Ok(resp) if resp.status == 200 => {
                info!("[ROBOTS] Loaded robots.txt from {}", robots_url);
                Self::parse(robots_url.as_str(), Some(resp.body))
            }
            Ok(resp) => {
                debug!("[ROBOTS] {} returned {}", robots_url, resp.status);
                Self::parse(robots_url.as_str(), None)
            }
            Err(e) => {
                debug!("[ROBOTS] Could not fetch robots.txt: {}", e);
                Self::parse(robots_url.as_str(), None)
            }
        }
    }

    /// Build a policy from an already-fetched body (None means absent).
    pub fn parse(robots_url: &str, content: Option<String>) -> Self {
        let mut info = RobotsInfo {
            exists: content.is_some(),
            url: robots_url.to_string(),
            ..RobotsInfo::default()
        };

        if let Some(body) = &content {
            info.sitemap_urls = body
                .lines()
                .filter_map(|line| {
                    let line = line.trim();
                    line.to_ascii_lowercase()
                        .starts_with("sitemap:")
                        .then(|| line[8..].trim().to_string())
                })
                .filter(|s| !s.is_empty())
                .collect();
        }
        info.content = content;

        Self { info }
    }

    /// Bind the crawl-delay for a specific user agent. Kept separate from
    /// `parse` so the policy itself stays agent-independent.
    pub fn resolve_crawl_delay(&mut self, user_agent: &str) {
        self.info.crawl_delay = self
            .info
            .content
            .as_deref()
            .and_then(|body| extract_crawl_delay(body, user_agent));
    }

    /// Whether the policy permits fetching `url` as `agent`. Total: absence
    /// of robots.txt allows everything.
    pub fn allowed(&self, url: &str, agent: &str) -> bool {
        match self.info.content.as_deref() {
            Some(body) => DefaultMatcher::default().one_agent_allowed_by_robots(body, agent, url),
            None => true,
        }
    }

    /// Crawl-delay in seconds, if declared for our agent or the wildcard.
    pub fn crawl_delay(&self) -> Option<f64> {
        self.info.crawl_delay
    }

    pub fn sitemap_urls(&self) -> &[String] {
        &self.info.sitemap_urls
    }

    pub fn exists(&self) -> bool {
        self.info.exists
    }

    pub fn info(&self) -> &RobotsInfo {
        &self.info
    }
}

/// The effective crawl-delay is the larger of the agent-specific value and
/// any wildcard value.
fn extract_crawl_delay(body: &str, user_agent: &str) -> Option<f64> {
    let agent_lower = user_agent.to_ascii_lowercase();
    let mut current_agent: Option<String> = None;
    let mut agent_delay: Option<f64> = None;
    let mut wildcard_delay: Option<f64> = None;

    for line in body.lines() {
        let line = line.trim().to_ascii_lowercase();
        if let Some(agent) = line.strip_prefix("user-agent:") {
            current_agent = Some(agent.trim().to_string());
        } else if let Some(value) = line.strip_prefix("crawl-delay:") {
            let Some(agent) = current_agent.as_deref() else {
                continue;
            };
            let Ok(delay) = value.trim().parse::<f64>() else {
                continue;
            };
            if agent == "*" {
                wildcard_delay = Some(delay);
            } else if agent_lower.contains(agent) {
                agent_delay = Some(delay);
            }
        }
    }

    match (agent_delay, wildcard_delay) {
        (Some(a), Some(w)) => Some(a.max(w)),
        (a, w) => a.or(w),
    }
}
