//! Adaptive request pacing.
//!
//! Successful requests walk the delay back toward the minimum; transient
//! failures (timeouts, 429, 5xx) back off exponentially from the configured
//! base delay. The effective sleep is never below a robots.txt crawl-delay.

use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::config::CrawlConfig;

#[derive(Debug)]
struct PacerState {
    current_delay_ms: f64,
    consecutive_errors: u32,
}

/// Shared pacing state for one crawl's worker pool.
#[derive(Debug)]
pub struct AdaptivePacer {
    base_delay_ms: f64,
    min_delay_ms: f64,
    max_delay_ms: f64,
    backoff_multiplier: f64,
    adaptive: bool,
    state: Mutex<PacerState>,
}

impl AdaptivePacer {
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            base_delay_ms: config.request_delay_ms as f64,
            min_delay_ms: config.min_delay_ms as f64,
            max_delay_ms: config.max_delay_ms as f64,
            backoff_multiplier: config.backoff_multiplier,
            adaptive: config.adaptive_delay,
            state: Mutex::new(PacerState {
                current_delay_ms: config.request_delay_ms as f64,
                consecutive_errors: 0,
            }),
        }
    }

    /// Gradually reduce the delay after a successful request.
    pub fn record_success(&self) {
        if !self.adaptive {
            return;
        }
        let mut state = self.state.lock().expect("pacer state poisoned");
        state.consecutive_errors = 0;
        state.current_delay_ms =
            (state.current_delay_ms / self.backoff_multiplier).max(self.min_delay_ms);
    }

    /// Exponential backoff from the base delay after a transient failure.
    pub fn record_failure(&self) {
        if !self.adaptive {
            return;
        }
        let mut state = self.state.lock().expect("pacer state poisoned");
        state.consecutive_errors += 1;
        let backoff = self.backoff_multiplier.powi(state.consecutive_errors as i32);
        state.current_delay_ms = (self.base_delay_ms * backoff).min(self.max_delay_ms);
        debug!(
            "[PACER] Backing off: delay {}ms after {} consecutive errors",
            state.current_delay_ms as u64, state.consecutive_errors
        );
    }

    /// Current delay, floored by any robots.txt crawl-delay (seconds).
    pub fn effective_delay_ms(&self, robots_crawl_delay: Option<f64>) -> u64 {
        let current = self
            .state
            .lock()
            .expect("pacer state poisoned")
            .current_delay_ms;
        let robots_ms = robots_crawl_delay.map(|s| s * 1000.0).unwrap_or(0.0);
        current.max(robots_ms) as u64
    }

    /// Sleep for the effective delay before the next request.
    pub async fn wait(&self, robots_crawl_delay: Option<f64>) {
        let delay = self.effective_delay_ms(robots_crawl_delay);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}
