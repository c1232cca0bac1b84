//! Optional external collaborators.
//!
//! Keyword research, pagespeed analysis, and LLM refinement are pluggable
//! and failure-tolerant: every stage that consumes one degrades when the
//! provider is `Disabled` or errors. Concrete vendor clients live outside
//! this crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::models::Keyword;
use crate::error::Result;

/// An optional dependency. `Disabled` is a first-class state, not a null.
pub enum Provider<T> {
    Enabled(T),
    Disabled,
}

impl<T> Provider<T> {
    pub fn enabled(value: T) -> Self {
        Self::Enabled(value)
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Enabled(value) => Some(value),
            Self::Disabled => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }
}

impl<T> Default for Provider<T> {
    fn default() -> Self {
        Self::Disabled
    }
}

/// Keyword research vendor.
#[async_trait]
pub trait KeywordProvider: Send + Sync {
    /// Keywords the domain already ranks or could rank for.
    async fn keywords_for_site(
        &self,
        domain: &str,
        country: &str,
        language: &str,
        limit: usize,
    ) -> Result<Vec<Keyword>>;

    /// Expansions of the given seed keywords.
    async fn related_keywords(
        &self,
        seeds: &[String],
        country: &str,
        language: &str,
        limit: usize,
    ) -> Result<Vec<Keyword>>;
}

/// Field metrics from a pagespeed vendor for one URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpeedMetrics {
    pub performance_score: Option<f64>,
    pub lcp_ms: Option<f64>,
    pub inp_ms: Option<f64>,
    pub cls: Option<f64>,
}

#[async_trait]
pub trait PagespeedProvider: Send + Sync {
    /// Analyze one URL with the given strategy ("mobile" or "desktop").
    async fn analyze(&self, url: &str, strategy: &str) -> Result<PageSpeedMetrics>;
}

/// One LLM-suggested priority action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityAction {
    pub issue: String,
    pub recommendation: String,
    #[serde(default)]
    pub estimated_impact: String,
}

/// LLM refinement output for the executive/audit reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmRecommendations {
    pub priority_issues: Vec<PriorityAction>,
    pub quick_wins: Vec<String>,
}

/// LLM-backed refiner. All methods are best-effort; callers fall back to
/// rule-based output on error.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Cheap availability probe, called once per run before any real work.
    async fn health_check(&self) -> bool;

    /// Supplement rule-based recommendations for the worst issues.
    async fn refine_recommendations(
        &self,
        site_url: &str,
        issues: &[crate::domain::models::IssueSummary],
    ) -> Result<LlmRecommendations>;

    /// Propose human names for heuristically grouped page templates.
    /// Input and output are `(template_id, suggested_name)` pairs.
    async fn name_templates(
        &self,
        site_url: &str,
        templates: &[(String, String)],
    ) -> Result<Vec<(String, String)>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_provider_yields_none() {
        let provider: Provider<u32> = Provider::Disabled;
        assert!(provider.get().is_none());
        assert!(!provider.is_enabled());
    }

    #[test]
    fn enabled_provider_exposes_value() {
        let provider = Provider::enabled(7u32);
        assert_eq!(provider.get(), Some(&7));
        assert!(provider.is_enabled());
    }
}
