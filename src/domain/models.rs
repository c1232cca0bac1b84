//! Audit, plan, and pipeline domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// SEVERITY & CATEGORY
// ============================================================================

/// Severity of a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
        }
    }

    /// Score penalty weight. Severities outside the weighted set count as low.
    pub fn weight(&self) -> u32 {
        match self {
            Self::Critical => 10,
            Self::High => 5,
            Self::Medium => 2,
            Self::Low | Self::Info => 1,
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "info" => Ok(Self::Info),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The ten check categories, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Crawlability,
    OnPage,
    Performance,
    UrlStructure,
    InternalLinking,
    Content,
    StructuredData,
    Security,
    Mobile,
    Server,
}

impl Category {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Crawlability => "Crawlability & Indexability",
            Self::OnPage => "On-Page SEO",
            Self::Performance => "Technical Performance",
            Self::UrlStructure => "URL Structure",
            Self::InternalLinking => "Internal Linking",
            Self::Content => "Content Quality",
            Self::StructuredData => "Structured Data",
            Self::Security => "Security & Accessibility",
            Self::Mobile => "Mobile Optimization",
            Self::Server => "Server & Infrastructure",
        }
    }

    pub fn all() -> [Category; 10] {
        [
            Self::Crawlability,
            Self::OnPage,
            Self::Performance,
            Self::UrlStructure,
            Self::InternalLinking,
            Self::Content,
            Self::StructuredData,
            Self::Security,
            Self::Mobile,
            Self::Server,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// CHECK RESULTS & AUDIT OUTPUT
// ============================================================================

/// Result of one audit check. Constructed once by the engine, immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_id: u8,
    pub category: Category,
    pub check_name: String,
    pub passed: bool,
    pub severity: Severity,
    pub affected_count: usize,
    /// Sample of affected URLs, truncated to 50.
    pub affected_urls: Vec<String>,
    pub details: serde_json::Value,
    pub recommendation: String,
}

/// Histograms and counts over a full check run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub issues_by_severity: BTreeMap<String, usize>,
    pub issues_by_category: BTreeMap<String, usize>,
}

/// Output of the audit engine: exactly one result per registered check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditOutput {
    pub score: u32,
    pub results: Vec<CheckResult>,
    pub summary: AuditSummary,
}

impl AuditOutput {
    /// Failed checks converted to the issue shape consumed by the plan,
    /// the reports, and the repository.
    pub fn issues(&self) -> Vec<IssueSummary> {
        self.results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| IssueSummary {
                check_id: r.check_id,
                category: r.category,
                severity: r.severity,
                title: r.check_name.clone(),
                description: r.recommendation.clone(),
                suggested_fix: r.recommendation.clone(),
                affected_urls: r.affected_urls.iter().take(10).cloned().collect(),
                affected_count: r.affected_count,
            })
            .collect()
    }
}

/// A failed check flattened into an actionable issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSummary {
    pub check_id: u8,
    pub category: Category,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub suggested_fix: String,
    pub affected_urls: Vec<String>,
    pub affected_count: usize,
}

// ============================================================================
// KEYWORDS
// ============================================================================

/// A keyword from the research provider (or a bare seed keyword).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Keyword {
    pub text: String,
    pub search_volume: Option<u64>,
    pub difficulty: Option<f64>,
    pub intent: Option<String>,
}

impl Keyword {
    pub fn seed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Ranking key for the content phase: volume over difficulty.
    pub fn opportunity(&self) -> f64 {
        self.search_volume.unwrap_or(0) as f64 / self.difficulty.unwrap_or(1.0).max(1.0)
    }
}

/// Keywords grouped by search intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCluster {
    pub name: String,
    pub intent: String,
    pub keywords: Vec<String>,
    pub total_volume: u64,
}

// ============================================================================
// PLAN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Technical,
    Content,
    Template,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Content => "content",
            Self::Template => "template",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl Effort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// One scheduled task in the improvement plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanItem {
    pub phase: u8,
    pub phase_name: String,
    pub week_start: u32,
    pub week_end: u32,
    pub priority: usize,
    pub task: String,
    pub description: String,
    pub kind: TaskKind,
    pub effort: Effort,
    pub expected_impact: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default)]
    pub affected_pages: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_volume: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

/// One planned content piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub week: u32,
    pub title: String,
    pub content_type: String,
    pub target_keywords: Vec<String>,
    #[serde(default)]
    pub search_volume: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseOverview {
    pub number: u8,
    pub name: String,
    pub weeks: String,
    pub focus: String,
    pub tasks: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSummary {
    pub current_score: u32,
    pub plan_duration_weeks: u32,
    pub total_action_items: usize,
    pub technical_tasks: usize,
    pub content_tasks: usize,
    pub content_pieces_planned: usize,
    pub templates_analyzed: usize,
    pub keywords_researched: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phases: Vec<PhaseOverview>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expected_outcomes: Vec<String>,
}

/// Full improvement plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoPlan {
    pub summary: PlanSummary,
    pub action_plan: Vec<PlanItem>,
    pub content_calendar: Vec<ContentItem>,
    pub keyword_clusters: Vec<KeywordCluster>,
}

// ============================================================================
// BRIEFS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineSection {
    pub heading: String,
    pub key_points: Vec<String>,
}

/// A content brief for one planned article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBrief {
    pub keyword: String,
    pub intent: String,
    pub content_type: String,
    pub search_volume: u64,
    pub title_suggestions: Vec<String>,
    pub meta_description: String,
    pub target_word_count: u32,
    pub content_outline: Vec<OutlineSection>,
    pub keywords_to_include: Vec<String>,
    pub differentiation_angle: String,
    pub cta_suggestions: Vec<String>,
}

// ============================================================================
// REPORTS & PIPELINE RECORD
// ============================================================================

/// A rendered brief ready for upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedBrief {
    pub keyword: String,
    pub slug: String,
    pub content: String,
}

/// The four markdown documents produced per run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportBundle {
    pub executive_md: String,
    pub technical_md: String,
    pub action_md: String,
    pub page_fixes_md: String,
    pub briefs: Vec<RenderedBrief>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Completed,
    Failed,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSummary {
    pub score: u32,
    pub pages_crawled: usize,
    pub sitemap_urls: usize,
    pub checks_run: usize,
    pub issues_found: usize,
    pub templates_identified: usize,
    pub keywords_found: usize,
    pub action_items: usize,
    pub content_pieces_planned: usize,
    pub briefs_generated: usize,
    pub warnings: Vec<String>,
}

/// Terminal record returned by the pipeline. The pipeline never propagates
/// an error past its boundary; failures land here with `status == Failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub report_id: String,
    pub url: String,
    pub status: PipelineStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub score: u32,
    pub pages_crawled: usize,
    pub checks_run: usize,
    pub issues_count: usize,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub file_urls: BTreeMap<String, String>,
    pub summary: PipelineSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_round_trips_through_str() {
        for sev in [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
            Severity::Info,
        ] {
            assert_eq!(sev.as_str().parse::<Severity>().unwrap(), sev);
        }
    }

    #[test]
    fn severity_weights_match_scoring_table() {
        assert_eq!(Severity::Critical.weight(), 10);
        assert_eq!(Severity::High.weight(), 5);
        assert_eq!(Severity::Medium.weight(), 2);
        assert_eq!(Severity::Low.weight(), 1);
        assert_eq!(Severity::Info.weight(), 1);
    }

    #[test]
    fn all_ten_categories_have_distinct_names() {
        let names: std::collections::HashSet<_> =
            Category::all().iter().map(|c| c.display_name()).collect();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn keyword_opportunity_guards_against_zero_difficulty() {
        let kw = Keyword {
            text: "hotels".to_string(),
            search_volume: Some(1000),
            difficulty: Some(0.0),
            intent: None,
        };
        assert_eq!(kw.opportunity(), 1000.0);
    }
}
