//! The 100-check audit engine.
//!
//! The engine holds a sealed `CrawlArtifact` and dispatches an ordered
//! registry of check implementations, one `CheckResult` per check. A check
//! is a pure function over the artifact; a panicking check is recorded as
//! passed with a warning so one bad rule cannot mask the other 99.

pub mod checks;
pub mod scoring;

use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{info, warn};

use crate::domain::models::{AuditOutput, Category, CheckResult, Severity};
use crate::domain::page::CrawlArtifact;

/// Affected-URL lists are truncated to this many entries.
pub const MAX_AFFECTED_URLS: usize = 50;

/// What a check observed. The engine combines this with the check's fixed
/// metadata to build the `CheckResult`.
#[derive(Debug, Clone)]
pub struct Finding {
    pub passed: bool,
    pub affected_count: usize,
    pub affected_urls: Vec<String>,
    pub details: serde_json::Value,
}

impl Finding {
    /// Nothing to report.
    pub fn pass() -> Self {
        Self {
            passed: true,
            affected_count: 0,
            affected_urls: Vec::new(),
            details: serde_json::Value::Null,
        }
    }

    /// Fails iff any URLs are affected.
    pub fn from_urls(urls: Vec<String>) -> Self {
        Self {
            passed: urls.is_empty(),
            affected_count: urls.len(),
            affected_urls: urls,
            details: serde_json::Value::Null,
        }
    }

    /// A site-wide condition; the affected count is 0 or 1.
    pub fn site_wide(failed: bool, url: Option<String>) -> Self {
        Self {
            passed: !failed,
            affected_count: usize::from(failed),
            affected_urls: url.filter(|_| failed).into_iter().collect(),
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Override the affected count when it differs from the URL sample size.
    pub fn with_count(mut self, count: usize) -> Self {
        self.affected_count = count;
        self.passed = count == 0;
        self
    }
}

/// One registered check: fixed id, category, severity, and recommendation,
/// plus a pure evaluation function.
pub struct CheckSpec {
    pub id: u8,
    pub category: Category,
    pub name: &'static str,
    pub severity: Severity,
    pub recommendation: &'static str,
    pub eval: fn(&CrawlArtifact) -> Finding,
}

impl CheckSpec {
    fn result(&self, finding: Finding) -> CheckResult {
        let mut affected_urls = finding.affected_urls;
        affected_urls.truncate(MAX_AFFECTED_URLS);
        CheckResult {
            check_id: self.id,
            category: self.category,
            check_name: self.name.to_string(),
            passed: finding.passed,
            severity: self.severity,
            affected_count: finding.affected_count,
            affected_urls,
            details: finding.details,
            recommendation: self.recommendation.to_string(),
        }
    }
}

/// Runs every registered check against one sealed artifact.
pub struct AuditEngine<'a> {
    artifact: &'a CrawlArtifact,
}

impl<'a> AuditEngine<'a> {
    pub fn new(artifact: &'a CrawlArtifact) -> Self {
        Self { artifact }
    }

    pub fn run(&self) -> AuditOutput {
        info!(
            "[AUDIT] Running SEO audit on {} ({} pages)",
            self.artifact.base_url,
            self.artifact.pages.len()
        );

        let registry = checks::registry();
        let mut results = Vec::with_capacity(registry.len());
        for spec in &registry {
            let finding = catch_unwind(AssertUnwindSafe(|| (spec.eval)(self.artifact)))
                .unwrap_or_else(|_| {
                    warn!(
                        "[AUDIT] Check {} ({}) panicked; recording as passed",
                        spec.id, spec.name
                    );
                    Finding::pass()
                });
            results.push(spec.result(finding));
        }

        let score = scoring::calculate_score(&results);
        let summary = scoring::summarize(&results);
        info!(
            "[AUDIT] Audit complete: {} checks, {} issues, score {}",
            results.len(),
            summary.failed,
            score
        );

        AuditOutput {
            score,
            results,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::page::PageRecord;
    use std::collections::HashSet;

    fn empty_artifact() -> CrawlArtifact {
        CrawlArtifact {
            base_url: "https://example.com".to_string(),
            ..CrawlArtifact::default()
        }
    }

    #[test]
    fn registry_has_exactly_one_hundred_unique_ids() {
        let registry = checks::registry();
        assert_eq!(registry.len(), 100);

        let ids: HashSet<u8> = registry.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 100);
        assert_eq!(*ids.iter().min().unwrap(), 1);
        assert_eq!(*ids.iter().max().unwrap(), 100);

        // Insertion order is evaluation order and must follow ids.
        let ordered: Vec<u8> = registry.iter().map(|c| c.id).collect();
        let mut sorted = ordered.clone();
        sorted.sort_unstable();
        assert_eq!(ordered, sorted);
    }

    #[test]
    fn every_category_has_ten_checks() {
        let registry = checks::registry();
        for category in Category::all() {
            let count = registry.iter().filter(|c| c.category == category).count();
            assert_eq!(count, 10, "{category} should have 10 checks");
        }
    }

    #[test]
    fn audit_output_always_has_one_result_per_check() {
        let artifact = empty_artifact();
        let output = AuditEngine::new(&artifact).run();
        assert_eq!(output.results.len(), 100);

        let ids: HashSet<u8> = output.results.iter().map(|r| r.check_id).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn audit_is_deterministic_over_a_sealed_artifact() {
        let mut artifact = empty_artifact();
        artifact.pages.push(PageRecord {
            url: "https://example.com/".to_string(),
            final_url: "https://example.com/".to_string(),
            status_code: 200,
            title: Some("Example".to_string()),
            word_count: 120,
            ..PageRecord::default()
        });

        let first = AuditEngine::new(&artifact).run();
        let second = AuditEngine::new(&artifact).run();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn affected_urls_are_truncated_to_fifty() {
        let mut artifact = empty_artifact();
        for i in 0..80 {
            artifact.pages.push(PageRecord {
                url: format!("https://example.com/p{i}"),
                final_url: format!("https://example.com/p{i}"),
                status_code: 200,
                word_count: 10,
                ..PageRecord::default()
            });
        }

        let output = AuditEngine::new(&artifact).run();
        let thin = output.results.iter().find(|r| r.check_id == 51).unwrap();
        assert!(!thin.passed);
        assert_eq!(thin.affected_count, 80);
        assert_eq!(thin.affected_urls.len(), 50);
    }
}
