//! Score and summary computation.

use std::collections::BTreeMap;

use crate::domain::models::{AuditSummary, CheckResult};

/// Weighted penalty score. Each failed check costs
/// `severity_weight * min(affected_count, 10)`, floored at zero.
pub fn calculate_score(results: &[CheckResult]) -> u32 {
    if results.is_empty() {
        return 0;
    }

    let penalty: u32 = results
        .iter()
        .filter(|r| !r.passed)
        .map(|r| r.severity.weight() * (r.affected_count.min(10) as u32))
        .sum();

    100u32.saturating_sub(penalty)
}

/// Pass/fail counts plus failed-check histograms by severity and category.
pub fn summarize(results: &[CheckResult]) -> AuditSummary {
    let mut issues_by_severity: BTreeMap<String, usize> = BTreeMap::new();
    let mut issues_by_category: BTreeMap<String, usize> = BTreeMap::new();

    for result in results.iter().filter(|r| !r.passed) {
        *issues_by_severity
            .entry(result.severity.as_str().to_string())
            .or_default() += 1;
        *issues_by_category
            .entry(result.category.display_name().to_string())
            .or_default() += 1;
    }

    let failed = results.iter().filter(|r| !r.passed).count();
    AuditSummary {
        total_checks: results.len(),
        passed: results.len() - failed,
        failed,
        issues_by_severity,
        issues_by_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Category, Severity};

    fn result(id: u8, passed: bool, severity: Severity, affected: usize) -> CheckResult {
        CheckResult {
            check_id: id,
            category: Category::OnPage,
            check_name: format!("check {id}"),
            passed,
            severity,
            affected_count: affected,
            affected_urls: Vec::new(),
            details: serde_json::Value::Null,
            recommendation: String::new(),
        }
    }

    #[test]
    fn all_passed_scores_one_hundred() {
        let results = vec![result(1, true, Severity::Critical, 0)];
        assert_eq!(calculate_score(&results), 100);
    }

    #[test]
    fn penalty_uses_severity_weight_times_capped_count() {
        // critical: 10 * min(3, 10) = 30; low: 1 * min(25, 10) = 10
        let results = vec![
            result(1, false, Severity::Critical, 3),
            result(2, false, Severity::Low, 25),
            result(3, true, Severity::High, 0),
        ];
        assert_eq!(calculate_score(&results), 60);
    }

    #[test]
    fn score_is_floored_at_zero() {
        let results: Vec<CheckResult> = (1..=20)
            .map(|i| result(i, false, Severity::Critical, 10))
            .collect();
        assert_eq!(calculate_score(&results), 0);
    }

    #[test]
    fn empty_results_score_zero() {
        assert_eq!(calculate_score(&[]), 0);
    }

    #[test]
    fn summary_counts_failures_by_severity_and_category() {
        let results = vec![
            result(1, false, Severity::High, 1),
            result(2, false, Severity::High, 2),
            result(3, true, Severity::Low, 0),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.total_checks, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.issues_by_severity.get("high"), Some(&2));
        assert_eq!(summary.issues_by_category.get("On-Page SEO"), Some(&2));
    }
}
