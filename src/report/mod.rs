//! Markdown report rendering.
//!
//! Four documents per run: executive summary, technical audit, action
//! plan, and per-article briefs. Rendering is pure over typed inputs; the
//! wording knobs live in `ReportTemplates` so phrasing can change without
//! touching the renderer.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::domain::models::{
    AuditOutput, ContentBrief, IssueSummary, RenderedBrief, ReportBundle, SeoPlan, Severity,
};
use crate::providers::LlmRecommendations;

const MAX_SLUG_LEN: usize = 50;

/// Substitutable wording for the rendered documents.
#[derive(Debug, Clone)]
pub struct ReportTemplates {
    pub footer: String,
    pub target_score: String,
}

impl Default for ReportTemplates {
    fn default() -> Self {
        Self {
            footer: "*Report generated by Seoscope*".to_string(),
            target_score: "85+/100".to_string(),
        }
    }
}

/// Inputs shared by all four documents.
pub struct ReportContext<'a> {
    pub site_url: &'a str,
    pub generated_at: DateTime<Utc>,
    pub pages_crawled: usize,
    pub audit: &'a AuditOutput,
    pub issues: &'a [IssueSummary],
    pub plan: &'a SeoPlan,
    pub briefs: &'a [ContentBrief],
    pub recommendations: Option<&'a LlmRecommendations>,
}

#[derive(Default)]
pub struct ReportRenderer {
    templates: ReportTemplates,
}

impl ReportRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: ReportTemplates) -> Self {
        Self { templates }
    }

    /// Render all four documents.
    pub fn render_bundle(&self, ctx: &ReportContext) -> ReportBundle {
        ReportBundle {
            executive_md: self.executive_summary(ctx),
            technical_md: self.technical_audit(ctx),
            action_md: self.action_plan(ctx),
            page_fixes_md: self.page_fixes(ctx),
            briefs: ctx
                .briefs
                .iter()
                .enumerate()
                .map(|(idx, brief)| RenderedBrief {
                    keyword: brief.keyword.clone(),
                    slug: slugify(&brief.keyword),
                    content: self.article_brief(brief, idx + 1, ctx.generated_at),
                })
                .collect(),
        }
    }

    pub fn executive_summary(&self, ctx: &ReportContext) -> String {
        let score = ctx.audit.score;
        let severity_counts = severity_counts(ctx.issues);
        let (potential_score, traffic_increase) = estimate_traffic_impact(score, &severity_counts);

        let mut lines = vec![
            "# SEO Audit Executive Summary".to_string(),
            String::new(),
            format!("**Site:** {}", ctx.site_url),
            format!("**Date:** {}", ctx.generated_at.format("%Y-%m-%d")),
            String::new(),
            "---".to_string(),
            String::new(),
            "## Overall Score".to_string(),
            String::new(),
            format!("# {}/100 (Grade: {})", score, score_to_grade(score)),
            String::new(),
            "---".to_string(),
            String::new(),
            "## Key Findings".to_string(),
            String::new(),
            "| Metric | Value |".to_string(),
            "|--------|-------|".to_string(),
            format!("| Total Checks | {} |", ctx.audit.summary.total_checks),
            format!("| Passed | {} |", ctx.audit.summary.passed),
            format!("| Failed | {} |", ctx.audit.summary.failed),
            format!("| Critical Issues | {} |", severity_counts.get("critical").unwrap_or(&0)),
            format!("| High Priority | {} |", severity_counts.get("high").unwrap_or(&0)),
            format!("| Medium Priority | {} |", severity_counts.get("medium").unwrap_or(&0)),
            format!("| Low Priority | {} |", severity_counts.get("low").unwrap_or(&0)),
            String::new(),
            "---".to_string(),
            String::new(),
            "## Top Issues to Address".to_string(),
            String::new(),
        ];

        for (idx, issue) in prioritized(ctx.issues).iter().take(5).enumerate() {
            lines.push(format!(
                "{}. **[{}]** {}",
                idx + 1,
                issue.severity.as_str().to_uppercase(),
                issue.title
            ));
        }

        lines.extend([
            String::new(),
            "---".to_string(),
            String::new(),
            "## Expected Impact".to_string(),
            String::new(),
            format!("| Current Score | {score}/100 |"),
            "|---------------|---------|".to_string(),
            format!("| Potential Score | {potential_score}/100 |"),
            format!("| Potential Traffic Increase | {traffic_increase}% |"),
            String::new(),
        ]);

        if let Some(recommendations) = ctx.recommendations {
            if !recommendations.priority_issues.is_empty() {
                lines.extend([
                    "---".to_string(),
                    String::new(),
                    "## AI-Powered Recommendations".to_string(),
                    String::new(),
                ]);
                for (idx, action) in recommendations.priority_issues.iter().enumerate() {
                    lines.push(format!("{}. **{}**", idx + 1, action.issue));
                    lines.push(format!("   - Action: {}", action.recommendation));
                    if !action.estimated_impact.is_empty() {
                        lines.push(format!("   - Expected Impact: {}", action.estimated_impact));
                    }
                    lines.push(String::new());
                }
            }
            if !recommendations.quick_wins.is_empty() {
                lines.extend(["### Quick Wins".to_string(), String::new()]);
                for win in &recommendations.quick_wins {
                    lines.push(format!("- {win}"));
                }
                lines.push(String::new());
            }
        }

        lines.extend([
            "---".to_string(),
            String::new(),
            "## Recommended Next Steps".to_string(),
            String::new(),
            "1. Address all critical issues immediately".to_string(),
            "2. Fix high-priority technical issues within 1-2 weeks".to_string(),
            "3. Implement content improvements based on the action plan".to_string(),
            "4. Schedule monthly audits to track progress".to_string(),
            String::new(),
            "---".to_string(),
            String::new(),
            self.templates.footer.clone(),
        ]);

        lines.join("\n")
    }

    pub fn technical_audit(&self, ctx: &ReportContext) -> String {
        let mut lines = vec![
            "# Technical SEO Audit Report".to_string(),
            String::new(),
            format!("**Site:** {}", ctx.site_url),
            format!("**Date:** {}", ctx.generated_at.format("%Y-%m-%d")),
            format!("**Pages Crawled:** {}", ctx.pages_crawled),
            format!("**Score:** {}/100", ctx.audit.score),
            String::new(),
            "---".to_string(),
            String::new(),
            "## Audit Summary".to_string(),
            String::new(),
            "| Category | Checks | Passed | Failed | Score |".to_string(),
            "|----------|--------|--------|--------|-------|".to_string(),
        ];

        // Category table in registry order.
        let mut categories: Vec<(&str, usize, usize)> = Vec::new();
        for result in &ctx.audit.results {
            let name = result.category.display_name();
            match categories.iter_mut().find(|(cat, _, _)| *cat == name) {
                Some((_, total, passed)) => {
                    *total += 1;
                    if result.passed {
                        *passed += 1;
                    }
                }
                None => categories.push((name, 1, usize::from(result.passed))),
            }
        }
        for (name, total, passed) in &categories {
            let score = if *total > 0 { passed * 100 / total } else { 0 };
            lines.push(format!(
                "| {name} | {total} | {passed} | {} | {score} |",
                total - passed
            ));
        }

        lines.extend([
            String::new(),
            "---".to_string(),
            String::new(),
            "## All Checks".to_string(),
        ]);

        let mut current_category = "";
        for result in &ctx.audit.results {
            let category = result.category.display_name();
            if category != current_category {
                current_category = category;
                lines.push(String::new());
                lines.push(format!("### {category}"));
                lines.push(String::new());
            }
            let status = if result.passed { "PASS" } else { "FAIL" };
            lines.push(format!(
                "- [{status}] **{}** [{}]",
                result.check_name,
                result.severity.as_str()
            ));
            if !result.passed {
                lines.push(format!("  - Fix: {}", result.recommendation));
            }
        }

        lines.extend([
            String::new(),
            "---".to_string(),
            String::new(),
            "## Issues Detail".to_string(),
            String::new(),
        ]);

        for issue in prioritized(ctx.issues) {
            lines.push(format!(
                "### [{}] {}",
                issue.severity.as_str().to_uppercase(),
                issue.title
            ));
            lines.push(String::new());
            if !issue.description.is_empty() {
                lines.push(issue.description.clone());
                lines.push(String::new());
            }
            lines.push(format!("**Fix:** {}", issue.suggested_fix));
            lines.push(String::new());
            if !issue.affected_urls.is_empty() {
                lines.push("**Affected URLs:**".to_string());
                for url in issue.affected_urls.iter().take(5) {
                    lines.push(format!("- {url}"));
                }
                if issue.affected_count > 5 {
                    lines.push(format!("- ... and {} more", issue.affected_count - 5));
                }
                lines.push(String::new());
            }
        }

        lines.extend(["---".to_string(), String::new(), self.templates.footer.clone()]);
        lines.join("\n")
    }

    pub fn action_plan(&self, ctx: &ReportContext) -> String {
        let summary = &ctx.plan.summary;
        let mut lines = vec![
            "# SEO Action Plan".to_string(),
            String::new(),
            format!("**Site:** {}", ctx.site_url),
            format!("**Date:** {}", ctx.generated_at.format("%Y-%m-%d")),
            format!("**Current Score:** {}/100", summary.current_score),
            format!("**Target Score:** {}", self.templates.target_score),
            String::new(),
            "---".to_string(),
            String::new(),
            "## Plan Overview".to_string(),
            String::new(),
            "| Metric | Value |".to_string(),
            "|--------|-------|".to_string(),
            format!("| Duration | {} weeks |", summary.plan_duration_weeks),
            format!("| Total Tasks | {} |", summary.total_action_items),
            format!("| Technical Tasks | {} |", summary.technical_tasks),
            format!("| Content Tasks | {} |", summary.content_tasks),
            format!("| Content Pieces Planned | {} |", summary.content_pieces_planned),
            String::new(),
            "---".to_string(),
            String::new(),
            "## Phase Breakdown".to_string(),
            String::new(),
        ];

        for phase in &summary.phases {
            lines.extend([
                format!("### Phase {}: {}", phase.number, phase.name),
                String::new(),
                format!("**Weeks:** {}", phase.weeks),
                format!("**Focus:** {}", phase.focus),
                format!("**Tasks:** {}", phase.tasks),
                String::new(),
            ]);
        }

        lines.extend(["---".to_string(), String::new(), "## Action Plan".to_string(), String::new()]);

        let mut current_phase = "";
        for item in &ctx.plan.action_plan {
            if item.phase_name != current_phase {
                current_phase = &item.phase_name;
                lines.push(format!("### {current_phase}"));
                lines.push(String::new());
            }
            lines.push(format!("- [ ] **{}**", item.task));
            lines.push(format!(
                "  - Timeline: Week {}-{}",
                item.week_start, item.week_end
            ));
            lines.push(format!(
                "  - Effort: {} | Impact: {}",
                item.effort.as_str(),
                item.expected_impact
            ));
            if !item.description.is_empty() {
                lines.push(format!("  - Details: {}", item.description));
            }
            if !item.target_keywords.is_empty() {
                lines.push(format!(
                    "  - Target Keywords: {}",
                    item.target_keywords
                        .iter()
                        .take(5)
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
            lines.push(String::new());
        }

        if !ctx.plan.content_calendar.is_empty() {
            lines.extend([
                "---".to_string(),
                String::new(),
                "## Content Calendar".to_string(),
                String::new(),
                "| Week | Title | Type | Target Keywords |".to_string(),
                "|------|-------|------|-----------------|".to_string(),
            ]);
            for item in &ctx.plan.content_calendar {
                let title: String = item.title.chars().take(40).collect();
                let keywords = item
                    .target_keywords
                    .iter()
                    .take(3)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(format!(
                    "| {} | {} | {} | {} |",
                    item.week, title, item.content_type, keywords
                ));
            }
            lines.push(String::new());
        }

        if !summary.expected_outcomes.is_empty() {
            lines.extend([
                "---".to_string(),
                String::new(),
                "## Expected Outcomes".to_string(),
                String::new(),
            ]);
            for outcome in &summary.expected_outcomes {
                lines.push(format!("- {outcome}"));
            }
            lines.push(String::new());
        }

        lines.extend(["---".to_string(), String::new(), self.templates.footer.clone()]);
        lines.join("\n")
    }

    /// Page-by-page modification guide.
    pub fn page_fixes(&self, ctx: &ReportContext) -> String {
        // Group issues by affected URL; issues with no sample fall back to
        // the site root.
        let mut pages: BTreeMap<&str, Vec<&IssueSummary>> = BTreeMap::new();
        for issue in ctx.issues {
            if issue.affected_urls.is_empty() {
                pages.entry(ctx.site_url).or_default().push(issue);
            } else {
                for url in &issue.affected_urls {
                    pages.entry(url.as_str()).or_default().push(issue);
                }
            }
        }

        let mut lines = vec![
            "# Page Modification Guide".to_string(),
            String::new(),
            format!("**Site:** {}", ctx.site_url),
            format!("**Date:** {}", ctx.generated_at.format("%Y-%m-%d")),
            format!("**Pages with Issues:** {}", pages.len()),
            String::new(),
            "---".to_string(),
            String::new(),
            "## Quick Reference".to_string(),
            String::new(),
            "| Page | Critical | High | Medium | Low | Total |".to_string(),
            "|------|----------|------|--------|-----|-------|".to_string(),
        ];

        for (url, page_issues) in &pages {
            let count = |sev: Severity| page_issues.iter().filter(|i| i.severity == sev).count();
            let display_url: String = if url.chars().count() <= 50 {
                (*url).to_string()
            } else {
                format!("{}...", url.chars().take(47).collect::<String>())
            };
            lines.push(format!(
                "| {display_url} | {} | {} | {} | {} | {} |",
                count(Severity::Critical),
                count(Severity::High),
                count(Severity::Medium),
                count(Severity::Low),
                page_issues.len()
            ));
        }

        lines.extend([
            String::new(),
            "---".to_string(),
            String::new(),
            "## Detailed Fixes by Page".to_string(),
            String::new(),
        ]);

        // Worst pages first.
        let mut ordered: Vec<(&str, &Vec<&IssueSummary>)> =
            pages.iter().map(|(url, issues)| (*url, issues)).collect();
        ordered.sort_by_key(|(_, issues)| {
            let weight: i64 = issues
                .iter()
                .map(|i| match i.severity {
                    Severity::Critical => 100,
                    Severity::High => 10,
                    Severity::Medium => 1,
                    _ => 0,
                })
                .sum();
            -weight
        });

        for (url, page_issues) in ordered {
            lines.push(format!("### {url}"));
            lines.push(String::new());
            let mut sorted: Vec<&&IssueSummary> = page_issues.iter().collect();
            sorted.sort_by_key(|i| i.severity);
            for issue in sorted {
                lines.push(format!(
                    "#### [{}] {}",
                    capitalize(issue.severity.as_str()),
                    issue.title
                ));
                lines.push(String::new());
                lines.push(format!("**Fix:** {}", issue.suggested_fix));
                lines.push(String::new());
            }
        }

        lines.extend(["---".to_string(), String::new(), self.templates.footer.clone()]);
        lines.join("\n")
    }

    pub fn article_brief(
        &self,
        brief: &ContentBrief,
        brief_number: usize,
        generated_at: DateTime<Utc>,
    ) -> String {
        let mut lines = vec![
            format!("# Article Brief #{brief_number:02}"),
            String::new(),
            format!("**Target Keyword:** {}", brief.keyword),
            format!("**Search Intent:** {}", capitalize(&brief.intent)),
            format!("**Target Word Count:** {} words", brief.target_word_count),
            format!("**Generated:** {}", generated_at.format("%Y-%m-%d %H:%M UTC")),
            String::new(),
            "---".to_string(),
            String::new(),
            "## Title Suggestions".to_string(),
            String::new(),
        ];

        for (idx, title) in brief.title_suggestions.iter().take(5).enumerate() {
            lines.push(format!("{}. {title}", idx + 1));
        }

        lines.extend([
            String::new(),
            "## Meta Description".to_string(),
            String::new(),
            format!("> {}", brief.meta_description),
            String::new(),
        ]);

        if !brief.differentiation_angle.is_empty() {
            lines.extend([
                "## Unique Angle".to_string(),
                String::new(),
                brief.differentiation_angle.clone(),
                String::new(),
            ]);
        }

        lines.extend([
            "---".to_string(),
            String::new(),
            "## Content Outline".to_string(),
            String::new(),
        ]);
        for section in &brief.content_outline {
            lines.push(format!("### {}", section.heading));
            lines.push(String::new());
            for point in &section.key_points {
                lines.push(format!("- {point}"));
            }
            lines.push(String::new());
        }

        lines.extend([
            "---".to_string(),
            String::new(),
            "## Keywords to Include".to_string(),
            String::new(),
        ]);
        for keyword in brief.keywords_to_include.iter().take(15) {
            lines.push(format!("- {keyword}"));
        }

        lines.extend([
            String::new(),
            "---".to_string(),
            String::new(),
            "## Writing Guidelines".to_string(),
            String::new(),
            "- Write for humans first, search engines second".to_string(),
            "- Use the target keyword naturally in the first 100 words".to_string(),
            "- Include the keyword in at least one H2 heading".to_string(),
            "- Use related keywords throughout the content".to_string(),
            "- Break up text with subheadings every 300-400 words".to_string(),
            "- Include internal links to related content".to_string(),
            "- Add external links to authoritative sources".to_string(),
            String::new(),
            "---".to_string(),
            String::new(),
            self.templates.footer.clone(),
        ]);

        lines.join("\n")
    }
}

/// Fixed score-to-grade table.
pub fn score_to_grade(score: u32) -> &'static str {
    match score {
        95..=u32::MAX => "A+",
        90..=94 => "A",
        85..=89 => "B+",
        80..=84 => "B",
        75..=79 => "C+",
        70..=74 => "C",
        60..=69 => "D",
        _ => "F",
    }
}

/// Rough traffic-impact estimator over the severity histogram. Returns
/// `(potential_score, potential_traffic_increase_percent)`.
pub fn estimate_traffic_impact(score: u32, severity_counts: &BTreeMap<String, usize>) -> (u32, u32) {
    let critical = *severity_counts.get("critical").unwrap_or(&0) as f64;
    let high = *severity_counts.get("high").unwrap_or(&0) as f64;
    let medium = *severity_counts.get("medium").unwrap_or(&0) as f64;

    let total_potential = critical * 5.0 + high * 2.0 + medium * 0.5;
    let potential_score = (score + total_potential as u32).min(95);
    let traffic_increase = ((total_potential * 2.0) as u32).min(50);
    (potential_score, traffic_increase)
}

/// URL-friendly slug, truncated to 50 chars.
pub fn slugify(text: &str) -> String {
    static STRIP: OnceLock<Regex> = OnceLock::new();
    static COLLAPSE: OnceLock<Regex> = OnceLock::new();
    let strip = STRIP.get_or_init(|| Regex::new(r"[^\w\s-]").unwrap());
    let collapse = COLLAPSE.get_or_init(|| Regex::new(r"[-\s]+").unwrap());

    let lowered = text.to_lowercase();
    let stripped = strip.replace_all(lowered.trim(), "");
    let slug = collapse.replace_all(&stripped, "-").to_string();
    slug.chars().take(MAX_SLUG_LEN).collect()
}

fn severity_counts(issues: &[IssueSummary]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for issue in issues {
        *counts.entry(issue.severity.as_str().to_string()).or_default() += 1;
    }
    counts
}

/// Severity first, then larger blast radius.
fn prioritized(issues: &[IssueSummary]) -> Vec<&IssueSummary> {
    let mut ordered: Vec<&IssueSummary> = issues.iter().collect();
    ordered.sort_by_key(|i| (i.severity, std::cmp::Reverse(i.affected_count)));
    ordered
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AuditSummary, Category, CheckResult};

    fn check(id: u8, category: Category, passed: bool) -> CheckResult {
        CheckResult {
            check_id: id,
            category,
            check_name: format!("Check {id}"),
            passed,
            severity: Severity::High,
            affected_count: usize::from(!passed),
            affected_urls: if passed {
                Vec::new()
            } else {
                vec!["https://example.com/".to_string()]
            },
            details: serde_json::Value::Null,
            recommendation: "Do the thing.".to_string(),
        }
    }

    fn issue(title: &str, severity: Severity, affected: usize) -> IssueSummary {
        IssueSummary {
            check_id: 1,
            category: Category::OnPage,
            severity,
            title: title.to_string(),
            description: "desc".to_string(),
            suggested_fix: "fix".to_string(),
            affected_urls: vec!["https://example.com/a".to_string()],
            affected_count: affected,
        }
    }

    fn context<'a>(
        audit: &'a AuditOutput,
        issues: &'a [IssueSummary],
        plan: &'a SeoPlan,
    ) -> ReportContext<'a> {
        ReportContext {
            site_url: "https://example.com",
            generated_at: DateTime::from_timestamp(1_750_000_000, 0).unwrap(),
            pages_crawled: 12,
            audit,
            issues,
            plan,
            briefs: &[],
            recommendations: None,
        }
    }

    fn audit_output() -> AuditOutput {
        let results = vec![
            check(1, Category::Crawlability, true),
            check(11, Category::OnPage, false),
        ];
        AuditOutput {
            score: 82,
            summary: AuditSummary {
                total_checks: results.len(),
                passed: 1,
                failed: 1,
                ..AuditSummary::default()
            },
            results,
        }
    }

    #[test]
    fn grade_table_matches_thresholds() {
        assert_eq!(score_to_grade(100), "A+");
        assert_eq!(score_to_grade(95), "A+");
        assert_eq!(score_to_grade(94), "A");
        assert_eq!(score_to_grade(85), "B+");
        assert_eq!(score_to_grade(80), "B");
        assert_eq!(score_to_grade(75), "C+");
        assert_eq!(score_to_grade(70), "C");
        assert_eq!(score_to_grade(65), "D");
        assert_eq!(score_to_grade(10), "F");
    }

    #[test]
    fn traffic_impact_is_bounded() {
        let mut counts = BTreeMap::new();
        counts.insert("critical".to_string(), 20usize);
        let (potential, traffic) = estimate_traffic_impact(40, &counts);
        assert_eq!(potential, 95);
        assert_eq!(traffic, 50);
    }

    #[test]
    fn slugify_produces_url_safe_slugs() {
        assert_eq!(slugify("Boutique Hotels in Sevilla!"), "boutique-hotels-in-sevilla");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
        assert!(slugify(&"long word ".repeat(20)).chars().count() <= 50);
    }

    #[test]
    fn executive_summary_contains_score_grade_and_top_issues() {
        let audit = audit_output();
        let issues = vec![
            issue("Missing Title Tag", Severity::High, 3),
            issue("No CDN Detected", Severity::Low, 1),
        ];
        let plan = SeoPlan::default();
        let doc = ReportRenderer::new().executive_summary(&context(&audit, &issues, &plan));

        assert!(doc.contains("# 82/100 (Grade: B)"));
        assert!(doc.contains("**[HIGH]** Missing Title Tag"));
        assert!(doc.contains("| Total Checks | 2 |"));
    }

    #[test]
    fn technical_audit_lists_every_check_with_status() {
        let audit = audit_output();
        let plan = SeoPlan::default();
        let doc = ReportRenderer::new().technical_audit(&context(&audit, &[], &plan));

        assert!(doc.contains("- [PASS] **Check 1**"));
        assert!(doc.contains("- [FAIL] **Check 11**"));
        assert!(doc.contains("| Crawlability & Indexability | 1 | 1 | 0 | 100 |"));
    }

    #[test]
    fn page_fixes_orders_worst_pages_first() {
        let audit = audit_output();
        let mut critical = issue("Server exploding", Severity::Critical, 1);
        critical.affected_urls = vec!["https://example.com/bad".to_string()];
        let mut low = issue("Minor nit", Severity::Low, 1);
        low.affected_urls = vec!["https://example.com/fine".to_string()];
        let issues = vec![low, critical];
        let plan = SeoPlan::default();

        let doc = ReportRenderer::new().page_fixes(&context(&audit, &issues, &plan));
        let bad_pos = doc.find("### https://example.com/bad").unwrap();
        let fine_pos = doc.find("### https://example.com/fine").unwrap();
        assert!(bad_pos < fine_pos);
    }

    #[test]
    fn custom_footer_is_substituted() {
        let templates = ReportTemplates {
            footer: "*Custom footer*".to_string(),
            ..ReportTemplates::default()
        };
        let audit = audit_output();
        let plan = SeoPlan::default();
        let doc = ReportRenderer::with_templates(templates)
            .executive_summary(&context(&audit, &[], &plan));
        assert!(doc.ends_with("*Custom footer*"));
    }
}
