//! Plan synthesis.
//!
//! Failed checks, optional template groupings, and optional keyword data
//! become a phased action plan: quick wins first, technical and
//! template-scoped fixes second, keyword-driven content last. Without
//! keyword data the content phase falls back to the seed keywords.

pub mod briefs;

use tracing::info;

use crate::domain::models::{
    ContentItem, Effort, IssueSummary, Keyword, KeywordCluster, PhaseOverview, PlanItem,
    PlanSummary, SeoPlan, Severity, TaskKind,
};
use crate::service::templates::TemplateGroup;

const QUICK_WIN_LIMIT: usize = 5;
const TECHNICAL_LIMIT: usize = 5;
const TEMPLATE_LIMIT: usize = 5;
const RECS_PER_TEMPLATE: usize = 2;
const CONTENT_KEYWORD_LIMIT: usize = 10;
const CLUSTER_KEYWORD_LIMIT: usize = 30;
const SEED_FALLBACK_LIMIT: usize = 3;

/// Everything the synthesizer consumes.
pub struct PlanInputs<'a> {
    pub score: u32,
    pub issues: &'a [IssueSummary],
    pub templates: &'a [TemplateGroup],
    pub keywords: &'a [Keyword],
    pub seed_keywords: &'a [String],
    pub plan_duration_weeks: u32,
}

/// Build the ordered plan.
pub fn synthesize(inputs: &PlanInputs) -> SeoPlan {
    let mut action_plan: Vec<PlanItem> = Vec::new();
    let mut content_calendar: Vec<ContentItem> = Vec::new();

    // Phase 1: quick wins from low-effort issues.
    let quick_wins = inputs
        .issues
        .iter()
        .filter(|i| matches!(i.severity, Severity::Low | Severity::Medium))
        .take(QUICK_WIN_LIMIT);
    for (idx, issue) in quick_wins.enumerate() {
        action_plan.push(PlanItem {
            phase: 1,
            phase_name: "Quick Wins".to_string(),
            week_start: 1,
            week_end: 2,
            priority: idx + 1,
            task: format!("Fix: {}", issue.title),
            description: issue.suggested_fix.clone(),
            kind: TaskKind::Technical,
            effort: Effort::Low,
            expected_impact: "medium".to_string(),
            target_keywords: Vec::new(),
            template_id: None,
            affected_pages: 0,
            content_type: None,
            search_volume: None,
            intent: None,
        });
    }

    // Phase 2: high/critical technical fixes.
    let technical = inputs
        .issues
        .iter()
        .filter(|i| matches!(i.severity, Severity::High | Severity::Critical))
        .take(TECHNICAL_LIMIT);
    for issue in technical {
        action_plan.push(PlanItem {
            phase: 2,
            phase_name: "Technical Optimization".to_string(),
            week_start: 2,
            week_end: 4,
            priority: action_plan.len() + 1,
            task: format!("Fix: {}", issue.title),
            description: issue.suggested_fix.clone(),
            kind: TaskKind::Technical,
            effort: Effort::Medium,
            expected_impact: "high".to_string(),
            target_keywords: Vec::new(),
            template_id: None,
            affected_pages: 0,
            content_type: None,
            search_volume: None,
            intent: None,
        });
    }

    // Phase 2b: template-scoped recommendations.
    for template in inputs.templates.iter().take(TEMPLATE_LIMIT) {
        for rec in template.seo_recommendations.iter().take(RECS_PER_TEMPLATE) {
            action_plan.push(PlanItem {
                phase: 2,
                phase_name: "Template Optimization".to_string(),
                week_start: 3,
                week_end: 4,
                priority: action_plan.len() + 1,
                task: format!("[{}] {}", template.name, rec),
                description: format!(
                    "Apply to all {} pages using this template",
                    template.page_count
                ),
                kind: TaskKind::Template,
                effort: Effort::Medium,
                expected_impact: "high".to_string(),
                target_keywords: Vec::new(),
                template_id: Some(template.template_id.clone()),
                affected_pages: template.page_count,
                content_type: None,
                search_volume: None,
                intent: None,
            });
        }
    }

    // Phase 3: keyword-driven content.
    let mut ranked: Vec<&Keyword> = inputs.keywords.iter().collect();
    ranked.sort_by(|a, b| {
        b.opportunity()
            .partial_cmp(&a.opportunity())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut week = 4u32;
    for (idx, keyword) in ranked.iter().take(CONTENT_KEYWORD_LIMIT).enumerate() {
        let intent = keyword.intent.as_deref().unwrap_or("informational");
        let content_type = content_type_for_intent(intent);
        let volume = keyword.search_volume.unwrap_or(0);

        action_plan.push(PlanItem {
            phase: 3,
            phase_name: "Content Strategy".to_string(),
            week_start: week,
            week_end: (week + 2).min(inputs.plan_duration_weeks),
            priority: action_plan.len() + 1,
            task: format!("Create {content_type}: {}", keyword.text),
            description: format!(
                "Target keyword with {} monthly searches ({intent} intent)",
                fmt_thousands(volume)
            ),
            kind: TaskKind::Content,
            effort: Effort::High,
            expected_impact: "high".to_string(),
            target_keywords: vec![keyword.text.clone()],
            template_id: None,
            affected_pages: 0,
            content_type: Some(content_type.to_string()),
            search_volume: Some(volume),
            intent: Some(intent.to_string()),
        });
        content_calendar.push(ContentItem {
            week,
            title: format!("{content_type}: {}", keyword.text),
            content_type: content_type.to_string(),
            target_keywords: vec![keyword.text.clone()],
            search_volume: volume,
            intent: Some(intent.to_string()),
            status: "planned".to_string(),
        });

        if idx % 2 == 1 {
            week += 1;
        }
    }

    // Seed fallback when no keyword research is available.
    if content_calendar.is_empty() && !inputs.seed_keywords.is_empty() {
        for (idx, seed) in inputs.seed_keywords.iter().take(SEED_FALLBACK_LIMIT).enumerate() {
            let week = 4 + (idx as u32 * 2);
            action_plan.push(PlanItem {
                phase: 3,
                phase_name: "Content Strategy".to_string(),
                week_start: week,
                week_end: (week + 2).min(inputs.plan_duration_weeks),
                priority: action_plan.len() + 1,
                task: format!("Create content for: {seed}"),
                description: format!("Write comprehensive content targeting '{seed}'"),
                kind: TaskKind::Content,
                effort: Effort::High,
                expected_impact: "high".to_string(),
                target_keywords: vec![seed.clone()],
                template_id: None,
                affected_pages: 0,
                content_type: Some("Blog Post".to_string()),
                search_volume: None,
                intent: None,
            });
            content_calendar.push(ContentItem {
                week,
                title: format!("Content for: {seed}"),
                content_type: "Blog Post".to_string(),
                target_keywords: vec![seed.clone()],
                search_volume: 0,
                intent: None,
                status: "planned".to_string(),
            });
        }
    }

    let keyword_clusters = cluster_by_intent(&ranked);
    let summary = build_summary(inputs, &action_plan, &content_calendar);

    info!(
        "[PLAN] Synthesized {} action items, {} content pieces",
        action_plan.len(),
        content_calendar.len()
    );

    SeoPlan {
        summary,
        action_plan,
        content_calendar,
        keyword_clusters,
    }
}

/// Search intent decides the content shape.
fn content_type_for_intent(intent: &str) -> &'static str {
    match intent {
        "transactional" => "Landing Page",
        "commercial" => "Comparison/Review",
        "navigational" => "Service Page",
        _ => "Blog Post",
    }
}

fn cluster_by_intent(ranked: &[&Keyword]) -> Vec<KeywordCluster> {
    let mut clusters: Vec<KeywordCluster> = Vec::new();
    for keyword in ranked.iter().take(CLUSTER_KEYWORD_LIMIT) {
        let intent = keyword.intent.as_deref().unwrap_or("informational");
        let cluster = match clusters.iter_mut().find(|c| c.intent == intent) {
            Some(cluster) => cluster,
            None => {
                clusters.push(KeywordCluster {
                    name: format!("{} Keywords", title_case(intent)),
                    intent: intent.to_string(),
                    keywords: Vec::new(),
                    total_volume: 0,
                });
                clusters.last_mut().expect("cluster just pushed")
            }
        };
        if cluster.keywords.len() < 10 {
            cluster.keywords.push(keyword.text.clone());
        }
        cluster.total_volume += keyword.search_volume.unwrap_or(0);
    }
    clusters
}

fn build_summary(
    inputs: &PlanInputs,
    action_plan: &[PlanItem],
    content_calendar: &[ContentItem],
) -> PlanSummary {
    let phase_tasks = |phase: u8| action_plan.iter().filter(|a| a.phase == phase).count();
    let total_template_pages: usize = inputs.templates.iter().map(|t| t.page_count).sum();
    let total_volume: u64 = content_calendar.iter().map(|c| c.search_volume).sum();

    PlanSummary {
        current_score: inputs.score,
        plan_duration_weeks: inputs.plan_duration_weeks,
        total_action_items: action_plan.len(),
        technical_tasks: action_plan
            .iter()
            .filter(|a| matches!(a.kind, TaskKind::Technical | TaskKind::Template))
            .count(),
        content_tasks: action_plan
            .iter()
            .filter(|a| a.kind == TaskKind::Content)
            .count(),
        content_pieces_planned: content_calendar.len(),
        templates_analyzed: inputs.templates.len(),
        keywords_researched: inputs.keywords.len(),
        phases: vec![
            PhaseOverview {
                number: 1,
                name: "Quick Wins".to_string(),
                weeks: "1-2".to_string(),
                focus: "Low-effort fixes".to_string(),
                tasks: phase_tasks(1),
            },
            PhaseOverview {
                number: 2,
                name: "Technical Optimization".to_string(),
                weeks: "2-4".to_string(),
                focus: "Critical fixes + template optimization".to_string(),
                tasks: phase_tasks(2),
            },
            PhaseOverview {
                number: 3,
                name: "Content Strategy".to_string(),
                weeks: format!("4-{}", inputs.plan_duration_weeks),
                focus: "Keyword-driven content".to_string(),
                tasks: phase_tasks(3),
            },
        ],
        expected_outcomes: vec![
            format!("Fix {} technical issues", inputs.issues.len()),
            format!(
                "Optimize {} pages across {} templates",
                total_template_pages,
                inputs.templates.len()
            ),
            format!(
                "Create {} content pieces targeting {} monthly searches",
                content_calendar.len(),
                fmt_thousands(total_volume)
            ),
            format!("Improve SEO score from {} to 85+", inputs.score),
        ],
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Format an integer with thousands separators.
pub(crate) fn fmt_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Category;

    fn issue(title: &str, severity: Severity) -> IssueSummary {
        IssueSummary {
            check_id: 1,
            category: Category::OnPage,
            severity,
            title: title.to_string(),
            description: String::new(),
            suggested_fix: format!("How to fix {title}"),
            affected_urls: Vec::new(),
            affected_count: 1,
        }
    }

    fn keyword(text: &str, volume: u64, difficulty: f64, intent: &str) -> Keyword {
        Keyword {
            text: text.to_string(),
            search_volume: Some(volume),
            difficulty: Some(difficulty),
            intent: Some(intent.to_string()),
        }
    }

    fn inputs<'a>(
        issues: &'a [IssueSummary],
        keywords: &'a [Keyword],
        seeds: &'a [String],
    ) -> PlanInputs<'a> {
        PlanInputs {
            score: 55,
            issues,
            templates: &[],
            keywords,
            seed_keywords: seeds,
            plan_duration_weeks: 12,
        }
    }

    #[test]
    fn quick_wins_take_low_and_medium_issues_only() {
        let issues = vec![
            issue("Low thing", Severity::Low),
            issue("Critical thing", Severity::Critical),
            issue("Medium thing", Severity::Medium),
        ];
        let plan = synthesize(&inputs(&issues, &[], &[]));

        let phase1: Vec<&PlanItem> = plan.action_plan.iter().filter(|i| i.phase == 1).collect();
        assert_eq!(phase1.len(), 2);
        assert!(phase1.iter().all(|i| i.effort == Effort::Low));

        let phase2: Vec<&PlanItem> = plan.action_plan.iter().filter(|i| i.phase == 2).collect();
        assert_eq!(phase2.len(), 1);
        assert_eq!(phase2[0].task, "Fix: Critical thing");
    }

    #[test]
    fn phase_limits_are_enforced() {
        let issues: Vec<IssueSummary> = (0..10)
            .map(|i| issue(&format!("low {i}"), Severity::Low))
            .chain((0..10).map(|i| issue(&format!("high {i}"), Severity::High)))
            .collect();
        let plan = synthesize(&inputs(&issues, &[], &[]));
        assert_eq!(plan.action_plan.iter().filter(|i| i.phase == 1).count(), 5);
        assert_eq!(plan.action_plan.iter().filter(|i| i.phase == 2).count(), 5);
    }

    #[test]
    fn content_phase_ranks_by_volume_over_difficulty() {
        let keywords = vec![
            keyword("hard keyword", 1000, 100.0, "informational"),
            keyword("easy keyword", 500, 5.0, "informational"),
        ];
        let plan = synthesize(&inputs(&[], &keywords, &[]));
        assert!(plan.action_plan[0].task.contains("easy keyword"));
    }

    #[test]
    fn intent_maps_to_content_type() {
        let keywords = vec![
            keyword("book hotel", 900, 10.0, "transactional"),
            keyword("best hotels", 800, 10.0, "commercial"),
            keyword("hotel near me", 700, 10.0, "navigational"),
            keyword("what is a boutique hotel", 600, 10.0, "informational"),
        ];
        let plan = synthesize(&inputs(&[], &keywords, &[]));
        let types: Vec<&str> = plan
            .content_calendar
            .iter()
            .map(|c| c.content_type.as_str())
            .collect();
        assert!(types.contains(&"Landing Page"));
        assert!(types.contains(&"Comparison/Review"));
        assert!(types.contains(&"Service Page"));
        assert!(types.contains(&"Blog Post"));
    }

    #[test]
    fn seed_keywords_back_the_calendar_when_research_is_empty() {
        let seeds = vec!["boutique hotels".to_string(), "sevilla stays".to_string()];
        let plan = synthesize(&inputs(&[], &[], &seeds));
        assert_eq!(plan.content_calendar.len(), 2);
        assert!(plan.content_calendar[0].title.contains("boutique hotels"));
        assert_eq!(plan.content_calendar[1].week, 6);
    }

    #[test]
    fn calendar_is_ordered_by_week() {
        let keywords: Vec<Keyword> = (0u64..8)
            .map(|i| keyword(&format!("kw {i}"), 1000 - i, 10.0, "informational"))
            .collect();
        let plan = synthesize(&inputs(&[], &keywords, &[]));
        let weeks: Vec<u32> = plan.content_calendar.iter().map(|c| c.week).collect();
        let mut sorted = weeks.clone();
        sorted.sort_unstable();
        assert_eq!(weeks, sorted);
    }

    #[test]
    fn clusters_group_by_intent() {
        let keywords = vec![
            keyword("a", 100, 1.0, "commercial"),
            keyword("b", 200, 1.0, "commercial"),
            keyword("c", 50, 1.0, "informational"),
        ];
        let plan = synthesize(&inputs(&[], &keywords, &[]));
        let commercial = plan
            .keyword_clusters
            .iter()
            .find(|c| c.intent == "commercial")
            .unwrap();
        assert_eq!(commercial.keywords.len(), 2);
        assert_eq!(commercial.total_volume, 300);
    }

    #[test]
    fn thousands_formatting() {
        assert_eq!(fmt_thousands(0), "0");
        assert_eq!(fmt_thousands(999), "999");
        assert_eq!(fmt_thousands(1500), "1,500");
        assert_eq!(fmt_thousands(1234567), "1,234,567");
    }
}
