//! Internal Linking (checks 41-50).

use serde_json::json;
use std::collections::HashSet;

use super::{ok_pages, orphan_pages, path_depth};
use crate::audit::{CheckSpec, Finding};
use crate::domain::models::{Category, Severity};

const CAT: Category = Category::InternalLinking;

const GENERIC_ANCHORS: [&str; 6] = ["click here", "read more", "learn more", "here", "more", "link"];

pub(super) fn checks() -> Vec<CheckSpec> {
    vec![
        CheckSpec {
            id: 41,
            category: CAT,
            name: "Orphan Pages",
            severity: Severity::High,
            recommendation: "Add internal links to pages with no incoming links.",
            eval: |a| Finding::from_urls(orphan_pages(a)),
        },
        CheckSpec {
            id: 42,
            category: CAT,
            name: "Broken Internal Links (404)",
            severity: Severity::High,
            recommendation: "Fix or remove broken internal links.",
            eval: |a| {
                let crawled: HashSet<&str> = a.pages.iter().map(|p| p.url.as_str()).collect();
                let mut broken: Vec<(String, String)> = Vec::new();
                for page in &a.pages {
                    for link in &page.internal_links {
                        if !crawled.contains(link.url.as_str()) {
                            broken.push((page.url.clone(), link.url.clone()));
                        }
                    }
                }
                let mut seen = HashSet::new();
                let mut sources: Vec<String> = Vec::new();
                for (from, _) in &broken {
                    if seen.insert(from.as_str()) {
                        sources.push(from.clone());
                    }
                }
                let details: Vec<_> = broken
                    .iter()
                    .take(20)
                    .map(|(from, to)| json!({ "from": from, "to": to }))
                    .collect();
                Finding::from_urls(sources)
                    .with_count(broken.len())
                    .with_details(json!({ "broken": details }))
            },
        },
        CheckSpec {
            id: 43,
            category: CAT,
            name: "Redirect Chains (Internal)",
            severity: Severity::Medium,
            recommendation: "Update links to point directly to final URLs.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.redirect_chain.len() > 1)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 44,
            category: CAT,
            name: "Nofollow on Internal Links",
            severity: Severity::Medium,
            recommendation: "Remove nofollow from internal links.",
            eval: |a| {
                let mut nofollow = 0usize;
                let mut sources: Vec<String> = Vec::new();
                for page in &a.pages {
                    let count = page.internal_links.iter().filter(|l| l.nofollow).count();
                    if count > 0 {
                        nofollow += count;
                        sources.push(page.url.clone());
                    }
                }
                Finding::from_urls(sources).with_count(nofollow)
            },
        },
        CheckSpec {
            id: 45,
            category: CAT,
            name: "Generic Anchor Text",
            severity: Severity::Medium,
            recommendation: "Use descriptive anchor text for internal links.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            p.internal_links.iter().any(|l| {
                                l.text
                                    .as_deref()
                                    .map(|t| GENERIC_ANCHORS.contains(&t.trim().to_lowercase().as_str()))
                                    .unwrap_or(false)
                            })
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 46,
            category: CAT,
            name: "Low Internal Link Count",
            severity: Severity::Medium,
            recommendation: "Add more internal links to pages (at least 3).",
            eval: |a| {
                Finding::from_urls(
                    ok_pages(a)
                        .filter(|p| p.internal_links.len() < 3)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 47,
            category: CAT,
            name: "High Internal Link Count",
            severity: Severity::Low,
            recommendation: "Reduce excessive internal links (max 100 per page).",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.internal_links.len() > 100)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 48,
            category: CAT,
            name: "Missing Breadcrumbs",
            severity: Severity::Low,
            recommendation: "Add breadcrumb navigation with Schema markup.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| path_depth(&p.url) > 1)
                        .filter(|p| !super::has_schema_type(p, &["BreadcrumbList"]))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 49,
            category: CAT,
            name: "Deep Pages (> 4 clicks)",
            severity: Severity::Medium,
            recommendation: "Ensure important pages are within 4 clicks of homepage.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.depth > 4)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 50,
            category: CAT,
            name: "Pagination Issues",
            severity: Severity::Medium,
            recommendation: "Add rel='next' and rel='prev' for pagination.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.url.contains("/page/") || p.url.contains("?page="))
                        .filter(|p| !p.has_rel_next && !p.has_rel_prev)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
    ]
}
