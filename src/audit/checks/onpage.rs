//! On-Page SEO (checks 11-20).

use serde_json::json;
use std::collections::BTreeMap;

use super::ok_pages;
use crate::audit::{CheckSpec, Finding};
use crate::domain::models::{Category, Severity};

const CAT: Category = Category::OnPage;

pub(super) fn checks() -> Vec<CheckSpec> {
    vec![
        CheckSpec {
            id: 11,
            category: CAT,
            name: "Missing Title Tag",
            severity: Severity::High,
            recommendation: "Add unique title tags to all pages (50-60 characters).",
            eval: |a| {
                Finding::from_urls(
                    ok_pages(a)
                        .filter(|p| p.title.as_deref().map_or(true, str::is_empty))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 12,
            category: CAT,
            name: "Title Too Short (<30 chars)",
            severity: Severity::Medium,
            recommendation: "Expand titles to 50-60 characters for better SEO.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            p.title
                                .as_deref()
                                .map(|t| !t.is_empty() && t.chars().count() < 30)
                                .unwrap_or(false)
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 13,
            category: CAT,
            name: "Title Too Long (>60 chars)",
            severity: Severity::Low,
            recommendation: "Shorten titles to under 60 characters to avoid truncation.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.title.as_deref().map(|t| t.chars().count() > 60).unwrap_or(false))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 14,
            category: CAT,
            name: "Duplicate Title Tags",
            severity: Severity::High,
            recommendation: "Make each page title unique.",
            eval: |a| {
                let mut by_title: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for page in ok_pages(a) {
                    if let Some(title) = page.title.as_deref().filter(|t| !t.is_empty()) {
                        by_title
                            .entry(title.trim().to_lowercase())
                            .or_default()
                            .push(page.url.clone());
                    }
                }
                let duplicates: BTreeMap<&String, &Vec<String>> =
                    by_title.iter().filter(|(_, urls)| urls.len() > 1).collect();
                let urls: Vec<String> = duplicates.values().flat_map(|u| u.iter().cloned()).collect();
                let details: serde_json::Map<String, serde_json::Value> = duplicates
                    .iter()
                    .take(10)
                    .map(|(title, urls)| ((*title).clone(), json!(urls)))
                    .collect();
                Finding::from_urls(urls).with_details(json!({ "duplicates": details }))
            },
        },
        CheckSpec {
            id: 15,
            category: CAT,
            name: "Missing Meta Description",
            severity: Severity::High,
            recommendation: "Add unique meta descriptions (150-160 characters).",
            eval: |a| {
                Finding::from_urls(
                    ok_pages(a)
                        .filter(|p| p.meta_description.as_deref().map_or(true, str::is_empty))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 16,
            category: CAT,
            name: "Meta Description Length",
            severity: Severity::Low,
            recommendation: "Optimize meta descriptions to 150-160 characters.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            p.meta_description
                                .as_deref()
                                .map(|d| {
                                    let len = d.chars().count();
                                    len > 0 && (len < 70 || len > 160)
                                })
                                .unwrap_or(false)
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 17,
            category: CAT,
            name: "Missing H1",
            severity: Severity::High,
            recommendation: "Add a single H1 tag to each page.",
            eval: |a| {
                Finding::from_urls(
                    ok_pages(a)
                        .filter(|p| p.h1.is_empty())
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 18,
            category: CAT,
            name: "Multiple H1s",
            severity: Severity::Medium,
            recommendation: "Use only one H1 tag per page.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.h1.len() > 1)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 19,
            category: CAT,
            name: "Heading Hierarchy Broken",
            severity: Severity::Low,
            recommendation: "Follow proper heading hierarchy: H1 -> H2 -> H3.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            (p.h1.is_empty() && (!p.h2.is_empty() || !p.h3.is_empty()))
                                || (!p.h3.is_empty() && p.h2.is_empty())
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 20,
            category: CAT,
            name: "Missing Image Alt Text",
            severity: Severity::Medium,
            recommendation: "Add descriptive alt text to all images.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            p.images
                                .iter()
                                .any(|img| img.alt.as_deref().map_or(true, |alt| alt.trim().is_empty()))
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
    ]
}
