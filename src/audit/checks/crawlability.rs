//! Crawlability & Indexability (checks 1-10).

use serde_json::json;

use super::{ok_pages, orphan_pages, trim_slash};
use crate::audit::{CheckSpec, Finding};
use crate::domain::models::{Category, Severity};

const CAT: Category = Category::Crawlability;

/// URL fragments that mark archive/utility pages where noindex is expected.
const UNIMPORTANT_URL_MARKERS: [&str; 5] = ["/tag/", "/author/", "/page/", "?", "/search"];

pub(super) fn checks() -> Vec<CheckSpec> {
    vec![
        CheckSpec {
            id: 1,
            category: CAT,
            name: "Robots.txt Presence",
            severity: Severity::High,
            recommendation: "Create a robots.txt file to control crawler access.",
            eval: |a| {
                Finding::site_wide(!a.robots.exists, Some(format!("{}/robots.txt", a.homepage())))
            },
        },
        CheckSpec {
            id: 2,
            category: CAT,
            name: "Robots.txt Blocking Critical Resources",
            severity: Severity::Critical,
            recommendation: "Remove disallow rules for CSS, JS, and image files.",
            eval: |a| {
                let content = a
                    .robots
                    .content
                    .as_deref()
                    .unwrap_or("")
                    .to_ascii_lowercase();
                let blocked: Vec<&str> = ["/css", "/js", "/images", ".css", ".js"]
                    .into_iter()
                    .filter(|p| {
                        content.contains(&format!("disallow: {p}"))
                            || content.contains(&format!("disallow: *{p}"))
                    })
                    .collect();
                let count = blocked.len();
                Finding::from_urls(Vec::new())
                    .with_count(count)
                    .with_details(json!({ "blocked_patterns": blocked }))
            },
        },
        CheckSpec {
            id: 3,
            category: CAT,
            name: "Sitemap.xml Presence",
            severity: Severity::High,
            recommendation: "Create an XML sitemap and submit to search engines.",
            eval: |a| {
                Finding::site_wide(!a.sitemap.exists, Some(format!("{}/sitemap.xml", a.homepage())))
            },
        },
        CheckSpec {
            id: 4,
            category: CAT,
            name: "Sitemap Validity",
            severity: Severity::Medium,
            recommendation: "Fix sitemap XML errors for proper indexing.",
            eval: |a| {
                let errors = if a.sitemap.exists { a.sitemap.errors.clone() } else { Vec::new() };
                let count = errors.len();
                Finding::from_urls(Vec::new())
                    .with_count(count)
                    .with_details(json!({ "errors": errors }))
            },
        },
        CheckSpec {
            id: 5,
            category: CAT,
            name: "Noindex Tags on Important Pages",
            severity: Severity::Critical,
            recommendation: "Remove noindex from pages you want indexed.",
            eval: |a| {
                Finding::from_urls(
                    ok_pages(a)
                        .filter(|p| p.noindex)
                        .filter(|p| !UNIMPORTANT_URL_MARKERS.iter().any(|m| p.url.contains(m)))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 6,
            category: CAT,
            name: "Canonical Tag Presence",
            severity: Severity::Medium,
            recommendation: "Add canonical tags to all indexable pages.",
            eval: |a| {
                Finding::from_urls(
                    ok_pages(a)
                        .filter(|p| p.canonical_url.is_none())
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 7,
            category: CAT,
            name: "Canonical Self-Referencing",
            severity: Severity::Medium,
            recommendation: "Ensure canonical tags point to the page itself.",
            eval: |a| {
                let mismatches: Vec<(String, String)> = a
                    .pages
                    .iter()
                    .filter_map(|p| {
                        let canonical = p.canonical_url.as_deref()?;
                        if canonical != p.url && trim_slash(canonical) != trim_slash(&p.url) {
                            Some((p.url.clone(), canonical.to_string()))
                        } else {
                            None
                        }
                    })
                    .collect();
                let details: Vec<_> = mismatches
                    .iter()
                    .take(20)
                    .map(|(url, canonical)| json!({ "url": url, "canonical": canonical }))
                    .collect();
                Finding::from_urls(mismatches.iter().map(|(url, _)| url.clone()).collect())
                    .with_details(json!({ "mismatches": details }))
            },
        },
        CheckSpec {
            id: 8,
            category: CAT,
            name: "X-Robots-Tag in Headers",
            severity: Severity::High,
            recommendation: "Remove X-Robots-Tag: noindex from important pages.",
            eval: |a| {
                Finding::from_urls(
                    a.response_headers()
                        .filter(|(_, headers)| {
                            headers
                                .get("x-robots-tag")
                                .map(|v| v.to_ascii_lowercase().contains("noindex"))
                                .unwrap_or(false)
                        })
                        .map(|(url, _)| url.to_string())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 9,
            category: CAT,
            name: "Orphan Pages",
            severity: Severity::High,
            recommendation: "Add internal links to orphan pages or remove them.",
            eval: |a| Finding::from_urls(orphan_pages(a)),
        },
        CheckSpec {
            id: 10,
            category: CAT,
            name: "Crawl Depth > 4",
            severity: Severity::Medium,
            recommendation: "Flatten site structure to max 4 clicks from homepage.",
            eval: |a| {
                let deep: Vec<&crate::domain::page::PageRecord> =
                    a.pages.iter().filter(|p| p.depth > 4).collect();
                let details: Vec<_> = deep
                    .iter()
                    .take(20)
                    .map(|p| json!({ "url": p.url, "depth": p.depth }))
                    .collect();
                Finding::from_urls(deep.iter().map(|p| p.url.clone()).collect())
                    .with_details(json!({ "deep_pages": details }))
            },
        },
    ]
}
