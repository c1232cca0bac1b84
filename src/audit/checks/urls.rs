//! URL Structure (checks 31-40).

use regex::Regex;
use serde_json::json;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::{duplicate_content_groups, path_depth, url_path};
use crate::audit::{CheckSpec, Finding};
use crate::domain::models::{Category, Severity};

const CAT: Category = Category::UrlStructure;

const SESSION_PATTERNS: [&str; 5] = ["sid=", "session=", "phpsessid=", "jsessionid=", "aspsessionid"];

const URL_STOPWORDS: [&str; 9] = ["the", "a", "an", "of", "to", "in", "for", "and", "or"];

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").unwrap())
}

fn words(text: &str) -> HashSet<String> {
    word_re()
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

pub(super) fn checks() -> Vec<CheckSpec> {
    vec![
        CheckSpec {
            id: 31,
            category: CAT,
            name: "URL Length > 100 chars",
            severity: Severity::Low,
            recommendation: "Keep URLs under 100 characters.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.url.chars().count() > 100)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 32,
            category: CAT,
            name: "Non-ASCII Characters",
            severity: Severity::Medium,
            recommendation: "Use only ASCII characters in URLs.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| !p.url.is_ascii())
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 33,
            category: CAT,
            name: "Underscores in URLs",
            severity: Severity::Low,
            recommendation: "Use hyphens instead of underscores in URLs.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| url_path(&p.url).contains('_'))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 34,
            category: CAT,
            name: "Uppercase in URLs",
            severity: Severity::Low,
            recommendation: "Use lowercase URLs for consistency.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            let path = url_path(&p.url);
                            path != path.to_lowercase()
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 35,
            category: CAT,
            name: "Trailing Slash Inconsistency",
            severity: Severity::Medium,
            recommendation: "Be consistent with trailing slashes.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            p.canonical_url
                                .as_deref()
                                .map(|canonical| p.url.ends_with('/') != canonical.ends_with('/'))
                                .unwrap_or(false)
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 36,
            category: CAT,
            name: "URL Depth > 4 levels",
            severity: Severity::Medium,
            recommendation: "Flatten URL structure to max 4 levels.",
            eval: |a| {
                let deep: Vec<(&str, usize)> = a
                    .pages
                    .iter()
                    .map(|p| (p.url.as_str(), path_depth(&p.url)))
                    .filter(|(_, depth)| *depth > 4)
                    .collect();
                let details: Vec<_> = deep
                    .iter()
                    .take(20)
                    .map(|(url, depth)| json!({ "url": url, "depth": depth }))
                    .collect();
                Finding::from_urls(deep.iter().map(|(url, _)| url.to_string()).collect())
                    .with_details(json!({ "deep_urls": details }))
            },
        },
        CheckSpec {
            id: 37,
            category: CAT,
            name: "Dynamic Parameters",
            severity: Severity::Medium,
            recommendation: "Use clean, static URLs without query parameters.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.url.contains('?'))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 38,
            category: CAT,
            name: "Session IDs in URLs",
            severity: Severity::High,
            recommendation: "Remove session IDs from URLs; use cookies instead.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            let url = p.url.to_lowercase();
                            SESSION_PATTERNS.iter().any(|pat| url.contains(pat))
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 39,
            category: CAT,
            name: "Duplicate Content URLs",
            severity: Severity::High,
            recommendation: "Consolidate duplicate content or use canonical tags.",
            eval: |a| {
                let (urls, groups) = duplicate_content_groups(a);
                let details: Vec<_> = groups.iter().take(10).collect();
                Finding::from_urls(urls).with_details(json!({ "groups": details }))
            },
        },
        CheckSpec {
            id: 40,
            category: CAT,
            name: "Missing Keywords in URL",
            severity: Severity::Low,
            recommendation: "Include target keywords in URL slugs.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            let mut important = words(p.title.as_deref().unwrap_or(""));
                            important.extend(words(p.h1.first().map(String::as_str).unwrap_or("")));
                            for stopword in URL_STOPWORDS {
                                important.remove(stopword);
                            }
                            if important.is_empty() {
                                return false;
                            }
                            let path_words = words(&url_path(&p.url));
                            important.is_disjoint(&path_words)
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
    ]
}
