//! Content Quality (checks 51-60).
//!
//! Near-duplicate detection, publish-date staleness, per-image status, and
//! readability scoring all need signals the crawler does not collect;
//! those checks are constant-pass to keep id stability.

use super::{duplicate_content_groups, ok_pages};
use crate::audit::{CheckSpec, Finding};
use crate::domain::models::{Category, Severity};

const CAT: Category = Category::Content;

pub(super) fn checks() -> Vec<CheckSpec> {
    vec![
        CheckSpec {
            id: 51,
            category: CAT,
            name: "Thin Content (< 300 words)",
            severity: Severity::High,
            recommendation: "Add more valuable content (aim for 500+ words).",
            eval: |a| {
                Finding::from_urls(
                    ok_pages(a)
                        .filter(|p| p.word_count < 300)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 52,
            category: CAT,
            name: "Duplicate Content (Internal)",
            severity: Severity::High,
            recommendation: "Remove or consolidate duplicate content.",
            eval: |a| {
                let (urls, _) = duplicate_content_groups(a);
                Finding::from_urls(urls)
            },
        },
        CheckSpec {
            id: 53,
            category: CAT,
            name: "Near-Duplicate Content",
            severity: Severity::Medium,
            recommendation: "Differentiate or merge near-duplicate pages.",
            // Needs a similarity metric over page text; not computed.
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 54,
            category: CAT,
            name: "Missing Content",
            severity: Severity::High,
            recommendation: "Add meaningful content to empty pages.",
            eval: |a| {
                Finding::from_urls(
                    ok_pages(a)
                        .filter(|p| p.word_count < 50)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 55,
            category: CAT,
            name: "Keyword Stuffing",
            severity: Severity::Medium,
            recommendation: "Reduce keyword density to natural levels (<3%).",
            // Keyword density is not computed by the crawler.
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 56,
            category: CAT,
            name: "Outdated Content",
            severity: Severity::Low,
            recommendation: "Update content with old dates regularly.",
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 57,
            category: CAT,
            name: "Broken Images",
            severity: Severity::Medium,
            recommendation: "Fix or remove broken image links.",
            // Image URLs are not re-fetched to confirm their status.
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 58,
            category: CAT,
            name: "Missing OpenGraph Tags",
            severity: Severity::Low,
            recommendation: "Add og:title and og:image for social sharing.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            !p.open_graph.contains_key("og:title")
                                || !p.open_graph.contains_key("og:image")
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 59,
            category: CAT,
            name: "Missing Twitter Cards",
            severity: Severity::Low,
            recommendation: "Add Twitter Card meta tags for better sharing.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| !p.twitter_cards.contains_key("twitter:card"))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 60,
            category: CAT,
            name: "Low Readability Score",
            severity: Severity::Low,
            recommendation: "Simplify content for better readability.",
            eval: |_| Finding::pass(),
        },
    ]
}
