//! Structured Data (checks 61-70).

use std::collections::HashSet;

use super::{has_schema_type, ok_pages, path_depth, schema_type, trim_slash};
use crate::audit::{CheckSpec, Finding};
use crate::domain::models::{Category, Severity};

const CAT: Category = Category::StructuredData;

const BLOG_PATTERNS: [&str; 4] = ["/blog/", "/news/", "/article/", "/post/"];
const PRODUCT_PATTERNS: [&str; 4] = ["/product/", "/products/", "/shop/", "/store/"];
const FAQ_PATTERNS: [&str; 3] = ["/faq", "/frequently-asked", "/questions"];
const REVIEW_PATTERNS: [&str; 3] = ["/review", "/testimonial", "/rating"];

pub(super) fn checks() -> Vec<CheckSpec> {
    vec![
        CheckSpec {
            id: 61,
            category: CAT,
            name: "No Structured Data",
            severity: Severity::Medium,
            recommendation: "Add JSON-LD structured data to pages.",
            eval: |a| {
                Finding::from_urls(
                    ok_pages(a)
                        .filter(|p| p.structured_data.is_empty())
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 62,
            category: CAT,
            name: "Schema Syntax Errors",
            severity: Severity::High,
            recommendation: "Fix structured data syntax errors.",
            // Invalid JSON-LD blocks are dropped at extraction time, so no
            // parse errors survive into the artifact.
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 63,
            category: CAT,
            name: "Missing Organization Schema",
            severity: Severity::Medium,
            recommendation: "Add Organization schema to homepage.",
            eval: |a| {
                let homepage = a.homepage();
                let has_org = a
                    .pages
                    .iter()
                    .find(|p| trim_slash(&p.url) == homepage)
                    .map(|p| has_schema_type(p, &["Organization"]))
                    .unwrap_or(false);
                Finding::site_wide(!has_org, Some(a.base_url.clone()))
            },
        },
        CheckSpec {
            id: 64,
            category: CAT,
            name: "Missing Breadcrumb Schema",
            severity: Severity::Low,
            recommendation: "Add BreadcrumbList schema to inner pages.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| path_depth(&p.url) > 1)
                        .filter(|p| !has_schema_type(p, &["BreadcrumbList"]))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 65,
            category: CAT,
            name: "Missing Article Schema",
            severity: Severity::Medium,
            recommendation: "Add Article schema to blog/news pages.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| BLOG_PATTERNS.iter().any(|pat| p.url.contains(pat)))
                        .filter(|p| !has_schema_type(p, &["Article", "NewsArticle", "BlogPosting"]))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 66,
            category: CAT,
            name: "Missing Product Schema",
            severity: Severity::High,
            recommendation: "Add Product schema to product pages.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| PRODUCT_PATTERNS.iter().any(|pat| p.url.contains(pat)))
                        .filter(|p| !has_schema_type(p, &["Product"]))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 67,
            category: CAT,
            name: "Missing LocalBusiness Schema",
            severity: Severity::High,
            recommendation: "Add LocalBusiness schema if you have a physical location.",
            eval: |a| {
                let has_local = a.pages.iter().any(|p| {
                    p.structured_data.iter().any(|sd| {
                        schema_type(sd)
                            .map(|t| t == "LocalBusiness" || t == "Organization")
                            .unwrap_or(false)
                            && sd.get("address").is_some()
                    })
                });
                Finding::site_wide(!has_local, Some(a.base_url.clone()))
            },
        },
        CheckSpec {
            id: 68,
            category: CAT,
            name: "Missing FAQ Schema",
            severity: Severity::Low,
            recommendation: "Add FAQPage schema to FAQ sections.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            let url = p.url.to_lowercase();
                            FAQ_PATTERNS.iter().any(|pat| url.contains(pat))
                        })
                        .filter(|p| !has_schema_type(p, &["FAQPage"]))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 69,
            category: CAT,
            name: "Missing Review Schema",
            severity: Severity::Medium,
            recommendation: "Add Review schema to pages with reviews.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            let url = p.url.to_lowercase();
                            REVIEW_PATTERNS.iter().any(|pat| url.contains(pat))
                        })
                        .filter(|p| !has_schema_type(p, &["Review", "AggregateRating"]))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 70,
            category: CAT,
            name: "Incomplete Schema Fields",
            severity: Severity::Medium,
            recommendation: "Add all required fields to schema markup.",
            eval: |a| {
                let mut seen = HashSet::new();
                let mut incomplete: Vec<String> = Vec::new();
                for page in &a.pages {
                    for sd in &page.structured_data {
                        let missing_fields = match schema_type(sd) {
                            Some("Article") => ["headline", "author", "datePublished"]
                                .iter()
                                .any(|field| sd.get(field).is_none()),
                            Some("Product") => ["name", "description"]
                                .iter()
                                .any(|field| sd.get(field).is_none()),
                            _ => false,
                        };
                        if missing_fields && seen.insert(page.url.as_str()) {
                            incomplete.push(page.url.clone());
                        }
                    }
                }
                Finding::from_urls(incomplete)
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use crate::audit::checks::registry;
    use crate::audit::Finding;
    use crate::domain::page::{CrawlArtifact, PageRecord};
    use serde_json::json;

    fn eval(id: u8, artifact: &CrawlArtifact) -> Finding {
        let registry = registry();
        let spec = registry.iter().find(|c| c.id == id).unwrap();
        (spec.eval)(artifact)
    }

    fn page(url: &str, structured: Vec<serde_json::Value>) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            final_url: url.to_string(),
            status_code: 200,
            structured_data: structured,
            ..PageRecord::default()
        }
    }

    fn artifact(pages: Vec<PageRecord>) -> CrawlArtifact {
        CrawlArtifact {
            base_url: "https://example.com".to_string(),
            pages,
            ..CrawlArtifact::default()
        }
    }

    #[test]
    fn homepage_org_schema_satisfies_check_63() {
        let a = artifact(vec![page(
            "https://example.com/",
            vec![json!({"@type": "Organization", "name": "Example"})],
        )]);
        assert!(eval(63, &a).passed);

        let b = artifact(vec![page("https://example.com/", vec![])]);
        assert!(!eval(63, &b).passed);
    }

    #[test]
    fn blog_pages_need_article_schema() {
        let a = artifact(vec![
            page(
                "https://example.com/blog/good",
                vec![json!({"@type": "BlogPosting", "headline": "x", "author": "y", "datePublished": "2026-01-01"})],
            ),
            page("https://example.com/blog/bare", vec![]),
        ]);
        let finding = eval(65, &a);
        assert_eq!(finding.affected_urls, vec!["https://example.com/blog/bare"]);
    }

    #[test]
    fn organization_with_address_counts_as_local_business() {
        let a = artifact(vec![page(
            "https://example.com/contact",
            vec![json!({"@type": "Organization", "address": {"@type": "PostalAddress"}})],
        )]);
        assert!(eval(67, &a).passed);
    }

    #[test]
    fn incomplete_article_schema_is_flagged_once_per_page() {
        let a = artifact(vec![page(
            "https://example.com/blog/x",
            vec![
                json!({"@type": "Article", "headline": "only headline"}),
                json!({"@type": "Article"}),
            ],
        )]);
        let finding = eval(70, &a);
        assert_eq!(finding.affected_count, 1);
    }
}
