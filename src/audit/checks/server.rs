//! Server & Infrastructure (checks 91-100).

use super::ok_pages;
use crate::audit::{CheckSpec, Finding};
use crate::domain::models::{Category, Severity};

const CAT: Category = Category::Server;

const CDN_HEADERS: [&str; 5] = ["x-cdn", "cf-ray", "x-amz-cf-id", "x-cache", "x-fastly"];

pub(super) fn checks() -> Vec<CheckSpec> {
    vec![
        CheckSpec {
            id: 91,
            category: CAT,
            name: "4xx Errors",
            severity: Severity::High,
            recommendation: "Fix or redirect 4xx error pages.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| (400..500).contains(&p.status_code))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 92,
            category: CAT,
            name: "5xx Errors",
            severity: Severity::Critical,
            recommendation: "Fix server errors immediately.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| (500..600).contains(&p.status_code))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 93,
            category: CAT,
            name: "Redirect Chains",
            severity: Severity::Medium,
            recommendation: "Reduce redirect chains to single hops.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.redirect_chain.len() > 2)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 94,
            category: CAT,
            name: "Redirect Loops",
            severity: Severity::High,
            recommendation: "Fix redirect loops immediately.",
            // The fetcher aborts looping redirects before a record exists.
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 95,
            category: CAT,
            name: "302 Instead of 301",
            severity: Severity::Medium,
            recommendation: "Use 301 for permanent redirects.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.status_code == 302)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 96,
            category: CAT,
            name: "Missing Custom 404 Page",
            severity: Severity::Low,
            recommendation: "Create a helpful custom 404 page.",
            // Would need a probe request to a known-missing URL.
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 97,
            category: CAT,
            name: "No Browser Caching",
            severity: Severity::Low,
            recommendation: "Enable browser caching with Cache-Control headers.",
            eval: |a| {
                Finding::from_urls(
                    a.response_headers()
                        .filter(|(_, headers)| {
                            let cache_control = headers
                                .get("cache-control")
                                .map(String::as_str)
                                .unwrap_or("");
                            cache_control.is_empty()
                                || cache_control.contains("no-cache")
                                || cache_control.contains("no-store")
                        })
                        .map(|(url, _)| url.to_string())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 98,
            category: CAT,
            name: "No CDN Detected",
            severity: Severity::Low,
            recommendation: "Consider using a CDN for static assets.",
            eval: |a| {
                let has_cdn = a.response_headers().any(|(_, headers)| {
                    CDN_HEADERS.iter().any(|h| headers.contains_key(*h))
                });
                Finding::site_wide(!has_cdn, None)
            },
        },
        CheckSpec {
            id: 99,
            category: CAT,
            name: "Slow Server Response",
            severity: Severity::Medium,
            recommendation: "Optimize server to respond in under 600ms.",
            eval: |a| {
                Finding::from_urls(
                    ok_pages(a)
                        .filter(|p| p.load_time_ms > 600)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 100,
            category: CAT,
            name: "IP Canonicalization",
            severity: Severity::Medium,
            recommendation: "Ensure IP address redirects to domain.",
            // Would need a second crawl of the bare IP host.
            eval: |_| Finding::pass(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use crate::audit::checks::registry;
    use crate::audit::Finding;
    use crate::domain::page::{CrawlArtifact, PageRecord};
    use std::collections::HashMap;

    fn eval(id: u8, artifact: &CrawlArtifact) -> Finding {
        let registry = registry();
        let spec = registry.iter().find(|c| c.id == id).unwrap();
        (spec.eval)(artifact)
    }

    fn page(url: &str, status: u16) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            final_url: url.to_string(),
            status_code: status,
            ..PageRecord::default()
        }
    }

    #[test]
    fn status_classes_split_between_checks_91_and_92() {
        let a = CrawlArtifact {
            base_url: "https://example.com".to_string(),
            pages: vec![
                page("https://example.com/ok", 200),
                page("https://example.com/gone", 404),
                page("https://example.com/boom", 503),
            ],
            ..CrawlArtifact::default()
        };
        assert_eq!(eval(91, &a).affected_urls, vec!["https://example.com/gone"]);
        assert_eq!(eval(92, &a).affected_urls, vec!["https://example.com/boom"]);
    }

    #[test]
    fn cache_and_cdn_headers_drive_server_checks() {
        let mut cached = page("https://example.com/a", 200);
        cached.response_headers = HashMap::from([
            ("cache-control".to_string(), "max-age=3600".to_string()),
            ("cf-ray".to_string(), "abc".to_string()),
        ]);
        let mut uncached = page("https://example.com/b", 200);
        uncached.response_headers =
            HashMap::from([("cache-control".to_string(), "no-store".to_string())]);

        let a = CrawlArtifact {
            base_url: "https://example.com".to_string(),
            pages: vec![cached, uncached],
            ..CrawlArtifact::default()
        };

        assert_eq!(eval(97, &a).affected_urls, vec!["https://example.com/b"]);
        assert!(eval(98, &a).passed);
    }

    #[test]
    fn slow_pages_fail_check_99() {
        let mut slow = page("https://example.com/slow", 200);
        slow.load_time_ms = 900;
        let a = CrawlArtifact {
            base_url: "https://example.com".to_string(),
            pages: vec![slow],
            ..CrawlArtifact::default()
        };
        assert!(!eval(99, &a).passed);
    }
}
