//! Security & Accessibility (checks 71-80).

use super::ok_pages;
use crate::audit::{CheckSpec, Finding};
use crate::domain::models::{Category, Severity};

const CAT: Category = Category::Security;

pub(super) fn checks() -> Vec<CheckSpec> {
    vec![
        CheckSpec {
            id: 71,
            category: CAT,
            name: "Not HTTPS",
            severity: Severity::Critical,
            recommendation: "Migrate all pages to HTTPS.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.url.starts_with("http://"))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 72,
            category: CAT,
            name: "Mixed Content",
            severity: Severity::High,
            recommendation: "Load all resources over HTTPS.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.url.starts_with("https://") && p.has_mixed_content)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 73,
            category: CAT,
            name: "Missing SSL Certificate",
            severity: Severity::Critical,
            recommendation: "Install an SSL certificate.",
            eval: |a| Finding::site_wide(!a.base_url.starts_with("https://"), None),
        },
        CheckSpec {
            id: 74,
            category: CAT,
            name: "Expired SSL Certificate",
            severity: Severity::Critical,
            recommendation: "Renew SSL certificate before expiry.",
            // Certificate validity is not inspected by the crawler.
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 75,
            category: CAT,
            name: "Missing HSTS Header",
            severity: Severity::Medium,
            recommendation: "Enable HSTS (Strict-Transport-Security header).",
            eval: |a| {
                Finding::from_urls(
                    a.response_headers()
                        .filter(|(_, headers)| !headers.contains_key("strict-transport-security"))
                        .map(|(url, _)| url.to_string())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 76,
            category: CAT,
            name: "Missing Language Declaration",
            severity: Severity::Medium,
            recommendation: "Add lang attribute to HTML tag.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.html_lang.is_none())
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 77,
            category: CAT,
            name: "Missing/Invalid Hreflang",
            severity: Severity::High,
            recommendation: "Ensure hreflang tags include self-referencing.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| !p.hreflang.is_empty())
                        .filter(|p| !p.hreflang.iter().any(|h| h.url == p.url))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 78,
            category: CAT,
            name: "Low Color Contrast",
            severity: Severity::Low,
            recommendation: "Improve color contrast for accessibility.",
            // Contrast needs computed styles from a rendering engine.
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 79,
            category: CAT,
            name: "Missing Form Labels",
            severity: Severity::Medium,
            recommendation: "Add labels to all form inputs.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.forms_without_labels > 0)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 80,
            category: CAT,
            name: "Missing Skip Links",
            severity: Severity::Low,
            recommendation: "Add skip-to-content links for accessibility.",
            eval: |a| {
                Finding::from_urls(
                    ok_pages(a)
                        .filter(|p| !p.has_skip_link)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use crate::audit::checks::registry;
    use crate::audit::Finding;
    use crate::domain::page::{CrawlArtifact, HreflangEntry, PageRecord};

    fn eval(id: u8, artifact: &CrawlArtifact) -> Finding {
        let registry = registry();
        let spec = registry.iter().find(|c| c.id == id).unwrap();
        (spec.eval)(artifact)
    }

    fn page(url: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            final_url: url.to_string(),
            status_code: 200,
            ..PageRecord::default()
        }
    }

    #[test]
    fn http_pages_fail_https_checks() {
        let a = CrawlArtifact {
            base_url: "http://example.com".to_string(),
            pages: vec![page("http://example.com/")],
            ..CrawlArtifact::default()
        };
        assert!(!eval(71, &a).passed);
        assert!(!eval(73, &a).passed);
    }

    #[test]
    fn hreflang_without_self_reference_fails() {
        let mut with_self = page("https://example.com/");
        with_self.hreflang = vec![
            HreflangEntry {
                lang: "en".to_string(),
                url: "https://example.com/".to_string(),
            },
            HreflangEntry {
                lang: "es".to_string(),
                url: "https://example.com/es/".to_string(),
            },
        ];
        let mut without_self = page("https://example.com/de/");
        without_self.hreflang = vec![HreflangEntry {
            lang: "en".to_string(),
            url: "https://example.com/".to_string(),
        }];

        let a = CrawlArtifact {
            base_url: "https://example.com".to_string(),
            pages: vec![with_self, without_self],
            ..CrawlArtifact::default()
        };

        let finding = eval(77, &a);
        assert_eq!(finding.affected_urls, vec!["https://example.com/de/"]);
    }

    #[test]
    fn missing_lang_attribute_is_flagged() {
        let mut with_lang = page("https://example.com/a");
        with_lang.html_lang = Some("en".to_string());
        let without_lang = page("https://example.com/b");

        let a = CrawlArtifact {
            base_url: "https://example.com".to_string(),
            pages: vec![with_lang, without_lang],
            ..CrawlArtifact::default()
        };
        assert_eq!(eval(76, &a).affected_urls, vec!["https://example.com/b"]);
    }
}
