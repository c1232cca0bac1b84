//! Mobile Optimization (checks 81-90).
//!
//! Layout-dependent signals (tap targets, font sizes, viewport overflow,
//! interstitials) need a rendering engine with device emulation; those
//! checks are constant-pass. Viewport metadata and plugin content are
//! observable statically.

use crate::audit::{CheckSpec, Finding};
use crate::domain::models::{Category, Severity};

const CAT: Category = Category::Mobile;

pub(super) fn checks() -> Vec<CheckSpec> {
    vec![
        CheckSpec {
            id: 81,
            category: CAT,
            name: "Missing Viewport Meta",
            severity: Severity::High,
            recommendation: "Add viewport meta tag for mobile responsiveness.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| !p.has_viewport_meta)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 82,
            category: CAT,
            name: "Viewport Not Responsive",
            severity: Severity::High,
            recommendation: "Set viewport to width=device-width, initial-scale=1.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| !p.viewport_content.contains("width=device-width"))
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 83,
            category: CAT,
            name: "Tap Targets Too Small",
            severity: Severity::Medium,
            recommendation: "Make tap targets at least 48x48px.",
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 84,
            category: CAT,
            name: "Font Size Too Small",
            severity: Severity::Medium,
            recommendation: "Use at least 16px base font size.",
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 85,
            category: CAT,
            name: "Content Wider Than Screen",
            severity: Severity::High,
            recommendation: "Ensure content fits within viewport width.",
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 86,
            category: CAT,
            name: "Intrusive Interstitials",
            severity: Severity::Medium,
            recommendation: "Remove intrusive popups on mobile.",
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 87,
            category: CAT,
            name: "Mobile-Only 404s",
            severity: Severity::High,
            recommendation: "Ensure mobile and desktop return same content.",
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 88,
            category: CAT,
            name: "Flash Content",
            severity: Severity::High,
            recommendation: "Replace Flash with HTML5.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.has_flash)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 89,
            category: CAT,
            name: "Plugins Required",
            severity: Severity::High,
            recommendation: "Remove plugin dependencies.",
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 90,
            category: CAT,
            name: "Touch Elements Too Close",
            severity: Severity::Medium,
            recommendation: "Add spacing between touch targets.",
            eval: |_| Finding::pass(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use crate::audit::checks::registry;
    use crate::audit::Finding;
    use crate::domain::page::{CrawlArtifact, PageRecord};

    fn eval(id: u8, artifact: &CrawlArtifact) -> Finding {
        let registry = registry();
        let spec = registry.iter().find(|c| c.id == id).unwrap();
        (spec.eval)(artifact)
    }

    #[test]
    fn viewport_checks_use_static_signals() {
        let mut responsive = PageRecord {
            url: "https://example.com/a".to_string(),
            status_code: 200,
            has_viewport_meta: true,
            viewport_content: "width=device-width, initial-scale=1".to_string(),
            ..PageRecord::default()
        };
        responsive.final_url = responsive.url.clone();
        let bare = PageRecord {
            url: "https://example.com/b".to_string(),
            final_url: "https://example.com/b".to_string(),
            status_code: 200,
            ..PageRecord::default()
        };

        let a = CrawlArtifact {
            base_url: "https://example.com".to_string(),
            pages: vec![responsive, bare],
            ..CrawlArtifact::default()
        };

        assert_eq!(eval(81, &a).affected_urls, vec!["https://example.com/b"]);
        assert_eq!(eval(82, &a).affected_urls, vec!["https://example.com/b"]);
    }

    #[test]
    fn flash_content_is_flagged() {
        let mut flashy = PageRecord {
            url: "https://example.com/legacy".to_string(),
            status_code: 200,
            has_flash: true,
            ..PageRecord::default()
        };
        flashy.final_url = flashy.url.clone();
        let a = CrawlArtifact {
            base_url: "https://example.com".to_string(),
            pages: vec![flashy],
            ..CrawlArtifact::default()
        };
        assert!(!eval(88, &a).passed);
    }
}
