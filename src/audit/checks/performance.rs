//! Technical Performance (checks 21-30).
//!
//! Core Web Vitals checks run on field metrics attached by the pagespeed
//! stage; without a provider they pass vacuously. Image-weight and
//! minification signals need response-body inspection the crawler does not
//! do, so those checks are constant-pass.

use serde_json::json;

use crate::audit::{CheckSpec, Finding};
use crate::domain::models::{Category, Severity};

const CAT: Category = Category::Performance;

pub(super) fn checks() -> Vec<CheckSpec> {
    vec![
        CheckSpec {
            id: 21,
            category: CAT,
            name: "LCP > 2.5s",
            severity: Severity::High,
            recommendation: "Optimize Largest Contentful Paint to under 2.5s.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            p.metrics
                                .as_ref()
                                .and_then(|m| m.lcp_ms)
                                .map(|lcp| lcp > 2_500.0)
                                .unwrap_or(false)
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 22,
            category: CAT,
            name: "INP > 200ms",
            severity: Severity::Medium,
            recommendation: "Optimize Interaction to Next Paint to under 200ms.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            p.metrics
                                .as_ref()
                                .and_then(|m| m.inp_ms)
                                .map(|inp| inp > 200.0)
                                .unwrap_or(false)
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 23,
            category: CAT,
            name: "CLS > 0.1",
            severity: Severity::High,
            recommendation: "Reduce Cumulative Layout Shift to under 0.1.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            p.metrics
                                .as_ref()
                                .and_then(|m| m.cls)
                                .map(|cls| cls > 0.1)
                                .unwrap_or(false)
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 24,
            category: CAT,
            name: "TTFB > 800ms",
            severity: Severity::Medium,
            recommendation: "Improve server response time to under 800ms.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.load_time_ms > 800)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 25,
            category: CAT,
            name: "Render-Blocking Resources",
            severity: Severity::High,
            recommendation: "Defer non-critical CSS/JS or inline critical styles.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| p.render_blocking_resources > 3)
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 26,
            category: CAT,
            name: "Uncompressed Images",
            severity: Severity::Medium,
            recommendation: "Compress images to under 200KB.",
            // Image byte sizes require fetching each asset; not observed.
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 27,
            category: CAT,
            name: "Missing Image Dimensions",
            severity: Severity::Medium,
            recommendation: "Add width and height attributes to images.",
            eval: |a| {
                Finding::from_urls(
                    a.pages
                        .iter()
                        .filter(|p| {
                            p.images
                                .iter()
                                .any(|img| img.width.is_none() || img.height.is_none())
                        })
                        .map(|p| p.url.clone())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 28,
            category: CAT,
            name: "No Text Compression",
            severity: Severity::Medium,
            recommendation: "Enable gzip or Brotli compression on the server.",
            eval: |a| {
                Finding::from_urls(
                    a.response_headers()
                        .filter(|(_, headers)| {
                            let encoding = headers
                                .get("content-encoding")
                                .map(|v| v.to_ascii_lowercase())
                                .unwrap_or_default();
                            !matches!(encoding.as_str(), "gzip" | "br" | "deflate")
                        })
                        .map(|(url, _)| url.to_string())
                        .collect(),
                )
            },
        },
        CheckSpec {
            id: 29,
            category: CAT,
            name: "Unminified CSS/JS",
            severity: Severity::Low,
            recommendation: "Minify CSS and JavaScript files.",
            // Requires fetching the assets themselves; not observed.
            eval: |_| Finding::pass(),
        },
        CheckSpec {
            id: 30,
            category: CAT,
            name: "Third-Party Script Impact",
            severity: Severity::Medium,
            recommendation: "Reduce third-party scripts or load them asynchronously.",
            eval: |a| {
                let heavy: Vec<&crate::domain::page::PageRecord> =
                    a.pages.iter().filter(|p| p.third_party_scripts > 10).collect();
                let details: Vec<_> = heavy
                    .iter()
                    .take(20)
                    .map(|p| json!({ "url": p.url, "count": p.third_party_scripts }))
                    .collect();
                Finding::from_urls(heavy.iter().map(|p| p.url.clone()).collect())
                    .with_details(json!({ "heavy_pages": details }))
            },
        },
    ]
}
