//! Audit engine scenarios over hand-built crawl artifacts.
//!
//! The HTTP-level tests in `pipeline_e2e.rs` necessarily run over plain
//! HTTP; these scenarios build artifacts directly so the HTTPS-dependent
//! checks can be exercised too.

use seoscope::audit::AuditEngine;
use seoscope::domain::page::{
    CrawlArtifact, PageImage, PageLink, PageRecord, RobotsInfo, SitemapInfo,
};
use std::collections::HashMap;

fn link(url: &str, text: &str) -> PageLink {
    PageLink {
        url: url.to_string(),
        text: Some(text.to_string()),
        nofollow: false,
    }
}

fn clean_headers() -> HashMap<String, String> {
    HashMap::from([
        ("content-type".to_string(), "text/html; charset=utf-8".to_string()),
        ("strict-transport-security".to_string(), "max-age=63072000".to_string()),
        ("cache-control".to_string(), "public, max-age=3600".to_string()),
        ("x-cache".to_string(), "HIT".to_string()),
        ("content-encoding".to_string(), "gzip".to_string()),
    ])
}

fn polished_page(url: &str, title: &str, hash: &str, words: usize) -> PageRecord {
    PageRecord {
        url: url.to_string(),
        final_url: url.to_string(),
        status_code: 200,
        content_type: "text/html; charset=utf-8".to_string(),
        load_time_ms: 180,
        title: Some(title.to_string()),
        meta_description: Some(
            "Hand-picked boutique hotels with curated city guides, honest reviews, and direct booking at the best available rates for your stay."
                .to_string(),
        ),
        canonical_url: Some(url.to_string()),
        h1: vec![title.to_string()],
        h2: vec!["Details".to_string(), "Highlights".to_string()],
        word_count: words,
        text_content_hash: hash.to_string(),
        structured_data: vec![serde_json::json!({
            "@type": "Organization",
            "name": "Boutique Stays",
            "address": {"@type": "PostalAddress", "addressLocality": "Madrid"}
        })],
        open_graph: HashMap::from([
            ("og:title".to_string(), title.to_string()),
            ("og:image".to_string(), "https://example.com/cover.jpg".to_string()),
        ]),
        twitter_cards: HashMap::from([(
            "twitter:card".to_string(),
            "summary_large_image".to_string(),
        )]),
        html_lang: Some("en".to_string()),
        has_viewport_meta: true,
        viewport_content: "width=device-width, initial-scale=1".to_string(),
        images: vec![PageImage {
            url: "https://example.com/cover.jpg".to_string(),
            alt: Some("Hotel courtyard".to_string()),
            width: Some(800),
            height: Some(600),
        }],
        has_skip_link: true,
        response_headers: clean_headers(),
        ..PageRecord::default()
    }
}

fn polished_artifact() -> CrawlArtifact {
    let home_url = "https://example.com/";
    let about_url = "https://example.com/boutique-hotels-guide";

    let mut home = polished_page(home_url, "Boutique Hotels Guide and Stays", "hash-home", 850);
    home.internal_links = vec![
        link(about_url, "Boutique hotels guide"),
        link(about_url, "Read the full guide"),
        link(home_url, "Boutique Stays home"),
    ];

    let mut about = polished_page(
        about_url,
        "Choosing a Boutique Hotel: Full Guide",
        "hash-about",
        1200,
    );
    about.depth = 1;
    about.internal_links = vec![
        link(home_url, "Back to all stays"),
        link(home_url, "Boutique Stays home"),
        link(about_url, "Guide contents"),
    ];

    CrawlArtifact {
        base_url: "https://example.com".to_string(),
        pages: vec![home, about],
        robots: RobotsInfo {
            exists: true,
            url: "https://example.com/robots.txt".to_string(),
            content: Some("User-agent: *\nAllow: /\n".to_string()),
            ..RobotsInfo::default()
        },
        sitemap: SitemapInfo {
            exists: true,
            url: Some("https://example.com/sitemap.xml".to_string()),
            urls: vec![home_url.to_string(), about_url.to_string()],
            url_count: 2,
            ..SitemapInfo::default()
        },
    }
}

#[test]
fn polished_https_site_scores_at_least_ninety() {
    let artifact = polished_artifact();
    let output = AuditEngine::new(&artifact).run();

    assert_eq!(output.results.len(), 100);
    assert!(output.score >= 90, "score was {}", output.score);

    let critical_failures: Vec<u8> = output
        .results
        .iter()
        .filter(|r| !r.passed && r.severity == seoscope::Severity::Critical)
        .map(|r| r.check_id)
        .collect();
    assert!(critical_failures.is_empty(), "critical failures: {critical_failures:?}");

    // On-Page SEO (checks 11-20) is fully clean.
    let onpage_failures: Vec<u8> = output
        .results
        .iter()
        .filter(|r| (11..=20).contains(&r.check_id) && !r.passed)
        .map(|r| r.check_id)
        .collect();
    assert!(onpage_failures.is_empty(), "on-page failures: {onpage_failures:?}");
}

#[test]
fn score_hits_one_hundred_only_when_everything_passes() {
    let artifact = polished_artifact();
    let output = AuditEngine::new(&artifact).run();
    if output.score == 100 {
        assert!(output.results.iter().all(|r| r.passed));
    } else {
        assert!(output.results.iter().any(|r| !r.passed));
    }
}

#[test]
fn degraded_page_drags_the_score_down() {
    let mut artifact = polished_artifact();
    // Strip the about page down to a bare shell.
    {
        let about = &mut artifact.pages[1];
        about.title = None;
        about.meta_description = None;
        about.h1.clear();
        about.word_count = 20;
        about.has_viewport_meta = false;
        about.viewport_content.clear();
        about.html_lang = None;
    }

    let degraded = AuditEngine::new(&artifact).run();
    let polished = AuditEngine::new(&polished_artifact()).run();
    assert!(degraded.score < polished.score);
    assert!(degraded.summary.failed > polished.summary.failed);
}
