//! End-to-end pipeline tests against a mock site.
//!
//! Each test serves a small site with mockito, runs the full pipeline with
//! the in-memory repository and a filesystem blob store, and asserts on
//! the terminal report, the audit results, and the persisted artifacts.

use std::sync::Arc;

use mockito::{Server, ServerGuard};
use seoscope::config::{JsRenderingMode, PipelineOptions};
use seoscope::domain::models::PipelineStatus;
use seoscope::repository::InMemoryRepository;
use seoscope::storage::{BlobStore, FsBlobStore};
use seoscope::SeoPipeline;

struct TestSite {
    server: ServerGuard,
}

impl TestSite {
    async fn new() -> Self {
        Self {
            server: Server::new_async().await,
        }
    }

    fn url(&self) -> String {
        self.server.url()
    }

    async fn robots(&mut self, body: &str) {
        self.server
            .mock("GET", "/robots.txt")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;
    }

    async fn no_robots(&mut self) {
        self.server
            .mock("GET", "/robots.txt")
            .with_status(404)
            .create_async()
            .await;
    }

    async fn sitemap(&mut self, body: &str) {
        self.server
            .mock("GET", "/sitemap.xml")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;
    }

    async fn no_sitemap(&mut self) {
        self.server
            .mock("GET", "/sitemap.xml")
            .with_status(404)
            .create_async()
            .await;
    }

    async fn page(&mut self, path: &str, html: &str) {
        self.server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(html.to_string())
            .expect_at_least(0)
            .create_async()
            .await;
    }
}

fn options(max_pages: usize) -> PipelineOptions {
    PipelineOptions {
        max_pages,
        js_rendering: JsRenderingMode::Off,
        classify_templates: true,
        keyword_research: false,
        generate_briefs: true,
        seed_keywords: vec!["boutique hotels".to_string()],
        store_html: true,
        ..PipelineOptions::default()
    }
}

fn pipeline(repo: Arc<InMemoryRepository>, store: Arc<FsBlobStore>) -> SeoPipeline {
    SeoPipeline::new(repo).with_storage(store)
}

#[tokio::test]
async fn bare_page_with_bad_seo_fails_the_expected_checks() {
    let mut site = TestSite::new().await;
    site.no_robots().await;
    site.no_sitemap().await;
    site.page(
        "/",
        r#"<!doctype html><html><head><title>Bad</title></head><body><p>Short.</p><img src="/x.jpg"><a href="click here">more</a></body></html>"#,
    )
    .await;

    let repo = Arc::new(InMemoryRepository::new());
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsBlobStore::new(dir.path()));
    let report = pipeline(repo.clone(), store).run(&site.url(), options(5)).await;

    assert_eq!(report.status, PipelineStatus::Completed);
    assert_eq!(report.checks_run, 100);
    assert_eq!(report.pages_crawled, 1);

    let checks = repo.checks_for(&report.report_id);
    let check = |id: u8| checks.iter().find(|c| c.check_id == id).unwrap();

    assert!(check(11).passed, "title is present");
    assert!(!check(12).passed, "title is too short");
    assert!(!check(15).passed, "meta description is missing");
    assert!(!check(17).passed, "H1 is missing");
    assert!(!check(20).passed, "image lacks alt text");
    assert!(!check(51).passed, "content is thin");
    assert!(!check(76).passed, "lang attribute is missing");
    assert!(!check(81).passed, "viewport is missing");

    assert!(report.score <= 60, "score was {}", report.score);
}

#[tokio::test]
async fn well_formed_site_scores_high() {
    let mut site = TestSite::new().await;
    let base = site.url();

    site.robots("User-agent: *\nAllow: /\n").await;
    site.sitemap(&format!(
        "<urlset><url><loc>{base}/</loc></url><url><loc>{base}/guide</loc></url></urlset>"
    ))
    .await;

    let words = "estancia boutique con encanto y desayuno incluido ".repeat(160);
    let head_extras = format!(
        r#"<meta name="viewport" content="width=device-width, initial-scale=1">
        <meta property="og:title" content="Boutique stays">
        <meta property="og:image" content="{base}/cover.jpg">
        <meta name="twitter:card" content="summary_large_image">
        <script type="application/ld+json">{{"@type":"Organization","name":"Stays","address":{{"@type":"PostalAddress"}}}}</script>"#
    );
    let nav = format!(
        r##"<a href="#main">Skip to content</a>
        <a href="{base}/">Boutique stays home</a>
        <a href="{base}/guide">City guide for travellers</a>
        <a href="{base}/guide">Our full city guide</a>"##
    );

    for (path, title, desc) in [
        (
            "/",
            "Boutique Stays | Hand-picked city hotels",
            "Discover hand-picked boutique hotels with curated city guides, honest reviews, and direct booking at the best available rates for your next stay.",
        ),
        (
            "/guide",
            "City Guide | Boutique Stays neighbourhoods",
            "Neighbourhood-by-neighbourhood city guide with the best boutique hotels, restaurants, and quiet streets, written by locals and updated every season.",
        ),
    ] {
        let html = format!(
            r#"<!doctype html><html lang="es"><head><title>{title}</title>
            <meta name="description" content="{desc}">
            <link rel="canonical" href="{base}{path}">
            {head_extras}</head>
            <body><h1>{title}</h1><h2>Details</h2>{nav}<p>{words}</p>
            <img src="{base}/cover.jpg" alt="Hotel courtyard" width="800" height="600">
            </body></html>"#
        );
        site.server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_header("strict-transport-security", "max-age=63072000")
            .with_header("cache-control", "public, max-age=3600")
            .with_header("x-cache", "HIT")
            .with_body(html)
            .expect_at_least(1)
            .create_async()
            .await;
    }

    let repo = Arc::new(InMemoryRepository::new());
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsBlobStore::new(dir.path()));
    let report = pipeline(repo.clone(), store).run(&site.url(), options(5)).await;

    assert_eq!(report.status, PipelineStatus::Completed);
    assert_eq!(report.pages_crawled, 2);

    let checks = repo.checks_for(&report.report_id);
    let failed_on_page: Vec<u8> = checks
        .iter()
        .filter(|c| !c.passed && (11..=20).contains(&c.check_id))
        .map(|c| c.check_id)
        .collect();
    assert!(failed_on_page.is_empty(), "on-page failures: {failed_on_page:?}");

    // The mock site serves plain HTTP, so the HTTPS checks cannot pass;
    // everything else about the site is clean.
    let failed: Vec<u8> = checks.iter().filter(|c| !c.passed).map(|c| c.check_id).collect();
    for id in [1, 3, 6, 15, 17, 58, 59, 61, 75, 76, 81, 82, 97, 98] {
        assert!(!failed.contains(&id), "check {id} unexpectedly failed");
    }
}

#[tokio::test]
async fn duplicate_titles_are_reported_with_both_urls() {
    let mut site = TestSite::new().await;
    let base = site.url();
    site.no_robots().await;
    site.no_sitemap().await;

    let body = |title: &str, this: &str| {
        format!(
            r#"<html lang="en"><head><title>{title}</title></head><body>
            <h1>{title}</h1>
            <a href="{base}/a">Page A</a><a href="{base}/b">Page B</a>
            <p>{this} content words repeated here</p></body></html>"#
        )
    };
    site.page("/", &body("Home", "home")).await;
    site.page("/a", &body("Same Title", "aaa")).await;
    site.page("/b", &body("Same Title", "bbb")).await;

    let repo = Arc::new(InMemoryRepository::new());
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsBlobStore::new(dir.path()));
    let report = pipeline(repo.clone(), store).run(&site.url(), options(10)).await;

    let checks = repo.checks_for(&report.report_id);
    let duplicates = checks.iter().find(|c| c.check_id == 14).unwrap();
    assert!(!duplicates.passed);
    assert_eq!(duplicates.affected_count, 2);
    assert!(duplicates.affected_urls.iter().any(|u| u.ends_with("/a")));
    assert!(duplicates.affected_urls.iter().any(|u| u.ends_with("/b")));
}

#[tokio::test]
async fn sitemap_only_page_is_flagged_as_orphan() {
    let mut site = TestSite::new().await;
    let base = site.url();
    site.no_robots().await;
    site.sitemap(&format!(
        "<urlset><url><loc>{base}/solo</loc></url></urlset>"
    ))
    .await;

    site.page(
        "/",
        &format!(
            r#"<html><head><title>Home page</title></head><body><h1>Home</h1>
            <a href="{base}/linked">A linked page</a><p>words words words</p></body></html>"#
        ),
    )
    .await;
    site.page(
        "/linked",
        r#"<html><head><title>Linked</title></head><body><h1>Linked</h1><p>words</p></body></html>"#,
    )
    .await;
    site.page(
        "/solo",
        r#"<html><head><title>Solo</title></head><body><h1>Solo</h1><p>words</p></body></html>"#,
    )
    .await;

    let repo = Arc::new(InMemoryRepository::new());
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsBlobStore::new(dir.path()));
    let report = pipeline(repo.clone(), store).run(&site.url(), options(10)).await;

    assert_eq!(report.pages_crawled, 3);
    let checks = repo.checks_for(&report.report_id);
    let orphans = checks.iter().find(|c| c.check_id == 9).unwrap();
    assert!(!orphans.passed);
    assert_eq!(orphans.affected_urls.len(), 1);
    assert!(orphans.affected_urls[0].ends_with("/solo"));
    assert!(!orphans.affected_urls.iter().any(|u| u == &format!("{base}/")));
}

#[tokio::test]
async fn reports_are_uploaded_under_the_tenant_layout() {
    let mut site = TestSite::new().await;
    site.no_robots().await;
    site.no_sitemap().await;
    site.page(
        "/",
        r#"<html lang="en"><head><title>Small but honest site</title></head>
        <body><h1>Hello</h1><p>content here</p></body></html>"#,
    )
    .await;

    let repo = Arc::new(InMemoryRepository::new());
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsBlobStore::new(dir.path()));
    let report = pipeline(repo.clone(), store.clone())
        .run(&site.url(), options(3))
        .await;

    assert_eq!(report.status, PipelineStatus::Completed);

    let site_id = {
        let site = repo.find_or_create_site("default", "127.0.0.1").await.unwrap();
        site.id
    };
    let prefix = format!("tenants/default/sites/{site_id}/reports/{}/", report.report_id);
    let keys = store.list(&prefix).await.unwrap();

    for expected in [
        "audit-report.md",
        "seo-plan.md",
        "page-fixes.md",
        "executive-summary.md",
        "metadata.json",
    ] {
        assert!(
            keys.iter().any(|k| k.ends_with(expected)),
            "missing {expected} in {keys:?}"
        );
    }
    // One brief per seeded keyword.
    assert!(keys.iter().any(|k| k.contains("briefs/article-01-")));

    // Raw HTML stored under the crawl prefix.
    let crawl_keys = store
        .list(&format!("tenants/default/sites/{site_id}/crawls/"))
        .await
        .unwrap();
    assert_eq!(crawl_keys.len(), 1);
    assert!(crawl_keys[0].ends_with(".html"));

    // Presigned URLs for every uploaded document.
    assert!(report.file_urls.contains_key("audit_report"));
    assert!(report.file_urls.contains_key("seo_plan"));
    assert!(report.file_urls.contains_key("page_fixes"));
    assert!(report.file_urls.contains_key("metadata"));
    assert!(report.file_urls.values().all(|u| u.starts_with("file://")));

    // The plan fell back to seed keywords.
    let plan_md = String::from_utf8(
        store
            .get(&format!("{prefix}seo-plan.md"))
            .await
            .unwrap(),
    )
    .unwrap();
    assert!(plan_md.contains("boutique hotels"));
}

#[tokio::test]
async fn robots_disallow_everything_still_audits() {
    let mut site = TestSite::new().await;
    site.robots("User-agent: *\nDisallow: /\n").await;
    site.no_sitemap().await;

    let repo = Arc::new(InMemoryRepository::new());
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsBlobStore::new(dir.path()));
    let report = pipeline(repo.clone(), store).run(&site.url(), options(5)).await;

    assert_eq!(report.status, PipelineStatus::Completed);
    assert_eq!(report.pages_crawled, 0);
    assert_eq!(report.checks_run, 100);

    let checks = repo.checks_for(&report.report_id);
    // Robots exists, so check 1 passes; page-keyed checks pass vacuously.
    assert!(checks.iter().find(|c| c.check_id == 1).unwrap().passed);
    assert!(checks.iter().find(|c| c.check_id == 11).unwrap().passed);
    // No sitemap was reachable.
    assert!(!checks.iter().find(|c| c.check_id == 3).unwrap().passed);
}

#[tokio::test]
async fn invalid_input_fails_fast_without_side_effects() {
    let repo = Arc::new(InMemoryRepository::new());
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsBlobStore::new(dir.path()));

    let report = pipeline(repo.clone(), store.clone())
        .run("ftp://example.com", options(5))
        .await;
    assert_eq!(report.status, PipelineStatus::Failed);
    assert!(report.error.unwrap().contains("Unsupported scheme"));
    assert_eq!(repo.audit_count(), 0);

    let report = pipeline(repo.clone(), store)
        .run(
            "https://example.com",
            PipelineOptions {
                plan_duration_weeks: 99,
                ..options(5)
            },
        )
        .await;
    assert_eq!(report.status, PipelineStatus::Failed);
    assert_eq!(repo.audit_count(), 0);
}
