//! The end-to-end pipeline.
//!
//! Stages run in order with a per-stage timer. Crawl, audit, the final
//! persist, and repository commits are fatal; template classification,
//! pagespeed, keyword research, and LLM refinement degrade into
//! `summary.warnings`. The pipeline never propagates an error past its
//! boundary: every outcome is a `PipelineReport`.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use url::Url;

use crate::audit::AuditEngine;
use crate::config::{JsRenderingMode, PipelineOptions};
use crate::domain::models::{
    IssueSummary, Keyword, PipelineReport, PipelineStatus, PipelineSummary, ReportBundle,
};
use crate::domain::page::{CrawlArtifact, PageMetrics};
use crate::error::{AppError, Result};
use crate::plan::briefs::build_briefs;
use crate::plan::{synthesize, PlanInputs};
use crate::providers::{
    KeywordProvider, LlmProvider, LlmRecommendations, PagespeedProvider, Provider,
};
use crate::report::{ReportContext, ReportRenderer, ReportTemplates};
use crate::repository::{AuditRepository, AuditRunRecord};
use crate::service::crawler::SiteCrawler;
use crate::service::renderer::JsRenderer;
use crate::service::templates::{classify_templates, TemplateClassification};
use crate::storage::{BlobStore, CrawlScope, StoragePaths};

const DEFAULT_TENANT: &str = "default";
const PAGESPEED_PAGES_PER_TEMPLATE: usize = 3;
const KEYWORD_LIMIT: usize = 100;

/// Timer for one pipeline stage.
struct StageTimer(Instant);

impl StageTimer {
    fn start() -> Self {
        Self(Instant::now())
    }

    fn elapsed_secs(&self) -> f64 {
        self.0.elapsed().as_secs_f64()
    }
}

/// Orchestrates crawl, audit, plan, and report generation for one URL.
pub struct SeoPipeline {
    repository: Arc<dyn AuditRepository>,
    storage: Option<Arc<dyn BlobStore>>,
    keywords: Provider<Arc<dyn KeywordProvider>>,
    pagespeed: Provider<Arc<dyn PagespeedProvider>>,
    llm: Provider<Arc<dyn LlmProvider>>,
    report_templates: ReportTemplates,
}

impl SeoPipeline {
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self {
            repository,
            storage: None,
            keywords: Provider::Disabled,
            pagespeed: Provider::Disabled,
            llm: Provider::Disabled,
            report_templates: ReportTemplates::default(),
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn BlobStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_keyword_provider(mut self, provider: Arc<dyn KeywordProvider>) -> Self {
        self.keywords = Provider::enabled(provider);
        self
    }

    pub fn with_pagespeed_provider(mut self, provider: Arc<dyn PagespeedProvider>) -> Self {
        self.pagespeed = Provider::enabled(provider);
        self
    }

    pub fn with_llm_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.llm = Provider::enabled(provider);
        self
    }

    pub fn with_report_templates(mut self, templates: ReportTemplates) -> Self {
        self.report_templates = templates;
        self
    }

    /// Run the full pipeline. Always returns a terminal report.
    pub async fn run(&self, url: &str, options: PipelineOptions) -> PipelineReport {
        self.run_with_cancel(url, options, Arc::new(AtomicBool::new(false)))
            .await
    }

    /// Run with an external cancellation signal. On cancel, partial
    /// artifacts are discarded and no reports are emitted.
    pub async fn run_with_cancel(
        &self,
        url: &str,
        options: PipelineOptions,
        cancel_flag: Arc<AtomicBool>,
    ) -> PipelineReport {
        let report_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let total = Instant::now();

        info!("[PIPELINE] Starting SEO pipeline for: {url}");
        info!("[PIPELINE] Report ID: {report_id}");

        let mut report = PipelineReport {
            report_id: report_id.clone(),
            url: url.to_string(),
            status: PipelineStatus::Failed,
            error: None,
            score: 0,
            pages_crawled: 0,
            checks_run: 0,
            issues_count: 0,
            duration_ms: 0,
            started_at,
            completed_at: started_at,
            file_urls: BTreeMap::new(),
            summary: PipelineSummary::default(),
        };

        match self
            .execute(url, &options, &report_id, &cancel_flag, &mut report)
            .await
        {
            Ok(()) => {
                report.status = PipelineStatus::Completed;
                info!(
                    "[PIPELINE] COMPLETED in {:.2}s - score {}/100, {} pages, {} issues",
                    total.elapsed().as_secs_f64(),
                    report.score,
                    report.pages_crawled,
                    report.issues_count
                );
            }
            Err(e) => {
                warn!("[PIPELINE] FAILED: {e:#}");
                report.status = PipelineStatus::Failed;
                report.error = Some(e.to_string());
            }
        }

        report.completed_at = Utc::now();
        report.duration_ms = total.elapsed().as_millis() as u64;
        report
    }

    async fn execute(
        &self,
        url: &str,
        options: &PipelineOptions,
        report_id: &str,
        cancel_flag: &Arc<AtomicBool>,
        report: &mut PipelineReport,
    ) -> Result<()> {
        // Fail fast on bad input, before any side effects.
        options.validate()?;
        let parsed_url = Url::parse(url)
            .map_err(|e| AppError::invalid_input(format!("Invalid URL {url}: {e}")))?;
        if !matches!(parsed_url.scheme(), "http" | "https") {
            return Err(AppError::invalid_input(format!(
                "Unsupported scheme: {}",
                parsed_url.scheme()
            )));
        }
        let domain = parsed_url
            .host_str()
            .ok_or_else(|| AppError::invalid_input("URL has no host"))?
            .to_string();

        let mut warnings: Vec<String> = Vec::new();

        // Step 1: resolve or create the site.
        let timer = StageTimer::start();
        info!("[PIPELINE] Step 1/10: Resolving site...");
        let tenant = options.tenant.clone().unwrap_or_else(|| DEFAULT_TENANT.to_string());
        let site = self.repository.find_or_create_site(&tenant, &domain).await?;
        info!(
            "[PIPELINE] Step 1/10: Complete in {:.2}s - site={}",
            timer.elapsed_secs(),
            site.id
        );

        // Step 2: crawl.
        let timer = StageTimer::start();
        info!(
            "[PIPELINE] Step 2/10: Crawling site (max {} pages)...",
            options.max_pages
        );
        let config = options.crawl_config();
        let mut crawler = SiteCrawler::new(config.clone())?;
        if config.js_rendering != JsRenderingMode::Off {
            crawler = crawler.with_renderer(Arc::new(JsRenderer::new(&config)));
        }
        if let Some(storage) = &self.storage {
            crawler = crawler.with_store(
                storage.clone(),
                CrawlScope {
                    tenant_id: tenant.clone(),
                    site_id: site.id.clone(),
                    crawl_id: report_id.to_string(),
                },
            );
        }
        let mut artifact = crawler.crawl(&parsed_url, cancel_flag.clone()).await?;
        report.pages_crawled = artifact.pages.len();
        report.summary.pages_crawled = artifact.pages.len();
        report.summary.sitemap_urls = artifact.sitemap.url_count;
        info!(
            "[PIPELINE] Step 2/10: Complete in {:.2}s - crawled {} pages",
            timer.elapsed_secs(),
            artifact.pages.len()
        );
        self.check_cancelled(cancel_flag)?;

        // Step 3: template classification (non-fatal).
        let timer = StageTimer::start();
        let mut classification = TemplateClassification::default();
        if options.classify_templates && !artifact.pages.is_empty() {
            info!("[PIPELINE] Step 3/10: Classifying pages into templates...");
            classification = classify_templates(url, &artifact.pages);
            self.refine_template_names(url, &mut classification, &mut warnings).await;
            let assignment = classification.url_to_template();
            for page in &mut artifact.pages {
                page.template_id = assignment.get(&page.url).cloned();
            }
            report.summary.templates_identified = classification.templates.len();
            info!(
                "[PIPELINE] Step 3/10: Complete in {:.2}s - {} templates identified",
                timer.elapsed_secs(),
                classification.templates.len()
            );
        } else {
            info!("[PIPELINE] Step 3/10: Skipped template classification");
        }

        // Step 4: pagespeed analysis (non-fatal).
        let timer = StageTimer::start();
        if let Some(provider) = self.pagespeed.get() {
            info!("[PIPELINE] Step 4/10: Running pagespeed analysis...");
            let analyzed = self.apply_pagespeed(provider, &mut artifact, &mut warnings).await;
            info!(
                "[PIPELINE] Step 4/10: Complete in {:.2}s - {} pages analyzed",
                timer.elapsed_secs(),
                analyzed
            );
        } else {
            info!("[PIPELINE] Step 4/10: Skipped pagespeed analysis (provider disabled)");
        }
        self.check_cancelled(cancel_flag)?;

        // Step 5: keyword research (non-fatal).
        let timer = StageTimer::start();
        let mut keywords: Vec<Keyword> = Vec::new();
        if options.keyword_research {
            if let Some(provider) = self.keywords.get() {
                info!("[PIPELINE] Step 5/10: Performing keyword research...");
                keywords = self
                    .research_keywords(provider, &domain, options, &mut warnings)
                    .await;
                report.summary.keywords_found = keywords.len();
                info!(
                    "[PIPELINE] Step 5/10: Complete in {:.2}s - {} keywords found",
                    timer.elapsed_secs(),
                    keywords.len()
                );
            } else {
                info!("[PIPELINE] Step 5/10: Skipped keyword research (provider disabled)");
            }
        } else {
            info!("[PIPELINE] Step 5/10: Skipped keyword research (disabled)");
        }
        self.check_cancelled(cancel_flag)?;

        // Step 6: the 100-check audit over the sealed artifact.
        let timer = StageTimer::start();
        info!("[PIPELINE] Step 6/10: Running 100-point SEO audit...");
        let artifact: CrawlArtifact = artifact;
        let audit = AuditEngine::new(&artifact).run();
        let issues = audit.issues();
        report.score = audit.score;
        report.checks_run = audit.results.len();
        report.issues_count = issues.len();
        report.summary.score = audit.score;
        report.summary.checks_run = audit.results.len();
        report.summary.issues_found = issues.len();
        info!(
            "[PIPELINE] Step 6/10: Complete in {:.2}s - score={}, checks={}, issues={}",
            timer.elapsed_secs(),
            audit.score,
            audit.results.len(),
            issues.len()
        );

        // Step 7: LLM refinement (non-fatal).
        let timer = StageTimer::start();
        let mut recommendations: Option<LlmRecommendations> = None;
        if let Some(provider) = self.llm.get() {
            info!("[PIPELINE] Step 7/10: Getting AI recommendations...");
            if provider.health_check().await {
                match provider.refine_recommendations(url, &issues).await {
                    Ok(refined) => {
                        recommendations = Some(refined);
                        info!(
                            "[PIPELINE] Step 7/10: Complete in {:.2}s",
                            timer.elapsed_secs()
                        );
                    }
                    Err(e) => {
                        warn!("[PIPELINE] Step 7/10: AI analysis failed (non-critical) - {e}");
                        warnings.push(format!("llm refinement failed: {e}"));
                    }
                }
            } else {
                warn!("[PIPELINE] Step 7/10: LLM not available, skipping AI analysis");
                warnings.push("llm provider unavailable".to_string());
            }
        } else {
            info!("[PIPELINE] Step 7/10: Skipped AI recommendations (provider disabled)");
        }

        // Step 8: plan synthesis.
        let timer = StageTimer::start();
        info!("[PIPELINE] Step 8/10: Generating SEO plan...");
        let plan = synthesize(&PlanInputs {
            score: audit.score,
            issues: &issues,
            templates: &classification.templates,
            keywords: &keywords,
            seed_keywords: &options.seed_keywords,
            plan_duration_weeks: options.plan_duration_weeks,
        });
        report.summary.action_items = plan.action_plan.len();
        report.summary.content_pieces_planned = plan.content_calendar.len();
        info!(
            "[PIPELINE] Step 8/10: Complete in {:.2}s - {} action items, {} content items",
            timer.elapsed_secs(),
            plan.action_plan.len(),
            plan.content_calendar.len()
        );

        // Step 9: content briefs (optional).
        let briefs = if options.generate_briefs {
            let briefs = build_briefs(&plan.content_calendar);
            info!("[PIPELINE] Step 9/10: Generated {} content briefs", briefs.len());
            briefs
        } else {
            info!("[PIPELINE] Step 9/10: Skipped brief generation");
            Vec::new()
        };
        report.summary.briefs_generated = briefs.len();
        self.check_cancelled(cancel_flag)?;

        // Step 10: render reports, upload, persist. Storage failures here
        // are fatal: the run's outputs would otherwise be unreferenced.
        let timer = StageTimer::start();
        info!("[PIPELINE] Step 10/10: Rendering and persisting reports...");
        let renderer = ReportRenderer::with_templates(self.report_templates.clone());
        let bundle = renderer.render_bundle(&ReportContext {
            site_url: url,
            generated_at: Utc::now(),
            pages_crawled: artifact.pages.len(),
            audit: &audit,
            issues: &issues,
            plan: &plan,
            briefs: &briefs,
            recommendations: recommendations.as_ref(),
        });

        if let Some(storage) = &self.storage {
            report.file_urls = self
                .upload_reports(storage.as_ref(), &tenant, &site.id, report_id, &bundle)
                .await?;
        } else {
            warnings.push("blob storage disabled; reports not uploaded".to_string());
        }

        // Report upload precedes the repository commit so the URLs are
        // durable once the run is visible.
        let mut deduped: Vec<IssueSummary> = Vec::new();
        for issue in &issues {
            if !deduped.iter().any(|i| i.check_id == issue.check_id) {
                deduped.push(issue.clone());
            }
        }
        let run = AuditRunRecord {
            id: report_id.to_string(),
            site_id: site.id.clone(),
            status: PipelineStatus::Completed,
            score: audit.score,
            pages_crawled: artifact.pages.len(),
            checks_run: audit.results.len(),
            issues_count: deduped.len(),
            summary: serde_json::to_value(&audit.summary).unwrap_or_default(),
            started_at: report.started_at,
            completed_at: Utc::now(),
        };
        self.repository.commit_audit(&run, &audit.results, &deduped).await?;
        info!(
            "[PIPELINE] Step 10/10: Complete in {:.2}s - {} files uploaded",
            timer.elapsed_secs(),
            report.file_urls.len()
        );

        report.summary.warnings = warnings;
        Ok(())
    }

    fn check_cancelled(&self, cancel_flag: &Arc<AtomicBool>) -> Result<()> {
        if cancel_flag.load(Ordering::Relaxed) {
            Err(AppError::Cancelled)
        } else {
            Ok(())
        }
    }

    async fn refine_template_names(
        &self,
        url: &str,
        classification: &mut TemplateClassification,
        warnings: &mut Vec<String>,
    ) {
        let Some(provider) = self.llm.get() else {
            return;
        };
        let pairs: Vec<(String, String)> = classification
            .templates
            .iter()
            .map(|t| (t.template_id.clone(), t.name.clone()))
            .collect();
        match provider.name_templates(url, &pairs).await {
            Ok(named) => {
                for (template_id, name) in named {
                    if let Some(template) = classification
                        .templates
                        .iter_mut()
                        .find(|t| t.template_id == template_id)
                    {
                        template.name = name;
                    }
                }
            }
            Err(e) => {
                warn!("[PIPELINE] Template naming failed (non-critical) - {e}");
                warnings.push(format!("template naming failed: {e}"));
            }
        }
    }

    /// Analyze the top pages of each template and attach field metrics.
    async fn apply_pagespeed(
        &self,
        provider: &Arc<dyn PagespeedProvider>,
        artifact: &mut CrawlArtifact,
        warnings: &mut Vec<String>,
    ) -> usize {
        let mut by_template: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, page) in artifact.pages.iter().enumerate() {
            if !page.is_ok() {
                continue;
            }
            let template = page.template_id.clone().unwrap_or_else(|| "unknown".to_string());
            by_template.entry(template).or_default().push(idx);
        }

        let mut selected: Vec<usize> = Vec::new();
        for (_, mut indexes) in by_template {
            indexes.sort_by_key(|&i| std::cmp::Reverse(artifact.pages[i].word_count));
            selected.extend(indexes.into_iter().take(PAGESPEED_PAGES_PER_TEMPLATE));
        }

        let mut analyzed = 0;
        for idx in selected {
            let url = artifact.pages[idx].url.clone();
            match provider.analyze(&url, "mobile").await {
                Ok(metrics) => {
                    artifact.pages[idx].metrics = Some(PageMetrics {
                        lcp_ms: metrics.lcp_ms,
                        inp_ms: metrics.inp_ms,
                        cls: metrics.cls,
                        performance_score: metrics.performance_score,
                    });
                    analyzed += 1;
                }
                Err(e) => {
                    warn!("[PIPELINE] Pagespeed failed for {url} (non-critical) - {e}");
                    warnings.push(format!("pagespeed failed for {url}"));
                }
            }
        }
        analyzed
    }

    async fn research_keywords(
        &self,
        provider: &Arc<dyn KeywordProvider>,
        domain: &str,
        options: &PipelineOptions,
        warnings: &mut Vec<String>,
    ) -> Vec<Keyword> {
        let mut collected: Vec<Keyword> = Vec::new();

        match provider
            .keywords_for_site(domain, &options.country, &options.language, 50)
            .await
        {
            Ok(found) => collected.extend(found),
            Err(e) => {
                warn!("[PIPELINE] Domain keyword lookup failed (non-critical) - {e}");
                warnings.push(format!("keyword research failed: {e}"));
            }
        }

        if !options.seed_keywords.is_empty() {
            let seeds: Vec<String> = options.seed_keywords.iter().take(5).cloned().collect();
            match provider
                .related_keywords(&seeds, &options.country, &options.language, 50)
                .await
            {
                Ok(found) => collected.extend(found),
                Err(e) => {
                    warn!("[PIPELINE] Keyword expansion failed (non-critical) - {e}");
                    warnings.push(format!("keyword expansion failed: {e}"));
                }
            }
        }

        // Case-insensitive dedupe, capped.
        let mut seen = std::collections::HashSet::new();
        let mut unique: Vec<Keyword> = Vec::new();
        for keyword in collected {
            let key = keyword.text.to_lowercase();
            if !key.is_empty() && seen.insert(key) {
                unique.push(keyword);
            }
            if unique.len() >= KEYWORD_LIMIT {
                break;
            }
        }
        unique
    }

    async fn upload_reports(
        &self,
        storage: &dyn BlobStore,
        tenant: &str,
        site_id: &str,
        report_id: &str,
        bundle: &ReportBundle,
    ) -> Result<BTreeMap<String, String>> {
        let metadata = std::collections::HashMap::new();
        let ttl = std::time::Duration::from_secs(7 * 24 * 3600);
        let mut file_urls = BTreeMap::new();

        let documents = [
            ("executive_summary", StoragePaths::executive_summary_md(tenant, site_id, report_id), &bundle.executive_md),
            ("audit_report", StoragePaths::audit_report_md(tenant, site_id, report_id), &bundle.technical_md),
            ("seo_plan", StoragePaths::seo_plan_md(tenant, site_id, report_id), &bundle.action_md),
            ("page_fixes", StoragePaths::page_fixes_md(tenant, site_id, report_id), &bundle.page_fixes_md),
        ];
        for (name, key, content) in documents {
            storage
                .put(&key, content.as_bytes(), "text/markdown", &metadata)
                .await?;
            file_urls.insert(name.to_string(), storage.presigned_get(&key, ttl).await?);
        }

        for (idx, brief) in bundle.briefs.iter().enumerate() {
            let key = StoragePaths::article_brief_md(tenant, site_id, report_id, idx + 1, &brief.slug);
            storage
                .put(&key, brief.content.as_bytes(), "text/markdown", &metadata)
                .await?;
            file_urls.insert(
                format!("brief_{:02}", idx + 1),
                storage.presigned_get(&key, ttl).await?,
            );
        }

        let manifest = serde_json::json!({
            "report_id": report_id,
            "tenant_id": tenant,
            "site_id": site_id,
            "generated_at": Utc::now().to_rfc3339(),
            "files": file_urls.keys().collect::<Vec<_>>(),
        });
        let metadata_key = StoragePaths::report_metadata(tenant, site_id, report_id);
        storage
            .put(
                &metadata_key,
                manifest.to_string().as_bytes(),
                "application/json",
                &metadata,
            )
            .await?;
        file_urls.insert(
            "metadata".to_string(),
            storage.presigned_get(&metadata_key, ttl).await?,
        );

        Ok(file_urls)
    }
}
