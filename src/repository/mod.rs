//! Repository layer.
//!
//! The relational store (sites, audit runs, checks, issues) lives outside
//! this crate; the pipeline consumes it through `AuditRepository`. The
//! in-memory implementation backs tests and local development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::models::{CheckResult, IssueSummary, PipelineStatus};
use crate::error::{AppError, Result};

/// A tenant's site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRecord {
    pub id: String,
    pub tenant_id: String,
    pub domain: String,
    pub created_at: DateTime<Utc>,
}

/// One completed (or failed) audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRunRecord {
    pub id: String,
    pub site_id: String,
    pub status: PipelineStatus,
    pub score: u32,
    pub pages_crawled: usize,
    pub checks_run: usize,
    pub issues_count: usize,
    pub summary: serde_json::Value,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Persistence contract the pipeline consumes. `commit_audit` is atomic:
/// either the run, its checks, and its issues all land, or none do.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn find_or_create_site(&self, tenant_id: &str, domain: &str) -> Result<SiteRecord>;

    async fn commit_audit(
        &self,
        run: &AuditRunRecord,
        checks: &[CheckResult],
        issues: &[IssueSummary],
    ) -> Result<()>;

    async fn latest_completed_audit(&self, site_id: &str) -> Result<Option<AuditRunRecord>>;
}

#[derive(Default)]
struct InMemoryState {
    sites: HashMap<(String, String), SiteRecord>,
    audits: Vec<AuditRunRecord>,
    checks: HashMap<String, Vec<CheckResult>>,
    issues: HashMap<String, Vec<IssueSummary>>,
}

/// In-memory repository for tests and development.
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<InMemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audit_count(&self) -> usize {
        self.state.lock().expect("repository state poisoned").audits.len()
    }

    pub fn checks_for(&self, audit_id: &str) -> Vec<CheckResult> {
        self.state
            .lock()
            .expect("repository state poisoned")
            .checks
            .get(audit_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn issues_for(&self, audit_id: &str) -> Vec<IssueSummary> {
        self.state
            .lock()
            .expect("repository state poisoned")
            .issues
            .get(audit_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuditRepository for InMemoryRepository {
    async fn find_or_create_site(&self, tenant_id: &str, domain: &str) -> Result<SiteRecord> {
        let mut state = self.state.lock().expect("repository state poisoned");
        let key = (tenant_id.to_string(), domain.to_string());
        let site = state.sites.entry(key).or_insert_with(|| SiteRecord {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            domain: domain.to_string(),
            created_at: Utc::now(),
        });
        Ok(site.clone())
    }

    async fn commit_audit(
        &self,
        run: &AuditRunRecord,
        checks: &[CheckResult],
        issues: &[IssueSummary],
    ) -> Result<()> {
        let mut state = self.state.lock().expect("repository state poisoned");
        if state.audits.iter().any(|a| a.id == run.id) {
            return Err(AppError::repository(format!("duplicate audit run {}", run.id)));
        }
        state.audits.push(run.clone());
        state.checks.insert(run.id.clone(), checks.to_vec());
        state.issues.insert(run.id.clone(), issues.to_vec());
        Ok(())
    }

    async fn latest_completed_audit(&self, site_id: &str) -> Result<Option<AuditRunRecord>> {
        let state = self.state.lock().expect("repository state poisoned");
        Ok(state
            .audits
            .iter()
            .filter(|a| a.site_id == site_id && a.status == PipelineStatus::Completed)
            .max_by_key(|a| a.completed_at)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Category, Severity};

    fn run(id: &str, site_id: &str, score: u32) -> AuditRunRecord {
        AuditRunRecord {
            id: id.to_string(),
            site_id: site_id.to_string(),
            status: PipelineStatus::Completed,
            score,
            pages_crawled: 5,
            checks_run: 100,
            issues_count: 2,
            summary: serde_json::json!({}),
            started_at: Utc::now(),
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn find_or_create_site_is_idempotent() {
        let repo = InMemoryRepository::new();
        let a = repo.find_or_create_site("t1", "example.com").await.unwrap();
        let b = repo.find_or_create_site("t1", "example.com").await.unwrap();
        let c = repo.find_or_create_site("t2", "example.com").await.unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[tokio::test]
    async fn commit_stores_run_checks_and_issues_together() {
        let repo = InMemoryRepository::new();
        let site = repo.find_or_create_site("t1", "example.com").await.unwrap();

        let checks = vec![CheckResult {
            check_id: 11,
            category: Category::OnPage,
            check_name: "Missing Title Tag".to_string(),
            passed: false,
            severity: Severity::High,
            affected_count: 1,
            affected_urls: vec!["https://example.com/".to_string()],
            details: serde_json::json!({}),
            recommendation: "Add unique title tags to all pages (50-60 characters).".to_string(),
        }];
        let issues = vec![IssueSummary {
            check_id: 11,
            category: Category::OnPage,
            severity: Severity::High,
            title: "Missing Title Tag".to_string(),
            description: String::new(),
            suggested_fix: String::new(),
            affected_urls: vec![],
            affected_count: 1,
        }];

        repo.commit_audit(&run("r1", &site.id, 80), &checks, &issues)
            .await
            .unwrap();

        assert_eq!(repo.audit_count(), 1);
        assert_eq!(repo.checks_for("r1").len(), 1);
        assert_eq!(repo.issues_for("r1").len(), 1);

        // Same report id cannot land twice.
        assert!(repo
            .commit_audit(&run("r1", &site.id, 80), &checks, &issues)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn latest_completed_audit_picks_newest() {
        let repo = InMemoryRepository::new();
        let site = repo.find_or_create_site("t1", "example.com").await.unwrap();
        repo.commit_audit(&run("r1", &site.id, 70), &[], &[]).await.unwrap();
        repo.commit_audit(&run("r2", &site.id, 90), &[], &[]).await.unwrap();

        let latest = repo.latest_completed_audit(&site.id).await.unwrap().unwrap();
        assert_eq!(latest.id, "r2");
    }
}
