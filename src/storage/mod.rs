//! Keyed blob storage.
//!
//! The pipeline only ever talks to the `BlobStore` trait; a filesystem
//! implementation ships for development and tests, an S3-compatible one
//! lives with the deployment. Keys partition by tenant and site.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use xxhash_rust::xxh3::xxh3_128;

use crate::error::{AppError, Result};

/// Identifies where a run's blobs live.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    pub tenant_id: String,
    pub site_id: String,
    pub crawl_id: String,
}

/// 12-hex-char stable key fragment for a URL.
pub fn url_hash(url: &str) -> String {
    format!("{:032x}", xxh3_128(url.as_bytes()))[..12].to_string()
}

/// Helper for consistent storage paths.
pub struct StoragePaths;

impl StoragePaths {
    pub fn report_base(tenant_id: &str, site_id: &str, report_id: &str) -> String {
        format!("tenants/{tenant_id}/sites/{site_id}/reports/{report_id}/")
    }

    pub fn executive_summary_md(tenant_id: &str, site_id: &str, report_id: &str) -> String {
        format!("{}executive-summary.md", Self::report_base(tenant_id, site_id, report_id))
    }

    pub fn audit_report_md(tenant_id: &str, site_id: &str, report_id: &str) -> String {
        format!("{}audit-report.md", Self::report_base(tenant_id, site_id, report_id))
    }

    pub fn seo_plan_md(tenant_id: &str, site_id: &str, report_id: &str) -> String {
        format!("{}seo-plan.md", Self::report_base(tenant_id, site_id, report_id))
    }

    pub fn page_fixes_md(tenant_id: &str, site_id: &str, report_id: &str) -> String {
        format!("{}page-fixes.md", Self::report_base(tenant_id, site_id, report_id))
    }

    pub fn article_brief_md(
        tenant_id: &str,
        site_id: &str,
        report_id: &str,
        brief_num: usize,
        keyword_slug: &str,
    ) -> String {
        format!(
            "{}briefs/article-{brief_num:02}-{keyword_slug}.md",
            Self::report_base(tenant_id, site_id, report_id)
        )
    }

    pub fn report_metadata(tenant_id: &str, site_id: &str, report_id: &str) -> String {
        format!("{}metadata.json", Self::report_base(tenant_id, site_id, report_id))
    }

    pub fn crawl_pages(tenant_id: &str, site_id: &str, crawl_id: &str) -> String {
        format!("tenants/{tenant_id}/sites/{site_id}/crawls/{crawl_id}/pages/")
    }

    pub fn page_html(scope: &CrawlScope, url_hash_12: &str) -> String {
        format!(
            "{}{url_hash_12}.html",
            Self::crawl_pages(&scope.tenant_id, &scope.site_id, &scope.crawl_id)
        )
    }
}

/// Keyed blob sink with presigned retrieval.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    async fn presigned_get(&self, key: &str, ttl: Duration) -> Result<String>;
}

/// Local-filesystem store for development and tests. Presigned URLs are
/// plain `file://` paths; object metadata is not persisted.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.split('/').any(|part| part == "..") {
            return Err(AppError::storage(format!("invalid key: {key}")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        _content_type: &str,
        _metadata: &HashMap<String, String>,
    ) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage(format!("mkdir {}: {e}", parent.display())))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::storage(format!("write {key}: {e}")))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::storage(format!("read {key}: {e}")))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let root = self.root.clone();
        let prefix = prefix.to_string();
        let keys = tokio::task::spawn_blocking(move || -> std::io::Result<Vec<String>> {
            let mut keys = Vec::new();
            let mut stack = vec![root.clone()];
            while let Some(dir) = stack.pop() {
                let Ok(entries) = std::fs::read_dir(&dir) else {
                    continue;
                };
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.is_dir() {
                        stack.push(path);
                    } else if let Ok(rel) = path.strip_prefix(&root) {
                        let key = rel.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/");
                        if key.starts_with(&prefix) {
                            keys.push(key);
                        }
                    }
                }
            }
            keys.sort();
            Ok(keys)
        })
        .await
        .map_err(|e| AppError::storage(format!("list task failed: {e}")))?
        .map_err(|e| AppError::storage(format!("list: {e}")))?;
        Ok(keys)
    }

    async fn presigned_get(&self, key: &str, _ttl: Duration) -> Result<String> {
        let path = self.path_for(key)?;
        let absolute = absolutize(&path);
        Ok(format!("file://{}", absolute.display()))
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> CrawlScope {
        CrawlScope {
            tenant_id: "t1".to_string(),
            site_id: "s1".to_string(),
            crawl_id: "c1".to_string(),
        }
    }

    #[test]
    fn url_hash_is_stable_and_short() {
        let a = url_hash("https://example.com/page");
        let b = url_hash("https://example.com/page");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert_ne!(a, url_hash("https://example.com/other"));
    }

    #[test]
    fn paths_partition_by_tenant_and_site() {
        assert_eq!(
            StoragePaths::audit_report_md("t1", "s1", "r1"),
            "tenants/t1/sites/s1/reports/r1/audit-report.md"
        );
        assert_eq!(
            StoragePaths::article_brief_md("t1", "s1", "r1", 3, "boutique-hotels"),
            "tenants/t1/sites/s1/reports/r1/briefs/article-03-boutique-hotels.md"
        );
        assert_eq!(
            StoragePaths::page_html(&scope(), "abc123def456"),
            "tenants/t1/sites/s1/crawls/c1/pages/abc123def456.html"
        );
    }

    #[tokio::test]
    async fn fs_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        store
            .put("tenants/t1/sites/s1/reports/r1/audit-report.md", b"# Report", "text/markdown", &HashMap::new())
            .await
            .unwrap();

        let bytes = store
            .get("tenants/t1/sites/s1/reports/r1/audit-report.md")
            .await
            .unwrap();
        assert_eq!(bytes, b"# Report");

        let keys = store.list("tenants/t1/sites/s1/reports/").await.unwrap();
        assert_eq!(keys.len(), 1);

        let url = store
            .presigned_get("tenants/t1/sites/s1/reports/r1/audit-report.md", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(url.starts_with("file://"));
    }

    #[tokio::test]
    async fn rejects_path_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let result = store.get("tenants/../../etc/passwd").await;
        assert!(result.is_err());
    }
}
