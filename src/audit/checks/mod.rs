//! The check catalogue: ten categories, ten checks each, ids 1..=100.
//!
//! Ids, severities, and recommendations are stable across releases; the
//! registry is ordered by id and that order is the evaluation order.

mod content;
mod crawlability;
mod linking;
mod mobile;
mod onpage;
mod performance;
mod security;
mod server;
mod structured_data;
mod urls;

use std::collections::HashSet;
use url::Url;

use super::CheckSpec;
use crate::domain::page::{CrawlArtifact, PageRecord};

/// All 100 checks in evaluation order.
pub fn registry() -> Vec<CheckSpec> {
    let mut specs = Vec::with_capacity(100);
    specs.extend(crawlability::checks());
    specs.extend(onpage::checks());
    specs.extend(performance::checks());
    specs.extend(urls::checks());
    specs.extend(linking::checks());
    specs.extend(content::checks());
    specs.extend(structured_data::checks());
    specs.extend(security::checks());
    specs.extend(mobile::checks());
    specs.extend(server::checks());
    specs
}

// Helpers shared across categories.

/// Pages that answered with a 2xx status.
pub(crate) fn ok_pages(artifact: &CrawlArtifact) -> impl Iterator<Item = &PageRecord> {
    artifact.pages.iter().filter(|p| p.is_ok())
}

pub(crate) fn trim_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}

pub(crate) fn url_path(url: &str) -> String {
    Url::parse(url).map(|u| u.path().to_string()).unwrap_or_default()
}

/// Number of non-empty path segments.
pub(crate) fn path_depth(url: &str) -> usize {
    url_path(url).split('/').filter(|p| !p.is_empty()).count()
}

/// `@type` of a structured-data block, when it is a plain string.
pub(crate) fn schema_type(block: &serde_json::Value) -> Option<&str> {
    block.get("@type").and_then(|t| t.as_str())
}

pub(crate) fn has_schema_type(page: &PageRecord, types: &[&str]) -> bool {
    page.structured_data
        .iter()
        .any(|sd| schema_type(sd).map_or(false, |t| types.contains(&t)))
}

/// Every internal-link target across the crawl, trailing-slash-insensitive.
pub(crate) fn linked_urls(artifact: &CrawlArtifact) -> HashSet<String> {
    artifact
        .pages
        .iter()
        .flat_map(|p| p.internal_links.iter())
        .map(|l| trim_slash(&l.url).to_string())
        .collect()
}

/// Pages whose incoming-link set is empty, homepage excluded.
pub(crate) fn orphan_pages(artifact: &CrawlArtifact) -> Vec<String> {
    let linked = linked_urls(artifact);
    let homepage = artifact.homepage();
    ok_pages(artifact)
        .filter(|p| {
            let url = trim_slash(&p.url);
            url != homepage && !linked.contains(url)
        })
        .map(|p| p.url.clone())
        .collect()
}

/// Pages sharing a non-empty text content hash, flattened to URLs, plus
/// the duplicate groups for details.
pub(crate) fn duplicate_content_groups(artifact: &CrawlArtifact) -> (Vec<String>, Vec<Vec<String>>) {
    let mut by_hash: std::collections::BTreeMap<&str, Vec<String>> = std::collections::BTreeMap::new();
    for page in ok_pages(artifact) {
        if !page.text_content_hash.is_empty() {
            by_hash.entry(&page.text_content_hash).or_default().push(page.url.clone());
        }
    }
    let groups: Vec<Vec<String>> = by_hash.into_values().filter(|urls| urls.len() > 1).collect();
    let urls = groups.iter().flatten().cloned().collect();
    (urls, groups)
}
