//! Heuristic page-template classification.
//!
//! Pages are grouped by a structural signature built from URL shape and
//! coarse content features. Groups with fewer than two pages merge into an
//! `other` bucket. The LLM provider can rename groups afterwards; the
//! heuristics never depend on it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::info;
use url::Url;

use crate::domain::page::PageRecord;

const MIN_GROUP_SIZE: usize = 2;
const MAX_EXAMPLE_URLS: usize = 5;
const MAX_UNCLASSIFIED: usize = 20;

const BLOG_SEGMENTS: [&str; 6] = ["blog", "news", "article", "articles", "posts", "noticias"];
const PRODUCT_SEGMENTS: [&str; 7] =
    ["product", "products", "item", "shop", "store", "producto", "productos"];
const CATEGORY_SEGMENTS: [&str; 5] = ["category", "categories", "cat", "collection", "categoria"];
const INFO_SEGMENTS: [&str; 6] = ["contact", "contacto", "about", "sobre", "about-us", "sobre-nosotros"];
const FAQ_SEGMENTS: [&str; 5] = ["faq", "faqs", "help", "ayuda", "preguntas"];
const LEGAL_SEGMENTS: [&str; 6] = ["privacy", "terms", "legal", "policy", "privacidad", "cookies"];

/// A structural class of pages sharing URL shape and layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateGroup {
    pub template_id: String,
    pub name: String,
    pub description: String,
    pub url_patterns: Vec<String>,
    pub page_count: usize,
    pub example_urls: Vec<String>,
    /// Every member URL, used to scope recommendations and metrics.
    pub page_urls: Vec<String>,
    pub seo_recommendations: Vec<String>,
}

/// Result of classifying one site's crawl.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateClassification {
    pub site_url: String,
    pub total_pages: usize,
    pub templates: Vec<TemplateGroup>,
    pub unclassified_pages: Vec<String>,
}

impl TemplateClassification {
    /// Map from page URL to its template id.
    pub fn url_to_template(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for template in &self.templates {
            for url in &template.page_urls {
                map.insert(url.clone(), template.template_id.clone());
            }
        }
        map
    }
}

/// Group crawled pages into templates.
pub fn classify_templates(site_url: &str, pages: &[PageRecord]) -> TemplateClassification {
    info!("[TEMPLATES] Classifying {} pages for {}", pages.len(), site_url);

    let mut groups: BTreeMap<String, Vec<&PageRecord>> = BTreeMap::new();
    for page in pages {
        if !page.is_ok() {
            continue;
        }
        groups.entry(page_signature(page)).or_default().push(page);
    }

    let mut templates = Vec::new();
    let mut other: Vec<&PageRecord> = Vec::new();
    for (signature, group) in groups {
        if group.len() >= MIN_GROUP_SIZE {
            templates.push(build_group(&signature, &group));
        } else {
            other.extend(group);
        }
    }
    if !other.is_empty() {
        templates.push(build_group("other", &other));
    }

    let classified: HashMap<&str, ()> = templates
        .iter()
        .flat_map(|t| t.page_urls.iter().map(|u| (u.as_str(), ())))
        .collect();
    let unclassified: Vec<String> = pages
        .iter()
        .filter(|p| p.is_ok() && !classified.contains_key(p.url.as_str()))
        .map(|p| p.url.clone())
        .take(MAX_UNCLASSIFIED)
        .collect();

    info!(
        "[TEMPLATES] Classification complete: {} templates, {} unclassified",
        templates.len(),
        unclassified.len()
    );

    TemplateClassification {
        site_url: site_url.to_string(),
        total_pages: pages.len(),
        templates,
        unclassified_pages: unclassified,
    }
}

/// Structural signature for one page.
fn page_signature(page: &PageRecord) -> String {
    let path = Url::parse(&page.url)
        .map(|u| u.path().trim_end_matches('/').to_string())
        .unwrap_or_default();
    let mut parts: Vec<String> = path.split('/').filter(|p| !p.is_empty()).map(str::to_string).collect();

    if parts.is_empty() {
        return "homepage".to_string();
    }

    // Language prefix, e.g. /en/, /es/.
    let mut lang_prefix = String::new();
    if parts[0].len() == 2 && parts[0].chars().all(|c| c.is_ascii_alphabetic()) {
        lang_prefix = parts.remove(0);
    }
    if parts.is_empty() {
        return suffixed("homepage", &lang_prefix, "");
    }

    let depth = parts.len();
    let has_any = |set: &[&str]| parts.iter().any(|p| set.contains(&p.as_str()));

    if has_any(&BLOG_SEGMENTS) {
        let base = if depth >= 2 { "blog_post" } else { "blog_index" };
        return suffixed(base, &lang_prefix, "");
    }
    if has_any(&PRODUCT_SEGMENTS) {
        let base = if depth >= 2 { "product_page" } else { "product_listing" };
        return suffixed(base, &lang_prefix, "");
    }
    if has_any(&CATEGORY_SEGMENTS) {
        return suffixed("category_page", &lang_prefix, "");
    }
    if has_any(&INFO_SEGMENTS) {
        return suffixed("info_page", &lang_prefix, "");
    }
    if has_any(&FAQ_SEGMENTS) {
        return suffixed("faq_page", &lang_prefix, "");
    }
    if has_any(&LEGAL_SEGMENTS) {
        return suffixed("legal_page", &lang_prefix, "");
    }

    // Content-based class for everything else.
    let content_type = if page.word_count > 1000 && page.h2.len() >= 3 {
        "long_form"
    } else if page.images.len() > 5 && page.word_count < 300 {
        "gallery"
    } else if page.word_count < 100 {
        "minimal"
    } else {
        ""
    };

    let url_pattern = if depth >= 2 {
        format!("{}_detail", parts[0])
    } else {
        format!("{}_page", parts[0])
    };
    suffixed(&url_pattern, &lang_prefix, content_type)
}

fn suffixed(base: &str, lang: &str, content_type: &str) -> String {
    let mut signature = base.to_string();
    if !lang.is_empty() {
        signature.push('_');
        signature.push_str(lang);
    }
    if !content_type.is_empty() {
        signature.push('_');
        signature.push_str(content_type);
    }
    signature
}

fn build_group(signature: &str, pages: &[&PageRecord]) -> TemplateGroup {
    TemplateGroup {
        template_id: signature.to_string(),
        name: display_name(signature),
        description: format!("{} pages sharing the `{}` structure", pages.len(), signature),
        url_patterns: pages
            .iter()
            .take(3)
            .filter_map(|p| Url::parse(&p.url).ok().map(|u| u.path().to_string()))
            .collect(),
        page_count: pages.len(),
        example_urls: pages.iter().take(MAX_EXAMPLE_URLS).map(|p| p.url.clone()).collect(),
        page_urls: pages.iter().map(|p| p.url.clone()).collect(),
        seo_recommendations: group_recommendations(pages),
    }
}

fn display_name(signature: &str) -> String {
    let base = match signature.split('_').next().unwrap_or("") {
        "homepage" => return "Homepage".to_string(),
        "blog" => "Blog",
        "product" => "Product",
        "category" => "Category",
        "info" => "Info",
        "faq" => "FAQ",
        "legal" => "Legal",
        "other" => return "Other Pages".to_string(),
        other => other,
    };
    let mut name: Vec<String> = vec![base.to_string()];
    if signature.contains("_post") || signature.contains("_detail") {
        name.push("Detail".to_string());
    } else if signature.contains("_index") || signature.contains("_listing") {
        name.push("Listing".to_string());
    } else {
        name.push("Page".to_string());
    }
    let mut label = name.join(" ");
    if let Some(first) = label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    label
}

/// Rule-based recommendations scoped to all pages of a template.
fn group_recommendations(pages: &[&PageRecord]) -> Vec<String> {
    let total = pages.len().max(1);
    let mut recommendations = Vec::new();

    let missing_desc = pages.iter().filter(|p| p.meta_description.is_none()).count();
    if missing_desc * 2 > total {
        recommendations.push("Add unique meta descriptions to this template".to_string());
    }
    let missing_h1 = pages.iter().filter(|p| p.h1.is_empty()).count();
    if missing_h1 * 2 > total {
        recommendations.push("Add an H1 heading to this template".to_string());
    }
    let thin = pages.iter().filter(|p| p.word_count < 300).count();
    if thin * 2 > total {
        recommendations.push("Expand template content beyond 300 words".to_string());
    }
    let missing_alt = pages
        .iter()
        .filter(|p| {
            p.images
                .iter()
                .any(|img| img.alt.as_deref().map_or(true, |a| a.trim().is_empty()))
        })
        .count();
    if missing_alt * 2 > total {
        recommendations.push("Add alt text to template images".to_string());
    }
    let no_schema = pages.iter().filter(|p| p.structured_data.is_empty()).count();
    if no_schema * 2 > total {
        recommendations.push("Add JSON-LD structured data to this template".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, word_count: usize) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            final_url: url.to_string(),
            status_code: 200,
            word_count,
            ..PageRecord::default()
        }
    }

    #[test]
    fn homepage_gets_its_own_signature() {
        assert_eq!(page_signature(&page("https://example.com/", 500)), "homepage");
        assert_eq!(page_signature(&page("https://example.com", 500)), "homepage");
    }

    #[test]
    fn blog_posts_group_together() {
        let a = page("https://example.com/blog/first-post", 800);
        let b = page("https://example.com/blog/second-post", 900);
        assert_eq!(page_signature(&a), "blog_post");
        assert_eq!(page_signature(&a), page_signature(&b));
    }

    #[test]
    fn language_prefix_is_folded_into_the_signature() {
        let a = page("https://example.com/en/blog/post", 700);
        assert_eq!(page_signature(&a), "blog_post_en");
    }

    #[test]
    fn product_listing_vs_detail() {
        assert_eq!(
            page_signature(&page("https://example.com/products", 300)),
            "product_listing"
        );
        assert_eq!(
            page_signature(&page("https://example.com/products/blue-widget", 300)),
            "product_page"
        );
    }

    #[test]
    fn singletons_merge_into_other() {
        let pages = vec![
            page("https://example.com/blog/a", 500),
            page("https://example.com/blog/b", 500),
            page("https://example.com/lonely", 500),
        ];
        let classification = classify_templates("https://example.com", &pages);
        let ids: Vec<&str> = classification
            .templates
            .iter()
            .map(|t| t.template_id.as_str())
            .collect();
        assert!(ids.contains(&"blog_post"));
        assert!(ids.contains(&"other"));
    }

    #[test]
    fn thin_template_gets_content_recommendation() {
        let pages = vec![
            page("https://example.com/services/a", 100),
            page("https://example.com/services/b", 120),
        ];
        let classification = classify_templates("https://example.com", &pages);
        let group = &classification.templates[0];
        assert!(group
            .seo_recommendations
            .iter()
            .any(|r| r.contains("Expand template content")));
    }

    #[test]
    fn url_to_template_maps_every_example() {
        let pages = vec![
            page("https://example.com/blog/a", 500),
            page("https://example.com/blog/b", 500),
        ];
        let classification = classify_templates("https://example.com", &pages);
        let map = classification.url_to_template();
        assert_eq!(map.get("https://example.com/blog/a").map(String::as_str), Some("blog_post"));
    }
}
