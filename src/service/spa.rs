//! Static SPA detection.
//!
//! Decides from the statically fetched HTML whether a page's content likely
//! only appears after client-side script execution, and which framework is
//! involved. The browser-side probe in `renderer` refines the framework
//! name after a real render.

use scraper::{Html, Selector};
use std::sync::OnceLock;

macro_rules! cached_selector {
    ($sel:literal) => {{
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        SELECTOR.get_or_init(|| Selector::parse($sel).unwrap())
    }};
}

/// Outcome of static SPA detection.
#[derive(Debug, Clone, Default)]
pub struct SpaDetection {
    pub is_spa: bool,
    pub framework: Option<String>,
    pub reasons: Vec<String>,
}

const FRAMEWORK_SCRIPT_HINTS: [&str; 7] =
    ["react", "vue", "angular", "next", "nuxt", "gatsby", "svelte"];

/// Inspect raw HTML for framework markers and thin-shell patterns.
pub fn detect_spa_from_html(html_str: &str) -> SpaDetection {
    let html = Html::parse_document(html_str);
    let mut detection = SpaDetection::default();

    let mut mark = |framework: &str, reason: &str| {
        if detection.framework.is_none() {
            detection.framework = Some(framework.to_string());
        }
        detection.reasons.push(reason.to_string());
    };

    if html.select(cached_selector!("[data-reactroot]")).next().is_some()
        || html.select(cached_selector!("[data-reactid]")).next().is_some()
    {
        mark("react", "React root element detected");
    }
    if html_str.contains("data-v-") || html.select(cached_selector!("#app")).next().is_some() {
        mark("vue", "Vue.js markers detected");
    }
    if html.select(cached_selector!("[ng-version]")).next().is_some()
        || html_str.contains("_ngcontent-")
    {
        mark("angular", "Angular markers detected");
    }
    if html.select(cached_selector!("#__next")).next().is_some() {
        mark("nextjs", "Next.js root element detected");
    }
    if html.select(cached_selector!("#__nuxt")).next().is_some() {
        mark("nuxt", "Nuxt.js root element detected");
    }
    if html.select(cached_selector!("[class*='svelte-']")).next().is_some() {
        mark("svelte", "Svelte scoped classes detected");
    }
    if html.select(cached_selector!("#___gatsby")).next().is_some() {
        mark("gatsby", "Gatsby root element detected");
    }
    if html.select(cached_selector!("[id^='ember']")).next().is_some() {
        mark("ember", "Ember root element detected");
    }

    // Thin shell: almost no body text but a pile of external scripts.
    let body_text_len = body_text_len(&html);
    let external_scripts = html.select(cached_selector!("script[src]")).count();
    if body_text_len < 300 && external_scripts > 5 {
        detection.reasons.push(format!(
            "Minimal body content ({body_text_len} chars) with {external_scripts} external scripts"
        ));
    }

    // Empty mount point.
    if let Some(root) = html
        .select(cached_selector!("#root"))
        .next()
        .or_else(|| html.select(cached_selector!("#app")).next())
    {
        let root_text: String = root.text().collect::<String>().trim().to_string();
        if root_text.chars().count() <= 100 {
            detection.reasons.push("Empty or minimal root container element".to_string());
        }
    }

    detection.is_spa = !detection.reasons.is_empty();
    detection
}

/// Pure predicate: should this statically fetched page be re-rendered?
pub fn needs_js_rendering(
    word_count: usize,
    min_word_count_threshold: usize,
    static_html: &str,
) -> (bool, String) {
    if word_count < min_word_count_threshold {
        return (true, format!("Low word count ({word_count})"));
    }

    let detection = detect_spa_from_html(static_html);
    if detection.is_spa {
        let framework = detection.framework.as_deref().unwrap_or("unknown");
        let reason = detection
            .reasons
            .first()
            .map(String::as_str)
            .unwrap_or("markers detected");
        return (true, format!("SPA detected ({framework}): {reason}"));
    }

    // Framework bundles referenced from script sources.
    let html = Html::parse_document(static_html);
    for script in html.select(cached_selector!("script[src]")) {
        let src = script.value().attr("src").unwrap_or("").to_ascii_lowercase();
        for hint in FRAMEWORK_SCRIPT_HINTS {
            if src.contains(hint) {
                return (true, format!("JavaScript framework detected in script: {hint}"));
            }
        }
    }

    (false, String::new())
}

fn body_text_len(html: &Html) -> usize {
    html.select(cached_selector!("body"))
        .next()
        .map(|body| body.text().collect::<String>().trim().chars().count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_page_is_not_a_spa() {
        let html = "<html><body><h1>Hello</h1><p>Plenty of server rendered content here.</p></body></html>";
        let detection = detect_spa_from_html(html);
        assert!(!detection.is_spa);
        assert!(detection.framework.is_none());
    }

    #[test]
    fn detects_next_root() {
        let html = r#"<html><body><div id="__next"></div><script src="/_next/app.js"></script></body></html>"#;
        let detection = detect_spa_from_html(html);
        assert!(detection.is_spa);
        assert_eq!(detection.framework.as_deref(), Some("nextjs"));
    }

    #[test]
    fn detects_react_root_attribute() {
        let html = r#"<html><body><div data-reactroot=""></div></body></html>"#;
        let detection = detect_spa_from_html(html);
        assert_eq!(detection.framework.as_deref(), Some("react"));
    }

    #[test]
    fn empty_app_container_counts_as_spa() {
        let html = r#"<html><body><div id="app"></div></body></html>"#;
        let detection = detect_spa_from_html(html);
        assert!(detection.is_spa);
    }

    #[test]
    fn low_word_count_triggers_rendering() {
        let html = "<html><body><p>short</p></body></html>";
        let (needs, reason) = needs_js_rendering(10, 50, html);
        assert!(needs);
        assert!(reason.contains("Low word count"));
    }

    #[test]
    fn content_rich_page_needs_no_rendering() {
        let words = "word ".repeat(400);
        let html = format!("<html><body><p>{words}</p></body></html>");
        let (needs, _) = needs_js_rendering(400, 50, &html);
        assert!(!needs);
    }

    #[test]
    fn framework_script_src_triggers_rendering() {
        let words = "word ".repeat(400);
        let html = format!(
            "<html><head><script src=\"/assets/vue.runtime.min.js\"></script></head><body><p>{words}</p></body></html>"
        );
        let (needs, reason) = needs_js_rendering(400, 50, &html);
        assert!(needs);
        assert!(reason.contains("vue"));
    }
}
