//! Intent-specific content briefs.
//!
//! Each planned content piece becomes a writing brief tailored to its
//! search intent: transactional pages push conversion, commercial pages
//! compare, navigational pages inform about the entity, and everything
//! else becomes a guide.

use crate::domain::models::{ContentBrief, ContentItem, OutlineSection};

/// Briefs generated per run.
pub const MAX_BRIEFS: usize = 5;

/// Build briefs for the first `MAX_BRIEFS` calendar entries.
pub fn build_briefs(calendar: &[ContentItem]) -> Vec<ContentBrief> {
    calendar
        .iter()
        .take(MAX_BRIEFS)
        .map(|item| {
            let keyword = item
                .target_keywords
                .first()
                .cloned()
                .unwrap_or_else(|| item.title.clone());
            let intent = item.intent.as_deref().unwrap_or("informational");
            brief_for(&keyword, intent, &item.content_type, item.search_volume, &item.target_keywords)
        })
        .collect()
}

fn brief_for(
    keyword: &str,
    intent: &str,
    content_type: &str,
    search_volume: u64,
    related: &[String],
) -> ContentBrief {
    let keyword_title = title_case_words(keyword);
    let mut keywords_to_include: Vec<String> = related.to_vec();
    if !keywords_to_include.iter().any(|k| k == keyword) {
        keywords_to_include.push(keyword.to_string());
    }

    let mut brief = match intent {
        "transactional" => ContentBrief {
            keyword: keyword.to_string(),
            intent: intent.to_string(),
            content_type: content_type.to_string(),
            search_volume,
            title_suggestions: vec![
                format!("Book {keyword_title} - Best Rates & Availability"),
                format!("{keyword_title} | Official Reservations"),
                format!("Reserve {keyword_title} - Exclusive Offers Available"),
            ],
            meta_description: format!(
                "Book {keyword} with best price guarantee. Check availability, compare rates, and secure your reservation today. Special offers available."
            ),
            target_word_count: 800,
            content_outline: outline(&[
                ("Overview", &["Location highlights", "Key features & amenities", "Star rating & reviews"]),
                ("Room Types & Rates", &["Room categories", "Price comparison", "What's included"]),
                ("Booking Information", &["How to book", "Cancellation policy", "Payment options"]),
                ("Special Offers", &["Current promotions", "Seasonal deals", "Package deals"]),
                ("Guest Reviews", &["Recent testimonials", "Rating summary", "What guests love"]),
            ]),
            keywords_to_include: Vec::new(),
            differentiation_angle:
                "Focus on trust signals (reviews, guarantees), clear CTAs, and urgency elements."
                    .to_string(),
            cta_suggestions: vec![
                "Book Now".to_string(),
                "Check Availability".to_string(),
                "Get Best Price".to_string(),
            ],
        },
        "commercial" => ContentBrief {
            keyword: keyword.to_string(),
            intent: intent.to_string(),
            content_type: content_type.to_string(),
            search_volume,
            title_suggestions: vec![
                format!("Best {keyword_title} - Expert Reviews & Comparison"),
                format!("Top {keyword_title} Ranked"),
                format!("{keyword_title} Guide: Which One Is Right for You?"),
            ],
            meta_description: format!(
                "Compare the best {keyword} options with our expert guide. Detailed reviews, pros & cons, and recommendations to help you choose."
            ),
            target_word_count: 2000,
            content_outline: outline(&[
                ("Introduction", &["Why this comparison matters", "Selection criteria", "How we evaluated"]),
                ("Quick Comparison Table", &["Side-by-side features", "Price ranges", "Our ratings"]),
                ("Detailed Reviews", &["Option 1 deep-dive", "Option 2 deep-dive", "Option 3 deep-dive"]),
                ("Pros and Cons", &["Strengths of each", "Weaknesses to consider", "Best for whom"]),
                ("How to Choose", &["Key factors to consider", "Budget considerations", "Specific needs matching"]),
                ("Our Recommendation", &["Best overall", "Best value", "Best premium option"]),
            ]),
            keywords_to_include: Vec::new(),
            differentiation_angle:
                "Provide genuine comparisons with real pros/cons. Include comparison tables and clear recommendations."
                    .to_string(),
            cta_suggestions: vec![
                "See Full Details".to_string(),
                "Compare Prices".to_string(),
                "Read Full Review".to_string(),
            ],
        },
        "navigational" => ContentBrief {
            keyword: keyword.to_string(),
            intent: intent.to_string(),
            content_type: content_type.to_string(),
            search_volume,
            title_suggestions: vec![
                format!("{keyword_title} - Official Information"),
                format!("About {keyword_title} | Location, Contact & Details"),
                format!("{keyword_title} - Everything You Need to Know"),
            ],
            meta_description: format!(
                "Official information about {keyword}. Find location details, contact information, hours, and everything you need to plan your visit."
            ),
            target_word_count: 1000,
            content_outline: outline(&[
                ("About", &["What it is", "History/background", "What makes it special"]),
                ("Location & Access", &["Address", "How to get there", "Parking/transport"]),
                ("Services & Amenities", &["Main offerings", "Facilities", "Special features"]),
                ("Contact Information", &["Phone/email", "Business hours", "Social media"]),
                ("Nearby Attractions", &["Points of interest", "Restaurants", "Activities"]),
            ]),
            keywords_to_include: Vec::new(),
            differentiation_angle:
                "Focus on accurate, up-to-date practical information. Make it easy to find key details."
                    .to_string(),
            cta_suggestions: vec![
                "Get Directions".to_string(),
                "Contact Us".to_string(),
                "Visit Website".to_string(),
            ],
        },
        _ => ContentBrief {
            keyword: keyword.to_string(),
            intent: intent.to_string(),
            content_type: content_type.to_string(),
            search_volume,
            title_suggestions: vec![
                format!("Complete Guide to {keyword_title}"),
                format!("{keyword_title}: What You Need to Know"),
                format!("Everything About {keyword_title} - Tips & Insights"),
            ],
            meta_description: format!(
                "Discover everything about {keyword}. Our comprehensive guide covers tips, recommendations, and insider knowledge to help you make the most of your experience."
            ),
            target_word_count: 1500,
            content_outline: outline(&[
                ("Introduction", &["What this guide covers", "Why it matters", "Who this is for"]),
                ("Overview", &["Background information", "Key facts", "What to expect"]),
                ("Key Highlights", &["Top features", "Must-see/must-do", "Hidden gems"]),
                ("Practical Tips", &["Best time to visit/use", "Money-saving advice", "Common mistakes to avoid"]),
                ("Frequently Asked Questions", &["Common question 1", "Common question 2", "Common question 3"]),
                ("Summary & Next Steps", &["Key takeaways", "Related topics", "Action items"]),
            ]),
            keywords_to_include: Vec::new(),
            differentiation_angle:
                "Provide actionable insights and practical tips that readers can immediately use."
                    .to_string(),
            cta_suggestions: vec![
                "Learn More".to_string(),
                "Read Related Guide".to_string(),
                "Get Started".to_string(),
            ],
        },
    };

    keywords_to_include.extend(intent_modifiers(intent).iter().map(|s| s.to_string()));
    keywords_to_include.dedup();
    brief.keywords_to_include = keywords_to_include;
    brief
}

fn intent_modifiers(intent: &str) -> &'static [&'static str] {
    match intent {
        "transactional" => &["book", "reserve", "rates", "availability"],
        "commercial" => &["best", "review", "compare", "top", "vs"],
        "navigational" => &["location", "contact", "hours", "address"],
        _ => &["guide", "tips", "how to", "best"],
    }
}

fn outline(sections: &[(&str, &[&str])]) -> Vec<OutlineSection> {
    sections
        .iter()
        .map(|(heading, points)| OutlineSection {
            heading: heading.to_string(),
            key_points: points.iter().map(|p| p.to_string()).collect(),
        })
        .collect()
}

fn title_case_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(keyword: &str, intent: &str, content_type: &str) -> ContentItem {
        ContentItem {
            week: 4,
            title: format!("{content_type}: {keyword}"),
            content_type: content_type.to_string(),
            target_keywords: vec![keyword.to_string()],
            search_volume: 1200,
            intent: Some(intent.to_string()),
            status: "planned".to_string(),
        }
    }

    #[test]
    fn caps_at_five_briefs() {
        let calendar: Vec<ContentItem> = (0..8)
            .map(|i| item(&format!("kw {i}"), "informational", "Blog Post"))
            .collect();
        assert_eq!(build_briefs(&calendar).len(), 5);
    }

    #[test]
    fn transactional_brief_pushes_conversion() {
        let briefs = build_briefs(&[item("hotel sevilla centro", "transactional", "Landing Page")]);
        let brief = &briefs[0];
        assert_eq!(brief.target_word_count, 800);
        assert!(brief.title_suggestions[0].starts_with("Book "));
        assert!(brief.cta_suggestions.contains(&"Book Now".to_string()));
        assert!(brief.keywords_to_include.contains(&"availability".to_string()));
    }

    #[test]
    fn informational_brief_is_a_guide() {
        let briefs = build_briefs(&[item("boutique hotels", "informational", "Blog Post")]);
        let brief = &briefs[0];
        assert_eq!(brief.target_word_count, 1500);
        assert!(brief.title_suggestions[0].contains("Guide"));
        assert!(brief
            .content_outline
            .iter()
            .any(|s| s.heading == "Frequently Asked Questions"));
    }

    #[test]
    fn keyword_always_appears_in_keywords_to_include() {
        let briefs = build_briefs(&[item("rural escapes", "commercial", "Comparison/Review")]);
        assert!(briefs[0]
            .keywords_to_include
            .contains(&"rural escapes".to_string()));
    }
}
