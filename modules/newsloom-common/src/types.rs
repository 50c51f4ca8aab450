use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Wire record ---

/// A single news item as harvested from a feed, pre-enrichment.
/// JSON-encoded on the queue topic; `url` is the natural key carried
/// through every sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Raw byline as reported by the feed; may embed a contact address.
    #[serde(rename = "writer")]
    pub writer_raw: String,
    pub write_date: DateTime<Utc>,
    /// Source-reported category, pre-classification.
    pub category: String,
    pub content: String,
    pub url: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// An Article augmented with cleaned byline, keywords, embedding and the
/// final classified category. Exists only in flight between the enrichment
/// orchestrator and the commit coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedArticle {
    pub title: String,
    pub writer: String,
    pub email: Option<String>,
    pub write_date: DateTime<Utc>,
    pub category: String,
    pub content: String,
    pub url: String,
    pub keywords: Vec<String>,
    pub embedding: Option<Vec<f32>>,
}

// --- Byline splitting ---

/// Marker token separating a reporter's name from a trailing contact
/// address in Korean bylines.
pub const BYLINE_MARKER: &str = "기자";

/// Split a raw byline into a cleaned writer name and an optional email.
///
/// `"홍길동 기자 hong@news.com"` → (`"홍길동 기자"`, `Some("hong@news.com")`).
/// Without the marker the trimmed input is the writer and there is no email.
pub fn split_byline(raw: &str) -> (String, Option<String>) {
    match raw.split_once(BYLINE_MARKER) {
        Some((front, back)) => {
            let writer = format!("{} {}", front.trim(), BYLINE_MARKER);
            // Only the segment up to the next marker counts as an address
            // candidate; it must contain '@' to qualify.
            let candidate = back
                .split(BYLINE_MARKER)
                .next()
                .unwrap_or_default()
                .trim();
            let email = if candidate.contains('@') {
                Some(candidate.to_string())
            } else {
                None
            };
            (writer, email)
        }
        None => (raw.trim().to_string(), None),
    }
}

// --- Categories ---

/// Closed set of article categories the classifier may return.
pub const CATEGORIES: [&str; 17] = [
    "IT_과학",
    "건강",
    "경제",
    "교육",
    "국제",
    "라이프스타일",
    "문화",
    "사건사고",
    "사회일반",
    "산업",
    "스포츠",
    "여성복지",
    "여행레저",
    "연예",
    "정치",
    "지역",
    "취미",
];

/// Sentinel for classifier output that is not in [`CATEGORIES`].
pub const UNCLASSIFIED: &str = "미분류";

/// Feed-side default when a source reports no category at all.
pub const UNCATEGORIZED_FEED: &str = "기타";

/// Normalize a classifier label to the closed category set; anything
/// off-list becomes the [`UNCLASSIFIED`] sentinel.
pub fn normalize_category(label: &str) -> String {
    let trimmed = label.trim();
    if CATEGORIES.contains(&trimmed) {
        trimmed.to_string()
    } else {
        UNCLASSIFIED.to_string()
    }
}
