use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use ai_client::OpenAi;
use newsloom_common::{
    normalize_category, split_byline, Article, EnrichedArticle, CATEGORIES, UNCLASSIFIED,
};

/// Character cap on article text sent to remote enrichment calls; bounds
/// cost and latency per call.
pub const MAX_ENRICH_CHARS: usize = 12_000;

/// Keywords requested per article.
pub const KEYWORD_COUNT: usize = 5;

const CHAT_MODEL: &str = "gpt-4o-mini";

const KEYWORD_PROMPT: &str =
    "다음 뉴스 기사 본문에서 핵심 키워드 5개를 쉼표로 구분하여 추출해주세요.";

fn classify_prompt() -> String {
    format!(
        "다음 뉴스 기사 본문을 읽고 가장 적절한 카테고리를 다음 목록 중에서 하나만 선택해서 출력하세요:\n{}",
        CATEGORIES.join(", ")
    )
}

/// The three independent remote enrichment calls. Each fails on its own;
/// substitution policy lives in the orchestrator, not here.
#[async_trait]
pub trait EnrichmentBackend: Send + Sync {
    async fn keywords(&self, text: &str) -> Result<Vec<String>>;
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    async fn classify(&self, text: &str) -> Result<String>;
}

/// OpenAI-backed enrichment calls.
pub struct OpenAiEnrichment {
    ai: OpenAi,
}

impl OpenAiEnrichment {
    pub fn new(api_key: &str, timeout: Duration) -> Self {
        Self {
            ai: OpenAi::new(api_key, CHAT_MODEL).with_timeout(timeout),
        }
    }
}

#[async_trait]
impl EnrichmentBackend for OpenAiEnrichment {
    async fn keywords(&self, text: &str) -> Result<Vec<String>> {
        let out = self
            .ai
            .chat_completion(KEYWORD_PROMPT, text, 100, None)
            .await?;
        Ok(out
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.ai.embed(text).await
    }

    async fn classify(&self, text: &str) -> Result<String> {
        self.ai
            .chat_completion(classify_prompt(), text, 20, Some(0.2))
            .await
    }
}

/// Assembles an [`EnrichedArticle`] from an [`Article`]. Each remote call
/// fails independently and is substituted with a safe default; an
/// enrichment failure never drops the article.
pub struct Enricher {
    backend: Box<dyn EnrichmentBackend>,
}

impl Enricher {
    pub fn new(backend: Box<dyn EnrichmentBackend>) -> Self {
        Self { backend }
    }

    pub async fn enrich(&self, article: Article) -> EnrichedArticle {
        let text = cap_text(&article.content);

        let keywords = match self.backend.keywords(text).await {
            Ok(mut keywords) => {
                keywords.truncate(KEYWORD_COUNT);
                keywords
            }
            Err(e) => {
                warn!(url = %article.url, error = %e, "keyword extraction failed, using empty list");
                Vec::new()
            }
        };

        let embedding = match self.backend.embed(text).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                // The article persists without a vector; it just drops out
                // of similarity features downstream.
                warn!(url = %article.url, error = %e, "embedding failed, persisting without vector");
                None
            }
        };

        let category = match self.backend.classify(text).await {
            Ok(label) => normalize_category(&label),
            Err(e) => {
                warn!(url = %article.url, error = %e, "classification failed, marking unclassified");
                UNCLASSIFIED.to_string()
            }
        };

        let (writer, email) = split_byline(&article.writer_raw);
        let writer = if writer.is_empty() {
            "unknown".to_string()
        } else {
            writer
        };

        info!(
            url = %article.url,
            keywords = keywords.len(),
            has_embedding = embedding.is_some(),
            category = %category,
            "article enriched"
        );

        EnrichedArticle {
            title: article.title,
            writer,
            email,
            write_date: article.write_date,
            category,
            content: article.content,
            url: article.url,
            keywords,
            embedding,
        }
    }
}

/// Truncate on a char boundary; the cap is about remote-call cost, not
/// about what gets persisted.
fn cap_text(content: &str) -> &str {
    match content.char_indices().nth(MAX_ENRICH_CHARS) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    struct MockBackend {
        keywords: Result<Vec<String>, String>,
        embedding: Result<Vec<f32>, String>,
        label: Result<String, String>,
        seen_text_chars: Arc<Mutex<Vec<usize>>>,
    }

    impl MockBackend {
        fn ok() -> Self {
            Self {
                keywords: Ok(vec!["금리".into(), "물가".into()]),
                embedding: Ok(vec![0.1; 4]),
                label: Ok("경제".into()),
                seen_text_chars: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl EnrichmentBackend for MockBackend {
        async fn keywords(&self, text: &str) -> Result<Vec<String>> {
            self.seen_text_chars
                .lock()
                .unwrap()
                .push(text.chars().count());
            self.keywords.clone().map_err(|e| anyhow!(e))
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.seen_text_chars
                .lock()
                .unwrap()
                .push(text.chars().count());
            self.embedding.clone().map_err(|e| anyhow!(e))
        }

        async fn classify(&self, text: &str) -> Result<String> {
            self.seen_text_chars
                .lock()
                .unwrap()
                .push(text.chars().count());
            self.label.clone().map_err(|e| anyhow!(e))
        }
    }

    fn article(content: &str) -> Article {
        Article {
            title: "제목".to_string(),
            writer_raw: "홍길동 기자 hong@news.com".to_string(),
            write_date: Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).single().unwrap(),
            category: "경제".to_string(),
            content: content.to_string(),
            url: "https://news.example/1".to_string(),
            keywords: Vec::new(),
            embedding: None,
        }
    }

    #[tokio::test]
    async fn full_enrichment_populates_every_field() {
        let enricher = Enricher::new(Box::new(MockBackend::ok()));
        let enriched = enricher.enrich(article("본문")).await;

        assert_eq!(enriched.keywords, vec!["금리", "물가"]);
        assert_eq!(enriched.embedding.as_deref(), Some(&[0.1_f32; 4][..]));
        assert_eq!(enriched.category, "경제");
        assert_eq!(enriched.writer, "홍길동 기자");
        assert_eq!(enriched.email.as_deref(), Some("hong@news.com"));
    }

    #[tokio::test]
    async fn keyword_failure_yields_empty_list_without_blocking_the_rest() {
        let backend = MockBackend {
            keywords: Err("timeout".into()),
            ..MockBackend::ok()
        };
        let enricher = Enricher::new(Box::new(backend));
        let enriched = enricher.enrich(article("본문")).await;

        assert!(enriched.keywords.is_empty());
        assert!(enriched.embedding.is_some());
        assert_eq!(enriched.category, "경제");
    }

    #[tokio::test]
    async fn embedding_failure_persists_article_without_vector() {
        let backend = MockBackend {
            embedding: Err("503".into()),
            ..MockBackend::ok()
        };
        let enricher = Enricher::new(Box::new(backend));
        let enriched = enricher.enrich(article("본문")).await;

        assert!(enriched.embedding.is_none());
        assert_eq!(enriched.keywords, vec!["금리", "물가"]);
    }

    #[tokio::test]
    async fn off_list_label_normalizes_to_unclassified() {
        let backend = MockBackend {
            label: Ok("블록체인".into()),
            ..MockBackend::ok()
        };
        let enricher = Enricher::new(Box::new(backend));
        let enriched = enricher.enrich(article("본문")).await;
        assert_eq!(enriched.category, UNCLASSIFIED);
    }

    #[tokio::test]
    async fn classify_failure_falls_back_to_unclassified() {
        let backend = MockBackend {
            label: Err("timeout".into()),
            ..MockBackend::ok()
        };
        let enricher = Enricher::new(Box::new(backend));
        let enriched = enricher.enrich(article("본문")).await;
        assert_eq!(enriched.category, UNCLASSIFIED);
    }

    #[tokio::test]
    async fn remote_calls_see_capped_text_but_full_content_persists() {
        let long = "가".repeat(MAX_ENRICH_CHARS + 500);
        let backend = MockBackend::ok();
        let seen = backend.seen_text_chars.clone();
        let enricher = Enricher::new(Box::new(backend));
        let enriched = enricher.enrich(article(&long)).await;

        assert_eq!(enriched.content.chars().count(), MAX_ENRICH_CHARS + 500);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|&chars| chars == MAX_ENRICH_CHARS));
    }

    #[test]
    fn cap_text_respects_char_boundaries() {
        let long = "한".repeat(MAX_ENRICH_CHARS + 3);
        let capped = cap_text(&long);
        assert_eq!(capped.chars().count(), MAX_ENRICH_CHARS);
        assert_eq!(cap_text("short"), "short");
    }
}
