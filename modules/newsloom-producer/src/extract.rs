use std::time::Duration;

use scraper::{Html, Selector};
use tracing::warn;

/// CSS selector for the article body blocks on source pages.
const CONTENT_SELECTOR: &str = "p.content_text, p.content_text.text-l";

pub struct BodyExtractor {
    client: reqwest::Client,
}

impl BodyExtractor {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build page HTTP client");
        Self { client }
    }

    /// Fetch the article page and extract its body text. Best-effort: any
    /// fetch or parse problem degrades to an empty body; partial data
    /// beats a lost article.
    pub async fn fetch_body(&self, url: &str) -> String {
        let html = match self.fetch_page(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url, error = %e, "page: body fetch failed, publishing empty body");
                return String::new();
            }
        };
        extract_content(&html)
    }

    async fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
        let resp = self
            .client
            .get(url)
            .header(
                "User-Agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
            )
            .send()
            .await?;
        Ok(resp.text().await?)
    }
}

impl Default for BodyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the content blocks out of an article page, blank-line separated.
pub fn extract_content(html: &str) -> String {
    let selector = Selector::parse(CONTENT_SELECTOR).expect("Invalid content selector");
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_blocks_are_joined_with_blank_lines() {
        let html = r#"
            <html><body>
              <p class="content_text">첫 단락.</p>
              <div>광고</div>
              <p class="content_text text-l">둘째 단락.</p>
            </body></html>
        "#;
        assert_eq!(extract_content(html), "첫 단락.\n\n둘째 단락.");
    }

    #[test]
    fn page_without_content_blocks_yields_empty_body() {
        let html = "<html><body><p>unrelated</p></body></html>";
        assert_eq!(extract_content(html), "");
    }

    #[test]
    fn whitespace_only_blocks_are_dropped() {
        let html = r#"<p class="content_text">  </p><p class="content_text">본문</p>"#;
        assert_eq!(extract_content(html), "본문");
    }
}
