use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use newsloom_common::{embedding, EnrichedArticle};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS news_article (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    writer TEXT NOT NULL,
    email TEXT,
    write_date TIMESTAMPTZ NOT NULL,
    category TEXT NOT NULL,
    content TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    keywords JSONB NOT NULL DEFAULT '[]'::jsonb,
    embedding BYTEA,
    views BIGINT NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

// `views` is deliberately absent from the update set: the read layer owns
// that counter and re-ingestion must never reset it.
const UPSERT_ARTICLE: &str = r#"
INSERT INTO news_article (
    title, writer, email, write_date, category, content,
    url, keywords, embedding, views, updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, NOW())
ON CONFLICT (url) DO UPDATE SET
    title = EXCLUDED.title,
    writer = EXCLUDED.writer,
    email = EXCLUDED.email,
    write_date = EXCLUDED.write_date,
    category = EXCLUDED.category,
    content = EXCLUDED.content,
    keywords = EXCLUDED.keywords,
    embedding = EXCLUDED.embedding,
    updated_at = NOW()
RETURNING id
"#;

/// Postgres store for enriched articles; the identity authority of the
/// pipeline. `url` carries the unique constraint that makes redelivery and
/// concurrent duplicate publication converge on one row.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("connecting to Postgres")?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent schema migration, run at startup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .context("creating news_article table")?;
        info!("store: schema ready");
        Ok(())
    }

    /// Insert-or-update by `url`; returns the row id, newly assigned or
    /// pre-existing. All mutable fields take the latest values; `views`
    /// survives untouched.
    pub async fn upsert(&self, article: &EnrichedArticle) -> Result<i64> {
        let keywords = serde_json::to_value(&article.keywords).context("encoding keywords")?;
        let blob = article
            .embedding
            .as_deref()
            .map(embedding::encode)
            .transpose()?;

        let id: i64 = sqlx::query_scalar(UPSERT_ARTICLE)
            .bind(&article.title)
            .bind(&article.writer)
            .bind(&article.email)
            .bind(article.write_date)
            .bind(&article.category)
            .bind(&article.content)
            .bind(&article.url)
            .bind(keywords)
            .bind(blob)
            .fetch_one(&self.pool)
            .await
            .context("upserting article")?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The upsert statement carries the idempotency contract; keep its
    // load-bearing clauses pinned.
    #[test]
    fn upsert_conflicts_on_url_and_returns_id() {
        assert!(UPSERT_ARTICLE.contains("ON CONFLICT (url) DO UPDATE"));
        assert!(UPSERT_ARTICLE.trim_end().ends_with("RETURNING id"));
    }

    #[test]
    fn upsert_never_touches_views() {
        let update_set = UPSERT_ARTICLE
            .split("DO UPDATE SET")
            .nth(1)
            .expect("statement has an update set");
        assert!(!update_set.contains("views"));
        assert!(update_set.contains("updated_at = NOW()"));
    }

    #[test]
    fn schema_has_unique_url_and_views_default() {
        assert!(CREATE_TABLE.contains("url TEXT NOT NULL UNIQUE"));
        assert!(CREATE_TABLE.contains("views BIGINT NOT NULL DEFAULT 0"));
        assert!(CREATE_TABLE.contains("embedding BYTEA,"));
    }
}
