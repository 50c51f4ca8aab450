use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use tracing::debug;

use newsloom_common::Article;

/// Destination for accepted articles. The queue topic in production; tests
/// substitute a recording sink.
#[async_trait]
pub trait ArticleSink: Send + Sync {
    async fn publish(&self, article: &Article) -> Result<()>;
}

/// Publishes JSON-encoded articles onto the queue topic, keyed by URL so
/// repeat publications of the same article land on the same partition.
pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
}

impl KafkaPublisher {
    pub fn new(brokers: &str, topic: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "10000")
            .create()
            .context("creating Kafka producer")?;

        Ok(Self {
            producer,
            topic: topic.to_string(),
        })
    }
}

#[async_trait]
impl ArticleSink for KafkaPublisher {
    async fn publish(&self, article: &Article) -> Result<()> {
        let payload = serde_json::to_vec(article).context("encoding article")?;

        self.producer
            .send(
                FutureRecord::to(&self.topic)
                    .key(&article.url)
                    .payload(&payload),
                Duration::from_secs(10),
            )
            .await
            .map_err(|(e, _)| anyhow!("Kafka delivery failed: {e}"))?;

        debug!(url = %article.url, topic = %self.topic, "published article");
        Ok(())
    }
}
