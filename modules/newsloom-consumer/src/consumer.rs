use anyhow::{Context, Result};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::Message;
use tracing::{info, warn};

use newsloom_common::Article;

use crate::enrich::Enricher;
use crate::sinks::Committer;

/// Single-reader pipeline consumer. Parallelism is 1 by design: the log
/// sink admits one writer lease, and in-partition order stays
/// deterministic. Throughput scales by running more instances over
/// disjoint partitions, not by concurrency here.
pub struct PipelineConsumer {
    consumer: StreamConsumer,
    enricher: Enricher,
    committer: Committer,
}

impl PipelineConsumer {
    pub fn new(
        brokers: &str,
        group_id: &str,
        topic: &str,
        enricher: Enricher,
        committer: Committer,
    ) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "latest")
            .create()
            .context("creating Kafka consumer")?;

        consumer
            .subscribe(&[topic])
            .context("subscribing to topic")?;

        Ok(Self {
            consumer,
            enricher,
            committer,
        })
    }

    /// Pull, enrich and commit records one at a time. The offset of a
    /// record is committed only after the full cycle reports it handled; a
    /// hard sink failure propagates out without an offset commit, so a
    /// restart redelivers the record and the idempotent sinks absorb the
    /// replay. Undecodable payloads are the one exception: replaying them
    /// can never succeed, so they are logged and committed past.
    pub async fn run(&self) -> Result<()> {
        info!("consumer loop started");

        loop {
            let message = self.consumer.recv().await.context("Kafka receive failed")?;
            let payload = message.payload().unwrap_or_default();

            match serde_json::from_slice::<Article>(payload) {
                Ok(article) => {
                    info!(url = %article.url, title = %article.title, "processing article");
                    let enriched = self.enricher.enrich(article).await;
                    self.committer.commit(&enriched).await?;
                }
                Err(e) => {
                    warn!(
                        offset = message.offset(),
                        partition = message.partition(),
                        error = %e,
                        "dropping undecodable record"
                    );
                }
            }

            self.consumer
                .commit_message(&message, CommitMode::Sync)
                .context("offset commit failed")?;
        }
    }
}
