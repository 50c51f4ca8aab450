use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dfs_client::DfsClient;
use newsloom_common::Config;
use newsloom_consumer::consumer::PipelineConsumer;
use newsloom_consumer::enrich::{Enricher, OpenAiEnrichment};
use newsloom_consumer::log_writer::LogWriter;
use newsloom_consumer::sinks::Committer;
use newsloom_consumer::store::PgStore;
use search_client::SearchClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("newsloom=info".parse()?))
        .init();

    info!("Newsloom consumer starting...");

    let config = Config::consumer_from_env();
    info!(
        topic = %config.kafka_topic,
        group = %config.kafka_group_id,
        index = %config.search_index,
        log_path = %config.dfs_log_path(),
        "configuration loaded"
    );

    let store = PgStore::connect(&config.database_url).await?;
    store.migrate().await?;

    let search = SearchClient::new(&config.search_url, &config.search_index);
    let dfs = DfsClient::new(&config.dfs_url, &config.dfs_user);
    let log_writer = LogWriter::new(Arc::new(dfs), config.dfs_log_path());

    let backend = OpenAiEnrichment::new(
        &config.openai_api_key,
        Duration::from_secs(config.enrich_timeout_secs),
    );
    let enricher = Enricher::new(Box::new(backend));

    let committer = Committer::new(Arc::new(store), Arc::new(search), Arc::new(log_writer));

    let consumer = PipelineConsumer::new(
        &config.kafka_brokers,
        &config.kafka_group_id,
        &config.kafka_topic,
        enricher,
        committer,
    )?;

    consumer.run().await
}
