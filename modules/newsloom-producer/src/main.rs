use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use newsloom_common::Config;
use newsloom_producer::poller::FeedPoller;
use newsloom_producer::publisher::KafkaPublisher;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("newsloom=info".parse()?))
        .init();

    info!("Newsloom producer starting...");

    let config = Config::producer_from_env();
    info!(
        feeds = config.feed_urls.len(),
        interval_secs = config.poll_interval_secs,
        topic = %config.kafka_topic,
        "configuration loaded"
    );

    let publisher = KafkaPublisher::new(&config.kafka_brokers, &config.kafka_topic)?;
    let mut poller = FeedPoller::new(config.feed_urls.clone(), Arc::new(publisher));

    let mut interval = tokio::time::interval(Duration::from_secs(config.poll_interval_secs));
    loop {
        interval.tick().await;
        let stats = poller.poll_once().await;
        info!(
            published = stats.published,
            skipped = stats.skipped,
            failed = stats.failed,
            "waiting for next poll"
        );
    }
}
