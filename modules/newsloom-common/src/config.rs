use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Queue
    pub kafka_brokers: String,
    pub kafka_topic: String,
    pub kafka_group_id: String,

    // Feed polling
    pub feed_urls: Vec<String>,
    pub poll_interval_secs: u64,

    // Relational store
    pub database_url: String,

    // Search index
    pub search_url: String,
    pub search_index: String,

    // Distributed log
    pub dfs_url: String,
    pub dfs_user: String,
    pub dfs_dir: String,

    // Enrichment
    pub openai_api_key: String,
    pub enrich_timeout_secs: u64,
}

impl Config {
    /// Load configuration for the feed poller / publisher.
    /// Panics with a clear message if required vars are missing.
    pub fn producer_from_env() -> Self {
        Self {
            kafka_brokers: env::var("KAFKA_BOOTSTRAP_SERVERS")
                .unwrap_or_else(|_| "localhost:9092".to_string()),
            kafka_topic: env::var("KAFKA_TOPIC").unwrap_or_else(|_| "article".to_string()),
            kafka_group_id: String::new(),
            feed_urls: parse_feed_urls(&required_env("RSS_FEED_URLS")),
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .expect("POLL_INTERVAL_SECS must be a number"),
            database_url: String::new(),
            search_url: String::new(),
            search_index: String::new(),
            dfs_url: String::new(),
            dfs_user: String::new(),
            dfs_dir: String::new(),
            openai_api_key: String::new(),
            enrich_timeout_secs: 0,
        }
    }

    /// Load configuration for the stream consumer (no feed vars needed).
    pub fn consumer_from_env() -> Self {
        Self {
            kafka_brokers: env::var("KAFKA_BOOTSTRAP_SERVERS")
                .unwrap_or_else(|_| "localhost:9092".to_string()),
            kafka_topic: env::var("KAFKA_TOPIC").unwrap_or_else(|_| "article".to_string()),
            kafka_group_id: env::var("KAFKA_GROUP_ID")
                .unwrap_or_else(|_| "newsloom-group-1".to_string()),
            feed_urls: Vec::new(),
            poll_interval_secs: 0,
            database_url: required_env("DATABASE_URL"),
            search_url: env::var("SEARCH_URL").unwrap_or_else(|_| "http://localhost:9200".to_string()),
            search_index: env::var("SEARCH_INDEX").unwrap_or_else(|_| "news".to_string()),
            dfs_url: env::var("DFS_URL").unwrap_or_else(|_| "http://localhost:9870".to_string()),
            dfs_user: env::var("DFS_USER").unwrap_or_else(|_| "newsloom".to_string()),
            dfs_dir: env::var("DFS_DIR").unwrap_or_else(|_| "/user/newsloom".to_string()),
            openai_api_key: required_env("OPENAI_API_KEY"),
            enrich_timeout_secs: env::var("ENRICH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("ENRICH_TIMEOUT_SECS must be a number"),
        }
    }

    /// Target path of the append-only keyword log.
    pub fn dfs_log_path(&self) -> String {
        format!("{}/articles.json", self.dfs_dir.trim_end_matches('/'))
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parse_feed_urls(raw: &str) -> Vec<String> {
    let urls: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if urls.is_empty() {
        panic!("RSS_FEED_URLS must contain at least one feed URL (comma-separated)");
    }
    urls
}
