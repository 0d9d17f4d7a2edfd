use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::error::TaplineError;

/// Where drained documents are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = TaplineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(TaplineError::Config(format!("unknown STORE_BACKEND: {other}"))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Postgres => write!(f, "postgres"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Where published records are buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicBackend {
    Kafka,
    Memory,
}

impl FromStr for TopicBackend {
    type Err = TaplineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kafka" => Ok(TopicBackend::Kafka),
            "memory" | "mem" => Ok(TopicBackend::Memory),
            other => Err(TaplineError::Config(format!("unknown TOPIC_BACKEND: {other}"))),
        }
    }
}

impl fmt::Display for TopicBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicBackend::Kafka => write!(f, "kafka"),
            TopicBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Web server
    pub api_host: String,
    pub api_port: u16,

    // Document store
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,

    // Message broker
    pub topic_backend: TopicBackend,
    pub kafka_bootstrap_servers: String,
    pub kafka_group_id: String,
    pub kafka_poll_timeout: Duration,

    // Twitch
    pub twitch_client_id: String,
    pub twitch_client_secret: String,
    pub twitch_redirect_uri: String,

    // Lamoda
    pub lamoda_base_url: String,

    // Read path
    pub cache_ttl: Duration,
    pub drain_batch_limit: usize,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from any key lookup. Required keys error, the rest fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("{key} environment variable is required"))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let store_backend: StoreBackend = or_default("STORE_BACKEND", "postgres").parse()?;
        let database_url = lookup("DATABASE_URL").filter(|v| !v.is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL is required when STORE_BACKEND=postgres"));
        }

        Ok(Self {
            api_host: or_default("API_HOST", "0.0.0.0"),
            api_port: or_default("API_PORT", "8002")
                .parse()
                .context("API_PORT must be a number")?,
            store_backend,
            database_url,
            topic_backend: or_default("TOPIC_BACKEND", "kafka").parse()?,
            kafka_bootstrap_servers: or_default("KAFKA_BOOTSTRAP_SERVERS", "kafka:9092"),
            kafka_group_id: or_default("KAFKA_GROUP_ID", "tapline"),
            kafka_poll_timeout: Duration::from_millis(
                or_default("KAFKA_POLL_TIMEOUT_MS", "100")
                    .parse()
                    .context("KAFKA_POLL_TIMEOUT_MS must be a number")?,
            ),
            twitch_client_id: required("TWITCH_CLIENT_ID")?,
            twitch_client_secret: required("TWITCH_CLIENT_SECRET")?,
            twitch_redirect_uri: or_default("TWITCH_REDIRECT_URI", "http://localhost:8001"),
            lamoda_base_url: or_default("LAMODA_BASE_URL", "https://www.lamoda.by"),
            cache_ttl: Duration::from_secs(
                or_default("CACHE_TTL_SECS", "60")
                    .parse()
                    .context("CACHE_TTL_SECS must be a number")?,
            ),
            drain_batch_limit: or_default("DRAIN_BATCH_LIMIT", "32")
                .parse()
                .context("DRAIN_BATCH_LIMIT must be a number")?,
        })
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  STORE_BACKEND: {}", self.store_backend);
        tracing::info!("  TOPIC_BACKEND: {}", self.topic_backend);
        tracing::info!("  KAFKA_BOOTSTRAP_SERVERS: {}", self.kafka_bootstrap_servers);
        tracing::info!("  TWITCH_CLIENT_ID: {}", preview(&self.twitch_client_id));
        tracing::info!("  TWITCH_CLIENT_SECRET: {}", preview(&self.twitch_client_secret));
        tracing::info!("  LAMODA_BASE_URL: {}", self.lamoda_base_url);
    }
}

fn preview(val: &str) -> String {
    let head: String = val.chars().take(5).collect();
    format!("{}...({} chars)", head, val.chars().count())
}
