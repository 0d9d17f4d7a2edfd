use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::Request;
use axum::ServiceExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lamoda_client::LamodaClient;
use tapline_api::{app, AppState, ResponseCache};
use tapline_bridge::{
    DocumentStore, KafkaBus, MemoryBus, MemoryDocumentStore, PgDocumentStore, TopicBus,
};
use tapline_common::routes::{lamoda, twitch};
use tapline_common::{Config, StoreBackend, TopicBackend, TopicRoute};
use twitch_client::{TwitchClient, TwitchCredentials};

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("tapline=info,lamoda_client=info,twitch_client=info,tower_http=info"))?;
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let config = Config::from_env()?;
    let known_routes: Vec<TopicRoute> = lamoda::ALL.iter().chain(twitch::ALL).copied().collect();

    let bus: Arc<dyn TopicBus> = match config.topic_backend {
        TopicBackend::Kafka => Arc::new(KafkaBus::new(
            &config.kafka_bootstrap_servers,
            &config.kafka_group_id,
            config.kafka_poll_timeout,
            &known_routes,
        )?),
        TopicBackend::Memory => Arc::new(MemoryBus::new()),
    };

    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required when STORE_BACKEND=postgres")?;
            let store = PgDocumentStore::connect(url).await?;
            store.migrate().await?;
            Arc::new(store)
        }
        StoreBackend::Memory => Arc::new(MemoryDocumentStore::new()),
    };

    let catalog = LamodaClient::new(&config.lamoda_base_url)?;
    let streaming = TwitchClient::new(TwitchCredentials {
        client_id: config.twitch_client_id.clone(),
        client_secret: config.twitch_client_secret.clone(),
        redirect_uri: config.twitch_redirect_uri.clone(),
    })?;

    let state = Arc::new(AppState {
        catalog: Arc::new(catalog),
        streaming: Arc::new(streaming),
        bus,
        store,
        cache: ResponseCache::new(config.cache_ttl),
        drain_limit: config.drain_batch_limit,
    });

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!(
        topics = %config.topic_backend,
        store = %config.store_backend,
        "Tapline API starting on {addr}"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service(app(state)),
    )
    .await?;

    Ok(())
}
