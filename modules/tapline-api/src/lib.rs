pub mod cache;
pub mod error;
pub mod rest;
pub mod sources;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tapline_bridge::{DocumentStore, TopicBus};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

pub use cache::ResponseCache;
pub use error::ApiError;
pub use sources::{HelixQuery, SneakerCatalog, StreamingApi};

pub struct AppState {
    pub catalog: Arc<dyn SneakerCatalog>,
    pub streaming: Arc<dyn StreamingApi>,
    pub bus: Arc<dyn TopicBus>,
    pub store: Arc<dyn DocumentStore>,
    pub cache: ResponseCache,
    /// Most messages one read-through drains per request.
    pub drain_limit: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(rest::lamoda::routes())
        .merge(rest::db::routes())
        .merge(rest::twitch::routes());

    Router::new()
        .route("/", get(|| async { "ok" }))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

/// The router with trailing slashes stripped before routing, so `/lamoda/`
/// and `/lamoda` resolve to the same handler.
pub fn app(state: Arc<AppState>) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
