//! Read-through collection endpoints. Each request first drains the topic
//! into its collection, then answers from the collection.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use tapline_bridge::Document;
use tapline_common::routes::{lamoda, twitch};
use uuid::Uuid;

use super::collection;
use crate::{ApiError, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/lamoda/db", collection(lamoda::SNEAKERS))
        .route("/lamoda/db/hrefs", collection(lamoda::SNEAKER_HREFS))
        .route("/lamoda/db/details", collection(lamoda::SNEAKER_DETAIL))
        .route("/lamoda/db/{id}", get(sneaker_detail).delete(delete_sneaker_detail))
        .route("/twitch/db/auth", collection(twitch::AUTH))
        .route("/twitch/db/user", collection(twitch::USER))
        .route("/twitch/db/games", collection(twitch::GAMES))
        .route("/twitch/db/games/top", collection(twitch::TOP_GAMES))
        .route("/twitch/db/games/analytic", collection(twitch::GAMES_ANALYTIC))
        .route("/twitch/db/channel", collection(twitch::CHANNEL_INFORMATION))
        .route("/twitch/db/channel/editor", collection(twitch::CHANNEL_EDITOR))
        .route("/twitch/db/channel/followed", collection(twitch::CHANNEL_FOLLOWED))
        .route("/twitch/db/channel/followers", collection(twitch::CHANNEL_FOLLOWERS))
        .route("/twitch/db/channel/emotes", collection(twitch::CHANNEL_EMOTES))
        .route(
            "/twitch/db/channel/chat/settings",
            collection(twitch::CHANNEL_CHAT_SETTINGS),
        )
        .route("/twitch/db/channel/vip", collection(twitch::CHANNEL_VIP))
        .route("/twitch/db/emotes/global", collection(twitch::GLOBAL_EMOTES))
        .route("/twitch/db/clips", collection(twitch::CLIPS))
        .route("/twitch/db/pools", collection(twitch::POOLS))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::BadRequest(format!("invalid id: {raw}")))
}

pub async fn sneaker_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let id = parse_id(&id)?;
    let doc = state
        .store
        .find_by_id(lamoda::SNEAKER_DETAIL.collection, id)
        .await
        .map_err(ApiError::store)?;

    doc.map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("sneaker detail {id} not found")))
}

pub async fn delete_sneaker_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let removed = state
        .store
        .delete_by_id(lamoda::SNEAKER_DETAIL.collection, id)
        .await
        .map_err(ApiError::store)?;

    if !removed {
        return Err(ApiError::NotFound(format!("sneaker detail {id} not found")));
    }
    tracing::info!(%id, "Deleted sneaker detail");
    Ok(StatusCode::NO_CONTENT)
}
