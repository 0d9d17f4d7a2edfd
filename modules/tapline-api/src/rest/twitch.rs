use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tapline_common::routes::twitch as routes;
use twitch_client::TwitchTokens;

use super::{publish, query_params, required};
use crate::{ApiError, AppState, HelixQuery};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/twitch/auth", get(authorize))
        .route("/twitch/auth/refresh", get(refresh))
        .route("/twitch/auth/user", get(user))
        .route("/twitch/auth/{authorization_code}", get(tokens))
        .route("/twitch/games/top", get(top_games))
        .route("/twitch/games/analytic/{game_id}", get(game_analytics))
        .route("/twitch/games/{game_id}", get(games))
        .route("/twitch/channel/editor/{broadcaster_id}", get(channel_editors))
        .route("/twitch/channel/followed/{user_id}", get(followed_channels))
        .route("/twitch/channel/followers/{broadcaster_id}", get(channel_followers))
        .route("/twitch/channel/emotes/{broadcaster_id}", get(channel_emotes))
        .route("/twitch/channel/chat/settings/{broadcaster_id}", get(chat_settings))
        .route("/twitch/channel/vip/{broadcaster_id}", get(channel_vips))
        .route("/twitch/channel/{broadcaster_id}", get(channel_information))
        .route("/twitch/emotes/global", get(global_emotes))
        .route("/twitch/clips/{broadcaster_id}", get(clips))
        .route("/twitch/pools/{broadcaster_id}", get(polls))
}

// --- Query structs ---

#[derive(Deserialize)]
pub struct TokenQuery {
    token: Option<String>,
}

#[derive(Deserialize)]
pub struct AccessTokenQuery {
    access_token: Option<String>,
}

#[derive(Deserialize)]
pub struct RefreshQuery {
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
pub struct GamesQuery {
    token: Option<String>,
    name: Option<String>,
    igdb_id: Option<String>,
}

// --- Helpers ---

/// Run a Helix read, reject an empty answer, publish the records.
async fn helix_action(
    state: &AppState,
    token: Option<String>,
    query: HelixQuery,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let token = required(token, "token")?;
    let route = query.route();
    let resp = state.streaming.fetch(&token, &query).await?;
    if resp.is_empty() {
        return Err(ApiError::Empty(route.topic));
    }

    publish(state, route, &resp.data).await?;
    tracing::info!(topic = route.topic, count = resp.data.len(), "Published Helix records");
    Ok(Json(resp.data))
}

async fn publish_tokens(state: &AppState, tokens: TwitchTokens) -> Result<Json<TwitchTokens>, ApiError> {
    publish(state, routes::AUTH, &tokens).await?;
    Ok(Json(tokens))
}

// --- OAuth ---

pub async fn authorize(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let url = state.streaming.authorize_url()?;
    Ok(Json(serde_json::json!({ "authorize_url": url })))
}

pub async fn tokens(
    State(state): State<Arc<AppState>>,
    Path(authorization_code): Path<String>,
) -> Result<Json<TwitchTokens>, ApiError> {
    let tokens = state.streaming.exchange_code(&authorization_code).await?;
    publish_tokens(&state, tokens).await
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RefreshQuery>, QueryRejection>,
) -> Result<Json<TwitchTokens>, ApiError> {
    let query = query_params(query)?;
    let refresh_token = required(query.refresh_token, "refresh_token")?;
    let tokens = state.streaming.refresh_tokens(&refresh_token).await?;
    publish_tokens(&state, tokens).await
}

pub async fn user(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AccessTokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    let token = required(query.access_token, "access_token")?;
    helix_action(&state, Some(token), HelixQuery::User).await
}

// --- Games ---

pub async fn games(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    query: Result<Query<GamesQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    let helix = HelixQuery::Games {
        id: game_id,
        name: query.name.unwrap_or_default(),
        igdb_id: query.igdb_id.unwrap_or_default(),
    };
    helix_action(&state, query.token, helix).await
}

pub async fn top_games(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    helix_action(&state, query.token, HelixQuery::TopGames).await
}

pub async fn game_analytics(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    helix_action(&state, query.token, HelixQuery::GameAnalytics { game_id }).await
}

// --- Channels ---

pub async fn channel_information(
    State(state): State<Arc<AppState>>,
    Path(broadcaster_id): Path<String>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    helix_action(
        &state,
        query.token,
        HelixQuery::ChannelInformation { broadcaster_id },
    )
    .await
}

pub async fn channel_editors(
    State(state): State<Arc<AppState>>,
    Path(broadcaster_id): Path<String>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    helix_action(&state, query.token, HelixQuery::ChannelEditors { broadcaster_id }).await
}

pub async fn followed_channels(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    helix_action(&state, query.token, HelixQuery::FollowedChannels { user_id }).await
}

pub async fn channel_followers(
    State(state): State<Arc<AppState>>,
    Path(broadcaster_id): Path<String>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    helix_action(&state, query.token, HelixQuery::ChannelFollowers { broadcaster_id }).await
}

pub async fn channel_emotes(
    State(state): State<Arc<AppState>>,
    Path(broadcaster_id): Path<String>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    helix_action(&state, query.token, HelixQuery::ChannelEmotes { broadcaster_id }).await
}

pub async fn chat_settings(
    State(state): State<Arc<AppState>>,
    Path(broadcaster_id): Path<String>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    helix_action(&state, query.token, HelixQuery::ChatSettings { broadcaster_id }).await
}

pub async fn channel_vips(
    State(state): State<Arc<AppState>>,
    Path(broadcaster_id): Path<String>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    helix_action(&state, query.token, HelixQuery::ChannelVips { broadcaster_id }).await
}

// --- Chat, clips, polls ---

pub async fn global_emotes(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    helix_action(&state, query.token, HelixQuery::GlobalEmotes).await
}

pub async fn clips(
    State(state): State<Arc<AppState>>,
    Path(broadcaster_id): Path<String>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    helix_action(&state, query.token, HelixQuery::Clips { broadcaster_id }).await
}

pub async fn polls(
    State(state): State<Arc<AppState>>,
    Path(broadcaster_id): Path<String>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let query = query_params(query)?;
    helix_action(&state, query.token, HelixQuery::Polls { broadcaster_id }).await
}
