pub mod db;
pub mod lamoda;
pub mod twitch;

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::{get, MethodRouter};
use serde::Serialize;
use tapline_bridge::{publish_records, read_through, Document};
use tapline_common::{TaplineError, TopicRoute};

use crate::{ApiError, AppState};

// --- Helpers ---

/// A required query value. Missing and blank are both rejected.
pub(crate) fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))
}

/// Unwrap query parameters, turning a rejection into a JSON 400.
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

pub(crate) async fn publish<T>(state: &AppState, route: TopicRoute, records: &T) -> Result<(), ApiError>
where
    T: Serialize + ?Sized + Sync,
{
    publish_records(state.bus.as_ref(), route.topic, records)
        .await
        .map_err(ApiError::topic)
}

pub(crate) fn to_body<T: Serialize + ?Sized>(records: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(records)
        .map_err(|e| ApiError::Internal(TaplineError::Serialization(e.to_string())))
}

/// Drain `route` and return its whole collection.
pub(crate) async fn read_collection(
    state: &AppState,
    route: TopicRoute,
) -> Result<Json<Vec<Document>>, ApiError> {
    let docs = read_through(
        state.bus.as_ref(),
        state.store.as_ref(),
        route,
        state.drain_limit,
    )
    .await
    .map_err(|e| ApiError::Internal(TaplineError::from(e)))?;
    Ok(Json(docs))
}

pub(crate) fn collection(route: TopicRoute) -> MethodRouter<Arc<AppState>> {
    get(move |State(state): State<Arc<AppState>>| async move {
        read_collection(&state, route).await
    })
}
