use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use tapline_common::routes::lamoda as routes;
use tapline_common::TopicRoute;
use validator::Validate;

use super::{publish, query_params, required, to_body};
use crate::{ApiError, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/lamoda", get(sneakers))
        .route("/lamoda/hrefs/{href_page}", get(sneaker_links))
        .route("/lamoda/detail/href", get(sneaker_by_href))
        .route("/lamoda/detail/article", get(sneaker_by_article))
}

// --- Query structs ---

#[derive(Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

#[derive(Deserialize)]
pub struct HrefQuery {
    href: Option<String>,
}

#[derive(Deserialize)]
pub struct ArticleQuery {
    article: Option<String>,
}

// --- Helpers ---

fn parse_page(raw: Option<&str>) -> Result<u32, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::BadRequest("page is required".into()))?;
    match raw.trim().parse::<u32>() {
        Ok(page) if page > 0 => Ok(page),
        _ => Err(ApiError::BadRequest(format!(
            "page must be a positive integer, got {raw:?}"
        ))),
    }
}

/// Drop records that fail validation. Scraped markup is not trusted.
fn keep_valid<T: Validate>(records: Vec<T>, route: TopicRoute) -> Vec<T> {
    let total = records.len();
    let valid: Vec<T> = records.into_iter().filter(|r| r.validate().is_ok()).collect();
    if valid.len() < total {
        tracing::warn!(
            topic = route.topic,
            dropped = total - valid.len(),
            "Dropped invalid scraped records"
        );
    }
    valid
}

/// Publish `records` to `route` and remember the response body under `key`.
async fn publish_and_cache<T>(
    state: &AppState,
    key: String,
    route: TopicRoute,
    records: &T,
) -> Result<Json<serde_json::Value>, ApiError>
where
    T: Serialize + ?Sized + Sync,
{
    publish(state, route, records).await?;
    let body = to_body(records)?;
    state.cache.insert(key, body.clone());
    Ok(Json(body))
}

// --- Handlers ---

pub async fn sneakers(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = query_params(query)?;
    let page = parse_page(query.page.as_deref())?;
    let key = format!("sneakers:{page}");
    if let Some(hit) = state.cache.get(&key) {
        return Ok(Json(hit));
    }

    let cards = keep_valid(state.catalog.sneakers(page).await?, routes::SNEAKERS);
    if cards.is_empty() {
        return Err(ApiError::Empty(routes::SNEAKERS.topic));
    }
    publish_and_cache(&state, key, routes::SNEAKERS, &cards).await
}

pub async fn sneaker_links(
    State(state): State<Arc<AppState>>,
    Path(href_page): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = parse_page(Some(&href_page))?;
    let key = format!("hrefs:{page}");
    if let Some(hit) = state.cache.get(&key) {
        return Ok(Json(hit));
    }

    let links = keep_valid(
        state.catalog.sneaker_links(page).await?,
        routes::SNEAKER_HREFS,
    );
    if links.is_empty() {
        return Err(ApiError::Empty(routes::SNEAKER_HREFS.topic));
    }
    publish_and_cache(&state, key, routes::SNEAKER_HREFS, &links).await
}

pub async fn sneaker_by_href(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HrefQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = query_params(query)?;
    let href = required(query.href, "href")?;
    let key = format!("detail:href:{href}");
    if let Some(hit) = state.cache.get(&key) {
        return Ok(Json(hit));
    }

    let detail = state.catalog.sneaker_by_href(&href).await?;
    if detail.is_empty() || detail.validate().is_err() {
        return Err(ApiError::Empty(routes::SNEAKER_DETAIL.topic));
    }
    publish_and_cache(&state, key, routes::SNEAKER_DETAIL, &detail).await
}

pub async fn sneaker_by_article(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ArticleQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = query_params(query)?;
    let article = required(query.article, "article")?;
    let key = format!("detail:article:{article}");
    if let Some(hit) = state.cache.get(&key) {
        return Ok(Json(hit));
    }

    let detail = state.catalog.sneaker_by_article(&article).await?;
    if detail.is_empty() || detail.validate().is_err() {
        return Err(ApiError::Empty(routes::SNEAKER_DETAIL.topic));
    }
    publish_and_cache(&state, key, routes::SNEAKER_DETAIL, &detail).await
}
