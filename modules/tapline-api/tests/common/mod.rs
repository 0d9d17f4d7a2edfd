//! Mock upstreams and request helpers shared by the API tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use lamoda_client::{LamodaError, SneakerCard, SneakerDetail, SneakerLink};
use serde_json::Value;
use tapline_api::{app, AppState, HelixQuery, ResponseCache, SneakerCatalog, StreamingApi};
use tapline_bridge::{MemoryBus, MemoryDocumentStore};
use tower::ServiceExt;
use twitch_client::{HelixResponse, TwitchError, TwitchTokens};

// ---------------------------------------------------------------------------
// MockCatalog
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockCatalog {
    cards: Vec<SneakerCard>,
    links: Vec<SneakerLink>,
    detail: SneakerDetail,
    calls: AtomicUsize,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(mut self, cards: Vec<SneakerCard>) -> Self {
        self.cards = cards;
        self
    }

    pub fn with_links(mut self, links: Vec<SneakerLink>) -> Self {
        self.links = links;
        self
    }

    pub fn with_detail(mut self, detail: SneakerDetail) -> Self {
        self.detail = detail;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SneakerCatalog for MockCatalog {
    async fn sneakers(&self, _page: u32) -> lamoda_client::Result<Vec<SneakerCard>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.cards.clone())
    }

    async fn sneaker_links(&self, _page: u32) -> lamoda_client::Result<Vec<SneakerLink>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.links.clone())
    }

    async fn sneaker_by_href(&self, href: &str) -> lamoda_client::Result<SneakerDetail> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if href.trim().is_empty() {
            return Err(LamodaError::InvalidInput("href must not be empty".into()));
        }
        Ok(self.detail.clone())
    }

    async fn sneaker_by_article(&self, article: &str) -> lamoda_client::Result<SneakerDetail> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if article.trim().is_empty() {
            return Err(LamodaError::InvalidInput("article must not be empty".into()));
        }
        Ok(self.detail.clone())
    }
}

// ---------------------------------------------------------------------------
// MockStreaming
// ---------------------------------------------------------------------------

/// Answers every Helix query with the records registered for its topic.
#[derive(Default)]
pub struct MockStreaming {
    records: HashMap<&'static str, Vec<Value>>,
    reject_status: Option<u16>,
    queries: Mutex<Vec<(String, HelixQuery)>>,
}

impl MockStreaming {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, query: &HelixQuery, records: Vec<Value>) -> Self {
        self.records.insert(query.route().topic, records);
        self
    }

    /// Fail every call with an upstream error of this status.
    pub fn rejecting(mut self, status: u16) -> Self {
        self.reject_status = Some(status);
        self
    }

    pub fn queries(&self) -> Vec<(String, HelixQuery)> {
        self.queries.lock().unwrap().clone()
    }

    fn check(&self) -> twitch_client::Result<()> {
        match self.reject_status {
            Some(status) => Err(TwitchError::Api {
                status,
                message: "rejected".into(),
            }),
            None => Ok(()),
        }
    }

    fn tokens(&self, access_token: &str) -> TwitchTokens {
        TwitchTokens {
            access_token: access_token.to_string(),
            expires_in: 14_400,
            id_token: None,
            refresh_token: "refresh-1".into(),
            scope: vec!["user:read:follows".into()],
            token_type: "bearer".into(),
        }
    }
}

#[async_trait]
impl StreamingApi for MockStreaming {
    fn authorize_url(&self) -> twitch_client::Result<String> {
        Ok("https://id.twitch.tv/oauth2/authorize?response_type=code&client_id=cid".into())
    }

    async fn exchange_code(&self, code: &str) -> twitch_client::Result<TwitchTokens> {
        self.check()?;
        Ok(self.tokens(&format!("access-for-{code}")))
    }

    async fn refresh_tokens(&self, refresh_token: &str) -> twitch_client::Result<TwitchTokens> {
        self.check()?;
        Ok(self.tokens(&format!("refreshed-{refresh_token}")))
    }

    async fn fetch(
        &self,
        token: &str,
        query: &HelixQuery,
    ) -> twitch_client::Result<HelixResponse<Value>> {
        self.queries
            .lock()
            .unwrap()
            .push((token.to_string(), query.clone()));
        self.check()?;
        Ok(HelixResponse {
            data: self
                .records
                .get(query.route().topic)
                .cloned()
                .unwrap_or_default(),
            total: None,
            pagination: None,
            template: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub state: Arc<AppState>,
    pub catalog: Arc<MockCatalog>,
    pub streaming: Arc<MockStreaming>,
    pub bus: Arc<MemoryBus>,
    pub store: Arc<MemoryDocumentStore>,
}

impl Harness {
    pub fn new(catalog: MockCatalog, streaming: MockStreaming) -> Self {
        Self::with_store(catalog, streaming, MemoryDocumentStore::new())
    }

    pub fn with_store(
        catalog: MockCatalog,
        streaming: MockStreaming,
        store: MemoryDocumentStore,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let streaming = Arc::new(streaming);
        let bus = Arc::new(MemoryBus::new());
        let store = Arc::new(store);
        let state = Arc::new(AppState {
            catalog: catalog.clone(),
            streaming: streaming.clone(),
            bus: bus.clone(),
            store: store.clone(),
            cache: ResponseCache::new(Duration::from_secs(60)),
            drain_limit: 32,
        });
        Self {
            state,
            catalog,
            streaming,
            bus,
            store,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri).await
    }

    pub async fn send(&self, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app(self.state.clone()).oneshot(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn card(brand: &str, model: &str, price: &str) -> SneakerCard {
    SneakerCard {
        brand: brand.into(),
        model: model.into(),
        price: Some(price.into()),
    }
}

pub fn detail() -> SneakerDetail {
    let mut detail = SneakerDetail {
        brand: Some("Napapijri".into()),
        model: Some("Vicky".into()),
        price: Some("339.00 р.".into()),
        article: Some("RTLADL534401".into()),
        season: Some("мульти".into()),
        ..Default::default()
    };
    detail
        .attributes
        .insert("Артикул".into(), "RTLADL534401".into());
    detail.attributes.insert("Сезон".into(), "мульти".into());
    detail
}
