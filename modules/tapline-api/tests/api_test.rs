mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tapline_api::HelixQuery;
use tapline_bridge::{DocumentStore, MemoryDocumentStore, TopicBus};
use tapline_common::routes::{lamoda, twitch};

use common::{card, detail, Harness, MockCatalog, MockStreaming};

fn sneakers_harness() -> Harness {
    Harness::new(
        MockCatalog::new().with_cards(vec![
            card("Nike", "Air Max 90", "419.59 р."),
            card("Nike", "Court Vision", "259.00 р."),
        ]),
        MockStreaming::new(),
    )
}

// ---------------------------------------------------------------------------
// Health and routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_answers_ok() {
    let h = sneakers_harness();
    let (status, body) = h.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn trailing_slash_resolves_to_same_route() {
    let h = sneakers_harness();
    let (status, _) = h.get("/api/v1/lamoda/?page=1").await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Lamoda actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sneakers_keep_cards_sharing_a_brand_and_publish_once() {
    let h = sneakers_harness();

    let (status, body) = h.get("/api/v1/lamoda?page=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["model"], "Air Max 90");

    let published = h.bus.published(lamoda::SNEAKERS.topic);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0], body);
}

#[tokio::test]
async fn repeated_page_is_served_from_cache() {
    let h = sneakers_harness();

    let (first, _) = h.get("/api/v1/lamoda?page=2").await;
    let (second, _) = h.get("/api/v1/lamoda?page=2").await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(h.catalog.calls(), 1);
    assert_eq!(h.bus.published(lamoda::SNEAKERS.topic).len(), 1);

    h.get("/api/v1/lamoda?page=3").await;
    assert_eq!(h.catalog.calls(), 2);
}

#[tokio::test]
async fn page_must_be_a_positive_integer() {
    let h = sneakers_harness();
    for uri in [
        "/api/v1/lamoda?page=0",
        "/api/v1/lamoda?page=abc",
        "/api/v1/lamoda",
        "/api/v1/lamoda/hrefs/0",
    ] {
        let (status, body) = h.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
    assert_eq!(h.catalog.calls(), 0);
}

#[tokio::test]
async fn malformed_query_is_json_bad_request() {
    let h = sneakers_harness();
    for uri in [
        "/api/v1/lamoda?page=1&page=2",
        "/api/v1/lamoda/detail/article?article=A&article=B",
    ] {
        let (status, body) = h.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
    assert_eq!(h.catalog.calls(), 0);
}

#[tokio::test]
async fn empty_listing_is_not_found_and_not_published() {
    let h = Harness::new(MockCatalog::new(), MockStreaming::new());

    let (status, body) = h.get("/api/v1/lamoda?page=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(lamoda::SNEAKERS.topic));
    assert!(h.bus.published(lamoda::SNEAKERS.topic).is_empty());
}

#[tokio::test]
async fn detail_by_article_publishes_to_detail_topic() {
    let h = Harness::new(MockCatalog::new().with_detail(detail()), MockStreaming::new());

    let (status, body) = h
        .get("/api/v1/lamoda/detail/article?article=RTLADL534401")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brand"], "Napapijri");
    assert_eq!(body["attributes"]["Сезон"], "мульти");
    assert_eq!(h.bus.published(lamoda::SNEAKER_DETAIL.topic).len(), 1);
}

#[tokio::test]
async fn blank_detail_page_is_not_found() {
    let h = Harness::new(MockCatalog::new(), MockStreaming::new());

    let (status, _) = h.get("/api/v1/lamoda/detail/href?href=p/x/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h.get("/api/v1/lamoda/detail/href").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Lamoda read-through
// ---------------------------------------------------------------------------

#[tokio::test]
async fn read_through_stores_each_payload_once() {
    let h = sneakers_harness();
    h.get("/api/v1/lamoda?page=1").await;
    // Same records published again outside the cache.
    let again = h.bus.published(lamoda::SNEAKERS.topic)[0].clone();
    h.bus.publish(lamoda::SNEAKERS.topic, &again).await.unwrap();

    let (status, docs) = h.get("/api/v1/lamoda/db").await;
    assert_eq!(status, StatusCode::OK);
    let docs = docs.as_array().unwrap().clone();
    assert_eq!(docs.len(), 1);
    assert!(docs[0]["_id"].is_string());
    assert_eq!(docs[0]["payload"][1]["model"], "Court Vision");

    let (_, docs) = h.get("/api/v1/lamoda/db").await;
    assert_eq!(docs.as_array().unwrap().len(), 1);
    assert_eq!(h.bus.pending(lamoda::SNEAKERS.topic), 0);
}

#[tokio::test]
async fn empty_topic_reads_empty_collection() {
    let h = sneakers_harness();
    let (status, docs) = h.get("/api/v1/lamoda/db/hrefs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(docs, json!([]));
    assert_eq!(h.store.len(lamoda::SNEAKER_HREFS.collection), 0);
}

#[tokio::test]
async fn detail_document_can_be_fetched_and_deleted() {
    let h = Harness::new(MockCatalog::new().with_detail(detail()), MockStreaming::new());
    h.get("/api/v1/lamoda/detail/href?href=/p/rtladl534401/").await;

    let (_, docs) = h.get("/api/v1/lamoda/db/details").await;
    let id = docs[0]["_id"].as_str().unwrap().to_string();

    let (status, doc) = h.get(&format!("/api/v1/lamoda/db/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["payload"]["model"], "Vicky");

    let (status, _) = h.send(Method::DELETE, &format!("/api/v1/lamoda/db/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = h.get(&format!("/api/v1/lamoda/db/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = h.send(Method::DELETE, &format!("/api/v1/lamoda/db/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_document_id_is_bad_request() {
    let h = sneakers_harness();
    let (status, _) = h.get("/api/v1/lamoda/db/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_store_write_is_server_error_and_keeps_message() {
    let h = Harness::with_store(
        MockCatalog::new().with_cards(vec![card("Puma", "RS-X", "300.00 р.")]),
        MockStreaming::new(),
        MemoryDocumentStore::new().failing_writes(),
    );
    h.get("/api/v1/lamoda?page=1").await;

    let (status, body) = h.get("/api/v1/lamoda/db").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert_eq!(h.bus.pending(lamoda::SNEAKERS.topic), 1);
}

// ---------------------------------------------------------------------------
// Twitch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authorize_returns_url() {
    let h = sneakers_harness();
    let (status, body) = h.get("/api/v1/twitch/auth").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["authorize_url"]
        .as_str()
        .unwrap()
        .starts_with("https://id.twitch.tv/oauth2/authorize"));
}

#[tokio::test]
async fn code_exchange_publishes_tokens() {
    let h = sneakers_harness();

    let (status, body) = h.get("/api/v1/twitch/auth/abc123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], "access-for-abc123");

    let (status, body) = h.get("/api/v1/twitch/auth/refresh?refresh_token=r1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], "refreshed-r1");

    assert_eq!(h.bus.published(twitch::AUTH.topic).len(), 2);
    let (_, docs) = h.get("/api/v1/twitch/db/auth").await;
    assert_eq!(docs.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn helix_records_are_published_and_read_through() {
    let top = vec![json!({"id": "509658", "name": "Just Chatting", "box_art_url": "", "igdb_id": ""})];
    let h = Harness::new(
        MockCatalog::new(),
        MockStreaming::new().with_records(&HelixQuery::TopGames, top.clone()),
    );

    let (status, body) = h.get("/api/v1/twitch/games/top?token=tok").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(top));
    assert_eq!(h.streaming.queries()[0], ("tok".to_string(), HelixQuery::TopGames));

    let (_, docs) = h.get("/api/v1/twitch/db/games/top").await;
    assert_eq!(docs[0]["payload"], json!(top));
}

#[tokio::test]
async fn path_ids_reach_the_right_query() {
    let followed = HelixQuery::FollowedChannels {
        user_id: "141981764".into(),
    };
    let h = Harness::new(
        MockCatalog::new(),
        MockStreaming::new().with_records(&followed, vec![json!({"broadcaster_id": "1"})]),
    );

    let (status, _) = h
        .get("/api/v1/twitch/channel/followed/141981764?token=tok")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.streaming.queries()[0].1, followed);
    assert_eq!(h.bus.published(twitch::CHANNEL_FOLLOWED.topic).len(), 1);

    let (status, _) = h
        .get("/api/v1/twitch/games/33214?token=tok&name=Fortnite")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        h.streaming.queries()[1].1,
        HelixQuery::Games {
            id: "33214".into(),
            name: "Fortnite".into(),
            igdb_id: String::new(),
        }
    );
}

#[tokio::test]
async fn missing_token_is_bad_request() {
    let h = sneakers_harness();
    let (status, body) = h.get("/api/v1/twitch/clips/123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "token is required");
    assert!(h.streaming.queries().is_empty());
}

#[tokio::test]
async fn repeated_token_is_json_bad_request() {
    let h = sneakers_harness();
    let (status, body) = h.get("/api/v1/twitch/clips/123?token=a&token=b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("token"));
    assert!(h.streaming.queries().is_empty());
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let h = Harness::new(MockCatalog::new(), MockStreaming::new().rejecting(401));
    let (status, _) = h.get("/api/v1/twitch/auth/user?access_token=old").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(h.bus.published(twitch::USER.topic).is_empty());
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let h = Harness::new(MockCatalog::new(), MockStreaming::new().rejecting(503));
    let (status, _) = h.get("/api/v1/twitch/pools/123?token=tok").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn store_documents_keep_insertion_order() {
    let h = sneakers_harness();
    for page in 1..=3 {
        h.bus
            .publish(lamoda::SNEAKERS.topic, &json!([{ "page": page }]))
            .await
            .unwrap();
    }
    h.get("/api/v1/lamoda/db").await;

    let docs = h.store.find_all(lamoda::SNEAKERS.collection).await.unwrap();
    let pages: Vec<_> = docs.iter().map(|d| d.payload[0]["page"].clone()).collect();
    assert_eq!(pages, vec![json!(1), json!(2), json!(3)]);
}
