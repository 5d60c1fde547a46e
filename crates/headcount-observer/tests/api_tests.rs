//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, backed by the in-memory store and a loopback
//! publisher that dispatches change events straight into the engine
//! handlers. This exercises the whole submit -> aggregate round trip
//! without NATS or Docker.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use headcount_core::{
    ChangePublisher, PublishError, on_rsvp_created, on_rsvp_updated,
};
use headcount_db::MemoryStore;
use headcount_observer::state::AppState;
use headcount_observer::build_router;
use headcount_types::ChangeEvent;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Publisher that applies each event inline against the shared store,
/// standing in for the NATS listener.
struct LoopbackPublisher {
    store: Arc<MemoryStore>,
}

#[async_trait]
impl ChangePublisher for LoopbackPublisher {
    async fn publish(&self, event: &ChangeEvent) -> Result<(), PublishError> {
        let result = match event {
            ChangeEvent::RsvpCreated { record } => {
                on_rsvp_created(self.store.as_ref(), record).await.map(|_| ())
            }
            ChangeEvent::RsvpUpdated { before, after } => {
                on_rsvp_updated(self.store.as_ref(), before, after)
                    .await
                    .map(|_| ())
            }
            ChangeEvent::UploadDeleted { .. } => Ok(()),
        };
        result.map_err(|e| PublishError::Transport(e.to_string()))
    }
}

fn make_test_state() -> Arc<AppState> {
    let store = Arc::new(MemoryStore::new());
    let publisher = Arc::new(LoopbackPublisher {
        store: Arc::clone(&store),
    });
    Arc::new(AppState::new(store.clone(), store, publisher))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::put(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn index_returns_html() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_summary_serves_zero_defaults() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/api/summary").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["rsvpCount"], 0);
    assert_eq!(json["attendeeCount"], 0);
    assert_eq!(json["namesIn"], json!([]));
    assert_eq!(json["namesOut"], json!([]));
}

#[tokio::test]
async fn submitting_a_response_updates_the_summary() {
    let state = make_test_state();

    let response = build_router(Arc::clone(&state))
        .oneshot(post_json(
            "/api/rsvp",
            json!({"attending": true, "attendees": 4, "name": "Ann"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let summary = build_router(state)
        .oneshot(Request::get("/api/summary").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(summary.into_body()).await;
    assert_eq!(json["rsvpCount"], 1);
    assert_eq!(json["attendeeCount"], 4);
    assert_eq!(json["namesIn"], json!(["Ann"]));
}

#[tokio::test]
async fn flipping_a_response_moves_the_guest_out() {
    let state = make_test_state();

    let created = build_router(Arc::clone(&state))
        .oneshot(post_json(
            "/api/rsvp",
            json!({"attending": true, "attendees": 4, "name": "Ann"}),
        ))
        .await
        .unwrap();
    let record = body_to_json(created.into_body()).await;
    let id = record["id"].as_str().unwrap().to_owned();

    let updated = build_router(Arc::clone(&state))
        .oneshot(put_json(
            &format!("/api/rsvp/{id}"),
            json!({"attending": false}),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);

    let summary = build_router(state)
        .oneshot(Request::get("/api/summary").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(summary.into_body()).await;
    assert_eq!(json["rsvpCount"], 1);
    assert_eq!(json["attendeeCount"], 0);
    assert_eq!(json["namesIn"], json!([]));
    assert_eq!(json["namesOut"], json!(["Ann"]));
}

#[tokio::test]
async fn renaming_keeps_counts_untouched() {
    let state = make_test_state();

    let created = build_router(Arc::clone(&state))
        .oneshot(post_json(
            "/api/rsvp",
            json!({"attending": true, "attendees": 2, "name": "Bo"}),
        ))
        .await
        .unwrap();
    let record = body_to_json(created.into_body()).await;
    let id = record["id"].as_str().unwrap().to_owned();

    let _ = build_router(Arc::clone(&state))
        .oneshot(put_json(&format!("/api/rsvp/{id}"), json!({"name": "Beau"})))
        .await
        .unwrap();

    let summary = build_router(state)
        .oneshot(Request::get("/api/summary").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(summary.into_body()).await;
    assert_eq!(json["attendeeCount"], 2);
    assert_eq!(json["namesIn"], json!(["Beau"]));
}

#[tokio::test]
async fn fetching_a_submitted_response_roundtrips() {
    let state = make_test_state();

    let created = build_router(Arc::clone(&state))
        .oneshot(post_json(
            "/api/rsvp",
            json!({"attending": false, "attendees": 0, "name": "Cy"}),
        ))
        .await
        .unwrap();
    let record = body_to_json(created.into_body()).await;
    let id = record["id"].as_str().unwrap().to_owned();

    let fetched = build_router(state)
        .oneshot(
            Request::get(format!("/api/rsvp/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    let json = body_to_json(fetched.into_body()).await;
    assert_eq!(json["name"], "Cy");
    assert_eq!(json["attending"], false);
}

#[tokio::test]
async fn unknown_response_is_404() {
    let router = build_router(make_test_state());
    let id = uuid::Uuid::now_v7();

    let response = router
        .oneshot(
            Request::get(format!("/api/rsvp/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_id_is_400() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::get("/api/rsvp/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn attending_with_zero_party_is_rejected() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(post_json(
            "/api/rsvp",
            json!({"attending": true, "attendees": 0, "name": "Ann"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(post_json(
            "/api/rsvp",
            json!({"attending": true, "attendees": 2, "name": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_party_is_rejected() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(post_json(
            "/api/rsvp",
            json!({"attending": true, "attendees": 500, "name": "Ann"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn broadcast_reaches_ws_subscribers() {
    let state = make_test_state();
    let mut rx = state.subscribe();

    let summary = headcount_types::RsvpSummary {
        rsvp_count: 1,
        attendee_count: 4,
        names_in: vec![String::from("Ann")],
        names_out: Vec::new(),
    };
    let delivered = state.broadcast(&summary);
    assert_eq!(delivered, 1);
    assert_eq!(rx.recv().await.unwrap(), summary);
}
