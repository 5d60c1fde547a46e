//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled so the display page can be served from a
//! different origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/summary` -- `WebSocket` aggregate stream
/// - `GET /api/summary` -- current aggregate
/// - `POST /api/rsvp` -- submit a response
/// - `GET /api/rsvp/:id` -- single response
/// - `PUT /api/rsvp/:id` -- modify a response
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/summary", get(ws::ws_summary))
        // REST API
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/rsvp", post(handlers::create_rsvp))
        .route(
            "/api/rsvp/{id}",
            get(handlers::get_rsvp).put(handlers::update_rsvp),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
