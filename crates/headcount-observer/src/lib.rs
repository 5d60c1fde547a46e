//! Observer API server for the Headcount RSVP service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/summary`) streaming the aggregate
//!   after every applied change via [`tokio::sync::broadcast`]
//! - **REST endpoints** for reading the aggregate and submitting or
//!   modifying responses
//! - **Minimal HTML status page** (`GET /`) showing the current counts
//!
//! # Architecture
//!
//! The server never mutates the aggregate. Submission handlers write the
//! response document and publish a change event; the engine's listener
//! applies the change and calls [`AppState::broadcast`] with the merged
//! summary, which fans out to `WebSocket` clients. Reads go straight to
//! the aggregate document.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, spawn_observer, start_server};
pub use state::AppState;
