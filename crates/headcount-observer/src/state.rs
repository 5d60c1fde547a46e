//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the store seams the handlers operate through and
//! the broadcast channel that fans the freshly merged summary out to
//! `WebSocket` clients. The engine's change listener calls
//! [`AppState::broadcast`] after every applied patch.

use std::sync::Arc;

use headcount_core::{ChangePublisher, ResponseStore, SummaryStore};
use headcount_types::RsvpSummary;
use tokio::sync::broadcast;

/// Capacity of the broadcast channel for summary updates.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest summary, which is always the one worth displaying.
const BROADCAST_CAPACITY: usize = 64;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// stores and publisher are trait objects so the same server runs
/// against `Dragonfly` in production and the in-memory store in tests.
#[derive(Clone)]
pub struct AppState {
    /// The aggregate document store the display reads.
    pub summaries: Arc<dyn SummaryStore>,
    /// The response document store submissions write to.
    pub responses: Arc<dyn ResponseStore>,
    /// Where submission handlers publish change events.
    pub publisher: Arc<dyn ChangePublisher>,
    /// Broadcast sender for summary updates.
    pub tx: broadcast::Sender<RsvpSummary>,
}

impl AppState {
    /// Create application state over the given seams.
    pub fn new(
        summaries: Arc<dyn SummaryStore>,
        responses: Arc<dyn ResponseStore>,
        publisher: Arc<dyn ChangePublisher>,
    ) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            summaries,
            responses,
            publisher,
            tx,
        }
    }

    /// Subscribe to the summary broadcast channel.
    ///
    /// Returns a receiver that yields the merged [`RsvpSummary`] after
    /// every change the engine applies.
    pub fn subscribe(&self) -> broadcast::Receiver<RsvpSummary> {
        self.tx.subscribe()
    }

    /// Publish a summary update to all connected clients.
    ///
    /// Returns the number of receivers that got the message. Returns 0
    /// when no `WebSocket` client is connected, which is not an error.
    pub fn broadcast(&self, summary: &RsvpSummary) -> usize {
        // send returns Err only when there are zero receivers,
        // which is normal when no WebSocket clients are connected.
        self.tx.send(summary.clone()).unwrap_or(0)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("subscribers", &self.tx.receiver_count())
            .finish_non_exhaustive()
    }
}
