//! Change event publication seam.
//!
//! Document writers (the observer's submission handlers, backfill tools)
//! publish a [`ChangeEvent`] after every document write. The engine's
//! listener consumes the events and drives the handlers. Keeping the
//! publisher behind a trait lets tests dispatch events inline without a
//! message broker.

use async_trait::async_trait;
use headcount_types::ChangeEvent;

/// Errors surfaced when publishing a change event.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The transport rejected or dropped the event.
    #[error("publish transport error: {0}")]
    Transport(String),

    /// The event could not be serialized.
    #[error("publish serialization error: {0}")]
    Serialization(String),
}

/// Sink for change events.
#[async_trait]
pub trait ChangePublisher: Send + Sync {
    /// Publish one change event to the engine.
    async fn publish(&self, event: &ChangeEvent) -> Result<(), PublishError>;
}
