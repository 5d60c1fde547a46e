//! NATS-backed change event publisher.
//!
//! [`NatsChangePublisher`] implements the engine's [`ChangePublisher`]
//! seam by serializing each event and publishing it on its subject. The
//! observer's submission handlers hold this behind the trait, so tests
//! can swap in an inline dispatcher.

use async_trait::async_trait;
use headcount_core::{ChangePublisher, PublishError};
use headcount_types::ChangeEvent;
use tracing::debug;

/// Change publisher over an established NATS connection.
#[derive(Clone)]
pub struct NatsChangePublisher {
    client: async_nats::Client,
}

impl NatsChangePublisher {
    /// Create a publisher from an existing client.
    pub const fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChangePublisher for NatsChangePublisher {
    async fn publish(&self, event: &ChangeEvent) -> Result<(), PublishError> {
        let subject = event.subject();
        let payload = serde_json::to_vec(event)
            .map_err(|e| PublishError::Serialization(format!("failed to serialize event: {e}")))?;

        self.client
            .publish(subject.to_owned(), payload.into())
            .await
            .map_err(|e| PublishError::Transport(format!("failed to publish on {subject}: {e}")))?;

        debug!(subject, "published change event");
        Ok(())
    }
}

impl std::fmt::Debug for NatsChangePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsChangePublisher")
            .field("connected", &true)
            .finish()
    }
}
