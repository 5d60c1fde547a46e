//! NATS change listener: the bridge between the event source and the
//! aggregation handlers.
//!
//! The listener subscribes to every change subject (`rsvp.>`), decodes
//! each payload into a [`ChangeEvent`], and dispatches it to the matching
//! handler. A successfully applied change produces a merged summary that
//! is broadcast to the observer's `WebSocket` clients and, when the
//! archive is configured, an upserted archive row.
//!
//! Undecodable payloads are logged and skipped; handler failures are
//! logged and the loop keeps running so one poisoned event cannot stall
//! the stream. Delivery is at-least-once, and the handlers' no-op
//! detection plus the rebuild path bound the damage of redeliveries.

use std::sync::Arc;

use futures::StreamExt as _;
use headcount_core::{
    BlobStore, HandlerError, SummaryStore, on_rsvp_created, on_rsvp_updated, on_upload_deleted,
};
use headcount_db::{PostgresPool, ResponseArchive};
use headcount_observer::AppState;
use headcount_types::{ChangeEvent, RsvpRecord, subjects};
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// Subscription handle to the change subjects.
pub struct ChangeListener {
    client: async_nats::Client,
}

impl ChangeListener {
    /// Connect to a NATS server.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Nats`] if the connection cannot be
    /// established.
    pub async fn connect(url: &str) -> Result<Self, EngineError> {
        info!(url = url, "connecting to NATS server");
        let client = async_nats::connect(url).await.map_err(|e| EngineError::Nats {
            message: format!("failed to connect to {url}: {e}"),
        })?;
        info!("NATS connection established");
        Ok(Self { client })
    }

    /// Create a listener from an existing client.
    #[allow(dead_code)]
    pub const fn new(client: async_nats::Client) -> Self {
        Self { client }
    }

    /// Return a clone of the underlying client, e.g. for a publisher.
    pub fn client(&self) -> async_nats::Client {
        self.client.clone()
    }

    /// Subscribe to all change subjects.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Nats`] if the subscription fails.
    pub async fn subscribe(&self) -> Result<async_nats::Subscriber, EngineError> {
        let subject = subjects::ALL_CHANGES;
        debug!(subject = subject, "subscribing to change subjects");
        let subscriber = self
            .client
            .subscribe(subject.to_owned())
            .await
            .map_err(|e| EngineError::Nats {
                message: format!("failed to subscribe to {subject}: {e}"),
            })?;
        info!("subscribed to change subjects");
        Ok(subscriber)
    }

    /// Deserialize a NATS message payload into a [`ChangeEvent`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Nats`] if deserialization fails.
    pub fn deserialize_event(data: &[u8]) -> Result<ChangeEvent, EngineError> {
        serde_json::from_slice(data).map_err(|e| EngineError::Nats {
            message: format!("failed to deserialize change event: {e}"),
        })
    }
}

impl std::fmt::Debug for ChangeListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeListener")
            .field("connected", &true)
            .finish()
    }
}

/// Applies decoded change events to the aggregate and its side channels.
pub struct ChangeDispatcher {
    /// The aggregate store the handlers commit through.
    summaries: Arc<dyn SummaryStore>,
    /// Blob storage for upload deletions.
    blobs: Arc<dyn BlobStore>,
    /// Cold archive pool, absent when the archive is disabled.
    archive: Option<PostgresPool>,
    /// Observer state, for broadcasting fresh summaries.
    state: Arc<AppState>,
}

impl ChangeDispatcher {
    /// Create a dispatcher over the configured stores.
    pub const fn new(
        summaries: Arc<dyn SummaryStore>,
        blobs: Arc<dyn BlobStore>,
        archive: Option<PostgresPool>,
        state: Arc<AppState>,
    ) -> Self {
        Self {
            summaries,
            blobs,
            archive,
            state,
        }
    }

    /// Apply one change event.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the handler rejects the event or the
    /// store fails; the caller decides whether to keep consuming.
    pub async fn dispatch(&self, event: &ChangeEvent) -> Result<(), HandlerError> {
        match event {
            ChangeEvent::RsvpCreated { record } => {
                let summary = on_rsvp_created(self.summaries.as_ref(), record).await?;
                self.state.broadcast(&summary);
                self.archive_row(record).await;
            }
            ChangeEvent::RsvpUpdated { before, after } => {
                if let Some(summary) =
                    on_rsvp_updated(self.summaries.as_ref(), before, after).await?
                {
                    self.state.broadcast(&summary);
                }
                self.archive_row(after).await;
            }
            ChangeEvent::UploadDeleted { record } => {
                on_upload_deleted(self.blobs.as_ref(), record).await?;
            }
        }
        Ok(())
    }

    /// Upsert the archive row for a record. Archive failures are logged
    /// but never fail the dispatch: the hot path stays authoritative and
    /// the archive catches up on the next event or rebuild.
    async fn archive_row(&self, record: &RsvpRecord) {
        let Some(pg) = &self.archive else {
            return;
        };
        let archive = ResponseArchive::new(pg.pool());
        if let Err(e) = archive.upsert(record).await {
            warn!(id = %record.id, error = %e, "failed to archive response");
        }
    }

    /// Consume the subscription until it closes.
    ///
    /// Each message is decoded and dispatched in turn. Decode failures
    /// and handler errors are logged and skipped.
    pub async fn run(&self, mut subscriber: async_nats::Subscriber) {
        info!("change listener running");
        while let Some(message) = subscriber.next().await {
            let event = match ChangeListener::deserialize_event(&message.payload) {
                Ok(event) => event,
                Err(e) => {
                    warn!(
                        subject = message.subject.as_str(),
                        error = %e,
                        "dropping undecodable change event"
                    );
                    continue;
                }
            };

            if let Err(e) = self.dispatch(&event).await {
                warn!(
                    subject = message.subject.as_str(),
                    error = %e,
                    "change event failed"
                );
            }
        }
        info!("change subscription closed");
    }
}

impl std::fmt::Debug for ChangeDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeDispatcher")
            .field("archive_enabled", &self.archive.is_some())
            .finish_non_exhaustive()
    }
}
