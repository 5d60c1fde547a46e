//! Store seams the aggregation engine operates through.
//!
//! The engine owns these traits; the data layer implements them. All
//! summary mutation flows through [`SummaryStore::commit`], the single
//! atomic entry point -- there is no write path that lets a caller read,
//! modify, and write the document back, so two overlapping handler
//! invocations can never silently discard each other's effect.

use async_trait::async_trait;
use headcount_types::{RsvpId, RsvpRecord, RsvpSummary};

use crate::patch::SummaryPatch;

/// Errors surfaced by any of the store seams.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store failed or is unreachable.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A stored document could not be (de)serialized.
    #[error("store serialization error: {0}")]
    Serialization(String),
}

/// The owning interface of the aggregate document.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Read the current summary. `None` means no response has ever been
    /// aggregated; the document is created lazily by the first commit.
    async fn read(&self) -> Result<Option<RsvpSummary>, StoreError>;

    /// Atomically apply a patch and return the merged summary.
    ///
    /// The commit is a field-level merge: operations touch only the
    /// fields they name, and the whole patch lands or none of it does.
    /// Creates the document with zero/empty defaults if absent.
    async fn commit(&self, patch: &SummaryPatch) -> Result<RsvpSummary, StoreError>;

    /// Overwrite the summary wholesale. Used only by the rebuild path;
    /// handlers never call this.
    async fn replace(&self, summary: &RsvpSummary) -> Result<(), StoreError>;
}

/// Document store for individual response records.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Fetch a response by ID.
    async fn fetch(&self, id: RsvpId) -> Result<Option<RsvpRecord>, StoreError>;

    /// Create or overwrite a response document.
    async fn put(&self, record: &RsvpRecord) -> Result<(), StoreError>;
}

/// Blob storage holding the objects behind upload records.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Delete the object at `path`. Idempotent: deleting an object that
    /// is already gone is success.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;
}
