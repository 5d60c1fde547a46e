//! Error types for the aggregation engine.

use headcount_types::RsvpId;

use crate::store::StoreError;

/// Errors a change-triggered handler can return.
///
/// Store failures propagate so the hosting event source can apply its own
/// retry policy. Malformed snapshots fail fast: guessing a default for
/// `attending` or `attendees` would silently corrupt the headcount.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// An incoming snapshot is unusable.
    #[error("malformed response {id}: {reason}")]
    Malformed {
        /// Identifier of the offending record.
        id: RsvpId,
        /// What is wrong with it.
        reason: String,
    },

    /// A store operation failed; nothing was applied.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}
