//! Response and upload record types.
//!
//! An [`RsvpRecord`] is one guest's attendance submission as stored in the
//! hot document store and archived in `PostgreSQL`. Records are treated as
//! immutable snapshots by the aggregation engine: change events carry whole
//! before/after copies, never diffs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{RsvpId, UploadId};

// ---------------------------------------------------------------------------
// RsvpRecord
// ---------------------------------------------------------------------------

/// One guest's attendance response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RsvpRecord {
    /// Unique response identifier.
    pub id: RsvpId,
    /// Whether the guest is attending.
    pub attending: bool,
    /// Party size. Meaningful only when `attending` is true; the engine
    /// never reads it for a declined response.
    pub attendees: u32,
    /// Display name shown on the guest lists.
    pub name: String,
    /// When the response was first submitted.
    pub submitted_at: DateTime<Utc>,
    /// When the response was last modified.
    pub updated_at: DateTime<Utc>,
}

impl RsvpRecord {
    /// Whether two snapshots carry the same reply.
    ///
    /// Compares the three fields the aggregate depends on (`attending`,
    /// `attendees`, `name`); timestamps are deliberately ignored so that a
    /// touch-only write is still a no-op for the aggregate.
    pub fn same_reply(&self, other: &Self) -> bool {
        self.attending == other.attending
            && self.attendees == other.attendees
            && self.name == other.name
    }
}

// ---------------------------------------------------------------------------
// UploadRecord
// ---------------------------------------------------------------------------

/// An upload record pointing at a backing object in blob storage.
///
/// The upload browsing service owns these records; the engine only reacts
/// to their deletion by removing the blob at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UploadRecord {
    /// Unique upload identifier.
    pub id: UploadId,
    /// Path of the backing object, relative to the blob store root.
    pub path: String,
}
