//! Change events: the trigger contract between document writers and the
//! aggregation engine.
//!
//! Whoever writes a response or upload document publishes one of these
//! events on the matching NATS subject. The engine's listener consumes
//! them and invokes the corresponding handler. Events carry complete
//! before/after snapshots so handlers never re-read the source document.
//!
//! # Subjects
//!
//! | Subject | Event |
//! |---------|-------|
//! | `rsvp.changes.created` | [`ChangeEvent::RsvpCreated`] |
//! | `rsvp.changes.updated` | [`ChangeEvent::RsvpUpdated`] |
//! | `rsvp.uploads.deleted` | [`ChangeEvent::UploadDeleted`] |
//!
//! Delivery is at-least-once: the event source may redeliver, and the
//! engine accepts that creations can double-count until a rebuild runs.

use serde::{Deserialize, Serialize};

use crate::records::{RsvpRecord, UploadRecord};

/// NATS subject constants for change events.
pub mod subjects {
    /// Subject for response creation events.
    pub const RSVP_CREATED: &str = "rsvp.changes.created";
    /// Subject for response modification events.
    pub const RSVP_UPDATED: &str = "rsvp.changes.updated";
    /// Subject for upload deletion events.
    pub const UPLOAD_DELETED: &str = "rsvp.uploads.deleted";
    /// Wildcard covering every change subject.
    pub const ALL_CHANGES: &str = "rsvp.>";
}

/// A change observed on a response or upload document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A new response document was created.
    RsvpCreated {
        /// The freshly created response.
        record: RsvpRecord,
    },
    /// An existing response document was modified.
    RsvpUpdated {
        /// Snapshot before the modification.
        before: RsvpRecord,
        /// Snapshot after the modification.
        after: RsvpRecord,
    },
    /// An upload record was deleted.
    UploadDeleted {
        /// The deleted upload record.
        record: UploadRecord,
    },
}

impl ChangeEvent {
    /// The NATS subject this event is published on.
    pub const fn subject(&self) -> &'static str {
        match self {
            Self::RsvpCreated { .. } => subjects::RSVP_CREATED,
            Self::RsvpUpdated { .. } => subjects::RSVP_UPDATED,
            Self::UploadDeleted { .. } => subjects::UPLOAD_DELETED,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::ids::{RsvpId, UploadId};

    use super::*;

    fn record(name: &str) -> RsvpRecord {
        RsvpRecord {
            id: RsvpId::new(),
            attending: true,
            attendees: 2,
            name: name.to_owned(),
            submitted_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn subjects_match_variants() {
        let created = ChangeEvent::RsvpCreated { record: record("Ann") };
        assert_eq!(created.subject(), subjects::RSVP_CREATED);

        let updated = ChangeEvent::RsvpUpdated {
            before: record("Ann"),
            after: record("Annie"),
        };
        assert_eq!(updated.subject(), subjects::RSVP_UPDATED);

        let deleted = ChangeEvent::UploadDeleted {
            record: UploadRecord {
                id: UploadId::new(),
                path: String::from("gallery/01.jpg"),
            },
        };
        assert_eq!(deleted.subject(), subjects::UPLOAD_DELETED);
    }

    #[test]
    fn event_roundtrip_serde() {
        let event = ChangeEvent::RsvpUpdated {
            before: record("Ann"),
            after: record("Annie"),
        };
        let bytes = serde_json::to_vec(&event).unwrap_or_default();
        let restored: Result<ChangeEvent, _> = serde_json::from_slice(&bytes);
        assert_eq!(restored.ok(), Some(event));
    }

    #[test]
    fn event_payload_is_tagged() {
        let event = ChangeEvent::RsvpCreated { record: record("Bo") };
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(
            json.get("type").and_then(serde_json::Value::as_str),
            Some("rsvp_created")
        );
    }
}
