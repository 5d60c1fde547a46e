//! The running RSVP aggregate.
//!
//! [`RsvpSummary`] is the single derived document the display surface reads
//! instead of scanning every response. The aggregation engine owns its
//! consistency; everything else treats it as read-only.
//!
//! Serialized field names are `camelCase` (`rsvpCount`, `attendeeCount`,
//! `namesIn`, `namesOut`) to match the wire format the display consumes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The running aggregate over all attendance responses.
///
/// Invariants maintained by the engine:
///
/// 1. `attendee_count` equals the sum of `attendees` over all records
///    currently attending.
/// 2. Every attending record's name appears exactly once in `names_in`,
///    every declined record's name exactly once in `names_out`, and never
///    in both lists at once.
/// 3. `rsvp_count` counts creation events and is never decremented, not
///    even when a response later flips to declined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RsvpSummary {
    /// Number of responses ever created.
    pub rsvp_count: i64,
    /// Total headcount across currently-attending responses.
    pub attendee_count: i64,
    /// Display names of attending guests, most recent first.
    pub names_in: Vec<String>,
    /// Display names of declined guests, most recent first.
    pub names_out: Vec<String>,
}

impl RsvpSummary {
    /// An empty summary, the lazily-created default before any response.
    pub const fn empty() -> Self {
        Self {
            rsvp_count: 0,
            attendee_count: 0,
            names_in: Vec::new(),
            names_out: Vec::new(),
        }
    }
}
