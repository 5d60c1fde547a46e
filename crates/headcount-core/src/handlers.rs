//! Change-triggered handlers: the trigger contract of the engine.
//!
//! The external event source invokes these once per document change,
//! at-least-once. Each handler validates its snapshots, builds a
//! [`SummaryPatch`], and commits it through the store's atomic entry
//! point. Handlers are safe to run concurrently for different records:
//! every commit is a field-level merge applied atomically by the store,
//! so overlapping invocations compose instead of overwriting each other.

use headcount_types::{RsvpRecord, RsvpSummary, UploadRecord};
use tracing::{debug, info};

use crate::error::HandlerError;
use crate::patch::SummaryPatch;
use crate::store::{BlobStore, SummaryStore};
use crate::transition::Transition;

/// Reject snapshots the aggregate math cannot trust.
fn validate(record: &RsvpRecord) -> Result<(), HandlerError> {
    if record.name.trim().is_empty() {
        return Err(HandlerError::Malformed {
            id: record.id,
            reason: String::from("display name is blank"),
        });
    }
    if record.attending && record.attendees == 0 {
        return Err(HandlerError::Malformed {
            id: record.id,
            reason: String::from("attending with a party size of zero"),
        });
    }
    Ok(())
}

/// Handle the creation of a response document.
///
/// Bumps the response counter and, for an attending guest, adds the party
/// to the headcount and the name to the front of the attending list; a
/// declined guest's name goes to the front of the declined list. The
/// summary document is created with zero/empty defaults if this is the
/// first response ever.
///
/// # Errors
///
/// Returns [`HandlerError::Malformed`] for an unusable record and
/// [`HandlerError::Store`] if the commit fails (nothing is applied).
pub async fn on_rsvp_created(
    store: &dyn SummaryStore,
    record: &RsvpRecord,
) -> Result<RsvpSummary, HandlerError> {
    validate(record)?;

    let patch = SummaryPatch::for_created(record);
    let summary = store.commit(&patch).await?;

    info!(
        id = %record.id,
        attending = record.attending,
        attendees = record.attendees,
        rsvp_count = summary.rsvp_count,
        attendee_count = summary.attendee_count,
        "response created"
    );
    Ok(summary)
}

/// Handle the modification of a response document.
///
/// Returns `Ok(None)` without touching the store when the reply is
/// unchanged (same attendance, party size, and name) -- the cheap exit
/// that keeps redeliveries and touch-only writes off the shared
/// aggregate. Otherwise the modification is classified once into a
/// [`Transition`] and applied as a single patch: rename first (against
/// the pre-change list), then the attendance shift. The response counter
/// is never decremented.
///
/// # Errors
///
/// Returns [`HandlerError::Malformed`] when the snapshots are unusable or
/// disagree about which record they describe, and [`HandlerError::Store`]
/// if the commit fails.
pub async fn on_rsvp_updated(
    store: &dyn SummaryStore,
    before: &RsvpRecord,
    after: &RsvpRecord,
) -> Result<Option<RsvpSummary>, HandlerError> {
    if before.id != after.id {
        return Err(HandlerError::Malformed {
            id: after.id,
            reason: format!("before/after snapshots describe different records ({})", before.id),
        });
    }
    validate(before)?;
    validate(after)?;

    if before.same_reply(after) {
        debug!(id = %after.id, "modification carries no reply change, skipping");
        return Ok(None);
    }

    let transition = Transition::classify(before, after);
    let patch = SummaryPatch::for_transition(&transition, after);
    let summary = store.commit(&patch).await?;

    info!(
        id = %after.id,
        ?transition,
        attendee_count = summary.attendee_count,
        "response updated"
    );
    Ok(Some(summary))
}

/// Handle the deletion of an upload record.
///
/// Removes the backing object from blob storage. One-shot and idempotent;
/// there is no aggregation side to this.
///
/// # Errors
///
/// Returns [`HandlerError::Store`] if the blob store fails.
pub async fn on_upload_deleted(
    blobs: &dyn BlobStore,
    record: &UploadRecord,
) -> Result<(), HandlerError> {
    blobs.delete(&record.path).await?;
    info!(id = %record.id, path = record.path.as_str(), "upload blob deleted");
    Ok(())
}
