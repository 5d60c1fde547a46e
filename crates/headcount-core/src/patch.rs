//! Summary patches: the only way the aggregate is mutated.
//!
//! Handlers never read-modify-write the summary document. They build a
//! [`SummaryPatch`] -- an ordered list of primitive operations -- and hand
//! it to the store, which applies the whole patch through its atomic entry
//! point. Each operation touches exactly one field, so a committed patch
//! is a field-level merge: concurrent writers to other fields are never
//! clobbered.
//!
//! [`SummaryPatch::apply_to`] is the reference semantics. Backends either
//! call it under their own transaction (the in-memory store) or map each
//! operation to an equivalent atomic command (`Dragonfly`).

use headcount_types::{RsvpRecord, RsvpSummary};
use tracing::debug;

use crate::transition::{Shift, Transition};

/// Which of the two name lists an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The attending list (`names_in`).
    In,
    /// The declined list (`names_out`).
    Out,
}

/// A single primitive mutation of the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOp {
    /// Increment the response counter by one. Emitted only for creation
    /// events; the counter is never decremented.
    BumpResponses,
    /// Adjust the attending headcount by a signed delta.
    AdjustHeadcount(i64),
    /// Prepend a name to a list (most-recent-first order).
    Push {
        /// Target list.
        side: Side,
        /// Name to prepend.
        name: String,
    },
    /// Remove the first occurrence of a name from a list. Absent names
    /// are skipped, never an error.
    Remove {
        /// Target list.
        side: Side,
        /// Name to remove.
        name: String,
    },
    /// Replace the first occurrence of a name in place, preserving its
    /// position. Absent names are skipped, never an error.
    Rename {
        /// Target list.
        side: Side,
        /// Name to find.
        from: String,
        /// Replacement name.
        to: String,
    },
}

/// An ordered batch of [`SummaryOp`]s committed as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryPatch {
    ops: Vec<SummaryOp>,
}

impl SummaryPatch {
    /// An empty patch.
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Build the patch for a freshly created response.
    ///
    /// Bumps the response counter; an attending response also adds its
    /// party to the headcount and its name to the front of `names_in`,
    /// a declined response only adds its name to the front of `names_out`.
    pub fn for_created(record: &RsvpRecord) -> Self {
        let mut ops = vec![SummaryOp::BumpResponses];
        if record.attending {
            ops.push(SummaryOp::AdjustHeadcount(i64::from(record.attendees)));
            ops.push(SummaryOp::Push {
                side: Side::In,
                name: record.name.clone(),
            });
        } else {
            ops.push(SummaryOp::Push {
                side: Side::Out,
                name: record.name.clone(),
            });
        }
        Self { ops }
    }

    /// Build the patch for a classified modification.
    ///
    /// The rename (if any) is resolved first against the pre-change side,
    /// so the flip operations below always work with the new name. The
    /// response counter is untouched: it counts creations only.
    pub fn for_transition(transition: &Transition, after: &RsvpRecord) -> Self {
        let mut ops = Vec::new();

        if let Some(rename) = &transition.rename {
            let side = if rename.was_attending { Side::In } else { Side::Out };
            ops.push(SummaryOp::Rename {
                side,
                from: rename.from.clone(),
                to: rename.to.clone(),
            });
        }

        match transition.shift {
            Shift::FlippedOut { party } => {
                ops.push(SummaryOp::Remove {
                    side: Side::In,
                    name: after.name.clone(),
                });
                ops.push(SummaryOp::Push {
                    side: Side::Out,
                    name: after.name.clone(),
                });
                ops.push(SummaryOp::AdjustHeadcount(
                    i64::from(party).saturating_neg(),
                ));
            }
            Shift::FlippedIn { party } => {
                ops.push(SummaryOp::Remove {
                    side: Side::Out,
                    name: after.name.clone(),
                });
                ops.push(SummaryOp::Push {
                    side: Side::In,
                    name: after.name.clone(),
                });
                ops.push(SummaryOp::AdjustHeadcount(i64::from(party)));
            }
            Shift::Resized { from, to } => {
                ops.push(SummaryOp::AdjustHeadcount(
                    i64::from(to).saturating_sub(i64::from(from)),
                ));
            }
            Shift::None => {}
        }

        Self { ops }
    }

    /// The operations in application order.
    pub fn ops(&self) -> &[SummaryOp] {
        &self.ops
    }

    /// Whether the patch mutates anything.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply the patch to an in-memory summary.
    ///
    /// This is the reference semantics every backend must match. Counter
    /// adjustments saturate rather than wrap; absent names on remove or
    /// rename are skipped with a debug log.
    pub fn apply_to(&self, summary: &mut RsvpSummary) {
        for op in &self.ops {
            match op {
                SummaryOp::BumpResponses => {
                    summary.rsvp_count = summary.rsvp_count.saturating_add(1);
                }
                SummaryOp::AdjustHeadcount(delta) => {
                    summary.attendee_count = summary.attendee_count.saturating_add(*delta);
                }
                SummaryOp::Push { side, name } => {
                    list_mut(summary, *side).insert(0, name.clone());
                }
                SummaryOp::Remove { side, name } => {
                    let list = list_mut(summary, *side);
                    if let Some(index) = list.iter().position(|entry| entry == name) {
                        list.remove(index);
                    } else {
                        debug!(name = name.as_str(), ?side, "remove skipped, name absent");
                    }
                }
                SummaryOp::Rename { side, from, to } => {
                    let list = list_mut(summary, *side);
                    if let Some(slot) = list.iter_mut().find(|entry| entry.as_str() == from) {
                        *slot = to.clone();
                    } else {
                        debug!(from = from.as_str(), ?side, "rename skipped, name absent");
                    }
                }
            }
        }
    }
}

/// Borrow the list a [`Side`] refers to.
fn list_mut(summary: &mut RsvpSummary, side: Side) -> &mut Vec<String> {
    match side {
        Side::In => &mut summary.names_in,
        Side::Out => &mut summary.names_out,
    }
}
