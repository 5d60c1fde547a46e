//! Classification of a response modification into a typed transition.
//!
//! A modification is classified exactly once from its before/after
//! snapshots, then applied as a deterministic patch. The classification
//! has two independent parts:
//!
//! - [`Rename`] -- the display name changed. Orthogonal: it can co-occur
//!   with any shift and is resolved first, against the list the guest was
//!   on before the change.
//! - [`Shift`] -- what happened to the attendance side of the response.
//!   The `match` on `(before.attending, after.attending)` makes the shift
//!   arms mutually exclusive by construction: a response cannot flip in
//!   both directions, and a resize requires both snapshots attending.

use headcount_types::RsvpRecord;

/// A display-name change carried by a modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    /// The name before the change.
    pub from: String,
    /// The name after the change.
    pub to: String,
    /// Which list the old name lives on: `names_in` if the guest was
    /// attending before the change, `names_out` otherwise.
    pub was_attending: bool,
}

/// The attendance-side effect of a modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// Attendance status and party size are unchanged.
    None,
    /// The guest flipped from attending to declined.
    FlippedOut {
        /// Party size before the flip, to subtract from the headcount.
        party: u32,
    },
    /// The guest flipped from declined to attending.
    FlippedIn {
        /// Party size after the flip, to add to the headcount.
        party: u32,
    },
    /// The guest stayed attending but changed party size.
    Resized {
        /// Party size before the change.
        from: u32,
        /// Party size after the change.
        to: u32,
    },
}

/// The full typed transition computed from a before/after snapshot pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Name change, if any.
    pub rename: Option<Rename>,
    /// Attendance-side change, if any.
    pub shift: Shift,
}

impl Transition {
    /// Classify a modification from its before/after snapshots.
    pub fn classify(before: &RsvpRecord, after: &RsvpRecord) -> Self {
        let rename = (before.name != after.name).then(|| Rename {
            from: before.name.clone(),
            to: after.name.clone(),
            was_attending: before.attending,
        });

        let shift = match (before.attending, after.attending) {
            (true, false) => Shift::FlippedOut {
                party: before.attendees,
            },
            (false, true) => Shift::FlippedIn {
                party: after.attendees,
            },
            (true, true) if before.attendees != after.attendees => Shift::Resized {
                from: before.attendees,
                to: after.attendees,
            },
            // Same side, same party size (or both declined, where party
            // size carries no meaning for the aggregate).
            _ => Shift::None,
        };

        Self { rename, shift }
    }

    /// Whether this transition leaves the aggregate untouched.
    pub const fn is_settled(&self) -> bool {
        self.rename.is_none() && matches!(self.shift, Shift::None)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use headcount_types::RsvpId;

    use super::*;

    fn record(attending: bool, attendees: u32, name: &str) -> RsvpRecord {
        RsvpRecord {
            id: RsvpId::new(),
            attending,
            attendees,
            name: name.to_owned(),
            submitted_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unchanged_reply_is_settled() {
        let before = record(true, 4, "Ann");
        let after = before.clone();
        let transition = Transition::classify(&before, &after);
        assert!(transition.is_settled());
    }

    #[test]
    fn flip_to_declined_carries_old_party() {
        let before = record(true, 4, "Ann");
        let mut after = before.clone();
        after.attending = false;
        let transition = Transition::classify(&before, &after);
        assert_eq!(transition.shift, Shift::FlippedOut { party: 4 });
        assert!(transition.rename.is_none());
    }

    #[test]
    fn flip_to_attending_carries_new_party() {
        let before = record(false, 1, "Ann");
        let mut after = before.clone();
        after.attending = true;
        after.attendees = 3;
        let transition = Transition::classify(&before, &after);
        assert_eq!(transition.shift, Shift::FlippedIn { party: 3 });
    }

    #[test]
    fn resize_requires_both_sides_attending() {
        let before = record(true, 2, "Bo");
        let mut after = before.clone();
        after.attendees = 5;
        let transition = Transition::classify(&before, &after);
        assert_eq!(transition.shift, Shift::Resized { from: 2, to: 5 });
    }

    #[test]
    fn party_change_while_declined_is_no_shift() {
        let before = record(false, 2, "Bo");
        let mut after = before.clone();
        after.attendees = 5;
        let transition = Transition::classify(&before, &after);
        assert_eq!(transition.shift, Shift::None);
        // Not settled in the raw-field sense, but nothing for the
        // aggregate to do.
        assert!(transition.is_settled());
    }

    #[test]
    fn rename_is_orthogonal_to_flip() {
        let before = record(true, 4, "Ann");
        let mut after = before.clone();
        after.name = String::from("Annie");
        after.attending = false;
        let transition = Transition::classify(&before, &after);
        let rename = transition.rename.as_ref();
        assert_eq!(rename.map(|r| r.from.as_str()), Some("Ann"));
        assert_eq!(rename.map(|r| r.to.as_str()), Some("Annie"));
        assert_eq!(rename.map(|r| r.was_attending), Some(true));
        assert_eq!(transition.shift, Shift::FlippedOut { party: 4 });
    }

    #[test]
    fn rename_tracks_pre_change_side() {
        let before = record(false, 1, "Cy");
        let mut after = before.clone();
        after.name = String::from("Cyrus");
        let transition = Transition::classify(&before, &after);
        assert_eq!(transition.rename.map(|r| r.was_attending), Some(false));
        assert_eq!(transition.shift, Shift::None);
    }
}
