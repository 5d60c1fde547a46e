//! Shared type definitions for the Headcount RSVP service.
//!
//! This crate is the single source of truth for all types used across the
//! Headcount workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the display frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for record identifiers
//! - [`records`] -- Response and upload record snapshots
//! - [`summary`] -- The running RSVP aggregate the display reads
//! - [`events`] -- Change events and their NATS subjects

pub mod events;
pub mod ids;
pub mod records;
pub mod summary;

// Re-export all public types at crate root for convenience.
pub use events::{ChangeEvent, subjects};
pub use ids::{RsvpId, UploadId};
pub use records::{RsvpRecord, UploadRecord};
pub use summary::RsvpSummary;

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::RsvpId::export_all();
        let _ = crate::ids::UploadId::export_all();
        let _ = crate::records::RsvpRecord::export_all();
        let _ = crate::records::UploadRecord::export_all();
        let _ = crate::summary::RsvpSummary::export_all();
    }
}
