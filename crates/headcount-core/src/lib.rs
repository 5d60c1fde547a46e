//! Incremental aggregation engine for the Headcount RSVP service.
//!
//! The engine keeps one summary document consistent with the response
//! collection by reacting to change events instead of recomputing on
//! every read. It is deliberately free of I/O: stores, blob storage, and
//! event transport sit behind traits the data layer implements.
//!
//! # Modules
//!
//! - [`transition`] -- classify a modification once into rename x shift
//! - [`patch`] -- primitive summary operations, built and applied as one
//!   atomic batch
//! - [`handlers`] -- the change-triggered handler contract
//! - [`store`] -- summary/response/blob store seams
//! - [`publish`] -- change event publication seam
//! - [`fold`] -- deterministic recomputation and drift audit
//! - [`error`] -- handler error types

pub mod error;
pub mod fold;
pub mod handlers;
pub mod patch;
pub mod publish;
pub mod store;
pub mod transition;

// Re-export primary types for convenience.
pub use error::HandlerError;
pub use fold::{AuditResult, SummaryDrift, audit, fold_summary};
pub use handlers::{on_rsvp_created, on_rsvp_updated, on_upload_deleted};
pub use patch::{Side, SummaryOp, SummaryPatch};
pub use publish::{ChangePublisher, PublishError};
pub use store::{BlobStore, ResponseStore, StoreError, SummaryStore};
pub use transition::{Rename, Shift, Transition};
