//! Data layer for the Headcount RSVP service (`Dragonfly` + `PostgreSQL`).
//!
//! `Dragonfly` serves the hot state: live response documents and the
//! summary the display reads, with every summary mutation applied as an
//! atomic command. `PostgreSQL` serves the cold archive: the full
//! response history the summary can be rebuilt from. This crate provides
//! the interface to both stores plus an in-memory implementation of the
//! same seams for tests and single-process deployments.
//!
//! # Architecture
//!
//! ```text
//! Change listener / observer
//!     |
//!     +-- Hot documents + summary --> Dragonfly (DragonflyPool,
//!     |                                          DragonflySummaryStore)
//!     +-- Cold archive  -----------> PostgreSQL (ResponseArchive)
//!     +-- Upload objects ----------> Filesystem (FsBlobStore)
//! ```
//!
//! # Modules
//!
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) hot state operations
//! - [`summary_store`] -- atomic patch application against `Dragonfly`
//! - [`memory`] -- in-memory store (tests, single-process mode)
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`archive`] -- response archive (upsert, fetch-all for rebuilds)
//! - [`blob`] -- filesystem blob store behind upload records
//! - [`error`] -- shared error types

pub mod archive;
pub mod blob;
pub mod dragonfly;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod summary_store;

// Re-export primary types for convenience.
pub use archive::{ResponseArchive, ResponseRow};
pub use blob::FsBlobStore;
pub use dragonfly::DragonflyPool;
pub use error::DbError;
pub use memory::MemoryStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use summary_store::DragonflySummaryStore;
