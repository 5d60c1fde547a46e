//! `Dragonfly`-backed summary store.
//!
//! Patch operations map one-to-one onto atomic Redis commands, so two
//! handler invocations committing concurrently can interleave at the
//! command level without ever losing an update:
//!
//! | Operation | Command |
//! |-----------|---------|
//! | Bump the response counter | `HINCRBY rsvp:summary rsvp_count 1` |
//! | Adjust the headcount | `HINCRBY rsvp:summary attendee_count d` |
//! | Prepend a name | `LPUSH` |
//! | Remove a name | `LREM key 1 name` |
//! | Rename in place | `LPOS` + `LSET` |
//!
//! Counter commands create the summary hash on first use, which is how
//! the document comes into existence lazily.

use async_trait::async_trait;
use fred::prelude::*;
use headcount_core::{StoreError, SummaryOp, SummaryPatch, SummaryStore};
use headcount_types::RsvpSummary;
use tracing::debug;

use crate::dragonfly::{DragonflyPool, NAMES_IN_KEY, NAMES_OUT_KEY, SUMMARY_KEY};

/// Hash field for the response counter.
const RSVP_COUNT_FIELD: &str = "rsvp_count";

/// Hash field for the attending headcount.
const ATTENDEE_COUNT_FIELD: &str = "attendee_count";

/// Summary store backed by the `Dragonfly` hot state.
#[derive(Debug, Clone)]
pub struct DragonflySummaryStore {
    pool: DragonflyPool,
}

impl DragonflySummaryStore {
    /// Create a summary store on top of an existing pool.
    pub const fn new(pool: DragonflyPool) -> Self {
        Self { pool }
    }

    /// The list key a [`headcount_core::Side`] refers to.
    const fn list_key(side: headcount_core::Side) -> &'static str {
        match side {
            headcount_core::Side::In => NAMES_IN_KEY,
            headcount_core::Side::Out => NAMES_OUT_KEY,
        }
    }

    /// Apply one patch operation as its atomic command.
    async fn apply_op(&self, op: &SummaryOp) -> Result<(), StoreError> {
        let client = self.pool.client();
        match op {
            SummaryOp::BumpResponses => {
                let _: i64 = client
                    .hincrby(SUMMARY_KEY, RSVP_COUNT_FIELD, 1)
                    .await
                    .map_err(backend)?;
            }
            SummaryOp::AdjustHeadcount(delta) => {
                let _: i64 = client
                    .hincrby(SUMMARY_KEY, ATTENDEE_COUNT_FIELD, *delta)
                    .await
                    .map_err(backend)?;
            }
            SummaryOp::Push { side, name } => {
                let _: u64 = client
                    .lpush(Self::list_key(*side), name.as_str())
                    .await
                    .map_err(backend)?;
            }
            SummaryOp::Remove { side, name } => {
                let removed: u64 = client
                    .lrem(Self::list_key(*side), 1, name.as_str())
                    .await
                    .map_err(backend)?;
                if removed == 0 {
                    debug!(name = name.as_str(), "remove skipped, name absent");
                }
            }
            SummaryOp::Rename { side, from, to } => {
                let key = Self::list_key(*side);
                let index: Option<i64> = client
                    .lpos(key, from.as_str(), None, None, None)
                    .await
                    .map_err(backend)?;
                if let Some(index) = index {
                    let _: () = client
                        .lset(key, index, to.as_str())
                        .await
                        .map_err(backend)?;
                } else {
                    debug!(from = from.as_str(), "rename skipped, name absent");
                }
            }
        }
        Ok(())
    }

    /// Read the full summary regardless of whether it exists yet.
    async fn read_merged(&self) -> Result<RsvpSummary, StoreError> {
        let client = self.pool.client();

        let rsvp_count: Option<i64> = client
            .hget(SUMMARY_KEY, RSVP_COUNT_FIELD)
            .await
            .map_err(backend)?;
        let attendee_count: Option<i64> = client
            .hget(SUMMARY_KEY, ATTENDEE_COUNT_FIELD)
            .await
            .map_err(backend)?;
        let names_in: Vec<String> = client
            .lrange(NAMES_IN_KEY, 0, -1)
            .await
            .map_err(backend)?;
        let names_out: Vec<String> = client
            .lrange(NAMES_OUT_KEY, 0, -1)
            .await
            .map_err(backend)?;

        Ok(RsvpSummary {
            rsvp_count: rsvp_count.unwrap_or(0),
            attendee_count: attendee_count.unwrap_or(0),
            names_in,
            names_out,
        })
    }
}

#[async_trait]
impl SummaryStore for DragonflySummaryStore {
    async fn read(&self) -> Result<Option<RsvpSummary>, StoreError> {
        let existing: u64 = self
            .pool
            .client()
            .exists(vec![SUMMARY_KEY, NAMES_IN_KEY, NAMES_OUT_KEY])
            .await
            .map_err(backend)?;
        if existing == 0 {
            return Ok(None);
        }
        self.read_merged().await.map(Some)
    }

    async fn commit(&self, patch: &SummaryPatch) -> Result<RsvpSummary, StoreError> {
        for op in patch.ops() {
            self.apply_op(op).await?;
        }
        self.read_merged().await
    }

    async fn replace(&self, summary: &RsvpSummary) -> Result<(), StoreError> {
        let client = self.pool.client();

        let _: i64 = client
            .hset(
                SUMMARY_KEY,
                vec![
                    (RSVP_COUNT_FIELD, summary.rsvp_count.to_string()),
                    (ATTENDEE_COUNT_FIELD, summary.attendee_count.to_string()),
                ],
            )
            .await
            .map_err(backend)?;

        for (key, names) in [
            (NAMES_IN_KEY, &summary.names_in),
            (NAMES_OUT_KEY, &summary.names_out),
        ] {
            let _: u32 = client.del(key).await.map_err(backend)?;
            // RPUSH in list order keeps head = most recent.
            for name in names {
                let _: u64 = client.rpush(key, name.as_str()).await.map_err(backend)?;
            }
        }

        Ok(())
    }
}

/// Collapse a `Dragonfly` error into the engine's store error.
fn backend(err: fred::error::Error) -> StoreError {
    StoreError::Backend(format!("Dragonfly error: {err}"))
}
