//! Response archive operations against the `responses` table.
//!
//! The archive is the full response collection the aggregate is derived
//! from. The engine's listener upserts a row for every creation or
//! modification event; the rebuild path reads the whole table back in
//! submission order and folds it into a fresh summary.

use headcount_types::{RsvpId, RsvpRecord};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `responses` table.
pub struct ResponseArchive<'a> {
    pool: &'a PgPool,
}

impl<'a> ResponseArchive<'a> {
    /// Create a new archive bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update the row for a response.
    ///
    /// Creation and modification events both land here; the row always
    /// reflects the latest snapshot. `submitted_at` is never overwritten
    /// so the fold order stays stable across modifications.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the upsert fails.
    pub async fn upsert(&self, record: &RsvpRecord) -> Result<(), DbError> {
        let attendees = i32::try_from(record.attendees).unwrap_or(i32::MAX);

        sqlx::query(
            r"INSERT INTO responses (id, attending, attendees, name, submitted_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6)
              ON CONFLICT (id) DO UPDATE SET
                  attending = EXCLUDED.attending,
                  attendees = EXCLUDED.attendees,
                  name = EXCLUDED.name,
                  updated_at = EXCLUDED.updated_at",
        )
        .bind(record.id.into_inner())
        .bind(record.attending)
        .bind(attendees)
        .bind(&record.name)
        .bind(record.submitted_at)
        .bind(record.updated_at)
        .execute(self.pool)
        .await?;

        tracing::debug!(id = %record.id, "Archived response");
        Ok(())
    }

    /// Fetch every response in submission order (oldest first).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn fetch_all(&self) -> Result<Vec<RsvpRecord>, DbError> {
        let rows = sqlx::query_as::<_, ResponseRow>(
            r"SELECT id, attending, attendees, name, submitted_at, updated_at
              FROM responses
              ORDER BY submitted_at, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(RsvpRecord::from).collect())
    }

    /// Count archived responses.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn count(&self) -> Result<i64, DbError> {
        let count: (i64,) = sqlx::query_as(r"SELECT COUNT(*) FROM responses")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }
}

/// A row from the `responses` table.
///
/// Uses runtime types rather than compile-time checked types to avoid
/// requiring a live database during builds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResponseRow {
    /// Response identifier.
    pub id: Uuid,
    /// Whether the guest is attending.
    pub attending: bool,
    /// Party size.
    pub attendees: i32,
    /// Display name.
    pub name: String,
    /// First submission timestamp.
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    /// Last modification timestamp.
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ResponseRow> for RsvpRecord {
    fn from(row: ResponseRow) -> Self {
        Self {
            id: RsvpId::from(row.id),
            attending: row.attending,
            attendees: u32::try_from(row.attendees).unwrap_or(0),
            name: row.name,
            submitted_at: row.submitted_at,
            updated_at: row.updated_at,
        }
    }
}
