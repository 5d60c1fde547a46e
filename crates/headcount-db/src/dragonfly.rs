//! `Dragonfly` (Redis-compatible) hot state operations.
//!
//! `Dragonfly` holds the live documents: one JSON value per response and
//! the summary the display reads. The summary is split across a hash and
//! two lists so every patch operation maps to a single atomic command.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `rsvp:{id}` | JSON | One response record |
//! | `rsvp:summary` | Hash | `rsvp_count`, `attendee_count` fields |
//! | `rsvp:summary:names_in` | List | Attending names, head = most recent |
//! | `rsvp:summary:names_out` | List | Declined names, head = most recent |

use async_trait::async_trait;
use fred::prelude::*;
use headcount_core::{ResponseStore, StoreError};
use headcount_types::{RsvpId, RsvpRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DbError;

/// Hash key holding the summary counters.
pub(crate) const SUMMARY_KEY: &str = "rsvp:summary";

/// List key for attending names.
pub(crate) const NAMES_IN_KEY: &str = "rsvp:summary:names_in";

/// List key for declined names.
pub(crate) const NAMES_OUT_KEY: &str = "rsvp:summary:names_out";

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`] and provides typed operations for
/// the key patterns above.
#[derive(Clone)]
pub struct DragonflyPool {
    client: Client,
}

impl DragonflyPool {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    /// Serialize `value` as JSON and store it at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if serialization fails.
    /// Returns [`DbError::Dragonfly`] if the write fails.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        let _: () = self.client.set(key, json.as_str(), None, None, false).await?;
        Ok(())
    }

    /// Read the value at `key` and deserialize from JSON, `None` if the
    /// key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if deserialization fails.
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        let value: Option<String> = self.client.get(key).await?;
        value.map_or_else(|| Ok(None), |s| Ok(Some(serde_json::from_str(&s)?)))
    }

    /// Delete a key from `Dragonfly`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn delete(&self, key: &str) -> Result<(), DbError> {
        let _: u32 = self.client.del(key).await?;
        Ok(())
    }

    /// The key a response record lives at.
    pub(crate) fn response_key(id: RsvpId) -> String {
        format!("rsvp:{id}")
    }

    /// Flush all keys from the `Dragonfly` instance.
    ///
    /// **WARNING:** This deletes all data. Only use for testing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the flush fails.
    pub async fn flush_all(&self) -> Result<(), DbError> {
        let _: () = self.client.flushall(false).await?;
        Ok(())
    }

    /// Return a reference to the underlying [`Client`].
    pub const fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ResponseStore for DragonflyPool {
    async fn fetch(&self, id: RsvpId) -> Result<Option<RsvpRecord>, StoreError> {
        let key = Self::response_key(id);
        self.get_json(&key).await.map_err(StoreError::from)
    }

    async fn put(&self, record: &RsvpRecord) -> Result<(), StoreError> {
        let key = Self::response_key(record.id);
        self.set_json(&key, record).await.map_err(StoreError::from)
    }
}

impl std::fmt::Debug for DragonflyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragonflyPool").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_keys_embed_the_id() {
        let id = RsvpId::new();
        let key = DragonflyPool::response_key(id);
        assert!(key.starts_with("rsvp:"));
        assert!(key.contains(&id.to_string()));
    }
}
