//! In-memory store for tests and single-process deployments.
//!
//! [`MemoryStore`] implements the same seams as the `Dragonfly` pool.
//! Commits take the summary's write lock and apply the whole patch inside
//! it, so a commit is a real transaction: concurrent committers serialize
//! and no interleaving can drop an update. A commit counter is exposed so
//! tests can assert that the no-op path never writes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use headcount_core::{ResponseStore, StoreError, SummaryPatch, SummaryStore};
use headcount_types::{RsvpId, RsvpRecord, RsvpSummary};
use tokio::sync::RwLock;

/// In-memory summary + response store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    summary: RwLock<Option<RsvpSummary>>,
    responses: RwLock<BTreeMap<RsvpId, RsvpRecord>>,
    commits: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of summary commits applied so far.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    /// All response records in submission order.
    pub async fn all_responses(&self) -> Vec<RsvpRecord> {
        let mut records: Vec<RsvpRecord> = self.responses.read().await.values().cloned().collect();
        records.sort_by_key(|r| r.submitted_at);
        records
    }
}

#[async_trait]
impl SummaryStore for MemoryStore {
    async fn read(&self) -> Result<Option<RsvpSummary>, StoreError> {
        Ok(self.summary.read().await.clone())
    }

    async fn commit(&self, patch: &SummaryPatch) -> Result<RsvpSummary, StoreError> {
        let mut guard = self.summary.write().await;
        let summary = guard.get_or_insert_with(RsvpSummary::empty);
        patch.apply_to(summary);
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(summary.clone())
    }

    async fn replace(&self, summary: &RsvpSummary) -> Result<(), StoreError> {
        let mut guard = self.summary.write().await;
        *guard = Some(summary.clone());
        Ok(())
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn fetch(&self, id: RsvpId) -> Result<Option<RsvpRecord>, StoreError> {
        Ok(self.responses.read().await.get(&id).cloned())
    }

    async fn put(&self, record: &RsvpRecord) -> Result<(), StoreError> {
        self.responses
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(())
    }
}
