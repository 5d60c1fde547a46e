//! End-to-end tests for the aggregation handlers against the in-memory
//! store. These cover the full handler surface without external services:
//! creation, every update branch, the no-op fast path, and concurrent
//! creations against the shared summary.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use chrono::Utc;
use headcount_core::{AuditResult, audit, on_rsvp_created, on_rsvp_updated};
use headcount_db::MemoryStore;
use headcount_types::{RsvpId, RsvpRecord, RsvpSummary};

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

async fn summary_of(store: &MemoryStore) -> RsvpSummary {
    use headcount_core::SummaryStore;
    store.read().await.unwrap().unwrap_or_default()
}

// =========================================================================
// Creation and the update branches
// =========================================================================

#[tokio::test]
async fn creation_populates_an_absent_summary() {
    let store = MemoryStore::new();
    let ann = record(true, 4, "Ann");

    let summary = on_rsvp_created(&store, &ann).await.unwrap();

    assert_eq!(summary.rsvp_count, 1);
    assert_eq!(summary.attendee_count, 4);
    assert_eq!(summary.names_in, vec!["Ann"]);
    assert!(summary.names_out.is_empty());
}

#[tokio::test]
async fn flip_to_declined_zeroes_the_party_and_moves_the_name() {
    let store = MemoryStore::new();
    let ann = record(true, 4, "Ann");
    let _ = on_rsvp_created(&store, &ann).await.unwrap();

    let mut declined = ann.clone();
    declined.attending = false;
    let summary = on_rsvp_updated(&store, &ann, &declined).await.unwrap();

    let summary = summary.expect("flip must touch the summary");
    assert_eq!(summary.rsvp_count, 1);
    assert_eq!(summary.attendee_count, 0);
    assert!(summary.names_in.is_empty());
    assert_eq!(summary.names_out, vec!["Ann"]);
}

#[tokio::test]
async fn rename_while_declined_replaces_in_place() {
    let store = MemoryStore::new();
    let ann = record(true, 4, "Ann");
    let _ = on_rsvp_created(&store, &ann).await.unwrap();

    let mut declined = ann.clone();
    declined.attending = false;
    let _ = on_rsvp_updated(&store, &ann, &declined).await.unwrap();

    let mut renamed = declined.clone();
    renamed.name = String::from("Annie");
    let summary = on_rsvp_updated(&store, &declined, &renamed)
        .await
        .unwrap()
        .expect("rename must touch the summary");

    assert_eq!(summary.names_out, vec!["Annie"]);
    assert_eq!(summary.attendee_count, 0);
    assert_eq!(summary.rsvp_count, 1);
}

#[tokio::test]
async fn party_resize_while_attending_adjusts_by_the_difference() {
    let store = MemoryStore::new();
    let bo = record(true, 2, "Bo");
    let _ = on_rsvp_created(&store, &bo).await.unwrap();

    let mut bigger = bo.clone();
    bigger.attendees = 5;
    let summary = on_rsvp_updated(&store, &bo, &bigger)
        .await
        .unwrap()
        .expect("resize must touch the summary");

    assert_eq!(summary.attendee_count, 5);
    assert_eq!(summary.names_in, vec!["Bo"]);
}

#[tokio::test]
async fn flip_back_in_uses_the_new_party_size() {
    let store = MemoryStore::new();
    let ann = record(true, 4, "Ann");
    let _ = on_rsvp_created(&store, &ann).await.unwrap();

    let mut declined = ann.clone();
    declined.attending = false;
    let _ = on_rsvp_updated(&store, &ann, &declined).await.unwrap();

    let mut returning = declined.clone();
    returning.attending = true;
    returning.attendees = 2;
    let summary = on_rsvp_updated(&store, &declined, &returning)
        .await
        .unwrap()
        .expect("flip must touch the summary");

    assert_eq!(summary.attendee_count, 2);
    assert_eq!(summary.names_in, vec!["Ann"]);
    assert!(summary.names_out.is_empty());
    // The response counter never moves on flips.
    assert_eq!(summary.rsvp_count, 1);
}

#[tokio::test]
async fn simultaneous_rename_and_flip_lands_the_new_name() {
    let store = MemoryStore::new();
    let ann = record(true, 4, "Ann");
    let _ = on_rsvp_created(&store, &ann).await.unwrap();

    let mut changed = ann.clone();
    changed.name = String::from("Annie");
    changed.attending = false;
    let summary = on_rsvp_updated(&store, &ann, &changed)
        .await
        .unwrap()
        .expect("combined change must touch the summary");

    assert!(summary.names_in.is_empty());
    assert_eq!(summary.names_out, vec!["Annie"]);
    assert_eq!(summary.attendee_count, 0);
}

// =========================================================================
// The no-op fast path
// =========================================================================

#[tokio::test]
async fn identical_snapshots_perform_no_write() {
    let store = MemoryStore::new();
    let ann = record(true, 4, "Ann");
    let _ = on_rsvp_created(&store, &ann).await.unwrap();
    let commits_before = store.commit_count();

    let mut touched = ann.clone();
    touched.updated_at = Utc::now();
    let result = on_rsvp_updated(&store, &ann, &touched).await.unwrap();

    assert!(result.is_none());
    assert_eq!(store.commit_count(), commits_before);
    assert_eq!(summary_of(&store).await.attendee_count, 4);
}

// =========================================================================
// Concurrency: overlapping creations must both land
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creations_never_lose_an_update() {
    let store = Arc::new(MemoryStore::new());

    let first = record(true, 3, "Ann");
    let second = record(true, 5, "Bo");

    let store_a = Arc::clone(&store);
    let store_b = Arc::clone(&store);
    let task_a = tokio::spawn(async move { on_rsvp_created(store_a.as_ref(), &first).await });
    let task_b = tokio::spawn(async move { on_rsvp_created(store_b.as_ref(), &second).await });

    task_a.await.unwrap().unwrap();
    task_b.await.unwrap().unwrap();

    let summary = summary_of(&store).await;
    assert_eq!(summary.attendee_count, 8);
    assert_eq!(summary.rsvp_count, 2);
    assert_eq!(summary.names_in.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn a_storm_of_concurrent_events_stays_consistent() {
    let store = Arc::new(MemoryStore::new());

    let records: Vec<RsvpRecord> = (0..32)
        .map(|i| record(i % 3 != 0, u32::try_from(i % 4).unwrap_or(0).saturating_add(1), &format!("Guest {i}")))
        .collect();

    let mut tasks = Vec::new();
    for rec in records.clone() {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            on_rsvp_created(store.as_ref(), &rec).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let summary = summary_of(&store).await;
    match audit(&records, &summary) {
        AuditResult::Consistent => {}
        AuditResult::Drift(drift) => panic!("summary drifted: {}", drift.message),
    }
}

// =========================================================================
// Serial event sequences preserve the invariants
// =========================================================================

#[tokio::test]
async fn a_serial_sequence_of_events_keeps_counts_and_lists_aligned() {
    let store = MemoryStore::new();

    let mut ann = record(true, 4, "Ann");
    let bo = record(false, 1, "Bo");
    let mut cy = record(true, 2, "Cy");

    let _ = on_rsvp_created(&store, &ann).await.unwrap();
    let _ = on_rsvp_created(&store, &bo).await.unwrap();
    let _ = on_rsvp_created(&store, &cy).await.unwrap();

    // Ann flips out, Cy grows their party, Ann renames.
    let mut ann_out = ann.clone();
    ann_out.attending = false;
    let _ = on_rsvp_updated(&store, &ann, &ann_out).await.unwrap();
    ann = ann_out;

    let mut cy_bigger = cy.clone();
    cy_bigger.attendees = 6;
    let _ = on_rsvp_updated(&store, &cy, &cy_bigger).await.unwrap();
    cy = cy_bigger;

    let mut ann_renamed = ann.clone();
    ann_renamed.name = String::from("Annie");
    let _ = on_rsvp_updated(&store, &ann, &ann_renamed).await.unwrap();
    ann = ann_renamed;

    let summary = summary_of(&store).await;
    assert_eq!(summary.rsvp_count, 3);
    assert_eq!(summary.attendee_count, 6);
    assert_eq!(summary.names_in, vec!["Cy"]);
    assert_eq!(summary.names_out, vec!["Annie", "Bo"]);

    let finals = vec![ann, bo, cy];
    assert_eq!(audit(&finals, &summary), AuditResult::Consistent);
}
