//! REST API endpoint handlers for the Observer server.
//!
//! Submission handlers write the response document, publish the matching
//! change event, and return; the aggregate itself is maintained by the
//! engine's listener, never inline. The summary endpoints are plain
//! reads against the aggregate document.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/summary` | Current aggregate |
//! | `POST` | `/api/rsvp` | Submit a response |
//! | `GET` | `/api/rsvp/:id` | Fetch a response |
//! | `PUT` | `/api/rsvp/:id` | Modify a response |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use chrono::Utc;
use headcount_types::{ChangeEvent, RsvpId, RsvpRecord, RsvpSummary};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::state::AppState;

/// Upper bound on party size accepted from the form.
const MAX_PARTY_SIZE: u32 = 20;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Body of `POST /api/rsvp`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct NewRsvp {
    /// Whether the guest is attending.
    pub attending: bool,
    /// Party size; required to be at least 1 when attending.
    #[validate(range(max = 20))]
    pub attendees: u32,
    /// Display name.
    #[validate(length(min = 1, max = 80))]
    pub name: String,
}

/// Body of `PUT /api/rsvp/:id`. Absent fields keep their current value.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct RsvpChanges {
    /// New attendance status.
    pub attending: Option<bool>,
    /// New party size.
    #[validate(range(max = 20))]
    pub attendees: Option<u32>,
    /// New display name.
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
}

/// Checks `validator` cannot express: the attending/party-size coupling.
fn check_reply(record: &RsvpRecord) -> Result<(), ApiError> {
    if record.attending && record.attendees == 0 {
        return Err(ApiError::Validation(String::from(
            "an attending response needs a party size of at least 1",
        )));
    }
    if record.attendees > MAX_PARTY_SIZE {
        return Err(ApiError::Validation(format!(
            "party size is capped at {MAX_PARTY_SIZE}"
        )));
    }
    if record.name.trim().is_empty() {
        return Err(ApiError::Validation(String::from(
            "display name must not be blank",
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the current aggregate and API links.
///
/// This is the placeholder display until the real frontend consumes the
/// API directly.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let summary = state.summaries.read().await?.unwrap_or_default();
    let rsvp_count = summary.rsvp_count;
    let attendee_count = summary.attendee_count;
    let in_count = summary.names_in.len();
    let out_count = summary.names_out.len();

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Headcount</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Headcount</h1>
    <p class="subtitle">RSVP aggregation service</p>

    <div>
        <div class="metric">
            <div class="label">Responses</div>
            <div class="value">{rsvp_count}</div>
        </div>
        <div class="metric">
            <div class="label">Headcount</div>
            <div class="value">{attendee_count}</div>
        </div>
        <div class="metric">
            <div class="label">In</div>
            <div class="value">{in_count}</div>
        </div>
        <div class="metric">
            <div class="label">Out</div>
            <div class="value">{out_count}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/summary">/api/summary</a> -- current aggregate</li>
        <li>POST /api/rsvp -- submit a response</li>
        <li>GET /api/rsvp/:id -- fetch a response</li>
        <li>PUT /api/rsvp/:id -- modify a response</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/summary</code> -- live aggregate stream</li>
    </ul>
</body>
</html>"#
    )))
}

// ---------------------------------------------------------------------------
// GET /api/summary -- the display read
// ---------------------------------------------------------------------------

/// Return the current aggregate.
///
/// Before the first response ever, the aggregate document does not exist
/// yet; the endpoint reports zero/empty defaults rather than a 404 so the
/// display can always render.
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RsvpSummary>, ApiError> {
    let summary = state.summaries.read().await?.unwrap_or_default();
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// POST /api/rsvp -- submit a response
// ---------------------------------------------------------------------------

/// Create a response document and publish its creation event.
pub async fn create_rsvp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewRsvp>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let now = Utc::now();
    let record = RsvpRecord {
        id: RsvpId::new(),
        attending: payload.attending,
        attendees: payload.attendees,
        name: payload.name.trim().to_owned(),
        submitted_at: now,
        updated_at: now,
    };
    check_reply(&record)?;

    state.responses.put(&record).await?;
    state
        .publisher
        .publish(&ChangeEvent::RsvpCreated {
            record: record.clone(),
        })
        .await?;

    tracing::info!(id = %record.id, attending = record.attending, "response submitted");
    Ok((StatusCode::CREATED, Json(record)))
}

// ---------------------------------------------------------------------------
// GET /api/rsvp/:id -- fetch a response
// ---------------------------------------------------------------------------

/// Return a single response document.
pub async fn get_rsvp(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Json<RsvpRecord>, ApiError> {
    let id = parse_rsvp_id(&id_str)?;
    let record = state
        .responses
        .fetch(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("response {id}")))?;
    Ok(Json(record))
}

// ---------------------------------------------------------------------------
// PUT /api/rsvp/:id -- modify a response
// ---------------------------------------------------------------------------

/// Apply changes to a response document and publish the modification
/// event with both snapshots.
///
/// The event is published even when the merged record carries the same
/// reply; the engine's no-op detection keeps such events off the shared
/// aggregate.
pub async fn update_rsvp(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(changes): Json<RsvpChanges>,
) -> Result<Json<RsvpRecord>, ApiError> {
    changes
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let id = parse_rsvp_id(&id_str)?;
    let before = state
        .responses
        .fetch(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("response {id}")))?;

    let mut after = before.clone();
    if let Some(attending) = changes.attending {
        after.attending = attending;
    }
    if let Some(attendees) = changes.attendees {
        after.attendees = attendees;
    }
    if let Some(name) = changes.name {
        after.name = name.trim().to_owned();
    }
    after.updated_at = Utc::now();
    check_reply(&after)?;

    state.responses.put(&after).await?;
    state
        .publisher
        .publish(&ChangeEvent::RsvpUpdated {
            before,
            after: after.clone(),
        })
        .await?;

    tracing::info!(id = %after.id, "response modified");
    Ok(Json(after))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an [`RsvpId`] from a path segment.
fn parse_rsvp_id(s: &str) -> Result<RsvpId, ApiError> {
    s.parse::<Uuid>()
        .map(RsvpId::from)
        .map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}
