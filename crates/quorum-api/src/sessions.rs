//! Handlers for `/parties/:id/sessions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/parties/:id/sessions` | Date-descending |
//! | `POST`   | `/parties/:id/sessions` | Body: [`NewSessionBody`]; 409 if the date is taken |
//! | `PATCH`  | `/parties/:id/sessions/:session_id` | Body: [`HostDetails`]; replaces host metadata |
//! | `DELETE` | `/parties/:id/sessions/:session_id` | Cancel (hard delete) |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use quorum_core::{
  session::{HostDetails, NewSession, Session},
  store::ScheduleStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /parties/:id/sessions`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(party_id): Path<Uuid>,
) -> Result<Json<Vec<Session>>, ApiError>
where
  S: ScheduleStore,
{
  let sessions = store
    .list_sessions(party_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(sessions))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /parties/:id/sessions`. A bare `{"date":...}`
/// is the "yes we played" confirmation; host details are optional.
#[derive(Debug, Deserialize)]
pub struct NewSessionBody {
  pub date:         NaiveDate,
  #[serde(default)]
  pub host:         HostDetails,
  pub confirmed_by: Option<Uuid>,
}

/// `POST /parties/:id/sessions` — returns 201 + the stored session, or 409
/// when the date already has one.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(party_id): Path<Uuid>,
  Json(body): Json<NewSessionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScheduleStore,
{
  let existing = store
    .list_sessions(party_id)
    .await
    .map_err(ApiError::store)?;
  if existing.iter().any(|s| s.date == body.date) {
    return Err(ApiError::Conflict(format!(
      "a session already exists on {}",
      body.date
    )));
  }

  let session = store
    .insert_session(NewSession {
      party_id,
      date: body.date,
      host: body.host,
      confirmed_by: body.confirmed_by,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(session)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /parties/:id/sessions/:session_id` — body is the full replacement
/// [`HostDetails`].
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path((party_id, session_id)): Path<(Uuid, Uuid)>,
  Json(host): Json<HostDetails>,
) -> Result<Json<Session>, ApiError>
where
  S: ScheduleStore,
{
  require_session(store.as_ref(), party_id, session_id).await?;

  let session = store
    .update_session(session_id, host)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(session))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /parties/:id/sessions/:session_id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path((party_id, session_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: ScheduleStore,
{
  require_session(store.as_ref(), party_id, session_id).await?;

  store
    .delete_session(session_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// 404 unless `session_id` belongs to `party_id`.
async fn require_session<S>(
  store: &S,
  party_id: Uuid,
  session_id: Uuid,
) -> Result<(), ApiError>
where
  S: ScheduleStore,
{
  let sessions = store
    .list_sessions(party_id)
    .await
    .map_err(ApiError::store)?;
  if sessions.iter().any(|s| s.session_id == session_id) {
    Ok(())
  } else {
    Err(ApiError::NotFound(format!("session {session_id} not found")))
  }
}
