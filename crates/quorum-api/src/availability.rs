//! Handlers for `/parties/:id/availability` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/parties/:id/availability` | `?from&to` required (ISO dates) |
//! | `PUT`    | `/parties/:id/availability` | Body: [`SetBody`]; upsert, returns the row |
//! | `DELETE` | `/parties/:id/availability` | `?member_id&date`; sets unset, 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use chrono::NaiveDate;
use quorum_core::{
  availability::{AvailabilityEntry, AvailabilityState},
  store::ScheduleStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub from: NaiveDate,
  pub to:   NaiveDate,
}

/// `GET /parties/:id/availability?from=<date>&to=<date>`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(party_id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<AvailabilityEntry>>, ApiError>
where
  S: ScheduleStore,
{
  if params.to < params.from {
    return Err(ApiError::BadRequest("`to` precedes `from`".into()));
  }

  let rows = store
    .list_availability(party_id, params.from, params.to)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}

// ─── Set ─────────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /parties/:id/availability`.
#[derive(Debug, Deserialize)]
pub struct SetBody {
  pub member_id: Uuid,
  pub date:      NaiveDate,
  pub state:     AvailabilityState,
}

/// `PUT /parties/:id/availability` — upsert one row; returns the persisted
/// row with its server-assigned `updated_at`.
pub async fn set<S>(
  State(store): State<Arc<S>>,
  Path(party_id): Path<Uuid>,
  Json(body): Json<SetBody>,
) -> Result<Json<AvailabilityEntry>, ApiError>
where
  S: ScheduleStore,
{
  let row = store
    .upsert_availability(party_id, body.member_id, body.date, body.state)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(row))
}

// ─── Clear ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ClearParams {
  pub member_id: Uuid,
  pub date:      NaiveDate,
}

/// `DELETE /parties/:id/availability?member_id=<id>&date=<date>` — back to
/// unset. Idempotent; always 204.
pub async fn clear<S>(
  State(store): State<Arc<S>>,
  Path(party_id): Path<Uuid>,
  Query(params): Query<ClearParams>,
) -> Result<StatusCode, ApiError>
where
  S: ScheduleStore,
{
  store
    .delete_availability(party_id, params.member_id, params.date)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
