//! Handlers for `/parties` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/parties/:id` | Single party |
//! | `GET`  | `/parties/:id/members` | The party's roster |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use quorum_core::{member::Member, party::Party, store::ScheduleStore};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /parties/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Party>, ApiError>
where
  S: ScheduleStore,
{
  let party = store
    .get_party(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("party {id} not found")))?;
  Ok(Json(party))
}

/// `GET /parties/:id/members`
pub async fn members<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Member>>, ApiError>
where
  S: ScheduleStore,
{
  if store.get_party(id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::NotFound(format!("party {id} not found")));
  }

  let roster = store.list_members(id).await.map_err(ApiError::store)?;
  Ok(Json(roster))
}
