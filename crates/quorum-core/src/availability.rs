//! Per-member, per-date availability.
//!
//! Availability is a tri-state fact: available, unavailable, or unset. Unset
//! is represented by the *absence* of a row — deleting a row is semantically
//! "unset". At most one row exists per (member, date) pair.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored availability state. `unset` has no variant: it is row absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityState {
  Available,
  Unavailable,
}

/// One availability row. Exactly one may exist per (member, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityEntry {
  pub party_id:   Uuid,
  pub member_id:  Uuid,
  pub date:       NaiveDate,
  pub state:      AvailabilityState,
  pub updated_at: DateTime<Utc>,
}

/// The canonical toggle cycle: unset → available → unavailable → unset.
///
/// `None` stands for unset on both sides. This is interaction policy for
/// callers; the cache itself accepts any state transition.
pub fn next_state(current: Option<AvailabilityState>) -> Option<AvailabilityState> {
  match current {
    None => Some(AvailabilityState::Available),
    Some(AvailabilityState::Available) => Some(AvailabilityState::Unavailable),
    Some(AvailabilityState::Unavailable) => None,
  }
}
