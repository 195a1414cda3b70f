//! Party — a group of members coordinating a shared schedule.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::window::WeekdaySet;

/// A scheduling group. The creation date doubles as the floor for backward
/// date-window extension: no date before it is ever eligible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
  pub party_id:   Uuid,
  pub name:       String,
  /// First eligible calendar date; window floor.
  pub created_on: NaiveDate,
  pub created_at: DateTime<Utc>,
  /// Weekdays this party schedules on.
  pub weekdays:   WeekdaySet,
}
