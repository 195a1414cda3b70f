//! Session — a confirmed or scheduled real-world occurrence.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A confirmed or scheduled session. At most one exists per (party, date).
///
/// Host is either a member (playing at their place) or a free-text venue;
/// the two are mutually exclusive in intent, though neither is required —
/// the "yes we played" shortcut records a session with no host at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub session_id:   Uuid,
  pub party_id:     Uuid,
  pub date:         NaiveDate,
  pub host:         HostDetails,
  /// Member who confirmed or scheduled the session, if known.
  pub confirmed_by: Option<Uuid>,
  pub confirmed_at: DateTime<Utc>,
}

/// Host and location metadata for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDetails {
  /// Hosting member, if a member hosts.
  pub member_id:  Option<Uuid>,
  /// Free-text venue name, when not hosted by a member.
  pub venue:      Option<String>,
  /// Street address or meeting URL.
  pub address:    Option<String>,
  pub is_virtual: bool,
  pub start_time: Option<NaiveTime>,
}

/// Input to [`crate::store::ScheduleStore::insert_session`].
/// `session_id` and `confirmed_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewSession {
  pub party_id:     Uuid,
  pub date:         NaiveDate,
  pub host:         HostDetails,
  pub confirmed_by: Option<Uuid>,
}

impl NewSession {
  /// The minimal "yes we played on this date" record.
  pub fn confirmation(party_id: Uuid, date: NaiveDate) -> Self {
    Self {
      party_id,
      date,
      host: HostDetails::default(),
      confirmed_by: None,
    }
  }
}
