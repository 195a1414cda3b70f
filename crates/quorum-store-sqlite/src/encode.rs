//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and dates as ISO `YYYY-MM-DD`.
//! Host details are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings, and weekday sets as their raw bitmask.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use quorum_core::{
  availability::{AvailabilityEntry, AvailabilityState},
  member::Member,
  party::Party,
  session::{HostDetails, Session},
  window::WeekdaySet,
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse().map_err(|_| Error::DateParse(format!("bad date: {s:?}")))
}

// ─── AvailabilityState ───────────────────────────────────────────────────────

pub fn encode_state(state: AvailabilityState) -> &'static str {
  match state {
    AvailabilityState::Available => "available",
    AvailabilityState::Unavailable => "unavailable",
  }
}

pub fn decode_state(s: &str) -> Result<AvailabilityState> {
  match s {
    "available" => Ok(AvailabilityState::Available),
    "unavailable" => Ok(AvailabilityState::Unavailable),
    other => Err(Error::DateParse(format!("unknown state: {other:?}"))),
  }
}

// ─── HostDetails ─────────────────────────────────────────────────────────────

pub fn encode_host(host: &HostDetails) -> Result<String> {
  Ok(serde_json::to_string(host)?)
}

pub fn decode_host(s: &str) -> Result<HostDetails> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `parties` row.
pub struct RawParty {
  pub party_id:   String,
  pub name:       String,
  pub created_on: String,
  pub created_at: String,
  pub weekdays:   i64,
}

impl RawParty {
  pub fn into_party(self) -> Result<Party> {
    Ok(Party {
      party_id:   decode_uuid(&self.party_id)?,
      name:       self.name,
      created_on: decode_date(&self.created_on)?,
      created_at: decode_dt(&self.created_at)?,
      weekdays:   WeekdaySet::from_bits(self.weekdays as u8),
    })
  }
}

/// Raw values read directly from a `members` row.
pub struct RawMember {
  pub member_id:    String,
  pub party_id:     String,
  pub name:         String,
  pub nickname:     Option<String>,
  pub user_id:      Option<String>,
  pub profile_name: Option<String>,
  pub address:      Option<String>,
}

impl RawMember {
  pub fn into_member(self) -> Result<Member> {
    Ok(Member {
      member_id:    decode_uuid(&self.member_id)?,
      party_id:     decode_uuid(&self.party_id)?,
      name:         self.name,
      nickname:     self.nickname,
      user_id:      self.user_id.as_deref().map(decode_uuid).transpose()?,
      profile_name: self.profile_name,
      address:      self.address,
    })
  }
}

/// Raw values read directly from an `availability` row.
pub struct RawAvailability {
  pub party_id:   String,
  pub member_id:  String,
  pub date:       String,
  pub state:      String,
  pub updated_at: String,
}

impl RawAvailability {
  pub fn into_entry(self) -> Result<AvailabilityEntry> {
    Ok(AvailabilityEntry {
      party_id:   decode_uuid(&self.party_id)?,
      member_id:  decode_uuid(&self.member_id)?,
      date:       decode_date(&self.date)?,
      state:      decode_state(&self.state)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `sessions` row.
pub struct RawSession {
  pub session_id:   String,
  pub party_id:     String,
  pub date:         String,
  pub host_json:    String,
  pub confirmed_by: Option<String>,
  pub confirmed_at: String,
}

impl RawSession {
  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      session_id:   decode_uuid(&self.session_id)?,
      party_id:     decode_uuid(&self.party_id)?,
      date:         decode_date(&self.date)?,
      host:         decode_host(&self.host_json)?,
      confirmed_by: self.confirmed_by.as_deref().map(decode_uuid).transpose()?,
      confirmed_at: decode_dt(&self.confirmed_at)?,
    })
  }
}
