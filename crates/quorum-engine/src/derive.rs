//! Derived facts — never stored, always recomputed.
//!
//! Pure functions of the availability entries, the session list, and the
//! current roster size. Roster-relative by design: a member joining or
//! leaving can retroactively create or invalidate a suggestion.

use std::collections::HashMap;

use chrono::NaiveDate;

use quorum_core::{
  availability::{AvailabilityEntry, AvailabilityState},
  clock::Clock,
  session::Session,
  store::ScheduleStore,
};

use crate::cache::{EntryKey, PartyCache};

/// The most recent session with `date <= today`. `sessions` must be sorted
/// by date descending.
pub fn last_session(sessions: &[Session], today: NaiveDate) -> Option<&Session> {
  sessions.iter().find(|s| s.date <= today)
}

/// The earliest session with `date > today`. `sessions` must be sorted by
/// date descending.
pub fn next_scheduled_session(
  sessions: &[Session],
  today: NaiveDate,
) -> Option<&Session> {
  sessions.iter().rev().find(|s| s.date > today)
}

/// Whole calendar days since the last session; 0 means "played today".
pub fn days_since_last_session(
  sessions: &[Session],
  today: NaiveDate,
) -> Option<i64> {
  last_session(sessions, today).map(|s| (today - s.date).num_days())
}

/// The most recent strictly-past date on which every current member marked
/// `available` and no session was logged.
///
/// Members with no entry count as not-available, not as abstaining, so the
/// available count must equal `member_count` exactly. An empty roster never
/// yields a suggestion.
pub fn suggested_date(
  entries: &HashMap<EntryKey, AvailabilityEntry>,
  sessions: &[Session],
  member_count: usize,
  today: NaiveDate,
) -> Option<NaiveDate> {
  if member_count == 0 {
    return None;
  }

  let mut available_per_date: HashMap<NaiveDate, usize> = HashMap::new();
  for entry in entries.values() {
    if entry.state == AvailabilityState::Available {
      *available_per_date.entry(entry.date).or_default() += 1;
    }
  }

  available_per_date
    .into_iter()
    .filter(|(date, count)| {
      *date < today
        && *count == member_count
        && !sessions.iter().any(|s| s.date == *date)
    })
    .map(|(date, _)| date)
    .max()
}

impl<S, C> PartyCache<S, C>
where
  S: ScheduleStore,
  C: Clock,
{
  pub fn last_session(&self) -> Option<&Session> {
    last_session(self.sessions(), self.today())
  }

  pub fn next_scheduled_session(&self) -> Option<&Session> {
    next_scheduled_session(self.sessions(), self.today())
  }

  pub fn days_since_last_session(&self) -> Option<i64> {
    days_since_last_session(self.sessions(), self.today())
  }

  pub fn suggested_date(&self) -> Option<NaiveDate> {
    suggested_date(
      &self.entries,
      &self.sessions,
      self.members.len(),
      self.today(),
    )
  }
}
