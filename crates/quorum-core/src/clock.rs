//! Injectable time source.
//!
//! Every past/future classification in the engine goes through a [`Clock`] so
//! that derivations can be tested against a pinned "today".

use chrono::{DateTime, NaiveDate, Utc};

/// A source of the current time.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;

  /// The current calendar date in UTC.
  fn today(&self) -> NaiveDate { self.now().date_naive() }
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock frozen at a fixed instant. Used in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
  /// A clock pinned to noon UTC on `date`.
  pub fn on(date: NaiveDate) -> Self {
    Self(
      date
        .and_hms_opt(12, 0, 0)
        .expect("noon is a valid time")
        .and_utc(),
    )
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { self.0 }
}
