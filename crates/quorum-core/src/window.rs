//! Date window generation.
//!
//! A party schedules on a fixed set of weekdays. The date window is the
//! ordered, deduplicated run of eligible dates currently materialised by a
//! client: dense over the allowed weekdays, sorted ascending, floor-clamped
//! to the party's creation date when extended into the past.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

// ─── WeekdaySet ──────────────────────────────────────────────────────────────

/// A set of weekdays, stored as a 7-bit mask (bit 0 = Monday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
  pub const EMPTY: Self = Self(0);

  pub fn new(days: &[Weekday]) -> Self {
    let mut set = Self::EMPTY;
    for day in days {
      set.insert(*day);
    }
    set
  }

  pub fn insert(&mut self, day: Weekday) {
    self.0 |= 1 << day.num_days_from_monday();
  }

  pub fn contains(self, day: Weekday) -> bool {
    self.0 & (1 << day.num_days_from_monday()) != 0
  }

  pub fn is_empty(self) -> bool { self.0 == 0 }

  /// The raw 7-bit mask, for storage backends.
  pub fn bits(self) -> u8 { self.0 & 0x7f }

  pub fn from_bits(bits: u8) -> Self { Self(bits & 0x7f) }
}

impl Default for WeekdaySet {
  /// Parties schedule on Friday and Saturday unless configured otherwise.
  fn default() -> Self { Self::new(&[Weekday::Fri, Weekday::Sat]) }
}

// ─── Generation ──────────────────────────────────────────────────────────────

/// All allowed-weekday dates in `[anchor, anchor + week_count * 7 days]`,
/// sorted ascending. An empty `allowed` set yields an empty window.
pub fn generate(
  anchor: NaiveDate,
  week_count: u32,
  allowed: WeekdaySet,
) -> Vec<NaiveDate> {
  let end = anchor + Days::new(u64::from(week_count) * 7);
  generate_range(anchor, end, allowed)
}

/// All allowed-weekday dates in `[from, to]` inclusive, sorted ascending.
pub fn generate_range(
  from: NaiveDate,
  to: NaiveDate,
  allowed: WeekdaySet,
) -> Vec<NaiveDate> {
  if allowed.is_empty() {
    return Vec::new();
  }

  let mut dates = Vec::new();
  let mut day = from;
  while day <= to {
    if allowed.contains(day.weekday()) {
      dates.push(day);
    }
    match day.succ_opt() {
      Some(next) => day = next,
      None => break,
    }
  }
  dates
}

// ─── DateWindow ──────────────────────────────────────────────────────────────

/// The materialised run of eligible dates, extensible in both directions.
///
/// Invariants: `dates` is sorted ascending with no duplicates, contains every
/// allowed-weekday date in `[start, end]`, and never reaches below `floor`.
#[derive(Debug, Clone)]
pub struct DateWindow {
  dates:   Vec<NaiveDate>,
  allowed: WeekdaySet,
  floor:   Option<NaiveDate>,
  start:   NaiveDate,
  end:     NaiveDate,
}

impl DateWindow {
  /// Materialise an initial window spanning `[anchor, anchor + weeks]`,
  /// clamping `anchor` up to `floor` if it falls before it.
  pub fn new(
    anchor: NaiveDate,
    week_count: u32,
    allowed: WeekdaySet,
    floor: Option<NaiveDate>,
  ) -> Self {
    let start = match floor {
      Some(f) if anchor < f => f,
      _ => anchor,
    };
    let end = start + Days::new(u64::from(week_count) * 7);
    Self {
      dates: generate_range(start, end, allowed),
      allowed,
      floor,
      start,
      end,
    }
  }

  pub fn dates(&self) -> &[NaiveDate] { &self.dates }

  pub fn allowed(&self) -> WeekdaySet { self.allowed }

  /// Inclusive bounds of the materialised span.
  pub fn span(&self) -> (NaiveDate, NaiveDate) { (self.start, self.end) }

  /// Whether `date` is one of the materialised eligible dates.
  pub fn contains(&self, date: NaiveDate) -> bool {
    self.dates.binary_search(&date).is_ok()
  }

  /// Whether further backward extension is possible.
  pub fn has_more_past(&self) -> bool {
    match self.floor {
      Some(f) => self.start > f,
      None => true,
    }
  }

  /// Extend the window forward by `weeks`. Returns the newly appended dates.
  pub fn extend_future(&mut self, weeks: u32) -> Vec<NaiveDate> {
    let from = match self.end.succ_opt() {
      Some(d) => d,
      None => return Vec::new(),
    };
    let to = self.end + Days::new(u64::from(weeks) * 7);
    let added = generate_range(from, to, self.allowed);
    self.dates.extend_from_slice(&added);
    self.end = to;
    added
  }

  /// Extend the window backward by `weeks`, clamped to the floor. Returns the
  /// newly prepended dates; empty when already at the floor.
  pub fn extend_past(&mut self, weeks: u32) -> Vec<NaiveDate> {
    if !self.has_more_past() {
      return Vec::new();
    }
    let mut from = self.start - Days::new(u64::from(weeks) * 7);
    if let Some(f) = self.floor
      && from < f
    {
      from = f;
    }
    let to = match self.start.pred_opt() {
      Some(d) => d,
      None => return Vec::new(),
    };
    let added = generate_range(from, to, self.allowed);
    let mut dates = Vec::with_capacity(added.len() + self.dates.len());
    dates.extend_from_slice(&added);
    dates.append(&mut self.dates);
    self.dates = dates;
    self.start = from;
    added
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
