//! Change-feed event types.
//!
//! The backing store pushes row-level availability changes to subscribed
//! clients. Delivery is at-least-once with no ordering guarantee; the merge
//! in `quorum-engine` is idempotent per (member, date) key, not
//! sequence-dependent.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::availability::AvailabilityEntry;

/// What happened to the availability row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
  Insert,
  Update,
  Delete,
}

/// A row-level availability change. `new` is absent for deletes; `old` is
/// absent for inserts and may be absent for updates depending on transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityChange {
  pub kind: ChangeKind,
  pub new:  Option<AvailabilityEntry>,
  pub old:  Option<AvailabilityEntry>,
}

impl AvailabilityChange {
  /// The (member, date) key this change addresses, from whichever side of the
  /// change carries it.
  pub fn key(&self) -> Option<(Uuid, NaiveDate)> {
    self
      .new
      .as_ref()
      .or(self.old.as_ref())
      .map(|row| (row.member_id, row.date))
  }

  /// The server timestamp of the change, when a row carries one.
  pub fn updated_at(&self) -> Option<DateTime<Utc>> {
    self
      .new
      .as_ref()
      .or(self.old.as_ref())
      .map(|row| row.updated_at)
  }
}

/// An event delivered over the push channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum FeedEvent {
  Change(AvailabilityChange),
  /// The transport re-established its connection. Events may have been
  /// missed; subscribers must do a full reload.
  Reconnected,
}
