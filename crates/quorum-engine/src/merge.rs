//! Change-feed merging.
//!
//! Remote availability events are applied to the cache without a full
//! refetch. The merge is an idempotent keyed upsert/delete, guarded by the
//! per-key local write state: events for a key with an in-flight local write
//! are rejected outright, and events older than the key's last settled local
//! write are rejected as stale echoes.

use quorum_core::{
  clock::Clock,
  feed::{AvailabilityChange, ChangeKind, FeedEvent},
  store::ScheduleStore,
};

use crate::{
  cache::{PartyCache, WriteState},
  error::Result,
};

impl<S, C> PartyCache<S, C>
where
  S: ScheduleStore,
  C: Clock,
{
  /// Apply one event from the push channel.
  ///
  /// `Reconnected` triggers an unconditional full reload: the transport may
  /// have dropped events during the disconnect window, and no resync diff is
  /// available.
  pub async fn apply_feed_event(&mut self, event: FeedEvent) -> Result<()> {
    match event {
      FeedEvent::Reconnected => {
        tracing::info!("feed reconnected; reloading party state");
        self.load().await
      }
      FeedEvent::Change(change) => {
        self.merge_change(change);
        Ok(())
      }
    }
  }

  /// Merge a single row-level change into the cache.
  pub(crate) fn merge_change(&mut self, change: AvailabilityChange) {
    let Some(key) = change.key() else {
      tracing::warn!("change event carries no row; dropping");
      return;
    };
    let (member_id, date) = key;

    // The feed may be broader than the party scope; ignore strangers.
    if !self.members.iter().any(|m| m.member_id == member_id) {
      tracing::debug!(%member_id, "event for member outside roster; ignored");
      return;
    }

    // Dates outside the materialised window are picked up by the next
    // extension fetch instead.
    if !self.window().contains(date) {
      return;
    }

    match self.writes.get(&key) {
      Some(WriteState::InFlight { .. }) => {
        tracing::debug!(%member_id, %date, "local write in flight; event rejected");
        return;
      }
      Some(WriteState::Settled { at }) => {
        if let Some(remote_at) = change.updated_at()
          && remote_at <= *at
        {
          tracing::debug!(%member_id, %date, "stale echo of local write; event rejected");
          return;
        }
      }
      None => {}
    }

    match change.kind {
      ChangeKind::Insert | ChangeKind::Update => {
        // Idempotent upsert: overwriting an existing row in place preserves
        // the one-row-per-key invariant.
        if let Some(row) = change.new {
          self.entries.insert(key, row);
        }
      }
      ChangeKind::Delete => {
        // No-op if already absent.
        self.entries.remove(&key);
      }
    }
  }
}
