//! [`PartyCache`] — the per-party availability cache.
//!
//! All mutation happens through `&mut self` on a single logical thread; the
//! suspension points are exclusively the store calls. Optimistic writes go
//! through an explicit per-key state machine: a pending local value is
//! applied synchronously, then reconciled against the store's confirmation
//! or rolled back by re-fetching on failure.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use quorum_core::{
  availability::{next_state, AvailabilityEntry, AvailabilityState},
  clock::Clock,
  member::Member,
  party::Party,
  session::Session,
  store::ScheduleStore,
  window::DateWindow,
};

use crate::error::{Error, Result};

/// Cache key for one availability row.
pub type EntryKey = (Uuid, NaiveDate);

/// How many weeks of history the initial window materialises.
pub(crate) const INITIAL_PAST_WEEKS: u32 = 4;
/// How many weeks ahead the initial window materialises.
pub(crate) const INITIAL_FUTURE_WEEKS: u32 = 8;

/// Per-key local write state.
///
/// `InFlight` marks an optimistic write whose persistence call has not yet
/// resolved; the merger rejects all remote events for the key while it is
/// set. `Settled` keeps the settle timestamp so stale feed echoes (events
/// older than our own confirmed write) are rejected afterwards.
#[derive(Debug, Clone, Copy)]
pub(crate) enum WriteState {
  InFlight { version: u64 },
  Settled { at: DateTime<Utc> },
}

/// The client-held cache of one party's schedule state.
pub struct PartyCache<S, C> {
  pub(crate) store: S,
  clock: C,
  party: Party,
  window: DateWindow,
  pub(crate) members: Vec<Member>,
  pub(crate) entries: HashMap<EntryKey, AvailabilityEntry>,
  pub(crate) sessions: Vec<Session>,
  pub(crate) writes: HashMap<EntryKey, WriteState>,
  next_version: u64,
  pub(crate) acting_member: Option<Uuid>,
  loading: bool,
  last_error: Option<String>,
}

impl<S, C> PartyCache<S, C>
where
  S: ScheduleStore,
  C: Clock,
{
  // ── Lifecycle ─────────────────────────────────────────────────────────────

  /// Open a cache for `party_id` and perform the initial load.
  pub async fn open(store: S, clock: C, party_id: Uuid) -> Result<Self> {
    let party = store
      .get_party(party_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PartyNotFound(party_id))?;

    let anchor = clock.today() - chrono::Days::new(u64::from(INITIAL_PAST_WEEKS) * 7);
    let window = DateWindow::new(
      anchor,
      INITIAL_PAST_WEEKS + INITIAL_FUTURE_WEEKS,
      party.weekdays,
      Some(party.created_on),
    );

    let mut cache = Self {
      store,
      clock,
      party,
      window,
      members: Vec::new(),
      entries: HashMap::new(),
      sessions: Vec::new(),
      writes: HashMap::new(),
      next_version: 0,
      acting_member: None,
      loading: false,
      last_error: None,
    };
    cache.load().await?;
    Ok(cache)
  }

  /// Close the cache, returning the store for reuse.
  pub fn close(self) -> S { self.store }

  /// The member on whose behalf session confirmations are recorded.
  pub fn set_acting_member(&mut self, member_id: Option<Uuid>) {
    self.acting_member = member_id;
  }

  /// Full fetch: roster, availability for the materialised span, sessions.
  ///
  /// On failure the cache keeps its last-known-good contents — a transient
  /// error must not blank out the schedule. On success all pending write
  /// state is discarded: the fetched snapshot is authoritative.
  pub async fn load(&mut self) -> Result<()> {
    self.loading = true;
    let result = self.fetch_all().await;
    self.loading = false;

    match result {
      Ok((members, rows, sessions)) => {
        self.members = members;
        self.entries = rows
          .into_iter()
          .map(|row| ((row.member_id, row.date), row))
          .collect();
        self.sessions = sessions;
        self.sessions.sort_by(|a, b| b.date.cmp(&a.date));
        self.writes.clear();
        self.last_error = None;
        Ok(())
      }
      Err(e) => {
        tracing::warn!(error = %e, "load failed; keeping last-known-good cache");
        self.last_error = Some(e.to_string());
        Err(e)
      }
    }
  }

  async fn fetch_all(
    &self,
  ) -> Result<(Vec<Member>, Vec<AvailabilityEntry>, Vec<Session>)> {
    let party_id = self.party.party_id;
    let (from, to) = self.window.span();

    let members = self
      .store
      .list_members(party_id)
      .await
      .map_err(Error::store)?;
    let rows = self
      .store
      .list_availability(party_id, from, to)
      .await
      .map_err(Error::store)?;
    let sessions = self
      .store
      .list_sessions(party_id)
      .await
      .map_err(Error::store)?;

    Ok((members, rows, sessions))
  }

  /// Re-fetch availability for the current span, replacing cached rows for
  /// keys without an in-flight write. Used for rollback after a failed
  /// optimistic mutation.
  pub(crate) async fn reload_availability(&mut self) -> Result<()> {
    let party_id = self.party.party_id;
    let (from, to) = self.window.span();
    let fetched = self.store.list_availability(party_id, from, to).await;
    let rows = match fetched {
      Ok(rows) => rows,
      Err(e) => return Err(self.fail(e)),
    };

    self
      .entries
      .retain(|key, _| matches!(self.writes.get(key), Some(WriteState::InFlight { .. })));
    for row in rows {
      let key = (row.member_id, row.date);
      if matches!(self.writes.get(&key), Some(WriteState::InFlight { .. })) {
        continue;
      }
      self.entries.insert(key, row);
    }
    Ok(())
  }

  // ── Read surface ──────────────────────────────────────────────────────────

  pub fn party(&self) -> &Party { &self.party }

  pub fn dates(&self) -> &[NaiveDate] { self.window.dates() }

  pub fn members(&self) -> &[Member] { &self.members }

  pub fn sessions(&self) -> &[Session] { &self.sessions }

  /// All cached availability rows, in no particular order.
  pub fn entries(&self) -> impl Iterator<Item = &AvailabilityEntry> {
    self.entries.values()
  }

  pub fn loading(&self) -> bool { self.loading }

  /// The most recent non-fatal error, cleared on the next successful load.
  pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }

  pub fn has_more_past(&self) -> bool { self.window.has_more_past() }

  pub(crate) fn window(&self) -> &DateWindow { &self.window }

  pub(crate) fn today(&self) -> NaiveDate { self.clock.today() }

  /// The cached tri-state for (member, date); `None` is unset.
  pub fn availability(
    &self,
    member_id: Uuid,
    date: NaiveDate,
  ) -> Option<AvailabilityState> {
    self.entries.get(&(member_id, date)).map(|e| e.state)
  }

  /// Whether every current roster member marked `available` on `date`.
  /// Members with no entry count as not-available. False for an empty roster.
  pub fn is_all_available(&self, date: NaiveDate) -> bool {
    !self.members.is_empty()
      && self.members.iter().all(|m| {
        self.availability(m.member_id, date) == Some(AvailabilityState::Available)
      })
  }

  // ── Optimistic writes ─────────────────────────────────────────────────────

  /// Set (member, date) to `state`: cache first, then persist.
  ///
  /// The cache entry is updated synchronously; the returned future resolves
  /// on persistence confirmation. On failure the optimistic entry is rolled
  /// back by re-fetching. A second write to the same key before the first
  /// resolves supersedes it locally; the final persisted call wins
  /// authoritatively.
  pub async fn set_availability(
    &mut self,
    member_id: Uuid,
    date: NaiveDate,
    state: AvailabilityState,
  ) -> Result<()> {
    self.require_member(member_id)?;
    let key = (member_id, date);
    let version = self.begin_write(key);

    self.entries.insert(key, AvailabilityEntry {
      party_id: self.party.party_id,
      member_id,
      date,
      state,
      updated_at: self.clock.now(),
    });

    let persisted = self
      .store
      .upsert_availability(self.party.party_id, member_id, date, state)
      .await;

    match persisted {
      Ok(row) => {
        if self.write_version(key) == Some(version) {
          self.entries.insert(key, row);
          self.settle_write(key);
        }
        Ok(())
      }
      Err(e) => self.rollback_write(key, version, e).await,
    }
  }

  /// Clear (member, date) to unset: remove from cache, then persist the
  /// delete. While the delete is in flight the merger rejects remote events
  /// for the key, so a stale "available" cannot flash back before the
  /// delete's own echo arrives.
  pub async fn clear_availability(
    &mut self,
    member_id: Uuid,
    date: NaiveDate,
  ) -> Result<()> {
    self.require_member(member_id)?;
    let key = (member_id, date);
    let version = self.begin_write(key);

    self.entries.remove(&key);

    let persisted = self
      .store
      .delete_availability(self.party.party_id, member_id, date)
      .await;

    match persisted {
      Ok(()) => {
        if self.write_version(key) == Some(version) {
          self.settle_write(key);
        }
        Ok(())
      }
      Err(e) => self.rollback_write(key, version, e).await,
    }
  }

  /// Advance (member, date) one step along the canonical cycle:
  /// unset → available → unavailable → unset.
  pub async fn toggle_availability(
    &mut self,
    member_id: Uuid,
    date: NaiveDate,
  ) -> Result<()> {
    match next_state(self.availability(member_id, date)) {
      Some(state) => self.set_availability(member_id, date, state).await,
      None => self.clear_availability(member_id, date).await,
    }
  }

  async fn rollback_write<E>(
    &mut self,
    key: EntryKey,
    version: u64,
    cause: E,
  ) -> Result<()>
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::warn!(error = %cause, "availability write failed; rolling back");
    if self.write_version(key) == Some(version) {
      self.writes.remove(&key);
      // Best effort: a failed rollback fetch leaves the optimistic value in
      // place until the next reload, but never a hybrid state.
      if let Err(reload_err) = self.reload_availability().await {
        tracing::warn!(error = %reload_err, "rollback re-fetch failed");
      }
    }
    Err(self.fail(cause))
  }

  // ── Window extension ──────────────────────────────────────────────────────

  /// Extend the window into the past and fetch availability for the new
  /// dates. Returns how many dates were prepended (0 at the floor).
  pub async fn extend_past(&mut self, weeks: u32) -> Result<usize> {
    let mut window = self.window.clone();
    let added = window.extend_past(weeks);
    let Some((&from, &to)) = added.first().zip(added.last()) else {
      // The span may still have moved (down to the floor) without yielding
      // any eligible dates.
      self.window = window;
      return Ok(0);
    };

    let fetched = self
      .store
      .list_availability(self.party.party_id, from, to)
      .await;
    let rows = match fetched {
      Ok(rows) => rows,
      Err(e) => return Err(self.fail(e)),
    };

    // Commit the extension only once the fetch has succeeded.
    self.window = window;
    self.merge_fetched(rows);
    Ok(added.len())
  }

  /// Extend the window into the future and fetch availability for the new
  /// dates. Always possible; returns how many dates were appended.
  pub async fn extend_future(&mut self, weeks: u32) -> Result<usize> {
    let mut window = self.window.clone();
    let added = window.extend_future(weeks);
    let Some((&from, &to)) = added.first().zip(added.last()) else {
      self.window = window;
      return Ok(0);
    };

    let fetched = self
      .store
      .list_availability(self.party.party_id, from, to)
      .await;
    let rows = match fetched {
      Ok(rows) => rows,
      Err(e) => return Err(self.fail(e)),
    };

    self.window = window;
    self.merge_fetched(rows);
    Ok(added.len())
  }

  fn merge_fetched(&mut self, rows: Vec<AvailabilityEntry>) {
    for row in rows {
      let key = (row.member_id, row.date);
      if matches!(self.writes.get(&key), Some(WriteState::InFlight { .. })) {
        continue;
      }
      self.entries.insert(key, row);
    }
  }

  // ── Write-state machinery ─────────────────────────────────────────────────

  pub(crate) fn begin_write(&mut self, key: EntryKey) -> u64 {
    self.next_version += 1;
    let version = self.next_version;
    self.writes.insert(key, WriteState::InFlight { version });
    version
  }

  fn write_version(&self, key: EntryKey) -> Option<u64> {
    match self.writes.get(&key) {
      Some(WriteState::InFlight { version }) => Some(*version),
      _ => None,
    }
  }

  fn settle_write(&mut self, key: EntryKey) {
    self
      .writes
      .insert(key, WriteState::Settled { at: self.clock.now() });
  }

  fn require_member(&self, member_id: Uuid) -> Result<()> {
    if self.members.iter().any(|m| m.member_id == member_id) {
      Ok(())
    } else {
      Err(Error::UnknownMember(member_id))
    }
  }

  pub(crate) fn fail<E>(&mut self, e: E) -> Error
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    self.last_error = Some(e.to_string());
    Error::store(e)
  }
}
