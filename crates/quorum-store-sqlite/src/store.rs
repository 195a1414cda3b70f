//! [`SqliteStore`] — the SQLite implementation of [`ScheduleStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use tokio::sync::broadcast;
use uuid::Uuid;

use quorum_core::{
  availability::{AvailabilityEntry, AvailabilityState},
  feed::{AvailabilityChange, ChangeKind, FeedEvent},
  member::Member,
  party::Party,
  session::{HostDetails, NewSession, Session},
  store::ScheduleStore,
  window::WeekdaySet,
};

use crate::{
  encode::{
    encode_date, encode_dt, encode_host, encode_state, encode_uuid,
    RawAvailability, RawMember, RawParty, RawSession,
  },
  schema::SCHEMA,
  Error, Result,
};

/// Feed events buffered per subscriber before the channel reports a lag.
const FEED_CAPACITY: usize = 256;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quorum schedule store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection and the feed channel are
/// reference-counted. Every availability mutation publishes a row-level
/// [`FeedEvent`] to all current subscribers.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
  feed: broadcast::Sender<FeedEvent>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let (feed, _) = broadcast::channel(FEED_CAPACITY);
    let store = Self { conn, feed };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let (feed, _) = broadcast::channel(FEED_CAPACITY);
    let store = Self { conn, feed };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Subscribe to the availability change feed. Events published before the
  /// subscription are not replayed.
  pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
    self.feed.subscribe()
  }

  /// The feed's send half, for wiring a transport (e.g. SSE) to the store.
  pub fn feed_sender(&self) -> broadcast::Sender<FeedEvent> {
    self.feed.clone()
  }

  fn emit(&self, change: AvailabilityChange) {
    // No subscribers is fine; the send result only reports that.
    let _ = self.feed.send(FeedEvent::Change(change));
  }

  // ── Setup helpers ─────────────────────────────────────────────────────────

  /// Create a party. `created_on` becomes the floor date clients never
  /// schedule before.
  pub async fn create_party(
    &self,
    name: &str,
    created_on: NaiveDate,
    weekdays: WeekdaySet,
  ) -> Result<Party> {
    let party = Party {
      party_id: Uuid::new_v4(),
      name: name.to_owned(),
      created_on,
      created_at: Utc::now(),
      weekdays,
    };

    let id_str   = encode_uuid(party.party_id);
    let name_str = party.name.clone();
    let on_str   = encode_date(party.created_on);
    let at_str   = encode_dt(party.created_at);
    let bits     = i64::from(party.weekdays.bits());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO parties (party_id, name, created_on, created_at, weekdays)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name_str, on_str, at_str, bits],
        )?;
        Ok(())
      })
      .await?;

    Ok(party)
  }

  /// Add a member to a party's roster.
  pub async fn add_member(&self, party_id: Uuid, name: &str) -> Result<Member> {
    if self.get_party(party_id).await?.is_none() {
      return Err(Error::PartyNotFound(party_id));
    }

    let member = Member {
      member_id:    Uuid::new_v4(),
      party_id,
      name:         name.to_owned(),
      nickname:     None,
      user_id:      None,
      profile_name: None,
      address:      None,
    };

    let id_str    = encode_uuid(member.member_id);
    let party_str = encode_uuid(party_id);
    let name_str  = member.name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO members (member_id, party_id, name) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, party_str, name_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(member)
  }
}

// ─── ScheduleStore impl ──────────────────────────────────────────────────────

impl ScheduleStore for SqliteStore {
  type Error = Error;

  // ── Party & roster ────────────────────────────────────────────────────────

  async fn get_party(&self, party_id: Uuid) -> Result<Option<Party>> {
    let id_str = encode_uuid(party_id);

    let raw: Option<RawParty> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT party_id, name, created_on, created_at, weekdays
               FROM parties WHERE party_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawParty {
                  party_id:   row.get(0)?,
                  name:       row.get(1)?,
                  created_on: row.get(2)?,
                  created_at: row.get(3)?,
                  weekdays:   row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawParty::into_party).transpose()
  }

  async fn list_members(&self, party_id: Uuid) -> Result<Vec<Member>> {
    let party_str = encode_uuid(party_id);

    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT member_id, party_id, name, nickname, user_id, profile_name, address
           FROM members WHERE party_id = ?1 ORDER BY name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![party_str], |row| {
            Ok(RawMember {
              member_id:    row.get(0)?,
              party_id:     row.get(1)?,
              name:         row.get(2)?,
              nickname:     row.get(3)?,
              user_id:      row.get(4)?,
              profile_name: row.get(5)?,
              address:      row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_member).collect()
  }

  // ── Availability ──────────────────────────────────────────────────────────

  async fn list_availability(
    &self,
    party_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
  ) -> Result<Vec<AvailabilityEntry>> {
    let party_str = encode_uuid(party_id);
    let from_str  = encode_date(from);
    let to_str    = encode_date(to);

    let raws: Vec<RawAvailability> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT party_id, member_id, date, state, updated_at
           FROM availability
           WHERE party_id = ?1 AND date >= ?2 AND date <= ?3
           ORDER BY date, member_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![party_str, from_str, to_str], |row| {
            Ok(RawAvailability {
              party_id:   row.get(0)?,
              member_id:  row.get(1)?,
              date:       row.get(2)?,
              state:      row.get(3)?,
              updated_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAvailability::into_entry).collect()
  }

  async fn upsert_availability(
    &self,
    party_id: Uuid,
    member_id: Uuid,
    date: NaiveDate,
    state: AvailabilityState,
  ) -> Result<AvailabilityEntry> {
    let row = AvailabilityEntry {
      party_id,
      member_id,
      date,
      state,
      updated_at: Utc::now(),
    };

    let party_str  = encode_uuid(party_id);
    let member_str = encode_uuid(member_id);
    let date_str   = encode_date(date);
    let state_str  = encode_state(state).to_owned();
    let at_str     = encode_dt(row.updated_at);

    let prev: Option<RawAvailability> = self
      .conn
      .call(move |conn| {
        let prev = conn
          .query_row(
            "SELECT party_id, member_id, date, state, updated_at
             FROM availability WHERE member_id = ?1 AND date = ?2",
            rusqlite::params![member_str, date_str],
            |r| {
              Ok(RawAvailability {
                party_id:   r.get(0)?,
                member_id:  r.get(1)?,
                date:       r.get(2)?,
                state:      r.get(3)?,
                updated_at: r.get(4)?,
              })
            },
          )
          .optional()?;

        conn.execute(
          "INSERT INTO availability (party_id, member_id, date, state, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (member_id, date)
           DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
          rusqlite::params![party_str, member_str, date_str, state_str, at_str],
        )?;
        Ok(prev)
      })
      .await?;

    let old = prev.map(RawAvailability::into_entry).transpose()?;
    let kind = if old.is_some() { ChangeKind::Update } else { ChangeKind::Insert };
    self.emit(AvailabilityChange { kind, new: Some(row.clone()), old });

    Ok(row)
  }

  async fn delete_availability(
    &self,
    _party_id: Uuid,
    member_id: Uuid,
    date: NaiveDate,
  ) -> Result<()> {
    let member_str = encode_uuid(member_id);
    let date_str   = encode_date(date);

    let prev: Option<RawAvailability> = self
      .conn
      .call(move |conn| {
        let prev = conn
          .query_row(
            "SELECT party_id, member_id, date, state, updated_at
             FROM availability WHERE member_id = ?1 AND date = ?2",
            rusqlite::params![member_str, date_str],
            |r| {
              Ok(RawAvailability {
                party_id:   r.get(0)?,
                member_id:  r.get(1)?,
                date:       r.get(2)?,
                state:      r.get(3)?,
                updated_at: r.get(4)?,
              })
            },
          )
          .optional()?;

        conn.execute(
          "DELETE FROM availability WHERE member_id = ?1 AND date = ?2",
          rusqlite::params![member_str, date_str],
        )?;
        Ok(prev)
      })
      .await?;

    // Deleting an absent row is a no-op and publishes nothing.
    if let Some(raw) = prev {
      let old = raw.into_entry()?;
      self.emit(AvailabilityChange {
        kind: ChangeKind::Delete,
        new:  None,
        old:  Some(old),
      });
    }

    Ok(())
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn list_sessions(&self, party_id: Uuid) -> Result<Vec<Session>> {
    let party_str = encode_uuid(party_id);

    let raws: Vec<RawSession> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT session_id, party_id, date, host_json, confirmed_by, confirmed_at
           FROM sessions WHERE party_id = ?1 ORDER BY date DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![party_str], |row| {
            Ok(RawSession {
              session_id:   row.get(0)?,
              party_id:     row.get(1)?,
              date:         row.get(2)?,
              host_json:    row.get(3)?,
              confirmed_by: row.get(4)?,
              confirmed_at: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSession::into_session).collect()
  }

  async fn insert_session(&self, input: NewSession) -> Result<Session> {
    let session = Session {
      session_id:   Uuid::new_v4(),
      party_id:     input.party_id,
      date:         input.date,
      host:         input.host,
      confirmed_by: input.confirmed_by,
      confirmed_at: Utc::now(),
    };

    let party_str = encode_uuid(session.party_id);
    let date_str  = encode_date(session.date);

    let taken: bool = {
      let party_str = party_str.clone();
      let date_str = date_str.clone();
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT 1 FROM sessions WHERE party_id = ?1 AND date = ?2",
                rusqlite::params![party_str, date_str],
                |_| Ok(true),
              )
              .optional()?
              .unwrap_or(false),
          )
        })
        .await?
    };
    if taken {
      return Err(Error::SessionExists(session.date));
    }

    let id_str     = encode_uuid(session.session_id);
    let host_str   = encode_host(&session.host)?;
    let by_str     = session.confirmed_by.map(encode_uuid);
    let at_str     = encode_dt(session.confirmed_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions
             (session_id, party_id, date, host_json, confirmed_by, confirmed_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, party_str, date_str, host_str, by_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn update_session(
    &self,
    session_id: Uuid,
    host: HostDetails,
  ) -> Result<Session> {
    let id_str = encode_uuid(session_id);

    let raw: Option<RawSession> = {
      let id_str = id_str.clone();
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT session_id, party_id, date, host_json, confirmed_by, confirmed_at
                 FROM sessions WHERE session_id = ?1",
                rusqlite::params![id_str],
                |row| {
                  Ok(RawSession {
                    session_id:   row.get(0)?,
                    party_id:     row.get(1)?,
                    date:         row.get(2)?,
                    host_json:    row.get(3)?,
                    confirmed_by: row.get(4)?,
                    confirmed_at: row.get(5)?,
                  })
                },
              )
              .optional()?,
          )
        })
        .await?
    };
    let Some(raw) = raw else {
      return Err(Error::SessionNotFound(session_id));
    };

    let host_str = encode_host(&host)?;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE sessions SET host_json = ?1 WHERE session_id = ?2",
          rusqlite::params![host_str, id_str],
        )?;
        Ok(())
      })
      .await?;

    let mut session = raw.into_session()?;
    session.host = host;
    Ok(session)
  }

  async fn delete_session(&self, session_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(session_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE session_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
