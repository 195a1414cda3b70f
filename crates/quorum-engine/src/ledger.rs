//! Session ledger operations.
//!
//! Sessions change far less often than availability, so every mutation here
//! is invalidate-and-refetch rather than optimistic-merge: call the store,
//! then replace the cached list wholesale.

use chrono::NaiveDate;
use uuid::Uuid;

use quorum_core::{
  clock::Clock,
  session::{HostDetails, NewSession, Session},
  store::ScheduleStore,
};

use crate::{
  cache::PartyCache,
  error::{Error, Result},
};

impl<S, C> PartyCache<S, C>
where
  S: ScheduleStore,
  C: Clock,
{
  /// The session on `date`, if one is cached.
  pub fn session_on(&self, date: NaiveDate) -> Option<&Session> {
    self.sessions.iter().find(|s| s.date == date)
  }

  /// The "yes we played" shortcut: record a session on `date` with no host
  /// metadata. Rejected if the date already has a session.
  pub async fn confirm_session(&mut self, date: NaiveDate) -> Result<Session> {
    let mut input = NewSession::confirmation(self.party().party_id, date);
    input.confirmed_by = self.acting_member;
    self.insert_session(input).await
  }

  /// Schedule a session on `date` with full host details.
  /// Rejected if the date already has a session.
  pub async fn schedule_session(
    &mut self,
    date: NaiveDate,
    host: HostDetails,
  ) -> Result<Session> {
    let input = NewSession {
      party_id: self.party().party_id,
      date,
      host,
      confirmed_by: self.acting_member,
    };
    self.insert_session(input).await
  }

  async fn insert_session(&mut self, input: NewSession) -> Result<Session> {
    if self.session_on(input.date).is_some() {
      return Err(Error::SessionConflict(input.date));
    }

    let inserted = self.store.insert_session(input).await;
    let session = match inserted {
      Ok(s) => s,
      Err(e) => return Err(self.fail(e)),
    };

    self.reload_sessions().await?;
    Ok(session)
  }

  /// Replace the host metadata of an existing session.
  pub async fn update_session_host(
    &mut self,
    session_id: Uuid,
    host: HostDetails,
  ) -> Result<Session> {
    if !self.sessions.iter().any(|s| s.session_id == session_id) {
      return Err(Error::SessionNotFound(session_id));
    }

    let updated = self.store.update_session(session_id, host).await;
    let session = match updated {
      Ok(s) => s,
      Err(e) => return Err(self.fail(e)),
    };

    self.reload_sessions().await?;
    Ok(session)
  }

  /// Cancel a session (hard delete).
  pub async fn unschedule_session(&mut self, session_id: Uuid) -> Result<()> {
    if !self.sessions.iter().any(|s| s.session_id == session_id) {
      return Err(Error::SessionNotFound(session_id));
    }

    let deleted = self.store.delete_session(session_id).await;
    if let Err(e) = deleted {
      return Err(self.fail(e));
    }

    self.reload_sessions().await
  }

  async fn reload_sessions(&mut self) -> Result<()> {
    let party_id = self.party().party_id;
    let listed = self.store.list_sessions(party_id).await;
    let mut sessions = match listed {
      Ok(s) => s,
      Err(e) => return Err(self.fail(e)),
    };
    sessions.sort_by(|a, b| b.date.cmp(&a.date));
    self.sessions = sessions;
    Ok(())
  }
}
