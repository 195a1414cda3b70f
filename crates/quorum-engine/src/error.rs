//! Error type for `quorum-engine`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The backing store (or its transport) failed. Covers both transient I/O
  /// failures and authorization failures; callers inspect the source to tell
  /// them apart.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("party not found: {0}")]
  PartyNotFound(Uuid),

  #[error("member {0} is not in the cached roster")]
  UnknownMember(Uuid),

  /// A session already exists on this date. Scheduling a second session on a
  /// taken date is rejected, never treated as an edit.
  #[error("a session is already scheduled on {0}")]
  SessionConflict(NaiveDate),

  #[error("session not found: {0}")]
  SessionNotFound(Uuid),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
