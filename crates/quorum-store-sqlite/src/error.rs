//! Error type for `quorum-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("party not found: {0}")]
  PartyNotFound(uuid::Uuid),

  /// Attempted to insert a second session on an already-taken date.
  #[error("a session already exists on {0}")]
  SessionExists(chrono::NaiveDate),

  #[error("session not found: {0}")]
  SessionNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
