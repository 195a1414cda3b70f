//! The `ScheduleStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `quorum-store-sqlite`).
//! Higher layers (`quorum-engine`, `quorum-api`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  availability::{AvailabilityEntry, AvailabilityState},
  member::Member,
  party::Party,
  session::{HostDetails, NewSession, Session},
};

/// Abstraction over a Quorum schedule backend.
///
/// Availability rows are keyed by (party, member, date): `upsert_availability`
/// replaces any existing row for the key, `delete_availability` removes it
/// ("unset") and is a no-op when the row is already absent.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ScheduleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Party & roster ────────────────────────────────────────────────────

  /// Retrieve a party by id. Returns `None` if not found.
  fn get_party(
    &self,
    party_id: Uuid,
  ) -> impl Future<Output = Result<Option<Party>, Self::Error>> + Send + '_;

  /// List the party's roster.
  fn list_members(
    &self,
    party_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  // ── Availability ──────────────────────────────────────────────────────

  /// All availability rows for the party with `from <= date <= to`.
  fn list_availability(
    &self,
    party_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
  ) -> impl Future<Output = Result<Vec<AvailabilityEntry>, Self::Error>> + Send + '_;

  /// Insert or replace the row for (party, member, date). Returns the
  /// persisted row with its server-assigned `updated_at`.
  fn upsert_availability(
    &self,
    party_id: Uuid,
    member_id: Uuid,
    date: NaiveDate,
    state: AvailabilityState,
  ) -> impl Future<Output = Result<AvailabilityEntry, Self::Error>> + Send + '_;

  /// Remove the row for (party, member, date), i.e. set it to unset.
  /// Idempotent: removing an absent row succeeds.
  fn delete_availability(
    &self,
    party_id: Uuid,
    member_id: Uuid,
    date: NaiveDate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// All sessions for the party, ordered by date descending.
  fn list_sessions(
    &self,
    party_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Session>, Self::Error>> + Send + '_;

  /// Insert a session. Fails if a session already exists on the date.
  fn insert_session(
    &self,
    input: NewSession,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Replace the host metadata of an existing session.
  fn update_session(
    &self,
    session_id: Uuid,
    host: HostDetails,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Hard-delete a session (cancel).
  fn delete_session(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
