//! JSON REST API for Quorum.
//!
//! Exposes an axum [`Router`] backed by any [`quorum_core::store::ScheduleStore`],
//! plus a server-sent-events change feed. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", quorum_api::api_router(store.clone()))
//! .nest("/api", quorum_api::feed::feed_router(feed))
//! ```

pub mod availability;
pub mod error;
pub mod feed;
pub mod parties;
pub mod sessions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch},
};
use quorum_core::store::ScheduleStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ScheduleStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Parties & roster
    .route("/parties/{id}", get(parties::get_one::<S>))
    .route("/parties/{id}/members", get(parties::members::<S>))
    // Availability
    .route(
      "/parties/{id}/availability",
      get(availability::list::<S>)
        .put(availability::set::<S>)
        .delete(availability::clear::<S>),
    )
    // Sessions
    .route(
      "/parties/{id}/sessions",
      get(sessions::list::<S>).post(sessions::create::<S>),
    )
    .route(
      "/parties/{id}/sessions/{session_id}",
      patch(sessions::update::<S>).delete(sessions::delete::<S>),
    )
    .with_state(store)
}
