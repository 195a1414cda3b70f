//! The availability/session state-synchronization engine.
//!
//! [`PartyCache`] is a client-held cache of per-member, per-date availability
//! and session facts for one party, kept consistent under optimistic local
//! mutation, server-pushed change-feed events, and a sliding date window.
//! It is headless: generic over any [`quorum_core::store::ScheduleStore`] and
//! [`quorum_core::clock::Clock`], with no rendering dependencies.
//!
//! Client state is a cache, not a source of truth — the backing store is
//! authoritative, and every mutation resolves only on persistence
//! confirmation.

pub mod cache;
pub mod controller;
pub mod derive;
pub mod error;
pub mod ledger;
pub mod merge;

pub use cache::PartyCache;
pub use controller::{Edge, Extension, Viewport, WindowController};
pub use error::{Error, Result};
