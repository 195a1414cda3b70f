//! Core types and trait definitions for the Quorum scheduler.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod availability;
pub mod clock;
pub mod feed;
pub mod member;
pub mod party;
pub mod session;
pub mod store;
pub mod window;
