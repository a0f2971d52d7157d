//! # cyberguard
//!
//! Application shell and session-token lifecycle for the CyberGuard fake
//! account detector console.
//!
//! This crate contains the token store, the HTTP boundary and auth client
//! that talk to `/api/auth/*`, the navigation state machine that decides
//! which top-level screen is shown, and an in-memory stub of the auth backend
//! used by the `cyberguard-stub` binary and the integration tests.

pub mod auth;
pub mod backend;
pub mod config;
pub mod net;
pub mod session;
pub mod shell;
