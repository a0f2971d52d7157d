//! HTTP boundary between the console and the auth API.
//!
//! DESIGN
//! ======
//! `types` mirrors the JSON payloads of `/api/auth/*`, `error` classifies
//! every failure into the fixed taxonomy the shell reasons about, and `http`
//! is the only place a bearer token is attached or a `401` is acted upon.

pub mod error;
pub mod http;
pub mod types;

pub use error::{ApiError, ErrorKind};
pub use http::HttpClient;
