//! Error taxonomy for calls against the auth API.
//!
//! Every failure an API call can produce lands in exactly one [`ErrorKind`].
//! The shell only special-cases [`ErrorKind::Unauthorized`]; the other kinds
//! become screen-level messages.

use serde::Serialize;

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkFailure,
    Unauthorized,
    Forbidden,
    ValidationFailure,
    ServerFault,
    MalformedResponse,
}

/// Errors produced by the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network failure: {0}")]
    Network(String),

    /// `401`, or an authenticated call attempted without a stored token.
    #[error("{0}")]
    Unauthorized(String),

    /// `403`: valid session, insufficient role.
    #[error("{0}")]
    Forbidden(String),

    /// Any other `4xx`, or a body reporting `success: false`.
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// `5xx`.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A success response whose body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ApiError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::NetworkFailure,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Validation { .. } => ErrorKind::ValidationFailure,
            Self::Server { .. } => ErrorKind::ServerFault,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::Unauthorized(_) => "E_UNAUTHORIZED",
            Self::Forbidden(_) => "E_FORBIDDEN",
            Self::Validation { .. } => "E_VALIDATION",
            Self::Server { .. } => "E_SERVER",
            Self::MalformedResponse(_) => "E_MALFORMED_RESPONSE",
        }
    }

    /// Classify a non-success HTTP status.
    ///
    /// `body` is the raw response text; when it is a JSON object with a
    /// string `message` field that message is surfaced, otherwise
    /// `HTTP <status>`.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = server_message(body).unwrap_or_else(|| format!("HTTP {status}"));
        match status {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            500..=599 => Self::Server { status, message },
            _ => Self::Validation { status, message },
        }
    }
}

fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_owned)
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::MalformedResponse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
