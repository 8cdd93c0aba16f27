//! Unified client error model shared by the REST client, the session
//! resolver and the persisted-state store, along with the helper that mines
//! backend error bodies for a human-readable message.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Login or registration rejected: bad credentials, role mismatch,
    /// missing token field. Shown inline on the auth prompt.
    #[error("{code}: {message}")]
    Auth { code: String, message: String },
    /// Non-2xx backend response with the extracted message.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    /// Transport-level failure (offline, DNS, TLS). No automatic retry.
    #[error("{code}: {message}")]
    Network { code: String, message: String },
    /// Response body could not be parsed as JSON.
    #[error("{code}: {message}")]
    Decode { code: String, message: String },
    /// Persisted client state could not be read or written.
    #[error("{code}: {message}")]
    Io { code: String, message: String },
    #[error("{code}: {message}")]
    Internal { code: String, message: String },
}

impl AppError {
    pub fn auth<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self {
        AppError::Auth { code: code.into(), message: msg.into() }
    }
    pub fn http<M: Into<String>>(status: u16, msg: M) -> Self {
        AppError::Http { status, message: msg.into() }
    }
    pub fn network<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self {
        AppError::Network { code: code.into(), message: msg.into() }
    }
    pub fn decode<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self {
        AppError::Decode { code: code.into(), message: msg.into() }
    }
    pub fn io<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self {
        AppError::Io { code: code.into(), message: msg.into() }
    }
    pub fn internal<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self {
        AppError::Internal { code: code.into(), message: msg.into() }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Auth { message, .. }
            | AppError::Network { message, .. }
            | AppError::Decode { message, .. }
            | AppError::Io { message, .. }
            | AppError::Internal { message, .. }
            | AppError::Http { message, .. } => message.as_str(),
        }
    }

    /// HTTP status carried by the error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network { code: "network_error".into(), message: err.to_string() }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io { code: "io_error".into(), message: err.to_string() }
    }
}

/// Mine a non-2xx body for a `message` field; fall back to the raw text,
/// then to a generic `HTTP error <status>`.
pub fn error_message_from_body(raw: &str, status: u16) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(raw) {
        if let Some(m) = v.get("message").and_then(|m| m.as_str()) {
            return m.to_string();
        }
    }
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    format!("HTTP error {}", status)
}
