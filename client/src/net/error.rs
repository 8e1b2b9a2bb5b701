//! Error taxonomy for backend calls.
//!
//! ERROR HANDLING
//! ==============
//! Status codes the client reacts to (401, 403) get dedicated variants so the
//! interceptor can match on them. Everything else keeps the backend's
//! `{"error": "..."}` message so views can show it inline.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Errors produced by [`crate::net::transport::Transport`] implementations
/// and the typed API layer above them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend rejected the session (HTTP 401).
    #[error("not authenticated: {message}")]
    Unauthorized { message: String },

    /// The session is valid but lacks the required role (HTTP 403).
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// Any other non-success status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Classify a non-success response by status code and raw body text.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = error_message(body).unwrap_or_else(|| default_message(status));
        match status {
            401 => Self::Unauthorized { message },
            403 => Self::Forbidden { message },
            _ => Self::Status { status, message },
        }
    }

    /// HTTP status code carried by this error, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) | Self::HttpClientBuild(_) => None,
        }
    }

    /// Message suitable for inline display next to a form or list.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized { message } | Self::Forbidden { message } | Self::Status { message, .. } => {
                message.clone()
            }
            Self::Transport(_) => "Unable to reach the server. Please try again.".to_owned(),
            Self::Decode(_) | Self::HttpClientBuild(_) => "Unexpected response from the server.".to_owned(),
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

/// Pull a human-readable message out of a JSON error body.
///
/// The backend uses `{"error": "..."}` for failures and occasionally
/// `{"status": "error", "message": "..."}`.
fn error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .filter(|message| !message.trim().is_empty())
        .map(ToOwned::to_owned)
}

fn default_message(status: u16) -> String {
    match status {
        401 => "Authentication required".to_owned(),
        403 => "Access denied".to_owned(),
        404 => "Not found".to_owned(),
        _ => format!("request failed with status {status}"),
    }
}
