//! Shared REST error taxonomy and response interpretation for the shell backend.

use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

/// HTTP status the backend returns for successful calls.
pub const STATUS_OK: u16 = 200;
/// HTTP status the backend returns when the session cookie is missing or expired.
pub const STATUS_UNAUTHORIZED: u16 = 401;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failure reported by a backend call.
pub enum ApiError {
    /// The backend answered `401`; the caller must stop and prompt for sign-in.
    #[error("not authenticated")]
    Unauthorized,
    /// The backend answered with a non-success status.
    #[error("request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error text taken from the response body when present.
        message: String,
    },
    /// The request never produced a response (offline, CORS, aborted).
    #[error("network error: {0}")]
    Network(String),
    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns whether this failure means the session is gone.
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns a short message suitable for inline display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            Self::Rejected { message, .. } => message.clone(),
            Self::Network(_) => "Network error".to_string(),
            Self::Decode(_) => "Unexpected response from server".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Maps a raw `(status, body)` pair to a typed result.
///
/// `200` decodes `body` as `T`, `401` becomes [`ApiError::Unauthorized`], and any other status
/// becomes [`ApiError::Rejected`] carrying the body's `error` field when it has one.
///
/// # Errors
///
/// Returns an [`ApiError`] for non-`200` statuses or when decoding fails.
pub fn interpret_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    match status {
        STATUS_OK => serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string())),
        STATUS_UNAUTHORIZED => Err(ApiError::Unauthorized),
        _ => Err(ApiError::Rejected {
            status,
            message: error_message(body)
                .unwrap_or_else(|| format!("request failed with status {status}")),
        }),
    }
}

/// Same as [`interpret_response`] but ignores the success body.
///
/// # Errors
///
/// Returns an [`ApiError`] for non-`200` statuses.
pub fn interpret_empty_response(status: u16, body: &str) -> Result<(), ApiError> {
    match status {
        STATUS_OK => Ok(()),
        _ => interpret_response::<serde_json::Value>(status, body).map(|_| ()),
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
}
