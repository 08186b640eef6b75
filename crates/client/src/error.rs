//! Client error types.

use serde::Deserialize;
use thiserror::Error;

/// Why a refresh did not produce a session. Shared by every waiter of one
/// refresh, hence `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("Refresh token rejected")]
    Rejected,

    #[error("No session to refresh")]
    NoSession,

    #[error("Refresh abandoned before completing")]
    Abandoned,

    #[error("Refresh failed: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Not signed in")]
    NotSignedIn,

    /// The session is gone; the user has to sign in again.
    #[error("Session expired, sign in again")]
    SessionExpired,

    #[error("API error {status} ({error}): {message}")]
    Api {
        status: u16,
        error: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request body: {0}")]
    Body(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl From<RefreshError> for ClientError {
    fn from(err: RefreshError) -> Self {
        tracing::debug!(error = %err, "Session refresh failed");
        ClientError::SessionExpired
    }
}
