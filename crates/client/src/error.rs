use gasportal_auth::StorageError;
use gasportal_core::DomainError;
use serde_json::Value;

pub type ClientResult<T> = Result<T, ClientError>;

/// Message used when an error response carries no readable detail.
pub const GENERIC_API_MESSAGE: &str = "An error occurred";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response was received (connection refused, DNS, timeout, ...).
    #[error("no response received from server: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: Value,
    },

    /// Authorization failed and could not be recovered by a token refresh.
    /// The session has been cleared.
    #[error("session expired; sign in again")]
    SessionExpired,

    /// The session the request was sent for was logged out or replaced by
    /// another sign-in while the request was in flight. The current session
    /// is untouched.
    #[error("session changed while the request was in flight")]
    SessionReplaced,

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Build an API error from a status and a raw response body.
    ///
    /// The message comes from the body's `detail`, `message` or `error` field
    /// when one is present.
    pub fn from_response(status: u16, raw_body: &str) -> Self {
        let body: Value = serde_json::from_str(raw_body).unwrap_or(Value::Null);
        let message = ["detail", "message", "error"]
            .iter()
            .find_map(|field| body.get(*field).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_API_MESSAGE.to_string());

        ClientError::Api {
            status,
            message,
            body,
        }
    }

    /// HTTP status for server-returned errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }
}
