//! Errors returned by [`BukloadClient`](super::BukloadClient)

use reqwest::StatusCode;
use thiserror::Error;

/// Everything a Bukload API call can fail with
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connect, TLS, timeout)
    #[error("Transport error: {0}")]
    Request(#[from] reqwest::Error),

    /// Any non-2xx status without a dedicated variant
    #[error("Backend returned {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed and could not be recovered by a token refresh
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 400, usually a rejected form field
    #[error("Rejected by backend: {0}")]
    BadRequest(String),

    /// 403 that survived a token refresh
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// The server answered 2xx but reported `success: false` in the envelope
    #[error("Application error: {message}")]
    Application { message: String },

    /// Input rejected locally before any request was sent
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A body did not match the expected JSON shape
    #[error("Malformed JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Credential storage could not be read or written
    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Bad client configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Map a non-2xx status and its body text to an error
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest(message),
            StatusCode::UNAUTHORIZED => Self::AuthenticationFailed(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            other => Self::ServerError {
                status: other.as_u16(),
                message,
            },
        }
    }

    /// Whether the caller should send the user back to the login screen
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_) | Self::Forbidden(_))
    }

    /// HTTP status this error was built from, if any
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::BadRequest(_) => Some(400),
            Self::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_codes() {
        assert!(matches!(
            ClientError::from_status(StatusCode::UNAUTHORIZED, "expired".into()),
            ClientError::AuthenticationFailed(m) if m == "expired"
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::FORBIDDEN, String::new()),
            ClientError::Forbidden(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_GATEWAY, "upstream".into()),
            ClientError::ServerError { status: 502, .. }
        ));
    }

    #[test]
    fn auth_failures_are_flagged() {
        assert!(ClientError::AuthenticationFailed("x".into()).is_auth_failure());
        assert!(ClientError::Forbidden("x".into()).is_auth_failure());
        assert!(!ClientError::NotFound("x".into()).is_auth_failure());
        assert_eq!(ClientError::NotFound("x".into()).status(), Some(404));
        assert_eq!(
            ClientError::Application {
                message: "nope".into()
            }
            .status(),
            None
        );
    }
}
