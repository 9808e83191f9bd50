//! Errors raised while synchronizing the inbox.

use thiserror::Error;

/// Why a sync step failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The server rejected the access credential.
    #[error("unauthorized: the session credential was rejected")]
    Unauthorized,

    /// A new credential could not be obtained.
    #[error("credential refresh failed: {0}")]
    Credential(String),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl SyncError {
    /// Whether a later poll or a manual retry may succeed.
    ///
    /// Only client-side contract violations (4xx other than 401/429) are
    /// treated as permanent.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Unauthorized | Self::Credential(_) | Self::Transport(_) => true,
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) => false,
        }
    }

    /// Whether the failure is about the credential rather than the transport.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Credential(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(SyncError::Unauthorized.is_recoverable());
        assert!(SyncError::Transport("reset".into()).is_recoverable());
        assert!(
            SyncError::Server {
                status: 503,
                message: "busy".into()
            }
            .is_recoverable()
        );
        assert!(
            !SyncError::Server {
                status: 404,
                message: "gone".into()
            }
            .is_recoverable()
        );
        assert!(!SyncError::Decode("eof".into()).is_recoverable());
    }
}
