//! Error types shared by the session and its collaborators

use thiserror::Error;

/// A persistence or remote-validation call that failed in transit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    /// HTTP-like status when the server answered
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

/// Failure reported by a collaborator
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
    /// Anything not recognised as a transport failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Transport(TransportError::new(err.to_string()))
    }
}
