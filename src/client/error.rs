//! Edit service error types

use thiserror::Error;

/// Error from the edit service, with classification.
///
/// `message` is what reaches the conversation: the backend's
/// `error.message` when it sent one, the raw body otherwise, or a generic
/// fallback. Nothing here is fatal — every error degrades to an inline
/// assistant message.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Network, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::InvalidRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::NotFound, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Server, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Decode, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unknown, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Connection failures and timeouts
    Network,
    /// Bad request (400)
    InvalidRequest,
    /// Unknown itinerary or message (404)
    NotFound,
    /// Server error (5xx)
    Server,
    /// Success status with an unparseable body
    Decode,
    /// Anything else
    Unknown,
}
