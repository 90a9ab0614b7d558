use crate::model::Envelope;
use thiserror::Error;

/// Failure talking to the product API.
///
/// The three variants mirror the three ways a call can go wrong: the request never got a
/// response, the server answered with a non-2xx status, or the body was not the JSON we
/// expected. An application-level `success: false` is *not* an error at this layer; it is
/// returned as an ordinary [`Envelope`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server responded with status {status}")]
    Status {
        status: u16,
        body: Option<Envelope<serde_json::Value>>,
    },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// The server-supplied message, if the failure carried one.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                body: Some(body), ..
            } => body.message.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    /// Only a request that never got an answer is a connectivity failure.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ApiError::Transport(_) => FailureKind::Connectivity,
            ApiError::Status { .. } | ApiError::Decode(_) => FailureKind::Application,
        }
    }
}

#[derive(Error, Debug)]
pub enum StockroomError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Remote(#[from] ApiError),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, StockroomError>;

/// Which side of the wire a user-facing failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never got a response.
    Connectivity,
    /// The server answered, but not with what was asked for.
    Application,
}

/// A page-level error message held in component state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub kind: FailureKind,
    pub message: String,
}

impl ErrorBanner {
    pub fn application(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Application,
            message: message.into(),
        }
    }

    /// A banner with the caller's message, classified by how `err` failed.
    pub fn for_error(err: &ApiError, message: impl Into<String>) -> Self {
        Self {
            kind: err.failure_kind(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorBanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
