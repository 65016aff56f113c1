use std::fmt;

use fragsync_core::RequestSeq;

use crate::decode::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    InvalidHeader { name: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::InvalidHeader { name } => write!(f, "invalid header {name}"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Everything that can go wrong between issuing a request and having
/// regions ready to apply.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("transport failure: {0}")]
    Transport(#[from] FetchError),
    #[error("{0}")]
    Decode(#[from] DecodeError),
    #[error("invalid selector {selector:?}")]
    InvalidSelector { selector: String },
    #[error("malformed response: none of {expected} regions found")]
    MalformedResponse { expected: usize },
    #[error("invalid json payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot resolve path {path:?}: {message}")]
    InvalidPath { path: String, message: String },
}

/// Notifications for whoever drives a controller (console, tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    RequestIssued { seq: RequestSeq, url: String },
    Applied { seq: RequestSeq },
    Discarded { seq: RequestSeq, last_applied: RequestSeq },
    Failed { seq: RequestSeq, message: String },
    Flash { message: String },
    Navigated { path: String },
}
