use std::fmt;

use crate::domain::entities::ReportPeriod;

/// Outcome details of a failed backend call.
///
/// `status` is `None` when the request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub status: Option<u16>,
    pub detail: String,
}

impl Failure {
    pub fn status(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            detail: detail.into(),
        }
    }

    pub fn transport(err: &TransportError) -> Self {
        Self {
            status: None,
            detail: err.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) if self.detail.is_empty() => write!(f, "status {status}"),
            Some(status) => write!(f, "status {status}: {}", self.detail),
            None => f.write_str(&self.detail),
        }
    }
}

/// Errors surfaced by the auth, order and report clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Login rejected, auth endpoint unreachable, or no token obtainable.
    #[error("authentication failed ({0})")]
    Authentication(Failure),
    /// Backend rejected or never answered an order submission.
    #[error("order submission failed ({0})")]
    OrderSubmission(Failure),
    /// Backend or network failure while retrieving a report.
    #[error("report fetch failed ({0})")]
    ReportFetch(Failure),
    /// Report body matched none of the known report shapes.
    #[error("unrecognized {period} report shape")]
    UnrecognizedReport { period: ReportPeriod, body: String },
    /// Report query rejected before any request was sent.
    #[error("invalid report query: {0}")]
    InvalidQuery(String),
}

impl ClientError {
    /// HTTP status carried by the failure, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Authentication(failure)
            | ClientError::OrderSubmission(failure)
            | ClientError::ReportFetch(failure) => failure.status,
            ClientError::UnrecognizedReport { .. } | ClientError::InvalidQuery(_) => None,
        }
    }
}

/// Raised by a backend adapter when no HTTP response was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
    pub timed_out: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timed_out(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.timed_out {
            write!(f, "request timed out: {}", self.message)
        } else {
            write!(f, "transport error: {}", self.message)
        }
    }
}

impl std::error::Error for TransportError {}
