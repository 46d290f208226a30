//! Failure taxonomy for record queries.
//!
//! Transport failures, rejected statuses and application errors all end up
//! as a list of messages in the controller's error state. The variants are
//! kept apart here only so logging and tests can tell them apart.

use thiserror::Error;

/// Shown when the server did not say what went wrong
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again later.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never completed
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("server responded with status {status}")]
    Status { status: u16, messages: Vec<String> },

    /// Success status, but the payload reports a domain error
    #[error("server reported an error: {}", .0.join("; "))]
    Application(Vec<String>),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// Messages to show the user in place of the record table
    pub fn messages(&self) -> Vec<String> {
        let messages = match self {
            FetchError::Status { messages, .. } | FetchError::Application(messages) => messages
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
            FetchError::Transport(_) | FetchError::Timeout(_) | FetchError::InvalidResponse(_) => {
                Vec::new()
            }
        };

        if messages.is_empty() {
            vec![GENERIC_ERROR_MESSAGE.to_string()]
        } else {
            messages
        }
    }

    /// Whether the request reached the server at all
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Timeout(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return FetchError::Status {
                status: status.as_u16(),
                messages: Vec::new(),
            };
        }
        if error.is_decode() {
            return FetchError::InvalidResponse(error.to_string());
        }
        FetchError::Transport(error.to_string())
    }
}
