//! Unified error type for ajax-links
//!
//! Every fallible operation in the workspace reports an [`AjaxLinksError`].
//! Most of them never reach a user: the engine turns a failed navigation into
//! a full page load instead of an in-page error.

use serde::{Deserialize, Serialize};

/// Transport failure reported by a [`FetchEffects`](crate::effects::FetchEffects) handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response
    #[error("Transport failed for {url}: {reason}")]
    Transport {
        /// URL that was requested
        url: String,
        /// Reason reported by the transport
        reason: String,
    },

    /// The server answered with a non-success status
    #[error("Request to {url} returned status {status}")]
    Status {
        /// URL that was requested
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be read as text
    #[error("Unreadable body from {url}: {reason}")]
    Body {
        /// URL that was requested
        url: String,
        /// Reason the body could not be read
        reason: String,
    },
}

impl FetchError {
    /// Create a transport error
    pub fn transport(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a status error
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Create a body error
    pub fn body(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Body {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Unified error type for all ajax-links operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AjaxLinksError {
    /// A selector was rejected by the DOM implementation
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// Selector as written in markup or settings
        selector: String,
        /// Message from the DOM implementation
        message: String,
    },

    /// Fetching a fragment failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Options could not be decoded
    #[error("Invalid options: {message}")]
    Options {
        /// Decoder message
        message: String,
    },

    /// A DOM primitive failed
    #[error("DOM error: {message}")]
    Dom {
        /// Error message describing the DOM failure
        message: String,
    },

    /// The history collaborator failed
    #[error("History error: {message}")]
    History {
        /// Error message describing the history failure
        message: String,
    },
}

impl AjaxLinksError {
    /// Create an invalid selector error
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create an options error
    pub fn options(message: impl Into<String>) -> Self {
        Self::Options {
            message: message.into(),
        }
    }

    /// Create a DOM error
    pub fn dom(message: impl Into<String>) -> Self {
        Self::Dom {
            message: message.into(),
        }
    }

    /// Create a history error
    pub fn history(message: impl Into<String>) -> Self {
        Self::History {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AjaxLinksError {
    fn from(err: serde_json::Error) -> Self {
        Self::options(err.to_string())
    }
}

/// Result type for ajax-links operations
pub type Result<T> = std::result::Result<T, AjaxLinksError>;
