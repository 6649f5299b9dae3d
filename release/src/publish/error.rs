//! Errors raised while talking to the release-hosting API.

use thiserror::Error;

/// Errors arising from publishing operations.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The authentication token is not set.
    #[error("please set the ${var} environment variable to your personal access token")]
    MissingToken {
        /// Name of the variable that must hold the token.
        var: &'static str,
    },

    /// The API answered with a non-success status.
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Http {
        /// Request method.
        method: &'static str,
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("{method} {url} failed: {reason}")]
    Transport {
        /// Request method.
        method: &'static str,
        /// Request URL.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// The response body could not be decoded.
    #[error("unexpected response from {url}: {reason}")]
    Decode {
        /// Request URL.
        url: String,
        /// Description of the decoding failure.
        reason: String,
    },

    /// The release note editor could not be launched.
    #[error("failed to compose release notes with {editor}: {reason}")]
    Editor {
        /// Editor command.
        editor: String,
        /// Description of the failure.
        reason: String,
    },

    /// The user left the release note empty; the upload is abandoned.
    #[error("quit due to empty release note")]
    EmptyReleaseNotes,

    /// Reading an artefact for upload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    /// Return the HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
