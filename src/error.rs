//! Error types for the enrollment client.
//!
//! Every failure surfaces as exactly one [`RaError`] kind so callers can
//! branch on the kind without inspecting message strings. No error is
//! recovered locally; a failed step leaves the client state as it was
//! before the call.

use thiserror::Error;

/// Result type alias using [`RaError`].
pub type Result<T> = std::result::Result<T, RaError>;

/// Errors that can occur during enrollment operations.
#[derive(Debug, Error)]
pub enum RaError {
    /// Connection or I/O failure, or a request target that does not use
    /// the scheme the transport requires.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered HTTP 409: the operation is not valid in the
    /// current server-side process state.
    #[error("operation not possible in the current process state (HTTP 409)")]
    Conflict,

    /// The redirect resolver received a status code other than 303.
    #[error("server did not respond with a redirect: HTTP {status}")]
    UnexpectedResponse {
        /// The status code that was received instead.
        status: u16,
    },

    /// A 303 response carried no usable `Location` header.
    #[error("redirect target not set in HTTP header")]
    MissingRedirect,

    /// The local e-ID agent handshake failed: agent unreachable or the
    /// redirect target did not contain an auth key.
    #[error("e-ID handshake failed: {0}")]
    Handshake(String),

    /// A JSON reply was missing an expected field or carried the wrong type.
    #[error("malformed server reply: {0}")]
    MalformedResponse(String),

    /// The trust anchor store could not be loaded, or it contained no
    /// trusted entries.
    #[error("trust store error: {0}")]
    TrustStore(String),

    /// A process-scoped operation was invoked while no process id is held.
    #[error("no active process; start or resume a process first")]
    NoActiveProcess,

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for RaError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl RaError {
    /// Create a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a handshake error with the given message.
    pub fn handshake(msg: impl Into<String>) -> Self {
        Self::Handshake(msg.into())
    }

    /// Create a malformed-response error with the given message.
    pub fn malformed_response(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a trust store error with the given message.
    pub fn trust_store(msg: impl Into<String>) -> Self {
        Self::TrustStore(msg.into())
    }

    /// Create an unexpected-response error for the given status code.
    pub fn unexpected_response(status: u16) -> Self {
        Self::UnexpectedResponse { status }
    }

    /// Returns true if this error reports an HTTP 409 conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}
