//! Error types for the cnstrc client.
//!
//! # Design
//! Failures are split by where they happen. `Configuration` and `Validation`
//! are raised before any network I/O. `Transport` means no response was
//! obtained at all. `Api` means the service answered, either with a non-2xx
//! status or with a success body that could not be used. Callers that want a
//! retry policy usually only apply it to `Transport`.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure a client call can report.
#[derive(Debug, Error)]
pub enum Error {
    /// The client was configured without usable credentials or URLs.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A per-call argument was missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The service responded, but not with a usable success payload.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl Error {
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Status code of an HTTP-level failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(api) => Some(api.status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// HTTP-level failure reported by the service.
///
/// Only the response translator builds these, so `status` is always the code
/// the service actually sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status}{}: {message}", status_suffix(.status_text))]
pub struct ApiError {
    pub status: u16,
    pub status_text: String,
    pub message: String,
    /// Raw response body, kept for debugging.
    pub body: String,
}

fn status_suffix(status_text: &str) -> String {
    if status_text.is_empty() {
        String::new()
    } else {
        format!(" {status_text}")
    }
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Io,
    Other,
}

/// The request never produced a response (DNS, refused connection, timeout).
#[derive(Debug, Error)]
#[error("transport error ({kind:?}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::TimedOut => TransportErrorKind::Timeout,
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted => TransportErrorKind::Connect,
            _ => TransportErrorKind::Io,
        };
        TransportError::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_and_message() {
        let err = ApiError {
            status: 404,
            status_text: "Not Found".to_string(),
            message: "not found".to_string(),
            body: r#"{"message":"not found"}"#.to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 Not Found: not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn api_error_display_skips_missing_status_text() {
        let err = ApiError {
            status: 200,
            status_text: String::new(),
            message: "malformed".to_string(),
            body: "{}".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 200: malformed");
    }

    #[test]
    fn status_is_only_reported_for_api_errors() {
        let api: Error = ApiError {
            status: 500,
            status_text: String::new(),
            message: "boom".to_string(),
            body: "boom".to_string(),
        }
        .into();
        assert_eq!(api.status(), Some(500));

        let transport: Error =
            TransportError::new(TransportErrorKind::Timeout, "deadline elapsed").into();
        assert_eq!(transport.status(), None);
        assert!(transport.is_transport());
    }

    #[test]
    fn io_errors_map_to_transport_kinds() {
        let err: TransportError =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused").into();
        assert_eq!(err.kind, TransportErrorKind::Connect);

        let err: TransportError = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow").into();
        assert_eq!(err.kind, TransportErrorKind::Timeout);
    }
}
