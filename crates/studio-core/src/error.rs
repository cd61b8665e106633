//! Error types for the studio client.
//!
//! One unified error type with a variant per failure category: local
//! validation, HTTP rejection, network transport and protocol outcome.
//! Callers branch on [`Error::category`], never on status codes.

use std::fmt;
use thiserror::Error;

/// The unified error type for studio operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Pre-flight validation failed. Nothing was sent.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The backend answered with a non-success status.
    #[error("request rejected: {0}")]
    Http(#[from] HttpError),

    /// No response was obtained from the backend.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The round trip succeeded but the outcome was negative or unreadable.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Coarse error category, stable across endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    Http,
    Network,
    Protocol,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Http => "http",
            ErrorCategory::Network => "network",
            ErrorCategory::Protocol => "protocol",
        };
        f.write_str(s)
    }
}

impl Error {
    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Validation(_) => ErrorCategory::Validation,
            Error::Http(_) => ErrorCategory::Http,
            Error::Network(_) => ErrorCategory::Network,
            Error::Protocol(_) => ErrorCategory::Protocol,
        }
    }

    /// A message suitable for showing to a user, without the category prefix.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(e) => e.to_string(),
            Error::Http(e) => e.message.clone(),
            Error::Network(e) => format!("Could not reach the server: {e}"),
            Error::Protocol(e) => e.message().to_string(),
        }
    }

    /// Returns the HTTP status if the backend rejected the request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(e) => Some(e.status),
            _ => None,
        }
    }

    /// Whether the backend rejected the credential (401).
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Local validation errors. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An image prompt was empty or whitespace.
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// A password confirmation did not match.
    #[error("Passwords don't match")]
    PasswordMismatch,

    /// A new password was shorter than the minimum length.
    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    /// A required field was missing or empty.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// A request carried both a JSON and a multipart body.
    #[error("a request cannot carry both a JSON body and a multipart payload")]
    AmbiguousBody,

    /// A payment amount or credit count was out of range.
    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// A URL failed validation.
    #[error("invalid URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    /// A request body could not be serialized.
    #[error("could not encode request: {reason}")]
    Encoding { reason: String },

    /// A path segment was empty or a dot segment.
    #[error("'{segment}' is not a valid path segment")]
    InvalidPathSegment { segment: String },

    /// A gateway callback could not be interpreted.
    #[error("invalid callback: {reason}")]
    InvalidCallback { reason: String },
}

/// A non-success response from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    /// HTTP status code.
    pub status: u16,
    /// Human-readable message extracted from the body, or a generic fallback.
    pub message: String,
}

impl HttpError {
    /// Create an HTTP error, falling back to a generic message when the body had none.
    pub fn new(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("request failed with status {status}"));
        Self { status, message }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport-level errors: no usable response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Any other transport failure (TLS, body stream, redirect loop).
    #[error("{message}")]
    Other { message: String },
}

/// Protocol-level errors: the round trip succeeded, the outcome did not.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The backend reported a negative outcome (failed payment, invalid token).
    #[error("{message}")]
    Rejected { message: String },

    /// A success response could not be decoded into the expected shape.
    #[error("unexpected response: {message}")]
    UnexpectedResponse { message: String },
}

impl ProtocolError {
    /// Returns the message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            ProtocolError::Rejected { message } | ProtocolError::UnexpectedResponse { message } => {
                message
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_falls_back_to_generic_message() {
        let err = HttpError::new(503, None);
        assert_eq!(err.message, "request failed with status 503");

        let err = HttpError::new(400, Some("   ".to_string()));
        assert_eq!(err.message, "request failed with status 400");
    }

    #[test]
    fn categories_are_distinct() {
        let http: Error = HttpError::new(401, Some("nope".into())).into();
        let net: Error = TransportError::Timeout.into();
        assert_eq!(http.category(), ErrorCategory::Http);
        assert_eq!(net.category(), ErrorCategory::Network);
        assert!(http.is_unauthorized());
        assert!(!net.is_unauthorized());
    }

    #[test]
    fn user_message_strips_category_prefix() {
        let err: Error = ValidationError::PasswordMismatch.into();
        assert_eq!(err.user_message(), "Passwords don't match");

        let err: Error = ProtocolError::Rejected {
            message: "Card declined".into(),
        }
        .into();
        assert_eq!(err.user_message(), "Card declined");
    }
}
