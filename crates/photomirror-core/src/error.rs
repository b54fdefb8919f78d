//! Error types for authorization, listing and mirroring.
//!
//! Every failure in the pipeline is fatal: components return a
//! [`MirrorError`] and the binary decides how to terminate.

use std::fmt;
use thiserror::Error;

/// The category of a mirror error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Obtaining or exchanging the authorization code failed, or the access
    /// token could not be refreshed.
    Authorization,
    /// An HTTP round trip failed or returned a non-success status.
    Transport,
    /// A response body did not have the expected structure.
    Decode,
    /// Reading or writing the local filesystem failed.
    Io,
    /// The configuration is unusable (e.g. unparseable redirect URL).
    Configuration,
    /// Unexpected internal state.
    Internal,
}

impl ErrorCode {
    /// Returns a stable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization_error",
            Self::Transport => "transport_error",
            Self::Decode => "decode_error",
            Self::Io => "io_error",
            Self::Configuration => "configuration_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised anywhere in the authorize, list, mirror pipeline.
#[derive(Debug, Error)]
pub struct MirrorError {
    code: ErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl MirrorError {
    /// Creates a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Authorization, message)
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Transport, message)
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Decode, message)
    }

    /// Creates a filesystem error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Io, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Configuration, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MirrorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;
