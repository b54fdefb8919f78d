//! Client error types.

use std::fmt;

use photomirror_core::{IncompleteLibrary, MirrorError};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Authorization, listing or mirroring failed.
    Mirror(MirrorError),
    /// Listing stopped early; `usize` items had been collected.
    IncompleteListing(usize, MirrorError),
    /// The operator interrupted the run.
    Interrupted,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Mirror(err) => write!(f, "{}", err),
            Self::IncompleteListing(count, err) => {
                write!(f, "listing aborted after {} items: {}", count, err)
            }
            Self::Interrupted => f.write_str("interrupted"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mirror(err) | Self::IncompleteListing(_, err) => Some(err),
            Self::Config(_) | Self::Interrupted => None,
        }
    }
}

impl From<MirrorError> for ClientError {
    fn from(err: MirrorError) -> Self {
        Self::Mirror(err)
    }
}

impl From<IncompleteLibrary> for ClientError {
    fn from(err: IncompleteLibrary) -> Self {
        Self::IncompleteListing(err.partial.len(), err.error)
    }
}
