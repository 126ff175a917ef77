//! Domain errors raised while fetching listings.
//!
//! I/O errors are wrapped in `Arc` to keep the enums cheap to move and
//! `Send + Sync`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use picker_core::{ApiFailure, FatalError};
use thiserror::Error;

/// Failure of a single listing request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote service answered with a structured failure.
    #[error(transparent)]
    Api(#[from] ApiFailure),

    /// The request never produced an answer.
    #[error("transport failure: {message}")]
    Transport {
        /// Human-readable failure description.
        message: String,
        /// Optional underlying I/O error.
        #[source]
        source: Option<Arc<std::io::Error>>,
    },
}

impl FetchError {
    /// Builds a transport failure without an underlying source.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a transport failure wrapping an I/O error.
    #[must_use]
    pub fn transport_io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Converts the failure into a session-ending error.
    #[must_use]
    pub fn into_fatal(self) -> FatalError {
        match self {
            Self::Api(failure) => FatalError::Api(failure),
            transport @ Self::Transport { .. } => FatalError::system(transport),
        }
    }
}

/// Errors raised while loading a fixture tree.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture file could not be read.
    #[error("failed to read fixture '{path}': {source}")]
    Read {
        /// Path that was read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The fixture document is not valid JSON of the expected shape.
    #[error("failed to parse fixture: {message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
        /// Underlying JSON error.
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl FixtureError {
    /// Wraps a JSON decoding failure.
    #[must_use]
    pub fn parse(source: serde_json::Error) -> Self {
        Self::Parse {
            message: source.to_string(),
            source: Some(source),
        }
    }
}
