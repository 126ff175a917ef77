//! Error types surfaced by the navigation controller and its collaborators.

use std::error::Error;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::key::NodeKey;

/// Misuse of the controller lifecycle or its cache invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// `initialize` was invoked more than once.
    #[error("navigation controller is already initialised")]
    AlreadyInitialised,
    /// The controller was disposed and holds no cache or dispatcher.
    #[error("navigation controller has been disposed")]
    Disposed,
    /// Navigation targeted a container that was never discovered.
    #[error("container '{key}' was navigated to before it was discovered")]
    UnregisteredContainer {
        /// Key of the missing container.
        key: NodeKey,
    },
}

impl ControllerError {
    pub(crate) const fn unregistered(key: NodeKey) -> Self {
        Self::UnregisteredContainer { key }
    }
}

/// Failure attached to a single container's batch.
///
/// These never end the session: the node simply stays loading.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BatchError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl BatchError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Structured failure reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("remote request to {url} failed with {code}: {message}")]
pub struct ApiFailure {
    /// Service error code.
    pub code: String,
    /// Service error message.
    pub message: String,
    /// URL of the failed request.
    pub url: String,
}

impl ApiFailure {
    /// Builds a structured API failure.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            url: url.into(),
        }
    }
}

/// Opaque failure that is not attributable to the remote service.
#[derive(Debug, Clone, Error)]
#[error("{inner}")]
pub struct SystemFailure {
    inner: Arc<dyn Error + Send + Sync>,
}

impl SystemFailure {
    /// Wraps an arbitrary error.
    #[must_use]
    pub fn new(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self {
            inner: Arc::from(error.into()),
        }
    }
}

/// Panic captured by the session's top-level safety net.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("picker session panicked: {message}")]
pub struct PanicFailure {
    message: String,
}

impl PanicFailure {
    pub(crate) fn from_payload(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|text| (*text).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| String::from("non-string panic payload"));
        Self { message }
    }

    /// Panic message, when the payload carried one.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Session-ending failure, already classified.
#[derive(Debug, Error)]
pub enum FatalError {
    /// Structured failure reported by the remote service.
    #[error(transparent)]
    Api(#[from] ApiFailure),
    /// Anything else, including panics caught by the safety net.
    #[error(transparent)]
    System(#[from] SystemFailure),
}

impl FatalError {
    /// Classifies an arbitrary error.
    ///
    /// Errors that are an [`ApiFailure`] keep their structure; everything else
    /// is wrapped opaquely.
    #[must_use]
    pub fn classify(error: Box<dyn Error + Send + Sync>) -> Self {
        match error.downcast::<ApiFailure>() {
            Ok(api) => Self::Api(*api),
            Err(other) => Self::System(SystemFailure {
                inner: Arc::from(other),
            }),
        }
    }

    /// Wraps an error as an opaque system failure without inspecting it.
    #[must_use]
    pub fn system(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::System(SystemFailure::new(error))
    }
}

impl From<Box<dyn Error + Send + Sync>> for FatalError {
    fn from(error: Box<dyn Error + Send + Sync>) -> Self {
        Self::classify(error)
    }
}

impl From<PanicFailure> for FatalError {
    fn from(panic: PanicFailure) -> Self {
        Self::system(panic)
    }
}
