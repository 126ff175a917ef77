//! Terminal outcomes of a browse session and their host-facing encoding.

use serde::{Deserialize, Serialize};

use crate::errors::{ApiFailure, FatalError, SystemFailure};
use crate::item::LeafPayload;

/// The single result a session surfaces.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    /// The user backed out or closed the picker.
    Cancelled,
    /// The remote service reported a structured failure.
    ApiError(ApiFailure),
    /// Any other failure, kept opaque.
    SystemError(SystemFailure),
    /// The user picked a leaf.
    Selected(LeafPayload),
}

impl SessionOutcome {
    /// Short label used in telemetry.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::ApiError(_) => "api_error",
            Self::SystemError(_) => "system_error",
            Self::Selected(_) => "selected",
        }
    }
}

impl From<FatalError> for SessionOutcome {
    fn from(error: FatalError) -> Self {
        match error {
            FatalError::Api(failure) => Self::ApiError(failure),
            FatalError::System(failure) => Self::SystemError(failure),
        }
    }
}

/// Serialisable form of a [`SessionOutcome`] handed back to the host.
///
/// Exactly one shape is produced:
///
/// - `{ "cancelled": true }`
/// - `{ "cancelled": false, "apiError": { "code", "message", "url" } }`
/// - `{ "cancelled": false, "systemError": "..." }`
/// - `{ "selection": { "id", "name", "pagesUrl", ... } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    /// Present for every non-selection outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<bool>,
    /// Structured remote failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_error: Option<ApiFailure>,
    /// Rendered opaque failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_error: Option<String>,
    /// The selected leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<LeafPayload>,
}

impl From<&SessionOutcome> for SessionResult {
    fn from(outcome: &SessionOutcome) -> Self {
        match outcome {
            SessionOutcome::Cancelled => Self {
                cancelled: Some(true),
                ..Self::default()
            },
            SessionOutcome::ApiError(failure) => Self {
                cancelled: Some(false),
                api_error: Some(failure.clone()),
                ..Self::default()
            },
            SessionOutcome::SystemError(failure) => Self {
                cancelled: Some(false),
                system_error: Some(failure.to_string()),
                ..Self::default()
            },
            SessionOutcome::Selected(payload) => Self {
                selection: Some(payload.clone()),
                ..Self::default()
            },
        }
    }
}
