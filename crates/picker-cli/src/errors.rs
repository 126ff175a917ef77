//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use picker_config::ConfigError;
use picker_core::ControllerError;
use picker_dispatch::FixtureError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to load tree: {0}")]
    Fixture(#[from] FixtureError),
    #[error("failed to start session: {0}")]
    Start(#[from] ControllerError),
    #[error("'{title}' has no entry named '{step}'")]
    UnknownStep { step: String, title: String },
    #[error("'{title}' is still loading; cannot open '{step}'")]
    StillLoading { step: String, title: String },
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}

impl AppError {
    /// Help and version requests surface through clap's error path but are
    /// not failures.
    pub(crate) fn is_informational(&self) -> bool {
        matches!(self, Self::CliUsage(error) if !error.use_stderr())
    }
}
