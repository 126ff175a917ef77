//! Shared configuration for the picker binaries.
//!
//! Values are layered by `ortho_config`: command-line flags override
//! `PICKER_*` environment variables, which override any discovered
//! configuration file, which in turn override the built-in defaults exposed
//! from [`defaults`]. Library crates never load configuration themselves;
//! they receive the resolved values from the binary that owns the session.

mod defaults;
mod logging;

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_PREFETCH_WINDOW, DEFAULT_ROOT_SUBTITLE, DEFAULT_ROOT_TITLE,
    default_log_filter, default_log_filter_string, default_log_format, default_prefetch_window,
    default_root_subtitle, default_root_title,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for a picker session host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "PICKER")]
pub struct Config {
    /// `tracing` filter expression applied to the subscriber.
    #[serde(default = "crate::defaults::default_log_filter_string")]
    #[ortho_config(default = crate::defaults::default_log_filter_string())]
    log_filter: String,
    /// Output format of the telemetry subscriber.
    #[serde(default = "crate::defaults::default_log_format")]
    #[ortho_config(default = crate::defaults::default_log_format())]
    log_format: LogFormat,
    /// Title of the root listing.
    #[serde(default = "crate::defaults::default_root_title")]
    #[ortho_config(default = crate::defaults::default_root_title())]
    root_title: String,
    /// Subtitle shown above the root listing.
    #[serde(default = "crate::defaults::default_root_subtitle")]
    #[ortho_config(default = crate::defaults::default_root_subtitle())]
    root_subtitle: String,
    /// Maximum number of fetches the dispatcher starts per pump.
    #[serde(default = "crate::defaults::default_prefetch_window")]
    #[ortho_config(default = crate::defaults::default_prefetch_window())]
    prefetch_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            root_title: default_root_title(),
            root_subtitle: default_root_subtitle(),
            prefetch_window: default_prefetch_window(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments, environment and files.
    ///
    /// # Errors
    ///
    /// Returns the aggregated loader error when any layer fails to parse.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first item is treated as the binary name, mirroring
    /// [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns the aggregated loader error when any layer fails to parse.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Filter expression handed to the telemetry subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format of the telemetry subscriber.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Title of the root listing.
    #[must_use]
    pub fn root_title(&self) -> &str {
        self.root_title.as_str()
    }

    /// Subtitle shown above the root listing.
    #[must_use]
    pub fn root_subtitle(&self) -> &str {
        self.root_subtitle.as_str()
    }

    /// Maximum number of fetches the dispatcher starts per pump.
    #[must_use]
    pub const fn prefetch_window(&self) -> usize {
        self.prefetch_window
    }

    /// Replaces the dispatcher admission window.
    #[must_use]
    pub const fn with_prefetch_window(mut self, window: usize) -> Self {
        self.prefetch_window = window;
        self
    }

    /// Replaces the root listing labels.
    #[must_use]
    pub fn with_root_labels(mut self, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        self.root_title = title.into();
        self.root_subtitle = subtitle.into();
        self
    }

    /// Checks invariants the loader cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroPrefetchWindow`] when the dispatcher would
    /// never admit a fetch, and [`ConfigError::EmptyRootTitle`] when the root
    /// listing would render without a heading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefetch_window == 0 {
            return Err(ConfigError::ZeroPrefetchWindow);
        }
        if self.root_title.trim().is_empty() {
            return Err(ConfigError::EmptyRootTitle);
        }
        Ok(())
    }
}

/// Semantic errors detected after the configuration layers merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `prefetch_window` was zero.
    #[error("prefetch window must admit at least one fetch per pump")]
    ZeroPrefetchWindow,
    /// `root_title` was blank.
    #[error("root title must not be empty")]
    EmptyRootTitle,
}
