use crate::logging::LogFormat;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Title shown on the root listing before any container is opened.
pub const DEFAULT_ROOT_TITLE: &str = "Notebooks";

/// Subtitle shown above the root listing.
pub const DEFAULT_ROOT_SUBTITLE: &str = "OneNote";

/// Number of queued fetches the dispatcher admits per pump.
pub const DEFAULT_PREFETCH_WINDOW: usize = 4;

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Owned root title used by serde and the configuration loader.
pub fn default_root_title() -> String {
    DEFAULT_ROOT_TITLE.to_owned()
}

/// Owned root subtitle used by serde and the configuration loader.
pub fn default_root_subtitle() -> String {
    DEFAULT_ROOT_SUBTITLE.to_owned()
}

/// Default dispatcher admission window.
pub fn default_prefetch_window() -> usize {
    DEFAULT_PREFETCH_WINDOW
}
