/// Standard date format used throughout the codebase: "2025-01-15"
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fallback value when a session ID or project path is unavailable
pub(crate) const UNKNOWN: &str = "unknown";

/// Placeholder model id written on locally generated assistant messages
pub(crate) const SYNTHETIC_MODEL: &str = "<synthetic>";

/// Schema version of the stats cache snapshot
pub(crate) const STATS_CACHE_VERSION: u32 = 2;

/// Version stamped into the pilot report metadata
pub(crate) const PIPELINE_VERSION: &str = "1.0.0";

/// Maximum number of events kept in the activity feed
pub(crate) const FEED_CAP: usize = 50;

/// Maximum number of session files scanned when sampling tool usage
pub(crate) const SAMPLE_FILE_CAP: usize = 100;
