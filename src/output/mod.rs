mod format;
mod json;
mod site;
mod summary;

pub(crate) use format::format_number;
pub(crate) use json::write_json;
pub(crate) use site::{SiteSnapshot, SiteStats, build_site_snapshot, build_stats};
pub(crate) use summary::{pilot_summary, refresh_summary, site_summary};
