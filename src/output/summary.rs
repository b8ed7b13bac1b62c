//! Stage summaries, printed to stderr so stdout stays clean for JSON

use comfy_table::{Cell, Table};

use super::format::{
    create_styled_table, format_compact, format_cost, format_number, header_cell, right_cell,
};
use super::site::SiteSnapshot;
use crate::core::StatsCacheSnapshot;
use crate::metrics::PilotReport;

fn metric_table(title: &str, rows: Vec<(&str, String)>) -> Table {
    let mut table = create_styled_table();
    table.set_header(vec![header_cell(title), header_cell("Value")]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), right_cell(&value)]);
    }
    table
}

pub(crate) fn refresh_summary(snapshot: &StatsCacheSnapshot) -> Table {
    let tokens: i64 = snapshot
        .model_usage
        .values()
        .map(|u| u.input_tokens + u.output_tokens)
        .sum();
    let longest = snapshot
        .longest_session
        .as_ref()
        .map(|s| format!("{} msgs", format_number(s.message_count)))
        .unwrap_or_else(|| "-".to_string());
    metric_table(
        "Stats cache",
        vec![
            ("Sessions", format_number(snapshot.total_sessions)),
            ("Messages", format_number(snapshot.total_messages)),
            ("Active days", snapshot.daily_activity.len().to_string()),
            ("Models", snapshot.model_usage.len().to_string()),
            ("Tokens (in+out)", format_compact(tokens)),
            (
                "First session",
                snapshot
                    .first_session_date
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
            ),
            ("Longest session", longest),
        ],
    )
}

pub(crate) fn pilot_summary(report: &PilotReport) -> Table {
    metric_table(
        "Pilot report",
        vec![
            ("License class", report.license.class.as_str().to_string()),
            ("Sessions", format_number(report.license.total_sessions)),
            ("Messages", format_number(report.license.total_messages)),
            ("Cost", format_cost(report.license.total_cost_usd)),
            ("Projects", report.mission_log.len().to_string()),
            ("Active days", report.streaks.total_active_days.to_string()),
            ("Current streak", format!("{} days", report.streaks.current)),
            ("Skills found", report.skills_cloud.len().to_string()),
            ("Domain ratings", report.instrument_ratings.len().to_string()),
        ],
    )
}

pub(crate) fn site_summary(snapshot: &SiteSnapshot) -> Table {
    let mut rows = vec![
        ("Projects", snapshot.projects.len().to_string()),
        ("Feed items", snapshot.activity_feed.len().to_string()),
        ("Lab projects", snapshot.lab_projects.len().to_string()),
        ("Messages", format_number(snapshot.stats.total_messages)),
        ("Streak", format!("{} days", snapshot.stats.streak)),
    ];
    for category in &snapshot.categories {
        rows.push((category.label, category.count.to_string()));
    }
    metric_table("Site snapshot", rows)
}
