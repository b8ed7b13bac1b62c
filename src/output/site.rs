//! Site snapshot (`site-data.json`)

use serde::Serialize;

use crate::enrich::ClaudeCorner;
use crate::feed::ActivityEvent;
use crate::metrics::PilotReport;
use crate::projects::{Category, ProjectEntity};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SiteStats {
    pub(crate) total_projects: usize,
    pub(crate) total_sessions: u64,
    pub(crate) total_messages: u64,
    pub(crate) active_days: usize,
    pub(crate) streak: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct CategorySummary {
    pub(crate) id: Category,
    pub(crate) label: &'static str,
    pub(crate) color: &'static str,
    pub(crate) icon: &'static str,
    pub(crate) count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SiteSnapshot {
    pub(crate) generated: String,
    pub(crate) stats: SiteStats,
    pub(crate) activity_feed: Vec<ActivityEvent>,
    pub(crate) projects: Vec<ProjectEntity>,
    pub(crate) categories: Vec<CategorySummary>,
    pub(crate) lab_projects: Vec<ProjectEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) claude_corner: Option<ClaudeCorner>,
}

/// Headline numbers. Session, streak and day counts come from the pilot
/// report; messages are the larger of the merged projects' sum and the
/// report's license total.
pub(crate) fn build_stats(projects: &[ProjectEntity], pilot: Option<&PilotReport>) -> SiteStats {
    let project_messages: u64 = projects.iter().map(|p| p.total_messages).sum();
    let mut stats = SiteStats {
        total_projects: projects.len(),
        total_messages: project_messages,
        ..Default::default()
    };
    if let Some(report) = pilot {
        stats.total_sessions = report.license.total_sessions;
        stats.total_messages = project_messages.max(report.license.total_messages);
        stats.streak = report.streaks.current;
        stats.active_days = report.streaks.total_active_days;
    }
    stats
}

/// One summary per category in fixed order, including empty ones.
pub(crate) fn build_category_summaries(projects: &[ProjectEntity]) -> Vec<CategorySummary> {
    Category::ALL
        .into_iter()
        .map(|category| CategorySummary {
            id: category,
            label: category.label(),
            color: category.color(),
            icon: category.icon(),
            count: projects.iter().filter(|p| p.category == category).count(),
        })
        .collect()
}

pub(crate) fn build_site_snapshot(
    generated: String,
    stats: SiteStats,
    activity_feed: Vec<ActivityEvent>,
    projects: Vec<ProjectEntity>,
    claude_corner: Option<ClaudeCorner>,
) -> SiteSnapshot {
    let categories = build_category_summaries(&projects);
    let lab_projects = projects.iter().filter(|p| p.is_research).cloned().collect();
    SiteSnapshot {
        generated,
        stats,
        activity_feed,
        projects,
        categories,
        lab_projects,
        claude_corner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn entity(slug: &str, category: Category, messages: u64, research: bool) -> ProjectEntity {
        ProjectEntity {
            slug: slug.into(),
            name: slug.into(),
            tagline: String::new(),
            description: String::new(),
            category,
            is_research: research,
            is_featured: false,
            status: "active".into(),
            technologies: BTreeSet::new(),
            last_activity: String::new(),
            total_messages: messages,
            sources: BTreeMap::new(),
            claude_involvement: None,
            source_messages: BTreeMap::new(),
        }
    }

    #[test]
    fn stats_without_report_use_project_sums() {
        let projects = vec![
            entity("a", Category::Hardware, 10, false),
            entity("b", Category::Data, 5, false),
        ];
        let stats = build_stats(&projects, None);
        assert_eq!(stats.total_projects, 2);
        assert_eq!(stats.total_messages, 15);
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.streak, 0);
    }

    #[test]
    fn stats_take_larger_message_total_from_report() {
        let mut report = PilotReport::default();
        report.license.total_sessions = 7;
        report.license.total_messages = 900;
        report.streaks.current = 3;
        report.streaks.total_active_days = 12;
        let projects = vec![entity("a", Category::Hardware, 10, false)];

        let stats = build_stats(&projects, Some(&report));
        assert_eq!(stats.total_sessions, 7);
        assert_eq!(stats.total_messages, 900);
        assert_eq!(stats.streak, 3);
        assert_eq!(stats.active_days, 12);
    }

    #[test]
    fn snapshot_lists_categories_and_lab_projects() {
        let projects = vec![
            entity("hotbits", Category::Creative, 1, true),
            entity("esp32", Category::Hardware, 2, false),
            entity("probe", Category::Hardware, 2, false),
        ];
        let stats = build_stats(&projects, None);
        let snapshot = build_site_snapshot("now".into(), stats, Vec::new(), projects, None);

        assert_eq!(snapshot.categories.len(), 5);
        assert_eq!(snapshot.categories[0].count, 2);
        assert_eq!(snapshot.categories[4].count, 1);
        assert_eq!(snapshot.lab_projects.len(), 1);
        assert_eq!(snapshot.lab_projects[0].slug, "hotbits");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["categories"][1]["id"], "ai-ml");
        assert_eq!(json["categories"][0]["icon"], "Cpu");
        assert_eq!(json["stats"]["totalProjects"], 3);
        assert!(json.get("claudeCorner").is_none());
        assert!(json["projects"][0].get("sourceMessages").is_none());
    }
}
