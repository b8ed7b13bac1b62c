//! Activity feed: recent conversations, repository pushes and active
//! telemetry days, newest first.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::consts::FEED_CAP;
use crate::metrics::HeatmapDay;
use crate::projects::{Category, Normalizer, ProjectEntity, conversation_key};
use crate::source::chat_export::{ChatExport, Conversation};
use crate::source::repos::RepoRecord;

static OVERVIEW_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*?\*?Conversation [Oo]verview\*?\*?\s*").expect("valid heading regex")
});
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold regex"));

const TITLE_CHARS: usize = 100;
const DESCRIPTION_CHARS: usize = 250;
const FALLBACK_SUMMARY_CHARS: usize = 200;
const MIN_CONVERSATION_MESSAGES: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum EventType {
    ClaudeWeb,
    Github,
    ClaudeCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub(crate) enum EventMetadata {
    Conversation { messages: u64 },
    Repo { repo: String },
    Day { messages: u64, sessions: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivityEvent {
    #[serde(rename = "type")]
    pub(crate) kind: EventType,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) project_slug: Option<String>,
    pub(crate) category: Option<Category>,
    pub(crate) date: String,
    pub(crate) metadata: EventMetadata,
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Strip the "Conversation overview" heading and bold markers.
pub(crate) fn clean_summary(summary: &str) -> String {
    let text = OVERVIEW_HEADING.replace_all(summary, "");
    let text = BOLD.replace_all(&text, "$1");
    text.trim().to_string()
}

fn conversation_summary(convo: &Conversation) -> String {
    let summary = match convo.summary.as_deref() {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => convo
            .first_human_text()
            .map(|t| truncate_chars(t, FALLBACK_SUMMARY_CHARS))
            .unwrap_or_default(),
    };
    clean_summary(&summary)
}

/// First project whose slug equals, contains or is contained in `key`.
/// An empty key is contained in every slug and so matches the first project.
fn fuzzy_match<'a>(key: &str, projects: &'a [ProjectEntity]) -> Option<&'a ProjectEntity> {
    projects
        .iter()
        .find(|p| p.slug == key || p.slug.contains(key) || key.contains(p.slug.as_str()))
}

fn conversation_events(
    export: &ChatExport,
    projects: &[ProjectEntity],
    normalizer: &Normalizer,
) -> impl Iterator<Item = ActivityEvent> {
    export
        .conversations
        .iter()
        .filter(|c| c.message_count() >= MIN_CONVERSATION_MESSAGES)
        .map(move |convo| {
            let name = convo.name.as_deref().unwrap_or("Untitled conversation");
            let messages = convo.message_count();
            let summary = conversation_summary(convo);
            let matched = fuzzy_match(&conversation_key(name, normalizer), projects);

            ActivityEvent {
                kind: EventType::ClaudeWeb,
                title: truncate_chars(name, TITLE_CHARS),
                description: if summary.is_empty() {
                    format!("Conversation with {messages} messages")
                } else {
                    truncate_chars(&summary, DESCRIPTION_CHARS)
                },
                project_slug: matched.map(|p| p.slug.clone()),
                category: matched.map(|p| p.category),
                date: convo.updated_at.clone().unwrap_or_default(),
                metadata: EventMetadata::Conversation { messages },
            }
        })
}

fn repo_events(
    repos: &[RepoRecord],
    projects: &[ProjectEntity],
    normalizer: &Normalizer,
) -> impl Iterator<Item = ActivityEvent> {
    repos.iter().map(move |repo| {
        let slug = normalizer.normalize(&repo.name);
        let matched = projects.iter().find(|p| p.slug == slug);
        let full_name = if repo.full_name.is_empty() {
            &repo.name
        } else {
            &repo.full_name
        };

        ActivityEvent {
            kind: EventType::Github,
            title: format!("Activity on {full_name}"),
            description: if repo.description.is_empty() {
                format!("Repository {}", repo.name)
            } else {
                repo.description.clone()
            },
            project_slug: matched.map(|p| p.slug.clone()),
            category: matched.map(|p| p.category),
            date: repo.pushed_at.clone(),
            metadata: EventMetadata::Repo {
                repo: repo.full_name.clone(),
            },
        }
    })
}

fn telemetry_events(heatmap: &[HeatmapDay]) -> impl Iterator<Item = ActivityEvent> {
    heatmap.iter().filter(|d| d.count > 0).map(|day| ActivityEvent {
        kind: EventType::ClaudeCode,
        title: format!("Claude Code session ({} messages)", day.count),
        description: format!("{} sessions, {} tool calls", day.sessions, day.tool_calls),
        project_slug: None,
        category: None,
        date: format!("{}T23:59:00Z", day.date),
        metadata: EventMetadata::Day {
            messages: day.count,
            sessions: day.sessions,
        },
    })
}

pub(crate) fn build_activity_feed(
    projects: &[ProjectEntity],
    export: &ChatExport,
    repos: &[RepoRecord],
    heatmap: &[HeatmapDay],
    normalizer: &Normalizer,
) -> Vec<ActivityEvent> {
    let mut feed: Vec<ActivityEvent> = conversation_events(export, projects, normalizer)
        .chain(repo_events(repos, projects, normalizer))
        .chain(telemetry_events(heatmap))
        .collect();
    feed.sort_by(|a, b| b.date.cmp(&a.date));
    feed.truncate(FEED_CAP);
    feed
}
