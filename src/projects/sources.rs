//! The three project sources: chat export, hosted repositories and the
//! telemetry mission log.

use std::collections::HashMap;

use crate::metrics::Mission;
use crate::projects::merge::ProjectSource;
use crate::projects::normalize::Normalizer;
use crate::projects::types::{
    ChatContribution, ProjectRecord, RepoContribution, SourceContribution, TelemetryContribution,
};
use crate::source::chat_export::{ChatExport, Conversation};
use crate::source::repos::RepoRecord;
use crate::utils::day_prefix;

pub(crate) const CHAT_SOURCE: &str = "claudeWeb";
pub(crate) const REPO_SOURCE: &str = "github";
pub(crate) const TELEMETRY_SOURCE: &str = "claudeCode";

const UNTITLED: &str = "Untitled";

/// Slug of a conversation title's head: the part before `" - "`, then
/// before `":"`.
pub(crate) fn conversation_key(title: &str, normalizer: &Normalizer) -> String {
    let head = title.split(" - ").next().unwrap_or(title);
    let head = head.split(':').next().unwrap_or(head);
    normalizer.normalize(head)
}

pub(crate) struct ChatExportSource<'a> {
    pub(crate) export: &'a ChatExport,
}

impl ChatExportSource<'_> {
    fn conversation_index<'c>(
        &'c self,
        normalizer: &Normalizer,
    ) -> HashMap<String, Vec<&'c Conversation>> {
        let mut index: HashMap<String, Vec<&Conversation>> = HashMap::new();
        for convo in &self.export.conversations {
            if let Some(name) = convo.name.as_deref()
                && !name.is_empty()
            {
                index
                    .entry(conversation_key(name, normalizer))
                    .or_default()
                    .push(convo);
            }
        }
        index
    }
}

impl ProjectSource for ChatExportSource<'_> {
    fn name(&self) -> &'static str {
        CHAT_SOURCE
    }

    fn records(&self, normalizer: &Normalizer) -> Vec<ProjectRecord> {
        let index = self.conversation_index(normalizer);

        self.export
            .projects
            .iter()
            .map(|project| {
                let name = project.name.clone().unwrap_or_else(|| UNTITLED.to_string());
                let matched = index
                    .get(&normalizer.normalize(&name))
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let messages: u64 = matched.iter().map(|c| c.message_count()).sum();
                let last = matched
                    .iter()
                    .filter_map(|c| c.updated_at.as_deref())
                    .max()
                    .unwrap_or("");

                ProjectRecord {
                    name,
                    description: project.description.clone().unwrap_or_default(),
                    status: "active".to_string(),
                    last_activity: project.updated_at.clone().unwrap_or_default(),
                    messages,
                    contribution: (messages > 0).then(|| {
                        SourceContribution::Chat(ChatContribution {
                            conversation_count: matched.len() as u64,
                            total_messages: messages,
                            last_conversation: day_prefix(last).to_string(),
                        })
                    }),
                    ..Default::default()
                }
            })
            .collect()
    }
}

/// Configured repositories. Any sighting marks a project featured.
pub(crate) struct RepoSource<'a> {
    pub(crate) repos: &'a [RepoRecord],
}

impl ProjectSource for RepoSource<'_> {
    fn name(&self) -> &'static str {
        REPO_SOURCE
    }

    fn featured(&self) -> bool {
        true
    }

    fn records(&self, _normalizer: &Normalizer) -> Vec<ProjectRecord> {
        self.repos
            .iter()
            .map(|repo| ProjectRecord {
                name: repo.name.clone(),
                tagline: repo.description.clone(),
                description: repo.description.clone(),
                status: "active".to_string(),
                last_activity: repo.pushed_at.clone(),
                contribution: Some(SourceContribution::Repo(RepoContribution {
                    repo: repo.full_name.clone(),
                    stars: repo.stars,
                    language: repo.language.clone(),
                    last_push: day_prefix(&repo.pushed_at).to_string(),
                })),
                ..Default::default()
            })
            .collect()
    }
}

/// Working directories from the pilot report's mission log.
pub(crate) struct MissionSource<'a> {
    pub(crate) missions: &'a [Mission],
}

impl ProjectSource for MissionSource<'_> {
    fn name(&self) -> &'static str {
        TELEMETRY_SOURCE
    }

    fn records(&self, _normalizer: &Normalizer) -> Vec<ProjectRecord> {
        self.missions
            .iter()
            .map(|mission| ProjectRecord {
                name: mission.name.clone(),
                status: mission.status.clone(),
                technologies: mission.technologies.clone(),
                last_activity: mission.last_active.clone(),
                messages: mission.messages,
                contribution: Some(SourceContribution::Telemetry(TelemetryContribution {
                    total_sessions: mission.sessions,
                    total_messages: mission.messages,
                    last_session: day_prefix(&mission.last_active).to_string(),
                })),
                ..Default::default()
            })
            .collect()
    }
}
