//! Generated project copy, co-developer notes and the site commentary
//!
//! Every call goes through the `Enricher` collaborator. A failed call is
//! logged and leaves the project as it was.

mod cache;
mod client;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::EnrichError;
use crate::output::{SiteStats, format_number};
use crate::projects::ProjectEntity;

pub(crate) use cache::{Enrichment, EnrichmentCache, cache_key};
pub(crate) use client::{CbaiClient, Enricher};

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]+\}").expect("valid object regex"));

/// Descriptions at or below this many characters are worth replacing.
const SHORT_DESCRIPTION: usize = 50;
const MIN_INVOLVEMENT_CHARS: usize = 20;
const PROMPT_TECHS: usize = 5;
const PROMPT_DESCRIPTION_CHARS: usize = 200;
const CORNER_PROJECTS: usize = 5;

const COPY_TOKENS: u32 = 300;
const INVOLVEMENT_TOKENS: u32 = 200;
const CORNER_TOKENS: u32 = 400;

const MOODS: [&str; 5] = ["excited", "reflective", "impressed", "curious", "amused"];
const DEFAULT_MOOD: &str = "impressed";

/// The first flat `{...}` object in a reply, decoded.
pub(crate) fn extract_object<T: DeserializeOwned>(content: &str) -> Result<T, EnrichError> {
    let found = JSON_OBJECT.find(content).ok_or(EnrichError::NoPayload)?;
    serde_json::from_str(found.as_str()).map_err(|err| EnrichError::Decode(err.to_string()))
}

fn needs_description(project: &ProjectEntity) -> bool {
    project.description.is_empty() || project.description.chars().count() < SHORT_DESCRIPTION
}

fn apply(project: &mut ProjectEntity, copy: &Enrichment) {
    if project.tagline.is_empty() {
        project.tagline = copy.tagline.clone().unwrap_or_default();
    }
    if needs_description(project)
        && let Some(description) = &copy.description
    {
        project.description = description.clone();
    }
}

fn prompt_techs(project: &ProjectEntity) -> String {
    let techs: Vec<&str> = project
        .technologies
        .iter()
        .take(PROMPT_TECHS)
        .map(String::as_str)
        .collect();
    techs.join(", ")
}

fn prompt_description(project: &ProjectEntity) -> String {
    if project.description.is_empty() {
        "none".to_string()
    } else {
        project
            .description
            .chars()
            .take(PROMPT_DESCRIPTION_CHARS)
            .collect()
    }
}

fn copy_prompt(project: &ProjectEntity) -> String {
    format!(
        "Generate a short tagline (under 80 chars) and a 2-3 sentence description \
         for a technical project called '{}'. Category: {}. Technologies: {}. \
         Existing description: {}. \
         Return JSON: {{\"tagline\": \"...\", \"description\": \"...\"}}",
        project.name,
        project.category.id(),
        prompt_techs(project),
        prompt_description(project),
    )
}

/// Fill missing taglines and short descriptions, from the cache when the
/// project is unchanged and from the service otherwise.
pub(crate) fn enrich_projects(
    projects: &mut [ProjectEntity],
    enricher: &dyn Enricher,
    cache: &mut EnrichmentCache,
    delay: Duration,
) {
    let mut generated = 0;
    for project in projects.iter_mut() {
        let key = cache_key(project);
        if let Some(cached) = cache.get(&key) {
            apply(project, cached);
            continue;
        }
        if !project.tagline.is_empty() && project.description.chars().count() > SHORT_DESCRIPTION {
            continue;
        }

        tracing::debug!("enriching {}", project.name);
        let reply = match enricher.complete(&copy_prompt(project), COPY_TOKENS) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!("enrichment failed for {}: {err}", project.name);
                continue;
            }
        };
        match extract_object::<Enrichment>(&reply) {
            Ok(copy) => {
                apply(project, &copy);
                cache.insert(key, copy);
                generated += 1;
            }
            Err(err) => tracing::warn!("enrichment failed for {}: {err}", project.name),
        }
        std::thread::sleep(delay);
    }
    tracing::info!("enriched {generated} projects");
}

fn involvement_prompt(project: &ProjectEntity) -> String {
    format!(
        "You are Claude, an AI co-developer. In 2-3 sentences, describe your involvement \
         in the project '{}'. Category: {}. Technologies: {}. Description: {}. \
         Messages: {}. Write in first person. Be specific about what you helped with. \
         Return only the text, no JSON.",
        project.name,
        project.category.id(),
        prompt_techs(project),
        prompt_description(project),
        project.total_messages,
    )
}

/// Write a first-person co-developer note for featured, active projects
/// that don't have one yet.
pub(crate) fn generate_involvement(
    projects: &mut [ProjectEntity],
    enricher: &dyn Enricher,
    delay: Duration,
) {
    for project in projects
        .iter_mut()
        .filter(|p| p.is_featured && p.status == "active" && p.claude_involvement.is_none())
    {
        tracing::debug!("generating involvement note for {}", project.name);
        match enricher.complete(&involvement_prompt(project), INVOLVEMENT_TOKENS) {
            Ok(reply) => {
                let text = reply.trim();
                if text.chars().count() > MIN_INVOLVEMENT_CHARS {
                    project.claude_involvement = Some(text.to_string());
                }
                std::thread::sleep(delay);
            }
            Err(err) => tracing::warn!("involvement note failed for {}: {err}", project.name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ClaudeCorner {
    pub(crate) quote: String,
    pub(crate) context: String,
    pub(crate) mood: String,
    pub(crate) generated_at: String,
}

/// A short commentary on recent work for the site's front page.
pub(crate) fn generate_claude_corner(
    projects: &[ProjectEntity],
    stats: &SiteStats,
    enricher: &dyn Enricher,
    now: DateTime<Utc>,
) -> Option<ClaudeCorner> {
    let active: Vec<&str> = projects
        .iter()
        .filter(|p| p.status == "active")
        .take(CORNER_PROJECTS)
        .map(|p| p.name.as_str())
        .collect();
    let prompt = format!(
        "You are Claude, an AI co-developer. Write a witty 2-3 sentence commentary about \
         the developer's recent work. Stats: {} projects, {} messages, {}-day streak. \
         Top active projects: {}. Pick a mood from: {}. \
         Return JSON: {{\"quote\": \"...\", \"context\": \"...\", \"mood\": \"...\"}}",
        stats.total_projects,
        format_number(stats.total_messages),
        stats.streak,
        active.join(", "),
        MOODS.join(", "),
    );

    let corner = enricher
        .complete(&prompt, CORNER_TOKENS)
        .and_then(|reply| extract_object::<ClaudeCorner>(&reply));
    match corner {
        Ok(mut corner) => {
            if !MOODS.contains(&corner.mood.as_str()) {
                corner.mood = DEFAULT_MOOD.to_string();
            }
            corner.generated_at = now.to_rfc3339_opts(SecondsFormat::Secs, true);
            tracing::info!("commentary generated, mood={}", corner.mood);
            Some(corner)
        }
        Err(err) => {
            tracing::warn!("commentary generation failed: {err}");
            None
        }
    }
}
