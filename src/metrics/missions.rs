//! Mission log: the busiest working directories as project records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::UNKNOWN;
use crate::metrics::keywords::KeywordTables;
use crate::source::evidence::ProjectDoc;
use crate::source::sessions::ProjectRollup;
use crate::utils::{Timezone, format_day};

const CANDIDATES: usize = 30;
const MISSIONS_SHOWN: usize = 20;
const TECHS_SHOWN: usize = 8;
const DOMAIN_MIN_HITS: usize = 3;
const DAY_MS: i64 = 86_400_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Mission {
    pub(crate) name: String,
    pub(crate) sessions: u64,
    pub(crate) messages: u64,
    pub(crate) complexity: u32,
    pub(crate) domain: String,
    pub(crate) technologies: Vec<String>,
    pub(crate) status: String,
    pub(crate) first_active: String,
    pub(crate) last_active: String,
}

/// Recency bucket of the last activity relative to `now`.
pub(crate) fn mission_status(last_active_ms: Option<i64>, now: DateTime<Utc>) -> &'static str {
    let Some(last) = last_active_ms else {
        return UNKNOWN;
    };
    let days_ago = (now.timestamp_millis() - last).div_euclid(DAY_MS);
    if days_ago <= 7 {
        "active"
    } else if days_ago <= 30 {
        "recent"
    } else {
        "archived"
    }
}

fn project_name(cwd: &str) -> &str {
    cwd.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN)
}

fn matching_doc<'a>(name: &str, docs: &'a [ProjectDoc]) -> Option<&'a ProjectDoc> {
    let name = name.to_lowercase();
    docs.iter().find(|doc| {
        let project = doc.project.to_lowercase();
        project.contains(&name) || name.contains(&project)
    })
}

pub(crate) fn compute_mission_log(
    projects: &[ProjectRollup],
    docs: &[ProjectDoc],
    tables: &KeywordTables,
    timezone: Timezone,
    now: DateTime<Utc>,
) -> Vec<Mission> {
    let day = |ms: Option<i64>| {
        ms.and_then(|ms| timezone.from_epoch_ms(ms))
            .map(|dt| format_day(dt.date_naive()))
            .unwrap_or_default()
    };

    let mut missions: Vec<Mission> = projects
        .iter()
        .take(CANDIDATES)
        .map(|project| {
            let name = project_name(&project.cwd);
            let mut technologies = Vec::new();
            let mut domain = "General".to_string();

            if let Some(doc) = matching_doc(name, docs) {
                technologies = tables
                    .techs_in(&doc.content_lower)
                    .map(|t| t.name.clone())
                    .collect();
                if let Some(d) = tables
                    .domains
                    .iter()
                    .find(|d| d.presence(&doc.content_lower) >= DOMAIN_MIN_HITS)
                {
                    domain = d.name.clone();
                }
            }
            technologies.truncate(TECHS_SHOWN);

            Mission {
                name: name.to_string(),
                sessions: project.sessions,
                messages: project.messages,
                complexity: ((project.messages as f64 + 1.0).log2() as u32).min(10),
                domain,
                technologies,
                status: mission_status(project.last_active_ms, now).to_string(),
                first_active: day(project.first_active_ms),
                last_active: day(project.last_active_ms),
            }
        })
        .collect();

    missions.sort_by(|a, b| b.messages.cmp(&a.messages));
    missions.truncate(MISSIONS_SHOWN);
    missions
}
