//! Derived metrics over the stats cache and the skill evidence
//!
//! Every section of the pilot report is computed by one function in a
//! submodule; `build_pilot_report` wires them together.

mod category;
mod competency;
mod domain;
mod economy;
mod heatmap;
pub(crate) mod keywords;
mod missions;
mod skills;
mod streaks;
mod style;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::consts::PIPELINE_VERSION;
use crate::core::StatsCacheSnapshot;
use crate::source::evidence::{HistoryStats, PlanFile, ProjectDoc, ToolSample};
use crate::source::sessions::SessionData;
use crate::utils::Timezone;

pub(crate) use category::classify_category;
pub(crate) use competency::{CompetencyAxis, CompetencyInputs, compute_competency_radar};
pub(crate) use domain::{InstrumentRating, compute_instrument_ratings, evidence_text};
pub(crate) use economy::{
    License, TokenEconomy, TypeRating, compute_license, compute_token_economy,
    compute_type_ratings,
};
pub(crate) use heatmap::{
    HeatmapDay, HourlyDistribution, compute_activity_heatmap, compute_hourly_distribution,
};
pub(crate) use keywords::KeywordTables;
pub(crate) use missions::{Mission, compute_mission_log};
pub(crate) use skills::{Skill, compute_skills_cloud};
pub(crate) use streaks::{Streaks, compute_streaks};
pub(crate) use style::{PilotingStyle, compute_piloting_style};

/// The pilot report document (`ai-pilot-data.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PilotReport {
    pub(crate) generated: String,
    pub(crate) pipeline_version: String,
    pub(crate) license: License,
    pub(crate) type_ratings: Vec<TypeRating>,
    pub(crate) activity_heatmap: Vec<HeatmapDay>,
    pub(crate) hourly_distribution: HourlyDistribution,
    pub(crate) instrument_ratings: BTreeMap<String, InstrumentRating>,
    pub(crate) competency_radar: Vec<CompetencyAxis>,
    pub(crate) piloting_style: PilotingStyle,
    pub(crate) mission_log: Vec<Mission>,
    pub(crate) token_economy: TokenEconomy,
    pub(crate) streaks: Streaks,
    pub(crate) skills_cloud: Vec<Skill>,
}

/// Everything the pilot report is computed from. `sample` is `None` in
/// quick mode.
pub(crate) struct PilotInputs<'a> {
    pub(crate) stats: &'a StatsCacheSnapshot,
    pub(crate) sessions: &'a SessionData,
    pub(crate) plans: &'a [PlanFile],
    pub(crate) docs: &'a [ProjectDoc],
    pub(crate) sample: Option<&'a ToolSample>,
    pub(crate) history: HistoryStats,
    pub(crate) tables: &'a KeywordTables,
    pub(crate) timezone: Timezone,
    pub(crate) now: DateTime<Utc>,
}

pub(crate) fn build_pilot_report(inputs: &PilotInputs<'_>) -> PilotReport {
    let empty = ToolSample::default();
    let sample = inputs.sample.unwrap_or(&empty);
    let stats = inputs.stats;
    let sessions = inputs.sessions;

    let evidence = evidence_text(inputs.plans, inputs.docs, sample);
    let competency = CompetencyInputs {
        plan_count: inputs.plans.len(),
        sample: inputs.sample,
        total_messages: stats.total_messages,
        total_sessions: stats.total_sessions,
        project_count: sessions.projects.len(),
        project_switches: inputs.history.project_switches,
    };

    PilotReport {
        generated: inputs.now.to_rfc3339_opts(SecondsFormat::Secs, true),
        pipeline_version: PIPELINE_VERSION.to_string(),
        license: compute_license(stats, sessions, inputs.now),
        type_ratings: compute_type_ratings(stats, sessions),
        activity_heatmap: compute_activity_heatmap(&stats.daily_activity),
        hourly_distribution: compute_hourly_distribution(&stats.hours()),
        instrument_ratings: compute_instrument_ratings(&evidence, inputs.tables),
        competency_radar: compute_competency_radar(&competency),
        piloting_style: compute_piloting_style(
            sample,
            inputs.plans.len(),
            stats.total_sessions,
        ),
        mission_log: compute_mission_log(
            &sessions.projects,
            inputs.docs,
            inputs.tables,
            inputs.timezone,
            inputs.now,
        ),
        token_economy: compute_token_economy(stats, sessions),
        streaks: compute_streaks(&stats.daily_activity, inputs.timezone.today(inputs.now)),
        skills_cloud: compute_skills_cloud(sample, inputs.docs, inputs.tables),
    }
}
