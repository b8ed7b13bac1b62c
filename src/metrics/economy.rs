//! License card, per-model type ratings and the token economy
//!
//! Cost can come from two places: the stats cache and per-message cost
//! fields in the session logs. For each model the larger figure wins, and
//! totals sum those per-model figures.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::StatsCacheSnapshot;
use crate::metrics::domain::{round1, round2};
use crate::source::sessions::SessionData;

const DAILY_TOKEN_WINDOW: usize = 30;

const MODEL_NAMES: &[(&str, &str)] = &[
    ("claude-opus-4-6", "Opus 4.6"),
    ("claude-opus-4-5-20251101", "Opus 4.5"),
    ("claude-sonnet-4-5-20250929", "Sonnet 4.5"),
    ("claude-sonnet-4-20250514", "Sonnet 4"),
    ("claude-haiku-3-5-20241022", "Haiku 3.5"),
    ("claude-3-7-sonnet-20250219", "Sonnet 3.7"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum LicenseClass {
    #[serde(rename = "ATP")]
    Atp,
    Commercial,
    Private,
    #[default]
    Student,
}

impl LicenseClass {
    pub(crate) fn for_messages(total_messages: u64) -> Self {
        match total_messages {
            m if m > 300_000 => LicenseClass::Atp,
            m if m > 100_000 => LicenseClass::Commercial,
            m if m > 10_000 => LicenseClass::Private,
            _ => LicenseClass::Student,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            LicenseClass::Atp => "ATP",
            LicenseClass::Commercial => "Commercial",
            LicenseClass::Private => "Private",
            LicenseClass::Student => "Student",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct License {
    pub(crate) number: String,
    pub(crate) class: LicenseClass,
    pub(crate) issued: String,
    pub(crate) expires: String,
    pub(crate) total_sessions: u64,
    pub(crate) total_messages: u64,
    #[serde(rename = "totalCostUSD")]
    pub(crate) total_cost_usd: f64,
    pub(crate) total_input_tokens: i64,
    pub(crate) total_output_tokens: i64,
    pub(crate) total_cache_tokens: i64,
    pub(crate) model_count: usize,
    pub(crate) project_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Proficiency {
    Expert,
    Proficient,
    Familiar,
    #[default]
    Exposure,
}

impl Proficiency {
    pub(crate) fn for_share(share: f64) -> Self {
        if share > 50.0 {
            Proficiency::Expert
        } else if share > 20.0 {
            Proficiency::Proficient
        } else if share > 5.0 {
            Proficiency::Familiar
        } else {
            Proficiency::Exposure
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct TypeRating {
    pub(crate) model_id: String,
    pub(crate) display_name: String,
    pub(crate) input_tokens: i64,
    pub(crate) output_tokens: i64,
    pub(crate) cache_read_tokens: i64,
    pub(crate) cache_creation_tokens: i64,
    /// Stats-cache cost, or the session-log cost when the cache reports zero
    #[serde(rename = "costUSD")]
    pub(crate) cost_usd: f64,
    #[serde(rename = "effectiveCostUSD")]
    pub(crate) effective_cost_usd: f64,
    pub(crate) cost_share: f64,
    pub(crate) proficiency: Proficiency,
    pub(crate) context_window: i64,
    pub(crate) max_output_tokens: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DailyTokens {
    pub(crate) date: String,
    pub(crate) tokens: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct TokenEconomy {
    pub(crate) total_input_tokens: i64,
    pub(crate) total_output_tokens: i64,
    pub(crate) total_cache_read_tokens: i64,
    pub(crate) total_cache_create_tokens: i64,
    #[serde(rename = "totalCostUSD")]
    pub(crate) total_cost_usd: f64,
    pub(crate) cache_efficiency: f64,
    pub(crate) cost_per_session: f64,
    pub(crate) web_searches: i64,
    pub(crate) daily_tokens: Vec<DailyTokens>,
}

/// Human-readable model name. Unknown ids fall back to their second
/// dash-separated segment, capitalized.
pub(crate) fn display_name(model_id: &str) -> String {
    if let Some((_, name)) = MODEL_NAMES.iter().find(|(id, _)| *id == model_id) {
        return (*name).to_string();
    }
    match model_id.split('-').nth(1) {
        Some(segment) => {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        }
        None => model_id.to_string(),
    }
}

fn is_synthetic(model_id: &str) -> bool {
    model_id.contains('<') || model_id.to_lowercase().contains("synthetic")
}

/// Cost of one model: the larger of the two sources, never their sum.
fn model_cost(stats: &StatsCacheSnapshot, sessions: &SessionData, model: &str) -> f64 {
    let cached = stats.model_usage.get(model).map_or(0.0, |u| u.cost_usd);
    cached.max(sessions.recorded_cost(model))
}

/// Total cost over every model either source knows about.
pub(crate) fn total_cost(stats: &StatsCacheSnapshot, sessions: &SessionData) -> f64 {
    let models: BTreeSet<&str> = stats
        .model_usage
        .keys()
        .map(String::as_str)
        .chain(sessions.models.iter().map(|m| m.model.as_str()))
        .collect();
    models
        .into_iter()
        .map(|m| model_cost(stats, sessions, m))
        .sum()
}

pub(crate) fn compute_license(
    stats: &StatsCacheSnapshot,
    sessions: &SessionData,
    now: DateTime<Utc>,
) -> License {
    let usage = stats.model_usage.values();
    License {
        number: format!("AIP-{}-{:04}", now.year(), stats.total_sessions),
        class: LicenseClass::for_messages(stats.total_messages),
        issued: stats
            .first_session_date
            .as_deref()
            .and_then(|d| d.get(..10).or(Some(d)))
            .unwrap_or("")
            .to_string(),
        expires: "NEVER".to_string(),
        total_sessions: stats.total_sessions,
        total_messages: stats.total_messages,
        total_cost_usd: round2(total_cost(stats, sessions)),
        total_input_tokens: usage.clone().map(|u| u.input_tokens).sum(),
        total_output_tokens: usage.clone().map(|u| u.output_tokens).sum(),
        total_cache_tokens: usage.map(|u| u.cache_read_input_tokens).sum(),
        model_count: stats.model_usage.len(),
        project_count: sessions.projects.len(),
    }
}

/// Per-model ratings ordered by output-token share, largest first.
pub(crate) fn compute_type_ratings(
    stats: &StatsCacheSnapshot,
    sessions: &SessionData,
) -> Vec<TypeRating> {
    let total_output: i64 = stats.model_usage.values().map(|u| u.output_tokens).sum();
    let mut ratings = Vec::new();

    for (model_id, usage) in &stats.model_usage {
        if usage.input_tokens == 0 && usage.output_tokens == 0 {
            continue;
        }
        if is_synthetic(model_id) {
            continue;
        }
        let share = if total_output > 0 {
            usage.output_tokens as f64 / total_output as f64 * 100.0
        } else {
            0.0
        };
        let recorded = sessions.recorded_cost(model_id);
        ratings.push(TypeRating {
            model_id: model_id.clone(),
            display_name: display_name(model_id),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cache_read_tokens: usage.cache_read_input_tokens,
            cache_creation_tokens: usage.cache_creation_input_tokens,
            cost_usd: round2(if usage.cost_usd != 0.0 {
                usage.cost_usd
            } else {
                recorded
            }),
            effective_cost_usd: round2(model_cost(stats, sessions, model_id)),
            cost_share: round1(share),
            proficiency: Proficiency::for_share(share),
            context_window: usage.context_window,
            max_output_tokens: usage.max_output_tokens,
        });
    }

    // Models seen only in the session logs
    for m in &sessions.models {
        if stats.model_usage.contains_key(&m.model) || is_synthetic(&m.model) {
            continue;
        }
        if m.message_count == 0 {
            continue;
        }
        let display_name = MODEL_NAMES
            .iter()
            .find(|(id, _)| *id == m.model)
            .map_or_else(|| m.model.clone(), |(_, name)| (*name).to_string());
        ratings.push(TypeRating {
            model_id: m.model.clone(),
            display_name,
            cost_usd: round2(m.recorded_cost),
            effective_cost_usd: round2(m.recorded_cost),
            proficiency: if m.recorded_cost > 50.0 {
                Proficiency::Familiar
            } else {
                Proficiency::Exposure
            },
            ..TypeRating::default()
        });
    }

    ratings.sort_by(|a, b| b.cost_share.total_cmp(&a.cost_share));
    ratings
}

pub(crate) fn compute_token_economy(
    stats: &StatsCacheSnapshot,
    sessions: &SessionData,
) -> TokenEconomy {
    let usage = stats.model_usage.values();
    let input: i64 = usage.clone().map(|u| u.input_tokens).sum();
    let cache_read: i64 = usage.clone().map(|u| u.cache_read_input_tokens).sum();
    let cache_create: i64 = usage.clone().map(|u| u.cache_creation_input_tokens).sum();
    let cost = total_cost(stats, sessions);

    let skip = stats.daily_model_tokens.len().saturating_sub(DAILY_TOKEN_WINDOW);
    let daily_tokens = stats.daily_model_tokens[skip..]
        .iter()
        .map(|day| DailyTokens {
            date: day.date.clone(),
            tokens: day.tokens_by_model.values().sum(),
        })
        .collect();

    TokenEconomy {
        total_input_tokens: input,
        total_output_tokens: usage.clone().map(|u| u.output_tokens).sum(),
        total_cache_read_tokens: cache_read,
        total_cache_create_tokens: cache_create,
        total_cost_usd: round2(cost),
        cache_efficiency: round1(
            cache_read as f64 / (input + cache_read + cache_create).max(1) as f64 * 100.0,
        ),
        cost_per_session: round2(cost / stats.total_sessions.max(1) as f64),
        web_searches: usage.map(|u| u.web_search_requests).sum(),
        daily_tokens,
    }
}
