//! Per-session aggregation
//!
//! Turns the conversational records of one log file into a `SessionRecord`
//! plus the dated contributions it makes to the stats cache.

use chrono::{DateTime, FixedOffset, Timelike};
use std::collections::{BTreeMap, HashMap};

use crate::consts::SYNTHETIC_MODEL;
use crate::core::types::{EventKind, EventRecord, ModelUsageRecord, SessionRecord};
use crate::utils::{Timezone, format_day, parse_timestamp};

/// Contributions that exist only when the session's first and last
/// timestamps both parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DatedContribution {
    /// Calendar day of the first timestamp
    pub(crate) date: String,
    /// Hour of day of the first timestamp
    pub(crate) hour: u32,
    pub(crate) tool_calls: u64,
    pub(crate) models: HashMap<String, ModelUsageRecord>,
    /// input + output tokens per model, only for models with a non-zero sum
    pub(crate) model_tokens: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SessionContribution {
    pub(crate) session: SessionRecord,
    pub(crate) dated: Option<DatedContribution>,
    /// Sum of per-message cost fields, by model
    pub(crate) recorded_cost: HashMap<String, f64>,
}

fn bounds(
    first: &str,
    last: &str,
    timezone: Timezone,
) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let first = parse_timestamp(first)?;
    let last = parse_timestamp(last)?;
    Some((timezone.apply(first), timezone.apply(last)))
}

/// Aggregate one session. Returns `None` when the file holds no
/// conversational records, so it does not count as a session.
///
/// Records are taken in file order: the first record opens the session and
/// the last one closes it.
pub(crate) fn aggregate_session(
    session_id: &str,
    records: &[EventRecord],
    timezone: Timezone,
) -> Option<SessionContribution> {
    let (first, last) = (records.first()?, records.last()?);

    let user_message_count = records
        .iter()
        .filter(|r| r.kind == EventKind::User)
        .count() as u64;
    let assistant_message_count = records.len() as u64 - user_message_count;
    let cwd = records
        .iter()
        .find_map(|r| r.cwd.as_deref().filter(|c| !c.is_empty()))
        .unwrap_or_default()
        .to_string();

    let mut session = SessionRecord {
        session_id: session_id.to_string(),
        cwd,
        first_timestamp: first.timestamp().to_string(),
        last_timestamp: last.timestamp().to_string(),
        message_count: records.len() as u64,
        user_message_count,
        assistant_message_count,
        duration_ms: 0,
        first_epoch_ms: None,
        last_epoch_ms: None,
    };

    let mut recorded_cost: HashMap<String, f64> = HashMap::new();
    for record in records.iter().filter(|r| r.kind == EventKind::Assistant) {
        if let (Some(cost), Some(model)) = (
            record.cost_usd,
            record.message.as_ref().and_then(|m| m.model.as_deref()),
        ) && !model.is_empty()
            && model != SYNTHETIC_MODEL
        {
            *recorded_cost.entry(model.to_string()).or_default() += cost;
        }
    }

    let Some((first_dt, last_dt)) =
        bounds(&session.first_timestamp, &session.last_timestamp, timezone)
    else {
        tracing::debug!("session {session_id}: unparsable timestamps, no dated data");
        return Some(SessionContribution {
            session,
            dated: None,
            recorded_cost,
        });
    };

    session.duration_ms = (last_dt - first_dt).num_milliseconds();
    session.first_epoch_ms = Some(first_dt.timestamp_millis());
    session.last_epoch_ms = Some(last_dt.timestamp_millis());

    let mut dated = DatedContribution {
        date: format_day(first_dt.date_naive()),
        hour: first_dt.hour(),
        ..DatedContribution::default()
    };

    for record in records.iter().filter(|r| r.kind == EventKind::Assistant) {
        dated.tool_calls += record.tool_uses().count() as u64;

        let Some(message) = record.message.as_ref() else {
            continue;
        };
        let (Some(model), Some(usage)) = (message.model.as_deref(), message.usage.as_ref()) else {
            continue;
        };
        if model.is_empty() || model == SYNTHETIC_MODEL || usage.is_empty() {
            continue;
        }

        dated
            .models
            .entry(model.to_string())
            .or_default()
            .add_usage(usage);

        let tokens = usage.input_tokens.unwrap_or(0) + usage.output_tokens.unwrap_or(0);
        if tokens > 0 {
            *dated.model_tokens.entry(model.to_string()).or_default() += tokens;
        }
    }

    Some(SessionContribution {
        session,
        dated: Some(dated),
        recorded_cost,
    })
}
