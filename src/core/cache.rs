//! Stats cache construction and persistence
//!
//! `CacheBuilder` folds session contributions into the snapshot document.
//! Reading an existing snapshot checks its version; a mismatch or a parse
//! failure falls back to nothing.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;

use crate::consts::STATS_CACHE_VERSION;
use crate::core::aggregator::SessionContribution;
use crate::core::types::{
    DailyActivityBucket, DailyModelTokens, LongestSession, ModelUsageRecord, StatsCacheSnapshot,
};
use crate::utils::format_day;

#[derive(Debug, Default)]
pub(crate) struct CacheBuilder {
    daily_activity: HashMap<String, DailyActivityBucket>,
    daily_model_tokens: HashMap<String, BTreeMap<String, i64>>,
    model_usage: HashMap<String, ModelUsageRecord>,
    hour_counts: BTreeMap<u32, u64>,
    total_sessions: u64,
    total_messages: u64,
    total_speculation_ms: i64,
    longest_session: Option<LongestSession>,
    first_session_date: Option<String>,
}

impl CacheBuilder {
    pub(crate) fn add_speculation(&mut self, ms: i64) {
        self.total_speculation_ms += ms;
    }

    pub(crate) fn add_session(&mut self, contribution: SessionContribution) {
        let SessionContribution { session, dated, .. } = contribution;

        self.total_sessions += 1;
        self.total_messages += session.message_count;

        let Some(dated) = dated else {
            return;
        };

        let day = self
            .daily_activity
            .entry(dated.date.clone())
            .or_insert_with(|| DailyActivityBucket {
                date: dated.date.clone(),
                ..DailyActivityBucket::default()
            });
        day.message_count += session.message_count;
        day.session_count += 1;
        day.tool_call_count += dated.tool_calls;

        *self.hour_counts.entry(dated.hour).or_default() += 1;

        if self
            .first_session_date
            .as_ref()
            .is_none_or(|current| session.first_timestamp < *current)
        {
            self.first_session_date = Some(session.first_timestamp.clone());
        }

        // Ties keep the earlier session.
        if self
            .longest_session
            .as_ref()
            .is_none_or(|longest| session.duration_ms > longest.duration)
        {
            self.longest_session = Some(LongestSession {
                session_id: session.session_id.clone(),
                duration: session.duration_ms,
                message_count: session.message_count,
                timestamp: session.first_timestamp.clone(),
            });
        }

        for (model, usage) in &dated.models {
            self.model_usage.entry(model.clone()).or_default().add(usage);
        }

        let tokens = self.daily_model_tokens.entry(dated.date).or_default();
        for (model, count) in dated.model_tokens {
            *tokens.entry(model).or_default() += count;
        }
    }

    pub(crate) fn build(self, today: NaiveDate) -> StatsCacheSnapshot {
        let mut daily_activity: Vec<DailyActivityBucket> =
            self.daily_activity.into_values().collect();
        daily_activity.sort_by(|a, b| a.date.cmp(&b.date));

        let mut daily_model_tokens: Vec<DailyModelTokens> = self
            .daily_model_tokens
            .into_iter()
            .filter(|(_, models)| !models.is_empty())
            .map(|(date, tokens_by_model)| DailyModelTokens {
                date,
                tokens_by_model,
            })
            .collect();
        daily_model_tokens.sort_by(|a, b| a.date.cmp(&b.date));

        StatsCacheSnapshot {
            version: STATS_CACHE_VERSION,
            last_computed_date: format_day(today),
            daily_activity,
            daily_model_tokens,
            model_usage: self.model_usage.into_iter().collect(),
            total_sessions: self.total_sessions,
            total_messages: self.total_messages,
            longest_session: self.longest_session,
            first_session_date: self.first_session_date,
            hour_counts: self
                .hour_counts
                .into_iter()
                .map(|(h, c)| (h.to_string(), c))
                .collect(),
            total_speculation_time_saved_ms: self.total_speculation_ms,
        }
    }
}

/// Read a previously written snapshot. Missing, unreadable or
/// version-mismatched documents yield `None`.
pub(crate) fn load_snapshot(path: &Path) -> Option<StatsCacheSnapshot> {
    let file = File::open(path).ok()?;
    match serde_json::from_reader::<_, StatsCacheSnapshot>(file) {
        Ok(snapshot) if snapshot.version == STATS_CACHE_VERSION => Some(snapshot),
        Ok(snapshot) => {
            tracing::warn!(
                "ignoring stats cache {} with version {} (expected {STATS_CACHE_VERSION})",
                path.display(),
                snapshot.version
            );
            None
        }
        Err(err) => {
            tracing::warn!("failed to parse stats cache {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::aggregate_session;
    use crate::core::types::EventRecord;
    use crate::utils::Timezone;

    fn contribution(id: &str, lines: &[&str]) -> SessionContribution {
        let records: Vec<EventRecord> = lines
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        aggregate_session(id, &records, Timezone::Named(chrono_tz::UTC)).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()
    }

    #[test]
    fn empty_builder_is_zeroed_snapshot() {
        let snap = CacheBuilder::default().build(today());
        assert_eq!(snap.version, STATS_CACHE_VERSION);
        assert_eq!(snap.last_computed_date, "2026-01-10");
        assert_eq!(snap.total_sessions, 0);
        assert!(snap.longest_session.is_none());
        assert!(snap.first_session_date.is_none());
    }

    #[test]
    fn folds_sessions_into_buckets() {
        let mut b = CacheBuilder::default();
        b.add_session(contribution(
            "a",
            &[
                r#"{"type":"user","timestamp":"2026-01-02T09:00:00Z"}"#,
                r#"{"type":"assistant","timestamp":"2026-01-02T09:10:00Z","message":{"model":"m","usage":{"input_tokens":3,"output_tokens":4},"content":[{"type":"tool_use","name":"Edit"}]}}"#,
            ],
        ));
        b.add_session(contribution(
            "b",
            &[
                r#"{"type":"user","timestamp":"2026-01-01T09:30:00Z"}"#,
                r#"{"type":"assistant","timestamp":"2026-01-01T09:40:00Z","message":{"model":"m","usage":{"input_tokens":1,"output_tokens":1}}}"#,
            ],
        ));
        b.add_speculation(500);

        let snap = b.build(today());
        assert_eq!(snap.total_sessions, 2);
        assert_eq!(snap.total_messages, 4);
        assert_eq!(snap.daily_activity.len(), 2);
        assert_eq!(snap.daily_activity[0].date, "2026-01-01");
        assert_eq!(snap.daily_activity[1].tool_call_count, 1);
        assert_eq!(snap.hour_counts["9"], 2);
        assert_eq!(snap.model_usage["m"].input_tokens, 4);
        assert_eq!(snap.daily_model_tokens[1].tokens_by_model["m"], 7);
        assert_eq!(
            snap.first_session_date.as_deref(),
            Some("2026-01-01T09:30:00Z")
        );
        assert_eq!(snap.total_speculation_time_saved_ms, 500);
    }

    #[test]
    fn longest_session_ties_keep_first() {
        let mut b = CacheBuilder::default();
        for id in ["first", "second"] {
            b.add_session(contribution(
                id,
                &[
                    r#"{"type":"user","timestamp":"2026-01-01T09:00:00Z"}"#,
                    r#"{"type":"user","timestamp":"2026-01-01T10:00:00Z"}"#,
                ],
            ));
        }
        let longest = b.build(today()).longest_session.unwrap();
        assert_eq!(longest.session_id, "first");
        assert_eq!(longest.duration, 3_600_000);
    }

    #[test]
    fn undated_session_counts_in_totals_only() {
        let mut b = CacheBuilder::default();
        b.add_session(contribution(
            "x",
            &[r#"{"type":"user","timestamp":"nope"}"#],
        ));
        let snap = b.build(today());
        assert_eq!(snap.total_sessions, 1);
        assert_eq!(snap.total_messages, 1);
        assert!(snap.daily_activity.is_empty());
        assert!(snap.hour_counts.is_empty());
    }

    #[test]
    fn load_rejects_version_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats-cache.json");
        std::fs::write(&path, r#"{"version":1,"totalSessions":5}"#).unwrap();
        assert!(load_snapshot(&path).is_none());

        std::fs::write(&path, r#"{"version":2,"totalSessions":5}"#).unwrap();
        assert_eq!(load_snapshot(&path).unwrap().total_sessions, 5);

        assert!(load_snapshot(&dir.path().join("missing.json")).is_none());
    }
}
