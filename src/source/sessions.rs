//! Session, project and model rollups over the top-level session logs

use std::collections::HashMap;
use std::path::Path;

use crate::consts::SYNTHETIC_MODEL;
use crate::core::{EventKind, SessionRecord, aggregate_session};
use crate::source::events::read_logs;
use crate::utils::Timezone;

/// Sessions grouped by working directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ProjectRollup {
    pub(crate) cwd: String,
    pub(crate) sessions: u64,
    pub(crate) messages: u64,
    pub(crate) first_active_ms: Option<i64>,
    pub(crate) last_active_ms: Option<i64>,
}

/// Assistant activity per model. `recorded_cost` sums the per-message cost
/// fields, a second opinion next to the stats cache's cost figure.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ModelRollup {
    pub(crate) model: String,
    pub(crate) message_count: u64,
    pub(crate) recorded_cost: f64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SessionData {
    pub(crate) sessions: Vec<SessionRecord>,
    /// Ordered by message count, busiest first
    pub(crate) projects: Vec<ProjectRollup>,
    pub(crate) models: Vec<ModelRollup>,
}

impl SessionData {
    pub(crate) fn recorded_cost(&self, model: &str) -> f64 {
        self.models
            .iter()
            .find(|m| m.model == model)
            .map_or(0.0, |m| m.recorded_cost)
    }
}

pub(crate) fn read_session_data(projects_dir: &Path, timezone: Timezone) -> SessionData {
    let mut sessions = Vec::new();
    let mut projects: HashMap<String, ProjectRollup> = HashMap::new();
    let mut models: HashMap<String, ModelRollup> = HashMap::new();

    for log in read_logs(projects_dir, false) {
        let Some(contribution) = aggregate_session(&log.session_id, &log.records, timezone)
        else {
            continue;
        };
        let session = contribution.session;

        if !session.cwd.is_empty() {
            let p = projects
                .entry(session.cwd.clone())
                .or_insert_with(|| ProjectRollup {
                    cwd: session.cwd.clone(),
                    ..ProjectRollup::default()
                });
            p.sessions += 1;
            p.messages += session.message_count;
            if let Some(first) = session.first_epoch_ms
                && p.first_active_ms.is_none_or(|cur| first < cur)
            {
                p.first_active_ms = Some(first);
            }
            if let Some(last) = session.last_epoch_ms
                && p.last_active_ms.is_none_or(|cur| last > cur)
            {
                p.last_active_ms = Some(last);
            }
        }

        for record in log.records.iter().filter(|r| r.kind == EventKind::Assistant) {
            let Some(model) = record.message.as_ref().and_then(|m| m.model.as_deref()) else {
                continue;
            };
            if model.is_empty() || model == SYNTHETIC_MODEL {
                continue;
            }
            models
                .entry(model.to_string())
                .or_insert_with(|| ModelRollup {
                    model: model.to_string(),
                    ..ModelRollup::default()
                })
                .message_count += 1;
        }
        for (model, cost) in contribution.recorded_cost {
            models
                .entry(model.clone())
                .or_insert_with(|| ModelRollup {
                    model,
                    ..ModelRollup::default()
                })
                .recorded_cost += cost;
        }

        sessions.push(session);
    }

    let mut projects: Vec<ProjectRollup> = projects.into_values().collect();
    projects.sort_by(|a, b| b.messages.cmp(&a.messages).then_with(|| a.cwd.cmp(&b.cwd)));
    let mut models: Vec<ModelRollup> = models.into_values().collect();
    models.sort_by(|a, b| a.model.cmp(&b.model));

    tracing::info!(
        "parsed {} sessions, {} projects, {} models",
        sessions.len(),
        projects.len(),
        models.len()
    );
    SessionData {
        sessions,
        projects,
        models,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, lines: &[&str]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, lines.join("\n")).unwrap();
    }

    #[test]
    fn rolls_up_projects_and_models() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("p1/a.jsonl"),
            &[
                r#"{"type":"user","cwd":"/w/app","timestamp":"2026-01-01T10:00:00Z"}"#,
                r#"{"type":"assistant","timestamp":"2026-01-01T10:01:00Z","costUSD":0.5,"message":{"model":"claude-opus-4-6"}}"#,
            ],
        );
        write(
            &root.join("p1/b.jsonl"),
            &[
                r#"{"type":"user","cwd":"/w/app","timestamp":"2026-01-03T10:00:00Z"}"#,
                r#"{"type":"assistant","timestamp":"2026-01-03T10:01:00Z","message":{"model":"<synthetic>"}}"#,
                r#"{"type":"assistant","timestamp":"2026-01-03T10:02:00Z","message":{"model":"claude-opus-4-6"}}"#,
            ],
        );
        write(
            &root.join("p2/c.jsonl"),
            &[r#"{"type":"user","timestamp":"2026-01-02T10:00:00Z"}"#],
        );
        // sub-agent transcripts are not part of the rollup
        write(
            &root.join("p1/a/subagents/agent-1.jsonl"),
            &[r#"{"type":"user","cwd":"/w/app","timestamp":"2026-01-01T10:00:00Z"}"#],
        );

        let data = read_session_data(root, Timezone::Named(chrono_tz::UTC));
        assert_eq!(data.sessions.len(), 3);
        assert_eq!(data.projects.len(), 1);

        let app = &data.projects[0];
        assert_eq!(app.sessions, 2);
        assert_eq!(app.messages, 5);
        assert_eq!(app.first_active_ms, Some(1_767_261_600_000));
        assert!(app.last_active_ms > app.first_active_ms);

        assert_eq!(data.models.len(), 1);
        assert_eq!(data.models[0].message_count, 2);
        assert!((data.recorded_cost("claude-opus-4-6") - 0.5).abs() < 1e-9);
        assert_eq!(data.recorded_cost("missing"), 0.0);
    }

    #[test]
    fn missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = read_session_data(&dir.path().join("none"), Timezone::Recorded);
        assert!(data.sessions.is_empty());
        assert!(data.projects.is_empty());
    }
}
