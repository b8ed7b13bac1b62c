//! Skill evidence: plan documents, per-project instruction files, the
//! command history and a sample of session transcripts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::consts::{SAMPLE_FILE_CAP, UNKNOWN};
use crate::core::{EventKind, EventRecord, MessageContent};
use crate::metrics::keywords::KeywordTables;
use crate::source::events::{find_project_dirs, for_each_line};

const PROJECT_DOC: &str = "CLAUDE.md";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanFile {
    pub(crate) name: String,
    pub(crate) size: usize,
    pub(crate) content_lower: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ProjectDoc {
    pub(crate) project: String,
    pub(crate) size: usize,
    pub(crate) content_lower: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct HistoryStats {
    pub(crate) project_switches: u64,
    pub(crate) total_commands: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ToolSample {
    pub(crate) tool_counts: BTreeMap<String, u64>,
    pub(crate) tech_mentions: BTreeMap<String, u64>,
    pub(crate) files_sampled: usize,
}

impl ToolSample {
    pub(crate) fn tool(&self, name: &str) -> u64 {
        self.tool_counts.get(name).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> u64 {
        self.tool_counts.values().sum()
    }
}

fn read_lossy(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            tracing::debug!("failed to read {}: {err}", path.display());
            None
        }
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Every `*.md` plan in `plans_dir`, ordered by file name.
pub(crate) fn read_plan_files(plans_dir: &Path) -> Vec<PlanFile> {
    let pattern = format!("{}/*.md", glob::Pattern::escape(&plans_dir.display().to_string()));
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .map(|entries| entries.flatten().collect())
        .unwrap_or_default();
    paths.sort();

    let plans: Vec<PlanFile> = paths
        .iter()
        .filter_map(|path| {
            let content = read_lossy(path)?;
            Some(PlanFile {
                name: path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(UNKNOWN)
                    .to_string(),
                size: content.chars().count(),
                content_lower: content.to_lowercase(),
            })
        })
        .collect();
    tracing::debug!("read {} plan files", plans.len());
    plans
}

/// Instruction files from `<user_projects>/*/CLAUDE.md`, then from each
/// session-log project directory.
pub(crate) fn read_project_docs(user_projects: &Path, log_projects: &Path) -> Vec<ProjectDoc> {
    let mut docs = Vec::new();
    for root in [user_projects, log_projects] {
        for dir in find_project_dirs(root) {
            let path = dir.join(PROJECT_DOC);
            if !path.is_file() {
                continue;
            }
            if let Some(content) = read_lossy(&path) {
                docs.push(ProjectDoc {
                    project: dir_name(&dir),
                    size: content.chars().count(),
                    content_lower: content.to_lowercase(),
                });
            }
        }
    }
    tracing::debug!("read {} project instruction files", docs.len());
    docs
}

/// Count user commands and working-directory switches in the history log.
pub(crate) fn read_history(history_file: &Path) -> HistoryStats {
    let mut stats = HistoryStats::default();
    let mut last_cwd: Option<String> = None;

    for_each_line(history_file, |_, line| {
        let Ok(entry) = serde_json::from_str::<EventRecord>(line) else {
            return;
        };
        if entry.kind != EventKind::User {
            return;
        }
        stats.total_commands += 1;
        if let Some(cwd) = entry.cwd.filter(|c| !c.is_empty())
            && last_cwd.as_deref() != Some(cwd.as_str())
        {
            stats.project_switches += 1;
            last_cwd = Some(cwd);
        }
    });

    tracing::debug!(
        "history: {} commands, {} project switches",
        stats.total_commands,
        stats.project_switches
    );
    stats
}

fn modified(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// The oldest and newest session log of every project directory, capped.
pub(crate) fn sample_files(projects_dir: &Path) -> Vec<PathBuf> {
    let mut sample = Vec::new();
    for dir in find_project_dirs(projects_dir) {
        let pattern = format!("{}/*.jsonl", glob::Pattern::escape(&dir.display().to_string()));
        let mut files: Vec<(SystemTime, PathBuf)> = glob::glob(&pattern)
            .map(|entries| entries.flatten().map(|p| (modified(&p), p)).collect())
            .unwrap_or_default();
        files.sort();

        match files.len() {
            0 => {}
            1 => sample.push(files.swap_remove(0).1),
            n => {
                let newest = files.swap_remove(n - 1).1;
                sample.push(files.swap_remove(0).1);
                sample.push(newest);
            }
        }
    }
    sample.truncate(SAMPLE_FILE_CAP);
    sample
}

fn count_techs(text: &str, tables: &KeywordTables, mentions: &mut BTreeMap<String, u64>) {
    let lower = text.to_lowercase();
    for tech in tables.techs_in(&lower) {
        *mentions.entry(tech.name.clone()).or_default() += 1;
    }
}

/// Tool invocations and technology mentions across a sample of sessions.
/// Quick mode skips the scan and reports an empty sample.
pub(crate) fn sample_tool_usage(
    projects_dir: &Path,
    tables: &KeywordTables,
    quick: bool,
) -> ToolSample {
    let mut sample = ToolSample::default();
    if quick {
        tracing::info!("quick mode: skipping transcript sampling");
        return sample;
    }

    for path in sample_files(projects_dir) {
        for_each_line(&path, |_, line| {
            let Ok(record) = serde_json::from_str::<EventRecord>(line) else {
                return;
            };
            match record.kind {
                EventKind::Assistant => {
                    for block in record.blocks() {
                        if let Some(name) = block.tool_name() {
                            let name = if name.is_empty() { UNKNOWN } else { name };
                            *sample.tool_counts.entry(name.to_string()).or_default() += 1;
                        }
                        if let Some(text) = block.text() {
                            count_techs(text, tables, &mut sample.tech_mentions);
                        }
                    }
                }
                EventKind::User => {
                    if let Some(MessageContent::Text(text)) =
                        record.message.as_ref().map(|m| &m.content)
                    {
                        count_techs(text, tables, &mut sample.tech_mentions);
                    }
                }
                _ => {}
            }
        });
        sample.files_sampled += 1;
    }

    tracing::debug!(
        "sampled {} files: {} tools, {} technologies",
        sample.files_sampled,
        sample.tool_counts.len(),
        sample.tech_mentions.len()
    );
    sample
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn plans_are_sorted_and_lowercased() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("b-plan.md"), "Use DuckDB");
        write(&dir.path().join("a-plan.md"), "Ship It");
        write(&dir.path().join("notes.txt"), "ignored");

        let plans = read_plan_files(dir.path());
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].name, "a-plan");
        assert_eq!(plans[1].content_lower, "use duckdb");
        assert_eq!(plans[1].size, 10);
    }

    #[test]
    fn project_docs_from_both_roots() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("projects");
        let logs = dir.path().join("claude/projects");
        write(&user.join("radio/CLAUDE.md"), "LoRa mesh");
        write(&user.join("nodoc/README.md"), "x");
        write(&logs.join("-home-me-radio/CLAUDE.md"), "Rust");

        let docs = read_project_docs(&user, &logs);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].project, "radio");
        assert_eq!(docs[0].content_lower, "lora mesh");
        assert_eq!(docs[1].project, "-home-me-radio");
    }

    #[test]
    fn history_counts_switches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        write(
            &path,
            concat!(
                "{\"type\":\"user\",\"cwd\":\"/a\"}\n",
                "{\"type\":\"user\",\"cwd\":\"/a\"}\n",
                "{\"type\":\"assistant\",\"cwd\":\"/b\"}\n",
                "{\"type\":\"user\",\"cwd\":\"/b\"}\n",
                "{\"type\":\"user\"}\n",
                "{\"type\":\"user\",\"cwd\":\"/a\"}\n",
                "broken\n",
            ),
        );
        let h = read_history(&path);
        assert_eq!(h.total_commands, 5);
        assert_eq!(h.project_switches, 3);
    }

    #[test]
    fn missing_history_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            read_history(&dir.path().join("none.jsonl")),
            HistoryStats::default()
        );
    }

    #[test]
    fn sample_counts_tools_and_techs() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("p/s.jsonl"),
            concat!(
                "{\"type\":\"assistant\",\"message\":{\"content\":[{\"type\":\"tool_use\",\"name\":\"Bash\"},{\"type\":\"tool_use\",\"name\":\"Bash\"},{\"type\":\"text\",\"text\":\"Deploy with Docker\"}]}}\n",
                "{\"type\":\"user\",\"message\":{\"content\":\"port it to rust\"}}\n",
                "{\"type\":\"user\",\"message\":{\"content\":[{\"type\":\"text\",\"text\":\"python\"}]}}\n",
            ),
        );
        let tables = KeywordTables::default();
        let sample = sample_tool_usage(dir.path(), &tables, false);
        assert_eq!(sample.files_sampled, 1);
        assert_eq!(sample.tool("Bash"), 2);
        assert_eq!(sample.total_calls(), 2);
        assert_eq!(sample.tech_mentions.get("Docker"), Some(&1));
        assert_eq!(sample.tech_mentions.get("Rust"), Some(&1));
        assert_eq!(sample.tech_mentions.get("Python"), None);

        let quick = sample_tool_usage(dir.path(), &tables, true);
        assert_eq!(quick, ToolSample::default());
    }

    #[test]
    fn sample_takes_oldest_and_newest_per_project() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a", "b", "c"] {
            write(&dir.path().join(format!("p/{name}.jsonl")), "");
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        write(&dir.path().join("q/only.jsonl"), "");

        let files = sample_files(dir.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_stem().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a", "c", "only"]);
    }
}
