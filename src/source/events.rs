//! Session log discovery and tolerant JSONL reading
//!
//! Logs live under `<claude_home>/projects/<project>/<session>.jsonl`, with
//! delegated sub-agent transcripts under
//! `<project>/<session>/subagents/agent-*.jsonl`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::consts::UNKNOWN;
use crate::core::{EventKind, EventRecord};

/// One parsed log file. `records` keeps only conversational records in file
/// order; speculation savings are summed separately.
#[derive(Debug, Default)]
pub(crate) struct LogFile {
    pub(crate) path: PathBuf,
    pub(crate) session_id: String,
    pub(crate) records: Vec<EventRecord>,
    pub(crate) speculation_ms: i64,
}

fn glob_sorted(pattern: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match glob::glob(pattern) {
        Ok(entries) => entries.flatten().collect(),
        Err(err) => {
            tracing::debug!("invalid glob pattern {pattern}: {err}");
            Vec::new()
        }
    };
    files.sort();
    files
}

/// Every session log under `projects_dir`. Sub-agent transcripts are
/// included when `include_subagents` is set.
pub(crate) fn find_log_files(projects_dir: &Path, include_subagents: bool) -> Vec<PathBuf> {
    if !projects_dir.is_dir() {
        tracing::debug!("no projects directory at {}", projects_dir.display());
        return Vec::new();
    }
    let root = glob::Pattern::escape(&projects_dir.display().to_string());

    let mut files = glob_sorted(&format!("{root}/*/*.jsonl"));
    if include_subagents {
        files.extend(glob_sorted(&format!("{root}/*/*/subagents/agent-*.jsonl")));
    }
    files
}

/// Session log files grouped by their project directory.
pub(crate) fn find_project_dirs(projects_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(projects_dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

pub(crate) fn session_id_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Visit every non-blank line of a file as lossily decoded UTF-8.
pub(crate) fn for_each_line(path: &Path, mut visit: impl FnMut(usize, &str)) {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(err) => {
            tracing::debug!("failed to open {}: {err}", path.display());
            return;
        }
    };
    let reader = BufReader::new(file);

    for (line_no, chunk) in reader.split(b'\n').enumerate() {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(
                    "failed to read line {} in {}: {err}",
                    line_no + 1,
                    path.display()
                );
                break;
            }
        };
        let line = String::from_utf8_lossy(&bytes);
        if line.trim().is_empty() {
            continue;
        }
        visit(line_no + 1, &line);
    }
}

pub(crate) fn read_log_file(path: &Path) -> LogFile {
    let mut log = LogFile {
        path: path.to_path_buf(),
        session_id: session_id_for(path),
        ..LogFile::default()
    };

    for_each_line(path, |line_no, line| {
        let record: EventRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!("invalid JSON at {}:{line_no}: {err}", path.display());
                return;
            }
        };
        if record.kind == EventKind::SpeculationAccept {
            log.speculation_ms += record.time_saved_ms.unwrap_or(0);
            return;
        }
        if record.is_conversational() {
            log.records.push(record);
        }
    });

    log
}

/// Lazily read every log under `projects_dir`, one file at a time.
pub(crate) fn read_logs(
    projects_dir: &Path,
    include_subagents: bool,
) -> impl Iterator<Item = LogFile> {
    find_log_files(projects_dir, include_subagents)
        .into_iter()
        .map(|path| read_log_file(&path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn finds_sessions_and_subagents() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("proj-a/s1.jsonl"), "");
        write(&root.join("proj-a/s1/subagents/agent-1.jsonl"), "");
        write(&root.join("proj-a/s1/subagents/other.jsonl"), "");
        write(&root.join("proj-b/s2.jsonl"), "");
        write(&root.join("stray.jsonl"), "");

        let all = find_log_files(root, true);
        let names: Vec<String> = all.iter().map(|p| session_id_for(p)).collect();
        assert_eq!(names, vec!["s1", "s2", "agent-1"]);

        let top = find_log_files(root, false);
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_log_files(&dir.path().join("nope"), true).is_empty());
    }

    #[test]
    fn read_skips_invalid_and_filters_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p/sess.jsonl");
        write(
            &path,
            concat!(
                "{\"type\":\"user\",\"timestamp\":\"2026-01-01T10:00:00Z\"}\n",
                "not json\n",
                "\n",
                "{\"type\":\"assistant\",\"isSidechain\":true}\n",
                "{\"type\":\"speculation-accept\",\"timeSavedMs\":250}\n",
                "{\"type\":\"speculation-accept\",\"timeSavedMs\":750}\n",
                "{\"type\":\"summary\"}\n",
                "{\"type\":\"assistant\",\"timestamp\":\"2026-01-01T10:01:00Z\"}\n",
            ),
        );

        let log = read_log_file(&path);
        assert_eq!(log.session_id, "sess");
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.speculation_ms, 1000);
    }

    #[test]
    fn invalid_utf8_line_is_kept_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p/s.jsonl");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut bytes = b"{\"type\":\"user\",\"cwd\":\"/a\xff\"}\n".to_vec();
        bytes.extend_from_slice(b"{\"type\":\"user\"}\n");
        fs::write(&path, bytes).unwrap();

        let log = read_log_file(&path);
        assert_eq!(log.records.len(), 2);
    }
}
