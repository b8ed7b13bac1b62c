//! Hosted repository metadata via the `gh` CLI

use serde::Deserialize;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::RepoError;

const GH_FIELDS: &str = "name,description,url,pushedAt,stargazerCount,primaryLanguage,isPrivate";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RepoRecord {
    /// `owner/name` as configured
    pub(crate) full_name: String,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) url: String,
    pub(crate) pushed_at: String,
    pub(crate) stars: u64,
    pub(crate) language: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhRepo {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    pushed_at: Option<String>,
    #[serde(default)]
    stargazer_count: Option<u64>,
    #[serde(default)]
    primary_language: Option<GhLanguage>,
}

#[derive(Debug, Deserialize)]
struct GhLanguage {
    #[serde(default)]
    name: Option<String>,
}

pub(crate) trait RepoLister {
    fn lookup(&self, full_name: &str) -> Result<RepoRecord, RepoError>;
}

pub(crate) fn parse_repo(full_name: &str, json: &str) -> Result<RepoRecord, RepoError> {
    let raw: GhRepo = serde_json::from_str(json).map_err(|e| RepoError::Decode {
        repo: full_name.to_string(),
        message: e.to_string(),
    })?;
    Ok(RepoRecord {
        full_name: full_name.to_string(),
        name: raw.name.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        url: raw.url.unwrap_or_default(),
        pushed_at: raw.pushed_at.unwrap_or_default(),
        stars: raw.stargazer_count.unwrap_or(0),
        language: raw
            .primary_language
            .and_then(|l| l.name)
            .unwrap_or_default(),
    })
}

/// Looks repositories up with `gh repo view`.
#[derive(Debug, Clone)]
pub(crate) struct GhCli {
    timeout: Duration,
}

impl GhCli {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl RepoLister for GhCli {
    fn lookup(&self, full_name: &str) -> Result<RepoRecord, RepoError> {
        let mut child = Command::new("gh")
            .args(["repo", "view", full_name, "--json", GH_FIELDS])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RepoError::NotFound
                } else {
                    RepoError::Spawn(e)
                }
            })?;

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait().map_err(RepoError::Spawn)? {
                Some(_) => break,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RepoError::Timeout(self.timeout.as_secs()));
                }
                None => std::thread::sleep(Duration::from_millis(50)),
            }
        }

        let output = child.wait_with_output().map_err(RepoError::Spawn)?;
        if output.status.success() {
            parse_repo(full_name, &String::from_utf8_lossy(&output.stdout))
        } else {
            Err(RepoError::Lookup {
                repo: full_name.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Look up every configured repository, skipping blanks and failures.
pub(crate) fn collect_repos(lister: &dyn RepoLister, specs: &[String]) -> Vec<RepoRecord> {
    let mut repos = Vec::new();
    for spec in specs.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        match lister.lookup(spec) {
            Ok(repo) => {
                tracing::debug!("fetched repository {spec}");
                repos.push(repo);
            }
            Err(RepoError::NotFound) => {
                tracing::warn!("{}", RepoError::NotFound);
                break;
            }
            Err(err) => tracing::warn!("skipping repository {spec}: {err}"),
        }
    }
    repos
}
