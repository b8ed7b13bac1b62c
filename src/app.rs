//! Pipeline stages and their orchestration
//!
//! Each stage returns the document it built so `run` can hand it to the
//! next stage without a round-trip through disk.

use chrono::{DateTime, Utc};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cli::{Commands, Stage};
use crate::config::PipelineConfig;
use crate::core::{CacheBuilder, StatsCacheSnapshot, aggregate_session, load_snapshot};
use crate::enrich::{
    CbaiClient, EnrichmentCache, enrich_projects, generate_claude_corner, generate_involvement,
};
use crate::error::AppError;
use crate::feed::build_activity_feed;
use crate::metrics::{PilotInputs, PilotReport, build_pilot_report};
use crate::output::{
    SiteSnapshot, build_site_snapshot, build_stats, pilot_summary, refresh_summary,
    site_summary, write_json,
};
use crate::projects::{
    ChatExportSource, MissionSource, Normalizer, ProjectRegistry, ProjectSource, RepoSource,
    merge_projects,
};
use crate::source::chat_export::read_chat_export;
use crate::source::events::{find_log_files, read_log_file};
use crate::source::evidence::{
    read_history, read_plan_files, read_project_docs, sample_tool_usage,
};
use crate::source::repos::{GhCli, collect_repos};
use crate::source::sessions::read_session_data;

const REPO_LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Where a stage writes its document, and whether it prints it instead.
struct Emit<'a> {
    config: &'a PipelineConfig,
    is_final: bool,
}

impl Emit<'_> {
    fn path(&self, default: &Path) -> PathBuf {
        match (&self.config.output, self.is_final) {
            (Some(output), true) => output.clone(),
            _ => default.to_path_buf(),
        }
    }

    /// In dry-run mode only the final document is printed; intermediate
    /// documents are neither printed nor written.
    fn write<T: serde::Serialize>(
        &self,
        value: &T,
        what: &'static str,
        default: &Path,
    ) -> Result<(), AppError> {
        if self.config.dry_run && !self.is_final {
            return Ok(());
        }
        write_json(value, what, &self.path(default), self.config.dry_run)
    }
}

/// Rebuild the stats cache from every session log, sub-agents included.
pub(crate) fn handle_refresh(config: &PipelineConfig) -> StatsCacheSnapshot {
    let start = Instant::now();
    let files = find_log_files(&config.projects_dir(), true);
    eprintln!("Scanning {} files...", files.len());

    let mut builder = CacheBuilder::default();
    let mut skipped = 0usize;
    for path in &files {
        let log = read_log_file(path);
        builder.add_speculation(log.speculation_ms);
        match aggregate_session(&log.session_id, &log.records, config.timezone) {
            Some(contribution) => builder.add_session(contribution),
            None => {
                skipped += 1;
                tracing::debug!("{} holds no conversation, not a session", log.path.display());
            }
        }
    }

    let snapshot = builder.build(config.timezone.today(Utc::now()));
    tracing::info!(
        "aggregated {} sessions ({skipped} files skipped) in {:.0}ms",
        snapshot.total_sessions,
        start.elapsed().as_secs_f64() * 1000.0
    );
    snapshot
}

/// Compute the pilot report. `stats` is the snapshot from a preceding
/// refresh; when absent the persisted one is read, or an empty one used.
pub(crate) fn handle_pilot(
    config: &PipelineConfig,
    stats: Option<StatsCacheSnapshot>,
    now: DateTime<Utc>,
) -> PilotReport {
    let stats = stats.unwrap_or_else(|| {
        load_snapshot(&config.stats_cache).unwrap_or_else(|| {
            tracing::warn!(
                "no stats cache at {}, run `pilotlog refresh` first",
                config.stats_cache.display()
            );
            StatsCacheSnapshot::default()
        })
    });

    let projects_dir = config.projects_dir();
    let tables = &config.tables;
    let sessions = read_session_data(&projects_dir, config.timezone);
    let plans = read_plan_files(&config.plans_dir());
    let docs = read_project_docs(&config.user_projects_dir, &projects_dir);
    let history = read_history(&config.history_file());
    let sample = sample_tool_usage(&projects_dir, tables, config.quick);
    tracing::info!(
        "evidence: {} sessions, {} plans, {} project docs",
        sessions.sessions.len(),
        plans.len(),
        docs.len()
    );

    build_pilot_report(&PilotInputs {
        stats: &stats,
        sessions: &sessions,
        plans: &plans,
        docs: &docs,
        sample: (!config.quick).then_some(&sample),
        history,
        tables,
        timezone: config.timezone,
        now,
    })
}

fn load_report(path: &Path) -> Option<PilotReport> {
    let file = File::open(path).ok()?;
    match serde_json::from_reader(file) {
        Ok(report) => Some(report),
        Err(err) => {
            tracing::warn!("failed to parse pilot report {}: {err}", path.display());
            None
        }
    }
}

/// Merge the project sources, enrich them and assemble the site snapshot.
pub(crate) fn handle_site(
    config: &PipelineConfig,
    report: Option<PilotReport>,
    now: DateTime<Utc>,
) -> Result<SiteSnapshot, AppError> {
    let report = report.unwrap_or_else(|| {
        load_report(&config.pilot_output).unwrap_or_else(|| {
            tracing::warn!(
                "no pilot report at {}, project telemetry will be empty",
                config.pilot_output.display()
            );
            PilotReport::default()
        })
    });

    let export = read_chat_export(&config.chat_export_dir);
    let repos = if config.skip_github {
        tracing::info!("skipping repository lookups");
        Vec::new()
    } else {
        collect_repos(&GhCli::new(REPO_LOOKUP_TIMEOUT), &config.featured_repos)
    };

    let normalizer = Normalizer::new(config.aliases.clone(), config.org_prefixes.clone());
    let chat = ChatExportSource { export: &export };
    let repo_source = RepoSource { repos: &repos };
    let missions = MissionSource {
        missions: &report.mission_log,
    };
    let sources: [&dyn ProjectSource; 3] = [&chat, &repo_source, &missions];
    let mut registry = ProjectRegistry::default();
    merge_projects(
        &mut registry,
        &sources,
        &normalizer,
        &config.research_projects,
        &config.tables,
    );
    tracing::info!("merged {} projects", registry.len());

    let client = if config.skip_ai {
        tracing::info!("skipping text generation");
        None
    } else {
        Some(CbaiClient::new(&config.enrich_url, &config.enrich_provider))
    };
    if let Some(client) = &client {
        let mut cache = if config.dry_run {
            EnrichmentCache::in_memory()
        } else {
            EnrichmentCache::load(&config.enrichment_cache)
        };
        tracing::debug!("enrichment cache holds {} entries", cache.len());
        enrich_projects(registry.entities_mut(), client, &mut cache, config.enrich_delay);
        generate_involvement(registry.entities_mut(), client, config.enrich_delay);
        cache.save()?;
    }

    let projects = registry.into_sorted();
    let feed = build_activity_feed(
        &projects,
        &export,
        &repos,
        &report.activity_heatmap,
        &normalizer,
    );
    let stats = build_stats(&projects, Some(&report));
    let corner = client
        .as_ref()
        .and_then(|client| generate_claude_corner(&projects, &stats, client, now));

    Ok(build_site_snapshot(
        now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        stats,
        feed,
        projects,
        corner,
    ))
}

/// Run the stages of `command` in order, threading each document forward.
pub(crate) fn run(command: Commands, config: &PipelineConfig) -> Result<(), AppError> {
    let stages = command.stages();
    let now = Utc::now();
    let mut stats = None;
    let mut report = None;

    for (i, stage) in stages.iter().enumerate() {
        let emit = Emit {
            config,
            is_final: i + 1 == stages.len(),
        };
        match stage {
            Stage::Refresh => {
                let snapshot = handle_refresh(config);
                emit.write(&snapshot, "stats cache", &config.stats_cache)?;
                eprintln!("{}", refresh_summary(&snapshot));
                stats = Some(snapshot);
            }
            Stage::Pilot => {
                let built = handle_pilot(config, stats.take(), now);
                emit.write(&built, "pilot report", &config.pilot_output)?;
                eprintln!("{}", pilot_summary(&built));
                report = Some(built);
            }
            Stage::Site => {
                let snapshot = handle_site(config, report.take(), now)?;
                emit.write(&snapshot, "site snapshot", &config.site_output)?;
                eprintln!("{}", site_summary(&snapshot));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::config::Config;
    use crate::projects::Category;
    use clap::Parser;
    use std::fs;

    fn pipeline(home: &Path, extra: &[&str]) -> PipelineConfig {
        let home_arg = home.display().to_string();
        let mut argv = vec!["pilotlog", "--claude-home", home_arg.as_str(), "--timezone", "UTC"];
        argv.extend_from_slice(extra);
        let cli = Cli::try_parse_from(argv).unwrap();
        let mut config = PipelineConfig::resolve(&cli, &Config::default(), |_| None).unwrap();
        config.user_projects_dir = home.join("no-user-projects");
        config.chat_export_dir = home.join("no-chat-export");
        config.pilot_output = home.join("out/ai-pilot-data.json");
        config.site_output = home.join("out/site-data.json");
        config
    }

    fn write_session(home: &Path) {
        let dir = home.join("projects/-home-dev-widget");
        fs::create_dir_all(&dir).unwrap();
        let lines = [
            r#"{"type":"user","sessionId":"s1","cwd":"/home/dev/widget","timestamp":"2026-03-02T10:00:00Z","message":{"role":"user","content":"add a rust parser"}}"#,
            r#"{"type":"assistant","sessionId":"s1","cwd":"/home/dev/widget","timestamp":"2026-03-02T10:05:00Z","message":{"role":"assistant","model":"claude-sonnet-4","content":[{"type":"text","text":"Done"}],"usage":{"input_tokens":100,"output_tokens":50}}}"#,
        ];
        fs::write(dir.join("s1.jsonl"), lines.join("\n")).unwrap();
    }

    #[test]
    fn refresh_counts_sessions() {
        let home = tempfile::tempdir().unwrap();
        write_session(home.path());
        fs::write(home.path().join("projects/-home-dev-widget/empty.jsonl"), "").unwrap();

        let snapshot = handle_refresh(&pipeline(home.path(), &[]));
        assert_eq!(snapshot.total_sessions, 1);
        assert_eq!(snapshot.total_messages, 2);
    }

    #[test]
    fn pilot_uses_threaded_snapshot() {
        let home = tempfile::tempdir().unwrap();
        write_session(home.path());
        let config = pipeline(home.path(), &["--quick"]);

        let stats = handle_refresh(&config);
        let report = handle_pilot(&config, Some(stats), Utc::now());
        assert_eq!(report.license.total_sessions, 1);
        assert_eq!(report.mission_log.len(), 1);
        assert_eq!(report.mission_log[0].name, "widget");
        assert!(report.skills_cloud.is_empty());
    }

    #[test]
    fn site_without_collaborators_keeps_telemetry_projects() {
        let home = tempfile::tempdir().unwrap();
        write_session(home.path());
        let config = pipeline(home.path(), &["--quick", "--skip-ai", "--skip-github"]);

        let report = handle_pilot(&config, Some(handle_refresh(&config)), Utc::now());
        let snapshot = handle_site(&config, Some(report), Utc::now()).unwrap();
        assert_eq!(snapshot.projects.len(), 1);
        assert_eq!(snapshot.projects[0].slug, "widget");
        assert!(snapshot.claude_corner.is_none());
        assert_eq!(snapshot.stats.total_messages, 2);
    }

    #[test]
    fn site_classifies_with_configured_tables() {
        let home = tempfile::tempdir().unwrap();
        write_session(home.path());
        let mut config = pipeline(home.path(), &["--quick", "--skip-ai", "--skip-github"]);
        config.tables.categories = vec![(Category::Creative, vec!["widget".to_string()])];

        let report = handle_pilot(&config, Some(handle_refresh(&config)), Utc::now());
        let snapshot = handle_site(&config, Some(report), Utc::now()).unwrap();
        assert_eq!(snapshot.projects[0].category, Category::Creative);
    }

    #[test]
    fn run_writes_every_stage_output() {
        let home = tempfile::tempdir().unwrap();
        write_session(home.path());
        let config = pipeline(home.path(), &["--quick", "--skip-ai", "--skip-github"]);

        run(Commands::Run, &config).unwrap();
        assert!(config.stats_cache.exists());
        assert!(config.pilot_output.exists());
        assert!(config.site_output.exists());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let home = tempfile::tempdir().unwrap();
        write_session(home.path());
        let config = pipeline(
            home.path(),
            &["--quick", "--skip-ai", "--skip-github", "--dry-run"],
        );

        run(Commands::Run, &config).unwrap();
        assert!(!config.stats_cache.exists());
        assert!(!config.pilot_output.exists());
        assert!(!config.site_output.exists());
    }
}
