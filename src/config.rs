use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::error::AppError;
use crate::metrics::KeywordTables;
use crate::utils::Timezone;

const DEFAULT_CBAI_URL: &str = "https://ai.nominate.ai";
const DEFAULT_CBAI_PROVIDER: &str = "ollama";
const DEFAULT_DELAY_SECS: u64 = 2;
const DEFAULT_FEATURED_REPOS: &[&str] = &[
    "tinymachines/esp32",
    "Sysforge-AI/sfproject",
    "tinymachines/sovereign",
    "tinymachines/hotbits",
];
const DEFAULT_RESEARCH: &[&str] = &["hotbits", "sovereign", "zephyr", "spondr", "addai"];
const DEFAULT_ALIASES: &[(&str, &str)] =
    &[("esp", "esp32"), ("sfproject", "sysforge"), ("sf", "sysforge")];
const DEFAULT_ORG_PREFIXES: &[&str] = &["tinymachines", "sysforge-ai"];

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EnrichmentConfig {
    #[serde(default)]
    pub(crate) url: Option<String>,
    #[serde(default)]
    pub(crate) provider: Option<String>,
    #[serde(default)]
    pub(crate) delay_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) quick: bool,
    #[serde(default)]
    pub(crate) skip_ai: bool,
    #[serde(default)]
    pub(crate) skip_github: bool,
    #[serde(default)]
    pub(crate) timezone: Option<String>,
    #[serde(default)]
    pub(crate) claude_home: Option<PathBuf>,
    #[serde(default)]
    pub(crate) chat_export_dir: Option<PathBuf>,
    #[serde(default)]
    pub(crate) user_projects_dir: Option<PathBuf>,
    #[serde(default)]
    pub(crate) stats_cache: Option<PathBuf>,
    #[serde(default)]
    pub(crate) pilot_output: Option<PathBuf>,
    #[serde(default)]
    pub(crate) site_output: Option<PathBuf>,
    #[serde(default)]
    pub(crate) enrichment_cache: Option<PathBuf>,
    #[serde(default)]
    pub(crate) aliases: Option<HashMap<String, String>>,
    #[serde(default)]
    pub(crate) org_prefixes: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) research_projects: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) featured_repos: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) enrichment: EnrichmentConfig,
}

impl Config {
    /// Load `explicit` when given, otherwise the first parseable file on the
    /// search path. An explicit file that can't be read or parsed is fatal.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        for path in Self::get_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::read(&path) {
                Ok(config) => {
                    tracing::info!("loaded config from {}", path.display());
                    return Ok(config);
                }
                Err(e) => tracing::warn!("{e}"),
            }
        }

        Ok(Self::default())
    }

    fn read(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| AppError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str::<Config>(&content).map_err(|e| AppError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/pilotlog/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("pilotlog").join("config.toml"));
        }

        // 2. Platform config dir (Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("pilotlog").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.pilotlog.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".pilotlog.toml"));
        }

        paths
    }
}

/// Settings for one pipeline run, resolved once and passed to every stage.
#[derive(Debug, Clone)]
pub(crate) struct PipelineConfig {
    pub(crate) claude_home: PathBuf,
    pub(crate) stats_cache: PathBuf,
    pub(crate) user_projects_dir: PathBuf,
    pub(crate) chat_export_dir: PathBuf,
    pub(crate) pilot_output: PathBuf,
    pub(crate) site_output: PathBuf,
    pub(crate) enrichment_cache: PathBuf,
    pub(crate) aliases: HashMap<String, String>,
    pub(crate) org_prefixes: Vec<String>,
    pub(crate) research_projects: BTreeSet<String>,
    pub(crate) featured_repos: Vec<String>,
    pub(crate) enrich_url: String,
    pub(crate) enrich_provider: String,
    pub(crate) enrich_delay: Duration,
    pub(crate) timezone: Timezone,
    pub(crate) tables: KeywordTables,
    pub(crate) quick: bool,
    pub(crate) dry_run: bool,
    pub(crate) skip_ai: bool,
    pub(crate) skip_github: bool,
    pub(crate) output: Option<PathBuf>,
}

impl PipelineConfig {
    /// Precedence: CLI flag, then environment, then config file, then default.
    /// Flags shared with the config file are expected to be merged into `cli`
    /// by `Cli::with_config` beforehand.
    pub(crate) fn resolve(
        cli: &Cli,
        config: &Config,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let claude_home = cli
            .claude_home
            .clone()
            .or_else(|| env("CLAUDE_HOME").map(PathBuf::from))
            .or_else(|| config.claude_home.clone())
            .unwrap_or_else(|| home.join(".claude"));
        let chat_export_dir = env("CLAUDE_WEB_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| config.chat_export_dir.clone())
            .unwrap_or_else(|| PathBuf::from("docs").join("claude-web"));
        let enrichment_cache = config.enrichment_cache.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|d| d.join("pilotlog").join("enrichment-cache.json"))
                .unwrap_or_else(|| PathBuf::from(".summary-cache.json"))
        });

        let aliases = match env("PROJECT_ALIASES") {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("ignoring invalid PROJECT_ALIASES: {e}");
                HashMap::new()
            }),
            None => config.aliases.clone().unwrap_or_else(|| {
                DEFAULT_ALIASES
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            }),
        };

        Ok(Self {
            stats_cache: config
                .stats_cache
                .clone()
                .unwrap_or_else(|| claude_home.join("stats-cache.json")),
            user_projects_dir: config
                .user_projects_dir
                .clone()
                .unwrap_or_else(|| home.join("projects")),
            pilot_output: config
                .pilot_output
                .clone()
                .unwrap_or_else(|| Path::new("public/data/ai-pilot-data.json").to_path_buf()),
            site_output: config
                .site_output
                .clone()
                .unwrap_or_else(|| Path::new("public/data/site-data.json").to_path_buf()),
            claude_home,
            chat_export_dir,
            enrichment_cache,
            aliases,
            org_prefixes: config
                .org_prefixes
                .clone()
                .unwrap_or_else(|| owned(DEFAULT_ORG_PREFIXES)),
            research_projects: list_setting(
                env("RESEARCH_PROJECTS"),
                config.research_projects.as_deref(),
                DEFAULT_RESEARCH,
            )
            .into_iter()
            .collect(),
            featured_repos: list_setting(
                env("FEATURED_REPOS"),
                config.featured_repos.as_deref(),
                DEFAULT_FEATURED_REPOS,
            ),
            enrich_url: env("CBAI_URL")
                .or_else(|| config.enrichment.url.clone())
                .unwrap_or_else(|| DEFAULT_CBAI_URL.to_string()),
            enrich_provider: env("CBAI_PROVIDER")
                .or_else(|| config.enrichment.provider.clone())
                .unwrap_or_else(|| DEFAULT_CBAI_PROVIDER.to_string()),
            enrich_delay: Duration::from_secs(
                config.enrichment.delay_secs.unwrap_or(DEFAULT_DELAY_SECS),
            ),
            timezone: Timezone::parse(cli.timezone.as_deref())?,
            tables: KeywordTables::default(),
            quick: cli.quick,
            dry_run: cli.dry_run,
            skip_ai: cli.skip_ai,
            skip_github: cli.skip_github,
            output: cli.output.clone(),
        })
    }

    pub(crate) fn projects_dir(&self) -> PathBuf {
        self.claude_home.join("projects")
    }

    pub(crate) fn plans_dir(&self) -> PathBuf {
        self.claude_home.join("plans")
    }

    pub(crate) fn history_file(&self) -> PathBuf {
        self.claude_home.join("history.jsonl")
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// A comma-separated env value wins over the config list, which wins over
/// the built-in default.
fn list_setting(env: Option<String>, config: Option<&[String]>, default: &[&str]) -> Vec<String> {
    match (env, config) {
        (Some(raw), _) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        (None, Some(values)) => values.to_vec(),
        (None, None) => owned(default),
    }
}
