//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

use super::commands::Commands;

#[derive(Debug, Parser)]
#[command(name = "pilotlog")]
#[command(
    about = "Coding-assistant session analytics and project portfolio pipeline",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Print the resulting JSON to stdout instead of writing files
    #[arg(long, global = true)]
    pub(crate) dry_run: bool,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    /// Skip transcript sampling for tool and technology counts
    #[arg(short, long, global = true)]
    pub(crate) quick: bool,

    /// Output file for the final stage
    #[arg(short, long, global = true, value_name = "PATH")]
    pub(crate) output: Option<PathBuf>,

    /// Assistant home directory (default: ~/.claude)
    #[arg(long, global = true, value_name = "DIR")]
    pub(crate) claude_home: Option<PathBuf>,

    /// Config file to use instead of the default search paths
    #[arg(long, global = true, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    /// Skip all text-generation calls
    #[arg(long, global = true)]
    pub(crate) skip_ai: bool,

    /// Skip repository lookups
    #[arg(long, global = true)]
    pub(crate) skip_github: bool,

    /// Timezone for date bucketing (e.g. "UTC", "local", "Europe/Berlin")
    #[arg(long, global = true, value_name = "TZ")]
    pub(crate) timezone: Option<String>,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        // Boolean flags: config only applies if CLI left them off
        if !self.quick && config.quick {
            self.quick = true;
        }
        if !self.skip_ai && config.skip_ai {
            self.skip_ai = true;
        }
        if !self.skip_github && config.skip_github {
            self.skip_github = true;
        }

        if self.timezone.is_none() {
            self.timezone = config.timezone.clone();
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pilotlog",
            "site",
            "--dry-run",
            "--skip-ai",
            "-o",
            "out.json",
            "--timezone",
            "UTC",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Commands::Site));
        assert!(cli.dry_run);
        assert!(cli.skip_ai);
        assert!(!cli.skip_github);
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert_eq!(cli.timezone.as_deref(), Some("UTC"));
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["pilotlog", "-v", "-q"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(cli.verbose);
        assert!(cli.quick);
    }

    #[test]
    fn cli_values_win_over_config() {
        let config = Config {
            quick: true,
            timezone: Some("Europe/Berlin".into()),
            ..Default::default()
        };
        let cli = Cli::try_parse_from(["pilotlog", "--timezone", "UTC"])
            .unwrap()
            .with_config(&config);
        assert!(cli.quick);
        assert_eq!(cli.timezone.as_deref(), Some("UTC"));
        assert!(cli.claude_home.is_none());
    }
}
