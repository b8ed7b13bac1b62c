//! CLI subcommand definitions

use clap::Subcommand;

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub(crate) enum Commands {
    /// Rebuild the stats cache from the session logs
    Refresh,
    /// Compute the pilot report from the stats cache and skill evidence
    Pilot,
    /// Merge projects, enrich them and write the site snapshot
    Site,
    /// Run refresh, pilot and site in order (default)
    Run,
}

impl Commands {
    /// Stages executed by this command, in order
    pub(crate) fn stages(self) -> &'static [Stage] {
        match self {
            Commands::Refresh => &[Stage::Refresh],
            Commands::Pilot => &[Stage::Pilot],
            Commands::Site => &[Stage::Site],
            Commands::Run => &[Stage::Refresh, Stage::Pilot, Stage::Site],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Refresh,
    Pilot,
    Site,
}

/// The command to run, `run` when none was given
pub(crate) fn resolve_command(cmd: Option<Commands>) -> Commands {
    cmd.unwrap_or(Commands::Run)
}
