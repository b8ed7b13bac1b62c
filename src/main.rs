mod app;
mod cli;
mod config;
mod consts;
mod core;
mod enrich;
mod error;
mod feed;
mod metrics;
mod output;
mod projects;
mod source;
mod utils;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, resolve_command};
use config::{Config, PipelineConfig};
use error::AppError;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn try_main(cli: Cli) -> Result<(), AppError> {
    let config = Config::load(cli.config.as_deref())?;
    let cli = cli.with_config(&config);
    let command = resolve_command(cli.command);
    let pipeline = PipelineConfig::resolve(&cli, &config, |key| std::env::var(key).ok())?;
    app::run(command, &pipeline)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = try_main(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
