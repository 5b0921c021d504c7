//! `stream-type-change` binary: settings file in, converted streams out.

use anyhow::Context;
use clap::Parser;
use sds_client::HttpSdsClient;
use std::path::PathBuf;
use stream_type_change::config::{AppSettings, MappingSource, DEFAULT_CONFIG_FILE};
use stream_type_change::confirm::{AutoApprove, ConsoleOperator, Operator};
use stream_type_change::logging::{self, LogLevel, LogSettings, DEFAULT_LOG_FILE};
use stream_type_change::workflow::{self, RunMode};

/// Change the type of SDS streams through stream views
#[derive(Debug, Parser)]
#[command(name = "stream-type-change", version, about)]
struct Cli {
    /// Settings file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// JSON object of existing type id -> stream view id; skips stream view generation
    #[arg(long)]
    mappings: Option<PathBuf>,

    /// Log file, appended to
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Log verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Answer yes to every prompt and exit non-zero on failure
    #[arg(long)]
    yes: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&LogSettings {
        file: cli.log_file.clone(),
        level: cli.log_level,
    }) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    tracing::info!("Starting Stream Type change sample");

    let (settings, source) = match load(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Error: {:#}", e);
            eprintln!("Error: {e:#}");
            tracing::info!("Stream Type change sample completed");
            std::process::exit(1);
        }
    };

    let mode = if cli.yes {
        RunMode::Automated
    } else {
        RunMode::Interactive
    };
    let mut operator: Box<dyn Operator> = match mode {
        RunMode::Automated => Box::new(AutoApprove),
        RunMode::Interactive => Box::new(ConsoleOperator::stdio()),
    };

    let result = execute(&settings, &source, operator.as_mut()).await;

    let failed = match result {
        Ok(()) => false,
        Err(e) => {
            tracing::error!("Encountered Error: {:#}", e);
            tracing::error!("{:?}", e);
            eprintln!("Encountered Error: {e:#}");
            true
        }
    };

    tracing::info!("Stream Type change sample completed");

    if failed && mode.surfaces_failure() {
        std::process::exit(1);
    }
}

fn load(cli: &Cli) -> anyhow::Result<(AppSettings, MappingSource)> {
    let settings = AppSettings::load(&cli.config)?;
    let source = MappingSource::resolve(&settings, cli.mappings.as_deref())?;
    Ok((settings, source))
}

async fn execute(
    settings: &AppSettings,
    source: &MappingSource,
    operator: &mut dyn Operator,
) -> anyhow::Result<()> {
    tracing::debug!("Authenticating to {}...", settings.resource);
    let client = HttpSdsClient::new(settings.connection()).context("could not create client")?;

    workflow::run(settings, source, &client, operator).await?;
    Ok(())
}
