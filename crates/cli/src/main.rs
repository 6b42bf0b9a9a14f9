//! Bill Book verification CLI - Main Entry Point
//!
//! Runs headless-browser verification scenarios against a running Bill Book
//! instance and reports the results.

use std::path::PathBuf;
use std::process::ExitCode;

use billbook_verify::HarnessConfig;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{list, probe, run, script};

/// Bill Book UI verification
#[derive(Parser)]
#[command(name = "billbook-verify")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Harness configuration file (TOML); defaults apply when absent
    #[arg(
        long,
        env = "BILLBOOK_VERIFY_CONFIG",
        default_value = "billbook-verify.toml",
        global = true
    )]
    config: PathBuf,

    /// Base URL of the application under test
    #[arg(long, env = "BILLBOOK_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Directory screenshots and results are written to
    #[arg(long, env = "BILLBOOK_OUTPUT_DIR", global = true)]
    output_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run verification scenarios
    Run(run::RunArgs),

    /// List available scenarios
    List(list::ListArgs),

    /// Print the Playwright script a scenario compiles to
    Script(script::ScriptArgs),

    /// Check that the application is reachable
    Probe(probe::ProbeArgs),
}

impl Cli {
    fn harness_config(&self) -> anyhow::Result<HarnessConfig> {
        let mut config = HarnessConfig::load(&self.config)?;
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Exit codes: 0 all passed, 1 a scenario failed, 2 the harness itself failed
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match execute(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::from(2)
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<bool> {
    let config = cli.harness_config()?;
    let format = cli.format;

    match cli.command {
        Commands::Run(args) => run::execute(args, config, format).await,
        Commands::List(args) => list::execute(args, format).map(|_| true),
        Commands::Script(args) => script::execute(args, &config).map(|_| true),
        Commands::Probe(args) => probe::execute(args, &config).await,
    }
}
