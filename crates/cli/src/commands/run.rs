//! Run Command

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use billbook_verify::config::Browser;
use billbook_verify::probe::AppProbe;
use billbook_verify::{HarnessConfig, ScenarioReport, SuiteReport, VerificationRunner};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use super::ScenarioSource;
use crate::output::{print_serialized, status, table, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct RunArgs {
    /// Scenario names to run (default: all)
    pub names: Vec<String>,

    #[command(flatten)]
    pub source: ScenarioSource,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long)]
    pub browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Node.js executable
    #[arg(long, env = "BILLBOOK_NODE")]
    pub node: Option<PathBuf>,

    /// Seconds to wait for the application before running (0 skips the check)
    #[arg(long, default_value = "30")]
    pub probe_timeout: u64,
}

/// One row of the results table
#[derive(Serialize)]
pub struct ScenarioRow {
    pub name: String,
    pub success: bool,
    pub steps: String,
    pub duration_ms: u64,
    pub artifacts: usize,
    pub error: String,
}

impl From<&ScenarioReport> for ScenarioRow {
    fn from(r: &ScenarioReport) -> Self {
        let passed = r.steps.iter().filter(|s| s.success).count();
        Self {
            name: r.name.clone(),
            success: r.success,
            steps: format!("{}/{}", passed, r.steps.len()),
            duration_ms: r.duration_ms,
            artifacts: r.artifacts.iter().filter(|a| a.present).count(),
            error: r.error.clone().unwrap_or_default(),
        }
    }
}

impl TableDisplay for ScenarioRow {
    fn headers() -> Vec<&'static str> {
        vec!["Scenario", "Result", "Steps", "Duration", "Screenshots", "Error"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            status(self.success),
            self.steps.clone(),
            format!("{}ms", self.duration_ms),
            self.artifacts.to_string(),
            self.error.lines().next().unwrap_or("").to_string(),
        ]
    }
}

pub async fn execute(args: RunArgs, mut config: HarnessConfig, format: OutputFormat) -> Result<bool> {
    if let Some(browser) = args.browser {
        config.browser = browser;
    }
    if args.headed {
        config.headless = false;
    }
    if let Some(node) = args.node {
        config.node_binary = node;
    }

    let scenarios = args.source.select(&args.names)?;
    if scenarios.is_empty() {
        anyhow::bail!("no scenarios selected");
    }

    if args.probe_timeout > 0 {
        let status = AppProbe::new(config.base_url.clone())?
            .wait_until_reachable(Duration::from_secs(args.probe_timeout))
            .await?;
        info!("{} is up (HTTP {})", config.base_url, status);
    }

    let runner = VerificationRunner::new(config).await?;
    let suite = runner.run_all(&scenarios).await;
    runner.write_results(&suite)?;

    match format {
        OutputFormat::Table => print_summary(&suite, runner.output_dir()),
        _ => print_serialized(&suite, format),
    }

    Ok(suite.success())
}

fn print_summary(suite: &SuiteReport, output_dir: &std::path::Path) {
    let rows: Vec<ScenarioRow> = suite.results.iter().map(ScenarioRow::from).collect();
    println!("{}", table(&rows));

    let summary = format!(
        "{} passed, {} failed ({} ms)",
        suite.passed, suite.failed, suite.duration_ms
    );
    if suite.success() {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }
    println!("Artifacts: {}", output_dir.display().to_string().dimmed());
}
