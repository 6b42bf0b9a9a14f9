//! Script Command
//!
//! Prints the generated Node.js script so it can be inspected or run by hand
//! with `node`.

use anyhow::Result;
use billbook_verify::playwright::PlaywrightHandle;
use billbook_verify::{HarnessConfig, VerificationRunner};
use clap::Args;

use super::ScenarioSource;

#[derive(Args)]
pub struct ScriptArgs {
    /// Scenario name
    pub name: String,

    #[command(flatten)]
    pub source: ScenarioSource,
}

pub fn execute(args: ScriptArgs, config: &HarnessConfig) -> Result<()> {
    let scenario = args
        .source
        .select(std::slice::from_ref(&args.name))?
        .remove(0);

    // nothing is run, so the Playwright install is not checked
    let driver = PlaywrightHandle::unchecked(VerificationRunner::driver_config(config));
    let runner = VerificationRunner::with_driver(config.clone(), driver)?;

    print!("{}", runner.script_for(&scenario)?);
    Ok(())
}
