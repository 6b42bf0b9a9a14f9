//! Probe Command

use std::time::Duration;

use anyhow::Result;
use billbook_verify::probe::AppProbe;
use billbook_verify::HarnessConfig;
use clap::Args;

use crate::output::{print_error, print_success};

#[derive(Args)]
pub struct ProbeArgs {
    /// Seconds to keep polling before giving up
    #[arg(long, default_value = "10")]
    pub timeout: u64,
}

pub async fn execute(args: ProbeArgs, config: &HarnessConfig) -> Result<bool> {
    let probe = AppProbe::new(config.base_url.clone())?;
    match probe.wait_until_reachable(Duration::from_secs(args.timeout)).await {
        Ok(status) => {
            print_success(&format!("{} answered with HTTP {}", config.base_url, status));
            Ok(true)
        }
        Err(e) => {
            print_error(&e.to_string());
            Ok(false)
        }
    }
}
