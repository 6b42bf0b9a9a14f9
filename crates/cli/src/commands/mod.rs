//! CLI command implementations

pub mod list;
pub mod probe;
pub mod run;
pub mod script;

use std::path::PathBuf;

use anyhow::Result;
use billbook_verify::{catalog, Scenario, VerifyError};
use clap::Args;

/// Where scenarios come from and which of them to pick
#[derive(Args, Debug, Clone)]
pub struct ScenarioSource {
    /// Load YAML scenarios from this directory instead of the built-in catalog
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Only scenarios carrying this tag
    #[arg(short, long)]
    pub tag: Option<String>,
}

impl ScenarioSource {
    pub fn load(&self) -> Result<Vec<Scenario>> {
        let scenarios = match &self.dir {
            Some(dir) => Scenario::load_all(dir)?,
            None => catalog::all(),
        };
        Ok(match &self.tag {
            Some(tag) => Scenario::filter_by_tag(&scenarios, tag)
                .into_iter()
                .cloned()
                .collect(),
            None => scenarios,
        })
    }

    /// Load, then keep only `names` (in the order given)
    pub fn select(&self, names: &[String]) -> Result<Vec<Scenario>> {
        let scenarios = self.load()?;
        if names.is_empty() {
            return Ok(scenarios);
        }
        names
            .iter()
            .map(|name| {
                scenarios
                    .iter()
                    .find(|s| &s.name == name)
                    .cloned()
                    .ok_or_else(|| VerifyError::ScenarioNotFound(name.clone()).into())
            })
            .collect()
    }
}
