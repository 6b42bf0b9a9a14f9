//! List Command

use anyhow::Result;
use billbook_verify::Scenario;
use clap::Args;
use serde::Serialize;

use super::ScenarioSource;
use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: ScenarioSource,
}

/// Scenario summary for display
#[derive(Serialize)]
pub struct ScenarioDisplay {
    pub name: String,
    pub tags: Vec<String>,
    pub steps: usize,
    pub stubbed: bool,
    pub seeded: bool,
    pub description: String,
}

impl From<&Scenario> for ScenarioDisplay {
    fn from(s: &Scenario) -> Self {
        Self {
            name: s.name.clone(),
            tags: s.tags.clone(),
            steps: s.steps.len(),
            stubbed: s.fixtures || !s.routes.is_empty(),
            seeded: s.authenticated || !s.session.is_empty(),
            description: s.description.clone(),
        }
    }
}

impl TableDisplay for ScenarioDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Tags", "Steps", "Stubs", "Session", "Description"]
    }

    fn row(&self) -> Vec<String> {
        let mark = |b: bool| if b { "✓" } else { "-" }.to_string();
        vec![
            self.name.clone(),
            self.tags.join(", "),
            self.steps.to_string(),
            mark(self.stubbed),
            mark(self.seeded),
            self.description.clone(),
        ]
    }
}

pub fn execute(args: ListArgs, format: OutputFormat) -> Result<()> {
    let scenarios = args.source.load()?;
    let items: Vec<ScenarioDisplay> = scenarios.iter().map(ScenarioDisplay::from).collect();
    print_list(&items, format);
    Ok(())
}
