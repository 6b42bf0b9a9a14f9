//! Runner that executes scenarios one at a time and collects reports

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::artifact::{ArtifactRecord, ArtifactStore};
use crate::config::HarnessConfig;
use crate::error::{VerifyError, VerifyResult};
use crate::fixtures::FixtureSet;
use crate::lifecycle::{Phase, PhaseTracker};
use crate::playwright::{PlaywrightConfig, PlaywrightHandle, ScriptEvent, ScriptRun};
use crate::scenario::Scenario;
use crate::script::ScriptBuilder;

/// Outcome of a single step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub index: usize,
    pub label: String,
    pub success: bool,
    pub duration_ms: Option<u64>,
    pub error: Option<String>,
}

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepReport>,
    pub phases: Vec<Phase>,
    pub artifacts: Vec<ArtifactRecord>,
    /// Intercepted request count per route pattern
    pub stub_hits: BTreeMap<String, usize>,
    pub error: Option<String>,
}

impl ScenarioReport {
    fn harness_failure(name: &str, error: &VerifyError) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            duration_ms: 0,
            steps: Vec::new(),
            phases: Vec::new(),
            artifacts: Vec::new(),
            stub_hits: BTreeMap::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn final_phase(&self) -> Phase {
        self.phases.last().copied().unwrap_or(Phase::Pending)
    }
}

/// Outcome of a suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Sequential scenario runner
pub struct VerificationRunner {
    config: HarnessConfig,
    fixtures: FixtureSet,
    driver: PlaywrightHandle,
    store: ArtifactStore,
}

impl VerificationRunner {
    /// Create a runner, verifying the Playwright installation
    pub async fn new(config: HarnessConfig) -> VerifyResult<Self> {
        config.validate()?;
        let driver = PlaywrightHandle::new(Self::driver_config(&config)).await?;
        Self::with_driver(config, driver)
    }

    /// Create a runner around an existing driver
    pub fn with_driver(config: HarnessConfig, driver: PlaywrightHandle) -> VerifyResult<Self> {
        let store = ArtifactStore::prepare(&config.output_dir)?;
        Ok(Self {
            config,
            fixtures: FixtureSet::today(),
            driver,
            store,
        })
    }

    pub fn driver_config(config: &HarnessConfig) -> PlaywrightConfig {
        PlaywrightConfig {
            node_binary: config.node_binary.clone(),
            deadline: config.timeouts.scenario(),
        }
    }

    /// Replace the fixture set served by `fixtures: true` scenarios
    pub fn with_fixtures(mut self, fixtures: FixtureSet) -> Self {
        self.fixtures = fixtures;
        self
    }

    /// Absolute output directory
    pub fn output_dir(&self) -> &Path {
        self.store.root()
    }

    /// The script a scenario compiles to
    pub fn script_for(&self, scenario: &Scenario) -> VerifyResult<String> {
        ScriptBuilder::new(&self.config, self.store.root()).build(scenario, &self.fixtures)
    }

    /// Run scenarios in order; a failing scenario does not stop the suite
    pub async fn run_all(&self, scenarios: &[Scenario]) -> SuiteReport {
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let report = match self.run_scenario(scenario).await {
                Ok(report) => report,
                Err(e) => ScenarioReport::harness_failure(&scenario.name, &e),
            };

            if report.success {
                info!("✓ {} ({} ms)", report.name, report.duration_ms);
            } else {
                error!(
                    "✗ {} - {}",
                    report.name,
                    report.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(report);
        }

        let passed = results.iter().filter(|r| r.success).count();
        let failed = results.len() - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Verification results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        SuiteReport {
            total: results.len(),
            passed,
            failed,
            duration_ms,
            results,
        }
    }

    /// Run a single scenario
    pub async fn run_scenario(&self, scenario: &Scenario) -> VerifyResult<ScenarioReport> {
        debug!("Running scenario: {}", scenario.name);
        scenario.validate()?;

        let builder = ScriptBuilder::new(&self.config, self.store.root());
        self.store.clear_failure(&builder.failure_path(&scenario.name))?;
        let script = builder.build(scenario, &self.fixtures)?;

        let run = self.driver.run_script(&script).await?;
        Ok(self.report(scenario, run))
    }

    fn report(&self, scenario: &Scenario, run: ScriptRun) -> ScenarioReport {
        let mut tracker = PhaseTracker::new(&scenario.steps);
        let mut steps: Vec<StepReport> = Vec::new();
        let mut artifacts = Vec::new();
        let mut stub_hits: BTreeMap<String, usize> = BTreeMap::new();
        let mut error: Option<String> = None;
        let mut done_ok = None;

        for event in &run.events {
            tracker.apply(event);
            match event {
                ScriptEvent::StepOk { index, label, ms } => steps.push(StepReport {
                    index: *index,
                    label: label.clone(),
                    success: true,
                    duration_ms: Some(*ms),
                    error: None,
                }),
                ScriptEvent::StepFailed { index, label, message } => {
                    if let Some(index) = index {
                        steps.push(StepReport {
                            index: *index,
                            label: label.clone(),
                            success: false,
                            duration_ms: None,
                            error: Some(message.clone()),
                        });
                    }
                    error.get_or_insert_with(|| format!("{}: {}", label, message));
                }
                ScriptEvent::Artifact { path, kind } => {
                    artifacts.push(self.store.inspect(path, *kind));
                }
                ScriptEvent::StubHit { pattern, .. } => {
                    *stub_hits.entry(pattern.clone()).or_default() += 1;
                }
                ScriptEvent::Done { ok } => done_ok = Some(*ok),
                _ => {}
            }
        }

        if run.timed_out {
            error.get_or_insert_with(|| {
                VerifyError::Deadline(scenario.name.clone(), self.config.timeouts.scenario_ms).to_string()
            });
        } else if done_ok.is_none() {
            let stderr = run.stderr.trim();
            error.get_or_insert_with(|| {
                format!(
                    "script exited (code {:?}) without reporting completion{}{}",
                    run.exit_code,
                    if stderr.is_empty() { "" } else { ": " },
                    stderr.lines().last().unwrap_or("")
                )
            });
        }

        let success = error.is_none() && done_ok == Some(true);
        if done_ok == Some(false) && error.is_none() {
            error = Some("script reported failure".to_string());
        }

        ScenarioReport {
            name: scenario.name.clone(),
            success,
            duration_ms: run.duration.as_millis() as u64,
            steps,
            phases: tracker.into_history(),
            artifacts,
            stub_hits,
            error,
        }
    }

    /// Write the suite report to `<output_dir>/results.json`
    pub fn write_results(&self, report: &SuiteReport) -> VerifyResult<PathBuf> {
        let path = self.store.root().join("results.json");
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
