//! Runner behaviour against a fake `node`
//!
//! The fake executable ignores the generated script and replays a canned
//! event stream, which exercises event decoding, report assembly, failure
//! capture bookkeeping and deadline handling without a browser.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use billbook_verify::assertion::{Expectation, Locator};
use billbook_verify::lifecycle::Phase;
use billbook_verify::playwright::{ArtifactKind, PlaywrightConfig, PlaywrightHandle};
use billbook_verify::{HarnessConfig, Scenario, Step, VerificationRunner, VerifyError};
use image::{ImageBuffer, Rgba};
use tempfile::TempDir;

struct Harness {
    dir: TempDir,
    config: HarnessConfig,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig {
            output_dir: dir.path().join("verification"),
            ..Default::default()
        };
        Self { dir, config }
    }

    /// Install a fake node whose body is `script` (POSIX sh)
    fn fake_node(&mut self, script: &str) -> PathBuf {
        let path = self.dir.path().join("fake-node");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        self.config.node_binary = path.clone();
        path
    }

    fn events_file(&self, lines: &[String]) -> PathBuf {
        let path = self.dir.path().join("events.txt");
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();
        path
    }

    fn runner(&self) -> VerificationRunner {
        let driver = PlaywrightHandle::unchecked(VerificationRunner::driver_config(&self.config));
        VerificationRunner::with_driver(self.config.clone(), driver).unwrap()
    }
}

fn ev(json: &str) -> String {
    format!("@@verify {}", json)
}

fn write_png(path: &Path) {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_pixel(4, 3, Rgba([255, 255, 255, 255]));
    img.save(path).unwrap();
}

fn table_scenario() -> Scenario {
    Scenario::new("bills-table")
        .with_fixtures()
        .authenticated()
        .step(Step::Navigate { url: "/".into(), wait_for: None })
        .step(Step::Assert {
            locator: Locator::role("columnheader", "Paid"),
            expect: Expectation::Hidden,
            timeout_ms: None,
        })
        .step(Step::Screenshot { name: "verification".into(), full_page: true })
}

#[tokio::test]
async fn successful_run_builds_full_report() {
    let mut h = Harness::new();
    let setup = h.runner();
    let out = setup.output_dir().to_path_buf();
    let shot = out.join("verification.png");
    write_png(&shot);

    let events = h.events_file(&[
        ev(r#"{"event":"phase","phase":"launched"}"#),
        ev(r#"{"event":"phase","phase":"stubbed"}"#),
        ev(r#"{"event":"phase","phase":"session_seeded"}"#),
        ev(r#"{"event":"step_start","index":0,"label":"navigate:/"}"#),
        ev(r#"{"event":"stub_hit","url":"http://db/rest/v1/bills?select=*","pattern":"**/rest/v1/bills?*"}"#),
        ev(r#"{"event":"stub_hit","url":"http://db/rest/v1/bills?select=id","pattern":"**/rest/v1/bills?*"}"#),
        ev(r#"{"event":"stub_hit","url":"http://db/rest/v1/shopkeepers?select=*","pattern":"**/rest/v1/shopkeepers?*"}"#),
        ev(r#"{"event":"step_ok","index":0,"label":"navigate:/","ms":120}"#),
        ev(r#"{"event":"step_ok","index":1,"label":"assert","ms":15}"#),
        "some unrelated console output".to_string(),
        ev(&format!(
            r#"{{"event":"artifact","path":{},"kind":"screenshot"}}"#,
            serde_json::to_string(&shot).unwrap()
        )),
        ev(r#"{"event":"step_ok","index":2,"label":"screenshot:verification","ms":40}"#),
        ev(r#"{"event":"phase","phase":"closed"}"#),
        ev(r#"{"event":"done","ok":true}"#),
    ]);
    h.fake_node(&format!("cat '{}'", events.display()));

    let report = h.runner().run_scenario(&table_scenario()).await.unwrap();

    assert!(report.success, "{:?}", report.error);
    assert!(report.error.is_none());
    assert_eq!(report.steps.len(), 3);
    assert!(report.steps.iter().all(|s| s.success));
    assert_eq!(report.stub_hits.get("**/rest/v1/bills?*"), Some(&2));
    assert_eq!(report.stub_hits.get("**/rest/v1/shopkeepers?*"), Some(&1));
    assert_eq!(
        report.phases,
        vec![
            Phase::Launched,
            Phase::Stubbed,
            Phase::SessionSeeded,
            Phase::Navigated,
            Phase::Asserted,
            Phase::Captured,
            Phase::Closed,
        ]
    );
    assert_eq!(report.artifacts.len(), 1);
    assert_eq!(report.artifacts[0].kind, ArtifactKind::Screenshot);
    assert_eq!(report.artifacts[0].dimensions, Some((4, 3)));
}

#[tokio::test]
async fn failed_assertion_still_captures_and_closes() {
    let mut h = Harness::new();
    let out = h.runner().output_dir().to_path_buf();
    let source = h.dir.path().join("source.png");
    write_png(&source);
    let failure = out.join("bills-table-error.png");

    let events = h.events_file(&[
        ev(r#"{"event":"phase","phase":"launched"}"#),
        ev(r#"{"event":"step_ok","index":0,"label":"navigate:/","ms":80}"#),
        ev(r#"{"event":"step_failed","index":1,"label":"assert","message":"columnheader \"Paid\" should not be visible (Timed out 10000ms)"}"#),
        ev(&format!(
            r#"{{"event":"artifact","path":{},"kind":"failure"}}"#,
            serde_json::to_string(&failure).unwrap()
        )),
        ev(r#"{"event":"phase","phase":"closed"}"#),
        ev(r#"{"event":"done","ok":false}"#),
    ]);
    // the script writes the failure screenshot itself
    h.fake_node(&format!(
        "cp '{}' '{}'\ncat '{}'",
        source.display(),
        failure.display(),
        events.display()
    ));

    let report = h.runner().run_scenario(&table_scenario()).await.unwrap();

    assert!(!report.success);
    let error = report.error.as_deref().unwrap();
    assert!(error.contains("should not be visible"), "{}", error);
    assert_eq!(report.steps.len(), 2);
    assert!(!report.steps[1].success);
    assert_eq!(
        report.phases,
        vec![Phase::Launched, Phase::Navigated, Phase::Failed, Phase::Captured, Phase::Closed]
    );
    assert_eq!(report.final_phase(), Phase::Closed);
    assert_eq!(report.artifacts[0].kind, ArtifactKind::Failure);
    assert!(report.artifacts[0].present);
}

#[tokio::test]
async fn launch_failure_has_no_capture() {
    let mut h = Harness::new();
    let events = h.events_file(&[
        ev(r#"{"event":"step_failed","index":null,"label":"launch","message":"browserType.launch: Executable doesn't exist"}"#),
        ev(r#"{"event":"done","ok":false}"#),
    ]);
    h.fake_node(&format!("cat '{}'", events.display()));

    let report = h.runner().run_scenario(&table_scenario()).await.unwrap();

    assert!(!report.success);
    assert!(report.steps.is_empty());
    assert!(report.artifacts.is_empty());
    assert!(report.error.unwrap().starts_with("launch: "));
}

#[tokio::test]
async fn crash_without_done_is_a_failure() {
    let mut h = Harness::new();
    h.fake_node("echo \"Error: Cannot find module '@playwright/test'\" >&2\nexit 1");

    let report = h.runner().run_scenario(&table_scenario()).await.unwrap();

    assert!(!report.success);
    let error = report.error.unwrap();
    assert!(error.contains("without reporting completion"), "{}", error);
    assert!(error.contains("Cannot find module"), "{}", error);
}

#[tokio::test]
async fn deadline_terminates_the_script() {
    let mut h = Harness::new();
    h.config.timeouts.scenario_ms = 300;
    h.fake_node("exec sleep 30");

    let started = std::time::Instant::now();
    let report = h.runner().run_scenario(&table_scenario()).await.unwrap();

    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    assert!(!report.success);
    assert!(report.error.unwrap().contains("deadline"));
}

#[tokio::test]
async fn suite_continues_after_a_failure() {
    let mut h = Harness::new();
    let events = h.events_file(&[ev(r#"{"event":"done","ok":true}"#)]);
    h.fake_node(&format!("cat '{}'", events.display()));

    let invalid = Scenario::new("empty");
    let report = h
        .runner()
        .run_all(&[invalid, table_scenario()])
        .await;

    assert_eq!(report.total, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.passed, 1);
    assert!(!report.success());
    assert!(report.results[0].error.as_deref().unwrap().contains("no steps"));

    let runner = h.runner();
    let path = runner.write_results(&report).unwrap();
    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(written["failed"], 1);
}

#[tokio::test]
async fn missing_playwright_is_reported() {
    let mut h = Harness::new();
    h.fake_node("exit 1");

    let err = PlaywrightHandle::new(PlaywrightConfig {
        node_binary: h.config.node_binary.clone(),
        deadline: std::time::Duration::from_secs(5),
    })
    .await
    .unwrap_err();
    assert!(matches!(err, VerifyError::PlaywrightNotFound));

    let err = PlaywrightHandle::new(PlaywrightConfig {
        node_binary: h.dir.path().join("no-such-node"),
        deadline: std::time::Duration::from_secs(5),
    })
    .await
    .unwrap_err();
    assert!(matches!(err, VerifyError::Launch { .. }));
}

#[test]
fn script_for_writes_into_canonical_output_dir() {
    let h = Harness::new();
    let runner = h.runner();
    let script = runner.script_for(&table_scenario()).unwrap();

    let shot = runner.output_dir().join("verification.png");
    assert!(runner.output_dir().is_absolute());
    assert!(script.contains(&serde_json::to_string(&shot).unwrap()));
}

#[tokio::test]
async fn deadline_covers_a_script_that_closes_stdout() {
    let mut h = Harness::new();
    h.config.timeouts.scenario_ms = 300;
    // streams closed at once, process keeps running
    h.fake_node("exec >&- 2>&-\nexec sleep 30");

    let started = std::time::Instant::now();
    let report = h.runner().run_scenario(&table_scenario()).await.unwrap();

    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    assert!(!report.success);
    assert!(report.error.unwrap().contains("deadline"));
}
