//! Playwright driver
//!
//! Runs generated scripts under Node.js and decodes the event stream they
//! print. The child process owns the browser; a scenario that outlives its
//! deadline gets SIGTERM, then a kill.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::{VerifyError, VerifyResult};
use crate::script::EVENT_MARKER;

/// Progress reported by a running script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    Phase {
        phase: String,
    },
    StepStart {
        index: usize,
        label: String,
    },
    StepOk {
        index: usize,
        label: String,
        ms: u64,
    },
    /// `index` is absent when the browser failed before the first step
    StepFailed {
        index: Option<usize>,
        label: String,
        message: String,
    },
    Artifact {
        path: PathBuf,
        kind: ArtifactKind,
    },
    CaptureFailed {
        message: String,
    },
    StubHit {
        url: String,
        pattern: String,
    },
    Log {
        message: String,
    },
    Done {
        ok: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Screenshot,
    Failure,
}

/// Decode one stdout line; `None` for lines that are not harness events
pub fn parse_event_line(line: &str) -> Option<VerifyResult<ScriptEvent>> {
    let payload = line.strip_prefix(EVENT_MARKER)?;
    Some(serde_json::from_str(payload).map_err(|e| {
        VerifyError::Protocol(format!("undecodable event '{}': {}", payload, e))
    }))
}

/// Everything a finished script run produced
#[derive(Debug, Clone)]
pub struct ScriptRun {
    pub events: Vec<ScriptEvent>,
    pub exit_code: Option<i32>,
    pub stderr: String,
    pub duration: Duration,
    pub timed_out: bool,
}

/// Configuration for the driver
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub node_binary: PathBuf,
    pub deadline: Duration,
}

/// Handle to the Node.js + Playwright installation
#[derive(Debug, Clone)]
pub struct PlaywrightHandle {
    node_binary: PathBuf,
    deadline: Duration,
}

impl PlaywrightHandle {
    /// Create a handle after verifying that `@playwright/test` resolves
    pub async fn new(config: PlaywrightConfig) -> VerifyResult<Self> {
        let handle = Self::unchecked(config);
        handle.check_installed().await?;
        Ok(handle)
    }

    /// Create a handle without probing the installation
    pub fn unchecked(config: PlaywrightConfig) -> Self {
        Self {
            node_binary: config.node_binary,
            deadline: config.deadline,
        }
    }

    async fn check_installed(&self) -> VerifyResult<()> {
        let status = Command::new(&self.node_binary)
            .args([
                "-e",
                "require.resolve('@playwright/test', { paths: [process.cwd()] })",
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            Ok(_) => Err(VerifyError::PlaywrightNotFound),
            Err(e) => Err(VerifyError::Launch {
                binary: self.node_binary.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Execute a script and collect its events
    pub async fn run_script(&self, script: &str) -> VerifyResult<ScriptRun> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.cjs");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());
        let start = Instant::now();

        let mut child = Command::new(&self.node_binary)
            .arg(&script_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VerifyError::Launch {
                binary: self.node_binary.display().to_string(),
                reason: e.to_string(),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VerifyError::Protocol("child stdout not captured".into()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| VerifyError::Protocol("child stderr not captured".into()))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        let mut events = Vec::new();
        let collect = async {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                match parse_event_line(&line) {
                    Some(Ok(event)) => {
                        log_event(&event);
                        events.push(event);
                    }
                    Some(Err(e)) => warn!("{}", e),
                    None => debug!("[node] {}", line),
                }
            }
            Ok::<_, VerifyError>(())
        };

        // the deadline covers the exit too: a script may close stdout and linger
        let outcome = tokio::time::timeout(self.deadline, async {
            collect.await?;
            Ok::<_, VerifyError>(child.wait().await?)
        })
        .await;

        let (status, timed_out) = match outcome {
            Ok(result) => (result?, false),
            Err(_) => {
                warn!("Script exceeded {:?}, terminating", self.deadline);
                terminate(&mut child).await;
                (child.wait().await?, true)
            }
        };
        let stderr = stderr_task.await.unwrap_or_default();

        Ok(ScriptRun {
            events,
            exit_code: status.code(),
            stderr,
            duration: start.elapsed(),
            timed_out,
        })
    }
}

fn log_event(event: &ScriptEvent) {
    match event {
        ScriptEvent::Phase { phase } => debug!("phase: {}", phase),
        ScriptEvent::StepStart { index, label } => debug!("step {} start: {}", index + 1, label),
        ScriptEvent::StepOk { index, label, ms } => debug!("step {} ok: {} ({} ms)", index + 1, label, ms),
        ScriptEvent::StepFailed { label, message, .. } => warn!("step failed: {} - {}", label, message),
        ScriptEvent::Artifact { path, .. } => info!("Screenshot saved to {}", path.display()),
        ScriptEvent::CaptureFailed { message } => warn!("failure screenshot not captured: {}", message),
        ScriptEvent::StubHit { url, pattern } => debug!("Intercepted: {} ({})", url, pattern),
        ScriptEvent::Log { message } => info!("[scenario] {}", message),
        ScriptEvent::Done { ok } => debug!("done: ok={}", ok),
    }
}

/// SIGTERM first so Playwright can reap its browser, then kill
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok()
                && tokio::time::timeout(Duration::from_secs(2), child.wait()).await.is_ok()
            {
                return;
            }
        }
    }
    let _ = child.kill().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_lines() {
        let ok = parse_event_line(r#"@@verify {"event":"step_ok","index":2,"label":"settle","ms":41}"#)
            .unwrap()
            .unwrap();
        assert_eq!(ok, ScriptEvent::StepOk { index: 2, label: "settle".into(), ms: 41 });

        let launch = parse_event_line(
            r#"@@verify {"event":"step_failed","index":null,"label":"launch","message":"no browser"}"#,
        )
        .unwrap()
        .unwrap();
        assert!(matches!(launch, ScriptEvent::StepFailed { index: None, .. }));
    }

    #[test]
    fn test_non_event_lines_are_ignored() {
        assert!(parse_event_line("Page Content Length: 1234").is_none());
        assert!(parse_event_line("").is_none());
    }

    #[test]
    fn test_bad_event_is_protocol_error() {
        let result = parse_event_line("@@verify {not json").unwrap();
        assert!(matches!(result, Err(VerifyError::Protocol(_))));
    }
}
