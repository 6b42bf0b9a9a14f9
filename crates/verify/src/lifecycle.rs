//! Per-scenario lifecycle
//!
//! ```text
//! Launched → Stubbed → SessionSeeded → Navigated → Waiting → {Asserted | Failed} → Captured → Closed
//! ```
//!
//! The tracker replays script events against the scenario's steps and keeps
//! the ordered list of phases actually reached.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::playwright::ScriptEvent;
use crate::scenario::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pending,
    Launched,
    Stubbed,
    SessionSeeded,
    Navigated,
    Waiting,
    Asserted,
    Failed,
    Captured,
    Closed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Pending => "pending",
            Phase::Launched => "launched",
            Phase::Stubbed => "stubbed",
            Phase::SessionSeeded => "session_seeded",
            Phase::Navigated => "navigated",
            Phase::Waiting => "waiting",
            Phase::Asserted => "asserted",
            Phase::Failed => "failed",
            Phase::Captured => "captured",
            Phase::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Phase a successfully completed step moves the scenario into
fn phase_after(step: &Step) -> Option<Phase> {
    match step {
        Step::Navigate { .. } | Step::Reload { .. } | Step::Login { .. } => Some(Phase::Navigated),
        Step::WaitFor { .. } | Step::WaitForUrl { .. } | Step::Settle { .. } => Some(Phase::Waiting),
        Step::Assert { .. } | Step::PageContains { .. } | Step::PageLacks { .. } | Step::Fetch { .. } => {
            Some(Phase::Asserted)
        }
        Step::Screenshot { .. } => Some(Phase::Captured),
        Step::Click { .. } | Step::Fill { .. } | Step::Press { .. } | Step::Log { .. } => None,
    }
}

#[derive(Debug, Clone)]
pub struct PhaseTracker<'a> {
    steps: &'a [Step],
    history: Vec<Phase>,
}

impl<'a> PhaseTracker<'a> {
    pub fn new(steps: &'a [Step]) -> Self {
        Self {
            steps,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Phase {
        self.history.last().copied().unwrap_or(Phase::Pending)
    }

    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    pub fn into_history(self) -> Vec<Phase> {
        self.history
    }

    fn enter(&mut self, phase: Phase) {
        if self.current() != phase {
            self.history.push(phase);
        }
    }

    pub fn apply(&mut self, event: &ScriptEvent) {
        match event {
            ScriptEvent::Phase { phase } => match phase.as_str() {
                "launched" => self.enter(Phase::Launched),
                "stubbed" => self.enter(Phase::Stubbed),
                "session_seeded" => self.enter(Phase::SessionSeeded),
                "closed" => self.enter(Phase::Closed),
                _ => {}
            },
            ScriptEvent::StepOk { index, .. } => {
                if let Some(phase) = self.steps.get(*index).and_then(phase_after) {
                    self.enter(phase);
                }
            }
            ScriptEvent::StepFailed { .. } => self.enter(Phase::Failed),
            ScriptEvent::Artifact { .. } => self.enter(Phase::Captured),
            ScriptEvent::StepStart { .. }
            | ScriptEvent::CaptureFailed { .. }
            | ScriptEvent::StubHit { .. }
            | ScriptEvent::Log { .. }
            | ScriptEvent::Done { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::{Expectation, Locator};
    use crate::playwright::ArtifactKind;

    fn phase(p: &str) -> ScriptEvent {
        ScriptEvent::Phase { phase: p.into() }
    }

    fn ok(index: usize) -> ScriptEvent {
        ScriptEvent::StepOk { index, label: String::new(), ms: 1 }
    }

    #[test]
    fn test_success_path() {
        let steps = vec![
            Step::Navigate { url: "/".into(), wait_for: None },
            Step::Settle { timeout_ms: None },
            Step::Assert {
                locator: Locator::css("h1"),
                expect: Expectation::Visible,
                timeout_ms: None,
            },
            Step::Screenshot { name: "x".into(), full_page: true },
        ];
        let mut tracker = PhaseTracker::new(&steps);
        for e in [
            phase("launched"),
            phase("stubbed"),
            phase("session_seeded"),
            ok(0),
            ok(1),
            ok(2),
            ScriptEvent::Artifact { path: "x.png".into(), kind: ArtifactKind::Screenshot },
            ok(3),
            phase("closed"),
        ] {
            tracker.apply(&e);
        }
        assert_eq!(
            tracker.history(),
            &[
                Phase::Launched,
                Phase::Stubbed,
                Phase::SessionSeeded,
                Phase::Navigated,
                Phase::Waiting,
                Phase::Asserted,
                Phase::Captured,
                Phase::Closed,
            ]
        );
    }

    #[test]
    fn test_failure_path() {
        let steps = vec![Step::Navigate { url: "/".into(), wait_for: None }];
        let mut tracker = PhaseTracker::new(&steps);
        tracker.apply(&phase("launched"));
        tracker.apply(&ScriptEvent::StepFailed {
            index: Some(0),
            label: "navigate:/".into(),
            message: "net::ERR_CONNECTION_REFUSED".into(),
        });
        tracker.apply(&ScriptEvent::Artifact { path: "e.png".into(), kind: ArtifactKind::Failure });
        tracker.apply(&phase("closed"));
        assert_eq!(
            tracker.into_history(),
            vec![Phase::Launched, Phase::Failed, Phase::Captured, Phase::Closed]
        );
    }

    #[test]
    fn test_unknown_index_is_ignored() {
        let steps: Vec<Step> = Vec::new();
        let mut tracker = PhaseTracker::new(&steps);
        tracker.apply(&ok(7));
        assert_eq!(tracker.current(), Phase::Pending);
    }
}
