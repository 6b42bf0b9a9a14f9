//! Bill Book UI verification harness
//!
//! This crate drives a headless browser against the running bill book
//! application and checks that pages render what they should:
//! - Compiles declarative scenarios into Playwright scripts run under Node.js
//! - Stubs `rest/v1/<resource>` calls with canned fixtures
//! - Seeds the logged-in session without going through the login form
//! - Captures full-page screenshots, plus a diagnostic one on failure
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 VerificationRunner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  run_all(scenarios) -> SuiteReport                          │
//! │    ├── ScriptBuilder::build(scenario) -> JS                 │
//! │    ├── PlaywrightHandle::run_script(JS) -> ScriptRun        │
//! │    │       (JSON event lines on stdout)                     │
//! │    ├── PhaseTracker::apply(event)                           │
//! │    └── ArtifactStore::inspect(screenshot)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (code or YAML)                                    │
//! │    ├── fixtures / routes: [RouteStub]  (first match wins)   │
//! │    ├── authenticated / session: SessionSeed                 │
//! │    └── steps: [Step]                                        │
//! │          ├── navigate / reload / login                      │
//! │          ├── wait_for / wait_for_url / settle               │
//! │          ├── click / fill / press                           │
//! │          ├── assert / page_contains / page_lacks / fetch    │
//! │          └── screenshot / log                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod artifact;
pub mod assertion;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod lifecycle;
pub mod playwright;
pub mod probe;
pub mod route;
pub mod runner;
pub mod scenario;
pub mod script;
pub mod session;

pub use config::HarnessConfig;
pub use error::{VerifyError, VerifyResult};
pub use runner::{ScenarioReport, SuiteReport, VerificationRunner};
pub use scenario::{Scenario, Step};
