//! Declarative verification scenarios
//!
//! A scenario bundles route stubs, an optional session seed and an ordered
//! list of steps. Scenarios are built in code (see [`crate::catalog`]) or
//! parsed from YAML files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::assertion::{Expectation, Locator};
use crate::config::Viewport;
use crate::error::{VerifyError, VerifyResult};
use crate::fixtures::FixtureSet;
use crate::route::{glob_to_regex, RouteStub, StubTable};
use crate::session::SessionSeed;

/// A complete verification scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name, also used for the failure screenshot
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Overrides the configured viewport
    #[serde(default)]
    pub viewport: Option<Viewport>,

    /// Serve the standard fixture set ahead of `routes`
    #[serde(default)]
    pub fixtures: bool,

    /// Extra route stubs, consulted in order
    #[serde(default)]
    pub routes: Vec<RouteStub>,

    /// Seed the logged-in flags before the first navigation
    #[serde(default)]
    pub authenticated: bool,

    /// Additional `localStorage` entries
    #[serde(default)]
    pub session: SessionSeed,

    pub steps: Vec<Step>,
}

/// A single step, executed in order; the first failure ends the scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a URL (relative to the base URL)
    Navigate {
        url: String,
        #[serde(default)]
        wait_for: Option<Locator>,
    },

    /// Reload the current page
    Reload {
        #[serde(default)]
        wait_for: Option<Locator>,
    },

    /// Fill the login form with the configured credentials and wait for `/`
    Login {
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Click; with `wait_for_response`, also wait for the first response
    /// whose URL matches that glob and fail unless it is 2xx
    Click {
        locator: Locator,
        #[serde(default)]
        timeout_ms: Option<u64>,
        #[serde(default)]
        wait_for_response: Option<String>,
    },

    Fill {
        locator: Locator,
        value: String,
    },

    Press {
        #[serde(default)]
        locator: Option<Locator>,
        key: String,
    },

    /// Wait for an element to reach a state
    WaitFor {
        locator: Locator,
        #[serde(default)]
        state: WaitState,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Wait until the page URL equals `url` (relative to the base URL)
    WaitForUrl {
        url: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Wait until the network has been idle. Returns at once on a page that
    /// is already idle, so it only carries weight right after a navigation.
    Settle {
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    Assert {
        locator: Locator,
        expect: Expectation,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// The serialized page content contains `text`
    PageContains { text: String },

    /// The serialized page content does not contain `text`
    PageLacks { text: String },

    /// Fetch `url` from the page and compare what the page received.
    /// `matches_stub` compares against the route stub the URL resolves to;
    /// explicit `status`/`body` take precedence over the stub's.
    Fetch {
        url: String,
        #[serde(default)]
        status: Option<u16>,
        #[serde(default)]
        body: Option<String>,
        #[serde(default)]
        matches_stub: bool,
    },

    Screenshot {
        name: String,
        #[serde(default = "default_full_page")]
        full_page: bool,
    },

    Log { message: String },
}

fn default_full_page() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

impl Step {
    /// Short label used in events, logs and reports
    pub fn label(&self) -> String {
        match self {
            Step::Navigate { url, .. } => format!("navigate:{}", url),
            Step::Reload { .. } => "reload".to_string(),
            Step::Login { .. } => "login".to_string(),
            Step::Click { locator, .. } => format!("click:{}", locator),
            Step::Fill { locator, .. } => format!("fill:{}", locator),
            Step::Press { key, .. } => format!("press:{}", key),
            Step::WaitFor { locator, state, .. } => format!("wait:{}:{}", locator, state.as_str()),
            Step::WaitForUrl { url, .. } => format!("wait-url:{}", url),
            Step::Settle { .. } => "settle".to_string(),
            Step::Assert { locator, expect, .. } => format!("assert:{}", expect.describe(locator)),
            Step::PageContains { text } => format!("contains:{}", text),
            Step::PageLacks { text } => format!("lacks:{}", text),
            Step::Fetch { url, .. } => format!("fetch:{}", url),
            Step::Screenshot { name, .. } => format!("screenshot:{}", name),
            Step::Log { message } => {
                let cut = message.char_indices().nth(30).map(|(i, _)| i).unwrap_or(message.len());
                format!("log:{}", &message[..cut])
            }
        }
    }
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            viewport: None,
            fixtures: false,
            routes: Vec::new(),
            authenticated: false,
            session: SessionSeed::new(),
            steps: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_fixtures(mut self) -> Self {
        self.fixtures = true;
        self
    }

    pub fn route(mut self, stub: RouteStub) -> Self {
        self.routes.push(stub);
        self
    }

    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> VerifyResult<Self> {
        let scenario: Self = serde_yaml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> VerifyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| {
            VerifyError::ScenarioParse(format!("{}: {}", path.display(), e))
        })
    }

    /// Load every `.yaml`/`.yml` scenario below `dir`, sorted by path
    pub fn load_all(dir: &Path) -> VerifyResult<Vec<Self>> {
        let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        paths.iter().map(|p| Self::from_file(p)).collect()
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(scenarios: &'a [Self], tag: &str) -> Vec<&'a Self> {
        scenarios.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }

    pub fn validate(&self) -> VerifyResult<()> {
        if self.name.trim().is_empty() {
            return Err(VerifyError::ScenarioParse("scenario name is empty".into()));
        }
        if self.name.contains(['/', '\\']) {
            return Err(VerifyError::ScenarioParse(format!(
                "scenario name '{}' must not contain path separators",
                self.name
            )));
        }
        if self.steps.is_empty() {
            return Err(VerifyError::ScenarioParse(format!(
                "scenario '{}' has no steps",
                self.name
            )));
        }
        // Surfaces bad globs before a browser is started
        self.stub_table(&FixtureSet::today())?;
        for step in &self.steps {
            if let Step::Click { wait_for_response: Some(pattern), .. } = step {
                glob_to_regex(pattern)?;
            }
        }
        Ok(())
    }

    /// Route table: standard fixtures first (if enabled), then `routes`
    pub fn stub_table(&self, fixtures: &FixtureSet) -> VerifyResult<StubTable> {
        let mut stubs = Vec::new();
        if self.fixtures {
            stubs.extend(fixtures.stubs()?);
        }
        stubs.extend(self.routes.iter().cloned());
        StubTable::from_stubs(stubs)
    }

    /// Session seed: login flags (if enabled) overlaid with `session`
    pub fn session_seed(&self) -> SessionSeed {
        let mut seed = if self.authenticated {
            SessionSeed::authenticated()
        } else {
            SessionSeed::new()
        };
        seed.merge(&self.session);
        seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_scenario() {
        let yaml = r#"
name: shopkeeper-search
description: Search box on the shopkeepers page
tags: [search, smoke]
authenticated: true
steps:
  - action: navigate
    url: /shopkeepers
    wait_for: { by: text, text: Shopkeepers }
  - action: fill
    locator: { by: placeholder, text: Search by name... }
    value: Test Shopkeeper
  - action: screenshot
    name: shopkeepers_search
"#;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        assert_eq!(scenario.name, "shopkeeper-search");
        assert_eq!(scenario.steps.len(), 3);
        assert!(scenario.authenticated);
        assert_eq!(
            scenario.steps[2],
            Step::Screenshot { name: "shopkeepers_search".into(), full_page: true }
        );
    }

    #[test]
    fn test_parse_assert_and_routes() {
        let yaml = r#"
name: empty-ledger
fixtures: true
routes:
  - pattern: "**/rest/v1/shopkeepers?*"
    body: '[{"id":"s1","name":"Late"}]'
steps:
  - action: navigate
    url: /
  - action: assert
    locator: { by: role, role: columnheader, name: Paid }
    expect: { is: hidden }
"#;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        let table = scenario.stub_table(&FixtureSet::today()).unwrap();
        // fixture stubs come first, so the standard empty list still answers
        assert_eq!(table.len(), 6);
        let hit = table.resolve("http://db/rest/v1/shopkeepers?select=*").unwrap();
        assert_eq!(hit.body, "[]");
    }

    #[test]
    fn test_sleep_is_not_a_step() {
        let yaml = r#"
name: sleepy
steps:
  - action: sleep
    ms: 2000
"#;
        assert!(Scenario::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_rejects_bad_glob() {
        let yaml = r#"
name: broken
routes:
  - pattern: "**/{bills"
    body: "[]"
steps:
  - action: navigate
    url: /
"#;
        assert!(matches!(
            Scenario::from_yaml(yaml),
            Err(VerifyError::RoutePattern { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_response_glob() {
        let yaml = r#"
name: save
steps:
  - action: click
    locator: { by: css, selector: "button" }
    wait_for_response: "**/rest/v1/{bill_settings"
"#;
        assert!(matches!(
            Scenario::from_yaml(yaml),
            Err(VerifyError::RoutePattern { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_and_pathlike_names() {
        let s = Scenario::new("a/b").step(Step::Reload { wait_for: None });
        assert!(s.validate().is_err());
        assert!(Scenario::new("no-steps").validate().is_err());
    }

    #[test]
    fn test_session_seed_overlay() {
        let mut scenario = Scenario::new("s").authenticated();
        scenario.session.set("loginAttempts", "3");
        let seed = scenario.session_seed();
        assert_eq!(seed.get("isLoggedIn"), Some("true"));
        assert_eq!(seed.get("loginAttempts"), Some("3"));
    }

    #[test]
    fn test_log_label_is_char_safe() {
        let step = Step::Log { message: "यह एक कंप्यूटर जनित बिल है। और कुछ अधिक पाठ".into() };
        assert!(step.label().starts_with("log:"));
    }

    #[test]
    fn test_load_all_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(
            dir.path().join("a.yaml"),
            "name: a\ntags: [smoke]\nsteps:\n  - action: reload\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("nested/b.yml"),
            "name: b\nsteps:\n  - action: settle\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let all = Scenario::load_all(dir.path()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "a");

        let smoke = Scenario::filter_by_tag(&all, "smoke");
        assert_eq!(smoke.len(), 1);
    }
}
