//! Harness configuration
//!
//! Every value the verification scripts used to hard-code (host,
//! credentials, output paths, timeouts) lives here. A TOML file is optional;
//! missing files and missing keys fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{VerifyError, VerifyResult};

/// Top-level harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Base URL of the application under test
    pub base_url: String,

    /// Login credentials used by scenarios that go through the login form
    pub credentials: Credentials,

    /// Directory screenshots and results are written to
    pub output_dir: PathBuf,

    /// Timeouts for waits and whole scenarios
    pub timeouts: Timeouts,

    /// Browser engine
    pub browser: Browser,

    /// Run without a visible window
    pub headless: bool,

    /// Viewport size of the browser context
    pub viewport: Viewport,

    /// Node.js executable used to run generated scripts
    pub node_binary: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9002".to_string(),
            credentials: Credentials::default(),
            output_dir: PathBuf::from("verification"),
            timeouts: Timeouts::default(),
            browser: Browser::Chromium,
            headless: true,
            viewport: Viewport::default(),
            node_binary: PathBuf::from("node"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "JMD".to_string(),
            password: "311976".to_string(),
        }
    }
}

/// Timeouts in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Page navigations (`goto`, `reload`)
    pub navigation_ms: u64,

    /// Explicit readiness waits without their own timeout
    pub wait_ms: u64,

    /// Assertions without their own timeout
    pub assertion_ms: u64,

    /// Hard deadline for a whole scenario, including browser startup
    pub scenario_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation_ms: 60_000,
            wait_ms: 30_000,
            assertion_ms: 10_000,
            scenario_ms: 180_000,
        }
    }
}

impl Timeouts {
    pub fn scenario(&self) -> Duration {
        Duration::from_millis(self.scenario_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(VerifyError::Config(format!("unknown browser '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport { width: 1280, height: 1024 }
    }
}

impl HarnessConfig {
    /// Load configuration from file, or defaults if the file does not exist
    pub fn load(path: &Path) -> VerifyResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> VerifyResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> VerifyResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(VerifyError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(VerifyError::Config("viewport dimensions must be non-zero".into()));
        }
        if self.timeouts.scenario_ms == 0 {
            return Err(VerifyError::Config("timeouts.scenario_ms must be non-zero".into()));
        }
        Ok(())
    }

    /// Resolve a scenario URL against the base URL.
    ///
    /// Absolute URLs pass through untouched; everything else is joined
    /// with exactly one `/` between base and path.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if url.is_empty() {
            format!("{}/", base)
        } else if url.starts_with('/') {
            format!("{}{}", base, url)
        } else {
            format!("{}/{}", base, url)
        }
    }
}
