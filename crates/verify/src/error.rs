//! Error types for the verification harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Playwright not found. Install with: npm i -D playwright && npx playwright install chromium")]
    PlaywrightNotFound,

    #[error("Failed to launch {binary}: {reason}")]
    Launch { binary: String, reason: String },

    #[error("Application not reachable at {url} after {attempts} attempts")]
    Unreachable { url: String, attempts: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid route pattern '{pattern}': {reason}")]
    RoutePattern { pattern: String, reason: String },

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Script protocol error: {0}")]
    Protocol(String),

    #[error("Scenario '{0}' exceeded its deadline of {1} ms")]
    Deadline(String, u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type VerifyResult<T> = Result<T, VerifyError>;
