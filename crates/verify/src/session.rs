//! Client-side session bootstrap
//!
//! Seeds `localStorage` before any page script runs so that scenarios which
//! only need an authenticated view can skip the login form.

use serde::{Deserialize, Serialize};

/// Key the application's auth guard reads
pub const LOGGED_IN_KEY: &str = "isLoggedIn";

/// Failed-login counter kept by the login page
pub const LOGIN_ATTEMPTS_KEY: &str = "loginAttempts";

/// Ordered `localStorage` entries applied by an init script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSeed {
    entries: Vec<(String, String)>,
}

impl SessionSeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// The flags a successful login leaves behind
    pub fn authenticated() -> Self {
        Self::new()
            .with(LOGGED_IN_KEY, "true")
            .with(LOGIN_ATTEMPTS_KEY, "0")
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a key, replacing an existing value in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JavaScript body for `context.addInitScript`, or `None` when empty
    pub fn init_script(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("localStorage.setItem({}, {});", js_string(k), js_string(v)))
            .collect();
        Some(lines.join("\n"))
    }

    /// Fold another seed into this one; later values win
    pub fn merge(&mut self, other: &SessionSeed) {
        for (k, v) in &other.entries {
            self.set(k.clone(), v.clone());
        }
    }
}

/// Quote a string as a JavaScript literal
pub(crate) fn js_string(s: &str) -> String {
    // JSON string syntax is a subset of JS string syntax except for U+2028/9
    serde_json::Value::String(s.to_string())
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
