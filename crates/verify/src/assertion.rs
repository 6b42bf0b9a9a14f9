//! Locators and expectations about rendered DOM state

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::js_string;

/// How to find an element on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Locator {
    /// CSS (or Playwright) selector
    Css {
        selector: String,
        #[serde(default)]
        first: bool,
    },

    /// Visible text
    Text {
        text: String,
        #[serde(default)]
        exact: bool,
        #[serde(default)]
        first: bool,
    },

    /// ARIA role with accessible name
    Role {
        role: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        exact: bool,
        #[serde(default)]
        first: bool,
    },

    /// Input placeholder
    Placeholder {
        text: String,
        #[serde(default)]
        first: bool,
    },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css { selector: selector.into(), first: false }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text { text: text.into(), exact: false, first: false }
    }

    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Locator::Role {
            role: role.into(),
            name: Some(name.into()),
            exact: false,
            first: false,
        }
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Locator::Placeholder { text: text.into(), first: false }
    }

    /// Require an exact accessible name or text match
    pub fn exact(mut self) -> Self {
        match &mut self {
            Locator::Text { exact, .. } | Locator::Role { exact, .. } => *exact = true,
            Locator::Css { .. } | Locator::Placeholder { .. } => {}
        }
        self
    }

    /// Narrow to the first match
    pub fn first(mut self) -> Self {
        match &mut self {
            Locator::Css { first, .. }
            | Locator::Text { first, .. }
            | Locator::Role { first, .. }
            | Locator::Placeholder { first, .. } => *first = true,
        }
        self
    }

    fn is_first(&self) -> bool {
        match self {
            Locator::Css { first, .. }
            | Locator::Text { first, .. }
            | Locator::Role { first, .. }
            | Locator::Placeholder { first, .. } => *first,
        }
    }

    /// Playwright expression resolving this locator against `page`
    pub fn to_js(&self) -> String {
        let base = match self {
            Locator::Css { selector, .. } => format!("page.locator({})", js_string(selector)),
            Locator::Text { text, exact, .. } => {
                format!("page.getByText({}, {{ exact: {} }})", js_string(text), exact)
            }
            Locator::Role { role, name, exact, .. } => match name {
                Some(name) => format!(
                    "page.getByRole({}, {{ name: {}, exact: {} }})",
                    js_string(role),
                    js_string(name),
                    exact
                ),
                None => format!("page.getByRole({})", js_string(role)),
            },
            Locator::Placeholder { text, .. } => {
                format!("page.getByPlaceholder({})", js_string(text))
            }
        };
        if self.is_first() {
            format!("{}.first()", base)
        } else {
            base
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css { selector, .. } => write!(f, "{}", selector),
            Locator::Text { text, .. } => write!(f, "text \"{}\"", text),
            Locator::Role { role, name: Some(name), .. } => write!(f, "{} \"{}\"", role, name),
            Locator::Role { role, name: None, .. } => write!(f, "{}", role),
            Locator::Placeholder { text, .. } => write!(f, "placeholder \"{}\"", text),
        }
    }
}

/// A claim about a located element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "is", rename_all = "snake_case")]
pub enum Expectation {
    Visible,
    Hidden,
    HasText { text: String },
    ContainsText { text: String },
    HasValue { value: String },
    Count { count: usize },
}

impl Expectation {
    /// Playwright `expect` matcher call, e.g. `toBeVisible({ timeout: 5000 })`
    pub fn matcher_js(&self, timeout_ms: u64) -> String {
        let opts = format!("{{ timeout: {} }}", timeout_ms);
        match self {
            Expectation::Visible => format!("toBeVisible({})", opts),
            Expectation::Hidden => format!("toBeHidden({})", opts),
            Expectation::HasText { text } => format!("toHaveText({}, {})", js_string(text), opts),
            Expectation::ContainsText { text } => {
                format!("toContainText({}, {})", js_string(text), opts)
            }
            Expectation::HasValue { value } => format!("toHaveValue({}, {})", js_string(value), opts),
            Expectation::Count { count } => format!("toHaveCount({}, {})", count, opts),
        }
    }

    /// Human-readable description used in failure messages
    pub fn describe(&self, locator: &Locator) -> String {
        match self {
            Expectation::Visible => format!("{} should be visible", locator),
            Expectation::Hidden => format!("{} should not be visible", locator),
            Expectation::HasText { text } => format!("{} should have text \"{}\"", locator, text),
            Expectation::ContainsText { text } => format!("{} should contain \"{}\"", locator, text),
            Expectation::HasValue { value } => {
                format!("{} should have value \"{}\"", locator, value.escape_default())
            }
            Expectation::Count { count } => format!("{} should match {} element(s)", locator, count),
        }
    }
}
