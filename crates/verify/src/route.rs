//! Network route stubs
//!
//! A [`StubTable`] maps URL globs to canned responses. The table is frozen
//! into the generated script as a single catch-all route that walks the
//! stubs in registration order, so the first registered match answers and
//! anything unmatched continues to the real network.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{VerifyError, VerifyResult};

/// A canned response for every request whose URL matches `pattern`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStub {
    /// URL glob (`**` crosses `/`, `*` does not, `{a,b}` alternates)
    pub pattern: String,

    #[serde(default = "default_status")]
    pub status: u16,

    #[serde(default = "default_content_type")]
    pub content_type: String,

    pub body: String,
}

fn default_status() -> u16 {
    200
}

fn default_content_type() -> String {
    "application/json".to_string()
}

impl RouteStub {
    pub fn new(pattern: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            status: default_status(),
            content_type: default_content_type(),
            body: body.into(),
        }
    }

    /// A `200 application/json` stub serving `value`
    pub fn json<T: Serialize + ?Sized>(pattern: impl Into<String>, value: &T) -> VerifyResult<Self> {
        Ok(Self::new(pattern, serde_json::to_string(value)?))
    }

    /// Stub for a `rest/v1/<resource>?<query>` collection endpoint
    pub fn rest_resource<T: Serialize>(resource: &str, rows: &[T]) -> VerifyResult<Self> {
        Self::json(format!("**/rest/v1/{}?*", resource), rows)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

/// A stub paired with its compiled matcher
#[derive(Debug, Clone)]
pub struct CompiledStub {
    pub stub: RouteStub,
    matcher: Regex,
}

impl CompiledStub {
    /// Anchored regex source, shared verbatim with the browser side
    pub fn regex_source(&self) -> &str {
        self.matcher.as_str()
    }

    pub fn matches(&self, url: &str) -> bool {
        self.matcher.is_match(url)
    }
}

/// Ordered set of route stubs
#[derive(Debug, Clone, Default)]
pub struct StubTable {
    stubs: Vec<CompiledStub>,
}

impl StubTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stubs<I: IntoIterator<Item = RouteStub>>(stubs: I) -> VerifyResult<Self> {
        let mut table = Self::new();
        for stub in stubs {
            table.register(stub)?;
        }
        Ok(table)
    }

    /// Append a stub. Earlier registrations take precedence on overlap.
    pub fn register(&mut self, stub: RouteStub) -> VerifyResult<()> {
        let source = glob_to_regex(&stub.pattern)?;
        let matcher = Regex::new(&source).map_err(|e| VerifyError::RoutePattern {
            pattern: stub.pattern.clone(),
            reason: e.to_string(),
        })?;
        self.stubs.push(CompiledStub { stub, matcher });
        Ok(())
    }

    /// The stub that will answer `url`, or `None` for pass-through
    pub fn resolve(&self, url: &str) -> Option<&RouteStub> {
        self.stubs.iter().find(|c| c.matches(url)).map(|c| &c.stub)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledStub> {
        self.stubs.iter()
    }

    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }
}

/// Translate a URL glob into an anchored regex.
///
/// Only constructs that mean the same thing to Rust's `regex` and to
/// JavaScript's `RegExp` are emitted.
pub fn glob_to_regex(glob: &str) -> VerifyResult<String> {
    let err = |reason: &str| VerifyError::RoutePattern {
        pattern: glob.to_string(),
        reason: reason.to_string(),
    };

    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');
    let mut in_group = false;
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    // `**/` also matches zero directories
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        out.push_str("(?:.*/)?");
                    } else {
                        out.push_str(".*");
                    }
                } else {
                    out.push_str("[^/]*");
                }
            }
            '{' => {
                if in_group {
                    return Err(err("nested '{' is not supported"));
                }
                in_group = true;
                out.push_str("(?:");
            }
            '}' => {
                if !in_group {
                    return Err(err("unmatched '}'"));
                }
                in_group = false;
                out.push(')');
            }
            ',' if in_group => out.push('|'),
            '\\' => match chars.next() {
                Some(escaped) => push_literal(&mut out, escaped),
                None => return Err(err("trailing escape")),
            },
            other => push_literal(&mut out, other),
        }
    }

    if in_group {
        return Err(err("unclosed '{'"));
    }
    out.push('$');
    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    if matches!(
        c,
        '.' | '+' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '\\' | '*'
    ) {
        out.push('\\');
    }
    out.push(c);
}
