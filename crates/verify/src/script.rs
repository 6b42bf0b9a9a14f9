//! Scenario → Playwright script generation
//!
//! A scenario compiles to one self-contained Node.js script. The script
//! reports progress as JSON lines on stdout, each prefixed with
//! [`EVENT_MARKER`], and always closes the browser in its `finally` block.
//! On the first failing step it captures a diagnostic screenshot if the page
//! is still open.

use std::path::{Path, PathBuf};

use crate::assertion::Locator;
use crate::config::HarnessConfig;
use crate::error::{VerifyError, VerifyResult};
use crate::fixtures::FixtureSet;
use crate::route::{glob_to_regex, StubTable};
use crate::scenario::{Scenario, Step, WaitState};
use crate::session::js_string;

/// Prefix distinguishing harness events from other stdout output
pub const EVENT_MARKER: &str = "@@verify ";

/// Builds Playwright scripts for a given configuration
pub struct ScriptBuilder<'a> {
    config: &'a HarnessConfig,
    output_dir: PathBuf,
}

impl<'a> ScriptBuilder<'a> {
    /// `output_dir` should be absolute; the script does not run from the
    /// caller's working directory.
    pub fn new(config: &'a HarnessConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            output_dir: output_dir.into(),
        }
    }

    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.png", name))
    }

    pub fn failure_path(&self, scenario: &str) -> PathBuf {
        self.screenshot_path(&format!("{}-error", scenario))
    }

    /// Generate the script for `scenario`
    pub fn build(&self, scenario: &Scenario, fixtures: &FixtureSet) -> VerifyResult<String> {
        let stubs = scenario.stub_table(fixtures)?;
        let seed = scenario.session_seed();
        let viewport = scenario.viewport.unwrap_or(self.config.viewport);
        let t = &self.config.timeouts;

        let mut lines: Vec<String> = Vec::with_capacity(64 + scenario.steps.len() * 8);

        lines.push(format!(
            "const {{ {}, expect }} = require(require.resolve('@playwright/test', {{ paths: [process.cwd()] }}));",
            self.config.browser.as_str()
        ));
        lines.push(String::new());
        lines.push(format!("const MARK = {};", js_string(EVENT_MARKER)));
        lines.push("function emit(event, data) {".into());
        lines.push("  process.stdout.write(MARK + JSON.stringify(Object.assign({ event }, data || {})) + '\\n');".into());
        lines.push("}".into());
        lines.push("function firstLine(e) {".into());
        lines.push("  return String((e && e.message) || e).split('\\n')[0];".into());
        lines.push("}".into());
        lines.push("async function check(desc, fn) {".into());
        lines.push("  try { await fn(); } catch (e) { throw new Error(desc + ' (' + firstLine(e) + ')'); }".into());
        lines.push("}".into());
        lines.push(String::new());
        lines.extend(stub_table_js(&stubs));
        lines.push(String::new());

        lines.push("(async () => {".into());
        lines.push("  let browser;".into());
        lines.push("  let page;".into());
        lines.push("  let current = null;".into());
        lines.push("  let failed = false;".into());
        lines.push("  try {".into());
        lines.push(format!(
            "    browser = await {}.launch({{ headless: {} }});",
            self.config.browser.as_str(),
            self.config.headless
        ));
        lines.push("    emit('phase', { phase: 'launched' });".into());
        lines.push(format!(
            "    const context = await browser.newContext({{ viewport: {{ width: {}, height: {} }} }});",
            viewport.width, viewport.height
        ));
        lines.push(format!("    context.setDefaultTimeout({});", t.wait_ms));
        lines.push(format!("    context.setDefaultNavigationTimeout({});", t.navigation_ms));

        if let Some(init) = seed.init_script() {
            lines.push(format!("    await context.addInitScript({});", js_string(&init)));
        }
        lines.push("    page = await context.newPage();".into());

        if !stubs.is_empty() {
            lines.push("    await page.route('**/*', async (route) => {".into());
            lines.push("      const url = route.request().url();".into());
            lines.push("      const stub = STUBS.find((s) => s.regex.test(url));".into());
            lines.push("      if (!stub) { return route.continue(); }".into());
            lines.push("      emit('stub_hit', { url, pattern: stub.pattern });".into());
            lines.push("      await route.fulfill({ status: stub.status, contentType: stub.contentType, body: stub.body });".into());
            lines.push("    });".into());
        }
        lines.push("    emit('phase', { phase: 'stubbed' });".into());
        if !seed.is_empty() {
            lines.push("    emit('phase', { phase: 'session_seeded' });".into());
        }

        for (index, step) in scenario.steps.iter().enumerate() {
            lines.push(String::new());
            lines.push(format!(
                "    current = {{ index: {}, label: {}, started: Date.now() }};",
                index,
                js_string(&step.label())
            ));
            lines.push("    emit('step_start', { index: current.index, label: current.label });".into());
            lines.push("    {".into());
            for line in self.step_js(step, &stubs)? {
                lines.push(format!("      {}", line));
            }
            lines.push("    }".into());
            lines.push("    emit('step_ok', { index: current.index, label: current.label, ms: Date.now() - current.started });".into());
        }

        let failure = self.failure_path(&scenario.name);
        lines.push("  } catch (error) {".into());
        lines.push("    failed = true;".into());
        lines.push("    emit('step_failed', {".into());
        lines.push("      index: current ? current.index : null,".into());
        lines.push("      label: current ? current.label : 'launch',".into());
        lines.push("      message: String((error && error.message) || error),".into());
        lines.push("    });".into());
        lines.push("    if (page && !page.isClosed()) {".into());
        lines.push("      try {".into());
        lines.push(format!(
            "        await page.screenshot({{ path: {}, fullPage: true }});",
            js_path(&failure)
        ));
        lines.push(format!(
            "        emit('artifact', {{ path: {}, kind: 'failure' }});",
            js_path(&failure)
        ));
        lines.push("      } catch (e) {".into());
        lines.push("        emit('capture_failed', { message: firstLine(e) });".into());
        lines.push("      }".into());
        lines.push("    }".into());
        lines.push("  } finally {".into());
        lines.push("    if (browser) {".into());
        lines.push("      await browser.close().catch(() => {});".into());
        lines.push("      emit('phase', { phase: 'closed' });".into());
        lines.push("    }".into());
        lines.push("    emit('done', { ok: !failed });".into());
        lines.push("  }".into());
        lines.push("})();".into());
        lines.push(String::new());

        Ok(lines.join("\n"))
    }

    fn step_js(&self, step: &Step, stubs: &StubTable) -> VerifyResult<Vec<String>> {
        let t = &self.config.timeouts;
        let url = |u: &str| js_string(&self.config.resolve_url(u));

        let js = match step {
            Step::Navigate { url: target, wait_for } => {
                let mut out = vec![format!(
                    "await page.goto({}, {{ timeout: {} }});",
                    url(target),
                    t.navigation_ms
                )];
                out.extend(wait_for.as_ref().map(|l| wait_js(l, WaitState::Visible, t.wait_ms)));
                out
            }
            Step::Reload { wait_for } => {
                let mut out = vec![format!("await page.reload({{ timeout: {} }});", t.navigation_ms)];
                out.extend(wait_for.as_ref().map(|l| wait_js(l, WaitState::Visible, t.wait_ms)));
                out
            }
            Step::Login { timeout_ms } => {
                let creds = &self.config.credentials;
                let timeout = timeout_ms.unwrap_or(t.wait_ms);
                vec![
                    format!("await page.goto({}, {{ timeout: {} }});", url("/login"), t.navigation_ms),
                    wait_js(&Locator::css("#username"), WaitState::Visible, timeout),
                    format!("await page.locator('#username').fill({});", js_string(&creds.username)),
                    format!("await page.locator('#password').fill({});", js_string(&creds.password)),
                    "await page.locator(\"button[type='submit']\").click();".to_string(),
                    format!("await page.waitForURL({}, {{ timeout: {} }});", url("/"), timeout),
                ]
            }
            Step::Click { locator, timeout_ms, wait_for_response } => {
                let click = format!(
                    "{}.click({{ timeout: {} }})",
                    locator.to_js(),
                    timeout_ms.unwrap_or(t.wait_ms)
                );
                match wait_for_response {
                    None => vec![format!("await {};", click)],
                    // armed before the click so a fast response is not missed
                    Some(pattern) => vec![
                        format!("const re = new RegExp({});", js_string(&glob_to_regex(pattern)?)),
                        format!(
                            "const [response] = await Promise.all([page.waitForResponse((r) => re.test(r.url()), {{ timeout: {} }}), {}]);",
                            t.wait_ms, click
                        ),
                        format!(
                            "if (!response.ok()) {{ throw new Error({} + ' answered ' + response.status()); }}",
                            js_string(&format!("response to {}", pattern))
                        ),
                    ],
                }
            }
            Step::Fill { locator, value } => {
                vec![format!("await {}.fill({});", locator.to_js(), js_string(value))]
            }
            Step::Press { locator, key } => match locator {
                Some(l) => vec![format!("await {}.press({});", l.to_js(), js_string(key))],
                None => vec![format!("await page.keyboard.press({});", js_string(key))],
            },
            Step::WaitFor { locator, state, timeout_ms } => {
                vec![wait_js(locator, *state, timeout_ms.unwrap_or(t.wait_ms))]
            }
            Step::WaitForUrl { url: target, timeout_ms } => vec![format!(
                "await page.waitForURL({}, {{ timeout: {} }});",
                url(target),
                timeout_ms.unwrap_or(t.wait_ms)
            )],
            Step::Settle { timeout_ms } => vec![format!(
                "await page.waitForLoadState('networkidle', {{ timeout: {} }});",
                timeout_ms.unwrap_or(t.wait_ms)
            )],
            Step::Assert { locator, expect, timeout_ms } => vec![format!(
                "await check({}, () => expect({}).{});",
                js_string(&expect.describe(locator)),
                locator.to_js(),
                expect.matcher_js(timeout_ms.unwrap_or(t.assertion_ms))
            )],
            Step::PageContains { text } => vec![
                "const html = await page.content();".to_string(),
                "emit('log', { message: 'page content length ' + html.length });".to_string(),
                format!(
                    "if (!html.includes({})) {{ throw new Error({}); }}",
                    js_string(text),
                    js_string(&format!("page content should contain \"{}\"", text))
                ),
            ],
            Step::PageLacks { text } => vec![
                "const html = await page.content();".to_string(),
                format!(
                    "if (html.includes({})) {{ throw new Error({}); }}",
                    js_string(text),
                    js_string(&format!("page content should not contain \"{}\"", text))
                ),
            ],
            Step::Fetch { url: target, status, body, matches_stub } => {
                let mut status = *status;
                let mut body = body.clone();
                let mut content_type = None;
                if *matches_stub {
                    let resolved = self.config.resolve_url(target);
                    let stub = stubs.resolve(&resolved).ok_or_else(|| {
                        VerifyError::ScenarioParse(format!("fetch '{}' matches no route stub", target))
                    })?;
                    status = status.or(Some(stub.status));
                    body = body.or_else(|| Some(stub.body.clone()));
                    content_type = Some(stub.content_type.clone());
                }

                let mut out = vec![format!(
                    "const res = await page.evaluate(async (u) => {{ const r = await fetch(u); return {{ status: r.status, contentType: r.headers.get('content-type') || '', body: await r.text() }}; }}, {});",
                    url(target)
                )];
                if let Some(status) = status {
                    out.push(format!(
                        "if (res.status !== {0}) {{ throw new Error('fetch should return status {0}, got ' + res.status); }}",
                        status
                    ));
                }
                if let Some(content_type) = content_type {
                    out.push(format!(
                        "if (!res.contentType.startsWith({0})) {{ throw new Error('fetch should return ' + {0} + ', got ' + res.contentType); }}",
                        js_string(&content_type)
                    ));
                }
                if let Some(body) = body {
                    out.push(format!(
                        "if (res.body !== {}) {{ throw new Error('fetch body differs from stub: ' + res.body.slice(0, 200)); }}",
                        js_string(&body)
                    ));
                }
                out
            }
            Step::Screenshot { name, full_page } => {
                let path = self.screenshot_path(name);
                vec![
                    format!(
                        "await page.screenshot({{ path: {}, fullPage: {} }});",
                        js_path(&path),
                        full_page
                    ),
                    format!("emit('artifact', {{ path: {}, kind: 'screenshot' }});", js_path(&path)),
                ]
            }
            Step::Log { message } => vec![format!("emit('log', {{ message: {} }});", js_string(message))],
        };
        Ok(js)
    }
}

fn wait_js(locator: &Locator, state: WaitState, timeout_ms: u64) -> String {
    format!(
        "await {}.waitFor({{ state: '{}', timeout: {} }});",
        locator.to_js(),
        state.as_str(),
        timeout_ms
    )
}

fn js_path(path: &Path) -> String {
    js_string(&path.to_string_lossy())
}

fn stub_table_js(table: &StubTable) -> Vec<String> {
    let mut lines = vec!["const STUBS = [".to_string()];
    for compiled in table.iter() {
        let stub = &compiled.stub;
        lines.push(format!(
            "  {{ pattern: {}, regex: new RegExp({}), status: {}, contentType: {}, body: {} }},",
            js_string(&stub.pattern),
            js_string(compiled.regex_source()),
            stub.status,
            js_string(&stub.content_type),
            js_string(&stub.body)
        ));
    }
    lines.push("];".to_string());
    lines
}
