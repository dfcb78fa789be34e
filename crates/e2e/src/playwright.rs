//! Playwright browser automation
//!
//! Playwright runs inside a long-lived `node` process. A small bridge script
//! reads one JSON command per line on stdin and answers with one JSON reply
//! per line on stdout.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use shopcheck_common::{Browser, RunSettings, Viewport};

use crate::driver::{BoundingBox, ClickOptions, Driver, DriverFactory};
use crate::error::{E2eError, E2eResult};

/// Extra time the bridge gets on top of Playwright's own timeouts
const REPLY_GRACE: Duration = Duration::from_secs(5);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

const BRIDGE_SCRIPT: &str = r#"
const readline = require('readline');
const config = __CONFIG__;
const pw = require(require.resolve('playwright', { paths: [process.cwd()] }));

function reply(msg) {
  process.stdout.write(JSON.stringify(msg) + '\n');
}

(async () => {
  const browser = await pw[config.browser].launch({ headless: config.headless });
  const context = await browser.newContext({ viewport: config.viewport, baseURL: config.base_url });
  const page = await context.newPage();
  page.setDefaultTimeout(config.timeout_ms);
  page.setDefaultNavigationTimeout(config.navigation_timeout_ms);
  const first = (selector) => page.locator(selector).first();

  const ops = {
    goto: async (c) => { await page.goto(c.url); return null; },
    current_url: async () => page.url(),
    title: async () => page.title(),
    count: (c) => page.locator(c.selector).count(),
    is_visible: (c) => first(c.selector).isVisible(),
    is_enabled: (c) => first(c.selector).isEnabled(),
    is_checked: (c) => first(c.selector).isChecked(),
    text: (c) => first(c.selector).innerText(),
    texts: (c) => page.locator(c.selector).allInnerTexts(),
    value: (c) => first(c.selector).inputValue(),
    attribute: (c) => first(c.selector).getAttribute(c.name),
    click: (c) => first(c.selector).click({ button: c.button, clickCount: c.click_count, force: c.force }),
    fill: (c) => first(c.selector).fill(c.value),
    clear: (c) => first(c.selector).clear(),
    type: (c) => first(c.selector).pressSequentially(c.text, { delay: c.delay_ms || 0 }),
    press: (c) => (c.selector ? first(c.selector).press(c.key) : page.keyboard.press(c.key)),
    select: async (c) => { await first(c.selector).selectOption(c.value); return null; },
    set_checked: (c) => first(c.selector).setChecked(c.checked),
    hover: (c) => first(c.selector).hover(),
    focus: (c) => first(c.selector).focus(),
    scroll: (c) => first(c.selector).scrollIntoViewIfNeeded(),
    set_input_files: (c) => first(c.selector).setInputFiles(c.path),
    drag: (c) => page.dragAndDrop(c.source, c.target),
    bounding_box: (c) => first(c.selector).boundingBox(),
    evaluate: (c) => page.evaluate(c.script),
    screenshot: async (c) => { await page.screenshot({ path: c.path, fullPage: c.full_page }); return null; },
    clear_cookies: () => context.clearCookies(),
    clear_local_storage: () => page.evaluate(() => {
      try { localStorage.clear(); sessionStorage.clear(); } catch (e) {}
    }),
    set_viewport: (c) => page.setViewportSize({ width: c.width, height: c.height }),
  };

  reply({ id: 0, ok: true, result: 'ready' });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    if (!line.trim()) continue;
    let cmd;
    try {
      cmd = JSON.parse(line);
    } catch (e) {
      process.stderr.write('unparseable command: ' + line + '\n');
      continue;
    }
    if (cmd.op === 'close') {
      await browser.close();
      reply({ id: cmd.id, ok: true, result: null });
      break;
    }
    const op = ops[cmd.op];
    if (!op) {
      reply({ id: cmd.id, ok: false, error: 'unknown op ' + cmd.op });
      continue;
    }
    try {
      const result = await op(cmd);
      reply({ id: cmd.id, ok: true, result: result === undefined ? null : result });
    } catch (e) {
      reply({ id: cmd.id, ok: false, error: e.message });
    }
  }
  process.exit(0);
})().catch((e) => {
  process.stderr.write(String((e && e.stack) || e) + '\n');
  process.exit(1);
});
"#;

/// Configuration for Playwright
#[derive(Debug, Clone, Serialize)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport: Viewport,
    pub base_url: String,
    #[serde(rename = "timeout_ms", serialize_with = "as_millis")]
    pub timeout: Duration,
    #[serde(rename = "navigation_timeout_ms", serialize_with = "as_millis")]
    pub navigation_timeout: Duration,
    #[serde(skip)]
    pub screenshot_dir: PathBuf,
    /// Directory `playwright` is resolved from
    #[serde(skip)]
    pub project_dir: PathBuf,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport: Viewport::default(),
            base_url: shopcheck_common::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(30),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            project_dir: PathBuf::from("."),
        }
    }
}

impl PlaywrightConfig {
    pub fn from_settings(settings: &RunSettings) -> Self {
        Self {
            browser: settings.browser,
            headless: settings.headless,
            viewport: settings.viewport,
            base_url: settings.base_url.clone(),
            timeout: settings.command_timeout,
            navigation_timeout: settings.page_load_timeout,
            screenshot_dir: settings.screenshots_dir(),
            ..Self::default()
        }
    }

    fn reply_timeout(&self) -> Duration {
        self.timeout.max(self.navigation_timeout) + REPLY_GRACE
    }

    /// The bridge script with this configuration baked in
    pub fn bridge_script(&self) -> E2eResult<String> {
        let config = serde_json::to_string(self)?;
        Ok(BRIDGE_SCRIPT.replace("__CONFIG__", &config))
    }
}

/// Check that `node` and Playwright are installed
pub async fn check_playwright_installed() -> E2eResult<()> {
    for (program, args) in [("node", vec!["--version"]), ("npx", vec!["playwright", "--version"])] {
        let status = Command::new(program)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match status {
            Ok(status) if status.success() => {}
            _ => return Err(E2eError::PlaywrightNotFound),
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct BridgeCommand<'a> {
    id: u64,
    op: &'a str,
    #[serde(flatten)]
    args: Value,
}

#[derive(Debug, Deserialize)]
struct BridgeReply {
    id: u64,
    ok: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

struct BridgeIo {
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

/// A browser session driven through the node bridge
pub struct PlaywrightDriver {
    config: PlaywrightConfig,
    io: Mutex<BridgeIo>,
    child: Mutex<Option<Child>>,
    next_id: AtomicU64,
    _workdir: TempDir,
}

impl PlaywrightDriver {
    /// Start node, launch the browser and wait for the bridge to report ready
    pub async fn launch(config: PlaywrightConfig) -> E2eResult<Self> {
        check_playwright_installed().await?;
        std::fs::create_dir_all(&config.screenshot_dir)?;

        let workdir = tempfile::tempdir()?;
        let script_path = workdir.path().join("bridge.js");
        std::fs::write(&script_path, config.bridge_script()?)?;

        debug!("Starting Playwright bridge: {}", script_path.display());
        let mut child = Command::new("node")
            .arg(&script_path)
            .current_dir(&config.project_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdout unavailable".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("playwright: {}", line);
                }
            });
        }

        let driver = Self {
            io: Mutex::new(BridgeIo {
                stdin,
                stdout: BufReader::new(stdout).lines(),
            }),
            child: Mutex::new(Some(child)),
            next_id: AtomicU64::new(1),
            _workdir: workdir,
            config,
        };

        {
            let mut io = driver.io.lock().await;
            let ready = driver.read_reply(&mut io, 0, "launch").await?;
            if !ready.ok {
                return Err(E2eError::Playwright(ready.error.unwrap_or_default()));
            }
        }

        info!(
            "Launched {} ({}x{}, headless: {})",
            driver.config.browser.as_str(),
            driver.config.viewport.width,
            driver.config.viewport.height,
            driver.config.headless
        );
        Ok(driver)
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    async fn read_reply(&self, io: &mut BridgeIo, id: u64, op: &str) -> E2eResult<BridgeReply> {
        let timeout = self.config.reply_timeout();
        loop {
            let line = tokio::time::timeout(timeout, io.stdout.next_line())
                .await
                .map_err(|_| {
                    E2eError::Timeout(format!(
                        "Playwright {} did not answer within {}ms",
                        op,
                        timeout.as_millis()
                    ))
                })??;
            let line = line.ok_or_else(|| E2eError::Playwright("bridge process exited".to_string()))?;
            match serde_json::from_str::<BridgeReply>(&line) {
                Ok(reply) if reply.id == id => return Ok(reply),
                Ok(reply) => debug!("Dropping stale bridge reply {}", reply.id),
                Err(_) => debug!("playwright stdout: {}", line),
            }
        }
    }

    /// Send one command and wait for its reply
    async fn call(&self, op: &str, args: Value) -> E2eResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_string(&BridgeCommand { id, op, args })?;
        line.push('\n');

        let mut io = self.io.lock().await;
        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.flush().await?;

        let reply = self.read_reply(&mut io, id, op).await?;
        if reply.ok {
            Ok(reply.result)
        } else {
            Err(E2eError::Playwright(format!(
                "{} failed: {}",
                op,
                reply.error.unwrap_or_else(|| "unknown error".to_string())
            )))
        }
    }

    async fn call_as<T: serde::de::DeserializeOwned>(&self, op: &str, args: Value) -> E2eResult<T> {
        Ok(serde_json::from_value(self.call(op, args).await?)?)
    }

    async fn call_unit(&self, op: &str, args: Value) -> E2eResult<()> {
        self.call(op, args).await.map(|_| ())
    }
}

#[async_trait]
impl Driver for PlaywrightDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.call_unit("goto", json!({ "url": url })).await
    }

    async fn current_url(&self) -> E2eResult<String> {
        self.call_as("current_url", json!({})).await
    }

    async fn title(&self) -> E2eResult<String> {
        self.call_as("title", json!({})).await
    }

    async fn count(&self, selector: &str) -> E2eResult<usize> {
        self.call_as("count", json!({ "selector": selector })).await
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        self.call_as("is_visible", json!({ "selector": selector })).await
    }

    async fn is_enabled(&self, selector: &str) -> E2eResult<bool> {
        self.call_as("is_enabled", json!({ "selector": selector })).await
    }

    async fn is_checked(&self, selector: &str) -> E2eResult<bool> {
        self.call_as("is_checked", json!({ "selector": selector })).await
    }

    async fn text(&self, selector: &str) -> E2eResult<String> {
        self.call_as("text", json!({ "selector": selector })).await
    }

    async fn texts(&self, selector: &str) -> E2eResult<Vec<String>> {
        self.call_as("texts", json!({ "selector": selector })).await
    }

    async fn value(&self, selector: &str) -> E2eResult<String> {
        self.call_as("value", json!({ "selector": selector })).await
    }

    async fn attribute(&self, selector: &str, name: &str) -> E2eResult<Option<String>> {
        self.call_as("attribute", json!({ "selector": selector, "name": name }))
            .await
    }

    async fn click(&self, selector: &str, options: ClickOptions) -> E2eResult<()> {
        let mut args = serde_json::to_value(options)?;
        args["selector"] = json!(selector);
        self.call_unit("click", args).await
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.call_unit("fill", json!({ "selector": selector, "value": value }))
            .await
    }

    async fn clear(&self, selector: &str) -> E2eResult<()> {
        self.call_unit("clear", json!({ "selector": selector })).await
    }

    async fn type_text(&self, selector: &str, text: &str, delay: Option<Duration>) -> E2eResult<()> {
        let delay_ms = delay.map(|d| d.as_millis() as u64).unwrap_or(0);
        self.call_unit(
            "type",
            json!({ "selector": selector, "text": text, "delay_ms": delay_ms }),
        )
        .await
    }

    async fn press(&self, selector: Option<&str>, key: &str) -> E2eResult<()> {
        self.call_unit("press", json!({ "selector": selector, "key": key }))
            .await
    }

    async fn select_option(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.call_unit("select", json!({ "selector": selector, "value": value }))
            .await
    }

    async fn set_checked(&self, selector: &str, checked: bool) -> E2eResult<()> {
        self.call_unit(
            "set_checked",
            json!({ "selector": selector, "checked": checked }),
        )
        .await
    }

    async fn hover(&self, selector: &str) -> E2eResult<()> {
        self.call_unit("hover", json!({ "selector": selector })).await
    }

    async fn focus(&self, selector: &str) -> E2eResult<()> {
        self.call_unit("focus", json!({ "selector": selector })).await
    }

    async fn scroll_into_view(&self, selector: &str) -> E2eResult<()> {
        self.call_unit("scroll", json!({ "selector": selector })).await
    }

    async fn set_input_files(&self, selector: &str, path: &Path) -> E2eResult<()> {
        self.call_unit(
            "set_input_files",
            json!({ "selector": selector, "path": path }),
        )
        .await
    }

    async fn drag_and_drop(&self, source: &str, target: &str) -> E2eResult<()> {
        self.call_unit("drag", json!({ "source": source, "target": target }))
            .await
    }

    async fn bounding_box(&self, selector: &str) -> E2eResult<Option<BoundingBox>> {
        self.call_as("bounding_box", json!({ "selector": selector }))
            .await
    }

    async fn evaluate(&self, script: &str) -> E2eResult<Value> {
        self.call("evaluate", json!({ "script": script })).await
    }

    async fn screenshot(&self, path: &Path, full_page: bool) -> E2eResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.call_unit(
            "screenshot",
            json!({ "path": path, "full_page": full_page }),
        )
        .await
    }

    async fn clear_cookies(&self) -> E2eResult<()> {
        self.call_unit("clear_cookies", json!({})).await
    }

    async fn clear_local_storage(&self) -> E2eResult<()> {
        self.call_unit("clear_local_storage", json!({})).await
    }

    async fn set_viewport(&self, viewport: Viewport) -> E2eResult<()> {
        self.call_unit(
            "set_viewport",
            json!({ "width": viewport.width, "height": viewport.height }),
        )
        .await
    }

    async fn close(&self) -> E2eResult<()> {
        let Some(mut child) = self.child.lock().await.take() else {
            return Ok(());
        };
        if let Err(e) = self.call_unit("close", json!({})).await {
            warn!("Browser did not close cleanly: {}", e);
        }
        match tokio::time::timeout(CLOSE_TIMEOUT, child.wait()).await {
            Ok(status) => {
                debug!("Playwright bridge exited: {:?}", status?);
            }
            Err(_) => {
                warn!("Playwright bridge still running, killing it");
                child.kill().await?;
            }
        }
        Ok(())
    }
}

/// Launches one Playwright browser per scenario attempt
#[derive(Debug, Clone)]
pub struct PlaywrightFactory {
    config: PlaywrightConfig,
}

impl PlaywrightFactory {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverFactory for PlaywrightFactory {
    async fn launch(&self) -> E2eResult<Box<dyn Driver>> {
        Ok(Box::new(PlaywrightDriver::launch(self.config.clone()).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_script_embeds_config() {
        let config = PlaywrightConfig {
            browser: Browser::Firefox,
            headless: false,
            viewport: Viewport {
                width: 1280,
                height: 720,
            },
            ..PlaywrightConfig::default()
        };
        let script = config.bridge_script().unwrap();
        assert!(!script.contains("__CONFIG__"));
        assert!(script.contains(r#""browser":"firefox""#));
        assert!(script.contains(r#""headless":false"#));
        assert!(script.contains(r#""viewport":{"width":1280,"height":720}"#));
        assert!(script.contains(r#""timeout_ms":10000"#));
        assert!(script.contains(r#""navigation_timeout_ms":30000"#));
        assert!(!script.contains("screenshot_dir"));
    }

    #[test]
    fn test_command_wire_format() {
        let line = serde_json::to_string(&BridgeCommand {
            id: 7,
            op: "fill",
            args: json!({ "selector": "#email", "value": "a@b.c" }),
        })
        .unwrap();
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, json!({ "id": 7, "op": "fill", "selector": "#email", "value": "a@b.c" }));
    }

    #[test]
    fn test_reply_parsing() {
        let ok: BridgeReply = serde_json::from_str(r#"{"id":3,"ok":true,"result":["a","b"]}"#).unwrap();
        assert!(ok.ok);
        assert_eq!(ok.result, json!(["a", "b"]));

        let failed: BridgeReply = serde_json::from_str(r#"{"id":4,"ok":false,"error":"Timeout 10000ms exceeded"}"#).unwrap();
        assert!(!failed.ok);
        assert_eq!(failed.result, Value::Null);
        assert_eq!(failed.error.as_deref(), Some("Timeout 10000ms exceeded"));
    }

    #[test]
    fn test_config_from_run_settings() {
        let settings = shopcheck_common::EnvironmentConfig::default().run_settings("qa");
        let config = PlaywrightConfig::from_settings(&settings);
        assert_eq!(config.base_url, settings.base_url);
        assert_eq!(config.timeout, settings.command_timeout);
        assert_eq!(config.navigation_timeout, settings.page_load_timeout);
        assert_eq!(config.screenshot_dir, PathBuf::from("test-results/screenshots"));
        assert!(config.reply_timeout() > config.navigation_timeout);
    }
}
