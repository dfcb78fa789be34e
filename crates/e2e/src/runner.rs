//! Scenario runner: isolation, retries, cleanup and result reporting

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use shopcheck_api::{ApiFactory, ProductService, UserService};
use shopcheck_common::logging::{self, TestStatus};
use shopcheck_common::{ActiveEnvironment, RunSettings};

use crate::driver::{Driver, DriverFactory};
use crate::error::{E2eError, E2eResult};
use crate::pages::Session;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid regex"));

pub type ScenarioFuture<'a> = BoxFuture<'a, E2eResult<()>>;
pub type ScenarioFn = for<'a> fn(&'a ScenarioContext) -> ScenarioFuture<'a>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Ui,
    Api,
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioKind::Ui => write!(f, "ui"),
            ScenarioKind::Api => write!(f, "api"),
        }
    }
}

/// One named check
#[derive(Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub suite: &'static str,
    pub tags: &'static [&'static str],
    pub kind: ScenarioKind,
    pub body: ScenarioFn,
}

impl Scenario {
    pub fn ui(suite: &'static str, name: &'static str, tags: &'static [&'static str], body: ScenarioFn) -> Self {
        Self {
            name,
            suite,
            tags,
            kind: ScenarioKind::Ui,
            body,
        }
    }

    pub fn api(suite: &'static str, name: &'static str, tags: &'static [&'static str], body: ScenarioFn) -> Self {
        Self {
            kind: ScenarioKind::Api,
            ..Self::ui(suite, name, tags, body)
        }
    }

    pub fn id(&self) -> String {
        format!("{} > {}", self.suite, self.name)
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("suite", &self.suite)
            .field("tags", &self.tags)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Which scenarios to run. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    pub kind: Option<ScenarioKind>,
    /// Any of these tags
    pub tags: Vec<String>,
    /// Case-insensitive substring of the scenario id
    pub grep: Option<String>,
}

impl RunFilter {
    pub fn matches(&self, scenario: &Scenario) -> bool {
        if self.kind.is_some_and(|k| k != scenario.kind) {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| scenario.tags.contains(&t.as_str())) {
            return false;
        }
        match &self.grep {
            Some(needle) => scenario
                .id()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

type Cleanup = (String, BoxFuture<'static, E2eResult<()>>);

/// Everything a scenario body can reach
pub struct ScenarioContext {
    name: String,
    environment: ActiveEnvironment,
    settings: RunSettings,
    api: Arc<ApiFactory>,
    driver: Option<Box<dyn Driver>>,
    cleanups: Mutex<Vec<Cleanup>>,
}

impl ScenarioContext {
    pub fn new(
        name: impl Into<String>,
        environment: ActiveEnvironment,
        settings: RunSettings,
        api: Arc<ApiFactory>,
        driver: Option<Box<dyn Driver>>,
    ) -> Self {
        Self {
            name: name.into(),
            environment,
            settings,
            api,
            driver,
            cleanups: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &ActiveEnvironment {
        &self.environment
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn api(&self) -> &ApiFactory {
        &self.api
    }

    pub fn user_service(&self) -> UserService {
        self.api.user_service()
    }

    pub fn product_service(&self) -> ProductService {
        self.api.product_service()
    }

    pub fn driver(&self) -> E2eResult<&dyn Driver> {
        self.driver
            .as_deref()
            .ok_or_else(|| E2eError::NoDriver(self.name.clone()))
    }

    /// Page session with the environment's storefront URL and timeouts
    pub fn session(&self) -> E2eResult<Session<'_>> {
        Ok(Session::new(self.driver()?, &self.settings.base_url)
            .with_timeouts(self.settings.command_timeout, self.settings.page_load_timeout))
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.settings.screenshots_dir()
    }

    /// Register work to run after the body, pass or fail. Cleanups run in
    /// reverse registration order.
    pub fn defer<F>(&self, name: impl Into<String>, cleanup: F)
    where
        F: Future<Output = E2eResult<()>> + Send + 'static,
    {
        self.cleanups.lock().push((name.into(), Box::pin(cleanup)));
    }

    pub fn pending_cleanups(&self) -> usize {
        self.cleanups.lock().len()
    }

    /// Run and drain every deferred cleanup; failures are logged only
    pub async fn run_cleanups(&self) {
        let cleanups: Vec<Cleanup> = std::mem::take(&mut *self.cleanups.lock());
        for (name, cleanup) in cleanups.into_iter().rev() {
            match cleanup.await {
                Ok(()) => debug!("Cleanup done: {}", name),
                Err(e) => warn!("Cleanup failed: {} - {}", name, e),
            }
        }
    }

    fn into_driver(self) -> Option<Box<dyn Driver>> {
        self.driver
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub test_id: String,
    pub suite: String,
    pub kind: ScenarioKind,
    pub status: ResultStatus,
    pub duration_ms: u64,
    pub attempts: u32,
    pub error: Option<String>,
    pub screenshots: Vec<String>,
}

/// Result of running all selected scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub environment: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Screenshot file name for a failed scenario
pub fn failure_screenshot_name(test_id: &str) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(test_id, "_");
    format!("failed_{}.png", cleaned.trim_matches('_'))
}

pub struct SuiteRunner {
    environment: ActiveEnvironment,
    settings: RunSettings,
    api: Arc<ApiFactory>,
    drivers: Option<Arc<dyn DriverFactory>>,
}

impl SuiteRunner {
    pub fn new(environment: ActiveEnvironment, api: Arc<ApiFactory>) -> Self {
        let settings = environment.run_settings();
        Self {
            environment,
            settings,
            api,
            drivers: None,
        }
    }

    /// Browser sessions for UI scenarios; without one they are skipped
    pub fn with_drivers(mut self, drivers: Arc<dyn DriverFactory>) -> Self {
        self.drivers = Some(drivers);
        self
    }

    pub fn with_settings(mut self, settings: RunSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Run every scenario the filter selects, in catalogue order
    pub async fn run(&self, scenarios: &[Scenario], filter: &RunFilter) -> SuiteResult {
        let start = Instant::now();
        let started_at = Utc::now();
        let selected: Vec<&Scenario> = scenarios.iter().filter(|s| filter.matches(s)).collect();

        info!(
            "Running {} scenario(s) against {} ({})",
            selected.len(),
            self.environment.name,
            self.settings.base_url
        );

        let mut results = Vec::with_capacity(selected.len());
        let mut stop = false;
        for scenario in selected {
            let result = if stop {
                skipped(scenario, "skipped after an earlier failure")
            } else {
                self.run_scenario(scenario).await
            };
            match result.status {
                ResultStatus::Passed => info!("✓ {} ({} ms)", result.test_id, result.duration_ms),
                ResultStatus::Failed => {
                    error!(
                        "✗ {} - {}",
                        result.test_id,
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                    stop = self.settings.fail_fast;
                }
                ResultStatus::Skipped => info!("- {} (skipped)", result.test_id),
            }
            results.push(result);
        }

        let count = |status: ResultStatus| results.iter().filter(|r| r.status == status).count();
        let suite = SuiteResult {
            environment: self.environment.name.clone(),
            started_at,
            total: results.len(),
            passed: count(ResultStatus::Passed),
            failed: count(ResultStatus::Failed),
            skipped: count(ResultStatus::Skipped),
            duration_ms: start.elapsed().as_millis() as u64,
            results,
        };
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            suite.passed, suite.failed, suite.skipped, suite.duration_ms
        );
        suite
    }

    /// Run one scenario, retrying up to the run-mode retry count
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        let drivers = match (scenario.kind, &self.drivers) {
            (ScenarioKind::Ui, None) => return skipped(scenario, "no browser driver configured"),
            (ScenarioKind::Ui, Some(drivers)) => Some(drivers.clone()),
            (ScenarioKind::Api, _) => None,
        };

        let start = Instant::now();
        let max_attempts = 1 + self.settings.run_mode_retries;
        let mut screenshots = Vec::new();
        let mut last_error = None;
        let mut attempts = 0;

        while attempts < max_attempts {
            attempts += 1;
            if attempts > 1 {
                warn!("Retrying {} (attempt {}/{})", scenario.id(), attempts, max_attempts);
            }
            match self.run_attempt(scenario, drivers.as_deref(), &mut screenshots).await {
                Ok(()) => {
                    last_error = None;
                    break;
                }
                Err(e) => last_error = Some(e.to_string()),
            }
        }

        TestResult {
            test_id: scenario.id(),
            suite: scenario.suite.to_string(),
            kind: scenario.kind,
            status: if last_error.is_none() {
                ResultStatus::Passed
            } else {
                ResultStatus::Failed
            },
            duration_ms: start.elapsed().as_millis() as u64,
            attempts,
            error: last_error,
            screenshots,
        }
    }

    async fn run_attempt(
        &self,
        scenario: &Scenario,
        drivers: Option<&dyn DriverFactory>,
        screenshots: &mut Vec<String>,
    ) -> E2eResult<()> {
        let test_id = scenario.id();
        let driver = match drivers {
            Some(factory) => Some(self.prepare_driver(factory).await?),
            None => None,
        };
        let ctx = ScenarioContext::new(
            test_id.clone(),
            self.environment.clone(),
            self.settings.clone(),
            self.api.clone(),
            driver,
        );

        logging::test_start(&test_id);
        let outcome = match scenario.kind {
            ScenarioKind::Api => tokio::time::timeout(self.settings.scenario_timeout, (scenario.body)(&ctx))
                .await
                .unwrap_or_else(|_| {
                    Err(E2eError::Timeout(format!(
                        "{} exceeded {}ms",
                        test_id,
                        self.settings.scenario_timeout.as_millis()
                    )))
                }),
            ScenarioKind::Ui => (scenario.body)(&ctx).await,
        };
        ctx.run_cleanups().await;

        if outcome.is_err() && self.settings.screenshot_on_failure {
            if let Ok(driver) = ctx.driver() {
                let path = self.settings.screenshots_dir().join(failure_screenshot_name(&test_id));
                match driver.screenshot(&path, true).await {
                    Ok(()) => {
                        let shown = path.display().to_string();
                        if !screenshots.contains(&shown) {
                            screenshots.push(shown);
                        }
                    }
                    Err(e) => warn!("Could not capture failure screenshot: {}", e),
                }
            }
        }

        logging::test_end(
            &test_id,
            if outcome.is_ok() {
                TestStatus::Passed
            } else {
                TestStatus::Failed
            },
        );

        if let Some(driver) = ctx.into_driver() {
            if let Err(e) = driver.close().await {
                warn!("Browser did not close cleanly: {}", e);
            }
        }
        outcome
    }

    /// Fresh browser with no cookies or storage at the configured viewport.
    /// A browser that cannot be reset is closed before the error returns.
    async fn prepare_driver(&self, factory: &dyn DriverFactory) -> E2eResult<Box<dyn Driver>> {
        let driver = factory.launch().await?;
        if let Err(e) = self.reset_driver(driver.as_ref()).await {
            if let Err(close) = driver.close().await {
                warn!("Browser did not close cleanly: {}", close);
            }
            return Err(e);
        }
        Ok(driver)
    }

    async fn reset_driver(&self, driver: &dyn Driver) -> E2eResult<()> {
        driver.clear_cookies().await?;
        driver.clear_local_storage().await?;
        driver.set_viewport(self.settings.viewport).await
    }

    /// Write results to `test-results.json` under the artifacts directory
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.settings.artifacts_dir)?;

        let path = self.settings.artifacts_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

fn skipped(scenario: &Scenario, reason: &str) -> TestResult {
    TestResult {
        test_id: scenario.id(),
        suite: scenario.suite.to_string(),
        kind: scenario.kind,
        status: ResultStatus::Skipped,
        duration_ms: 0,
        attempts: 0,
        error: Some(reason.to_string()),
        screenshots: Vec::new(),
    }
}
