//! Environment configuration
//!
//! Environments are named tables in a TOML file. A copy of the stock
//! environments is compiled in and used whenever no file is present.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::LoginCredentials;

const BUILTIN_ENVIRONMENTS: &str = include_str!("../environments.toml");

/// Environment used when nothing else selects one
pub const DEFAULT_ENVIRONMENT: &str = "qa";

/// Variables consulted, in order, when no environment is named explicitly
pub const ENVIRONMENT_VARS: [&str; 2] = ["TEST_ENV", "SHOPCHECK_ENV"];

/// Browser engine driven by the UI scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
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
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(Error::InvalidConfig(format!("unknown browser: {}", other))),
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
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Per-operation timeouts in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    pub default: u64,
    pub request: u64,
    pub response: u64,
    pub page_load: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default: 10_000,
            request: 15_000,
            response: 15_000,
            page_load: 30_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultUser {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

impl DefaultUser {
    pub fn credentials(&self) -> LoginCredentials {
        let mut creds = LoginCredentials::new(&self.email, &self.password);
        creds.first_name = self.first_name.clone();
        creds
    }
}

/// One named environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub base_url: String,
    pub api_base_url: String,
    pub default_user: DefaultUser,

    /// Request/response/page-load budget in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries per scenario in run mode
    #[serde(default)]
    pub retries: u32,

    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default)]
    pub browser: Browser,

    #[serde(default)]
    pub viewport: Viewport,

    #[serde(default)]
    pub timeouts: Timeouts,
}

fn default_timeout_ms() -> u64 {
    15_000
}

impl Default for DefaultUser {
    fn default() -> Self {
        Self {
            email: crate::factory::user::VALID_EMAIL.to_string(),
            password: crate::factory::user::VALID_PASSWORD.to_string(),
            first_name: Some("Bill".to_string()),
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            base_url: crate::DEFAULT_BASE_URL.to_string(),
            api_base_url: crate::DEFAULT_API_BASE_URL.to_string(),
            default_user: DefaultUser::default(),
            timeout_ms: default_timeout_ms(),
            retries: 0,
            headless: default_headless(),
            browser: Browser::default(),
            viewport: Viewport::default(),
            timeouts: Timeouts::default(),
        }
    }
}

fn default_headless() -> bool {
    true
}

impl EnvironmentConfig {
    /// Apply the documented environment-variable overrides. Empty or
    /// unparseable values leave the configured value in place.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("UI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(url) = get("API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(timeout) = get("TIMEOUT").and_then(|v| v.trim().parse().ok()) {
            self.timeout_ms = timeout;
        }
        if let Some(retries) = get("RETRIES").and_then(|v| v.trim().parse().ok()) {
            self.retries = retries;
        }
        if let Some(headless) = get("HEADLESS").and_then(|v| parse_bool(&v)) {
            self.headless = headless;
        }
        if let Some(email) = get("DEFAULT_USER_EMAIL") {
            self.default_user.email = email;
        }
        if let Some(password) = get("DEFAULT_USER_PASSWORD") {
            self.default_user.password = password;
        }
        self
    }

    /// Overrides read from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Settings the runner and drivers work from
    pub fn run_settings(&self, name: &str) -> RunSettings {
        let production = is_production_name(name);
        RunSettings {
            environment: name.to_string(),
            base_url: self.base_url.clone(),
            api_base_url: self.api_base_url.clone(),
            browser: self.browser,
            headless: self.headless,
            viewport: self.viewport,
            command_timeout: Duration::from_millis(self.timeouts.default),
            request_timeout: self.timeout(),
            response_timeout: self.timeout(),
            page_load_timeout: self.timeout().max(Duration::from_millis(self.timeouts.page_load)),
            scenario_timeout: self.timeout() + Duration::from_secs(5),
            run_mode_retries: self.retries,
            open_mode_retries: 0,
            video: !self.headless,
            screenshot_on_failure: true,
            fail_fast: production,
            artifacts_dir: PathBuf::from("test-results"),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn is_production_name(name: &str) -> bool {
    matches!(name, "prod" | "production")
}

/// Effective settings for one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSettings {
    pub environment: String,
    pub base_url: String,
    pub api_base_url: String,
    pub browser: Browser,
    pub headless: bool,
    pub viewport: Viewport,
    pub command_timeout: Duration,
    pub request_timeout: Duration,
    pub response_timeout: Duration,
    pub page_load_timeout: Duration,
    /// Hard ceiling on a single API scenario attempt
    pub scenario_timeout: Duration,
    pub run_mode_retries: u32,
    pub open_mode_retries: u32,
    pub video: bool,
    pub screenshot_on_failure: bool,
    /// Stop at the first failed scenario
    pub fail_fast: bool,
    pub artifacts_dir: PathBuf,
}

impl RunSettings {
    pub fn screenshots_dir(&self) -> PathBuf {
        self.artifacts_dir.join("screenshots")
    }
}

/// All configured environments, keyed by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environments {
    environments: BTreeMap<String, EnvironmentConfig>,
}

impl Environments {
    /// The stock environments compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_ENVIRONMENTS)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let environments: BTreeMap<String, EnvironmentConfig> = toml::from_str(content)?;
        if environments.is_empty() {
            return Err(Error::InvalidConfig("no environments defined".to_string()));
        }
        Ok(Self { environments })
    }

    /// Load environments from file, falling back to the built-in set when
    /// the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading environments from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            debug!("{} not found, using built-in environments", path.display());
            Self::builtin()
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&EnvironmentConfig> {
        self.environments
            .get(name)
            .ok_or_else(|| Error::UnknownEnvironment {
                name: name.to_string(),
                available: self.available(),
            })
    }

    pub fn available(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }

    pub fn validate(&self, name: &str) -> bool {
        self.environments.contains_key(name)
    }

    /// Resolve an environment by name and apply the process-environment
    /// overrides in one go
    pub fn current(&self, explicit: Option<&str>) -> Result<ActiveEnvironment> {
        let name = resolve_name(explicit, |key| std::env::var(key).ok());
        let config = self.get(&name)?.clone().with_env_overrides();
        Ok(ActiveEnvironment { name, config })
    }
}

/// Pick the environment name: explicit argument, then `TEST_ENV`, then
/// `SHOPCHECK_ENV`, then [`DEFAULT_ENVIRONMENT`]
pub fn resolve_name<F>(explicit: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .map(str::to_string)
        .filter(|name| !name.is_empty())
        .or_else(|| {
            ENVIRONMENT_VARS
                .iter()
                .find_map(|key| lookup(key).filter(|v| !v.is_empty()))
        })
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

/// A resolved environment with overrides applied
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEnvironment {
    pub name: String,
    pub config: EnvironmentConfig,
}

impl ActiveEnvironment {
    pub fn new(name: impl Into<String>, config: EnvironmentConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    pub fn is_local(&self) -> bool {
        self.name == "local" || self.name == "development"
    }

    pub fn is_qa(&self) -> bool {
        self.name == "qa"
    }

    pub fn is_staging(&self) -> bool {
        self.name == "staging"
    }

    pub fn is_production(&self) -> bool {
        is_production_name(&self.name)
    }

    pub fn run_settings(&self) -> RunSettings {
        self.config.run_settings(&self.name)
    }

    pub fn info(&self) -> EnvironmentInfo {
        EnvironmentInfo {
            environment: self.name.clone(),
            api_url: self.config.api_base_url.clone(),
            ui_url: self.config.base_url.clone(),
            timeout_ms: self.config.timeout_ms,
            retries: self.config.retries,
            default_user: self.config.default_user.email.clone(),
            headless: self.config.headless,
            browser: self.config.browser.as_str().to_string(),
        }
    }
}

/// Printable summary of an environment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentInfo {
    pub environment: String,
    pub api_url: String,
    pub ui_url: String,
    pub timeout_ms: u64,
    pub retries: u32,
    pub default_user: String,
    pub headless: bool,
    pub browser: String,
}

impl std::fmt::Display for EnvironmentInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Environment: {}", self.environment.to_uppercase())?;
        writeln!(f, "API URL: {}", self.api_url)?;
        writeln!(f, "UI URL: {}", self.ui_url)?;
        writeln!(f, "Timeout: {}ms", self.timeout_ms)?;
        writeln!(f, "Retries: {}", self.retries)?;
        writeln!(f, "Default User: {}", self.default_user)?;
        writeln!(f, "Browser: {}", self.browser)?;
        write!(f, "Headless: {}", if self.headless { "Yes" } else { "No" })
    }
}
