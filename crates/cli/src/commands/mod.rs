//! CLI Commands

pub mod api;
pub mod data;
pub mod env;
pub mod preflight;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use shopcheck_api::ApiFactory;
use shopcheck_common::{ActiveEnvironment, Environments};

use crate::output::OutputFormat;

/// Where the environment file lives unless `--config` says otherwise
pub const DEFAULT_CONFIG_PATH: &str = "config/environments.toml";

/// Global options every command sees
#[derive(Debug, Clone)]
pub struct Context {
    pub config: PathBuf,
    pub env: Option<String>,
    pub format: OutputFormat,
}

impl Context {
    /// Environments from the config file, or the built-in set when it is missing
    pub fn environments(&self) -> Result<Environments> {
        Environments::load(&self.config)
            .with_context(|| format!("failed to load {}", self.config.display()))
    }

    /// The selected environment with process-environment overrides applied
    pub fn environment(&self) -> Result<ActiveEnvironment> {
        Ok(self.environments()?.current(self.env.as_deref())?)
    }

    pub fn api(&self, environment: &ActiveEnvironment) -> Result<ApiFactory> {
        let api = ApiFactory::from_environment(Some(&environment.config))?;
        Ok(api.with_timeout(environment.config.timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(config: PathBuf, env: Option<&str>) -> Context {
        Context {
            config,
            env: env.map(str::to_string),
            format: OutputFormat::Table,
        }
    }

    #[test]
    fn test_missing_config_uses_builtin_environments() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path().join("absent.toml"), Some("staging"));
        let env = ctx.environment().unwrap();
        assert_eq!(env.name, "staging");
        assert!(env.is_staging());
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("environments.toml");
        std::fs::write(
            &path,
            r#"
[sandbox]
base_url = "http://localhost:8080"
api_base_url = "http://localhost:8080/api"

[sandbox.default_user]
email = "sandbox@example.com"
password = "sandbox"
"#,
        )
        .unwrap();

        let ctx = context(path, Some("sandbox"));
        assert_eq!(ctx.environments().unwrap().available(), vec!["sandbox"]);
        let env = ctx.environment().unwrap();
        assert_eq!(env.config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_unknown_environment_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path().join("absent.toml"), Some("moon"));
        let err = ctx.environment().unwrap_err().to_string();
        assert!(err.contains("moon"), "{}", err);
    }
}
