//! Environment Commands

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Subcommand;
use serde::Serialize;

use shopcheck_common::config::{resolve_name, EnvironmentInfo};
use shopcheck_common::Environments;

use super::{Context, DEFAULT_CONFIG_PATH};
use crate::output::{print_item, print_list, print_success, OutputFormat, TableDisplay};

#[derive(Debug, Subcommand)]
pub enum EnvCommands {
    /// Show the selected environment
    Show,

    /// List configured environments
    List,

    /// Write the built-in environments to a file for editing
    Init {
        /// Destination file
        #[arg(default_value = DEFAULT_CONFIG_PATH)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl TableDisplay for EnvironmentInfo {
    fn headers() -> Vec<&'static str> {
        vec!["Environment", "UI URL", "API URL", "Timeout", "Retries", "Default User", "Browser", "Headless"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.environment.clone(),
            self.ui_url.clone(),
            self.api_url.clone(),
            format!("{}ms", self.timeout_ms),
            self.retries.to_string(),
            self.default_user.clone(),
            self.browser.clone(),
            self.headless.to_string(),
        ]
    }
}

#[derive(Serialize)]
struct EnvironmentRow {
    name: String,
    ui_url: String,
    api_url: String,
    selected: bool,
}

impl TableDisplay for EnvironmentRow {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "UI URL", "API URL", "Selected"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.ui_url.clone(),
            self.api_url.clone(),
            if self.selected { "*".into() } else { String::new() },
        ]
    }
}

fn rows(environments: &Environments, selected: &str) -> Result<Vec<EnvironmentRow>> {
    environments
        .available()
        .into_iter()
        .map(|name| {
            let config = environments.get(&name)?;
            Ok(EnvironmentRow {
                selected: name == selected,
                ui_url: config.base_url.clone(),
                api_url: config.api_base_url.clone(),
                name,
            })
        })
        .collect()
}

pub async fn execute(cmd: EnvCommands, ctx: &Context) -> Result<()> {
    match cmd {
        EnvCommands::Show => {
            let info = ctx.environment()?.info();
            match ctx.format {
                OutputFormat::Plain => println!("{}", info),
                format => print_item(&info, format),
            }
        }

        EnvCommands::List => {
            let environments = ctx.environments()?;
            let selected = resolve_name(ctx.env.as_deref(), |key| std::env::var(key).ok());
            print_list(&rows(&environments, &selected)?, ctx.format);
        }

        EnvCommands::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Environments::builtin()?.save(&path)?;
            print_success(&format!("Wrote environments to {}", path.display()));
        }
    }

    Ok(())
}
