//! Preflight Command

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use shopcheck_e2e::preflight::{self, TargetStatus};

use super::Context;
use crate::output::{print_list, print_success, TableDisplay};

#[derive(Debug, Args)]
pub struct PreflightArgs {
    /// Seconds to keep polling before giving up
    #[arg(short, long, default_value_t = preflight::DEFAULT_DEADLINE.as_secs())]
    pub deadline: u64,
}

impl TableDisplay for TargetStatus {
    fn headers() -> Vec<&'static str> {
        vec!["Target", "URL", "Status", "Attempts", "Elapsed"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.url.clone(),
            self.status.to_string(),
            self.attempts.to_string(),
            format!("{}ms", self.elapsed_ms),
        ]
    }
}

pub async fn execute(args: PreflightArgs, ctx: &Context) -> Result<()> {
    let environment = ctx.environment()?;
    let settings = environment.run_settings();

    let report = preflight::run(&settings, Duration::from_secs(args.deadline)).await?;
    print_list(&report.targets, ctx.format);
    print_success(&format!(
        "{} is reachable ({} requests, {}ms)",
        environment.name, report.attempts, report.elapsed_ms
    ));
    Ok(())
}
