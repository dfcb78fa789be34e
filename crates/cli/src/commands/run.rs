//! Run Command

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use shopcheck_common::{Browser, RunSettings};
use shopcheck_e2e::playwright::check_playwright_installed;
use shopcheck_e2e::{
    catalogue, preflight, PlaywrightConfig, PlaywrightFactory, ResultStatus, RunFilter, Scenario,
    ScenarioKind, SuiteResult, SuiteRunner, TestResult,
};

use super::Context;
use crate::output::{
    print_info, print_list, print_success, print_value, print_warning, OutputFormat, TableDisplay,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Ui,
    Api,
}

impl From<KindArg> for ScenarioKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Ui => ScenarioKind::Ui,
            KindArg::Api => ScenarioKind::Api,
        }
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Only UI or only API scenarios
    #[arg(short, long, value_enum)]
    pub kind: Option<KindArg>,

    /// Run scenarios carrying any of these tags (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Case-insensitive substring of "<suite> > <scenario>"
    #[arg(short, long)]
    pub grep: Option<String>,

    /// Browser for UI scenarios (chromium, firefox, webkit)
    #[arg(short, long)]
    pub browser: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Retries per failed scenario
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Stop at the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Directory for results and screenshots
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// List the selected scenarios without running them
    #[arg(long)]
    pub list: bool,

    /// Wait for the storefront and API to answer before running
    #[arg(long)]
    pub preflight: bool,
}

impl RunArgs {
    fn filter(&self) -> RunFilter {
        RunFilter {
            kind: self.kind.map(ScenarioKind::from),
            tags: self.tags.clone(),
            grep: self.grep.clone(),
        }
    }

    fn apply(&self, settings: &mut RunSettings) -> Result<()> {
        if let Some(browser) = &self.browser {
            settings.browser = browser.parse::<Browser>()?;
        }
        if self.headed {
            settings.headless = false;
        }
        settings.video = !settings.headless;
        if let Some(retries) = self.retries {
            settings.run_mode_retries = retries;
        }
        if self.fail_fast {
            settings.fail_fast = true;
        }
        if let Some(dir) = &self.output {
            settings.artifacts_dir = dir.clone();
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ScenarioRow {
    id: String,
    kind: ScenarioKind,
    tags: Vec<&'static str>,
}

impl From<&Scenario> for ScenarioRow {
    fn from(scenario: &Scenario) -> Self {
        Self {
            id: scenario.id(),
            kind: scenario.kind,
            tags: scenario.tags.to_vec(),
        }
    }
}

impl TableDisplay for ScenarioRow {
    fn headers() -> Vec<&'static str> {
        vec!["Scenario", "Kind", "Tags"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.clone(), self.kind.to_string(), self.tags.join(", ")]
    }
}

fn status_label(status: ResultStatus) -> String {
    match status {
        ResultStatus::Passed => "passed".green().to_string(),
        ResultStatus::Failed => "failed".red().bold().to_string(),
        ResultStatus::Skipped => "skipped".yellow().to_string(),
    }
}

impl TableDisplay for TestResult {
    fn headers() -> Vec<&'static str> {
        vec!["Scenario", "Kind", "Status", "Attempts", "Duration", "Error"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.test_id.clone(),
            self.kind.to_string(),
            status_label(self.status),
            self.attempts.to_string(),
            format!("{}ms", self.duration_ms),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

fn print_summary(suite: &SuiteResult) {
    println!("{}", "━".repeat(60).dimmed());
    println!(
        "{} {} total, {} passed, {} failed, {} skipped in {:.1}s",
        "Results:".bold(),
        suite.total,
        suite.passed.to_string().green(),
        suite.failed.to_string().red(),
        suite.skipped.to_string().yellow(),
        suite.duration_ms as f64 / 1000.0
    );
}

/// Browser sessions for the run, or `None` when UI scenarios will be skipped
async fn drivers(args: &RunArgs, settings: &RunSettings, selected: &[&Scenario]) -> Result<Option<Arc<PlaywrightFactory>>> {
    if !selected.iter().any(|s| s.kind == ScenarioKind::Ui) {
        return Ok(None);
    }
    match check_playwright_installed().await {
        Ok(()) => Ok(Some(Arc::new(PlaywrightFactory::new(PlaywrightConfig::from_settings(settings))))),
        Err(e) if args.kind == Some(KindArg::Ui) => Err(e.into()),
        Err(e) => {
            print_warning(&format!("{}; UI scenarios will be skipped", e));
            Ok(None)
        }
    }
}

pub async fn execute(args: RunArgs, ctx: &Context) -> Result<()> {
    let environment = ctx.environment()?;
    let mut settings = environment.run_settings();
    args.apply(&mut settings)?;

    let scenarios = catalogue();
    let filter = args.filter();
    let selected: Vec<&Scenario> = scenarios.iter().filter(|s| filter.matches(s)).collect();

    if args.list {
        let rows: Vec<ScenarioRow> = selected.iter().map(|s| ScenarioRow::from(*s)).collect();
        print_list(&rows, ctx.format);
        return Ok(());
    }
    if selected.is_empty() {
        bail!("no scenarios match the given filters");
    }

    if args.preflight {
        let report = preflight::run(&settings, preflight::DEFAULT_DEADLINE).await?;
        info!("Preflight passed after {} requests", report.attempts);
    }

    info!(
        "Running {} scenarios against {} ({})",
        selected.len(),
        environment.name,
        settings.base_url
    );

    let api = Arc::new(ctx.api(&environment)?.with_timeout(settings.request_timeout));
    let mut runner = SuiteRunner::new(environment, api).with_settings(settings.clone());
    if let Some(factory) = drivers(&args, &settings, &selected).await? {
        runner = runner.with_drivers(factory);
    }

    let suite = runner.run(&scenarios, &filter).await;
    let path = runner.write_results(&suite)?;

    match ctx.format {
        OutputFormat::Json | OutputFormat::Yaml => print_value(&suite, ctx.format),
        _ => {
            print_list(&suite.results, ctx.format);
            print_summary(&suite);
            print_info(&format!("Results written to {}", path.display()));
        }
    }

    if !suite.success() {
        bail!("{} of {} scenarios failed", suite.failed, suite.total);
    }
    print_success("All scenarios passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use shopcheck_common::Environments;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        args: RunArgs,
    }

    fn parse(argv: &[&str]) -> RunArgs {
        Cli::parse_from(std::iter::once("run").chain(argv.iter().copied())).args
    }

    #[test]
    fn test_filter_from_flags() {
        let args = parse(&["--kind", "api", "-t", "smoke", "-t", "negative", "-g", "login"]);
        let filter = args.filter();
        assert_eq!(filter.kind, Some(ScenarioKind::Api));
        assert_eq!(filter.tags, vec!["smoke", "negative"]);
        assert_eq!(filter.grep.as_deref(), Some("login"));
    }

    #[test]
    fn test_flags_override_settings() {
        let mut settings = Environments::builtin()
            .unwrap()
            .current(Some("qa"))
            .unwrap()
            .run_settings();
        let args = parse(&["--browser", "firefox", "--headed", "--retries", "3", "--fail-fast", "-o", "out"]);
        args.apply(&mut settings).unwrap();

        assert_eq!(settings.browser, Browser::Firefox);
        assert!(!settings.headless);
        assert_eq!(settings.run_mode_retries, 3);
        assert!(settings.fail_fast);
        assert_eq!(settings.artifacts_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_headed_runs_record_video() {
        let mut settings = Environments::builtin()
            .unwrap()
            .current(Some("qa"))
            .unwrap()
            .run_settings();
        assert!(!settings.video);

        parse(&[]).apply(&mut settings).unwrap();
        assert!(!settings.video);
        parse(&["--headed"]).apply(&mut settings).unwrap();
        assert!(settings.video);
    }

    #[test]
    fn test_unknown_browser_is_rejected() {
        let mut settings = Environments::builtin()
            .unwrap()
            .current(Some("qa"))
            .unwrap()
            .run_settings();
        assert!(parse(&["--browser", "lynx"]).apply(&mut settings).is_err());
    }

    #[test]
    fn test_scenario_rows() {
        let scenarios = catalogue();
        let row = ScenarioRow::from(&scenarios[0]);
        assert_eq!(row.row()[0], scenarios[0].id());
        assert_eq!(row.row().len(), ScenarioRow::headers().len());
    }
}
