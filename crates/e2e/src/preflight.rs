//! Reachability checks run before a suite

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

use shopcheck_common::RunSettings;

use crate::error::{E2eError, E2eResult};

/// Per-request budget while polling
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub url: String,
}

impl Target {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Storefront home page and the product list endpoint
pub fn targets(settings: &RunSettings) -> Vec<Target> {
    vec![
        Target::new("storefront", settings.base_url.clone()),
        Target::new(
            "api",
            format!("{}/productsList", settings.api_base_url.trim_end_matches('/')),
        ),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetStatus {
    pub name: String,
    pub url: String,
    pub status: u16,
    pub attempts: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightReport {
    pub targets: Vec<TargetStatus>,
    /// Requests sent across all targets
    pub attempts: usize,
    pub elapsed_ms: u64,
}

/// Poll every target until each answers with a success status. All
/// targets share one deadline.
pub async fn check(targets: &[Target], deadline: Duration) -> E2eResult<PreflightReport> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    let start = Instant::now();
    let mut report = PreflightReport {
        targets: Vec::with_capacity(targets.len()),
        attempts: 0,
        elapsed_ms: 0,
    };

    for target in targets {
        let target_start = Instant::now();
        let mut attempts = 0;
        loop {
            attempts += 1;
            report.attempts += 1;

            match client.get(&target.url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    info!("{} is up at {} ({} attempts)", target.name, target.url, attempts);
                    report.targets.push(TargetStatus {
                        name: target.name.clone(),
                        url: target.url.clone(),
                        status: resp.status().as_u16(),
                        attempts,
                        elapsed_ms: target_start.elapsed().as_millis() as u64,
                    });
                    break;
                }
                Ok(resp) => {
                    warn!("{} returned {}", target.name, resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for {} at {}...", target.name, target.url);
                    }
                    if !e.is_connect() {
                        warn!("{} check error: {}", target.name, e);
                    }
                }
            }

            if start.elapsed() >= deadline {
                return Err(E2eError::Unreachable {
                    target: format!("{} ({})", target.name, target.url),
                    attempts,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    report.elapsed_ms = start.elapsed().as_millis() as u64;
    Ok(report)
}

/// Check the environment's storefront and API
pub async fn run(settings: &RunSettings, deadline: Duration) -> E2eResult<PreflightReport> {
    check(&targets(settings), deadline).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopcheck_common::Environments;

    #[test]
    fn test_targets_from_settings() {
        let settings = Environments::builtin()
            .unwrap()
            .current(Some("qa"))
            .unwrap()
            .run_settings();
        let targets = targets(&settings);
        assert_eq!(targets[0].url, settings.base_url);
        assert!(targets[1].url.ends_with("/productsList"));
    }

    #[tokio::test]
    async fn test_unreachable_target() {
        let target = Target::new("nothing", "http://127.0.0.1:9/");
        let err = check(&[target], Duration::from_millis(300)).await.unwrap_err();
        match err {
            E2eError::Unreachable { target, attempts } => {
                assert!(target.starts_with("nothing"));
                assert!(attempts >= 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
