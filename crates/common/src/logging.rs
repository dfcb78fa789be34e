//! Logging setup and the suite's log vocabulary

use std::fmt::Display;
use std::future::Future;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool, json: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| Error::Logging(e.to_string()))
}

/// Outcome of a finished test, as logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    Passed,
    Failed,
}

pub fn step(name: &str) {
    info!(step = name, "Step: {}", name);
}

/// Run `action` as a named step, logging completion or failure
pub async fn step_with<F, Fut, T, E>(name: &str, action: F) -> std::result::Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    step(name);
    match action().await {
        Ok(value) => {
            info!(step = name, "Step completed: {}", name);
            Ok(value)
        }
        Err(e) => {
            error!(step = name, "Step failed: {} - {}", name, e);
            Err(e)
        }
    }
}

pub fn test_start(name: &str) {
    info!(test = name, "Test started: {}", name);
}

pub fn test_end(name: &str, status: TestStatus) {
    match status {
        TestStatus::Passed => info!(test = name, "Test passed: {}", name),
        TestStatus::Failed => error!(test = name, "Test failed: {}", name),
    }
}

pub fn api_request(method: &str, url: &str, status: Option<u16>) {
    match status {
        Some(code) => info!("API {} {} - Status: {}", method, url, code),
        None => info!("API {} {} - Status: pending", method, url),
    }
}

pub fn page_action(action: &str, element: Option<&str>) {
    match element {
        Some(el) => info!("Page action: {} on {}", action, el),
        None => info!("Page action: {}", action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_step_with_passes_value_through() {
        let out = step_with("add", || async { Ok::<_, String>(2 + 2) }).await;
        assert_eq!(out, Ok(4));
    }

    #[tokio::test]
    async fn test_step_with_reraises() {
        let out = step_with("boom", || async { Err::<(), _>("nope".to_string()) }).await;
        assert_eq!(out, Err("nope".to_string()));
    }
}
