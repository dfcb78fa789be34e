//! Polling waits over a [`Driver`]

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

use crate::driver::{BoundingBox, Driver};
use crate::error::{E2eError, E2eResult};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);
pub const STABLE_WINDOW: Duration = Duration::from_secs(2);
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

const READY_STATE: &str = "document.readyState";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    Visible,
    Hidden,
    Enabled,
    Disabled,
    Exists,
    NotExists,
    ContainsText(String),
    HasValue(String),
}

impl WaitCondition {
    async fn holds(&self, driver: &dyn Driver, selector: &str) -> E2eResult<bool> {
        let present = driver.count(selector).await? > 0;
        Ok(match self {
            Self::Visible => driver.is_visible(selector).await?,
            Self::Hidden => !present || !driver.is_visible(selector).await?,
            Self::Enabled => present && driver.is_enabled(selector).await?,
            Self::Disabled => present && !driver.is_enabled(selector).await?,
            Self::Exists => present,
            Self::NotExists => !present,
            Self::ContainsText(text) => present && driver.text(selector).await?.contains(text.as_str()),
            Self::HasValue(value) => present && driver.value(selector).await? == *value,
        })
    }
}

impl std::fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Visible => write!(f, "visible"),
            Self::Hidden => write!(f, "hidden"),
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
            Self::Exists => write!(f, "exists"),
            Self::NotExists => write!(f, "not exists"),
            Self::ContainsText(text) => write!(f, "contains text {:?}", text),
            Self::HasValue(value) => write!(f, "has value {:?}", value),
        }
    }
}

fn interval(timeout: Duration) -> Duration {
    POLL_INTERVAL.min(timeout / 4).max(Duration::from_millis(10))
}

/// Poll until `condition` holds for `selector`. Driver errors while
/// polling count as "not yet".
pub async fn wait_for(
    driver: &dyn Driver,
    selector: &str,
    condition: WaitCondition,
    timeout: Option<Duration>,
) -> E2eResult<()> {
    let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
    let deadline = Instant::now() + timeout;
    loop {
        match condition.holds(driver, selector).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => debug!("Waiting on {}: {}", selector, e),
        }
        if Instant::now() >= deadline {
            return Err(E2eError::Timeout(format!(
                "Element {} did not become {} within {}ms",
                selector,
                condition,
                timeout.as_millis()
            )));
        }
        tokio::time::sleep(interval(timeout)).await;
    }
}

pub async fn wait_for_element(driver: &dyn Driver, selector: &str, timeout: Option<Duration>) -> E2eResult<()> {
    wait_for(driver, selector, WaitCondition::Visible, timeout).await
}

pub async fn wait_for_element_to_disappear(
    driver: &dyn Driver,
    selector: &str,
    timeout: Option<Duration>,
) -> E2eResult<()> {
    wait_for(driver, selector, WaitCondition::Hidden, timeout).await
}

pub async fn wait_for_text(
    driver: &dyn Driver,
    selector: &str,
    text: &str,
    timeout: Option<Duration>,
) -> E2eResult<()> {
    wait_for(driver, selector, WaitCondition::ContainsText(text.to_string()), timeout).await
}

pub async fn wait_for_value(
    driver: &dyn Driver,
    selector: &str,
    value: &str,
    timeout: Option<Duration>,
) -> E2eResult<()> {
    wait_for(driver, selector, WaitCondition::HasValue(value.to_string()), timeout).await
}

/// Wait for `document.readyState` to reach `complete`
pub async fn wait_for_page_load(driver: &dyn Driver, timeout: Option<Duration>) -> E2eResult<()> {
    let timeout = timeout.unwrap_or(PAGE_LOAD_TIMEOUT);
    let deadline = Instant::now() + timeout;
    loop {
        match driver.evaluate(READY_STATE).await {
            Ok(Value::String(state)) if state == "complete" => return Ok(()),
            Ok(_) => {}
            Err(e) => debug!("Waiting on page load: {}", e),
        }
        if Instant::now() >= deadline {
            return Err(E2eError::Timeout(format!(
                "Page did not finish loading within {}ms",
                timeout.as_millis()
            )));
        }
        tokio::time::sleep(interval(timeout)).await;
    }
}

/// Every selector visible, each within its own timeout
pub async fn wait_for_all(driver: &dyn Driver, selectors: &[&str], timeout: Option<Duration>) -> E2eResult<()> {
    for selector in selectors {
        wait_for_element(driver, selector, timeout).await?;
    }
    Ok(())
}

/// First selector to become visible
pub async fn wait_for_any(
    driver: &dyn Driver,
    selectors: &[&str],
    timeout: Option<Duration>,
) -> E2eResult<String> {
    let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
    let deadline = Instant::now() + timeout;
    loop {
        for selector in selectors {
            if driver.is_visible(selector).await.unwrap_or(false) {
                return Ok(selector.to_string());
            }
        }
        if Instant::now() >= deadline {
            return Err(E2eError::Timeout(format!(
                "None of the elements were found within {}ms: {}",
                timeout.as_millis(),
                selectors.join(", ")
            )));
        }
        tokio::time::sleep(interval(timeout)).await;
    }
}

/// Wait until the element's bounding box stops changing for `window`
pub async fn wait_for_stable(
    driver: &dyn Driver,
    selector: &str,
    window: Option<Duration>,
    timeout: Option<Duration>,
) -> E2eResult<()> {
    let window = window.unwrap_or(STABLE_WINDOW);
    let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
    wait_for_element(driver, selector, Some(timeout)).await?;

    let deadline = Instant::now() + timeout;
    let mut last: Option<BoundingBox> = driver.bounding_box(selector).await?;
    let mut since = Instant::now();
    loop {
        tokio::time::sleep(interval(window)).await;
        let current = driver.bounding_box(selector).await?;
        if current != last {
            last = current;
            since = Instant::now();
        } else if since.elapsed() >= window {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(E2eError::Timeout(format!(
                "Element {} did not settle within {}ms",
                selector,
                timeout.as_millis()
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};
    use test_case::test_case;

    const SHORT: Option<Duration> = Some(Duration::from_millis(200));

    #[test_case(WaitCondition::Visible, true; "visible")]
    #[test_case(WaitCondition::Hidden, false; "hidden")]
    #[test_case(WaitCondition::Enabled, false; "enabled")]
    #[test_case(WaitCondition::Disabled, true; "disabled")]
    #[test_case(WaitCondition::Exists, true; "exists")]
    #[test_case(WaitCondition::NotExists, false; "not exists")]
    #[test_case(WaitCondition::ContainsText("Cart".into()), true; "contains text")]
    #[test_case(WaitCondition::HasValue("3".into()), true; "has value")]
    #[tokio::test]
    async fn test_conditions(condition: WaitCondition, expected: bool) {
        let driver = MockDriver::new().with_element(
            "#qty",
            MockElement::new().text("Cart total").value("3").disabled(),
        );
        assert_eq!(condition.holds(&driver, "#qty").await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_missing_element_is_hidden() {
        let driver = MockDriver::new();
        assert!(WaitCondition::Hidden.holds(&driver, "#gone").await.unwrap());
        assert!(!WaitCondition::ContainsText("x".into()).holds(&driver, "#gone").await.unwrap());
    }

    #[tokio::test]
    async fn test_wait_picks_up_late_elements() {
        let driver = MockDriver::new();
        driver.schedule(Duration::from_millis(50), "#toast", Some(MockElement::new()));
        wait_for_element(&driver, "#toast", Some(Duration::from_secs(2))).await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let driver = MockDriver::new();
        let err = wait_for_element(&driver, "#never", SHORT).await.unwrap_err();
        assert!(matches!(err, E2eError::Timeout(_)));
        assert!(err.to_string().contains("#never"));
    }

    #[tokio::test]
    async fn test_wait_for_any_reports_all_selectors() {
        let driver = MockDriver::new().with_element("#b", MockElement::new());
        assert_eq!(wait_for_any(&driver, &["#a", "#b"], SHORT).await.unwrap(), "#b");

        let err = wait_for_any(&driver, &["#x", "#y"], SHORT).await.unwrap_err();
        assert!(err
            .to_string()
            .contains("None of the elements were found within 200ms: #x, #y"));
    }

    #[tokio::test]
    async fn test_page_load_and_stable() {
        let driver = MockDriver::new().with_element("#logo", MockElement::new());
        wait_for_page_load(&driver, SHORT).await.unwrap();
        wait_for_stable(&driver, "#logo", Some(Duration::from_millis(50)), Some(Duration::from_secs(1)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_page_load_times_out_while_loading() {
        let driver = MockDriver::new().on_evaluate(READY_STATE, Value::String("loading".into()));
        assert!(wait_for_page_load(&driver, SHORT).await.is_err());
    }
}
