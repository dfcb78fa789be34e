//! Interactions shared by every page

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use shopcheck_common::logging::page_action;

use crate::driver::{ClickOptions, Driver};
use crate::error::{E2eError, E2eResult};
use crate::pages::{PageElement, Session};
use crate::wait::{self, WaitCondition};

pub struct BasePage<'a> {
    driver: &'a dyn Driver,
    name: &'static str,
    base_url: String,
    path: String,
    title: String,
    elements: BTreeMap<&'static str, PageElement>,
    timeout: Duration,
    page_load_timeout: Duration,
}

impl<'a> BasePage<'a> {
    pub fn new(session: Session<'a>, name: &'static str, path: &str, title: &str) -> Self {
        Self {
            driver: session.driver,
            name,
            base_url: session.base_url.trim_end_matches('/').to_string(),
            path: path.to_string(),
            title: title.to_string(),
            elements: BTreeMap::new(),
            timeout: session.timeout,
            page_load_timeout: session.page_load_timeout,
        }
    }

    pub fn with(mut self, key: &'static str, element: PageElement) -> Self {
        self.elements.insert(key, element);
        self
    }

    pub fn driver(&self) -> &'a dyn Driver {
        self.driver
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> String {
        self.url_for(&self.path)
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn visit(&self) -> E2eResult<()> {
        let url = self.url();
        page_action("visit", Some(&url));
        self.driver.goto(&url).await?;
        self.wait_for_page_load().await
    }

    pub async fn wait_for_page_load(&self) -> E2eResult<()> {
        wait::wait_for_page_load(self.driver, Some(self.page_load_timeout)).await
    }

    /// The title contains the page title. Pages without a title are
    /// matched on the URL containing their path instead.
    pub async fn verify_page_loaded(&self) -> E2eResult<()> {
        self.wait_for_page_load().await?;
        if !self.title.is_empty() {
            let title = self.driver.title().await?;
            if title.contains(&self.title) {
                return Ok(());
            }
            return Err(E2eError::AssertionFailed(format!(
                "{} not loaded: expected title {:?}, found {:?}",
                self.name, self.title, title
            )));
        }
        let url = self.driver.current_url().await?;
        if url.contains(&self.path) {
            return Ok(());
        }
        Err(E2eError::AssertionFailed(format!(
            "{} not loaded: expected url to include {}, got {}",
            self.name, self.path, url
        )))
    }

    /// Every element marked required is visible
    pub async fn verify_required_elements(&self) -> E2eResult<()> {
        for key in self
            .elements
            .iter()
            .filter(|(_, e)| e.required)
            .map(|(k, _)| *k)
        {
            self.wait_for_element(key, None).await?;
        }
        Ok(())
    }

    pub fn element(&self, key: &str) -> E2eResult<&PageElement> {
        self.elements.get(key).ok_or_else(|| E2eError::UnknownElement {
            page: self.name.to_string(),
            key: key.to_string(),
        })
    }

    pub fn selector(&self, key: &str) -> E2eResult<&str> {
        self.element(key).map(|e| e.selector.as_str())
    }

    fn timeout_for(&self, element: &PageElement) -> Duration {
        element.timeout.unwrap_or(self.timeout)
    }

    /// Wait on a keyed element; visible unless another condition is given
    pub async fn wait_for_element(&self, key: &str, condition: Option<WaitCondition>) -> E2eResult<()> {
        let element = self.element(key)?;
        wait::wait_for(
            self.driver,
            &element.selector,
            condition.unwrap_or(WaitCondition::Visible),
            Some(self.timeout_for(element)),
        )
        .await
    }

    async fn actionable(&self, selector: &str) -> E2eResult<()> {
        wait::wait_for(self.driver, selector, WaitCondition::Visible, Some(self.timeout)).await?;
        wait::wait_for(self.driver, selector, WaitCondition::Enabled, Some(self.timeout)).await
    }

    pub async fn click(&self, key: &str) -> E2eResult<()> {
        let element = self.element(key)?;
        page_action("click", Some(&element.description));
        self.click_selector(&element.selector).await
    }

    /// Click a selector that is not part of the element map
    pub async fn click_selector(&self, selector: &str) -> E2eResult<()> {
        self.actionable(selector).await?;
        self.driver.click(selector, ClickOptions::default()).await
    }

    pub async fn type_text(&self, key: &str, text: &str) -> E2eResult<()> {
        let element = self.element(key)?;
        page_action("type", Some(&element.description));
        self.actionable(&element.selector).await?;
        self.driver.clear(&element.selector).await?;
        self.driver.fill(&element.selector, text).await
    }

    pub async fn select(&self, key: &str, value: &str) -> E2eResult<()> {
        let element = self.element(key)?;
        page_action("select", Some(&element.description));
        self.actionable(&element.selector).await?;
        self.driver.select_option(&element.selector, value).await
    }

    pub async fn check(&self, key: &str) -> E2eResult<()> {
        self.set_checked(key, true).await
    }

    pub async fn uncheck(&self, key: &str) -> E2eResult<()> {
        self.set_checked(key, false).await
    }

    async fn set_checked(&self, key: &str, checked: bool) -> E2eResult<()> {
        let element = self.element(key)?;
        page_action(if checked { "check" } else { "uncheck" }, Some(&element.description));
        self.actionable(&element.selector).await?;
        self.driver.set_checked(&element.selector, checked).await
    }

    pub async fn get_text(&self, key: &str) -> E2eResult<String> {
        let element = self.element(key)?;
        self.wait_for_element(key, None).await?;
        Ok(self.driver.text(&element.selector).await?.trim().to_string())
    }

    /// Trimmed text of a selector outside the element map
    pub async fn text_of(&self, selector: &str) -> E2eResult<String> {
        wait::wait_for(self.driver, selector, WaitCondition::Exists, Some(self.timeout)).await?;
        Ok(self.driver.text(selector).await?.trim().to_string())
    }

    pub async fn get_value(&self, key: &str) -> E2eResult<String> {
        let element = self.element(key)?;
        wait::wait_for(self.driver, &element.selector, WaitCondition::Exists, Some(self.timeout_for(element))).await?;
        self.driver.value(&element.selector).await
    }

    /// Element text contains `expected`
    pub async fn verify_text(&self, key: &str, expected: &str) -> E2eResult<()> {
        let element = self.element(key)?;
        let found = wait::wait_for(
            self.driver,
            &element.selector,
            WaitCondition::ContainsText(expected.to_string()),
            Some(self.timeout_for(element)),
        )
        .await;
        match found {
            Ok(()) => Ok(()),
            Err(E2eError::Timeout(_)) => {
                let actual = self.driver.text(&element.selector).await.unwrap_or_default();
                Err(E2eError::AssertionFailed(format!(
                    "{} should contain {:?}, found {:?}",
                    element.description,
                    expected,
                    actual.trim()
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Element value equals `expected`
    pub async fn verify_value(&self, key: &str, expected: &str) -> E2eResult<()> {
        let element = self.element(key)?;
        let found = wait::wait_for(
            self.driver,
            &element.selector,
            WaitCondition::HasValue(expected.to_string()),
            Some(self.timeout_for(element)),
        )
        .await;
        match found {
            Ok(()) => Ok(()),
            Err(E2eError::Timeout(_)) => {
                let actual = self.driver.value(&element.selector).await.unwrap_or_default();
                Err(E2eError::AssertionFailed(format!(
                    "{} should have value {:?}, found {:?}",
                    element.description, expected, actual
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Visible right now; absent or unknown elements are not visible
    pub async fn is_visible(&self, key: &str) -> bool {
        match self.element(key) {
            Ok(element) => self.driver.is_visible(&element.selector).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    pub async fn is_enabled(&self, key: &str) -> E2eResult<bool> {
        let element = self.element(key)?;
        if self.driver.count(&element.selector).await? == 0 {
            return Ok(false);
        }
        self.driver.is_enabled(&element.selector).await
    }

    pub async fn is_checked(&self, key: &str) -> E2eResult<bool> {
        let element = self.element(key)?;
        self.driver.is_checked(&element.selector).await
    }

    pub async fn count(&self, selector: &str) -> E2eResult<usize> {
        self.driver.count(selector).await
    }

    pub async fn scroll_to(&self, key: &str) -> E2eResult<()> {
        let element = self.element(key)?;
        page_action("scroll", Some(&element.description));
        self.driver.scroll_into_view(&element.selector).await
    }

    pub async fn upload_file(&self, key: &str, path: &Path) -> E2eResult<()> {
        let element = self.element(key)?;
        page_action("upload", Some(&element.description));
        wait::wait_for(self.driver, &element.selector, WaitCondition::Exists, Some(self.timeout_for(element))).await?;
        self.driver.set_input_files(&element.selector, path).await
    }

    pub async fn drag_and_drop(&self, source: &str, target: &str) -> E2eResult<()> {
        let from = self.element(source)?;
        let to = self.element(target)?;
        page_action("drag", Some(&format!("{} -> {}", from.description, to.description)));
        self.actionable(&from.selector).await?;
        self.driver.drag_and_drop(&from.selector, &to.selector).await
    }

    pub async fn double_click(&self, key: &str) -> E2eResult<()> {
        let element = self.element(key)?;
        page_action("double click", Some(&element.description));
        self.actionable(&element.selector).await?;
        self.driver.click(&element.selector, ClickOptions::double()).await
    }

    pub async fn right_click(&self, key: &str) -> E2eResult<()> {
        let element = self.element(key)?;
        page_action("right click", Some(&element.description));
        self.actionable(&element.selector).await?;
        self.driver.click(&element.selector, ClickOptions::right()).await
    }

    pub async fn hover(&self, key: &str) -> E2eResult<()> {
        let element = self.element(key)?;
        page_action("hover", Some(&element.description));
        wait::wait_for(self.driver, &element.selector, WaitCondition::Visible, Some(self.timeout_for(element))).await?;
        self.driver.hover(&element.selector).await
    }

    pub async fn current_url(&self) -> E2eResult<String> {
        self.driver.current_url().await
    }

    /// Wait until the URL contains `fragment`
    pub async fn wait_for_url(&self, fragment: &str) -> E2eResult<()> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            let url = self.driver.current_url().await?;
            if url.contains(fragment) {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(E2eError::AssertionFailed(format!(
                    "expected url to include {}, got {}",
                    fragment, url
                )));
            }
            tokio::time::sleep(wait::POLL_INTERVAL.min(self.timeout / 4)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Effect, MockDriver, MockElement};

    fn page(driver: &MockDriver) -> BasePage<'_> {
        let session = Session::new(driver, "https://shop.test/")
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
        BasePage::new(session, "Test page", "/login", "Signup / Login")
            .with("email", PageElement::input("#email", "Email input").required())
            .with("go", PageElement::button("#go", "Go button"))
            .with("news", PageElement::checkbox("#news", "Newsletter"))
            .with("banner", PageElement::text(".banner", "Banner"))
    }

    fn driver() -> MockDriver {
        MockDriver::new()
            .page(
                "/login",
                "Automation Exercise - Signup / Login",
                [
                    ("#email", MockElement::new().value("old")),
                    ("#go", MockElement::new()),
                    ("#news", MockElement::new()),
                    (".banner", MockElement::new().text("  Welcome back  ")),
                ],
            )
            .on_click("#go", Effect::new().set(".banner", MockElement::new().text("Clicked")))
    }

    #[tokio::test]
    async fn test_visit_and_verify() {
        let driver = driver();
        let page = page(&driver);
        assert_eq!(page.url(), "https://shop.test/login");
        page.visit().await.unwrap();
        page.verify_page_loaded().await.unwrap();
        page.verify_required_elements().await.unwrap();
        assert_eq!(driver.actions(), vec!["goto:https://shop.test/login"]);
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let driver = driver();
        let err = page(&driver).element("nope").unwrap_err();
        assert_eq!(err.to_string(), "Element 'nope' is not defined on Test page");
        assert!(!page(&driver).is_visible("nope").await);
    }

    #[tokio::test]
    async fn test_type_clears_then_fills() {
        let driver = driver();
        let page = page(&driver);
        page.visit().await.unwrap();
        page.type_text("email", "bill@example.com").await.unwrap();
        page.verify_value("email", "bill@example.com").await.unwrap();
        assert!(driver.actions().ends_with(&[
            "clear:#email".to_string(),
            "fill:#email=bill@example.com".to_string()
        ]));
    }

    #[tokio::test]
    async fn test_text_is_trimmed_and_verified() {
        let driver = driver();
        let page = page(&driver);
        page.visit().await.unwrap();
        assert_eq!(page.get_text("banner").await.unwrap(), "Welcome back");
        page.click("go").await.unwrap();
        page.verify_text("banner", "Click").await.unwrap();

        let err = page.verify_text("banner", "Goodbye").await.unwrap_err();
        assert!(matches!(err, E2eError::AssertionFailed(_)));
        assert!(err.to_string().contains(r#"Banner should contain "Goodbye", found "Clicked""#));
    }

    #[tokio::test]
    async fn test_click_requires_enabled() {
        let driver = driver();
        let page = page(&driver);
        page.visit().await.unwrap();
        driver.schedule(Duration::ZERO, "#go", Some(MockElement::new().disabled()));
        assert!(page.click("go").await.is_err());
        assert!(!page.is_enabled("go").await.unwrap());
    }

    #[tokio::test]
    async fn test_checkbox_and_mouse_actions() {
        let driver = driver();
        let page = page(&driver);
        page.visit().await.unwrap();
        page.check("news").await.unwrap();
        assert!(page.is_checked("news").await.unwrap());
        page.uncheck("news").await.unwrap();
        assert!(!page.is_checked("news").await.unwrap());
        page.double_click("go").await.unwrap();
        page.right_click("go").await.unwrap();
        page.hover("banner").await.unwrap();
        let actions = driver.actions();
        assert!(actions.contains(&"dblclick:#go".to_string()));
        assert!(actions.contains(&"rightclick:#go".to_string()));
        assert!(actions.contains(&"hover:.banner".to_string()));
    }

    #[tokio::test]
    async fn test_verify_page_loaded_fails_elsewhere() {
        let driver = driver();
        driver.goto("https://shop.test/products").await.unwrap();
        assert!(page(&driver).verify_page_loaded().await.is_err());
    }

    #[tokio::test]
    async fn test_verify_page_loaded_needs_the_title_when_one_is_set() {
        let driver = MockDriver::new().page("/login", "Site Maintenance", [("#email", MockElement::new())]);
        driver.goto("https://shop.test/login").await.unwrap();
        let err = page(&driver).verify_page_loaded().await.unwrap_err();
        assert!(matches!(err, E2eError::AssertionFailed(_)));
        assert!(err.to_string().contains("Site Maintenance"));
    }

    #[tokio::test]
    async fn test_untitled_pages_match_on_url() {
        let driver = MockDriver::new().page("/login", "", [("#email", MockElement::new())]);
        let session = Session::new(&driver, "https://shop.test")
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
        let untitled = BasePage::new(session, "Untitled", "/login", "");

        driver.goto("https://shop.test/login").await.unwrap();
        untitled.verify_page_loaded().await.unwrap();
        driver.goto("https://shop.test/products").await.unwrap();
        assert!(untitled.verify_page_loaded().await.is_err());
    }
}
