//! In-memory driver
//!
//! A scripted DOM keyed by selector. Pages are registered per path and
//! loaded on navigation; click rules move between pages or mutate elements.
//! Every call is recorded so tests can assert on what a page object did.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde_json::Value;

use shopcheck_common::Viewport;

use crate::driver::{BoundingBox, ClickOptions, Driver, DriverFactory};
use crate::error::{E2eError, E2eResult};

static NTH: Lazy<Regex> = Lazy::new(|| Regex::new(r" >> nth=(\d+)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct MockElement {
    pub visible: bool,
    pub enabled: bool,
    pub checked: bool,
    pub count: usize,
    /// Text of each match, in document order
    pub texts: Vec<String>,
    pub value: String,
    pub bbox: Option<BoundingBox>,
    pub attributes: HashMap<String, String>,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            visible: true,
            enabled: true,
            checked: false,
            count: 1,
            texts: Vec::new(),
            value: String::new(),
            bbox: Some(BoundingBox {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 20.0,
            }),
            attributes: HashMap::new(),
        }
    }
}

impl MockElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.texts = vec![text.into()];
        self
    }

    /// One match per text
    pub fn texts<S: Into<String>>(mut self, texts: impl IntoIterator<Item = S>) -> Self {
        self.texts = texts.into_iter().map(Into::into).collect();
        self.count = self.texts.len();
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    fn nth(&self, index: usize) -> Option<MockElement> {
        if index >= self.count {
            return None;
        }
        let mut single = self.clone();
        single.count = 1;
        single.texts = self.texts.get(index).cloned().into_iter().collect();
        Some(single)
    }
}

/// What a click does
#[derive(Debug, Clone, Default)]
pub struct Effect {
    navigate: Option<String>,
    set: Vec<(String, MockElement)>,
    remove: Vec<String>,
}

impl Effect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the page registered for `path`
    pub fn navigate(mut self, path: impl Into<String>) -> Self {
        self.navigate = Some(path.into());
        self
    }

    pub fn set(mut self, selector: impl Into<String>, element: MockElement) -> Self {
        self.set.push((selector.into(), element));
        self
    }

    pub fn remove(mut self, selector: impl Into<String>) -> Self {
        self.remove.push(selector.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
struct MockPage {
    title: String,
    elements: Vec<(String, MockElement)>,
}

struct Scheduled {
    at: Instant,
    selector: String,
    element: Option<MockElement>,
}

struct MockState {
    url: String,
    title: String,
    dom: HashMap<String, MockElement>,
    pages: HashMap<String, MockPage>,
    clicks: HashMap<String, Effect>,
    evaluations: HashMap<String, Value>,
    scheduled: Vec<Scheduled>,
    actions: Vec<String>,
    viewport: Option<Viewport>,
    failing: HashSet<&'static str>,
    closed: bool,
}

impl MockState {
    fn apply_due(&mut self) {
        let now = Instant::now();
        let (due, pending): (Vec<_>, Vec<_>) = self.scheduled.drain(..).partition(|s| s.at <= now);
        self.scheduled = pending;
        for change in due {
            match change.element {
                Some(element) => {
                    self.dom.insert(change.selector, element);
                }
                None => {
                    self.dom.remove(&change.selector);
                }
            }
        }
    }

    fn resolve(&mut self, selector: &str) -> Option<MockElement> {
        self.apply_due();
        if let Some(element) = self.dom.get(selector) {
            return Some(element.clone());
        }
        let index = NTH
            .captures(selector)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<usize>().ok())?;
        let base = NTH.replace(selector, "").into_owned();
        self.dom.get(&base).and_then(|e| e.nth(index))
    }

    fn require(&mut self, selector: &str) -> E2eResult<MockElement> {
        self.resolve(selector)
            .ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))
    }

    fn update<F: FnOnce(&mut MockElement)>(&mut self, selector: &str, f: F) -> E2eResult<()> {
        self.apply_due();
        let key = if self.dom.contains_key(selector) {
            selector.to_string()
        } else {
            NTH.replace(selector, "").into_owned()
        };
        match self.dom.get_mut(&key) {
            Some(element) => {
                f(element);
                Ok(())
            }
            None => Err(E2eError::ElementNotFound(selector.to_string())),
        }
    }

    fn load(&mut self, url: &str) {
        self.url = url.to_string();
        let page = self
            .pages
            .iter()
            .filter(|(path, _)| url == path.as_str() || url.ends_with(path.as_str()))
            .max_by_key(|(path, _)| path.len())
            .map(|(_, page)| page.clone());
        self.dom.clear();
        if let Some(page) = page {
            self.title = page.title;
            self.dom.extend(page.elements);
        } else {
            self.title.clear();
        }
    }

    fn apply(&mut self, effect: Effect) {
        if let Some(path) = effect.navigate {
            let origin = origin_of(&self.url);
            self.load(&format!("{}{}", origin, path));
        }
        for (selector, element) in effect.set {
            self.dom.insert(selector, element);
        }
        for selector in effect.remove {
            self.dom.remove(&selector);
        }
    }
}

fn origin_of(url: &str) -> String {
    match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            let host_end = rest.find('/').unwrap_or(rest.len());
            url[..scheme_end + 3 + host_end].to_string()
        }
        None => String::new(),
    }
}

#[derive(Clone)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                url: "about:blank".to_string(),
                title: String::new(),
                dom: HashMap::new(),
                pages: HashMap::new(),
                clicks: HashMap::new(),
                evaluations: HashMap::new(),
                scheduled: Vec::new(),
                actions: Vec::new(),
                viewport: None,
                failing: HashSet::new(),
                closed: false,
            })),
        }
    }

    /// Registers the DOM served for `path`
    pub fn page<S: Into<String>>(
        self,
        path: impl Into<String>,
        title: impl Into<String>,
        elements: impl IntoIterator<Item = (S, MockElement)>,
    ) -> Self {
        let page = MockPage {
            title: title.into(),
            elements: elements.into_iter().map(|(s, e)| (s.into(), e)).collect(),
        };
        self.state.lock().pages.insert(path.into(), page);
        self
    }

    pub fn on_click(self, selector: impl Into<String>, effect: Effect) -> Self {
        self.state.lock().clicks.insert(selector.into(), effect);
        self
    }

    pub fn on_evaluate(self, script: impl Into<String>, result: Value) -> Self {
        self.state.lock().evaluations.insert(script.into(), result);
        self
    }

    /// Puts an element into the current DOM right away
    pub fn with_element(self, selector: impl Into<String>, element: MockElement) -> Self {
        self.state.lock().dom.insert(selector.into(), element);
        self
    }

    /// Replaces (or with `None` removes) an element once `after` has passed
    pub fn schedule(&self, after: Duration, selector: impl Into<String>, element: Option<MockElement>) {
        self.state.lock().scheduled.push(Scheduled {
            at: Instant::now() + after,
            selector: selector.into(),
            element,
        });
    }

    /// Makes a browser-level call (`clear_cookies`, `clear_local_storage`,
    /// `set_viewport`) fail from now on
    pub fn failing(self, operation: &'static str) -> Self {
        self.state.lock().failing.insert(operation);
        self
    }

    pub fn actions(&self) -> Vec<String> {
        self.state.lock().actions.clone()
    }

    pub fn element(&self, selector: &str) -> Option<MockElement> {
        self.state.lock().resolve(selector)
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.state.lock().viewport
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn record(&self, action: String) {
        self.state.lock().actions.push(action);
    }

    fn check(&self, operation: &str) -> E2eResult<()> {
        if self.state.lock().failing.contains(operation) {
            return Err(E2eError::Playwright(format!("{} failed", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.record(format!("goto:{}", url));
        self.state.lock().load(url);
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.state.lock().url.clone())
    }

    async fn title(&self) -> E2eResult<String> {
        Ok(self.state.lock().title.clone())
    }

    async fn count(&self, selector: &str) -> E2eResult<usize> {
        Ok(self.state.lock().resolve(selector).map(|e| e.count).unwrap_or(0))
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        Ok(self
            .state
            .lock()
            .resolve(selector)
            .map(|e| e.visible && e.count > 0)
            .unwrap_or(false))
    }

    async fn is_enabled(&self, selector: &str) -> E2eResult<bool> {
        Ok(self.state.lock().require(selector)?.enabled)
    }

    async fn is_checked(&self, selector: &str) -> E2eResult<bool> {
        Ok(self.state.lock().require(selector)?.checked)
    }

    async fn text(&self, selector: &str) -> E2eResult<String> {
        let element = self.state.lock().require(selector)?;
        Ok(element.texts.first().cloned().unwrap_or_default())
    }

    async fn texts(&self, selector: &str) -> E2eResult<Vec<String>> {
        Ok(self
            .state
            .lock()
            .resolve(selector)
            .map(|e| e.texts)
            .unwrap_or_default())
    }

    async fn value(&self, selector: &str) -> E2eResult<String> {
        Ok(self.state.lock().require(selector)?.value)
    }

    async fn attribute(&self, selector: &str, name: &str) -> E2eResult<Option<String>> {
        Ok(self.state.lock().require(selector)?.attributes.get(name).cloned())
    }

    async fn click(&self, selector: &str, options: ClickOptions) -> E2eResult<()> {
        let label = match (options.click_count, options.button) {
            (2, _) => "dblclick",
            (_, crate::driver::MouseButton::Right) => "rightclick",
            _ => "click",
        };
        self.record(format!("{}:{}", label, selector));

        let mut state = self.state.lock();
        let element = state.require(selector)?;
        if !options.force && !(element.visible && element.enabled) {
            return Err(E2eError::Playwright(format!(
                "element {} is not visible and enabled",
                selector
            )));
        }
        let base = NTH.replace(selector, "").into_owned();
        let effect = state
            .clicks
            .get(selector)
            .or_else(|| state.clicks.get(&base))
            .cloned();
        if let Some(effect) = effect {
            state.apply(effect);
        }
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.record(format!("fill:{}={}", selector, value));
        let value = value.to_string();
        self.state.lock().update(selector, |e| e.value = value)
    }

    async fn clear(&self, selector: &str) -> E2eResult<()> {
        self.record(format!("clear:{}", selector));
        self.state.lock().update(selector, |e| e.value.clear())
    }

    async fn type_text(&self, selector: &str, text: &str, _delay: Option<Duration>) -> E2eResult<()> {
        self.record(format!("type:{}={}", selector, text));
        let text = text.to_string();
        self.state.lock().update(selector, |e| e.value.push_str(&text))
    }

    async fn press(&self, selector: Option<&str>, key: &str) -> E2eResult<()> {
        self.record(format!("press:{}:{}", selector.unwrap_or("page"), key));
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.record(format!("select:{}={}", selector, value));
        let value = value.to_string();
        self.state.lock().update(selector, |e| e.value = value)
    }

    async fn set_checked(&self, selector: &str, checked: bool) -> E2eResult<()> {
        self.record(format!("{}:{}", if checked { "check" } else { "uncheck" }, selector));
        self.state.lock().update(selector, |e| e.checked = checked)
    }

    async fn hover(&self, selector: &str) -> E2eResult<()> {
        self.record(format!("hover:{}", selector));
        self.state.lock().require(selector).map(|_| ())
    }

    async fn focus(&self, selector: &str) -> E2eResult<()> {
        self.record(format!("focus:{}", selector));
        self.state.lock().require(selector).map(|_| ())
    }

    async fn scroll_into_view(&self, selector: &str) -> E2eResult<()> {
        self.record(format!("scroll:{}", selector));
        self.state.lock().require(selector).map(|_| ())
    }

    async fn set_input_files(&self, selector: &str, path: &Path) -> E2eResult<()> {
        self.record(format!("upload:{}={}", selector, path.display()));
        let file = path.display().to_string();
        self.state.lock().update(selector, |e| e.value = file)
    }

    async fn drag_and_drop(&self, source: &str, target: &str) -> E2eResult<()> {
        self.record(format!("drag:{}->{}", source, target));
        let mut state = self.state.lock();
        state.require(source)?;
        state.require(target).map(|_| ())
    }

    async fn bounding_box(&self, selector: &str) -> E2eResult<Option<BoundingBox>> {
        Ok(self.state.lock().resolve(selector).and_then(|e| e.bbox))
    }

    async fn evaluate(&self, script: &str) -> E2eResult<Value> {
        let state = self.state.lock();
        if let Some(value) = state.evaluations.get(script) {
            return Ok(value.clone());
        }
        if script.contains("readyState") {
            return Ok(Value::String("complete".to_string()));
        }
        Ok(Value::Null)
    }

    async fn screenshot(&self, path: &Path, _full_page: bool) -> E2eResult<()> {
        self.record(format!("screenshot:{}", path.display()));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, b"\x89PNG\r\n\x1a\n")?;
        Ok(())
    }

    async fn clear_cookies(&self) -> E2eResult<()> {
        self.record("clear_cookies".to_string());
        self.check("clear_cookies")
    }

    async fn clear_local_storage(&self) -> E2eResult<()> {
        self.record("clear_local_storage".to_string());
        self.check("clear_local_storage")
    }

    async fn set_viewport(&self, viewport: Viewport) -> E2eResult<()> {
        self.record(format!("viewport:{}x{}", viewport.width, viewport.height));
        self.check("set_viewport")?;
        self.state.lock().viewport = Some(viewport);
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        self.record("close".to_string());
        self.state.lock().closed = true;
        Ok(())
    }
}

type Blueprint = dyn Fn() -> MockDriver + Send + Sync;

/// Hands out a new [`MockDriver`] per launch and keeps them for inspection
pub struct MockFactory {
    blueprint: Box<Blueprint>,
    launched: Mutex<Vec<MockDriver>>,
}

impl MockFactory {
    pub fn new<F>(blueprint: F) -> Self
    where
        F: Fn() -> MockDriver + Send + Sync + 'static,
    {
        Self {
            blueprint: Box::new(blueprint),
            launched: Mutex::new(Vec::new()),
        }
    }

    pub fn launched(&self) -> Vec<MockDriver> {
        self.launched.lock().clone()
    }
}

#[async_trait]
impl DriverFactory for MockFactory {
    async fn launch(&self) -> E2eResult<Box<dyn Driver>> {
        let driver = (self.blueprint)();
        self.launched.lock().push(driver.clone());
        Ok(Box::new(driver))
    }
}
