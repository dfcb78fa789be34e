//! Browser driver seam
//!
//! Page objects talk to the browser only through [`Driver`]. The suite ships
//! a Playwright-backed implementation and an in-memory one for tests.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shopcheck_common::Viewport;

use crate::error::E2eResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickOptions {
    pub button: MouseButton,
    pub click_count: u32,
    /// Skip actionability checks
    pub force: bool,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            click_count: 1,
            force: false,
        }
    }
}

impl ClickOptions {
    pub fn double() -> Self {
        Self {
            click_count: 2,
            ..Self::default()
        }
    }

    pub fn right() -> Self {
        Self {
            button: MouseButton::Right,
            ..Self::default()
        }
    }

    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Browser operations the page objects rely on. Selectors are Playwright
/// selectors; reads act on the first match.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn goto(&self, url: &str) -> E2eResult<()>;
    async fn current_url(&self) -> E2eResult<String>;
    async fn title(&self) -> E2eResult<String>;

    async fn count(&self, selector: &str) -> E2eResult<usize>;
    async fn is_visible(&self, selector: &str) -> E2eResult<bool>;
    async fn is_enabled(&self, selector: &str) -> E2eResult<bool>;
    async fn is_checked(&self, selector: &str) -> E2eResult<bool>;
    async fn text(&self, selector: &str) -> E2eResult<String>;
    async fn texts(&self, selector: &str) -> E2eResult<Vec<String>>;
    async fn value(&self, selector: &str) -> E2eResult<String>;
    async fn attribute(&self, selector: &str, name: &str) -> E2eResult<Option<String>>;

    async fn click(&self, selector: &str, options: ClickOptions) -> E2eResult<()>;
    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()>;
    async fn clear(&self, selector: &str) -> E2eResult<()>;
    async fn type_text(&self, selector: &str, text: &str, delay: Option<Duration>) -> E2eResult<()>;
    async fn press(&self, selector: Option<&str>, key: &str) -> E2eResult<()>;
    async fn select_option(&self, selector: &str, value: &str) -> E2eResult<()>;
    async fn set_checked(&self, selector: &str, checked: bool) -> E2eResult<()>;
    async fn hover(&self, selector: &str) -> E2eResult<()>;
    async fn focus(&self, selector: &str) -> E2eResult<()>;
    async fn scroll_into_view(&self, selector: &str) -> E2eResult<()>;
    async fn set_input_files(&self, selector: &str, path: &Path) -> E2eResult<()>;
    async fn drag_and_drop(&self, source: &str, target: &str) -> E2eResult<()>;
    async fn bounding_box(&self, selector: &str) -> E2eResult<Option<BoundingBox>>;

    /// Evaluates a JavaScript expression in the page
    async fn evaluate(&self, script: &str) -> E2eResult<Value>;
    async fn screenshot(&self, path: &Path, full_page: bool) -> E2eResult<()>;

    async fn clear_cookies(&self) -> E2eResult<()>;
    async fn clear_local_storage(&self) -> E2eResult<()>;
    async fn set_viewport(&self, viewport: Viewport) -> E2eResult<()>;
    async fn close(&self) -> E2eResult<()>;
}

/// Launches a fresh, isolated browser session per scenario attempt
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn launch(&self) -> E2eResult<Box<dyn Driver>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_presets() {
        assert_eq!(ClickOptions::default().click_count, 1);
        assert_eq!(ClickOptions::double().click_count, 2);
        assert_eq!(ClickOptions::right().button, MouseButton::Right);
        assert!(ClickOptions::forced().force);
    }

    #[test]
    fn test_click_options_wire_format() {
        let json = serde_json::to_value(ClickOptions::right()).unwrap();
        assert_eq!(json["button"], "right");
        assert_eq!(json["click_count"], 1);
    }
}
