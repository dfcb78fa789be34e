//! Page objects for the storefront
//!
//! Each page wraps a [`BasePage`] holding its URL, title and a keyed map of
//! [`PageElement`]s. Pages deref to their base so the generic interactions
//! (click, type, verify) are available on every page.

use std::time::Duration;

use crate::driver::Driver;
use crate::wait;

pub mod base;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod login;
pub mod order_confirmation;
pub mod payment;
pub mod products;
pub mod signup;

pub use base::BasePage;
pub use cart::CartPage;
pub use checkout::CheckoutPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use order_confirmation::OrderConfirmationPage;
pub use payment::PaymentPage;
pub use products::ProductsPage;
pub use signup::SignupPage;

/// What every page needs: the browser, the storefront root and timeouts
#[derive(Clone, Copy)]
pub struct Session<'a> {
    pub driver: &'a dyn Driver,
    pub base_url: &'a str,
    pub timeout: Duration,
    pub page_load_timeout: Duration,
}

impl<'a> Session<'a> {
    pub fn new(driver: &'a dyn Driver, base_url: &'a str) -> Self {
        Self {
            driver,
            base_url,
            timeout: wait::DEFAULT_TIMEOUT,
            page_load_timeout: wait::PAGE_LOAD_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, timeout: Duration, page_load: Duration) -> Self {
        self.timeout = timeout;
        self.page_load_timeout = page_load;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Button,
    Input,
    Text,
    Link,
    Dropdown,
    Checkbox,
    Radio,
    Image,
}

/// A named element on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageElement {
    pub selector: String,
    pub description: String,
    pub kind: ElementKind,
    /// Must be present for the page to count as loaded
    pub required: bool,
    /// Overrides the page's wait timeout
    pub timeout: Option<Duration>,
}

impl PageElement {
    pub fn new(selector: impl Into<String>, description: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            selector: selector.into(),
            description: description.into(),
            kind,
            required: false,
            timeout: None,
        }
    }

    pub fn button(selector: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(selector, description, ElementKind::Button)
    }

    pub fn input(selector: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(selector, description, ElementKind::Input)
    }

    pub fn text(selector: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(selector, description, ElementKind::Text)
    }

    pub fn link(selector: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(selector, description, ElementKind::Link)
    }

    pub fn dropdown(selector: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(selector, description, ElementKind::Dropdown)
    }

    pub fn checkbox(selector: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(selector, description, ElementKind::Checkbox)
    }

    pub fn radio(selector: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(selector, description, ElementKind::Radio)
    }

    pub fn image(selector: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(selector, description, ElementKind::Image)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The `index`-th match of `selector`
pub fn nth(selector: &str, index: usize) -> String {
    format!("{} >> nth={}", selector, index)
}

/// `child` scoped to the `index`-th match of `parent`
pub fn within(parent: &str, index: usize, child: &str) -> String {
    format!("{} >> {}", nth(parent, index), child)
}

/// Matches of `selector` containing `text`
pub fn has_text(selector: &str, text: &str) -> String {
    format!("{}:has-text(\"{}\")", selector, text.replace('"', "\\\""))
}
