use std::ops::Deref;

use shopcheck_common::logging::step;

use crate::error::E2eResult;
use crate::pages::{within, BasePage, PageElement, Session};
use crate::wait;

const FEATURED: &str = ".features_items .product-image-wrapper";
const MODAL: &str = ".modal-content";

pub struct HomePage<'a> {
    base: BasePage<'a>,
}

impl<'a> Deref for HomePage<'a> {
    type Target = BasePage<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> HomePage<'a> {
    pub fn new(session: Session<'a>) -> Self {
        let base = BasePage::new(session, "Home page", "/", "Automation Exercise")
            .with("logo", PageElement::image(r#"img[alt="Website for automation practice"]"#, "Main logo").required())
            .with("signup_login_link", PageElement::link(r#"a[href="/login"]"#, "Signup / Login link").required())
            .with("products_link", PageElement::link(r#"a[href="/products"]"#, "Products link").required())
            .with("cart_link", PageElement::link(r#"a[href="/view_cart"]"#, "Cart link").required())
            .with("contact_us_link", PageElement::link(r#"a[href="/contact_us"]"#, "Contact us link").required())
            .with("test_cases_link", PageElement::link(r#"a[href="/test_cases"]"#, "Test Cases link").required())
            .with("api_testing_link", PageElement::link(r#"a[href="/api_list"]"#, "API Testing link").required())
            .with("logout_link", PageElement::link(r#"a[href="/logout"]"#, "Logout link"))
            .with("subscription_email", PageElement::input("#susbscribe_email", "Subscription email input"))
            .with("subscription_button", PageElement::button("#subscribe", "Subscribe button"))
            .with("subscription_alert", PageElement::text(".alert-success", "Subscription success alert"))
            .with("scroll_up", PageElement::button("#scrollUp", "Scroll up arrow"))
            .with("featured_items", PageElement::text(FEATURED, "Featured items section").required())
            .with("category_panel", PageElement::text(".category-products", "Category panel").required())
            .with("modal", PageElement::text(MODAL, "Added to cart modal"));
        Self { base }
    }

    pub async fn navigate_to_signup_login(&self) -> E2eResult<()> {
        step("Navigate to Signup/Login page");
        self.click("signup_login_link").await
    }

    pub async fn navigate_to_products(&self) -> E2eResult<()> {
        step("Navigate to Products page");
        self.click("products_link").await
    }

    pub async fn navigate_to_cart(&self) -> E2eResult<()> {
        step("Navigate to Cart page");
        self.click("cart_link").await
    }

    pub async fn navigate_to_contact_us(&self) -> E2eResult<()> {
        step("Navigate to Contact Us page");
        self.click("contact_us_link").await
    }

    pub async fn navigate_to_test_cases(&self) -> E2eResult<()> {
        step("Navigate to Test Cases page");
        self.click("test_cases_link").await
    }

    pub async fn navigate_to_api_testing(&self) -> E2eResult<()> {
        step("Navigate to API Testing page");
        self.click("api_testing_link").await
    }

    pub async fn subscribe_to_newsletter(&self, email: &str) -> E2eResult<()> {
        step(&format!("Subscribe to newsletter with email: {}", email));
        self.scroll_to("subscription_email").await?;
        self.type_text("subscription_email", email).await?;
        self.click("subscription_button").await?;
        self.verify_text("subscription_alert", "You have been successfully subscribed!")
            .await
    }

    pub async fn verify_home_page_loaded(&self) -> E2eResult<()> {
        step("Verify home page is loaded");
        self.verify_page_loaded().await?;
        self.wait_for_element("logo", None).await?;
        self.wait_for_element("featured_items", None).await
    }

    pub async fn scroll_to_top(&self) -> E2eResult<()> {
        step("Scroll to top of page");
        self.click("scroll_up").await
    }

    /// Logged-in header shows the logout link
    pub async fn verify_logged_in(&self) -> E2eResult<()> {
        self.wait_for_element("logout_link", None).await
    }

    pub async fn featured_product_names(&self) -> E2eResult<Vec<String>> {
        step("Get featured products list");
        self.wait_for_element("featured_items", None).await?;
        let names = self
            .driver()
            .texts(&format!("{} .productinfo p", FEATURED))
            .await?;
        Ok(names.into_iter().map(|n| n.trim().to_string()).collect())
    }

    pub async fn add_featured_product_to_cart(&self, index: usize) -> E2eResult<()> {
        step(&format!("Add featured product {} to cart", index));
        self.wait_for_element("featured_items", None).await?;
        self.click_selector(&within(FEATURED, index, ".productinfo .add-to-cart"))
            .await
    }

    pub async fn verify_product_added_modal(&self) -> E2eResult<()> {
        step("Verify product added to cart modal");
        wait::wait_for_text(self.driver(), MODAL, "Added!", Some(self.timeout())).await
    }

    pub async fn continue_shopping_from_modal(&self) -> E2eResult<()> {
        step("Continue shopping from modal");
        self.click_selector(&format!(r#"{} button[data-dismiss="modal"]"#, MODAL))
            .await
    }

    pub async fn view_cart_from_modal(&self) -> E2eResult<()> {
        step("View cart from modal");
        self.click_selector(&format!(r#"{} a[href="/view_cart"]"#, MODAL))
            .await
    }
}
