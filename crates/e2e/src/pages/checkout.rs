use std::ops::Deref;

use shopcheck_common::logging::{page_action, step};
use shopcheck_common::User;

use crate::error::{ensure, E2eResult};
use crate::pages::{BasePage, PageElement, Session};
use crate::wait::{self, WaitCondition};

const REVIEW_ITEMS: &str = r#"#cart_info_table tbody tr[id^="product-"]"#;

/// Lines of an address block as the checkout page renders them for `user`
pub fn address_lines(user: &User) -> Vec<String> {
    let name = match user.title {
        Some(title) => format!("{}. {} {}", title, user.firstname, user.lastname),
        None => format!("{} {}", user.firstname, user.lastname),
    };
    let mut lines = vec![name];
    lines.extend(
        [&user.company, &user.address1, &user.address2]
            .into_iter()
            .filter(|v| !v.is_empty())
            .cloned(),
    );
    lines.push(format!("{} {} {}", user.city, user.state, user.zipcode));
    lines.extend(
        [&user.country, &user.mobile_number]
            .into_iter()
            .filter(|v| !v.is_empty())
            .cloned(),
    );
    lines
}

pub struct CheckoutPage<'a> {
    base: BasePage<'a>,
}

impl<'a> Deref for CheckoutPage<'a> {
    type Target = BasePage<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> CheckoutPage<'a> {
    pub fn new(session: Session<'a>) -> Self {
        let base = BasePage::new(session, "Checkout page", "/checkout", "Automation Exercise - Checkout")
            .with("delivery_address", PageElement::text("#address_delivery", "Delivery address").required())
            .with("billing_address", PageElement::text("#address_invoice", "Billing address").required())
            .with("order_review", PageElement::text("#cart_info_table", "Order review table").required())
            .with("order_total", PageElement::text("#cart_info_table .cart_total_price >> nth=-1", "Order total"))
            .with("comment", PageElement::input(r#"textarea[name="message"]"#, "Order comment"))
            .with("place_order", PageElement::button("a.check_out", "Place Order button"))
            .with("login_modal", PageElement::text(".modal-body", "Login required modal"))
            .with("register_login", PageElement::link(r#".modal-body a[href="/login"]"#, "Register / Login link"));
        Self { base }
    }

    pub async fn is_on_checkout_page(&self) -> bool {
        self.is_visible("delivery_address").await
    }

    pub async fn verify_checkout_page_loaded(&self) -> E2eResult<()> {
        self.wait_for_url("/checkout").await?;
        self.wait_for_element("delivery_address", None).await?;
        self.wait_for_element("billing_address", None).await?;
        self.wait_for_element("order_review", None).await?;
        page_action("Verified checkout page loaded", None);
        Ok(())
    }

    async fn verify_address(&self, key: &str, user: &User) -> E2eResult<()> {
        self.wait_for_element(key, None).await?;
        let block = self.get_text(key).await?;
        for line in address_lines(user) {
            ensure(
                block.contains(&line),
                format!("{} is missing {:?}", self.element(key)?.description, line),
            )?;
        }
        Ok(())
    }

    pub async fn verify_delivery_address(&self, user: &User) -> E2eResult<()> {
        self.verify_address("delivery_address", user).await?;
        page_action("Verified delivery address", None);
        Ok(())
    }

    pub async fn verify_billing_address(&self, user: &User) -> E2eResult<()> {
        self.verify_address("billing_address", user).await?;
        page_action("Verified billing address", None);
        Ok(())
    }

    pub async fn verify_order_review(&self) -> E2eResult<()> {
        self.wait_for_element("order_review", None).await?;
        let count = self.review_items_count().await?;
        ensure(count > 0, "order review lists no items")?;
        page_action("Verified order review section", None);
        Ok(())
    }

    pub async fn review_items_count(&self) -> E2eResult<usize> {
        self.count(REVIEW_ITEMS).await
    }

    /// Every name appears somewhere in the review table
    pub async fn verify_order_items(&self, names: &[&str]) -> E2eResult<()> {
        wait::wait_for(self.driver(), REVIEW_ITEMS, WaitCondition::Exists, Some(self.timeout())).await?;
        let rows = self.driver().texts(REVIEW_ITEMS).await?;
        for name in names {
            ensure(
                rows.iter().any(|row| row.contains(name)),
                format!("{} is not in the order review", name),
            )?;
        }
        page_action(&format!("Verified order contains items: {}", names.join(", ")), None);
        Ok(())
    }

    pub async fn add_order_comment(&self, comment: &str) -> E2eResult<()> {
        self.type_text("comment", comment).await?;
        page_action(&format!("Added order comment: {}", comment), None);
        Ok(())
    }

    pub async fn order_comment(&self) -> E2eResult<String> {
        self.get_value("comment").await
    }

    pub async fn place_order(&self) -> E2eResult<()> {
        self.click("place_order").await?;
        page_action("Clicked place order button", None);
        Ok(())
    }

    pub async fn order_total(&self) -> E2eResult<String> {
        self.get_text("order_total").await
    }

    pub async fn verify_total_amount(&self, expected: &str) -> E2eResult<()> {
        self.verify_text("order_total", expected).await
    }

    pub async fn is_checkout_enabled(&self) -> E2eResult<bool> {
        Ok(self.is_visible("place_order").await && self.is_enabled("place_order").await?)
    }

    /// Guests get a modal asking them to register or log in
    pub async fn verify_login_required_message(&self) -> E2eResult<()> {
        self.verify_text("login_modal", "Register / Login account to proceed").await?;
        self.wait_for_element("register_login", None).await
    }

    pub async fn click_register_login(&self) -> E2eResult<()> {
        self.click("register_login").await
    }

    pub async fn proceed_as_guest_user(&self) -> E2eResult<()> {
        if self.is_visible("login_modal").await {
            self.click_register_login().await?;
        }
        Ok(())
    }

    /// Check the page, both addresses and the review, then place the order
    pub async fn complete_checkout_flow(&self, user: &User, comment: Option<&str>) -> E2eResult<()> {
        step("Complete checkout");
        self.verify_checkout_page_loaded().await?;
        self.verify_delivery_address(user).await?;
        self.verify_billing_address(user).await?;
        self.verify_order_review().await?;
        if let Some(comment) = comment {
            self.add_order_comment(comment).await?;
        }
        self.place_order().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::mock::{Effect, MockDriver, MockElement};
    use shopcheck_common::Title;

    fn block(user: &User) -> String {
        format!("YOUR DELIVERY ADDRESS\n{}", address_lines(user).join("\n"))
    }

    fn checkout(user: &User) -> MockDriver {
        MockDriver::new()
            .page(
                "/checkout",
                "Automation Exercise - Checkout",
                [
                    ("#address_delivery", MockElement::new().text(block(user))),
                    ("#address_invoice", MockElement::new().text(block(user))),
                    ("#cart_info_table", MockElement::new()),
                    (REVIEW_ITEMS, MockElement::new().texts(["Blue Top Women > Tops Rs. 500", "Men Tshirt Men > Tshirts Rs. 400"])),
                    (r#"textarea[name="message"]"#, MockElement::new()),
                    ("a.check_out", MockElement::new()),
                ],
            )
            .page("/payment", "Automation Exercise - Payment", [("body", MockElement::new())])
            .on_click("a.check_out", Effect::new().navigate("/payment"))
    }

    #[test]
    fn test_address_lines() {
        let user = User {
            title: Some(Title::Mrs),
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            company: "Engines Ltd".into(),
            address1: "12 Analytical Way".into(),
            city: "London".into(),
            state: "Greater London".into(),
            zipcode: "N1".into(),
            country: "United Kingdom".into(),
            mobile_number: "07000000000".into(),
            ..User::default()
        };
        assert_eq!(
            address_lines(&user),
            vec![
                "Mrs. Ada Lovelace",
                "Engines Ltd",
                "12 Analytical Way",
                "London Greater London N1",
                "United Kingdom",
                "07000000000"
            ]
        );
    }

    #[tokio::test]
    async fn test_complete_checkout_flow() {
        let user = User {
            title: Some(Title::Mr),
            firstname: "Bill".into(),
            lastname: "Smith".into(),
            address1: "1 Main St".into(),
            city: "Toronto".into(),
            state: "Ontario".into(),
            zipcode: "M5V".into(),
            country: "Canada".into(),
            ..User::default()
        };
        let driver = checkout(&user);
        let session = Session::new(&driver, "https://shop.test")
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
        let page = CheckoutPage::new(session);
        page.visit().await.unwrap();
        page.verify_order_items(&["Blue Top", "Men Tshirt"]).await.unwrap();
        assert!(page.verify_order_items(&["Sleeveless Dress"]).await.is_err());

        page.complete_checkout_flow(&user, Some("Leave at the door")).await.unwrap();
        assert!(driver
            .actions()
            .contains(&r#"fill:textarea[name="message"]=Leave at the door"#.to_string()));
        page.wait_for_url("/payment").await.unwrap();
    }

    #[tokio::test]
    async fn test_address_mismatch_fails() {
        let shown = User {
            firstname: "Bill".into(),
            lastname: "Smith".into(),
            city: "Toronto".into(),
            ..User::default()
        };
        let driver = checkout(&shown);
        let session = Session::new(&driver, "https://shop.test")
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
        let page = CheckoutPage::new(session);
        page.visit().await.unwrap();
        let other = User { city: "Ottawa".into(), ..shown };
        let err = page.verify_delivery_address(&other).await.unwrap_err();
        assert!(err.to_string().contains("Delivery address is missing"));
    }
}
