use std::ops::Deref;

use shopcheck_common::logging::page_action;
use shopcheck_common::{parse_amount, round2};

use crate::error::{ensure, E2eError, E2eResult};
use crate::pages::{has_text, within, BasePage, PageElement, Session};
use crate::wait::{self, WaitCondition};

const ITEMS: &str = r#"#cart_info_table tbody tr[id^="product-"]"#;
const QUANTITY: &str = ".cart_quantity .disabled";
const NAME: &str = ".cart_description h4 a";
const PRICE: &str = ".cart_price p";
const ROW_TOTAL: &str = ".cart_total_price";

pub struct CartPage<'a> {
    base: BasePage<'a>,
}

impl<'a> Deref for CartPage<'a> {
    type Target = BasePage<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> CartPage<'a> {
    pub fn new(session: Session<'a>) -> Self {
        let base = BasePage::new(session, "Cart page", "/view_cart", "Automation Exercise - Checkout")
            .with("cart_table", PageElement::text("#cart_info_table", "Cart table"))
            .with("proceed_to_checkout", PageElement::button(".check_out", "Proceed To Checkout button"))
            .with("continue_shopping", PageElement::button(has_text(".btn-success", "Continue Shopping"), "Continue Shopping button"))
            .with("empty_cart", PageElement::text("#empty_cart", "Empty cart message"));
        Self { base }
    }

    fn item_part(index: usize, part: &str) -> String {
        within(ITEMS, index, part)
    }

    pub async fn visit_cart(&self) -> E2eResult<()> {
        self.visit().await?;
        page_action("Visited cart page", None);
        Ok(())
    }

    pub async fn verify_cart_page_loaded(&self) -> E2eResult<()> {
        self.wait_for_element("cart_table", None).await?;
        page_action("Verified cart page loaded", None);
        Ok(())
    }

    pub async fn cart_items_count(&self) -> E2eResult<usize> {
        self.count(ITEMS).await
    }

    pub async fn verify_cart_is_empty(&self) -> E2eResult<()> {
        let count = self.cart_items_count().await?;
        ensure(count == 0, format!("expected an empty cart, found {} items", count))?;
        self.verify_text("empty_cart", "Cart is empty!").await?;
        page_action("Verified cart is empty", None);
        Ok(())
    }

    /// Exactly `expected` rows, or at least one
    pub async fn verify_cart_has_items(&self, expected: Option<usize>) -> E2eResult<()> {
        wait::wait_for(self.driver(), ITEMS, WaitCondition::Exists, Some(self.timeout())).await?;
        let count = self.cart_items_count().await?;
        match expected {
            Some(n) => ensure(count == n, format!("expected {} cart items, found {}", n, count))?,
            None => ensure(count > 0, "expected items in the cart")?,
        }
        page_action(
            &format!(
                "Verified cart has {} items",
                expected.map(|n| n.to_string()).unwrap_or_else(|| "some".to_string())
            ),
            None,
        );
        Ok(())
    }

    pub async fn remove_item_from_cart(&self, index: usize) -> E2eResult<()> {
        self.click_selector(&Self::item_part(index, ".cart_quantity_delete")).await?;
        page_action(&format!("Removed item {} from cart", index), None);
        Ok(())
    }

    pub async fn item_quantity(&self, index: usize) -> E2eResult<String> {
        self.text_of(&Self::item_part(index, QUANTITY)).await
    }

    pub async fn item_name(&self, index: usize) -> E2eResult<String> {
        self.text_of(&Self::item_part(index, NAME)).await
    }

    pub async fn item_price(&self, index: usize) -> E2eResult<String> {
        self.text_of(&Self::item_part(index, PRICE)).await
    }

    pub async fn proceed_to_checkout(&self) -> E2eResult<()> {
        self.click("proceed_to_checkout").await?;
        page_action("Clicked proceed to checkout", None);
        Ok(())
    }

    pub async fn continue_shopping(&self) -> E2eResult<()> {
        self.click("continue_shopping").await?;
        page_action("Clicked continue shopping", None);
        Ok(())
    }

    /// A row named `name` exists with the given quantity
    pub async fn verify_item_in_cart(&self, name: &str, quantity: &str) -> E2eResult<()> {
        let count = self.cart_items_count().await?;
        for index in 0..count {
            if self.item_name(index).await? == name {
                let found = self.item_quantity(index).await?;
                ensure(
                    found == quantity,
                    format!("{} has quantity {}, expected {}", name, found, quantity),
                )?;
                page_action(
                    &format!("Verified item \"{}\" is in cart with quantity {}", name, quantity),
                    None,
                );
                return Ok(());
            }
        }
        Err(E2eError::AssertionFailed(format!("{} is not in the cart", name)))
    }

    /// Σ unit price × quantity over all rows
    pub async fn calculate_total_price(&self) -> E2eResult<f64> {
        let mut total = 0.0;
        for index in 0..self.cart_items_count().await? {
            let price = self.item_price(index).await?;
            let quantity = self.item_quantity(index).await?;
            let price = parse_amount(&price)
                .ok_or_else(|| E2eError::AssertionFailed(format!("unreadable price {:?}", price)))?;
            let quantity: u32 = quantity
                .trim()
                .parse()
                .map_err(|_| E2eError::AssertionFailed(format!("unreadable quantity {:?}", quantity)))?;
            total += price * f64::from(quantity);
        }
        Ok(round2(total))
    }

    /// Σ of the per-row totals the page displays
    pub async fn displayed_total(&self) -> E2eResult<f64> {
        let mut total = 0.0;
        for index in 0..self.cart_items_count().await? {
            let text = self.text_of(&Self::item_part(index, ROW_TOTAL)).await?;
            total += parse_amount(&text)
                .ok_or_else(|| E2eError::AssertionFailed(format!("unreadable total {:?}", text)))?;
        }
        Ok(round2(total))
    }

    pub async fn verify_cart_total(&self) -> E2eResult<()> {
        let calculated = self.calculate_total_price().await?;
        let displayed = self.displayed_total().await?;
        ensure(
            (calculated - displayed).abs() < 0.01,
            format!("cart shows {} but items add up to {}", displayed, calculated),
        )?;
        page_action("Verified cart total calculation", None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::mock::{MockDriver, MockElement};

    fn row_part(part: &str) -> String {
        format!("{} >> {}", ITEMS, part)
    }

    /// Rows of name, unit price, quantity and row total
    fn cart(rows: &[[&str; 4]]) -> MockDriver {
        let column = |i: usize| -> Vec<String> { rows.iter().map(|r| r[i].to_string()).collect() };
        let mut elements = vec![
            ("#cart_info_table".to_string(), MockElement::new()),
            (ITEMS.to_string(), MockElement::new().count(rows.len())),
            (row_part(NAME), MockElement::new().texts(column(0))),
            (row_part(PRICE), MockElement::new().texts(column(1))),
            (row_part(QUANTITY), MockElement::new().texts(column(2))),
            (row_part(ROW_TOTAL), MockElement::new().texts(column(3))),
        ];
        if rows.is_empty() {
            elements.push(("#empty_cart".to_string(), MockElement::new().text("Cart is empty! Click here to buy products.")));
        }
        MockDriver::new().page("/view_cart", "Automation Exercise - Checkout", elements)
    }

    fn session(driver: &MockDriver) -> Session<'_> {
        Session::new(driver, "https://shop.test").with_timeouts(Duration::from_millis(200), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_totals_add_up() {
        let driver = cart(&[
            ["Blue Top", "Rs. 500", "1", "Rs. 500"],
            ["Men Tshirt", "Rs. 400", "2", "Rs. 800"],
        ]);
        let page = CartPage::new(session(&driver));
        page.visit_cart().await.unwrap();
        page.verify_cart_page_loaded().await.unwrap();
        page.verify_cart_has_items(Some(2)).await.unwrap();
        assert_eq!(page.calculate_total_price().await.unwrap(), 1300.0);
        assert_eq!(page.displayed_total().await.unwrap(), 1300.0);
        page.verify_cart_total().await.unwrap();
        page.verify_item_in_cart("Men Tshirt", "2").await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_row_total_is_reported() {
        let driver = cart(&[
            ["Blue Top", "Rs. 500", "1", "Rs. 500"],
            ["Men Tshirt", "Rs. 400", "2", "Rs. 400"],
        ]);
        let page = CartPage::new(session(&driver));
        page.visit_cart().await.unwrap();
        let err = page.verify_cart_total().await.unwrap_err();
        assert!(matches!(err, E2eError::AssertionFailed(_)));
        assert!(err.to_string().contains("cart shows 900 but items add up to 1300"));
    }

    #[tokio::test]
    async fn test_unreadable_quantity_and_missing_items() {
        let driver = cart(&[["Blue Top", "Rs. 500", "one", "Rs. 500"]]);
        let page = CartPage::new(session(&driver));
        page.visit_cart().await.unwrap();
        assert!(page.calculate_total_price().await.is_err());
        assert!(page.verify_item_in_cart("Blue Top", "2").await.is_err());
        assert!(page.verify_item_in_cart("Men Tshirt", "1").await.is_err());
        assert!(page.verify_cart_has_items(Some(3)).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let driver = cart(&[]);
        let page = CartPage::new(session(&driver));
        page.visit_cart().await.unwrap();
        page.verify_cart_is_empty().await.unwrap();
        assert_eq!(page.calculate_total_price().await.unwrap(), 0.0);
        assert!(page.verify_cart_has_items(None).await.is_err());
    }
}
