use std::ops::Deref;

use shopcheck_common::logging::{page_action, step};

use crate::driver::ClickOptions;
use crate::error::{ensure, E2eError, E2eResult};
use crate::pages::{has_text, nth, within, BasePage, PageElement, Session};
use crate::wait::{self, WaitCondition};

const PRODUCTS: &str = ".features_items .product-image-wrapper";
const NAME: &str = ".productinfo p";
const PRICE: &str = ".productinfo h2";
const ADD_TO_CART: &str = ".productinfo .add-to-cart";
const VIEW_PRODUCT: &str = r#"a:has-text("View Product")"#;

/// Name and price shown on a product card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub name: String,
    pub price: String,
}

pub struct ProductsPage<'a> {
    base: BasePage<'a>,
}

impl<'a> Deref for ProductsPage<'a> {
    type Target = BasePage<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> ProductsPage<'a> {
    pub fn new(session: Session<'a>) -> Self {
        let base = BasePage::new(session, "Products page", "/products", "Automation Exercise - All Products")
            .with("features_items", PageElement::text(".features_items", "Product listing").required())
            .with("products", PageElement::text(PRODUCTS, "Product cards"))
            .with("search_input", PageElement::input("#search_product", "Search input"))
            .with("search_button", PageElement::button("#submit_search", "Search button"))
            .with("category_menu", PageElement::text(".category-products", "Category menu"))
            .with("brand_menu", PageElement::text(".brands_products", "Brand menu"))
            .with("modal", PageElement::text(".modal-content", "Added to cart modal"))
            .with("modal_body", PageElement::text(".modal-body", "Added to cart modal body"))
            .with("continue_shopping", PageElement::button(has_text(".btn-success", "Continue Shopping"), "Continue Shopping button"))
            .with("view_cart", PageElement::link(has_text(".modal-content a", "View Cart"), "View Cart link"))
            .with("cart_link", PageElement::link(r#".shop-menu a[href="/view_cart"]"#, "Cart link"));
        Self { base }
    }

    fn product_part(index: usize, part: &str) -> String {
        within(PRODUCTS, index, part)
    }

    pub async fn visit_products(&self) -> E2eResult<()> {
        self.visit().await?;
        page_action("Visited products page", None);
        Ok(())
    }

    pub async fn verify_products_page_loaded(&self) -> E2eResult<()> {
        self.wait_for_element("features_items", None).await?;
        wait::wait_for(self.driver(), PRODUCTS, WaitCondition::Exists, Some(self.timeout())).await?;
        page_action("Verified products page loaded", None);
        Ok(())
    }

    pub async fn products_count(&self) -> E2eResult<usize> {
        self.count(PRODUCTS).await
    }

    pub async fn product_names(&self) -> E2eResult<Vec<String>> {
        let names = self.driver().texts(&format!("{} {}", PRODUCTS, NAME)).await?;
        Ok(names.into_iter().map(|n| n.trim().to_string()).collect())
    }

    pub async fn product_name(&self, index: usize) -> E2eResult<String> {
        self.text_of(&Self::product_part(index, NAME)).await
    }

    pub async fn product_price(&self, index: usize) -> E2eResult<String> {
        self.text_of(&Self::product_part(index, PRICE)).await
    }

    pub async fn product_details(&self, index: usize) -> E2eResult<ProductCard> {
        Ok(ProductCard {
            name: self.product_name(index).await?,
            price: self.product_price(index).await?,
        })
    }

    pub async fn add_product_to_cart(&self, index: usize) -> E2eResult<()> {
        self.driver().hover(&nth(PRODUCTS, index)).await?;
        self.driver()
            .click(&Self::product_part(index, ADD_TO_CART), ClickOptions::forced())
            .await?;
        page_action(&format!("Added product {} to cart", index), None);
        Ok(())
    }

    /// Add the card whose name matches exactly, then dismiss the modal
    pub async fn add_product_to_cart_by_name(&self, name: &str) -> E2eResult<()> {
        step(&format!("Add product to cart: {}", name));
        wait::wait_for(self.driver(), PRODUCTS, WaitCondition::Exists, Some(self.timeout())).await?;
        let index = self
            .product_names()
            .await?
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| E2eError::ElementNotFound(format!("product named {:?}", name)))?;
        self.add_product_to_cart(index).await?;
        self.wait_for_element("modal", None).await?;
        self.continue_shopping_from_modal().await?;
        page_action(&format!("Added product \"{}\" to cart", name), None);
        Ok(())
    }

    pub async fn view_product(&self, index: usize) -> E2eResult<()> {
        self.click_selector(&Self::product_part(index, VIEW_PRODUCT)).await?;
        page_action(&format!("Viewed product {} details", index), None);
        Ok(())
    }

    pub async fn continue_shopping_from_modal(&self) -> E2eResult<()> {
        self.click("continue_shopping").await?;
        self.wait_for_element("modal", Some(WaitCondition::Hidden)).await
    }

    pub async fn view_cart_from_modal(&self) -> E2eResult<()> {
        self.click("view_cart").await
    }

    pub async fn view_cart(&self) -> E2eResult<()> {
        self.click("cart_link").await?;
        self.wait_for_url("/view_cart").await
    }

    pub async fn search_product(&self, term: &str) -> E2eResult<()> {
        self.type_text("search_input", term).await?;
        self.click("search_button").await?;
        page_action(&format!("Searched for product: {}", term), None);
        Ok(())
    }

    /// At least one result and every result name contains `term`,
    /// ignoring case
    pub async fn verify_search_results(&self, term: &str) -> E2eResult<()> {
        wait::wait_for(self.driver(), PRODUCTS, WaitCondition::Exists, Some(self.timeout())).await?;
        let needle = term.to_lowercase();
        for name in self.product_names().await? {
            ensure(
                name.to_lowercase().contains(&needle),
                format!("search result {:?} does not match {:?}", name, term),
            )?;
        }
        page_action(&format!("Verified search results for: {}", term), None);
        Ok(())
    }

    pub async fn verify_no_search_results(&self) -> E2eResult<()> {
        let count = self.products_count().await?;
        ensure(count == 0, format!("expected no search results, found {}", count))?;
        page_action("Verified no search results found", None);
        Ok(())
    }

    pub async fn select_category(&self, category: &str) -> E2eResult<()> {
        self.click_selector(&format!("{} {}", self.selector("category_menu")?, has_text("a", category)))
            .await?;
        page_action(&format!("Selected category: {}", category), None);
        Ok(())
    }

    pub async fn select_brand(&self, brand: &str) -> E2eResult<()> {
        self.click_selector(&format!("{} {}", self.selector("brand_menu")?, has_text("a", brand)))
            .await?;
        page_action(&format!("Selected brand: {}", brand), None);
        Ok(())
    }

    /// Adds each product, continuing shopping between them
    pub async fn add_multiple_products_to_cart(&self, indices: &[usize]) -> E2eResult<()> {
        for (i, index) in indices.iter().enumerate() {
            self.add_product_to_cart(*index).await?;
            if i + 1 < indices.len() {
                self.continue_shopping_from_modal().await?;
            }
        }
        page_action(&format!("Added {} products to cart", indices.len()), None);
        Ok(())
    }

    pub async fn verify_product_modal(&self) -> E2eResult<()> {
        self.wait_for_element("modal", None).await?;
        self.verify_text("modal_body", "Your product has been added to cart.").await?;
        page_action("Verified product added modal", None);
        Ok(())
    }

    /// Every card shows a non-empty name and price
    pub async fn verify_products_displayed(&self) -> E2eResult<()> {
        let count = self.products_count().await?;
        ensure(count > 0, "no products displayed")?;
        for index in 0..count {
            let card = self.product_details(index).await?;
            ensure(!card.name.is_empty(), format!("product {} has no name", index))?;
            ensure(!card.price.is_empty(), format!("product {} has no price", index))?;
        }
        page_action("Verified all products are properly displayed", None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::mock::{Effect, MockDriver, MockElement};

    const MODAL: &str = ".modal-content";

    fn catalogue(names: &[&str]) -> MockDriver {
        let count = names.len();
        MockDriver::new()
            .page(
                "/products",
                "Automation Exercise - All Products",
                [
                    (".features_items".to_string(), MockElement::new()),
                    (PRODUCTS.to_string(), MockElement::new().count(count)),
                    (format!("{} {}", PRODUCTS, NAME), MockElement::new().texts(names.iter().copied())),
                    (format!("{} >> {}", PRODUCTS, NAME), MockElement::new().texts(names.iter().copied())),
                    (format!("{} >> {}", PRODUCTS, PRICE), MockElement::new().texts(vec!["Rs. 500"; count])),
                    (format!("{} >> {}", PRODUCTS, ADD_TO_CART), MockElement::new().count(count)),
                    ("#search_product".to_string(), MockElement::new()),
                    ("#submit_search".to_string(), MockElement::new()),
                    (has_text(".btn-success", "Continue Shopping"), MockElement::new()),
                ],
            )
            .on_click(
                format!("{} >> {}", PRODUCTS, ADD_TO_CART),
                Effect::new()
                    .set(MODAL, MockElement::new().text("Added!"))
                    .set(".modal-body", MockElement::new().text("Your product has been added to cart.")),
            )
            .on_click(
                has_text(".btn-success", "Continue Shopping"),
                Effect::new().remove(MODAL).remove(".modal-body"),
            )
    }

    fn session(driver: &MockDriver) -> Session<'_> {
        Session::new(driver, "https://shop.test").with_timeouts(Duration::from_millis(200), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_add_by_exact_name_dismisses_the_modal() {
        let driver = catalogue(&["Blue Top Deluxe", "Blue Top", "Men Tshirt"]);
        let products = ProductsPage::new(session(&driver));
        products.visit_products().await.unwrap();
        products.verify_products_page_loaded().await.unwrap();
        products.add_product_to_cart_by_name("Blue Top").await.unwrap();

        let actions = driver.actions();
        assert!(actions.contains(&format!("hover:{}", nth(PRODUCTS, 1))));
        assert!(actions.contains(&format!("click:{}", within(PRODUCTS, 1, ADD_TO_CART))));
        assert!(driver.element(MODAL).is_none());
    }

    #[tokio::test]
    async fn test_add_unknown_name_fails() {
        let driver = catalogue(&["Blue Top", "Men Tshirt"]);
        let products = ProductsPage::new(session(&driver));
        products.visit_products().await.unwrap();
        let err = products.add_product_to_cart_by_name("Blue").await.unwrap_err();
        assert!(matches!(err, E2eError::ElementNotFound(_)));
        assert!(!driver.actions().iter().any(|a| a.starts_with("click:")));
    }

    #[tokio::test]
    async fn test_search_results_ignore_case() {
        let driver = catalogue(&["Blue Top", "Pure Cotton BLUE Tshirt"]);
        let products = ProductsPage::new(session(&driver));
        products.visit_products().await.unwrap();
        products.search_product("blue").await.unwrap();
        products.verify_search_results("blue").await.unwrap();

        let err = products.verify_search_results("top").await.unwrap_err();
        assert!(err.to_string().contains("Pure Cotton BLUE Tshirt"));
    }

    #[tokio::test]
    async fn test_cards_and_empty_results() {
        let driver = catalogue(&["Blue Top"]);
        let products = ProductsPage::new(session(&driver));
        products.visit_products().await.unwrap();
        assert_eq!(
            products.product_details(0).await.unwrap(),
            ProductCard {
                name: "Blue Top".into(),
                price: "Rs. 500".into()
            }
        );
        products.verify_products_displayed().await.unwrap();
        assert!(products.verify_no_search_results().await.is_err());

        let empty = catalogue(&[]);
        let page = ProductsPage::new(session(&empty));
        page.visit_products().await.unwrap();
        page.verify_no_search_results().await.unwrap();
        assert!(page.verify_search_results("blue").await.is_err());
    }
}
