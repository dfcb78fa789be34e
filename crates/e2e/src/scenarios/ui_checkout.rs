use shopcheck_common::factory::fixtures::{self, CHECKOUT_PRODUCTS, ORDER_COMMENT};
use shopcheck_common::logging::step;

use crate::error::{ensure, E2eResult};
use crate::pages::{
    CartPage, CheckoutPage, HomePage, LoginPage, OrderConfirmationPage, PaymentPage, ProductsPage, Session,
};
use crate::runner::{Scenario, ScenarioContext, ScenarioFuture};

const SUITE: &str = "Checkout feature tests";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![Scenario::ui(
        SUITE,
        "should complete checkout process",
        &["ui", "checkout", "smoke"],
        complete_checkout,
    )]
}

/// Log in as the environment's stock account and land on the home page
async fn sign_in(ctx: &ScenarioContext, session: Session<'_>) -> E2eResult<()> {
    let login = LoginPage::new(session);
    login.visit().await?;
    login
        .login(&ctx.environment().config.default_user.credentials())
        .await?;

    let home = HomePage::new(session);
    home.visit().await?;
    home.verify_logged_in().await
}

fn complete_checkout(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let session = ctx.session()?;
        sign_in(ctx, session).await?;

        step("Look up the checkout products in the catalogue");
        let catalog = ctx.product_service().catalog().await?;
        let wanted: Vec<&str> = CHECKOUT_PRODUCTS
            .into_iter()
            .filter(|name| catalog.iter().any(|p| p.name == *name))
            .collect();
        ensure(!wanted.is_empty(), "none of the checkout products are listed by the API")?;

        let products = ProductsPage::new(session);
        products.visit_products().await?;
        for name in &wanted {
            products.add_product_to_cart_by_name(name).await?;
        }
        products.view_cart().await?;

        let cart = CartPage::new(session);
        cart.verify_cart_has_items(None).await?;
        cart.proceed_to_checkout().await?;

        let checkout = CheckoutPage::new(session);
        checkout.wait_for_url("/checkout").await?;
        ensure(checkout.is_on_checkout_page().await, "checkout page did not open")?;
        checkout.add_order_comment(ORDER_COMMENT).await?;
        checkout.place_order().await?;

        PaymentPage::new(session)
            .complete_payment(&fixtures::checkout_payment())
            .await?;
        OrderConfirmationPage::new(session)
            .assert_order_placed_successfully()
            .await
    })
}
