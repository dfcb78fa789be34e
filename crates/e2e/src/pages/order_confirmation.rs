use std::ops::Deref;

use shopcheck_common::logging::page_action;

use crate::error::E2eResult;
use crate::pages::{has_text, BasePage, PageElement, Session};

pub struct OrderConfirmationPage<'a> {
    base: BasePage<'a>,
}

impl<'a> Deref for OrderConfirmationPage<'a> {
    type Target = BasePage<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> OrderConfirmationPage<'a> {
    pub fn new(session: Session<'a>) -> Self {
        let base = BasePage::new(session, "Order confirmation page", "/payment_done", "Automation Exercise - Order Placed")
            .with("order_placed", PageElement::text(r#"h2.title[data-qa="order-placed"]"#, "Order placed heading").required())
            .with("continue", PageElement::button(r#"[data-qa="continue-button"]"#, "Continue button"))
            .with("download_invoice", PageElement::link(has_text("a", "Download Invoice"), "Download Invoice button"));
        Self { base }
    }

    pub async fn assert_order_placed_successfully(&self) -> E2eResult<()> {
        self.wait_for_element("order_placed", None).await?;
        self.verify_text("order_placed", "Order Placed!").await?;
        page_action("Verified order placed successfully", None);
        Ok(())
    }

    pub async fn verify_order_confirmation_page(&self) -> E2eResult<()> {
        self.assert_order_placed_successfully().await?;
        self.wait_for_element("continue", None).await?;
        self.wait_for_element("download_invoice", None).await?;
        page_action("Verified order confirmation page", None);
        Ok(())
    }

    pub async fn download_invoice(&self) -> E2eResult<()> {
        self.click("download_invoice").await?;
        page_action("Downloaded invoice", None);
        Ok(())
    }

    pub async fn continue_after_order(&self) -> E2eResult<()> {
        self.click("continue").await?;
        page_action("Clicked continue after order", None);
        Ok(())
    }
}
