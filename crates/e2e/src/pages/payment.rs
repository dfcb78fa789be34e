use std::ops::Deref;

use shopcheck_common::logging::{page_action, step};
use shopcheck_common::PaymentCard;

use crate::error::E2eResult;
use crate::pages::{BasePage, PageElement, Session};

pub struct PaymentPage<'a> {
    base: BasePage<'a>,
}

impl<'a> Deref for PaymentPage<'a> {
    type Target = BasePage<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> PaymentPage<'a> {
    pub fn new(session: Session<'a>) -> Self {
        let base = BasePage::new(session, "Payment page", "/payment", "Automation Exercise - Payment")
            .with("name_on_card", PageElement::input(r#"input[name="name_on_card"]"#, "Name on card").required())
            .with("card_number", PageElement::input(r#"input[name="card_number"]"#, "Card number").required())
            .with("cvc", PageElement::input(r#"input[name="cvc"]"#, "CVC").required())
            .with("expiry_month", PageElement::input(r#"input[name="expiry_month"]"#, "Expiry month").required())
            .with("expiry_year", PageElement::input(r#"input[name="expiry_year"]"#, "Expiry year").required())
            .with("pay", PageElement::button(r#"[data-qa="pay-button"]"#, "Pay and Confirm Order button").required());
        Self { base }
    }

    pub async fn fill_payment_details(&self, card: &PaymentCard) -> E2eResult<()> {
        self.type_text("name_on_card", &card.name_on_card).await?;
        self.type_text("card_number", &card.card_number).await?;
        self.type_text("cvc", &card.cvc).await?;
        self.type_text("expiry_month", &card.expiry_month).await?;
        self.type_text("expiry_year", &card.expiry_year).await?;
        page_action("Filled payment details", None);
        Ok(())
    }

    pub async fn submit_payment(&self) -> E2eResult<()> {
        self.click("pay").await?;
        page_action("Submitted payment", None);
        Ok(())
    }

    pub async fn complete_payment(&self, card: &PaymentCard) -> E2eResult<()> {
        step(&format!("Pay with card ending {}", last_four(&card.card_number)));
        self.fill_payment_details(card).await?;
        self.submit_payment().await
    }
}

fn last_four(number: &str) -> &str {
    let cut = number.len().saturating_sub(4);
    number.get(cut..).unwrap_or(number)
}
