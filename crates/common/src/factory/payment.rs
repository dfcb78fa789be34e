//! Payment card data

use chrono::{Datelike, Utc};

use super::faker::{FactoryOptions, Faker};
use crate::error::{Error, Result};
use crate::types::PaymentCard;

/// Card number the storefront's payment form accepts for test orders
pub const TEST_CARD_NUMBER: &str = "4242424242424242";
pub const REJECTED_CARD_NUMBER: &str = "1111111111111111";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentPreset {
    #[default]
    Valid,
    Invalid,
    Expired,
}

impl std::str::FromStr for PaymentPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "valid" => Ok(PaymentPreset::Valid),
            "invalid" => Ok(PaymentPreset::Invalid),
            "expired" => Ok(PaymentPreset::Expired),
            other => Err(Error::UnknownPreset {
                kind: "payment".to_string(),
                preset: other.to_string(),
            }),
        }
    }
}

fn card(name: &str, number: &str, cvc: &str, month: &str, year: &str) -> PaymentCard {
    PaymentCard {
        name_on_card: name.to_string(),
        card_number: number.to_string(),
        cvc: cvc.to_string(),
        expiry_month: month.to_string(),
        expiry_year: year.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFactory {
    faker: Faker,
}

impl PaymentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FactoryOptions) -> Self {
        Self {
            faker: Faker::new(options),
        }
    }

    pub fn preset(&self, preset: PaymentPreset) -> PaymentCard {
        match preset {
            PaymentPreset::Valid => card("Test User", TEST_CARD_NUMBER, "123", "12", "2025"),
            PaymentPreset::Invalid => card("Invalid User", REJECTED_CARD_NUMBER, "000", "01", "2020"),
            PaymentPreset::Expired => card("Expired User", TEST_CARD_NUMBER, "123", "01", "2020"),
        }
    }

    /// Random holder on the test card, expiring within five years
    pub fn valid(&mut self) -> PaymentCard {
        let expiry = self.faker.future(5);
        let year = expiry.year().max(Utc::now().year() + 1);
        PaymentCard {
            name_on_card: self.faker.full_name(),
            card_number: TEST_CARD_NUMBER.to_string(),
            cvc: self.faker.numeric(3),
            expiry_month: format!("{:02}", expiry.month()),
            expiry_year: year.to_string(),
        }
    }

    pub fn invalid(&mut self) -> PaymentCard {
        let name = self.faker.full_name();
        card(&name, REJECTED_CARD_NUMBER, "000", "01", "2020")
    }
}
