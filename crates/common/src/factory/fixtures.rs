//! Canned data shared by the UI scenarios

use super::faker::{unique_suffix, Faker};
use super::payment::{PaymentFactory, PaymentPreset};
use super::product::CartFactory;
use super::Factory;
use crate::types::{CheckoutData, PaymentCard, PaymentInfo, ShippingMethod, Title, User};

/// Product names the checkout flow puts in the cart
pub const CHECKOUT_PRODUCTS: [&str; 2] = ["Blue Top", "Men Tshirt"];

pub const ORDER_COMMENT: &str = "Please deliver during business hours.";

/// The signup fixture, with a fresh email address so it can be registered
pub fn new_user() -> User {
    let unique = unique_suffix(&mut Faker::default());
    User {
        id: None,
        name: "New Shopper".to_string(),
        email: format!("new.shopper.{}@automation.test", unique),
        password: "Shopper123!".to_string(),
        title: Some(Title::Mrs),
        birth_date: "10".to_string(),
        birth_month: "5".to_string(),
        birth_year: "1992".to_string(),
        firstname: "New".to_string(),
        lastname: "Shopper".to_string(),
        company: "Shopcheck QA".to_string(),
        address1: "742 Evergreen Terrace".to_string(),
        address2: "Unit 2".to_string(),
        country: "United States".to_string(),
        zipcode: "97403".to_string(),
        state: "Oregon".to_string(),
        city: "Springfield".to_string(),
        mobile_number: "5415550123".to_string(),
    }
}

pub fn checkout_payment() -> PaymentCard {
    PaymentFactory::new().preset(PaymentPreset::Valid)
}

/// A full checkout submission for [`new_user`] with a random cart
pub fn checkout_data() -> CheckoutData {
    let cart = CartFactory::new().create_default();
    CheckoutData::new(
        new_user(),
        ShippingMethod::Standard,
        PaymentInfo::card(checkout_payment()),
        cart,
    )
}
