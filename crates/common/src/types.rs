//! Core types for Shopcheck

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Honorific used by the signup form and the account API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Title {
    Mr,
    Mrs,
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Title::Mr => write!(f, "Mr"),
            Title::Mrs => write!(f, "Mrs"),
        }
    }
}

/// A storefront account. Field names follow the account API's form fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub birth_month: String,
    #[serde(default)]
    pub birth_year: String,
    #[serde(default, alias = "first_name")]
    pub firstname: String,
    #[serde(default, alias = "last_name")]
    pub lastname: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub mobile_number: String,
}

impl User {
    pub fn credentials(&self) -> LoginCredentials {
        LoginCredentials::new(&self.email, &self.password)
    }

    /// Form fields for the account API, skipping empty optional values
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("name".to_string(), self.name.clone()),
            ("email".to_string(), self.email.clone()),
            ("password".to_string(), self.password.clone()),
        ];
        if let Some(title) = self.title {
            fields.push(("title".to_string(), title.to_string()));
        }
        let optional = [
            ("birth_date", &self.birth_date),
            ("birth_month", &self.birth_month),
            ("birth_year", &self.birth_year),
            ("firstname", &self.firstname),
            ("lastname", &self.lastname),
            ("company", &self.company),
            ("address1", &self.address1),
            ("address2", &self.address2),
            ("country", &self.country),
            ("zipcode", &self.zipcode),
            ("state", &self.state),
            ("city", &self.city),
            ("mobile_number", &self.mobile_number),
        ];
        for (key, value) in optional {
            if !value.is_empty() {
                fields.push((key.to_string(), value.clone()));
            }
        }
        fields
    }
}

/// Email/password pair, optionally carrying the display name the site greets with
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
        }
    }

    pub fn named(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserRegistration {
    #[serde(flatten)]
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
    pub newsletter: bool,
    pub offers: bool,
}

impl UserRegistration {
    pub fn passwords_match(&self) -> bool {
        self.confirm_password
            .as_deref()
            .map_or(true, |confirm| confirm == self.user.password)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    pub newsletter: bool,
    pub offers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub preferences: UserPreferences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Product availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Availability {
    #[default]
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::InStock => write!(f, "In Stock"),
            Availability::OutOfStock => write!(f, "Out of Stock"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u32>,
    #[serde(default)]
    pub subcategories: Vec<ProductCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReview {
    pub id: u32,
    pub user_id: u32,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: f64,
    pub brand: String,
    pub category: ProductCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub availability: Availability,
    pub rating: f64,
    #[serde(default)]
    pub reviews: Vec<ProductReview>,
}

impl Product {
    /// Mean review rating to one decimal, zero without reviews
    pub fn average_rating(reviews: &[ProductReview]) -> f64 {
        if reviews.is_empty() {
            return 0.0;
        }
        let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        (f64::from(sum) / reviews.len() as f64 * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
    pub price: f64,
    pub total_price: f64,
}

impl CartItem {
    pub fn new(product: Product, quantity: u32) -> Self {
        let price = product.price;
        Self {
            product,
            quantity,
            price,
            total_price: round2(price * f64::from(quantity)),
        }
    }
}

/// Sales tax applied to every cart
pub const TAX_RATE: f64 = 0.08;
/// Orders above this subtotal ship free
pub const FREE_SHIPPING_THRESHOLD: f64 = 100.0;
pub const FLAT_SHIPPING: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total_quantity: u32,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total: f64,
}

impl Cart {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<CartItem>) -> Self {
        let subtotal: f64 = items.iter().map(|i| i.total_price).sum();
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            0.0
        } else {
            FLAT_SHIPPING
        };
        Self::priced(items, subtotal, shipping)
    }

    /// Same pricing as [`Cart::from_items`] but shipping is always waived
    pub fn with_free_shipping(items: Vec<CartItem>) -> Self {
        let subtotal: f64 = items.iter().map(|i| i.total_price).sum();
        Self::priced(items, subtotal, 0.0)
    }

    fn priced(items: Vec<CartItem>, subtotal: f64, shipping: f64) -> Self {
        if items.is_empty() {
            return Self::empty();
        }
        let tax = round2(subtotal * TAX_RATE);
        Self {
            total_quantity: items.iter().map(|i| i.quantity).sum(),
            subtotal: round2(subtotal),
            tax,
            shipping,
            total: round2(subtotal + tax + shipping),
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Name,
    Price,
    Rating,
    Newest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductSearchParams {
    #[serde(flatten)]
    pub filters: ProductFilters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    pub page: u32,
    pub limit: u32,
}

/// A product as the storefront lists it: `"Rs. 500"` prices, `"Women > Tops"` categories
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub availability: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CatalogProduct {
    pub fn amount(&self) -> Option<f64> {
        parse_amount(&self.price)
    }
}

/// One cart row priced in the storefront's currency format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCartLine {
    pub product_id: u32,
    pub quantity: u32,
    pub price: String,
    pub total_price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPriceRange {
    pub min: u32,
    pub max: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchTerms {
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
    pub special: Vec<String>,
}

/// Card details entered on the payment page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCard {
    pub name_on_card: String,
    pub card_number: String,
    pub cvc: String,
    pub expiry_month: String,
    pub expiry_year: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
    Overnight,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub address1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub method: ShippingMethod,
    pub cost: f64,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl ShippingInfo {
    /// Ship to the account's own address
    pub fn for_user(user: &User, method: ShippingMethod, cost: f64) -> Self {
        Self {
            first_name: user.firstname.clone(),
            last_name: user.lastname.clone(),
            company: non_empty(&user.company),
            address1: user.address1.clone(),
            address2: non_empty(&user.address2),
            city: user.city.clone(),
            state: user.state.clone(),
            zip_code: user.zipcode.clone(),
            country: user.country.clone(),
            method,
            cost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    #[serde(rename = "PayPal")]
    PayPal,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<PaymentCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<ShippingInfo>,
}

impl PaymentInfo {
    pub fn card(card: PaymentCard) -> Self {
        Self {
            method: PaymentMethod::CreditCard,
            card: Some(card),
            billing_address: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: u32,
    pub items: Vec<CartItem>,
    pub shipping: ShippingInfo,
    pub payment: PaymentInfo,
    pub status: OrderStatus,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderHistory {
    pub orders: Vec<Order>,
    pub total_orders: usize,
    pub total_spent: f64,
}

impl OrderHistory {
    pub fn from_orders(orders: Vec<Order>) -> Self {
        let total_spent = round2(
            orders
                .iter()
                .filter(|o| !matches!(o.status, OrderStatus::Cancelled | OrderStatus::Refunded))
                .map(|o| o.total)
                .sum(),
        );
        Self {
            total_orders: orders.len(),
            total_spent,
            orders,
        }
    }
}

/// Everything the checkout flow submits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutData {
    pub user: User,
    pub shipping: ShippingInfo,
    pub payment: PaymentInfo,
    pub items: Vec<CartItem>,
    pub total: f64,
}

impl CheckoutData {
    /// Shipping cost and total are taken from the priced cart
    pub fn new(user: User, method: ShippingMethod, payment: PaymentInfo, cart: Cart) -> Self {
        let shipping = ShippingInfo::for_user(&user, method, cart.shipping);
        Self {
            user,
            shipping,
            payment,
            total: cart.total,
            items: cart.items,
        }
    }
}

/// Parse a displayed amount such as `"Rs. 1,500"` by keeping digits and dots
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Format an amount the way the storefront displays it
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("Rs. {}", amount as i64)
    } else {
        format!("Rs. {:.2}", amount)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn product(price: f64) -> Product {
        Product {
            id: 1,
            name: "Blue Top".into(),
            price,
            ..Default::default()
        }
    }

    #[test_case("Rs. 500", Some(500.0) ; "plain")]
    #[test_case("Rs. 1,500", Some(1500.0) ; "thousands separator")]
    #[test_case("Rs. 12.50", Some(12.5) ; "decimals")]
    #[test_case("free", None ; "no digits")]
    fn test_parse_amount(input: &str, expected: Option<f64>) {
        assert_eq!(parse_amount(input), expected);
    }

    #[test]
    fn test_cart_pricing_with_shipping() {
        let cart = Cart::from_items(vec![CartItem::new(product(20.0), 2)]);
        assert_eq!(cart.subtotal, 40.0);
        assert_eq!(cart.tax, 3.2);
        assert_eq!(cart.shipping, 10.0);
        assert_eq!(cart.total, 53.2);
        assert_eq!(cart.total_quantity, 2);
    }

    #[test]
    fn test_cart_pricing_free_shipping() {
        let cart = Cart::from_items(vec![
            CartItem::new(product(60.0), 1),
            CartItem::new(product(50.0), 1),
        ]);
        assert_eq!(cart.subtotal, 110.0);
        assert_eq!(cart.shipping, 0.0);
        assert_eq!(cart.total, 118.8);
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let cart = Cart::from_items(vec![]);
        assert_eq!(cart, Cart::empty());
        assert_eq!(cart.total, 0.0);
    }

    #[test]
    fn test_form_fields_skip_empty() {
        let user = User {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            password: "pw".into(),
            title: Some(Title::Mrs),
            city: "Austin".into(),
            ..Default::default()
        };
        let fields = user.form_fields();
        assert!(fields.contains(&("title".to_string(), "Mrs".to_string())));
        assert!(fields.contains(&("city".to_string(), "Austin".to_string())));
        assert!(!fields.iter().any(|(k, _)| k == "company"));
    }

    #[test]
    fn test_availability_wire_names() {
        let json = serde_json::to_string(&Availability::OutOfStock).unwrap();
        assert_eq!(json, "\"Out of Stock\"");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(500.0), "Rs. 500");
        assert_eq!(format_amount(12.5), "Rs. 12.50");
    }

    #[test]
    fn test_checkout_data_takes_cart_pricing() {
        let user = User {
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            address1: "1 Analytical Way".into(),
            city: "London".into(),
            ..Default::default()
        };
        let cart = Cart::from_items(vec![CartItem::new(product(20.0), 2)]);
        let checkout = CheckoutData::new(user, ShippingMethod::Express, PaymentInfo::default(), cart.clone());

        assert_eq!(checkout.total, cart.total);
        assert_eq!(checkout.shipping.cost, FLAT_SHIPPING);
        assert_eq!(checkout.shipping.first_name, "Ada");
        assert_eq!(checkout.shipping.company, None);
        assert_eq!(checkout.items.len(), 1);
    }

    #[test]
    fn test_payment_method_wire_names() {
        let json = serde_json::to_value(PaymentInfo::default()).unwrap();
        assert_eq!(json["method"], "Credit Card");
    }

    #[test]
    fn test_order_history_skips_refunds() {
        let order = |total: f64, status: OrderStatus| Order {
            id: "o".into(),
            user_id: 1,
            items: vec![],
            shipping: ShippingInfo::default(),
            payment: PaymentInfo::default(),
            status,
            total,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let history = OrderHistory::from_orders(vec![
            order(10.5, OrderStatus::Delivered),
            order(99.0, OrderStatus::Refunded),
            order(4.25, OrderStatus::Pending),
        ]);
        assert_eq!(history.total_orders, 3);
        assert_eq!(history.total_spent, 14.75);
    }
}
