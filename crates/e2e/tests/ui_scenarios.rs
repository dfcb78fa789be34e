//! Catalogue UI scenarios against a scripted storefront

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::{delete, get, post};
use axum::{Form, Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use shopcheck_api::ApiFactory;
use shopcheck_common::Environments;
use shopcheck_e2e::mock::{Effect, MockDriver, MockElement, MockFactory};
use shopcheck_e2e::{catalogue, ResultStatus, RunFilter, ScenarioKind, SuiteResult, SuiteRunner};

const LOGIN_BUTTON: &str = r#"button[data-qa="login-button"]"#;
const LOGIN_ERROR: &str = r#".login-form p[style*="color: red"]"#;
const SIGNUP_BUTTON: &str = r#"button[data-qa="signup-button"]"#;
const SIGNUP_ERROR: &str = r#".signup-form p[style*="color: red"]"#;
const CREATE_ACCOUNT: &str = r#"button[data-qa="create-account"]"#;

const PRODUCTS: &str = ".features_items .product-image-wrapper";
const ADD_TO_CART: &str = ".features_items .product-image-wrapper >> .productinfo .add-to-cart";
const MODAL: &str = ".modal-content";
const CONTINUE_SHOPPING: &str = r#".btn-success:has-text("Continue Shopping")"#;
const CART_LINK: &str = r#".shop-menu a[href="/view_cart"]"#;
const PROCEED: &str = ".check_out";
const PLACE_ORDER: &str = "a.check_out";
const PAY: &str = r#"[data-qa="pay-button"]"#;

const DEFAULT_EMAIL: &str = "billsmith123@gmail.com";

fn login_page(driver: MockDriver) -> MockDriver {
    driver.page(
        "/login",
        "Automation Exercise - Signup / Login",
        [
            (".login-form h2", MockElement::new().text("Login to your account")),
            (r#"input[data-qa="login-email"]"#, MockElement::new()),
            (r#"input[data-qa="login-password"]"#, MockElement::new()),
            (LOGIN_BUTTON, MockElement::new().text("Login")),
            (".signup-form h2", MockElement::new().text("New User Signup!")),
            (r#"input[data-qa="signup-name"]"#, MockElement::new()),
            (r#"input[data-qa="signup-email"]"#, MockElement::new()),
            (SIGNUP_BUTTON, MockElement::new().text("Signup")),
        ],
    )
}

fn logged_in_home(driver: MockDriver) -> MockDriver {
    driver.page(
        "/",
        "Automation Exercise",
        [
            (r#"a:has-text("Logged in as")"#, MockElement::new().text(" Logged in as Bill ")),
            (r#"a[href="/logout"]"#, MockElement::new().text("Logout")),
        ],
    )
}

fn accepting_store() -> MockDriver {
    logged_in_home(login_page(MockDriver::new())).on_click(LOGIN_BUTTON, Effect::new().navigate("/"))
}

fn rejecting_store() -> MockDriver {
    login_page(MockDriver::new()).on_click(
        LOGIN_BUTTON,
        Effect::new().set(
            LOGIN_ERROR,
            MockElement::new().text("Your email or password is incorrect!"),
        ),
    )
}

fn account_form(driver: MockDriver) -> MockDriver {
    let mut elements: Vec<(&str, MockElement)> = [
        "#id_gender1",
        "#id_gender2",
        "#password",
        "#days",
        "#months",
        "#years",
        "#newsletter",
        "#optin",
        "#first_name",
        "#last_name",
        "#company",
        "#address1",
        "#address2",
        "#country",
        "#state",
        "#city",
        "#zipcode",
        "#mobile_number",
        CREATE_ACCOUNT,
    ]
    .into_iter()
    .map(|s| (s, MockElement::new()))
    .collect();
    elements.push((".login-form h2 b", MockElement::new().text("ENTER ACCOUNT INFORMATION")));

    driver
        .page("/signup", "Automation Exercise - Signup", elements)
        .page(
            "/account_created",
            "Automation Exercise - Account Created",
            [(r#"h2[data-qa="account-created"]"#, MockElement::new().text("Account Created!"))],
        )
        .on_click(CREATE_ACCOUNT, Effect::new().navigate("/account_created"))
}

fn signup_store() -> MockDriver {
    account_form(login_page(MockDriver::new())).on_click(SIGNUP_BUTTON, Effect::new().navigate("/signup"))
}

fn taken_email_store() -> MockDriver {
    login_page(MockDriver::new()).on_click(
        SIGNUP_BUTTON,
        Effect::new().set(SIGNUP_ERROR, MockElement::new().text("Email Address already exist!")),
    )
}

/// Login, catalogue, cart, checkout, payment and confirmation
fn checkout_store() -> MockDriver {
    let names = ["Blue Top", "Men Tshirt", "Sleeveless Dress"];
    let cart_row = r#"#cart_info_table tbody tr[id^="product-"]"#;
    let payment: Vec<(String, MockElement)> = ["name_on_card", "card_number", "cvc", "expiry_month", "expiry_year"]
        .iter()
        .map(|f| (format!(r#"input[name="{}"]"#, f), MockElement::new()))
        .chain([(PAY.to_string(), MockElement::new())])
        .collect();

    logged_in_home(login_page(MockDriver::new()))
        .page(
            "/products",
            "Automation Exercise - All Products",
            [
                (".features_items".to_string(), MockElement::new()),
                (PRODUCTS.to_string(), MockElement::new().count(names.len())),
                (format!("{} .productinfo p", PRODUCTS), MockElement::new().texts(names)),
                (ADD_TO_CART.to_string(), MockElement::new().count(names.len())),
                (CONTINUE_SHOPPING.to_string(), MockElement::new()),
                (CART_LINK.to_string(), MockElement::new()),
            ],
        )
        .page(
            "/view_cart",
            "Automation Exercise - Checkout",
            [
                ("#cart_info_table", MockElement::new()),
                (cart_row, MockElement::new().count(2)),
                (PROCEED, MockElement::new()),
            ],
        )
        .page(
            "/checkout",
            "Automation Exercise - Checkout",
            [
                ("#address_delivery", MockElement::new().text("Mr. Bill Smith")),
                ("#address_invoice", MockElement::new().text("Mr. Bill Smith")),
                ("#cart_info_table", MockElement::new()),
                (r#"textarea[name="message"]"#, MockElement::new()),
                (PLACE_ORDER, MockElement::new()),
            ],
        )
        .page("/payment", "Automation Exercise - Payment", payment)
        .page(
            "/payment_done/0",
            "Automation Exercise - Order Placed",
            [(r#"h2.title[data-qa="order-placed"]"#, MockElement::new().text("Order Placed!"))],
        )
        .on_click(LOGIN_BUTTON, Effect::new().navigate("/"))
        .on_click(ADD_TO_CART, Effect::new().set(MODAL, MockElement::new().text("Added!")))
        .on_click(CONTINUE_SHOPPING, Effect::new().remove(MODAL))
        .on_click(CART_LINK, Effect::new().navigate("/view_cart"))
        .on_click(PROCEED, Effect::new().navigate("/checkout"))
        .on_click(PLACE_ORDER, Effect::new().navigate("/payment"))
        .on_click(PAY, Effect::new().navigate("/payment_done/0"))
}

type Params = HashMap<String, String>;

/// The account and product endpoints the UI scenarios lean on
#[derive(Clone, Default)]
struct Backend {
    accounts: Arc<Mutex<HashMap<String, String>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    products: Arc<Vec<&'static str>>,
}

fn reply(code: u16, message: &str) -> Json<Value> {
    Json(json!({ "responseCode": code, "message": message }))
}

async fn create_account(State(backend): State<Backend>, Form(params): Form<Params>) -> Json<Value> {
    let email = params.get("email").cloned().unwrap_or_default();
    let password = params.get("password").cloned().unwrap_or_default();
    let mut accounts = backend.accounts.lock();
    if accounts.contains_key(&email) {
        return reply(400, "Email already exists!");
    }
    accounts.insert(email, password);
    reply(201, "User created!")
}

async fn delete_account(State(backend): State<Backend>, Form(params): Form<Params>) -> Json<Value> {
    let email = params.get("email").cloned().unwrap_or_default();
    backend.deleted.lock().push(email.clone());
    match backend.accounts.lock().remove(&email) {
        Some(_) => reply(200, "Account deleted!"),
        None => reply(404, "Account not found!"),
    }
}

async fn products_list(State(backend): State<Backend>) -> Json<Value> {
    let products: Vec<Value> = backend
        .products
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "id": i + 1,
                "name": name,
                "price": "Rs. 500",
                "brand": "Polo",
                "category": { "usertype": { "usertype": "Women" }, "category": "Tops" }
            })
        })
        .collect();
    Json(json!({ "responseCode": 200, "products": products }))
}

async fn spawn_backend(products: &[&'static str]) -> (String, Backend) {
    let backend = Backend {
        products: Arc::new(products.to_vec()),
        ..Default::default()
    };
    let app = Router::new()
        .route("/api/createAccount", post(create_account))
        .route("/api/deleteAccount", delete(delete_account))
        .route("/api/productsList", get(products_list))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api", addr), backend)
}

async fn run_ui(store: fn() -> MockDriver, api_url: &str, tag: &str, grep: &str) -> (SuiteResult, Arc<MockFactory>) {
    let dir = tempfile::tempdir().unwrap();
    let env = Environments::builtin().unwrap().current(Some("qa")).unwrap();
    let mut settings = env.run_settings();
    settings.artifacts_dir = dir.path().to_path_buf();
    settings.run_mode_retries = 0;
    settings.command_timeout = Duration::from_millis(500);
    settings.page_load_timeout = Duration::from_secs(1);

    let drivers = Arc::new(MockFactory::new(store));
    let api = Arc::new(ApiFactory::new(api_url).unwrap());
    let runner = SuiteRunner::new(env, api)
        .with_settings(settings)
        .with_drivers(drivers.clone());

    let filter = RunFilter {
        kind: Some(ScenarioKind::Ui),
        tags: vec![tag.into()],
        grep: Some(grep.into()),
    };
    (runner.run(&catalogue(), &filter).await, drivers)
}

async fn run_login(store: fn() -> MockDriver, grep: &str) -> (SuiteResult, Arc<MockFactory>) {
    run_ui(store, "http://127.0.0.1:9/api", "login", grep).await
}

#[tokio::test]
async fn valid_login_shows_the_account_name() {
    let (suite, drivers) = run_login(accepting_store, "login successfully").await;

    assert_eq!(suite.total, 1);
    assert_eq!(suite.passed, 1, "{:?}", suite.results[0].error);
    let actions = drivers.launched()[0].actions();
    assert!(actions.contains(&format!(r#"fill:input[data-qa="login-email"]={}"#, DEFAULT_EMAIL)));
    assert!(actions.iter().any(|a| a.starts_with("click:button[data-qa=\"login-button\"]")));
}

#[tokio::test]
async fn rejected_logins_show_the_error() {
    let (suite, _) = run_login(rejecting_store, "should show error message with invalid").await;

    assert_eq!(suite.total, 3);
    for result in &suite.results {
        assert_eq!(result.status, ResultStatus::Passed, "{}: {:?}", result.test_id, result.error);
    }
}

#[tokio::test]
async fn empty_credentials_stay_on_the_login_page() {
    let (suite, drivers) = run_login(rejecting_store, "empty credentials").await;

    assert_eq!(suite.passed, 1, "{:?}", suite.results[0].error);
    let driver = &drivers.launched()[0];
    assert!(driver.is_closed());
    assert!(driver.actions().iter().any(|a| a == r#"fill:input[data-qa="login-password"]="#));
}

#[tokio::test]
async fn a_store_that_never_logs_in_fails_the_valid_login() {
    let (suite, _) = run_login(rejecting_store, "login successfully").await;

    let result = &suite.results[0];
    assert_eq!(result.status, ResultStatus::Failed);
    assert_eq!(result.screenshots.len(), 1);
}

#[tokio::test]
async fn new_account_is_created_and_cleaned_up() {
    let (api_url, backend) = spawn_backend(&[]).await;
    let (suite, drivers) = run_ui(signup_store, &api_url, "signup", "create a new account").await;

    assert_eq!(suite.total, 1);
    assert_eq!(suite.passed, 1, "{:?}", suite.results[0].error);

    let actions = drivers.launched()[0].actions();
    let email = actions
        .iter()
        .find_map(|a| a.strip_prefix(r#"fill:input[data-qa="signup-email"]="#))
        .unwrap()
        .to_string();
    assert!(actions.contains(&"check:#id_gender2".to_string()));
    assert!(actions.contains(&"check:#newsletter".to_string()));
    assert!(actions.contains(&format!("click:{}", CREATE_ACCOUNT)));
    assert_eq!(*backend.deleted.lock(), vec![email]);
}

#[tokio::test]
async fn signup_with_a_registered_email_shows_the_error() {
    let (api_url, backend) = spawn_backend(&[]).await;
    let (suite, drivers) = run_ui(taken_email_store, &api_url, "signup", "existing email").await;

    assert_eq!(suite.total, 1);
    assert_eq!(suite.passed, 1, "{:?}", suite.results[0].error);
    assert!(!drivers.launched()[0].actions().contains(&format!("click:{}", CREATE_ACCOUNT)));
    // The account registered up front was removed again
    assert_eq!(backend.deleted.lock().len(), 1);
    assert!(backend.accounts.lock().is_empty());
}

#[tokio::test]
async fn signup_fails_when_the_form_never_appears() {
    let (api_url, _) = spawn_backend(&[]).await;
    let (suite, _) = run_ui(taken_email_store, &api_url, "signup", "create a new account").await;

    assert_eq!(suite.results[0].status, ResultStatus::Failed);
}

#[tokio::test]
async fn checkout_places_an_order_for_the_listed_products() {
    let (api_url, _) = spawn_backend(&["Blue Top", "Men Tshirt", "Winter Top"]).await;
    let (suite, drivers) = run_ui(checkout_store, &api_url, "checkout", "complete checkout").await;

    assert_eq!(suite.total, 1);
    assert_eq!(suite.passed, 1, "{:?}", suite.results[0].error);

    let driver = &drivers.launched()[0];
    let actions = driver.actions();
    let added: Vec<&String> = actions
        .iter()
        .filter(|a| a.starts_with(&format!("click:{} >> nth=", PRODUCTS)))
        .collect();
    assert_eq!(added.len(), 2);
    assert!(added[0].contains("nth=0"));
    assert!(added[1].contains("nth=1"));
    assert!(actions.contains(&r#"fill:textarea[name="message"]=Please deliver during business hours."#.to_string()));
    assert!(actions.contains(&format!("click:{}", PAY)));
    assert!(driver.element(MODAL).is_none());
}

#[tokio::test]
async fn checkout_only_adds_products_the_api_lists() {
    let (api_url, _) = spawn_backend(&["Men Tshirt"]).await;
    let (suite, drivers) = run_ui(checkout_store, &api_url, "checkout", "complete checkout").await;

    assert_eq!(suite.passed, 1, "{:?}", suite.results[0].error);
    let actions = drivers.launched()[0].actions();
    let added: Vec<&String> = actions
        .iter()
        .filter(|a| a.starts_with(&format!("click:{} >> nth=", PRODUCTS)))
        .collect();
    assert_eq!(added.len(), 1);
    assert!(added[0].contains("nth=1"));
}

#[tokio::test]
async fn checkout_fails_when_no_checkout_product_is_listed() {
    let (api_url, _) = spawn_backend(&["Sleeveless Dress"]).await;
    let (suite, drivers) = run_ui(checkout_store, &api_url, "checkout", "complete checkout").await;

    let result = &suite.results[0];
    assert_eq!(result.status, ResultStatus::Failed);
    assert!(result
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("none of the checkout products are listed"));
    let actions = drivers.launched()[0].actions();
    assert!(!actions.iter().any(|a| a.ends_with("/products")));
}
