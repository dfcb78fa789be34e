//! Catalogue API scenarios against a local stand-in for the account API

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{delete, get, post};
use axum::{Form, Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use shopcheck_api::ApiFactory;
use shopcheck_common::Environments;
use shopcheck_e2e::{catalogue, ResultStatus, RunFilter, ScenarioKind, SuiteRunner};

type Params = HashMap<String, String>;

/// email -> password
#[derive(Clone, Default)]
struct Accounts(Arc<Mutex<HashMap<String, String>>>);

fn reply(code: u16, message: &str) -> Json<Value> {
    Json(json!({ "responseCode": code, "message": message }))
}

fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str)
}

async fn create_account(State(accounts): State<Accounts>, Form(params): Form<Params>) -> Json<Value> {
    let email = param(&params, "email").unwrap_or_default();
    if email.is_empty() || !email.contains('@') {
        return reply(400, "Bad request, email parameter is missing in POST request.");
    }
    let mut accounts = accounts.0.lock();
    if accounts.contains_key(email) {
        return reply(400, "Email already exists!");
    }
    let password = param(&params, "password").unwrap_or_default();
    accounts.insert(email.to_string(), password.to_string());
    reply(201, "User created!")
}

async fn verify_login(State(accounts): State<Accounts>, Form(params): Form<Params>) -> Json<Value> {
    let (Some(email), Some(password)) = (param(&params, "email"), param(&params, "password")) else {
        return reply(400, "Bad request, email or password parameter is missing in POST request.");
    };
    let known = (email == "billsmith123@gmail.com" && password == "QATest1!")
        || accounts.0.lock().get(email).is_some_and(|p| p == password);
    if known {
        reply(200, "User exists!")
    } else {
        reply(404, "User not found!")
    }
}

async fn delete_account(State(accounts): State<Accounts>, Form(params): Form<Params>) -> Json<Value> {
    let email = param(&params, "email").unwrap_or_default();
    match accounts.0.lock().remove(email) {
        Some(_) => reply(200, "Account deleted!"),
        None => reply(404, "Account not found!"),
    }
}

async fn user_detail(State(accounts): State<Accounts>, Query(params): Query<Params>) -> Json<Value> {
    let email = param(&params, "email").unwrap_or_default();
    if accounts.0.lock().contains_key(email) {
        Json(json!({
            "responseCode": 200,
            "user": { "id": 7, "name": "Test User", "email": email, "first_name": "Test" }
        }))
    } else {
        reply(404, "Account not found with this email, try another email!")
    }
}

async fn spawn_store() -> (String, Accounts) {
    let accounts = Accounts::default();
    let app = Router::new()
        .route("/api/createAccount", post(create_account))
        .route("/api/verifyLogin", post(verify_login))
        .route("/api/deleteAccount", delete(delete_account))
        .route("/api/getUserDetailByEmail", get(user_detail))
        .with_state(accounts.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api", addr), accounts)
}

#[tokio::test]
async fn api_catalogue_passes_against_a_well_behaved_store() {
    let (api_url, accounts) = spawn_store().await;
    let dir = tempfile::tempdir().unwrap();

    let env = Environments::builtin().unwrap().current(Some("qa")).unwrap();
    let mut settings = env.run_settings();
    settings.artifacts_dir = dir.path().to_path_buf();
    settings.run_mode_retries = 0;
    let api = Arc::new(ApiFactory::new(api_url).unwrap());
    let runner = SuiteRunner::new(env, api).with_settings(settings);

    let filter = RunFilter {
        kind: Some(ScenarioKind::Api),
        ..Default::default()
    };
    let suite = runner.run(&catalogue(), &filter).await;

    assert_eq!(suite.total, 13);
    for result in &suite.results {
        assert_eq!(result.status, ResultStatus::Passed, "{}: {:?}", result.test_id, result.error);
        assert_eq!(result.attempts, 1);
    }
    // Every account a scenario created was deleted again
    assert!(accounts.0.lock().is_empty());
}

#[tokio::test]
async fn wrong_reply_fails_the_scenario() {
    let app = Router::new().route(
        "/api/verifyLogin",
        post(|| async { reply(200, "User exists!") }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let dir = tempfile::tempdir().unwrap();
    let env = Environments::builtin().unwrap().current(Some("qa")).unwrap();
    let mut settings = env.run_settings();
    settings.run_mode_retries = 0;
    settings.artifacts_dir = dir.path().to_path_buf();
    let api = Arc::new(ApiFactory::new(format!("http://{}/api", addr)).unwrap());
    let runner = SuiteRunner::new(env, api).with_settings(settings);

    let filter = RunFilter {
        grep: Some("Login API Tests > should return error for invalid credentials".into()),
        ..Default::default()
    };
    let suite = runner.run(&catalogue(), &filter).await;

    assert_eq!(suite.failed, 1);
    assert_eq!(
        suite.results[0].error.as_deref(),
        Some("Assertion failed: responseCode: expected 404, got 200")
    );
}
