use shopcheck_common::factory::{unique_api_user, ApiUserFactory};
use shopcheck_common::logging::step;
use shopcheck_common::{LoginCredentials, User};

use crate::error::{ensure, ensure_eq, E2eError, E2eResult};
use crate::runner::{Scenario, ScenarioContext, ScenarioFuture};
use crate::scenarios::{delete_afterwards, expect_reply};

const SUITE: &str = "User Account CRUD API Tests";

const NONEXISTENT_EMAIL: &str = "nonexistent@example.com";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::api(
            SUITE,
            "should create a new user account",
            &["api", "account", "smoke"],
            create_account,
        ),
        Scenario::api(
            SUITE,
            "should verify login with created account",
            &["api", "account", "login"],
            login_with_created_account,
        ),
        Scenario::api(
            SUITE,
            "should not create user with existing email",
            &["api", "account", "negative"],
            duplicate_email,
        ),
        Scenario::api(
            SUITE,
            "should delete a user account",
            &["api", "account"],
            delete_account,
        ),
        Scenario::api(
            SUITE,
            "should fail to delete non-existent account",
            &["api", "account", "negative"],
            delete_nonexistent,
        ),
        Scenario::api(
            SUITE,
            "should get user details by email",
            &["api", "account"],
            details_by_email,
        ),
        Scenario::api(
            SUITE,
            "should fail to get details for non-existent user",
            &["api", "account", "negative"],
            details_nonexistent,
        ),
        Scenario::api(
            SUITE,
            "should validate required fields for account creation",
            &["api", "account", "negative"],
            empty_email,
        ),
        Scenario::api(
            SUITE,
            "should handle invalid email format",
            &["api", "account", "negative"],
            invalid_email,
        ),
    ]
}

/// Create a fresh account and schedule its deletion
async fn registered_user(ctx: &ScenarioContext) -> E2eResult<User> {
    let user = unique_api_user();
    delete_afterwards(ctx, &user.email, &user.password);
    step(&format!("Create account {}", user.email));
    let response = ctx.user_service().create_account(&user).await?;
    expect_reply(&response, 201, Some("User created!"))?;
    Ok(user)
}

fn create_account(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        registered_user(ctx).await?;
        Ok(())
    })
}

fn login_with_created_account(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let user = registered_user(ctx).await?;
        let response = ctx
            .user_service()
            .verify_login(&LoginCredentials::new(&user.email, &user.password))
            .await?;
        expect_reply(&response, 200, Some("User exists!"))
    })
}

fn duplicate_email(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let user = registered_user(ctx).await?;
        let response = ctx.user_service().create_account(&user).await?;
        expect_reply(&response, 400, Some("Email already exists!"))
    })
}

fn delete_account(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let user = registered_user(ctx).await?;
        let response = ctx
            .user_service()
            .delete_account(&user.email, &user.password)
            .await?;
        expect_reply(&response, 200, Some("Account deleted"))
    })
}

fn delete_nonexistent(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let response = ctx
            .user_service()
            .delete_account(NONEXISTENT_EMAIL, "password123")
            .await?;
        expect_reply(&response, 404, Some("Account not found"))
    })
}

fn details_by_email(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let user = registered_user(ctx).await?;
        let response = ctx.user_service().get_user_detail_by_email(&user.email).await?;
        ensure_eq(response.data.response_code, 200, "responseCode")?;
        let found = response
            .data
            .user
            .as_ref()
            .ok_or_else(|| E2eError::AssertionFailed("reply carries no user".to_string()))?;
        ensure_eq(found.email.as_str(), user.email.as_str(), "user email")
    })
}

/// The storefront has answered both ways over time: a 200 with a
/// placeholder user, or a 404 with a message
fn details_nonexistent(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let response = ctx
            .user_service()
            .get_user_detail_by_email(NONEXISTENT_EMAIL)
            .await?;
        ensure_eq(response.status, 200, "HTTP status")?;
        match response.data.response_code {
            200 => ensure(response.data.user.is_some(), "200 reply carries no user"),
            404 => expect_reply(&response, 404, None),
            other => ensure(false, format!("unexpected responseCode {}", other)),
        }
    })
}

fn empty_email(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let user = ApiUserFactory::new().with_empty_email();
        let response = ctx.user_service().create_account(&user).await?;
        expect_reply(&response, 400, None)
    })
}

fn invalid_email(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let user = ApiUserFactory::new().with_invalid_email();
        delete_afterwards(ctx, &user.email, &user.password);
        let response = ctx.user_service().create_account(&user).await?;
        expect_reply(&response, 400, None)
    })
}
