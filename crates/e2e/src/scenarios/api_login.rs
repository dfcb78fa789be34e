use shopcheck_common::factory::LoginCredentialsFactory;
use shopcheck_common::LoginCredentials;

use crate::error::E2eResult;
use crate::runner::{Scenario, ScenarioContext, ScenarioFuture};
use crate::scenarios::expect_reply;

const SUITE: &str = "Login API Tests";

const USER_EXISTS: &str = "User exists!";
const USER_NOT_FOUND: &str = "User not found!";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::api(
            SUITE,
            "should successfully login with valid credentials",
            &["api", "login", "smoke"],
            valid_credentials,
        ),
        Scenario::api(
            SUITE,
            "should return error for invalid credentials",
            &["api", "login", "negative"],
            invalid_credentials,
        ),
        Scenario::api(
            SUITE,
            "should return error for empty email",
            &["api", "login", "negative"],
            empty_email,
        ),
        Scenario::api(
            SUITE,
            "should return error for empty password",
            &["api", "login", "negative"],
            empty_password,
        ),
    ]
}

async fn expect_login(
    ctx: &ScenarioContext,
    credentials: LoginCredentials,
    code: u16,
    message: &str,
) -> E2eResult<()> {
    let response = ctx.user_service().verify_login(&credentials).await?;
    expect_reply(&response, code, Some(message))
}

fn valid_credentials(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    let credentials = ctx.environment().config.default_user.credentials();
    Box::pin(expect_login(ctx, credentials, 200, USER_EXISTS))
}

fn invalid_credentials(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    let credentials = LoginCredentialsFactory::new().invalid();
    Box::pin(expect_login(ctx, credentials, 404, USER_NOT_FOUND))
}

fn empty_email(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    let credentials = LoginCredentialsFactory::new().with_empty_email();
    Box::pin(expect_login(ctx, credentials, 404, USER_NOT_FOUND))
}

fn empty_password(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    let credentials = LoginCredentialsFactory::new().with_empty_password();
    Box::pin(expect_login(ctx, credentials, 404, USER_NOT_FOUND))
}
