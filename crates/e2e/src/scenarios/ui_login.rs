use shopcheck_common::factory::UserPreset;
use shopcheck_common::logging::step;
use shopcheck_common::LoginCredentials;

use crate::error::{ensure, E2eResult};
use crate::pages::login::INVALID_CREDENTIALS;
use crate::pages::LoginPage;
use crate::runner::{Scenario, ScenarioContext, ScenarioFuture};

const SUITE: &str = "Login feature tests";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::ui(
            SUITE,
            "should login successfully with valid credentials",
            &["ui", "login", "smoke"],
            valid_credentials,
        ),
        Scenario::ui(
            SUITE,
            "should show error message with invalid email and invalid password",
            &["ui", "login", "negative"],
            invalid_email_and_password,
        ),
        Scenario::ui(
            SUITE,
            "should show error message with invalid email",
            &["ui", "login", "negative"],
            invalid_email,
        ),
        Scenario::ui(
            SUITE,
            "should show error message with invalid password",
            &["ui", "login", "negative"],
            invalid_password,
        ),
        Scenario::ui(
            SUITE,
            "should show error message with empty credentials",
            &["ui", "login", "negative"],
            empty_credentials,
        ),
    ]
}

fn preset(ctx: &ScenarioContext, preset: UserPreset) -> LoginCredentials {
    preset.credentials_for(&ctx.environment().config.default_user.credentials())
}

fn valid_credentials(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let user = preset(ctx, UserPreset::ValidUser);
        let login = LoginPage::new(ctx.session()?);
        login.visit().await?;
        login.login(&user).await?;

        let banner = login.logged_in_as_text().await?;
        if let Some(first_name) = &user.first_name {
            ensure(
                banner.contains(first_name.as_str()),
                format!("{:?} should name {}", banner, first_name),
            )?;
        }
        Ok(())
    })
}

async fn expect_rejected(ctx: &ScenarioContext, which: UserPreset) -> E2eResult<()> {
    let user = preset(ctx, which);
    let login = LoginPage::new(ctx.session()?);
    login.visit().await?;
    login.login(&user).await?;
    login.verify_login_error(Some(INVALID_CREDENTIALS)).await
}

fn invalid_email_and_password(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(expect_rejected(ctx, UserPreset::InvalidEmailAndPassword))
}

fn invalid_email(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(expect_rejected(ctx, UserPreset::InvalidEmail))
}

fn invalid_password(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(expect_rejected(ctx, UserPreset::InvalidPassword))
}

/// The browser's own required-field validation keeps the form from
/// submitting, so the page never changes
fn empty_credentials(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let user = preset(ctx, UserPreset::EmptyCredentials);
        let login = LoginPage::new(ctx.session()?);
        login.visit().await?;
        login.login(&user).await?;

        step("Verify the login form is still shown");
        let url = login.current_url().await?;
        ensure(url.contains("/login"), format!("expected to stay on /login, now at {}", url))?;
        ensure(
            login.is_visible("login_button").await,
            "login button should still be visible",
        )
    })
}
