use shopcheck_common::factory::{fixtures, Factory, UserFactory};
use shopcheck_common::logging::step;

use crate::error::ensure;
use crate::pages::{LoginPage, SignupPage};
use crate::runner::{Scenario, ScenarioContext, ScenarioFuture};
use crate::scenarios::delete_afterwards;

const SUITE: &str = "Signup feature tests";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::ui(
            SUITE,
            "should successfully create a new account with valid information",
            &["ui", "signup", "smoke"],
            new_account,
        ),
        Scenario::ui(
            SUITE,
            "should show error message when trying to signup with existing email",
            &["ui", "signup", "negative"],
            existing_email,
        ),
    ]
}

fn new_account(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let user = fixtures::new_user();
        delete_afterwards(ctx, &user.email, &user.password);

        let session = ctx.session()?;
        let login = LoginPage::new(session);
        login.visit().await?;
        login.signup(&user.name, &user.email).await?;

        let signup = SignupPage::new(session);
        signup.fill_account_information(&user).await?;
        signup.assert_account_created().await
    })
}

fn existing_email(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let user = UserFactory::new().create_default();
        delete_afterwards(ctx, &user.email, &user.password);

        step(&format!("Register {} through the API", user.email));
        let created = ctx.user_service().create_account(&user).await?;
        ensure(
            created.data.is_ok(),
            format!(
                "account setup failed with {}: {}",
                created.data.response_code,
                created.data.message()
            ),
        )?;

        let session = ctx.session()?;
        let login = LoginPage::new(session);
        login.visit().await?;
        login.signup(&user.name, &user.email).await?;
        SignupPage::new(session).assert_email_already_exists().await
    })
}
