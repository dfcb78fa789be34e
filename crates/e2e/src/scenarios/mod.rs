//! The scenario catalogue
//!
//! Each module contributes a static list; [`catalogue`] strings them
//! together in the order the runner executes them.

mod api_login;
mod api_user;
mod ui_checkout;
mod ui_login;
mod ui_signup;

use shopcheck_api::{ApiReply, ApiResponse};

use crate::error::{ensure, ensure_eq, E2eResult};
use crate::runner::{Scenario, ScenarioContext};

/// Every scenario the suite knows about
pub fn catalogue() -> Vec<Scenario> {
    [
        ui_login::scenarios(),
        ui_signup::scenarios(),
        ui_checkout::scenarios(),
        api_login::scenarios(),
        api_user::scenarios(),
    ]
    .concat()
}

/// Delete the account once the scenario finishes, pass or fail
pub(crate) fn delete_afterwards(ctx: &ScenarioContext, email: &str, password: &str) {
    let users = ctx.user_service();
    let email = email.to_string();
    let password = password.to_string();
    ctx.defer(format!("delete account {}", email), async move {
        users.delete_account(&email, &password).await?;
        Ok(())
    });
}

/// HTTP 200 carrying the given `responseCode`, and a message containing
/// `message` when one is given
pub(crate) fn expect_reply(
    response: &ApiResponse<ApiReply>,
    code: u16,
    message: Option<&str>,
) -> E2eResult<()> {
    ensure_eq(response.status, 200, "HTTP status")?;
    ensure_eq(response.data.response_code, code, "responseCode")?;
    match message {
        Some(expected) => ensure(
            response.data.message().contains(expected),
            format!("message should contain {:?}, got {:?}", expected, response.data.message()),
        ),
        None => ensure(
            !response.data.message().is_empty(),
            "reply carries no message",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::runner::ScenarioKind;

    #[test]
    fn test_catalogue_ids_are_unique() {
        let scenarios = catalogue();
        let ids: HashSet<String> = scenarios.iter().map(Scenario::id).collect();
        assert_eq!(ids.len(), scenarios.len());
    }

    #[test]
    fn test_catalogue_shape() {
        let scenarios = catalogue();
        let ui = scenarios.iter().filter(|s| s.kind == ScenarioKind::Ui).count();
        let api = scenarios.iter().filter(|s| s.kind == ScenarioKind::Api).count();
        assert_eq!(ui, 8);
        assert_eq!(api, 13);
        assert!(scenarios.iter().all(|s| !s.tags.is_empty()));
    }

    fn reply(code: u16, message: &str) -> ApiResponse<ApiReply> {
        ApiResponse {
            data: ApiReply {
                response_code: code,
                message: Some(message.to_string()),
                ..ApiReply::default()
            },
            status: 200,
            success: true,
            message: "OK".to_string(),
        }
    }

    #[test]
    fn test_expect_reply() {
        let response = reply(404, "Account not found!");
        assert!(expect_reply(&response, 404, Some("Account not found")).is_ok());
        assert!(expect_reply(&response, 404, None).is_ok());
        assert!(expect_reply(&response, 200, None).is_err());
        assert!(expect_reply(&response, 404, Some("deleted")).is_err());
    }
}
