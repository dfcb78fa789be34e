use std::ops::Deref;

use shopcheck_common::logging::step;
use shopcheck_common::LoginCredentials;

use crate::error::{E2eError, E2eResult};
use crate::pages::{BasePage, PageElement, Session};

pub const INVALID_CREDENTIALS: &str = "Your email or password is incorrect!";
pub const EMAIL_EXISTS: &str = "Email Address already exist!";

pub struct LoginPage<'a> {
    base: BasePage<'a>,
}

impl<'a> Deref for LoginPage<'a> {
    type Target = BasePage<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> LoginPage<'a> {
    pub fn new(session: Session<'a>) -> Self {
        let base = BasePage::new(session, "Login page", "/login", "Automation Exercise - Signup / Login")
            .with("login_title", PageElement::text(".login-form h2", "Login to your account title").required())
            .with("login_email", PageElement::input(r#"input[data-qa="login-email"]"#, "Login email input").required())
            .with("login_password", PageElement::input(r#"input[data-qa="login-password"]"#, "Login password input").required())
            .with("login_button", PageElement::button(r#"button[data-qa="login-button"]"#, "Login button").required())
            .with("login_error", PageElement::text(r#".login-form p[style*="color: red"]"#, "Login error message"))
            .with("signup_title", PageElement::text(".signup-form h2", "New User Signup title").required())
            .with("signup_name", PageElement::input(r#"input[data-qa="signup-name"]"#, "Signup name input").required())
            .with("signup_email", PageElement::input(r#"input[data-qa="signup-email"]"#, "Signup email input").required())
            .with("signup_button", PageElement::button(r#"button[data-qa="signup-button"]"#, "Signup button").required())
            .with("signup_error", PageElement::text(r#".signup-form p[style*="color: red"]"#, "Signup error message"))
            .with("logged_in_as", PageElement::link(r#"a:has-text("Logged in as")"#, "Logged in as indicator"))
            .with("logout_link", PageElement::link(r#"a[href="/logout"]"#, "Logout link"));
        Self { base }
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> E2eResult<()> {
        step(&format!("Login with email: {}", credentials.email));
        self.wait_for_element("login_email", None).await?;
        self.type_text("login_email", &credentials.email).await?;
        self.type_text("login_password", &credentials.password).await?;
        self.click("login_button").await
    }

    /// Fill the "New User Signup!" form and submit it
    pub async fn signup(&self, name: &str, email: &str) -> E2eResult<()> {
        step(&format!("Signup with name: {}, email: {}", name, email));
        if name.is_empty() || email.is_empty() {
            return Err(E2eError::StepFailed {
                step: "signup".to_string(),
                reason: "name and email are required for signup".to_string(),
            });
        }
        self.wait_for_element("signup_name", None).await?;
        self.type_text("signup_name", name).await?;
        self.type_text("signup_email", email).await?;
        self.click("signup_button").await
    }

    pub async fn verify_login_page_loaded(&self) -> E2eResult<()> {
        step("Verify login page is loaded");
        self.verify_page_loaded().await?;
        self.verify_text("login_title", "Login to your account").await?;
        self.verify_text("signup_title", "New User Signup!").await
    }

    /// Error shown under the login form, optionally with the given text
    pub async fn verify_login_error(&self, expected: Option<&str>) -> E2eResult<()> {
        step("Verify login error message");
        self.wait_for_element("login_error", None).await?;
        match expected {
            Some(text) => self.verify_text("login_error", text).await,
            None => Ok(()),
        }
    }

    pub async fn verify_signup_error(&self, expected: Option<&str>) -> E2eResult<()> {
        step("Verify signup error message");
        self.wait_for_element("signup_error", None).await?;
        match expected {
            Some(text) => self.verify_text("signup_error", text).await,
            None => Ok(()),
        }
    }

    pub async fn clear_login_form(&self) -> E2eResult<()> {
        step("Clear login form");
        self.driver().clear(self.selector("login_email")?).await?;
        self.driver().clear(self.selector("login_password")?).await
    }

    pub async fn clear_signup_form(&self) -> E2eResult<()> {
        step("Clear signup form");
        self.driver().clear(self.selector("signup_name")?).await?;
        self.driver().clear(self.selector("signup_email")?).await
    }

    pub async fn is_login_form_visible(&self) -> bool {
        self.is_visible("login_title").await
    }

    pub async fn is_signup_form_visible(&self) -> bool {
        self.is_visible("signup_title").await
    }

    pub async fn login_error_message(&self) -> E2eResult<String> {
        self.get_text("login_error").await
    }

    pub async fn signup_error_message(&self) -> E2eResult<String> {
        self.get_text("signup_error").await
    }

    /// Left the login page and the header offers a logout link
    pub async fn verify_successful_login(&self) -> E2eResult<()> {
        step("Verify successful login redirect");
        let url = self.current_url().await?;
        if url.contains("/login") {
            return Err(E2eError::AssertionFailed(format!(
                "still on the login page after logging in: {}",
                url
            )));
        }
        self.wait_for_element("logout_link", None).await
    }

    pub async fn verify_successful_signup_redirect(&self) -> E2eResult<()> {
        step("Verify successful signup redirect");
        self.wait_for_url("/signup").await
    }

    pub async fn try_login_with_empty_fields(&self) -> E2eResult<()> {
        step("Try login with empty fields");
        self.clear_login_form().await?;
        self.click("login_button").await
    }

    pub async fn try_signup_with_empty_fields(&self) -> E2eResult<()> {
        step("Try signup with empty fields");
        self.clear_signup_form().await?;
        self.click("signup_button").await
    }

    pub async fn login_and_expect_error(&self, credentials: &LoginCredentials, expected: &str) -> E2eResult<()> {
        step(&format!("Login with invalid credentials and expect error: {}", expected));
        self.login(credentials).await?;
        self.verify_login_error(Some(expected)).await
    }

    pub async fn signup_and_expect_error(&self, name: &str, email: &str, expected: &str) -> E2eResult<()> {
        step(&format!("Signup with invalid data and expect error: {}", expected));
        self.signup(name, email).await?;
        self.verify_signup_error(Some(expected)).await
    }

    /// Text of the "Logged in as <name>" header link
    pub async fn logged_in_as_text(&self) -> E2eResult<String> {
        self.get_text("logged_in_as").await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::mock::{Effect, MockDriver, MockElement};

    const LOGIN_BUTTON: &str = r#"button[data-qa="login-button"]"#;
    const SIGNUP_BUTTON: &str = r#"button[data-qa="signup-button"]"#;

    fn login_form(driver: MockDriver, title: &str) -> MockDriver {
        driver.page(
            "/login",
            title,
            [
                (".login-form h2", MockElement::new().text("Login to your account")),
                (r#"input[data-qa="login-email"]"#, MockElement::new()),
                (r#"input[data-qa="login-password"]"#, MockElement::new()),
                (LOGIN_BUTTON, MockElement::new()),
                (".signup-form h2", MockElement::new().text("New User Signup!")),
                (r#"input[data-qa="signup-name"]"#, MockElement::new()),
                (r#"input[data-qa="signup-email"]"#, MockElement::new()),
                (SIGNUP_BUTTON, MockElement::new()),
            ],
        )
    }

    fn session(driver: &MockDriver) -> Session<'_> {
        Session::new(driver, "https://shop.test").with_timeouts(Duration::from_millis(200), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_login_fills_and_submits() {
        let driver = login_form(MockDriver::new(), "Automation Exercise - Signup / Login")
            .page("/", "Automation Exercise", [(r#"a[href="/logout"]"#, MockElement::new())])
            .on_click(LOGIN_BUTTON, Effect::new().navigate("/"));
        let login = LoginPage::new(session(&driver));
        login.visit().await.unwrap();
        login.verify_login_page_loaded().await.unwrap();
        login
            .login(&LoginCredentials::new("bill@example.com", "secret"))
            .await
            .unwrap();
        login.verify_successful_login().await.unwrap();

        let actions = driver.actions();
        assert!(actions.contains(&r#"fill:input[data-qa="login-email"]=bill@example.com"#.to_string()));
        assert!(actions.contains(&r#"fill:input[data-qa="login-password"]=secret"#.to_string()));
        assert_eq!(actions.last().unwrap(), &format!("click:{}", LOGIN_BUTTON));
    }

    #[tokio::test]
    async fn test_rejected_login_shows_error() {
        let driver = login_form(MockDriver::new(), "Automation Exercise - Signup / Login").on_click(
            LOGIN_BUTTON,
            Effect::new().set(r#".login-form p[style*="color: red"]"#, MockElement::new().text(INVALID_CREDENTIALS)),
        );
        let login = LoginPage::new(session(&driver));
        login.visit().await.unwrap();
        login
            .login_and_expect_error(&LoginCredentials::new("nobody@example.com", "nope"), INVALID_CREDENTIALS)
            .await
            .unwrap();
        assert_eq!(login.login_error_message().await.unwrap(), INVALID_CREDENTIALS);
        assert!(matches!(
            login.verify_successful_login().await,
            Err(E2eError::AssertionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_signup_requires_name_and_email() {
        let driver = login_form(MockDriver::new(), "Automation Exercise - Signup / Login");
        let login = LoginPage::new(session(&driver));
        login.visit().await.unwrap();
        let err = login.signup("", "bill@example.com").await.unwrap_err();
        assert!(matches!(err, E2eError::StepFailed { .. }));
        assert_eq!(driver.actions(), vec!["goto:https://shop.test/login"]);
    }

    #[tokio::test]
    async fn test_maintenance_page_is_not_the_login_page() {
        let driver = login_form(MockDriver::new(), "Site Maintenance");
        let login = LoginPage::new(session(&driver));
        login.visit().await.unwrap();
        assert!(login.is_login_form_visible().await);
        assert!(login.verify_login_page_loaded().await.is_err());
    }
}
