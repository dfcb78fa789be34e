use std::ops::Deref;

use shopcheck_common::logging::step;
use shopcheck_common::{Title, User, UserRegistration};

use crate::error::{E2eError, E2eResult};
use crate::pages::{BasePage, PageElement, Session};

pub const DEFAULT_COUNTRY: &str = "United States";

const TEXT_FIELDS: [&str; 10] = [
    "password",
    "first_name",
    "last_name",
    "company",
    "address1",
    "address2",
    "state",
    "city",
    "zipcode",
    "mobile_number",
];

/// Selected day, month and year as displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthDate {
    pub day: String,
    pub month: String,
    pub year: String,
}

/// The "Enter Account Information" form reached after the signup step
pub struct SignupPage<'a> {
    base: BasePage<'a>,
}

impl<'a> Deref for SignupPage<'a> {
    type Target = BasePage<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'a> SignupPage<'a> {
    pub fn new(session: Session<'a>) -> Self {
        let base = BasePage::new(session, "Signup page", "/signup", "Automation Exercise - Signup")
            .with("page_title", PageElement::text(".login-form h2 b", "Enter Account Information title").required())
            .with("title_mr", PageElement::radio("#id_gender1", "Title Mr radio button").required())
            .with("title_mrs", PageElement::radio("#id_gender2", "Title Mrs radio button").required())
            .with("password", PageElement::input("#password", "Password input").required())
            .with("birth_day", PageElement::dropdown("#days", "Birth day dropdown").required())
            .with("birth_month", PageElement::dropdown("#months", "Birth month dropdown").required())
            .with("birth_year", PageElement::dropdown("#years", "Birth year dropdown").required())
            .with("newsletter", PageElement::checkbox("#newsletter", "Newsletter checkbox"))
            .with("offers", PageElement::checkbox("#optin", "Special offers checkbox"))
            .with("first_name", PageElement::input("#first_name", "First name input").required())
            .with("last_name", PageElement::input("#last_name", "Last name input").required())
            .with("company", PageElement::input("#company", "Company input"))
            .with("address1", PageElement::input("#address1", "Address 1 input").required())
            .with("address2", PageElement::input("#address2", "Address 2 input"))
            .with("country", PageElement::dropdown("#country", "Country dropdown").required())
            .with("state", PageElement::input("#state", "State input").required())
            .with("city", PageElement::input("#city", "City input").required())
            .with("zipcode", PageElement::input("#zipcode", "Zipcode input").required())
            .with("mobile_number", PageElement::input("#mobile_number", "Mobile number input").required())
            .with("create_account", PageElement::button(r#"button[data-qa="create-account"]"#, "Create Account button").required())
            .with("account_created", PageElement::text(r#"h2[data-qa="account-created"]"#, "Account Created heading"))
            .with("email_exists", PageElement::text(r#".signup-form p[style*="color: red"]"#, "Email exists error"))
            .with("error_message", PageElement::text(".alert-danger", "Error message"));
        Self { base }
    }

    async fn type_if_set(&self, key: &str, value: &str) -> E2eResult<()> {
        if value.is_empty() {
            return Ok(());
        }
        self.type_text(key, value).await
    }

    async fn select_if_set(&self, key: &str, value: &str) -> E2eResult<()> {
        if value.is_empty() {
            return Ok(());
        }
        self.select(key, value).await
    }

    /// Fill the account form; empty optional values are left alone
    pub async fn fill_registration_form(&self, registration: &UserRegistration) -> E2eResult<()> {
        let user = &registration.user;
        step(&format!("Fill registration form for user: {}", user.name));
        self.wait_for_element("page_title", None).await?;

        match user.title {
            Some(Title::Mr) => self.check("title_mr").await?,
            Some(Title::Mrs) => self.check("title_mrs").await?,
            None => {}
        }
        self.type_text("password", &user.password).await?;
        self.select_if_set("birth_day", &user.birth_date).await?;
        self.select_if_set("birth_month", &user.birth_month).await?;
        self.select_if_set("birth_year", &user.birth_year).await?;
        if registration.newsletter {
            self.check("newsletter").await?;
        }
        if registration.offers {
            self.check("offers").await?;
        }
        self.type_if_set("first_name", &user.firstname).await?;
        self.type_if_set("last_name", &user.lastname).await?;
        self.type_if_set("company", &user.company).await?;
        self.type_if_set("address1", &user.address1).await?;
        self.type_if_set("address2", &user.address2).await?;
        self.select_if_set("country", &user.country).await?;
        self.type_if_set("state", &user.state).await?;
        self.type_if_set("city", &user.city).await?;
        self.type_if_set("zipcode", &user.zipcode).await?;
        self.type_if_set("mobile_number", &user.mobile_number).await
    }

    pub async fn create_account(&self) -> E2eResult<()> {
        step("Click Create Account button");
        self.click("create_account").await
    }

    pub async fn complete_registration(&self, registration: &UserRegistration) -> E2eResult<()> {
        step(&format!("Complete registration for user: {}", registration.user.name));
        self.fill_registration_form(registration).await?;
        self.create_account().await
    }

    /// Account form for `user` with newsletter and offers opted in, then submit
    pub async fn fill_account_information(&self, user: &User) -> E2eResult<()> {
        let registration = UserRegistration {
            user: user.clone(),
            confirm_password: None,
            newsletter: true,
            offers: true,
        };
        self.complete_registration(&registration).await
    }

    pub async fn verify_signup_page_loaded(&self) -> E2eResult<()> {
        step("Verify signup page is loaded");
        self.verify_page_loaded().await?;
        self.verify_text("page_title", "ENTER ACCOUNT INFORMATION").await
    }

    pub async fn verify_registration_error(&self, expected: Option<&str>) -> E2eResult<()> {
        step("Verify registration error message");
        self.wait_for_element("error_message", None).await?;
        match expected {
            Some(text) => self.verify_text("error_message", text).await,
            None => Ok(()),
        }
    }

    pub async fn verify_successful_registration(&self) -> E2eResult<()> {
        step("Verify successful registration redirect");
        self.wait_for_url("/account_created").await?;
        self.verify_text("account_created", "Account Created!").await
    }

    pub async fn assert_account_created(&self) -> E2eResult<()> {
        self.verify_text("account_created", "Account Created!").await?;
        self.wait_for_url("/account_created").await
    }

    pub async fn assert_email_already_exists(&self) -> E2eResult<()> {
        self.wait_for_element("email_exists", None).await?;
        self.verify_text("email_exists", "Email Address already exist!").await
    }

    pub async fn clear_all_fields(&self) -> E2eResult<()> {
        step("Clear all registration form fields");
        for key in TEXT_FIELDS {
            self.driver().clear(self.selector(key)?).await?;
        }
        Ok(())
    }

    /// Only the fields the form insists on; the country defaults to
    /// [`DEFAULT_COUNTRY`]
    pub async fn fill_minimal_required_fields(&self, user: &User) -> E2eResult<()> {
        step("Fill minimal required fields for registration");
        let required = [
            &user.password,
            &user.firstname,
            &user.lastname,
            &user.address1,
            &user.state,
            &user.city,
            &user.zipcode,
            &user.mobile_number,
        ];
        if required.iter().any(|v| v.is_empty()) {
            return Err(E2eError::StepFailed {
                step: "fill minimal registration".to_string(),
                reason: "missing required fields for minimal registration".to_string(),
            });
        }
        let country = if user.country.is_empty() {
            DEFAULT_COUNTRY
        } else {
            user.country.as_str()
        };
        self.type_text("password", &user.password).await?;
        self.type_text("first_name", &user.firstname).await?;
        self.type_text("last_name", &user.lastname).await?;
        self.type_text("address1", &user.address1).await?;
        self.select("country", country).await?;
        self.type_text("state", &user.state).await?;
        self.type_text("city", &user.city).await?;
        self.type_text("zipcode", &user.zipcode).await?;
        self.type_text("mobile_number", &user.mobile_number).await
    }

    pub async fn selected_title(&self) -> E2eResult<Option<Title>> {
        if self.is_checked("title_mr").await? {
            Ok(Some(Title::Mr))
        } else if self.is_checked("title_mrs").await? {
            Ok(Some(Title::Mrs))
        } else {
            Ok(None)
        }
    }

    pub async fn selected_birth_date(&self) -> E2eResult<BirthDate> {
        let selected = |key: &str| -> E2eResult<String> {
            Ok(format!("{} option:checked", self.selector(key)?))
        };
        Ok(BirthDate {
            day: self.text_of(&selected("birth_day")?).await?,
            month: self.text_of(&selected("birth_month")?).await?,
            year: self.text_of(&selected("birth_year")?).await?,
        })
    }

    pub async fn is_newsletter_checked(&self) -> E2eResult<bool> {
        self.is_checked("newsletter").await
    }

    pub async fn is_offers_checked(&self) -> E2eResult<bool> {
        self.is_checked("offers").await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::mock::{Effect, MockDriver, MockElement};

    const CREATE: &str = r#"button[data-qa="create-account"]"#;

    fn form() -> MockDriver {
        let fields = [
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
            CREATE,
        ];
        let mut elements: Vec<(&str, MockElement)> = fields.iter().map(|f| (*f, MockElement::new())).collect();
        elements.push((".login-form h2 b", MockElement::new().text("ENTER ACCOUNT INFORMATION")));

        MockDriver::new()
            .page("/signup", "Automation Exercise - Signup", elements)
            .page(
                "/account_created",
                "Automation Exercise - Account Created",
                [(r#"h2[data-qa="account-created"]"#, MockElement::new().text("Account Created!"))],
            )
            .on_click(CREATE, Effect::new().navigate("/account_created"))
    }

    fn session(driver: &MockDriver) -> Session<'_> {
        Session::new(driver, "https://shop.test").with_timeouts(Duration::from_millis(200), Duration::from_millis(200))
    }

    fn user() -> User {
        User {
            name: "Bill".into(),
            email: "bill@example.com".into(),
            password: "secret".into(),
            title: Some(Title::Mr),
            birth_date: "10".into(),
            birth_month: "May".into(),
            birth_year: "1990".into(),
            firstname: "Bill".into(),
            lastname: "Smith".into(),
            address1: "1 Main St".into(),
            country: "Canada".into(),
            state: "Ontario".into(),
            city: "Toronto".into(),
            zipcode: "M5V".into(),
            mobile_number: "5551234".into(),
            ..User::default()
        }
    }

    #[tokio::test]
    async fn test_account_information_is_filled_and_submitted() {
        let driver = form();
        let signup = SignupPage::new(session(&driver));
        signup.visit().await.unwrap();
        signup.verify_signup_page_loaded().await.unwrap();
        signup.fill_account_information(&user()).await.unwrap();
        signup.assert_account_created().await.unwrap();

        let actions = driver.actions();
        for expected in [
            "check:#id_gender1",
            "fill:#password=secret",
            "select:#days=10",
            "select:#months=May",
            "select:#years=1990",
            "check:#newsletter",
            "check:#optin",
            "fill:#first_name=Bill",
            "select:#country=Canada",
            "fill:#mobile_number=5551234",
        ] {
            assert!(actions.contains(&expected.to_string()), "missing {}", expected);
        }
        assert!(!actions.iter().any(|a| a.starts_with("fill:#company")));
        assert!(!actions.iter().any(|a| a.starts_with("fill:#address2")));
        assert_eq!(actions.last().unwrap(), &format!("click:{}", CREATE));
    }

    #[tokio::test]
    async fn test_selected_title_and_checkboxes() {
        let driver = form();
        let signup = SignupPage::new(session(&driver));
        signup.visit().await.unwrap();
        assert_eq!(signup.selected_title().await.unwrap(), None);

        let registration = UserRegistration {
            user: User { title: Some(Title::Mrs), ..user() },
            confirm_password: None,
            newsletter: false,
            offers: true,
        };
        signup.fill_registration_form(&registration).await.unwrap();
        assert_eq!(signup.selected_title().await.unwrap(), Some(Title::Mrs));
        assert!(!signup.is_newsletter_checked().await.unwrap());
        assert!(signup.is_offers_checked().await.unwrap());
    }

    #[tokio::test]
    async fn test_minimal_fields_default_the_country() {
        let driver = form();
        let signup = SignupPage::new(session(&driver));
        signup.visit().await.unwrap();
        signup
            .fill_minimal_required_fields(&User { country: String::new(), ..user() })
            .await
            .unwrap();
        assert!(driver.actions().contains(&format!("select:#country={}", DEFAULT_COUNTRY)));

        let err = signup
            .fill_minimal_required_fields(&User { zipcode: String::new(), ..user() })
            .await
            .unwrap_err();
        assert!(matches!(err, E2eError::StepFailed { .. }));
    }
}
