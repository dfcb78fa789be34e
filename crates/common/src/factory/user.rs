//! User, credential, registration and profile factories

use chrono::{Datelike, Utc};

use super::faker::{unique_suffix, FactoryOptions, Faker};
use super::Factory;
use crate::error::{Error, Result};
use crate::types::{
    LoginCredentials, Theme, Title, User, UserPreferences, UserProfile, UserRegistration,
};

/// Account the demo storefront ships with
pub const VALID_EMAIL: &str = "billsmith123@gmail.com";
pub const VALID_PASSWORD: &str = "QATest1!";

pub const INVALID_EMAIL_FORMAT: &str = "invalid-email-format";
pub const WEAK_PASSWORD: &str = "123";

const PASSWORD_LENGTH: usize = 12;

/// Random, fully populated storefront accounts
#[derive(Debug, Clone, Default)]
pub struct UserFactory {
    faker: Faker,
}

impl UserFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FactoryOptions) -> Self {
        Self {
            faker: Faker::new(options),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_options(FactoryOptions::seeded(seed))
    }

    pub fn test_user(&mut self) -> User {
        let stamp = Utc::now().timestamp_millis();
        self.create(|u| {
            u.email = format!("test.user.{}@automation.test", stamp);
            u.password = "TestPassword123!".to_string();
            u.name = "Test User".to_string();
        })
    }

    pub fn admin_user(&mut self) -> User {
        let stamp = Utc::now().timestamp_millis();
        self.create(|u| {
            u.email = format!("admin.{}@automation.test", stamp);
            u.password = "AdminPassword123!".to_string();
            u.name = "Admin User".to_string();
        })
    }

    pub fn with_invalid_email(&mut self) -> User {
        self.create(|u| u.email = INVALID_EMAIL_FORMAT.to_string())
    }

    pub fn with_weak_password(&mut self) -> User {
        self.create(|u| u.password = WEAK_PASSWORD.to_string())
    }

    pub fn with_empty_fields(&mut self) -> User {
        self.create(|u| {
            u.name.clear();
            u.email.clear();
            u.password.clear();
        })
    }

    pub fn with_special_characters(&mut self) -> User {
        self.create(|u| {
            u.name = "Test User™ & Co.".to_string();
            u.firstname = "Test™".to_string();
            u.lastname = "User®".to_string();
            u.company = "Company & Co. Ltd.".to_string();
            u.address1 = "123 Main St. #456".to_string();
        })
    }

    pub fn bulk(&mut self, count: usize) -> Vec<User> {
        self.create_many(count, |_| {})
    }

    /// A random user's credentials, or random ones when no user is given
    pub fn login_credentials(&mut self, user: Option<&User>) -> LoginCredentials {
        match user {
            Some(u) => u.credentials(),
            None => {
                let first = self.faker.first_name();
                let last = self.faker.last_name();
                LoginCredentials::new(self.faker.email(&first, &last), self.faker.password(PASSWORD_LENGTH))
            }
        }
    }

    pub fn preset(&mut self, preset: UserPreset) -> LoginCredentials {
        match preset {
            UserPreset::Random => {
                let user = self.create_default();
                user.credentials().named(user.firstname, user.lastname)
            }
            other => other.credentials(),
        }
    }
}

impl Factory for UserFactory {
    type Output = User;

    fn create_default(&mut self) -> User {
        let f = &mut self.faker;
        let first = f.first_name();
        let last = f.last_name();
        let birth = f.birthdate(18, 80);

        User {
            id: Some(f.int(1000, 9999)),
            name: format!("{} {}", first, last),
            email: f.email(&first, &last),
            password: f.password(PASSWORD_LENGTH),
            title: Some(f.pick(&[Title::Mr, Title::Mrs])),
            birth_date: birth.day().to_string(),
            birth_month: birth.month().to_string(),
            birth_year: birth.year().to_string(),
            company: f.company(),
            address1: f.street_address(),
            address2: f.secondary_address(),
            country: "United States".to_string(),
            zipcode: f.zip_code(),
            state: f.state(),
            city: f.city(),
            mobile_number: f.numeric(10),
            firstname: first,
            lastname: last,
        }
    }
}

/// Canned login identities used by the login scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserPreset {
    ValidUser,
    InvalidEmailAndPassword,
    InvalidEmail,
    InvalidPassword,
    EmptyCredentials,
    Random,
}

impl UserPreset {
    pub const ALL: [UserPreset; 6] = [
        UserPreset::ValidUser,
        UserPreset::InvalidEmailAndPassword,
        UserPreset::InvalidEmail,
        UserPreset::InvalidPassword,
        UserPreset::EmptyCredentials,
        UserPreset::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserPreset::ValidUser => "valid-user",
            UserPreset::InvalidEmailAndPassword => "invalid-email-and-password",
            UserPreset::InvalidEmail => "invalid-email",
            UserPreset::InvalidPassword => "invalid-password",
            UserPreset::EmptyCredentials => "empty-credentials",
            UserPreset::Random => "random",
        }
    }

    /// Credentials with the storefront's stock account as the valid user
    pub fn credentials(&self) -> LoginCredentials {
        let valid = LoginCredentials::new(VALID_EMAIL, VALID_PASSWORD).named("Bill", "Smith");
        self.credentials_for(&valid)
    }

    /// Credentials relative to a configured valid account. `Random` has no
    /// fixed identity and falls back to the valid account here; use
    /// [`UserFactory::preset`] for a random one.
    pub fn credentials_for(&self, valid: &LoginCredentials) -> LoginCredentials {
        match self {
            UserPreset::ValidUser | UserPreset::Random => valid.clone(),
            UserPreset::InvalidEmailAndPassword => {
                LoginCredentials::new("fake@fake.com", "fakepassword").named("Fake", "User")
            }
            UserPreset::InvalidEmail => {
                LoginCredentials::new("invalid@invalid.com", &valid.password).named("Invalid", "Email")
            }
            UserPreset::InvalidPassword => {
                LoginCredentials::new(&valid.email, "wrongpassword").named("Invalid", "Password")
            }
            UserPreset::EmptyCredentials => LoginCredentials::new("", "").named("", ""),
        }
    }
}

impl std::str::FromStr for UserPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if normalized == "randomuser" {
            return Ok(UserPreset::Random);
        }
        UserPreset::ALL
            .into_iter()
            .find(|p| p.as_str().replace('-', "") == normalized)
            .ok_or_else(|| Error::UnknownPreset {
                kind: "user".to_string(),
                preset: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserRegistrationFactory {
    users: UserFactory,
}

impl UserRegistrationFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            users: UserFactory::seeded(seed),
        }
    }

    pub fn valid(&mut self) -> UserRegistration {
        self.create_default()
    }

    pub fn with_mismatched_passwords(&mut self) -> UserRegistration {
        self.create(|r| {
            r.user.password = "Password123!".to_string();
            r.confirm_password = Some("DifferentPassword123!".to_string());
        })
    }

    pub fn with_existing_email(&mut self, email: &str) -> UserRegistration {
        let email = email.to_string();
        self.create(move |r| r.user.email = email)
    }

    /// Only the fields the signup form requires
    pub fn minimal(&mut self) -> UserRegistration {
        let full = self.users.create_default();
        UserRegistration {
            confirm_password: Some(full.password.clone()),
            user: User {
                name: full.name,
                email: full.email,
                password: full.password,
                firstname: full.firstname,
                lastname: full.lastname,
                address1: full.address1,
                country: full.country,
                state: full.state,
                city: full.city,
                zipcode: full.zipcode,
                mobile_number: full.mobile_number,
                ..Default::default()
            },
            newsletter: false,
            offers: false,
        }
    }
}

impl Factory for UserRegistrationFactory {
    type Output = UserRegistration;

    fn create_default(&mut self) -> UserRegistration {
        let user = self.users.create_default();
        let newsletter = self.users.faker.boolean();
        let offers = self.users.faker.boolean();
        UserRegistration {
            confirm_password: Some(user.password.clone()),
            user,
            newsletter,
            offers,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginCredentialsFactory {
    users: UserFactory,
}

impl LoginCredentialsFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            users: UserFactory::seeded(seed),
        }
    }

    pub fn valid(&mut self) -> LoginCredentials {
        self.create_default()
    }

    pub fn invalid(&self) -> LoginCredentials {
        LoginCredentials::new("nonexistent@example.com", "wrongpassword123")
    }

    pub fn with_invalid_email(&mut self) -> LoginCredentials {
        self.create(|c| c.email = INVALID_EMAIL_FORMAT.to_string())
    }

    pub fn with_empty_password(&mut self) -> LoginCredentials {
        self.create(|c| c.password.clear())
    }

    pub fn with_empty_email(&mut self) -> LoginCredentials {
        self.create(|c| c.email.clear())
    }

    pub fn empty(&self) -> LoginCredentials {
        LoginCredentials::new("", "")
    }
}

impl Factory for LoginCredentialsFactory {
    type Output = LoginCredentials;

    fn create_default(&mut self) -> LoginCredentials {
        self.users.create_default().credentials()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserProfileFactory {
    users: UserFactory,
}

impl UserProfileFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            users: UserFactory::seeded(seed),
        }
    }

    pub fn active(&mut self) -> UserProfile {
        self.create(|p| {
            p.is_active = true;
            p.preferences = UserPreferences {
                newsletter: true,
                offers: true,
                theme: Some(Theme::Light),
                language: Some("en".to_string()),
            };
        })
    }

    pub fn inactive(&mut self) -> UserProfile {
        self.create(|p| p.is_active = false)
    }
}

impl Factory for UserProfileFactory {
    type Output = UserProfile;

    fn create_default(&mut self) -> UserProfile {
        let user = self.users.create_default();
        let f = &mut self.users.faker;
        UserProfile {
            user,
            preferences: UserPreferences {
                newsletter: f.boolean(),
                offers: f.boolean(),
                theme: Some(f.pick(&[Theme::Light, Theme::Dark])),
                language: Some(f.pick(&["en", "es", "fr", "de"]).to_string()),
            },
            created_at: Some(f.past(1)),
            updated_at: Some(f.recent(7)),
            is_active: f.boolean(),
        }
    }
}

/// Fixed-field accounts for the account API, unique per call
#[derive(Debug, Clone, Default)]
pub struct ApiUserFactory {
    faker: Faker,
}

impl ApiUserFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_empty_email(&mut self) -> User {
        self.create(|u| u.email.clear())
    }

    pub fn with_invalid_email(&mut self) -> User {
        self.create(|u| u.email = INVALID_EMAIL_FORMAT.to_string())
    }
}

/// The canned API account with a fresh name and email
pub fn unique_api_user() -> User {
    ApiUserFactory::new().create_default()
}

impl Factory for ApiUserFactory {
    type Output = User;

    fn create_default(&mut self) -> User {
        let unique = unique_suffix(&mut self.faker);
        User {
            id: None,
            name: format!("Test User {}", unique),
            email: format!("testuser{}@example.com", unique),
            password: "TestPassword123!".to_string(),
            title: Some(Title::Mr),
            birth_date: "15".to_string(),
            birth_month: "6".to_string(),
            birth_year: "1990".to_string(),
            firstname: "Test".to_string(),
            lastname: "User".to_string(),
            company: "Test Company".to_string(),
            address1: "123 Test Street".to_string(),
            address2: "Apt 1".to_string(),
            country: "United States".to_string(),
            zipcode: "12345".to_string(),
            state: "California".to_string(),
            city: "Los Angeles".to_string(),
            mobile_number: "1234567890".to_string(),
        }
    }
}
