//! Account endpoints

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use shopcheck_common::{LoginCredentials, Title, User};

use super::ApiReply;
use crate::client::{ApiResponse, HttpClient, RequestConfig};
use crate::error::ApiResult;

/// Account record as `getUserDetailByEmail` returns it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "birth_date")]
    pub birth_day: String,
    #[serde(default)]
    pub birth_month: String,
    #[serde(default)]
    pub birth_year: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
}

impl From<ApiUser> for User {
    fn from(u: ApiUser) -> Self {
        let title = match u.title.as_str() {
            "Mr" => Some(Title::Mr),
            "Mrs" => Some(Title::Mrs),
            _ => None,
        };
        User {
            id: u.id,
            name: u.name,
            email: u.email,
            password: String::new(),
            title,
            birth_date: u.birth_day,
            birth_month: u.birth_month,
            birth_year: u.birth_year,
            firstname: u.first_name,
            lastname: u.last_name,
            company: u.company,
            address1: u.address1,
            address2: u.address2,
            country: u.country,
            zipcode: u.zipcode,
            state: u.state,
            city: u.city,
            mobile_number: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserService {
    client: Arc<HttpClient>,
}

impl UserService {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    pub async fn create_account(&self, user: &User) -> ApiResult<ApiResponse<ApiReply>> {
        let config = RequestConfig::new().form(user.form_fields());
        self.client.post("/createAccount", config).await
    }

    pub async fn verify_login(&self, credentials: &LoginCredentials) -> ApiResult<ApiResponse<ApiReply>> {
        let config = RequestConfig::new().form([
            ("email", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
        ]);
        self.client.post("/verifyLogin", config).await
    }

    pub async fn delete_account(&self, email: &str, password: &str) -> ApiResult<ApiResponse<ApiReply>> {
        let config = RequestConfig::new().form([("email", email), ("password", password)]);
        self.client.delete("/deleteAccount", config).await
    }

    /// Sends `email` followed by the user's non-empty fields
    pub async fn update_account(&self, email: &str, changes: &User) -> ApiResult<ApiResponse<ApiReply>> {
        let mut fields = vec![("email".to_string(), email.to_string())];
        fields.extend(changes.form_fields().into_iter().filter(|(k, v)| k != "email" && !v.is_empty()));
        let config = RequestConfig::new().multipart(fields);
        self.client.put("/updateAccount", config).await
    }

    pub async fn get_user_detail_by_email(&self, email: &str) -> ApiResult<ApiResponse<ApiReply>> {
        let config = RequestConfig::new().query("email", email);
        self.client.get("/getUserDetailByEmail", config).await
    }

    pub async fn get_all_users(&self) -> ApiResult<ApiResponse<ApiReply>> {
        self.client.get("/getUsersList", RequestConfig::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_user_conversion() {
        let raw = r#"{"id": 12, "name": "Bill", "email": "bill@x.io", "title": "Mr",
            "birth_day": "3", "birth_month": "July", "birth_year": "1990",
            "first_name": "Bill", "last_name": "Smith", "company": "",
            "address1": "1 Road", "address2": "", "country": "India",
            "state": "Goa", "city": "Panaji", "zipcode": "403001"}"#;
        let api_user: ApiUser = serde_json::from_str(raw).unwrap();
        let user = User::from(api_user);
        assert_eq!(user.id, Some(12));
        assert_eq!(user.title, Some(Title::Mr));
        assert_eq!(user.birth_date, "3");
        assert_eq!(user.lastname, "Smith");
    }

    #[test]
    fn test_blank_title() {
        let user = User::from(ApiUser {
            title: String::new(),
            ..Default::default()
        });
        assert!(user.title.is_none());
    }
}
