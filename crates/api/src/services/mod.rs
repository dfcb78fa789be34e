//! Typed services over the storefront API

mod product;
mod user;

pub use product::{ApiBrand, ApiCategory, ApiProduct, ProductService, UserType};
pub use user::{ApiUser, UserService};

use serde::{Deserialize, Serialize};

/// Reply envelope shared by every endpoint. The HTTP status is 200 even
/// for failures; the outcome lives in `responseCode`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReply {
    pub response_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ApiUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<ApiUser>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ApiProduct>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brands: Option<Vec<ApiBrand>>,
}

impl ApiReply {
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.response_code, 200 | 201)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_decoding() {
        let reply: ApiReply =
            serde_json::from_str(r#"{"responseCode": 404, "message": "User not found!"}"#).unwrap();
        assert_eq!(reply.response_code, 404);
        assert_eq!(reply.message(), "User not found!");
        assert!(!reply.is_ok());
        assert!(reply.user.is_none());
    }
}
