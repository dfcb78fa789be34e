//! Error types for the API client

use serde_json::Value;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Status reported for failures that never produced an HTTP response
pub const TRANSPORT_ERROR_STATUS: u16 = 500;

pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        code: Option<String>,
        details: Option<Value>,
    },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Failed to decode response (HTTP {status}): {message}")]
    Decode { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] shopcheck_common::Error),
}

impl ApiError {
    /// HTTP status carried by the error; transport failures report 500
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Status { status, .. } | ApiError::Decode { status, .. } => *status,
            _ => TRANSPORT_ERROR_STATUS,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }

    /// Gateway errors and transport failures are worth another attempt
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Builds the status error for a non-2xx reply from its raw body
    pub fn from_body(status: u16, reason: Option<&str>, body: &str) -> Self {
        let parsed = serde_json::from_str::<Value>(body).ok();
        let message = extract_message(parsed.as_ref(), body)
            .or_else(|| reason.map(str::to_string))
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
        let code = parsed
            .as_ref()
            .and_then(|v| v.get("code"))
            .map(|c| match c {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        let details = parsed.filter(|v| v.is_object() || v.is_array());

        ApiError::Status {
            status,
            message,
            code,
            details,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

/// Picks the most specific message out of an error body
fn extract_message(parsed: Option<&Value>, raw: &str) -> Option<String> {
    match parsed {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Object(map)) => {
            for key in ["message", "error"] {
                if let Some(Value::String(s)) = map.get(key) {
                    return Some(s.clone());
                }
            }
            match map.get("errors") {
                Some(Value::Array(items)) if !items.is_empty() => Some(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                _ => None,
            }
        }
        None if !raw.trim().is_empty() => Some(raw.trim().to_string()),
        _ => None,
    }
}
