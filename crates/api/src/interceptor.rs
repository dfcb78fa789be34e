//! Request/response interceptors
//!
//! Every request passes through the client's interceptor chain in
//! registration order. The client installs [`AuthInterceptor`] and
//! [`LoggingInterceptor`] itself; callers may append their own.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{debug, error, info};

use crate::client::{Body, PreparedRequest, RawResponse, TokenStore};
use crate::error::{ApiError, ApiResult};

#[async_trait]
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &str;

    /// Runs before the request is sent; may rewrite it
    async fn on_request(&self, _request: &mut PreparedRequest) -> ApiResult<()> {
        Ok(())
    }

    async fn on_response(&self, _request: &PreparedRequest, _response: &RawResponse) {}

    async fn on_error(&self, _request: &PreparedRequest, _error: &ApiError) {}
}

/// Adds `Authorization` from the token store when an access token is held
pub struct AuthInterceptor {
    tokens: TokenStore,
}

impl AuthInterceptor {
    pub fn new(tokens: TokenStore) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl Interceptor for AuthInterceptor {
    fn name(&self) -> &str {
        "auth"
    }

    async fn on_request(&self, request: &mut PreparedRequest) -> ApiResult<()> {
        let header = self.tokens.read().as_ref().map(|t| t.authorization());
        if let Some(header) = header {
            let value = HeaderValue::from_str(&header)
                .map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
            request.headers.insert(AUTHORIZATION, value);
        }
        Ok(())
    }
}

pub struct LoggingInterceptor;

#[async_trait]
impl Interceptor for LoggingInterceptor {
    fn name(&self) -> &str {
        "logging"
    }

    async fn on_request(&self, request: &mut PreparedRequest) -> ApiResult<()> {
        info!("API Request: {} {}", request.method, request.url);
        debug!("Request headers: {:?}", redacted(&request.headers));
        if request.body != Body::Empty {
            debug!("Request body: {:?}", request.body);
        }
        Ok(())
    }

    async fn on_response(&self, request: &PreparedRequest, response: &RawResponse) {
        info!("API Response: {} - {}", response.status, request.url);
        debug!(
            "Response body ({} ms): {}",
            response.elapsed.as_millis(),
            response.body
        );
    }

    async fn on_error(&self, request: &PreparedRequest, err: &ApiError) {
        error!(
            "API Error: {} {} ({}): {}",
            request.method,
            request.url,
            err.status(),
            err.message()
        );
    }
}

/// Header dump safe to log
pub fn redacted(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if *name == AUTHORIZATION {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name.to_string(), shown)
        })
        .collect()
}
