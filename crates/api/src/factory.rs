//! Shared client construction

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::debug;

use shopcheck_common::{EnvironmentConfig, DEFAULT_API_BASE_URL};

use crate::client::HttpClient;
use crate::error::ApiResult;
use crate::services::{ProductService, UserService};

/// Variable that overrides the API root for every environment
pub const API_BASE_URL_VAR: &str = "API_BASE_URL";

/// `API_BASE_URL`, then the environment's API root, then the public site
pub fn resolve_base_url<F>(lookup: F, environment: Option<&EnvironmentConfig>) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(API_BASE_URL_VAR)
        .filter(|v| !v.trim().is_empty())
        .or_else(|| {
            environment
                .map(|e| e.api_base_url.clone())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

/// Owns the client every service shares
pub struct ApiFactory {
    base_url: String,
    timeout: Option<Duration>,
    client: RwLock<Arc<HttpClient>>,
}

impl ApiFactory {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = base_url.into();
        let client = HttpClient::new(base_url.clone(), None)?;
        Ok(Self {
            base_url,
            timeout: None,
            client: RwLock::new(Arc::new(client)),
        })
    }

    /// Builds from the process environment and the active environment config
    pub fn from_environment(environment: Option<&EnvironmentConfig>) -> ApiResult<Self> {
        let base_url = resolve_base_url(|k| std::env::var(k).ok(), environment);
        debug!("API client targets {}", base_url);
        Self::new(base_url)
    }

    pub fn http_client(&self) -> Arc<HttpClient> {
        self.client.read().clone()
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(self.http_client())
    }

    pub fn product_service(&self) -> ProductService {
        ProductService::new(self.http_client())
    }

    pub fn set_base_url(&self, base_url: &str) -> ApiResult<()> {
        self.http_client().set_base_url(base_url)
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.http_client().set_timeout(timeout);
    }

    pub fn set_default_headers<K, V>(&self, headers: impl IntoIterator<Item = (K, V)>) -> ApiResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.http_client().set_default_headers(headers)
    }

    /// Replaces the shared client with a fresh one at the original base URL.
    /// Services created before the reset keep the old client.
    pub fn reset(&self) -> ApiResult<()> {
        let fresh = HttpClient::new(self.base_url.clone(), self.timeout)?;
        *self.client.write() = Arc::new(fresh);
        Ok(())
    }

    /// Timeout applied to clients created by later resets
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self.set_timeout(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn env(api: &str) -> EnvironmentConfig {
        EnvironmentConfig {
            api_base_url: api.to_string(),
            ..Default::default()
        }
    }

    #[test_case(Some("http://override/api"), Some("http://env/api"), "http://override/api" ; "variable wins")]
    #[test_case(None, Some("http://env/api"), "http://env/api" ; "environment config")]
    #[test_case(Some("  "), None, DEFAULT_API_BASE_URL ; "blank variable ignored")]
    #[test_case(None, None, DEFAULT_API_BASE_URL ; "default")]
    fn test_resolve_base_url(var: Option<&str>, configured: Option<&str>, expected: &str) {
        let config = configured.map(env);
        let url = resolve_base_url(|_| var.map(str::to_string), config.as_ref());
        assert_eq!(url, expected);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let factory = ApiFactory::new("http://127.0.0.1:9/api").unwrap();
        factory.set_base_url("http://127.0.0.1:10/api").unwrap();
        factory.set_timeout(Duration::from_secs(3));
        assert_eq!(factory.http_client().base_url(), "http://127.0.0.1:10/api");

        factory.reset().unwrap();
        let client = factory.http_client();
        assert_eq!(client.base_url(), "http://127.0.0.1:9/api");
        assert_eq!(client.timeout(), crate::client::DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_services_share_client() {
        let factory = ApiFactory::new("http://127.0.0.1:9/api").unwrap();
        let _users = factory.user_service();
        factory.set_timeout(Duration::from_secs(7));
        assert_eq!(factory.http_client().timeout(), Duration::from_secs(7));
    }
}
