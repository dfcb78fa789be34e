//! HTTP client for the storefront API

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::interceptor::{AuthInterceptor, Interceptor, LoggingInterceptor};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoint that trades a refresh token for a new access token
pub const REFRESH_PATH: &str = "/auth/refresh";

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Request payload
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
    /// `multipart/form-data` with text parts
    Multipart(Vec<(String, String)>),
}

fn pairs<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Vec<(String, String)>
where
    K: Into<String>,
    V: Into<String>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub timeout: Option<Duration>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Body,
    /// Extra attempts on transport errors and 502/503/504
    pub retries: u32,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, value: Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    pub fn form<K: Into<String>, V: Into<String>>(
        mut self,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.body = Body::Form(pairs(fields));
        self
    }

    pub fn multipart<K: Into<String>, V: Into<String>>(
        mut self,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.body = Body::Multipart(pairs(fields));
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl AuthTokens {
    pub fn authorization(&self) -> String {
        format!(
            "{} {}",
            self.token_type.as_deref().unwrap_or("Bearer"),
            self.access_token
        )
    }
}

pub type TokenStore = Arc<RwLock<Option<AuthTokens>>>;

/// A request with client defaults merged in, as interceptors see it
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Body,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub body: String,
    pub elapsed: Duration,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn decode<T: DeserializeOwned>(self) -> ApiResult<ApiResponse<T>> {
        let data = decode_body(self.status, &self.body)?;
        Ok(ApiResponse {
            data,
            status: self.status,
            success: self.is_success(),
            message: self.reason.unwrap_or_default(),
        })
    }
}

/// Decoded reply
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: u16,
    pub success: bool,
    pub message: String,
}

/// Bodies are JSON regardless of the declared content type. Text that is
/// not JSON is offered to `T` as a JSON string.
fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<T> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return serde_json::from_value(Value::Null).map_err(|e| ApiError::Decode {
            status,
            message: e.to_string(),
        });
    }
    match serde_json::from_str::<T>(trimmed) {
        Ok(data) => Ok(data),
        Err(e) => serde_json::from_value(Value::String(body.to_string())).map_err(|_| {
            ApiError::Decode {
                status,
                message: e.to_string(),
            }
        }),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshReply {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct Settings {
    base_url: String,
    timeout: Duration,
    default_headers: HeaderMap,
}

fn header_pair(name: &str, value: &str) -> ApiResult<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| ApiError::InvalidHeader(format!("{}: {}", name, e)))?;
    let value =
        HeaderValue::from_str(value).map_err(|e| ApiError::InvalidHeader(format!("{}: {}", name, e)))?;
    Ok((name, value))
}

/// Shared client for the account API
pub struct HttpClient {
    inner: reqwest::Client,
    settings: RwLock<Settings>,
    tokens: TokenStore,
    interceptors: RwLock<Vec<Arc<dyn Interceptor>>>,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> ApiResult<Self> {
        let base_url = base_url.into();
        Url::parse(&base_url)?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let tokens = TokenStore::default();
        let interceptors: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(AuthInterceptor::new(tokens.clone())),
            Arc::new(LoggingInterceptor),
        ];

        Ok(Self {
            inner: reqwest::Client::builder().build()?,
            settings: RwLock::new(Settings {
                base_url,
                timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
                default_headers,
            }),
            tokens,
            interceptors: RwLock::new(interceptors),
        })
    }

    pub fn base_url(&self) -> String {
        self.settings.read().base_url.clone()
    }

    pub fn set_base_url(&self, base_url: impl Into<String>) -> ApiResult<()> {
        let base_url = base_url.into();
        Url::parse(&base_url)?;
        self.settings.write().base_url = base_url;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        self.settings.read().timeout
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.settings.write().timeout = timeout;
    }

    /// Merges headers into the defaults sent with every request
    pub fn set_default_headers<K, V>(&self, headers: impl IntoIterator<Item = (K, V)>) -> ApiResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let parsed = headers
            .into_iter()
            .map(|(k, v)| header_pair(k.as_ref(), v.as_ref()))
            .collect::<ApiResult<Vec<_>>>()?;
        let mut settings = self.settings.write();
        for (name, value) in parsed {
            settings.default_headers.insert(name, value);
        }
        Ok(())
    }

    pub fn set_auth_tokens(&self, tokens: AuthTokens) {
        *self.tokens.write() = Some(tokens);
    }

    pub fn clear_tokens(&self) {
        *self.tokens.write() = None;
    }

    pub fn auth_tokens(&self) -> Option<AuthTokens> {
        self.tokens.read().clone()
    }

    pub fn add_interceptor(&self, interceptor: Arc<dyn Interceptor>) {
        debug!("Registered interceptor {}", interceptor.name());
        self.interceptors.write().push(interceptor);
    }

    pub fn interceptor_names(&self) -> Vec<String> {
        self.interceptors
            .read()
            .iter()
            .map(|i| i.name().to_string())
            .collect()
    }

    // Verbs

    pub async fn get<T: DeserializeOwned>(&self, path: &str, config: RequestConfig) -> ApiResult<ApiResponse<T>> {
        self.request(Method::GET, path, config).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, config: RequestConfig) -> ApiResult<ApiResponse<T>> {
        self.request(Method::POST, path, config).await
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, config: RequestConfig) -> ApiResult<ApiResponse<T>> {
        self.request(Method::PUT, path, config).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, config: RequestConfig) -> ApiResult<ApiResponse<T>> {
        self.request(Method::PATCH, path, config).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, config: RequestConfig) -> ApiResult<ApiResponse<T>> {
        self.request(Method::DELETE, path, config).await
    }

    pub async fn head(&self, path: &str, config: RequestConfig) -> ApiResult<ApiResponse<Value>> {
        self.request(Method::HEAD, path, config).await
    }

    pub async fn options(&self, path: &str, config: RequestConfig) -> ApiResult<ApiResponse<Value>> {
        self.request(Method::OPTIONS, path, config).await
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> ApiResult<ApiResponse<T>> {
        let prepared = self.prepare(method, path, &config)?;
        self.execute(prepared, config.retries).await?.decode()
    }

    fn resolve_url(&self, path: &str, query: &[(String, String)]) -> ApiResult<Url> {
        let mut url = if path.starts_with("http://") || path.starts_with("https://") {
            Url::parse(path)?
        } else {
            let base = self.base_url();
            Url::parse(&format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ))?
        };
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn prepare(&self, method: Method, path: &str, config: &RequestConfig) -> ApiResult<PreparedRequest> {
        let url = self.resolve_url(path, &config.query)?;
        let (mut headers, default_timeout) = {
            let settings = self.settings.read();
            (settings.default_headers.clone(), settings.timeout)
        };
        for (name, value) in &config.headers {
            let (name, value) = header_pair(name, value)?;
            headers.insert(name, value);
        }
        // reqwest sets these itself; multipart needs the boundary
        if matches!(config.body, Body::Form(_) | Body::Multipart(_)) {
            headers.remove(CONTENT_TYPE);
        }

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body: config.body.clone(),
            timeout: config.timeout.unwrap_or(default_timeout),
        })
    }

    async fn execute(&self, request: PreparedRequest, retries: u32) -> ApiResult<RawResponse> {
        let mut attempt = 0;
        loop {
            match self.dispatch(request.clone()).await {
                Err(e) if e.is_unauthorized() && request.url.path().ends_with(REFRESH_PATH) => {
                    return Err(e);
                }
                Err(e) if e.is_unauthorized() => return self.refresh_and_replay(request, e).await,
                Err(e) if e.is_transient() && attempt < retries => {
                    attempt += 1;
                    warn!(
                        "Retrying {} {} (attempt {}/{}): {}",
                        request.method, request.url, attempt, retries, e
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                other => return other,
            }
        }
    }

    async fn refresh_and_replay(&self, request: PreparedRequest, original: ApiError) -> ApiResult<RawResponse> {
        let refresh_token = self
            .tokens
            .read()
            .as_ref()
            .and_then(|t| t.refresh_token.clone());
        let Some(refresh_token) = refresh_token else {
            return Err(original);
        };

        match self.refresh(&refresh_token).await {
            Ok(()) => {
                debug!("Access token refreshed, replaying {} {}", request.method, request.url);
                self.dispatch(request).await
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.clear_tokens();
                Err(original)
            }
        }
    }

    /// Any 2xx reply counts as a refresh; fields it leaves out keep their
    /// current values
    async fn refresh(&self, refresh_token: &str) -> ApiResult<()> {
        let config = RequestConfig::new().json(json!({ "refreshToken": refresh_token }));
        let request = self.prepare(Method::POST, REFRESH_PATH, &config)?;
        let raw = self.dispatch(request).await?;
        let reply: RefreshReply = decode_body(raw.status, &raw.body).unwrap_or_else(|e| {
            debug!("Refresh reply carried no tokens: {}", e);
            RefreshReply::default()
        });

        let mut guard = self.tokens.write();
        let tokens = guard.get_or_insert_with(AuthTokens::default);
        if let Some(access_token) = reply.access_token {
            tokens.access_token = access_token;
        }
        if reply.refresh_token.is_some() {
            tokens.refresh_token = reply.refresh_token;
        }
        if reply.token_type.is_some() {
            tokens.token_type = reply.token_type;
        }
        if reply.expires_in.is_some() {
            tokens.expires_in = reply.expires_in;
        }
        Ok(())
    }

    /// One pass through the interceptor chain and the network
    async fn dispatch(&self, mut request: PreparedRequest) -> ApiResult<RawResponse> {
        let chain: Vec<Arc<dyn Interceptor>> = self.interceptors.read().clone();
        for interceptor in &chain {
            interceptor.on_request(&mut request).await?;
        }

        let result = match self.send(&request).await {
            Ok(raw) if raw.is_success() => Ok(raw),
            Ok(raw) => Err(ApiError::from_body(raw.status, raw.reason.as_deref(), &raw.body)),
            Err(e) => Err(e),
        };

        match &result {
            Ok(raw) => {
                for interceptor in &chain {
                    interceptor.on_response(&request, raw).await;
                }
            }
            Err(e) => {
                for interceptor in &chain {
                    interceptor.on_error(&request, e).await;
                }
            }
        }
        result
    }

    async fn send(&self, request: &PreparedRequest) -> ApiResult<RawResponse> {
        let started = Instant::now();
        let builder = self
            .inner
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .timeout(request.timeout);
        let builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Form(fields) => builder.form(fields),
            Body::Multipart(fields) => {
                let form = fields
                    .iter()
                    .fold(Form::new(), |form, (k, v)| form.text(k.clone(), v.clone()));
                builder.multipart(form)
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
            elapsed: started.elapsed(),
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url())
            .field("timeout", &self.timeout())
            .field("interceptors", &self.interceptor_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpClient {
        HttpClient::new("https://shop.test/api/", None).unwrap()
    }

    #[test]
    fn test_defaults() {
        let c = client();
        assert_eq!(c.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(c.interceptor_names(), vec!["auth", "logging"]);
        assert!(c.auth_tokens().is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpClient::new("not a url", None),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_url_joining_and_query() {
        let c = client();
        let url = c
            .resolve_url("/getUserDetailByEmail", &[("email".into(), "a+b@x.io".into())])
            .unwrap();
        assert_eq!(url.path(), "/api/getUserDetailByEmail");
        assert_eq!(url.query(), Some("email=a%2Bb%40x.io"));
    }

    #[test]
    fn test_form_body_drops_json_content_type() {
        let c = client();
        let config = RequestConfig::new().form([("email", "a@b.c")]);
        let prepared = c.prepare(Method::POST, "verifyLogin", &config).unwrap();
        assert!(prepared.headers.get(CONTENT_TYPE).is_none());
        assert_eq!(prepared.headers[ACCEPT], "application/json");

        let prepared = c.prepare(Method::GET, "productsList", &RequestConfig::new()).unwrap();
        assert_eq!(prepared.headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_request_overrides() {
        let c = client();
        c.set_default_headers([("X-Suite", "shopcheck")]).unwrap();
        c.set_timeout(Duration::from_secs(5));
        let config = RequestConfig::new()
            .header("X-Suite", "override")
            .timeout(Duration::from_millis(750));
        let prepared = c.prepare(Method::GET, "brandsList", &config).unwrap();
        assert_eq!(prepared.headers["x-suite"], "override");
        assert_eq!(prepared.timeout, Duration::from_millis(750));

        let prepared = c.prepare(Method::GET, "brandsList", &RequestConfig::new()).unwrap();
        assert_eq!(prepared.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_decode_body_fallbacks() {
        let v: Value = decode_body(200, "").unwrap();
        assert_eq!(v, Value::Null);
        let s: String = decode_body(200, "<html>ok</html>").unwrap();
        assert_eq!(s, "<html>ok</html>");
        let v: Value = decode_body(200, r#"{"responseCode":200}"#).unwrap();
        assert_eq!(v["responseCode"], 200);
        assert!(matches!(
            decode_body::<u32>(200, "nope"),
            Err(ApiError::Decode { status: 200, .. })
        ));
    }

    #[test]
    fn test_token_store() {
        let c = client();
        c.set_auth_tokens(AuthTokens {
            access_token: "t".into(),
            ..Default::default()
        });
        assert_eq!(c.auth_tokens().unwrap().authorization(), "Bearer t");
        c.clear_tokens();
        assert!(c.auth_tokens().is_none());
    }
}
