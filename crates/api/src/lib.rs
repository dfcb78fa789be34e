//! Shopcheck API Client
//!
//! HTTP client with interceptors and token refresh, plus typed services
//! for the storefront's account and catalogue endpoints.

pub mod client;
pub mod error;
pub mod factory;
pub mod interceptor;
pub mod services;

pub use client::{ApiResponse, AuthTokens, Body, HttpClient, RequestConfig};
pub use error::{ApiError, ApiResult};
pub use factory::ApiFactory;
pub use interceptor::Interceptor;
pub use services::{ApiReply, ProductService, UserService};
