//! Shopcheck Common Library
//!
//! Shared models, environment configuration, data factories and logging
//! for the Shopcheck test suite.

pub mod config;
pub mod error;
pub mod factory;
pub mod logging;
pub mod types;

pub use config::{ActiveEnvironment, Browser, EnvironmentConfig, Environments, RunSettings, Viewport};
pub use error::{Error, Result};
pub use types::*;

/// Shopcheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Storefront the suite targets unless configured otherwise
pub const DEFAULT_BASE_URL: &str = "https://automationexercise.com";

/// Account API root unless configured otherwise
pub const DEFAULT_API_BASE_URL: &str = "https://automationexercise.com/api";
