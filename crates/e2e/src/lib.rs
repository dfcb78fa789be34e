//! Shopcheck E2E
//!
//! Browser and API scenarios for the storefront, run under a Rust-controlled
//! runner:
//! - Page objects drive the browser through the [`Driver`] seam
//! - Playwright is controlled over a JSON-lines bridge process
//! - Scenarios get a fresh browser, deferred cleanup and retries
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SuiteRunner (Rust)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  for each Scenario × attempt                                │
//! │    ├── DriverFactory::launch() -> Box<dyn Driver>           │
//! │    ├── clear cookies / storage, set viewport                │
//! │    ├── body(&ScenarioContext)                               │
//! │    │     ├── pages::*Page  (UI)                             │
//! │    │     └── UserService / ProductService  (API)            │
//! │    ├── deferred cleanups (LIFO)                             │
//! │    └── failure screenshot, close driver                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Driver                                                     │
//! │    ├── PlaywrightDriver  (node bridge, one command at once) │
//! │    └── MockDriver        (scripted DOM for tests)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod driver;
pub mod error;
pub mod mock;
pub mod pages;
pub mod playwright;
pub mod preflight;
pub mod runner;
pub mod scenarios;
pub mod wait;

pub use driver::{BoundingBox, ClickOptions, Driver, DriverFactory, MouseButton};
pub use error::{E2eError, E2eResult};
pub use playwright::{PlaywrightConfig, PlaywrightDriver, PlaywrightFactory};
pub use runner::{
    RunFilter, ResultStatus, Scenario, ScenarioContext, ScenarioKind, SuiteResult, SuiteRunner, TestResult,
};
pub use scenarios::catalogue;
pub use wait::WaitCondition;
