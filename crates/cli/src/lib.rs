//! Shopcheck CLI
//!
//! Command-line interface for running the storefront scenarios,
//! inspecting environments, generating test data and calling the
//! account API by hand.

pub mod commands;
pub mod output;
