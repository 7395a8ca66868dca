//! Construction-time configuration for the SDK.
//!
//! Everything here is validated once and is immutable afterwards. The
//! config loading itself (files, CLI, environment) belongs to the host.

mod client;
mod secret;

pub use client::{ApiEnvironment, ClientConfig};
pub use secret::IpnSecret;

/// Errors raised while building configuration values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("IPN secret must not be empty")]
    EmptySecret,
    #[error("API key must not be empty")]
    EmptyApiKey,
}
