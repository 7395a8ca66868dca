//! REST client configuration.

use std::fmt;

use super::ConfigurationError;

/// Production API root.
pub const PRODUCTION_API_URL: &str = "https://api.nowpayments.io/v1/";

/// Sandbox API root.
pub const SANDBOX_API_URL: &str = "https://api-sandbox.nowpayments.io/v1/";

/// Which NOWPayments deployment a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApiEnvironment {
    #[default]
    Production,
    Sandbox,
}

impl ApiEnvironment {
    /// Root URL every endpoint is templated against.
    pub fn base_url(self) -> &'static str {
        match self {
            ApiEnvironment::Production => PRODUCTION_API_URL,
            ApiEnvironment::Sandbox => SANDBOX_API_URL,
        }
    }
}

/// Configuration for [`PaymentsClient`](crate::client::PaymentsClient).
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    /// Target the sandbox deployment instead of production.
    pub sandbox: bool,
    /// Log every request and response at `info` instead of `debug`.
    pub debug: bool,
}

impl ClientConfig {
    /// Create a production configuration with debug logging off.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigurationError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigurationError::EmptyApiKey);
        }
        Ok(Self {
            api_key,
            sandbox: false,
            debug: false,
        })
    }

    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn environment(&self) -> ApiEnvironment {
        if self.sandbox {
            ApiEnvironment::Sandbox
        } else {
            ApiEnvironment::Production
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("sandbox", &self.sandbox)
            .field("debug", &self.debug)
            .finish()
    }
}
