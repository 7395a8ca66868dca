//! TOML file configuration structures.
//!
//! These structs directly map to the `nowpay-ipn.toml` file format.

use serde::Deserialize;
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ipn: IpnConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Route IPN deliveries are posted to.
    #[serde(default = "default_ipn_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            path: default_ipn_path(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_ipn_path() -> String {
    "/".to_owned()
}

/// IPN configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct IpnConfig {
    /// The IPN secret from the NOWPayments dashboard. May be left out when
    /// `NOWPAY_IPN_SECRET` is set.
    #[serde(default)]
    pub secret: String,
    /// Upper bound on how long a delivery waits for the callback.
    #[serde(default = "default_callback_timeout_secs")]
    pub callback_timeout_secs: u64,
    /// Answer unverified deliveries with 401 instead of acknowledging them.
    #[serde(default)]
    pub reject_unverified: bool,
}

impl Default for IpnConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            callback_timeout_secs: default_callback_timeout_secs(),
            reject_unverified: false,
        }
    }
}

fn default_callback_timeout_secs() -> u64 {
    30
}
