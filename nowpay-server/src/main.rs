//! NOWPayments IPN server
//!
//! Receives instant payment notifications, verifies their HMAC-SHA512
//! signature and hands verified ones to the notification callback.

mod api;
mod config;
mod notifications;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use notifications::LogNotification;
use nowpay_sdk::ipn::IpnReceiver;
use server::{build_router, run_server};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// NOWPayments IPN receiver
#[derive(Parser, Debug)]
#[command(name = "nowpay-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./nowpay-ipn.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:8000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Override the IPN secret from the configuration file
    #[arg(long, env = "NOWPAY_IPN_SECRET", hide_env_values = true)]
    ipn_secret: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting nowpay-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.listen, args.ipn_secret);
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let receiver = IpnReceiver::new(loaded_config.secret, LogNotification)
        .with_callback_timeout(loaded_config.callback_timeout);
    let state = AppState::new(receiver, loaded_config.reject_unverified);

    // Build the router
    let router = build_router(state, &loaded_config.path);

    // Run the server
    tracing::info!(
        "Accepting IPN deliveries on {}{}",
        loaded_config.listen,
        loaded_config.path
    );
    let result = run_server(router, loaded_config.listen).await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
