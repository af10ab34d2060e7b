//! Serve the `/stock/*` API.
//!
//! # Usage
//!
//! ```sh
//! export STOCK_API_ADMIN_TOKEN="change-me"
//! export STOCK_API_CMS_FILE="./cms.json"
//! cargo run --bin stock_api --features cli
//! ```
//!
//! A `.env` file in the working directory is honoured. See
//! [`ServiceConfig`](investors_stock::config::ServiceConfig) for every key.

use investors_stock::config::ServiceConfig;
use investors_stock::server;

#[tokio::main]
async fn main() -> investors_stock::Result<()> {
    // a missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::load()?;
    tracing::info!(
        bind = %config.bind_addr,
        nse = %config.providers.nse_symbol,
        bse = %config.providers.bse_scrip_code,
        cms = ?config.cms_file,
        writes_enabled = config.admin_token.is_some(),
        "starting stock API"
    );

    server::run(&config, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
