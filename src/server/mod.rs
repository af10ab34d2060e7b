//! Internal API surface.
//!
//! Thin axum layer over [`MarketDataService`]: request validation, response
//! envelopes and the bearer guard on `/stock/update-header`.

pub mod auth;
pub mod handlers;
pub mod response;

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::error::{MarketDataError, Result};
use crate::service::MarketDataService;

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    pub service: Arc<MarketDataService>,
    /// Accepted bearer token for CMS writes. `None` disables writes.
    pub admin_token: Option<String>,
}

impl AppState {
    /// Blank tokens count as no token.
    pub fn new(service: Arc<MarketDataService>, admin_token: Option<String>) -> Self {
        Self {
            service,
            admin_token: admin_token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Production state from configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let service = MarketDataService::from_config(config)?;
        Ok(Self::new(Arc::new(service), config.admin_token.clone()))
    }
}

/// Build the router with every `/stock/*` route plus `/health`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/stock", get(handlers::header_snapshot))
        .route("/stock/", get(handlers::header_snapshot))
        .route("/stock/external", post(handlers::external_quote))
        .route("/stock/quote-value", post(handlers::quote_value))
        .route("/stock/chart-data", post(handlers::chart_data))
        .route("/stock/intraday-chart", post(handlers::intraday_chart))
        .route("/stock/chart-by-api", post(handlers::chart_by_api))
        .route("/stock/historical/{type}", get(handlers::historical));

    let admin = Router::new()
        .route("/stock/update-header", post(handlers::update_header))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_admin,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .merge(public)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve `state` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| MarketDataError::Config(format!("listener has no address: {e}")))?;
    tracing::info!(%addr, "stock API listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| MarketDataError::Config(format!("server error: {e}")))?;

    tracing::info!("stock API stopped");
    Ok(())
}

/// Bind `config.bind_addr` and serve until `shutdown` resolves.
pub async fn run<F>(config: &ServiceConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = Arc::new(AppState::from_config(config)?);
    let listener = TcpListener::bind(&config.bind_addr).await.map_err(|e| {
        MarketDataError::Config(format!("failed to bind {}: {e}", config.bind_addr))
    })?;
    serve(listener, state, shutdown).await
}
