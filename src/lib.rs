//! # investors-stock
//!
//! Market-data layer behind the Investors pages: live quotes, chart series and
//! historical reports for one listed equity on NSE and BSE, normalized into a
//! single shape and served under `/stock/*`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use investors_stock::config::ServiceConfig;
//! use investors_stock::service::MarketDataService;
//! use investors_stock::types::Exchange;
//!
//! #[tokio::main]
//! async fn main() -> investors_stock::Result<()> {
//!     let config = ServiceConfig::load()?;
//!     let service = MarketDataService::from_config(&config)?;
//!     let quote = service.get_quote(Exchange::NSE).await?;
//!     println!("{} {} ({}%)", quote.symbol, quote.last, quote.percent_change);
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! | Module | Role |
//! |---|---|
//! | [`client`], [`api`] | HTTP transport and provider endpoints |
//! | [`provider`] | One [`ExchangeAdapter`](provider::ExchangeAdapter) per exchange |
//! | [`normalize`] | Raw payloads to canonical [`types`] |
//! | [`service`] | Retry, cache, CMS reads and header snapshot writes |
//! | [`cms`] | CMS collaborator seam |
//! | [`server`] | axum router for `/stock/*` |

pub mod api;
pub mod client;
pub mod cms;
pub mod config;
pub mod constants;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod server;
pub mod service;
pub mod types;

/// Re-export the service type at crate root for convenience.
pub use service::MarketDataService;
/// Re-export the error type and Result alias.
pub use error::{MarketDataError, Result};
