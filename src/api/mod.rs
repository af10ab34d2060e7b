//! Provider endpoint implementations.
//!
//! Each sub-module adds `async` methods to
//! [`ExchangeClient`](crate::client::ExchangeClient) via `impl` blocks. The
//! methods shape the provider-specific query and headers and return the raw
//! payload types from [`crate::types::wire`]; nothing here interprets values.
//!
//! ## Modules
//!
//! | Module | Endpoints | Description |
//! |---|---|---|
//! | [`nse`] | 3 | Equity quote, intraday graph, daily candles |
//! | [`bse`] | 2 | Scrip header quote, StockReachGraph series |
//! | [`report`] | 1 | Historical report (`admin-ajax`), both exchanges |

pub mod bse;
pub mod nse;
pub mod report;
