//! Canonical and wire types for the market-data layer.
//!
//! ## Organization
//!
//! - [`enums`]: Supported exchanges and chart range tokens
//! - [`quote`]: Canonical quote and the quote-value subset
//! - [`chart`]: Canonical chart series and points
//! - [`historical`]: Historical report rows and date windows
//! - [`cms`]: CMS display settings and the header snapshot row
//! - [`wire`]: Raw provider payloads (NSE, BSE, report)
//!
//! All enums are re-exported at the module root via `pub use enums::*`.

pub mod chart;
pub mod cms;
pub mod enums;
pub mod historical;
pub mod quote;
pub mod wire;

pub use chart::{ChartPoint, ChartSeries};
pub use cms::{HeaderSnapshot, InvestorsSettings};
pub use enums::*;
pub use historical::{DateWindow, HistoricalRow};
pub use quote::{Quote, QuoteValue};
