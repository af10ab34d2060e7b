//! Canonical quote type returned by the aggregation service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::enums::Exchange;

/// A single point-in-time price/volume snapshot for one exchange.
///
/// `last` and `percent_change` are always present; a provider payload without
/// them is rejected by the normalizer instead of producing a partial quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub exchange: Exchange,
    pub symbol: String,
    pub last: Decimal,
    pub bid: Option<Decimal>,
    pub offer: Option<Decimal>,
    /// Absolute change against the previous close.
    pub change: Option<Decimal>,
    /// Signed percent change, e.g. `-1.2`.
    pub percent_change: Decimal,
    pub open: Option<Decimal>,
    pub previous_close: Option<Decimal>,
    pub day_high: Option<Decimal>,
    pub day_low: Option<Decimal>,
    pub week52_high: Option<Decimal>,
    pub week52_low: Option<Decimal>,
    pub volume: Option<Decimal>,
    pub as_of: DateTime<Utc>,
}

/// The subset of a [`Quote`] served by `/stock/quote-value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteValue {
    pub exchange: Exchange,
    pub last: Decimal,
    pub change: Option<Decimal>,
    pub percent_change: Decimal,
    pub as_of: DateTime<Utc>,
}

impl From<&Quote> for QuoteValue {
    fn from(q: &Quote) -> Self {
        Self {
            exchange: q.exchange,
            last: q.last,
            change: q.change,
            percent_change: q.percent_change,
            as_of: q.as_of,
        }
    }
}
