#![allow(missing_docs)]
//! Raw provider payloads, as deserialized straight off the wire.
//!
//! Every field is optional: presence of required values is checked by the
//! [normalizer](crate::normalize), which can then report a precise
//! `MalformedUpstreamData` instead of a generic serde error.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// A numeric field that providers send either as a JSON number or as a
/// formatted string (`"2,901.35"`, `"+1.20%"`, `"₹ 412.35"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(serde_json::Number),
    Text(String),
}

impl RawNumber {
    /// Textual form handed to the decimal parser.
    pub fn as_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Number(n) => std::borrow::Cow::Owned(n.to_string()),
            Self::Text(s) => std::borrow::Cow::Borrowed(s),
        }
    }
}

// ---------------------------------------------------------------------------
// NSE
// ---------------------------------------------------------------------------

/// `GET /api/quote-equity`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NseQuote {
    #[serde(default)]
    pub info: Option<NseInfo>,
    #[serde(default)]
    pub metadata: Option<NseMetadata>,
    #[serde(default)]
    pub price_info: Option<NsePriceInfo>,
    #[serde(default)]
    pub market_dept_order_book: Option<NseOrderBook>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NseInfo {
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NseMetadata {
    /// `"16-Oct-2026 15:30:00"`, IST.
    #[serde(default)]
    pub last_update_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NsePriceInfo {
    #[serde(default)]
    pub last_price: Option<RawNumber>,
    #[serde(default)]
    pub change: Option<RawNumber>,
    #[serde(default)]
    pub p_change: Option<RawNumber>,
    #[serde(default)]
    pub open: Option<RawNumber>,
    #[serde(default)]
    pub previous_close: Option<RawNumber>,
    #[serde(default)]
    pub intra_day_high_low: Option<NseHighLow>,
    #[serde(default)]
    pub week_high_low: Option<NseHighLow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NseHighLow {
    #[serde(default)]
    pub min: Option<RawNumber>,
    #[serde(default)]
    pub max: Option<RawNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NseOrderBook {
    #[serde(default)]
    pub total_traded_volume: Option<RawNumber>,
    #[serde(default)]
    pub bid: Vec<NseDepthLevel>,
    #[serde(default)]
    pub ask: Vec<NseDepthLevel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NseDepthLevel {
    #[serde(default)]
    pub price: Option<RawNumber>,
}

/// `GET /api/chart-databyindex`. The field name is the provider's spelling.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NseIntraday {
    #[serde(default, rename = "grapthData")]
    pub graph_data: Vec<Vec<RawNumber>>,
}

/// `GET /api/historical/cm/equity`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NseHistorical {
    #[serde(default)]
    pub data: Vec<NseCandle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NseCandle {
    #[serde(default, rename = "CH_TIMESTAMP")]
    pub timestamp: Option<String>,
    #[serde(default, rename = "CH_OPENING_PRICE")]
    pub open: Option<RawNumber>,
    #[serde(default, rename = "CH_TRADE_HIGH_PRICE")]
    pub high: Option<RawNumber>,
    #[serde(default, rename = "CH_TRADE_LOW_PRICE")]
    pub low: Option<RawNumber>,
    #[serde(default, rename = "CH_CLOSING_PRICE")]
    pub close: Option<RawNumber>,
    #[serde(default, rename = "CH_TOT_TRADED_QTY")]
    pub volume: Option<RawNumber>,
}

// ---------------------------------------------------------------------------
// BSE
// ---------------------------------------------------------------------------

/// `GET /BseIndiaAPI/api/getScripHeaderData/w`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BseQuote {
    #[serde(default, rename = "Header")]
    pub header: Option<BseHeader>,
    #[serde(default, rename = "CurrRate")]
    pub curr_rate: Option<BseCurrRate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BseHeader {
    #[serde(default, rename = "PrevClose")]
    pub prev_close: Option<RawNumber>,
    #[serde(default, rename = "Open")]
    pub open: Option<RawNumber>,
    #[serde(default, rename = "High")]
    pub high: Option<RawNumber>,
    #[serde(default, rename = "Low")]
    pub low: Option<RawNumber>,
    #[serde(default, rename = "LTP")]
    pub ltp: Option<RawNumber>,
    /// `"16 Oct 2026 | 16:00"`, IST.
    #[serde(default, rename = "Ason")]
    pub as_on: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BseCurrRate {
    #[serde(default, rename = "LTP")]
    pub ltp: Option<RawNumber>,
    #[serde(default, rename = "Chg")]
    pub change: Option<RawNumber>,
    #[serde(default, rename = "PcChg")]
    pub percent_change: Option<RawNumber>,
}

/// `GET /BseIndiaAPI/api/StockReachGraph/w`.
///
/// `Data` is itself a JSON-encoded array inside a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BseChart {
    #[serde(default, rename = "Data")]
    pub data: Option<String>,
}

/// One element of the decoded [`BseChart::data`] array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BseChartPoint {
    /// `"Fri Oct 16 2026 09:15:00"`, IST.
    #[serde(default)]
    pub dttm: Option<String>,
    #[serde(default)]
    pub vale1: Option<RawNumber>,
    #[serde(default)]
    pub vole: Option<RawNumber>,
}

// ---------------------------------------------------------------------------
// Adapter outputs
// ---------------------------------------------------------------------------

/// Raw quote payload from one provider variant.
#[derive(Debug, Clone)]
pub enum RawQuote {
    Nse(NseQuote),
    Bse(BseQuote),
}

/// Raw chart payload from one provider variant.
#[derive(Debug, Clone)]
pub enum RawChart {
    NseIntraday(NseIntraday),
    NseDaily(NseHistorical),
    Bse(BseChart),
}

/// HTML fragment returned by the historical report endpoint.
#[derive(Debug, Clone)]
pub struct RawReport(pub String);
