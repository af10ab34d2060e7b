//! CMS collaborator records read or written by the market-data layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::types::enums::{ChartRange, Exchange};
use crate::types::quote::Quote;

/// Display configuration of the Investors stock widgets.
///
/// Only the fields the market-data layer consumes are modelled; labels and
/// other display copy stay in the CMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorsSettings {
    /// Token required by the historical report endpoint.
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default = "default_exchange")]
    pub default_exchange: Exchange,
    #[serde(default = "default_range")]
    pub default_range: ChartRange,
    /// Days covered by the historical report when no window is requested.
    #[serde(default = "default_window_days")]
    pub historical_window_days: u32,
}

impl InvestorsSettings {
    /// Nonce, ignoring blank values.
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

impl Default for InvestorsSettings {
    fn default() -> Self {
        Self {
            nonce: None,
            default_exchange: default_exchange(),
            default_range: default_range(),
            historical_window_days: default_window_days(),
        }
    }
}

fn default_exchange() -> Exchange {
    Exchange::NSE
}

fn default_range() -> ChartRange {
    ChartRange::OneMonth
}

fn default_window_days() -> u32 {
    defaults::HISTORICAL_WINDOW_DAYS
}

/// Price fields mirrored into the site header record for fast page load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderSnapshot {
    pub exchange: Exchange,
    pub price: Decimal,
    #[serde(default)]
    pub change: Option<Decimal>,
    pub percent_change: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl From<&Quote> for HeaderSnapshot {
    fn from(q: &Quote) -> Self {
        Self {
            exchange: q.exchange,
            price: q.last,
            change: q.change,
            percent_change: q.percent_change,
            updated_at: q.as_of,
        }
    }
}
