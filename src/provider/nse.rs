use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{ExchangeAdapter, chart_window};
use crate::client::ExchangeClient;
use crate::error::Result;
use crate::normalize::today_ist;
use crate::types::enums::{ChartRange, Exchange};
use crate::types::historical::DateWindow;
use crate::types::wire::{RawChart, RawQuote, RawReport};

/// NSE adapter: quote-equity for quotes, the intraday index graph for
/// `Today` and daily EQ candles for every other range.
#[derive(Debug, Clone)]
pub struct NseAdapter {
    client: Arc<ExchangeClient>,
    symbol: String,
    listing_date: NaiveDate,
}

impl NseAdapter {
    /// Adapter for the NSE symbol `symbol`.
    pub fn new(client: Arc<ExchangeClient>, symbol: impl Into<String>, listing_date: NaiveDate) -> Self {
        Self {
            client,
            symbol: symbol.into(),
            listing_date,
        }
    }
}

#[async_trait]
impl ExchangeAdapter for NseAdapter {
    fn exchange(&self) -> Exchange {
        Exchange::NSE
    }

    fn instrument(&self) -> &str {
        &self.symbol
    }

    async fn fetch_quote(&self) -> Result<RawQuote> {
        self.client.nse_quote(&self.symbol).await.map(RawQuote::Nse)
    }

    async fn fetch_chart(&self, range: ChartRange, window: Option<DateWindow>) -> Result<RawChart> {
        // resolve first so a bad custom request never reaches the network
        let window = chart_window(range, window, today_ist(), self.listing_date)?;
        if range.is_intraday() {
            return self
                .client
                .nse_intraday(&self.symbol)
                .await
                .map(RawChart::NseIntraday);
        }
        self.client
            .nse_historical(&self.symbol, &window)
            .await
            .map(RawChart::NseDaily)
    }

    async fn fetch_historical(&self, window: DateWindow, nonce: Option<&str>) -> Result<RawReport> {
        self.client
            .historical_report(Exchange::NSE, &window, nonce)
            .await
    }
}
