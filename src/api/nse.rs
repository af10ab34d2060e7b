//! NSE endpoints: equity quote, intraday line chart and daily candles.

use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::client::ExchangeClient;
use crate::constants::{NSE_REFERER, paths};
use crate::error::Result;
use crate::types::historical::DateWindow;
use crate::types::wire::{NseHistorical, NseIntraday, NseQuote};

const PROVIDER: &str = "NSE";

impl ExchangeClient {
    /// Retrieve the live equity quote for `symbol`.
    ///
    /// **Endpoint:** `GET /api/quote-equity?symbol={symbol}`
    pub async fn nse_quote(&self, symbol: &str) -> Result<NseQuote> {
        let url = Self::url(self.nse_base_url(), paths::NSE_QUOTE, &[("symbol", symbol)])?;
        self.get_json(PROVIDER, url, nse_headers()).await
    }

    /// Retrieve today's intraday line series for `symbol`.
    ///
    /// **Endpoint:** `GET /api/chart-databyindex?index={symbol}EQN`
    pub async fn nse_intraday(&self, symbol: &str) -> Result<NseIntraday> {
        let index = format!("{symbol}EQN");
        let url = Self::url(
            self.nse_base_url(),
            paths::NSE_INTRADAY,
            &[("index", index.as_str()), ("preopen", "false")],
        )?;
        self.get_json(PROVIDER, url, nse_headers()).await
    }

    /// Retrieve daily EQ-series candles for `symbol` within `window`.
    ///
    /// The provider returns candles newest first.
    ///
    /// **Endpoint:** `GET /api/historical/cm/equity?symbol=..&series=["EQ"]&from=DD-MM-YYYY&to=DD-MM-YYYY`
    pub async fn nse_historical(&self, symbol: &str, window: &DateWindow) -> Result<NseHistorical> {
        let from = window.from.format("%d-%m-%Y").to_string();
        let to = window.to.format("%d-%m-%Y").to_string();
        let url = Self::url(
            self.nse_base_url(),
            paths::NSE_HISTORICAL,
            &[
                ("symbol", symbol),
                ("series", "[\"EQ\"]"),
                ("from", from.as_str()),
                ("to", to.as_str()),
            ],
        )?;
        self.get_json(PROVIDER, url, nse_headers()).await
    }
}

/// NSE rejects requests without a same-site referer.
fn nse_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(2);
    headers.insert(header::REFERER, HeaderValue::from_static(NSE_REFERER));
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers
}
