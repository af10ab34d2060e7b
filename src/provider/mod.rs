//! Exchange adapters.
//!
//! One [`ExchangeAdapter`] per provider variant. Adapters only fetch: they
//! return raw payloads and leave shaping to [`crate::normalize`]. They never
//! retry; retry policy belongs to the service.

mod bse;
mod nse;

pub use bse::BseAdapter;
pub use nse::NseAdapter;

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::ExchangeClient;
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::types::enums::{ChartRange, Exchange};
use crate::types::historical::DateWindow;
use crate::types::wire::{RawChart, RawQuote, RawReport};

/// Fetch capability of one exchange.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// The exchange this adapter serves.
    fn exchange(&self) -> Exchange;

    /// Instrument identifier sent to the provider (symbol or scrip code).
    fn instrument(&self) -> &str;

    /// Live quote payload.
    async fn fetch_quote(&self) -> Result<RawQuote>;

    /// Chart payload for `range`.
    ///
    /// `window` is mandatory for [`ChartRange::Custom`] and ignored
    /// otherwise. A custom range without a window fails with `InvalidRange`
    /// before any request is made.
    async fn fetch_chart(&self, range: ChartRange, window: Option<DateWindow>) -> Result<RawChart>;

    /// Intraday payload at [`ChartRange::Today`] granularity.
    async fn fetch_intraday(&self) -> Result<RawChart> {
        self.fetch_chart(ChartRange::Today, None).await
    }

    /// Historical report HTML for `window`. Requires the CMS nonce.
    async fn fetch_historical(&self, window: DateWindow, nonce: Option<&str>)
    -> Result<RawReport>;
}

/// The adapters for every supported exchange, sharing one HTTP client.
pub fn default_adapters(
    client: Arc<ExchangeClient>,
    providers: &ProviderConfig,
) -> Vec<Arc<dyn ExchangeAdapter>> {
    vec![
        Arc::new(NseAdapter::new(
            Arc::clone(&client),
            &providers.nse_symbol,
            providers.listing_date,
        )),
        Arc::new(BseAdapter::new(
            client,
            &providers.bse_scrip_code,
            providers.listing_date,
        )),
    ]
}

/// Window for a chart request: explicit for `Custom`, derived otherwise.
pub(crate) fn chart_window(
    range: ChartRange,
    window: Option<DateWindow>,
    today: chrono::NaiveDate,
    listing_date: chrono::NaiveDate,
) -> Result<DateWindow> {
    match (range, window) {
        (ChartRange::Custom, Some(w)) => Ok(w),
        _ => DateWindow::for_range(range, today, listing_date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn custom_window_is_passed_through() {
        let w = DateWindow::new(d(2026, 1, 1), d(2026, 2, 1)).unwrap();
        let got = chart_window(ChartRange::Custom, Some(w), d(2026, 10, 16), d(1995, 11, 29)).unwrap();
        assert_eq!(got, w);
    }

    #[test]
    fn custom_without_window_is_invalid() {
        let err = chart_window(ChartRange::Custom, None, d(2026, 10, 16), d(1995, 11, 29)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
    }

    #[test]
    fn named_range_ignores_window() {
        let w = DateWindow::new(d(2026, 1, 1), d(2026, 2, 1)).unwrap();
        let got = chart_window(ChartRange::OneMonth, Some(w), d(2026, 10, 16), d(1995, 11, 29)).unwrap();
        assert_eq!(got.from, d(2026, 9, 16));
    }

    #[test]
    fn default_adapters_cover_every_exchange() {
        let providers = ProviderConfig::default();
        let client = Arc::new(
            ExchangeClient::new(&providers, std::time::Duration::from_secs(1)).unwrap(),
        );
        let adapters = default_adapters(client, &providers);
        let exchanges: Vec<Exchange> = adapters.iter().map(|a| a.exchange()).collect();
        assert_eq!(exchanges, Exchange::ALL.to_vec());
    }
}
