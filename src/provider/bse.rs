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

/// BSE adapter: scrip header for quotes and StockReachGraph for every range.
#[derive(Debug, Clone)]
pub struct BseAdapter {
    client: Arc<ExchangeClient>,
    scrip_code: String,
    listing_date: NaiveDate,
}

impl BseAdapter {
    /// Adapter for the BSE scrip `scrip_code`.
    pub fn new(
        client: Arc<ExchangeClient>,
        scrip_code: impl Into<String>,
        listing_date: NaiveDate,
    ) -> Self {
        Self {
            client,
            scrip_code: scrip_code.into(),
            listing_date,
        }
    }
}

#[async_trait]
impl ExchangeAdapter for BseAdapter {
    fn exchange(&self) -> Exchange {
        Exchange::BSE
    }

    fn instrument(&self) -> &str {
        &self.scrip_code
    }

    async fn fetch_quote(&self) -> Result<RawQuote> {
        self.client.bse_quote(&self.scrip_code).await.map(RawQuote::Bse)
    }

    async fn fetch_chart(&self, range: ChartRange, window: Option<DateWindow>) -> Result<RawChart> {
        let window = chart_window(range, window, today_ist(), self.listing_date)?;
        self.client
            .bse_chart(&self.scrip_code, range, Some(&window))
            .await
            .map(RawChart::Bse)
    }

    async fn fetch_historical(&self, window: DateWindow, nonce: Option<&str>) -> Result<RawReport> {
        self.client
            .historical_report(Exchange::BSE, &window, nonce)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::error::ErrorKind;
    use std::time::Duration;

    fn adapter() -> BseAdapter {
        let providers = ProviderConfig {
            bse_base_url: "http://127.0.0.1:9".into(),
            report_base_url: "http://127.0.0.1:9".into(),
            ..ProviderConfig::default()
        };
        let client = ExchangeClient::new(&providers, Duration::from_millis(200)).unwrap();
        BseAdapter::new(Arc::new(client), "500325", providers.listing_date)
    }

    #[tokio::test]
    async fn custom_range_without_window_is_invalid() {
        let err = adapter().fetch_chart(ChartRange::Custom, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
    }

    #[tokio::test]
    async fn historical_without_nonce_is_missing_credential() {
        let window = DateWindow::trailing_days(today_ist(), 30);
        let err = adapter().fetch_historical(window, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
    }
}
