//! Historical report endpoint, the `admin-ajax` scrape shared by both
//! exchanges.

use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::client::ExchangeClient;
use crate::constants::{REPORT_ACTION, paths};
use crate::error::{MarketDataError, Result};
use crate::types::enums::Exchange;
use crate::types::historical::DateWindow;
use crate::types::wire::RawReport;

const PROVIDER: &str = "report";

impl ExchangeClient {
    /// Retrieve the historical report HTML for `exchange` within `window`.
    ///
    /// The endpoint rejects requests without a valid nonce, so a missing or
    /// blank `nonce` fails with [`MarketDataError::MissingCredential`] before
    /// any request is issued.
    ///
    /// **Endpoint:** `POST /wp-admin/admin-ajax.php` (form:
    /// `action`, `nonce`, `type`, `from`, `to`)
    pub async fn historical_report(
        &self,
        exchange: Exchange,
        window: &DateWindow,
        nonce: Option<&str>,
    ) -> Result<RawReport> {
        let nonce = nonce
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                MarketDataError::MissingCredential(
                    "historical report nonce is not configured in the CMS".into(),
                )
            })?;

        let url = Self::url(self.report_base_url(), paths::REPORT_AJAX, &[])?;
        let from = window.from.format("%d-%m-%Y").to_string();
        let to = window.to.format("%d-%m-%Y").to_string();
        let form = [
            ("action", REPORT_ACTION),
            ("nonce", nonce),
            ("type", exchange.as_str()),
            ("from", from.as_str()),
            ("to", to.as_str()),
        ];

        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html, */*; q=0.01"),
        );
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));

        let html = self.post_form_text(PROVIDER, url, headers, &form).await?;
        Ok(RawReport(html))
    }
}
