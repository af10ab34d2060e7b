//! BSE endpoints: scrip header quote and chart series.

use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::client::ExchangeClient;
use crate::constants::{BSE_ORIGIN, BSE_REFERER, paths};
use crate::error::Result;
use crate::types::enums::ChartRange;
use crate::types::historical::DateWindow;
use crate::types::wire::{BseChart, BseQuote};

const PROVIDER: &str = "BSE";

impl ExchangeClient {
    /// Retrieve the scrip header (quote) for a BSE scrip code.
    ///
    /// **Endpoint:** `GET /BseIndiaAPI/api/getScripHeaderData/w?Debtflag=&scripcode={code}&seriesid=`
    pub async fn bse_quote(&self, scrip_code: &str) -> Result<BseQuote> {
        let url = Self::url(
            self.bse_base_url(),
            paths::BSE_QUOTE,
            &[("Debtflag", ""), ("scripcode", scrip_code), ("seriesid", "")],
        )?;
        self.get_json(PROVIDER, url, bse_headers()).await
    }

    /// Retrieve the chart series for a scrip.
    ///
    /// `window` is sent only for [`ChartRange::Custom`]; named ranges are
    /// resolved by the provider from `flag`.
    ///
    /// **Endpoint:** `GET /BseIndiaAPI/api/StockReachGraph/w?scripcode=..&flag=..&fromdate=YYYYMMDD&todate=YYYYMMDD&seriesid=`
    pub async fn bse_chart(
        &self,
        scrip_code: &str,
        range: ChartRange,
        window: Option<&DateWindow>,
    ) -> Result<BseChart> {
        let (from, to) = match window {
            Some(w) if range == ChartRange::Custom => (
                w.from.format("%Y%m%d").to_string(),
                w.to.format("%Y%m%d").to_string(),
            ),
            _ => (String::new(), String::new()),
        };
        let url = Self::url(
            self.bse_base_url(),
            paths::BSE_CHART,
            &[
                ("scripcode", scrip_code),
                ("flag", bse_flag(range)),
                ("fromdate", from.as_str()),
                ("todate", to.as_str()),
                ("seriesid", ""),
            ],
        )?;
        self.get_json(PROVIDER, url, bse_headers()).await
    }
}

/// BSE's `flag` parameter for a range.
pub(crate) fn bse_flag(range: ChartRange) -> &'static str {
    match range {
        ChartRange::Today => "0",
        ChartRange::FiveDays => "5D",
        ChartRange::OneMonth => "1M",
        ChartRange::ThreeMonths => "3M",
        ChartRange::SixMonths => "6M",
        ChartRange::OneYear => "12M",
        ChartRange::ThreeYears => "3Y",
        ChartRange::YearToDate => "YTD",
        ChartRange::Max => "MAX",
        ChartRange::Custom => "C",
    }
}

/// BSE checks both `Referer` and `Origin`.
fn bse_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(3);
    headers.insert(header::REFERER, HeaderValue::from_static(BSE_REFERER));
    headers.insert(header::ORIGIN, HeaderValue::from_static(BSE_ORIGIN));
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers
}
