//! Aggregation service.
//!
//! [`MarketDataService`] is the only component that talks to both the
//! exchange adapters and the CMS. It owns the quote retry policy, the short
//! TTL cache and the detached header snapshot write. Each request walks
//! `Requested → Fetching → Normalizing → Done | Failed(kind)`, emitted as
//! `tracing` debug events.

pub mod cache;
pub mod retry;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::client::ExchangeClient;
use crate::cms::{CmsStore, JsonFileCms, MemoryCms};
use crate::config::{PolicyConfig, ServiceConfig};
use crate::error::{ErrorKind, MarketDataError, Result};
use crate::normalize;
use crate::provider::{self, ExchangeAdapter};
use crate::types::chart::ChartSeries;
use crate::types::cms::{HeaderSnapshot, InvestorsSettings};
use crate::types::enums::{ChartRange, Exchange};
use crate::types::historical::{DateWindow, HistoricalRow};
use crate::types::quote::Quote;

pub use cache::TtlCache;
pub use retry::RetryPolicy;

const QUOTE_KEY: &str = "quote";

/// Lifecycle of one service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Requested,
    Fetching,
    Normalizing,
    Done,
    Failed(ErrorKind),
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("Requested"),
            Self::Fetching => f.write_str("Fetching"),
            Self::Normalizing => f.write_str("Normalizing"),
            Self::Done => f.write_str("Done"),
            Self::Failed(kind) => write!(f, "Failed({kind})"),
        }
    }
}

fn transition(op: &'static str, exchange: Exchange, state: RequestState) {
    tracing::debug!(op, %exchange, %state, "market data request");
}

/// Log the terminal state of `result` and hand it back.
fn finish<T>(op: &'static str, exchange: Exchange, result: Result<T>) -> Result<T> {
    let state = match &result {
        Ok(_) => RequestState::Done,
        Err(e) => RequestState::Failed(e.kind()),
    };
    transition(op, exchange, state);
    result
}

/// Market data for the Investors pages, one adapter per exchange.
pub struct MarketDataService {
    adapters: HashMap<Exchange, Arc<dyn ExchangeAdapter>>,
    cms: Arc<dyn CmsStore>,
    retry: RetryPolicy,
    quotes: TtlCache<Quote>,
    charts: TtlCache<ChartSeries>,
    mirror_header_on_quote: bool,
}

impl fmt::Debug for MarketDataService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketDataService")
            .field("exchanges", &self.adapters.keys().collect::<Vec<_>>())
            .field("retry", &self.retry)
            .field("mirror_header_on_quote", &self.mirror_header_on_quote)
            .finish_non_exhaustive()
    }
}

impl MarketDataService {
    /// Build a service over explicit adapters and CMS store.
    pub fn new(
        adapters: Vec<Arc<dyn ExchangeAdapter>>,
        cms: Arc<dyn CmsStore>,
        policy: &PolicyConfig,
    ) -> Self {
        Self {
            adapters: adapters.into_iter().map(|a| (a.exchange(), a)).collect(),
            cms,
            retry: RetryPolicy::new(policy.quote_retries, policy.retry_backoff()),
            quotes: TtlCache::new(policy.cache_ttl()),
            charts: TtlCache::new(policy.cache_ttl()),
            mirror_header_on_quote: true,
        }
    }

    /// Build the production service: real adapters and the configured CMS.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = Arc::new(ExchangeClient::new(
            &config.providers,
            config.policy.request_timeout(),
        )?);
        let adapters = provider::default_adapters(client, &config.providers);
        let cms: Arc<dyn CmsStore> = match &config.cms_file {
            Some(path) => Arc::new(JsonFileCms::new(path)),
            None => Arc::new(MemoryCms::default()),
        };
        Ok(Self::new(adapters, cms, &config.policy)
            .with_mirror_header_on_quote(config.mirror_header_on_quote))
    }

    /// Whether `/stock/external` mirrors each live quote into the header row.
    pub fn with_mirror_header_on_quote(mut self, mirror: bool) -> Self {
        self.mirror_header_on_quote = mirror;
        self
    }

    /// Whether `/stock/external` mirrors each quote into the header snapshot.
    pub fn mirrors_header_on_quote(&self) -> bool {
        self.mirror_header_on_quote
    }

    fn adapter(&self, exchange: Exchange) -> Result<&Arc<dyn ExchangeAdapter>> {
        self.adapters.get(&exchange).ok_or_else(|| {
            MarketDataError::InvalidRange(format!("exchange {exchange} is not configured"))
        })
    }

    // -----------------------------------------------------------------------
    // Quotes
    // -----------------------------------------------------------------------

    /// Live quote, retried on `UpstreamUnavailable` per the retry policy.
    ///
    /// Exhausted retries surface as `QuoteUnavailable`; every other failure
    /// propagates unchanged.
    pub async fn get_quote(&self, exchange: Exchange) -> Result<Quote> {
        const OP: &str = "quote";
        transition(OP, exchange, RequestState::Requested);

        if let Some(hit) = self.quotes.get(exchange, QUOTE_KEY).await {
            tracing::debug!(%exchange, "quote served from cache");
            return finish(OP, exchange, Ok(hit));
        }

        let result = async {
            let adapter = self.adapter(exchange)?;
            transition(OP, exchange, RequestState::Fetching);
            let raw = self.retry.run(exchange, |_| adapter.fetch_quote()).await?;

            transition(OP, exchange, RequestState::Normalizing);
            let quote = normalize::quote(exchange, adapter.instrument(), &raw, Utc::now())?;
            self.quotes.insert(exchange, QUOTE_KEY, quote.clone()).await;
            Ok::<_, MarketDataError>(quote)
        }
        .await;
        finish(OP, exchange, result)
    }

    // -----------------------------------------------------------------------
    // Charts
    // -----------------------------------------------------------------------

    /// Chart series for `range`. `Custom` requires `window`.
    pub async fn get_chart(
        &self,
        exchange: Exchange,
        range: ChartRange,
        window: Option<DateWindow>,
    ) -> Result<ChartSeries> {
        const OP: &str = "chart";
        transition(OP, exchange, RequestState::Requested);

        let result = async {
            if range == ChartRange::Custom && window.is_none() {
                return Err(MarketDataError::InvalidRange(
                    "custom range requires 'from' and 'to'".into(),
                ));
            }
            let adapter = self.adapter(exchange)?;
            // custom windows are open-ended, so only named ranges are cached
            let key = (range != ChartRange::Custom).then(|| format!("chart:{}", range.token()));
            if let Some(key) = &key {
                if let Some(hit) = self.charts.get(exchange, key).await {
                    tracing::debug!(%exchange, %range, "chart served from cache");
                    return Ok(hit);
                }
            }

            transition(OP, exchange, RequestState::Fetching);
            let raw = adapter.fetch_chart(range, window).await?;

            transition(OP, exchange, RequestState::Normalizing);
            let series = normalize::chart(exchange, range, &raw)?;
            if let Some(key) = &key {
                self.charts.insert(exchange, key, series.clone()).await;
            }
            Ok::<_, MarketDataError>(series)
        }
        .await;
        finish(OP, exchange, result)
    }

    /// Current-session series.
    pub async fn get_intraday(&self, exchange: Exchange) -> Result<ChartSeries> {
        const OP: &str = "intraday";
        transition(OP, exchange, RequestState::Requested);

        let result = async {
            let adapter = self.adapter(exchange)?;
            transition(OP, exchange, RequestState::Fetching);
            let raw = adapter.fetch_intraday().await?;
            transition(OP, exchange, RequestState::Normalizing);
            normalize::chart(exchange, ChartRange::Today, &raw)
        }
        .await;
        finish(OP, exchange, result)
    }

    // -----------------------------------------------------------------------
    // Historical report
    // -----------------------------------------------------------------------

    /// Historical report rows, oldest first.
    ///
    /// The nonce is read from the CMS on every call. Without `window` the
    /// CMS's trailing window ending today (IST) is used.
    pub async fn get_historical(
        &self,
        exchange: Exchange,
        window: Option<DateWindow>,
    ) -> Result<Vec<HistoricalRow>> {
        const OP: &str = "historical";
        transition(OP, exchange, RequestState::Requested);
        let result = self.historical_rows(OP, exchange, window).await;
        finish(OP, exchange, result)
    }

    /// Historical rows reshaped as a daily series with range `Custom`.
    pub async fn get_chart_by_api(
        &self,
        exchange: Exchange,
        window: Option<DateWindow>,
    ) -> Result<ChartSeries> {
        const OP: &str = "chart_by_api";
        transition(OP, exchange, RequestState::Requested);
        let result = self
            .historical_rows(OP, exchange, window)
            .await
            .map(|rows| ChartSeries::from_rows(exchange, ChartRange::Custom, &rows));
        finish(OP, exchange, result)
    }

    async fn historical_rows(
        &self,
        op: &'static str,
        exchange: Exchange,
        window: Option<DateWindow>,
    ) -> Result<Vec<HistoricalRow>> {
        let adapter = self.adapter(exchange)?;
        let settings = self.cms.settings().await?;
        let nonce = settings.nonce().ok_or_else(|| {
            MarketDataError::MissingCredential(
                "historical report nonce is not configured in the CMS".into(),
            )
        })?;
        let window = window.unwrap_or_else(|| {
            DateWindow::trailing_days(normalize::today_ist(), settings.historical_window_days)
        });

        transition(op, exchange, RequestState::Fetching);
        let raw = adapter.fetch_historical(window, Some(nonce)).await?;
        transition(op, exchange, RequestState::Normalizing);
        normalize::historical(&raw)
    }

    // -----------------------------------------------------------------------
    // CMS
    // -----------------------------------------------------------------------

    /// Current Investors settings.
    pub async fn settings(&self) -> Result<InvestorsSettings> {
        self.cms.settings().await
    }

    /// Last header snapshot written to the CMS.
    pub async fn header_snapshot(&self) -> Result<Option<HeaderSnapshot>> {
        self.cms.header_snapshot().await
    }

    /// Mirror `quote` into the CMS header row without blocking the caller.
    ///
    /// The write runs on a detached task; a failure is logged and dropped.
    pub fn refresh_header_snapshot(&self, quote: &Quote) -> JoinHandle<()> {
        let cms = Arc::clone(&self.cms);
        let snapshot = HeaderSnapshot::from(quote);
        tokio::spawn(async move {
            if let Err(e) = cms.write_header_snapshot(&snapshot).await {
                tracing::warn!(exchange = %snapshot.exchange, error = %e, "header snapshot write failed");
            }
        })
    }

    /// Fetch a live quote and write it to the header row, waiting for the
    /// write to complete.
    pub async fn update_header(&self, exchange: Exchange) -> Result<HeaderSnapshot> {
        let quote = self.get_quote(exchange).await?;
        let snapshot = HeaderSnapshot::from(&quote);
        self.cms.write_header_snapshot(&snapshot).await?;
        tracing::info!(%exchange, price = %snapshot.price, "header snapshot updated");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::wire::{NseQuote, RawChart, RawQuote, RawReport};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    // -----------------------------------------------------------------------
    // Stubs
    // -----------------------------------------------------------------------

    #[derive(Default)]
    struct StubAdapter {
        /// Quote calls that fail with `UpstreamUnavailable` before succeeding.
        failing_quotes: AtomicU32,
        quote_calls: AtomicUsize,
        chart_calls: AtomicUsize,
        historical_calls: AtomicUsize,
        last_nonce: Mutex<Option<String>>,
    }

    impl StubAdapter {
        fn failing(n: u32) -> Self {
            Self {
                failing_quotes: AtomicU32::new(n),
                ..Self::default()
            }
        }
    }

    fn quote_fixture() -> NseQuote {
        serde_json::from_value(serde_json::json!({
            "info": { "symbol": "RELIANCE" },
            "metadata": { "lastUpdateTime": "16-Oct-2026 15:30:00" },
            "priceInfo": { "lastPrice": 412.35, "change": -5.01, "pChange": -1.2 }
        }))
        .unwrap()
    }

    const REPORT: &str = "<table>\
        <tr><th>Date</th><th>Open</th><th>High</th><th>Low</th><th>Close</th></tr>\
        <tr><td>16-Oct-2026</td><td>417</td><td>419</td><td>410</td><td>412.35</td></tr>\
        <tr><td>15-Oct-2026</td><td>415</td><td>419</td><td>414</td><td>417.36</td></tr>\
        </table>";

    #[async_trait]
    impl ExchangeAdapter for StubAdapter {
        fn exchange(&self) -> Exchange {
            Exchange::NSE
        }

        fn instrument(&self) -> &str {
            "RELIANCE"
        }

        async fn fetch_quote(&self) -> Result<RawQuote> {
            self.quote_calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failing_quotes.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failing_quotes.store(remaining - 1, Ordering::SeqCst);
                return Err(MarketDataError::UpstreamUnavailable {
                    provider: "NSE",
                    reason: "request timed out".into(),
                });
            }
            Ok(RawQuote::Nse(quote_fixture()))
        }

        async fn fetch_chart(
            &self,
            _range: ChartRange,
            _window: Option<DateWindow>,
        ) -> Result<RawChart> {
            self.chart_calls.fetch_add(1, Ordering::SeqCst);
            let raw = serde_json::from_value(serde_json::json!({
                "grapthData": [[1760586300000i64, 411.0], [1760586360000i64, 412.2]]
            }))
            .unwrap();
            Ok(RawChart::NseIntraday(raw))
        }

        async fn fetch_historical(
            &self,
            _window: DateWindow,
            nonce: Option<&str>,
        ) -> Result<RawReport> {
            self.historical_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_nonce.lock().unwrap() = nonce.map(str::to_owned);
            Ok(RawReport(REPORT.to_owned()))
        }
    }

    struct BrokenCms;

    #[async_trait]
    impl CmsStore for BrokenCms {
        async fn settings(&self) -> Result<InvestorsSettings> {
            Ok(InvestorsSettings::default())
        }

        async fn header_snapshot(&self) -> Result<Option<HeaderSnapshot>> {
            Ok(None)
        }

        async fn write_header_snapshot(&self, _snapshot: &HeaderSnapshot) -> Result<()> {
            Err(MarketDataError::Cms("database is read-only".into()))
        }
    }

    fn policy(cache_ttl_secs: u64) -> PolicyConfig {
        PolicyConfig {
            cache_ttl_secs,
            ..PolicyConfig::default()
        }
    }

    fn service(adapter: Arc<StubAdapter>, cms: Arc<dyn CmsStore>, ttl: u64) -> MarketDataService {
        MarketDataService::new(vec![adapter as Arc<dyn ExchangeAdapter>], cms, &policy(ttl))
    }

    fn with_nonce(nonce: &str) -> InvestorsSettings {
        InvestorsSettings {
            nonce: Some(nonce.into()),
            ..InvestorsSettings::default()
        }
    }

    // -----------------------------------------------------------------------
    // Quotes
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn quote_gives_up_after_one_retry() {
        let stub = Arc::new(StubAdapter::failing(u32::MAX));
        let svc = service(Arc::clone(&stub), Arc::new(MemoryCms::default()), 0);

        let err = svc.get_quote(Exchange::NSE).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuoteUnavailable);
        assert_eq!(stub.quote_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn quote_recovers_on_retry() {
        let stub = Arc::new(StubAdapter::failing(1));
        let svc = service(Arc::clone(&stub), Arc::new(MemoryCms::default()), 0);

        let quote = svc.get_quote(Exchange::NSE).await.unwrap();
        assert_eq!(quote.last, dec!(412.35));
        assert_eq!(quote.percent_change, dec!(-1.2));
        assert_eq!(stub.quote_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn quote_is_cached_within_ttl() {
        let stub = Arc::new(StubAdapter::default());
        let svc = service(Arc::clone(&stub), Arc::new(MemoryCms::default()), 60);

        let first = svc.get_quote(Exchange::NSE).await.unwrap();
        let second = svc.get_quote(Exchange::NSE).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(stub.quote_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn quote_not_cached_when_ttl_zero() {
        let stub = Arc::new(StubAdapter::default());
        let svc = service(Arc::clone(&stub), Arc::new(MemoryCms::default()), 0);

        svc.get_quote(Exchange::NSE).await.unwrap();
        svc.get_quote(Exchange::NSE).await.unwrap();
        assert_eq!(stub.quote_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unconfigured_exchange_is_invalid() {
        let stub = Arc::new(StubAdapter::default());
        let svc = service(Arc::clone(&stub), Arc::new(MemoryCms::default()), 0);

        let err = svc.get_quote(Exchange::BSE).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
        assert_eq!(stub.quote_calls.load(Ordering::SeqCst), 0);
    }

    // -----------------------------------------------------------------------
    // Charts
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn custom_chart_without_window_makes_no_call() {
        let stub = Arc::new(StubAdapter::default());
        let svc = service(Arc::clone(&stub), Arc::new(MemoryCms::default()), 0);

        let err = svc
            .get_chart(Exchange::NSE, ChartRange::Custom, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
        assert_eq!(stub.chart_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn named_chart_is_cached_custom_is_not() {
        let stub = Arc::new(StubAdapter::default());
        let svc = service(Arc::clone(&stub), Arc::new(MemoryCms::default()), 60);

        let series = svc.get_chart(Exchange::NSE, ChartRange::Today, None).await.unwrap();
        assert!(series.is_strictly_increasing());
        svc.get_chart(Exchange::NSE, ChartRange::Today, None).await.unwrap();
        assert_eq!(stub.chart_calls.load(Ordering::SeqCst), 1);

        let window = DateWindow::trailing_days(normalize::today_ist(), 10);
        svc.get_chart(Exchange::NSE, ChartRange::Custom, Some(window)).await.unwrap();
        svc.get_chart(Exchange::NSE, ChartRange::Custom, Some(window)).await.unwrap();
        assert_eq!(stub.chart_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn intraday_uses_today_range() {
        let stub = Arc::new(StubAdapter::default());
        let svc = service(Arc::clone(&stub), Arc::new(MemoryCms::default()), 0);
        let series = svc.get_intraday(Exchange::NSE).await.unwrap();
        assert_eq!(series.range, ChartRange::Today);
        assert_eq!(series.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Historical
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn historical_without_nonce_makes_no_call() {
        let stub = Arc::new(StubAdapter::default());
        let svc = service(Arc::clone(&stub), Arc::new(MemoryCms::default()), 0);

        let err = svc.get_historical(Exchange::NSE, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
        assert_eq!(stub.historical_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn historical_reads_nonce_per_request() {
        let stub = Arc::new(StubAdapter::default());
        let cms = Arc::new(MemoryCms::new(with_nonce("first")));
        let svc = service(Arc::clone(&stub), cms.clone(), 0);

        let rows = svc.get_historical(Exchange::NSE, None).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].date < rows[1].date);
        assert_eq!(stub.last_nonce.lock().unwrap().as_deref(), Some("first"));

        cms.set_settings(with_nonce("rotated")).await;
        svc.get_historical(Exchange::NSE, None).await.unwrap();
        assert_eq!(stub.last_nonce.lock().unwrap().as_deref(), Some("rotated"));
    }

    #[tokio::test]
    async fn chart_by_api_builds_daily_series() {
        let stub = Arc::new(StubAdapter::default());
        let svc = service(stub, Arc::new(MemoryCms::new(with_nonce("n"))), 0);

        let series = svc.get_chart_by_api(Exchange::NSE, None).await.unwrap();
        assert_eq!(series.range, ChartRange::Custom);
        assert_eq!(series.len(), 2);
        assert!(series.is_strictly_increasing());
        assert_eq!(series.points[1].close, dec!(412.35));
    }

    // -----------------------------------------------------------------------
    // Header snapshot
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn refresh_writes_snapshot() {
        let cms = Arc::new(MemoryCms::default());
        let svc = service(Arc::new(StubAdapter::default()), cms.clone(), 0);

        let quote = svc.get_quote(Exchange::NSE).await.unwrap();
        svc.refresh_header_snapshot(&quote).await.unwrap();
        let snap = cms.header_snapshot().await.unwrap().unwrap();
        assert_eq!(snap.price, dec!(412.35));
        assert_eq!(snap.updated_at, quote.as_of);
    }

    #[tokio::test]
    async fn refresh_failure_never_reaches_caller() {
        let svc = service(Arc::new(StubAdapter::default()), Arc::new(BrokenCms), 0);
        let quote = svc.get_quote(Exchange::NSE).await.unwrap();
        // the task itself completes normally
        assert!(svc.refresh_header_snapshot(&quote).await.is_ok());
    }

    #[tokio::test]
    async fn update_header_surfaces_write_errors() {
        let svc = service(Arc::new(StubAdapter::default()), Arc::new(BrokenCms), 0);
        let err = svc.update_header(Exchange::NSE).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cms);
    }

    #[test]
    fn state_display() {
        assert_eq!(
            RequestState::Failed(ErrorKind::QuoteUnavailable).to_string(),
            "Failed(QUOTE_UNAVAILABLE)"
        );
    }
}
