//! Constants for the exchange providers and service defaults.
//!
//! Contains provider base URLs, endpoint paths, request-shaping header values
//! and the default policy values used by
//! [`ServiceConfig`](crate::config::ServiceConfig).

// ---------------------------------------------------------------------------
// Base URLs
// ---------------------------------------------------------------------------

/// Base URL for the NSE website JSON API.
pub const NSE_BASE_URL: &str = "https://www.nseindia.com";

/// Base URL for the BSE JSON API.
pub const BSE_BASE_URL: &str = "https://api.bseindia.com";

/// Base URL of the site hosting the historical report `admin-ajax` endpoint.
pub const REPORT_BASE_URL: &str = "https://www.example-investors.com";

// ---------------------------------------------------------------------------
// Endpoint paths
// ---------------------------------------------------------------------------

/// Provider endpoint paths.
pub mod paths {
    /// NSE equity quote.
    pub const NSE_QUOTE: &str = "/api/quote-equity";
    /// NSE intraday line chart.
    pub const NSE_INTRADAY: &str = "/api/chart-databyindex";
    /// NSE daily candles for an equity.
    pub const NSE_HISTORICAL: &str = "/api/historical/cm/equity";
    /// BSE scrip header (quote).
    pub const BSE_QUOTE: &str = "/BseIndiaAPI/api/getScripHeaderData/w";
    /// BSE chart series.
    pub const BSE_CHART: &str = "/BseIndiaAPI/api/StockReachGraph/w";
    /// WordPress-style scraping endpoint for the historical report.
    pub const REPORT_AJAX: &str = "/wp-admin/admin-ajax.php";
}

/// `action` form field expected by the report endpoint.
pub const REPORT_ACTION: &str = "historical_stock_data";

// ---------------------------------------------------------------------------
// Request shaping
// ---------------------------------------------------------------------------

/// Browser user agent. Both exchanges reject requests without one.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Referer sent to the NSE API.
pub const NSE_REFERER: &str = "https://www.nseindia.com/";

/// Referer sent to the BSE API.
pub const BSE_REFERER: &str = "https://www.bseindia.com/";

/// Origin sent to the BSE API.
pub const BSE_ORIGIN: &str = "https://www.bseindia.com";

/// Indian Standard Time offset from UTC, in seconds.
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

// ---------------------------------------------------------------------------
// Policy defaults
// ---------------------------------------------------------------------------

/// Default policy values. All of them are overridable in configuration.
pub mod defaults {
    /// Outbound request timeout (seconds).
    pub const REQUEST_TIMEOUT_SECS: u64 = 8;
    /// Retries after an `UpstreamUnavailable` quote failure.
    pub const QUOTE_RETRIES: u32 = 1;
    /// Fixed backoff before a quote retry (milliseconds).
    pub const RETRY_BACKOFF_MS: u64 = 500;
    /// Cache time-to-live for quotes and charts (seconds, `0` disables).
    pub const CACHE_TTL_SECS: u64 = 15;
    /// Default historical report window (days back from today).
    pub const HISTORICAL_WINDOW_DAYS: u32 = 30;
    /// Bind address for the internal API.
    pub const BIND_ADDR: &str = "0.0.0.0:8080";
    /// Maximum number of body bytes kept on an `UpstreamRejected` error.
    pub const ERROR_BODY_LIMIT: usize = 512;
}
