//! Service configuration.
//!
//! Values come from an optional TOML file (path in `STOCK_API_CONFIG`) and are
//! then overridden by `STOCK_API_*` environment variables. Every field has a
//! default, so an empty environment yields a working configuration pointed at
//! the public provider URLs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{BSE_BASE_URL, NSE_BASE_URL, REPORT_BASE_URL, defaults};
use crate::error::{MarketDataError, Result};

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "STOCK_API_CONFIG";

/// Prefix for per-field environment overrides.
pub const ENV_PREFIX: &str = "STOCK_API_";

/// Complete service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Internal API bind address.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Provider endpoints and instrument identifiers.
    #[serde(default)]
    pub providers: ProviderConfig,

    /// Timeout, retry and cache policy.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Bearer token accepted by `/stock/update-header`. `None` rejects all writes.
    #[serde(default)]
    pub admin_token: Option<String>,

    /// Mirror every live quote into the header snapshot.
    #[serde(default = "default_true")]
    pub mirror_header_on_quote: bool,

    /// JSON file backing the CMS collaborator. In-memory when unset.
    #[serde(default)]
    pub cms_file: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            providers: ProviderConfig::default(),
            policy: PolicyConfig::default(),
            admin_token: None,
            mirror_header_on_quote: true,
            cms_file: None,
        }
    }
}

/// Where and what to fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_nse_url")]
    pub nse_base_url: String,
    #[serde(default = "default_bse_url")]
    pub bse_base_url: String,
    #[serde(default = "default_report_url")]
    pub report_base_url: String,
    /// NSE trading symbol, e.g. `"RELIANCE"`.
    #[serde(default = "default_nse_symbol")]
    pub nse_symbol: String,
    /// BSE scrip code, e.g. `"500325"`.
    #[serde(default = "default_bse_scrip")]
    pub bse_scrip_code: String,
    /// First trading day, start of the `MAX` range.
    #[serde(default = "default_listing_date")]
    pub listing_date: NaiveDate,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            nse_base_url: default_nse_url(),
            bse_base_url: default_bse_url(),
            report_base_url: default_report_url(),
            nse_symbol: default_nse_symbol(),
            bse_scrip_code: default_bse_scrip(),
            listing_date: default_listing_date(),
        }
    }
}

/// Timeouts, retries and caching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Bound on every outbound provider call.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Quote retries after `UpstreamUnavailable`.
    #[serde(default = "default_retries")]
    pub quote_retries: u32,
    /// Fixed delay before each quote retry.
    #[serde(default = "default_backoff")]
    pub retry_backoff_ms: u64,
    /// Quote/chart cache TTL. `0` disables the cache.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
            quote_retries: default_retries(),
            retry_backoff_ms: default_backoff(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl PolicyConfig {
    /// Per-request provider timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Wait before each quote retry.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Quote and chart cache lifetime. Zero disables caching.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl ServiceConfig {
    /// Load from `STOCK_API_CONFIG` (if set) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MarketDataError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| MarketDataError::Config(e.to_string()))
    }

    /// Apply overrides; `lookup` receives the key without the prefix.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = lookup("NSE_BASE_URL") {
            self.providers.nse_base_url = v;
        }
        if let Some(v) = lookup("BSE_BASE_URL") {
            self.providers.bse_base_url = v;
        }
        if let Some(v) = lookup("REPORT_BASE_URL") {
            self.providers.report_base_url = v;
        }
        if let Some(v) = lookup("NSE_SYMBOL") {
            self.providers.nse_symbol = v;
        }
        if let Some(v) = lookup("BSE_SCRIP_CODE") {
            self.providers.bse_scrip_code = v;
        }
        if let Some(v) = lookup("LISTING_DATE") {
            self.providers.listing_date = parse_env("LISTING_DATE", &v)?;
        }
        if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
            self.policy.request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("QUOTE_RETRIES") {
            self.policy.quote_retries = parse_env("QUOTE_RETRIES", &v)?;
        }
        if let Some(v) = lookup("RETRY_BACKOFF_MS") {
            self.policy.retry_backoff_ms = parse_env("RETRY_BACKOFF_MS", &v)?;
        }
        if let Some(v) = lookup("CACHE_TTL_SECS") {
            self.policy.cache_ttl_secs = parse_env("CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("ADMIN_TOKEN") {
            self.admin_token = Some(v).filter(|t| !t.is_empty());
        }
        if let Some(v) = lookup("MIRROR_HEADER_ON_QUOTE") {
            self.mirror_header_on_quote = parse_env("MIRROR_HEADER_ON_QUOTE", &v)?;
        }
        if let Some(v) = lookup("CMS_FILE") {
            self.cms_file = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /// Reject values that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if self.policy.request_timeout_secs == 0 {
            return Err(MarketDataError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        for url in [
            &self.providers.nse_base_url,
            &self.providers.bse_base_url,
            &self.providers.report_base_url,
        ] {
            url::Url::parse(url)?;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| MarketDataError::Config(format!("{ENV_PREFIX}{key}: {e}")))
}

fn default_bind_addr() -> String {
    defaults::BIND_ADDR.to_owned()
}

fn default_true() -> bool {
    true
}

fn default_nse_url() -> String {
    NSE_BASE_URL.to_owned()
}

fn default_bse_url() -> String {
    BSE_BASE_URL.to_owned()
}

fn default_report_url() -> String {
    REPORT_BASE_URL.to_owned()
}

fn default_nse_symbol() -> String {
    "RELIANCE".to_owned()
}

fn default_bse_scrip() -> String {
    "500325".to_owned()
}

fn default_listing_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 11, 29).unwrap_or_default()
}

fn default_timeout() -> u64 {
    defaults::REQUEST_TIMEOUT_SECS
}

fn default_retries() -> u32 {
    defaults::QUOTE_RETRIES
}

fn default_backoff() -> u64 {
    defaults::RETRY_BACKOFF_MS
}

fn default_cache_ttl() -> u64 {
    defaults::CACHE_TTL_SECS
}
