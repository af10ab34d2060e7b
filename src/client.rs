//! Core HTTP transport for the exchange providers.
//!
//! The [`ExchangeClient`] struct wraps a single [`reqwest::Client`] with a
//! bounded timeout and knows the base URL of every provider. Provider endpoint
//! methods are added to `ExchangeClient` via `impl` blocks in the
//! [`crate::api`] module, each shaping its own headers and query.
//!
//! The client never retries: retry policy belongs to the
//! [aggregation service](crate::service).

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ProviderConfig;
use crate::constants::{BROWSER_USER_AGENT, defaults};
use crate::error::{MarketDataError, Result};

/// Outbound HTTP client shared by all provider adapters.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use investors_stock::client::ExchangeClient;
/// use investors_stock::config::ProviderConfig;
///
/// # #[tokio::main]
/// # async fn main() -> investors_stock::Result<()> {
/// let client = ExchangeClient::new(&ProviderConfig::default(), Duration::from_secs(8))?;
/// let quote = client.nse_quote("RELIANCE").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ExchangeClient {
    http: reqwest::Client,
    nse_base_url: String,
    bse_base_url: String,
    report_base_url: String,
}

impl ExchangeClient {
    /// Build a client for the configured providers.
    ///
    /// Every request is bounded by `timeout`.
    pub fn new(providers: &ProviderConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .default_headers(Self::default_headers())
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| MarketDataError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            nse_base_url: trim_base(&providers.nse_base_url),
            bse_base_url: trim_base(&providers.bse_base_url),
            report_base_url: trim_base(&providers.report_base_url),
        })
    }

    /// Base URL of the NSE site, without a trailing slash.
    pub fn nse_base_url(&self) -> &str {
        &self.nse_base_url
    }

    /// Base URL of the BSE API host.
    pub fn bse_base_url(&self) -> &str {
        &self.bse_base_url
    }

    /// Base URL of the Investors site serving the report endpoint.
    pub fn report_base_url(&self) -> &str {
        &self.report_base_url
    }

    // -----------------------------------------------------------------------
    // Generic HTTP helpers
    // -----------------------------------------------------------------------

    /// Perform a GET request and deserialize the JSON response.
    pub(crate) async fn get_json<R: DeserializeOwned>(
        &self,
        provider: &'static str,
        url: Url,
        headers: HeaderMap,
    ) -> Result<R> {
        tracing::debug!(provider, %url, "GET");

        let resp = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| MarketDataError::transport(provider, e))?;

        let bytes = Self::read_success_body(provider, resp).await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            MarketDataError::malformed(format!("{provider} returned invalid JSON: {e}"))
        })
    }

    /// Perform a form-encoded POST and return the body as text.
    pub(crate) async fn post_form_text(
        &self,
        provider: &'static str,
        url: Url,
        headers: HeaderMap,
        form: &[(&str, &str)],
    ) -> Result<String> {
        tracing::debug!(provider, %url, "POST (form)");

        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();

        let resp = self
            .http
            .post(url)
            .headers(headers)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| MarketDataError::transport(provider, e))?;

        let bytes = Self::read_success_body(provider, resp).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Build `base + path` with URL-encoded query parameters.
    pub(crate) fn url(base: &str, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let raw = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        if query.is_empty() {
            Ok(Url::parse(&raw)?)
        } else {
            Ok(Url::parse_with_params(&raw, query)?)
        }
    }

    /// Default headers applied to every request.
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(BROWSER_USER_AGENT),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers
    }

    /// Read the body of a 2xx response, or map the status to `UpstreamRejected`.
    async fn read_success_body(
        provider: &'static str,
        resp: reqwest::Response,
    ) -> Result<Bytes> {
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| MarketDataError::transport(provider, e))?;

        if status.is_success() {
            Ok(bytes)
        } else {
            let body = String::from_utf8_lossy(&bytes);
            let body: String = body.chars().take(defaults::ERROR_BODY_LIMIT).collect();
            tracing::debug!(provider, %status, "provider rejected request");
            Err(MarketDataError::UpstreamRejected {
                provider,
                status,
                body,
            })
        }
    }
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}
