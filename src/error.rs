//! Error types for the `investors-stock` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, MarketDataError>`.
//!
//! [`MarketDataError`] covers:
//! - **Request errors**: unsupported range/exchange, missing report nonce
//! - **Transport errors**: provider unreachable, timed out, or non-2xx
//! - **Data errors**: provider responded with a shape we cannot parse
//! - **Terminal quote failure**: quote still unavailable after the retry
//! - **Collaborator errors**: CMS store and configuration failures
//!
//! Transport and parse failures are converted into this taxonomy inside the
//! crate; raw `reqwest` / `serde_json` errors never reach HTTP callers.

use std::fmt;

use serde::Serialize;

/// Machine-readable error kind exposed to HTTP callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRange,
    MissingCredential,
    UpstreamUnavailable,
    UpstreamRejected,
    MalformedUpstreamData,
    QuoteUnavailable,
    Cms,
    Config,
}

impl ErrorKind {
    /// Wire code, e.g. `"UPSTREAM_UNAVAILABLE"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRange => "INVALID_RANGE",
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamRejected => "UPSTREAM_REJECTED",
            Self::MalformedUpstreamData => "MALFORMED_UPSTREAM_DATA",
            Self::QuoteUnavailable => "QUOTE_UNAVAILABLE",
            Self::Cms => "CMS_ERROR",
            Self::Config => "CONFIG_ERROR",
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All possible errors produced by the market-data layer.
#[derive(Debug, thiserror::Error)]
pub enum MarketDataError {
    /// The caller asked for a range, window or exchange we do not support.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// The historical report endpoint needs a nonce and none is configured.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// Connection failure, timeout or other transport error.
    #[error("upstream {provider} unavailable: {reason}")]
    UpstreamUnavailable {
        /// Provider label (`"NSE"`, `"BSE"`, `"report"`).
        provider: &'static str,
        /// Transport error text.
        reason: String,
    },

    /// The provider answered with a non-2xx status.
    #[error("upstream {provider} rejected request: HTTP {status}")]
    UpstreamRejected {
        /// Provider label.
        provider: &'static str,
        /// The HTTP status code.
        status: reqwest::StatusCode,
        /// First part of the response body, for logs.
        body: String,
    },

    /// The provider responded but the payload does not have the expected shape.
    #[error("malformed upstream data: {0}")]
    MalformedUpstreamData(String),

    /// The quote could not be fetched even after retrying.
    #[error("quote unavailable for {exchange} after {attempts} attempts")]
    QuoteUnavailable {
        /// Exchange label.
        exchange: String,
        /// Number of provider calls made.
        attempts: u32,
    },

    /// Reading or writing the CMS collaborator failed.
    #[error("CMS error: {0}")]
    Cms(String),

    /// Invalid service configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MarketDataError {
    /// The machine-readable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRange(_) => ErrorKind::InvalidRange,
            Self::MissingCredential(_) => ErrorKind::MissingCredential,
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::UpstreamRejected { .. } => ErrorKind::UpstreamRejected,
            Self::MalformedUpstreamData(_) => ErrorKind::MalformedUpstreamData,
            Self::QuoteUnavailable { .. } => ErrorKind::QuoteUnavailable,
            Self::Cms(_) => ErrorKind::Cms,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Shorthand for [`MarketDataError::MalformedUpstreamData`].
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedUpstreamData(msg.into())
    }

    /// Map a `reqwest` transport error for the given provider.
    pub(crate) fn transport(provider: &'static str, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_owned()
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        Self::UpstreamUnavailable { provider, reason }
    }
}

impl From<url::ParseError> for MarketDataError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("bad provider URL: {err}"))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MarketDataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_have_stable_codes() {
        assert_eq!(
            MarketDataError::InvalidRange("XSE".into()).kind().as_str(),
            "INVALID_RANGE"
        );
        assert_eq!(
            MarketDataError::QuoteUnavailable {
                exchange: "NSE".into(),
                attempts: 2
            }
            .kind(),
            ErrorKind::QuoteUnavailable
        );
        assert_eq!(ErrorKind::MalformedUpstreamData.to_string(), "MALFORMED_UPSTREAM_DATA");
    }

    #[test]
    fn kind_serializes_as_code() {
        let json = serde_json::to_string(&ErrorKind::MissingCredential).unwrap();
        assert_eq!(json, "\"MISSING_CREDENTIAL\"");
    }
}
