//! Shared enum types: the supported exchanges and chart range tokens.
//!
//! Exchange variant names match the literals used on the wire (`"NSE"`,
//! `"BSE"`), so we suppress the Rust naming convention lint.
#![allow(non_camel_case_types)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MarketDataError;

// ---------------------------------------------------------------------------
// Exchange
// ---------------------------------------------------------------------------

/// Stock exchange a quote or series is sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    /// National Stock Exchange of India.
    NSE,
    /// BSE (Bombay Stock Exchange).
    BSE,
}

impl Exchange {
    /// All supported exchanges.
    pub const ALL: [Exchange; 2] = [Exchange::NSE, Exchange::BSE];

    /// Wire literal, also used as the report `type` parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NSE => "NSE",
            Self::BSE => "BSE",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = MarketDataError;

    /// Case-insensitive. Unknown literals are a client error, never defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NSE" => Ok(Self::NSE),
            "BSE" => Ok(Self::BSE),
            other => Err(MarketDataError::InvalidRange(format!(
                "unsupported exchange '{other}', expected NSE or BSE"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart Range
// ---------------------------------------------------------------------------

/// Chart range filter tokens accepted by the chart endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartRange {
    /// Intraday, current session.
    Today,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    ThreeYears,
    YearToDate,
    /// Everything since listing.
    Max,
    /// Caller-supplied date window.
    Custom,
}

impl ChartRange {
    /// All supported tokens.
    pub const ALL: [ChartRange; 10] = [
        Self::Today,
        Self::FiveDays,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::ThreeYears,
        Self::YearToDate,
        Self::Max,
        Self::Custom,
    ];

    /// Canonical token, e.g. `"1M"`.
    pub fn token(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::FiveDays => "5D",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::OneYear => "1Y",
            Self::ThreeYears => "3Y",
            Self::YearToDate => "YTD",
            Self::Max => "MAX",
            Self::Custom => "Custom",
        }
    }

    /// Whether the range is served from intraday (minute) data.
    pub fn is_intraday(self) -> bool {
        matches!(self, Self::Today)
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ChartRange {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let range = match s.trim().to_ascii_uppercase().as_str() {
            "TODAY" | "1D" | "INTRADAY" => Self::Today,
            "5D" => Self::FiveDays,
            "1M" => Self::OneMonth,
            "3M" => Self::ThreeMonths,
            "6M" => Self::SixMonths,
            "1Y" | "12M" => Self::OneYear,
            "3Y" => Self::ThreeYears,
            "YTD" => Self::YearToDate,
            "MAX" => Self::Max,
            "CUSTOM" => Self::Custom,
            _ => {
                return Err(MarketDataError::InvalidRange(format!(
                    "unsupported range '{}'",
                    s.trim()
                )));
            }
        };
        Ok(range)
    }
}

impl Serialize for ChartRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for ChartRange {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
