//! Historical report rows and date windows.

use chrono::{Datelike, Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{MarketDataError, Result};
use crate::normalize::parse;
use crate::types::enums::ChartRange;

/// One trading day from the historical report. Never corrected locally.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRow {
    /// ISO-8601 (`YYYY-MM-DD`) when serialized.
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Option<Decimal>,
    pub trade_value: Option<Decimal>,
    pub trades: Option<u64>,
}

/// Inclusive calendar date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting `from > to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(MarketDataError::InvalidRange(format!(
                "window start {from} is after end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// The last `days` days ending on `today`.
    pub fn trailing_days(today: NaiveDate, days: u32) -> Self {
        Self {
            from: today - Duration::days(i64::from(days)),
            to: today,
        }
    }

    /// Resolve a named range relative to `today`.
    ///
    /// `Custom` has no implicit window and yields `InvalidRange`.
    pub fn for_range(range: ChartRange, today: NaiveDate, listing_date: NaiveDate) -> Result<Self> {
        let from = match range {
            ChartRange::Today => today,
            ChartRange::FiveDays => today - Duration::days(7),
            ChartRange::OneMonth => months_back(today, 1),
            ChartRange::ThreeMonths => months_back(today, 3),
            ChartRange::SixMonths => months_back(today, 6),
            ChartRange::OneYear => months_back(today, 12),
            ChartRange::ThreeYears => months_back(today, 36),
            ChartRange::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
            ChartRange::Max => listing_date.min(today),
            ChartRange::Custom => {
                return Err(MarketDataError::InvalidRange(
                    "custom range requires an explicit from/to window".into(),
                ));
            }
        };
        Self::new(from, today)
    }

    /// Parse optional `from`/`to` request fields (ISO dates).
    ///
    /// Both absent → `Ok(None)`; exactly one present → `InvalidRange`.
    pub fn from_params(from: Option<&str>, to: Option<&str>) -> Result<Option<Self>> {
        match (from, to) {
            (None, None) => Ok(None),
            (Some(f), Some(t)) => Ok(Some(Self::new(parse_iso(f)?, parse_iso(t)?)?)),
            _ => Err(MarketDataError::InvalidRange(
                "both 'from' and 'to' are required for a date window".into(),
            )),
        }
    }
}

fn months_back(today: NaiveDate, months: u32) -> NaiveDate {
    today.checked_sub_months(Months::new(months)).unwrap_or(today)
}

fn parse_iso(s: &str) -> Result<NaiveDate> {
    parse::parse_date(s, &["%Y-%m-%d"])
        .map_err(|_| MarketDataError::InvalidRange(format!("'{s}' is not a YYYY-MM-DD date")))
}
