//! Canonical chart series types.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::enums::{ChartRange, Exchange};
use crate::types::historical::HistoricalRow;

/// One OHLC(V) sample.
///
/// Line-only sources carry a single price per instant, in which case
/// `open == high == low == close`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Absent for line-only ranges.
    pub volume: Option<Decimal>,
}

impl ChartPoint {
    /// A line-only point.
    pub fn line(timestamp: i64, price: Decimal, volume: Option<Decimal>) -> Self {
        Self {
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }

    /// `low <= open, close <= high`.
    pub fn is_consistent(&self) -> bool {
        self.low <= self.high
            && (self.low..=self.high).contains(&self.close)
            && (self.low..=self.high).contains(&self.open)
    }
}

/// An ordered time series for one exchange and range.
///
/// Invariant: `points` is strictly increasing by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub exchange: Exchange,
    pub range: ChartRange,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Build a series, sorting by timestamp and dropping duplicate
    /// timestamps. The last occurrence in input order wins.
    pub fn new(exchange: Exchange, range: ChartRange, mut points: Vec<ChartPoint>) -> Self {
        // stable sort keeps provider order within equal timestamps
        points.sort_by_key(|p| p.timestamp);
        let mut deduped: Vec<ChartPoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(prev) if prev.timestamp == point.timestamp => *prev = point,
                _ => deduped.push(point),
            }
        }
        Self {
            exchange,
            range,
            points: deduped,
        }
    }

    /// Daily series from historical report rows, timestamped at IST midnight.
    pub fn from_rows(exchange: Exchange, range: ChartRange, rows: &[HistoricalRow]) -> Self {
        let points = rows
            .iter()
            .map(|row| ChartPoint {
                timestamp: crate::normalize::ist_midnight_millis(row.date),
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            })
            .collect();
        Self::new(exchange, range, points)
    }

    /// Whether timestamps are strictly increasing.
    pub fn is_strictly_increasing(&self) -> bool {
        self.points.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
