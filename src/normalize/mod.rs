//! Response normalizer: provider payloads to canonical types.
//!
//! Every function here is pure: it takes a raw payload (see
//! [`crate::types::wire`]) and returns a canonical [`Quote`], [`ChartSeries`]
//! or list of [`HistoricalRow`]s, or [`MarketDataError::MalformedUpstreamData`]
//! when a required value is missing or unparseable. Optional values that are
//! absent come back as `None`.

pub mod html;
pub mod parse;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{MarketDataError, Result};
use crate::types::chart::{ChartPoint, ChartSeries};
use crate::types::enums::{ChartRange, Exchange};
use crate::types::historical::HistoricalRow;
use crate::types::quote::Quote;
use crate::types::wire::{
    BseChart, BseChartPoint, BseQuote, NseCandle, NseHistorical, NseIntraday, NseQuote, RawChart,
    RawNumber, RawQuote, RawReport,
};

pub use parse::{ist_midnight_millis, parse_decimal, today_ist};

/// NSE `metadata.lastUpdateTime`.
const NSE_TIME_FORMATS: [&str; 2] = ["%d-%b-%Y %H:%M:%S", "%d-%b-%Y %H:%M"];
/// BSE `Header.Ason`.
const BSE_ASON_FORMATS: [&str; 3] = ["%d %b %Y | %H:%M", "%d %b %Y | %H:%M:%S", "%d %b %Y %H:%M"];
/// BSE chart `dttm`.
const BSE_DTTM_FORMATS: [&str; 2] = ["%a %b %d %Y %H:%M:%S", "%a %b %d %Y %H:%M"];
/// Report and NSE candle dates.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%d-%b-%Y",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d %b %Y",
    "%b %d, %Y",
];

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// Normalize a quote payload.
///
/// `symbol` is used when the payload does not name the instrument and
/// `fetched_at` when it carries no timestamp.
pub fn quote(
    exchange: Exchange,
    symbol: &str,
    raw: &RawQuote,
    fetched_at: DateTime<Utc>,
) -> Result<Quote> {
    match raw {
        RawQuote::Nse(q) => nse_quote(exchange, symbol, q, fetched_at),
        RawQuote::Bse(q) => bse_quote(exchange, symbol, q, fetched_at),
    }
}

fn nse_quote(
    exchange: Exchange,
    symbol: &str,
    raw: &NseQuote,
    fetched_at: DateTime<Utc>,
) -> Result<Quote> {
    let price = raw
        .price_info
        .as_ref()
        .ok_or_else(|| MarketDataError::malformed("NSE quote has no priceInfo"))?;

    let last = required("priceInfo.lastPrice", price.last_price.as_ref())?;
    let change = optional(price.change.as_ref())?;
    let previous_close = optional(price.previous_close.as_ref())?;
    let percent_change = match optional(price.p_change.as_ref())? {
        Some(p) => p,
        None => derive_percent(last, previous_close)
            .ok_or_else(|| MarketDataError::malformed("NSE quote has no priceInfo.pChange"))?,
    };

    let (day_low, day_high) = high_low(price.intra_day_high_low.as_ref().map(|h| (&h.min, &h.max)))?;
    let (week52_low, week52_high) = high_low(price.week_high_low.as_ref().map(|h| (&h.min, &h.max)))?;

    let book = raw.market_dept_order_book.as_ref();
    let bid = book
        .and_then(|b| b.bid.first())
        .map(|l| optional(l.price.as_ref()))
        .transpose()?
        .flatten()
        .filter(|p| !p.is_zero());
    let offer = book
        .and_then(|b| b.ask.first())
        .map(|l| optional(l.price.as_ref()))
        .transpose()?
        .flatten()
        .filter(|p| !p.is_zero());
    let volume = book
        .map(|b| optional(b.total_traded_volume.as_ref()))
        .transpose()?
        .flatten();

    let as_of = match raw
        .metadata
        .as_ref()
        .and_then(|m| m.last_update_time.as_deref())
    {
        Some(t) => parse::parse_ist_datetime(t, &NSE_TIME_FORMATS)?,
        None => fetched_at,
    };

    Ok(Quote {
        exchange,
        symbol: raw
            .info
            .as_ref()
            .and_then(|i| i.symbol.clone())
            .unwrap_or_else(|| symbol.to_owned()),
        last,
        bid,
        offer,
        change,
        percent_change,
        open: optional(price.open.as_ref())?,
        previous_close,
        day_high,
        day_low,
        week52_high,
        week52_low,
        volume,
        as_of,
    })
}

fn bse_quote(
    exchange: Exchange,
    symbol: &str,
    raw: &BseQuote,
    fetched_at: DateTime<Utc>,
) -> Result<Quote> {
    let header = raw.header.as_ref();
    let rate = raw.curr_rate.as_ref();

    let last = rate
        .and_then(|r| r.ltp.as_ref())
        .or_else(|| header.and_then(|h| h.ltp.as_ref()));
    let last = required("CurrRate.LTP", last)?;
    let previous_close = optional(header.and_then(|h| h.prev_close.as_ref()))?;
    let change = optional(rate.and_then(|r| r.change.as_ref()))?;
    let percent_change = match optional(rate.and_then(|r| r.percent_change.as_ref()))? {
        Some(p) => p,
        None => derive_percent(last, previous_close)
            .ok_or_else(|| MarketDataError::malformed("BSE quote has no CurrRate.PcChg"))?,
    };

    let as_of = match header.and_then(|h| h.as_on.as_deref()) {
        Some(t) => parse::parse_ist_datetime(t, &BSE_ASON_FORMATS)?,
        None => fetched_at,
    };

    Ok(Quote {
        exchange,
        symbol: symbol.to_owned(),
        last,
        bid: None,
        offer: None,
        change,
        percent_change,
        open: optional(header.and_then(|h| h.open.as_ref()))?,
        previous_close,
        day_high: optional(header.and_then(|h| h.high.as_ref()))?,
        day_low: optional(header.and_then(|h| h.low.as_ref()))?,
        week52_high: None,
        week52_low: None,
        volume: None,
        as_of,
    })
}

/// `(last - prev) / prev * 100`, rounded to two places.
fn derive_percent(last: Decimal, previous_close: Option<Decimal>) -> Option<Decimal> {
    let prev = previous_close.filter(|p| !p.is_zero())?;
    Some(((last - prev) / prev * Decimal::ONE_HUNDRED).round_dp(2))
}

type RawPair<'a> = (&'a Option<RawNumber>, &'a Option<RawNumber>);

fn high_low(pair: Option<RawPair<'_>>) -> Result<(Option<Decimal>, Option<Decimal>)> {
    match pair {
        Some((min, max)) => Ok((optional(min.as_ref())?, optional(max.as_ref())?)),
        None => Ok((None, None)),
    }
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

/// Normalize a chart payload into a strictly increasing series.
///
/// A point with inconsistent OHLC rejects the whole payload.
pub fn chart(exchange: Exchange, range: ChartRange, raw: &RawChart) -> Result<ChartSeries> {
    let points = match raw {
        RawChart::NseIntraday(c) => nse_intraday_points(c)?,
        RawChart::NseDaily(c) => nse_daily_points(c)?,
        RawChart::Bse(c) => bse_points(c)?,
    };
    if let Some(bad) = points.iter().find(|p| !p.is_consistent()) {
        return Err(MarketDataError::malformed(format!(
            "inconsistent OHLC at {}: low {} high {} close {}",
            bad.timestamp, bad.low, bad.high, bad.close
        )));
    }
    Ok(ChartSeries::new(exchange, range, points))
}

fn nse_intraday_points(raw: &NseIntraday) -> Result<Vec<ChartPoint>> {
    raw.graph_data
        .iter()
        .map(|entry| {
            let [ts, price, ..] = entry.as_slice() else {
                return Err(MarketDataError::malformed(
                    "NSE intraday entry needs [timestamp, price]",
                ));
            };
            let ts = required("grapthData[].0", Some(ts))?;
            let timestamp = ts
                .trunc()
                .to_i64()
                .ok_or_else(|| MarketDataError::malformed(format!("timestamp {ts} out of range")))?;
            let price = required("grapthData[].1", Some(price))?;
            Ok(ChartPoint::line(timestamp, price, None))
        })
        .collect()
}

fn nse_daily_points(raw: &NseHistorical) -> Result<Vec<ChartPoint>> {
    raw.data.iter().map(nse_candle).collect()
}

fn nse_candle(c: &NseCandle) -> Result<ChartPoint> {
    let raw_date = c
        .timestamp
        .as_deref()
        .ok_or_else(|| MarketDataError::malformed("NSE candle has no CH_TIMESTAMP"))?;
    let date = candle_date(raw_date)?;
    let close = required("CH_CLOSING_PRICE", c.close.as_ref())?;
    let open = optional(c.open.as_ref())?.unwrap_or(close);
    // a missing bound only has to cover the prices that were sent
    Ok(ChartPoint {
        timestamp: ist_midnight_millis(date),
        open,
        high: optional(c.high.as_ref())?.unwrap_or(open.max(close)),
        low: optional(c.low.as_ref())?.unwrap_or(open.min(close)),
        close,
        volume: optional(c.volume.as_ref())?,
    })
}

/// NSE sends either a bare date or an RFC 3339 instant at IST midnight
/// expressed in UTC (`2026-10-15T18:30:00.000+00:00`).
fn candle_date(raw: &str) -> Result<NaiveDate> {
    if raw.contains('T') {
        let instant = DateTime::parse_from_rfc3339(raw.trim())
            .map_err(|_| MarketDataError::malformed(format!("unrecognised timestamp '{raw}'")))?;
        return Ok(instant.with_timezone(&parse::ist()).date_naive());
    }
    parse::parse_date(raw, &DATE_FORMATS)
}

fn bse_points(raw: &BseChart) -> Result<Vec<ChartPoint>> {
    let Some(data) = raw.data.as_deref().map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(Vec::new());
    };
    let entries: Vec<BseChartPoint> = serde_json::from_str(data)
        .map_err(|e| MarketDataError::malformed(format!("BSE chart Data is not a JSON array: {e}")))?;
    entries
        .iter()
        .map(|p| {
            let dttm = p
                .dttm
                .as_deref()
                .ok_or_else(|| MarketDataError::malformed("BSE chart point has no dttm"))?;
            let at = parse::parse_ist_datetime(dttm, &BSE_DTTM_FORMATS)?;
            let price = required("vale1", p.vale1.as_ref())?;
            Ok(ChartPoint::line(
                at.timestamp_millis(),
                price,
                optional(p.vole.as_ref())?,
            ))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Historical report
// ---------------------------------------------------------------------------

/// Normalize the historical report HTML into rows, oldest first.
///
/// Columns: Date, Open, High, Low, Close, Volume, Trade value, No. of trades.
/// The last three may be missing.
pub fn historical(raw: &RawReport) -> Result<Vec<HistoricalRow>> {
    let body = raw.0.trim();
    // admin-ajax answers "-1" on a failed nonce check and "0" for an unknown action
    if body == "-1" || body == "0" {
        return Err(MarketDataError::UpstreamRejected {
            provider: "report",
            status: reqwest::StatusCode::FORBIDDEN,
            body: body.to_owned(),
        });
    }
    if !html::has_table(body) {
        return Err(MarketDataError::malformed(
            "historical report response contains no table",
        ));
    }

    let mut rows = html::data_rows(body)
        .iter()
        .map(|cells| report_row(cells))
        .collect::<Result<Vec<_>>>()?;
    if rows.is_empty() && html::has_data_cells(body) {
        return Err(MarketDataError::malformed(
            "historical report has data cells outside any row",
        ));
    }
    rows.sort_by_key(|r| r.date);
    Ok(rows)
}

fn report_row(cells: &[String]) -> Result<HistoricalRow> {
    if cells.len() < 5 {
        return Err(MarketDataError::malformed(format!(
            "historical row has {} cells, expected at least 5",
            cells.len()
        )));
    }
    let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");
    let price = |i: usize, name: &str| {
        parse_decimal(cell(i))?
            .ok_or_else(|| MarketDataError::malformed(format!("historical row has no {name}")))
    };

    let trades = parse_decimal(cell(7))?
        .map(|t| {
            t.to_u64()
                .ok_or_else(|| MarketDataError::malformed(format!("trade count {t} out of range")))
        })
        .transpose()?;

    Ok(HistoricalRow {
        date: parse::parse_date(cell(0), &DATE_FORMATS)?,
        open: price(1, "open")?,
        high: price(2, "high")?,
        low: price(3, "low")?,
        close: price(4, "close")?,
        volume: parse_decimal(cell(5))?,
        trade_value: parse_decimal(cell(6))?,
        trades,
    })
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn required(field: &str, raw: Option<&RawNumber>) -> Result<Decimal> {
    optional(raw)?.ok_or_else(|| MarketDataError::malformed(format!("missing required field {field}")))
}

fn optional(raw: Option<&RawNumber>) -> Result<Option<Decimal>> {
    match raw {
        Some(n) => parse_decimal(&n.as_text()),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rust_decimal_macros::dec;

    fn fetched() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-16T10:05:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn nse_quote_fixture() -> NseQuote {
        serde_json::from_value(serde_json::json!({
            "info": { "symbol": "RELIANCE" },
            "metadata": { "lastUpdateTime": "16-Oct-2026 15:30:00" },
            "priceInfo": {
                "lastPrice": 412.35,
                "change": -5.01,
                "pChange": -1.2,
                "open": 417.0,
                "previousClose": 417.36,
                "intraDayHighLow": { "min": 410.1, "max": 418.9 },
                "weekHighLow": { "min": "350.00", "max": "498.75" }
            },
            "marketDeptOrderBook": {
                "totalTradedVolume": "12,34,567",
                "bid": [{ "price": 412.3, "quantity": 10 }],
                "ask": [{ "price": 0, "quantity": 0 }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn nse_quote_matches_fixture() {
        let raw = RawQuote::Nse(nse_quote_fixture());
        let q = quote(Exchange::NSE, "IGNORED", &raw, fetched()).unwrap();
        let expected = Quote {
            exchange: Exchange::NSE,
            symbol: "RELIANCE".into(),
            last: dec!(412.35),
            bid: Some(dec!(412.3)),
            offer: None,
            change: Some(dec!(-5.01)),
            percent_change: dec!(-1.2),
            open: Some(dec!(417.0)),
            previous_close: Some(dec!(417.36)),
            day_high: Some(dec!(418.9)),
            day_low: Some(dec!(410.1)),
            week52_high: Some(dec!(498.75)),
            week52_low: Some(dec!(350.00)),
            volume: Some(dec!(1234567)),
            as_of: DateTime::parse_from_rfc3339("2026-10-16T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        assert_eq!(q, expected);
    }

    #[test]
    fn nse_quote_without_last_price_is_malformed() {
        let mut fixture = nse_quote_fixture();
        if let Some(p) = fixture.price_info.as_mut() {
            p.last_price = None;
        }
        let err = quote(Exchange::NSE, "RELIANCE", &RawQuote::Nse(fixture), fetched()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUpstreamData);
    }

    #[test]
    fn bse_quote_matches_fixture() {
        let raw: BseQuote = serde_json::from_value(serde_json::json!({
            "Header": {
                "PrevClose": "417.30",
                "Open": "416.00",
                "High": "419.95",
                "Low": "410.00",
                "LTP": "412.40",
                "Ason": "16 Oct 2026 | 16:00"
            },
            "CurrRate": { "LTP": "412.40", "Chg": "-4.90", "PcChg": "-1.17" }
        }))
        .unwrap();
        let q = quote(Exchange::BSE, "500325", &RawQuote::Bse(raw), fetched()).unwrap();
        assert_eq!(q.last, dec!(412.40));
        assert_eq!(q.change, Some(dec!(-4.90)));
        assert_eq!(q.percent_change, dec!(-1.17));
        assert_eq!(q.day_high, Some(dec!(419.95)));
        assert_eq!(q.volume, None);
        assert_eq!(q.as_of.to_rfc3339(), "2026-10-16T10:30:00+00:00");
    }

    #[test]
    fn bse_quote_derives_missing_percent() {
        let raw: BseQuote = serde_json::from_value(serde_json::json!({
            "Header": { "PrevClose": "400.00" },
            "CurrRate": { "LTP": "410.00" }
        }))
        .unwrap();
        let q = quote(Exchange::BSE, "500325", &RawQuote::Bse(raw), fetched()).unwrap();
        assert_eq!(q.percent_change, dec!(2.50));
        assert_eq!(q.as_of, fetched());
    }

    #[test]
    fn bse_quote_without_any_price_is_malformed() {
        let raw: BseQuote = serde_json::from_value(serde_json::json!({ "Header": {} })).unwrap();
        let err = quote(Exchange::BSE, "500325", &RawQuote::Bse(raw), fetched()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUpstreamData);
    }

    #[test]
    fn nse_intraday_sorted_and_deduped() {
        let raw: NseIntraday = serde_json::from_value(serde_json::json!({
            "grapthData": [[1760586360000i64, 412.1], [1760586300000i64, 411.0], [1760586360000i64, 412.2]]
        }))
        .unwrap();
        let series = chart(Exchange::NSE, ChartRange::Today, &RawChart::NseIntraday(raw)).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.is_strictly_increasing());
        assert_eq!(series.points[1].close, dec!(412.2));
        assert_eq!(series.points[0].volume, None);
    }

    #[test]
    fn nse_daily_candle_without_close_is_malformed() {
        let raw: NseHistorical = serde_json::from_value(serde_json::json!({
            "data": [{ "CH_TIMESTAMP": "2026-10-15", "CH_OPENING_PRICE": 410 }]
        }))
        .unwrap();
        let err = chart(Exchange::NSE, ChartRange::OneMonth, &RawChart::NseDaily(raw)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUpstreamData);
    }

    #[test]
    fn nse_daily_accepts_rfc3339_dates() {
        let raw: NseHistorical = serde_json::from_value(serde_json::json!({
            "data": [{
                "CH_TIMESTAMP": "2026-10-15T18:30:00.000+00:00",
                "CH_OPENING_PRICE": 410, "CH_TRADE_HIGH_PRICE": 415,
                "CH_TRADE_LOW_PRICE": 405, "CH_CLOSING_PRICE": 412,
                "CH_TOT_TRADED_QTY": 1000
            }]
        }))
        .unwrap();
        let series = chart(Exchange::NSE, ChartRange::OneMonth, &RawChart::NseDaily(raw)).unwrap();
        let expected = ist_midnight_millis(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(series.points[0].timestamp, expected);
    }

    #[test]
    fn nse_missing_bounds_cover_open_and_close() {
        let raw: NseHistorical = serde_json::from_value(serde_json::json!({
            "data": [
                { "CH_TIMESTAMP": "2026-10-15", "CH_OPENING_PRICE": 420, "CH_CLOSING_PRICE": 412 },
                { "CH_TIMESTAMP": "2026-10-16", "CH_OPENING_PRICE": 405, "CH_CLOSING_PRICE": 412,
                  "CH_TRADE_LOW_PRICE": 401 }
            ]
        }))
        .unwrap();
        let series = chart(Exchange::NSE, ChartRange::OneMonth, &RawChart::NseDaily(raw)).unwrap();
        assert_eq!(series.points[0].high, dec!(420));
        assert_eq!(series.points[0].low, dec!(412));
        assert_eq!(series.points[1].high, dec!(412));
        assert_eq!(series.points[1].low, dec!(401));
    }

    #[test]
    fn inconsistent_ohlc_rejected() {
        let raw: NseHistorical = serde_json::from_value(serde_json::json!({
            "data": [{
                "CH_TIMESTAMP": "2026-10-15", "CH_OPENING_PRICE": 410,
                "CH_TRADE_HIGH_PRICE": 405, "CH_TRADE_LOW_PRICE": 415, "CH_CLOSING_PRICE": 412
            }]
        }))
        .unwrap();
        assert!(chart(Exchange::NSE, ChartRange::OneMonth, &RawChart::NseDaily(raw)).is_err());
    }

    #[test]
    fn bse_chart_decodes_embedded_json() {
        let data = r#"[{"dttm":"Fri Oct 16 2026 09:16:00","vale1":412.5,"vole":1500},
                      {"dttm":"Fri Oct 16 2026 09:15:00","vale1":"412.00","vole":""}]"#;
        let raw = BseChart {
            data: Some(data.to_owned()),
        };
        let series = chart(Exchange::BSE, ChartRange::Today, &RawChart::Bse(raw)).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points[0].close, dec!(412.00));
        assert_eq!(series.points[0].volume, None);
        assert_eq!(series.points[1].volume, Some(dec!(1500)));
    }

    #[test]
    fn bse_chart_garbage_data_is_malformed() {
        let raw = BseChart {
            data: Some("not json".into()),
        };
        let err = chart(Exchange::BSE, ChartRange::OneMonth, &RawChart::Bse(raw)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUpstreamData);
    }

    #[test]
    fn empty_bse_chart_is_empty_series() {
        let series = chart(
            Exchange::BSE,
            ChartRange::Today,
            &RawChart::Bse(BseChart { data: None }),
        )
        .unwrap();
        assert!(series.is_empty());
    }

    const REPORT: &str = r#"
        <table>
          <tr><th>Date</th><th>Open</th><th>High</th><th>Low</th><th>Close</th>
              <th>No. of Shares</th><th>Turnover</th><th>No. of Trades</th></tr>
          <tr><td>16-Oct-2026</td><td>417.00</td><td>418.90</td><td>410.10</td><td>412.35</td>
              <td>12,34,567</td><td>50,91,23,456.70</td><td>45,210</td></tr>
          <tr><td>15-Oct-2026</td><td>415.00</td><td>419.00</td><td>414.00</td><td>417.36</td>
              <td>9,87,654</td><td>-</td><td></td></tr>
        </table>"#;

    #[test]
    fn report_rows_oldest_first() {
        let rows = historical(&RawReport(REPORT.to_owned())).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        assert_eq!(rows[0].trade_value, None);
        assert_eq!(rows[0].trades, None);
        assert_eq!(
            rows[1],
            HistoricalRow {
                date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
                open: dec!(417.00),
                high: dec!(418.90),
                low: dec!(410.10),
                close: dec!(412.35),
                volume: Some(dec!(1234567)),
                trade_value: Some(dec!(509123456.70)),
                trades: Some(45210),
            }
        );
    }

    #[test]
    fn report_rows_without_closing_tags() {
        let html = "<table>\
            <tr><th>Date<th>Open<th>High<th>Low<th>Close\
            <tr><td>16-Oct-2026<td>417.00<td>418.90<td>410.10<td>412.35<td>12,34,567\
            <tr><td>15-Oct-2026<td>415.00<td>419.00<td>414.00<td>417.36\
            </table>";
        let rows = historical(&RawReport(html.into())).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        assert_eq!(rows[1].close, dec!(412.35));
        assert_eq!(rows[1].volume, Some(dec!(1234567)));
    }

    #[test]
    fn report_cells_without_rows_are_malformed() {
        let html = "<table><td>16-Oct-2026</td><td>417.00</td></table>";
        let err = historical(&RawReport(html.into())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUpstreamData);
    }

    #[test]
    fn report_with_header_only_is_empty() {
        let html = "<table><tr><th>Date</th><th>Close</th></tr></table>";
        assert!(historical(&RawReport(html.into())).unwrap().is_empty());
    }

    #[test]
    fn report_two_digit_year_is_malformed() {
        let html = "<table><tr><td>16-Oct-26</td><td>1</td><td>1</td><td>1</td><td>1</td></tr></table>";
        let err = historical(&RawReport(html.into())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUpstreamData);
    }

    #[test]
    fn report_nonce_failure_is_rejected() {
        let err = historical(&RawReport("-1".into())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamRejected);
    }

    #[test]
    fn report_without_table_is_malformed() {
        let err = historical(&RawReport("<p>maintenance</p>".into())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedUpstreamData);
    }
}
