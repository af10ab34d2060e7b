//! Decimal and date parsing for provider-formatted values.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::constants::IST_OFFSET_SECS;
use crate::error::{MarketDataError, Result};

/// Values providers use for "no data".
const PLACEHOLDERS: [&str; 5] = ["", "-", "--", "NA", "N/A"];

/// Currency markers stripped before parsing.
const CURRENCY_MARKERS: [&str; 4] = ["₹", "Rs.", "INR", "$"];

/// Parse a provider-formatted number.
///
/// Accepts thousands separators, a leading `+`/`-`, currency markers and a
/// trailing `%`. Placeholder values (`""`, `"-"`, `"NA"`) yield `Ok(None)`;
/// anything else that is not a number is an error.
pub fn parse_decimal(raw: &str) -> Result<Option<Decimal>> {
    let trimmed = raw.trim();
    if PLACEHOLDERS.iter().any(|p| trimmed.eq_ignore_ascii_case(p)) {
        return Ok(None);
    }

    let mut text = trimmed.to_owned();
    for marker in CURRENCY_MARKERS {
        text = text.replace(marker, "");
    }
    let text: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let text = text.strip_suffix('%').unwrap_or(&text);

    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(not_a_number(raw));
    }

    let value = Decimal::from_str(digits)
        .or_else(|_| Decimal::from_scientific(digits))
        .map_err(|_| not_a_number(raw))?;
    Ok(Some(if negative { -value } else { value }))
}

fn not_a_number(raw: &str) -> MarketDataError {
    MarketDataError::malformed(format!("'{raw}' is not a number"))
}

/// Indian Standard Time.
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).expect("IST offset is within bounds")
}

/// Today's calendar date in IST.
pub fn today_ist() -> NaiveDate {
    Utc::now().with_timezone(&ist()).date_naive()
}

/// Epoch milliseconds of midnight IST on `date`.
pub fn ist_midnight_millis(date: NaiveDate) -> i64 {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    ist_to_utc(midnight).timestamp_millis()
}

fn ist_to_utc(local: NaiveDateTime) -> DateTime<Utc> {
    // fixed offsets have no gaps or folds
    match ist().from_local_datetime(&local) {
        chrono::LocalResult::Single(dt) => dt.with_timezone(&Utc),
        _ => Utc.from_utc_datetime(&local),
    }
}

/// Reject date strings that carry no four-digit year.
///
/// `chrono`'s `%Y` happily reads `"26"` as year 26, so the check runs on the
/// raw text before any format is tried.
pub fn require_four_digit_year(raw: &str) -> Result<()> {
    let has_year = raw
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|tok| tok.len() == 4 && tok.bytes().all(|b| b.is_ascii_digit()));
    if has_year {
        Ok(())
    } else {
        Err(MarketDataError::malformed(format!(
            "date '{raw}' has an ambiguous two-digit year"
        )))
    }
}

/// Parse a calendar date in any of the given formats.
pub fn parse_date(raw: &str, formats: &[&str]) -> Result<NaiveDate> {
    let raw = raw.trim();
    require_four_digit_year(raw)?;
    formats
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .ok_or_else(|| MarketDataError::malformed(format!("unrecognised date '{raw}'")))
}

/// Parse an IST wall-clock timestamp in any of the given formats.
pub fn parse_ist_datetime(raw: &str, formats: &[&str]) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    require_four_digit_year(raw)?;
    formats
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .map(ist_to_utc)
        .ok_or_else(|| MarketDataError::malformed(format!("unrecognised timestamp '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_formatted_numbers() {
        assert_eq!(parse_decimal("2,901.35").unwrap(), Some(dec!(2901.35)));
        assert_eq!(parse_decimal("-1.20%").unwrap(), Some(dec!(-1.20)));
        assert_eq!(parse_decimal("+0.85 %").unwrap(), Some(dec!(0.85)));
        assert_eq!(parse_decimal("₹ 412.35").unwrap(), Some(dec!(412.35)));
        assert_eq!(parse_decimal("Rs. 1,00,000").unwrap(), Some(dec!(100000)));
        assert_eq!(parse_decimal("-₹12.5").unwrap(), Some(dec!(-12.5)));
    }

    #[test]
    fn placeholders_are_absent() {
        assert_eq!(parse_decimal("-").unwrap(), None);
        assert_eq!(parse_decimal("  ").unwrap(), None);
        assert_eq!(parse_decimal("NA").unwrap(), None);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("--5").is_err());
        assert!(parse_decimal("+").is_err());
    }

    #[test]
    fn two_digit_years_rejected() {
        assert!(parse_date("16-Oct-26", &["%d-%b-%y", "%d-%b-%Y"]).is_err());
        assert!(parse_date("16/10/26", &["%d/%m/%Y"]).is_err());
        assert_eq!(
            parse_date("16-Oct-2026", &["%d-%b-%Y"]).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
        );
    }

    #[test]
    fn ist_timestamps_convert_to_utc() {
        let dt = parse_ist_datetime("16-Oct-2026 15:30:00", &["%d-%b-%Y %H:%M:%S"]).unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-10-16T10:00:00+00:00");
    }

    #[test]
    fn midnight_millis() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        // 1970-01-02T00:00+05:30 == 1970-01-01T18:30Z
        assert_eq!(ist_midnight_millis(date), 66_600_000);
    }
}
