//! Fuel quotes and the upstream price/timestamp formats.
//!
//! DGEG reports prices as `"1,699 €/litro"` (comma decimal separator with a
//! unit suffix) and update times as `"YYYY-MM-DD HH:MM"` without a timezone.

use chrono::NaiveDateTime;

use super::error::MalformedDataError;

/// Unit suffix on every upstream price string.
const PRICE_SUFFIX: &str = " €/litro";

/// Format of upstream update timestamps.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The price of one fuel type at one station.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelQuote {
    /// Upstream fuel name, e.g. "Gasóleo simples".
    pub fuel_type: String,
    /// Price in euro per litre.
    pub price: f64,
    /// When the station last reported this price (naive local time).
    pub last_updated_at: NaiveDateTime,
}

/// Parse an upstream price such as `"1,699 €/litro"` into euro per litre.
///
/// # Examples
///
/// ```
/// use fuel_tracker::domain::parse_price;
///
/// assert_eq!(parse_price("1,699 €/litro").unwrap(), 1.699);
/// assert!(parse_price("1,699").is_err());
/// ```
pub fn parse_price(raw: &str) -> Result<f64, MalformedDataError> {
    let invalid = || MalformedDataError::InvalidPrice(raw.to_string());

    let number = raw.strip_suffix(PRICE_SUFFIX).ok_or_else(invalid)?;
    let value: f64 = number.replace(',', ".").parse().map_err(|_| invalid())?;

    if !value.is_finite() {
        return Err(invalid());
    }

    Ok(value)
}

/// Parse an upstream update time in strict `YYYY-MM-DD HH:MM` form.
///
/// # Examples
///
/// ```
/// use fuel_tracker::domain::parse_timestamp;
///
/// let ts = parse_timestamp("2024-03-01 14:05").unwrap();
/// assert_eq!(ts.to_string(), "2024-03-01 14:05:00");
/// assert!(parse_timestamp("01-03-2024").is_err());
/// ```
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, MalformedDataError> {
    let invalid = || MalformedDataError::InvalidTimestamp(raw.to_string());

    // chrono is lenient about padding and whitespace, so check the layout first
    let bytes = raw.as_bytes();
    if bytes.len() != 16 {
        return Err(invalid());
    }
    let layout_ok = bytes.iter().enumerate().all(|(i, &b)| match i {
        4 | 7 => b == b'-',
        10 => b == b' ',
        13 => b == b':',
        _ => b.is_ascii_digit(),
    });
    if !layout_ok {
        return Err(invalid());
    }

    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parse_typical_price() {
        assert_eq!(parse_price("1,699 €/litro").unwrap(), 1.699);
        assert_eq!(parse_price("0,000 €/litro").unwrap(), 0.0);
        assert_eq!(parse_price("12,5 €/litro").unwrap(), 12.5);
    }

    #[test]
    fn price_without_suffix_is_rejected() {
        assert_eq!(
            parse_price("1,699"),
            Err(MalformedDataError::InvalidPrice("1,699".into()))
        );
        assert!(parse_price("1,699 €").is_err());
        assert!(parse_price("1,699 €/Litro").is_err());
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        assert!(parse_price("abc €/litro").is_err());
        assert!(parse_price(" €/litro").is_err());
        assert!(parse_price("1,6,99 €/litro").is_err());
        assert!(parse_price("inf €/litro").is_err());
        assert!(parse_price("NaN €/litro").is_err());
    }

    #[test]
    fn parse_typical_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-01 14:05").unwrap(), expected);
    }

    #[test]
    fn timestamp_in_other_layouts_is_rejected() {
        assert_eq!(
            parse_timestamp("01-03-2024"),
            Err(MalformedDataError::InvalidTimestamp("01-03-2024".into()))
        );
        assert!(parse_timestamp("2024-03-01T14:05").is_err());
        assert!(parse_timestamp("2024-03-01 14:05:00").is_err());
        assert!(parse_timestamp("2024-3-1 14:05").is_err());
        assert!(parse_timestamp("2024-03-01  4:05").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn out_of_range_timestamp_is_rejected() {
        assert!(parse_timestamp("2024-13-01 14:05").is_err());
        assert!(parse_timestamp("2024-02-30 14:05").is_err());
        assert!(parse_timestamp("2024-03-01 24:00").is_err());
    }
}
