//! Best-effort normalization of locale-formatted amounts and dates
//!
//! The two parsers deliberately fail differently: an unparseable amount
//! becomes zero (the row survives, zero rows are dropped later), while an
//! unparseable date becomes `None` and the caller decides whether that kills
//! the row.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a currency string into an exact decimal
///
/// Strips `$` and thousands separators, reads parenthesized values as
/// negative, and returns zero for anything unparseable. Never fails.
pub fn parse_amount(value: &str) -> Decimal {
    let mut cleaned = value.replace(['$', ','], "").trim().to_string();

    // Accounting notation: (1234.56) means -1234.56
    if cleaned.starts_with('(') && cleaned.ends_with(')') && cleaned.len() > 2 {
        cleaned = format!("-{}", &cleaned[1..cleaned.len() - 1]);
    }

    Decimal::from_str(cleaned.trim()).unwrap_or(Decimal::ZERO)
}

/// Parse a statement date string
///
/// Tries, in order: `MM/DD/YYYY`, `MM/DD/YY`, `YYYY-MM-DD`, `MM-DD-YYYY`,
/// then a handful of generic fallbacks. Returns `None` when nothing matches.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Some(date) = parse_slash_date(value) {
        return Some(date);
    }

    for format in ["%Y-%m-%d", "%m-%d-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    // Generic fallbacks for less common exports
    for format in ["%d/%m/%Y", "%Y/%m/%d", "%b %d, %Y", "%d-%b-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    None
}

/// `MM/DD/YYYY` and `MM/DD/YY` with the statement-export pivot for two-digit
/// years: 50..=99 means 19xx, 00..=49 means 20xx. chrono's `%y` pivots at 69,
/// which is why this is spelled out by hand.
fn parse_slash_date(value: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.split('/').collect();
    if parts.len() != 3 {
        return None;
    }

    let month: u32 = parts[0].trim().parse().ok()?;
    let day: u32 = parts[1].trim().parse().ok()?;
    let year_part = parts[2].trim();
    let mut year: i32 = year_part.parse().ok()?;
    if year_part.len() <= 2 {
        year += if year >= 50 { 1900 } else { 2000 };
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount_plain() {
        assert_eq!(parse_amount("123.45"), dec!(123.45));
        assert_eq!(parse_amount("-123.45"), dec!(-123.45));
    }

    #[test]
    fn test_parse_amount_currency_junk() {
        assert_eq!(parse_amount("$1,234.56"), dec!(1234.56));
        assert_eq!(parse_amount("  $99.00 "), dec!(99.00));
    }

    #[test]
    fn test_parse_amount_parentheses_negative() {
        assert_eq!(parse_amount("(123.45)"), dec!(-123.45));
        assert_eq!(parse_amount("($1,000.00)"), dec!(-1000.00));
    }

    #[test]
    fn test_parse_amount_unparseable_is_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("N/A"), Decimal::ZERO);
        assert_eq!(parse_amount("12.3.4"), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_keeps_two_decimals_exact() {
        assert_eq!(parse_amount("0.10") + parse_amount("0.20"), dec!(0.30));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("01/15/2024"), Some(expected));
        assert_eq!(parse_date("2024-01-15"), Some(expected));
        assert_eq!(parse_date("01-15-2024"), Some(expected));
        assert_eq!(parse_date("1/15/2024"), Some(expected));
    }

    #[test]
    fn test_parse_date_two_digit_year_pivot() {
        assert_eq!(
            parse_date("01/15/49"),
            NaiveDate::from_ymd_opt(2049, 1, 15)
        );
        assert_eq!(
            parse_date("01/15/50"),
            NaiveDate::from_ymd_opt(1950, 1, 15)
        );
        assert_eq!(
            parse_date("01/15/24"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn test_parse_date_generic_fallback() {
        assert_eq!(
            parse_date("25/12/2024"),
            NaiveDate::from_ymd_opt(2024, 12, 25)
        );
        assert_eq!(
            parse_date("Jan 15, 2024"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn test_parse_date_invalid_is_none() {
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("13/45/2024"), None);
        assert_eq!(parse_date(""), None);
    }
}
