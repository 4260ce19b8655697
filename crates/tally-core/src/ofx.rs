//! OFX/QFX markup path
//!
//! OFX exports are SGML-ish: tags are rarely closed and structure is loose,
//! so this is a tag scan, not an XML parse. Blocks missing a posted date or
//! an amount are skipped silently; the format is assumed well-formed and a
//! partial block is not worth a diagnostic.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{ParseResult, RawTransaction, TxnKind};

static STMTTRN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<STMTTRN>(.*?)</STMTTRN>").expect("valid regex"));
static DTPOSTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<DTPOSTED>\s*(\d{8})").expect("valid regex"));
static TRNAMT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<TRNAMT>\s*([-\d.]+)").expect("valid regex"));
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<NAME>([^<]+)").expect("valid regex"));
static MEMO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<MEMO>([^<]+)").expect("valid regex"));
static TRNTYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<TRNTYPE>([^<]+)").expect("valid regex"));
static ORG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<ORG>([^<]+)").expect("valid regex"));

/// Parse OFX/QFX markup content
pub fn parse_ofx(content: &str) -> ParseResult {
    let bank_detected = ORG_RE
        .captures(content)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty());

    let mut transactions = Vec::new();

    for block_caps in STMTTRN_RE.captures_iter(content) {
        let block = &block_caps[1];

        let Some(date) = DTPOSTED_RE
            .captures(block)
            .and_then(|c| parse_posted_date(&c[1]))
        else {
            continue;
        };

        let Some(amount) = TRNAMT_RE
            .captures(block)
            .and_then(|c| Decimal::from_str(&c[1]).ok())
        else {
            continue;
        };
        if amount.is_zero() {
            continue;
        }

        // NAME is preferred; MEMO is the fallback some banks use instead
        let description = NAME_RE
            .captures(block)
            .or_else(|| MEMO_RE.captures(block))
            .map(|c| c[1].trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unknown Transaction".to_string());

        let kind = match TRNTYPE_RE.captures(block) {
            Some(c) if c[1].trim().eq_ignore_ascii_case("credit") => TxnKind::Credit,
            Some(_) => TxnKind::Debit,
            None if amount >= Decimal::ZERO => TxnKind::Credit,
            None => TxnKind::Debit,
        };

        transactions.push(RawTransaction {
            date,
            description,
            amount,
            balance: None,
            kind: Some(kind),
        });
    }

    transactions.sort_by_key(|t| t.date);

    debug!(count = transactions.len(), "Parsed OFX statement");

    let success = !transactions.is_empty();
    let errors = if success {
        Vec::new()
    } else {
        vec!["No transactions found in OFX file".to_string()]
    };

    ParseResult {
        success,
        transactions,
        errors,
        bank_detected,
    }
}

/// `DTPOSTED` carries YYYYMMDD, sometimes with a time suffix the regex drops
fn parse_posted_date(digits: &str) -> Option<NaiveDate> {
    let year: i32 = digits.get(0..4)?.parse().ok()?;
    let month: u32 = digits.get(4..6)?.parse().ok()?;
    let day: u32 = digits.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE_OFX: &str = r#"OFXHEADER:100
DATA:OFXSGML
<OFX>
<SIGNONMSGSRSV1>
<SONRS>
<FI>
<ORG>First Example Bank
<FID>1234
</FI>
</SONRS>
</SIGNONMSGSRSV1>
<BANKMSGSRSV1>
<STMTTRNRS>
<STMTRS>
<BANKTRANLIST>
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20240105
<TRNAMT>-5.75
<NAME>STARBUCKS STORE #123
</STMTTRN>
<STMTTRN>
<TRNTYPE>CREDIT
<DTPOSTED>20240112
<TRNAMT>2500.00
<NAME>PAYROLL DEPOSIT
</STMTTRN>
</BANKTRANLIST>
</STMTRS>
</STMTTRNRS>
</BANKMSGSRSV1>
</OFX>"#;

    #[test]
    fn test_parse_ofx() {
        let result = parse_ofx(SAMPLE_OFX);
        assert!(result.success);
        assert_eq!(result.bank_detected, Some("First Example Bank".to_string()));
        assert_eq!(result.transactions.len(), 2);

        let first = &result.transactions[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(first.description, "STARBUCKS STORE #123");
        assert_eq!(first.amount, dec!(-5.75));
        assert_eq!(first.kind, Some(TxnKind::Debit));

        assert_eq!(result.transactions[1].kind, Some(TxnKind::Credit));
    }

    #[test]
    fn test_block_missing_amount_is_skipped() {
        let content = r#"<OFX>
<STMTTRN>
<DTPOSTED>20240105
<NAME>NO AMOUNT HERE
</STMTTRN>
<STMTTRN>
<DTPOSTED>20240106
<TRNAMT>-9.99
<NAME>VALID ONE
</STMTTRN>
</OFX>"#;

        let result = parse_ofx(content);
        assert!(result.success);
        assert_eq!(result.transactions.len(), 1);
        assert_eq!(result.transactions[0].description, "VALID ONE");
        // Silent skip: not counted as a file error
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_memo_fallback_for_description() {
        let content = r#"<STMTTRN>
<DTPOSTED>20240105
<TRNAMT>-1.00
<MEMO>MEMO ONLY MERCHANT
</STMTTRN>"#;

        let result = parse_ofx(content);
        assert_eq!(result.transactions[0].description, "MEMO ONLY MERCHANT");
    }

    #[test]
    fn test_missing_type_uses_sign() {
        let content = r#"<STMTTRN>
<DTPOSTED>20240105
<TRNAMT>42.00
<NAME>UNTAGGED CREDIT
</STMTTRN>"#;

        let result = parse_ofx(content);
        assert_eq!(result.transactions[0].kind, Some(TxnKind::Credit));
    }

    #[test]
    fn test_empty_file_is_single_error() {
        let result = parse_ofx("<OFX></OFX>");
        assert!(!result.success);
        assert_eq!(
            result.errors,
            vec!["No transactions found in OFX file".to_string()]
        );
    }

    #[test]
    fn test_dtposted_with_time_suffix() {
        let content = r#"<STMTTRN>
<DTPOSTED>20240105120000[0:GMT]
<TRNAMT>-3.00
<NAME>TIMESTAMPED
</STMTTRN>"#;

        let result = parse_ofx(content);
        assert_eq!(
            result.transactions[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
    }
}
