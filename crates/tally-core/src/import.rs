//! Statement parsing: format dispatch, bank sniffing, delimited-text path
//!
//! Column roles are inferred from header names rather than fixed per-bank
//! layouts, so exports from banks we have never seen still parse as long as
//! they name their columns recognizably. Rows parse independently; one bad
//! line never sinks the file. Only missing required columns do.

use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{ParseResult, RawTransaction, TxnKind};
use crate::normalize::{parse_amount, parse_date};
use crate::ofx;

/// Per-row diagnostics surfaced in a `ParseResult` are capped at this many
pub const MAX_REPORTED_ERRORS: usize = 10;

// Candidate header names per column role. The first candidate that matches
// any header wins the role; within a candidate, the first matching header
// wins. Matching is on normalized headers (lowercased, punctuation dropped)
// and is a substring test, so "Transaction Date" satisfies "date".
const DATE_COLUMNS: &[&str] = &[
    "date",
    "transaction date",
    "trans date",
    "posting date",
    "posted date",
    "txn date",
    "processed date",
];
const DESCRIPTION_COLUMNS: &[&str] = &[
    "description",
    "memo",
    "transaction description",
    "details",
    "narrative",
    "merchant",
    "payee",
    "name",
    "transaction",
];
const AMOUNT_COLUMNS: &[&str] = &["amount", "transaction amount", "trans amount", "value", "sum"];
const DEBIT_COLUMNS: &[&str] = &[
    "debit",
    "withdrawal",
    "withdrawals",
    "debits",
    "money out",
    "spent",
];
const CREDIT_COLUMNS: &[&str] = &[
    "credit",
    "deposit",
    "deposits",
    "credits",
    "money in",
    "received",
];
const BALANCE_COLUMNS: &[&str] = &[
    "balance",
    "running balance",
    "available balance",
    "ledger balance",
];
const TYPE_COLUMNS: &[&str] = &["type", "transaction type", "trans type"];

/// Institutions recognized by the advisory bank sniff, in match order
const KNOWN_BANKS: &[(&str, &str)] = &[
    ("chase", "Chase"),
    ("bank of america", "Bank of America"),
    ("wells fargo", "Wells Fargo"),
    ("citi", "Citi"),
    ("capital one", "Capital One"),
    ("discover", "Discover"),
    ("amex", "American Express"),
    ("american express", "American Express"),
    ("usaa", "USAA"),
    ("navy federal", "Navy Federal"),
    ("pnc", "PNC"),
    ("td bank", "TD Bank"),
    ("us bank", "US Bank"),
    ("ally", "Ally Bank"),
    ("schwab", "Charles Schwab"),
    ("fidelity", "Fidelity"),
    ("venmo", "Venmo"),
    ("paypal", "PayPal"),
];

/// Where a row's signed amount comes from
#[derive(Clone, Copy)]
enum AmountColumns {
    /// One signed amount column, optionally disambiguated by a type column
    Single(usize),
    /// Separate debit and credit columns, both unsigned
    Split { debit: usize, credit: usize },
}

/// Parse one uploaded statement file
///
/// Format is selected by file extension: `.ofx`/`.qfx` take the markup path,
/// everything else (including unrecognized extensions) is treated as
/// delimited text. Bytes are decoded lossily; parsing is best-effort by
/// design and never panics or errors past this boundary.
pub fn parse_statement(bytes: &[u8], filename: &str) -> ParseResult {
    let content = String::from_utf8_lossy(bytes);
    let name = filename.to_lowercase();

    if name.ends_with(".ofx") || name.ends_with(".qfx") {
        ofx::parse_ofx(&content)
    } else {
        parse_delimited(&content)
    }
}

/// Parse a delimited-text export with a header row
pub fn parse_delimited(content: &str) -> ParseResult {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(|s| s.to_string()).collect(),
        Err(e) => {
            return ParseResult {
                success: false,
                transactions: Vec::new(),
                errors: vec![format!("Unreadable file: {}", e)],
                bank_detected: None,
            }
        }
    };

    let mut rows: Vec<StringRecord> = Vec::new();
    let mut row_errors: Vec<String> = Vec::new();
    for (i, record) in reader.records().enumerate() {
        match record {
            Ok(r) => rows.push(r),
            Err(e) => row_errors.push(format!("Row {}: {}", i + 1, e)),
        }
    }

    if rows.is_empty() {
        return ParseResult {
            success: false,
            transactions: Vec::new(),
            errors: vec!["No data found in file".to_string()],
            bank_detected: None,
        };
    }

    let bank_detected = detect_bank(&headers, &rows);

    let date_col = find_column(&headers, DATE_COLUMNS);
    let desc_col = find_column(&headers, DESCRIPTION_COLUMNS);
    let amount_col = find_column(&headers, AMOUNT_COLUMNS);
    let debit_col = find_column(&headers, DEBIT_COLUMNS);
    let credit_col = find_column(&headers, CREDIT_COLUMNS);
    let balance_col = find_column(&headers, BALANCE_COLUMNS);
    let type_col = find_column(&headers, TYPE_COLUMNS);

    // Required roles: date, description, and a viable amount combination.
    // Missing any of them rejects the whole file, one error per missing role.
    let mut structural_errors = Vec::new();
    if date_col.is_none() {
        structural_errors.push("Could not find a date column".to_string());
    }
    if desc_col.is_none() {
        structural_errors.push("Could not find a description column".to_string());
    }
    let amount_columns = match (amount_col, debit_col, credit_col) {
        (Some(amount), _, _) => Some(AmountColumns::Single(amount)),
        (None, Some(debit), Some(credit)) => Some(AmountColumns::Split { debit, credit }),
        _ => {
            structural_errors.push("Could not find amount columns".to_string());
            None
        }
    };

    let (date_col, desc_col, amount_columns) = match (date_col, desc_col, amount_columns) {
        (Some(d), Some(s), Some(a)) if structural_errors.is_empty() => (d, s, a),
        _ => {
            return ParseResult {
                success: false,
                transactions: Vec::new(),
                errors: structural_errors,
                bank_detected,
            }
        }
    };

    let mut transactions = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let date_str = row.get(date_col).unwrap_or("").trim();
        let Some(date) = parse_date(date_str) else {
            row_errors.push(format!("Row {}: Invalid date \"{}\"", i + 1, date_str));
            continue;
        };

        let description = row.get(desc_col).unwrap_or("").trim().to_string();

        let (amount, kind) = match amount_columns {
            AmountColumns::Single(amount_col) => {
                let amount = parse_amount(row.get(amount_col).unwrap_or(""));
                let kind = match type_col {
                    Some(type_col) => {
                        let type_value = row.get(type_col).unwrap_or("").to_lowercase();
                        if type_value.contains("credit") || type_value.contains("deposit") {
                            TxnKind::Credit
                        } else {
                            TxnKind::Debit
                        }
                    }
                    None if amount >= Decimal::ZERO => TxnKind::Credit,
                    None => TxnKind::Debit,
                };
                (amount, Some(kind))
            }
            AmountColumns::Split { debit, credit } => {
                let debit = parse_amount(row.get(debit).unwrap_or(""));
                let credit = parse_amount(row.get(credit).unwrap_or(""));
                if credit > Decimal::ZERO {
                    (credit, Some(TxnKind::Credit))
                } else if debit > Decimal::ZERO {
                    (-debit.abs(), Some(TxnKind::Debit))
                } else {
                    // Neither side populated: not a transaction
                    (Decimal::ZERO, None)
                }
            }
        };

        // Zero-amount lines are not meaningful transactions
        if amount.is_zero() {
            continue;
        }

        let balance = balance_col.map(|col| parse_amount(row.get(col).unwrap_or("")));

        transactions.push(RawTransaction {
            date,
            description,
            amount,
            balance,
            kind,
        });
    }

    transactions.sort_by_key(|t| t.date);
    row_errors.truncate(MAX_REPORTED_ERRORS);

    debug!(
        count = transactions.len(),
        skipped = row_errors.len(),
        "Parsed delimited statement"
    );

    ParseResult {
        success: !transactions.is_empty(),
        transactions,
        errors: row_errors,
        bank_detected,
    }
}

/// Lowercase, trim, and drop everything but letters, digits, and spaces
fn normalize_header(header: &str) -> String {
    let lowered = header.to_lowercase();
    lowered
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect()
}

fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    for candidate in candidates {
        if let Some(index) = headers
            .iter()
            .position(|h| normalize_header(h).contains(candidate))
        {
            return Some(index);
        }
    }
    None
}

/// Guess the institution from header names and the first few data rows
fn detect_bank(headers: &[String], rows: &[StringRecord]) -> Option<String> {
    let mut haystack = headers.join(" ").to_lowercase();
    for row in rows.iter().take(5) {
        for field in row.iter() {
            haystack.push(' ');
            haystack.push_str(&field.to_lowercase());
        }
    }

    KNOWN_BANKS
        .iter()
        .find(|(pattern, _)| haystack.contains(pattern))
        .map(|(_, name)| (*name).to_string())
}
