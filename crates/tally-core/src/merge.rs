//! Cross-upload transaction merge
//!
//! Users upload overlapping exports (the same month from two downloads, a
//! quarter export after a monthly one). The merge drops exact re-exports of
//! lines already seen and keeps everything else.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::models::RawTransaction;

/// Dedup key: exact date, exact amount, first 20 characters of description.
///
/// Coarse on purpose: it catches a bank's literal re-export of the same line,
/// nothing smarter. Two distinct same-day, same-amount charges sharing a
/// 20-character prefix will merge, and a bank that reformats its descriptions
/// between exports will not.
pub(crate) fn dedup_hash(date: NaiveDate, amount: Decimal, description: &str) -> String {
    let prefix: String = description.chars().take(20).collect();
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(amount.normalize().to_string().as_bytes());
    hasher.update(prefix.as_bytes());
    hex::encode(hasher.finalize())
}

/// Merge a new batch into an accumulated set, dropping duplicates
///
/// A new transaction is appended only when its dedup key is not already
/// present. The merged set comes back in ascending date order. Merging a set
/// with itself is a no-op.
pub fn merge_transactions(
    existing: Vec<RawTransaction>,
    incoming: Vec<RawTransaction>,
) -> Vec<RawTransaction> {
    let mut seen: HashSet<String> = existing
        .iter()
        .map(|t| dedup_hash(t.date, t.amount, &t.description))
        .collect();

    let mut merged = existing;
    for txn in incoming {
        if seen.insert(dedup_hash(txn.date, txn.amount, &txn.description)) {
            merged.push(txn);
        }
    }

    merged.sort_by_key(|t| t.date);
    merged
}
