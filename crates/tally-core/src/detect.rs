//! Recurring-payment detection
//!
//! Two independent passes:
//! 1. Interval statistics over normalized-description groups catch charges
//!    that already repeat, whatever their wording.
//! 2. A keyword scan catches charges that name their own cadence but have
//!    not repeated often enough to show an interval pattern yet (a brand-new
//!    subscription, for instance).

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::models::{CategorizedTransaction, Frequency};

static EMBEDDED_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}/\d{2}").expect("valid regex"));

/// Keyword patterns marking a charge as recurring without interval evidence
const RECURRING_KEYWORDS: &[&str] = &[
    "monthly",
    "subscription",
    "membership",
    "recurring",
    "autopay",
    "auto pay",
];

/// Grouping key: lowercased description with dates, digits, and extra
/// whitespace removed, truncated to 30 characters
pub(crate) fn normalized_description_key(description: &str) -> String {
    let lowered = description.to_lowercase();
    let without_dates = EMBEDDED_DATE.replace_all(&lowered, "");
    let without_digits: String = without_dates
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .collect();
    let collapsed = without_digits.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(30).collect()
}

/// Classify a mean inter-occurrence gap (in days) into a cadence
fn classify_cadence(mean_gap_days: f64) -> Option<Frequency> {
    match mean_gap_days {
        g if (5.0..=9.0).contains(&g) => Some(Frequency::Weekly),
        g if (12.0..=18.0).contains(&g) => Some(Frequency::Biweekly),
        g if (26.0..=35.0).contains(&g) => Some(Frequency::Monthly),
        g if (85.0..=100.0).contains(&g) => Some(Frequency::Quarterly),
        g if (350.0..=380.0).contains(&g) => Some(Frequency::Yearly),
        _ => None,
    }
}

/// Mark recurring transactions in place
///
/// Only `is_recurring` and `recurring_frequency` are touched; category,
/// subcategory, and confidence stay as the categorizer left them.
pub fn detect_recurring(transactions: &mut [CategorizedTransaction]) {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, txn) in transactions.iter().enumerate() {
        groups
            .entry(normalized_description_key(&txn.description))
            .or_default()
            .push(i);
    }

    let mut interval_marked = 0usize;
    for indices in groups.values() {
        if indices.len() < 2 {
            continue;
        }

        let mut dates: Vec<NaiveDate> = indices.iter().map(|&i| transactions[i].date).collect();
        dates.sort();

        let gaps: Vec<i64> = dates.windows(2).map(|w| (w[1] - w[0]).num_days()).collect();
        if gaps.is_empty() {
            continue;
        }
        let mean_gap = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;

        if let Some(frequency) = classify_cadence(mean_gap) {
            for &i in indices {
                transactions[i].is_recurring = true;
                transactions[i].recurring_frequency = Some(frequency);
                interval_marked += 1;
            }
        }
    }

    // Keyword pass: no interval evidence, so the cadence defaults to monthly
    let mut keyword_marked = 0usize;
    for txn in transactions.iter_mut() {
        if txn.is_recurring {
            continue;
        }
        let desc = txn.description.to_lowercase();
        if RECURRING_KEYWORDS.iter().any(|k| desc.contains(k)) {
            txn.is_recurring = true;
            txn.recurring_frequency = Some(Frequency::Monthly);
            keyword_marked += 1;
        }
    }

    debug!(
        by_interval = interval_marked,
        by_keyword = keyword_marked,
        "Recurrence detection complete"
    );
}
