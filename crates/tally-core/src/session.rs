//! Explicit application state over the pipeline stages
//!
//! Consumers (a budgeting wizard, a CLI) own one of these instead of a
//! global store: statements in, transactions and analysis out. No I/O, no
//! persistence; keeping the data across sessions is the consumer's job.

use std::collections::HashSet;

use crate::ai::{self, AiClient};
use crate::analyze::{analyze_spending, SpendingAnalysis};
use crate::categorize::{categorize_transaction, update_category};
use crate::detect::detect_recurring;
use crate::import::parse_statement;
use crate::merge::{dedup_hash, merge_transactions};
use crate::models::{Category, CategorizedTransaction, ParseResult, RawTransaction};

#[derive(Debug, Clone, Default)]
pub struct Session {
    raw_transactions: Vec<RawTransaction>,
    categorized: Vec<CategorizedTransaction>,
    analysis: Option<SpendingAnalysis>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one statement file and merge it into the accumulated set
    ///
    /// Failed files leave the session untouched; the returned `ParseResult`
    /// carries the reasons either way.
    pub fn ingest(&mut self, bytes: &[u8], filename: &str) -> ParseResult {
        let result = parse_statement(bytes, filename);
        if result.success {
            self.raw_transactions = merge_transactions(
                std::mem::take(&mut self.raw_transactions),
                result.transactions.clone(),
            );
            self.analysis = None;
        }
        result
    }

    /// Rule-categorize raw rows that have no categorized counterpart yet
    ///
    /// Existing rows keep their ids and any user overrides; recurrence flags
    /// are refreshed over the whole set afterwards.
    pub fn categorize(&mut self) {
        for txn in self.uncategorized_rows() {
            self.categorized.push(categorize_transaction(&txn));
        }
        detect_recurring(&mut self.categorized);
        self.analysis = None;
    }

    /// Like `categorize`, but new rows go through the oracle (rules as the
    /// per-batch fallback)
    pub async fn categorize_with(&mut self, client: &AiClient) {
        let fresh = self.uncategorized_rows();
        if !fresh.is_empty() {
            let categorized = ai::categorize_with_oracle(client, &fresh).await;
            self.categorized.extend(categorized);
        }
        detect_recurring(&mut self.categorized);
        self.analysis = None;
    }

    /// Apply a user's category edit; pins confidence and blocks automated
    /// passes from changing the row again
    pub fn set_category(&mut self, id: &str, category: Category, subcategory: &str) -> bool {
        let updated = update_category(&mut self.categorized, id, category, subcategory);
        if updated {
            self.analysis = None;
        }
        updated
    }

    pub fn raw_transactions(&self) -> &[RawTransaction] {
        &self.raw_transactions
    }

    pub fn transactions(&self) -> &[CategorizedTransaction] {
        &self.categorized
    }

    /// The current analysis, recomputed only when inputs changed
    pub fn analysis(&mut self) -> &SpendingAnalysis {
        self.analysis
            .get_or_insert_with(|| analyze_spending(&self.categorized))
    }

    /// Drop everything
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn uncategorized_rows(&self) -> Vec<RawTransaction> {
        let known: HashSet<String> = self
            .categorized
            .iter()
            .map(|t| dedup_hash(t.date, t.amount, &t.description))
            .collect();

        self.raw_transactions
            .iter()
            .filter(|t| !known.contains(&dedup_hash(t.date, t.amount, &t.description)))
            .cloned()
            .collect()
    }
}
