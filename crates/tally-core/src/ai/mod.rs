//! External categorization oracle
//!
//! The oracle is optional and never a correctness dependency: every batch it
//! fails on takes the deterministic rule-based result instead, so a down or
//! misbehaving endpoint degrades the pipeline, never blocks it.
//!
//! # Architecture
//!
//! - `AiBackend` trait: the interface every backend implements
//! - `AiClient` enum: concrete wrapper with Clone + compile-time dispatch
//! - Backends: `OllamaBackend` (HTTP), `MockBackend` (tests)
//!
//! # Configuration
//!
//! Environment variables:
//! - `OLLAMA_HOST`: generate-endpoint URL (unset means no oracle)
//! - `OLLAMA_MODEL`: model name (default: llama3.2)

pub mod mock;
pub mod ollama;
pub mod parsing;
pub mod types;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use types::AiCategorization;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::categorize::{categorize_transaction, extract_merchant};
use crate::error::Result;
use crate::models::{CategorizedTransaction, RawTransaction};

/// Transactions per oracle request
pub const BATCH_SIZE: usize = 50;

/// Interface for oracle backends
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Categorize one batch
    ///
    /// Slots line up with the input; `None` means the oracle's response
    /// skipped that index and the caller should fall back for that row.
    async fn categorize_batch(
        &self,
        batch: &[RawTransaction],
    ) -> Result<Vec<Option<AiCategorization>>>;

    /// Whether the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model name, for logging
    fn model(&self) -> &str;

    /// Host URL, for logging
    fn host(&self) -> &str;
}

/// Concrete oracle client with compile-time dispatch
#[derive(Clone)]
pub enum AiClient {
    Ollama(OllamaBackend),
    Mock(MockBackend),
}

impl AiClient {
    /// Build from environment variables; None when no oracle is configured
    pub fn from_env() -> Option<Self> {
        OllamaBackend::from_env().map(AiClient::Ollama)
    }

    pub fn ollama(host: &str, model: &str) -> Self {
        AiClient::Ollama(OllamaBackend::new(host, model))
    }

    pub fn mock() -> Self {
        AiClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl AiBackend for AiClient {
    async fn categorize_batch(
        &self,
        batch: &[RawTransaction],
    ) -> Result<Vec<Option<AiCategorization>>> {
        match self {
            AiClient::Ollama(backend) => backend.categorize_batch(batch).await,
            AiClient::Mock(backend) => backend.categorize_batch(batch).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AiClient::Ollama(backend) => backend.health_check().await,
            AiClient::Mock(backend) => backend.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AiClient::Ollama(backend) => backend.model(),
            AiClient::Mock(backend) => backend.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AiClient::Ollama(backend) => backend.host(),
            AiClient::Mock(backend) => backend.host(),
        }
    }
}

/// Categorize raw transactions with the oracle, rules as the floor
///
/// Batches are issued sequentially and independently: one failed batch falls
/// back to rule-based results for its transactions and does not stop the
/// batches after it.
pub async fn categorize_with_oracle(
    client: &AiClient,
    raw: &[RawTransaction],
) -> Vec<CategorizedTransaction> {
    let mut out = Vec::with_capacity(raw.len());

    for batch in raw.chunks(BATCH_SIZE) {
        match client.categorize_batch(batch).await {
            Ok(slots) => {
                for (txn, slot) in batch.iter().zip(slots) {
                    match slot {
                        Some(ai) => out.push(apply_oracle(txn, ai)),
                        None => out.push(categorize_transaction(txn)),
                    }
                }
            }
            Err(e) => {
                warn!(
                    batch_size = batch.len(),
                    error = %e,
                    "Oracle batch failed, falling back to rule-based categorization"
                );
                out.extend(batch.iter().map(categorize_transaction));
            }
        }
    }

    debug!(count = out.len(), "Oracle categorization complete");
    out
}

/// Re-run the oracle over an already-categorized set, in place
///
/// Rows with `user_override` set are never submitted or touched. A failed
/// batch leaves its rows exactly as they were (they already carry at least
/// rule-based results).
pub async fn recategorize_with_oracle(
    client: &AiClient,
    transactions: &mut [CategorizedTransaction],
) {
    let pending: Vec<usize> = transactions
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.user_override)
        .map(|(i, _)| i)
        .collect();

    for chunk in pending.chunks(BATCH_SIZE) {
        let batch: Vec<RawTransaction> = chunk.iter().map(|&i| transactions[i].as_raw()).collect();

        match client.categorize_batch(&batch).await {
            Ok(slots) => {
                for (&i, slot) in chunk.iter().zip(slots) {
                    if let Some(ai) = slot {
                        let txn = &mut transactions[i];
                        txn.category = ai.category;
                        txn.subcategory = ai.subcategory;
                        txn.confidence = ai.confidence;
                        if ai.merchant.is_some() {
                            txn.merchant = ai.merchant;
                        }
                        // The oracle may promote to recurring, never demote
                        txn.is_recurring |= ai.is_recurring;
                        if ai.notes.is_some() {
                            txn.notes = ai.notes;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(
                    batch_size = chunk.len(),
                    error = %e,
                    "Oracle batch failed, keeping existing categorization"
                );
            }
        }
    }
}

fn apply_oracle(txn: &RawTransaction, ai: AiCategorization) -> CategorizedTransaction {
    let merchant = ai.merchant.or_else(|| extract_merchant(&txn.description));
    let mut categorized = CategorizedTransaction::from_raw(
        txn.clone(),
        ai.category,
        ai.subcategory,
        ai.confidence,
        merchant,
    );
    categorized.is_recurring = ai.is_recurring;
    categorized.notes = ai.notes;
    categorized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn raw(description: &str, amount: Decimal) -> RawTransaction {
        RawTransaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            description: description.to_string(),
            amount,
            balance: None,
            kind: None,
        }
    }

    #[tokio::test]
    async fn test_oracle_results_applied() {
        let client = AiClient::mock();
        let raws = vec![raw("NETFLIX.COM", dec!(-15.49))];

        let categorized = categorize_with_oracle(&client, &raws).await;
        assert_eq!(categorized[0].category, Category::Subscriptions);
        assert_eq!(categorized[0].confidence, 0.9);
        assert_eq!(categorized[0].merchant, Some("Netflix".to_string()));
        assert!(categorized[0].is_recurring);
    }

    #[tokio::test]
    async fn test_failed_batch_falls_back_to_rules() {
        let client = AiClient::Mock(MockBackend::failing_on("STARBUCKS"));
        let raws: Vec<RawTransaction> = (0..10)
            .map(|i| raw(&format!("STARBUCKS STORE #{}", i), dec!(-5.75)))
            .collect();

        let categorized = categorize_with_oracle(&client, &raws).await;
        assert_eq!(categorized.len(), 10);
        // Rule-based results: dining/Coffee at the table confidence
        for txn in &categorized {
            assert_eq!(txn.category, Category::Dining);
            assert_eq!(txn.subcategory, "Coffee");
            assert_eq!(txn.confidence, 0.85);
        }
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_block_later_batches() {
        // First batch of 50 contains the poison marker; the second does not
        let mut raws: Vec<RawTransaction> = (0..50)
            .map(|i| raw(&format!("POISON ROW {}", i), dec!(-1.00)))
            .collect();
        raws.extend((0..10).map(|i| raw(&format!("NETFLIX.COM {}", i), dec!(-15.49))));

        let client = AiClient::Mock(MockBackend::failing_on("POISON"));
        let categorized = categorize_with_oracle(&client, &raws).await;

        assert_eq!(categorized.len(), 60);
        // Poisoned batch degraded to rules
        assert_eq!(categorized[0].category, Category::Other);
        // Later batch still got oracle answers
        assert_eq!(categorized[50].category, Category::Subscriptions);
        assert_eq!(categorized[50].confidence, 0.9);
    }

    #[tokio::test]
    async fn test_recategorize_preserves_user_override() {
        let raws = vec![
            raw("NETFLIX.COM", dec!(-15.49)),
            raw("STARBUCKS STORE #1", dec!(-5.75)),
        ];
        let mut transactions = crate::categorize::categorize_transactions(&raws);

        let id = transactions[0].id.clone();
        crate::categorize::update_category(
            &mut transactions,
            &id,
            Category::Entertainment,
            "Movie Nights",
        );

        let client = AiClient::mock();
        recategorize_with_oracle(&client, &mut transactions).await;

        // Overridden row untouched
        assert_eq!(transactions[0].category, Category::Entertainment);
        assert_eq!(transactions[0].subcategory, "Movie Nights");
        assert_eq!(transactions[0].confidence, 1.0);
        // Non-overridden row took the oracle result
        assert_eq!(transactions[1].confidence, 0.9);
    }

    #[tokio::test]
    async fn test_recategorize_failure_keeps_existing() {
        let raws = vec![raw("STARBUCKS STORE #1", dec!(-5.75))];
        let mut transactions = crate::categorize::categorize_transactions(&raws);

        let client = AiClient::Mock(MockBackend::failing_on("STARBUCKS"));
        recategorize_with_oracle(&client, &mut transactions).await;

        assert_eq!(transactions[0].category, Category::Dining);
        assert_eq!(transactions[0].confidence, 0.85);
    }
}
