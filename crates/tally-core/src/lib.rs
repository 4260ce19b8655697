//! Tally Core Library
//!
//! Bank-statement ingestion and spending analysis:
//! - Multi-format statement parsing (delimited text and OFX/QFX) with
//!   column-role inference and bank sniffing
//! - Cross-upload transaction merge and dedup
//! - Rule-based categorization with an optional AI oracle on top
//! - Recurring-payment detection via interval statistics
//! - Spending aggregation, merchant rankings, and insight generation
//!
//! Everything is pure data in, data out: no storage, no UI, and the only
//! network boundary is the oracle, which always degrades to rules.

pub mod ai;
pub mod analyze;
pub mod categorize;
pub mod detect;
pub mod error;
pub mod import;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod ofx;
pub mod session;

pub use ai::{categorize_with_oracle, recategorize_with_oracle, AiBackend, AiCategorization, AiClient, MockBackend, OllamaBackend};
pub use analyze::{
    analyze_spending, monthly_averages, CategoryBucket, DateRange, Insight, InsightKind,
    MerchantSpend, SpendingAnalysis,
};
pub use categorize::{
    categorize_by_rules, categorize_transaction, categorize_transactions, extract_merchant,
    update_category,
};
pub use detect::detect_recurring;
pub use error::{Error, Result};
pub use import::{parse_delimited, parse_statement};
pub use merge::merge_transactions;
pub use models::{
    Category, CategorizedTransaction, Frequency, ParseResult, RawTransaction, TxnKind,
};
pub use normalize::{parse_amount, parse_date};
pub use ofx::parse_ofx;
pub use session::Session;
