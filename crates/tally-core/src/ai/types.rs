//! Oracle response types
//!
//! Backend-agnostic: every backend returns these regardless of transport.

use crate::models::Category;

/// One transaction's categorization as judged by the oracle
#[derive(Debug, Clone, PartialEq)]
pub struct AiCategorization {
    pub category: Category,
    /// Always non-empty; a blank answer degrades to "Uncategorized"
    pub subcategory: String,
    /// Clamped to [0, 1]
    pub confidence: f64,
    pub merchant: Option<String>,
    pub is_recurring: bool,
    pub notes: Option<String>,
}
