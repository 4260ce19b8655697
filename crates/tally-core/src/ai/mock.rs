//! Mock oracle for tests
//!
//! Deterministic answers for well-known merchants, plus switches to simulate
//! the failure modes the pipeline has to absorb.

use async_trait::async_trait;

use super::types::AiCategorization;
use super::AiBackend;
use crate::error::{Error, Result};
use crate::models::{Category, RawTransaction};

#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check reports available
    pub healthy: bool,
    /// When set, any batch containing this description substring errors,
    /// simulating a transport/parse failure for that batch only
    pub fail_marker: Option<String>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            healthy: true,
            fail_marker: None,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            fail_marker: None,
        }
    }

    /// A backend that fails every batch containing `marker`
    pub fn failing_on(marker: &str) -> Self {
        Self {
            healthy: true,
            fail_marker: Some(marker.to_string()),
        }
    }
}

#[async_trait]
impl AiBackend for MockBackend {
    async fn categorize_batch(
        &self,
        batch: &[RawTransaction],
    ) -> Result<Vec<Option<AiCategorization>>> {
        if let Some(marker) = &self.fail_marker {
            if batch.iter().any(|t| t.description.contains(marker)) {
                return Err(Error::InvalidData("mock oracle failure".to_string()));
            }
        }

        Ok(batch
            .iter()
            .map(|t| {
                let desc = t.description.to_uppercase();
                let (category, subcategory, merchant, is_recurring) =
                    if desc.contains("NETFLIX") {
                        (Category::Subscriptions, "Streaming", Some("Netflix"), true)
                    } else if desc.contains("SPOTIFY") {
                        (Category::Subscriptions, "Music", Some("Spotify"), true)
                    } else if desc.contains("STARBUCKS") {
                        (Category::Dining, "Coffee", Some("Starbucks"), false)
                    } else if desc.contains("PAYROLL") {
                        (Category::Income, "Salary", None, false)
                    } else if desc.contains("UBER") {
                        (Category::Transportation, "Rideshare", Some("Uber"), false)
                    } else if desc.contains("WHOLE FOODS") {
                        (Category::Groceries, "Supermarket", Some("Whole Foods"), false)
                    } else {
                        (Category::Other, "Uncategorized", None, false)
                    };

                Some(AiCategorization {
                    category,
                    subcategory: subcategory.to_string(),
                    confidence: 0.9,
                    merchant: merchant.map(str::to_string),
                    is_recurring,
                    notes: None,
                })
            })
            .collect())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://local"
    }
}
