//! Ollama backend: HTTP client for a local text-generation endpoint
//!
//! The oracle contract is a plain generate API: one prompt in, free text
//! out. Everything structured about the exchange (the category list, the
//! strict-JSON instruction, response extraction) lives on our side.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parsing::parse_batch_response;
use super::types::AiCategorization;
use super::AiBackend;
use crate::error::Result;
use crate::models::{Category, RawTransaction};

#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create from `OLLAMA_HOST` / `OLLAMA_MODEL` environment variables
    ///
    /// Returns None when no host is configured; the pipeline then stays on
    /// rule-based categorization.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }
}

/// Request to the generate API
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response from the generate API
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Render the categorization prompt for one batch
pub(crate) fn build_prompt(batch: &[RawTransaction]) -> String {
    let categories = Category::ALL
        .iter()
        .map(|c| format!("- {}: {} ({})", c.as_str(), c.label(), c.description()))
        .collect::<Vec<_>>()
        .join("\n");

    let transaction_list = batch
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "{}. Date: {}, Amount: ${:.2}, Description: \"{}\"",
                i + 1,
                t.date,
                t.amount,
                t.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a financial transaction categorizer. Analyze these bank transactions and categorize each one.\n\n\
         Available categories:\n{categories}\n\n\
         Transactions to categorize:\n{transaction_list}\n\n\
         For each transaction, respond with a JSON array where each element has:\n\
         - index: the transaction number (1-based)\n\
         - category: one of the category keys listed above\n\
         - subcategory: a specific subcategory (e.g., \"Fast Food\" for dining, \"Gas\" for transportation)\n\
         - confidence: 0.0-1.0 how confident you are\n\
         - merchant: the merchant name if identifiable (null if unclear)\n\
         - isRecurring: true/false if this appears to be a recurring payment\n\
         - notes: any relevant notes (null if none)\n\n\
         Important:\n\
         - Income transactions (positive amounts) should be categorized as \"income\"\n\
         - Look for subscription/recurring patterns\n\
         - Be specific with subcategories\n\
         - Use \"other\" only as a last resort\n\n\
         Respond ONLY with valid JSON array, no other text."
    )
}

#[async_trait]
impl AiBackend for OllamaBackend {
    async fn categorize_batch(
        &self,
        batch: &[RawTransaction],
    ) -> Result<Vec<Option<AiCategorization>>> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: build_prompt(batch),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: GenerateResponse = response.json().await?;
        debug!("Oracle response: {}", body.response);

        parse_batch_response(&body.response, batch.len())
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_prompt_contains_contract() {
        let batch = vec![RawTransaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            description: "STARBUCKS STORE #123".to_string(),
            amount: dec!(-5.75),
            balance: None,
            kind: None,
        }];

        let prompt = build_prompt(&batch);
        // Every category key with its label and description
        assert!(prompt.contains("- dining: Dining Out (Restaurants, takeout, coffee)"));
        assert!(prompt.contains("- personal_care: Personal Care"));
        // 1-based transaction listing
        assert!(prompt.contains("1. Date: 2024-01-05, Amount: $-5.75, Description: \"STARBUCKS STORE #123\""));
        // Strict-JSON instruction
        assert!(prompt.contains("Respond ONLY with valid JSON array"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = OllamaBackend::new("http://localhost:11434/", "llama3.2");
        assert_eq!(backend.host(), "http://localhost:11434");
        assert_eq!(backend.model(), "llama3.2");
    }
}
