//! JSON extraction for oracle responses
//!
//! The oracle is a free-text generator, not a structured-output API, so
//! responses may wrap the JSON payload in prose. Extraction takes the
//! outermost array and tolerates per-item oddities (unknown category names,
//! out-of-range confidences, blank fields) rather than failing the batch.

use serde::Deserialize;

use super::types::AiCategorization;
use crate::error::{Error, Result};
use crate::models::Category;

/// Raw response item, field names per the wire contract (1-based index)
#[derive(Debug, Deserialize)]
struct OracleItem {
    index: i64,
    category: String,
    #[serde(default)]
    subcategory: Option<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    merchant: Option<String>,
    #[serde(default, rename = "isRecurring")]
    is_recurring: bool,
    #[serde(default)]
    notes: Option<String>,
}

/// Parse a batch response into per-transaction slots
///
/// Slots line up with the submitted batch; `None` means the response skipped
/// that index. Errors only when no parseable array exists at all.
pub(crate) fn parse_batch_response(
    response: &str,
    batch_len: usize,
) -> Result<Vec<Option<AiCategorization>>> {
    let response = response.trim();

    let start = response.find('[');
    let end = response.rfind(']');
    let json_str = match (start, end) {
        (Some(s), Some(e)) if s < e => &response[s..=e],
        _ => {
            return Err(Error::InvalidData(format!(
                "No JSON array found in oracle response | Raw: {}",
                truncate_for_log(response)
            )))
        }
    };

    let items: Vec<OracleItem> = serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid JSON from oracle: {} | Raw: {}",
            e,
            truncate_for_log(json_str)
        ))
    })?;

    let mut slots: Vec<Option<AiCategorization>> = vec![None; batch_len];
    for item in items {
        if item.index < 1 || item.index as usize > batch_len {
            continue;
        }
        let slot = item.index as usize - 1;

        slots[slot] = Some(AiCategorization {
            // Unknown category names degrade to the universal fallback
            category: item.category.parse().unwrap_or(Category::Other),
            subcategory: item
                .subcategory
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Uncategorized".to_string()),
            confidence: item.confidence.clamp(0.0, 1.0),
            merchant: item.merchant.filter(|m| !m.trim().is_empty()),
            is_recurring: item.is_recurring,
            notes: item.notes.filter(|n| !n.trim().is_empty()),
        });
    }

    Ok(slots)
}

fn truncate_for_log(s: &str) -> String {
    if s.chars().count() > 200 {
        let head: String = s.chars().take(200).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let response = r#"[{"index": 1, "category": "dining", "subcategory": "Coffee", "confidence": 0.92, "merchant": "Starbucks", "isRecurring": false, "notes": null}]"#;
        let slots = parse_batch_response(response, 1).unwrap();
        let item = slots[0].as_ref().unwrap();
        assert_eq!(item.category, Category::Dining);
        assert_eq!(item.subcategory, "Coffee");
        assert_eq!(item.merchant, Some("Starbucks".to_string()));
        assert!(!item.is_recurring);
    }

    #[test]
    fn test_parse_array_wrapped_in_prose() {
        let response = r#"Here are the categorizations you asked for:

[{"index": 1, "category": "subscriptions", "subcategory": "Streaming", "confidence": 0.95, "merchant": "Netflix", "isRecurring": true, "notes": "streaming service"}]

Let me know if you need anything else!"#;
        let slots = parse_batch_response(response, 1).unwrap();
        let item = slots[0].as_ref().unwrap();
        assert_eq!(item.category, Category::Subscriptions);
        assert!(item.is_recurring);
        assert_eq!(item.notes, Some("streaming service".to_string()));
    }

    #[test]
    fn test_missing_index_leaves_slot_empty() {
        let response = r#"[{"index": 2, "category": "dining", "subcategory": "Coffee", "confidence": 0.9, "merchant": null, "isRecurring": false, "notes": null}]"#;
        let slots = parse_batch_response(response, 3).unwrap();
        assert!(slots[0].is_none());
        assert!(slots[1].is_some());
        assert!(slots[2].is_none());
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let response = r#"[{"index": 0, "category": "dining", "subcategory": "x", "confidence": 0.9, "merchant": null, "isRecurring": false, "notes": null},
                           {"index": 99, "category": "dining", "subcategory": "x", "confidence": 0.9, "merchant": null, "isRecurring": false, "notes": null}]"#;
        let slots = parse_batch_response(response, 2).unwrap();
        assert!(slots.iter().all(|s| s.is_none()));
    }

    #[test]
    fn test_unknown_category_degrades_to_other() {
        let response = r#"[{"index": 1, "category": "cryptocurrency", "subcategory": "Coins", "confidence": 0.8, "merchant": null, "isRecurring": false, "notes": null}]"#;
        let slots = parse_batch_response(response, 1).unwrap();
        assert_eq!(slots[0].as_ref().unwrap().category, Category::Other);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let response = r#"[{"index": 1, "category": "dining", "subcategory": "x", "confidence": 1.7, "merchant": null, "isRecurring": false, "notes": null}]"#;
        let slots = parse_batch_response(response, 1).unwrap();
        assert_eq!(slots[0].as_ref().unwrap().confidence, 1.0);
    }

    #[test]
    fn test_blank_subcategory_degrades() {
        let response = r#"[{"index": 1, "category": "dining", "subcategory": "  ", "confidence": 0.5, "merchant": "", "isRecurring": false, "notes": null}]"#;
        let slots = parse_batch_response(response, 1).unwrap();
        let item = slots[0].as_ref().unwrap();
        assert_eq!(item.subcategory, "Uncategorized");
        assert_eq!(item.merchant, None);
    }

    #[test]
    fn test_no_array_is_an_error() {
        assert!(parse_batch_response("I could not categorize these.", 2).is_err());
        assert!(parse_batch_response("", 2).is_err());
    }

    #[test]
    fn test_malformed_array_is_an_error() {
        assert!(parse_batch_response("[{\"index\": }]", 1).is_err());
    }
}
