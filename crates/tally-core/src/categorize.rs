//! Rule-based categorization and merchant extraction
//!
//! Deterministic and always available: this is the categorization floor the
//! oracle augments and falls back to. The merchant table is ordered data, not
//! control flow; first matching pattern wins, so more specific patterns
//! ("uber eats") must sit above their prefixes ("uber ").

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::models::{Category, CategorizedTransaction, RawTransaction, TxnKind};

/// Confidence assigned to a merchant-table match
const PATTERN_CONFIDENCE: f64 = 0.85;
/// Confidence of the universal fallback
const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Ordered (lowercase substring, category, subcategory) table
const MERCHANT_PATTERNS: &[(&str, Category, &str)] = &[
    // Income
    ("payroll", Category::Income, "Salary"),
    ("direct dep", Category::Income, "Direct Deposit"),
    ("salary", Category::Income, "Salary"),
    ("ach deposit", Category::Income, "Direct Deposit"),
    // Housing
    ("rent", Category::Housing, "Rent"),
    ("mortgage", Category::Housing, "Mortgage"),
    ("hoa", Category::Housing, "HOA Fees"),
    ("zillow", Category::Housing, "Rent"),
    // Utilities
    ("electric", Category::Utilities, "Electric"),
    ("power", Category::Utilities, "Electric"),
    ("gas bill", Category::Utilities, "Gas"),
    ("water bill", Category::Utilities, "Water"),
    ("comcast", Category::Utilities, "Internet"),
    ("xfinity", Category::Utilities, "Internet"),
    ("verizon", Category::Utilities, "Phone/Internet"),
    ("at&t", Category::Utilities, "Phone/Internet"),
    ("t-mobile", Category::Utilities, "Phone"),
    ("sprint", Category::Utilities, "Phone"),
    // Groceries
    ("walmart", Category::Groceries, "Supermarket"),
    ("target", Category::Groceries, "Supermarket"),
    ("kroger", Category::Groceries, "Supermarket"),
    ("safeway", Category::Groceries, "Supermarket"),
    ("whole foods", Category::Groceries, "Supermarket"),
    ("trader joe", Category::Groceries, "Supermarket"),
    ("costco", Category::Groceries, "Warehouse"),
    ("sam's club", Category::Groceries, "Warehouse"),
    ("aldi", Category::Groceries, "Supermarket"),
    ("publix", Category::Groceries, "Supermarket"),
    ("h-e-b", Category::Groceries, "Supermarket"),
    ("wegmans", Category::Groceries, "Supermarket"),
    // Dining
    ("mcdonald", Category::Dining, "Fast Food"),
    ("burger king", Category::Dining, "Fast Food"),
    ("wendy", Category::Dining, "Fast Food"),
    ("taco bell", Category::Dining, "Fast Food"),
    ("chipotle", Category::Dining, "Fast Casual"),
    ("panera", Category::Dining, "Fast Casual"),
    ("starbucks", Category::Dining, "Coffee"),
    ("dunkin", Category::Dining, "Coffee"),
    ("doordash", Category::Dining, "Delivery"),
    ("uber eats", Category::Dining, "Delivery"),
    ("grubhub", Category::Dining, "Delivery"),
    ("postmates", Category::Dining, "Delivery"),
    ("restaurant", Category::Dining, "Restaurant"),
    ("pizza", Category::Dining, "Restaurant"),
    // Transportation
    ("shell", Category::Transportation, "Gas"),
    ("chevron", Category::Transportation, "Gas"),
    ("exxon", Category::Transportation, "Gas"),
    ("bp gas", Category::Transportation, "Gas"),
    ("uber ", Category::Transportation, "Rideshare"),
    ("lyft", Category::Transportation, "Rideshare"),
    ("parking", Category::Transportation, "Parking"),
    ("toll", Category::Transportation, "Tolls"),
    ("ez pass", Category::Transportation, "Tolls"),
    ("car wash", Category::Transportation, "Car Care"),
    ("autozone", Category::Transportation, "Car Parts"),
    // Healthcare
    ("cvs", Category::Healthcare, "Pharmacy"),
    ("walgreens", Category::Healthcare, "Pharmacy"),
    ("pharmacy", Category::Healthcare, "Pharmacy"),
    ("doctor", Category::Healthcare, "Medical"),
    ("hospital", Category::Healthcare, "Medical"),
    ("dental", Category::Healthcare, "Dental"),
    ("medical", Category::Healthcare, "Medical"),
    // Insurance
    ("geico", Category::Insurance, "Auto Insurance"),
    ("state farm", Category::Insurance, "Insurance"),
    ("allstate", Category::Insurance, "Insurance"),
    ("progressive", Category::Insurance, "Auto Insurance"),
    ("insurance", Category::Insurance, "Insurance"),
    // Subscriptions
    ("netflix", Category::Subscriptions, "Streaming"),
    ("hulu", Category::Subscriptions, "Streaming"),
    ("disney+", Category::Subscriptions, "Streaming"),
    ("disney plus", Category::Subscriptions, "Streaming"),
    ("hbo", Category::Subscriptions, "Streaming"),
    ("spotify", Category::Subscriptions, "Music"),
    ("apple music", Category::Subscriptions, "Music"),
    ("amazon prime", Category::Subscriptions, "Amazon Prime"),
    ("youtube premium", Category::Subscriptions, "Streaming"),
    ("gym", Category::Subscriptions, "Fitness"),
    ("planet fitness", Category::Subscriptions, "Fitness"),
    ("equinox", Category::Subscriptions, "Fitness"),
    ("peloton", Category::Subscriptions, "Fitness"),
    // Shopping
    ("amazon", Category::Shopping, "Online Shopping"),
    ("ebay", Category::Shopping, "Online Shopping"),
    ("best buy", Category::Shopping, "Electronics"),
    ("apple store", Category::Shopping, "Electronics"),
    ("home depot", Category::Shopping, "Home Improvement"),
    ("lowes", Category::Shopping, "Home Improvement"),
    ("ikea", Category::Shopping, "Furniture"),
    ("marshalls", Category::Shopping, "Clothing"),
    ("tj maxx", Category::Shopping, "Clothing"),
    ("nordstrom", Category::Shopping, "Clothing"),
    ("macy", Category::Shopping, "Clothing"),
    ("old navy", Category::Shopping, "Clothing"),
    ("gap", Category::Shopping, "Clothing"),
    // Entertainment
    ("amc", Category::Entertainment, "Movies"),
    ("regal", Category::Entertainment, "Movies"),
    ("cinemark", Category::Entertainment, "Movies"),
    ("steam", Category::Entertainment, "Gaming"),
    ("playstation", Category::Entertainment, "Gaming"),
    ("xbox", Category::Entertainment, "Gaming"),
    ("ticketmaster", Category::Entertainment, "Events"),
    ("stubhub", Category::Entertainment, "Events"),
    // Personal care
    ("salon", Category::PersonalCare, "Hair"),
    ("spa", Category::PersonalCare, "Spa"),
    ("ulta", Category::PersonalCare, "Beauty"),
    ("sephora", Category::PersonalCare, "Beauty"),
    // Travel
    ("airline", Category::Travel, "Flights"),
    ("united air", Category::Travel, "Flights"),
    ("delta air", Category::Travel, "Flights"),
    ("american air", Category::Travel, "Flights"),
    ("southwest", Category::Travel, "Flights"),
    ("hotel", Category::Travel, "Lodging"),
    ("marriott", Category::Travel, "Lodging"),
    ("hilton", Category::Travel, "Lodging"),
    ("airbnb", Category::Travel, "Lodging"),
    ("vrbo", Category::Travel, "Lodging"),
    ("expedia", Category::Travel, "Travel Booking"),
    ("booking.com", Category::Travel, "Travel Booking"),
    // Pets
    ("petco", Category::Pets, "Pet Supplies"),
    ("petsmart", Category::Pets, "Pet Supplies"),
    ("chewy", Category::Pets, "Pet Supplies"),
    ("vet", Category::Pets, "Veterinary"),
    // Transfers
    ("transfer", Category::Transfers, "Internal Transfer"),
    ("zelle", Category::Transfers, "Person to Person"),
    ("venmo", Category::Transfers, "Person to Person"),
    ("cash app", Category::Transfers, "Person to Person"),
    // Fees
    ("overdraft", Category::Fees, "Bank Fee"),
    ("nsf fee", Category::Fees, "Bank Fee"),
    ("atm fee", Category::Fees, "ATM Fee"),
    ("monthly fee", Category::Fees, "Bank Fee"),
    ("service charge", Category::Fees, "Bank Fee"),
    // Debt
    ("credit card", Category::Debt, "Credit Card Payment"),
    ("loan payment", Category::Debt, "Loan Payment"),
    ("student loan", Category::Debt, "Student Loan"),
    ("navient", Category::Debt, "Student Loan"),
    ("nelnet", Category::Debt, "Student Loan"),
    ("mohela", Category::Debt, "Student Loan"),
];

static LEADING_TXN_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(pos|ach|debit|credit|check|wire|online|recurring|payment|purchase)\s*")
        .expect("valid regex")
});
static TRAILING_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d{2}/\d{2}.*$").expect("valid regex"));
static TRAILING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*#?\d+$").expect("valid regex"));
static TRAILING_STATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(ca|ny|tx|fl|il|pa|oh|ga|nc|mi)$").expect("valid regex"));

/// Categorize a single raw transaction by rules alone
///
/// Returns (category, subcategory, confidence). Never fails to produce a
/// category; the floor is other/"Uncategorized" at low confidence.
pub fn categorize_by_rules(txn: &RawTransaction) -> (Category, String, f64) {
    let desc = txn.description.to_lowercase();

    for (pattern, category, subcategory) in MERCHANT_PATTERNS {
        if desc.contains(pattern) {
            return (*category, (*subcategory).to_string(), PATTERN_CONFIDENCE);
        }
    }

    // Income heuristics for unmatched money-in
    if txn.amount > Decimal::ZERO || txn.kind == Some(TxnKind::Credit) {
        if desc.contains("deposit") || desc.contains("credit") || desc.contains("refund") {
            return (Category::Income, "Other Income".to_string(), 0.7);
        }
        if desc.contains("interest") {
            return (Category::Income, "Interest".to_string(), 0.9);
        }
    }

    (
        Category::Other,
        "Uncategorized".to_string(),
        FALLBACK_CONFIDENCE,
    )
}

/// Best-effort vendor name from a statement description
///
/// Strips transaction-type prefixes, trailing date fragments, trailing
/// numeric ids, and a trailing state code, then takes the first few words.
/// Wrong or missing results are expected; nothing downstream may rely on it.
pub fn extract_merchant(description: &str) -> Option<String> {
    let cleaned = LEADING_TXN_PREFIX.replace(description, "");
    let cleaned = TRAILING_DATE.replace(&cleaned, "");
    let cleaned = TRAILING_ID.replace(&cleaned, "");
    let cleaned = TRAILING_STATE.replace(&cleaned, "");
    let cleaned = cleaned.trim();

    let words: Vec<&str> = cleaned.split_whitespace().take(3).collect();
    match words.first() {
        Some(first) if first.len() > 2 => Some(words.join(" ")),
        _ => None,
    }
}

/// Build a categorized transaction from a raw one, rules only
pub fn categorize_transaction(txn: &RawTransaction) -> CategorizedTransaction {
    let (category, subcategory, confidence) = categorize_by_rules(txn);
    let merchant = extract_merchant(&txn.description);
    CategorizedTransaction::from_raw(txn.clone(), category, subcategory, confidence, merchant)
}

/// Categorize a whole batch of raw transactions, rules only
pub fn categorize_transactions(raw: &[RawTransaction]) -> Vec<CategorizedTransaction> {
    raw.iter().map(categorize_transaction).collect()
}

/// Apply a user's category edit
///
/// Pins confidence to 1.0 and marks the row overridden, which shields it from
/// every later automated pass. Returns false when the id is unknown.
pub fn update_category(
    transactions: &mut [CategorizedTransaction],
    id: &str,
    category: Category,
    subcategory: &str,
) -> bool {
    match transactions.iter_mut().find(|t| t.id == id) {
        Some(txn) => {
            txn.category = category;
            txn.subcategory = subcategory.to_string();
            txn.confidence = 1.0;
            txn.user_override = true;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
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

    #[test]
    fn test_merchant_pattern_match() {
        let (category, subcategory, confidence) =
            categorize_by_rules(&raw("STARBUCKS STORE #123", dec!(-5.75)));
        assert_eq!(category, Category::Dining);
        assert_eq!(subcategory, "Coffee");
        assert_eq!(confidence, 0.85);
    }

    #[test]
    fn test_pattern_order_is_first_match_wins() {
        // "uber eats" sits above "uber " in the table
        let (category, subcategory, _) =
            categorize_by_rules(&raw("UBER EATS SAN FRANCISCO", dec!(-20.00)));
        assert_eq!(category, Category::Dining);
        assert_eq!(subcategory, "Delivery");

        let (category, subcategory, _) = categorize_by_rules(&raw("UBER TRIP 1234", dec!(-14.50)));
        assert_eq!(category, Category::Transportation);
        assert_eq!(subcategory, "Rideshare");
    }

    #[test]
    fn test_income_heuristics() {
        let (category, subcategory, confidence) =
            categorize_by_rules(&raw("MOBILE CHECK DEPOSIT", dec!(150.00)));
        assert_eq!(category, Category::Income);
        assert_eq!(subcategory, "Other Income");
        assert_eq!(confidence, 0.7);

        let (category, subcategory, confidence) =
            categorize_by_rules(&raw("INTEREST PAID", dec!(0.42)));
        assert_eq!(category, Category::Income);
        assert_eq!(subcategory, "Interest");
        assert_eq!(confidence, 0.9);
    }

    #[test]
    fn test_income_heuristics_respect_credit_kind() {
        let mut txn = raw("MYSTERY REFUND", dec!(-10.00));
        txn.kind = Some(TxnKind::Credit);
        let (category, _, _) = categorize_by_rules(&txn);
        assert_eq!(category, Category::Income);
    }

    #[test]
    fn test_payroll_beats_income_heuristic() {
        // "PAYROLL DEPOSIT" hits the payroll pattern, not the deposit heuristic
        let (category, subcategory, confidence) =
            categorize_by_rules(&raw("PAYROLL DEPOSIT", dec!(2500.00)));
        assert_eq!(category, Category::Income);
        assert_eq!(subcategory, "Salary");
        assert_eq!(confidence, 0.85);
    }

    #[test]
    fn test_universal_fallback() {
        let (category, subcategory, confidence) =
            categorize_by_rules(&raw("XQZ 993 UNKNOWN", dec!(-12.00)));
        assert_eq!(category, Category::Other);
        assert_eq!(subcategory, "Uncategorized");
        assert_eq!(confidence, 0.3);
    }

    #[test]
    fn test_extract_merchant_strips_noise() {
        assert_eq!(
            extract_merchant("POS STARBUCKS STORE #123"),
            Some("STARBUCKS STORE".to_string())
        );
        assert_eq!(
            extract_merchant("DEBIT SHELL OIL 57442 01/04 CARD 1234"),
            Some("SHELL OIL".to_string())
        );
        assert_eq!(
            extract_merchant("TRADER JOES 521 AUSTIN TX"),
            Some("TRADER JOES 521".to_string())
        );
    }

    #[test]
    fn test_extract_merchant_short_first_word_is_none() {
        assert_eq!(extract_merchant("TO SAVINGS"), None);
        assert_eq!(extract_merchant(""), None);
        assert_eq!(extract_merchant("#4421"), None);
    }

    #[test]
    fn test_categorize_transactions_is_one_to_one() {
        let raws = vec![
            raw("NETFLIX.COM", dec!(-15.49)),
            raw("SOMETHING ODD", dec!(-3.00)),
        ];
        let categorized = categorize_transactions(&raws);
        assert_eq!(categorized.len(), 2);
        assert_eq!(categorized[0].category, Category::Subscriptions);
        assert_eq!(categorized[1].category, Category::Other);
        assert!(!categorized[0].subcategory.is_empty());
        assert!(!categorized[1].subcategory.is_empty());
    }

    #[test]
    fn test_update_category_pins_override() {
        let mut transactions = categorize_transactions(&[raw("XQZ UNKNOWN", dec!(-12.00))]);
        let id = transactions[0].id.clone();

        assert!(update_category(
            &mut transactions,
            &id,
            Category::GiftsDonations,
            "Charity"
        ));
        assert_eq!(transactions[0].category, Category::GiftsDonations);
        assert_eq!(transactions[0].subcategory, "Charity");
        assert_eq!(transactions[0].confidence, 1.0);
        assert!(transactions[0].user_override);

        assert!(!update_category(
            &mut transactions,
            "no-such-id",
            Category::Other,
            "Uncategorized"
        ));
    }
}
