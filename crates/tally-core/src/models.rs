//! Domain models for the statement-analysis pipeline

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The closed set of budget categories
///
/// Every transaction resolves to exactly one of these; "other" is the
/// universal fallback, so nothing is ever left uncategorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Income,
    Housing,
    Utilities,
    Groceries,
    Dining,
    Transportation,
    Healthcare,
    Insurance,
    Debt,
    Savings,
    Investments,
    Shopping,
    Entertainment,
    Subscriptions,
    PersonalCare,
    Education,
    GiftsDonations,
    Travel,
    Pets,
    Childcare,
    Business,
    Taxes,
    Fees,
    Transfers,
    Other,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 25] = [
        Category::Income,
        Category::Housing,
        Category::Utilities,
        Category::Groceries,
        Category::Dining,
        Category::Transportation,
        Category::Healthcare,
        Category::Insurance,
        Category::Debt,
        Category::Savings,
        Category::Investments,
        Category::Shopping,
        Category::Entertainment,
        Category::Subscriptions,
        Category::PersonalCare,
        Category::Education,
        Category::GiftsDonations,
        Category::Travel,
        Category::Pets,
        Category::Childcare,
        Category::Business,
        Category::Taxes,
        Category::Fees,
        Category::Transfers,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Housing => "housing",
            Self::Utilities => "utilities",
            Self::Groceries => "groceries",
            Self::Dining => "dining",
            Self::Transportation => "transportation",
            Self::Healthcare => "healthcare",
            Self::Insurance => "insurance",
            Self::Debt => "debt",
            Self::Savings => "savings",
            Self::Investments => "investments",
            Self::Shopping => "shopping",
            Self::Entertainment => "entertainment",
            Self::Subscriptions => "subscriptions",
            Self::PersonalCare => "personal_care",
            Self::Education => "education",
            Self::GiftsDonations => "gifts_donations",
            Self::Travel => "travel",
            Self::Pets => "pets",
            Self::Childcare => "childcare",
            Self::Business => "business",
            Self::Taxes => "taxes",
            Self::Fees => "fees",
            Self::Transfers => "transfers",
            Self::Other => "other",
        }
    }

    /// Human-readable label, used in reports and oracle prompts
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Housing => "Housing",
            Self::Utilities => "Utilities",
            Self::Groceries => "Groceries",
            Self::Dining => "Dining Out",
            Self::Transportation => "Transportation",
            Self::Healthcare => "Healthcare",
            Self::Insurance => "Insurance",
            Self::Debt => "Debt Payments",
            Self::Savings => "Savings",
            Self::Investments => "Investments",
            Self::Shopping => "Shopping",
            Self::Entertainment => "Entertainment",
            Self::Subscriptions => "Subscriptions",
            Self::PersonalCare => "Personal Care",
            Self::Education => "Education",
            Self::GiftsDonations => "Gifts & Donations",
            Self::Travel => "Travel",
            Self::Pets => "Pets",
            Self::Childcare => "Childcare",
            Self::Business => "Business",
            Self::Taxes => "Taxes",
            Self::Fees => "Fees & Charges",
            Self::Transfers => "Transfers",
            Self::Other => "Other",
        }
    }

    /// Short description, used in reports and oracle prompts
    pub fn description(&self) -> &'static str {
        match self {
            Self::Income => "Salary, freelance, side hustles",
            Self::Housing => "Rent, mortgage, HOA fees",
            Self::Utilities => "Electric, gas, water, internet",
            Self::Groceries => "Food and household essentials",
            Self::Dining => "Restaurants, takeout, coffee",
            Self::Transportation => "Gas, car payments, transit",
            Self::Healthcare => "Medical bills, prescriptions",
            Self::Insurance => "Health, auto, life, home",
            Self::Debt => "Credit cards, loans",
            Self::Savings => "Emergency fund, goals",
            Self::Investments => "401k, IRA, stocks",
            Self::Shopping => "Clothes, electronics, home",
            Self::Entertainment => "Movies, games, hobbies",
            Self::Subscriptions => "Streaming, software, memberships",
            Self::PersonalCare => "Haircuts, gym, self-care",
            Self::Education => "Courses, books, tuition",
            Self::GiftsDonations => "Presents, charity",
            Self::Travel => "Flights, hotels, vacation",
            Self::Pets => "Food, vet, supplies",
            Self::Childcare => "Daycare, activities",
            Self::Business => "Work expenses",
            Self::Taxes => "Income, property taxes",
            Self::Fees => "Bank fees, penalties",
            Self::Transfers => "Account transfers",
            Self::Other => "Uncategorized",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "housing" => Ok(Self::Housing),
            "utilities" => Ok(Self::Utilities),
            "groceries" => Ok(Self::Groceries),
            "dining" => Ok(Self::Dining),
            "transportation" => Ok(Self::Transportation),
            "healthcare" => Ok(Self::Healthcare),
            "insurance" => Ok(Self::Insurance),
            "debt" => Ok(Self::Debt),
            "savings" => Ok(Self::Savings),
            "investments" => Ok(Self::Investments),
            "shopping" => Ok(Self::Shopping),
            "entertainment" => Ok(Self::Entertainment),
            "subscriptions" => Ok(Self::Subscriptions),
            "personal_care" => Ok(Self::PersonalCare),
            "education" => Ok(Self::Education),
            "gifts_donations" => Ok(Self::GiftsDonations),
            "travel" => Ok(Self::Travel),
            "pets" => Ok(Self::Pets),
            "childcare" => Ok(Self::Childcare),
            "business" => Ok(Self::Business),
            "taxes" => Ok(Self::Taxes),
            "fees" => Ok(Self::Fees),
            "transfers" => Ok(Self::Transfers),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credit/debit hint carried from the source file
///
/// Only used to disambiguate sign when the source separates debit and credit
/// columns or ships an explicit type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    Credit,
    Debit,
}

/// Cadence of a recurring payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ledger line as imported from a statement file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub date: NaiveDate,
    /// Original free-text memo; never rewritten (normalization happens in
    /// derived fields only)
    pub description: String,
    /// Negative = money out, positive = money in; never zero
    pub amount: Decimal,
    /// Running account balance at this line, informational only
    pub balance: Option<Decimal>,
    /// Credit/debit hint from the source, when it has one
    pub kind: Option<TxnKind>,
}

/// A transaction after categorization
///
/// Created exactly once per raw row; afterwards only the category-override
/// and recurrence-marking operations may touch it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizedTransaction {
    /// Unique within a session, minted at categorization time
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub balance: Option<Decimal>,
    pub kind: Option<TxnKind>,
    pub category: Category,
    /// Specific free-text label, always non-empty (e.g. "Fast Food")
    pub subcategory: String,
    /// Categorizer certainty in [0, 1]; exactly 1.0 only after a user override
    pub confidence: f64,
    /// Best-effort extracted vendor name; wrong or missing is expected
    pub merchant: Option<String>,
    pub is_recurring: bool,
    /// Set only while `is_recurring` is true
    pub recurring_frequency: Option<Frequency>,
    /// True once a human has edited the category; automated passes must not
    /// change the category/subcategory/confidence after that
    #[serde(default)]
    pub user_override: bool,
    pub notes: Option<String>,
}

impl CategorizedTransaction {
    pub fn from_raw(
        raw: RawTransaction,
        category: Category,
        subcategory: String,
        confidence: f64,
        merchant: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date: raw.date,
            description: raw.description,
            amount: raw.amount,
            balance: raw.balance,
            kind: raw.kind,
            category,
            subcategory,
            confidence,
            merchant,
            is_recurring: false,
            recurring_frequency: None,
            user_override: false,
            notes: None,
        }
    }

    /// The underlying ledger line, e.g. for re-submitting to the oracle
    pub fn as_raw(&self) -> RawTransaction {
        RawTransaction {
            date: self.date,
            description: self.description.clone(),
            amount: self.amount,
            balance: self.balance,
            kind: self.kind,
        }
    }
}

/// Outcome of ingesting one statement file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    /// True when at least one transaction was extracted
    pub success: bool,
    /// Extracted transactions, ascending by date
    pub transactions: Vec<RawTransaction>,
    /// Human-readable diagnostics, capped; a bad row is skipped, not fatal
    pub errors: Vec<String>,
    /// Best-guess institution name, advisory only
    pub bank_detected: Option<String>,
}
