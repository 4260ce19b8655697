//! Spending aggregation and insight generation
//!
//! Pure derivation: recomputed whenever the categorized set changes, never
//! persisted on its own, and no insight ever mutates data. Thresholds are
//! fixed constants, not configuration.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Category, CategorizedTransaction, Frequency};

/// Merchants ranked in `top_merchants`
const TOP_MERCHANT_COUNT: usize = 10;

/// Essential categories for the 50/30/20 needs bucket
const NEEDS_CATEGORIES: &[Category] = &[
    Category::Housing,
    Category::Utilities,
    Category::Groceries,
    Category::Healthcare,
    Category::Transportation,
    Category::Insurance,
    Category::Childcare,
];

/// Discretionary categories for the 50/30/20 wants bucket
const WANTS_CATEGORIES: &[Category] = &[
    Category::Dining,
    Category::Shopping,
    Category::Entertainment,
    Category::Subscriptions,
    Category::PersonalCare,
    Category::Travel,
    Category::Pets,
];

/// Per-category aggregation bucket
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryBucket {
    /// Absolute-value sum of member amounts
    pub total: Decimal,
    pub count: usize,
    pub transactions: Vec<CategorizedTransaction>,
}

/// One merchant's outgoing spend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantSpend {
    pub name: String,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Tip,
    Positive,
    Question,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Tip => "tip",
            Self::Positive => "positive",
            Self::Question => "question",
        }
    }
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A generated observation about the spending data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub amount: Option<Decimal>,
    /// Suggested next step, when the rule has one
    pub action: Option<String>,
}

impl Insight {
    fn new(kind: InsightKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            category: None,
            amount: None,
            action: None,
        }
    }

    fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Aggregated view of a categorized transaction set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingAnalysis {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// income - expenses (absolute sums)
    pub net_cashflow: Decimal,
    /// Every category of the closed enumeration is present, even when empty
    pub by_category: BTreeMap<Category, CategoryBucket>,
    /// Recurring transactions with outgoing amounts
    pub recurring_expenses: Vec<CategorizedTransaction>,
    /// Up to ten merchants by descending outgoing spend
    pub top_merchants: Vec<MerchantSpend>,
    pub date_range: DateRange,
    pub insights: Vec<Insight>,
}

/// Aggregate a categorized set into a spending analysis
pub fn analyze_spending(transactions: &[CategorizedTransaction]) -> SpendingAnalysis {
    let mut by_category: BTreeMap<Category, CategoryBucket> = Category::ALL
        .iter()
        .map(|c| (*c, CategoryBucket::default()))
        .collect();

    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;

    for txn in transactions {
        let amount = txn.amount.abs();
        if let Some(bucket) = by_category.get_mut(&txn.category) {
            bucket.total += amount;
            bucket.count += 1;
            bucket.transactions.push(txn.clone());
        }

        if txn.category == Category::Income || txn.amount > Decimal::ZERO {
            total_income += amount;
        } else {
            total_expenses += amount;
        }
    }

    let recurring_expenses: Vec<CategorizedTransaction> = transactions
        .iter()
        .filter(|t| t.is_recurring && t.amount < Decimal::ZERO)
        .cloned()
        .collect();

    let top_merchants = rank_merchants(transactions);

    let date_range = match (
        transactions.iter().map(|t| t.date).min(),
        transactions.iter().map(|t| t.date).max(),
    ) {
        (Some(start), Some(end)) => DateRange { start, end },
        _ => {
            let today = Local::now().date_naive();
            DateRange {
                start: today,
                end: today,
            }
        }
    };

    let insights = generate_insights(
        &by_category,
        total_income,
        total_expenses,
        &recurring_expenses,
    );

    SpendingAnalysis {
        total_income,
        total_expenses,
        net_cashflow: total_income - total_expenses,
        by_category,
        recurring_expenses,
        top_merchants,
        date_range,
        insights,
    }
}

/// Group outgoing spend by merchant, descending by total
fn rank_merchants(transactions: &[CategorizedTransaction]) -> Vec<MerchantSpend> {
    let mut spend: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for txn in transactions {
        if txn.amount < Decimal::ZERO {
            if let Some(merchant) = &txn.merchant {
                let entry = spend.entry(merchant.as_str()).or_default();
                entry.0 += txn.amount.abs();
                entry.1 += 1;
            }
        }
    }

    let mut ranked: Vec<MerchantSpend> = spend
        .into_iter()
        .map(|(name, (total, count))| MerchantSpend {
            name: name.to_string(),
            total,
            count,
        })
        .collect();

    ranked.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(TOP_MERCHANT_COUNT);
    ranked
}

/// Percentage of `part` in `whole`, zero when the whole is zero
fn percentage(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        0.0
    } else {
        (part / whole).to_f64().unwrap_or(0.0) * 100.0
    }
}

/// The fixed, order-stable insight battery
///
/// Rules are independent; several may fire at once.
fn generate_insights(
    by_category: &BTreeMap<Category, CategoryBucket>,
    total_income: Decimal,
    total_expenses: Decimal,
    recurring_expenses: &[CategorizedTransaction],
) -> Vec<Insight> {
    let total = |category: Category| -> Decimal {
        by_category
            .get(&category)
            .map(|b| b.total)
            .unwrap_or_default()
    };

    let mut insights = Vec::new();

    let dining_pct = percentage(total(Category::Dining), total_expenses);
    let grocery_pct = percentage(total(Category::Groceries), total_expenses);
    let entertainment_pct = percentage(total(Category::Entertainment), total_expenses);
    let subscription_total = total(Category::Subscriptions);

    if dining_pct > 15.0 {
        insights.push(
            Insight::new(
                InsightKind::Warning,
                "High Dining Spending",
                format!(
                    "You're spending {:.0}% of expenses on dining out. The recommended max is 10-15%.",
                    dining_pct
                ),
            )
            .with_category(Category::Dining)
            .with_amount(total(Category::Dining))
            .with_action("Consider meal prepping or reducing takeout orders"),
        );
    }

    if subscription_total > Decimal::from(100) {
        insights.push(
            Insight::new(
                InsightKind::Tip,
                "Subscription Audit",
                format!(
                    "You have ${:.0}/month in subscriptions. Consider reviewing which ones you actually use.",
                    subscription_total
                ),
            )
            .with_category(Category::Subscriptions)
            .with_amount(subscription_total)
            .with_action("Review and cancel unused subscriptions"),
        );
    }

    if grocery_pct > 5.0 && grocery_pct < 20.0 {
        insights.push(
            Insight::new(
                InsightKind::Positive,
                "Healthy Grocery Spending",
                format!(
                    "Your grocery spending is {:.0}% of expenses - well within the healthy range.",
                    grocery_pct
                ),
            )
            .with_category(Category::Groceries),
        );
    }

    if grocery_pct < 5.0 && dining_pct > 10.0 {
        insights.push(
            Insight::new(
                InsightKind::Tip,
                "Shift Dining to Groceries",
                "You spend more on dining than groceries. Cooking at home could save $200-400/month.",
            )
            .with_action("Try meal planning and batch cooking"),
        );
    }

    if total(Category::Savings).is_zero() {
        insights.push(
            Insight::new(
                InsightKind::Warning,
                "No Savings Detected",
                "We didn't see any transfers to savings. Aim to save at least 10-20% of income.",
            )
            .with_category(Category::Savings)
            .with_action("Set up automatic transfers to savings"),
        );
    }

    if total(Category::Fees) > Decimal::from(50) {
        insights.push(
            Insight::new(
                InsightKind::Warning,
                "Bank Fees Add Up",
                format!(
                    "You paid ${:.0} in fees. Consider switching to a fee-free bank.",
                    total(Category::Fees)
                ),
            )
            .with_category(Category::Fees)
            .with_amount(total(Category::Fees))
            .with_action("Look into online banks with no monthly fees"),
        );
    }

    if total_income > total_expenses * Decimal::new(12, 1) {
        insights.push(Insight::new(
            InsightKind::Positive,
            "Positive Cash Flow",
            format!(
                "You're spending less than you earn - great job! You have ${:.0} available for savings/investing.",
                total_income - total_expenses
            ),
        ));
    }

    if total_expenses > total_income {
        insights.push(
            Insight::new(
                InsightKind::Warning,
                "Spending More Than Earning",
                format!(
                    "You spent ${:.0} more than you earned. This is unsustainable.",
                    total_expenses - total_income
                ),
            )
            .with_action("We'll help you find areas to cut back"),
        );
    }

    let monthly_recurring: Decimal = recurring_expenses
        .iter()
        .filter(|t| t.recurring_frequency == Some(Frequency::Monthly))
        .map(|t| t.amount.abs())
        .sum();

    if monthly_recurring > Decimal::ZERO {
        insights.push(
            Insight::new(
                InsightKind::Tip,
                "Monthly Commitments",
                format!(
                    "You have ${:.0} in monthly recurring expenses. Knowing your fixed costs helps with budgeting.",
                    monthly_recurring
                ),
            )
            .with_amount(monthly_recurring),
        );
    }

    if entertainment_pct > 10.0 {
        insights.push(
            Insight::new(
                InsightKind::Question,
                "Entertainment Spending",
                format!(
                    "{:.0}% of your spending is on entertainment. Is this aligned with your priorities?",
                    entertainment_pct
                ),
            )
            .with_category(Category::Entertainment)
            .with_amount(total(Category::Entertainment)),
        );
    }

    // 50/30/20 breakdown against income
    if total_income > Decimal::ZERO {
        let needs: Decimal = NEEDS_CATEGORIES.iter().map(|c| total(*c)).sum();
        let wants: Decimal = WANTS_CATEGORIES.iter().map(|c| total(*c)).sum();
        let needs_pct = percentage(needs, total_income);
        let wants_pct = percentage(wants, total_income);

        if needs_pct > 55.0 {
            insights.push(
                Insight::new(
                    InsightKind::Warning,
                    "Needs Exceeding 50%",
                    format!(
                        "Your essential expenses are {:.0}% of income (50/30/20 rule suggests 50%). High fixed costs limit flexibility.",
                        needs_pct
                    ),
                )
                .with_action("Look for ways to reduce housing or transportation costs"),
            );
        }

        if wants_pct > 35.0 {
            insights.push(Insight::new(
                InsightKind::Tip,
                "Wants Spending High",
                format!(
                    "Discretionary spending is {:.0}% of income. Consider if each expense brings proportional value.",
                    wants_pct
                ),
            ));
        }
    }

    insights
}

/// Average monthly spend per category
///
/// Totals divide by the inclusive count of calendar months the set spans,
/// never less than one. Used to propose default variable-spending budgets.
pub fn monthly_averages(transactions: &[CategorizedTransaction]) -> BTreeMap<Category, Decimal> {
    let mut totals: BTreeMap<Category, Decimal> = Category::ALL
        .iter()
        .map(|c| (*c, Decimal::ZERO))
        .collect();

    let (Some(start), Some(end)) = (
        transactions.iter().map(|t| t.date).min(),
        transactions.iter().map(|t| t.date).max(),
    ) else {
        return totals;
    };

    let month_span =
        (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32 + 1;
    let months = Decimal::from(month_span.max(1));

    for txn in transactions {
        if let Some(total) = totals.get_mut(&txn.category) {
            *total += txn.amount.abs();
        }
    }

    for total in totals.values_mut() {
        *total /= months;
    }

    totals
}
