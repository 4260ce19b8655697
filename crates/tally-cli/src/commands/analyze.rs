//! Analyze command: full pipeline plus a text or JSON report

use std::path::PathBuf;

use anyhow::Result;
use rust_decimal::Decimal;
use tally_core::{AiClient, Session, SpendingAnalysis};
use tracing::warn;

use super::read_statement;

pub async fn cmd_analyze(files: &[PathBuf], ai: bool, json: bool) -> Result<()> {
    let mut session = Session::new();

    let mut rejected = 0usize;
    for path in files {
        let (bytes, name) = read_statement(path)?;
        let result = session.ingest(&bytes, &name);
        if !result.success {
            rejected += 1;
            eprintln!("{}: rejected", path.display());
            for error in &result.errors {
                eprintln!("  - {}", error);
            }
        } else if !result.errors.is_empty() {
            for error in &result.errors {
                eprintln!("{}: {}", path.display(), error);
            }
        }
    }

    if rejected == files.len() {
        anyhow::bail!("No usable statement files");
    }

    if ai {
        match AiClient::from_env() {
            Some(client) => session.categorize_with(&client).await,
            None => {
                warn!("OLLAMA_HOST not set; using rule-based categorization");
                session.categorize();
            }
        }
    } else {
        session.categorize();
    }

    let analysis = session.analysis();

    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
        return Ok(());
    }

    print_report(analysis);
    Ok(())
}

fn print_report(analysis: &SpendingAnalysis) {
    println!(
        "Period {} .. {}",
        analysis.date_range.start, analysis.date_range.end
    );
    println!("Income:    ${:.2}", analysis.total_income);
    println!("Expenses:  ${:.2}", analysis.total_expenses);
    println!("Net:       ${:.2}", analysis.net_cashflow);

    println!("\nBy category:");
    let mut buckets: Vec<_> = analysis
        .by_category
        .iter()
        .filter(|(_, bucket)| bucket.count > 0)
        .collect();
    buckets.sort_by(|a, b| b.1.total.cmp(&a.1.total));
    for (category, bucket) in buckets {
        println!(
            "  {:<18} ${:>10.2}  ({} txns)",
            category.label(),
            bucket.total,
            bucket.count
        );
    }

    if !analysis.top_merchants.is_empty() {
        println!("\nTop merchants:");
        for merchant in &analysis.top_merchants {
            println!(
                "  {:<24} ${:>10.2}  ({}x)",
                merchant.name, merchant.total, merchant.count
            );
        }
    }

    if !analysis.recurring_expenses.is_empty() {
        let monthly_total: Decimal = analysis
            .recurring_expenses
            .iter()
            .map(|t| t.amount.abs())
            .sum();
        println!(
            "\nRecurring expenses: {} ({:.2} total)",
            analysis.recurring_expenses.len(),
            monthly_total
        );
    }

    if !analysis.insights.is_empty() {
        println!("\nInsights:");
        for insight in &analysis.insights {
            println!("  [{}] {}", insight.kind, insight.title);
            println!("      {}", insight.description);
            if let Some(action) = &insight.action {
                println!("      -> {}", action);
            }
        }
    }
}
