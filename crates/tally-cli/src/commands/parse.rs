//! Parse command: per-file diagnostics without the rest of the pipeline

use std::path::PathBuf;

use anyhow::Result;
use tally_core::parse_statement;

use super::read_statement;

pub fn cmd_parse(files: &[PathBuf]) -> Result<()> {
    for path in files {
        let (bytes, name) = read_statement(path)?;
        let result = parse_statement(&bytes, &name);

        println!("{}", path.display());
        if let Some(bank) = &result.bank_detected {
            println!("  bank:         {}", bank);
        }
        println!("  transactions: {}", result.transactions.len());
        if !result.transactions.is_empty() {
            let first = result.transactions.first().map(|t| t.date);
            let last = result.transactions.last().map(|t| t.date);
            if let (Some(first), Some(last)) = (first, last) {
                println!("  date range:   {} .. {}", first, last);
            }
        }
        if !result.errors.is_empty() {
            println!("  diagnostics:");
            for error in &result.errors {
                println!("    - {}", error);
            }
        }
        println!("  status:       {}", if result.success { "ok" } else { "rejected" });
    }
    Ok(())
}
