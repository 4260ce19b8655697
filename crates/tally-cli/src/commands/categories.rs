//! Categories command: print the closed enumeration

use anyhow::Result;
use tally_core::Category;

pub fn cmd_categories() -> Result<()> {
    for category in Category::ALL {
        println!(
            "{:<16} {:<18} {}",
            category.as_str(),
            category.label(),
            category.description()
        );
    }
    Ok(())
}
