//! Command implementations

mod analyze;
mod categories;
mod parse;

pub use analyze::cmd_analyze;
pub use categories::cmd_categories;
pub use parse::cmd_parse;

use std::path::Path;

use anyhow::{Context, Result};

/// Read a statement file and hand back (bytes, display name)
pub(crate) fn read_statement(path: &Path) -> Result<(Vec<u8>, String)> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("statement.csv")
        .to_string();
    Ok((bytes, name))
}
