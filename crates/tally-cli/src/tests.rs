//! CLI command tests

use std::io::Write;
use std::path::PathBuf;

use clap::CommandFactory;

use crate::cli::Cli;
use crate::commands;

fn write_statement(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

const CSV: &str = "Date,Description,Amount\n\
                   01/05/2024,STARBUCKS STORE #123,-5.75\n\
                   01/12/2024,PAYROLL DEPOSIT,2500.00";

#[test]
fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_cmd_parse() {
    let file = write_statement(CSV);
    let result = commands::cmd_parse(&[file.path().to_path_buf()]);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_parse_missing_file() {
    let result = commands::cmd_parse(&[PathBuf::from("/no/such/file.csv")]);
    assert!(result.is_err());
}

#[test]
fn test_cmd_categories() {
    assert!(commands::cmd_categories().is_ok());
}

#[tokio::test]
async fn test_cmd_analyze_text_report() {
    let file = write_statement(CSV);
    let result = commands::cmd_analyze(&[file.path().to_path_buf()], false, false).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_analyze_json() {
    let file = write_statement(CSV);
    let result = commands::cmd_analyze(&[file.path().to_path_buf()], false, true).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_analyze_all_rejected() {
    let file = write_statement("Foo,Bar\n1,2");
    let result = commands::cmd_analyze(&[file.path().to_path_buf()], false, false).await;
    assert!(result.is_err());
}
