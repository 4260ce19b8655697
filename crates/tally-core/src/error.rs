//! Error types for tally
//!
//! Parsing never errors past its boundary (failure lives in
//! `ParseResult.errors`), so the error surface here is the oracle's: the
//! HTTP transport and the shape of what came back.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
