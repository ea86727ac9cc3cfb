//! CLI support for mongo-url
//!
//! Provides programmatic access to the mongo-url CLI commands for embedding
//! in other tools.

mod check;
mod compile;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use compile::{CompileTarget, execute_compile};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Parameter string error, already prefixed with the failing option
    Params(crate::ParamsError),
    /// Single expression parse error
    Parse(crate::ParseError),
    /// JSON serialization error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
    /// Unknown documentation category
    UnknownCategory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Params(e) => write!(f, "{}", e),
            CliError::Parse(e) => write!(f, "Parse error at position {}: {}", e.position(), e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => {
                write!(f, "No input provided. Pass parameters as an argument or pipe them to stdin.")
            }
            CliError::UnknownCategory(c) => write!(
                f,
                "Unknown category: '{}'\nRun 'mongo-url docs' to see available categories.",
                c
            ),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Params(e) => Some(e),
            CliError::Parse(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::ParamsError> for CliError {
    fn from(e: crate::ParamsError) -> Self {
        CliError::Params(e)
    }
}

impl From<crate::ParseError> for CliError {
    fn from(e: crate::ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
