//! Compile a single sub-language expression

use super::CliError;
use crate::{ParseOptions, parse_fields, parse_query, parse_sort};

/// Which grammar an expression is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileTarget {
    Query,
    Fields,
    Sort,
}

/// Compile one expression to its document, without URL decoding
pub fn execute_compile(
    target: CompileTarget,
    expression: &str,
    options: &ParseOptions,
) -> Result<serde_json::Value, CliError> {
    let compiled = match target {
        CompileTarget::Query => parse_query(expression, options)?,
        CompileTarget::Fields => parse_fields(expression, options)?,
        CompileTarget::Sort => parse_sort(expression, options)?,
    };
    Ok(compiled)
}
