//! Compile a URL-encoded parameter string into a find request

use super::CliError;
use crate::{ParseOptions, parse_query_string};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// URL-encoded parameters, e.g. `query=lt(id,5)&sort=-id`
    pub input: Option<String>,
    /// Parser configuration
    pub parse: ParseOptions,
    /// Only validate, don't print the compiled request
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Every parameter parsed
    SyntaxValid,
    /// The compiled `{query, options}` request
    Success(serde_json::Value),
}

/// Execute a mongo-url check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let input = options.input.as_deref().ok_or(CliError::NoInput)?;
    let parsed = parse_query_string(input.trim_end_matches(['\r', '\n']), &options.parse)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }
    Ok(CheckResult::Success(serde_json::to_value(parsed)?))
}
