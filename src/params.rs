//! # Query Parameter Parser
//!
//! Turns the named URL parameters `query`, `fields`, `sort`, `skip` and
//! `limit` into one find request. Each present parameter goes to its own
//! parser; the first failure aborts the whole call, prefixed with the name
//! of the parameter that failed.

use crate::ast::{PredicateNode, ProjectionSpec, SortSpec};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::options::ParseOptions;
use crate::output::ToDocument;
use crate::parser::Parser;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// The recognised parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamName {
    Query,
    Fields,
    Sort,
    Skip,
    Limit,
}

impl ParamName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamName::Query => "query",
            ParamName::Fields => "fields",
            ParamName::Sort => "sort",
            ParamName::Skip => "skip",
            ParamName::Limit => "limit",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "query" => Some(ParamName::Query),
            "fields" => Some(ParamName::Fields),
            "sort" => Some(ParamName::Sort),
            "skip" => Some(ParamName::Skip),
            "limit" => Some(ParamName::Limit),
            _ => None,
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Skip and limit must be non-negative integers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Expected a non-negative integer but found {0}")]
    Negative(i64),

    #[error("Expected a non-negative integer but found \"{0}\"")]
    NotANumber(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Range(#[from] RangeError),
}

#[derive(Debug, Error)]
pub enum ParamsError {
    /// A parameter was present but did not parse
    #[error("Error parsing {option}: {source}")]
    Invalid {
        option: ParamName,
        #[source]
        source: OptionError,
    },

    #[error("Error decoding parameters: {0}")]
    Decode(#[from] serde_urlencoded::de::Error),
}

impl ParamsError {
    fn invalid(option: ParamName, source: impl Into<OptionError>) -> Self {
        ParamsError::Invalid {
            option,
            source: source.into(),
        }
    }

    /// The parameter that failed, if the failure was not in decoding
    pub fn param(&self) -> Option<ParamName> {
        match self {
            ParamsError::Invalid { option, .. } => Some(*option),
            ParamsError::Decode(_) => None,
        }
    }

    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            ParamsError::Invalid {
                source: OptionError::Parse(err),
                ..
            } => Some(err),
            _ => None,
        }
    }
}

/// Already decoded parameter values. Empty values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pub query: Option<String>,
    pub fields: Option<String>,
    pub sort: Option<String>,
    pub skip: Option<String>,
    pub limit: Option<String>,
}

impl Params {
    /// Collect parameters from key/value pairs; unknown keys are ignored and
    /// a repeated key keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Params::default();
        for (key, value) in pairs {
            let slot = match ParamName::from_key(key.as_ref()) {
                Some(ParamName::Query) => &mut params.query,
                Some(ParamName::Fields) => &mut params.fields,
                Some(ParamName::Sort) => &mut params.sort,
                Some(ParamName::Skip) => &mut params.skip,
                Some(ParamName::Limit) => &mut params.limit,
                None => continue,
            };
            *slot = Some(value.into());
        }
        params
    }

    /// Decode an `application/x-www-form-urlencoded` string such as
    /// `query=lt(id,5)&sort=+id`. A `+` decodes to a space.
    pub fn from_query_string(input: &str) -> Result<Self, ParamsError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(input)?;
        Ok(Params::from_pairs(pairs))
    }

    fn get(&self, name: ParamName) -> Option<&str> {
        let value = match name {
            ParamName::Query => &self.query,
            ParamName::Fields => &self.fields,
            ParamName::Sort => &self.sort,
            ParamName::Skip => &self.skip,
            ParamName::Limit => &self.limit,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

impl FromStr for Params {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Params::from_query_string(s)
    }
}

/// Options that accompany the filter in a find request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FindOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

/// The compiled find request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedParams {
    /// The filter document; `{}` matches everything
    pub query: Value,
    pub options: FindOptions,
}

impl Default for ParsedParams {
    fn default() -> Self {
        ParsedParams {
            query: Value::Object(Map::new()),
            options: FindOptions::default(),
        }
    }
}

/// Parse every present parameter, failing on the first error.
pub fn parse_params(params: &Params, options: &ParseOptions) -> Result<ParsedParams, ParamsError> {
    let mut result = ParsedParams::default();

    if let Some(fields) = params.get(ParamName::Fields) {
        debug!(option = %ParamName::Fields, "parsing parameter");
        result.options.fields = Some(
            parse_fields(fields, options).map_err(|e| ParamsError::invalid(ParamName::Fields, e))?,
        );
    }
    if let Some(skip) = params.get(ParamName::Skip) {
        result.options.skip =
            Some(parse_skip(skip).map_err(|e| ParamsError::invalid(ParamName::Skip, e))?);
    }
    if let Some(limit) = params.get(ParamName::Limit) {
        result.options.limit =
            Some(parse_limit(limit).map_err(|e| ParamsError::invalid(ParamName::Limit, e))?);
    }
    if let Some(sort) = params.get(ParamName::Sort) {
        debug!(option = %ParamName::Sort, "parsing parameter");
        result.options.sort =
            Some(parse_sort(sort, options).map_err(|e| ParamsError::invalid(ParamName::Sort, e))?);
    }
    if let Some(query) = params.get(ParamName::Query) {
        debug!(option = %ParamName::Query, "parsing parameter");
        result.query =
            parse_query(query, options).map_err(|e| ParamsError::invalid(ParamName::Query, e))?;
    }

    Ok(result)
}

/// Decode a URL-encoded parameter string, then parse it.
pub fn parse_query_string(input: &str, options: &ParseOptions) -> Result<ParsedParams, ParamsError> {
    parse_params(&Params::from_query_string(input)?, options)
}

pub fn query(input: &str, options: &ParseOptions) -> Result<PredicateNode, ParseError> {
    Parser::with_options(Lexer::new(input), *options).parse_query()
}

pub fn projection(input: &str, options: &ParseOptions) -> Result<ProjectionSpec, ParseError> {
    Parser::with_options(Lexer::new(input), *options).parse_projection()
}

pub fn sort(input: &str, options: &ParseOptions) -> Result<SortSpec, ParseError> {
    Parser::with_options(Lexer::new(input), *options).parse_sort()
}

/// Compile a query expression to its filter document
pub fn parse_query(input: &str, options: &ParseOptions) -> Result<Value, ParseError> {
    query(input, options).map(|node| node.to_document())
}

/// Compile a projection to its document
pub fn parse_fields(input: &str, options: &ParseOptions) -> Result<Value, ParseError> {
    projection(input, options).map(|spec| spec.to_document())
}

/// Compile a sort to its ordered list of pairs
pub fn parse_sort(input: &str, options: &ParseOptions) -> Result<Value, ParseError> {
    sort(input, options).map(|spec| spec.to_document())
}

pub fn parse_skip(input: &str) -> Result<u64, RangeError> {
    parse_count(input)
}

pub fn parse_limit(input: &str) -> Result<u64, RangeError> {
    parse_count(input)
}

fn parse_count(input: &str) -> Result<u64, RangeError> {
    match input.trim().parse::<i64>() {
        Ok(n) if n < 0 => Err(RangeError::Negative(n)),
        Ok(n) => Ok(n.unsigned_abs()),
        Err(_) => Err(RangeError::NotANumber(input.to_string())),
    }
}
