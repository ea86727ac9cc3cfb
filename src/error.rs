//! Structured parse errors shared by every sub-grammar.
//!
//! A [`ParseError`] is built once, at the first unrecoverable mismatch, and
//! never filled in afterwards. It carries the byte position, the set of
//! tokens that would have been accepted there and the sub-grammar that was
//! running. The human readable message is only produced by `Display`.

use std::fmt;

/// The sub-grammar that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    Literal,
    FieldPath,
    Query,
    Projection,
    Sort,
}

impl Grammar {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grammar::Literal => "literal",
            Grammar::FieldPath => "field path",
            Grammar::Query => "query",
            Grammar::Projection => "projection",
            Grammar::Sort => "sort",
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The field path rule that was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathRule {
    Empty,
    LeadingDot,
    TrailingDot,
    ConsecutiveDots,
    LeadingDollar,
    NullCharacter,
}

impl PathRule {
    pub fn description(&self) -> &'static str {
        match self {
            PathRule::Empty => "field path must not be empty",
            PathRule::LeadingDot => "field path must not start with \".\"",
            PathRule::TrailingDot => "field path must not end with \".\"",
            PathRule::ConsecutiveDots => "field path must not contain \"..\"",
            PathRule::LeadingDollar => "field name must not start with \"$\"",
            PathRule::NullCharacter => "field path must not contain the null character",
        }
    }
}

/// How many arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(1) => write!(f, "exactly 1 argument"),
            Arity::Exactly(n) => write!(f, "exactly {} arguments", n),
            Arity::AtLeast(1) => write!(f, "at least 1 argument"),
            Arity::AtLeast(n) => write!(f, "at least {} arguments", n),
        }
    }
}

/// The kind of argument a function position requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    FieldPath,
    Literal,
    Expression,
    Boolean,
    Sequence,
    Pattern,
}

impl ArgKind {
    pub fn description(&self) -> &'static str {
        match self {
            ArgKind::FieldPath => "a field path",
            ArgKind::Literal => "a literal value",
            ArgKind::Expression => "a query expression",
            ArgKind::Boolean => "true or false",
            ArgKind::Sequence => "an array literal",
            ArgKind::Pattern => "a string or regular expression",
        }
    }
}

/// Coarse error taxonomy: token level mismatches versus well formed input
/// that violates a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Semantic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input did not match any accepted token
    Syntax,
    /// A field path broke one of its character rules
    FieldPath(PathRule),
    /// A projection mixed inclusion and exclusion
    MixedProjection,
    UnknownFunction(String),
    Arity {
        function: String,
        expected: Arity,
        found: usize,
    },
    ArgumentKind {
        function: String,
        index: usize,
        expected: ArgKind,
    },
    InvalidNumber,
    InvalidObjectId,
    InvalidDate,
    InvalidRegex(String),
    NestingTooDeep {
        limit: usize,
    },
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::Syntax
            | ErrorKind::FieldPath(_)
            | ErrorKind::InvalidNumber
            | ErrorKind::NestingTooDeep { .. } => ErrorCategory::Syntax,
            ErrorKind::MixedProjection
            | ErrorKind::UnknownFunction(_)
            | ErrorKind::Arity { .. }
            | ErrorKind::ArgumentKind { .. }
            | ErrorKind::InvalidObjectId
            | ErrorKind::InvalidDate
            | ErrorKind::InvalidRegex(_) => ErrorCategory::Semantic,
        }
    }
}

/// A parse failure at a byte position of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ErrorKind,
    grammar: Grammar,
    position: usize,
    expected: Vec<String>,
    found: Option<char>,
    hint: Option<String>,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, grammar: Grammar, position: usize) -> Self {
        ParseError {
            kind,
            grammar,
            position,
            expected: Vec::new(),
            found: None,
            hint: None,
        }
    }

    pub(crate) fn syntax(
        grammar: Grammar,
        position: usize,
        expected: &[&str],
        found: Option<char>,
    ) -> Self {
        ParseError::new(ErrorKind::Syntax, grammar, position)
            .expecting(expected)
            .found(found)
    }

    pub(crate) fn expecting(mut self, expected: &[&str]) -> Self {
        for item in expected {
            if !self.expected.iter().any(|e| e == item) {
                self.expected.push((*item).to_string());
            }
        }
        self
    }

    pub(crate) fn found(mut self, found: Option<char>) -> Self {
        self.found = found;
        self
    }

    pub(crate) fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    /// Byte offset into the input where the error was detected
    pub fn position(&self) -> usize {
        self.position
    }

    /// Descriptions of the tokens that would have been accepted
    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// The offending character, `None` at end of input
    pub fn found_char(&self) -> Option<char> {
        self.found
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn is_syntax(&self) -> bool {
        self.category() == ErrorCategory::Syntax
    }

    pub fn is_semantic(&self) -> bool {
        self.category() == ErrorCategory::Semantic
    }

    fn write_expected(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Expected ")?;
        match self.expected.split_last() {
            None => f.write_str("valid input")?,
            Some((last, [])) => f.write_str(last)?,
            Some((last, rest)) => write!(f, "{} or {}", rest.join(", "), last)?,
        }

        if let Some(hint) = &self.hint {
            return write!(f, "; {}", hint);
        }
        match self.found {
            Some(ch) => write!(f, " but \"{}\" found", ch.escape_debug()),
            None => write!(f, " but end of input found"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::UnknownFunction(name) => write!(f, "Unknown function \"{}\"", name),
            ErrorKind::Arity {
                function,
                expected,
                found,
            } => write!(
                f,
                "{}() takes {} but {} {} given",
                function,
                expected,
                found,
                if *found == 1 { "was" } else { "were" }
            ),
            ErrorKind::ArgumentKind {
                function,
                index,
                expected,
            } => write!(
                f,
                "Argument {} of {}() must be {}",
                index + 1,
                function,
                expected.description()
            ),
            ErrorKind::InvalidRegex(reason) => {
                write!(f, "Invalid regular expression: {}", reason)
            }
            ErrorKind::NestingTooDeep { limit } => {
                write!(f, "Expression nesting exceeds the limit of {} levels", limit)
            }
            ErrorKind::Syntax
            | ErrorKind::FieldPath(_)
            | ErrorKind::MixedProjection
            | ErrorKind::InvalidNumber
            | ErrorKind::InvalidObjectId
            | ErrorKind::InvalidDate => self.write_expected(f),
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_alternatives() {
        let err = ParseError::syntax(Grammar::Sort, 0, &["\"+\"", "\"-\""], Some('n'));
        assert_eq!(err.to_string(), "Expected \"+\" or \"-\" but \"n\" found");

        let err = ParseError::syntax(Grammar::Query, 3, &["\",\"", "\")\"", "end of input"], None);
        assert_eq!(
            err.to_string(),
            "Expected \",\", \")\" or end of input but end of input found"
        );
    }

    #[test]
    fn test_hint_replaces_found() {
        let err = ParseError::syntax(Grammar::Projection, 0, &["\"+\"", "\"-\""], Some(' '))
            .with_hint("disable strictEncoding to allow space in place of +");
        assert_eq!(
            err.to_string(),
            "Expected \"+\" or \"-\"; disable strictEncoding to allow space in place of +"
        );
    }

    #[test]
    fn test_expected_is_deduplicated() {
        let err = ParseError::syntax(Grammar::Literal, 0, &["number", "number"], None);
        assert_eq!(err.expected(), ["number".to_string()]);
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            ErrorKind::FieldPath(PathRule::LeadingDot).category(),
            ErrorCategory::Syntax
        );
        assert_eq!(ErrorKind::MixedProjection.category(), ErrorCategory::Semantic);
        assert_eq!(
            ErrorKind::UnknownFunction("foo".into()).category(),
            ErrorCategory::Semantic
        );
    }
}
