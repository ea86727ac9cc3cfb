//! Caller supplied parser configuration.

use serde::{Deserialize, Serialize};

/// Deepest nesting of calls and array literals accepted by default.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration shared by the query, projection and sort parsers.
///
/// Deserializes from the camel-cased record used on the wire, so
/// `{"strictEncoding": true}` is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    /// When set, a bare space is never accepted in place of a `+` prefix.
    pub strict_encoding: bool,

    /// Nesting depth at which parsing fails; the outermost call sits at depth 0.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            strict_encoding: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn strict() -> Self {
        ParseOptions::default().with_strict_encoding(true)
    }

    pub fn with_strict_encoding(mut self, strict: bool) -> Self {
        self.strict_encoding = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_names() {
        let options: ParseOptions = serde_json::from_str(r#"{"strictEncoding": true}"#).unwrap();
        assert!(options.strict_encoding);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);

        let options: ParseOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ParseOptions::default());
    }
}
