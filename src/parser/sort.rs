use super::Parser;
use crate::ast::{SortKey, SortSpec};
use crate::error::{Grammar, ParseError};
use tracing::debug;

impl<'a> Parser<'a> {
    /// Parse `("+"|"-") fieldpath ("," ...)*` into an ordered sort.
    ///
    /// Mixed directions are allowed and repeated fields are kept where they
    /// appear.
    pub fn parse_sort(mut self) -> Result<SortSpec, ParseError> {
        debug!(grammar = "sort", len = self.lexer.input().len(), "parsing");

        let mut keys = Vec::new();
        loop {
            let (direction, _) = self.read_prefix(Grammar::Sort, &["\"+\"", "\"-\""])?;
            let field = self.lexer.read_field_path(false)?;
            keys.push(SortKey { field, direction });

            if !self.next_clause(Grammar::Sort)? {
                break;
            }
        }

        debug!(keys = keys.len(), "parsed sort");
        Ok(SortSpec::from_keys(keys))
    }
}
