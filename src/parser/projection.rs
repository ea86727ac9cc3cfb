use super::Parser;
use crate::ast::{Direction, FieldPath, ProjectionClause, ProjectionSpec};
use crate::error::{ErrorKind, Grammar, ParseError};
use indexmap::IndexMap;
use tracing::debug;

const CLAUSE_EXPECTED: &[&str] = &["\"+\"", "\"-\"", "\"elemMatch(\""];

/// A parsed clause and where it was written, kept until the direction check.
struct Entry {
    clause: ProjectionClause,
    position: usize,
    prefix: Option<char>,
}

impl<'a> Parser<'a> {
    /// Parse `clause ("," clause)*` into a projection.
    ///
    /// A later clause for the same path replaces the earlier one. Once every
    /// clause is read, the include/exclude entries other than `_id` must all
    /// share one direction.
    pub fn parse_projection(mut self) -> Result<ProjectionSpec, ParseError> {
        debug!(grammar = "projection", len = self.lexer.input().len(), "parsing");

        let mut entries: IndexMap<FieldPath, Entry> = IndexMap::new();
        loop {
            let (path, entry) = self.parse_projection_clause()?;
            entries.insert(path, entry);

            if !self.next_clause(Grammar::Projection)? {
                break;
            }
        }

        check_directions(&entries)?;

        debug!(fields = entries.len(), "parsed projection");
        Ok(ProjectionSpec::from_entries(
            entries
                .into_iter()
                .map(|(path, entry)| (path, entry.clause))
                .collect(),
        ))
    }

    fn parse_projection_clause(&mut self) -> Result<(FieldPath, Entry), ParseError> {
        let position = self.lexer.position();

        if self.lexer.eat_str("elemMatch(") {
            let path = self.lexer.read_field_path(false)?;
            self.lexer.expect_char(',', Grammar::Projection, &["\",\""])?;
            let sub = self.parse_call(1)?;
            self.lexer.expect_char(')', Grammar::Projection, &["\")\""])?;

            let entry = Entry {
                clause: ProjectionClause::ElemMatch(sub),
                position,
                prefix: None,
            };
            return Ok((path, entry));
        }

        let (direction, prefix) = self.read_prefix(Grammar::Projection, CLAUSE_EXPECTED)?;
        let path = self.lexer.read_field_path(true)?;
        let clause = match direction {
            Direction::Ascending => ProjectionClause::Include,
            Direction::Descending => ProjectionClause::Exclude,
        };

        Ok((
            path,
            Entry {
                clause,
                position,
                prefix: Some(prefix),
            },
        ))
    }
}

/// Every `+`/`-` entry must agree with the first one.
///
/// `_id` is left out in both directions, so `+a,-_id` and `-a,+_id` are both
/// accepted. `_id.sub` is an ordinary path.
fn check_directions(entries: &IndexMap<FieldPath, Entry>) -> Result<(), ParseError> {
    let mut prefixed = entries
        .iter()
        .filter(|(path, _)| !path.is_id())
        .filter_map(|(_, entry)| entry.clause.prefix().map(|prefix| (prefix, entry)));

    let Some((first, _)) = prefixed.next() else {
        return Ok(());
    };

    match prefixed.find(|(prefix, _)| *prefix != first) {
        Some((_, conflict)) => {
            let expected = format!("\"{}\"", first);
            Err(
                ParseError::new(ErrorKind::MixedProjection, Grammar::Projection, conflict.position)
                    .expecting(&[expected.as_str()])
                    .found(conflict.prefix)
                    .with_hint("projection cannot mix inclusion and exclusion"),
            )
        }
        None => Ok(()),
    }
}
