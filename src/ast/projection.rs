use crate::ast::{FieldPath, PredicateNode};
use indexmap::IndexMap;

/// What a projection does with one field.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionClause {
    /// `+field`
    Include,
    /// `-field`
    Exclude,
    /// `elemMatch(field, expr)`
    ElemMatch(PredicateNode),
}

impl ProjectionClause {
    /// The prefix character that spells this clause, if it has one
    pub fn prefix(&self) -> Option<char> {
        match self {
            ProjectionClause::Include => Some('+'),
            ProjectionClause::Exclude => Some('-'),
            ProjectionClause::ElemMatch(_) => None,
        }
    }
}

/// A complete projection, in first-seen field order.
///
/// Across `Include`/`Exclude` entries the direction is uniform, except that
/// `_id` may take the opposite direction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectionSpec {
    entries: IndexMap<FieldPath, ProjectionClause>,
}

impl ProjectionSpec {
    pub(crate) fn from_entries(entries: IndexMap<FieldPath, ProjectionClause>) -> Self {
        ProjectionSpec { entries }
    }

    pub fn get(&self, path: &str) -> Option<&ProjectionClause> {
        self.entries.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &ProjectionClause)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the non-`_id` entries include fields rather than exclude them
    pub fn is_inclusive(&self) -> bool {
        self.entries
            .iter()
            .filter(|(path, _)| !path.is_id())
            .any(|(_, clause)| matches!(clause, ProjectionClause::Include))
    }
}

impl<'a> IntoIterator for &'a ProjectionSpec {
    type Item = (&'a FieldPath, &'a ProjectionClause);
    type IntoIter = indexmap::map::Iter<'a, FieldPath, ProjectionClause>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
