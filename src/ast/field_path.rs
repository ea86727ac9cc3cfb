use crate::error::ParseError;
use crate::lexer::Lexer;
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// A dotted path addressing a possibly nested document field.
///
/// Always holds at least one segment, and no segment is empty. Only values
/// produced by the field path grammar can be constructed.
///
/// # Examples
/// ```text
/// name
/// grades.date
/// can$ContainDollar
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(String);

impl FieldPath {
    pub(crate) fn from_validated(path: &str) -> Self {
        FieldPath(path.to_string())
    }

    /// Parse a complete string as a field path.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let path = lexer.read_field_path(false)?;
        lexer.expect_end(crate::error::Grammar::FieldPath)?;
        Ok(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The document primary key, which projections treat specially
    pub fn is_id(&self) -> bool {
        self.0 == "_id"
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FieldPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FieldPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.0
    }
}
