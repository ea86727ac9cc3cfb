use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

/// A typed literal value.
///
/// Numbers are always 64-bit floats; the grammar does not distinguish
/// integers from floats.
///
/// # Examples
/// ```text
/// 42
/// "hello"
/// true
/// null
/// Date(2015-04-28T17:00Z)
/// ObjectId(507f1f77bcf86cd799439011)
/// /^ab+c/i
/// [1, "two", [3]]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    DateTime(DateTime<Utc>),
    ObjectId(ObjectId),
    Regex { pattern: String, flags: String },
    Sequence(Vec<Literal>),
}

impl Literal {
    /// Human readable name of the variant, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::Null => "null",
            Literal::Bool(_) => "boolean",
            Literal::Number(_) => "number",
            Literal::Text(_) => "string",
            Literal::DateTime(_) => "date",
            Literal::ObjectId(_) => "object id",
            Literal::Regex { .. } => "regular expression",
            Literal::Sequence(_) => "array",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Renders source syntax that parses back to an equal literal.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Text(s) => write_quoted(f, s),
            Literal::DateTime(dt) => {
                f.write_str("Date(")?;
                write_quoted(f, &dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))?;
                f.write_str(")")
            }
            Literal::ObjectId(oid) => write!(f, "ObjectId(\"{}\")", oid),
            Literal::Regex { pattern, flags } => {
                f.write_str("/")?;
                let mut chars = pattern.chars();
                while let Some(ch) = chars.next() {
                    match ch {
                        '\\' => {
                            f.write_str("\\")?;
                            if let Some(next) = chars.next() {
                                write!(f, "{}", next)?;
                            }
                        }
                        '/' => f.write_str("\\/")?,
                        _ => write!(f, "{}", ch)?,
                    }
                }
                write!(f, "/{}", flags)
            }
            Literal::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

/// A 12-byte document identifier, written as 24 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Decode exactly 24 hex characters; anything else is rejected.
    pub fn parse_hex(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(ObjectId::from_bytes(bytes))
    }
}
