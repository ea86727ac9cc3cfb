//! Compilation of parsed trees into the query engine's document form.
//!
//! Every tree implements [`ToDocument`], producing a `serde_json::Value`
//! whose object keys keep source order. Literal values that JSON cannot
//! express directly use the canonical MongoDB Extended JSON tags:
//!
//! - **Dates** become `{"$date": "<RFC 3339>"}`
//! - **Object ids** become `{"$oid": "<24 hex>"}`
//! - **Regular expressions** become `{"$regularExpression": {"pattern", "options"}}`
//!
//! # Examples
//!
//! ```
//! use mongo_url::lexer::Lexer;
//! use mongo_url::output::{ToDocument, to_json};
//! use mongo_url::parser::Parser;
//!
//! let query = Parser::new(Lexer::new("lt(id,5)")).parse_query().unwrap();
//! assert_eq!(to_json(&query.to_document()), r#"{"id":{"$lt":5}}"#);
//! ```

use crate::ast::{
    ComparisonOp, FieldPath, Literal, ObjectId, PredicateNode, ProjectionClause, ProjectionSpec,
    SortSpec,
};
use crate::lexer::parse_iso_date;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value, json};

/// Largest integer a 64-bit float holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Conversion of a parsed tree into its compiled document.
pub trait ToDocument {
    fn to_document(&self) -> Value;
}

impl ToDocument for Literal {
    fn to_document(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Number(n) => number_to_document(*n),
            Literal::Text(s) => Value::String(s.clone()),
            Literal::DateTime(dt) => json!({ "$date": date_to_string(dt) }),
            Literal::ObjectId(oid) => json!({ "$oid": oid.to_hex() }),
            Literal::Regex { pattern, flags } => json!({
                "$regularExpression": { "pattern": pattern, "options": flags }
            }),
            Literal::Sequence(items) => {
                Value::Array(items.iter().map(ToDocument::to_document).collect())
            }
        }
    }
}

// Integral values print without a fraction so `eq(id,1)` matches `{"id": 1}`.
fn number_to_document(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn date_to_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl Literal {
    /// Decompile a document produced by [`ToDocument`] back into a literal.
    ///
    /// Returns `None` for documents no literal compiles to.
    pub fn from_document(value: &Value) -> Option<Literal> {
        match value {
            Value::Null => Some(Literal::Null),
            Value::Bool(b) => Some(Literal::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Literal::Number),
            Value::String(s) => Some(Literal::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(Literal::from_document)
                .collect::<Option<Vec<_>>>()
                .map(Literal::Sequence),
            Value::Object(map) if map.len() == 1 => {
                let (tag, inner) = map.iter().next()?;
                match tag.as_str() {
                    "$date" => date_from_document(inner).map(Literal::DateTime),
                    "$oid" => inner
                        .as_str()
                        .and_then(ObjectId::parse_hex)
                        .map(Literal::ObjectId),
                    "$regularExpression" => Some(Literal::Regex {
                        pattern: inner.get("pattern")?.as_str()?.to_string(),
                        flags: inner.get("options")?.as_str()?.to_string(),
                    }),
                    _ => None,
                }
            }
            Value::Object(_) => None,
        }
    }
}

// `{"$date": "<iso>"}` or the canonical `{"$date": {"$numberLong": "<ms>"}}`
fn date_from_document(inner: &Value) -> Option<DateTime<Utc>> {
    match inner {
        Value::String(s) => parse_iso_date(s),
        Value::Object(map) => {
            let millis = map.get("$numberLong")?.as_str()?.parse::<i64>().ok()?;
            DateTime::from_timestamp_millis(millis)
        }
        _ => None,
    }
}

/// The `{"$op": value}` document a comparison applies to its field.
fn operator_document(op: ComparisonOp, value: &Literal) -> Value {
    let mut doc = Map::new();
    match (op, value) {
        (ComparisonOp::Regex, Literal::Regex { pattern, flags }) => {
            doc.insert("$regex".to_string(), Value::String(pattern.clone()));
            if !flags.is_empty() {
                doc.insert("$options".to_string(), Value::String(flags.clone()));
            }
        }
        _ => {
            doc.insert(op.operator().to_string(), value.to_document());
        }
    }
    Value::Object(doc)
}

fn field_document(field: &FieldPath, value: Value) -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert(field.to_string(), value);
    doc
}

fn compile(node: &PredicateNode) -> Map<String, Value> {
    match node {
        PredicateNode::Comparison { field, op, value } => {
            field_document(field, operator_document(*op, value))
        }
        PredicateNode::Logical { op, children } => {
            let children = children.iter().map(|c| Value::Object(compile(c))).collect();
            let mut doc = Map::new();
            doc.insert(op.operator().to_string(), Value::Array(children));
            doc
        }
        PredicateNode::Negation { child } => match child.as_ref() {
            PredicateNode::Comparison { field, op, value } => field_document(
                field,
                json!({ "$not": operator_document(*op, value) }),
            ),
            PredicateNode::ElemMatch { field, sub } => field_document(
                field,
                json!({ "$not": { "$elemMatch": Value::Object(compile(sub)) } }),
            ),
            // The engine has no top-level $not; $nor of one clause is its negation.
            PredicateNode::Logical { .. } | PredicateNode::Negation { .. } => {
                let mut doc = Map::new();
                doc.insert(
                    "$nor".to_string(),
                    Value::Array(vec![Value::Object(compile(child))]),
                );
                doc
            }
        },
        PredicateNode::ElemMatch { field, sub } => field_document(
            field,
            json!({ "$elemMatch": Value::Object(compile(sub)) }),
        ),
    }
}

impl ToDocument for PredicateNode {
    fn to_document(&self) -> Value {
        Value::Object(compile(self))
    }
}

impl ToDocument for ProjectionSpec {
    fn to_document(&self) -> Value {
        let doc = self
            .iter()
            .map(|(path, clause)| {
                let value = match clause {
                    ProjectionClause::Include => json!(1),
                    ProjectionClause::Exclude => json!(0),
                    ProjectionClause::ElemMatch(sub) => {
                        json!({ "$elemMatch": sub.to_document() })
                    }
                };
                (path.to_string(), value)
            })
            .collect();
        Value::Object(doc)
    }
}

/// Sorts compile to an ordered list of `[field, 1 | -1]` pairs.
impl ToDocument for SortSpec {
    fn to_document(&self) -> Value {
        Value::Array(
            self.iter()
                .map(|key| json!([key.field.as_str(), key.direction.as_i32()]))
                .collect(),
        )
    }
}

/// Compact JSON
pub fn to_json(value: &Value) -> String {
    value.to_string()
}

/// JSON indented by two spaces
pub fn to_json_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_numbers_have_no_fraction() {
        assert_eq!(Literal::Number(102.0).to_document(), json!(102));
        assert_eq!(Literal::Number(-3.0).to_document(), json!(-3));
        assert_eq!(Literal::Number(2.5).to_document(), json!(2.5));
        assert_eq!(Literal::Number(1e300).to_document(), json!(1e300));
    }

    #[test]
    fn test_date_number_long() {
        let doc = json!({ "$date": { "$numberLong": "1430240400000" } });
        let Some(Literal::DateTime(dt)) = Literal::from_document(&doc) else {
            panic!("expected a date");
        };
        assert_eq!(date_to_string(&dt), "2015-04-28T17:00:00Z");
    }

    #[test]
    fn test_unknown_tags_do_not_decompile() {
        assert_eq!(Literal::from_document(&json!({ "$foo": 1 })), None);
        assert_eq!(Literal::from_document(&json!({ "a": 1, "b": 2 })), None);
        assert_eq!(Literal::from_document(&json!({ "$oid": "abc" })), None);
    }
}
