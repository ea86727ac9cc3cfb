//! Documentation content for the mongo-url CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Literals,
    Query,
    Fields,
    Sort,
    Params,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "literals" | "literal" | "values" => Some(Self::Literals),
            "query" | "queries" | "filter" => Some(Self::Query),
            "fields" | "projection" => Some(Self::Fields),
            "sort" => Some(Self::Sort),
            "params" | "parameters" | "skip" | "limit" => Some(Self::Params),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"MONGO-URL DOCUMENTATION

mongo-url compiles compact URL query parameters into MongoDB filter,
projection and sort documents.

  ?query=and(gte(age,18),in(role,["admin","staff"]))&fields=+name,-_id&sort=-age&limit=10

DOCUMENTATION CATEGORIES

  literals          Strings, numbers, booleans, null, dates, object ids, regexes, arrays
  query             Function call syntax for filters
  fields            Projection clauses (+field, -field, elemMatch)
  sort              Sort keys (+field, -field)
  params            The query/fields/sort/skip/limit parameters and their errors

QUICK REFERENCE

  eq(f,v) ne lt lte gt gte in nin exists regex     Comparisons
  and(...) or(...) nor(...) not(q)                 Logic
  elemMatch(f,q)                                   Array element match
  +f -f                                            Include / exclude, ascending / descending

Run 'mongo-url doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Literals) => Ok(LITERALS_DOC),
        Some(DocCategory::Query) => Ok(QUERY_DOC),
        Some(DocCategory::Fields) => Ok(FIELDS_DOC),
        Some(DocCategory::Sort) => Ok(SORT_DOC),
        Some(DocCategory::Params) => Ok(PARAMS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const LITERALS_DOC: &str = r#"LITERALS

STRINGS
  "text"                    Double-quoted, JSON escapes: \" \\ \/ \b \f \n \r \t \uXXXX

NUMBERS
  42  -7  3.14  1e3  -2.5E-2
  Integral values compile without a fraction: 42 -> 42

KEYWORDS
  true  false  null         Matched as whole words only

DATES
  Date("2015-04-28T17:00:00Z")
  Date(2015-04-28)           Quotes are optional
  Compiles to {"$date": "2015-04-28T17:00:00Z"}

OBJECT IDS
  ObjectId("507f1f77bcf86cd799439011")
  oid(507f1f77bcf86cd799439011)
  Exactly 24 hex digits. Compiles to {"$oid": "..."}

REGULAR EXPRESSIONS
  /^ab+c$/i                 Flags: i m s x, each at most once
  /a\/b/                    Escape / inside the pattern
  Compiles to {"$regularExpression": {"pattern": "...", "options": "..."}}

ARRAYS
  [1, "two", [3]]           Any literal, nested; [] is allowed
"#;

const QUERY_DOC: &str = r#"QUERY

A query is a single function call. Arguments are comma separated without
whitespace around them. An argument is a nested call, a literal, or a field path.

COMPARISONS (field, literal)
  eq(age,18)                {"age": {"$eq": 18}}
  ne  lt  lte  gt  gte      {"f": {"$ne": v}} ...
  in(role,["a","b"])        Value must be an array
  nin(role,["a"])           Value must be an array
  exists(email,true)        Value must be true or false
  regex(name,/^jo/i)        Value must be a regex or a string

LOGIC
  and(q1,q2,...)            {"$and": [q1, q2, ...]}
  or(q1,q2,...)             {"$or": [...]}
  nor(q1,q2,...)            {"$nor": [...]}
  not(lt(age,18))           {"age": {"$not": {"$lt": 18}}}
  not(and(...))             {"$nor": [{"$and": [...]}]}

ARRAYS
  elemMatch(tags,eq(k,"x")) {"tags": {"$elemMatch": {"k": {"$eq": "x"}}}}

FIELD PATHS
  name  address.city  items.0.sku
  Must not be empty, start or end with '.', contain '..', start with '$'
  or contain a NUL character.

NESTING
  Calls and arrays may nest up to --max-depth levels (default 128).
"#;

const FIELDS_DOC: &str = r#"FIELDS

Comma separated clauses, each one of:

  +path                     Include: {"path": 1}
  -path                     Exclude: {"path": 0}
  elemMatch(path,query)     {"path": {"$elemMatch": {...}}}
  items.$                   Positional projection of the matched element

RULES
  Inclusion and exclusion may not be mixed, except for _id:
    +name,-_id              OK
    +name,-email            Error
  A repeated path keeps the last clause in its first position.

ENCODING
  A literal '+' in a URL decodes to a space. Spaces are accepted as '+'
  unless --strict-encoding is set; use %2B to send a real '+'.
"#;

const SORT_DOC: &str = r#"SORT

Comma separated keys, each +path or -path:

  sort=-created,+name       [["created", -1], ["name", 1]]

Key order is significant and duplicates are kept.
A leading space is read as '+' unless --strict-encoding is set.
"#;

const PARAMS_DOC: &str = r#"PARAMS

  query=<call>              Filter document; {} when absent
  fields=<clauses>          options.fields
  sort=<keys>               options.sort
  skip=<n>                  options.skip, non-negative integer
  limit=<n>                 options.limit, non-negative integer

Empty values count as absent. Unknown parameters are ignored.

ERRORS
  The first failing parameter aborts parsing. Messages are prefixed with it:

  Error parsing fields: Expected "-"; projection cannot mix inclusion and exclusion
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_aliases() {
        assert_eq!(DocCategory::from_name("Projection"), Some(DocCategory::Fields));
        assert_eq!(DocCategory::from_name("limit"), Some(DocCategory::Params));
        assert_eq!(DocCategory::from_name("nope"), None);
    }

    #[test]
    fn test_unknown_category_errors() {
        assert!(matches!(
            get_doc_category("operators"),
            Err(CliError::UnknownCategory(_))
        ));
        assert!(get_doc_category("query").unwrap().starts_with("QUERY"));
    }
}
