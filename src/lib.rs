pub mod ast;
pub mod cli;
pub mod error;
pub mod lexer;
pub mod options;
pub mod output;
pub mod params;
pub mod parser;

pub use ast::{
    ComparisonOp, Direction, FieldPath, Literal, LogicalOp, ObjectId, PredicateNode,
    ProjectionClause, ProjectionSpec, SortKey, SortSpec,
};
pub use error::{ErrorCategory, ErrorKind, Grammar, ParseError};
pub use lexer::Lexer;
pub use options::{DEFAULT_MAX_DEPTH, ParseOptions};
pub use output::{ToDocument, to_json, to_json_pretty};
pub use params::{
    FindOptions, OptionError, ParamName, Params, ParamsError, ParsedParams, RangeError,
    parse_fields, parse_limit, parse_params, parse_query, parse_query_string, parse_skip,
    parse_sort,
};
pub use parser::Parser;
