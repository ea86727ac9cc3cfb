//! # Query Syntax Trees
//!
//! Typed results of the three URL sub-languages and the literal grammar they
//! share.
//!
//! ## Architecture Overview
//!
//! - **[literal]** - Typed literal values (numbers, strings, dates, ids, regexes, arrays)
//! - **[field_path]** - Dotted field paths shared by every grammar
//! - **[predicate]** - Query predicate trees and their operators
//! - **[projection]** - Field inclusion/exclusion projections
//! - **[sort]** - Ordered sort keys
//!
//! ## Quick Start
//!
//! ```text
//! query=and(gt(age,18),in(status,["active","new"]))&fields=+name,-_id&sort=-age
//! ```
//!
//! compiles to a filter on `age` and `status`, a projection keeping `name`
//! without `_id`, and a descending sort on `age`.
//!
//! ## Query Expressions
//!
//! Every query is a single function call. Comparisons take a field path and a
//! literal, logical combinators take further calls:
//!
//! ```text
//! eq(field, value)         ne lt lte gt gte in nin regex
//! exists(field, true)
//! and(call, call, ...)     or nor
//! not(call)
//! elemMatch(field, call)
//! ```
//!
//! ## Projections and Sorts
//!
//! Comma separated clauses prefixed with `+` or `-`. A space stands in for
//! `+` unless strict encoding is on, since `+` decodes to a space in query
//! strings.
//!
//! ```text
//! +name,+email,elemMatch(students,eq(school,102))
//! -date,+name
//! ```
pub mod field_path;
pub mod literal;
pub mod predicate;
pub mod projection;
pub mod sort;

pub use field_path::FieldPath;
pub use literal::{Literal, ObjectId};
pub use predicate::{ComparisonOp, Function, LogicalOp, PredicateNode};
pub use projection::{ProjectionClause, ProjectionSpec};
pub use sort::{Direction, SortKey, SortSpec};
