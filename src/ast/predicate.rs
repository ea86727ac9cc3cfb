use crate::ast::{FieldPath, Literal};

/// Field comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Equal (`eq`)
    Eq,
    /// Not equal (`ne`)
    Ne,
    /// Less than (`lt`)
    Lt,
    /// Less than or equal (`lte`)
    Lte,
    /// Greater than (`gt`)
    Gt,
    /// Greater than or equal (`gte`)
    Gte,
    /// Value in list (`in`)
    In,
    /// Value not in list (`nin`)
    Nin,
    /// Field presence (`exists`)
    Exists,
    /// Pattern match (`regex`)
    Regex,
}

impl ComparisonOp {
    pub const ALL: [ComparisonOp; 10] = [
        ComparisonOp::Eq,
        ComparisonOp::Ne,
        ComparisonOp::Lt,
        ComparisonOp::Lte,
        ComparisonOp::Gt,
        ComparisonOp::Gte,
        ComparisonOp::In,
        ComparisonOp::Nin,
        ComparisonOp::Exists,
        ComparisonOp::Regex,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Ne => "ne",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Lte => "lte",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Gte => "gte",
            ComparisonOp::In => "in",
            ComparisonOp::Nin => "nin",
            ComparisonOp::Exists => "exists",
            ComparisonOp::Regex => "regex",
        }
    }

    /// The operator tag in the compiled document
    pub fn operator(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "$eq",
            ComparisonOp::Ne => "$ne",
            ComparisonOp::Lt => "$lt",
            ComparisonOp::Lte => "$lte",
            ComparisonOp::Gt => "$gt",
            ComparisonOp::Gte => "$gte",
            ComparisonOp::In => "$in",
            ComparisonOp::Nin => "$nin",
            ComparisonOp::Exists => "$exists",
            ComparisonOp::Regex => "$regex",
        }
    }
}

/// Logical combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
    Nor,
}

impl LogicalOp {
    pub fn name(&self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
            LogicalOp::Nor => "nor",
        }
    }

    pub fn operator(&self) -> &'static str {
        match self {
            LogicalOp::And => "$and",
            LogicalOp::Or => "$or",
            LogicalOp::Nor => "$nor",
        }
    }
}

/// Every identifier that may start a call in a query expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Comparison(ComparisonOp),
    Logical(LogicalOp),
    Not,
    ElemMatch,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "and" => Function::Logical(LogicalOp::And),
            "or" => Function::Logical(LogicalOp::Or),
            "nor" => Function::Logical(LogicalOp::Nor),
            "not" => Function::Not,
            "elemMatch" => Function::ElemMatch,
            _ => {
                return ComparisonOp::ALL
                    .iter()
                    .find(|op| op.name() == name)
                    .map(|op| Function::Comparison(*op));
            }
        };
        Some(function)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Comparison(op) => op.name(),
            Function::Logical(op) => op.name(),
            Function::Not => "not",
            Function::ElemMatch => "elemMatch",
        }
    }

    /// Whether the first argument names a field.
    pub fn takes_field(&self) -> bool {
        matches!(self, Function::Comparison(_) | Function::ElemMatch)
    }
}

/// The compiled form of a query expression.
///
/// Built once per parse and owned by the caller; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateNode {
    /// `eq(field, value)` and the other comparison functions
    Comparison {
        field: FieldPath,
        op: ComparisonOp,
        value: Literal,
    },

    /// `and(...)`, `or(...)`, `nor(...)`; children are never empty
    Logical {
        op: LogicalOp,
        children: Vec<PredicateNode>,
    },

    /// `not(expr)`
    Negation { child: Box<PredicateNode> },

    /// `elemMatch(field, expr)`
    ElemMatch {
        field: FieldPath,
        sub: Box<PredicateNode>,
    },
}

impl PredicateNode {
    /// The field a single-field node constrains, if any
    pub fn field(&self) -> Option<&FieldPath> {
        match self {
            PredicateNode::Comparison { field, .. } | PredicateNode::ElemMatch { field, .. } => {
                Some(field)
            }
            PredicateNode::Logical { .. } | PredicateNode::Negation { .. } => None,
        }
    }

    /// Nesting depth of the tree; a lone comparison has depth 1
    pub fn depth(&self) -> usize {
        match self {
            PredicateNode::Comparison { .. } => 1,
            PredicateNode::Logical { children, .. } => {
                1 + children.iter().map(PredicateNode::depth).max().unwrap_or(0)
            }
            PredicateNode::Negation { child } => 1 + child.depth(),
            PredicateNode::ElemMatch { sub, .. } => 1 + sub.depth(),
        }
    }
}
