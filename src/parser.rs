//! Recursive-descent parsers for the query, projection and sort grammars.
//!
//! A [`Parser`] wraps one [`Lexer`] and is consumed by the parse call, so
//! every call owns its cursor and returns either a complete tree or the first
//! error. Nothing partial escapes.

mod projection;
mod sort;

use crate::ast::{ComparisonOp, Direction, FieldPath, Function, Literal, PredicateNode};
use crate::error::{ArgKind, Arity, ErrorKind, Grammar, ParseError};
use crate::lexer::{CONSTRUCTORS, Lexer};
use crate::options::ParseOptions;
use tracing::{debug, trace};

const STRICT_ENCODING_HINT: &str = "disable strictEncoding to allow space in place of +";

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    options: ParseOptions,
}

/// A call argument before it is checked against the function signature.
enum Arg {
    Call(PredicateNode),
    Literal(Literal),
    Path(FieldPath),
}

impl Arg {
    fn kind(&self) -> ArgKind {
        match self {
            Arg::Call(_) => ArgKind::Expression,
            Arg::Literal(_) => ArgKind::Literal,
            Arg::Path(_) => ArgKind::FieldPath,
        }
    }
}

/// An argument together with the byte offset it started at.
type Positioned = (usize, Arg);

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Parser::with_options(lexer, ParseOptions::default())
    }

    pub fn with_options(lexer: Lexer<'a>, options: ParseOptions) -> Self {
        Parser {
            lexer: lexer.with_max_depth(options.max_depth),
            options,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse the whole input as one query expression.
    pub fn parse_query(mut self) -> Result<PredicateNode, ParseError> {
        debug!(grammar = "query", len = self.lexer.input().len(), "parsing");

        let node = self.parse_call(0)?;
        self.lexer.expect_end(Grammar::Query)?;

        debug!(depth = node.depth(), "parsed query");
        Ok(node)
    }

    /// `call := ident "(" args ")"`
    fn parse_call(&mut self, depth: usize) -> Result<PredicateNode, ParseError> {
        self.lexer.enter(depth, Grammar::Query)?;

        let start = self.lexer.position();
        let name = self.lexer.read_identifier();
        if name.is_empty() {
            return Err(self.lexer.error(Grammar::Query, &["function call"]));
        }
        self.lexer.expect_char('(', Grammar::Query, &["\"(\""])?;

        let function = Function::from_name(name).ok_or_else(|| {
            ParseError::new(
                ErrorKind::UnknownFunction(name.to_string()),
                Grammar::Query,
                start,
            )
        })?;

        let args = self.parse_args(function, depth)?;
        let arity = args.len();
        let node = build_call(function, start, args)?;
        trace!(
            function = function.name(),
            args = arity,
            field = node.field().map(FieldPath::as_str),
            "call"
        );
        Ok(node)
    }

    fn parse_args(
        &mut self,
        function: Function,
        depth: usize,
    ) -> Result<Vec<Positioned>, ParseError> {
        let mut args = Vec::new();
        if self.lexer.eat(')') {
            return Ok(args);
        }

        loop {
            let position = self.lexer.position();
            let field_slot = args.is_empty() && function.takes_field();
            args.push((position, self.parse_arg(depth, field_slot)?));

            match self.lexer.current_char() {
                Some(',') => self.lexer.advance(),
                Some(')') => {
                    self.lexer.advance();
                    return Ok(args);
                }
                _ => return Err(self.lexer.error(Grammar::Query, &["\",\"", "\")\""])),
            }
        }
    }

    /// Ordered choice: call, then literal, then field path.
    ///
    /// A literal that starts with an unambiguous opener is committed. A bare
    /// number or keyword only counts when the argument ends right after it,
    /// otherwise the text is re-read as a field path. In a field slot any
    /// uncommitted text is read as a path straight away, so `eq(0,5)` names
    /// the field `0`.
    fn parse_arg(&mut self, depth: usize, field_slot: bool) -> Result<Arg, ParseError> {
        let start = self.lexer.position();

        if self.at_call() {
            return self.parse_call(depth + 1).map(Arg::Call);
        }

        let committed = self.at_committed_literal();
        if field_slot && !committed {
            return self.lexer.read_field_path(false).map(Arg::Path);
        }

        match self.lexer.parse_literal(depth + 1) {
            Ok(literal) if committed || self.at_arg_end() => return Ok(Arg::Literal(literal)),
            Err(err) if committed => return Err(err),
            Err(err) if matches!(err.kind(), ErrorKind::InvalidNumber) => {
                // only a number that fills the whole argument is out of range
                self.lexer.reset(start);
                let path = self.lexer.read_field_path(false)?;
                if path.as_str().parse::<f64>().is_ok() {
                    return Err(err);
                }
                return Ok(Arg::Path(path));
            }
            _ => self.lexer.reset(start),
        }

        self.lexer.read_field_path(false).map(Arg::Path)
    }

    fn at_call(&self) -> bool {
        let rest = &self.lexer.input()[self.lexer.position()..];
        let len = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
        len > 0 && rest[len..].starts_with('(') && !CONSTRUCTORS.contains(&&rest[..len])
    }

    fn at_committed_literal(&self) -> bool {
        let rest = &self.lexer.input()[self.lexer.position()..];
        matches!(rest.chars().next(), Some('"') | Some('[') | Some('/'))
            || CONSTRUCTORS.iter().any(|name| {
                rest.strip_prefix(*name)
                    .is_some_and(|after| after.starts_with('('))
            })
    }

    fn at_arg_end(&self) -> bool {
        matches!(self.lexer.current_char(), Some(',') | Some(')'))
    }

    /// Read a `+`/`-` prefix, accepting a space as `+` unless strict.
    fn read_prefix(
        &mut self,
        grammar: Grammar,
        expected: &[&str],
    ) -> Result<(Direction, char), ParseError> {
        let position = self.lexer.position();
        let direction = match self.lexer.current_char() {
            Some('+') => (Direction::Ascending, '+'),
            Some('-') => (Direction::Descending, '-'),
            Some(' ') if !self.options.strict_encoding => {
                trace!(position, "space read as +");
                (Direction::Ascending, ' ')
            }
            Some(' ') => {
                return Err(
                    ParseError::syntax(grammar, position, &["\"+\"", "\"-\""], Some(' '))
                        .with_hint(STRICT_ENCODING_HINT),
                );
            }
            _ => return Err(self.lexer.error(grammar, expected)),
        };
        self.lexer.advance();
        Ok(direction)
    }

    /// After a clause: either another `,` separated clause or the end.
    fn next_clause(&mut self, grammar: Grammar) -> Result<bool, ParseError> {
        match self.lexer.current_char() {
            None => Ok(false),
            Some(',') => {
                self.lexer.advance();
                Ok(true)
            }
            _ => Err(self.lexer.error(grammar, &["\",\"", "end of input"])),
        }
    }
}

fn build_call(
    function: Function,
    start: usize,
    args: Vec<Positioned>,
) -> Result<PredicateNode, ParseError> {
    match function {
        Function::Comparison(op) => {
            let [field, value] = exactly(function, start, args)?;
            let field = path_arg(function, 0, field)?;
            let (position, value) = literal_arg(function, 1, value)?;

            let required = match (op, &value) {
                (ComparisonOp::Exists, Literal::Bool(_)) => None,
                (ComparisonOp::Exists, _) => Some(ArgKind::Boolean),
                (ComparisonOp::In | ComparisonOp::Nin, Literal::Sequence(_)) => None,
                (ComparisonOp::In | ComparisonOp::Nin, _) => Some(ArgKind::Sequence),
                (ComparisonOp::Regex, Literal::Text(_) | Literal::Regex { .. }) => None,
                (ComparisonOp::Regex, _) => Some(ArgKind::Pattern),
                _ => None,
            };
            if let Some(expected) = required {
                return Err(kind_error(function, 1, expected, position));
            }

            Ok(PredicateNode::Comparison { field, op, value })
        }
        Function::Logical(op) => {
            if args.is_empty() {
                return Err(arity_error(function, Arity::AtLeast(1), 0, start));
            }
            let children = args
                .into_iter()
                .enumerate()
                .map(|(index, arg)| call_arg(function, index, arg))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(PredicateNode::Logical { op, children })
        }
        Function::Not => {
            let [child] = exactly(function, start, args)?;
            Ok(PredicateNode::Negation {
                child: Box::new(call_arg(function, 0, child)?),
            })
        }
        Function::ElemMatch => {
            let [field, sub] = exactly(function, start, args)?;
            Ok(PredicateNode::ElemMatch {
                field: path_arg(function, 0, field)?,
                sub: Box::new(call_arg(function, 1, sub)?),
            })
        }
    }
}

fn exactly<const N: usize>(
    function: Function,
    start: usize,
    args: Vec<Positioned>,
) -> Result<[Positioned; N], ParseError> {
    args.try_into()
        .map_err(|args: Vec<Positioned>| arity_error(function, Arity::Exactly(N), args.len(), start))
}

fn path_arg(function: Function, index: usize, (position, arg): Positioned) -> Result<FieldPath, ParseError> {
    match arg {
        Arg::Path(path) => Ok(path),
        _ => Err(kind_error(function, index, ArgKind::FieldPath, position)),
    }
}

fn literal_arg(
    function: Function,
    index: usize,
    (position, arg): Positioned,
) -> Result<(usize, Literal), ParseError> {
    match arg {
        Arg::Literal(literal) => Ok((position, literal)),
        _ => Err(kind_error(function, index, ArgKind::Literal, position)),
    }
}

fn call_arg(function: Function, index: usize, (position, arg): Positioned) -> Result<PredicateNode, ParseError> {
    match arg {
        Arg::Call(node) => Ok(node),
        other => {
            trace!(found = ?other.kind(), "expected a call");
            Err(kind_error(function, index, ArgKind::Expression, position))
        }
    }
}

fn arity_error(function: Function, expected: Arity, found: usize, position: usize) -> ParseError {
    ParseError::new(
        ErrorKind::Arity {
            function: function.name().to_string(),
            expected,
            found,
        },
        Grammar::Query,
        position,
    )
}

fn kind_error(function: Function, index: usize, expected: ArgKind, position: usize) -> ParseError {
    ParseError::new(
        ErrorKind::ArgumentKind {
            function: function.name().to_string(),
            index,
            expected,
        },
        Grammar::Query,
        position,
    )
}
