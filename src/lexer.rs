use crate::ast::{FieldPath, Literal, ObjectId};
use crate::error::{ErrorKind, Grammar, ParseError, PathRule};
use crate::options::DEFAULT_MAX_DEPTH;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::trace;

const LITERAL_EXPECTED: &[&str] = &[
    "string",
    "number",
    "\"true\"",
    "\"false\"",
    "\"null\"",
    "\"Date(\"",
    "\"ObjectId(\"",
    "\"oid(\"",
    "regular expression",
    "\"[\"",
];

const REGEX_FLAGS: &str = "imsx";

/// Literal constructors that look like calls but belong to the literal grammar.
pub(crate) const CONSTRUCTORS: [&str; 3] = ["Date", "ObjectId", "oid"];

/// A byte cursor over one input string.
///
/// Each parse call owns its own lexer, so there is no state shared between
/// calls. Positions reported in errors are byte offsets into the input.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    max_depth: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Rewind to an earlier position, for ordered-choice backtracking
    pub(crate) fn reset(&mut self, position: usize) {
        self.position = position;
    }

    pub fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    pub fn peek_char(&self, offset: usize) -> Option<char> {
        self.input[self.position..].chars().nth(offset)
    }

    pub fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.input[self.position..].starts_with(s)
    }

    pub fn eat(&mut self, ch: char) -> bool {
        if self.current_char() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.position += s.len();
            true
        } else {
            false
        }
    }

    /// A syntax error at the current position
    pub(crate) fn error(&self, grammar: Grammar, expected: &[&str]) -> ParseError {
        ParseError::syntax(grammar, self.position, expected, self.current_char())
    }

    pub(crate) fn expect_char(
        &mut self,
        ch: char,
        grammar: Grammar,
        expected: &[&str],
    ) -> Result<(), ParseError> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.error(grammar, expected))
        }
    }

    pub(crate) fn expect_end(&self, grammar: Grammar) -> Result<(), ParseError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.error(grammar, &["end of input"]))
        }
    }

    /// Fails once a construct would sit `max_depth` levels deep.
    pub(crate) fn enter(&self, depth: usize, grammar: Grammar) -> Result<(), ParseError> {
        if depth >= self.max_depth {
            return Err(ParseError::new(
                ErrorKind::NestingTooDeep {
                    limit: self.max_depth,
                },
                grammar,
                self.position,
            ));
        }
        Ok(())
    }

    /// Read a run of ASCII letters (function names)
    pub fn read_identifier(&mut self) -> &'a str {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphabetic() {
                self.advance();
            } else {
                break;
            }
        }
        &self.input[start..self.position]
    }

    /// Read a double-quoted string, starting at the opening quote.
    pub fn read_string(&mut self) -> Result<String, ParseError> {
        self.expect_char('"', Grammar::Literal, &["string"])?;
        let mut result = String::new();

        loop {
            match self.current_char() {
                None => return Err(self.error(Grammar::Literal, &["\"\\\"\""])),
                Some('"') => {
                    self.advance();
                    return Ok(result);
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.current_char() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('u') => {
                            self.advance();
                            result.push(self.read_unicode_escape()?);
                            continue;
                        }
                        _ => return Err(self.error(Grammar::Literal, &["escape sequence"])),
                    };
                    result.push(escaped);
                    self.advance();
                }
                Some(ch) => {
                    result.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn read_hex4(&mut self) -> Result<u32, ParseError> {
        let start = self.position;
        let digits = self.input[start..]
            .get(..4)
            .filter(|s| s.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| self.error(Grammar::Literal, &["4 hexadecimal digits"]))?;
        self.position += 4;
        u32::from_str_radix(digits, 16)
            .map_err(|_| ParseError::syntax(Grammar::Literal, start, &["4 hexadecimal digits"], None))
    }

    // Called just after `\u`
    fn read_unicode_escape(&mut self) -> Result<char, ParseError> {
        let start = self.position;
        let mut code = self.read_hex4()?;

        if (0xD800..0xDC00).contains(&code) && self.eat_str("\\u") {
            let low = self.read_hex4()?;
            if (0xDC00..0xE000).contains(&low) {
                code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
            }
        }

        char::from_u32(code).ok_or_else(|| {
            ParseError::syntax(Grammar::Literal, start, &["unicode scalar value"], None)
        })
    }

    /// Read `[+-]?digits(.digits)?([eE][+-]?digits)?` as a 64-bit float.
    pub fn read_number(&mut self) -> Result<f64, ParseError> {
        let start = self.position;

        if matches!(self.current_char(), Some('+') | Some('-')) {
            self.advance();
        }
        if !self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            return Err(ParseError::new(ErrorKind::InvalidNumber, Grammar::Literal, self.position)
                .expecting(&["digit"])
                .found(self.current_char()));
        }
        self.skip_digits();

        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.advance();
            self.skip_digits();
        }

        if matches!(self.current_char(), Some('e') | Some('E')) {
            let before_exponent = self.position;
            self.advance();
            if matches!(self.current_char(), Some('+') | Some('-')) {
                self.advance();
            }
            if self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                self.skip_digits();
            } else {
                self.reset(before_exponent);
            }
        }

        let text = &self.input[start..self.position];
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(ParseError::new(ErrorKind::InvalidNumber, Grammar::Literal, start)
                .expecting(&["finite number"])
                .found(text.chars().next())),
        }
    }

    fn skip_digits(&mut self) {
        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Match a keyword as a whole token, not as the prefix of a longer name
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if !self.starts_with(keyword) {
            return false;
        }
        let next = self.input[self.position + keyword.len()..].chars().next();
        if next.is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$') {
            return false;
        }
        self.position += keyword.len();
        true
    }

    /// Parse one literal at `depth` levels of nesting.
    ///
    /// Alternatives are tried in order and the first match wins: string,
    /// number, keyword, constructor, regular expression, array.
    pub fn parse_literal(&mut self, depth: usize) -> Result<Literal, ParseError> {
        let start = self.position;
        let literal = match self.current_char() {
            Some('"') => Literal::Text(self.read_string()?),
            Some(c) if c.is_ascii_digit() => Literal::Number(self.read_number()?),
            Some('+') | Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                Literal::Number(self.read_number()?)
            }
            _ if self.eat_keyword("true") => Literal::Bool(true),
            _ if self.eat_keyword("false") => Literal::Bool(false),
            _ if self.eat_keyword("null") => Literal::Null,
            _ if self.eat_str("Date(") => Literal::DateTime(self.read_date()?),
            _ if self.eat_str("ObjectId(") || self.eat_str("oid(") => {
                Literal::ObjectId(self.read_object_id()?)
            }
            Some('/') => self.read_regex()?,
            Some('[') => Literal::Sequence(self.read_sequence(depth)?),
            _ => return Err(self.error(Grammar::Literal, LITERAL_EXPECTED)),
        };

        trace!(position = start, kind = literal.kind_name(), "literal");
        Ok(literal)
    }

    /// The argument of `Date(...)` or `ObjectId(...)`, quoted or bare, up to
    /// and including the closing parenthesis.
    fn read_constructor_arg(&mut self) -> Result<(usize, String), ParseError> {
        let start = self.position;
        let value = if self.current_char() == Some('"') {
            self.read_string()?
        } else {
            while let Some(ch) = self.current_char() {
                if ch == ')' || ch == ',' {
                    break;
                }
                self.advance();
            }
            self.input[start..self.position].to_string()
        };
        self.expect_char(')', Grammar::Literal, &["\")\""])?;
        Ok((start, value))
    }

    fn read_date(&mut self) -> Result<DateTime<Utc>, ParseError> {
        let (start, text) = self.read_constructor_arg()?;
        parse_iso_date(&text).ok_or_else(|| {
            ParseError::new(ErrorKind::InvalidDate, Grammar::Literal, start)
                .expecting(&["ISO-8601 date"])
                .found(text.chars().next())
        })
    }

    fn read_object_id(&mut self) -> Result<ObjectId, ParseError> {
        let (start, text) = self.read_constructor_arg()?;
        ObjectId::parse_hex(&text).ok_or_else(|| {
            ParseError::new(ErrorKind::InvalidObjectId, Grammar::Literal, start)
                .expecting(&["24 hexadecimal characters"])
                .found(text.chars().find(|c| !c.is_ascii_hexdigit()))
        })
    }

    /// `/pattern/flags`; `\/` stands for a literal slash in the pattern.
    fn read_regex(&mut self) -> Result<Literal, ParseError> {
        let start = self.position;
        self.expect_char('/', Grammar::Literal, &["regular expression"])?;

        let mut pattern = String::new();
        loop {
            match self.current_char() {
                None => return Err(self.error(Grammar::Literal, &["\"/\""])),
                Some('/') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.current_char() {
                        Some('/') => pattern.push('/'),
                        Some(ch) => {
                            pattern.push('\\');
                            pattern.push(ch);
                        }
                        None => return Err(self.error(Grammar::Literal, &["escaped character"])),
                    }
                    self.advance();
                }
                Some(ch) => {
                    pattern.push(ch);
                    self.advance();
                }
            }
        }

        let mut flags = String::new();
        while let Some(ch) = self.current_char().filter(|c| c.is_ascii_alphabetic()) {
            if !REGEX_FLAGS.contains(ch) {
                return Err(ParseError::new(
                    ErrorKind::InvalidRegex(format!("unsupported flag '{}'", ch)),
                    Grammar::Literal,
                    self.position,
                ));
            }
            if flags.contains(ch) {
                return Err(ParseError::new(
                    ErrorKind::InvalidRegex(format!("duplicate flag '{}'", ch)),
                    Grammar::Literal,
                    self.position,
                ));
            }
            flags.push(ch);
            self.advance();
        }

        check_pattern(&pattern, &flags).map_err(|reason| {
            ParseError::new(ErrorKind::InvalidRegex(reason), Grammar::Literal, start)
        })?;

        Ok(Literal::Regex { pattern, flags })
    }

    fn read_sequence(&mut self, depth: usize) -> Result<Vec<Literal>, ParseError> {
        self.enter(depth, Grammar::Literal)?;
        self.expect_char('[', Grammar::Literal, &["\"[\""])?;

        let mut items = Vec::new();
        if self.eat(']') {
            return Ok(items);
        }

        loop {
            items.push(self.parse_literal(depth + 1)?);
            match self.current_char() {
                Some(',') => self.advance(),
                Some(']') => {
                    self.advance();
                    return Ok(items);
                }
                _ => return Err(self.error(Grammar::Literal, &["\",\"", "\"]\""])),
            }
        }
    }

    /// Read a dotted field path up to `,`, `(`, `)` or end of input.
    ///
    /// Only the first character of the path may not be `$`; later segments
    /// follow the same rule unless `allow_positional` permits a final `$`
    /// segment (the positional projection operator).
    pub fn read_field_path(&mut self, allow_positional: bool) -> Result<FieldPath, ParseError> {
        let start = self.position;
        let mut segment_start = start;

        if self.current_char() == Some('$') {
            return Err(self.path_error(PathRule::LeadingDollar));
        }

        loop {
            match self.current_char() {
                None | Some(',') | Some('(') | Some(')') => break,
                Some('\0') => return Err(self.path_error(PathRule::NullCharacter)),
                Some('.') => {
                    if self.position == segment_start {
                        let rule = if segment_start == start {
                            PathRule::LeadingDot
                        } else {
                            PathRule::ConsecutiveDots
                        };
                        return Err(self.path_error(rule));
                    }
                    self.advance();
                    segment_start = self.position;

                    if self.current_char() == Some('$') {
                        let positional = allow_positional
                            && matches!(self.peek_char(1), None | Some(',') | Some(')'));
                        if !positional {
                            return Err(self.path_error(PathRule::LeadingDollar));
                        }
                    }
                }
                Some(_) => self.advance(),
            }
        }

        if self.position == segment_start {
            let rule = if segment_start == start {
                PathRule::Empty
            } else {
                PathRule::TrailingDot
            };
            return Err(self.path_error(rule));
        }

        Ok(FieldPath::from_validated(&self.input[start..self.position]))
    }

    fn path_error(&self, rule: PathRule) -> ParseError {
        ParseError::new(ErrorKind::FieldPath(rule), Grammar::FieldPath, self.position)
            .expecting(&["field name"])
            .found(self.current_char())
            .with_hint(rule.description())
    }
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS[.fff]]` with `Z`, an offset or no
/// zone (read as UTC), and a bare `YYYY-MM-DD` (midnight UTC).
pub(crate) fn parse_iso_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = text.strip_suffix(['Z', 'z']).unwrap_or(text);
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// Group openers the `regex` crate does not implement but the query engine does.
const ENGINE_GROUPS: [&str; 10] = ["?=", "?!", "?<=", "?<!", "?>", "?|", "?R", "?&", "?P=", "?P>"];

/// Validate a regex literal before it is handed to the database.
///
/// Anything the `regex` crate compiles is accepted as is. Patterns it refuses
/// because they use look-around, backreferences, atomic groups or possessive
/// quantifiers are still valid for the engine, so those only need balanced
/// groups and character classes.
fn check_pattern(pattern: &str, flags: &str) -> Result<(), String> {
    let compiled = regex::RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .build();
    let Err(err) = compiled else {
        return Ok(());
    };

    if scan_pattern(pattern)? {
        trace!(pattern, "pattern left to the engine");
        return Ok(());
    }
    let reason = err.to_string();
    Err(reason.lines().last().unwrap_or_default().trim().to_string())
}

/// Walk the pattern checking group and class balance. Returns whether it uses
/// an engine-only construct.
fn scan_pattern(pattern: &str) -> Result<bool, String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut depth = 0usize;
    let mut engine_only = false;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                match chars.get(i + 1) {
                    None => return Err("trailing backslash".to_string()),
                    Some('1'..='9' | 'k' | 'g' | 'G' | 'K') => engine_only = true,
                    Some(_) => {}
                }
                i += 2;
                continue;
            }
            '[' => {
                i = skip_class(&chars, i)?;
                continue;
            }
            '(' => {
                depth += 1;
                let rest: String = chars[i + 1..].iter().take(3).collect();
                if ENGINE_GROUPS.iter().any(|group| rest.starts_with(group)) {
                    engine_only = true;
                }
            }
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unopened group".to_string())?;
            }
            '*' | '+' | '?' | '}' if chars.get(i + 1) == Some(&'+') => {
                engine_only = true;
                i += 2;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    if depth > 0 {
        return Err("unclosed group".to_string());
    }
    Ok(engine_only)
}

/// Index just past the `]` closing the class opened at `start`.
fn skip_class(chars: &[char], start: usize) -> Result<usize, String> {
    let mut i = start + 1;
    if chars.get(i) == Some(&'^') {
        i += 1;
    }
    // a leading ] is a member
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    loop {
        match chars.get(i) {
            None => return Err("unclosed character class".to_string()),
            Some('\\') => i += 2,
            Some(']') => return Ok(i + 1),
            Some(_) => i += 1,
        }
    }
}

#[test]
fn test_cursor_tracks_bytes() {
    let mut lexer = Lexer::new("☠a");
    assert_eq!(lexer.current_char(), Some('☠'));
    lexer.advance();
    assert_eq!(lexer.position(), '☠'.len_utf8());
    assert_eq!(lexer.current_char(), Some('a'));
    lexer.advance();
    assert!(lexer.is_at_end());
}

#[test]
fn test_keywords_are_whole_tokens() {
    let mut lexer = Lexer::new("trueish");
    assert!(lexer.parse_literal(0).is_err());

    let mut lexer = Lexer::new("null,");
    assert_eq!(lexer.parse_literal(0).unwrap(), Literal::Null);
    assert_eq!(lexer.current_char(), Some(','));
}

#[test]
fn test_exponent_without_digits_is_not_consumed() {
    let mut lexer = Lexer::new("2e)");
    assert_eq!(lexer.read_number().unwrap(), 2.0);
    assert_eq!(lexer.current_char(), Some('e'));
}

#[test]
fn test_date_forms() {
    let expected = Utc.with_ymd_and_hms(2015, 4, 28, 17, 0, 0).unwrap();
    assert_eq!(parse_iso_date("2015-04-28T17:00Z"), Some(expected));
    assert_eq!(parse_iso_date("2015-04-28T17:00:00Z"), Some(expected));
    assert_eq!(parse_iso_date("2015-04-28T19:00+02:00"), Some(expected));
    assert_eq!(
        parse_iso_date("2015-04-28"),
        Some(Utc.with_ymd_and_hms(2015, 4, 28, 0, 0, 0).unwrap())
    );
    assert_eq!(parse_iso_date("yesterday"), None);
}

#[test]
fn test_engine_only_patterns_pass_through() {
    for source in [r"/^(?!admin)/", r"/(a)\1/", r"/(?<=a)b/", r"/(?>ab|a)c/", r"/a++b/"] {
        let literal = Lexer::new(source).parse_literal(0).unwrap();
        let Literal::Regex { pattern, flags } = literal else {
            panic!("{} is not a regex", source);
        };
        assert_eq!(format!("/{}/", pattern), source);
        assert!(flags.is_empty());
    }
}

#[test]
fn test_unbalanced_patterns_fail() {
    for (pattern, reason) in [
        ("(?!a", "unclosed group"),
        ("(a)\\1)", "unopened group"),
        ("(?=[a)", "unclosed character class"),
    ] {
        assert_eq!(scan_pattern(pattern), Err(reason.to_string()), "{}", pattern);
    }
    assert_eq!(scan_pattern("[)(]"), Ok(false));
    assert_eq!(scan_pattern("[]a](?!b)"), Ok(true));
}
