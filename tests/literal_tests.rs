// tests/literal_tests.rs

use chrono::{TimeZone, Utc};
use mongo_url::ast::{Literal, ObjectId};
use mongo_url::error::{ErrorKind, Grammar};
use mongo_url::lexer::Lexer;
use mongo_url::{ParseOptions, parse_query};
use serde_json::json;

fn literal(input: &str) -> Literal {
    let mut lexer = Lexer::new(input);
    let literal = lexer.parse_literal(0).unwrap();
    assert!(lexer.is_at_end(), "unconsumed input after {:?}", input);
    literal
}

fn literal_err(input: &str) -> mongo_url::ParseError {
    Lexer::new(input).parse_literal(0).unwrap_err()
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_plain_string() {
    assert_eq!(literal(r#""hello""#), Literal::Text("hello".into()));
    assert_eq!(literal(r#""""#), Literal::Text(String::new()));
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        literal(r#""a\"b\\c\/d\n\t""#),
        Literal::Text("a\"b\\c/d\n\t".into())
    );
    assert_eq!(literal(r#""caf\u00e9""#), Literal::Text("caf\u{e9}".into()));
    assert_eq!(literal(r#""\ud83d\ude00""#), Literal::Text("\u{1f600}".into()));
}

#[test]
fn test_string_non_ascii() {
    assert_eq!(literal("\"☠ skull\""), Literal::Text("☠ skull".into()));
}

#[test]
fn test_unterminated_string() {
    let err = literal_err(r#""open"#);
    assert_eq!(err.kind(), &ErrorKind::Syntax);
    assert_eq!(err.grammar(), Grammar::Literal);
    assert_eq!(err.position(), 5);
}

#[test]
fn test_bad_escape() {
    let err = literal_err(r#""\q""#);
    assert!(err.is_syntax());
    assert_eq!(err.found_char(), Some('q'));
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numbers() {
    assert_eq!(literal("42"), Literal::Number(42.0));
    assert_eq!(literal("-7"), Literal::Number(-7.0));
    assert_eq!(literal("+7"), Literal::Number(7.0));
    assert_eq!(literal("3.14"), Literal::Number(3.14));
    assert_eq!(literal("1e3"), Literal::Number(1000.0));
    assert_eq!(literal("-2.5E-2"), Literal::Number(-0.025));
}

#[test]
fn test_trailing_dot_is_not_part_of_number() {
    let mut lexer = Lexer::new("1.");
    assert_eq!(lexer.parse_literal(0).unwrap(), Literal::Number(1.0));
    assert_eq!(lexer.position(), 1);
}

#[test]
fn test_overflowing_number() {
    let err = literal_err("1e999");
    assert_eq!(err.kind(), &ErrorKind::InvalidNumber);
    assert!(err.is_syntax());
}

// ============================================================================
// Keywords
// ============================================================================

#[test]
fn test_keywords() {
    assert_eq!(literal("true"), Literal::Bool(true));
    assert_eq!(literal("false"), Literal::Bool(false));
    assert_eq!(literal("null"), Literal::Null);
}

#[test]
fn test_keyword_prefix_is_not_keyword() {
    assert!(literal_err("nullable").is_syntax());
    assert!(literal_err("falsey").is_syntax());
}

// ============================================================================
// Constructors
// ============================================================================

#[test]
fn test_date() {
    let expected = Literal::DateTime(Utc.with_ymd_and_hms(2015, 4, 28, 17, 0, 0).unwrap());
    assert_eq!(literal(r#"Date("2015-04-28T17:00:00Z")"#), expected);
    assert_eq!(literal("Date(2015-04-28T17:00Z)"), expected);
    assert_eq!(literal(r#"Date("2015-04-28T19:00:00+02:00")"#), expected);
}

#[test]
fn test_invalid_date() {
    let err = literal_err(r#"Date("last tuesday")"#);
    assert_eq!(err.kind(), &ErrorKind::InvalidDate);
    assert!(err.is_semantic());
    assert_eq!(err.position(), 5);
}

#[test]
fn test_object_id() {
    let oid: ObjectId = "507f1f77bcf86cd799439011".parse().unwrap();
    assert_eq!(
        literal(r#"ObjectId("507f1f77bcf86cd799439011")"#),
        Literal::ObjectId(oid)
    );
    assert_eq!(literal("oid(507f1f77bcf86cd799439011)"), Literal::ObjectId(oid));
    assert_eq!(oid.to_hex(), "507f1f77bcf86cd799439011");
    assert_eq!(ObjectId::from_bytes(oid.bytes()), oid);
    assert_eq!(
        ObjectId::from_bytes([0xab; 12]).to_string(),
        "abababababababababababab"
    );
    assert!("507f1f77bcf86cd79943901".parse::<ObjectId>().is_err());
}

#[test]
fn test_object_id_is_never_truncated() {
    let err = literal_err(r#"ObjectId("507f")"#);
    assert_eq!(err.kind(), &ErrorKind::InvalidObjectId);

    let err = literal_err(r#"ObjectId("507f1f77bcf86cd79943901g")"#);
    assert_eq!(err.kind(), &ErrorKind::InvalidObjectId);
    assert_eq!(err.found_char(), Some('g'));

    let err = literal_err(r#"oid("507f1f77bcf86cd7994390110")"#);
    assert_eq!(err.kind(), &ErrorKind::InvalidObjectId);
}

#[test]
fn test_unclosed_constructor() {
    let err = literal_err("Date(2015-04-28");
    assert_eq!(err.kind(), &ErrorKind::Syntax);
    assert_eq!(err.expected(), ["\")\""]);
}

// ============================================================================
// Regular expressions
// ============================================================================

#[test]
fn test_regex() {
    assert_eq!(
        literal("/^ab+c$/i"),
        Literal::Regex {
            pattern: "^ab+c$".into(),
            flags: "i".into()
        }
    );
    assert_eq!(
        literal(r"/a\/b/"),
        Literal::Regex {
            pattern: "a/b".into(),
            flags: String::new()
        }
    );
    assert_eq!(
        literal(r"/\d+/mx"),
        Literal::Regex {
            pattern: r"\d+".into(),
            flags: "mx".into()
        }
    );
}

#[test]
fn test_regex_flags() {
    let err = literal_err("/a/q");
    assert!(matches!(err.kind(), ErrorKind::InvalidRegex(reason) if reason.contains("'q'")));

    let err = literal_err("/a/ii");
    assert!(matches!(err.kind(), ErrorKind::InvalidRegex(reason) if reason.contains("duplicate")));
}

#[test]
fn test_regex_pattern_is_validated() {
    let err = literal_err("/(/");
    assert!(matches!(err.kind(), ErrorKind::InvalidRegex(_)));
    assert!(err.is_semantic());
    assert!(err.to_string().starts_with("Invalid regular expression"));
}

#[test]
fn test_lookaround_and_backreferences_reach_the_engine() {
    assert_eq!(
        literal("/^(?!admin)/"),
        Literal::Regex {
            pattern: "^(?!admin)".into(),
            flags: String::new()
        }
    );
    assert_eq!(
        literal(r"/(a)\1/i"),
        Literal::Regex {
            pattern: r"(a)\1".into(),
            flags: "i".into()
        }
    );
    assert_eq!(
        parse_query("regex(name,/^(?!admin)/)", &ParseOptions::default()).unwrap(),
        json!({ "name": { "$regex": "^(?!admin)" } })
    );

    let err = literal_err("/(?!admin/");
    assert_eq!(
        err.kind(),
        &ErrorKind::InvalidRegex("unclosed group".into())
    );
}

#[test]
fn test_unterminated_regex() {
    let err = literal_err("/abc");
    assert_eq!(err.kind(), &ErrorKind::Syntax);
    assert_eq!(err.found_char(), None);
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn test_sequences() {
    assert_eq!(literal("[]"), Literal::Sequence(vec![]));
    assert_eq!(
        literal(r#"[1,"two",[3,null]]"#),
        Literal::Sequence(vec![
            Literal::Number(1.0),
            Literal::Text("two".into()),
            Literal::Sequence(vec![Literal::Number(3.0), Literal::Null]),
        ])
    );
}

#[test]
fn test_unclosed_sequence() {
    let err = literal_err("[1,2");
    assert_eq!(err.expected(), ["\",\"", "\"]\""]);
    assert_eq!(err.to_string(), "Expected \",\" or \"]\" but end of input found");
}

#[test]
fn test_sequence_nesting_limit() {
    let mut lexer = Lexer::new("[[1]]").with_max_depth(1);
    let err = lexer.parse_literal(0).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::NestingTooDeep { limit: 1 });

    let mut lexer = Lexer::new("[[1]]").with_max_depth(2);
    assert!(lexer.parse_literal(0).is_ok());
}

// ============================================================================
// Failure and rendering
// ============================================================================

#[test]
fn test_no_literal() {
    let err = literal_err("@");
    assert_eq!(err.kind(), &ErrorKind::Syntax);
    assert_eq!(err.found_char(), Some('@'));
    assert!(err.expected().contains(&"string".to_string()));
    assert!(err.expected().contains(&"\"[\"".to_string()));
    assert!(err.to_string().starts_with("Expected string, number, \"true\""));
    assert!(err.to_string().ends_with("but \"@\" found"));
}

#[test]
fn test_display_reparses() {
    let inputs = [
        r#""line\nbreak \"quoted\"""#,
        "-12.5",
        "true",
        "null",
        r#"Date("2015-04-28T17:00:00.123Z")"#,
        r#"ObjectId("507f1f77bcf86cd799439011")"#,
        r"/a\/b\d/im",
        r#"[1,"a",[true,[]]]"#,
    ];

    for input in inputs {
        let parsed = literal(input);
        let rendered = parsed.to_string();
        assert_eq!(literal(&rendered), parsed, "{} rendered as {}", input, rendered);
    }
}

#[test]
fn test_kind_names() {
    assert_eq!(literal("1").kind_name(), "number");
    assert_eq!(literal("[]").kind_name(), "array");
    assert_eq!(literal("true").as_bool(), Some(true));
    assert_eq!(literal("1").as_bool(), None);
}
