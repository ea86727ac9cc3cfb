// tests/scenario_tests.rs

use mongo_url::ast::{Literal, PredicateNode, ProjectionClause};
use mongo_url::error::{ErrorKind, PathRule};
use mongo_url::lexer::Lexer;
use mongo_url::params::{projection, query, sort};
use mongo_url::{
    ParseOptions, ToDocument, parse_fields, parse_query, parse_query_string, parse_sort,
};
use serde_json::json;

// ============================================================================
// Literal round trip through eq()
// ============================================================================

#[test]
fn test_every_literal_kind_survives_compilation() {
    let literals = [
        "42",
        "-3",
        "0.125",
        "6.02e23",
        r#""plain""#,
        r#""esc\"aped\\ é""#,
        "true",
        "false",
        "null",
        r#"Date("2015-04-28T17:00:00Z")"#,
        r#"Date("1969-07-20T20:17:40.5Z")"#,
        "oid(507f1f77bcf86cd799439011)",
        "/^a\\/b$/imsx",
        "[]",
        r#"[1,"two",[true,null],Date("2020-02-29")]"#,
    ];

    for source in literals {
        let expected = Lexer::new(source).parse_literal(0).unwrap();

        let compiled = parse_query(&format!("eq(field,{})", source), &ParseOptions::default())
            .unwrap();
        let value = &compiled["field"]["$eq"];
        let decompiled = Literal::from_document(value)
            .unwrap_or_else(|| panic!("{} compiled to undecodable {}", source, value));

        assert_eq!(decompiled, expected, "round trip of {}", source);
        assert_eq!(expected.to_document(), *value);
    }
}

// ============================================================================
// Projection direction
// ============================================================================

#[test]
fn test_mixing_directions_always_fails() {
    let names = ["name", "email", "deep.path", "_id.sub"];
    for first in names {
        for second in names {
            if first == second {
                continue;
            }
            for (a, b, expected) in [('+', '-', "\"+\""), ('-', '+', "\"-\"")] {
                let input = format!("{}{},{}{}", a, first, b, second);
                let err = parse_fields(&input, &ParseOptions::default()).unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::MixedProjection, "{}", input);
                assert!(err.is_semantic());
                assert!(
                    err.to_string().starts_with(&format!("Expected {}", expected)),
                    "{}",
                    err
                );
            }
        }
    }
}

#[test]
fn test_id_is_exempt_from_direction() {
    for input in ["+a,+b,-_id", "-_id,+a,+b", "-a,-b,+_id", "+_id,-a"] {
        let spec = projection(input, &ParseOptions::default()).unwrap();
        assert_eq!(spec.len(), input.split(',').count());
    }
}

// ============================================================================
// Field path rejection
// ============================================================================

#[test]
fn test_reserved_paths_fail_everywhere() {
    let bad = [
        (".a", PathRule::LeadingDot),
        ("a.", PathRule::TrailingDot),
        ("a..b", PathRule::ConsecutiveDots),
        ("a\0", PathRule::NullCharacter),
        ("$a", PathRule::LeadingDollar),
    ];
    let options = ParseOptions::default();

    for (path, rule) in bad {
        let errors = [
            parse_fields(&format!("+{}", path), &options).unwrap_err(),
            parse_sort(&format!("-{}", path), &options).unwrap_err(),
            parse_query(&format!("exists({},true)", path), &options).unwrap_err(),
        ];
        for err in errors {
            assert_eq!(err.kind(), &ErrorKind::FieldPath(rule), "{:?}", path);
            assert!(err.is_syntax());
        }
    }

    for path in ["a$", "a.b$c", "pri$ce.total"] {
        assert!(parse_fields(&format!("+{}", path), &options).is_ok());
        assert!(parse_sort(&format!("-{}", path), &options).is_ok());
        assert!(parse_query(&format!("exists({},true)", path), &options).is_ok());
    }
}

// ============================================================================
// Sort order
// ============================================================================

#[test]
fn test_sort_preserves_input_order() {
    let inputs = ["+a", "-b,+a", "+a,+a,+a", "-z,+y,-x,+y,-z"];
    for input in inputs {
        let spec = sort(input, &ParseOptions::default()).unwrap();
        let rendered: Vec<String> = spec
            .iter()
            .map(|key| format!("{}{}", key.direction.prefix(), key.field))
            .collect();
        assert_eq!(rendered.join(","), input);
    }
}

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn test_nested_elem_match_below_limit() {
    let node = query("elemMatch(a,elemMatch(b,eq(c,1)))", &ParseOptions::default()).unwrap();
    let PredicateNode::ElemMatch { sub, .. } = node else {
        panic!("expected elemMatch");
    };
    let PredicateNode::ElemMatch { field, sub } = *sub else {
        panic!("expected nested elemMatch");
    };
    assert_eq!(field.as_str(), "b");
    assert!(matches!(*sub, PredicateNode::Comparison { .. }));
}

#[test]
fn test_nesting_at_limit_fails() {
    fn elem_matches(levels: usize) -> String {
        let mut input = "eq(z,1)".to_string();
        for i in 0..levels {
            input = format!("elemMatch(f{},{})", i, input);
        }
        input
    }

    for limit in [1, 2, 5, 16] {
        let options = ParseOptions::default().with_max_depth(limit);
        assert!(parse_query(&elem_matches(limit - 1), &options).is_ok());

        let err = parse_query(&elem_matches(limit), &options).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NestingTooDeep { limit });
    }
}

#[test]
fn test_projection_elem_match_counts_its_clause() {
    let options = ParseOptions::default().with_max_depth(2);
    assert!(parse_fields("elemMatch(a,eq(b,1))", &options).is_ok());
    assert!(parse_fields("elemMatch(a,elemMatch(b,eq(c,1)))", &options).is_err());
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_include() {
    let spec = projection("+name", &ParseOptions::default()).unwrap();
    assert_eq!(spec.get("name"), Some(&ProjectionClause::Include));
    assert_eq!(spec.to_document(), json!({ "name": 1 }));
}

#[test]
fn test_scenario_exclude_two() {
    let spec = projection("-name,-email", &ParseOptions::default()).unwrap();
    assert_eq!(spec.get("name"), Some(&ProjectionClause::Exclude));
    assert_eq!(spec.get("email"), Some(&ProjectionClause::Exclude));
}

#[test]
fn test_scenario_mixed() {
    let err = parse_fields("-name,+email", &ParseOptions::default()).unwrap_err();
    assert!(err.is_semantic());
    assert!(err.to_string().contains("Expected \"-\""));
}

#[test]
fn test_scenario_equality() {
    assert_eq!(
        parse_query("eq(id,1)", &ParseOptions::default()).unwrap(),
        json!({ "id": { "$eq": 1 } })
    );
}

#[test]
fn test_scenario_query_with_sort() {
    let parsed = parse_query_string("query=lt(id,5)&sort=-id", &ParseOptions::default()).unwrap();
    assert_eq!(parsed.query, json!({ "id": { "$lt": 5 } }));
    assert_eq!(parsed.options.sort, Some(json!([["id", -1]])));
}

#[test]
fn test_scenario_elem_match() {
    assert_eq!(
        parse_query("elemMatch(students,eq(school,102))", &ParseOptions::default()).unwrap(),
        json!({ "students": { "$elemMatch": { "school": { "$eq": 102 } } } })
    );
}
