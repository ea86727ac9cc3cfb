// tests/cli_tests.rs

use mongo_url::ParseOptions;
use mongo_url::cli::{
    CheckOptions, CheckResult, CliError, CompileTarget, execute_check, execute_compile,
    get_doc_category, get_docs_overview,
};
use serde_json::json;

// ============================================================================
// compile
// ============================================================================

#[test]
fn test_compile_each_grammar() {
    let options = ParseOptions::default();
    assert_eq!(
        execute_compile(CompileTarget::Query, "gt(age,18)", &options).unwrap(),
        json!({ "age": { "$gt": 18 } })
    );
    assert_eq!(
        execute_compile(CompileTarget::Fields, "+name,-_id", &options).unwrap(),
        json!({ "name": 1, "_id": 0 })
    );
    assert_eq!(
        execute_compile(CompileTarget::Sort, "-age", &options).unwrap(),
        json!([["age", -1]])
    );
}

#[test]
fn test_compile_reports_position() {
    let err = execute_compile(CompileTarget::Query, "eq(a,1)x", &ParseOptions::default())
        .unwrap_err();
    assert!(matches!(err, CliError::Parse(_)));
    assert_eq!(
        err.to_string(),
        "Parse error at position 7: Expected end of input but \"x\" found"
    );
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_syntax_only() {
    let options = CheckOptions {
        input: Some("query=exists(email,true)&limit=10".into()),
        syntax_only: true,
        ..CheckOptions::default()
    };
    assert!(matches!(execute_check(&options), Ok(CheckResult::SyntaxValid)));
}

#[test]
fn test_check_respects_parse_options() {
    let options = CheckOptions {
        input: Some("sort=+name".into()),
        parse: ParseOptions::strict(),
        syntax_only: false,
    };
    let err = execute_check(&options).unwrap_err();
    assert!(matches!(err, CliError::Params(_)));
}

// ============================================================================
// docs
// ============================================================================

#[test]
fn test_docs() {
    assert!(get_docs_overview().contains("DOCUMENTATION CATEGORIES"));
    for category in ["literals", "query", "fields", "sort", "params"] {
        assert!(get_doc_category(category).is_ok(), "{}", category);
    }
    assert!(matches!(
        get_doc_category("tutorial"),
        Err(CliError::UnknownCategory(_))
    ));
}
