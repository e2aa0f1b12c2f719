//! Error reporting: every failure aborts the query and carries a diagnostic
//! code and, where a token is at fault, a label pointing at it.

use miette::Diagnostic;
use molsel::{AtomPool, EvalError, ParseError, QuerySession, SelectionError};

fn pool() -> AtomPool {
    AtomPool::builder()
        .residue("ALA", 1)
        .atom("CA", "C", [0.0; 3])
        .build()
}

fn error(query: &str) -> SelectionError {
    match molsel::evaluate(query, &pool()) {
        Ok(set) => panic!("query '{}' unexpectedly selected {:?}", query, set),
        Err(e) => e,
    }
}

fn code(err: &SelectionError) -> String {
    err.code().map(|c| c.to_string()).unwrap_or_default()
}

/// (offset, length) of the first label.
fn label(err: &SelectionError) -> Option<(usize, usize)> {
    err.labels()?
        .next()
        .map(|l| (l.offset(), l.len()))
}

#[test]
fn unknown_keyword_points_at_token() {
    let err = error("protein and frobnicate");
    assert_eq!(code(&err), "molsel::unknown_keyword");
    assert_eq!(label(&err), Some((12, 10)));
    assert_eq!(err.to_string(), "Unknown keyword: frobnicate");
    assert!(err.source_code().is_some());
}

#[test]
fn renders_with_source_snippet() {
    let err = error("name CA or frobnicate");
    let mut out = String::new();
    miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
        .render_report(&mut out, &err)
        .unwrap();
    assert!(out.contains("molsel::unknown_keyword"), "{}", out);
    assert!(out.contains("name CA or frobnicate"), "{}", out);
    assert!(out.contains("unknown keyword"), "{}", out);
}

#[test]
fn keywords_are_case_sensitive() {
    assert_eq!(code(&error("PROTEIN")), "molsel::unknown_keyword");
    assert_eq!(code(&error("Name CA")), "molsel::unknown_keyword");
}

#[test]
fn missing_arguments() {
    let err = error("name and protein");
    assert!(matches!(
        &err,
        SelectionError::Parse(ParseError::MissingArgument { keyword, .. }) if keyword == "name"
    ));
    assert_eq!(label(&err), Some((0, 4)));
    assert_eq!(code(&error("resid")), "molsel::missing_argument");
    assert_eq!(code(&error("around")), "molsel::missing_argument");
}

#[test]
fn end_of_input() {
    for query in ["", "   ", "not", "protein or", "byres"] {
        let err = error(query);
        assert_eq!(code(&err), "molsel::unexpected_end", "{:?}", query);
        assert_eq!(label(&err), Some((query.len(), 0)), "{:?}", query);
    }
}

#[test]
fn parentheses() {
    let err = error("protein and (water or name CA");
    assert_eq!(code(&err), "molsel::unbalanced_parenthesis");
    assert_eq!(label(&err), Some((12, 1)));

    assert_eq!(code(&error("()")), "molsel::unexpected_token");
    assert_eq!(code(&error("water)")), "molsel::unexpected_token");
    assert_eq!(code(&error("(water) (protein)")), "molsel::unexpected_token");
}

#[test]
fn numbers() {
    let err = error("resid 1:b");
    assert_eq!(code(&err), "molsel::invalid_number");
    assert_eq!(label(&err), Some((6, 3)));
    assert_eq!(code(&error("around x name CA")), "molsel::invalid_number");
    assert_eq!(code(&error("insphere 0 0 zero 1")), "molsel::invalid_number");
}

#[test]
fn leaf_validation_errors() {
    assert!(matches!(
        error("prop q < 3"),
        SelectionError::Eval(EvalError::UnknownProperty { .. })
    ));
    assert!(matches!(
        error("prop x ~ 3"),
        SelectionError::Eval(EvalError::UnknownOperator { .. })
    ));
    let err = error("ss turn");
    assert_eq!(code(&err), "molsel::unknown_secondary_structure");
    assert_eq!(label(&err), Some((3, 4)));
}

#[test]
fn session_errors_abort_without_partial_results() {
    let mut session = QuerySession::default();
    session.define_selection("pocket", [1]).unwrap();
    let expr = session.parse("pocket or all").unwrap();
    session.remove_selection("pocket");
    assert!(matches!(
        session.evaluate_expr(&expr, &pool()),
        Err(EvalError::UndefinedSelection { name }) if name == "pocket"
    ));
    // the keyword is gone as well
    assert!(matches!(
        session.evaluate("pocket or all", &pool()),
        Err(SelectionError::Parse(ParseError::UnknownKeyword { .. }))
    ));
}
