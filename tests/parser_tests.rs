//! Parser tests

use ferrule::ast::*;
use ferrule::lexer::lex;
use ferrule::parser::parse;
use ferrule::ParseError;
use pretty_assertions::assert_eq;

fn parse_source(source: &str) -> FunctionTable {
    parse(lex(source)).unwrap()
}

fn parse_err(source: &str) -> ParseError {
    parse(lex(source)).unwrap_err()
}

/// Postfix rendering of every statement in `main`
fn main_postfix(source: &str) -> Vec<String> {
    let table = parse_source(source);
    table
        .get("main")
        .expect("main defined")
        .statements
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_parse_empty_program() {
    let table = parse_source("");
    assert!(table.is_empty());
}

#[test]
fn test_parse_simple_function() {
    let table = parse_source("fn main() end");
    assert_eq!(table.len(), 1);

    let main = table.get("main").unwrap();
    assert_eq!(main.name, "main");
    assert!(main.params.is_empty());
    assert_eq!(main.statements.len(), 1);
    assert!(main.statements[0].is_end_marker());
}

#[test]
fn test_parse_function_with_params() {
    let table = parse_source("fn add(a, b) c is a + b; end");
    let add = table.get("add").unwrap();
    assert_eq!(add.params, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(add.statements.len(), 2);
}

#[test]
fn test_parse_params_without_commas() {
    let table = parse_source("fn f(a b c) end");
    assert_eq!(table.get("f").unwrap().params.len(), 3);
}

#[test]
fn test_parse_functions_in_declaration_order() {
    let table = parse_source("fn zeta() end fn alpha() end fn main() end");
    let names: Vec<_> = table.names().collect();
    assert_eq!(names, vec!["zeta", "alpha", "main"]);
}

#[test]
fn test_parse_postfix_scenario() {
    let postfix = main_postfix(
        "fn main() a is 2*2*(10+10)/10/10/10/10/10/10; b is 5*(1+2); end",
    );
    insta::assert_snapshot!(postfix[0].as_str(), @"a 2 2 * 10 10 + * 10 / 10 / 10 / 10 / 10 / 10 / is");
    insta::assert_snapshot!(postfix[1].as_str(), @"b 5 1 2 + * is");
    assert_eq!(postfix[2], "end");
}

#[test]
fn test_parse_comparison_shares_additive_level() {
    let postfix = main_postfix("fn main() a is 1 + 1 equals 2; b is 2 equals 1 + 1; end");
    assert_eq!(postfix[0], "a 1 1 + 2 equals is");
    assert_eq!(postfix[1], "b 2 1 equals 1 + is");
}

#[test]
fn test_parse_nested_parentheses() {
    let postfix = main_postfix("fn main() a is ((1 + 2) * (3 - 4)) / 5; end");
    assert_eq!(postfix[0], "a 1 2 + 3 4 - * 5 / is");
}

#[test]
fn test_parse_numbers_are_resolved() {
    let table = parse_source("fn main() a is 2.5; end");
    let stmt = &table.get("main").unwrap().statements[0];
    assert_eq!(stmt.terms[1].kind, TermKind::Number(2.5));
    assert_eq!(stmt.terms[0].kind, TermKind::Variable("a".into()));
    assert_eq!(stmt.terms[2].kind, TermKind::Operator(BinaryOp::Assign));
}

#[test]
fn test_parse_statement_lines() {
    let table = parse_source("fn main()\n  a is 1;\n  b is 2;\nend\n");
    let lines: Vec<_> = table
        .get("main")
        .unwrap()
        .statements
        .iter()
        .map(|s| s.line)
        .collect();
    assert_eq!(lines, vec![2, 3, 4]);
}

#[test]
fn test_parse_call_statement() {
    let postfix = main_postfix("fn f(x, y) end fn main() f(1 + 2, 3); end");
    assert_eq!(postfix[0], "1 2 + 3 f/2");
}

#[test]
fn test_parse_statement_without_semicolon_runs_to_eof() {
    let postfix = main_postfix("fn main() a is 1");
    assert_eq!(postfix, vec!["a 1 is".to_string()]);
}

#[test]
fn test_parse_if_keyword_is_carried_inert() {
    let postfix = main_postfix("fn main() if a; end");
    assert_eq!(postfix[0], "if a");
}

#[test]
fn test_parse_is_idempotent_across_fresh_lexes() {
    let source = "fn helper(n) m is n * 2; end\nfn main() a is 1; helper(a); end";
    assert_eq!(parse_source(source), parse_source(source));
}

// ==================== Errors ====================

#[test]
fn test_unclosed_paren() {
    let err = parse_err("fn main()\n(1+2;\nend");
    assert!(matches!(err, ParseError::UnclosedParen { .. }));
    assert_eq!(err.line(), 2);
    assert!(err.to_string().contains("unbalanced equation"));
}

#[test]
fn test_unmatched_close_paren() {
    let err = parse_err("fn main()\n  a is 1 + 2);\nend");
    assert!(matches!(err, ParseError::UnmatchedCloseParen { .. }));
    assert_eq!(err.line(), 2);
}

#[test]
fn test_missing_function_name() {
    let err = parse_err("fn");
    assert!(matches!(
        err,
        ParseError::UnexpectedEof {
            expected: "function name",
            ..
        }
    ));
}

#[test]
fn test_missing_paren_after_name() {
    let err = parse_err("fn main a is 1; end");
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
}

#[test]
fn test_unterminated_param_list() {
    let err = parse_err("fn main(a, b");
    assert!(matches!(err, ParseError::UnexpectedEof { .. }));
}

#[test]
fn test_invalid_number() {
    let err = parse_err("fn main()\n a is 12abc; end");
    assert_eq!(
        err,
        ParseError::InvalidNumber {
            line: 2,
            text: "12abc".into(),
            span: (16, 5).into(),
        }
    );
}

#[test]
fn test_duplicate_function() {
    let err = parse_err("fn main() end\nfn main() end");
    match err {
        ParseError::DuplicateFunction {
            name,
            line,
            first_line,
            ..
        } => {
            assert_eq!(name, "main");
            assert_eq!(line, 2);
            assert_eq!(first_line, 1);
        }
        other => panic!("Expected duplicate function, got {:?}", other),
    }
}

#[test]
fn test_duplicate_parameter() {
    let err = parse_err("fn f(a, a) end");
    assert!(matches!(err, ParseError::DuplicateParameter { ref name, .. } if name == "a"));
}

#[test]
fn test_statement_before_any_function() {
    let err = parse_err("a is 1;");
    assert!(matches!(err, ParseError::StatementOutsideFunction { line: 1, .. }));
}
