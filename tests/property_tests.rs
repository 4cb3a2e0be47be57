//! Property-based tests for the pipeline.
//!
//! Expressions are generated as infix text and checked against a small
//! reference evaluator that applies the usual precedence directly.

use ferrule::{Interpreter, InterpreterError};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_op() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("+"),
        Just("-"),
        Just("*"),
        Just("/"),
        Just("equals"),
        Just("notequals"),
    ]
}

/// Infix expression over single-digit literals, optionally parenthesized
fn arb_expr() -> impl Strategy<Value = String> {
    let leaf = (1u32..=9).prop_map(|n| n.to_string());
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), arb_op(), inner.clone())
                .prop_map(|(l, op, r)| format!("{} {} {}", l, op, r)),
            inner.prop_map(|e| format!("({})", e)),
        ]
    })
}

fn arb_piece() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9]{0,4}",
        "[1-9][0-9]{0,3}",
        prop_oneof![
            Just("+"),
            Just("-"),
            Just("*"),
            Just("/"),
            Just("("),
            Just(")"),
            Just(","),
            Just(";"),
        ]
        .prop_map(str::to_string),
    ]
}

fn arb_gap() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(""), Just(" "), Just("   "), Just("\t"), Just("\n"), Just(" \n ")]
}

// ============================================================================
// Reference evaluator
// ============================================================================

struct Reference<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Reference<'a> {
    fn new(source: &'a str) -> Self {
        let tokens = source.split_whitespace().collect();
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> &'a str {
        let tok = self.tokens[self.pos];
        self.pos += 1;
        tok
    }

    /// additive and comparison level, left to right
    fn expr(&mut self) -> f64 {
        let mut value = self.term();
        while let Some(op @ ("+" | "-" | "equals" | "notequals")) = self.peek() {
            self.next();
            let rhs = self.term();
            value = match op {
                "+" => value + rhs,
                "-" => value - rhs,
                "equals" => f64::from(u8::from(value == rhs)),
                _ => f64::from(u8::from(value != rhs)),
            };
        }
        value
    }

    fn term(&mut self) -> f64 {
        let mut value = self.atom();
        while let Some(op @ ("*" | "/")) = self.peek() {
            self.next();
            let rhs = self.atom();
            value = if op == "*" { value * rhs } else { value / rhs };
        }
        value
    }

    fn atom(&mut self) -> f64 {
        match self.next() {
            "(" => {
                let value = self.expr();
                assert_eq!(self.next(), ")");
                value
            }
            lit => lit.parse().unwrap(),
        }
    }
}

fn reference_eval(expr: &str) -> f64 {
    let spaced = expr.replace('(', " ( ").replace(')', " ) ");
    Reference::new(&spaced).expr()
}

fn same_number(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Postfix evaluation agrees with direct infix evaluation
    #[test]
    fn postfix_matches_infix(expr in arb_expr()) {
        let source = format!("fn main() a is {}; end", expr);
        let scope = ferrule::run(&source).unwrap();
        let got = scope.get("a").unwrap();
        let want = reference_eval(&expr);
        prop_assert!(same_number(got, want), "{} gave {} but expected {}", expr, got, want);
    }

    /// Joining token texts with single spaces gives back the pieces
    #[test]
    fn tokens_rejoin_to_source(pieces in prop::collection::vec((arb_piece(), arb_gap()), 1..20)) {
        let mut source = String::new();
        let mut prev_symbol = true;
        for (piece, gap) in &pieces {
            let is_symbol = piece.len() == 1 && !piece.chars().all(char::is_alphanumeric);
            // two words need real whitespace between them to stay apart
            let gap = if gap.is_empty() && !prev_symbol && !is_symbol { " " } else { gap };
            source.push_str(gap);
            source.push_str(piece);
            prev_symbol = is_symbol;
        }

        let joined: Vec<_> = ferrule::tokenize(&source).into_iter().map(|t| t.text).collect();
        let expected: Vec<_> = pieces.iter().map(|(p, _)| p.as_str()).collect();
        prop_assert_eq!(joined.join(" "), expected.join(" "));
    }

    /// Line numbers count the newlines before each token
    #[test]
    fn token_lines_match_newlines(pieces in prop::collection::vec((arb_piece(), arb_gap()), 1..20)) {
        let source: String = pieces.iter().map(|(p, g)| format!("{} {}", g, p)).collect();
        for token in ferrule::tokenize(&source) {
            let newlines = source[..token.span.start].matches('\n').count();
            prop_assert_eq!(token.line, newlines + 1);
        }
    }

    /// Two fresh passes over the same source build the same table
    #[test]
    fn parse_is_deterministic(exprs in prop::collection::vec(arb_expr(), 1..5)) {
        let body: String = exprs
            .iter()
            .enumerate()
            .map(|(i, e)| format!("v{} is {};\n", i, e))
            .collect();
        let source = format!("fn main()\n{}end", body);
        prop_assert_eq!(ferrule::parse(&source).unwrap(), ferrule::parse(&source).unwrap());
    }

    /// A chain of `depth` nested entries fits a budget exactly when
    /// `depth <= budget`
    #[test]
    fn budget_bounds_nesting_exactly(depth in 1usize..40, budget in 0i64..40) {
        let mut source = String::new();
        for i in 1..depth {
            source.push_str(&format!("fn f{}() f{}(); end\n", i, i + 1));
        }
        source.push_str(&format!("fn f{}() end\n", depth));

        let interp = Interpreter::new(ferrule::parse(&source).unwrap());
        let result = interp.execute("f1", &[], budget);
        prop_assert_eq!(result.is_ok(), depth as i64 <= budget);
        if let Err(err) = result {
            let failed_at = (budget.max(0) + 1).to_string();
            let is_limit = matches!(
                err,
                InterpreterError::RecursionLimit { ref function, .. } if *function == format!("f{}", failed_at)
            );
            prop_assert!(is_limit);
        }
    }

    /// Lexing and parsing arbitrary text never panics
    #[test]
    fn pipeline_no_panic(input in ".{0,100}") {
        let _ = ferrule::run(&input);
    }
}
