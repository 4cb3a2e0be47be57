//! Diagnostic reporting with source locations
//!
//! Two error kinds, both fatal to a run: [`ParseError`] for malformed
//! structure found while building the function table, and
//! [`InterpreterError`] for semantic violations during evaluation. Every
//! variant carries the offending 1-based line, and a span where one exists,
//! so a caller holding the source can render it with miette.

use crate::common::Span;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::sync::Arc;
use thiserror::Error;

/// Source file for error reporting
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Arc<str>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.to_string())
    }
}

/// Convert our Span to miette's SourceSpan
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// Structural errors raised while parsing
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ParseError {
    #[error("line {line}: unexpected end of input, expected {expected}")]
    #[diagnostic(code(parse::unexpected_eof))]
    UnexpectedEof {
        line: usize,
        expected: &'static str,
    },

    #[error("line {line}: expected {expected}, found `{found}`")]
    #[diagnostic(code(parse::unexpected_token))]
    UnexpectedToken {
        line: usize,
        expected: &'static str,
        found: String,
        #[label("unexpected token here")]
        span: SourceSpan,
    },

    #[error("line {line}: unbalanced equation, `)` has no matching `(`")]
    #[diagnostic(code(parse::unbalanced))]
    UnmatchedCloseParen {
        line: usize,
        #[label("unmatched `)`")]
        span: SourceSpan,
    },

    #[error("line {line}: unbalanced equation, `(` is never closed")]
    #[diagnostic(code(parse::unbalanced))]
    UnclosedParen {
        line: usize,
        #[label("opened here")]
        span: SourceSpan,
    },

    #[error("line {line}: invalid number literal `{text}`")]
    #[diagnostic(code(parse::invalid_number))]
    InvalidNumber {
        line: usize,
        text: String,
        #[label("not a number")]
        span: SourceSpan,
    },

    #[error("line {line}: function `{name}` is already defined on line {first_line}")]
    #[diagnostic(code(parse::duplicate_function))]
    DuplicateFunction {
        line: usize,
        name: String,
        first_line: usize,
        #[label("redefined here")]
        span: SourceSpan,
    },

    #[error("line {line}: parameter `{name}` appears twice in `{function}`")]
    #[diagnostic(code(parse::duplicate_parameter))]
    DuplicateParameter {
        line: usize,
        name: String,
        function: String,
        #[label("repeated here")]
        span: SourceSpan,
    },

    #[error("line {line}: statement appears before any `fn` declaration")]
    #[diagnostic(
        code(parse::statement_outside_function),
        help("wrap statements in `fn main() ... end`")
    )]
    StatementOutsideFunction {
        line: usize,
        #[label("no enclosing function")]
        span: SourceSpan,
    },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedEof { line, .. }
            | ParseError::UnexpectedToken { line, .. }
            | ParseError::UnmatchedCloseParen { line, .. }
            | ParseError::UnclosedParen { line, .. }
            | ParseError::InvalidNumber { line, .. }
            | ParseError::DuplicateFunction { line, .. }
            | ParseError::DuplicateParameter { line, .. }
            | ParseError::StatementOutsideFunction { line, .. } => *line,
        }
    }
}

/// Semantic errors raised while evaluating
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum InterpreterError {
    #[error("line {line}: stack overflow, recursion budget exhausted entering `{function}`")]
    #[diagnostic(code(interp::recursion_limit))]
    RecursionLimit {
        line: usize,
        function: String,
        #[label("call exceeds the recursion budget")]
        span: Option<SourceSpan>,
    },

    #[error("line {line}: recursion limit {requested} exceeds the maximum of {max}")]
    #[diagnostic(code(interp::recursion_limit_too_large))]
    RecursionLimitTooLarge { line: usize, requested: i64, max: i64 },

    #[error("line {line}: no function named `{name}`")]
    #[diagnostic(code(interp::unknown_function))]
    UnknownFunction {
        line: usize,
        name: String,
        #[label("called here")]
        span: Option<SourceSpan>,
    },

    #[error(
        "line {line}: unable to execute `{function}` due to mismatching arguments, expected {expected}, got {found}"
    )]
    #[diagnostic(code(interp::arity_mismatch))]
    ArityMismatch {
        line: usize,
        function: String,
        expected: usize,
        found: usize,
        #[label("called here")]
        span: Option<SourceSpan>,
    },

    #[error("line {line}: variable `{name}` is not declared")]
    #[diagnostic(
        code(interp::undeclared_variable),
        help("assign it first with `{name} is ...;`")
    )]
    UndeclaredVariable {
        line: usize,
        name: String,
        #[label("used before assignment")]
        span: SourceSpan,
    },

    #[error("line {line}: malformed expression, `{operator}` needs two operands")]
    #[diagnostic(code(interp::malformed_expression))]
    MalformedExpression {
        line: usize,
        operator: String,
        #[label("missing operand")]
        span: SourceSpan,
    },

    #[error("line {line}: left of assignment operator is not a variable")]
    #[diagnostic(code(interp::invalid_assignment))]
    AssignToNonVariable {
        line: usize,
        #[label("cannot assign to this")]
        span: SourceSpan,
    },

    #[error("line {line}: cannot do math on `{found}`, only variables and numbers")]
    #[diagnostic(code(interp::not_a_number))]
    NotANumber {
        line: usize,
        found: String,
        #[label("not a number or variable")]
        span: SourceSpan,
    },

    #[error("line {line}: statement leaves {leftover} unused operand(s)")]
    #[diagnostic(
        code(interp::unbalanced_statement),
        help("a statement must be an assignment or a call")
    )]
    UnbalancedStatement {
        line: usize,
        leftover: usize,
        #[label("value computed but never used")]
        span: SourceSpan,
    },
}

impl InterpreterError {
    pub fn line(&self) -> usize {
        match self {
            InterpreterError::RecursionLimit { line, .. }
            | InterpreterError::RecursionLimitTooLarge { line, .. }
            | InterpreterError::UnknownFunction { line, .. }
            | InterpreterError::ArityMismatch { line, .. }
            | InterpreterError::UndeclaredVariable { line, .. }
            | InterpreterError::MalformedExpression { line, .. }
            | InterpreterError::AssignToNonVariable { line, .. }
            | InterpreterError::NotANumber { line, .. }
            | InterpreterError::UnbalancedStatement { line, .. } => *line,
        }
    }
}

/// Any error the source-to-scope pipeline can raise
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Interpreter(#[from] InterpreterError),
}

impl Error {
    pub fn line(&self) -> usize {
        match self {
            Error::Parse(e) => e.line(),
            Error::Interpreter(e) => e.line(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_leads_with_line() {
        let err = ParseError::UnmatchedCloseParen {
            line: 4,
            span: Span::new(0, 1).into(),
        };
        assert_eq!(
            err.to_string(),
            "line 4: unbalanced equation, `)` has no matching `(`"
        );
    }

    #[test]
    fn test_umbrella_keeps_line() {
        let err: Error = InterpreterError::UndeclaredVariable {
            line: 2,
            name: "b".into(),
            span: Span::new(5, 6).into(),
        }
        .into();
        assert_eq!(err.line(), 2);
        assert!(err.to_string().contains("`b`"));
    }
}
