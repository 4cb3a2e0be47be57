//! Operands on the evaluation stack

use crate::ast::{Term, TermKind};
use crate::common::Span;
use crate::diagnostics::InterpreterError;

use super::scope::Scope;

/// Stack entry: a term from the statement, or a number computed from two
/// earlier entries
#[derive(Debug, Clone, PartialEq)]
pub enum Operand<'a> {
    Term(&'a Term),
    Computed { value: f64, line: usize, span: Span },
}

impl Operand<'_> {
    pub fn line(&self) -> usize {
        match self {
            Operand::Term(term) => term.line,
            Operand::Computed { line, .. } => *line,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Operand::Term(term) => term.span,
            Operand::Computed { span, .. } => *span,
        }
    }

    /// Variable name, if this operand is a bare variable reference
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Operand::Term(Term {
                kind: TermKind::Variable(name),
                ..
            }) => Some(name),
            _ => None,
        }
    }

    /// Numeric value of this operand in `scope`
    pub fn resolve(&self, scope: &Scope) -> Result<f64, InterpreterError> {
        let term = match self {
            Operand::Computed { value, .. } => return Ok(*value),
            Operand::Term(term) => term,
        };
        match &term.kind {
            TermKind::Number(n) => Ok(*n),
            TermKind::Variable(name) => {
                scope
                    .get(name)
                    .ok_or_else(|| InterpreterError::UndeclaredVariable {
                        line: term.line,
                        name: name.clone(),
                        span: term.span.into(),
                    })
            }
            TermKind::Unknown(text) => Err(InterpreterError::NotANumber {
                line: term.line,
                found: text.clone(),
                span: term.span.into(),
            }),
            _ => Err(InterpreterError::NotANumber {
                line: term.line,
                found: term.to_string(),
                span: term.span.into(),
            }),
        }
    }
}
