//! Parser for ferrule
//!
//! Consumes the token list once and produces a [`FunctionTable`]. Function
//! headers are recognized structurally; every statement body is reordered
//! from infix to postfix with a shunting-yard pass so the evaluator never
//! looks at precedence.

use std::iter::Peekable;
use std::vec;

use crate::ast::*;
use crate::common::Span;
use crate::diagnostics::ParseError;
use crate::lexer::{Token, TokenKind};

/// Parse a token list into a function table
pub fn parse(tokens: Vec<Token>) -> Result<FunctionTable, ParseError> {
    let mut parser = Parser::new(tokens);
    parser.parse_program()?;
    Ok(parser.table)
}

/// Parser state
struct Parser {
    tokens: Peekable<vec::IntoIter<Token>>,
    table: FunctionTable,
    /// Function that receives statements
    current: Option<String>,
    /// Line of the most recently consumed token
    line: usize,
}

/// Entry on the shunting-yard operator stack
enum Pending {
    Operator(Term),
    /// An open parenthesis, possibly the argument list of a call
    Paren {
        line: usize,
        span: Span,
        call: Option<CallSite>,
    },
}

/// A call whose argument list is still open
struct CallSite {
    name: String,
    line: usize,
    span: Span,
    commas: usize,
    has_args: bool,
}

impl CallSite {
    fn arity(&self) -> usize {
        if self.has_args { self.commas + 1 } else { 0 }
    }
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
            table: FunctionTable::new(),
            current: None,
            line: 0,
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.next()?;
        self.line = token.line;
        Some(token)
    }

    /// Next token, or an end-of-input error naming what was expected
    fn expect_any(&mut self, expected: &'static str) -> Result<Token, ParseError> {
        self.advance().ok_or(ParseError::UnexpectedEof {
            line: self.line,
            expected,
        })
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        let token = self.expect_any(expected)?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::UnexpectedToken {
                line: token.line,
                expected,
                found: token.text,
                span: token.span.into(),
            })
        }
    }

    fn at(&mut self, kind: TokenKind) -> bool {
        self.tokens.peek().is_some_and(|t| t.kind == kind)
    }

    // ==================== PROGRAM ====================

    fn parse_program(&mut self) -> Result<(), ParseError> {
        while let Some(kind) = self.tokens.peek().map(|t| t.kind) {
            match kind {
                TokenKind::Fn => self.parse_function_header()?,
                TokenKind::End => {
                    let token = self.expect_any("`end`")?;
                    self.push_statement(Statement::end_marker(token.line, token.span), token.span)?;
                }
                _ => {
                    let (stmt, span) = self.parse_statement()?;
                    self.push_statement(stmt, span)?;
                }
            }
        }

        tracing::debug!("parsed {} functions", self.table.len());
        Ok(())
    }

    fn push_statement(&mut self, stmt: Statement, span: Span) -> Result<(), ParseError> {
        let def = self
            .current
            .as_deref()
            .and_then(|name| self.table.get_mut(name));
        match def {
            Some(def) => {
                def.statements.push(stmt);
                Ok(())
            }
            None => Err(ParseError::StatementOutsideFunction {
                line: stmt.line,
                span: span.into(),
            }),
        }
    }

    // ==================== FUNCTIONS ====================

    /// `fn NAME ( params )`; the body follows as ordinary statements
    fn parse_function_header(&mut self) -> Result<(), ParseError> {
        let fn_token = self.expect(TokenKind::Fn, "`fn`")?;
        let name_token = self.expect(TokenKind::Variable, "function name")?;
        let name = name_token.text;
        self.expect(TokenKind::LParen, "`(` after function name")?;

        let mut params: Vec<String> = Vec::new();
        loop {
            let token = self.expect_any("`)` closing the parameter list")?;
            match token.kind {
                TokenKind::RParen => break,
                TokenKind::Variable => {
                    if params.contains(&token.text) {
                        return Err(ParseError::DuplicateParameter {
                            line: token.line,
                            name: token.text,
                            function: name,
                            span: token.span.into(),
                        });
                    }
                    params.push(token.text);
                }
                // separators are not enforced
                _ => {}
            }
        }

        if let Some(existing) = self.table.get(&name) {
            return Err(ParseError::DuplicateFunction {
                line: name_token.line,
                name,
                first_line: existing.line,
                span: name_token.span.into(),
            });
        }

        tracing::trace!("function `{}` with {} params", name, params.len());
        self.table
            .insert(FunctionDef::new(name.clone(), params, fn_token.line));
        self.current = Some(name);
        Ok(())
    }

    // ==================== STATEMENTS ====================

    /// Reorder tokens up to the next `;` (or end of input) into postfix.
    ///
    /// Returns the statement and the span of its first token.
    fn parse_statement(&mut self) -> Result<(Statement, Span), ParseError> {
        let mut output: Vec<Term> = Vec::new();
        let mut stack: Vec<Pending> = Vec::new();
        let mut start: Option<(usize, Span)> = None;

        while let Some(token) = self.advance() {
            if start.is_none() {
                start = Some((token.line, token.span));
            }
            if !matches!(token.kind, TokenKind::RParen | TokenKind::Comma) {
                mark_call_has_args(&mut stack);
            }

            match token.kind {
                TokenKind::Semi => break,
                TokenKind::LParen => stack.push(Pending::Paren {
                    line: token.line,
                    span: token.span,
                    call: None,
                }),
                TokenKind::RParen => close_paren(&mut output, &mut stack, &token)?,
                TokenKind::Comma => {
                    pop_to_paren(&mut output, &mut stack);
                    if let Some(Pending::Paren {
                        call: Some(site), ..
                    }) = stack.last_mut()
                    {
                        site.commas += 1;
                    }
                }
                TokenKind::Number => {
                    let value: f64 =
                        token
                            .text
                            .parse()
                            .map_err(|_| ParseError::InvalidNumber {
                                line: token.line,
                                text: token.text.clone(),
                                span: token.span.into(),
                            })?;
                    output.push(Term::new(TermKind::Number(value), token.line, token.span));
                }
                TokenKind::Variable if self.at(TokenKind::LParen) => {
                    let paren = self.expect(TokenKind::LParen, "`(`")?;
                    stack.push(Pending::Paren {
                        line: paren.line,
                        span: paren.span,
                        call: Some(CallSite {
                            name: token.text,
                            line: token.line,
                            span: token.span,
                            commas: 0,
                            has_args: false,
                        }),
                    });
                }
                TokenKind::Variable => output.push(Term::new(
                    TermKind::Variable(token.text),
                    token.line,
                    token.span,
                )),
                kind => {
                    if let Some(op) = BinaryOp::from_token(kind) {
                        push_operator(&mut output, &mut stack, op, &token);
                    } else if let Some(kw) = Keyword::from_token(kind) {
                        output.push(Term::new(TermKind::Keyword(kw), token.line, token.span));
                    } else {
                        output.push(Term::new(
                            TermKind::Unknown(token.text),
                            token.line,
                            token.span,
                        ));
                    }
                }
            }
        }

        // Drain what is left; an open parenthesis here was never closed
        while let Some(entry) = stack.pop() {
            match entry {
                Pending::Operator(term) => output.push(term),
                Pending::Paren { line, span, .. } => {
                    return Err(ParseError::UnclosedParen {
                        line,
                        span: span.into(),
                    });
                }
            }
        }

        let (line, span) = start.unwrap_or((self.line, Span::default()));
        Ok((Statement::new(line, output), span))
    }
}

/// Precedence an operator-stack entry presents to an incoming operator.
/// `None` for a parenthesis, which nothing pops past.
fn stack_precedence(entry: &Pending) -> Option<u8> {
    match entry {
        Pending::Operator(Term {
            kind: TermKind::Operator(op),
            ..
        }) => Some(op.precedence()),
        Pending::Operator(_) | Pending::Paren { .. } => None,
    }
}

fn push_operator(output: &mut Vec<Term>, stack: &mut Vec<Pending>, op: BinaryOp, token: &Token) {
    let prec = op.precedence();
    while stack
        .last()
        .and_then(stack_precedence)
        .is_some_and(|top| top >= prec)
    {
        if let Some(Pending::Operator(term)) = stack.pop() {
            output.push(term);
        }
    }
    stack.push(Pending::Operator(Term::new(
        TermKind::Operator(op),
        token.line,
        token.span,
    )));
}

/// Move operators to the output until the nearest open parenthesis, which
/// stays on the stack
fn pop_to_paren(output: &mut Vec<Term>, stack: &mut Vec<Pending>) {
    while let Some(Pending::Operator(_)) = stack.last() {
        if let Some(Pending::Operator(term)) = stack.pop() {
            output.push(term);
        }
    }
}

fn close_paren(
    output: &mut Vec<Term>,
    stack: &mut Vec<Pending>,
    token: &Token,
) -> Result<(), ParseError> {
    pop_to_paren(output, stack);
    match stack.pop() {
        Some(Pending::Paren { call, .. }) => {
            if let Some(site) = call {
                let arity = site.arity();
                output.push(Term::new(
                    TermKind::Call {
                        name: site.name,
                        arity,
                    },
                    site.line,
                    site.span,
                ));
            }
            Ok(())
        }
        _ => Err(ParseError::UnmatchedCloseParen {
            line: token.line,
            span: token.span.into(),
        }),
    }
}

/// Note that the innermost open call has seen an argument token
fn mark_call_has_args(stack: &mut [Pending]) {
    let innermost = stack
        .iter_mut()
        .rev()
        .find(|entry| matches!(entry, Pending::Paren { .. }));
    if let Some(Pending::Paren {
        call: Some(site), ..
    }) = innermost
    {
        site.has_args = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn postfix(body: &str) -> String {
        let source = format!("fn main() {} end", body);
        let table = parse(lex(&source)).unwrap();
        table.get("main").unwrap().statements[0].to_string()
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        assert_eq!(postfix("a is 1 + 2 * 3;"), "a 1 2 3 * + is");
    }

    #[test]
    fn test_equal_precedence_is_left_associative() {
        assert_eq!(postfix("a is 8 / 4 / 2;"), "a 8 4 / 2 / is");
        assert_eq!(postfix("a is 1 - 2 + 3;"), "a 1 2 - 3 + is");
    }

    #[test]
    fn test_parentheses_override() {
        assert_eq!(postfix("a is (1 + 2) * 3;"), "a 1 2 + 3 * is");
    }

    #[test]
    fn test_assignment_inside_parentheses_stays_inside() {
        assert_eq!(postfix("(a is 1);"), "a 1 is");
    }

    #[test]
    fn test_call_arity() {
        assert_eq!(postfix("f();"), "f/0");
        assert_eq!(postfix("f(1);"), "1 f/1");
        assert_eq!(postfix("f(1 + 2, x * 3);"), "1 2 + x 3 * f/2");
        assert_eq!(postfix("f((1), g(2));"), "1 2 g/1 f/2");
    }
}
