//! Parsed program representation for ferrule
//!
//! The parser does not build expression trees. Each statement is kept as a
//! flat sequence of [`Term`]s in postfix order, ready to be replayed against
//! an operand stack. Statements are grouped per function in a
//! [`FunctionTable`].

use crate::common::Span;
use crate::lexer::TokenKind;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Binary operators, assignment included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Equals,
    NotEquals,
    /// `is`
    Assign,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<BinaryOp> {
        match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Equals => Some(BinaryOp::Equals),
            TokenKind::NotEquals => Some(BinaryOp::NotEquals),
            TokenKind::Is => Some(BinaryOp::Assign),
            _ => None,
        }
    }

    /// Binding strength. All operators are left-associative.
    ///
    /// Comparisons share a level with addition, so `1 + 1 equals 2` groups
    /// as `(1 + 1) equals 2` but `2 equals 1 + 1` groups as
    /// `(2 equals 1) + 1`.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Assign => 0,
            BinaryOp::Equals | BinaryOp::NotEquals | BinaryOp::Add | BinaryOp::Sub => 2,
            BinaryOp::Mul | BinaryOp::Div => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Equals => "equals",
            BinaryOp::NotEquals => "notequals",
            BinaryOp::Assign => "is",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords that may appear inside a statement but have no runtime effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    Fn,
    If,
    End,
}

impl Keyword {
    pub fn from_token(kind: TokenKind) -> Option<Keyword> {
        match kind {
            TokenKind::Fn => Some(Keyword::Fn),
            TokenKind::If => Some(Keyword::If),
            TokenKind::End => Some(Keyword::End),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Fn => "fn",
            Keyword::If => "if",
            Keyword::End => "end",
        }
    }
}

/// One postfix element with its source position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Term {
    pub kind: TermKind,
    pub line: usize,
    pub span: Span,
}

/// Payload of a postfix element, narrowed from the token text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TermKind {
    /// Numeric literal, parsed at parse time
    Number(f64),
    /// Variable reference
    Variable(String),
    Operator(BinaryOp),
    /// Call site; emitted after its `arity` argument sub-expressions
    Call { name: String, arity: usize },
    Keyword(Keyword),
    /// Text the lexer could not classify
    Unknown(String),
}

impl Term {
    pub fn new(kind: TermKind, line: usize, span: Span) -> Self {
        Self { kind, line, span }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TermKind::Number(n) => write!(f, "{}", n),
            TermKind::Variable(name) => f.write_str(name),
            TermKind::Operator(op) => write!(f, "{}", op),
            TermKind::Call { name, arity } => write!(f, "{}/{}", name, arity),
            TermKind::Keyword(kw) => f.write_str(kw.as_str()),
            TermKind::Unknown(text) => write!(f, "?{}", text),
        }
    }
}

/// One `;`-terminated statement (or a lone `end` marker) in postfix order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    /// Line of the statement's first token
    pub line: usize,
    pub terms: Vec<Term>,
}

impl Statement {
    pub fn new(line: usize, terms: Vec<Term>) -> Self {
        Self { line, terms }
    }

    /// The single-term statement an `end` keyword produces
    pub fn end_marker(line: usize, span: Span) -> Self {
        Self::new(line, vec![Term::new(TermKind::Keyword(Keyword::End), line, span)])
    }

    pub fn is_end_marker(&self) -> bool {
        matches!(
            self.terms.as_slice(),
            [Term {
                kind: TermKind::Keyword(Keyword::End),
                ..
            }]
        )
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}

/// A declared function: parameters and its statements in source order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub statements: Vec<Statement>,
    /// Line of the `fn` keyword
    pub line: usize,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>, params: Vec<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            params,
            statements: Vec::new(),
            line,
        }
    }
}

/// Function name to definition, in declaration order.
///
/// Built once by the parser and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FunctionTable {
    functions: IndexMap<String, FunctionDef>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub(crate) fn insert(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.clone(), def);
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut FunctionDef> {
        self.functions.get_mut(name)
    }

    /// Human-readable dump: one block per function, one postfix line per
    /// statement
    pub fn render(&self) -> String {
        let mut out = String::new();
        for def in self.iter() {
            out.push_str(&format!("fn {}({})\n", def.name, def.params.join(", ")));
            for stmt in &def.statements {
                out.push_str(&format!("  {:>4} | {}\n", stmt.line, stmt));
            }
        }
        out
    }
}
