//! Token definitions for the ferrule lexer

use crate::common::Span;
use logos::Logos;
use serde::Serialize;

/// A token with its kind, line, span, and text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based source line
    pub line: usize,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            span,
            text: text.into(),
        }
    }
}

/// Token kinds recognized by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Keywords
    Fn,
    If,
    End,

    // Word operators
    /// `is`
    Is,
    /// `equals`
    Equals,
    /// `notequals`
    NotEquals,

    // Literals
    Number,
    Variable,

    // Symbol operators
    Plus,
    Minus,
    Star,
    Slash,

    // Delimiters
    LParen,
    RParen,
    Comma,
    Semi,

    /// Anything the lexer could not classify; rejected later, if at all
    Unknown,
}

impl TokenKind {
    /// Classify a run of non-delimiter characters.
    ///
    /// Keywords win over identifiers, so a variable spelled `end` lexes as
    /// the `end` keyword.
    pub fn classify(word: &str) -> TokenKind {
        match word {
            "" => TokenKind::Unknown,
            "fn" => TokenKind::Fn,
            "if" => TokenKind::If,
            "end" => TokenKind::End,
            "is" => TokenKind::Is,
            "equals" => TokenKind::Equals,
            "notequals" => TokenKind::NotEquals,
            _ => match word.chars().next() {
                Some(c) if c.is_ascii_digit() => TokenKind::Number,
                Some(c) if c.is_ascii_alphabetic() => TokenKind::Variable,
                _ => TokenKind::Unknown,
            },
        }
    }

    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(self, TokenKind::Fn | TokenKind::If | TokenKind::End)
    }

    /// Check if this token is a binary operator (assignment included)
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Equals
                | TokenKind::NotEquals
                | TokenKind::Is
        )
    }

    /// Get the string representation of the token
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Fn => "fn",
            TokenKind::If => "if",
            TokenKind::End => "end",
            TokenKind::Is => "is",
            TokenKind::Equals => "equals",
            TokenKind::NotEquals => "notequals",
            TokenKind::Number => "<number>",
            TokenKind::Variable => "<variable>",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Unknown => "<unknown>",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scanner state carried through logos
pub(crate) struct LexerExtras {
    /// Current 1-based line
    pub line: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line: 1 }
    }
}

/// Raw scanner output. Single-character symbols split words; everything
/// between delimiters is one `Word`, classified afterwards. A newline is a
/// delimiter too, so a word written last on a line is kept.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(extras = LexerExtras)]
#[logos(skip r"[ \t\r\f]+")]
pub(crate) enum RawToken {
    #[token("\n", |lex| {
        lex.extras.line += 1;
        logos::Skip
    })]
    Newline,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,

    #[regex(r"[^ \t\r\f\n+\-*/(),;]+")]
    Word,
}

impl RawToken {
    /// Final token kind for a raw token and its slice
    pub(crate) fn kind(self, slice: &str) -> TokenKind {
        match self {
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Word => TokenKind::classify(slice),
            // skipped by its callback, never yielded
            RawToken::Newline => TokenKind::Unknown,
        }
    }
}
