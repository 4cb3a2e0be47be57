//! Lexer for ferrule source text
//!
//! Splits source into words at whitespace and at the single-character
//! symbols `+ - * / ( ) , ;`, which become tokens of their own. Each word is
//! classified once when it is cut. Tokenizing never fails: text that fits no
//! category comes out as [`TokenKind::Unknown`] for the parser to reject.

mod tokens;

pub use tokens::{Token, TokenKind};

use logos::Logos;
use tokens::{LexerExtras, RawToken};

/// Tokenize source text into an ordered token list
pub fn lex(source: &str) -> Vec<Token> {
    let mut raw = RawToken::lexer_with_extras(source, LexerExtras::default());
    let mut tokens = Vec::new();

    while let Some(result) = raw.next() {
        let slice = raw.slice();
        let kind = match result {
            Ok(raw_token) => raw_token.kind(slice),
            Err(()) => TokenKind::Unknown,
        };
        tokens.push(Token::new(kind, raw.extras.line, raw.span().into(), slice));
    }

    tracing::debug!("lexed {} tokens over {} lines", tokens.len(), raw.extras.line);
    tokens
}
