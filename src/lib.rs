//! ferrule: a small interpreted language
//!
//! Programs are functions made of `;`-terminated statements over numbers,
//! variables, `+ - * /`, the comparisons `equals`/`notequals`, and the
//! assignment operator `is`. There is one numeric type (`f64`); comparisons
//! produce `1` or `0`.
//!
//! # Architecture
//!
//! ```text
//! Source → Lexer → Tokens → Parser (shunting-yard) → FunctionTable → Interpreter → Scope
//! ```
//!
//! No stage reads back from a later one. The parser keeps every statement
//! as a postfix term list; the interpreter replays it on an operand stack.
//!
//! # Example
//!
//! ```text
//! fn main()
//!     a is 2 * (10 + 10);
//!     b is a equals 40;
//! end
//! ```
//!
//! ```
//! let scope = ferrule::run("fn main() a is 2 * (10 + 10); b is a equals 40; end").unwrap();
//! assert_eq!(scope.get("a"), Some(40.0));
//! assert_eq!(scope.get("b"), Some(1.0));
//! ```

pub mod ast;
pub mod common;
pub mod config;
pub mod diagnostics;
pub mod interp;
pub mod lexer;
pub mod parser;

// Re-export diagnostics for convenience
pub use diagnostics::{Error, InterpreterError, ParseError, SourceFile};

// Re-exports for convenience
pub use ast::FunctionTable;
pub use config::RunConfig;
pub use interp::{Interpreter, Scope};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tokenize source text
pub fn tokenize(source: &str) -> Vec<lexer::Token> {
    lexer::lex(source)
}

/// Parse source text into a function table
pub fn parse(source: &str) -> Result<FunctionTable, ParseError> {
    parser::parse(lexer::lex(source))
}

/// Parse and run `main` with the default recursion budget, returning its
/// final scope
pub fn run(source: &str) -> Result<Scope, Error> {
    run_with(source, &RunConfig::default())
}

/// Parse and run the configured entry function
pub fn run_with(source: &str, config: &RunConfig) -> Result<Scope, Error> {
    let functions = parse(source)?;
    let interpreter = Interpreter::new(functions);
    Ok(interpreter.run(config)?)
}
