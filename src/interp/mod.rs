//! Stack interpreter for parsed ferrule programs
//!
//! Replays each statement's postfix terms against an operand stack, one
//! fresh [`Scope`] per call.

pub mod eval;
pub mod scope;
pub mod value;

pub use eval::{DEFAULT_ENTRY, DEFAULT_RECURSION_LIMIT, Interpreter, MAX_RECURSION_LIMIT};
pub use scope::Scope;
pub use value::Operand;
