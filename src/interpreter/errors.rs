//! Error types for the memory simulator
//!
//! This module defines the error taxonomy every command can fail with:
//!
//! - [`SyntaxError`](crate::parser::syntax::SyntaxError): the line has no
//!   supported statement shape
//! - [`TypeError`]: a literal does not fit the declared type
//! - [`MemoryError`]: the model rejects the operation (duplicate or unknown
//!   names, incompatible types, leaving the root frame, limits)
//!
//! All three are aggregated by [`SimError`]. Every failure is recoverable and
//! leaves the model untouched; the executor converts them into a failed
//! [`Outcome`](crate::interpreter::engine::Outcome).
//!
//! [`MemoryError::InvariantViolation`] is different: it reports a broken
//! refcount or a dangling reference and means the simulator itself is wrong.

use crate::memory::address::Address;
use crate::parser::syntax::SyntaxError;

/// Literal and attribute typing errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("'{literal}' is not a valid {type_name} literal")]
    InvalidLiteral { type_name: String, literal: String },

    #[error("{literal} is out of range for {type_name} ({min} to {max})")]
    OutOfRange {
        type_name: String,
        literal: String,
        min: String,
        max: String,
    },

    #[error("primitive type '{0}' cannot be constructed")]
    NotConstructible(String),

    #[error("constructor 'new {constructed}' does not match declared type {declared}")]
    ConstructorMismatch { declared: String, constructed: String },

    #[error("invalid attribute '{attribute}' of {owner}: {reason}")]
    InvalidAttribute {
        owner: String,
        attribute: String,
        reason: String,
    },

    #[error("duplicate attribute '{attribute}' in {owner}")]
    DuplicateAttribute { owner: String, attribute: String },

    #[error("invalid element #{index} of {type_name}[]: {reason}")]
    InvalidElement {
        type_name: String,
        index: usize,
        reason: String,
    },

    #[error("null cannot be stored in primitive type {0}")]
    NullPrimitive(String),
}

/// Errors raised by the memory model
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MemoryError {
    #[error("variable '{name}' is already declared in frame '{frame}'")]
    DuplicateVariable { name: String, frame: String },

    #[error("undeclared variable '{name}' in frame '{frame}'")]
    UndefinedVariable { name: String, frame: String },

    #[error("cannot assign {source_type} to '{target}' of type {target_type}")]
    IncompatibleTypes {
        target: String,
        target_type: String,
        source_type: String,
    },

    #[error("cannot leave the root frame '{0}'")]
    RootFrameExit(String),

    #[error("unknown frame #{0}")]
    UnknownFrame(usize),

    #[error("stack overflow: frame limit of {limit} reached")]
    StackOverflow { limit: usize },

    #[error("out of heap: limit of {limit} live entries reached")]
    OutOfHeap { limit: usize },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl MemoryError {
    pub(crate) fn dangling(address: &Address) -> Self {
        MemoryError::InvariantViolation(format!("dangling reference to {}", address))
    }
}

/// Any failure a command can produce
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),

    #[error("{0}")]
    Memory(#[from] MemoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_category() {
        let err: SimError = SyntaxError::MissingTerminator.into();
        assert_eq!(err.to_string(), "syntax error: missing terminator ';'");

        let err: SimError = TypeError::UnknownType("Foo".into()).into();
        assert_eq!(err.to_string(), "type error: unknown type 'Foo'");

        let err: SimError = MemoryError::RootFrameExit("main".into()).into();
        assert_eq!(err.to_string(), "cannot leave the root frame 'main'");
    }
}
