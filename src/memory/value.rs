//! Runtime value representation
//!
//! This module defines the [`Value`] enum, the closed set of values a stack
//! slot, object field or array element can hold. Every consumer (assignment,
//! snapshot rendering, the type system) matches on it exhaustively.
//!
//! # Value Types
//!
//! - [`Value::Bool`], [`Value::Char`], [`Value::Int`], [`Value::Float`],
//!   [`Value::Text`]: inline primitives, copied by value
//! - [`Value::ObjectRef`], [`Value::ArrayRef`]: references to a heap entry
//! - [`Value::Null`]: a reference slot that refers to nothing

use super::address::Address;
use crate::parser::ast::PrimitiveType;
use std::fmt;

/// Runtime values in the simulator
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Char(char),
    /// Every integral type (`byte` through `long`) is stored widened.
    Int(i64),
    /// `float` and `double` are both stored as `f64`.
    Float(f64),
    Text(String),
    ObjectRef(Address),
    ArrayRef(Address),
    Null,
}

impl Value {
    /// The heap address this value refers to, if any
    pub fn referent(&self) -> Option<&Address> {
        match self {
            Value::ObjectRef(address) | Value::ArrayRef(address) => Some(address),
            _ => None,
        }
    }

    /// Check if this value is a reference (including null)
    pub fn is_reference(&self) -> bool {
        matches!(self, Value::ObjectRef(_) | Value::ArrayRef(_) | Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert a primitive value to the representation used by `target`.
    ///
    /// Callers check compatibility first with [`PrimitiveType::accepts`]; only
    /// widening conversions happen here.
    pub fn widen_to(self, target: PrimitiveType) -> Value {
        match (self, target) {
            (Value::Int(n), t) if t.is_floating() => Value::Float(n as f64),
            (Value::Char(c), t) if t.is_floating() => Value::Float(c as u32 as f64),
            (Value::Char(c), t) if t.is_integral() => Value::Int(c as u32 as i64),
            (value, _) => value,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "'{}'", c.escape_default()),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => write!(f, "\"{}\"", s.escape_default()),
            Value::ObjectRef(address) | Value::ArrayRef(address) => write!(f, "{}", address),
            Value::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::address::address_for;

    #[test]
    fn test_widening() {
        assert_eq!(Value::Int(3).widen_to(PrimitiveType::Double), Value::Float(3.0));
        assert_eq!(Value::Char('a').widen_to(PrimitiveType::Int), Value::Int(97));
        assert_eq!(Value::Int(3).widen_to(PrimitiveType::Long), Value::Int(3));
        assert_eq!(
            Value::Text("x".into()).widen_to(PrimitiveType::String),
            Value::Text("x".into())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Char('\n').to_string(), "'\\n'");
        assert_eq!(Value::Text("Ana".into()).to_string(), "\"Ana\"");
        assert_eq!(Value::ObjectRef(address_for(4.0)).to_string(), "0x4");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn test_referent() {
        let address = address_for(10.0);
        assert_eq!(Value::ArrayRef(address.clone()).referent(), Some(&address));
        assert_eq!(Value::Null.referent(), None);
        assert!(Value::Null.is_reference());
        assert!(!Value::Int(0).is_reference());
    }
}
