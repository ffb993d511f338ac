//! Literal typing and range checks
//!
//! This module turns raw right-hand-side text into typed [`Value`]s:
//!
//! - [`check_scalar`]: one literal against a type tag
//! - [`check_assignable`]: one literal for a slot, with widening
//! - [`check_object`]: a constructor's attribute list, field by field
//! - [`check_array`]: an element list against the element type
//! - [`infer_literal`]: the natural type of an untyped attribute value
//!
//! # Literal Grammar
//!
//! - `boolean`: `true` or `false`
//! - `char`: one character in single quotes
//! - `String`: double-quoted text
//! - `byte`, `short`, `int`, `long`: optionally signed decimal digits, range
//!   checked without clamping
//! - `float`, `double`: optionally signed decimal or exponential literal
//!   (integers included), finite and within the type's magnitude ceiling
//!
//! Every function here is pure; nothing touches the memory model.

use crate::interpreter::errors::TypeError;
use crate::memory::heap::Field;
use crate::memory::value::Value;
use crate::memory::ArrayElement;
use crate::parser::ast::{DeclaredType, PrimitiveType, ValueSource};
use crate::parser::lexer::{tokenize, Token};
use crate::parser::syntax::{parse_attribute, split_top_level, value_source};

/// Type a literal against a type tag.
///
/// Object and array tags only accept `null`; any other literal for a tag that
/// is not a primitive is an unknown type.
pub fn check_scalar(type_name: &str, literal: &str) -> Result<Value, TypeError> {
    match PrimitiveType::from_name(type_name) {
        Some(primitive) => check_primitive(primitive, literal),
        None if is_null(literal) => Ok(Value::Null),
        None => Err(TypeError::UnknownType(type_name.to_string())),
    }
}

/// Type a literal against a primitive type.
pub fn check_primitive(primitive: PrimitiveType, literal: &str) -> Result<Value, TypeError> {
    let literal = literal.trim();
    let invalid = || TypeError::InvalidLiteral {
        type_name: primitive.to_string(),
        literal: literal.to_string(),
    };

    let Ok(tokens) = tokenize(literal) else {
        return Err(invalid());
    };
    let tokens = &tokens[..tokens.len().saturating_sub(1)]; // Drop Eof

    if matches!(tokens, [Token::Null(_)]) {
        return Err(TypeError::NullPrimitive(primitive.to_string()));
    }

    match primitive {
        PrimitiveType::Boolean => match tokens {
            [Token::True(_)] => Ok(Value::Bool(true)),
            [Token::False(_)] => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        PrimitiveType::Char => match tokens {
            [Token::CharLiteral(contents, _)] => {
                let mut chars = contents.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(invalid()),
                }
            }
            _ => Err(invalid()),
        },
        PrimitiveType::String => match tokens {
            [Token::StringLiteral(text, _)] => Ok(Value::Text(text.clone())),
            _ => Err(invalid()),
        },
        _ => {
            let (negative, digits) = signed_number(tokens).ok_or_else(invalid)?;
            if primitive.is_integral() {
                check_integer(primitive, literal, negative, digits)
            } else {
                check_float(primitive, literal, negative, digits)
            }
        }
    }
}

/// Type a literal for storage in a slot of type `primitive`.
///
/// A literal outside the target's own grammar is typed by its natural type
/// and widened when the widening ladder allows it (`int i = 'a';`,
/// `double d = 'a';`). Otherwise the target's own diagnostic is returned.
pub fn check_assignable(primitive: PrimitiveType, literal: &str) -> Result<Value, TypeError> {
    let err = match check_primitive(primitive, literal) {
        Ok(value) => return Ok(value),
        Err(err @ TypeError::NullPrimitive(_)) => return Err(err),
        Err(err) => err,
    };

    match infer_literal(literal) {
        Some(natural) if natural != primitive && primitive.accepts(natural) => {
            Ok(check_primitive(natural, literal)?.widen_to(primitive))
        }
        _ => Err(err),
    }
}

/// `[+|-] Number`, as (is negative, number text)
fn signed_number(tokens: &[Token]) -> Option<(bool, &str)> {
    match tokens {
        [Token::Number(n, _)] => Some((false, n.as_str())),
        [Token::Plus(_), Token::Number(n, _)] => Some((false, n.as_str())),
        [Token::Minus(_), Token::Number(n, _)] => Some((true, n.as_str())),
        _ => None,
    }
}

fn check_integer(
    primitive: PrimitiveType,
    literal: &str,
    negative: bool,
    digits: &str,
) -> Result<Value, TypeError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TypeError::InvalidLiteral {
            type_name: primitive.to_string(),
            literal: literal.to_string(),
        });
    }
    let Some((min, max)) = primitive.integer_range() else {
        return Err(TypeError::UnknownType(primitive.to_string()));
    };
    let out_of_range = || TypeError::OutOfRange {
        type_name: primitive.to_string(),
        literal: literal.to_string(),
        min: min.to_string(),
        max: max.to_string(),
    };

    // i128 covers every i64 magnitude; longer digit strings are out of range
    let magnitude: i128 = digits.parse().map_err(|_| out_of_range())?;
    let value = if negative { -magnitude } else { magnitude };
    if value < min as i128 || value > max as i128 {
        return Err(out_of_range());
    }
    Ok(Value::Int(value as i64))
}

fn check_float(
    primitive: PrimitiveType,
    literal: &str,
    negative: bool,
    digits: &str,
) -> Result<Value, TypeError> {
    // Rust's float grammar also accepts "inf" and "nan", which never lex as numbers
    let magnitude: f64 = digits.parse().map_err(|_| TypeError::InvalidLiteral {
        type_name: primitive.to_string(),
        literal: literal.to_string(),
    })?;
    let ceiling = primitive.float_ceiling().unwrap_or(f64::MAX);
    if !magnitude.is_finite() || magnitude > ceiling {
        return Err(TypeError::OutOfRange {
            type_name: primitive.to_string(),
            literal: literal.to_string(),
            min: format!("{:e}", -ceiling),
            max: format!("{:e}", ceiling),
        });
    }
    Ok(Value::Float(if negative { -magnitude } else { magnitude }))
}

/// Natural type of an untyped literal: `int` for integers that fit, `long`
/// beyond, `double` for decimals.
pub fn infer_literal(literal: &str) -> Option<PrimitiveType> {
    let tokens = tokenize(literal.trim()).ok()?;
    let tokens = &tokens[..tokens.len().saturating_sub(1)];

    match tokens {
        [Token::True(_)] | [Token::False(_)] => Some(PrimitiveType::Boolean),
        [Token::CharLiteral(_, _)] => Some(PrimitiveType::Char),
        [Token::StringLiteral(_, _)] => Some(PrimitiveType::String),
        _ => {
            let (_, digits) = signed_number(tokens)?;
            if digits.bytes().all(|b| b.is_ascii_digit()) {
                if check_primitive(PrimitiveType::Int, literal).is_ok() {
                    Some(PrimitiveType::Int)
                } else {
                    Some(PrimitiveType::Long)
                }
            } else {
                digits.parse::<f64>().ok().map(|_| PrimitiveType::Double)
            }
        }
    }
}

/// Type every attribute of a constructor.
///
/// Attributes are split on top-level commas and each is either
/// `Type name = value` or `name = value` (type inferred from the value).
/// The first bad attribute fails the whole object.
pub fn check_object(owner: &str, attributes: &str) -> Result<Vec<Field>, TypeError> {
    let mut fields: Vec<Field> = Vec::new();

    for text in split_top_level(attributes) {
        let invalid = |reason: String| TypeError::InvalidAttribute {
            owner: owner.to_string(),
            attribute: text.trim().to_string(),
            reason,
        };

        let spec = parse_attribute(text).map_err(|e| invalid(e.to_string()))?;
        let field_type = match &spec.type_name {
            Some(type_name) => PrimitiveType::from_name(type_name)
                .ok_or_else(|| invalid(format!("unknown attribute type '{}'", type_name)))?,
            None => infer_literal(&spec.value)
                .ok_or_else(|| invalid(format!("cannot infer a type for '{}'", spec.value)))?,
        };
        let value = check_primitive(field_type, &spec.value).map_err(|e| invalid(e.to_string()))?;

        if fields.iter().any(|field| field.name == spec.name) {
            return Err(TypeError::DuplicateAttribute {
                owner: owner.to_string(),
                attribute: spec.name,
            });
        }
        fields.push(Field {
            name: spec.name,
            field_type,
            value,
        });
    }

    Ok(fields)
}

/// Type every element of an array declaration.
///
/// Primitive arrays take literals (widened like scalar literals) or variable
/// names. Object arrays take `null` or variable names. Variables are resolved
/// by the memory model. Arrays of arrays do not exist.
pub fn check_array(element_type: &str, elements: &str) -> Result<(DeclaredType, Vec<ArrayElement>), TypeError> {
    let declared = DeclaredType::from_name(element_type);
    let mut typed = Vec::new();

    for (index, text) in split_top_level(elements).into_iter().enumerate() {
        let invalid = |reason: String| TypeError::InvalidElement {
            type_name: element_type.to_string(),
            index: index + 1,
            reason,
        };

        let element = match declared.as_primitive() {
            Some(primitive) => match value_source(text) {
                Ok(ValueSource::Variable(name)) => ArrayElement::Variable(name),
                _ => ArrayElement::Value(
                    check_assignable(primitive, text).map_err(|e| invalid(e.to_string()))?,
                ),
            },
            None => match value_source(text) {
                Ok(ValueSource::Null) => ArrayElement::Value(Value::Null),
                Ok(ValueSource::Variable(name)) => ArrayElement::Variable(name),
                _ => {
                    return Err(invalid(format!(
                        "expected a variable name or null, found '{}'",
                        text.trim()
                    )))
                }
            },
        };
        typed.push(element);
    }

    Ok((declared, typed))
}

fn is_null(literal: &str) -> bool {
    literal.trim() == "null"
}
