//! The declaration gate
//!
//! [`process`] runs the syntax check and then literal typing on a declaration
//! line and yields a fully typed [`Declaration`]. Nothing is written to the
//! memory model unless this succeeds; names of other variables (aliases and
//! array elements) are resolved later, by the memory model itself.

use crate::interpreter::errors::{SimError, TypeError};
use crate::interpreter::type_system::{check_array, check_assignable, check_object};
use crate::memory::heap::Field;
use crate::memory::value::Value;
use crate::memory::ArrayElement;
use crate::parser::ast::{DeclaredType, ParsedFields, PrimitiveType, ValueSource};
use crate::parser::syntax::{check, value_source};

/// A declaration that passed the gate
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// `int x = 3;`
    Scalar {
        name: String,
        scalar_type: PrimitiveType,
        value: Value,
    },
    /// `object p = null;`
    NullReference {
        name: String,
        declared_type: DeclaredType,
    },
    /// `int y = x;` or `object q = p;`
    Alias {
        name: String,
        declared_type: DeclaredType,
        source: String,
    },
    /// `object p = new object(nombre = "Ana");`
    Object {
        name: String,
        type_name: String,
        fields: Vec<Field>,
    },
    /// `int[] a = {1, 2, 3};`
    Array {
        name: String,
        element_type: DeclaredType,
        elements: Vec<ArrayElement>,
    },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Scalar { name, .. }
            | Declaration::NullReference { name, .. }
            | Declaration::Alias { name, .. }
            | Declaration::Object { name, .. }
            | Declaration::Array { name, .. } => name,
        }
    }
}

/// Pass/fail decision with the first failing diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    pub message: Option<String>,
}

/// Run the gate and report only the decision.
pub fn validate(line: &str) -> Verdict {
    match process(line) {
        Ok(_) => Verdict {
            valid: true,
            message: None,
        },
        Err(err) => Verdict {
            valid: false,
            message: Some(err.to_string()),
        },
    }
}

/// Syntax check, then typing. The first failure is returned unchanged.
pub fn process(line: &str) -> Result<Declaration, SimError> {
    match check(line)? {
        ParsedFields::Scalar {
            type_name,
            name,
            value,
        } => scalar_declaration(type_name, name, &value),
        ParsedFields::Object {
            type_name,
            name,
            constructor,
            attributes,
        } => {
            if PrimitiveType::from_name(&type_name).is_some() {
                return Err(TypeError::NotConstructible(type_name).into());
            }
            if let Some(constructed) = constructor {
                if constructed != type_name {
                    return Err(TypeError::ConstructorMismatch {
                        declared: type_name,
                        constructed,
                    }
                    .into());
                }
            }
            let fields = check_object(&type_name, &attributes)?;
            Ok(Declaration::Object {
                name,
                type_name,
                fields,
            })
        }
        ParsedFields::Array {
            element_type,
            name,
            elements,
        } => {
            let (element_type, elements) = check_array(&element_type, &elements)?;
            Ok(Declaration::Array {
                name,
                element_type,
                elements,
            })
        }
    }
}

fn scalar_declaration(type_name: String, name: String, value: &str) -> Result<Declaration, SimError> {
    let declared_type = DeclaredType::from_name(&type_name);
    let source = value_source(value)?;

    match (declared_type.as_primitive(), source) {
        (_, ValueSource::Variable(source)) => Ok(Declaration::Alias {
            name,
            declared_type,
            source,
        }),
        (None, ValueSource::Null) => Ok(Declaration::NullReference {
            name,
            declared_type,
        }),
        (Some(scalar_type), _) => Ok(Declaration::Scalar {
            name,
            scalar_type,
            value: check_assignable(scalar_type, value)?,
        }),
        // Reference types take no literal but null
        (None, _) => Err(TypeError::UnknownType(type_name).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::syntax::SyntaxError;

    #[test]
    fn test_scalar_declaration() {
        assert_eq!(
            process("int x = 3;"),
            Ok(Declaration::Scalar {
                name: "x".into(),
                scalar_type: PrimitiveType::Int,
                value: Value::Int(3),
            })
        );
        assert_eq!(
            process("char c = 'z';"),
            Ok(Declaration::Scalar {
                name: "c".into(),
                scalar_type: PrimitiveType::Char,
                value: Value::Char('z'),
            })
        );
    }

    #[test]
    fn test_scalar_literal_widening() {
        assert_eq!(
            process("int j = 'a';"),
            Ok(Declaration::Scalar {
                name: "j".into(),
                scalar_type: PrimitiveType::Int,
                value: Value::Int(97),
            })
        );
        assert_eq!(
            process("double d = 'a';"),
            Ok(Declaration::Scalar {
                name: "d".into(),
                scalar_type: PrimitiveType::Double,
                value: Value::Float(97.0),
            })
        );
        assert!(matches!(
            process("byte b = 'a';"),
            Err(SimError::Type(TypeError::InvalidLiteral { .. }))
        ));
    }

    #[test]
    fn test_alias_and_null_declarations() {
        assert_eq!(
            process("object q = p;"),
            Ok(Declaration::Alias {
                name: "q".into(),
                declared_type: DeclaredType::Object("object".into()),
                source: "p".into(),
            })
        );
        assert_eq!(
            process("long big = x;").map(|d| d.name().to_string()),
            Ok("big".to_string())
        );
        assert_eq!(
            process("Persona p = null;"),
            Ok(Declaration::NullReference {
                name: "p".into(),
                declared_type: DeclaredType::Object("Persona".into()),
            })
        );
    }

    #[test]
    fn test_object_declaration() {
        let declaration = process("object p1 = new object(nombre = \"Ana\");").unwrap();
        match declaration {
            Declaration::Object { name, type_name, fields } => {
                assert_eq!(name, "p1");
                assert_eq!(type_name, "object");
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].value, Value::Text("Ana".into()));
            }
            other => panic!("unexpected declaration {other:?}"),
        }

        assert!(process("Persona p = (String nombre = \"Eva\", int edad = 40);").is_ok());
    }

    #[test]
    fn test_constructor_checks() {
        assert_eq!(
            process("object p = new Persona(id = 1);"),
            Err(SimError::Type(TypeError::ConstructorMismatch {
                declared: "object".into(),
                constructed: "Persona".into(),
            }))
        );
        assert_eq!(
            process("int n = (id = 1);"),
            Err(SimError::Type(TypeError::NotConstructible("int".into())))
        );
    }

    #[test]
    fn test_syntax_diagnostic_is_unchanged() {
        assert_eq!(
            process("int x = 3"),
            Err(SimError::Syntax(SyntaxError::MissingTerminator))
        );
        let verdict = validate("int x = 3");
        assert!(!verdict.valid);
        assert_eq!(
            verdict.message.as_deref(),
            Some("syntax error: missing terminator ';'")
        );
    }

    #[test]
    fn test_type_failures() {
        assert!(matches!(
            process("byte b = 200;"),
            Err(SimError::Type(TypeError::OutOfRange { .. }))
        ));
        assert_eq!(
            process("int n = null;"),
            Err(SimError::Type(TypeError::NullPrimitive("int".into())))
        );
        assert_eq!(
            process("object p = 3;"),
            Err(SimError::Type(TypeError::UnknownType("object".into())))
        );
        assert!(matches!(
            process("int[] a = {1, true};"),
            Err(SimError::Type(TypeError::InvalidElement { index: 2, .. }))
        ));
    }

    #[test]
    fn test_validate_success() {
        assert_eq!(
            validate("double d = 2.5;"),
            Verdict {
                valid: true,
                message: None
            }
        );
    }
}
