// Statement shapes and type names for the simulator's command language

use std::fmt;

/// Primitive type tags understood by the type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl PrimitiveType {
    /// Look up a primitive by its keyword (`int`, `String`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(PrimitiveType::Boolean),
            "char" => Some(PrimitiveType::Char),
            "byte" => Some(PrimitiveType::Byte),
            "short" => Some(PrimitiveType::Short),
            "int" => Some(PrimitiveType::Int),
            "long" => Some(PrimitiveType::Long),
            "float" => Some(PrimitiveType::Float),
            "double" => Some(PrimitiveType::Double),
            "String" => Some(PrimitiveType::String),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Char => "char",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::String => "String",
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Int | PrimitiveType::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, PrimitiveType::Float | PrimitiveType::Double)
    }

    /// Inclusive range of an integral type.
    pub fn integer_range(self) -> Option<(i64, i64)> {
        match self {
            PrimitiveType::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
            PrimitiveType::Short => Some((i16::MIN as i64, i16::MAX as i64)),
            PrimitiveType::Int => Some((i32::MIN as i64, i32::MAX as i64)),
            PrimitiveType::Long => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Largest finite magnitude of a floating type.
    pub fn float_ceiling(self) -> Option<f64> {
        match self {
            PrimitiveType::Float => Some(3.4028235e38),
            PrimitiveType::Double => Some(f64::MAX),
            _ => None,
        }
    }

    /// Position on the numeric widening ladder
    /// `byte < short < int < long < float < double`.
    fn numeric_rank(self) -> Option<u8> {
        match self {
            PrimitiveType::Byte => Some(1),
            PrimitiveType::Short => Some(2),
            PrimitiveType::Int => Some(3),
            PrimitiveType::Long => Some(4),
            PrimitiveType::Float => Some(5),
            PrimitiveType::Double => Some(6),
            _ => None,
        }
    }

    /// Whether a value of type `source` may be stored in a slot of this type.
    ///
    /// Identical types always match. Numeric types widen up the ladder, `char`
    /// widens to `int` and above. `boolean` and `String` only match themselves.
    pub fn accepts(self, source: PrimitiveType) -> bool {
        if self == source {
            return true;
        }
        match (self.numeric_rank(), source.numeric_rank()) {
            (Some(target), Some(from)) => target >= from,
            (Some(target), None) if source == PrimitiveType::Char => target >= 3,
            _ => false,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a stack slot or heap entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    Primitive(PrimitiveType),
    /// A named object category (`object`, `Persona`, ...).
    Object(String),
    /// Array of primitives or object references. Never nested.
    Array(Box<DeclaredType>),
}

impl DeclaredType {
    /// Resolve a type keyword: primitives by name, any other identifier names
    /// an object category.
    pub fn from_name(name: &str) -> Self {
        match PrimitiveType::from_name(name) {
            Some(primitive) => DeclaredType::Primitive(primitive),
            None => DeclaredType::Object(name.to_string()),
        }
    }

    pub fn array_of(element: DeclaredType) -> Self {
        DeclaredType::Array(Box::new(element))
    }

    /// Reference types live on the heap; their slots hold an address.
    pub fn is_reference(&self) -> bool {
        !matches!(self, DeclaredType::Primitive(_))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            DeclaredType::Primitive(primitive) => Some(*primitive),
            _ => None,
        }
    }

    /// Assignment compatibility between declared types.
    pub fn accepts(&self, source: &DeclaredType) -> bool {
        match (self, source) {
            (DeclaredType::Primitive(target), DeclaredType::Primitive(from)) => target.accepts(*from),
            (DeclaredType::Object(target), DeclaredType::Object(from)) => target == from,
            (DeclaredType::Array(target), DeclaredType::Array(from)) => target == from,
            _ => false,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Primitive(primitive) => write!(f, "{}", primitive),
            DeclaredType::Object(name) => f.write_str(name),
            DeclaredType::Array(element) => write!(f, "{}[]", element),
        }
    }
}

/// Fields extracted from a syntactically valid declaration.
///
/// Values stay as raw source text; literal typing happens in the type system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedFields {
    /// `Type name = expr;`
    Scalar {
        type_name: String,
        name: String,
        value: String,
    },
    /// `Type name = (attrs);` or `Type name = new Ctor(attrs);`
    Object {
        type_name: String,
        name: String,
        constructor: Option<String>,
        attributes: String,
    },
    /// `Type[] name = {v, v, ...};`
    Array {
        element_type: String,
        name: String,
        elements: String,
    },
}

impl ParsedFields {
    pub fn name(&self) -> &str {
        match self {
            ParsedFields::Scalar { name, .. }
            | ParsedFields::Object { name, .. }
            | ParsedFields::Array { name, .. } => name,
        }
    }
}

/// One `Type name = value` (or `name = value`) entry of a constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub type_name: Option<String>,
    pub name: String,
    pub value: String,
}

/// What a right-hand side denotes, decided from its token shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// A bare identifier naming another variable.
    Variable(String),
    Null,
    /// `new Type(attrs)`
    Construct { type_name: String, attributes: String },
    /// Anything else, typed later against the target.
    Literal(String),
}

/// Coarse classification of a command line, in dispatch priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandShape {
    Enter { name: String },
    Leave,
    Assignment { target: String, value: String },
    Declaration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widening_ladder() {
        assert!(PrimitiveType::Long.accepts(PrimitiveType::Int));
        assert!(PrimitiveType::Double.accepts(PrimitiveType::Float));
        assert!(PrimitiveType::Int.accepts(PrimitiveType::Char));
        assert!(PrimitiveType::Float.accepts(PrimitiveType::Long));

        assert!(!PrimitiveType::Int.accepts(PrimitiveType::Long));
        assert!(!PrimitiveType::Short.accepts(PrimitiveType::Char));
        assert!(!PrimitiveType::Char.accepts(PrimitiveType::Byte));
        assert!(!PrimitiveType::Boolean.accepts(PrimitiveType::Int));
        assert!(!PrimitiveType::String.accepts(PrimitiveType::Char));
    }

    #[test]
    fn test_declared_type_resolution() {
        assert_eq!(DeclaredType::from_name("int"), DeclaredType::Primitive(PrimitiveType::Int));
        assert_eq!(DeclaredType::from_name("Persona"), DeclaredType::Object("Persona".into()));
        assert_eq!(DeclaredType::array_of(DeclaredType::from_name("int")).to_string(), "int[]");
    }

    #[test]
    fn test_reference_compatibility() {
        let object = DeclaredType::Object("object".into());
        let other = DeclaredType::Object("Persona".into());
        let ints = DeclaredType::array_of(DeclaredType::Primitive(PrimitiveType::Int));

        assert!(object.accepts(&object));
        assert!(!object.accepts(&other));
        assert!(!ints.accepts(&object));
        assert!(object.is_reference());
        assert!(ints.is_reference());
    }
}
