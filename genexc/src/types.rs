//! Type descriptors for the genex expression language.
//!
//! A [`Type`] is a plain value: equality and hashing are structural, nested
//! types are shared through `Arc`, and nothing is mutated after
//! construction. Signatures, conversion keys and return types are all built
//! from these.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

/// A data type in the expression language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    String,
    Array(Arc<Type>),
    Set(Arc<Type>),
    Struct(Arc<[Field]>),
    Genotype,
    Variant,
    AltAllele,
    Locus,
    Interval,
}

/// A named field of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: Arc<str>,
    pub ty: Type,
}

impl Type {
    pub fn array(element: Type) -> Self {
        Type::Array(Arc::new(element))
    }

    pub fn set(element: Type) -> Self {
        Type::Set(Arc::new(element))
    }

    /// Build a struct type from `(name, type)` pairs, in order.
    pub fn structure<'n>(fields: impl IntoIterator<Item = (&'n str, Type)>) -> Self {
        Type::Struct(
            fields
                .into_iter()
                .map(|(name, ty)| Field { name: name.into(), ty })
                .collect(),
        )
    }

    /// Position and type of a struct field, if this is a struct that has it.
    pub fn field(&self, name: &str) -> Option<(usize, &Type)> {
        match self {
            Type::Struct(fields) => fields
                .iter()
                .enumerate()
                .find(|(_, f)| &*f.name == name)
                .map(|(i, f)| (i, &f.ty)),
            _ => None,
        }
    }

    /// Element type of an array or set.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) | Type::Set(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Long | Type::Float | Type::Double)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Boolean => write!(f, "Boolean"),
            Type::Int => write!(f, "Int"),
            Type::Long => write!(f, "Long"),
            Type::Float => write!(f, "Float"),
            Type::Double => write!(f, "Double"),
            Type::String => write!(f, "String"),
            Type::Array(elem) => write!(f, "Array[{elem}]"),
            Type::Set(elem) => write!(f, "Set[{elem}]"),
            Type::Struct(fields) => {
                write!(f, "Struct{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                write!(f, "}}")
            }
            Type::Genotype => write!(f, "Genotype"),
            Type::Variant => write!(f, "Variant"),
            Type::AltAllele => write!(f, "AltAllele"),
            Type::Locus => write!(f, "Locus"),
            Type::Interval => write!(f, "Interval"),
        }
    }
}

/// Error parsing a type from its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type `{input}`: {reason}")]
pub struct ParseTypeError {
    pub input: String,
    pub reason: String,
}

impl FromStr for Type {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeParser { src: s, pos: 0 };
        let fail = |reason: String| ParseTypeError { input: s.to_string(), reason };
        let ty = parser.parse_type().map_err(fail)?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(fail(format!("trailing input at offset {}", parser.pos)));
        }
        Ok(ty)
    }
}

/// Recursive-descent parser for the `Display` syntax.
struct TypeParser<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> TypeParser<'s> {
    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn ident(&mut self) -> Result<&'s str, String> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(format!("expected identifier at offset {}", self.pos));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn eat(&mut self, ch: char) -> bool {
        self.skip_ws();
        if self.rest().starts_with(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> Result<(), String> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(format!("expected `{ch}` at offset {}", self.pos))
        }
    }

    fn parse_type(&mut self) -> Result<Type, String> {
        let name = self.ident()?;
        let ty = match name {
            "Boolean" => Type::Boolean,
            "Int" => Type::Int,
            "Long" => Type::Long,
            "Float" => Type::Float,
            "Double" => Type::Double,
            "String" => Type::String,
            "Genotype" => Type::Genotype,
            "Variant" => Type::Variant,
            "AltAllele" => Type::AltAllele,
            "Locus" => Type::Locus,
            "Interval" => Type::Interval,
            "Array" | "Set" => {
                self.expect('[')?;
                let elem = self.parse_type()?;
                self.expect(']')?;
                if name == "Array" { Type::array(elem) } else { Type::set(elem) }
            }
            "Struct" => {
                self.expect('{')?;
                let mut fields = Vec::new();
                if !self.eat('}') {
                    loop {
                        let field = self.ident()?;
                        self.expect(':')?;
                        fields.push(Field { name: field.into(), ty: self.parse_type()? });
                        if self.eat('}') {
                            break;
                        }
                        self.expect(',')?;
                    }
                }
                Type::Struct(fields.into())
            }
            other => return Err(format!("unknown type name `{other}`")),
        };
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_structural_equality() {
        assert_eq!(Type::array(Type::Int), Type::array(Type::Int));
        assert_ne!(Type::array(Type::Int), Type::array(Type::Long));
        assert_ne!(Type::array(Type::Int), Type::set(Type::Int));
        assert_eq!(
            Type::structure([("a", Type::Int), ("b", Type::Double)]),
            Type::structure([("a", Type::Int), ("b", Type::Double)]),
        );
        assert_ne!(
            Type::structure([("a", Type::Int)]),
            Type::structure([("b", Type::Int)]),
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::array(Type::set(Type::String)).to_string(), "Array[Set[String]]");
        assert_eq!(
            Type::structure([("pValue", Type::Double), ("n", Type::Int)]).to_string(),
            "Struct{pValue: Double, n: Int}"
        );
    }

    #[test]
    fn test_parse_nested() {
        let ty: Type = "Array[ Set[Long] ]".parse().unwrap();
        assert_eq!(ty, Type::array(Type::set(Type::Long)));

        let ty: Type = "Struct{x: Int, y: Struct{}}".parse().unwrap();
        assert_eq!(
            ty,
            Type::structure([("x", Type::Int), ("y", Type::structure([]))])
        );
    }

    #[test]
    fn test_parse_errors() {
        let err = "Array[Int".parse::<Type>().unwrap_err();
        assert_eq!(err.reason, "expected `]` at offset 9");
        assert!("Tensor".parse::<Type>().is_err());
        assert!("Int Int".parse::<Type>().is_err());
    }

    #[test]
    fn test_field_lookup() {
        let ty = Type::structure([("a", Type::Int), ("b", Type::Double)]);
        assert_eq!(ty.field("b"), Some((1, &Type::Double)));
        assert_eq!(ty.field("c"), None);
        assert_eq!(Type::Int.field("a"), None);
    }
}
