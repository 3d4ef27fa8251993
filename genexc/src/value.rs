//! Runtime values and the bridge between Rust host types and [`Type`].
//!
//! Callables operate on [`Value`]s. A missing value is never a `Value`
//! variant; it is the `None` of an `Option<Value>`, so a callable body can
//! only ever see present arguments.
//!
//! The [`HostType`], [`FromValue`] and [`IntoValue`] traits let catalog
//! authors register ordinary Rust closures: the registration helpers read the
//! signature off the closure's parameter types and wrap the body with the
//! conversions between `Value` and the host types.

use std::fmt;
use std::sync::Arc;

use crate::error::EvalError;
use crate::genomics::{gt_pair, AltAllele, Genotype, Interval, Locus, Variant};
use crate::types::Type;

/// A present runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Arc<str>),
    Array(Arc<[Option<Value>]>),
    Set(Arc<[Option<Value>]>),
    /// Field values in declaration order.
    Struct(Arc<[Option<Value>]>),
    Genotype(Arc<Genotype>),
    Variant(Arc<Variant>),
    AltAllele(Arc<AltAllele>),
    Locus(Arc<Locus>),
    Interval(Arc<Interval>),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn array(items: impl IntoIterator<Item = Option<Value>>) -> Self {
        Value::Array(items.into_iter().collect())
    }

    /// Whether this value is a member of `ty`. Missing elements and fields
    /// belong to every type.
    pub fn conforms_to(&self, ty: &Type) -> bool {
        let all = |items: &[Option<Value>], ty: &Type| {
            items.iter().flatten().all(|v| v.conforms_to(ty))
        };
        match (self, ty) {
            (Value::Boolean(_), Type::Boolean)
            | (Value::Int(_), Type::Int)
            | (Value::Long(_), Type::Long)
            | (Value::Float(_), Type::Float)
            | (Value::Double(_), Type::Double)
            | (Value::String(_), Type::String)
            | (Value::Genotype(_), Type::Genotype)
            | (Value::Variant(_), Type::Variant)
            | (Value::AltAllele(_), Type::AltAllele)
            | (Value::Locus(_), Type::Locus)
            | (Value::Interval(_), Type::Interval) => true,
            (Value::Array(items), Type::Array(element)) | (Value::Set(items), Type::Set(element)) => {
                all(items, element.as_ref())
            }
            (Value::Struct(values), Type::Struct(fields)) => {
                values.len() == fields.len()
                    && values
                        .iter()
                        .zip(fields.iter())
                        .all(|(v, f)| v.as_ref().map_or(true, |v| v.conforms_to(&f.ty)))
            }
            _ => false,
        }
    }

    /// Name of the value's variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "Boolean",
            Value::Int(_) => "Int",
            Value::Long(_) => "Long",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Set(_) => "Set",
            Value::Struct(_) => "Struct",
            Value::Genotype(_) => "Genotype",
            Value::Variant(_) => "Variant",
            Value::AltAllele(_) => "AltAllele",
            Value::Locus(_) => "Locus",
            Value::Interval(_) => "Interval",
        }
    }
}

/// Text used for a missing value.
pub const MISSING: &str = "NA";

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Option<Value>]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match item {
            Some(value) => write!(f, "{value}")?,
            None => f.write_str(MISSING)?,
        }
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Long(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Double(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                f.write_str("[")?;
                write_items(f, items)?;
                f.write_str("]")
            }
            Value::Set(items) => {
                f.write_str("{")?;
                write_items(f, items)?;
                f.write_str("}")
            }
            Value::Struct(fields) => {
                f.write_str("(")?;
                write_items(f, fields)?;
                f.write_str(")")
            }
            Value::Genotype(g) => match g.gt.and_then(gt_pair) {
                Some((j, k)) => write!(f, "{j}/{k}"),
                None => f.write_str("./."),
            },
            Value::Variant(v) => {
                let alts: Vec<&str> = v.alt_alleles.iter().map(|a| a.alt.as_str()).collect();
                write!(f, "{}:{}:{}:{}", v.contig, v.start, v.reference, alts.join(","))
            }
            Value::AltAllele(a) => write!(f, "{}/{}", a.reference, a.alt),
            Value::Locus(l) => write!(f, "{l}"),
            Value::Interval(i) => write!(f, "{}-{}", i.start, i.end),
        }
    }
}

/// A Rust type with a fixed descriptor in the expression language.
pub trait HostType: Sized + 'static {
    fn ty() -> Type;
}

/// Extract a host value from a runtime value.
pub trait FromValue: HostType {
    fn from_value(value: Value) -> Result<Self, EvalError>;
}

/// Produce a runtime value from a host value.
///
/// Fallible: `Result<T, EvalError>` is itself `IntoValue`, so a callable body
/// that can fail is registered exactly like one that cannot.
pub trait IntoValue: HostType {
    fn into_value(self) -> Result<Value, EvalError>;
}

fn mismatch(expected: Type, found: &Value) -> EvalError {
    EvalError::TypeMismatch { expected, found: found.kind() }
}

macro_rules! host_scalar {
    ($rust:ty, $variant:ident) => {
        impl HostType for $rust {
            fn ty() -> Type {
                Type::$variant
            }
        }

        impl FromValue for $rust {
            fn from_value(value: Value) -> Result<Self, EvalError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch(Type::$variant, &other)),
                }
            }
        }

        impl IntoValue for $rust {
            fn into_value(self) -> Result<Value, EvalError> {
                Ok(Value::$variant(self))
            }
        }
    };
}

host_scalar!(bool, Boolean);
host_scalar!(i32, Int);
host_scalar!(i64, Long);
host_scalar!(f32, Float);
host_scalar!(f64, Double);

impl HostType for String {
    fn ty() -> Type {
        Type::String
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, EvalError> {
        match value {
            Value::String(s) => Ok(s.to_string()),
            other => Err(mismatch(Type::String, &other)),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Result<Value, EvalError> {
        Ok(Value::String(self.into()))
    }
}

/// Records are shared: `FromValue` hands out the `Arc`, and `IntoValue` is
/// available both for the `Arc` and for a freshly built record.
macro_rules! host_record {
    ($rust:ident) => {
        impl HostType for Arc<$rust> {
            fn ty() -> Type {
                Type::$rust
            }
        }

        impl FromValue for Arc<$rust> {
            fn from_value(value: Value) -> Result<Self, EvalError> {
                match value {
                    Value::$rust(v) => Ok(v),
                    other => Err(mismatch(Type::$rust, &other)),
                }
            }
        }

        impl IntoValue for Arc<$rust> {
            fn into_value(self) -> Result<Value, EvalError> {
                Ok(Value::$rust(self))
            }
        }

        impl HostType for $rust {
            fn ty() -> Type {
                Type::$rust
            }
        }

        impl IntoValue for $rust {
            fn into_value(self) -> Result<Value, EvalError> {
                Ok(Value::$rust(Arc::new(self)))
            }
        }
    };
}

host_record!(Genotype);
host_record!(Variant);
host_record!(AltAllele);
host_record!(Locus);
host_record!(Interval);

/// Arrays keep per-element missingness.
impl<T: HostType> HostType for Vec<Option<T>> {
    fn ty() -> Type {
        Type::array(T::ty())
    }
}

impl<T: FromValue> FromValue for Vec<Option<T>> {
    fn from_value(value: Value) -> Result<Self, EvalError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| item.clone().map(T::from_value).transpose())
                .collect(),
            other => Err(mismatch(Self::ty(), &other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<Option<T>> {
    fn into_value(self) -> Result<Value, EvalError> {
        let items = self
            .into_iter()
            .map(|item| item.map(T::into_value).transpose())
            .collect::<Result<Arc<[_]>, _>>()?;
        Ok(Value::Array(items))
    }
}

/// A set, held as its distinct elements in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct HostSet<T>(pub Vec<Option<T>>);

impl<T: PartialEq> HostSet<T> {
    /// Deduplicate `items`, keeping the first occurrence of each.
    pub fn from_items(items: Vec<Option<T>>) -> Self {
        let mut distinct: Vec<Option<T>> = Vec::with_capacity(items.len());
        for item in items {
            if !distinct.contains(&item) {
                distinct.push(item);
            }
        }
        HostSet(distinct)
    }
}

impl<T: HostType> HostType for HostSet<T> {
    fn ty() -> Type {
        Type::set(T::ty())
    }
}

impl<T: FromValue> FromValue for HostSet<T> {
    fn from_value(value: Value) -> Result<Self, EvalError> {
        match value {
            Value::Set(items) => items
                .iter()
                .map(|item| item.clone().map(T::from_value).transpose())
                .collect::<Result<Vec<_>, _>>()
                .map(HostSet),
            other => Err(mismatch(Self::ty(), &other)),
        }
    }
}

impl<T: IntoValue> IntoValue for HostSet<T> {
    fn into_value(self) -> Result<Value, EvalError> {
        let items = self
            .0
            .into_iter()
            .map(|item| item.map(T::into_value).transpose())
            .collect::<Result<Arc<[_]>, _>>()?;
        Ok(Value::Set(items))
    }
}

impl<T: HostType> HostType for Result<T, EvalError> {
    fn ty() -> Type {
        T::ty()
    }
}

impl<T: IntoValue> IntoValue for Result<T, EvalError> {
    fn into_value(self) -> Result<Value, EvalError> {
        self?.into_value()
    }
}
