//! The function registry: bindings, conversions and lookup.
//!
//! A registry is populated through a [`RegistryBuilder`] and then frozen
//! into an immutable [`Registry`]. The frozen registry is `Send + Sync`, so
//! one instance can serve lookups and hand out callables to any number of
//! threads.
//!
//! # Module Structure
//!
//! - [`signature`] - Field, method and function signatures
//! - [`callable`] - Arity-specific bodies with a return type
//! - [`conversion`] - The `(from, to)` conversion table
//! - [`dispatch`] - Overload resolution and lookup errors
//! - `helpers` - Typed registration of Rust closures
//!
//! # Entry Points
//!
//! | Query | Callable | Type only |
//! |-------|----------|-----------|
//! | `x.name` | [`Registry::resolve_field`] | [`Registry::resolve_field_type`] |
//! | `x.name(args)` | [`Registry::resolve_method`] | [`Registry::resolve_method_return_type`] |
//! | `name(args)` | [`Registry::resolve_call`] | [`Registry::resolve_call_return_type`] |

pub mod callable;
pub mod conversion;
pub mod dispatch;
mod helpers;
pub mod signature;

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::info;

pub use callable::{Callable, Fun};
pub use conversion::{Conversion, ConversionTable, ConvertFn, DEFAULT_PRIORITY};
pub use dispatch::{Applicable, DispatchResolver, LookupError, Resolution};
pub use signature::{Signature, SignatureKind};

use crate::catalog;
use crate::config::Config;
use crate::error::{EvalError, RegistrationError};
use crate::types::Type;
use crate::value::Value;

/// One registered overload.
#[derive(Debug, Clone)]
pub struct Binding {
    pub signature: Signature,
    pub callable: Callable,
}

/// Mutable registry under construction.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    bindings: IndexMap<String, Vec<Binding>>,
    conversions: ConversionTable,
    strict: bool,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve exact signatures only; registered conversions are kept but
    /// never applied.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Register `callable` as the implementation of `name` at `signature`.
    pub fn bind(
        &mut self,
        name: &str,
        signature: Signature,
        callable: Callable,
    ) -> Result<&mut Self, RegistrationError> {
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        let expected = signature.arity();
        let arity_ok = match signature {
            Signature::Field(_) => callable.arity() == 1,
            // Receiver plus one to three arguments.
            Signature::Method(_) => (2..=4).contains(&expected) && callable.arity() == expected,
            Signature::Function(_) => callable.arity() == expected,
        };
        if !arity_ok {
            return Err(RegistrationError::ArityMismatch {
                name: name.to_string(),
                arity: callable.arity(),
                signature,
            });
        }

        let overloads = self.bindings.entry(name.to_string()).or_default();
        if overloads.iter().any(|b| b.signature == signature) {
            return Err(RegistrationError::DuplicateBinding {
                name: name.to_string(),
                signature,
            });
        }
        overloads.push(Binding { signature, callable });
        Ok(self)
    }

    /// Register a conversion at the default priority.
    pub fn register_conversion(
        &mut self,
        from: Type,
        to: Type,
        transform: ConvertFn,
    ) -> Result<&mut Self, RegistrationError> {
        self.register_conversion_with_priority(from, to, DEFAULT_PRIORITY, transform)
    }

    /// Register a conversion; `priority` must be at least 1.
    pub fn register_conversion_with_priority(
        &mut self,
        from: Type,
        to: Type,
        priority: u32,
        transform: ConvertFn,
    ) -> Result<&mut Self, RegistrationError> {
        self.conversions.insert(from, to, priority, transform)?;
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> Registry {
        let n_bindings: usize = self.bindings.values().map(Vec::len).sum();
        info!(
            names = self.bindings.len(),
            bindings = n_bindings,
            conversions = self.conversions.len(),
            strict = self.strict,
            "registry frozen"
        );
        Registry {
            bindings: self.bindings,
            conversions: self.conversions,
            strict: self.strict,
        }
    }
}

/// An immutable, thread-shareable registry.
#[derive(Debug)]
pub struct Registry {
    bindings: IndexMap<String, Vec<Binding>>,
    conversions: ConversionTable,
    strict: bool,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The built-in catalog with default configuration.
    pub fn standard() -> Arc<Registry> {
        Self::from_config(&Config::default())
    }

    /// The built-in catalog configured by `config`.
    ///
    /// # Panics
    ///
    /// Panics if the catalog itself is inconsistent (duplicate bindings or
    /// conversions); that is a bug in this crate, not a user error.
    pub fn from_config(config: &Config) -> Arc<Registry> {
        let mut builder = RegistryBuilder::new().strict(!config.dispatch.implicit_conversions);
        if let Err(err) = catalog::install(&mut builder, &config.catalog) {
            panic!("BUG: built-in catalog registration failed: {err}");
        }
        Arc::new(builder.build())
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn conversions(&self) -> &ConversionTable {
        &self.conversions
    }

    /// All bindings as `(name, binding)`, in registration order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings
            .iter()
            .flat_map(|(name, overloads)| overloads.iter().map(move |b| (name.as_str(), b)))
    }

    /// Overloads registered under `name`, in registration order.
    pub fn overloads(&self, name: &str) -> &[Binding] {
        self.bindings.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    fn resolver(&self) -> DispatchResolver<'_> {
        DispatchResolver::new(&self.conversions).strict(self.strict)
    }

    /// Resolve without building a callable.
    pub fn rank(&self, name: &str, requested: &Signature) -> Result<Applicable<'_>, LookupError> {
        self.resolver().resolve(name, requested, self.overloads(name))
    }

    /// Resolve `name` at `requested` and fold the chosen conversions into
    /// the returned callable.
    pub fn lookup(&self, name: &str, requested: &Signature) -> Result<Resolution, LookupError> {
        let applicable = self.rank(name, requested)?;
        let conversions = applicable
            .conversions
            .iter()
            .map(|c| c.map(|c| c.transform.clone()))
            .collect();
        Ok(Resolution {
            signature: applicable.binding.signature.clone(),
            priority: applicable.priority,
            callable: applicable.binding.callable.adapt(conversions),
        })
    }

    /// Return type of `name` at `requested`, without building a callable.
    pub fn lookup_type(&self, name: &str, requested: &Signature) -> Result<Type, LookupError> {
        Ok(self.rank(name, requested)?.binding.callable.ret().clone())
    }

    /// Resolve `receiver.name`.
    ///
    /// Declared fields of a struct receiver take precedence over registered
    /// field bindings.
    pub fn resolve_field(&self, receiver: &Type, name: &str) -> Result<Callable, LookupError> {
        if let Some((index, ty)) = receiver.field(name) {
            return Ok(project(receiver.clone(), index, ty.clone()));
        }
        Ok(self.lookup(name, &Signature::field(receiver.clone()))?.callable)
    }

    pub fn resolve_field_type(&self, receiver: &Type, name: &str) -> Result<Type, LookupError> {
        if let Some((_, ty)) = receiver.field(name) {
            return Ok(ty.clone());
        }
        self.lookup_type(name, &Signature::field(receiver.clone()))
    }

    /// Resolve `receiver.name(args...)`.
    pub fn resolve_method(
        &self,
        receiver: &Type,
        name: &str,
        args: &[Type],
    ) -> Result<Callable, LookupError> {
        let requested = Signature::method(receiver.clone(), args.iter().cloned());
        Ok(self.lookup(name, &requested)?.callable)
    }

    pub fn resolve_method_return_type(
        &self,
        receiver: &Type,
        name: &str,
        args: &[Type],
    ) -> Result<Type, LookupError> {
        self.lookup_type(name, &Signature::method(receiver.clone(), args.iter().cloned()))
    }

    /// Resolve the free function `name(args...)`.
    pub fn resolve_call(&self, name: &str, args: &[Type]) -> Result<Callable, LookupError> {
        Ok(self.lookup(name, &Signature::function(args.iter().cloned()))?.callable)
    }

    pub fn resolve_call_return_type(&self, name: &str, args: &[Type]) -> Result<Type, LookupError> {
        self.lookup_type(name, &Signature::function(args.iter().cloned()))
    }
}

/// A callable reading field `index` of a struct value.
fn project(receiver: Type, index: usize, ty: Type) -> Callable {
    Callable::new(
        ty,
        Fun::UnaryOpt(Arc::new(move |value: Value| match value {
            Value::Struct(fields) => Ok(fields.get(index).cloned().flatten()),
            other => Err(EvalError::TypeMismatch {
                expected: receiver.clone(),
                found: other.kind(),
            }),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn constant(ret: Type, value: Value) -> Callable {
        Callable::new(ret, Fun::Unary(Arc::new(move |_| Ok(value.clone()))))
    }

    #[test]
    fn test_bind_rejects_duplicates_and_bad_arity() {
        let mut builder = Registry::builder();
        builder
            .bind("f", Signature::function([Type::Int]), constant(Type::Int, Value::Int(1)))
            .unwrap();
        assert_eq!(
            builder
                .bind("f", Signature::function([Type::Int]), constant(Type::Int, Value::Int(2)))
                .err(),
            Some(RegistrationError::DuplicateBinding {
                name: "f".into(),
                signature: Signature::function([Type::Int]),
            })
        );
        assert_eq!(
            builder
                .bind("g", Signature::function([Type::Int, Type::Int]), constant(Type::Int, Value::Int(1)))
                .err(),
            Some(RegistrationError::ArityMismatch {
                name: "g".into(),
                signature: Signature::function([Type::Int, Type::Int]),
                arity: 1,
            })
        );
        assert_eq!(
            builder
                .bind("", Signature::field(Type::Int), constant(Type::Int, Value::Int(1)))
                .err(),
            Some(RegistrationError::EmptyName)
        );
    }

    #[test]
    fn test_method_needs_an_argument_besides_the_receiver() {
        let mut builder = Registry::builder();
        let receiver_only = Signature::method(Type::Int, []);
        assert_eq!(
            builder
                .bind("m", receiver_only.clone(), constant(Type::Int, Value::Int(1)))
                .err(),
            Some(RegistrationError::ArityMismatch {
                name: "m".into(),
                signature: receiver_only,
                arity: 1,
            })
        );
        assert!(builder.bindings.get("m").map_or(true, Vec::is_empty));
    }

    #[test]
    fn test_same_name_different_kinds_coexist() {
        let mut builder = Registry::builder();
        builder
            .bind("len", Signature::field(Type::String), constant(Type::Int, Value::Int(1)))
            .unwrap()
            .bind("len", Signature::function([Type::String]), constant(Type::Int, Value::Int(2)))
            .unwrap();
        let registry = builder.build();
        assert_eq!(registry.overloads("len").len(), 2);
        let field = registry.resolve_field(&Type::String, "len").unwrap();
        assert_eq!(field.invoke(vec![Value::string("x")]), Ok(Some(Value::Int(1))));
        let call = registry.resolve_call("len", &[Type::String]).unwrap();
        assert_eq!(call.invoke(vec![Value::string("x")]), Ok(Some(Value::Int(2))));
    }

    #[test]
    fn test_struct_field_projection() {
        let registry = Registry::builder().build();
        let ty = Type::structure([("a", Type::Int), ("b", Type::Double)]);
        assert_eq!(registry.resolve_field_type(&ty, "b"), Ok(Type::Double));

        let b = registry.resolve_field(&ty, "b").unwrap();
        assert!(b.is_partial());
        let record = Value::Struct(Arc::from([Some(Value::Int(1)), None]));
        assert_eq!(b.invoke(vec![record]), Ok(None));
        assert!(matches!(
            b.invoke(vec![Value::Int(3)]),
            Err(EvalError::TypeMismatch { found: "Int", .. })
        ));
        assert!(registry.resolve_field(&ty, "c").is_err());
    }

    #[test]
    fn test_strict_mode_ignores_conversions() {
        let mut builder = Registry::builder().strict(true);
        builder
            .bind("f", Signature::function([Type::Long]), constant(Type::Long, Value::Long(1)))
            .unwrap()
            .register_conversion(Type::Int, Type::Long, Arc::new(|v: Value| Ok(v)))
            .unwrap();
        let registry = builder.build();
        assert!(registry.is_strict());
        assert_eq!(
            registry.resolve_call_return_type("f", &[Type::Int]),
            Err(LookupError::NotFound {
                name: "f".into(),
                requested: Signature::function([Type::Int]),
            })
        );
        assert_eq!(registry.resolve_call_return_type("f", &[Type::Long]), Ok(Type::Long));
    }
}
