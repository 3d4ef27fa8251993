//! Genex: a type-directed function registry for genomic expressions.
//!
//! Expressions over genotypes, variants and plain values (`g.gq`,
//! `v.locus.contains(l)`, `max(x, 2)`) are resolved against a [`Registry`]
//! of overloaded bindings. Resolution picks the overload whose parameters
//! the argument types reach with the cheapest implicit conversions, and
//! yields a [`Callable`] that already performs those conversions.
//!
//! # Module Structure
//!
//! - [`types`] - The type model: scalars, collections, structs, genomic records
//! - [`value`] - Runtime values and the Rust/host type bridge
//! - [`genomics`] - Genotype, variant, locus and interval records
//! - [`registry`] - Bindings, conversions and overload resolution
//! - [`compose`] - Composing callables with missing-value propagation
//! - [`expr`] - A small expression tree compiled through the registry
//! - [`catalog`] - The built-in function catalog
//! - [`config`] - TOML configuration
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```
//! use genexc::{compile, EvalContext, Expr, Registry, Type, Value};
//!
//! let registry = Registry::standard();
//! let ctx = EvalContext::new().with("x", Type::Int);
//! let expr = Expr::call("sqrt", vec![Expr::ident("x")]);
//! let compiled = compile(&expr, &ctx, &registry).unwrap();
//!
//! assert_eq!(compiled.ty, Type::Double);
//! assert_eq!(compiled.eval(&[Some(Value::Int(9))]), Ok(Some(Value::Double(3.0))));
//! assert_eq!(compiled.eval(&[None]), Ok(None));
//! ```

pub mod catalog;
pub mod compose;
pub mod config;
pub mod error;
pub mod expr;
pub mod genomics;
pub mod registry;
pub mod types;
pub mod value;

pub use compose::{compose, Record, Thunk};
pub use config::{Config, ConfigError};
pub use error::{CompileError, EvalError, RegistrationError};
pub use expr::{compile, infer_type, Compiled, EvalContext, Expr};
pub use registry::{
    Callable, Fun, LookupError, Registry, RegistryBuilder, Resolution, Signature,
};
pub use types::Type;
pub use value::Value;
