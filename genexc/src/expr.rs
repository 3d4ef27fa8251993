//! A minimal expression tree compiled against a registry.
//!
//! There is no surface syntax; callers build [`Expr`] values directly.
//! [`compile`] walks the tree bottom-up: it infers each node's type with the
//! registry's type-only queries, resolves every call site exactly once, and
//! composes the resolved callables into a single [`Thunk`].

use indexmap::IndexMap;

use crate::compose::{self, Record, Thunk};
use crate::error::{CompileError, EvalError};
use crate::registry::Registry;
use crate::types::Type;
use crate::value::Value;

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant; `None` is a missing value of the given type.
    Literal(Option<Value>, Type),
    /// A bound identifier.
    Ident(String),
    /// `receiver.name`
    Select(Box<Expr>, String),
    /// `receiver.name(args...)`
    MethodCall(Box<Expr>, String, Vec<Expr>),
    /// `name(args...)`
    Call(String, Vec<Expr>),
}

impl Expr {
    pub fn boolean(b: bool) -> Self {
        Expr::Literal(Some(Value::Boolean(b)), Type::Boolean)
    }

    pub fn int(i: i32) -> Self {
        Expr::Literal(Some(Value::Int(i)), Type::Int)
    }

    pub fn long(i: i64) -> Self {
        Expr::Literal(Some(Value::Long(i)), Type::Long)
    }

    pub fn double(x: f64) -> Self {
        Expr::Literal(Some(Value::Double(x)), Type::Double)
    }

    pub fn string(s: &str) -> Self {
        Expr::Literal(Some(Value::string(s)), Type::String)
    }

    pub fn missing(ty: Type) -> Self {
        Expr::Literal(None, ty)
    }

    pub fn ident(name: &str) -> Self {
        Expr::Ident(name.to_string())
    }

    pub fn select(self, name: &str) -> Self {
        Expr::Select(Box::new(self), name.to_string())
    }

    pub fn method(self, name: &str, args: Vec<Expr>) -> Self {
        Expr::MethodCall(Box::new(self), name.to_string(), args)
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::Call(name.to_string(), args)
    }
}

/// Identifiers in scope: each maps to a record slot and a type.
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
    symbols: IndexMap<String, Type>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to the next slot, or rebind its type if already present.
    /// Returns the slot index.
    pub fn bind(&mut self, name: &str, ty: Type) -> usize {
        self.symbols.insert_full(name.to_string(), ty).0
    }

    /// Builder-style [`bind`](Self::bind).
    pub fn with(mut self, name: &str, ty: Type) -> Self {
        self.bind(name, ty);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<(usize, &Type)> {
        self.symbols.get_full(name).map(|(index, _, ty)| (index, ty))
    }

    /// Number of slots a record for this context has.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A compiled expression.
#[derive(Clone)]
pub struct Compiled {
    pub ty: Type,
    pub thunk: Thunk,
}

impl std::fmt::Debug for Compiled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiled").field("ty", &self.ty).finish_non_exhaustive()
    }
}

impl Compiled {
    pub fn eval(&self, record: &Record) -> Result<Option<Value>, EvalError> {
        (self.thunk)(record)
    }
}

/// Infer the type of `expr` without building any callables.
pub fn infer_type(expr: &Expr, ctx: &EvalContext, registry: &Registry) -> Result<Type, CompileError> {
    match expr {
        Expr::Literal(value, ty) => literal_type(value.as_ref(), ty),
        Expr::Ident(name) => ctx
            .lookup(name)
            .map(|(_, ty)| ty.clone())
            .ok_or_else(|| CompileError::UnboundIdentifier(name.clone())),
        Expr::Select(receiver, name) => {
            let receiver = infer_type(receiver, ctx, registry)?;
            Ok(registry.resolve_field_type(&receiver, name)?)
        }
        Expr::MethodCall(receiver, name, args) => {
            let receiver = infer_type(receiver, ctx, registry)?;
            let args = infer_all(args, ctx, registry)?;
            Ok(registry.resolve_method_return_type(&receiver, name, &args)?)
        }
        Expr::Call(name, args) => {
            let args = infer_all(args, ctx, registry)?;
            Ok(registry.resolve_call_return_type(name, &args)?)
        }
    }
}

/// The declared type of a literal, checked against its value.
fn literal_type(value: Option<&Value>, ty: &Type) -> Result<Type, CompileError> {
    match value {
        Some(value) if !value.conforms_to(ty) => Err(CompileError::LiteralTypeMismatch {
            expected: ty.clone(),
            found: value.kind(),
        }),
        _ => Ok(ty.clone()),
    }
}

fn infer_all(args: &[Expr], ctx: &EvalContext, registry: &Registry) -> Result<Vec<Type>, CompileError> {
    args.iter().map(|arg| infer_type(arg, ctx, registry)).collect()
}

/// Compile `expr` into a thunk over records shaped by `ctx`.
pub fn compile(expr: &Expr, ctx: &EvalContext, registry: &Registry) -> Result<Compiled, CompileError> {
    match expr {
        Expr::Literal(value, ty) => Ok(Compiled {
            ty: literal_type(value.as_ref(), ty)?,
            thunk: compose::constant(value.clone()),
        }),
        Expr::Ident(name) => {
            let (index, ty) = ctx
                .lookup(name)
                .ok_or_else(|| CompileError::UnboundIdentifier(name.clone()))?;
            Ok(Compiled { ty: ty.clone(), thunk: compose::slot(index) })
        }
        Expr::Select(receiver, name) => {
            let receiver = compile(receiver, ctx, registry)?;
            let callable = registry.resolve_field(&receiver.ty, name)?;
            Ok(Compiled {
                ty: callable.ret().clone(),
                thunk: compose::compose(&callable, vec![receiver.thunk])?,
            })
        }
        Expr::MethodCall(receiver, name, args) => {
            let receiver = compile(receiver, ctx, registry)?;
            let args = compile_all(args, ctx, registry)?;
            let types: Vec<Type> = args.iter().map(|a| a.ty.clone()).collect();
            let callable = registry.resolve_method(&receiver.ty, name, &types)?;
            let thunks = std::iter::once(receiver.thunk)
                .chain(args.into_iter().map(|a| a.thunk))
                .collect();
            Ok(Compiled {
                ty: callable.ret().clone(),
                thunk: compose::compose(&callable, thunks)?,
            })
        }
        Expr::Call(name, args) => {
            let args = compile_all(args, ctx, registry)?;
            let types: Vec<Type> = args.iter().map(|a| a.ty.clone()).collect();
            let callable = registry.resolve_call(name, &types)?;
            Ok(Compiled {
                ty: callable.ret().clone(),
                thunk: compose::compose(&callable, args.into_iter().map(|a| a.thunk).collect())?,
            })
        }
    }
}

fn compile_all(args: &[Expr], ctx: &EvalContext, registry: &Registry) -> Result<Vec<Compiled>, CompileError> {
    args.iter().map(|arg| compile(arg, ctx, registry)).collect()
}
