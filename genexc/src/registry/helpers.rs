//! Typed registration: bind plain Rust closures.
//!
//! Each helper derives the signature from the closure's parameter types via
//! [`HostType`] and wraps the body with the `Value` conversions, so catalog
//! code reads as ordinary Rust:
//!
//! ```ignore
//! builder.function2("pow", |x: f64, y: f64| x.powf(y))?;
//! builder.field_opt("gq", |g: Arc<Genotype>| g.gq)?;
//! ```

use std::sync::Arc;

use super::{Callable, Fun, RegistryBuilder, Signature};
use crate::error::{EvalError, RegistrationError};
use crate::value::{FromValue, HostType, IntoValue, Value};

type Registered<'b> = Result<&'b mut RegistryBuilder, RegistrationError>;

impl RegistryBuilder {
    // === Free functions ===

    pub fn function0<R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        R: IntoValue,
        F: Fn() -> R + Send + Sync + 'static,
    {
        let fun = Fun::Nullary(Arc::new(move || f().into_value()));
        self.bind(name, Signature::function([]), Callable::new(R::ty(), fun))
    }

    pub fn function1<A, R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        A: FromValue,
        R: IntoValue,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let fun = Fun::Unary(Arc::new(move |a: Value| f(A::from_value(a)?).into_value()));
        self.bind(name, Signature::function([A::ty()]), Callable::new(R::ty(), fun))
    }

    /// A partial one-argument function: `None` means a missing result.
    pub fn function1_opt<A, R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        A: FromValue,
        R: IntoValue,
        F: Fn(A) -> Option<R> + Send + Sync + 'static,
    {
        let fun = Fun::UnaryOpt(Arc::new(move |a: Value| {
            f(A::from_value(a)?).map(R::into_value).transpose()
        }));
        self.bind(name, Signature::function([A::ty()]), Callable::new(R::ty(), fun))
    }

    pub fn function2<A, B, R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        A: FromValue,
        B: FromValue,
        R: IntoValue,
        F: Fn(A, B) -> R + Send + Sync + 'static,
    {
        let fun = Fun::Binary(Arc::new(move |a: Value, b: Value| {
            f(A::from_value(a)?, B::from_value(b)?).into_value()
        }));
        self.bind(name, Signature::function([A::ty(), B::ty()]), Callable::new(R::ty(), fun))
    }

    pub fn function3<A, B, C, R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        A: FromValue,
        B: FromValue,
        C: FromValue,
        R: IntoValue,
        F: Fn(A, B, C) -> R + Send + Sync + 'static,
    {
        let fun = Fun::Ternary(Arc::new(move |a: Value, b: Value, c: Value| {
            f(A::from_value(a)?, B::from_value(b)?, C::from_value(c)?).into_value()
        }));
        let signature = Signature::function([A::ty(), B::ty(), C::ty()]);
        self.bind(name, signature, Callable::new(R::ty(), fun))
    }

    pub fn function4<A, B, C, D, R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        A: FromValue,
        B: FromValue,
        C: FromValue,
        D: FromValue,
        R: IntoValue,
        F: Fn(A, B, C, D) -> R + Send + Sync + 'static,
    {
        let fun = Fun::Quaternary(Arc::new(move |a: Value, b: Value, c: Value, d: Value| {
            f(
                A::from_value(a)?,
                B::from_value(b)?,
                C::from_value(c)?,
                D::from_value(d)?,
            )
            .into_value()
        }));
        let signature = Signature::function([A::ty(), B::ty(), C::ty(), D::ty()]);
        self.bind(name, signature, Callable::new(R::ty(), fun))
    }

    // === Fields ===

    pub fn field<A, R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        A: FromValue,
        R: IntoValue,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let fun = Fun::Unary(Arc::new(move |a: Value| f(A::from_value(a)?).into_value()));
        self.bind(name, Signature::field(A::ty()), Callable::new(R::ty(), fun))
    }

    /// A field that may be missing on a present receiver.
    pub fn field_opt<A, R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        A: FromValue,
        R: IntoValue,
        F: Fn(A) -> Option<R> + Send + Sync + 'static,
    {
        let fun = Fun::UnaryOpt(Arc::new(move |a: Value| {
            f(A::from_value(a)?).map(R::into_value).transpose()
        }));
        self.bind(name, Signature::field(A::ty()), Callable::new(R::ty(), fun))
    }

    /// Reduce the present elements of an `Array[T]` receiver.
    pub fn aggregate<T, R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        T: FromValue,
        R: IntoValue,
        F: Fn(Vec<T>) -> R + Send + Sync + 'static,
    {
        self.field(name, move |items: Vec<Option<T>>| f(items.into_iter().flatten().collect()))
    }

    /// Like [`aggregate`](Self::aggregate), for reductions undefined on some
    /// inputs (typically the empty array).
    pub fn aggregate_opt<T, R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        T: FromValue,
        R: IntoValue,
        F: Fn(Vec<T>) -> Option<R> + Send + Sync + 'static,
    {
        self.field_opt(name, move |items: Vec<Option<T>>| {
            f(items.into_iter().flatten().collect())
        })
    }

    // === Methods ===

    pub fn method1<A, B, R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        A: FromValue,
        B: FromValue,
        R: IntoValue,
        F: Fn(A, B) -> R + Send + Sync + 'static,
    {
        let fun = Fun::Binary(Arc::new(move |a: Value, b: Value| {
            f(A::from_value(a)?, B::from_value(b)?).into_value()
        }));
        self.bind(name, Signature::method(A::ty(), [B::ty()]), Callable::new(R::ty(), fun))
    }

    pub fn method2<A, B, C, R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        A: FromValue,
        B: FromValue,
        C: FromValue,
        R: IntoValue,
        F: Fn(A, B, C) -> R + Send + Sync + 'static,
    {
        let fun = Fun::Ternary(Arc::new(move |a: Value, b: Value, c: Value| {
            f(A::from_value(a)?, B::from_value(b)?, C::from_value(c)?).into_value()
        }));
        let signature = Signature::method(A::ty(), [B::ty(), C::ty()]);
        self.bind(name, signature, Callable::new(R::ty(), fun))
    }

    pub fn method3<A, B, C, D, R, F>(&mut self, name: &str, f: F) -> Registered<'_>
    where
        A: FromValue,
        B: FromValue,
        C: FromValue,
        D: FromValue,
        R: IntoValue,
        F: Fn(A, B, C, D) -> R + Send + Sync + 'static,
    {
        let fun = Fun::Quaternary(Arc::new(move |a: Value, b: Value, c: Value, d: Value| {
            f(
                A::from_value(a)?,
                B::from_value(b)?,
                C::from_value(c)?,
                D::from_value(d)?,
            )
            .into_value()
        }));
        let signature = Signature::method(A::ty(), [B::ty(), C::ty(), D::ty()]);
        self.bind(name, signature, Callable::new(R::ty(), fun))
    }

    // === Conversions ===

    /// Register a typed conversion from `A` to `B` at `priority`.
    pub fn conversion<A, B, F>(&mut self, priority: u32, f: F) -> Registered<'_>
    where
        A: FromValue,
        B: IntoValue,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let transform = Arc::new(move |v: Value| -> Result<Value, EvalError> {
            f(A::from_value(v)?).into_value()
        });
        self.register_conversion_with_priority(A::ty(), B::ty(), priority, transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::types::Type;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_signatures_come_from_closure_types() {
        let mut builder = Registry::builder();
        builder
            .function2("pow", |x: f64, y: f64| x.powf(y))
            .unwrap()
            .field("length", |s: String| s.len() as i32)
            .unwrap()
            .method1("startsWith", |s: String, p: String| s.starts_with(&p))
            .unwrap();
        let registry = builder.build();

        let pow = &registry.overloads("pow")[0];
        assert_eq!(pow.signature, Signature::function([Type::Double, Type::Double]));
        assert_eq!(pow.callable.ret(), &Type::Double);
        assert_eq!(
            registry.resolve_method_return_type(&Type::String, "startsWith", &[Type::String]),
            Ok(Type::Boolean)
        );
        assert_eq!(registry.resolve_field_type(&Type::String, "length"), Ok(Type::Int));
    }

    #[test]
    fn test_aggregate_skips_missing() {
        let mut builder = Registry::builder();
        builder
            .aggregate("sum", |xs: Vec<i32>| xs.iter().sum::<i32>())
            .unwrap()
            .aggregate_opt("first", |xs: Vec<i32>| xs.first().copied())
            .unwrap();
        let registry = builder.build();
        let array = Value::array([Some(Value::Int(2)), None, Some(Value::Int(5))]);

        let sum = registry.resolve_field(&Type::array(Type::Int), "sum").unwrap();
        assert_eq!(sum.invoke(vec![array]), Ok(Some(Value::Int(7))));

        let first = registry.resolve_field(&Type::array(Type::Int), "first").unwrap();
        assert_eq!(first.invoke(vec![Value::array([None])]), Ok(None));
    }

    #[test]
    fn test_fallible_body_reports_at_invocation() {
        let mut builder = Registry::builder();
        builder
            .function1("checked", |x: i32| {
                if x < 0 {
                    Err(EvalError::invalid_argument("checked", "negative"))
                } else {
                    Ok(x)
                }
            })
            .unwrap();
        let registry = builder.build();
        let checked = registry.resolve_call("checked", &[Type::Int]).unwrap();
        assert_eq!(checked.ret(), &Type::Int);
        assert_eq!(
            checked.invoke(vec![Value::Int(-1)]),
            Err(EvalError::invalid_argument("checked", "negative"))
        );
    }

    #[test]
    fn test_typed_conversion() {
        let mut builder = Registry::builder();
        builder
            .function1("half", |x: f64| x / 2.0)
            .unwrap()
            .conversion(2, |x: i32| f64::from(x))
            .unwrap();
        let registry = builder.build();
        let half = registry.lookup("half", &Signature::function([Type::Int])).unwrap();
        assert_eq!(half.priority, 2);
        assert_eq!(half.callable.invoke(vec![Value::Int(3)]), Ok(Some(Value::Double(1.5))));
    }
}
