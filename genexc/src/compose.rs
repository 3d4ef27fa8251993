//! Composition of resolved callables into re-invocable thunks.
//!
//! Resolution happens once per call site; the resulting [`Thunk`] is then
//! replayed for every record. A thunk reads its inputs from the record it is
//! handed, so one thunk can be shared by any number of threads.
//!
//! Missing values propagate: if any argument thunk yields `None`, the body is
//! not invoked and the composite yields `None`. Arguments are evaluated left
//! to right and evaluation stops at the first missing one. A partial body
//! may additionally report `None` itself.

use std::sync::Arc;

use crate::error::{CompileError, EvalError};
use crate::registry::{Callable, Fun};
use crate::value::Value;

/// The per-record environment: one slot per bound identifier.
pub type Record = [Option<Value>];

/// A re-invocable computation over a record.
pub type Thunk = Arc<dyn Fn(&Record) -> Result<Option<Value>, EvalError> + Send + Sync>;

/// A thunk that always yields `value`.
pub fn constant(value: Option<Value>) -> Thunk {
    Arc::new(move |_: &Record| Ok(value.clone()))
}

/// A thunk reading record slot `index`. Out-of-range slots read as missing.
pub fn slot(index: usize) -> Thunk {
    Arc::new(move |record: &Record| Ok(record.get(index).cloned().flatten()))
}

fn fixed<const N: usize>(args: Vec<Thunk>) -> Result<[Thunk; N], CompileError> {
    args.try_into().map_err(|args: Vec<Thunk>| CompileError::ArityMismatch {
        expected: N,
        found: args.len(),
    })
}

/// Compose `callable` over argument thunks, one per parameter.
///
/// Total bodies have their result wrapped as present; the partial shape is
/// composed with [`eval_flat_compose`] so its own `None` passes through.
pub fn compose(callable: &Callable, args: Vec<Thunk>) -> Result<Thunk, CompileError> {
    let thunk: Thunk = match callable.fun().clone() {
        Fun::Nullary(f) => {
            fixed::<0>(args)?;
            Arc::new(move |_: &Record| f().map(Some))
        }
        Fun::UnaryOpt(f) => {
            let [a] = fixed(args)?;
            eval_flat_compose(f, a)
        }
        Fun::Unary(f) => {
            let [a] = fixed(args)?;
            Arc::new(move |record: &Record| {
                let Some(x) = a(record)? else { return Ok(None) };
                f(x).map(Some)
            })
        }
        Fun::Binary(f) => {
            let [a, b] = fixed(args)?;
            Arc::new(move |record: &Record| {
                let Some(x) = a(record)? else { return Ok(None) };
                let Some(y) = b(record)? else { return Ok(None) };
                f(x, y).map(Some)
            })
        }
        Fun::Ternary(f) => {
            let [a, b, c] = fixed(args)?;
            Arc::new(move |record: &Record| {
                let Some(x) = a(record)? else { return Ok(None) };
                let Some(y) = b(record)? else { return Ok(None) };
                let Some(z) = c(record)? else { return Ok(None) };
                f(x, y, z).map(Some)
            })
        }
        Fun::Quaternary(f) => {
            let [a, b, c, d] = fixed(args)?;
            Arc::new(move |record: &Record| {
                let Some(w) = a(record)? else { return Ok(None) };
                let Some(x) = b(record)? else { return Ok(None) };
                let Some(y) = c(record)? else { return Ok(None) };
                let Some(z) = d(record)? else { return Ok(None) };
                f(w, x, y, z).map(Some)
            })
        }
    };
    Ok(thunk)
}

/// Compose a partial one-argument body over `arg`.
pub fn eval_flat_compose(
    f: Arc<dyn Fn(Value) -> Result<Option<Value>, EvalError> + Send + Sync>,
    arg: Thunk,
) -> Thunk {
    Arc::new(move |record: &Record| match arg(record)? {
        Some(x) => f(x),
        None => Ok(None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pair() -> Callable {
        Callable::new(
            Type::Int,
            Fun::Binary(Arc::new(|a: Value, b: Value| match (a, b) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a * 10 + b)),
                (a, _) => Err(EvalError::TypeMismatch { expected: Type::Int, found: a.kind() }),
            })),
        )
    }

    #[test]
    fn test_compose_reads_record_each_time() {
        let thunk = compose(&pair(), vec![slot(0), slot(1)]).unwrap();
        assert_eq!(thunk(&[Some(Value::Int(1)), Some(Value::Int(2))]), Ok(Some(Value::Int(12))));
        assert_eq!(thunk(&[Some(Value::Int(3)), Some(Value::Int(4))]), Ok(Some(Value::Int(34))));
    }

    #[test]
    fn test_missing_argument_skips_body() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = {
            let calls = calls.clone();
            Callable::new(
                Type::Int,
                Fun::Unary(Arc::new(move |v: Value| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(v)
                })),
            )
        };
        let thunk = compose(&counted, vec![slot(0)]).unwrap();
        assert_eq!(thunk(&[None]), Ok(None));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(thunk(&[Some(Value::Int(1))]), Ok(Some(Value::Int(1))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_later_arguments_not_evaluated_after_missing() {
        let evaluated = Arc::new(AtomicUsize::new(0));
        let probe: Thunk = {
            let evaluated = evaluated.clone();
            Arc::new(move |_: &Record| {
                evaluated.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Value::Int(1)))
            })
        };
        let thunk = compose(&pair(), vec![constant(None), probe]).unwrap();
        assert_eq!(thunk(&[]), Ok(None));
        assert_eq!(evaluated.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_flat_compose_passes_partial_result() {
        let parse = Callable::new(
            Type::Int,
            Fun::UnaryOpt(Arc::new(|v: Value| match v {
                Value::String(s) => Ok(s.parse().ok().map(Value::Int)),
                other => Err(EvalError::TypeMismatch { expected: Type::String, found: other.kind() }),
            })),
        );
        let thunk = compose(&parse, vec![slot(0)]).unwrap();
        assert_eq!(thunk(&[Some(Value::string("42"))]), Ok(Some(Value::Int(42))));
        assert_eq!(thunk(&[Some(Value::string("x"))]), Ok(None));
        assert_eq!(thunk(&[None]), Ok(None));
    }

    #[test]
    fn test_wrong_argument_count() {
        assert_eq!(
            compose(&pair(), vec![slot(0)]).err(),
            Some(CompileError::ArityMismatch { expected: 2, found: 1 })
        );
    }

    #[test]
    fn test_errors_propagate() {
        let thunk = compose(&pair(), vec![constant(Some(Value::Long(1))), slot(0)]).unwrap();
        assert_eq!(
            thunk(&[Some(Value::Int(1))]),
            Err(EvalError::TypeMismatch { expected: Type::Int, found: "Long" })
        );
    }
}
