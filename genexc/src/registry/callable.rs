//! Callables: an arity-specific body plus a declared return type.

use std::fmt;
use std::sync::Arc;

use super::conversion::ConvertFn;
use crate::error::EvalError;
use crate::types::Type;
use crate::value::Value;

type Body0 = dyn Fn() -> Result<Value, EvalError> + Send + Sync;
type Body1 = dyn Fn(Value) -> Result<Value, EvalError> + Send + Sync;
type Body1Opt = dyn Fn(Value) -> Result<Option<Value>, EvalError> + Send + Sync;
type Body2 = dyn Fn(Value, Value) -> Result<Value, EvalError> + Send + Sync;
type Body3 = dyn Fn(Value, Value, Value) -> Result<Value, EvalError> + Send + Sync;
type Body4 = dyn Fn(Value, Value, Value, Value) -> Result<Value, EvalError> + Send + Sync;

/// A callable body, one variant per supported arity.
///
/// Bodies only ever receive present values; missingness is handled by the
/// composer before a body runs. `UnaryOpt` is the one partial shape: its
/// body may itself report a missing result.
#[derive(Clone)]
pub enum Fun {
    Nullary(Arc<Body0>),
    Unary(Arc<Body1>),
    UnaryOpt(Arc<Body1Opt>),
    Binary(Arc<Body2>),
    Ternary(Arc<Body3>),
    Quaternary(Arc<Body4>),
}

impl Fun {
    pub fn arity(&self) -> usize {
        match self {
            Fun::Nullary(_) => 0,
            Fun::Unary(_) | Fun::UnaryOpt(_) => 1,
            Fun::Binary(_) => 2,
            Fun::Ternary(_) => 3,
            Fun::Quaternary(_) => 4,
        }
    }
}

/// A registered function body together with its return type.
#[derive(Clone)]
pub struct Callable {
    ret: Type,
    fun: Fun,
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("arity", &self.arity())
            .field("partial", &self.is_partial())
            .field("ret", &self.ret)
            .finish()
    }
}

fn convert(conversion: &Option<ConvertFn>, value: Value) -> Result<Value, EvalError> {
    match conversion {
        Some(transform) => transform(value),
        None => Ok(value),
    }
}

impl Callable {
    pub fn new(ret: Type, fun: Fun) -> Self {
        Self { ret, fun }
    }

    /// The declared return type.
    pub fn ret(&self) -> &Type {
        &self.ret
    }

    pub fn fun(&self) -> &Fun {
        &self.fun
    }

    pub fn arity(&self) -> usize {
        self.fun.arity()
    }

    /// Whether the body may itself produce a missing result.
    pub fn is_partial(&self) -> bool {
        matches!(self.fun, Fun::UnaryOpt(_))
    }

    /// Invoke the body directly on present arguments.
    pub fn invoke(&self, args: Vec<Value>) -> Result<Option<Value>, EvalError> {
        let found = args.len();
        let arity_mismatch = || EvalError::ArityMismatch { expected: self.arity(), found };
        if found != self.arity() {
            return Err(arity_mismatch());
        }
        let mut args = args.into_iter();
        let mut next = || args.next().ok_or_else(arity_mismatch);
        match &self.fun {
            Fun::Nullary(f) => f().map(Some),
            Fun::Unary(f) => f(next()?).map(Some),
            Fun::UnaryOpt(f) => f(next()?),
            Fun::Binary(f) => f(next()?, next()?).map(Some),
            Fun::Ternary(f) => f(next()?, next()?, next()?).map(Some),
            Fun::Quaternary(f) => f(next()?, next()?, next()?, next()?).map(Some),
        }
    }

    /// Wrap the body so each argument first passes through its conversion.
    ///
    /// `conversions[i]` applies to argument `i`; `None` leaves it unchanged.
    /// The return type is unaffected.
    pub(crate) fn adapt(&self, conversions: Vec<Option<ConvertFn>>) -> Callable {
        if conversions.iter().all(Option::is_none) {
            return self.clone();
        }
        let at = |i: usize| conversions.get(i).cloned().flatten();
        let fun = match &self.fun {
            Fun::Nullary(f) => Fun::Nullary(f.clone()),
            Fun::Unary(f) => {
                let (f, c0) = (f.clone(), at(0));
                Fun::Unary(Arc::new(move |a| f(convert(&c0, a)?)))
            }
            Fun::UnaryOpt(f) => {
                let (f, c0) = (f.clone(), at(0));
                Fun::UnaryOpt(Arc::new(move |a| f(convert(&c0, a)?)))
            }
            Fun::Binary(f) => {
                let (f, c0, c1) = (f.clone(), at(0), at(1));
                Fun::Binary(Arc::new(move |a, b| f(convert(&c0, a)?, convert(&c1, b)?)))
            }
            Fun::Ternary(f) => {
                let (f, c0, c1, c2) = (f.clone(), at(0), at(1), at(2));
                Fun::Ternary(Arc::new(move |a, b, c| {
                    f(convert(&c0, a)?, convert(&c1, b)?, convert(&c2, c)?)
                }))
            }
            Fun::Quaternary(f) => {
                let (f, c0, c1, c2, c3) = (f.clone(), at(0), at(1), at(2), at(3));
                Fun::Quaternary(Arc::new(move |a, b, c, d| {
                    f(
                        convert(&c0, a)?,
                        convert(&c1, b)?,
                        convert(&c2, c)?,
                        convert(&c3, d)?,
                    )
                }))
            }
        };
        Callable { ret: self.ret.clone(), fun }
    }
}
