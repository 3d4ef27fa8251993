//! Statistical tests returning struct values.
//!
//! Counts are validated when the function runs, not when it is resolved:
//! `hwe(-1, 0, 0)` resolves like any other call and fails on invocation.

use std::sync::Arc;

use genex_stats::{fisher_exact, hardy_weinberg, FisherResult, HweResult};

use crate::error::{EvalError, RegistrationError};
use crate::registry::RegistryBuilder;
use crate::types::Type;
use crate::value::{HostType, IntoValue, Value};

/// `hwe` result. An empty sample has both fields missing.
struct Hwe(Option<HweResult>);

impl HostType for Hwe {
    fn ty() -> Type {
        Type::structure([
            ("rExpectedHetFrequency", Type::Double),
            ("pHWE", Type::Double),
        ])
    }
}

impl IntoValue for Hwe {
    fn into_value(self) -> Result<Value, EvalError> {
        let fields = match self.0 {
            Some(r) => [
                Some(Value::Double(r.expected_het_frequency)),
                Some(Value::Double(r.p_value)),
            ],
            None => [None, None],
        };
        Ok(Value::Struct(Arc::from(fields)))
    }
}

impl HostType for FisherResult {
    fn ty() -> Type {
        Type::structure([
            ("pValue", Type::Double),
            ("oddsRatio", Type::Double),
            ("ci95Lower", Type::Double),
            ("ci95Upper", Type::Double),
        ])
    }
}

impl IntoValue for FisherResult {
    fn into_value(self) -> Result<Value, EvalError> {
        Ok(Value::Struct(Arc::from([
            Some(Value::Double(self.p_value)),
            Some(Value::Double(self.odds_ratio)),
            Some(Value::Double(self.ci_lower)),
            Some(Value::Double(self.ci_upper)),
        ])))
    }
}

pub fn install(b: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    b.function3("hwe", |n_hom_ref: i32, n_het: i32, n_hom_var: i32| {
        hardy_weinberg(n_hom_ref.into(), n_het.into(), n_hom_var.into())
            .map(Hwe)
            .map_err(|err| EvalError::invalid_argument("hwe", err))
    })?
    .function4("fet", |a: i32, b: i32, c: i32, d: i32| {
        fisher_exact(a.into(), b.into(), c.into(), d.into())
            .map_err(|err| EvalError::invalid_argument("fet", err))
    })?;
    Ok(())
}
