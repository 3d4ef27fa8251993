//! Random sampling functions.
//!
//! All functions draw from one [`Sampler`] shared by the registry, so a
//! seeded configuration reproduces the same sequence across runs as long as
//! calls happen in the same order.

use std::f64::consts::TAU;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{EvalError, RegistrationError};
use crate::registry::RegistryBuilder;

/// Shared random source.
#[derive(Clone)]
pub struct Sampler {
    rng: Arc<Mutex<StdRng>>,
}

impl Sampler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng: Arc::new(Mutex::new(rng)) }
    }

    /// Uniform in `[0, 1)`.
    pub fn uniform(&self) -> f64 {
        self.rng.lock().gen::<f64>()
    }

    pub fn coin(&self, p: f64) -> Result<bool, EvalError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(EvalError::invalid_argument(
                "pcoin",
                format!("probability must be in [0, 1], got {p}"),
            ));
        }
        Ok(self.uniform() < p)
    }

    pub fn between(&self, min: f64, max: f64) -> Result<f64, EvalError> {
        if !(min <= max) {
            return Err(EvalError::invalid_argument(
                "runif",
                format!("min ({min}) exceeds max ({max})"),
            ));
        }
        Ok(min + (max - min) * self.uniform())
    }

    /// Box-Muller transform.
    pub fn normal(&self, mean: f64, sd: f64) -> Result<f64, EvalError> {
        if !(sd >= 0.0) {
            return Err(EvalError::invalid_argument(
                "rnorm",
                format!("standard deviation must be non-negative, got {sd}"),
            ));
        }
        let (u1, u2) = {
            let mut rng = self.rng.lock();
            // 1 - [0, 1) keeps u1 away from zero.
            (1.0 - rng.gen::<f64>(), rng.gen::<f64>())
        };
        let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
        Ok(mean + sd * z)
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler").finish_non_exhaustive()
    }
}

pub fn install(b: &mut RegistryBuilder, sampler: Sampler) -> Result<(), RegistrationError> {
    let s = sampler.clone();
    b.function0("rand", move || s.uniform())?;
    let s = sampler.clone();
    b.function1("pcoin", move |p: f64| s.coin(p))?;
    let s = sampler.clone();
    b.function2("runif", move |min: f64, max: f64| s.between(min, max))?;
    b.function2("rnorm", move |mean: f64, sd: f64| sampler.normal(mean, sd))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::types::Type;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn registry(seed: u64) -> Registry {
        let mut builder = Registry::builder();
        install(&mut builder, Sampler::new(Some(seed))).unwrap();
        builder.build()
    }

    fn draws(registry: &Registry) -> Vec<Option<Value>> {
        let rand = registry.resolve_call("rand", &[]).unwrap();
        let rnorm = registry.resolve_call("rnorm", &[Type::Double, Type::Double]).unwrap();
        (0..5)
            .flat_map(|_| {
                [
                    rand.invoke(vec![]).unwrap(),
                    rnorm.invoke(vec![Value::Double(0.0), Value::Double(1.0)]).unwrap(),
                ]
            })
            .collect()
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        assert_eq!(draws(&registry(7)), draws(&registry(7)));
        assert_ne!(draws(&registry(7)), draws(&registry(8)));
    }

    #[test]
    fn test_uniform_range() {
        let sampler = Sampler::new(Some(1));
        for _ in 0..1000 {
            let x = sampler.between(2.0, 3.0).unwrap();
            assert!((2.0..3.0).contains(&x), "{x}");
        }
    }

    #[test]
    fn test_pcoin_extremes() {
        let sampler = Sampler::new(Some(3));
        assert_eq!(sampler.coin(0.0), Ok(false));
        assert_eq!(sampler.coin(1.0), Ok(true));
        assert!(matches!(sampler.coin(1.5), Err(EvalError::InvalidArgument { .. })));
    }

    #[test]
    fn test_rnorm_rejects_negative_sd() {
        let registry = registry(0);
        let rnorm = registry.resolve_call("rnorm", &[Type::Double, Type::Double]).unwrap();
        let err = rnorm.invoke(vec![Value::Double(0.0), Value::Double(-1.0)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "rnorm: standard deviation must be non-negative, got -1"
        );
    }
}
