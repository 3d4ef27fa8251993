//! Array and set queries, and numeric aggregates.
//!
//! Collections are registered per concrete element type. Aggregates ignore
//! missing elements; those undefined on an empty input (`min`, `max`,
//! `mean`, `median`) are missing there.

use std::cmp::Ordering;

use crate::error::RegistrationError;
use crate::registry::RegistryBuilder;
use crate::value::{FromValue, HostSet, IntoValue};

/// Element types that aggregate.
trait Numeric: FromValue + IntoValue + Copy + PartialOrd {
    const ZERO: Self;

    /// Addition; integer sums wrap.
    fn plus(self, other: Self) -> Self;

    fn to_f64(self) -> f64;
}

impl Numeric for i32 {
    const ZERO: Self = 0;

    fn plus(self, other: Self) -> Self {
        self.wrapping_add(other)
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Numeric for i64 {
    const ZERO: Self = 0;

    fn plus(self, other: Self) -> Self {
        self.wrapping_add(other)
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Numeric for f32 {
    const ZERO: Self = 0.0;

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Numeric for f64 {
    const ZERO: Self = 0.0;

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn to_f64(self) -> f64 {
        self
    }
}

fn install_queries<T>(b: &mut RegistryBuilder) -> Result<(), RegistrationError>
where
    T: FromValue + IntoValue + PartialEq,
{
    b.field("length", |xs: Vec<Option<T>>| xs.len() as i32)?
        .field("isEmpty", |xs: Vec<Option<T>>| xs.is_empty())?
        .method1("contains", |xs: Vec<Option<T>>, x: T| xs.contains(&Some(x)))?
        .field("toSet", HostSet::<T>::from_items)?
        .field("size", |set: HostSet<T>| set.0.len() as i32)?
        .method1("contains", |set: HostSet<T>, x: T| set.0.contains(&Some(x)))?;
    Ok(())
}

fn median<T: Numeric>(mut xs: Vec<T>) -> Option<T> {
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    // Lower median for even lengths, so the result stays an element.
    Some(xs[(xs.len() - 1) / 2])
}

fn install_aggregates<T: Numeric>(b: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    b.aggregate("sum", |xs: Vec<T>| xs.into_iter().fold(T::ZERO, T::plus))?
        .aggregate_opt("min", |xs: Vec<T>| {
            xs.into_iter().reduce(|a, x| if x < a { x } else { a })
        })?
        .aggregate_opt("max", |xs: Vec<T>| {
            xs.into_iter().reduce(|a, x| if x > a { x } else { a })
        })?
        .aggregate_opt("mean", |xs: Vec<T>| {
            (!xs.is_empty())
                .then(|| xs.iter().map(|x| x.to_f64()).sum::<f64>() / xs.len() as f64)
        })?
        .aggregate_opt("median", median::<T>)?;
    Ok(())
}

pub fn install(b: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    install_queries::<bool>(b)?;
    install_queries::<i32>(b)?;
    install_queries::<i64>(b)?;
    install_queries::<f32>(b)?;
    install_queries::<f64>(b)?;
    install_queries::<String>(b)?;

    install_aggregates::<i32>(b)?;
    install_aggregates::<i64>(b)?;
    install_aggregates::<f32>(b)?;
    install_aggregates::<f64>(b)?;
    Ok(())
}
