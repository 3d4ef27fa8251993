//! Implicit numeric conversions.
//!
//! Widening to `Long` is preferred over widening to `Double`, so
//! `Int → Double` costs 2 while each single step costs 1. Array conversions
//! mirror their element conversions and keep missing elements missing.

use crate::error::RegistrationError;
use crate::registry::RegistryBuilder;

fn widen_all<A, B>(items: Vec<Option<A>>, f: impl Fn(A) -> B) -> Vec<Option<B>> {
    items.into_iter().map(|item| item.map(&f)).collect()
}

pub fn install(b: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    b.conversion(1, |x: i32| i64::from(x))?
        .conversion(2, |x: i32| f64::from(x))?
        .conversion(1, |x: i64| x as f64)?
        .conversion(1, |x: f32| f64::from(x))?;

    b.conversion(1, |xs: Vec<Option<i32>>| widen_all(xs, i64::from))?
        .conversion(2, |xs: Vec<Option<i32>>| widen_all(xs, f64::from))?
        .conversion(1, |xs: Vec<Option<i64>>| widen_all(xs, |x| x as f64))?
        .conversion(1, |xs: Vec<Option<f32>>| widen_all(xs, f64::from))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::types::Type;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_priorities() {
        let mut builder = Registry::builder();
        install(&mut builder).unwrap();
        let registry = builder.build();
        let table = registry.conversions();
        let priority = |from: Type, to: Type| table.get(&from, &to).map(|c| c.priority);

        assert_eq!(priority(Type::Int, Type::Long), Some(1));
        assert_eq!(priority(Type::Int, Type::Double), Some(2));
        assert_eq!(priority(Type::Long, Type::Double), Some(1));
        assert_eq!(priority(Type::Double, Type::Int), None);
        assert_eq!(
            priority(Type::array(Type::Int), Type::array(Type::Double)),
            Some(2)
        );
        assert_eq!(table.len(), 8);
    }
}
