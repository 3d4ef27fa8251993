//! Numeric casts and arithmetic.
//!
//! Math functions are registered on `Double` only; integer arguments reach
//! them through the implicit conversions. `abs`, `signum`, `min` and `max`
//! have an exact overload per numeric type so they keep their input type.

use crate::error::RegistrationError;
use crate::registry::RegistryBuilder;

/// Register a cast both as a function (`toInt(x)`) and as a field
/// (`x.toInt`), from every numeric type and, partially, from strings.
macro_rules! cast {
    ($b:expr, $name:literal, $target:ty) => {
        $b.function1($name, |x: i32| x as $target)?
            .function1($name, |x: i64| x as $target)?
            .function1($name, |x: f32| x as $target)?
            .function1($name, |x: f64| x as $target)?
            .function1_opt($name, |s: String| s.trim().parse::<$target>().ok())?
            .field($name, |x: i32| x as $target)?
            .field($name, |x: i64| x as $target)?
            .field($name, |x: f32| x as $target)?
            .field($name, |x: f64| x as $target)?
            .field_opt($name, |s: String| s.trim().parse::<$target>().ok())?
    };
}

fn signum_f64(x: f64) -> i32 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

pub fn install(b: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    // === Casts ===

    cast!(b, "toInt", i32);
    cast!(b, "toLong", i64);
    cast!(b, "toFloat", f32);
    cast!(b, "toDouble", f64);

    // === Sign and magnitude ===

    b.function1("abs", |x: i32| x.wrapping_abs())?
        .function1("abs", |x: i64| x.wrapping_abs())?
        .function1("abs", |x: f32| x.abs())?
        .function1("abs", |x: f64| x.abs())?;

    b.function1("signum", |x: i32| x.signum())?
        .function1("signum", |x: i64| x.signum() as i32)?
        .function1("signum", |x: f32| signum_f64(f64::from(x)))?
        .function1("signum", signum_f64)?;

    b.function2("min", |x: i32, y: i32| x.min(y))?
        .function2("min", |x: i64, y: i64| x.min(y))?
        .function2("min", |x: f32, y: f32| x.min(y))?
        .function2("min", |x: f64, y: f64| x.min(y))?;

    b.function2("max", |x: i32, y: i32| x.max(y))?
        .function2("max", |x: i64, y: i64| x.max(y))?
        .function2("max", |x: f32, y: f32| x.max(y))?
        .function2("max", |x: f64, y: f64| x.max(y))?;

    // === Transcendental ===

    b.function2("pow", |x: f64, y: f64| x.powf(y))?
        .function1("sqrt", |x: f64| x.sqrt())?
        .function1("exp", |x: f64| x.exp())?
        .function1("log", |x: f64| x.ln())?
        .function2("log", |x: f64, base: f64| x.log(base))?
        .function1("log10", |x: f64| x.log10())?
        .function1("floor", |x: f64| x.floor())?
        .function1("ceil", |x: f64| x.ceil())?
        .function0("pi", || std::f64::consts::PI)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Registry, Signature};
    use crate::types::Type;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn registry() -> Registry {
        let mut builder = Registry::builder();
        crate::catalog::conversions::install(&mut builder).unwrap();
        install(&mut builder).unwrap();
        builder.build()
    }

    #[test]
    fn test_cast_field_and_function() {
        let registry = registry();
        let field = registry.resolve_field(&Type::Double, "toInt").unwrap();
        assert_eq!(field.invoke(vec![Value::Double(3.9)]), Ok(Some(Value::Int(3))));

        let parse = registry.resolve_call("toLong", &[Type::String]).unwrap();
        assert!(parse.is_partial());
        assert_eq!(parse.invoke(vec![Value::string(" 12 ")]), Ok(Some(Value::Long(12))));
        assert_eq!(parse.invoke(vec![Value::string("twelve")]), Ok(None));
    }

    #[test]
    fn test_min_prefers_cheapest_widening() {
        let registry = registry();
        let resolved = registry
            .lookup("min", &Signature::function([Type::Int, Type::Long]))
            .unwrap();
        assert_eq!(resolved.signature, Signature::function([Type::Long, Type::Long]));
        assert_eq!(resolved.priority, 1);
        assert_eq!(
            resolved.callable.invoke(vec![Value::Int(-4), Value::Long(3)]),
            Ok(Some(Value::Long(-4)))
        );
    }

    #[test]
    fn test_sqrt_of_int() {
        let registry = registry();
        let resolved = registry.lookup("sqrt", &Signature::function([Type::Int])).unwrap();
        assert_eq!(resolved.priority, 2);
        assert_eq!(resolved.callable.invoke(vec![Value::Int(9)]), Ok(Some(Value::Double(3.0))));
    }

    #[test]
    fn test_log_overloads_by_arity() {
        let registry = registry();
        let log = registry.resolve_call("log", &[Type::Double, Type::Double]).unwrap();
        let Ok(Some(Value::Double(x))) = log.invoke(vec![Value::Double(8.0), Value::Double(2.0)])
        else {
            panic!("log(8, 2) did not produce a Double");
        };
        assert!((x - 3.0).abs() < 1e-12);
        assert_eq!(registry.resolve_call_return_type("pi", &[]), Ok(Type::Double));
    }
}
