//! Overload Resolution Tests
//!
//! Exercises the public registry API end to end: bindings are registered
//! through the typed helpers and resolved through `lookup`, so every test
//! also covers the conversion folding done when a callable is returned.

use std::sync::Arc;

use genexc::registry::{Fun, RegistryBuilder};
use genexc::{Callable, LookupError, RegistrationError, Registry, Signature, Type, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// `f` overloads labelled by which one ran, with `Int -> Long` at 1 and
/// `Int -> Double` at 2.
fn weakest_link_builder(exact: bool, long_int: bool, int_double: bool) -> RegistryBuilder {
    let mut builder = Registry::builder();
    builder
        .conversion(1, |i: i32| i64::from(i))
        .unwrap()
        .conversion(2, |i: i32| f64::from(i))
        .unwrap();
    if exact {
        builder.function2("f", |_: i32, _: i32| "exact".to_string()).unwrap();
    }
    if long_int {
        builder.function2("f", |_: i64, _: i32| "long-int".to_string()).unwrap();
    }
    if int_double {
        builder.function2("f", |_: i32, _: f64| "int-double".to_string()).unwrap();
    }
    builder
}

fn call_f(registry: &Registry) -> (u32, Option<Value>) {
    let resolution = registry
        .lookup("f", &Signature::function([Type::Int, Type::Int]))
        .unwrap();
    let value = resolution.callable.invoke(vec![Value::Int(1), Value::Int(2)]).unwrap();
    (resolution.priority, value)
}

#[test]
fn test_weakest_link_selects_lowest_priority() {
    let all = weakest_link_builder(true, true, true).build();
    assert_eq!(call_f(&all), (0, Some(Value::string("exact"))));

    let no_exact = weakest_link_builder(false, true, true).build();
    assert_eq!(call_f(&no_exact), (1, Some(Value::string("long-int"))));

    let only_double = weakest_link_builder(false, false, true).build();
    assert_eq!(call_f(&only_double), (2, Some(Value::string("int-double"))));
}

#[test]
fn test_weakest_link_is_max_not_sum() {
    // Two cheap conversions (1 + 1) still beat one expensive one (2).
    let mut builder = Registry::builder();
    builder
        .conversion(1, |i: i32| i64::from(i))
        .unwrap()
        .conversion(2, |i: i32| f64::from(i))
        .unwrap()
        .function2("g", |_: i64, _: i64| "both-long".to_string())
        .unwrap()
        .function2("g", |_: i32, _: f64| "one-double".to_string())
        .unwrap();
    let registry = builder.build();
    let resolution = registry
        .lookup("g", &Signature::function([Type::Int, Type::Int]))
        .unwrap();
    assert_eq!(resolution.priority, 1);
    assert_eq!(resolution.signature, Signature::function([Type::Long, Type::Long]));
}

#[test]
fn test_conversions_are_all_or_nothing() {
    let mut builder = Registry::builder();
    builder
        .conversion(1, |i: i32| i64::from(i))
        .unwrap()
        .function2("h", |a: i64, b: i64| a + b)
        .unwrap();
    let registry = builder.build();

    let err = registry
        .lookup("h", &Signature::function([Type::Int, Type::String]))
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"no function `h(Int, String)`");

    let ok = registry
        .lookup("h", &Signature::function([Type::Int, Type::Long]))
        .unwrap();
    assert_eq!(
        ok.callable.invoke(vec![Value::Int(2), Value::Long(40)]),
        Ok(Some(Value::Long(42)))
    );
}

#[test]
fn test_ambiguity_lists_exactly_the_tied_alternatives() {
    let mut builder = Registry::builder();
    builder
        .conversion(1, |i: i32| i64::from(i))
        .unwrap()
        .conversion(1, |i: i32| f64::from(i))
        .unwrap()
        .function2("f", |_: i64, _: i32| true)
        .unwrap()
        .function2("f", |_: f64, _: i32| true)
        .unwrap()
        // Needs a conversion that does not exist; never a candidate.
        .function2("f", |_: bool, _: i32| true)
        .unwrap();
    let registry = builder.build();

    let err = registry
        .lookup("f", &Signature::function([Type::Int, Type::Int]))
        .unwrap_err();
    assert!(err.is_ambiguous());
    assert_eq!(err.name(), "f");
    insta::assert_snapshot!(
        err.to_string(),
        @"ambiguous call `f(Int, Int)`: 2 candidates at priority 1: `f(Long, Int)`, `f(Double, Int)`"
    );

    // The exact overload is never ambiguous.
    let exact = registry
        .lookup("f", &Signature::function([Type::Long, Type::Int]))
        .unwrap();
    assert_eq!(exact.priority, 0);
}

#[test]
fn test_kinds_do_not_cross() {
    let mut builder = Registry::builder();
    builder.field("double", |x: i32| x * 2).unwrap();
    let registry = builder.build();

    assert_eq!(
        registry.resolve_call("double", &[Type::Int]).unwrap_err(),
        LookupError::NotFound {
            name: "double".into(),
            requested: Signature::function([Type::Int]),
        }
    );
    let field = registry.resolve_field(&Type::Int, "double").unwrap();
    assert_eq!(field.invoke(vec![Value::Int(21)]), Ok(Some(Value::Int(42))));
}

#[test]
fn test_registration_errors() {
    let mut builder = Registry::builder();
    builder.function1("f", |x: i32| x).unwrap();

    let duplicate = builder.function1("f", |x: i32| x + 1).unwrap_err();
    insta::assert_snapshot!(duplicate.to_string(), @"`f(Int)` is already bound");

    let zero = builder.conversion(0, |i: i32| i64::from(i)).unwrap_err();
    assert_eq!(zero, RegistrationError::InvalidPriority { from: Type::Int, to: Type::Long });

    builder.conversion(1, |i: i32| i64::from(i)).unwrap();
    let twice = builder.conversion(3, |i: i32| i64::from(i)).unwrap_err();
    insta::assert_snapshot!(twice.to_string(), @"a conversion from Int to Long is already registered");

    let unary = Callable::new(Type::Int, Fun::Unary(Arc::new(|v: Value| Ok(v))));
    let arity = builder
        .bind("g", Signature::function([Type::Int, Type::Int]), unary)
        .unwrap_err();
    insta::assert_snapshot!(
        arity.to_string(),
        @"`g(Int, Int)` takes 2 argument(s) but its callable has arity 1"
    );

    assert_eq!(builder.function0("", || 1i32).unwrap_err(), RegistrationError::EmptyName);
}

#[test]
fn test_return_type_without_callable() {
    let registry = weakest_link_builder(false, true, false).build();
    assert_eq!(
        registry.resolve_call_return_type("f", &[Type::Int, Type::Int]),
        Ok(Type::String)
    );
    let applicable = registry
        .rank("f", &Signature::function([Type::Int, Type::Int]))
        .unwrap();
    assert_eq!(applicable.priority, 1);
}

proptest! {
    /// Priority is the weakest link and ties are reported, for any pair of
    /// conversion priorities.
    #[test]
    fn prop_lower_priority_wins(p_long in 1u32..8, p_double in 1u32..8) {
        let mut builder = Registry::builder();
        builder
            .conversion(p_long, |i: i32| i64::from(i))
            .unwrap()
            .conversion(p_double, |i: i32| f64::from(i))
            .unwrap()
            .function2("f", |_: i64, _: i32| 0i32)
            .unwrap()
            .function2("f", |_: i32, _: f64| 1i32)
            .unwrap();
        let registry = builder.build();
        let requested = Signature::function([Type::Int, Type::Int]);

        let first = registry.lookup("f", &requested);
        let second = registry.lookup("f", &requested);
        prop_assert_eq!(first.is_ok(), second.is_ok());

        match first {
            Ok(resolution) => {
                prop_assert_ne!(p_long, p_double);
                prop_assert_eq!(resolution.priority, p_long.min(p_double));
                let expected = if p_long < p_double { 0 } else { 1 };
                prop_assert_eq!(
                    resolution.callable.invoke(vec![Value::Int(0), Value::Int(0)]),
                    Ok(Some(Value::Int(expected)))
                );
            }
            Err(err) => {
                prop_assert_eq!(p_long, p_double);
                let LookupError::Ambiguous { priority, alternatives, .. } = err else {
                    return Err(TestCaseError::fail("expected an ambiguity"));
                };
                prop_assert_eq!(priority, p_long);
                prop_assert_eq!(alternatives.len(), 2);
            }
        }
    }
}
