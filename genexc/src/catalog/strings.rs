//! String fields and methods.

use crate::error::RegistrationError;
use crate::registry::RegistryBuilder;

pub fn install(b: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    b.field("length", |s: String| s.chars().count() as i32)?
        .field("toUpperCase", |s: String| s.to_uppercase())?
        .field("toLowerCase", |s: String| s.to_lowercase())?;

    b.method1("contains", |s: String, needle: String| s.contains(&needle))?
        .method1("startsWith", |s: String, prefix: String| s.starts_with(&prefix))?
        .method1("endsWith", |s: String, suffix: String| s.ends_with(&suffix))?
        .method1("split", |s: String, sep: String| {
            s.split(sep.as_str())
                .map(|part| Some(part.to_string()))
                .collect::<Vec<_>>()
        })?
        .method2("replace", |s: String, from: String, to: String| s.replace(&from, &to))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::types::Type;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_and_replace() {
        let mut builder = Registry::builder();
        install(&mut builder).unwrap();
        let registry = builder.build();

        assert_eq!(
            registry.resolve_method_return_type(&Type::String, "split", &[Type::String]),
            Ok(Type::array(Type::String))
        );
        let split = registry.resolve_method(&Type::String, "split", &[Type::String]).unwrap();
        assert_eq!(
            split.invoke(vec![Value::string("a,b"), Value::string(",")]),
            Ok(Some(Value::array([Some(Value::string("a")), Some(Value::string("b"))])))
        );

        let replace = registry
            .resolve_method(&Type::String, "replace", &[Type::String, Type::String])
            .unwrap();
        assert_eq!(
            replace.invoke(vec![Value::string("chr1"), Value::string("chr"), Value::string("")]),
            Ok(Some(Value::string("1")))
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let mut builder = Registry::builder();
        install(&mut builder).unwrap();
        let registry = builder.build();
        let length = registry.resolve_field(&Type::String, "length").unwrap();
        assert_eq!(length.invoke(vec![Value::string("é1")]), Ok(Some(Value::Int(2))));
    }
}
