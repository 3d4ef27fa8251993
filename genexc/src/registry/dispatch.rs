//! Overload resolution with implicit conversions.
//!
//! Given the bindings registered under one name and a requested signature,
//! the dispatcher picks the binding to call and the conversion to apply to
//! each argument.
//!
//! # Algorithm Overview
//!
//! 1. **Exact match**: a binding whose signature equals the request is
//!    applicable at priority 0 with no conversions.
//! 2. **Conversions**: otherwise a binding of the same kind and arity is
//!    applicable if every argument either matches exactly or has a registered
//!    conversion to the parameter type. One missing conversion rejects the
//!    binding outright.
//! 3. **Weakest link**: an applicable binding's priority is the largest
//!    priority over its arguments.
//! 4. **Select**: group applicable bindings by priority and take the lowest
//!    group. One member resolves; several are ambiguous; none is not found.
//!
//! Priority-0 ties cannot happen: two exact matches would be two bindings
//! with the same signature, which registration rejects.

mod result;

use std::collections::BTreeMap;

use tracing::{debug, trace};

pub use result::{LookupError, Resolution};

use super::conversion::{Conversion, ConversionTable};
use super::{Binding, Signature};

/// A binding that accepts the requested signature.
#[derive(Debug, Clone)]
pub struct Applicable<'r> {
    pub binding: &'r Binding,
    /// Conversion per argument; `None` where the types already agree.
    pub conversions: Vec<Option<&'r Conversion>>,
    pub priority: u32,
}

/// Resolves a requested signature against a list of candidate bindings.
pub struct DispatchResolver<'r> {
    conversions: &'r ConversionTable,
    implicit_conversions: bool,
}

impl<'r> DispatchResolver<'r> {
    pub fn new(conversions: &'r ConversionTable) -> Self {
        Self { conversions, implicit_conversions: true }
    }

    /// Disable conversions: only exact matches are applicable.
    pub fn strict(mut self, strict: bool) -> Self {
        self.implicit_conversions = !strict;
        self
    }

    /// Pick the best binding for `requested` among `candidates`.
    pub fn resolve(
        &self,
        name: &str,
        requested: &Signature,
        candidates: &'r [Binding],
    ) -> Result<Applicable<'r>, LookupError> {
        // Step 1: group applicable bindings by priority, keeping registration order
        let mut groups: BTreeMap<u32, Vec<Applicable<'r>>> = BTreeMap::new();
        for binding in candidates {
            if let Some(applicable) = self.applicable(name, binding, requested) {
                groups.entry(applicable.priority).or_default().push(applicable);
            }
        }

        // Step 2: no applicable binding at all
        let Some((priority, mut best)) = groups.pop_first() else {
            debug!(function = name, requested = %requested.display_call(name), "no applicable binding");
            return Err(LookupError::NotFound {
                name: name.to_string(),
                requested: requested.clone(),
            });
        };

        // Step 3: unique winner
        if best.len() == 1 {
            if let Some(winner) = best.pop() {
                debug!(
                    function = name,
                    requested = %requested.display_call(name),
                    chosen = %winner.binding.signature.display_call(name),
                    priority,
                    "resolved"
                );
                return Ok(winner);
            }
        }

        // Step 4: ambiguity among the lowest group
        assert!(
            priority > 0,
            "BUG: {} exact matches for `{}`; duplicate bindings must be rejected at registration",
            best.len(),
            requested.display_call(name)
        );
        debug!(function = name, requested = %requested.display_call(name), priority, "ambiguous");
        Err(LookupError::Ambiguous {
            name: name.to_string(),
            requested: requested.clone(),
            priority,
            alternatives: best.into_iter().map(|a| a.binding.signature.clone()).collect(),
        })
    }

    /// Check whether `binding` accepts `requested`, and at what priority.
    pub fn applicable(
        &self,
        name: &str,
        binding: &'r Binding,
        requested: &Signature,
    ) -> Option<Applicable<'r>> {
        let declared = &binding.signature;
        if declared == requested {
            return Some(Applicable {
                binding,
                conversions: vec![None; declared.arity()],
                priority: 0,
            });
        }
        if !self.implicit_conversions
            || declared.kind() != requested.kind()
            || declared.arity() != requested.arity()
        {
            trace!(function = name, candidate = %declared.display_call(name), "not applicable");
            return None;
        }

        let mut conversions = Vec::with_capacity(declared.arity());
        let mut priority = 0;
        for (actual, param) in requested.types().iter().zip(declared.types()) {
            if actual == param {
                conversions.push(None);
                continue;
            }
            let Some(conversion) = self.conversions.get(actual, param) else {
                trace!(
                    function = name,
                    candidate = %declared.display_call(name),
                    from = %actual,
                    to = %param,
                    "no conversion"
                );
                return None;
            };
            priority = priority.max(conversion.priority);
            conversions.push(Some(conversion));
        }
        Some(Applicable { binding, conversions, priority })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::registry::{Callable, Fun};
    use crate::types::Type;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn binding(args: &[Type]) -> Binding {
        let fun = Fun::Binary(Arc::new(|a: Value, _: Value| Ok(a)));
        Binding {
            signature: Signature::function(args.iter().cloned()),
            callable: Callable::new(Type::Boolean, fun),
        }
    }

    fn table(entries: &[(Type, Type, u32)]) -> ConversionTable {
        let mut table = ConversionTable::new();
        for (from, to, priority) in entries {
            table
                .insert(from.clone(), to.clone(), *priority, Arc::new(|v: Value| Ok(v)))
                .unwrap();
        }
        table
    }

    #[test]
    fn test_exact_match_is_priority_zero() {
        let table = table(&[(Type::Int, Type::Long, 1)]);
        let candidates = [binding(&[Type::Long, Type::Long]), binding(&[Type::Int, Type::Int])];
        let requested = Signature::function([Type::Int, Type::Int]);
        let winner = DispatchResolver::new(&table).resolve("f", &requested, &candidates).unwrap();
        assert_eq!(winner.priority, 0);
        assert_eq!(winner.binding.signature, requested);
        assert!(winner.conversions.iter().all(Option::is_none));
    }

    #[test]
    fn test_weakest_link_priority() {
        let table = table(&[(Type::Int, Type::Long, 1), (Type::Int, Type::Double, 3)]);
        let resolver = DispatchResolver::new(&table);
        let candidate = binding(&[Type::Long, Type::Double]);
        let applicable = resolver
            .applicable("f", &candidate, &Signature::function([Type::Int, Type::Int]))
            .unwrap();
        assert_eq!(applicable.priority, 3);
        assert_eq!(applicable.conversions.iter().flatten().count(), 2);
    }

    #[test]
    fn test_one_missing_conversion_rejects_binding() {
        let table = table(&[(Type::Int, Type::Long, 1)]);
        let resolver = DispatchResolver::new(&table);
        let candidate = binding(&[Type::Long, Type::Locus]);
        let requested = Signature::function([Type::Int, Type::Int]);
        assert!(resolver.applicable("f", &candidate, &requested).is_none());
    }

    #[test]
    fn test_strict_resolver_needs_exact_match() {
        let table = table(&[(Type::Int, Type::Long, 1)]);
        let candidates = [binding(&[Type::Long, Type::Long])];
        let requested = Signature::function([Type::Int, Type::Long]);
        let err = DispatchResolver::new(&table)
            .strict(true)
            .resolve("f", &requested, &candidates)
            .unwrap_err();
        assert!(matches!(err, LookupError::NotFound { .. }));
    }

    #[test]
    fn test_tie_lists_alternatives_in_registration_order() {
        let table = table(&[(Type::Int, Type::Long, 1), (Type::Int, Type::Double, 1)]);
        let candidates = [
            binding(&[Type::Double, Type::Int]),
            binding(&[Type::Long, Type::Int]),
        ];
        let requested = Signature::function([Type::Int, Type::Int]);
        let err = DispatchResolver::new(&table).resolve("f", &requested, &candidates).unwrap_err();
        assert_eq!(
            err,
            LookupError::Ambiguous {
                name: "f".into(),
                requested,
                priority: 1,
                alternatives: vec![
                    Signature::function([Type::Double, Type::Int]),
                    Signature::function([Type::Long, Type::Int]),
                ],
            }
        );
    }
}
