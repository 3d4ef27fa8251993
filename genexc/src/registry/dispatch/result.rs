//! Dispatch results and lookup errors.

use thiserror::Error;

use crate::registry::{Callable, Signature};

/// A successful lookup: the chosen binding and a callable that accepts the
/// requested argument types.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The signature of the binding that won, which may differ from the
    /// requested one when conversions were applied.
    pub signature: Signature,
    /// Overall priority: 0 for an exact match, otherwise the largest
    /// conversion priority over the arguments.
    pub priority: u32,
    /// The binding's callable with argument conversions folded in.
    pub callable: Callable,
}

/// A recoverable resolution failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// No binding of this name accepts the requested argument types, even
    /// with conversions.
    #[error("no {} `{}`", .requested.kind(), .requested.display_call(.name))]
    NotFound { name: String, requested: Signature },

    /// Several bindings tie for the lowest priority.
    #[error(
        "ambiguous call `{}`: {} candidates at priority {priority}: {}",
        .requested.display_call(.name),
        .alternatives.len(),
        list_alternatives(.name, .alternatives)
    )]
    Ambiguous {
        name: String,
        requested: Signature,
        priority: u32,
        /// Tied candidate signatures in registration order.
        alternatives: Vec<Signature>,
    },
}

fn list_alternatives(name: &str, alternatives: &[Signature]) -> String {
    alternatives
        .iter()
        .map(|sig| format!("`{}`", sig.display_call(name)))
        .collect::<Vec<_>>()
        .join(", ")
}

impl LookupError {
    pub fn name(&self) -> &str {
        match self {
            LookupError::NotFound { name, .. } | LookupError::Ambiguous { name, .. } => name,
        }
    }

    pub fn requested(&self) -> &Signature {
        match self {
            LookupError::NotFound { requested, .. }
            | LookupError::Ambiguous { requested, .. } => requested,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, LookupError::Ambiguous { .. })
    }
}
