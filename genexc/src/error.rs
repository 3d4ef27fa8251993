//! Error types for registration, composition and evaluation.
//!
//! Lookup failures live with the dispatcher in
//! [`crate::registry::dispatch::result`]; configuration file errors live in
//! [`crate::config`].

use std::fmt;

use thiserror::Error;

use crate::registry::dispatch::LookupError;
use crate::registry::Signature;
use crate::types::Type;

/// A violation detected while populating a registry.
///
/// These are configuration bugs, not user errors: the built-in catalog
/// treats any of them as fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    #[error("binding name must not be empty")]
    EmptyName,

    #[error("`{}` is already bound", .signature.display_call(.name))]
    DuplicateBinding { name: String, signature: Signature },

    #[error("a conversion from {from} to {to} is already registered")]
    DuplicateConversion { from: Type, to: Type },

    #[error("conversion from {from} to {to} has priority 0; conversion priorities start at 1")]
    InvalidPriority { from: Type, to: Type },

    #[error(
        "`{}` takes {} argument(s) but its callable has arity {arity}",
        .signature.display_call(.name),
        .signature.arity()
    )]
    ArityMismatch {
        name: String,
        signature: Signature,
        arity: usize,
    },
}

/// A failure raised by a callable body when it is invoked.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("{function}: {message}")]
    InvalidArgument { function: String, message: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: Type, found: &'static str },

    #[error("expected {expected} argument(s), got {found}")]
    ArityMismatch { expected: usize, found: usize },
}

impl EvalError {
    pub fn invalid_argument(function: &str, message: impl fmt::Display) -> Self {
        EvalError::InvalidArgument {
            function: function.to_string(),
            message: message.to_string(),
        }
    }
}

/// A failure while turning an expression into a thunk.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("unbound identifier `{0}`")]
    UnboundIdentifier(String),

    #[error("cannot compose a callable of arity {expected} with {found} argument(s)")]
    ArityMismatch { expected: usize, found: usize },

    #[error("literal of kind {found} is declared as {expected}")]
    LiteralTypeMismatch { expected: Type, found: &'static str },
}
