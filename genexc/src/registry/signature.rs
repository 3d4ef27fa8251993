//! Call-site and binding signatures.

use std::fmt;

use crate::types::Type;

/// The shape of a call: which namespace it lives in and its argument types.
///
/// Equality is structural and kind-sensitive: a field signature never equals
/// a function signature over the same types, so `x.length` and `length(x)`
/// are resolved independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signature {
    /// `receiver.name`: one argument, the receiver.
    Field(Type),
    /// `receiver.name(args...)`: the receiver followed by the arguments.
    Method(Vec<Type>),
    /// `name(args...)`.
    Function(Vec<Type>),
}

/// Which namespace a signature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    Field,
    Method,
    Function,
}

impl fmt::Display for SignatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureKind::Field => write!(f, "field"),
            SignatureKind::Method => write!(f, "method"),
            SignatureKind::Function => write!(f, "function"),
        }
    }
}

impl Signature {
    pub fn field(receiver: Type) -> Self {
        Signature::Field(receiver)
    }

    pub fn method(receiver: Type, args: impl IntoIterator<Item = Type>) -> Self {
        Signature::Method(std::iter::once(receiver).chain(args).collect())
    }

    pub fn function(args: impl IntoIterator<Item = Type>) -> Self {
        Signature::Function(args.into_iter().collect())
    }

    pub fn kind(&self) -> SignatureKind {
        match self {
            Signature::Field(_) => SignatureKind::Field,
            Signature::Method(_) => SignatureKind::Method,
            Signature::Function(_) => SignatureKind::Function,
        }
    }

    /// All argument types in call order, receiver first.
    pub fn types(&self) -> &[Type] {
        match self {
            Signature::Field(receiver) => std::slice::from_ref(receiver),
            Signature::Method(types) | Signature::Function(types) => types,
        }
    }

    pub fn arity(&self) -> usize {
        self.types().len()
    }

    /// Render the signature as a call of `name`, e.g. `Interval.contains(Locus)`.
    pub fn display_call(&self, name: &str) -> String {
        let join = |types: &[Type]| {
            types.iter().map(Type::to_string).collect::<Vec<_>>().join(", ")
        };
        match self {
            Signature::Field(receiver) => format!("{receiver}.{name}"),
            Signature::Method(types) => {
                let (receiver, args) = types.split_first().map_or(
                    (String::new(), &[][..]),
                    |(r, rest)| (r.to_string(), rest),
                );
                format!("{receiver}.{name}({})", join(args))
            }
            Signature::Function(args) => format!("{name}({})", join(args)),
        }
    }
}
