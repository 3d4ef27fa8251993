//! The implicit conversion table.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{EvalError, RegistrationError};
use crate::types::Type;
use crate::value::Value;

/// Priority given to conversions registered without one.
pub const DEFAULT_PRIORITY: u32 = 1;

/// A value transform applied to one argument before a body runs.
pub type ConvertFn = Arc<dyn Fn(Value) -> Result<Value, EvalError> + Send + Sync>;

/// A registered implicit conversion. Lower priority is preferred; exact
/// matches are priority 0, so conversions start at 1.
#[derive(Clone)]
pub struct Conversion {
    pub priority: u32,
    pub transform: ConvertFn,
}

impl std::fmt::Debug for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversion").field("priority", &self.priority).finish()
    }
}

/// Conversions keyed by `(from, to)`, at most one per pair.
#[derive(Debug, Clone, Default)]
pub struct ConversionTable {
    entries: FxHashMap<(Type, Type), Conversion>,
}

impl ConversionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        from: Type,
        to: Type,
        priority: u32,
        transform: ConvertFn,
    ) -> Result<(), RegistrationError> {
        if priority == 0 {
            return Err(RegistrationError::InvalidPriority { from, to });
        }
        let key = (from, to);
        if self.entries.contains_key(&key) {
            let (from, to) = key;
            return Err(RegistrationError::DuplicateConversion { from, to });
        }
        self.entries.insert(key, Conversion { priority, transform });
        Ok(())
    }

    pub fn get(&self, from: &Type, to: &Type) -> Option<&Conversion> {
        self.entries.get(&(from.clone(), to.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries as `(from, to, priority)`, sorted for stable listings.
    pub fn entries(&self) -> Vec<(&Type, &Type, u32)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|((from, to), c)| (from, to, c.priority))
            .collect();
        entries.sort_by_key(|(from, to, priority)| (*priority, from.to_string(), to.to_string()));
        entries
    }
}
