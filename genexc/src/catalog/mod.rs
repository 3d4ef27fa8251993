//! The built-in catalog.
//!
//! Everything the standard registry knows is registered here, through the
//! same builder API available to embedders. Registration order is listing
//! order, so each submodule installs its bindings grouped by receiver.
//!
//! # Module Structure
//!
//! - [`conversions`] - Numeric widenings and their array liftings
//! - [`numeric`] - Casts and arithmetic
//! - [`strings`] - String fields and methods
//! - [`collections`] - Array and set queries, numeric aggregates
//! - [`genomics`] - Genotype, variant, allele, locus and interval accessors
//! - [`stats`] - Hardy-Weinberg and Fisher's exact tests
//! - [`random`] - Seedable random sampling

pub mod collections;
pub mod conversions;
pub mod genomics;
pub mod numeric;
pub mod random;
pub mod stats;
pub mod strings;

use crate::config::CatalogConfig;
use crate::error::RegistrationError;
use crate::registry::RegistryBuilder;

/// Install the whole catalog into `builder`.
pub fn install(builder: &mut RegistryBuilder, config: &CatalogConfig) -> Result<(), RegistrationError> {
    conversions::install(builder)?;
    numeric::install(builder)?;
    strings::install(builder)?;
    collections::install(builder)?;
    genomics::install(builder)?;
    stats::install(builder)?;
    random::install(builder, random::Sampler::new(config.seed))?;
    Ok(())
}
