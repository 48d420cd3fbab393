//! Armgen ARM conversion: the synthesizer that decides which objects convert
//! to and from their wire twins, and a value-level converter interpreting the
//! attached capability over JSON.

#![forbid(unsafe_code)]

pub mod applier;
pub mod converter;
pub mod property_bag;

pub use applier::ArmConversionApplier;
pub use converter::ArmConverter;
pub use property_bag::PropertyBag;

use anyhow::Result;
use armgen_astmodel::prelude::{IdentifierFactory, TypeDefinitionSet};
use armgen_config::ObjectModelConfiguration;

/// Runs the synthesizer over `definitions`, returning a new set.
pub fn apply_arm_conversion_interface(
    definitions: &TypeDefinitionSet,
    id_factory: &IdentifierFactory,
    config: &ObjectModelConfiguration,
) -> Result<TypeDefinitionSet> {
    ArmConversionApplier::new(definitions, id_factory, config).transform_types()
}
