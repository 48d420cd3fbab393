use anyhow::Result;
use armgen_armconversion::apply_arm_conversion_interface;
use armgen_astmodel::prelude::TypeDefinitionSet;

use crate::{Stage, StageContext};

pub const ID: &str = "applyArmConversionInterface";

pub fn stage() -> Stage {
    Stage::new(ID, "Add ARM conversion capabilities to Kubernetes types", apply_arm_conversion)
        .requires(super::add_operator_specs::ID)
}

pub fn apply_arm_conversion(defs: &TypeDefinitionSet, ctx: &StageContext<'_>) -> Result<TypeDefinitionSet> {
    apply_arm_conversion_interface(defs, ctx.id_factory, ctx.configuration)
}
