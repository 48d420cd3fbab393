//! Default stage catalogue, in registration order.

pub mod add_operator_specs;
pub mod annotate_resources;
pub mod apply_arm_conversion;
pub mod check_name_in_next_version;
pub mod create_storage_types;
pub mod ensure_configuration_consumed;
pub mod filter_types;
pub mod rename_properties;
pub mod rename_types;
pub mod verify_resources;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::BTreeSet;

use armgen_astmodel::prelude::{IdentifierFactory, TypeDefinitionSet, TypeFlag, TypeName};

use crate::Pipeline;

pub fn default_pipeline() -> Pipeline {
    Pipeline::new()
        .with_stage(filter_types::stage())
        .with_stage(rename_types::stage())
        .with_stage(rename_properties::stage())
        .with_stage(annotate_resources::stage())
        .with_stage(add_operator_specs::stage())
        .with_stage(apply_arm_conversion::stage())
        .with_stage(check_name_in_next_version::stage())
        .with_stage(create_storage_types::stage())
        .with_stage(verify_resources::stage())
        .with_stage(ensure_configuration_consumed::stage())
}

/// True for wire twins, which later stages never rewrite.
pub(crate) fn is_arm(defs: &TypeDefinitionSet, name: &TypeName) -> bool {
    defs.get(name).is_some_and(|d| d.ty().has_flag(TypeFlag::Arm))
}

/// Everything reachable from `roots`, plus the wire twins of those names and what they reach.
pub(crate) fn reachable_with_twins(
    defs: &TypeDefinitionSet,
    ids: &IdentifierFactory,
    roots: impl IntoIterator<Item = TypeName>,
) -> BTreeSet<TypeName> {
    let direct = defs.connected_to(roots);
    let twins: Vec<TypeName> = direct
        .iter()
        .map(|n| ids.create_arm_type_name(n))
        .filter(|n| defs.contains(n))
        .collect();
    defs.connected_to(direct.into_iter().chain(twins))
}
