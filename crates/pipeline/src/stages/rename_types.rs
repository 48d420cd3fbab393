//! Applies type-level `$renameTo`, carrying wire twins along and rewriting
//! every reference in the set.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use armgen_astmodel::prelude::*;
use armgen_config::ConfigResultExt;
use tracing::{debug, info};

use super::is_arm;
use crate::{Stage, StageContext};

pub const ID: &str = "renameTypes";

pub fn stage() -> Stage { Stage::new(ID, "Rename types as configured", rename_types).requires(super::filter_types::ID) }

pub fn rename_types(defs: &TypeDefinitionSet, ctx: &StageContext<'_>) -> Result<TypeDefinitionSet> {
    let mut renames = BTreeMap::new();
    for def in defs.iter().filter(|d| !is_arm(defs, d.name())) {
        let name = def.name();
        let Some(new_name) = ctx
            .configuration
            .rename_to(name)
            .optional()
            .with_context(|| format!("looking up $renameTo for {name}"))?
        else {
            continue;
        };
        let renamed = name.with_name(new_name);
        debug!(%name, to = %renamed, "renaming type");
        let twin = ctx.id_factory.create_arm_type_name(name);
        if defs.contains(&twin) {
            renames.insert(twin, ctx.id_factory.create_arm_type_name(&renamed));
        }
        renames.insert(name.clone(), renamed);
    }
    if renames.is_empty() {
        return Ok(defs.clone());
    }
    let out = defs
        .map_names(&|n| renames.get(n).cloned().unwrap_or_else(|| n.clone()))
        .context("applying type renames")?;
    info!(renamed = renames.len(), "renamed types");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::*;

    #[test]
    fn rename_carries_twin_and_references() {
        let yaml = "objectModelConfiguration:\n  apimanagement:\n    v1api20220801:\n      KeyVault:\n        $renameTo: KeyVaultContract\n";
        with_config(yaml, |ctx| {
            let out = rename_types(&named_value_set(), ctx).unwrap();
            assert!(!out.contains(&name("KeyVault")));
            assert!(out.contains(&name("KeyVaultContract")));
            assert!(out.get(&name("KeyVaultContract_ARM")).unwrap().ty().has_flag(TypeFlag::Arm));
            let spec = object(&out, &name("Service_NamedValue_Spec"));
            assert_eq!(spec.property("KeyVault").unwrap().ty(), &Type::optional(Type::name(name("KeyVaultContract"))));
            ctx.configuration.verify_consumed().unwrap();
        });
    }

    #[test]
    fn rename_onto_an_existing_type_fails() {
        let yaml = "objectModelConfiguration:\n  apimanagement:\n    v1api20220801:\n      KeyVault:\n        $renameTo: Service_NamedValue_STATUS\n";
        with_config(yaml, |ctx| {
            let err = rename_types(&named_value_set(), ctx).unwrap_err();
            assert!(format!("{err:#}").contains("Service_NamedValue_STATUS"), "{err:#}");
        });
    }
}
