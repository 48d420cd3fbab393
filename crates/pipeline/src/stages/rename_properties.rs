//! Applies property-level `$renameTo`. Only the Rust-side name changes; the
//! JSON name stays so the wire mapping is unaffected.

use anyhow::{bail, Context, Result};
use armgen_astmodel::prelude::*;
use armgen_config::ConfigResultExt;
use tracing::{debug, info};

use crate::{Stage, StageContext};

pub const ID: &str = "renameProperties";

pub fn stage() -> Stage {
    Stage::new(ID, "Rename properties as configured", rename_properties).requires(super::rename_types::ID)
}

pub fn rename_properties(defs: &TypeDefinitionSet, ctx: &StageContext<'_>) -> Result<TypeDefinitionSet> {
    let mut out = TypeDefinitionSet::new();
    let mut renamed = 0usize;
    for def in defs {
        let Some(object) = def.ty().as_object().filter(|_| !def.ty().has_flag(TypeFlag::Arm)) else {
            out.add(def.clone())?;
            continue;
        };
        let mut props = Vec::with_capacity(object.len());
        let mut changed = false;
        for prop in object.properties() {
            let new_name = ctx
                .configuration
                .property_rename_to(def.name(), prop.name())
                .optional()
                .with_context(|| format!("looking up $renameTo for {}.{}", def.name(), prop.name()))?;
            match new_name {
                Some(new_name) => {
                    debug!(name = %def.name(), from = %prop.name(), to = %new_name, "renaming property");
                    props.push(prop.clone().with_name(new_name));
                    changed = true;
                }
                None => props.push(prop.clone()),
            }
        }
        if !changed {
            out.add(def.clone())?;
            continue;
        }
        for (i, p) in props.iter().enumerate() {
            if props[..i].iter().any(|q| q.name() == p.name()) {
                bail!("renaming properties of {} produces duplicate property {}", def.name(), p.name());
            }
        }
        renamed += 1;
        out.add(def.apply_object_transformation(|o| Ok::<_, anyhow::Error>(o.clone().without_properties().with_properties(props)))?)?;
    }
    info!(types = renamed, "renamed properties");
    Ok(out)
}
