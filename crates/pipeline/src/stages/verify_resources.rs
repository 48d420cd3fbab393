//! Structural checks over the final set. Every violation is reported at once.

use anyhow::{bail, Result};
use armgen_astmodel::prelude::*;
use tracing::info;

use crate::{Stage, StageContext};

pub const ID: &str = "verifyResources";

pub fn stage() -> Stage {
    Stage::new(ID, "Verify resource invariants", verify_resources).requires(super::apply_arm_conversion::ID)
}

pub fn verify_resources(defs: &TypeDefinitionSet, ctx: &StageContext<'_>) -> Result<TypeDefinitionSet> {
    let mut problems = Vec::new();
    for (def, resource) in defs.resources() {
        check_resource(defs, ctx, def.name(), resource, &mut problems);
    }
    for def in defs.iter() {
        let Some(conv) = def.ty().as_object().and_then(ObjectType::arm_conversion) else { continue };
        if &conv.arm_type == def.name() || def.ty().has_flag(TypeFlag::Arm) {
            problems.push(format!("{} converts onto itself", def.name()));
        } else if !defs.get(&conv.arm_type).is_some_and(|d| d.ty().has_flag(TypeFlag::Arm)) {
            problems.push(format!("{} converts to {}, which is not a wire type in the set", def.name(), conv.arm_type));
        }
    }

    match problems.len() {
        0 => {
            info!(resources = defs.resources().count(), "resources verified");
            Ok(defs.clone())
        }
        1 => bail!("{}", problems.remove(0)),
        n => bail!("{n} resource problems:\n  - {}", problems.join("\n  - ")),
    }
}

fn check_resource(defs: &TypeDefinitionSet, ctx: &StageContext<'_>, name: &TypeName, resource: &ResourceType, problems: &mut Vec<String>) {
    if resource.scope() == ResourceScope::ResourceGroup && resource.owner().is_none() {
        problems.push(format!("resource {name}: resource group scoped resources need an owner"));
    }

    let spec = match defs.resolve_resource_spec(resource) {
        Ok(spec) => spec,
        Err(err) => {
            problems.push(format!("resource {name}: spec: {err}"));
            return;
        }
    };
    let Some(spec_object) = spec.ty().as_object() else {
        problems.push(format!("resource {name}: spec {} is not an object", spec.name()));
        return;
    };
    let status = match defs.resolve_resource_status(resource) {
        Ok(status) => status,
        Err(err) => {
            problems.push(format!("resource {name}: status: {err}"));
            None
        }
    };
    if let Some(status) = status.filter(|s| s.ty().as_object().is_none()) {
        problems.push(format!("resource {name}: status {} is not an object", status.name()));
    }

    // Owner and twin checks only apply once the spec has been given a wire mapping.
    if !spec_object.has_capability(CapabilityKind::ArmConversion) {
        return;
    }
    match (spec_object.property(PropertyName::OWNER), resource.scope()) {
        (Some(owner), ResourceScope::Extension) if owner.has_tag(OWNER_GROUP_TAG) || owner.has_tag(OWNER_KIND_TAG) => {
            problems.push(format!("resource {name}: extension owner must not be constrained to a kind"));
        }
        (Some(owner), _) if !owner.is_required() => problems.push(format!("resource {name}: owner must be required")),
        (None, ResourceScope::Extension) => problems.push(format!("resource {name}: extension resource has no owner")),
        (None, ResourceScope::ResourceGroup) if resource.owner().is_some() => {
            problems.push(format!("resource {name}: owner was not injected"))
        }
        _ => {}
    }

    let roots = std::iter::once(spec.name().clone()).chain(status.map(|s| s.name().clone()));
    for reached in defs.connected_to_where(roots, &|p| !p.is_kubernetes_only()) {
        let Some(def) = defs.get(&reached) else { continue };
        if def.ty().as_object().is_none() || def.ty().has_flag(TypeFlag::Arm) {
            continue;
        }
        let twin = ctx.id_factory.create_arm_type_name(&reached);
        if !defs.get(&twin).is_some_and(|d| d.ty().has_flag(TypeFlag::Arm)) {
            problems.push(format!("resource {name}: {reached} has no wire twin {twin}"));
        }
    }
}
