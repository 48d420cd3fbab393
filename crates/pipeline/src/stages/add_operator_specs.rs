//! Builds operator specs for resources configured with secrets or config
//! maps, and hangs them off the spec as a Kubernetes-only property.

use std::collections::BTreeSet;

use anyhow::{bail, Context, Result};
use armgen_astmodel::prelude::*;
use armgen_config::ConfigResultExt;
use tracing::{debug, info};

use crate::{Stage, StageContext};

pub const ID: &str = "addOperatorSpecs";

pub fn stage() -> Stage {
    Stage::new(ID, "Add operator specs for secrets and config maps", add_operator_specs).requires(super::annotate_resources::ID)
}

pub fn add_operator_specs(defs: &TypeDefinitionSet, ctx: &StageContext<'_>) -> Result<TypeDefinitionSet> {
    let mut out = defs.clone();
    let mut added = 0usize;
    for (def, resource) in defs.resources() {
        let name = def.name();
        let config = ctx.configuration;
        let secrets = config.azure_generated_secrets(name).optional()?.unwrap_or_default();
        let manual = config.manual_configs(name).optional()?.unwrap_or_default();
        let generated = config.generated_configs(name).optional()?.unwrap_or_default();
        if secrets.is_empty() && manual.is_empty() && generated.is_empty() {
            continue;
        }

        for (key, path) in &generated {
            check_generated_path(defs, resource, path)
                .with_context(|| format!("$generatedConfigs entry {key} of {name}"))?;
        }

        let ids = ctx.id_factory;
        let mut operator_spec = ObjectType::new();
        if !secrets.is_empty() {
            let secrets_name = name.with_name(format!("{}OperatorSecrets", name.name()));
            let props = secrets.iter().map(|s| destination(ctx, s, runtime::secret_destination()));
            add_new(&mut out, TypeDefinition::new(secrets_name.clone(), Type::Object(ObjectType::new().with_properties(props))))?;
            operator_spec = operator_spec.with_property(
                PropertyDefinition::new("Secrets", "secrets", Type::optional(Type::name(secrets_name)))
                    .with_description("configures where to place Azure generated secrets"),
            );
        }
        let config_maps: BTreeSet<&String> = manual.iter().chain(generated.keys()).collect();
        if !config_maps.is_empty() {
            let maps_name = name.with_name(format!("{}OperatorConfigMaps", name.name()));
            let props = config_maps.iter().map(|c| destination(ctx, c, runtime::config_map_destination()));
            add_new(&mut out, TypeDefinition::new(maps_name.clone(), Type::Object(ObjectType::new().with_properties(props))))?;
            operator_spec = operator_spec.with_property(
                PropertyDefinition::new("ConfigMaps", "configMaps", Type::optional(Type::name(maps_name)))
                    .with_description("configures where to place operator written ConfigMaps"),
            );
        }

        let operator_spec_name = name.with_name(format!("{}OperatorSpec", name.name()));
        add_new(&mut out, TypeDefinition::new(operator_spec_name.clone(), Type::Object(operator_spec)))?;

        let spec_def = defs.resolve_resource_spec(resource).with_context(|| format!("resource {name}"))?;
        let property = PropertyDefinition::new(
            ids.create_property_name(PropertyName::OPERATOR_SPEC, Visibility::Exported),
            ids.create_identifier(PropertyName::OPERATOR_SPEC, Visibility::NotExported),
            Type::optional(Type::name(operator_spec_name)),
        )
        .with_tag(KUBERNETES_ONLY_TAG, "true")
        .with_description("The specification for configuring operator behavior. This field is interpreted by the operator and not passed directly to Azure");
        let spec_def = spec_def
            .apply_object_transformation(|o| Ok::<_, anyhow::Error>(o.clone().with_property(property)))
            .with_context(|| format!("adding operator spec to {name}"))?;
        out.replace(spec_def);
        debug!(%name, secrets = secrets.len(), config_maps = config_maps.len(), "added operator spec");
        added += 1;
    }
    info!(resources = added, "added operator specs");
    Ok(out)
}

fn destination(ctx: &StageContext<'_>, key: &str, ty: TypeName) -> PropertyDefinition {
    PropertyDefinition::new(
        ctx.id_factory.create_property_name(key, Visibility::Exported),
        ctx.id_factory.create_identifier(key, Visibility::NotExported),
        Type::optional(Type::name(ty)),
    )
}

fn add_new(set: &mut TypeDefinitionSet, def: TypeDefinition) -> Result<()> {
    if set.contains(def.name()) {
        bail!("cannot add {}: a definition with that name already exists", def.name());
    }
    set.add(def)?;
    Ok(())
}

/// A path like `$.Properties.PrincipalId` must walk properties of the status,
/// or of the spec when there is no status match.
fn check_generated_path(defs: &TypeDefinitionSet, resource: &ResourceType, path: &str) -> Result<()> {
    let segments: Vec<&str> = path.trim_start_matches("$.").split('.').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        bail!("path {path} names no property");
    }
    let roots = [defs.resolve_resource_status(resource)?, Some(defs.resolve_resource_spec(resource)?)];
    for root in roots.into_iter().flatten() {
        if walk(defs, root.ty(), &segments) {
            return Ok(());
        }
    }
    bail!("path {path} does not name a property of the resource spec or status")
}

fn walk(defs: &TypeDefinitionSet, ty: &Type, segments: &[&str]) -> bool {
    let Some((first, rest)) = segments.split_first() else { return true };
    let object = match ty.unwrap_optional() {
        Type::Name(n) => match defs.get(n) {
            Some(d) => return walk(defs, d.ty(), segments),
            None => return false,
        },
        other => other.as_object(),
    };
    let Some(object) = object else { return false };
    object
        .properties()
        .find(|p| p.name().as_str().eq_ignore_ascii_case(first) || p.json_name().eq_ignore_ascii_case(first))
        .is_some_and(|p| walk(defs, p.ty(), rest))
}
