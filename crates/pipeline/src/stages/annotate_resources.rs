//! Applies the resource-level directives: `$isResource`, `$supportedFrom`,
//! `$importable` and `$resourceEmbeddedInParent`.

use anyhow::{bail, Context, Result};
use armgen_astmodel::prelude::*;
use armgen_config::ConfigResultExt;
use tracing::{debug, info};

use super::is_arm;
use crate::{Stage, StageContext};

pub const ID: &str = "annotateResources";

pub fn stage() -> Stage {
    Stage::new(ID, "Annotate resources with configured metadata", annotate_resources).requires(super::rename_types::ID)
}

pub fn annotate_resources(defs: &TypeDefinitionSet, ctx: &StageContext<'_>) -> Result<TypeDefinitionSet> {
    let config = ctx.configuration;
    let mut out = TypeDefinitionSet::new();
    let mut demoted = 0usize;
    for def in defs.iter().filter(|d| !is_arm(defs, d.name())) {
        let name = def.name();
        let is_resource = config.is_resource(name).optional().with_context(|| format!("looking up $isResource for {name}"))?;
        let Some(resource) = def.ty().as_resource() else {
            if is_resource == Some(true) {
                bail!("{name} is configured with $isResource: true but is not a resource");
            }
            out.add(def.clone())?;
            continue;
        };
        if is_resource == Some(false) {
            debug!(%name, "demoting resource");
            demoted += 1;
            continue;
        }
        let annotated = annotate(defs, ctx, name, resource).with_context(|| format!("annotating resource {name}"))?;
        out.add(def.clone().with_type(Type::Resource(annotated)))?;
    }
    for def in defs.iter().filter(|d| is_arm(defs, d.name())) {
        out.add(def.clone())?;
    }
    info!(resources = out.resources().count(), demoted, "annotated resources");
    Ok(out)
}

fn annotate(defs: &TypeDefinitionSet, ctx: &StageContext<'_>, name: &TypeName, resource: &ResourceType) -> Result<ResourceType> {
    let config = ctx.configuration;
    let mut out = resource.clone();
    if out.api_version().is_none() {
        if let Some(v) = name.package().api_version() {
            out = out.with_api_version(v.date_form());
        }
    }
    if let Some(from) = config.supported_from(name).optional()? {
        out = out.with_supported_from(from);
    }
    if let Some(importable) = config.importable(name).optional()? {
        out = out.with_importable(importable);
    }
    if let Some(parent) = config.resource_embedded_in_parent(name).optional()? {
        let parent_name = name.with_name(parent.as_str());
        if defs.get(&parent_name).and_then(|d| d.ty().as_resource()).is_none() {
            bail!("$resourceEmbeddedInParent names {parent_name}, which is not a resource");
        }
        out = out.with_embedded_in_parent(parent);
    }
    Ok(out)
}
