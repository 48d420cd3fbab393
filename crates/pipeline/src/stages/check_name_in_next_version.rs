//! Checks `$nameInNextVersion` on types and properties against the next API
//! version of the same group present in the set.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, bail, Context, Result};
use armgen_astmodel::prelude::*;
use armgen_config::ConfigResultExt;
use tracing::info;

use super::is_arm;
use crate::{Stage, StageContext};

pub const ID: &str = "checkNameInNextVersion";

pub fn stage() -> Stage {
    Stage::new(ID, "Check configured names exist in the next API version", check_name_in_next_version)
        .requires(super::rename_properties::ID)
}

pub fn check_name_in_next_version(defs: &TypeDefinitionSet, ctx: &StageContext<'_>) -> Result<TypeDefinitionSet> {
    let versions = versions_by_group(defs);
    let config = ctx.configuration;
    let mut checked = 0usize;
    for def in defs.iter().filter(|d| d.name().package().is_local() && !is_arm(defs, d.name())) {
        let name = def.name();
        let next_type = config
            .name_in_next_version(name)
            .optional()
            .with_context(|| format!("looking up $nameInNextVersion for {name}"))?;
        if let Some(next) = &next_type {
            let next_pkg = next_package(&versions, name.package())
                .ok_or_else(|| anyhow!("{name} has $nameInNextVersion {next} but its group has no later version"))?;
            let target = TypeName::new(next_pkg.clone(), next.as_str());
            if !defs.contains(&target) {
                bail!("{name} has $nameInNextVersion {next} but {target} does not exist");
            }
            checked += 1;
        }

        let Some(object) = def.ty().as_object() else { continue };
        for prop in object.properties() {
            let Some(next_prop) = config
                .property_name_in_next_version(name, prop.name())
                .optional()
                .with_context(|| format!("looking up $nameInNextVersion for {name}.{}", prop.name()))?
            else {
                continue;
            };
            let next_pkg = next_package(&versions, name.package()).ok_or_else(|| {
                anyhow!("{name}.{} has $nameInNextVersion {next_prop} but its group has no later version", prop.name())
            })?;
            let target = TypeName::new(next_pkg.clone(), next_type.as_deref().unwrap_or(name.name()));
            let found = defs.get(&target).and_then(|d| d.ty().as_object()).is_some_and(|o| o.has_property(&next_prop));
            if !found {
                bail!("{name}.{} has $nameInNextVersion {next_prop} but {target} has no such property", prop.name());
            }
            checked += 1;
        }
    }
    info!(checked, "checked next-version names");
    Ok(defs.clone())
}

fn versions_by_group(defs: &TypeDefinitionSet) -> BTreeMap<String, BTreeSet<(ApiVersion, PackageReference)>> {
    let mut out: BTreeMap<String, BTreeSet<(ApiVersion, PackageReference)>> = BTreeMap::new();
    for name in defs.names().filter(|n| n.package().is_local()) {
        let pkg = name.package();
        if let (Some(group), Some(version)) = (pkg.group(), pkg.api_version()) {
            out.entry(group.to_string()).or_default().insert((version, pkg.clone()));
        }
    }
    out
}

fn next_package<'a>(
    versions: &'a BTreeMap<String, BTreeSet<(ApiVersion, PackageReference)>>,
    pkg: &PackageReference,
) -> Option<&'a PackageReference> {
    let current = pkg.api_version()?;
    let group = versions.get(pkg.group()?)?;
    group.iter().find(|(v, _)| *v > current).map(|(_, p)| p)
}
