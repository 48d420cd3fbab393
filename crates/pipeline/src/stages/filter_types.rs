//! Applies `$export` and `$exportAs` to resources, then prunes what only
//! the dropped resources used.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Context, Result};
use armgen_astmodel::prelude::*;
use armgen_config::ConfigResultExt;
use tracing::{debug, info};

use super::reachable_with_twins;
use crate::{Stage, StageContext};

pub const ID: &str = "filterTypes";

pub fn stage() -> Stage { Stage::new(ID, "Apply export filters to resources", filter_types) }

pub fn filter_types(defs: &TypeDefinitionSet, ctx: &StageContext<'_>) -> Result<TypeDefinitionSet> {
    let config = ctx.configuration;
    let mut dropped = BTreeSet::new();
    let mut renames = BTreeMap::new();
    for (def, _) in defs.resources() {
        let name = def.name();
        let export = config.export(name).optional().with_context(|| format!("looking up $export for {name}"))?;
        let export_as = config.export_as(name).optional().with_context(|| format!("looking up $exportAs for {name}"))?;
        match (export, export_as) {
            (Some(false), Some(alias)) => bail!("{name} is not exported but has $exportAs {alias}"),
            (Some(false), None) => {
                debug!(%name, "resource not exported");
                dropped.insert(name.clone());
            }
            (_, Some(alias)) => {
                debug!(%name, %alias, "resource exported under another name");
                renames.insert(name.clone(), name.with_name(alias));
            }
            _ => {}
        }
    }

    let before = reachable_with_twins(defs, ctx.id_factory, defs.resources().map(|(d, _)| d.name().clone()));
    let remaining = defs.filter(|d| !dropped.contains(d.name()));
    let after = reachable_with_twins(&remaining, ctx.id_factory, remaining.resources().map(|(d, _)| d.name().clone()));
    let kept = remaining.filter(|d| !before.contains(d.name()) || after.contains(d.name()));

    let result = if renames.is_empty() {
        kept
    } else {
        kept.map_names(&|n| renames.get(n).cloned().unwrap_or_else(|| n.clone()))
            .context("applying $exportAs renames")?
    };
    info!(dropped = dropped.len(), renamed = renames.len(), pruned = defs.len() - result.len(), "filtered resources");
    Ok(result)
}
