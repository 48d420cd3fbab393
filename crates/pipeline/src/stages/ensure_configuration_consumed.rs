use anyhow::{Context, Result};
use armgen_astmodel::prelude::TypeDefinitionSet;
use tracing::info;

use crate::{Stage, StageContext};

pub const ID: &str = "ensureConfigurationConsumed";

pub fn stage() -> Stage {
    Stage::new(ID, "Check every configured value was used", ensure_configuration_consumed)
        .requires(super::apply_arm_conversion::ID)
        .requires(super::check_name_in_next_version::ID)
}

pub fn ensure_configuration_consumed(defs: &TypeDefinitionSet, ctx: &StageContext<'_>) -> Result<TypeDefinitionSet> {
    ctx.configuration.verify_consumed().context("configuration contains unused entries")?;
    info!(summary = ?ctx.configuration.summary(), "configuration fully consumed");
    Ok(defs.clone())
}
