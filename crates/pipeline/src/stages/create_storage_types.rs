//! Creates the storage variant of every package that holds resources and
//! marks, per resource kind, the latest version as the hub.
//!
//! Storage objects keep every property but make it optional, lose their
//! validations and capabilities, and gain a property bag so fields from
//! other versions survive a round trip. Enum references degrade to the
//! enum's base primitive. Wire twins are never copied.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use armgen_astmodel::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use super::is_arm;
use crate::{Stage, StageContext};

pub const ID: &str = "createStorageTypes";

/// JSON name of the property bag on storage objects.
pub const PROPERTY_BAG_JSON: &str = "$propertyBag";

pub fn stage() -> Stage {
    Stage::new(ID, "Create storage variants and mark hub versions", create_storage_types)
        .requires(super::apply_arm_conversion::ID)
}

pub fn create_storage_types(defs: &TypeDefinitionSet, _ctx: &StageContext<'_>) -> Result<TypeDefinitionSet> {
    let resource_packages: BTreeSet<&PackageReference> =
        defs.resources().map(|(d, _)| d.name().package()).filter(|p| p.is_local()).collect();

    let mut enums: FxHashMap<TypeName, PrimitiveType> = FxHashMap::default();
    let mut copied: BTreeSet<TypeName> = BTreeSet::new();
    for def in defs.iter().filter(|d| resource_packages.contains(d.name().package()) && !is_arm(defs, d.name())) {
        let ty = def.ty();
        if let Some(e) = ty.as_enum() {
            enums.insert(def.name().clone(), e.base);
            copied.insert(def.name().clone());
        } else if ty.as_object().is_some() || ty.as_resource().is_some() {
            copied.insert(def.name().clone());
        }
    }

    let converter = StorageConverter { copied: &copied, enums: &enums };
    let mut out = defs.clone();
    for name in &copied {
        let def = defs.must_get(name)?;
        let storage = def
            .clone()
            .with_name(name.with_package(name.package().to_storage()))
            .with_type(converter.definition_type(def.ty()));
        out.add(storage).with_context(|| format!("adding storage variant of {name}"))?;
    }

    let hubs = mark_hubs(&mut out)?;
    info!(packages = resource_packages.len(), storage = copied.len(), hubs, "created storage types");
    Ok(out)
}

struct StorageConverter<'a> {
    copied: &'a BTreeSet<TypeName>,
    enums: &'a FxHashMap<TypeName, PrimitiveType>,
}

impl StorageConverter<'_> {
    fn definition_type(&self, ty: &Type) -> Type {
        match ty {
            Type::Flagged(f) => {
                let inner = f
                    .flags()
                    .iter()
                    .filter(|fl| **fl != TypeFlag::Arm)
                    .fold(self.convert(f.element()), |acc, fl| Type::flagged(acc, *fl));
                Type::flagged(inner, TypeFlag::Storage)
            }
            Type::Enum(e) => Type::Primitive(e.base),
            other => self.convert(other),
        }
    }

    fn convert(&self, ty: &Type) -> Type {
        match ty {
            Type::Name(n) => match self.enums.get(n) {
                Some(base) => Type::Primitive(*base),
                None if self.copied.contains(n) => Type::Name(n.with_package(n.package().to_storage())),
                None => Type::Name(n.clone()),
            },
            Type::Object(o) => Type::Object(self.object(o)),
            Type::Resource(r) => {
                let mut out = r.clone().with_spec(self.convert(r.spec()));
                if let Some(status) = r.status() {
                    out = out.with_status(self.convert(status));
                }
                if let Some(owner) = r.owner().filter(|o| self.copied.contains(o)) {
                    out = out.with_owner(owner.with_package(owner.package().to_storage()));
                }
                Type::Resource(out)
            }
            Type::Enum(e) => Type::Primitive(e.base),
            Type::Map(m) => Type::map(self.convert(&m.key), self.convert(&m.value)),
            Type::Array(inner) => Type::array(self.convert(inner)),
            Type::Optional(inner) => Type::optional(self.convert(inner)),
            Type::Flagged(f) => Type::Flagged(f.with_element(self.convert(f.element()))),
            Type::Primitive(_) => ty.clone(),
        }
    }

    fn object(&self, o: &ObjectType) -> ObjectType {
        let props: Vec<PropertyDefinition> = o
            .properties()
            .map(|p| p.clone().with_type(Type::optional(self.convert(p.ty()))).make_optional())
            .collect();
        let mut out = o.clone().without_properties().without_capabilities().without_validations().with_properties(props);
        if !out.has_property(PropertyName::PROPERTY_BAG) {
            out = out.with_property(PropertyDefinition::new(
                PropertyName::PROPERTY_BAG,
                PROPERTY_BAG_JSON,
                Type::optional(Type::name(runtime::property_bag())),
            ));
        }
        out
    }
}

/// Marks the storage resource of the latest API version of each kind; returns how many were marked.
fn mark_hubs(set: &mut TypeDefinitionSet) -> Result<usize> {
    let mut latest: BTreeMap<(String, String), (Option<ApiVersion>, TypeName)> = BTreeMap::new();
    for (def, _) in set.resources().filter(|(d, _)| d.name().package().is_storage()) {
        let name = def.name();
        let Some(group) = name.package().group() else { continue };
        let key = (group.to_string(), name.name().to_string());
        let version = name.package().api_version();
        let newer = latest.get(&key).map_or(true, |(v, n)| (version, name.package()) > (*v, n.package()));
        if newer {
            latest.insert(key, (version, name.clone()));
        }
    }
    for (_, hub) in latest.values() {
        let def = set.must_get(hub)?.clone();
        let Some(resource) = def.ty().as_resource() else { continue };
        debug!(hub = %hub, "marking storage version");
        let marked = mark(def.ty(), resource);
        set.replace(def.with_type(marked));
    }
    Ok(latest.len())
}

fn mark(ty: &Type, resource: &ResourceType) -> Type {
    match ty {
        Type::Flagged(f) => Type::Flagged(f.with_element(mark(f.element(), resource))),
        _ => Type::Resource(resource.clone().mark_storage_version()),
    }
}
