#![allow(dead_code)]

use armgen_astmodel::prelude::*;

pub fn pkg() -> PackageReference { PackageReference::local("apimanagement", "v1api20220801") }
pub fn name(n: &str) -> TypeName { TypeName::new(pkg(), n) }

pub fn opt_string(prop: &str, json: &str) -> PropertyDefinition {
    PropertyDefinition::new(prop, json, Type::optional(Type::string()))
}

/// Adds `name` and its wire twin built from the same object.
pub fn add_with_twin(set: &mut TypeDefinitionSet, n: &str, obj: ObjectType, arm_obj: ObjectType) {
    set.add(TypeDefinition::new(name(n), Type::Object(obj))).unwrap();
    set.add(TypeDefinition::new(name(&format!("{n}_ARM")), Type::flagged(Type::Object(arm_obj), TypeFlag::Arm))).unwrap();
}

/// `NamedValue`, owned by `Service`, with a nested key vault object and a status.
pub fn named_value_set(scope: ResourceScope) -> TypeDefinitionSet {
    let mut set = TypeDefinitionSet::new();
    let key_vault = ObjectType::new().with_property(opt_string("SecretIdentifier", "secretIdentifier"));
    add_with_twin(&mut set, "KeyVaultContractCreateProperties", key_vault.clone(), key_vault);

    let spec = ObjectType::new()
        .with_property(opt_string("Name", "name"))
        .with_property(opt_string("DisplayName", "displayName"))
        .with_property(PropertyDefinition::new(
            "KeyVault",
            "keyVault",
            Type::optional(Type::name(name("KeyVaultContractCreateProperties"))),
        ))
        .with_property(PropertyDefinition::new("Tags", "tags", Type::map(Type::string(), Type::string())));
    let arm_spec = ObjectType::new()
        .with_property(PropertyDefinition::new("Name", "name", Type::string()))
        .with_property(opt_string("DisplayName", "displayName"))
        .with_property(PropertyDefinition::new(
            "KeyVault",
            "keyVault",
            Type::optional(Type::name(name("KeyVaultContractCreateProperties_ARM"))),
        ))
        .with_property(PropertyDefinition::new("Tags", "tags", Type::map(Type::string(), Type::string())));
    add_with_twin(&mut set, "Service_NamedValue_Spec", spec, arm_spec);

    let status = ObjectType::new().with_property(opt_string("Id", "id")).with_property(opt_string("DisplayName", "displayName"));
    add_with_twin(&mut set, "Service_NamedValue_STATUS", status.clone(), status);

    set.add(TypeDefinition::new(name("Unreferenced"), Type::Object(ObjectType::new().with_property(opt_string("X", "x")))))
        .unwrap();

    let resource = ResourceType::new(
        Type::name(name("Service_NamedValue_Spec")),
        Some(Type::name(name("Service_NamedValue_STATUS"))),
    )
    .with_scope(scope)
    .with_owner(name("Service"))
    .with_operations([ResourceOperation::Get, ResourceOperation::Put, ResourceOperation::Delete]);
    set.add(TypeDefinition::new(name("NamedValue"), Type::Resource(resource))).unwrap();
    set
}

pub fn object<'a>(set: &'a TypeDefinitionSet, n: &str) -> &'a ObjectType {
    set.get(&name(n)).and_then(|d| d.ty().as_object()).unwrap()
}
