use armgen_astmodel::prelude::*;
use armgen_config::ObjectModelConfiguration;

use crate::StageContext;

pub fn pkg() -> PackageReference { PackageReference::local("apimanagement", "v1api20220801") }
pub fn name(n: &str) -> TypeName { TypeName::new(pkg(), n) }

pub fn opt_string(prop: &str, json: &str) -> PropertyDefinition {
    PropertyDefinition::new(prop, json, Type::optional(Type::string()))
}

pub fn add_with_twin(set: &mut TypeDefinitionSet, n: &TypeName, obj: ObjectType) {
    set.add(TypeDefinition::new(n.clone(), Type::Object(obj.clone()))).unwrap();
    set.add(TypeDefinition::new(n.with_name(format!("{}_ARM", n.name())), Type::flagged(Type::Object(obj), TypeFlag::Arm)))
        .unwrap();
}

/// `NamedValue` owned by `Service`: spec, status and one nested object, each with a twin.
pub fn named_value_set() -> TypeDefinitionSet {
    let mut set = TypeDefinitionSet::new();
    add_with_twin(&mut set, &name("KeyVault"), ObjectType::new().with_property(opt_string("SecretIdentifier", "secretIdentifier")));
    let spec = ObjectType::new()
        .with_property(opt_string("Name", "name"))
        .with_property(opt_string("DisplayName", "displayName"))
        .with_property(PropertyDefinition::new("KeyVault", "keyVault", Type::optional(Type::name(name("KeyVault")))));
    add_with_twin(&mut set, &name("Service_NamedValue_Spec"), spec);
    add_with_twin(&mut set, &name("Service_NamedValue_STATUS"), ObjectType::new().with_property(opt_string("Id", "id")));
    let resource = ResourceType::new(
        Type::name(name("Service_NamedValue_Spec")),
        Some(Type::name(name("Service_NamedValue_STATUS"))),
    )
    .with_owner(name("Service"))
    .with_operations([ResourceOperation::Get, ResourceOperation::Put, ResourceOperation::Delete]);
    set.add(TypeDefinition::new(name("NamedValue"), Type::Resource(resource))).unwrap();
    set
}

pub fn with_config<T>(yaml: &str, f: impl FnOnce(&StageContext<'_>) -> T) -> T {
    let config = ObjectModelConfiguration::parse(yaml).unwrap();
    let ids = IdentifierFactory::new();
    f(&StageContext::new(&config, &ids))
}

pub fn object<'a>(set: &'a TypeDefinitionSet, n: &TypeName) -> &'a ObjectType {
    set.get(n).and_then(|d| d.ty().as_object()).unwrap()
}
