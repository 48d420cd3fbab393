#![allow(dead_code)]

use armgen_astmodel::prelude::*;
use armgen_config::ObjectModelConfiguration;
use armgen_pipeline::{default_pipeline, StageContext};

pub fn pkg() -> PackageReference { PackageReference::local("apimanagement", "v1api20220801") }
pub fn name(n: &str) -> TypeName { TypeName::new(pkg(), n) }

fn opt_string(prop: &str, json: &str) -> PropertyDefinition {
    PropertyDefinition::new(prop, json, Type::optional(Type::string()))
}

fn add_with_twin(set: &mut TypeDefinitionSet, n: &str, obj: ObjectType) {
    set.add(TypeDefinition::new(name(n), Type::Object(obj.clone()))).unwrap();
    set.add(TypeDefinition::new(name(&format!("{n}_ARM")), Type::flagged(Type::Object(obj), TypeFlag::Arm))).unwrap();
}

/// Two resources of one API version: `NamedValue` (owned by `Service`) and
/// an extension resource `Diagnostic`.
pub fn input_set() -> TypeDefinitionSet {
    let mut set = TypeDefinitionSet::new();
    add_with_twin(&mut set, "KeyVaultContractCreateProperties", ObjectType::new().with_property(opt_string("SecretIdentifier", "secretIdentifier")));
    add_with_twin(
        &mut set,
        "Service_NamedValue_Spec",
        ObjectType::new()
            .with_property(opt_string("Name", "name"))
            .with_property(opt_string("DisplayName", "displayName"))
            .with_property(PropertyDefinition::new(
                "KeyVault",
                "keyVault",
                Type::optional(Type::name(name("KeyVaultContractCreateProperties"))),
            ))
            .with_property(PropertyDefinition::new("Tags", "tags", Type::array(Type::string()))),
    );
    add_with_twin(
        &mut set,
        "Service_NamedValue_STATUS",
        ObjectType::new().with_property(opt_string("Id", "id")).with_property(opt_string("DisplayName", "displayName")),
    );
    let named_value = ResourceType::new(
        Type::name(name("Service_NamedValue_Spec")),
        Some(Type::name(name("Service_NamedValue_STATUS"))),
    )
    .with_owner(name("Service"))
    .with_arm_type("Microsoft.ApiManagement/service/namedValues")
    .with_operations([ResourceOperation::Get, ResourceOperation::Put, ResourceOperation::Delete]);
    set.add(TypeDefinition::new(name("NamedValue"), Type::Resource(named_value))).unwrap();

    add_with_twin(&mut set, "Diagnostic_Spec", ObjectType::new().with_property(opt_string("Name", "name")).with_property(opt_string("LogLevel", "logLevel")));
    let diagnostic = ResourceType::new(Type::name(name("Diagnostic_Spec")), None)
        .with_scope(ResourceScope::Extension)
        .with_operations([ResourceOperation::Get, ResourceOperation::Put]);
    set.add(TypeDefinition::new(name("Diagnostic"), Type::Resource(diagnostic))).unwrap();
    set
}

pub const CONFIG: &str = r#"
objectModelConfiguration:
  apimanagement:
    $payloadType: explicitcollections
    2022-08-01:
      NamedValue:
        $defaultAzureName: false
        $supportedFrom: v2.0.0
        $azureGeneratedSecrets:
          - primaryKey
      Service_NamedValue_Spec:
        DisplayName:
          $renameTo: Label
"#;

pub fn run(set: TypeDefinitionSet, yaml: &str) -> anyhow::Result<TypeDefinitionSet> {
    let config = ObjectModelConfiguration::parse(yaml)?;
    let ids = IdentifierFactory::new();
    default_pipeline().run(set, &StageContext::new(&config, &ids))
}

pub fn object<'a>(set: &'a TypeDefinitionSet, n: &TypeName) -> &'a ObjectType {
    set.get(n).and_then(|d| d.ty().as_object()).unwrap()
}
