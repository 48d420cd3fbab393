#![forbid(unsafe_code)]

mod common;

use armgen_armconversion::apply_arm_conversion_interface;
use armgen_astmodel::prelude::*;
use armgen_config::ObjectModelConfiguration;
use common::*;

fn synthesize(set: &TypeDefinitionSet, config: &ObjectModelConfiguration) -> anyhow::Result<TypeDefinitionSet> {
    apply_arm_conversion_interface(set, &IdentifierFactory::new(), config)
}

#[test]
fn named_value_spec_gets_owner_and_azure_name() {
    let out = synthesize(&named_value_set(ResourceScope::ResourceGroup), &ObjectModelConfiguration::default()).unwrap();
    let spec = object(&out, "Service_NamedValue_Spec");

    assert!(spec.property("Name").is_none());
    let azure_name = spec.property("AzureName").unwrap();
    assert_eq!(azure_name.ty(), &Type::string());
    assert_eq!(azure_name.json_name(), "azureName");
    assert!(!azure_name.is_required());
    assert!(spec.has_capability(CapabilityKind::AzureNameDefaulter));

    let owners: Vec<_> = spec.properties().filter(|p| p.name() == "Owner").collect();
    assert_eq!(owners.len(), 1);
    let owner = owners[0];
    assert!(owner.is_required());
    assert_eq!(owner.ty(), &Type::optional(Type::name(runtime::known_resource_reference())));
    assert_eq!(owner.tag(OWNER_GROUP_TAG), Some(&["apimanagement.azure.com".to_string()][..]));
    assert_eq!(owner.tag(OWNER_KIND_TAG), Some(&["Service".to_string()][..]));

    let conv = spec.arm_conversion().unwrap();
    assert_eq!(conv.kind, ConversionKind::Spec);
    assert_eq!(conv.arm_type, name("Service_NamedValue_Spec_ARM"));
    assert_eq!(conv.payload, PayloadType::OmitEmpty);
}

#[test]
fn status_and_reachable_objects_are_covered() {
    let input = named_value_set(ResourceScope::ResourceGroup);
    let out = synthesize(&input, &ObjectModelConfiguration::default()).unwrap();

    assert_eq!(object(&out, "Service_NamedValue_STATUS").arm_conversion().unwrap().kind, ConversionKind::Status);
    let kv = object(&out, "KeyVaultContractCreateProperties").arm_conversion().unwrap();
    assert_eq!(kv.kind, ConversionKind::Ordinary);
    assert_eq!(kv.arm_type, name("KeyVaultContractCreateProperties_ARM"));

    assert!(object(&out, "Unreferenced").arm_conversion().is_none());
    for twin in ["Service_NamedValue_Spec_ARM", "Service_NamedValue_STATUS_ARM", "KeyVaultContractCreateProperties_ARM"] {
        assert_eq!(out.get(&name(twin)), input.get(&name(twin)), "{twin} must pass through unchanged");
    }
    assert_eq!(out.len(), input.len());
}

#[test]
fn synthesis_is_idempotent() {
    let config = ObjectModelConfiguration::default();
    let once = synthesize(&named_value_set(ResourceScope::ResourceGroup), &config).unwrap();
    let twice = synthesize(&once, &config).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn extension_resources_take_an_arbitrary_owner() {
    let out = synthesize(&named_value_set(ResourceScope::Extension), &ObjectModelConfiguration::default()).unwrap();
    let owner = object(&out, "Service_NamedValue_Spec").property("Owner").unwrap();
    assert!(owner.is_required());
    assert!(owner.tags().is_empty());
    assert_eq!(owner.ty(), &Type::optional(Type::name(runtime::arbitrary_owner_reference())));
}

#[test]
fn missing_twin_is_fatal_and_named() {
    let mut set = named_value_set(ResourceScope::ResourceGroup);
    set.remove(&name("KeyVaultContractCreateProperties_ARM"));
    let err = synthesize(&set, &ObjectModelConfiguration::default()).unwrap_err();
    assert!(format!("{err:#}").contains("KeyVaultContractCreateProperties"), "{err:#}");
}

#[test]
fn payload_type_and_azure_name_come_from_configuration() {
    let doc = r#"
objectModelConfiguration:
  apimanagement:
    $payloadType: explicitcollections
    v1api20220801:
      NamedValue:
        $defaultAzureName: false
"#;
    let config = ObjectModelConfiguration::parse(doc).unwrap();
    let out = synthesize(&named_value_set(ResourceScope::ResourceGroup), &config).unwrap();
    let spec = object(&out, "Service_NamedValue_Spec");
    assert_eq!(spec.arm_conversion().unwrap().payload, PayloadType::ExplicitCollections);
    assert!(spec.property("AzureName").unwrap().is_required());
    assert!(!spec.has_capability(CapabilityKind::AzureNameDefaulter));
    config.verify_consumed().unwrap();
}

#[test]
fn wire_shaped_spec_is_a_self_conversion() {
    let mut set = named_value_set(ResourceScope::ResourceGroup);
    let spec = set.remove(&name("Service_NamedValue_Spec")).unwrap();
    let flagged = Type::flagged(spec.ty().clone(), TypeFlag::Arm);
    set.add(spec.with_type(flagged)).unwrap();
    let err = synthesize(&set, &ObjectModelConfiguration::default()).unwrap_err();
    assert!(format!("{err:#}").contains("onto itself"), "{err:#}");
}

#[test]
fn tenant_and_location_resources_get_no_owner() {
    for scope in [ResourceScope::Tenant, ResourceScope::Location] {
        let out = synthesize(&named_value_set(scope), &ObjectModelConfiguration::default()).unwrap();
        let spec = object(&out, "Service_NamedValue_Spec");
        assert!(spec.property("Owner").is_none(), "{scope:?} resource should not carry an owner");
        assert!(spec.has_property("AzureName"), "{scope:?}");
        assert_eq!(spec.arm_conversion().unwrap().kind, ConversionKind::Spec);
    }
}

#[test]
fn required_name_is_promoted_with_its_type() {
    let mut set = named_value_set(ResourceScope::ResourceGroup);
    let spec = set.remove(&name("Service_NamedValue_Spec")).unwrap();
    let spec = spec
        .apply_object_transformation::<ModelError, _>(|o| {
            Ok(o.clone().with_property(PropertyDefinition::new("Name", "name", Type::string()).make_required()))
        })
        .unwrap();
    set.add(spec).unwrap();

    let out = synthesize(&set, &ObjectModelConfiguration::default()).unwrap();
    let spec = object(&out, "Service_NamedValue_Spec");
    assert!(spec.property("Name").is_none());
    let azure_name = spec.property("AzureName").unwrap();
    assert_eq!(azure_name.ty(), &Type::string());
    assert!(!azure_name.is_required());
    assert!(spec.has_capability(CapabilityKind::AzureNameDefaulter));
}
