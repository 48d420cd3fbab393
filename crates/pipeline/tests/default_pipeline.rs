#![forbid(unsafe_code)]

mod common;

use armgen_astmodel::prelude::*;
use armgen_config::ObjectModelConfiguration;
use armgen_pipeline::{default_pipeline, StageContext};
use common::*;

#[test]
fn full_run_synthesizes_and_creates_storage() {
    let out = run(input_set(), CONFIG).unwrap();

    let spec = object(&out, &name("Service_NamedValue_Spec"));
    assert!(spec.property("Name").is_none());
    let azure_name = spec.property("AzureName").unwrap();
    assert!(azure_name.is_required(), "$defaultAzureName: false makes AzureName required");
    assert!(!spec.has_capability(CapabilityKind::AzureNameDefaulter));
    assert_eq!(spec.property("Label").unwrap().json_name(), "displayName");
    assert!(spec.property("OperatorSpec").unwrap().is_kubernetes_only());
    let owner = spec.property("Owner").unwrap();
    assert_eq!(owner.tag(OWNER_KIND_TAG), Some(&["Service".to_string()][..]));
    assert_eq!(spec.arm_conversion().unwrap().payload, PayloadType::ExplicitCollections);

    let diagnostic = object(&out, &name("Diagnostic_Spec"));
    let ext_owner = diagnostic.property("Owner").unwrap();
    assert!(ext_owner.is_required());
    assert!(ext_owner.tags().is_empty());

    let resource = out.get(&name("NamedValue")).unwrap().ty().as_resource().unwrap();
    assert_eq!(resource.supported_from(), Some("v2.0.0"));

    let storage = TypeName::new(pkg().to_storage(), "NamedValue");
    assert!(out.get(&storage).unwrap().ty().as_resource().unwrap().is_storage_version());
    let storage_spec = object(&out, &TypeName::new(pkg().to_storage(), "Service_NamedValue_Spec"));
    assert!(storage_spec.arm_conversion().is_none());
    assert!(storage_spec.has_property("PropertyBag"));
}

#[test]
fn two_runs_are_byte_identical() {
    let a = serde_json::to_string_pretty(&run(input_set(), CONFIG).unwrap()).unwrap();
    let b = serde_json::to_string_pretty(&run(input_set(), CONFIG).unwrap()).unwrap();
    assert_eq!(a, b, "pipeline output should be deterministic across runs");
}

#[test]
fn unread_export_fails_at_finalization() {
    let yaml = "objectModelConfiguration:\n  apimanagement:\n    v1api20220801:\n      KeyVaultContractCreateProperties:\n        $export: false\n";
    let err = run(input_set(), yaml).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.starts_with("stage ensureConfigurationConsumed"), "{chain}");
    assert!(chain.contains("KeyVaultContractCreateProperties: $export specified but never consumed"), "{chain}");
}

#[test]
fn unused_property_entry_is_named() {
    let yaml = r#"
objectModelConfiguration:
  apimanagement:
    v1api20220801:
      Service_NamedValue_Spec:
        DisplayNme:
          $renameTo: Label
"#;
    let err = run(input_set(), yaml).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("DisplayNme"), "{chain}");
    assert!(chain.contains("did you mean DisplayName?"), "{chain}");
}

#[test]
fn missing_twin_aborts_without_output() {
    let mut set = input_set();
    set.remove(&name("Service_NamedValue_Spec_ARM"));
    let err = run(set, "").unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.starts_with("stage applyArmConversionInterface"), "{chain}");
    assert!(chain.contains("Service_NamedValue_Spec"), "{chain}");
}

#[test]
fn run_until_stops_after_the_named_stage() {
    let config = ObjectModelConfiguration::parse(CONFIG).unwrap();
    let ids = IdentifierFactory::new();
    let out = default_pipeline()
        .run_until(input_set(), &StageContext::new(&config, &ids), "applyArmConversionInterface")
        .unwrap();
    assert!(object(&out, &name("Service_NamedValue_Spec")).arm_conversion().is_some());
    assert!(out.names().all(|n| !n.package().is_storage()));
}
