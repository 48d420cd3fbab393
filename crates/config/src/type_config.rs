use std::collections::BTreeMap;

use serde::de::MapAccess;

use crate::advisor::TypoAdvisor;
use crate::configurable::Configurable;
use crate::error::ConfigError;
use crate::property::PropertyConfiguration;
use crate::yaml::{child_path, insert_child, is_directive, ConfigLevel, GeneratedConfigsSeed, LevelSeed};
use crate::{
    UnusedEntry, AZURE_GENERATED_SECRETS_TAG, DEFAULT_AZURE_NAME_TAG, EXPORT_AS_TAG, EXPORT_TAG, GENERATED_CONFIGS_TAG,
    IMPORTABLE_TAG, IS_RESOURCE_TAG, MANUAL_CONFIGS_TAG, NAME_IN_NEXT_VERSION_TAG, RENAME_TO_TAG,
    RESOURCE_EMBEDDED_IN_PARENT_TAG, SUPPORTED_FROM_TAG,
};

/// Configuration for one type within a version of a group.
#[derive(Debug)]
pub struct TypeConfiguration {
    name: String,
    path: String,
    properties: BTreeMap<String, PropertyConfiguration>,
    advisor: TypoAdvisor,
    pub(crate) azure_generated_secrets: Configurable<Vec<String>>,
    pub(crate) default_azure_name: Configurable<bool>,
    pub(crate) export: Configurable<bool>,
    pub(crate) export_as: Configurable<String>,
    pub(crate) generated_configs: Configurable<BTreeMap<String, String>>,
    pub(crate) importable: Configurable<bool>,
    pub(crate) is_resource: Configurable<bool>,
    pub(crate) manual_configs: Configurable<Vec<String>>,
    pub(crate) name_in_next_version: Configurable<String>,
    pub(crate) rename_to: Configurable<String>,
    pub(crate) resource_embedded_in_parent: Configurable<String>,
    pub(crate) supported_from: Configurable<String>,
}

impl TypeConfiguration {
    pub fn name(&self) -> &str { &self.name }
    pub fn property_count(&self) -> usize { self.properties.len() }

    pub(crate) fn find_property(&self, property: &str) -> Result<&PropertyConfiguration, ConfigError> {
        self.advisor.add_term(property);
        self.properties.get(&property.to_lowercase()).ok_or_else(|| {
            ConfigError::not_configured(format!("configuration of type {} has no detail for property {property}", self.path))
                .with_options("properties", self.properties.values().map(|p| p.name().to_string()))
        })
    }

    pub(crate) fn collect_unused(&self, out: &mut Vec<UnusedEntry>) {
        let cells = [
            self.azure_generated_secrets.unused_message(),
            self.default_azure_name.unused_message(),
            self.export.unused_message(),
            self.export_as.unused_message(),
            self.generated_configs.unused_message(),
            self.importable.unused_message(),
            self.is_resource.unused_message(),
            self.manual_configs.unused_message(),
            self.name_in_next_version.unused_message(),
            self.rename_to.unused_message(),
            self.resource_embedded_in_parent.unused_message(),
            self.supported_from.unused_message(),
        ];
        out.extend(cells.into_iter().flatten().map(UnusedEntry::new));
        for property in self.properties.values() {
            let mut entries = Vec::new();
            property.collect_unused(&mut entries);
            let note = self.advisor.not_seen_note("property", property.name());
            out.extend(entries.into_iter().map(|e| e.noted(note.clone())));
        }
    }
}

impl ConfigLevel for TypeConfiguration {
    const KIND: &'static str = "type";
    const DIRECTIVES: &'static [&'static str] = &[
        AZURE_GENERATED_SECRETS_TAG,
        DEFAULT_AZURE_NAME_TAG,
        EXPORT_TAG,
        EXPORT_AS_TAG,
        GENERATED_CONFIGS_TAG,
        IMPORTABLE_TAG,
        IS_RESOURCE_TAG,
        MANUAL_CONFIGS_TAG,
        NAME_IN_NEXT_VERSION_TAG,
        RENAME_TO_TAG,
        RESOURCE_EMBEDDED_IN_PARENT_TAG,
        SUPPORTED_FROM_TAG,
    ];

    fn name(&self) -> &str { &self.name }

    fn named(name: &str, parent: &str) -> Self {
        let path = child_path(parent, name);
        let scope = format!("type {path}");
        Self {
            name: name.to_string(),
            properties: BTreeMap::new(),
            advisor: TypoAdvisor::default(),
            azure_generated_secrets: Configurable::new(AZURE_GENERATED_SECRETS_TAG, scope.clone()),
            default_azure_name: Configurable::new(DEFAULT_AZURE_NAME_TAG, scope.clone()),
            export: Configurable::new(EXPORT_TAG, scope.clone()),
            export_as: Configurable::new(EXPORT_AS_TAG, scope.clone()),
            generated_configs: Configurable::new(GENERATED_CONFIGS_TAG, scope.clone()),
            importable: Configurable::new(IMPORTABLE_TAG, scope.clone()),
            is_resource: Configurable::new(IS_RESOURCE_TAG, scope.clone()),
            manual_configs: Configurable::new(MANUAL_CONFIGS_TAG, scope.clone()),
            name_in_next_version: Configurable::new(NAME_IN_NEXT_VERSION_TAG, scope.clone()),
            rename_to: Configurable::new(RENAME_TO_TAG, scope.clone()),
            resource_embedded_in_parent: Configurable::new(RESOURCE_EMBEDDED_IN_PARENT_TAG, scope.clone()),
            supported_from: Configurable::new(SUPPORTED_FROM_TAG, scope),
            path,
        }
    }

    fn accept<'de, A: MapAccess<'de>>(&mut self, key: String, map: &mut A) -> Result<(), A::Error> {
        match key.as_str() {
            k if is_directive(k, AZURE_GENERATED_SECRETS_TAG) => self.azure_generated_secrets.set(map.next_value()?),
            k if is_directive(k, DEFAULT_AZURE_NAME_TAG) => self.default_azure_name.set(map.next_value()?),
            k if is_directive(k, EXPORT_TAG) => self.export.set(map.next_value()?),
            k if is_directive(k, EXPORT_AS_TAG) => self.export_as.set(map.next_value()?),
            k if is_directive(k, GENERATED_CONFIGS_TAG) => {
                self.generated_configs.set(map.next_value_seed(GeneratedConfigsSeed(GENERATED_CONFIGS_TAG))?)
            }
            k if is_directive(k, IMPORTABLE_TAG) => self.importable.set(map.next_value()?),
            k if is_directive(k, IS_RESOURCE_TAG) => self.is_resource.set(map.next_value()?),
            k if is_directive(k, MANUAL_CONFIGS_TAG) => self.manual_configs.set(map.next_value()?),
            k if is_directive(k, NAME_IN_NEXT_VERSION_TAG) => self.name_in_next_version.set(map.next_value()?),
            k if is_directive(k, RENAME_TO_TAG) => self.rename_to.set(map.next_value()?),
            k if is_directive(k, RESOURCE_EMBEDDED_IN_PARENT_TAG) => self.resource_embedded_in_parent.set(map.next_value()?),
            k if is_directive(k, SUPPORTED_FROM_TAG) => self.supported_from.set(map.next_value()?),
            _ => {
                let property = map.next_value_seed(LevelSeed::<PropertyConfiguration>::new(key.clone(), self.path.clone()))?;
                insert_child(&mut self.properties, key.to_lowercase(), property, &self.path)
            }
        }
    }
}
