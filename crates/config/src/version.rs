use std::collections::BTreeMap;

use armgen_astmodel::names::ApiVersion;
use armgen_astmodel::object::PayloadType;
use serde::de::{self, MapAccess};

use crate::advisor::TypoAdvisor;
use crate::configurable::Configurable;
use crate::error::ConfigError;
use crate::type_config::TypeConfiguration;
use crate::yaml::{child_path, insert_child, is_directive, ConfigLevel, LevelSeed};
use crate::{UnusedEntry, PAYLOAD_TYPE_TAG};

/// Configuration for one API version of a group.
#[derive(Debug)]
pub struct VersionConfiguration {
    name: String,
    path: String,
    types: BTreeMap<String, TypeConfiguration>,
    advisor: TypoAdvisor,
    pub(crate) payload_type: Configurable<PayloadType>,
}

/// Key under which a version is stored: `v1api20220801`, `v1beta20220801` and
/// `2022-08-01` all normalise to `2022-08-01`.
pub(crate) fn normalize_version(version: &str) -> String {
    let lowered = version.to_lowercase();
    ApiVersion::parse(&lowered).map(|v| v.date_form()).unwrap_or(lowered)
}

impl VersionConfiguration {
    pub fn name(&self) -> &str { &self.name }
    pub fn types(&self) -> impl Iterator<Item = &TypeConfiguration> { self.types.values() }

    pub(crate) fn find_type(&self, name: &str) -> Result<&TypeConfiguration, ConfigError> {
        self.advisor.add_term(name);
        self.types.get(&name.to_lowercase()).ok_or_else(|| {
            ConfigError::not_configured(format!("configuration of version {} has no detail for type {name}", self.path))
                .with_options("types", self.types.values().map(|t| t.name().to_string()))
        })
    }

    pub(crate) fn collect_unused(&self, out: &mut Vec<UnusedEntry>) {
        out.extend(self.payload_type.unused_message().map(UnusedEntry::new));
        for ty in self.types.values() {
            let mut entries = Vec::new();
            ty.collect_unused(&mut entries);
            let note = self.advisor.not_seen_note("type", ty.name());
            out.extend(entries.into_iter().map(|e| e.noted(note.clone())));
        }
    }
}

impl ConfigLevel for VersionConfiguration {
    const KIND: &'static str = "version";
    const DIRECTIVES: &'static [&'static str] = &[PAYLOAD_TYPE_TAG];

    fn name(&self) -> &str { &self.name }

    fn named(name: &str, parent: &str) -> Self {
        let path = child_path(parent, name);
        Self {
            name: name.to_string(),
            types: BTreeMap::new(),
            advisor: TypoAdvisor::default(),
            payload_type: Configurable::new(PAYLOAD_TYPE_TAG, format!("version {path}")),
            path,
        }
    }

    fn accept<'de, A: MapAccess<'de>>(&mut self, key: String, map: &mut A) -> Result<(), A::Error> {
        if is_directive(&key, PAYLOAD_TYPE_TAG) {
            let raw: String = map.next_value()?;
            let payload = raw.parse::<PayloadType>().map_err(|e| <A::Error as de::Error>::custom(format!("{PAYLOAD_TYPE_TAG}: {e}")))?;
            self.payload_type.set(payload)
        } else {
            let ty = map.next_value_seed(LevelSeed::<TypeConfiguration>::new(key.clone(), self.path.clone()))?;
            insert_child(&mut self.types, key.to_lowercase(), ty, &self.path)
        }
    }
}
