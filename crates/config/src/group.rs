use std::collections::BTreeMap;

use armgen_astmodel::object::PayloadType;
use serde::de::{self, MapAccess};

use crate::advisor::TypoAdvisor;
use crate::configurable::Configurable;
use crate::error::ConfigError;
use crate::version::{normalize_version, VersionConfiguration};
use crate::yaml::{child_path, insert_child, is_directive, ConfigLevel, LevelSeed};
use crate::{UnusedEntry, PAYLOAD_TYPE_TAG};

/// Configuration for one API group, e.g. `apimanagement`.
#[derive(Debug)]
pub struct GroupConfiguration {
    name: String,
    path: String,
    versions: BTreeMap<String, VersionConfiguration>,
    advisor: TypoAdvisor,
    pub(crate) payload_type: Configurable<PayloadType>,
}

impl GroupConfiguration {
    pub fn name(&self) -> &str { &self.name }
    pub fn versions(&self) -> impl Iterator<Item = &VersionConfiguration> { self.versions.values() }

    /// Finds a version by package version (`v1api20220801`) or API date form (`2022-08-01`).
    pub(crate) fn find_version(&self, version: &str) -> Result<&VersionConfiguration, ConfigError> {
        let key = normalize_version(version);
        self.advisor.add_term(version);
        self.advisor.add_term(&key);
        self.versions.get(&key).ok_or_else(|| {
            ConfigError::not_configured(format!("configuration of group {} has no detail for version {version}", self.path))
                .with_options("versions", self.versions.values().map(|v| v.name().to_string()))
        })
    }

    pub(crate) fn collect_unused(&self, out: &mut Vec<UnusedEntry>) {
        out.extend(self.payload_type.unused_message().map(UnusedEntry::new));
        for version in self.versions.values() {
            let mut entries = Vec::new();
            version.collect_unused(&mut entries);
            let note = match self.advisor.has_seen(&normalize_version(version.name())) {
                true => None,
                false => self.advisor.not_seen_note("version", version.name()),
            };
            out.extend(entries.into_iter().map(|e| e.noted(note.clone())));
        }
    }
}

impl ConfigLevel for GroupConfiguration {
    const KIND: &'static str = "group";
    const DIRECTIVES: &'static [&'static str] = &[PAYLOAD_TYPE_TAG];

    fn name(&self) -> &str { &self.name }

    fn named(name: &str, parent: &str) -> Self {
        let path = child_path(parent, name);
        Self {
            name: name.to_string(),
            versions: BTreeMap::new(),
            advisor: TypoAdvisor::default(),
            payload_type: Configurable::new(PAYLOAD_TYPE_TAG, format!("group {path}")),
            path,
        }
    }

    fn accept<'de, A: MapAccess<'de>>(&mut self, key: String, map: &mut A) -> Result<(), A::Error> {
        if is_directive(&key, PAYLOAD_TYPE_TAG) {
            let raw: String = map.next_value()?;
            let payload = raw.parse::<PayloadType>().map_err(|e| <A::Error as de::Error>::custom(format!("{PAYLOAD_TYPE_TAG}: {e}")))?;
            self.payload_type.set(payload)
        } else {
            let version = map.next_value_seed(LevelSeed::<VersionConfiguration>::new(key.clone(), self.path.clone()))?;
            insert_child(&mut self.versions, normalize_version(&key), version, &self.path)
        }
    }
}
