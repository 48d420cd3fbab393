use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use armgen_astmodel::names::{PackageReference, PropertyName, TypeName};
use armgen_astmodel::object::PayloadType;
use serde::de::{self, DeserializeSeed, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::advisor::{closest_term, TypoAdvisor};
use crate::error::{ConfigError, ConfigResultExt};
use crate::group::GroupConfiguration;
use crate::property::PropertyConfiguration;
use crate::type_config::TypeConfiguration;
use crate::version::VersionConfiguration;
use crate::yaml::{insert_child, ConfigLevel, LevelSeed};

/// Root of the configuration tree: group → version → type → property.
///
/// Lookups mark the cells they read as consumed and record the names they
/// asked for, so [`ObjectModelConfiguration::verify_consumed`] can report
/// every entry that had no effect, with a suggestion when a name looks like
/// a typo of something that was looked up.
#[derive(Debug, Default)]
pub struct ObjectModelConfiguration {
    groups: BTreeMap<String, GroupConfiguration>,
    advisor: TypoAdvisor,
}

const ROOT_KEY: &str = "objectModelConfiguration";

/// The whole YAML document; `objectModelConfiguration` is the only key it accepts.
struct ConfigDocument(ObjectModelConfiguration);

impl<'de> Deserialize<'de> for ConfigDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = ConfigDocument;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "a mapping with a top-level {ROOT_KEY} key") }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ConfigDocument, A::Error> {
        let mut root = None;
        while let Some(key) = map.next_key::<String>()? {
            if key != ROOT_KEY {
                let mut msg = format!("unknown top-level key {key}");
                match closest_term(&key, [ROOT_KEY]) {
                    Some(s) => msg.push_str(&format!(" (did you mean {s}?)")),
                    None => msg.push_str(&format!(" (expected {ROOT_KEY})")),
                }
                return Err(de::Error::custom(msg));
            }
            if root.is_some() {
                return Err(de::Error::duplicate_field(ROOT_KEY));
            }
            root = Some(map.next_value::<ObjectModelConfiguration>()?);
        }
        Ok(ConfigDocument(root.unwrap_or_default()))
    }
}

/// Entry counts per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    pub groups: usize,
    pub versions: usize,
    pub types: usize,
    pub properties: usize,
}

impl ObjectModelConfiguration {
    /// Parses a configuration document; the tree lives under `objectModelConfiguration`.
    pub fn parse(document: &str) -> Result<Self, ConfigError> {
        if document.trim().is_empty() {
            return Ok(Self::default());
        }
        let doc: ConfigDocument = serde_yaml::from_str(document)?;
        let cfg = doc.0;
        debug!(groups = cfg.groups.len(), "parsed object model configuration");
        Ok(cfg)
    }

    pub fn summary(&self) -> ConfigSummary {
        let mut s = ConfigSummary { groups: self.groups.len(), ..ConfigSummary::default() };
        for v in self.groups.values().flat_map(GroupConfiguration::versions) {
            s.versions += 1;
            for t in v.types() {
                s.types += 1;
                s.properties += t.property_count();
            }
        }
        s
    }

    fn find_group(&self, package: &PackageReference) -> Result<&GroupConfiguration, ConfigError> {
        let group = package
            .group()
            .ok_or_else(|| ConfigError::not_configured(format!("package {package} carries no configuration")))?;
        self.advisor.add_term(group);
        self.groups.get(&group.to_lowercase()).ok_or_else(|| {
            ConfigError::not_configured(format!("no configuration for group {group}"))
                .with_options("groups", self.groups.values().map(|g| g.name().to_string()))
        })
    }

    fn find_version(&self, package: &PackageReference) -> Result<&VersionConfiguration, ConfigError> {
        let version = package
            .version()
            .ok_or_else(|| ConfigError::not_configured(format!("package {package} carries no configuration")))?;
        self.find_group(package)?.find_version(version)
    }

    fn find_type(&self, name: &TypeName) -> Result<&TypeConfiguration, ConfigError> {
        self.find_version(name.package())?.find_type(name.name())
    }

    fn find_property(&self, name: &TypeName, property: &PropertyName) -> Result<&PropertyConfiguration, ConfigError> {
        self.find_type(name)?.find_property(property.as_str())
    }

    pub fn export(&self, name: &TypeName) -> Result<bool, ConfigError> { self.find_type(name)?.export.lookup() }
    pub fn export_as(&self, name: &TypeName) -> Result<String, ConfigError> { self.find_type(name)?.export_as.lookup() }
    pub fn rename_to(&self, name: &TypeName) -> Result<String, ConfigError> { self.find_type(name)?.rename_to.lookup() }
    pub fn is_resource(&self, name: &TypeName) -> Result<bool, ConfigError> { self.find_type(name)?.is_resource.lookup() }
    pub fn importable(&self, name: &TypeName) -> Result<bool, ConfigError> { self.find_type(name)?.importable.lookup() }
    pub fn supported_from(&self, name: &TypeName) -> Result<String, ConfigError> { self.find_type(name)?.supported_from.lookup() }

    pub fn name_in_next_version(&self, name: &TypeName) -> Result<String, ConfigError> {
        self.find_type(name)?.name_in_next_version.lookup()
    }

    pub fn resource_embedded_in_parent(&self, name: &TypeName) -> Result<String, ConfigError> {
        self.find_type(name)?.resource_embedded_in_parent.lookup()
    }

    pub fn default_azure_name(&self, name: &TypeName) -> Result<bool, ConfigError> {
        self.find_type(name)?.default_azure_name.lookup()
    }

    pub fn azure_generated_secrets(&self, name: &TypeName) -> Result<Vec<String>, ConfigError> {
        self.find_type(name)?.azure_generated_secrets.lookup()
    }

    pub fn manual_configs(&self, name: &TypeName) -> Result<Vec<String>, ConfigError> {
        self.find_type(name)?.manual_configs.lookup()
    }

    pub fn generated_configs(&self, name: &TypeName) -> Result<BTreeMap<String, String>, ConfigError> {
        self.find_type(name)?.generated_configs.lookup()
    }

    pub fn property_rename_to(&self, name: &TypeName, property: &PropertyName) -> Result<String, ConfigError> {
        self.find_property(name, property)?.rename_to.lookup()
    }

    pub fn property_name_in_next_version(&self, name: &TypeName, property: &PropertyName) -> Result<String, ConfigError> {
        self.find_property(name, property)?.name_in_next_version.lookup()
    }

    /// Payload policy for a package; the version level overrides the group level.
    pub fn payload_type(&self, package: &PackageReference) -> Result<PayloadType, ConfigError> {
        let group = self.find_group(package)?;
        let group_level = group.payload_type.lookup();
        let version_level = match package.version() {
            Some(v) => group.find_version(v).and_then(|ver| ver.payload_type.lookup()).optional()?,
            None => None,
        };
        match version_level {
            Some(payload) => Ok(payload),
            None => group_level,
        }
    }

    /// Fails with every configured value that no lookup consumed.
    pub fn verify_consumed(&self) -> Result<(), ConfigError> {
        let mut entries = Vec::new();
        for group in self.groups.values() {
            let mut inner = Vec::new();
            group.collect_unused(&mut inner);
            let note = self.advisor.not_seen_note("group", group.name());
            entries.extend(inner.into_iter().map(|e| e.noted(note.clone())));
        }
        let mut errs: Vec<ConfigError> = entries.into_iter().map(|e| ConfigError::Unused(e.render())).collect();
        match errs.len() {
            0 => Ok(()),
            1 => Err(errs.remove(0)),
            _ => Err(ConfigError::Aggregate(errs)),
        }
    }
}

impl ConfigLevel for ObjectModelConfiguration {
    const KIND: &'static str = "object model";
    const DIRECTIVES: &'static [&'static str] = &[];

    fn named(_name: &str, _parent: &str) -> Self { Self::default() }

    fn name(&self) -> &str { ROOT_KEY }

    fn accept<'de, A: MapAccess<'de>>(&mut self, key: String, map: &mut A) -> Result<(), A::Error> {
        let group = map.next_value_seed(LevelSeed::<GroupConfiguration>::new(key.clone(), ""))?;
        insert_child(&mut self.groups, key.to_lowercase(), group, "")
    }
}

impl<'de> Deserialize<'de> for ObjectModelConfiguration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        LevelSeed::<Self>::new(ROOT_KEY, "").deserialize(deserializer)
    }
}

impl FromStr for ObjectModelConfiguration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}
