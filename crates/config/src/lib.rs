//! Armgen configuration overlay: a YAML tree of per-group, per-version,
//! per-type and per-property directives that supplements the ingested schema.
//! Every directive read is tracked so that unused (usually misspelled)
//! configuration fails the run instead of being silently ignored.

#![forbid(unsafe_code)]

mod advisor;
pub mod configurable;
pub mod error;
pub mod group;
pub mod object_model;
pub mod property;
pub mod type_config;
pub mod version;
mod yaml;

pub const AZURE_GENERATED_SECRETS_TAG: &str = "$azureGeneratedSecrets";
pub const DEFAULT_AZURE_NAME_TAG: &str = "$defaultAzureName";
pub const EXPORT_TAG: &str = "$export";
pub const EXPORT_AS_TAG: &str = "$exportAs";
pub const GENERATED_CONFIGS_TAG: &str = "$generatedConfigs";
pub const IMPORTABLE_TAG: &str = "$importable";
pub const IS_RESOURCE_TAG: &str = "$isResource";
pub const MANUAL_CONFIGS_TAG: &str = "$manualConfigs";
pub const NAME_IN_NEXT_VERSION_TAG: &str = "$nameInNextVersion";
pub const PAYLOAD_TYPE_TAG: &str = "$payloadType";
pub const RENAME_TO_TAG: &str = "$renameTo";
pub const RESOURCE_EMBEDDED_IN_PARENT_TAG: &str = "$resourceEmbeddedInParent";
pub const SUPPORTED_FROM_TAG: &str = "$supportedFrom";

/// An unconsumed configuration value, optionally noting the level that was never looked up.
#[derive(Debug)]
pub(crate) struct UnusedEntry {
    message: String,
    note: Option<String>,
}

impl UnusedEntry {
    pub(crate) fn new(message: String) -> Self { Self { message, note: None } }

    /// Outer levels override inner notes: if a type was never looked up, neither were its properties.
    pub(crate) fn noted(self, note: Option<String>) -> Self {
        match note {
            Some(_) => Self { note, ..self },
            None => self,
        }
    }

    pub(crate) fn render(self) -> String {
        match self.note {
            Some(note) => format!("{} ({note})", self.message),
            None => self.message,
        }
    }
}

pub mod prelude {
    pub use super::error::{ConfigError, ConfigResultExt};
    pub use super::object_model::{ConfigSummary, ObjectModelConfiguration};
}

pub use error::{ConfigError, ConfigResultExt};
pub use object_model::{ConfigSummary, ObjectModelConfiguration};
