//! Property definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::names::PropertyName;
use crate::types::Type;

/// Tag holding the Kubernetes group of an owner reference.
pub const OWNER_GROUP_TAG: &str = "group";
/// Tag holding the Kubernetes kind of an owner reference.
pub const OWNER_KIND_TAG: &str = "kind";
/// Marks a property that exists only on the Kubernetes side and never on the wire.
pub const KUBERNETES_ONLY_TAG: &str = "kubernetesOnly";

pub type TagValues = SmallVec<[String; 2]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    name: PropertyName,
    json_name: String,
    #[serde(rename = "type")]
    ty: Type,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    tags: BTreeMap<String, TagValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<PropertyName>, json_name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), json_name: json_name.into(), ty, required: false, tags: BTreeMap::new(), description: None }
    }

    pub fn name(&self) -> &PropertyName { &self.name }
    pub fn json_name(&self) -> &str { &self.json_name }
    pub fn ty(&self) -> &Type { &self.ty }
    pub fn is_required(&self) -> bool { self.required }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn tags(&self) -> &BTreeMap<String, TagValues> { &self.tags }

    pub fn tag(&self, key: &str) -> Option<&[String]> { self.tags.get(key).map(|v| v.as_slice()) }
    pub fn has_tag(&self, key: &str) -> bool { self.tags.contains_key(key) }

    pub fn is_kubernetes_only(&self) -> bool { self.has_tag(KUBERNETES_ONLY_TAG) }

    pub fn with_name(self, name: impl Into<PropertyName>) -> Self {
        Self { name: name.into(), ..self }
    }

    pub fn with_json_name(self, json_name: impl Into<String>) -> Self {
        Self { json_name: json_name.into(), ..self }
    }

    pub fn with_type(self, ty: Type) -> Self {
        Self { ty, ..self }
    }

    /// Appends `value` under `key`; a value already present is not repeated.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        let values = self.tags.entry(key.into()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
        self
    }

    pub fn without_tag(mut self, key: &str) -> Self {
        self.tags.remove(key);
        self
    }

    pub fn make_required(self) -> Self {
        Self { required: true, ..self }
    }

    pub fn make_optional(self) -> Self {
        Self { required: false, ..self }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self { description: Some(description.into()), ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_accumulate_without_duplicates() {
        let p = PropertyDefinition::new("Owner", "owner", Type::string())
            .with_tag(OWNER_GROUP_TAG, "apimanagement.azure.com")
            .with_tag(OWNER_GROUP_TAG, "apimanagement.azure.com")
            .with_tag(OWNER_KIND_TAG, "Service");
        assert_eq!(p.tag(OWNER_GROUP_TAG), Some(&["apimanagement.azure.com".to_string()][..]));
        assert_eq!(p.tag(OWNER_KIND_TAG).map(|v| v.len()), Some(1));
        assert!(!p.without_tag(OWNER_KIND_TAG).has_tag(OWNER_KIND_TAG));
    }

    #[test]
    fn builders_leave_other_fields_alone() {
        let p = PropertyDefinition::new("Name", "name", Type::string()).with_description("resource name").make_required();
        let q = p.with_name("AzureName").with_type(Type::int());
        assert_eq!(q.json_name(), "name");
        assert_eq!(q.description(), Some("resource name"));
        assert!(q.is_required());
        assert!(!q.make_optional().is_required());
    }
}
