//! Resource types: a spec, an optional status, ownership and deployment metadata.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::names::TypeName;
use crate::types::Type;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceScope {
    #[default]
    ResourceGroup,
    /// Attaches to any other resource; the owner kind is unconstrained.
    Extension,
    Tenant,
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceOperation {
    Get,
    Put,
    Patch,
    Delete,
    Head,
    List,
}

fn default_true() -> bool { true }
fn is_true(b: &bool) -> bool { *b }
fn is_false(b: &bool) -> bool { !*b }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceType {
    spec: Box<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<Box<Type>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner: Option<TypeName>,
    #[serde(default)]
    scope: ResourceScope,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    operations: BTreeSet<ResourceOperation>,
    /// Remote resource type, e.g. `Microsoft.ApiManagement/service/namedValues`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arm_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supported_from: Option<String>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    importable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    embedded_in_parent: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    storage_version: bool,
}

impl ResourceType {
    pub fn new(spec: Type, status: Option<Type>) -> Self {
        Self {
            spec: Box::new(spec),
            status: status.map(Box::new),
            owner: None,
            scope: ResourceScope::default(),
            operations: BTreeSet::new(),
            arm_type: None,
            api_version: None,
            supported_from: None,
            importable: true,
            embedded_in_parent: None,
            storage_version: false,
        }
    }

    pub fn spec(&self) -> &Type { &self.spec }
    pub fn status(&self) -> Option<&Type> { self.status.as_deref() }
    pub fn owner(&self) -> Option<&TypeName> { self.owner.as_ref() }
    pub fn scope(&self) -> ResourceScope { self.scope }
    pub fn operations(&self) -> &BTreeSet<ResourceOperation> { &self.operations }
    pub fn arm_type(&self) -> Option<&str> { self.arm_type.as_deref() }
    pub fn api_version(&self) -> Option<&str> { self.api_version.as_deref() }
    pub fn supported_from(&self) -> Option<&str> { self.supported_from.as_deref() }
    pub fn is_importable(&self) -> bool { self.importable }
    pub fn embedded_in_parent(&self) -> Option<&str> { self.embedded_in_parent.as_deref() }
    pub fn is_storage_version(&self) -> bool { self.storage_version }

    pub fn with_spec(self, spec: Type) -> Self { Self { spec: Box::new(spec), ..self } }
    pub fn with_status(self, status: Type) -> Self { Self { status: Some(Box::new(status)), ..self } }
    pub fn without_status(self) -> Self { Self { status: None, ..self } }
    pub fn with_owner(self, owner: TypeName) -> Self { Self { owner: Some(owner), ..self } }
    pub fn without_owner(self) -> Self { Self { owner: None, ..self } }
    pub fn with_scope(self, scope: ResourceScope) -> Self { Self { scope, ..self } }

    pub fn with_operations(self, ops: impl IntoIterator<Item = ResourceOperation>) -> Self {
        Self { operations: ops.into_iter().collect(), ..self }
    }

    pub fn with_arm_type(self, arm_type: impl Into<String>) -> Self { Self { arm_type: Some(arm_type.into()), ..self } }
    pub fn with_api_version(self, v: impl Into<String>) -> Self { Self { api_version: Some(v.into()), ..self } }
    pub fn with_supported_from(self, v: impl Into<String>) -> Self { Self { supported_from: Some(v.into()), ..self } }
    pub fn with_importable(self, importable: bool) -> Self { Self { importable, ..self } }
    pub fn with_embedded_in_parent(self, parent: impl Into<String>) -> Self {
        Self { embedded_in_parent: Some(parent.into()), ..self }
    }
    pub fn mark_storage_version(self) -> Self { Self { storage_version: true, ..self } }

    /// Spec type name, when the spec is a plain reference.
    pub fn spec_name(&self) -> Option<&TypeName> { self.spec.as_name() }

    /// Status type name, when the status is a plain reference.
    pub fn status_name(&self) -> Option<&TypeName> { self.status.as_deref().and_then(Type::as_name) }
}
