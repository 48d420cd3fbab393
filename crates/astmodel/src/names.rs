//! Package references, type names and property names.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Suffix appended to a package group to form the Kubernetes API group.
pub const GROUP_SUFFIX: &str = ".azure.com";

/// Suffix distinguishing the wire-shaped twin of a type.
pub const ARM_SUFFIX: &str = "_ARM";

/// Package of support types shared by all generated resources.
pub const RUNTIME_PACKAGE: &str = "genruntime";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PackageReference {
    /// An API version package, e.g. `apimanagement/v1api20220801`.
    Local { group: String, version: String },
    /// The storage (hub) variant of a local package.
    Storage { group: String, version: String },
    /// Support library package.
    Runtime,
}

impl PackageReference {
    pub fn local(group: impl Into<String>, version: impl Into<String>) -> Self {
        Self::Local { group: group.into(), version: version.into() }
    }

    pub fn storage(group: impl Into<String>, version: impl Into<String>) -> Self {
        Self::Storage { group: group.into(), version: version.into() }
    }

    pub fn group(&self) -> Option<&str> {
        match self {
            Self::Local { group, .. } | Self::Storage { group, .. } => Some(group),
            Self::Runtime => None,
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Local { version, .. } | Self::Storage { version, .. } => Some(version),
            Self::Runtime => None,
        }
    }

    pub fn is_local(&self) -> bool { matches!(self, Self::Local { .. }) }
    pub fn is_storage(&self) -> bool { matches!(self, Self::Storage { .. }) }
    pub fn is_runtime(&self) -> bool { matches!(self, Self::Runtime) }

    /// Storage variant of a local package; storage and runtime packages map to themselves.
    pub fn to_storage(&self) -> Self {
        match self {
            Self::Local { group, version } => Self::storage(group.clone(), version.clone()),
            other => other.clone(),
        }
    }

    /// Kubernetes API group, e.g. `apimanagement.azure.com`.
    pub fn kubernetes_group(&self) -> Option<String> {
        self.group().map(|g| format!("{g}{GROUP_SUFFIX}"))
    }

    /// Parsed API version, when the version follows the `v1api<yyyymmdd>[preview]` convention.
    pub fn api_version(&self) -> Option<ApiVersion> {
        self.version().and_then(ApiVersion::parse)
    }

    /// True when both references name packages of the same group.
    pub fn same_group(&self, other: &PackageReference) -> bool {
        match (self.group(), other.group()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { group, version } => write!(f, "{group}/{version}"),
            Self::Storage { group, version } => write!(f, "{group}/{version}/storage"),
            Self::Runtime => f.write_str(RUNTIME_PACKAGE),
        }
    }
}

static API_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v1(?:alpha1api|beta|api)?(\d{4})(\d{2})(\d{2})(preview)?$").expect("api version pattern")
});

/// Date-based API version carried by a package version such as `v1api20220120preview`.
///
/// Ordering follows release order: earlier dates first, and for the same date the
/// preview sorts before the stable release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApiVersion {
    year: u16,
    month: u8,
    day: u8,
    stable: bool,
}

impl ApiVersion {
    pub fn parse(version: &str) -> Option<Self> {
        let caps = API_VERSION_RE.captures(version)?;
        Some(Self {
            year: caps.get(1)?.as_str().parse().ok()?,
            month: caps.get(2)?.as_str().parse().ok()?,
            day: caps.get(3)?.as_str().parse().ok()?,
            stable: caps.get(4).is_none(),
        })
    }

    pub fn is_preview(&self) -> bool { !self.stable }

    /// The form used by the remote API, e.g. `2022-01-20-preview`.
    pub fn date_form(&self) -> String {
        let base = format!("{:04}-{:02}-{:02}", self.year, self.month, self.day);
        if self.stable { base } else { format!("{base}-preview") }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.date_form()) }
}

/// Fully qualified name of a type definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeName {
    package: PackageReference,
    name: String,
}

impl TypeName {
    pub fn new(package: PackageReference, name: impl Into<String>) -> Self {
        Self { package, name: name.into() }
    }

    pub fn runtime(name: &str) -> Self { Self::new(PackageReference::Runtime, name) }

    pub fn package(&self) -> &PackageReference { &self.package }
    pub fn name(&self) -> &str { &self.name }

    pub fn with_name(&self, name: impl Into<String>) -> Self { Self::new(self.package.clone(), name) }
    pub fn with_package(&self, package: PackageReference) -> Self { Self::new(package, self.name.clone()) }

    /// Status types carry a `_STATUS` suffix (older sources use `_Status`).
    pub fn is_status(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with("_status")
    }

    pub fn is_spec(&self) -> bool { self.name.ends_with("_Spec") }

    pub fn is_arm(&self) -> bool { self.name.ends_with(ARM_SUFFIX) }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}/{}", self.package, self.name) }
}

/// Well known support types referenced by generated code.
pub mod runtime {
    use super::TypeName;

    pub fn known_resource_reference() -> TypeName { TypeName::runtime("KnownResourceReference") }
    pub fn arbitrary_owner_reference() -> TypeName { TypeName::runtime("ArbitraryOwnerReference") }
    pub fn property_bag() -> TypeName { TypeName::runtime("PropertyBag") }
    pub fn secret_destination() -> TypeName { TypeName::runtime("SecretDestination") }
    pub fn config_map_destination() -> TypeName { TypeName::runtime("ConfigMapDestination") }
}

/// Name of a property on an object type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyName(String);

impl PropertyName {
    pub const NAME: &'static str = "Name";
    pub const AZURE_NAME: &'static str = "AzureName";
    pub const OWNER: &'static str = "Owner";
    pub const OPERATOR_SPEC: &'static str = "OperatorSpec";
    pub const PROPERTY_BAG: &'static str = "PropertyBag";

    pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for PropertyName {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

impl From<String> for PropertyName {
    fn from(s: String) -> Self { Self(s) }
}

impl PartialEq<str> for PropertyName {
    fn eq(&self, other: &str) -> bool { self.0 == other }
}

impl PartialEq<&str> for PropertyName {
    fn eq(&self, other: &&str) -> bool { self.0 == *other }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_are_detected_case_insensitively() {
        let pkg = PackageReference::local("apimanagement", "v1api20220801");
        assert!(TypeName::new(pkg.clone(), "Service_NamedValue_STATUS").is_status());
        assert!(TypeName::new(pkg.clone(), "NamedValue_Status").is_status());
        assert!(!TypeName::new(pkg.clone(), "Service_NamedValue_Spec").is_status());
        assert!(!TypeName::new(pkg, "Status").is_status());
    }

    #[test]
    fn api_versions_order_previews_before_stable() {
        let ga = ApiVersion::parse("v1api20220801").unwrap();
        let preview = ApiVersion::parse("v1api20220801preview").unwrap();
        let older = ApiVersion::parse("v1beta20210101").unwrap();
        assert!(older < preview);
        assert!(preview < ga);
        assert_eq!(preview.date_form(), "2022-08-01-preview");
        assert_eq!(ApiVersion::parse("v1alpha1api20210601").unwrap().date_form(), "2021-06-01");
        assert!(ApiVersion::parse("storage").is_none());
    }

    #[test]
    fn display_includes_package() {
        let name = TypeName::new(PackageReference::storage("apimanagement", "v1api20220801"), "NamedValue");
        assert_eq!(name.to_string(), "apimanagement/v1api20220801/storage/NamedValue");
        assert_eq!(name.package().kubernetes_group().as_deref(), Some("apimanagement.azure.com"));
    }
}
