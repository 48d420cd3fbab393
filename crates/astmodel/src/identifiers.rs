//! Identifier naming policy.

use std::sync::Mutex;

use rustc_hash::FxHashMap;

use crate::names::{PropertyName, TypeName, ARM_SUFFIX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// `PascalCase`
    Exported,
    /// `camelCase`
    NotExported,
}

/// Creates identifiers from arbitrary schema names. Results are cached per
/// `(name, visibility)`; the factory is shared by reference across stages.
#[derive(Debug, Default)]
pub struct IdentifierFactory {
    cache: Mutex<FxHashMap<(String, Visibility), String>>,
}

impl IdentifierFactory {
    pub fn new() -> Self { Self::default() }

    pub fn create_identifier(&self, name: &str, visibility: Visibility) -> String {
        let key = (name.to_string(), visibility);
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return hit.clone();
            }
        }
        let id = build_identifier(name, visibility);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, id.clone());
        }
        id
    }

    pub fn create_property_name(&self, name: &str, visibility: Visibility) -> PropertyName {
        PropertyName::new(self.create_identifier(name, visibility))
    }

    /// Name of the wire twin of `name`, in the same package.
    pub fn create_arm_type_name(&self, name: &TypeName) -> TypeName {
        name.with_name(format!("{}{ARM_SUFFIX}", name.name()))
    }
}

fn build_identifier(name: &str, visibility: Visibility) -> String {
    let mut out = String::with_capacity(name.len());
    for word in name.split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace()).filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if visibility == Visibility::NotExported {
        let mut chars = out.chars();
        if let Some(first) = chars.next() {
            return first.to_lowercase().chain(chars).collect();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::PackageReference;

    #[test]
    fn identifiers_follow_visibility() {
        let f = IdentifierFactory::new();
        assert_eq!(f.create_identifier("named-value", Visibility::Exported), "NamedValue");
        assert_eq!(f.create_identifier("named_value.contract", Visibility::NotExported), "namedValueContract");
        assert_eq!(f.create_identifier("keyVault", Visibility::Exported), "KeyVault");
        assert_eq!(f.create_identifier("KeyVault", Visibility::NotExported), "keyVault");
        assert_eq!(f.create_identifier("  ", Visibility::Exported), "");
        // cached result is stable
        assert_eq!(f.create_identifier("named-value", Visibility::Exported), "NamedValue");
    }

    #[test]
    fn arm_names_stay_in_package() {
        let f = IdentifierFactory::new();
        let name = TypeName::new(PackageReference::local("g", "v1api20220801"), "NamedValue_Spec");
        let arm = f.create_arm_type_name(&name);
        assert_eq!(arm.name(), "NamedValue_Spec_ARM");
        assert_eq!(arm.package(), name.package());
        assert_eq!(f.create_property_name("display_name", Visibility::Exported), "DisplayName");
    }
}
