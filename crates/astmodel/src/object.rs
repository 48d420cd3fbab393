//! Object types, their capabilities and validation rules.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::names::TypeName;
use crate::property::PropertyDefinition;

/// An object with ordered, name-unique properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectType {
    #[serde(default)]
    properties: Vec<PropertyDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    capabilities: Vec<Capability>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    validations: Vec<ValidationRule>,
}

impl ObjectType {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.properties.len() }
    pub fn is_empty(&self) -> bool { self.properties.is_empty() }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyDefinition> { self.properties.iter() }

    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn property_by_json(&self, json_name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.json_name() == json_name)
    }

    pub fn has_property(&self, name: &str) -> bool { self.property(name).is_some() }

    /// Adds `property`, replacing in place any property with the same name.
    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        match self.properties.iter_mut().find(|p| p.name() == property.name()) {
            Some(slot) => *slot = property,
            None => self.properties.push(property),
        }
        self
    }

    pub fn with_properties(self, properties: impl IntoIterator<Item = PropertyDefinition>) -> Self {
        properties.into_iter().fold(self, |acc, p| acc.with_property(p))
    }

    pub fn without_property(mut self, name: &str) -> Self {
        self.properties.retain(|p| p.name() != name);
        self
    }

    pub fn without_properties(self) -> Self {
        Self { properties: Vec::new(), ..self }
    }

    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> { self.capabilities.iter() }

    /// Attaches `capability`, replacing an existing capability of the same kind.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        match self.capabilities.iter_mut().find(|c| c.kind() == capability.kind()) {
            Some(slot) => *slot = capability,
            None => self.capabilities.push(capability),
        }
        self
    }

    pub fn without_capability(mut self, kind: CapabilityKind) -> Self {
        self.capabilities.retain(|c| c.kind() != kind);
        self
    }

    pub fn without_capabilities(self) -> Self {
        Self { capabilities: Vec::new(), ..self }
    }

    pub fn has_capability(&self, kind: CapabilityKind) -> bool {
        self.capabilities.iter().any(|c| c.kind() == kind)
    }

    pub fn arm_conversion(&self) -> Option<&ArmConversion> {
        self.capabilities.iter().find_map(|c| match c {
            Capability::ArmConversion(conv) => Some(conv),
            _ => None,
        })
    }

    pub fn validations(&self) -> &[ValidationRule] { &self.validations }

    pub fn with_validation(mut self, rule: ValidationRule) -> Self {
        if !self.validations.contains(&rule) {
            self.validations.push(rule);
        }
        self
    }

    pub fn without_validations(self) -> Self {
        Self { validations: Vec::new(), ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "capability", rename_all = "camelCase")]
pub enum Capability {
    /// Two-way conversion to and from the wire twin.
    ArmConversion(ArmConversion),
    /// AzureName may be defaulted from the Kubernetes object name.
    AzureNameDefaulter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    ArmConversion,
    AzureNameDefaulter,
}

impl Capability {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Capability::ArmConversion(_) => CapabilityKind::ArmConversion,
            Capability::AzureNameDefaulter => CapabilityKind::AzureNameDefaulter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmConversion {
    pub arm_type: TypeName,
    pub kind: ConversionKind,
    pub payload: PayloadType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversionKind {
    Spec,
    Status,
    Ordinary,
}

/// How empty collections are rendered in wire payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PayloadType {
    /// Empty collections are omitted.
    #[default]
    OmitEmpty,
    /// Empty collections are sent explicitly.
    ExplicitCollections,
}

impl FromStr for PayloadType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "omitempty" | "omit-empty" => Ok(PayloadType::OmitEmpty),
            "explicitcollections" | "explicit-collections" | "preserve-empty-collections" => {
                Ok(PayloadType::ExplicitCollections)
            }
            other => Err(format!("unknown payload type {other:?}, expected omitempty or explicitcollections")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "value", rename_all = "camelCase")]
pub enum ValidationRule {
    Pattern(String),
    MinLength(u64),
    MaxLength(u64),
    MinItems(u64),
    MaxItems(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    fn prop(name: &str) -> PropertyDefinition { PropertyDefinition::new(name, name.to_lowercase(), Type::string()) }

    #[test]
    fn with_property_replaces_in_place() {
        let o = ObjectType::new().with_property(prop("A")).with_property(prop("B"));
        let o = o.with_property(prop("A").make_required());
        let names: Vec<_> = o.properties().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(o.property("A").unwrap().is_required());
        assert!(o.without_property("A").property("A").is_none());
    }

    #[test]
    fn capabilities_replace_by_kind() {
        let arm = TypeName::runtime("X_ARM");
        let conv = |kind| Capability::ArmConversion(ArmConversion { arm_type: arm.clone(), kind, payload: PayloadType::OmitEmpty });
        let o = ObjectType::new().with_capability(conv(ConversionKind::Spec)).with_capability(Capability::AzureNameDefaulter);
        let o = o.with_capability(conv(ConversionKind::Status));
        assert_eq!(o.capabilities().count(), 2);
        assert_eq!(o.arm_conversion().unwrap().kind, ConversionKind::Status);
        assert!(o.has_capability(CapabilityKind::ArmConversion));
        let o = o.without_capability(CapabilityKind::ArmConversion);
        assert!(o.arm_conversion().is_none());
        assert!(o.has_capability(CapabilityKind::AzureNameDefaulter));
    }

    #[test]
    fn payload_type_parses_aliases() {
        assert_eq!("OmitEmpty".parse::<PayloadType>().unwrap(), PayloadType::OmitEmpty);
        assert_eq!("explicitCollections".parse::<PayloadType>().unwrap(), PayloadType::ExplicitCollections);
        assert!("sometimes".parse::<PayloadType>().is_err());
    }
}
