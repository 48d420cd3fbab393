//! Armgen type model: packages, names, the closed `Type` union, definitions and
//! the definition set threaded through the generation pipeline.

#![forbid(unsafe_code)]

pub mod definition;
pub mod identifiers;
pub mod names;
pub mod object;
pub mod property;
pub mod resource;
pub mod set;
pub mod types;

use thiserror::Error;

use crate::names::TypeName;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("definition {0} already exists with a different shape")]
    DuplicateDefinition(TypeName),
    #[error("expected {name} to be an object type, found {found}")]
    NotObject { name: TypeName, found: String },
    #[error("definition {0} not found")]
    MissingDefinition(TypeName),
    #[error("unexpected type for {context}: {found}")]
    UnexpectedType { context: String, found: String },
}

pub mod prelude {
    pub use super::definition::TypeDefinition;
    pub use super::identifiers::{IdentifierFactory, Visibility};
    pub use super::names::{runtime, ApiVersion, PackageReference, PropertyName, TypeName, ARM_SUFFIX, GROUP_SUFFIX};
    pub use super::object::{ArmConversion, Capability, CapabilityKind, ConversionKind, ObjectType, PayloadType, ValidationRule};
    pub use super::property::{PropertyDefinition, KUBERNETES_ONLY_TAG, OWNER_GROUP_TAG, OWNER_KIND_TAG};
    pub use super::resource::{ResourceOperation, ResourceScope, ResourceType};
    pub use super::set::TypeDefinitionSet;
    pub use super::types::{EnumType, EnumValue, FlaggedType, MapType, PrimitiveType, Type, TypeFlag};
    pub use super::ModelError;
}
