//! The closed `Type` union and its small leaf shapes.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::names::TypeName;
use crate::object::{Capability, ObjectType};
use crate::property::PropertyDefinition;
use crate::resource::ResourceType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "camelCase")]
pub enum Type {
    /// Reference to another definition in the set.
    Name(TypeName),
    Object(ObjectType),
    Resource(ResourceType),
    Enum(EnumType),
    Map(MapType),
    Array(Box<Type>),
    Optional(Box<Type>),
    Primitive(PrimitiveType),
    Flagged(FlaggedType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Int,
    Float,
    Bool,
    Any,
}

impl PrimitiveType {
    fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Any => "any",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapType {
    pub key: Box<Type>,
    pub value: Box<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub identifier: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub base: PrimitiveType,
    pub values: Vec<EnumValue>,
}

impl EnumType {
    pub fn new(base: PrimitiveType, values: impl IntoIterator<Item = EnumValue>) -> Self {
        Self { base, values: values.into_iter().collect() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeFlag {
    /// Wire-shaped twin of a Kubernetes-facing type.
    Arm,
    /// Storage (hub) variant.
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedType {
    element: Box<Type>,
    flags: BTreeSet<TypeFlag>,
}

impl FlaggedType {
    pub fn element(&self) -> &Type { &self.element }
    pub fn flags(&self) -> &BTreeSet<TypeFlag> { &self.flags }
    pub fn has_flag(&self, flag: TypeFlag) -> bool { self.flags.contains(&flag) }

    pub fn with_element(&self, element: Type) -> Self {
        Self { element: Box::new(element), flags: self.flags.clone() }
    }
}

impl Type {
    pub fn string() -> Self { Type::Primitive(PrimitiveType::String) }
    pub fn int() -> Self { Type::Primitive(PrimitiveType::Int) }
    pub fn bool() -> Self { Type::Primitive(PrimitiveType::Bool) }
    pub fn name(name: TypeName) -> Self { Type::Name(name) }
    pub fn array(element: Type) -> Self { Type::Array(Box::new(element)) }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map(MapType { key: Box::new(key), value: Box::new(value) })
    }

    /// Wraps in `Optional`, never producing a doubly optional type.
    pub fn optional(inner: Type) -> Self {
        match inner {
            Type::Optional(_) => inner,
            other => Type::Optional(Box::new(other)),
        }
    }

    /// Adds `flag`, merging into an existing flag set rather than nesting.
    pub fn flagged(inner: Type, flag: TypeFlag) -> Self {
        match inner {
            Type::Flagged(mut f) => {
                f.flags.insert(flag);
                Type::Flagged(f)
            }
            other => Type::Flagged(FlaggedType { element: Box::new(other), flags: BTreeSet::from([flag]) }),
        }
    }

    /// Removes `flag`; drops the wrapper once no flags remain.
    pub fn without_flag(&self, flag: TypeFlag) -> Type {
        match self {
            Type::Flagged(f) => {
                let mut flags = f.flags.clone();
                flags.remove(&flag);
                if flags.is_empty() {
                    (*f.element).clone()
                } else {
                    Type::Flagged(FlaggedType { element: f.element.clone(), flags })
                }
            }
            other => other.clone(),
        }
    }

    pub fn has_flag(&self, flag: TypeFlag) -> bool {
        matches!(self, Type::Flagged(f) if f.has_flag(flag))
    }

    /// Object shape, reaching through `Optional` and `Flagged` wrappers.
    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Type::Object(o) => Some(o),
            Type::Optional(inner) => inner.as_object(),
            Type::Flagged(f) => f.element.as_object(),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&ResourceType> {
        match self {
            Type::Resource(r) => Some(r),
            Type::Flagged(f) => f.element.as_resource(),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            Type::Enum(e) => Some(e),
            Type::Flagged(f) => f.element.as_enum(),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&TypeName> {
        match self {
            Type::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Strips one `Optional` layer.
    pub fn unwrap_optional(&self) -> &Type {
        match self {
            Type::Optional(inner) => inner,
            other => other,
        }
    }

    pub fn is_optional(&self) -> bool { matches!(self, Type::Optional(_)) }

    /// Collects every definition name this type refers to directly.
    ///
    /// Resource owners are not followed: ownership is a relationship between
    /// resources, not structural containment.
    pub fn referenced_names(&self, out: &mut BTreeSet<TypeName>) {
        self.referenced_names_where(&|_| true, out)
    }

    /// As [`Type::referenced_names`], skipping object properties rejected by `keep`.
    pub fn referenced_names_where(&self, keep: &dyn Fn(&PropertyDefinition) -> bool, out: &mut BTreeSet<TypeName>) {
        match self {
            Type::Name(n) => {
                out.insert(n.clone());
            }
            Type::Object(o) => {
                for p in o.properties().filter(|p| keep(p)) {
                    p.ty().referenced_names_where(keep, out);
                }
            }
            Type::Resource(r) => {
                r.spec().referenced_names_where(keep, out);
                if let Some(status) = r.status() {
                    status.referenced_names_where(keep, out);
                }
            }
            Type::Map(m) => {
                m.key.referenced_names_where(keep, out);
                m.value.referenced_names_where(keep, out);
            }
            Type::Array(inner) | Type::Optional(inner) => inner.referenced_names_where(keep, out),
            Type::Flagged(f) => f.element.referenced_names_where(keep, out),
            Type::Enum(_) | Type::Primitive(_) => {}
        }
    }

    /// Rewrites every type name this type mentions, including resource owners
    /// and the wire type recorded by a conversion capability.
    pub fn map_names(&self, f: &dyn Fn(&TypeName) -> TypeName) -> Type {
        match self {
            Type::Name(n) => Type::Name(f(n)),
            Type::Object(o) => {
                let props: Vec<_> = o.properties().map(|p| p.clone().with_type(p.ty().map_names(f))).collect();
                let mut out = o.clone().without_properties().with_properties(props);
                if let Some(conv) = o.arm_conversion() {
                    let mut conv = conv.clone();
                    conv.arm_type = f(&conv.arm_type);
                    out = out.with_capability(Capability::ArmConversion(conv));
                }
                Type::Object(out)
            }
            Type::Resource(r) => {
                let mut out = r.clone().with_spec(r.spec().map_names(f));
                if let Some(status) = r.status() {
                    out = out.with_status(status.map_names(f));
                }
                if let Some(owner) = r.owner() {
                    out = out.with_owner(f(owner));
                }
                Type::Resource(out)
            }
            Type::Map(m) => Type::Map(MapType { key: Box::new(m.key.map_names(f)), value: Box::new(m.value.map_names(f)) }),
            Type::Array(inner) => Type::Array(Box::new(inner.map_names(f))),
            Type::Optional(inner) => Type::Optional(Box::new(inner.map_names(f))),
            Type::Flagged(fl) => Type::Flagged(fl.with_element(fl.element.map_names(f))),
            Type::Enum(_) | Type::Primitive(_) => self.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Name(n) => write!(f, "{n}"),
            Type::Object(o) => write!(f, "object({} properties)", o.len()),
            Type::Resource(r) => write!(f, "resource({})", r.spec()),
            Type::Enum(e) => write!(f, "enum({})", e.base.as_str()),
            Type::Map(m) => write!(f, "map[{}]{}", m.key, m.value),
            Type::Array(inner) => write!(f, "[]{inner}"),
            Type::Optional(inner) => write!(f, "*{inner}"),
            Type::Primitive(p) => f.write_str(p.as_str()),
            Type::Flagged(fl) => {
                write!(f, "{}", fl.element)?;
                for flag in &fl.flags {
                    match flag {
                        TypeFlag::Arm => f.write_str("+arm")?,
                        TypeFlag::Storage => f.write_str("+storage")?,
                    }
                }
                Ok(())
            }
        }
    }
}
