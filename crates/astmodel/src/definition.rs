//! Named type definitions and object transforms over them.

use serde::{Deserialize, Serialize};

use crate::names::TypeName;
use crate::object::ObjectType;
use crate::types::Type;
use crate::ModelError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    name: TypeName,
    #[serde(rename = "type")]
    ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl TypeDefinition {
    pub fn new(name: TypeName, ty: Type) -> Self { Self { name, ty, description: None } }

    pub fn name(&self) -> &TypeName { &self.name }
    pub fn ty(&self) -> &Type { &self.ty }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }

    pub fn with_name(self, name: TypeName) -> Self { Self { name, ..self } }
    pub fn with_type(self, ty: Type) -> Self { Self { ty, ..self } }
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self { description: Some(description.into()), ..self }
    }

    /// Applies `f` to the object underneath any `Optional`/`Flagged` wrappers,
    /// keeping the wrappers in place.
    pub fn apply_object_transformation<E, F>(&self, f: F) -> Result<TypeDefinition, E>
    where
        F: FnOnce(&ObjectType) -> Result<ObjectType, E>,
        E: From<ModelError>,
    {
        match transform_object(&self.ty, f) {
            Some(result) => Ok(self.clone().with_type(result?)),
            None => Err(ModelError::NotObject { name: self.name.clone(), found: self.ty.to_string() }.into()),
        }
    }

    pub fn apply_object_transformations<E>(
        &self,
        fs: &[&dyn Fn(&ObjectType) -> Result<ObjectType, E>],
    ) -> Result<TypeDefinition, E>
    where
        E: From<ModelError>,
    {
        let mut def = self.clone();
        for f in fs {
            def = def.apply_object_transformation(|o| f(o))?;
        }
        Ok(def)
    }
}

fn transform_object<E, F>(ty: &Type, f: F) -> Option<Result<Type, E>>
where
    F: FnOnce(&ObjectType) -> Result<ObjectType, E>,
{
    match ty {
        Type::Object(o) => Some(f(o).map(Type::Object)),
        Type::Optional(inner) => transform_object(inner, f).map(|r| r.map(Type::optional)),
        Type::Flagged(fl) => transform_object(fl.element(), f).map(|r| r.map(|t| Type::Flagged(fl.with_element(t)))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::PackageReference;
    use crate::property::PropertyDefinition;
    use crate::types::TypeFlag;

    fn def(ty: Type) -> TypeDefinition {
        TypeDefinition::new(TypeName::new(PackageReference::local("g", "v1api20220801"), "Thing"), ty)
    }

    #[test]
    fn transformation_reaches_through_wrappers() {
        let d = def(Type::flagged(Type::Object(ObjectType::new()), TypeFlag::Arm));
        let out = d
            .apply_object_transformation::<ModelError, _>(|o| Ok(o.clone().with_property(PropertyDefinition::new("A", "a", Type::string()))))
            .unwrap();
        assert!(out.ty().has_flag(TypeFlag::Arm));
        assert!(out.ty().as_object().unwrap().has_property("A"));
    }

    #[test]
    fn transformation_of_non_object_names_the_definition() {
        let err = def(Type::string()).apply_object_transformation::<ModelError, _>(|o| Ok(o.clone())).unwrap_err();
        assert!(err.to_string().contains("g/v1api20220801/Thing"), "{err}");
    }

    #[test]
    fn transformations_apply_in_order() {
        let add = |o: &ObjectType| -> Result<ObjectType, ModelError> { Ok(o.clone().with_property(PropertyDefinition::new("A", "a", Type::string()))) };
        let req = |o: &ObjectType| -> Result<ObjectType, ModelError> {
            let p = o.property("A").cloned().ok_or_else(|| ModelError::UnexpectedType { context: "A".into(), found: "missing".into() })?;
            Ok(o.clone().with_property(p.make_required()))
        };
        let out = def(Type::Object(ObjectType::new())).apply_object_transformations(&[&add, &req]).unwrap();
        assert!(out.ty().as_object().unwrap().property("A").unwrap().is_required());
    }
}
