//! `TypeDefinitionSet`: the ordered collection every pipeline stage consumes and produces.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::definition::TypeDefinition;
use crate::names::TypeName;
use crate::property::PropertyDefinition;
use crate::resource::ResourceType;
use crate::types::Type;
use crate::ModelError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeDefinitionSet {
    defs: BTreeMap<TypeName, TypeDefinition>,
}

impl TypeDefinitionSet {
    pub fn new() -> Self { Self::default() }

    pub fn from_definitions(defs: impl IntoIterator<Item = TypeDefinition>) -> Result<Self, ModelError> {
        let mut set = Self::new();
        set.add_all(defs)?;
        Ok(set)
    }

    pub fn len(&self) -> usize { self.defs.len() }
    pub fn is_empty(&self) -> bool { self.defs.is_empty() }

    /// Adds `def`; an identical existing definition is accepted, a different one is an error.
    pub fn add(&mut self, def: TypeDefinition) -> Result<(), ModelError> {
        match self.defs.entry(def.name().clone()) {
            Entry::Vacant(slot) => {
                slot.insert(def);
                Ok(())
            }
            Entry::Occupied(existing) if existing.get() == &def => Ok(()),
            Entry::Occupied(existing) => Err(ModelError::DuplicateDefinition(existing.key().clone())),
        }
    }

    pub fn add_all(&mut self, defs: impl IntoIterator<Item = TypeDefinition>) -> Result<(), ModelError> {
        defs.into_iter().try_for_each(|d| self.add(d))
    }

    pub fn add_types(&mut self, other: &TypeDefinitionSet) -> Result<(), ModelError> {
        self.add_all(other.iter().cloned())
    }

    /// Inserts `def`, overwriting any definition of the same name.
    pub fn replace(&mut self, def: TypeDefinition) {
        self.defs.insert(def.name().clone(), def);
    }

    pub fn remove(&mut self, name: &TypeName) -> Option<TypeDefinition> { self.defs.remove(name) }

    pub fn get(&self, name: &TypeName) -> Option<&TypeDefinition> { self.defs.get(name) }

    /// As [`TypeDefinitionSet::get`], failing when the name is not defined.
    pub fn must_get(&self, name: &TypeName) -> Result<&TypeDefinition, ModelError> {
        self.defs.get(name).ok_or_else(|| ModelError::MissingDefinition(name.clone()))
    }

    pub fn contains(&self, name: &TypeName) -> bool { self.defs.contains_key(name) }

    /// Definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDefinition> { self.defs.values() }

    pub fn names(&self) -> impl Iterator<Item = &TypeName> { self.defs.keys() }

    /// Every resource definition paired with its resource shape.
    pub fn resources(&self) -> impl Iterator<Item = (&TypeDefinition, &ResourceType)> {
        self.defs.values().filter_map(|d| d.ty().as_resource().map(|r| (d, r)))
    }

    pub fn filter(&self, mut pred: impl FnMut(&TypeDefinition) -> bool) -> Self {
        Self { defs: self.defs.iter().filter(|(_, d)| pred(d)).map(|(k, d)| (k.clone(), d.clone())).collect() }
    }

    /// Definitions of `self` whose names are absent from `other`.
    pub fn except(&self, other: &TypeDefinitionSet) -> Self {
        self.filter(|d| !other.contains(d.name()))
    }

    pub fn resolve_resource_spec(&self, resource: &ResourceType) -> Result<&TypeDefinition, ModelError> {
        match resource.spec() {
            Type::Name(name) => self.must_get(name),
            other => Err(ModelError::UnexpectedType { context: "resource spec".into(), found: other.to_string() }),
        }
    }

    pub fn resolve_resource_status(&self, resource: &ResourceType) -> Result<Option<&TypeDefinition>, ModelError> {
        match resource.status() {
            None => Ok(None),
            Some(Type::Name(name)) => self.must_get(name).map(Some),
            Some(other) => Err(ModelError::UnexpectedType { context: "resource status".into(), found: other.to_string() }),
        }
    }

    /// Names transitively reachable from `roots`, roots included when defined.
    pub fn connected_to(&self, roots: impl IntoIterator<Item = TypeName>) -> BTreeSet<TypeName> {
        self.connected_to_where(roots, &|_| true)
    }

    /// As [`TypeDefinitionSet::connected_to`], not following properties rejected by `keep`.
    pub fn connected_to_where(
        &self,
        roots: impl IntoIterator<Item = TypeName>,
        keep: &dyn Fn(&PropertyDefinition) -> bool,
    ) -> BTreeSet<TypeName> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<TypeName> = roots.into_iter().collect();
        while let Some(name) = queue.pop_front() {
            let Some(def) = self.defs.get(&name) else { continue };
            if !seen.insert(name) {
                continue;
            }
            let mut refs = BTreeSet::new();
            def.ty().referenced_names_where(keep, &mut refs);
            queue.extend(refs.into_iter().filter(|r| !seen.contains(r)));
        }
        seen
    }

    /// Renames definitions and rewrites every reference using `f`.
    pub fn map_names(&self, f: &dyn Fn(&TypeName) -> TypeName) -> Result<Self, ModelError> {
        Self::from_definitions(self.defs.values().map(|d| d.clone().with_name(f(d.name())).with_type(d.ty().map_names(f))))
    }
}

impl<'a> IntoIterator for &'a TypeDefinitionSet {
    type Item = &'a TypeDefinition;
    type IntoIter = std::collections::btree_map::Values<'a, TypeName, TypeDefinition>;

    fn into_iter(self) -> Self::IntoIter { self.defs.values() }
}

impl Serialize for TypeDefinitionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.defs.values())
    }
}

impl<'de> Deserialize<'de> for TypeDefinitionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let defs = Vec::<TypeDefinition>::deserialize(deserializer)?;
        Self::from_definitions(defs).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::PackageReference;
    use crate::object::ObjectType;

    fn name(n: &str) -> TypeName { TypeName::new(PackageReference::local("g", "v1api20220801"), n) }

    fn object_with_ref(n: &str, target: &str) -> TypeDefinition {
        let o = ObjectType::new().with_property(PropertyDefinition::new("P", "p", Type::optional(Type::name(name(target)))));
        TypeDefinition::new(name(n), Type::Object(o))
    }

    #[test]
    fn add_rejects_conflicting_duplicates() {
        let mut set = TypeDefinitionSet::new();
        let a = TypeDefinition::new(name("A"), Type::string());
        set.add(a.clone()).unwrap();
        set.add(a).unwrap();
        let err = set.add(TypeDefinition::new(name("A"), Type::int())).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateDefinition(n) if n == name("A")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn connected_to_follows_references_transitively() {
        let set = TypeDefinitionSet::from_definitions([
            object_with_ref("A", "B"),
            object_with_ref("B", "C"),
            TypeDefinition::new(name("C"), Type::string()),
            TypeDefinition::new(name("D"), Type::string()),
        ])
        .unwrap();
        let reached = set.connected_to([name("A")]);
        assert_eq!(reached, BTreeSet::from([name("A"), name("B"), name("C")]));
        let reached = set.connected_to_where([name("A")], &|p| p.name() != "P");
        assert_eq!(reached, BTreeSet::from([name("A")]));
    }

    #[test]
    fn except_and_filter() {
        let set = TypeDefinitionSet::from_definitions([
            TypeDefinition::new(name("A"), Type::string()),
            TypeDefinition::new(name("B"), Type::string()),
        ])
        .unwrap();
        let only_a = set.filter(|d| d.name().name() == "A");
        assert_eq!(set.except(&only_a).names().cloned().collect::<Vec<_>>(), vec![name("B")]);
    }

    #[test]
    fn serializes_as_sorted_array() {
        let set = TypeDefinitionSet::from_definitions([
            TypeDefinition::new(name("B"), Type::string()),
            TypeDefinition::new(name("A"), Type::string()),
        ])
        .unwrap();
        let v = serde_json::to_value(&set).unwrap();
        assert_eq!(v[0]["name"]["name"], "A");
        let back: TypeDefinitionSet = serde_json::from_value(v).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn map_names_rewrites_definitions_and_references() {
        let set = TypeDefinitionSet::from_definitions([object_with_ref("A", "B"), TypeDefinition::new(name("B"), Type::string())]).unwrap();
        let renamed = set.map_names(&|n| if n.name() == "B" { n.with_name("Bee") } else { n.clone() }).unwrap();
        assert!(renamed.contains(&name("Bee")));
        let a = renamed.get(&name("A")).unwrap();
        assert_eq!(a.ty().as_object().unwrap().property("P").unwrap().ty(), &Type::optional(Type::name(name("Bee"))));
    }
}
