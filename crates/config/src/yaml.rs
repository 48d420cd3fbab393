//! serde visitors decoding the configuration tree. Errors raised here carry the
//! YAML path and line/column attached by `serde_yaml`.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, Visitor};

use crate::advisor::closest_term;

/// One level of the configuration tree.
pub(crate) trait ConfigLevel: Sized {
    const KIND: &'static str;
    /// Directives recognised at this level, used for typo suggestions.
    const DIRECTIVES: &'static [&'static str];

    fn named(name: &str, parent: &str) -> Self;

    fn name(&self) -> &str;

    /// Consumes the value for `key`, either a directive or a nested child.
    fn accept<'de, A: MapAccess<'de>>(&mut self, key: String, map: &mut A) -> Result<(), A::Error>;
}

pub(crate) fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() { name.to_string() } else { format!("{parent}/{name}") }
}

pub(crate) struct LevelSeed<T> {
    name: String,
    parent: String,
    marker: PhantomData<T>,
}

impl<T> LevelSeed<T> {
    pub(crate) fn new(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self { name: name.into(), parent: parent.into(), marker: PhantomData }
    }
}

impl<'de, T: ConfigLevel> DeserializeSeed<'de> for LevelSeed<T> {
    type Value = T;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<T, D::Error> {
        deserializer.deserialize_map(LevelVisitor::<T> { name: self.name, parent: self.parent, marker: PhantomData })
    }
}

struct LevelVisitor<T> {
    name: String,
    parent: String,
    marker: PhantomData<T>,
}

impl<'de, T: ConfigLevel> Visitor<'de> for LevelVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a mapping of {} configuration for {}", T::KIND, self.name)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<T, A::Error> {
        let mut level = T::named(&self.name, &self.parent);
        while let Some(key) = map.next_key::<String>()? {
            if key.starts_with('$') && !T::DIRECTIVES.iter().any(|d| d.eq_ignore_ascii_case(&key)) {
                return Err(unknown_directive(&key, T::KIND, &child_path(&self.parent, &self.name), T::DIRECTIVES));
            }
            level.accept(key, &mut map)?;
        }
        Ok(level)
    }
}

/// Stores `value` under its case-folded `key`, rejecting a name that collides with an earlier sibling.
pub(crate) fn insert_child<E: de::Error, V: ConfigLevel>(
    children: &mut BTreeMap<String, V>,
    key: String,
    value: V,
    parent: &str,
) -> Result<(), E> {
    match children.entry(key) {
        Entry::Occupied(existing) => {
            let place = if parent.is_empty() { "objectModelConfiguration".to_string() } else { parent.to_string() };
            Err(E::custom(format!(
                "duplicate {} {} in {place} (already configured as {}, names are case-insensitive)",
                V::KIND,
                value.name(),
                existing.get().name()
            )))
        }
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
    }
}

pub(crate) fn is_directive(key: &str, tag: &str) -> bool { key.eq_ignore_ascii_case(tag) }

fn unknown_directive<E: de::Error>(key: &str, kind: &str, path: &str, known: &[&str]) -> E {
    let mut msg = format!("unknown directive {key} in {kind} configuration {path}");
    match closest_term(key, known.iter().copied()) {
        Some(s) => msg.push_str(&format!(" (did you mean {s}?)")),
        None if known.is_empty() => msg.push_str(&format!(" ({kind} configuration takes no directives)")),
        None => msg.push_str(&format!(" (expected one of {})", known.join(", "))),
    }
    E::custom(msg)
}

/// Decodes `$generatedConfigs`, requiring every value to be a `$.` property path.
pub(crate) struct GeneratedConfigsSeed(pub(crate) &'static str);

impl<'de> DeserializeSeed<'de> for GeneratedConfigsSeed {
    type Value = BTreeMap<String, String>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(GeneratedConfigsVisitor(self.0))
    }
}

struct GeneratedConfigsVisitor(&'static str);

impl<'de> Visitor<'de> for GeneratedConfigsVisitor {
    type Value = BTreeMap<String, String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} as a mapping of config map keys to $. property paths", self.0)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut out = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, String>()? {
            if !value.starts_with("$.") {
                return Err(de::Error::custom(format!("{} entry {value:?} must begin with $.", self.0)));
            }
            out.insert(key, value);
        }
        Ok(out)
    }
}
