use serde::de::{self, MapAccess};

use crate::configurable::Configurable;
use crate::yaml::{child_path, is_directive, ConfigLevel};
use crate::{UnusedEntry, NAME_IN_NEXT_VERSION_TAG, RENAME_TO_TAG};

/// Configuration for one property of a type.
#[derive(Debug)]
pub struct PropertyConfiguration {
    name: String,
    path: String,
    pub(crate) rename_to: Configurable<String>,
    pub(crate) name_in_next_version: Configurable<String>,
}

impl PropertyConfiguration {
    pub fn name(&self) -> &str { &self.name }

    pub(crate) fn collect_unused(&self, out: &mut Vec<UnusedEntry>) {
        let cells = [self.rename_to.unused_message(), self.name_in_next_version.unused_message()];
        out.extend(cells.into_iter().flatten().map(UnusedEntry::new));
    }
}

impl ConfigLevel for PropertyConfiguration {
    const KIND: &'static str = "property";
    const DIRECTIVES: &'static [&'static str] = &[RENAME_TO_TAG, NAME_IN_NEXT_VERSION_TAG];

    fn name(&self) -> &str { &self.name }

    fn named(name: &str, parent: &str) -> Self {
        let path = child_path(parent, name);
        let scope = format!("property {path}");
        Self {
            name: name.to_string(),
            rename_to: Configurable::new(RENAME_TO_TAG, scope.clone()),
            name_in_next_version: Configurable::new(NAME_IN_NEXT_VERSION_TAG, scope),
            path,
        }
    }

    fn accept<'de, A: MapAccess<'de>>(&mut self, key: String, map: &mut A) -> Result<(), A::Error> {
        if is_directive(&key, RENAME_TO_TAG) {
            self.rename_to.set(map.next_value()?)
        } else if is_directive(&key, NAME_IN_NEXT_VERSION_TAG) {
            self.name_in_next_version.set(map.next_value()?)
        } else {
            Err(de::Error::custom(format!("property configuration {}, unexpected key {key}", self.path)))
        }
    }
}
