//! Value-level conversion between Kubernetes-shaped JSON and the wire shape,
//! driven by the ARM conversion capability attached to each object.

use std::collections::BTreeSet;

use anyhow::{anyhow, bail, Context, Result};
use armgen_astmodel::prelude::*;
use serde_json::{Map, Value};

use crate::property_bag::PropertyBag;

/// Wire field carrying the resource name.
const ARM_NAME_FIELD: &str = "name";

pub struct ArmConverter<'a> {
    definitions: &'a TypeDefinitionSet,
}

struct Resolved<'a> {
    kube: &'a ObjectType,
    arm: &'a ObjectType,
    payload: PayloadType,
}

impl<'a> ArmConverter<'a> {
    pub fn new(definitions: &'a TypeDefinitionSet) -> Self { Self { definitions } }

    fn resolve(&self, name: &TypeName) -> Result<Resolved<'a>> {
        let def = self.definitions.must_get(name)?;
        let kube = def.ty().as_object().ok_or_else(|| anyhow!("{name} is not an object type"))?;
        let conv = kube.arm_conversion().ok_or_else(|| anyhow!("{name} has no ARM conversion capability"))?;
        if &conv.arm_type == name {
            bail!("cannot convert {name} onto itself");
        }
        let arm_def = self.definitions.must_get(&conv.arm_type)?;
        let arm = arm_def.ty().as_object().ok_or_else(|| anyhow!("ARM definition {} is not an object type", conv.arm_type))?;
        Ok(Resolved { kube, arm, payload: conv.payload })
    }

    /// Converts a Kubernetes value of type `name` into its wire form.
    pub fn to_arm(&self, name: &TypeName, value: &Value) -> Result<Value> {
        let Resolved { kube, arm, payload } = self.resolve(name)?;
        let input = match value {
            Value::Null => return Ok(Value::Null),
            Value::Object(map) => map,
            other => bail!("expected an object for {name}, found {other}"),
        };

        let mut out = Map::new();
        let mut bag = PropertyBag::new();
        for prop in kube.properties() {
            if prop.name() == PropertyName::OWNER || prop.is_kubernetes_only() {
                continue;
            }
            let Some(v) = input.get(prop.json_name()) else { continue };
            if prop.name() == PropertyName::PROPERTY_BAG {
                bag = PropertyBag::from_value(Some(v));
                continue;
            }
            if prop.name() == PropertyName::AZURE_NAME {
                out.insert(ARM_NAME_FIELD.to_string(), v.clone());
                continue;
            }
            let Some(arm_prop) = arm.property_by_json(prop.json_name()) else { continue };
            let converted = self
                .value_to_arm(prop.ty(), v)
                .with_context(|| format!("converting {name} property {}", prop.name()))?;
            insert_with_policy(&mut out, arm_prop.json_name(), converted, payload);
        }
        for (key, v) in bag.iter() {
            if !out.contains_key(key) {
                out.insert(key.clone(), v.clone());
            }
        }
        Ok(Value::Object(out))
    }

    /// Converts a wire value into the Kubernetes value of type `name`.
    ///
    /// `owner` is restored onto the owner property, which never travels on the wire.
    /// Wire fields with no modeled counterpart land in the property bag, when the type has one.
    pub fn from_arm(&self, name: &TypeName, wire: &Value, owner: Option<&Value>) -> Result<Value> {
        let Resolved { kube, arm, .. } = self.resolve(name)?;
        let input = match wire {
            Value::Null => return Ok(Value::Null),
            Value::Object(map) => map,
            other => bail!("expected an object for {name}, found {other}"),
        };

        let mut out = Map::new();
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut bag_field = None;
        for prop in kube.properties() {
            if prop.name() == PropertyName::OWNER {
                if let Some(owner) = owner {
                    out.insert(prop.json_name().to_string(), owner.clone());
                }
                continue;
            }
            if prop.is_kubernetes_only() {
                continue;
            }
            if prop.name() == PropertyName::PROPERTY_BAG {
                bag_field = Some(prop.json_name());
                continue;
            }
            if prop.name() == PropertyName::AZURE_NAME {
                seen.insert(ARM_NAME_FIELD);
                if let Some(Value::String(full)) = input.get(ARM_NAME_FIELD) {
                    let last = full.rsplit('/').next().unwrap_or(full);
                    out.insert(prop.json_name().to_string(), Value::String(last.to_string()));
                }
                continue;
            }
            let Some(arm_prop) = arm.property_by_json(prop.json_name()) else { continue };
            seen.insert(arm_prop.json_name());
            let Some(v) = input.get(arm_prop.json_name()) else { continue };
            if v.is_null() {
                continue;
            }
            let converted = self
                .value_from_arm(prop.ty(), v)
                .with_context(|| format!("converting {name} property {}", prop.name()))?;
            out.insert(prop.json_name().to_string(), converted);
        }

        if let Some(field) = bag_field {
            let mut bag = PropertyBag::new();
            for (key, v) in input.iter().filter(|(k, _)| !seen.contains(k.as_str())) {
                bag.add(key.clone(), v.clone());
            }
            if !bag.is_empty() {
                out.insert(field.to_string(), bag.into_value());
            }
        }
        Ok(Value::Object(out))
    }

    fn value_to_arm(&self, ty: &Type, v: &Value) -> Result<Value> {
        self.map_value(ty, v, &|name, v| self.to_arm(name, v))
    }

    fn value_from_arm(&self, ty: &Type, v: &Value) -> Result<Value> {
        self.map_value(ty, v, &|name, v| self.from_arm(name, v, None))
    }

    /// Walks `v` along `ty`, applying `convert` to every nested object that carries the capability.
    fn map_value(&self, ty: &Type, v: &Value, convert: &dyn Fn(&TypeName, &Value) -> Result<Value>) -> Result<Value> {
        if v.is_null() {
            return Ok(Value::Null);
        }
        match ty {
            Type::Optional(inner) => self.map_value(inner, v, convert),
            Type::Flagged(f) => self.map_value(f.element(), v, convert),
            Type::Name(name) => {
                let capable = self
                    .definitions
                    .get(name)
                    .and_then(|d| d.ty().as_object())
                    .is_some_and(|o| o.arm_conversion().is_some());
                if capable { convert(name, v) } else { Ok(v.clone()) }
            }
            Type::Array(inner) => match v {
                Value::Array(items) => items.iter().map(|item| self.map_value(inner, item, convert)).collect::<Result<Vec<_>>>().map(Value::Array),
                other => bail!("expected an array, found {other}"),
            },
            Type::Map(m) => match v {
                Value::Object(entries) => entries
                    .iter()
                    .map(|(k, item)| Ok((k.clone(), self.map_value(&m.value, item, convert)?)))
                    .collect::<Result<Map<String, Value>>>()
                    .map(Value::Object),
                other => bail!("expected a map, found {other}"),
            },
            Type::Object(_) | Type::Resource(_) | Type::Enum(_) | Type::Primitive(_) => Ok(v.clone()),
        }
    }
}

fn insert_with_policy(out: &mut Map<String, Value>, key: &str, v: Value, payload: PayloadType) {
    let empty_collection = match &v {
        Value::Null => return,
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    };
    if empty_collection && payload == PayloadType::OmitEmpty {
        return;
    }
    out.insert(key.to_string(), v);
}
