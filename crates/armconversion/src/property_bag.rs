use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields the strongly typed model does not capture, kept so a value survives
/// conversion without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<String, Value>);

impl PropertyBag {
    pub fn new() -> Self { Self::default() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn contains(&self, key: &str) -> bool { self.0.contains_key(key) }
    pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> { self.0.iter() }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn add(&mut self, key: impl Into<String>, value: Value) { self.0.insert(key.into(), value); }

    pub fn remove(&mut self, key: &str) -> Option<Value> { self.0.remove(key) }

    /// Reads a bag from its JSON form; anything other than an object yields an empty bag.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => Self(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            _ => Self::default(),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect::<Map<String, Value>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bag_round_trips_through_json() {
        let mut bag = PropertyBag::new();
        bag.add("zone", json!("westus"));
        bag.add("tier", json!({"size": 3}));
        let v = bag.clone().into_value();
        assert_eq!(v, json!({"tier": {"size": 3}, "zone": "westus"}));
        assert_eq!(PropertyBag::from_value(Some(&v)), bag);
        assert!(PropertyBag::from_value(Some(&json!(3))).is_empty());
        assert_eq!(bag.remove("zone"), Some(json!("westus")));
        assert_eq!(bag.len(), 1);
    }
}
