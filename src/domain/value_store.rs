use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::FieldValue;

/// Flat mapping of field identifier to current value.
///
/// Snapshots are immutable: `with` and `toggled` return a new store and leave
/// the receiver (and every clone of it) untouched, so a render holding an
/// older snapshot never observes a later update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueStore {
    values: Arc<BTreeMap<String, FieldValue>>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_id: &str) -> Option<&FieldValue> {
        self.values.get(field_id)
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.values.contains_key(field_id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }

    /// New snapshot with `field_id` set to `value`, all other entries kept.
    pub fn with(&self, field_id: impl Into<String>, value: FieldValue) -> Self {
        let mut values = Arc::clone(&self.values);
        Arc::make_mut(&mut values).insert(field_id.into(), value);
        Self { values }
    }

    /// New snapshot with `option` added to or removed from the selection of
    /// `field_id`, computed from the selection currently held in this store.
    pub fn toggled(&self, field_id: &str, option: &str, selected: bool) -> Self {
        let mut current = self
            .get(field_id)
            .map(FieldValue::selections)
            .unwrap_or_default();

        if selected {
            if !current.iter().any(|v| v == option) {
                current.push(option.to_string());
            }
        } else {
            current.retain(|v| v != option);
        }

        self.with(field_id, FieldValue::Many(current))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl FromIterator<(String, FieldValue)> for ValueStore {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            values: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl Serialize for ValueStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValueStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = BTreeMap::<String, FieldValue>::deserialize(deserializer)?;
        Ok(Self {
            values: Arc::new(values),
        })
    }
}
