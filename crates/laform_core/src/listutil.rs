//! Regrouping helpers between flat attribute records and template views.
//!
//! # Responsibility
//! - Rebuild one attribute map per entity from flat records (`listify`).
//! - Drop hidden entities and bookkeeping (`slim`).
//! - Reshape identification rows for per-field visibility (`contact_flatten`).
//!
//! # Invariants
//! - Outputs preserve first-seen order of entities and of keys.
//! - Partial entities keep only the keys they have; nothing is defaulted.
//! - Empty input gives empty output.

use crate::db::FieldValue;
use crate::model::AttributeRecord;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Insertion-ordered attribute name to value map.
///
/// Serializes as an object whose keys keep insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrMap {
    fields: Vec<(String, FieldValue)>,
}

impl AttrMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Sets `key`, keeping the position of its first insertion.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(name, _)| *name == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for AttrMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for AttrMap {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// One entity rebuilt from its attribute records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedRecord {
    pub id: i64,
    /// Visible only when every record of the entity was visible.
    pub state: bool,
    pub fields: AttrMap,
}

/// Per-field value and visibility for contact rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactField {
    pub value: FieldValue,
    pub state: bool,
}

/// Returns `items` without later duplicates, in first-occurrence order.
pub fn unique<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut kept: Vec<T> = Vec::new();
    for item in items {
        if !kept.contains(&item) {
            kept.push(item);
        }
    }
    kept
}

/// Groups records by `id` into one attribute map per entity.
pub fn listify(records: &[AttributeRecord]) -> Vec<GroupedRecord> {
    let mut grouped: Vec<GroupedRecord> = Vec::new();
    for record in records {
        match grouped.iter_mut().find(|entity| entity.id == record.id) {
            Some(entity) => {
                entity.state &= record.state;
                entity.fields.insert(record.attr.as_str(), record.value.clone());
            }
            None => {
                let mut fields = AttrMap::new();
                fields.insert(record.attr.as_str(), record.value.clone());
                grouped.push(GroupedRecord {
                    id: record.id,
                    state: record.state,
                    fields,
                });
            }
        }
    }
    grouped
}

/// Visible entities only, as plain attribute maps.
pub fn slim(records: &[AttributeRecord]) -> Vec<AttrMap> {
    listify(records)
        .into_iter()
        .filter(|entity| entity.state)
        .map(|entity| entity.fields)
        .collect()
}

/// Keys identification rows by attribute name with per-field visibility.
///
/// A repeated attribute name keeps the last stored row.
pub fn contact_flatten(records: &[AttributeRecord]) -> BTreeMap<String, ContactField> {
    records
        .iter()
        .map(|record| {
            (
                record.attr.clone(),
                ContactField {
                    value: record.value.clone(),
                    state: record.state,
                },
            )
        })
        .collect()
}

/// Number of elements equal to `x`.
pub fn count_instances<T: PartialEq>(items: &[T], x: &T) -> usize {
    items.iter().filter(|item| *item == x).count()
}
