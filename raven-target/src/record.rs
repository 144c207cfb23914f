//! The flexible, field-named document representation of one log event.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// A runtime key/value bag holding the fields of one emitted log entry.
///
/// Field names are unique and case-sensitive; insertion order is kept so
/// configured fields serialize in declaration order, though stores are free
/// not to preserve it. A record is created per log event at write time,
/// populated by rendering the configured field templates, handed to the
/// store, and discarded — it has no existence beyond one write and makes no
/// thread-safety guarantees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a field. Overwriting keeps the field's original
    /// position. Never fails.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Looks up a field by exact name first; if that fails, falls back to
    /// the first stored name that matches case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .or_else(|| {
                self.fields
                    .iter()
                    .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            })
            .map(|(_, value)| value)
    }

    /// Names of all currently-set fields, in insertion order.
    ///
    /// The serialization layer uses this to discover the record's shape
    /// without static typing.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
