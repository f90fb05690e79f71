use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{FieldValue, ID_FIELD};

/// One normalized row: identifier, schema fields in schema order,
/// and an open extension map for columns the schema does not know.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: u64,
    values: Vec<(String, FieldValue)>,
    extensions: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            values: Vec::new(),
            extensions: Vec::new(),
        }
    }

    /// Builder-style setter, mostly for tests and templates
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value.into());
        self
    }

    /// Set a schema field, replacing any previous value and keeping its position.
    pub fn set(&mut self, name: &str, value: FieldValue) {
        match self.values.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn set_extension(&mut self, name: &str, value: FieldValue) {
        match self.extensions.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.extensions.push((name.to_string(), value)),
        }
    }

    /// Look up a field by name, searching schema fields, then extensions.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .chain(self.extensions.iter())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn text(&self, name: &str) -> &str {
        self.get(name).and_then(FieldValue::as_str).unwrap_or("")
    }

    pub fn number(&self, name: &str) -> f64 {
        self.get(name).and_then(FieldValue::as_f64).unwrap_or(0.0)
    }

    pub fn values(&self) -> &[(String, FieldValue)] {
        &self.values
    }

    pub fn extensions(&self) -> &[(String, FieldValue)] {
        &self.extensions
    }

    /// Every column in output order: id, schema fields, extensions.
    pub fn columns(&self) -> Vec<(&str, FieldValue)> {
        let mut columns = Vec::with_capacity(1 + self.values.len() + self.extensions.len());
        columns.push((ID_FIELD, FieldValue::Integer(self.id as i64)));
        for (name, value) in self.values.iter().chain(self.extensions.iter()) {
            columns.push((name.as_str(), value.clone()));
        }
        columns
    }

    /// Value for a column name, treating `id` as a regular column.
    pub fn column(&self, name: &str) -> Option<FieldValue> {
        if name == ID_FIELD {
            return Some(FieldValue::Integer(self.id as i64));
        }
        self.get(name).cloned()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for (name, value) in &columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
