use super::Adapter;
use crate::{error::AdapterError, field::FieldDescriptor, value::Value};
use std::collections::HashMap;

/// Resolves fields from an in-memory map keyed by field name
///
/// Handy for overrides assembled at runtime (command-line flags, test
/// fixtures).
#[derive(Debug, Clone, Default)]
pub struct MapAdapter {
    values: HashMap<String, Value>,
}

impl MapAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MapAdapter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Adapter for MapAdapter {
    fn resolve(&self, field_name: &str, _field: &FieldDescriptor) -> Result<Value, AdapterError> {
        self.values
            .get(field_name)
            .cloned()
            .ok_or_else(|| AdapterError::miss(format!("{} not in map", field_name)))
    }

    fn name(&self) -> &'static str {
        "MapAdapter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_and_miss() {
        let adapter: MapAdapter = [("port", 8080)].into_iter().collect();
        let field = FieldDescriptor::default();

        assert_eq!(adapter.resolve("port", &field).unwrap(), Value::Integer(8080));
        assert!(adapter.resolve("host", &field).unwrap_err().is_miss());
    }
}
