//! Sequence metadata as a loosely-typed property map.
//!
//! Different dialects expose different subsets of the sequence options,
//! so the definition carries a map keyed by well-known constants rather
//! than a fixed struct. An absent key means "unknown", never "zero" —
//! the DDL formatter decides what unknown means per clause.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Well-known sequence property keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceProperty {
    Start,
    MinValue,
    MaxValue,
    Increment,
    Cycle,
    Ordered,
    CacheSize,
    DataType,
}

/// Loosely-typed property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    Int(i64),
    Bool(bool),
    Text(String),
}

/// One sequence, as read from a dialect catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDefinition {
    /// Schema name.
    pub schema: String,

    /// Sequence name.
    pub name: String,

    /// Catalog comment, if any.
    pub comment: Option<String>,

    properties: HashMap<SequenceProperty, PropertyValue>,
}

impl SequenceDefinition {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            comment: None,
            properties: HashMap::new(),
        }
    }

    /// `schema.name`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Set a property. Later writes win.
    pub fn set_property(&mut self, key: SequenceProperty, value: PropertyValue) {
        self.properties.insert(key, value);
    }

    /// Raw property access.
    pub fn property(&self, key: SequenceProperty) -> Option<&PropertyValue> {
        self.properties.get(&key)
    }

    /// Integer view of a property. `None` when absent or not numeric.
    pub fn int_property(&self, key: SequenceProperty) -> Option<i64> {
        match self.properties.get(&key) {
            Some(PropertyValue::Int(v)) => Some(*v),
            Some(PropertyValue::Text(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean view of a property. `None` when absent.
    pub fn bool_property(&self, key: SequenceProperty) -> Option<bool> {
        match self.properties.get(&key) {
            Some(PropertyValue::Bool(v)) => Some(*v),
            Some(PropertyValue::Text(s)) => {
                let s = s.trim();
                Some(s.eq_ignore_ascii_case("Y") || s.eq_ignore_ascii_case("YES"))
            }
            _ => None,
        }
    }

    /// Text view of a property. `None` when absent.
    pub fn text_property(&self, key: SequenceProperty) -> Option<&str> {
        match self.properties.get(&key) {
            Some(PropertyValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_key_is_unknown_not_zero() {
        let seq = SequenceDefinition::new("APP", "ORDER_SEQ");
        assert_eq!(seq.int_property(SequenceProperty::Start), None);
        assert_eq!(seq.bool_property(SequenceProperty::Cycle), None);
    }

    #[test]
    fn test_int_property_parses_text_cells() {
        let mut seq = SequenceDefinition::new("APP", "ORDER_SEQ");
        seq.set_property(
            SequenceProperty::MaxValue,
            PropertyValue::Text(" 9223372036854775807 ".to_string()),
        );
        assert_eq!(
            seq.int_property(SequenceProperty::MaxValue),
            Some(i64::MAX)
        );
    }

    #[test]
    fn test_bool_property_accepts_catalog_flags() {
        let mut seq = SequenceDefinition::new("APP", "ORDER_SEQ");
        seq.set_property(SequenceProperty::Cycle, PropertyValue::Text("Y".to_string()));
        seq.set_property(SequenceProperty::Ordered, PropertyValue::Text("N".to_string()));
        assert_eq!(seq.bool_property(SequenceProperty::Cycle), Some(true));
        assert_eq!(seq.bool_property(SequenceProperty::Ordered), Some(false));
    }
}
