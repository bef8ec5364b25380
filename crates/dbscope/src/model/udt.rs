//! User-defined types (DB2 style) and their closed classification.

use serde::{Deserialize, Serialize};

/// One attribute of a row or structured type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAttribute {
    pub name: String,
    pub type_name: String,
}

impl TypeAttribute {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Closed classification of a user-defined type, with per-variant
/// payload. Set once from the catalog code and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaType {
    /// Distinct type over a base type.
    Distinct { base_type: String },
    /// Array of a base type with an element count.
    Array { base_type: String, length: i64 },
    /// Cursor type.
    Cursor,
    /// Row type with named attributes.
    Row { attributes: Vec<TypeAttribute> },
    /// Structured type with named attributes.
    Structured { attributes: Vec<TypeAttribute> },
}

impl MetaType {
    /// Map a DB2 catalog METATYPE code to the classification.
    ///
    /// `T` distinct, `A` array, `C` cursor, `F` row, `R` structured.
    /// Attribute lists start empty and are filled lazily by the type
    /// reader. Unknown codes default to structured.
    pub fn from_catalog_code(code: &str, base_type: Option<&str>, array_length: Option<i64>) -> Self {
        match code.trim() {
            "T" => MetaType::Distinct {
                base_type: base_type.unwrap_or("").to_string(),
            },
            "A" => MetaType::Array {
                base_type: base_type.unwrap_or("").to_string(),
                length: array_length.unwrap_or(0),
            },
            "C" => MetaType::Cursor,
            "F" => MetaType::Row {
                attributes: Vec::new(),
            },
            _ => MetaType::Structured {
                attributes: Vec::new(),
            },
        }
    }

    /// Whether this variant carries an attribute list.
    pub fn has_attributes(&self) -> bool {
        matches!(self, MetaType::Row { .. } | MetaType::Structured { .. })
    }
}

/// One user-defined type as read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDefinedType {
    /// Schema name.
    pub schema: String,

    /// Type name.
    pub name: String,

    /// Catalog comment, if any.
    pub comment: Option<String>,

    /// The classification, including per-variant payload.
    pub meta_type: MetaType,

    /// One-shot flag: attribute loading ran for this instance.
    /// The follow-up catalog query is expensive and runs at most once.
    attributes_loaded: bool,
}

impl UserDefinedType {
    pub fn new(schema: impl Into<String>, name: impl Into<String>, meta_type: MetaType) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            comment: None,
            meta_type,
            attributes_loaded: false,
        }
    }

    /// `schema.name`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Whether the attribute follow-up query already ran.
    pub fn attributes_loaded(&self) -> bool {
        self.attributes_loaded
    }

    /// Install the lazily loaded attribute list. Only meaningful for
    /// row/structured variants; marks the instance loaded either way so
    /// the follow-up query is never repeated.
    pub fn set_attributes(&mut self, attrs: Vec<TypeAttribute>) {
        match &mut self.meta_type {
            MetaType::Row { attributes } | MetaType::Structured { attributes } => {
                *attributes = attrs;
            }
            _ => {}
        }
        self.attributes_loaded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_code_mapping() {
        assert_eq!(
            MetaType::from_catalog_code("T", Some("VARCHAR(20)"), None),
            MetaType::Distinct {
                base_type: "VARCHAR(20)".to_string()
            }
        );
        assert_eq!(
            MetaType::from_catalog_code("A", Some("INTEGER"), Some(10)),
            MetaType::Array {
                base_type: "INTEGER".to_string(),
                length: 10
            }
        );
        assert_eq!(MetaType::from_catalog_code("C", None, None), MetaType::Cursor);
        assert!(matches!(
            MetaType::from_catalog_code("F", None, None),
            MetaType::Row { .. }
        ));
        assert!(matches!(
            MetaType::from_catalog_code("R", None, None),
            MetaType::Structured { .. }
        ));
    }

    #[test]
    fn test_attribute_loading_is_one_shot() {
        let mut udt = UserDefinedType::new(
            "APP",
            "ADDRESS_T",
            MetaType::from_catalog_code("R", None, None),
        );
        assert!(!udt.attributes_loaded());
        udt.set_attributes(vec![TypeAttribute::new("STREET", "VARCHAR(50)")]);
        assert!(udt.attributes_loaded());
    }

    #[test]
    fn test_set_attributes_on_scalar_variant_marks_loaded() {
        let mut udt = UserDefinedType::new(
            "APP",
            "MONEY_T",
            MetaType::from_catalog_code("T", Some("DECIMAL(19,4)"), None),
        );
        udt.set_attributes(Vec::new());
        assert!(udt.attributes_loaded());
        assert!(!udt.meta_type.has_attributes());
    }
}
