//! Base identity for every discovered catalog entity.

use serde::{Deserialize, Serialize};

/// Object-type tag for a [`DbObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Table,
    View,
    Synonym,
    GlobalTemporary,
    Sequence,
    Procedure,
    Function,
    Index,
    Type,
}

impl ObjectType {
    /// The type string used in generic object-list row sets.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Table => "TABLE",
            ObjectType::View => "VIEW",
            ObjectType::Synonym => "SYNONYM",
            ObjectType::GlobalTemporary => "GLOBAL TEMPORARY",
            ObjectType::Sequence => "SEQUENCE",
            ObjectType::Procedure => "PROCEDURE",
            ObjectType::Function => "FUNCTION",
            ObjectType::Index => "INDEX",
            ObjectType::Type => "TYPE",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entity identity: (catalog, schema, name) plus a type tag.
///
/// Identity comparison is case-sensitive; callers are expected to run
/// names through the connection wrapper's quote/case normalization
/// before constructing one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbObject {
    /// Catalog (database) name, if the dialect has one.
    pub catalog: Option<String>,

    /// Schema name.
    pub schema: Option<String>,

    /// Object name.
    pub name: String,

    /// Object-type tag.
    pub object_type: ObjectType,

    /// Catalog comment (remarks), if any.
    pub comment: Option<String>,
}

impl DbObject {
    /// Create an object with schema and name only.
    pub fn new(schema: impl Into<String>, name: impl Into<String>, object_type: ObjectType) -> Self {
        Self {
            catalog: None,
            schema: Some(schema.into()),
            name: name.into(),
            object_type,
            comment: None,
        }
    }

    /// The identity triple this object is compared by.
    pub fn identity(&self) -> (Option<&str>, Option<&str>, &str) {
        (self.catalog.as_deref(), self.schema.as_deref(), &self.name)
    }

    /// Whether two objects denote the same catalog entity.
    pub fn same_object(&self, other: &DbObject) -> bool {
        self.identity() == other.identity()
    }

    /// `schema.name`, or just the name when no schema is set.
    pub fn full_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let obj = DbObject::new("APP", "ORDERS", ObjectType::Table);
        assert_eq!(obj.full_name(), "APP.ORDERS");
    }

    #[test]
    fn test_identity_is_case_sensitive() {
        let a = DbObject::new("APP", "ORDERS", ObjectType::Table);
        let b = DbObject::new("APP", "orders", ObjectType::Table);
        assert!(!a.same_object(&b));
    }

    #[test]
    fn test_identity_ignores_comment_and_type() {
        let mut a = DbObject::new("APP", "ORDERS", ObjectType::Table);
        let b = DbObject::new("APP", "ORDERS", ObjectType::Synonym);
        a.comment = Some("fact table".to_string());
        assert!(a.same_object(&b));
    }
}
