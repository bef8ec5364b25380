//! Column metadata as used by DDL reconstruction and format writers.

use serde::{Deserialize, Serialize};

use super::types::SqlType;

/// One column of a table, view or result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnIdentifier {
    /// Column name.
    pub name: String,

    /// Resolved driver-independent type code.
    pub sql_type: SqlType,

    /// The dialect's own type string (e.g. `VARCHAR(200)`).
    pub dbms_type: String,

    /// Whether the column allows NULL.
    pub nullable: bool,

    /// Whether the column is part of the primary key.
    pub is_pk: bool,

    /// Expression for computed columns (`GENERATED ALWAYS AS (...)`).
    pub computed_expression: Option<String>,

    /// Generator clause for identity or temporal columns
    /// (`GENERATED ALWAYS AS IDENTITY (...)`, `... AS ROW BEGIN`).
    pub generator_expression: Option<String>,

    /// Catalog comment, if any.
    pub comment: Option<String>,

    /// Extra DDL option rendered after the type, e.g. `IMPLICITLY HIDDEN`.
    /// Kept separate from the type string.
    pub sql_option: Option<String>,

    /// Ordinal position (1-based).
    pub position: i32,
}

impl ColumnIdentifier {
    /// Create a plain nullable column with the type code resolved from
    /// the dialect type string.
    pub fn new(name: impl Into<String>, dbms_type: impl Into<String>) -> Self {
        let dbms_type = dbms_type.into();
        Self {
            name: name.into(),
            sql_type: SqlType::from_type_name(&dbms_type),
            dbms_type,
            nullable: true,
            is_pk: false,
            computed_expression: None,
            generator_expression: None,
            comment: None,
            sql_option: None,
            position: 0,
        }
    }

    /// Whether any generation clause (computed, identity, temporal)
    /// applies to this column.
    pub fn is_generated(&self) -> bool {
        self.computed_expression.is_some() || self.generator_expression.is_some()
    }
}
