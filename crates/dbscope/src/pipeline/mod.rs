//! Object-list pipeline: extenders and enhancers over a generic
//! tabular row set.
//!
//! The browse layer builds a generic "objects in a schema" row set
//! (driver catalog shape) and then runs it through two composable
//! stages: extenders add rows for object kinds the generic listing
//! misses, enhancers annotate rows already present without adding any.

pub mod db2;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::client::DbConnection;
use crate::dialect::DialectTag;
use crate::model::{ColumnIdentifier, DbObject};

/// Column names of the standard object row set, matching the classic
/// driver catalog layout.
pub const OBJECT_LIST_COLUMNS: [&str; 5] = [
    "TABLE_CAT",
    "TABLE_SCHEM",
    "TABLE_NAME",
    "TABLE_TYPE",
    "REMARKS",
];

/// Generic tabular row set of catalog objects.
///
/// Column lookup is case-insensitive; cell values are text, `None` for
/// NULL. Rows keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectRowSet {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl ObjectRowSet {
    /// Row set with the standard object-list columns.
    pub fn standard() -> Self {
        Self::with_columns(&OBJECT_LIST_COLUMNS)
    }

    pub fn with_columns(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Append an empty row, returning its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(vec![None; self.columns.len()]);
        self.rows.len() - 1
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    pub fn set(&mut self, row: usize, column: &str, value: impl Into<String>) {
        if let Some(idx) = self.column_index(column) {
            if let Some(cells) = self.rows.get_mut(row) {
                cells[idx] = Some(value.into());
            }
        }
    }

    /// Case-insensitive `"schema.name"` key of one row, used by the
    /// enhancer application pass.
    pub fn object_key(&self, row: usize) -> String {
        format!(
            "{}.{}",
            self.get(row, "TABLE_SCHEM").unwrap_or(""),
            self.get(row, "TABLE_NAME").unwrap_or("")
        )
        .to_uppercase()
    }
}

/// Whether an object type was requested. An empty request means "all
/// types", per the driver catalog convention.
pub fn type_requested(requested: &[&str], object_type: &str) -> bool {
    requested.is_empty()
        || requested
            .iter()
            .any(|t| t.eq_ignore_ascii_case(object_type))
}

/// Adds rows for object kinds the generic catalog listing misses.
#[async_trait]
pub trait ObjectListExtender: Send + Sync {
    /// Whether this extender contributes any of the requested types.
    /// Must be checked before running the catalog query.
    fn handles_types(&self, requested: &[&str]) -> bool;

    /// Append missing rows. Returns whether any row was contributed.
    async fn extend_object_list(
        &self,
        conn: &DbConnection,
        rows: &mut ObjectRowSet,
        schema: &str,
        name_pattern: &str,
        requested: &[&str],
    ) -> bool;
}

/// Annotates rows already present, without adding any.
#[async_trait]
pub trait ObjectListEnhancer: Send + Sync {
    /// Write values into existing columns (typically remarks). One
    /// catalog query per requested type, applied in a single pass over
    /// the row set through a case-insensitive `schema.name` map.
    async fn update_object_list(
        &self,
        conn: &DbConnection,
        rows: &mut ObjectRowSet,
        schema: &str,
        requested: &[&str],
    );
}

/// Enhancer scoped to one table's column list.
#[async_trait]
pub trait ColumnEnhancer: Send + Sync {
    /// Reconstruct derived column attributes (identity, computed,
    /// temporal, hidden) on the given columns.
    async fn update_columns(
        &self,
        conn: &DbConnection,
        table: &DbObject,
        columns: &mut [ColumnIdentifier],
    );
}

/// The pipeline stages selected for one dialect. Pure function of the
/// tag, like the reader factory.
pub struct ObjectListPipeline {
    pub extenders: Vec<Box<dyn ObjectListExtender>>,
    pub enhancers: Vec<Box<dyn ObjectListEnhancer>>,
    pub column_enhancer: Option<Box<dyn ColumnEnhancer>>,
}

impl ObjectListPipeline {
    pub fn for_dialect(tag: DialectTag) -> Self {
        match tag {
            DialectTag::Db2Luw | DialectTag::Db2ZOs | DialectTag::Db2ISeries => Self {
                extenders: vec![Box::new(db2::Db2TempTableExtender::new(tag))],
                enhancers: vec![Box::new(db2::Db2RemarksEnhancer::new(tag))],
                column_enhancer: Some(Box::new(db2::Db2ColumnEnhancer::new(tag))),
            },
            DialectTag::SqlServer => Self {
                extenders: Vec::new(),
                enhancers: Vec::new(),
                column_enhancer: None,
            },
        }
    }

    /// Run every applicable extender, then every enhancer.
    pub async fn run(
        &self,
        conn: &DbConnection,
        rows: &mut ObjectRowSet,
        schema: &str,
        name_pattern: &str,
        requested: &[&str],
    ) -> bool {
        let mut extended = false;
        for extender in &self.extenders {
            if extender.handles_types(requested) {
                extended |= extender
                    .extend_object_list(conn, rows, schema, name_pattern, requested)
                    .await;
            }
        }
        for enhancer in &self.enhancers {
            enhancer.update_object_list(conn, rows, schema, requested).await;
        }
        extended
    }
}

/// Build the lookup map an enhancer applies: `"SCHEMA.NAME" → value`,
/// keys upper-cased for case-insensitive matching.
pub fn remarks_map(entries: impl IntoIterator<Item = (String, String, String)>) -> HashMap<String, String> {
    entries
        .into_iter()
        .map(|(schema, name, value)| (format!("{}.{}", schema, name).to_uppercase(), value))
        .collect()
}
