//! Index metadata with lazily loaded source options.

use serde::{Deserialize, Serialize};

use super::object::DbObject;

/// Sort direction of one index column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One column of an index, in key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumn {
    pub name: String,
    pub direction: Option<SortDirection>,
}

impl IndexColumn {
    pub fn new(name: impl Into<String>, direction: Option<SortDirection>) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }

    /// `NAME ASC` / `NAME DESC` / bare name when direction is unknown.
    pub fn expression(&self) -> String {
        match self.direction {
            Some(SortDirection::Asc) => format!("{} ASC", self.name),
            Some(SortDirection::Desc) => format!("{} DESC", self.name),
            None => self.name.clone(),
        }
    }
}

/// Dialect-specific index options loaded by a follow-up catalog query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSourceOptions {
    /// Clustering index.
    pub clustered: bool,
    /// `ALLOW REVERSE SCANS`.
    pub reverse_scans: bool,
    /// `COMPRESS YES`.
    pub compressed: bool,
    /// Non-key include columns.
    pub include_columns: Vec<String>,
}

/// One index on a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Owning table.
    pub table: DbObject,

    /// Index schema.
    pub schema: String,

    /// Index name.
    pub name: String,

    /// Key columns in order.
    pub columns: Vec<IndexColumn>,

    /// Uniqueness flag.
    pub unique: bool,

    /// Whether this index backs the primary key.
    pub primary_key: bool,

    source_options: Option<IndexSourceOptions>,

    /// One-shot flag: the expensive options query ran for this instance.
    options_initialized: bool,
}

impl IndexDefinition {
    pub fn new(table: DbObject, schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table,
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            unique: false,
            primary_key: false,
            source_options: None,
            options_initialized: false,
        }
    }

    /// Source options, if the follow-up query ran and found any.
    pub fn source_options(&self) -> Option<&IndexSourceOptions> {
        self.source_options.as_ref()
    }

    /// Whether the follow-up options query already ran.
    pub fn options_initialized(&self) -> bool {
        self.options_initialized
    }

    /// Install the options result. First write wins; the flag is set
    /// even for an empty result so the query never runs twice.
    pub fn set_source_options(&mut self, options: Option<IndexSourceOptions>) {
        if self.options_initialized {
            return;
        }
        self.source_options = options;
        self.options_initialized = true;
    }
}
