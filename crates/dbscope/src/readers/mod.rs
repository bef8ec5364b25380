//! Reader contracts and per-dialect selection.
//!
//! Each contract is independent of the others; a dialect implements the
//! ones its catalog can answer. [`MetadataReaders::for_dialect`] is the
//! only place implementations are chosen, and it is a pure function of
//! the [`DialectTag`] — no other runtime branching on driver behavior
//! happens outside the dialect identifier.
//!
//! Contract semantics shared by every `get_*` method:
//!
//! - a blank schema argument defaults to the connection's current
//!   schema;
//! - a name pattern containing a wildcard compiles to `LIKE` with the
//!   driver's escape clause, anything else to `=`;
//! - results are ordered by schema, then name, unless documented
//!   otherwise;
//! - catalog failures are logged and produce an empty result — the
//!   browse degrades per object kind instead of failing. The one
//!   exception is synonym-target resolution, which returns an error
//!   because a dangling synonym is a correctness problem.

pub mod db2;
pub mod mssql;

use async_trait::async_trait;

use crate::client::DbConnection;
use crate::ddl::{build_grant_ddl, build_index_ddl, build_type_ddl, DdlOptions};
use crate::dialect::DialectTag;
use crate::error::Result;
use crate::format::FormatFileWriter;
use crate::model::{
    DbObject, IndexDefinition, ProcedureDefinition, SequenceDefinition, UserDefinedType,
    ViewGrant,
};

/// Reads sequences and renders their DDL.
#[async_trait]
pub trait SequenceReader: Send + Sync {
    /// List sequences matching the schema and name pattern.
    async fn get_sequences(
        &self,
        conn: &DbConnection,
        schema: &str,
        name_pattern: &str,
    ) -> Vec<SequenceDefinition>;

    /// Read one sequence by exact name.
    async fn get_sequence_definition(
        &self,
        conn: &DbConnection,
        schema: &str,
        name: &str,
    ) -> Option<SequenceDefinition>;

    /// Render re-executable `CREATE SEQUENCE` DDL.
    fn sequence_ddl(&self, seq: &SequenceDefinition, opts: &DdlOptions) -> String;
}

/// Reads synonyms (aliases) and resolves their targets.
#[async_trait]
pub trait SynonymReader: Send + Sync {
    /// List synonyms matching the schema and name pattern.
    async fn get_synonyms(
        &self,
        conn: &DbConnection,
        schema: &str,
        name_pattern: &str,
    ) -> Vec<DbObject>;

    /// Resolve the table a synonym points at.
    ///
    /// Unlike every other reader method this rethrows catalog errors:
    /// a missing target table is a correctness error, not cosmetic.
    async fn get_synonym_table(
        &self,
        conn: &DbConnection,
        synonym: &DbObject,
    ) -> Result<DbObject>;
}

/// Reads stored procedures and functions.
#[async_trait]
pub trait ProcedureReader: Send + Sync {
    /// List routines matching the schema and name patterns.
    async fn get_procedures(
        &self,
        conn: &DbConnection,
        catalog: Option<&str>,
        schema_pattern: &str,
        name_pattern: &str,
    ) -> Vec<ProcedureDefinition>;

    /// Fill the ordered parameter list of one routine.
    async fn load_parameters(&self, conn: &DbConnection, proc: &mut ProcedureDefinition);
}

/// Reads index and constraint metadata for one table.
#[async_trait]
pub trait IndexReader: Send + Sync {
    /// List the indexes of a table, ordered by index name.
    async fn get_indexes(&self, conn: &DbConnection, table: &DbObject) -> Vec<IndexDefinition>;

    /// Run the expensive per-index options query, at most once per
    /// instance (the definition's one-shot flag guards repeats).
    async fn load_source_options(&self, conn: &DbConnection, index: &mut IndexDefinition);

    /// Render re-executable index DDL.
    fn index_ddl(&self, index: &IndexDefinition, opts: &DdlOptions) -> String {
        build_index_ddl(index, opts)
    }
}

/// Reads the schema search path in effect for the connection.
#[async_trait]
pub trait SearchPathReader: Send + Sync {
    /// The ordered, quote-stripped schema list. Not sorted: path order
    /// is significant.
    async fn get_search_path(&self, conn: &DbConnection) -> Vec<String>;
}

/// Reads privileges granted on a view.
#[async_trait]
pub trait ViewGrantReader: Send + Sync {
    /// Grants on one view, ordered by grantee then privilege.
    async fn get_view_grants(&self, conn: &DbConnection, view: &DbObject) -> Vec<ViewGrant>;

    /// Render `GRANT` statements for the list.
    fn grant_ddl(&self, view: &DbObject, grants: &[ViewGrant], opts: &DdlOptions) -> String {
        build_grant_ddl(view, grants, opts)
    }
}

/// Reads user-defined types.
#[async_trait]
pub trait TypeReader: Send + Sync {
    /// List user-defined types matching the schema and name pattern.
    async fn get_types(
        &self,
        conn: &DbConnection,
        schema: &str,
        name_pattern: &str,
    ) -> Vec<UserDefinedType>;

    /// Run the attribute follow-up query for row/structured types, at
    /// most once per instance.
    async fn load_attributes(&self, conn: &DbConnection, udt: &mut UserDefinedType);

    /// Render re-executable `CREATE TYPE` DDL.
    fn type_ddl(&self, udt: &UserDefinedType, opts: &DdlOptions) -> String {
        build_type_ddl(udt, opts)
    }
}

/// The reader set selected for one connection.
///
/// A `None` entry means the capability is not supported on the dialect
/// variant — an intentional early decision, not a failure, and never
/// logged as one.
pub struct MetadataReaders {
    pub sequences: Option<Box<dyn SequenceReader>>,
    pub synonyms: Option<Box<dyn SynonymReader>>,
    pub procedures: Option<Box<dyn ProcedureReader>>,
    pub indexes: Option<Box<dyn IndexReader>>,
    pub search_path: Option<Box<dyn SearchPathReader>>,
    pub view_grants: Option<Box<dyn ViewGrantReader>>,
    pub types: Option<Box<dyn TypeReader>>,
    pub format_writer: Option<Box<dyn FormatFileWriter>>,
}

impl MetadataReaders {
    /// Select the reader set for a dialect. Pure function of the tag.
    pub fn for_dialect(tag: DialectTag) -> Self {
        match tag {
            DialectTag::Db2Luw | DialectTag::Db2ZOs | DialectTag::Db2ISeries => Self {
                sequences: Some(Box::new(db2::Db2SequenceReader::new(tag))),
                synonyms: Some(Box::new(db2::Db2SynonymReader::new(tag))),
                procedures: Some(Box::new(db2::Db2ProcedureReader::new(tag))),
                indexes: Some(Box::new(db2::Db2IndexReader::new(tag))),
                search_path: Some(Box::new(db2::Db2SearchPathReader::new(tag))),
                view_grants: Some(Box::new(db2::Db2ViewGrantReader::new(tag))),
                types: Some(Box::new(db2::Db2TypeReader::new(tag))),
                format_writer: Some(Box::new(crate::format::Db2LoadWriter::new())),
            },
            DialectTag::SqlServer => Self {
                sequences: Some(Box::new(mssql::SqlServerSequenceReader::new())),
                synonyms: None,
                procedures: None,
                indexes: None,
                search_path: None,
                view_grants: None,
                types: None,
                format_writer: Some(Box::new(crate::format::BcpFormatWriter::new())),
            },
        }
    }

    /// Select the reader set for a connection.
    pub fn for_connection(conn: &DbConnection) -> Self {
        Self::for_dialect(conn.dialect())
    }
}
