//! # dbscope
//!
//! Multi-dialect schema-metadata readers and DDL reconstruction — the
//! catalog core of a database browser. Supports the three platform
//! variants of the DB2 family (LUW, z/OS, IBM i) plus SQL Server:
//!
//! - **Dialect identification** from driver product info, once per
//!   connection; every downstream decision keys on the resulting tag
//! - **Catalog readers** for sequences, synonyms, procedures, indexes,
//!   user-defined types, search paths and view grants
//! - **Object-list pipeline** of extenders and enhancers over a generic
//!   row set
//! - **DDL builders** that re-emit definition objects as re-executable
//!   SQL text
//! - **Bulk-load format writers** producing the byte-exact descriptor
//!   files external load tools consume
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dbscope::client::{CatalogClient, DbConnection};
//! use dbscope::readers::MetadataReaders;
//!
//! # async fn browse(client: Arc<dyn CatalogClient>) -> dbscope::Result<()> {
//! let conn = DbConnection::connect(client)?;
//! let readers = MetadataReaders::for_connection(&conn);
//! if let Some(sequences) = &readers.sequences {
//!     for seq in sequences.get_sequences(&conn, "", "%").await {
//!         println!("{}", seq.full_name());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Readers run synchronously on whichever task invokes them; the
//! calling layer owns moving work off its interactive thread and holds
//! the connection's advisory busy flag for the duration of one call.

pub mod client;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod format;
pub mod model;
pub mod pipeline;
pub mod readers;
pub mod sql;

// Re-exports for convenient access
pub use client::{CatalogClient, DbConnection, DbSettings, ProductInfo};
pub use dialect::DialectTag;
pub use error::{MetaError, Result};
pub use format::{ExportOptions, FormatFileWriter};
pub use model::{
    ColumnIdentifier, DbObject, IndexDefinition, MetaType, ObjectType, ProcedureDefinition,
    SequenceDefinition, UserDefinedType,
};
pub use pipeline::{ObjectListPipeline, ObjectRowSet};
pub use readers::MetadataReaders;
