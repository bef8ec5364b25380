//! DB2 reader implementations for the three platform variants.
//!
//! Every reader holds the [`DialectTag`](crate::dialect::DialectTag) it
//! was created for and selects its catalog SQL from a table of
//! hard-coded per-variant templates. The LUW catalog lives in
//! `SYSCAT`, z/OS in `SYSIBM`, IBM i in `QSYS2`.

mod index;
mod procedure;
mod search_path;
mod sequence;
mod synonym;
mod types;
mod view_grants;

pub use index::{constraint_lookup_sql, Db2IndexReader};
pub use procedure::Db2ProcedureReader;
pub use search_path::Db2SearchPathReader;
pub use sequence::Db2SequenceReader;
pub use synonym::Db2SynonymReader;
pub use types::Db2TypeReader;
pub use view_grants::Db2ViewGrantReader;
