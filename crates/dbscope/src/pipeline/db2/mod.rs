//! DB2 pipeline stages.

mod columns;
mod remarks;
mod temp_tables;

pub use columns::Db2ColumnEnhancer;
pub use remarks::Db2RemarksEnhancer;
pub use temp_tables::Db2TempTableExtender;
