//! Definition objects produced by the catalog readers.
//!
//! Every type here is created fresh per catalog query and is immutable
//! in practice after construction, except for the documented one-shot
//! lazy fields (UDT attributes, index source options). Nothing in this
//! layer is cached or persisted.

mod column;
mod grants;
mod index;
mod object;
mod procedure;
mod sequence;
mod types;
mod udt;

pub use column::ColumnIdentifier;
pub use grants::{Privilege, ViewGrant};
pub use index::{IndexColumn, IndexDefinition, IndexSourceOptions, SortDirection};
pub use object::{DbObject, ObjectType};
pub use procedure::{
    ParamMode, ProcedureDefinition, ProcedureParameter, RoutineResultType,
};
pub use sequence::{PropertyValue, SequenceDefinition, SequenceProperty};
pub use types::SqlType;
pub use udt::{MetaType, TypeAttribute, UserDefinedType};
