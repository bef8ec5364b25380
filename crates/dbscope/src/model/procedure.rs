//! Stored procedure and function metadata.

use serde::{Deserialize, Serialize};

use super::types::SqlType;

/// Result-type classification, mirroring the driver-level constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutineResultType {
    /// The catalog did not say.
    Unknown,
    /// A procedure that returns no result.
    NoResult,
    /// A routine that returns a result (functions, table functions).
    ReturnsResult,
}

/// Parameter passing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamMode {
    In,
    Out,
    InOut,
    Return,
}

impl ParamMode {
    /// Map the DB2 catalog ROWTYPE code. `P` in, `O` out, `B` inout,
    /// `R`/`C` return value.
    pub fn from_db2_rowtype(code: &str) -> Self {
        match code.trim() {
            "O" => ParamMode::Out,
            "B" => ParamMode::InOut,
            "R" | "C" => ParamMode::Return,
            _ => ParamMode::In,
        }
    }

    /// Map the SQL-standard mode words used by the IBM i catalog.
    pub fn from_mode_word(word: &str) -> Self {
        match word.trim().to_uppercase().as_str() {
            "OUT" => ParamMode::Out,
            "INOUT" => ParamMode::InOut,
            "RETURN" => ParamMode::Return,
            _ => ParamMode::In,
        }
    }
}

/// One routine parameter, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureParameter {
    /// Parameter name (may be empty for unnamed result parameters).
    pub name: String,

    /// Dialect type string.
    pub type_name: String,

    /// Resolved type code.
    pub sql_type: SqlType,

    /// Passing mode.
    pub mode: ParamMode,

    /// Ordinal position (1-based).
    pub position: i32,
}

/// One stored procedure or function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureDefinition {
    /// Catalog (database) name, if the dialect has one.
    pub catalog: Option<String>,

    /// Schema name.
    pub schema: String,

    /// Routine name.
    pub name: String,

    /// Result-type classification.
    pub result_type: RoutineResultType,

    /// Parameters in declaration order.
    pub parameters: Vec<ProcedureParameter>,

    /// Internal identifier disambiguating overloaded routines
    /// (DB2 SPECIFICNAME). `None` when the dialect has no overloads.
    pub specific_name: Option<String>,

    /// Catalog comment, if any.
    pub comment: Option<String>,
}

impl ProcedureDefinition {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: schema.into(),
            name: name.into(),
            result_type: RoutineResultType::Unknown,
            parameters: Vec::new(),
            specific_name: None,
            comment: None,
        }
    }

    /// Display name including the specific-name disambiguator when the
    /// routine is overloaded.
    pub fn display_name(&self) -> String {
        match &self.specific_name {
            Some(specific) if specific != &self.name => {
                format!("{} ({})", self.name, specific)
            }
            _ => self.name.clone(),
        }
    }
}
