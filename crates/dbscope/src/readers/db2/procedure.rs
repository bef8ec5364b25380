//! DB2 procedure reader with permanent capability downgrade.
//!
//! The reader starts on the dialect-specific routine views. The first
//! catalog failure switches this instance permanently to the generic
//! driver-level listing — logged once, never retried. A settings hint
//! can force the generic path from the start.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::{DbConnection, Row};
use crate::dialect::DialectTag;
use crate::error::Result;
use crate::model::{
    ParamMode, ProcedureDefinition, ProcedureParameter, RoutineResultType, SqlType,
};
use crate::readers::ProcedureReader;
use crate::sql::{escape_literal, name_predicate};

/// Per-variant routine listing. Layout: schema, name, specific name,
/// routine type, remarks.
struct RoutineQuery {
    select: &'static str,
    schema_col: &'static str,
    name_col: &'static str,
}

const LUW_ROUTINES: RoutineQuery = RoutineQuery {
    select: "SELECT ROUTINESCHEMA, ROUTINENAME, SPECIFICNAME, ROUTINETYPE, REMARKS \
             FROM SYSCAT.ROUTINES",
    schema_col: "ROUTINESCHEMA",
    name_col: "ROUTINENAME",
};

const ZOS_ROUTINES: RoutineQuery = RoutineQuery {
    select: "SELECT SCHEMA, NAME, SPECIFICNAME, ROUTINETYPE, REMARKS \
             FROM SYSIBM.SYSROUTINES",
    schema_col: "SCHEMA",
    name_col: "NAME",
};

const ISERIES_ROUTINES: RoutineQuery = RoutineQuery {
    select: "SELECT ROUTINE_SCHEMA, ROUTINE_NAME, SPECIFIC_NAME, ROUTINE_TYPE, LONG_COMMENT \
             FROM QSYS2.SYSROUTINES",
    schema_col: "ROUTINE_SCHEMA",
    name_col: "ROUTINE_NAME",
};

fn routine_query(tag: DialectTag) -> &'static RoutineQuery {
    match tag {
        DialectTag::Db2ZOs => &ZOS_ROUTINES,
        DialectTag::Db2ISeries => &ISERIES_ROUTINES,
        _ => &LUW_ROUTINES,
    }
}

/// Per-variant parameter listing for one routine (by specific name).
/// Layout: parameter name, type name, mode, ordinal.
fn parameter_sql(tag: DialectTag, schema: &str, specific_name: &str) -> String {
    let schema = escape_literal(schema);
    let specific = escape_literal(specific_name);
    match tag {
        DialectTag::Db2ZOs => format!(
            "SELECT PARMNAME, TYPENAME, ROWTYPE, ORDINAL \
             FROM SYSIBM.SYSPARMS \
             WHERE SCHEMA = '{}' AND SPECIFICNAME = '{}' \
             ORDER BY ORDINAL",
            schema, specific
        ),
        DialectTag::Db2ISeries => format!(
            "SELECT PARAMETER_NAME, DATA_TYPE, PARAMETER_MODE, ORDINAL_POSITION \
             FROM QSYS2.SYSPARMS \
             WHERE SPECIFIC_SCHEMA = '{}' AND SPECIFIC_NAME = '{}' \
             ORDER BY ORDINAL_POSITION",
            schema, specific
        ),
        _ => format!(
            "SELECT PARMNAME, TYPENAME, ROWTYPE, ORDINAL \
             FROM SYSCAT.ROUTINEPARMS \
             WHERE ROUTINESCHEMA = '{}' AND SPECIFICNAME = '{}' \
             ORDER BY ORDINAL",
            schema, specific
        ),
    }
}

fn result_type_from_code(code: Option<&str>) -> RoutineResultType {
    match code {
        // Catalog routine-type codes.
        Some("P") => RoutineResultType::NoResult,
        Some("F") => RoutineResultType::ReturnsResult,
        // Driver-level numeric codes.
        Some("1") => RoutineResultType::NoResult,
        Some("2") => RoutineResultType::ReturnsResult,
        _ => RoutineResultType::Unknown,
    }
}

/// Procedure reader for the DB2 family.
pub struct Db2ProcedureReader {
    tag: DialectTag,
    /// Sticky per-instance downgrade flag. Never process-wide.
    downgraded: AtomicBool,
}

impl Db2ProcedureReader {
    pub fn new(tag: DialectTag) -> Self {
        Self {
            tag,
            downgraded: AtomicBool::new(false),
        }
    }

    /// Whether this instance has permanently switched to the generic
    /// driver-level listing.
    pub fn is_downgraded(&self) -> bool {
        self.downgraded.load(Ordering::Acquire)
    }

    async fn dialect_procedures(
        &self,
        conn: &DbConnection,
        schema_pattern: &str,
        name_pattern: &str,
    ) -> Result<Vec<ProcedureDefinition>> {
        let schema = conn.resolve_schema(schema_pattern).await?;
        let query = routine_query(self.tag);
        let escape = conn.client().search_escape();

        let mut conditions = vec![name_predicate(query.schema_col, &schema, escape)];
        if !name_pattern.is_empty() {
            conditions.push(name_predicate(query.name_col, name_pattern, escape));
        }

        let sql = format!(
            "{} WHERE {} ORDER BY {}, {}",
            query.select,
            conditions.join(" AND "),
            query.schema_col,
            query.name_col
        );

        let rows = conn.client().query(&sql).await?;
        let mut result: Vec<ProcedureDefinition> = rows
            .iter()
            .filter_map(|row| {
                let mut proc = ProcedureDefinition::new(row.get_string(0)?, row.get_string(1)?);
                proc.specific_name = row.get_string(2);
                proc.result_type = result_type_from_code(row.get(3));
                proc.comment = row.get_string(4);
                Some(proc)
            })
            .collect();
        result.sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));
        Ok(result)
    }

    async fn generic_procedures(
        &self,
        conn: &DbConnection,
        catalog: Option<&str>,
        schema_pattern: &str,
        name_pattern: &str,
    ) -> Vec<ProcedureDefinition> {
        let schema = match conn.resolve_schema(schema_pattern).await {
            Ok(s) => s,
            Err(e) => {
                warn!("Could not resolve schema for procedure listing: {}", e);
                return Vec::new();
            }
        };

        let pattern = if name_pattern.is_empty() {
            "%"
        } else {
            name_pattern
        };

        match conn
            .client()
            .driver_procedures(catalog, &schema, pattern)
            .await
        {
            Ok(rows) => {
                let mut result: Vec<ProcedureDefinition> =
                    rows.iter().filter_map(parse_driver_row).collect();
                result.sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));
                result
            }
            Err(e) => {
                warn!("Driver-level procedure listing failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Classic driver catalog layout:
/// `[catalog, schema, name, _, _, _, remarks, result_type, specific_name]`.
fn parse_driver_row(row: &Row) -> Option<ProcedureDefinition> {
    let mut proc = ProcedureDefinition::new(row.get_string(1)?, row.get_string(2)?);
    proc.catalog = row.get_string(0);
    proc.comment = row.get_string(6);
    proc.result_type = result_type_from_code(row.get(7));
    proc.specific_name = row.get_string(8);
    Some(proc)
}

#[async_trait]
impl ProcedureReader for Db2ProcedureReader {
    async fn get_procedures(
        &self,
        conn: &DbConnection,
        catalog: Option<&str>,
        schema_pattern: &str,
        name_pattern: &str,
    ) -> Vec<ProcedureDefinition> {
        let forced = conn.settings().use_generic_procedure_reader;
        if forced || self.is_downgraded() {
            debug!(
                forced,
                "Using driver-level procedure listing for {}", self.tag
            );
            return self
                .generic_procedures(conn, catalog, schema_pattern, name_pattern)
                .await;
        }

        match self
            .dialect_procedures(conn, schema_pattern, name_pattern)
            .await
        {
            Ok(list) => list,
            Err(e) => {
                warn!(
                    "Procedure catalog query failed, switching permanently to the \
                     driver-level listing for this connection: {}",
                    e
                );
                self.downgraded.store(true, Ordering::Release);
                self.generic_procedures(conn, catalog, schema_pattern, name_pattern)
                    .await
            }
        }
    }

    async fn load_parameters(&self, conn: &DbConnection, proc: &mut ProcedureDefinition) {
        let specific = proc
            .specific_name
            .clone()
            .unwrap_or_else(|| proc.name.clone());
        let sql = parameter_sql(self.tag, &proc.schema, &specific);

        let rows = match conn.client().query(&sql).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    "Could not retrieve parameters for {}: {}",
                    proc.display_name(),
                    e
                );
                return;
            }
        };

        proc.parameters = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let type_name = row.get_string(1).unwrap_or_default();
                let mode_cell = row.get(2).unwrap_or("");
                let mode = if self.tag == DialectTag::Db2ISeries {
                    ParamMode::from_mode_word(mode_cell)
                } else {
                    ParamMode::from_db2_rowtype(mode_cell)
                };
                ProcedureParameter {
                    name: row.get_string(0).unwrap_or_default(),
                    sql_type: SqlType::from_type_name(&type_name),
                    type_name,
                    mode,
                    position: row.get_i64(3).unwrap_or((i + 1) as i64) as i32,
                }
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixture::FixtureClient;
    use crate::client::DbSettings;
    use std::sync::Arc;

    fn routine_rows() -> Vec<Row> {
        vec![FixtureClient::row(vec![
            Some("APP"),
            Some("CALC_TOTAL"),
            Some("SQL20120101"),
            Some("P"),
            Some("recomputes totals"),
        ])]
    }

    fn driver_rows() -> Vec<Row> {
        vec![FixtureClient::row(vec![
            None,
            Some("APP"),
            Some("CALC_TOTAL"),
            None,
            None,
            None,
            Some("recomputes totals"),
            Some("1"),
            Some("SQL20120101"),
        ])]
    }

    #[tokio::test]
    async fn test_dialect_specific_listing() {
        let client = FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP")
            .on("SYSCAT.ROUTINES", routine_rows());
        let conn = DbConnection::connect(Arc::new(client)).unwrap();
        let reader = Db2ProcedureReader::new(DialectTag::Db2Luw);

        let list = reader.get_procedures(&conn, None, "", "").await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "CALC_TOTAL");
        assert_eq!(list[0].result_type, RoutineResultType::NoResult);
        assert_eq!(list[0].specific_name.as_deref(), Some("SQL20120101"));
        assert!(!reader.is_downgraded());
    }

    #[tokio::test]
    async fn test_first_failure_downgrades_permanently() {
        let client = Arc::new(
            FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP")
                .fail_on("SYSCAT.ROUTINES")
                .with_driver_procedures(driver_rows()),
        );
        let conn = DbConnection::connect(client.clone() as Arc<dyn crate::client::CatalogClient>)
            .unwrap();
        let reader = Db2ProcedureReader::new(DialectTag::Db2Luw);

        // First call fails over to the driver-level listing.
        let list = reader.get_procedures(&conn, None, "APP", "%").await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].result_type, RoutineResultType::NoResult);
        assert!(reader.is_downgraded());

        // Second call must not retry the dialect-specific query.
        let failed_before = client.executed_count("SYSCAT.ROUTINES");
        reader.get_procedures(&conn, None, "APP", "%").await;
        assert_eq!(client.executed_count("SYSCAT.ROUTINES"), failed_before);
        assert_eq!(client.executed_count("<driver:procedures>"), 2);
    }

    #[tokio::test]
    async fn test_settings_hint_forces_generic_path() {
        let client = Arc::new(
            FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP")
                .on("SYSCAT.ROUTINES", routine_rows())
                .with_driver_procedures(driver_rows()),
        );
        let conn = DbConnection::connect(client.clone() as Arc<dyn crate::client::CatalogClient>)
            .unwrap()
            .with_settings(DbSettings {
                use_generic_procedure_reader: true,
                ..Default::default()
            });
        let reader = Db2ProcedureReader::new(DialectTag::Db2Luw);

        let list = reader.get_procedures(&conn, None, "APP", "%").await;
        assert_eq!(list.len(), 1);
        assert_eq!(client.executed_count("SYSCAT.ROUTINES"), 0);
        // The hint alone does not mark the instance as downgraded.
        assert!(!reader.is_downgraded());
    }

    #[tokio::test]
    async fn test_load_parameters_in_order() {
        let client = FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP").on(
            "SYSCAT.ROUTINEPARMS",
            vec![
                FixtureClient::row(vec![
                    Some("ORDER_ID"),
                    Some("BIGINT"),
                    Some("P"),
                    Some("1"),
                ]),
                FixtureClient::row(vec![
                    Some("TOTAL"),
                    Some("DECIMAL(10,2)"),
                    Some("O"),
                    Some("2"),
                ]),
            ],
        );
        let conn = DbConnection::connect(Arc::new(client)).unwrap();
        let reader = Db2ProcedureReader::new(DialectTag::Db2Luw);

        let mut proc = ProcedureDefinition::new("APP", "CALC_TOTAL");
        proc.specific_name = Some("SQL20120101".to_string());
        reader.load_parameters(&conn, &mut proc).await;

        assert_eq!(proc.parameters.len(), 2);
        assert_eq!(proc.parameters[0].name, "ORDER_ID");
        assert_eq!(proc.parameters[0].mode, ParamMode::In);
        assert_eq!(proc.parameters[0].sql_type, SqlType::BigInt);
        assert_eq!(proc.parameters[1].mode, ParamMode::Out);
        assert_eq!(proc.parameters[1].position, 2);
    }

    #[tokio::test]
    async fn test_parameter_failure_leaves_list_empty() {
        let client = FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP")
            .fail_on("SYSCAT.ROUTINEPARMS");
        let conn = DbConnection::connect(Arc::new(client)).unwrap();
        let reader = Db2ProcedureReader::new(DialectTag::Db2Luw);

        let mut proc = ProcedureDefinition::new("APP", "CALC_TOTAL");
        reader.load_parameters(&conn, &mut proc).await;
        assert!(proc.parameters.is_empty());
    }
}
