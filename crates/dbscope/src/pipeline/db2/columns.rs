//! Column definition enhancer: reconstructs generated-column clauses.
//!
//! Each generated column is classified into exactly one of identity,
//! computed, or temporal-history (row begin / row end / transaction
//! start id). Identity options reuse the shared sequence-option
//! formatter in compact form. Hidden columns are recorded as a separate
//! DDL option string, never merged into the type.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::{DbConnection, Row};
use crate::ddl::identity_clause;
use crate::dialect::DialectTag;
use crate::model::{
    ColumnIdentifier, DbObject, PropertyValue, SequenceDefinition, SequenceProperty,
};
use crate::pipeline::ColumnEnhancer;
use crate::sql::escape_literal;

/// One catalog join covering identity attributes, generation
/// expressions, hidden flags and temporal period roles.
///
/// Layout: name, identity flag, generated code, expression text,
/// hidden flag, start, increment, min, max, cycle, cache, order,
/// period role (B/E).
fn generation_sql(schema: &str, table: &str) -> String {
    format!(
        "SELECT c.COLNAME, c.IDENTITY, c.GENERATED, c.TEXT, c.HIDDEN, \
         a.START, a.INCREMENT, a.MINVALUE, a.MAXVALUE, a.CYCLE, a.CACHE, a.ORDER, \
         CASE WHEN p.BEGINCOLNAME = c.COLNAME THEN 'B' \
              WHEN p.ENDCOLNAME = c.COLNAME THEN 'E' \
              ELSE NULL END \
         FROM SYSCAT.COLUMNS c \
         LEFT JOIN SYSCAT.COLIDENTATTRIBUTES a \
           ON a.TABSCHEMA = c.TABSCHEMA AND a.TABNAME = c.TABNAME AND a.COLNAME = c.COLNAME \
         LEFT JOIN SYSCAT.PERIODS p \
           ON p.TABSCHEMA = c.TABSCHEMA AND p.TABNAME = c.TABNAME AND p.PERIODNAME = 'SYSTEM_TIME' \
         WHERE c.TABSCHEMA = '{}' AND c.TABNAME = '{}' \
           AND (c.GENERATED <> ' ' OR c.HIDDEN = 'I') \
         ORDER BY c.COLNO",
        escape_literal(schema),
        escape_literal(table)
    )
}

/// Identity options assembled from the catalog row, fed to the shared
/// formatter.
fn identity_options(row: &Row) -> SequenceDefinition {
    let mut seq = SequenceDefinition::new("", "");
    let int_keys = [
        (5, SequenceProperty::Start),
        (6, SequenceProperty::Increment),
        (7, SequenceProperty::MinValue),
        (8, SequenceProperty::MaxValue),
        (10, SequenceProperty::CacheSize),
    ];
    for (idx, key) in int_keys {
        if let Some(v) = row.get_i64(idx) {
            seq.set_property(key, PropertyValue::Int(v));
        }
    }
    for (idx, key) in [(9, SequenceProperty::Cycle), (11, SequenceProperty::Ordered)] {
        if let Some(v) = row.get_string(idx) {
            seq.set_property(key, PropertyValue::Text(v));
        }
    }
    seq
}

/// Normalize the catalog expression text (`AS (PRICE * QTY)` or bare
/// `(PRICE * QTY)`) into a full generation clause.
fn computed_clause(text: &str) -> String {
    let expr = text.trim();
    let expr = expr.strip_prefix("AS ").unwrap_or(expr).trim();
    if expr.starts_with('(') {
        format!("GENERATED ALWAYS AS {}", expr)
    } else {
        format!("GENERATED ALWAYS AS ({})", expr)
    }
}

/// Column enhancer for the DB2 family. The required catalog join only
/// exists on LUW; the host variants take the intentional early return.
pub struct Db2ColumnEnhancer {
    tag: DialectTag,
}

impl Db2ColumnEnhancer {
    pub fn new(tag: DialectTag) -> Self {
        Self { tag }
    }

    fn apply_row(row: &Row, tag: DialectTag, columns: &mut [ColumnIdentifier]) {
        let Some(name) = row.get(0) else {
            return;
        };
        let Some(column) = columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
        else {
            return;
        };

        let identity = row.get(1) == Some("Y");
        let generated = row.get(2);
        let expression = row.get(3);
        let period_role = row.get(12);

        // Exactly one classification per generated column.
        if period_role == Some("B") {
            column.generator_expression = Some("GENERATED ALWAYS AS ROW BEGIN".to_string());
        } else if period_role == Some("E") {
            column.generator_expression = Some("GENERATED ALWAYS AS ROW END".to_string());
        } else if identity {
            let always = generated != Some("D");
            column.generator_expression =
                Some(identity_clause(always, &identity_options(row), tag));
        } else if let Some(text) = expression {
            column.computed_expression = Some(computed_clause(text));
        } else if matches!(generated, Some("A") | Some("D")) {
            column.generator_expression =
                Some("GENERATED ALWAYS AS TRANSACTION START ID".to_string());
        }

        // Hidden is independent of the generation classification and
        // surfaces as a DDL option, not as part of the type.
        if row.get(4) == Some("I") {
            column.sql_option = Some("IMPLICITLY HIDDEN".to_string());
        }
    }
}

#[async_trait]
impl ColumnEnhancer for Db2ColumnEnhancer {
    async fn update_columns(
        &self,
        conn: &DbConnection,
        table: &DbObject,
        columns: &mut [ColumnIdentifier],
    ) {
        if self.tag != DialectTag::Db2Luw {
            return;
        }
        let Some(schema) = table.schema.as_deref() else {
            return;
        };

        let sql = generation_sql(schema, &table.name);
        let rows = match conn.client().query(&sql).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    "Could not retrieve generation metadata for {}: {}",
                    table.full_name(),
                    e
                );
                return;
            }
        };

        for row in &rows {
            Self::apply_row(row, self.tag, columns);
        }
        debug!(
            "Applied generation metadata to {} rows for {}",
            rows.len(),
            table.full_name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixture::FixtureClient;
    use crate::model::ObjectType;
    use std::sync::Arc;

    fn orders() -> DbObject {
        DbObject::new("APP", "ORDERS", ObjectType::Table)
    }

    fn columns() -> Vec<ColumnIdentifier> {
        vec![
            ColumnIdentifier::new("ID", "BIGINT"),
            ColumnIdentifier::new("TOTAL", "DECIMAL(10,2)"),
            ColumnIdentifier::new("SYS_START", "TIMESTAMP(12)"),
            ColumnIdentifier::new("SYS_END", "TIMESTAMP(12)"),
            ColumnIdentifier::new("TX_ID", "TIMESTAMP(12)"),
            ColumnIdentifier::new("AUDIT_KEY", "VARCHAR(32)"),
        ]
    }

    fn generation_rows() -> Vec<Row> {
        vec![
            // Identity column with explicit options.
            FixtureClient::row(vec![
                Some("ID"),
                Some("Y"),
                Some("A"),
                None,
                None,
                Some("1"),
                Some("1"),
                Some("1"),
                Some("9223372036854775807"),
                Some("N"),
                Some("20"),
                Some("N"),
                None,
            ]),
            // Computed column.
            FixtureClient::row(vec![
                Some("TOTAL"),
                Some("N"),
                Some("A"),
                Some("AS (PRICE * QTY)"),
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                None,
            ]),
            // Temporal pair.
            FixtureClient::row(vec![
                Some("SYS_START"),
                Some("N"),
                Some("A"),
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                Some("B"),
            ]),
            FixtureClient::row(vec![
                Some("SYS_END"),
                Some("N"),
                Some("A"),
                None,
                Some("I"),
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                Some("E"),
            ]),
            // Transaction start id: generated, no expression, no period.
            FixtureClient::row(vec![
                Some("TX_ID"),
                Some("N"),
                Some("A"),
                None,
                Some("I"),
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                None,
            ]),
        ]
    }

    #[tokio::test]
    async fn test_classification_is_exclusive_and_complete() {
        let client = FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP")
            .on("SYSCAT.COLIDENTATTRIBUTES", generation_rows());
        let conn = DbConnection::connect(Arc::new(client)).unwrap();
        let enhancer = Db2ColumnEnhancer::new(DialectTag::Db2Luw);

        let mut cols = columns();
        enhancer.update_columns(&conn, &orders(), &mut cols).await;

        // Identity via the shared compact formatter.
        let id = &cols[0];
        let clause = id.generator_expression.as_deref().unwrap();
        assert!(clause.starts_with("GENERATED ALWAYS AS IDENTITY ("));
        assert!(clause.contains("START WITH 1"));
        assert!(clause.contains("INCREMENT BY 1"));
        // Default cache and sentinel bounds are suppressed in compact mode.
        assert!(!clause.contains("CACHE"));
        assert!(!clause.contains("MAXVALUE"));
        assert!(id.computed_expression.is_none());

        // Computed.
        let total = &cols[1];
        assert_eq!(
            total.computed_expression.as_deref(),
            Some("GENERATED ALWAYS AS (PRICE * QTY)")
        );
        assert!(total.generator_expression.is_none());

        // Temporal.
        assert_eq!(
            cols[2].generator_expression.as_deref(),
            Some("GENERATED ALWAYS AS ROW BEGIN")
        );
        assert_eq!(
            cols[3].generator_expression.as_deref(),
            Some("GENERATED ALWAYS AS ROW END")
        );
        assert_eq!(
            cols[4].generator_expression.as_deref(),
            Some("GENERATED ALWAYS AS TRANSACTION START ID")
        );

        // Hidden flags surface separately.
        assert_eq!(cols[3].sql_option.as_deref(), Some("IMPLICITLY HIDDEN"));
        assert_eq!(cols[4].sql_option.as_deref(), Some("IMPLICITLY HIDDEN"));
        assert!(cols[0].sql_option.is_none());

        // Untouched column stays plain.
        assert!(!cols[5].is_generated());
    }

    #[tokio::test]
    async fn test_by_default_identity() {
        let client = FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP").on(
            "SYSCAT.COLIDENTATTRIBUTES",
            vec![FixtureClient::row(vec![
                Some("ID"),
                Some("Y"),
                Some("D"),
                None,
                None,
                Some("1"),
                Some("1"),
                None,
                None,
                None,
                None,
                None,
                None,
            ])],
        );
        let conn = DbConnection::connect(Arc::new(client)).unwrap();
        let enhancer = Db2ColumnEnhancer::new(DialectTag::Db2Luw);

        let mut cols = vec![ColumnIdentifier::new("ID", "BIGINT")];
        enhancer.update_columns(&conn, &orders(), &mut cols).await;
        assert!(cols[0]
            .generator_expression
            .as_deref()
            .unwrap()
            .starts_with("GENERATED BY DEFAULT AS IDENTITY"));
    }

    #[tokio::test]
    async fn test_computed_clause_normalization() {
        assert_eq!(
            computed_clause("AS (A + B)"),
            "GENERATED ALWAYS AS (A + B)"
        );
        assert_eq!(computed_clause("(A + B)"), "GENERATED ALWAYS AS (A + B)");
        assert_eq!(computed_clause("A + B"), "GENERATED ALWAYS AS (A + B)");
    }

    #[tokio::test]
    async fn test_host_variants_take_early_return() {
        let client = Arc::new(FixtureClient::new("DB2 for z/OS", "DSN12015", "APP"));
        let conn = DbConnection::connect(client.clone() as Arc<dyn crate::client::CatalogClient>)
            .unwrap();
        let enhancer = Db2ColumnEnhancer::new(DialectTag::Db2ZOs);

        let mut cols = columns();
        enhancer.update_columns(&conn, &orders(), &mut cols).await;
        assert!(client.executed().is_empty());
        assert!(cols.iter().all(|c| !c.is_generated()));
    }

    #[tokio::test]
    async fn test_catalog_failure_leaves_columns_untouched() {
        let client = FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP")
            .fail_on("SYSCAT.COLIDENTATTRIBUTES");
        let conn = DbConnection::connect(Arc::new(client)).unwrap();
        let enhancer = Db2ColumnEnhancer::new(DialectTag::Db2Luw);

        let mut cols = columns();
        enhancer.update_columns(&conn, &orders(), &mut cols).await;
        assert!(cols.iter().all(|c| !c.is_generated()));
    }
}
