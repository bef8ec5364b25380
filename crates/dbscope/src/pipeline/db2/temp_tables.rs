//! Extender adding created global temporary tables.
//!
//! The generic table listing does not surface CGTTs on DB2; this
//! extender injects them when tables (or the temporary type itself)
//! were requested.

use async_trait::async_trait;
use tracing::warn;

use crate::client::DbConnection;
use crate::dialect::DialectTag;
use crate::model::ObjectType;
use crate::pipeline::{type_requested, ObjectListExtender, ObjectRowSet};
use crate::sql::{escape_literal, name_predicate};

fn temp_table_sql(tag: DialectTag) -> Option<(&'static str, &'static str, &'static str)> {
    // (select, schema column, name column)
    match tag {
        DialectTag::Db2Luw => Some((
            "SELECT TABSCHEMA, TABNAME, REMARKS FROM SYSCAT.TABLES WHERE TYPE = 'G'",
            "TABSCHEMA",
            "TABNAME",
        )),
        DialectTag::Db2ZOs => Some((
            "SELECT CREATOR, NAME, REMARKS FROM SYSIBM.SYSTABLES WHERE TYPE = 'G'",
            "CREATOR",
            "NAME",
        )),
        // Not surfaced separately on IBM i.
        DialectTag::Db2ISeries => None,
        DialectTag::SqlServer => None,
    }
}

/// Temp-table extender for the DB2 family.
pub struct Db2TempTableExtender {
    tag: DialectTag,
}

impl Db2TempTableExtender {
    pub fn new(tag: DialectTag) -> Self {
        Self { tag }
    }
}

#[async_trait]
impl ObjectListExtender for Db2TempTableExtender {
    fn handles_types(&self, requested: &[&str]) -> bool {
        type_requested(requested, ObjectType::Table.as_str())
            || type_requested(requested, ObjectType::GlobalTemporary.as_str())
    }

    async fn extend_object_list(
        &self,
        conn: &DbConnection,
        rows: &mut ObjectRowSet,
        schema: &str,
        name_pattern: &str,
        _requested: &[&str],
    ) -> bool {
        if !conn.settings().retrieve_temp_tables {
            return false;
        }
        // Capability not present on this variant: intentional early
        // return, not a failure.
        let Some((select, schema_col, name_col)) = temp_table_sql(self.tag) else {
            return false;
        };

        let schema = match conn.resolve_schema(schema).await {
            Ok(s) => s,
            Err(e) => {
                warn!("Could not resolve schema for temp-table listing: {}", e);
                return false;
            }
        };

        let mut sql = format!("{} AND {} = '{}'", select, schema_col, escape_literal(&schema));
        if !name_pattern.is_empty() {
            sql.push_str(&format!(
                " AND {}",
                name_predicate(name_col, name_pattern, conn.client().search_escape())
            ));
        }
        sql.push_str(&format!(" ORDER BY {}, {}", schema_col, name_col));

        let result = match conn.client().query(&sql).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Could not retrieve temporary tables: {}", e);
                return false;
            }
        };

        let mut added = false;
        for row in &result {
            let (Some(schema), Some(name)) = (row.get_string(0), row.get_string(1)) else {
                continue;
            };
            let idx = rows.add_row();
            rows.set(idx, "TABLE_SCHEM", schema);
            rows.set(idx, "TABLE_NAME", name);
            rows.set(idx, "TABLE_TYPE", ObjectType::GlobalTemporary.as_str());
            if let Some(remarks) = row.get_string(2) {
                rows.set(idx, "REMARKS", remarks);
            }
            added = true;
        }
        added
    }
}
