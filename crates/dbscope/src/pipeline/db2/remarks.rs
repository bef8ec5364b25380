//! Enhancer filling the remarks column of an object list.
//!
//! The generic listing often arrives without comments (some drivers
//! skip them for speed). This enhancer loops once per requested object
//! type, accumulates a case-insensitive `schema.name → remarks` map
//! from a single catalog query, and applies it in one pass — the
//! catalog is hit once per type, never once per row. A single-row set
//! takes a fast path restricted to the one requested object.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::DbConnection;
use crate::dialect::DialectTag;
use crate::pipeline::{remarks_map, type_requested, ObjectListEnhancer, ObjectRowSet};
use crate::sql::escape_literal;

/// (select with remarks filter, schema column, name column, type column value per object type)
struct RemarksQuery {
    select: &'static str,
    schema_col: &'static str,
    name_col: &'static str,
}

const LUW_REMARKS: RemarksQuery = RemarksQuery {
    select: "SELECT TABSCHEMA, TABNAME, REMARKS FROM SYSCAT.TABLES \
             WHERE REMARKS IS NOT NULL",
    schema_col: "TABSCHEMA",
    name_col: "TABNAME",
};

const ZOS_REMARKS: RemarksQuery = RemarksQuery {
    select: "SELECT CREATOR, NAME, REMARKS FROM SYSIBM.SYSTABLES \
             WHERE REMARKS IS NOT NULL",
    schema_col: "CREATOR",
    name_col: "NAME",
};

const ISERIES_REMARKS: RemarksQuery = RemarksQuery {
    select: "SELECT TABLE_SCHEMA, TABLE_NAME, LONG_COMMENT FROM QSYS2.SYSTABLES \
             WHERE LONG_COMMENT IS NOT NULL",
    schema_col: "TABLE_SCHEMA",
    name_col: "TABLE_NAME",
};

fn remarks_query(tag: DialectTag) -> &'static RemarksQuery {
    match tag {
        DialectTag::Db2ZOs => &ZOS_REMARKS,
        DialectTag::Db2ISeries => &ISERIES_REMARKS,
        _ => &LUW_REMARKS,
    }
}

/// Catalog TYPE code per object-list type string.
fn type_code(object_type: &str) -> Option<&'static str> {
    match object_type.to_uppercase().as_str() {
        "TABLE" => Some("T"),
        "VIEW" => Some("V"),
        "GLOBAL TEMPORARY" => Some("G"),
        _ => None,
    }
}

const ENHANCED_TYPES: [&str; 3] = ["TABLE", "VIEW", "GLOBAL TEMPORARY"];

/// Remarks enhancer for the DB2 family.
pub struct Db2RemarksEnhancer {
    tag: DialectTag,
}

impl Db2RemarksEnhancer {
    pub fn new(tag: DialectTag) -> Self {
        Self { tag }
    }

    async fn fetch_remarks(
        &self,
        conn: &DbConnection,
        schema: &str,
        object_type: &str,
        only_name: Option<&str>,
    ) -> HashMap<String, String> {
        let Some(code) = type_code(object_type) else {
            return HashMap::new();
        };
        let query = remarks_query(self.tag);

        let type_col = if self.tag == DialectTag::Db2ISeries {
            "TABLE_TYPE"
        } else {
            "TYPE"
        };
        let mut sql = format!(
            "{} AND {} = '{}' AND {} = '{}'",
            query.select,
            type_col,
            code,
            query.schema_col,
            escape_literal(schema)
        );
        if let Some(name) = only_name {
            sql.push_str(&format!(
                " AND {} = '{}'",
                query.name_col,
                escape_literal(name)
            ));
        }

        match conn.client().query(&sql).await {
            Ok(rows) => remarks_map(rows.iter().filter_map(|row| {
                Some((row.get_string(0)?, row.get_string(1)?, row.get_string(2)?))
            })),
            Err(e) => {
                warn!("Could not retrieve remarks for type {}: {}", object_type, e);
                HashMap::new()
            }
        }
    }
}

#[async_trait]
impl ObjectListEnhancer for Db2RemarksEnhancer {
    async fn update_object_list(
        &self,
        conn: &DbConnection,
        rows: &mut ObjectRowSet,
        schema: &str,
        requested: &[&str],
    ) {
        let schema = match conn.resolve_schema(schema).await {
            Ok(s) => s,
            Err(e) => {
                warn!("Could not resolve schema for remarks lookup: {}", e);
                return;
            }
        };

        // Fast path: one object in the set, restrict the lookup to it.
        let only_name = if rows.row_count() == 1 {
            rows.get(0, "TABLE_NAME").map(str::to_string)
        } else {
            None
        };

        let mut map: HashMap<String, String> = HashMap::new();
        for object_type in ENHANCED_TYPES {
            if !type_requested(requested, object_type) {
                continue;
            }
            map.extend(
                self.fetch_remarks(conn, &schema, object_type, only_name.as_deref())
                    .await,
            );
        }
        if map.is_empty() {
            return;
        }

        let mut updated = 0usize;
        for row in 0..rows.row_count() {
            if rows.get(row, "REMARKS").is_some() {
                continue;
            }
            if let Some(remarks) = map.get(&rows.object_key(row)) {
                rows.set(row, "REMARKS", remarks.clone());
                updated += 1;
            }
        }
        debug!("Applied remarks to {} of {} rows", updated, rows.row_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixture::FixtureClient;
    use std::sync::Arc;

    fn populated_rows() -> ObjectRowSet {
        let mut rows = ObjectRowSet::standard();
        for (name, ty) in [("ORDERS", "TABLE"), ("V_ORDERS", "VIEW"), ("MISC", "TABLE")] {
            let r = rows.add_row();
            rows.set(r, "TABLE_SCHEM", "APP");
            rows.set(r, "TABLE_NAME", name);
            rows.set(r, "TABLE_TYPE", ty);
        }
        rows
    }

    #[tokio::test]
    async fn test_one_query_per_type_and_single_application_pass() {
        let client = Arc::new(
            FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP")
                .on(
                    "TYPE = 'T'",
                    vec![FixtureClient::full_row(vec!["APP", "ORDERS", "fact table"])],
                )
                .on(
                    "TYPE = 'V'",
                    vec![FixtureClient::full_row(vec!["APP", "V_ORDERS", "daily view"])],
                ),
        );
        let conn = DbConnection::connect(client.clone() as Arc<dyn crate::client::CatalogClient>)
            .unwrap();
        let enhancer = Db2RemarksEnhancer::new(DialectTag::Db2Luw);

        let mut rows = populated_rows();
        enhancer
            .update_object_list(&conn, &mut rows, "APP", &["TABLE", "VIEW"])
            .await;

        assert_eq!(rows.get(0, "REMARKS"), Some("fact table"));
        assert_eq!(rows.get(1, "REMARKS"), Some("daily view"));
        assert_eq!(rows.get(2, "REMARKS"), None);
        // One catalog query per requested type, not per row.
        assert_eq!(client.executed_count("SYSCAT.TABLES"), 2);
    }

    #[tokio::test]
    async fn test_existing_remarks_are_not_overwritten() {
        let client = FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP").on(
            "TYPE = 'T'",
            vec![FixtureClient::full_row(vec!["APP", "ORDERS", "from catalog"])],
        );
        let conn = DbConnection::connect(Arc::new(client)).unwrap();
        let enhancer = Db2RemarksEnhancer::new(DialectTag::Db2Luw);

        let mut rows = ObjectRowSet::standard();
        let r = rows.add_row();
        rows.set(r, "TABLE_SCHEM", "APP");
        rows.set(r, "TABLE_NAME", "ORDERS");
        rows.set(r, "TABLE_TYPE", "TABLE");
        rows.set(r, "REMARKS", "already present");

        enhancer
            .update_object_list(&conn, &mut rows, "APP", &["TABLE"])
            .await;
        assert_eq!(rows.get(r, "REMARKS"), Some("already present"));
    }

    #[tokio::test]
    async fn test_single_row_fast_path_restricts_query() {
        let client = Arc::new(FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP").on(
            "TYPE = 'T'",
            vec![FixtureClient::full_row(vec!["APP", "ORDERS", "fact table"])],
        ));
        let conn = DbConnection::connect(client.clone() as Arc<dyn crate::client::CatalogClient>)
            .unwrap();
        let enhancer = Db2RemarksEnhancer::new(DialectTag::Db2Luw);

        let mut rows = ObjectRowSet::standard();
        let r = rows.add_row();
        rows.set(r, "TABLE_SCHEM", "APP");
        rows.set(r, "TABLE_NAME", "ORDERS");
        rows.set(r, "TABLE_TYPE", "TABLE");

        enhancer
            .update_object_list(&conn, &mut rows, "APP", &["TABLE"])
            .await;

        let sql = client
            .executed()
            .into_iter()
            .find(|s| s.contains("TYPE = 'T'"))
            .unwrap();
        assert!(sql.contains("TABNAME = 'ORDERS'"));
        assert_eq!(rows.get(r, "REMARKS"), Some("fact table"));
    }

    #[tokio::test]
    async fn test_unrequested_types_are_skipped() {
        let client = Arc::new(FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP"));
        let conn = DbConnection::connect(client.clone() as Arc<dyn crate::client::CatalogClient>)
            .unwrap();
        let enhancer = Db2RemarksEnhancer::new(DialectTag::Db2Luw);

        let mut rows = populated_rows();
        enhancer
            .update_object_list(&conn, &mut rows, "APP", &["SEQUENCE"])
            .await;
        assert!(client.executed().is_empty());
    }
}
