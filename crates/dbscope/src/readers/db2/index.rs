//! DB2 index and constraint reader.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::{DbConnection, Rows};
use crate::dialect::DialectTag;
use crate::error::Result;
use crate::model::{
    DbObject, IndexColumn, IndexDefinition, IndexSourceOptions, SortDirection,
};
use crate::readers::IndexReader;
use crate::sql::escape_literal;

/// Constraint lookup per platform variant: three distinct, hard-coded
/// templates selected solely by the dialect tag. Slots: `{schema}`,
/// `{table}`.
const LUW_CONSTRAINTS: &str = "SELECT CONSTNAME, TYPE FROM SYSCAT.TABCONST \
                               WHERE TABSCHEMA = '{schema}' AND TABNAME = '{table}'";

const ZOS_CONSTRAINTS: &str = "SELECT CONSTNAME, TYPE FROM SYSIBM.SYSTABCONST \
                               WHERE TBCREATOR = '{schema}' AND TBNAME = '{table}'";

const ISERIES_CONSTRAINTS: &str = "SELECT CONSTRAINT_NAME, CONSTRAINT_TYPE FROM QSYS2.SYSCST \
                                   WHERE TABLE_SCHEMA = '{schema}' AND TABLE_NAME = '{table}'";

/// The constraint lookup template for a DB2 platform variant.
pub fn constraint_lookup_sql(tag: DialectTag) -> &'static str {
    match tag {
        DialectTag::Db2ZOs => ZOS_CONSTRAINTS,
        DialectTag::Db2ISeries => ISERIES_CONSTRAINTS,
        _ => LUW_CONSTRAINTS,
    }
}

fn index_list_sql(tag: DialectTag, schema: &str, table: &str) -> String {
    let schema = escape_literal(schema);
    let table = escape_literal(table);
    match tag {
        // z/OS and IBM i list one row per key column.
        DialectTag::Db2ZOs => format!(
            "SELECT i.CREATOR, i.NAME, i.UNIQUERULE, k.COLNAME, k.ORDERING \
             FROM SYSIBM.SYSINDEXES i \
             JOIN SYSIBM.SYSKEYS k ON k.IXCREATOR = i.CREATOR AND k.IXNAME = i.NAME \
             WHERE i.TBCREATOR = '{}' AND i.TBNAME = '{}' \
             ORDER BY i.NAME, k.COLSEQ",
            schema, table
        ),
        DialectTag::Db2ISeries => format!(
            "SELECT i.INDEX_SCHEMA, i.INDEX_NAME, i.IS_UNIQUE, k.COLUMN_NAME, k.ORDERING \
             FROM QSYS2.SYSINDEXES i \
             JOIN QSYS2.SYSKEYS k ON k.INDEX_SCHEMA = i.INDEX_SCHEMA AND k.INDEX_NAME = i.INDEX_NAME \
             WHERE i.TABLE_SCHEMA = '{}' AND i.TABLE_NAME = '{}' \
             ORDER BY i.INDEX_NAME, k.ORDINAL_POSITION",
            schema, table
        ),
        // LUW packs the key columns into COLNAMES (+COL1-COL2).
        _ => format!(
            "SELECT INDSCHEMA, INDNAME, UNIQUERULE, COLNAMES \
             FROM SYSCAT.INDEXES \
             WHERE TABSCHEMA = '{}' AND TABNAME = '{}' \
             ORDER BY INDNAME",
            schema, table
        ),
    }
}

/// Parse the LUW `COLNAMES` encoding: each column prefixed with `+`
/// (ascending) or `-` (descending).
fn parse_colnames(colnames: &str) -> Vec<IndexColumn> {
    let mut columns = Vec::new();
    let mut current = String::new();
    let mut direction: Option<SortDirection> = None;

    let mut push = |name: &mut String, dir: Option<SortDirection>| {
        if !name.is_empty() {
            columns.push(IndexColumn::new(name.clone(), dir));
            name.clear();
        }
    };

    for c in colnames.chars() {
        match c {
            '+' => {
                push(&mut current, direction);
                direction = Some(SortDirection::Asc);
            }
            '-' => {
                push(&mut current, direction);
                direction = Some(SortDirection::Desc);
            }
            _ => current.push(c),
        }
    }
    push(&mut current, direction);
    columns
}

fn direction_from_flag(flag: Option<&str>) -> Option<SortDirection> {
    match flag {
        Some("A") | Some("ASC") => Some(SortDirection::Asc),
        Some("D") | Some("DESC") => Some(SortDirection::Desc),
        _ => None,
    }
}

/// Index reader for the DB2 family.
pub struct Db2IndexReader {
    tag: DialectTag,
}

impl Db2IndexReader {
    pub fn new(tag: DialectTag) -> Self {
        Self { tag }
    }

    async fn fetch(&self, conn: &DbConnection, table: &DbObject) -> Result<Vec<IndexDefinition>> {
        let schema = match &table.schema {
            Some(s) => s.clone(),
            None => conn.resolve_schema("").await?,
        };

        let sql = index_list_sql(self.tag, &schema, &table.name);
        let rows = conn.client().query(&sql).await?;

        let mut indexes = match self.tag {
            DialectTag::Db2ZOs | DialectTag::Db2ISeries => {
                collect_row_per_column(table, &rows)
            }
            _ => collect_packed_columns(table, &rows),
        };

        // Constraint-backed indexes: anything matching a PRIMARY KEY
        // constraint name is flagged, in addition to the UNIQUERULE.
        let pk_names = self.primary_key_constraints(conn, &schema, &table.name).await?;
        for index in &mut indexes {
            if pk_names.contains(&index.name) {
                index.primary_key = true;
                index.unique = true;
            }
        }

        indexes.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Retrieved {} indexes for {}", indexes.len(), table.full_name());
        Ok(indexes)
    }

    async fn primary_key_constraints(
        &self,
        conn: &DbConnection,
        schema: &str,
        table: &str,
    ) -> Result<HashSet<String>> {
        let sql = constraint_lookup_sql(self.tag)
            .replace("{schema}", &escape_literal(schema))
            .replace("{table}", &escape_literal(table));
        let rows = conn.client().query(&sql).await?;
        Ok(rows
            .iter()
            .filter(|row| {
                matches!(row.get(1), Some("P") | Some("PRIMARY KEY"))
            })
            .filter_map(|row| row.get_string(0))
            .collect())
    }
}

fn collect_packed_columns(table: &DbObject, rows: &Rows) -> Vec<IndexDefinition> {
    rows.iter()
        .filter_map(|row| {
            let mut idx =
                IndexDefinition::new(table.clone(), row.get_string(0)?, row.get_string(1)?);
            let rule = row.get(2).unwrap_or("D");
            idx.unique = matches!(rule, "U" | "P");
            idx.primary_key = rule == "P";
            idx.columns = parse_colnames(row.get(3).unwrap_or(""));
            Some(idx)
        })
        .collect()
}

fn collect_row_per_column(table: &DbObject, rows: &Rows) -> Vec<IndexDefinition> {
    let mut indexes: Vec<IndexDefinition> = Vec::new();
    for row in rows {
        let (Some(schema), Some(name)) = (row.get_string(0), row.get_string(1)) else {
            continue;
        };
        let column = IndexColumn::new(
            row.get_string(3).unwrap_or_default(),
            direction_from_flag(row.get(4)),
        );

        if let Some(last) = indexes.last_mut() {
            if last.schema == schema && last.name == name {
                last.columns.push(column);
                continue;
            }
        }

        let mut idx = IndexDefinition::new(table.clone(), schema, name);
        let rule = row.get(2).unwrap_or("D");
        idx.unique = matches!(rule, "U" | "P" | "C");
        idx.primary_key = rule == "P";
        idx.columns = vec![column];
        indexes.push(idx);
    }
    indexes
}

#[async_trait]
impl IndexReader for Db2IndexReader {
    async fn get_indexes(&self, conn: &DbConnection, table: &DbObject) -> Vec<IndexDefinition> {
        match self.fetch(conn, table).await {
            Ok(list) => list,
            Err(e) => {
                warn!(
                    "Could not retrieve indexes for {}: {}",
                    table.full_name(),
                    e
                );
                Vec::new()
            }
        }
    }

    async fn load_source_options(&self, conn: &DbConnection, index: &mut IndexDefinition) {
        if index.options_initialized() {
            return;
        }

        let sql = match self.tag {
            DialectTag::Db2Luw => format!(
                "SELECT i.INDEXTYPE, i.REVERSE_SCANS, i.COMPRESSION, u.COLNAME \
                 FROM SYSCAT.INDEXES i \
                 LEFT JOIN SYSCAT.INDEXCOLUSE u \
                   ON u.INDSCHEMA = i.INDSCHEMA AND u.INDNAME = i.INDNAME AND u.COLORDER = 'I' \
                 WHERE i.INDSCHEMA = '{}' AND i.INDNAME = '{}' \
                 ORDER BY u.COLSEQ",
                escape_literal(&index.schema),
                escape_literal(&index.name)
            ),
            DialectTag::Db2ZOs => format!(
                "SELECT CASE CLUSTERING WHEN 'Y' THEN 'CLUS' ELSE 'REG' END, \
                 CAST(NULL AS CHAR(1)), COMPRESS, CAST(NULL AS VARCHAR(128)) \
                 FROM SYSIBM.SYSINDEXES \
                 WHERE CREATOR = '{}' AND NAME = '{}'",
                escape_literal(&index.schema),
                escape_literal(&index.name)
            ),
            // Not available on IBM i; intentional early return, not a
            // failure. The flag is still set so callers stop asking.
            _ => {
                index.set_source_options(None);
                return;
            }
        };

        match conn.client().query(&sql).await {
            Ok(rows) if !rows.is_empty() => {
                let first = &rows[0];
                let mut options = IndexSourceOptions {
                    clustered: first.get(0) == Some("CLUS"),
                    reverse_scans: first.get_flag(1),
                    compressed: first.get_flag(2),
                    include_columns: Vec::new(),
                };
                options.include_columns = rows
                    .iter()
                    .filter_map(|row| row.get_string(3))
                    .collect();
                index.set_source_options(Some(options));
            }
            Ok(_) => index.set_source_options(None),
            Err(e) => {
                warn!(
                    "Could not retrieve index options for {}.{}: {}",
                    index.schema, index.name, e
                );
                index.set_source_options(None);
            }
        }
    }
}
