//! DB2 synonym (alias) reader.

use async_trait::async_trait;
use tracing::warn;

use crate::client::DbConnection;
use crate::dialect::DialectTag;
use crate::error::{MetaError, Result};
use crate::model::{DbObject, ObjectType};
use crate::readers::SynonymReader;
use crate::sql::{escape_literal, name_predicate};

/// Per-variant synonym listing. Layout: schema, name, base schema,
/// base name, remarks.
struct SynonymQuery {
    select: &'static str,
    base_filter: Option<&'static str>,
    schema_col: &'static str,
    name_col: &'static str,
}

const LUW_SYNONYMS: SynonymQuery = SynonymQuery {
    select: "SELECT TABSCHEMA, TABNAME, BASE_TABSCHEMA, BASE_TABNAME, REMARKS \
             FROM SYSCAT.TABLES",
    base_filter: Some("TYPE = 'A'"),
    schema_col: "TABSCHEMA",
    name_col: "TABNAME",
};

const ZOS_SYNONYMS: SynonymQuery = SynonymQuery {
    select: "SELECT CREATOR, NAME, TBCREATOR, TBNAME, CAST(NULL AS VARCHAR(254)) \
             FROM SYSIBM.SYSSYNONYMS",
    base_filter: None,
    schema_col: "CREATOR",
    name_col: "NAME",
};

const ISERIES_SYNONYMS: SynonymQuery = SynonymQuery {
    select: "SELECT TABLE_SCHEMA, TABLE_NAME, BASE_TABLE_SCHEMA, BASE_TABLE_NAME, LONG_COMMENT \
             FROM QSYS2.SYSTABLES",
    base_filter: Some("TABLE_TYPE = 'A'"),
    schema_col: "TABLE_SCHEMA",
    name_col: "TABLE_NAME",
};

fn synonym_query(tag: DialectTag) -> &'static SynonymQuery {
    match tag {
        DialectTag::Db2ZOs => &ZOS_SYNONYMS,
        DialectTag::Db2ISeries => &ISERIES_SYNONYMS,
        _ => &LUW_SYNONYMS,
    }
}

/// Existence check for the resolved base table.
fn table_exists_sql(tag: DialectTag, schema: &str, name: &str) -> String {
    let schema = escape_literal(schema);
    let name = escape_literal(name);
    match tag {
        DialectTag::Db2ZOs => format!(
            "SELECT 1 FROM SYSIBM.SYSTABLES WHERE CREATOR = '{}' AND NAME = '{}'",
            schema, name
        ),
        DialectTag::Db2ISeries => format!(
            "SELECT 1 FROM QSYS2.SYSTABLES WHERE TABLE_SCHEMA = '{}' AND TABLE_NAME = '{}'",
            schema, name
        ),
        _ => format!(
            "SELECT 1 FROM SYSCAT.TABLES WHERE TABSCHEMA = '{}' AND TABNAME = '{}' AND TYPE IN ('T', 'V', 'S', 'G')",
            schema, name
        ),
    }
}

/// Synonym reader for the DB2 family.
pub struct Db2SynonymReader {
    tag: DialectTag,
}

impl Db2SynonymReader {
    pub fn new(tag: DialectTag) -> Self {
        Self { tag }
    }

    async fn fetch(
        &self,
        conn: &DbConnection,
        schema: &str,
        name_pattern: &str,
    ) -> Result<Vec<DbObject>> {
        let schema = conn.resolve_schema(schema).await?;
        let query = synonym_query(self.tag);

        let mut conditions = Vec::new();
        if let Some(filter) = query.base_filter {
            conditions.push(filter.to_string());
        }
        conditions.push(format!(
            "{} = '{}'",
            query.schema_col,
            escape_literal(&schema)
        ));
        if !name_pattern.is_empty() {
            conditions.push(name_predicate(
                query.name_col,
                name_pattern,
                conn.client().search_escape(),
            ));
        }

        let sql = format!(
            "{} WHERE {} ORDER BY {}, {}",
            query.select,
            conditions.join(" AND "),
            query.schema_col,
            query.name_col
        );

        let rows = conn.client().query(&sql).await?;
        let mut result: Vec<DbObject> = rows
            .iter()
            .filter_map(|row| {
                let mut obj = DbObject::new(
                    row.get_string(0)?,
                    row.get_string(1)?,
                    ObjectType::Synonym,
                );
                obj.comment = row.get_string(4);
                Some(obj)
            })
            .collect();
        result.sort_by(|a, b| (a.schema.clone(), a.name.clone()).cmp(&(b.schema.clone(), b.name.clone())));
        Ok(result)
    }

    /// Look up the base table columns for one synonym.
    async fn fetch_target(
        &self,
        conn: &DbConnection,
        schema: &str,
        name: &str,
    ) -> Result<Option<(String, String)>> {
        let query = synonym_query(self.tag);
        let mut conditions = Vec::new();
        if let Some(filter) = query.base_filter {
            conditions.push(filter.to_string());
        }
        conditions.push(format!("{} = '{}'", query.schema_col, escape_literal(schema)));
        conditions.push(format!("{} = '{}'", query.name_col, escape_literal(name)));

        let sql = format!("{} WHERE {}", query.select, conditions.join(" AND "));
        let rows = conn.client().query(&sql).await?;
        Ok(rows
            .first()
            .and_then(|row| Some((row.get_string(2)?, row.get_string(3)?))))
    }
}

#[async_trait]
impl SynonymReader for Db2SynonymReader {
    async fn get_synonyms(
        &self,
        conn: &DbConnection,
        schema: &str,
        name_pattern: &str,
    ) -> Vec<DbObject> {
        match self.fetch(conn, schema, name_pattern).await {
            Ok(list) => list,
            Err(e) => {
                warn!("Could not retrieve synonyms: {}", e);
                Vec::new()
            }
        }
    }

    async fn get_synonym_table(
        &self,
        conn: &DbConnection,
        synonym: &DbObject,
    ) -> Result<DbObject> {
        let schema = synonym.schema.as_deref().unwrap_or("");

        let missing = || MetaError::SynonymTarget {
            schema: schema.to_string(),
            name: synonym.name.clone(),
            target: String::new(),
        };

        let (base_schema, base_name) = self
            .fetch_target(conn, schema, &synonym.name)
            .await?
            .ok_or_else(missing)?;

        let exists_sql = table_exists_sql(self.tag, &base_schema, &base_name);
        let rows = conn.client().query(&exists_sql).await?;
        if rows.is_empty() {
            return Err(MetaError::SynonymTarget {
                schema: schema.to_string(),
                name: synonym.name.clone(),
                target: format!("{}.{}", base_schema, base_name),
            });
        }

        Ok(DbObject::new(base_schema, base_name, ObjectType::Table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixture::FixtureClient;
    use std::sync::Arc;

    fn conn_with(client: FixtureClient) -> DbConnection {
        DbConnection::connect(Arc::new(client)).unwrap()
    }

    #[tokio::test]
    async fn test_synonym_list() {
        let client = FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP").on(
            "FROM SYSCAT.TABLES",
            vec![FixtureClient::row(vec![
                Some("APP"),
                Some("ORDERS_ALIAS"),
                Some("APP"),
                Some("ORDERS"),
                Some("shortcut"),
            ])],
        );
        let conn = conn_with(client);
        let reader = Db2SynonymReader::new(DialectTag::Db2Luw);
        let list = reader.get_synonyms(&conn, "", "%").await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "ORDERS_ALIAS");
        assert_eq!(list[0].object_type, ObjectType::Synonym);
        assert_eq!(list[0].comment.as_deref(), Some("shortcut"));
    }

    #[tokio::test]
    async fn test_synonym_target_resolves() {
        let client = FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP")
            .on(
                "BASE_TABSCHEMA",
                vec![FixtureClient::row(vec![
                    Some("APP"),
                    Some("ORDERS_ALIAS"),
                    Some("SALES"),
                    Some("ORDERS"),
                    None,
                ])],
            )
            .on("SELECT 1 FROM SYSCAT.TABLES", vec![FixtureClient::full_row(vec!["1"])]);
        let conn = conn_with(client);
        let reader = Db2SynonymReader::new(DialectTag::Db2Luw);

        let synonym = DbObject::new("APP", "ORDERS_ALIAS", ObjectType::Synonym);
        let target = reader.get_synonym_table(&conn, &synonym).await.unwrap();
        assert_eq!(target.schema.as_deref(), Some("SALES"));
        assert_eq!(target.name, "ORDERS");
        assert_eq!(target.object_type, ObjectType::Table);
    }

    #[tokio::test]
    async fn test_missing_target_is_rethrown() {
        // The synonym row exists but its base table does not.
        let client = FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP").on(
            "BASE_TABSCHEMA",
            vec![FixtureClient::row(vec![
                Some("APP"),
                Some("ORDERS_ALIAS"),
                Some("SALES"),
                Some("DROPPED_TABLE"),
                None,
            ])],
        );
        let conn = conn_with(client);
        let reader = Db2SynonymReader::new(DialectTag::Db2Luw);

        let synonym = DbObject::new("APP", "ORDERS_ALIAS", ObjectType::Synonym);
        let err = reader.get_synonym_table(&conn, &synonym).await.unwrap_err();
        assert!(matches!(err, MetaError::SynonymTarget { .. }));
        assert!(err.to_string().contains("SALES.DROPPED_TABLE"));
    }

    #[tokio::test]
    async fn test_catalog_error_in_listing_degrades_to_empty() {
        let client =
            FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP").fail_on("SYSCAT.TABLES");
        let conn = conn_with(client);
        let reader = Db2SynonymReader::new(DialectTag::Db2Luw);
        assert!(reader.get_synonyms(&conn, "APP", "%").await.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_error_in_resolution_is_rethrown() {
        let client =
            FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP").fail_on("SYSCAT.TABLES");
        let conn = conn_with(client);
        let reader = Db2SynonymReader::new(DialectTag::Db2Luw);
        let synonym = DbObject::new("APP", "ORDERS_ALIAS", ObjectType::Synonym);
        assert!(reader.get_synonym_table(&conn, &synonym).await.is_err());
    }
}
