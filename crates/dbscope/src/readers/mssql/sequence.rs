//! SQL Server sequence reader (`sys.sequences`).

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::{DbConnection, Row};
use crate::ddl::{build_sequence_ddl, DdlOptions};
use crate::dialect::DialectTag;
use crate::error::Result;
use crate::model::{PropertyValue, SequenceDefinition, SequenceProperty};
use crate::readers::SequenceReader;
use crate::sql::{escape_literal, name_predicate};

const SEQUENCE_SQL: &str = "SELECT sc.name, sq.name, sq.start_value, sq.minimum_value, \
                            sq.maximum_value, sq.increment, sq.is_cycling, sq.is_cached, \
                            sq.cache_size, TYPE_NAME(sq.user_type_id) \
                            FROM sys.sequences sq \
                            JOIN sys.schemas sc ON sq.schema_id = sc.schema_id";

fn parse_row(row: &Row) -> Option<SequenceDefinition> {
    let mut seq = SequenceDefinition::new(row.get_string(0)?, row.get_string(1)?);

    let int_keys = [
        (2, SequenceProperty::Start),
        (3, SequenceProperty::MinValue),
        (4, SequenceProperty::MaxValue),
        (5, SequenceProperty::Increment),
    ];
    for (idx, key) in int_keys {
        if let Some(v) = row.get_i64(idx) {
            seq.set_property(key, PropertyValue::Int(v));
        }
    }

    if let Some(cycling) = row.get(6) {
        seq.set_property(
            SequenceProperty::Cycle,
            PropertyValue::Bool(cycling == "1" || cycling.eq_ignore_ascii_case("true")),
        );
    }

    // is_cached = 0 means NO CACHE; a cached sequence without an
    // explicit size leaves the property unknown.
    match (row.get_flag(7), row.get_i64(8)) {
        (false, _) => seq.set_property(SequenceProperty::CacheSize, PropertyValue::Int(0)),
        (true, Some(size)) => {
            seq.set_property(SequenceProperty::CacheSize, PropertyValue::Int(size))
        }
        (true, None) => {}
    }

    if let Some(type_name) = row.get_string(9) {
        seq.set_property(SequenceProperty::DataType, PropertyValue::Text(type_name));
    }

    Some(seq)
}

/// Sequence reader for SQL Server.
#[derive(Default)]
pub struct SqlServerSequenceReader;

impl SqlServerSequenceReader {
    pub fn new() -> Self {
        Self
    }

    async fn fetch(
        &self,
        conn: &DbConnection,
        schema: &str,
        name_pattern: &str,
    ) -> Result<Vec<SequenceDefinition>> {
        let schema = conn.resolve_schema(schema).await?;

        let mut conditions = vec![format!("sc.name = '{}'", escape_literal(&schema))];
        if !name_pattern.is_empty() {
            conditions.push(name_predicate(
                "sq.name",
                name_pattern,
                conn.client().search_escape(),
            ));
        }

        let sql = format!(
            "{} WHERE {} ORDER BY sc.name, sq.name",
            SEQUENCE_SQL,
            conditions.join(" AND ")
        );

        let rows = conn.client().query(&sql).await?;
        let mut result: Vec<SequenceDefinition> = rows.iter().filter_map(parse_row).collect();
        result.sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));

        debug!("Retrieved {} sequences for {}", result.len(), schema);
        Ok(result)
    }
}

#[async_trait]
impl SequenceReader for SqlServerSequenceReader {
    async fn get_sequences(
        &self,
        conn: &DbConnection,
        schema: &str,
        name_pattern: &str,
    ) -> Vec<SequenceDefinition> {
        match self.fetch(conn, schema, name_pattern).await {
            Ok(list) => list,
            Err(e) => {
                warn!("Could not retrieve sequences: {}", e);
                Vec::new()
            }
        }
    }

    async fn get_sequence_definition(
        &self,
        conn: &DbConnection,
        schema: &str,
        name: &str,
    ) -> Option<SequenceDefinition> {
        self.get_sequences(conn, schema, name)
            .await
            .into_iter()
            .find(|s| s.name == name)
    }

    fn sequence_ddl(&self, seq: &SequenceDefinition, opts: &DdlOptions) -> String {
        build_sequence_ddl(seq, DialectTag::SqlServer, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixture::FixtureClient;
    use std::sync::Arc;

    fn conn_with(rows: Vec<Row>) -> DbConnection {
        let client =
            FixtureClient::new("Microsoft SQL Server", "16.00.1000", "dbo").on("sys.sequences", rows);
        DbConnection::connect(Arc::new(client)).unwrap()
    }

    #[tokio::test]
    async fn test_sequence_parsing() {
        let conn = conn_with(vec![FixtureClient::row(vec![
            Some("dbo"),
            Some("OrderNumbers"),
            Some("1000"),
            Some("1"),
            Some("9223372036854775807"),
            Some("1"),
            Some("0"),
            Some("1"),
            Some("50"),
            Some("bigint"),
        ])]);
        let reader = SqlServerSequenceReader::new();

        let list = reader.get_sequences(&conn, "dbo", "%").await;
        assert_eq!(list.len(), 1);
        let seq = &list[0];
        assert_eq!(seq.name, "OrderNumbers");
        assert_eq!(seq.int_property(SequenceProperty::Start), Some(1000));
        assert_eq!(seq.bool_property(SequenceProperty::Cycle), Some(false));
        assert_eq!(seq.int_property(SequenceProperty::CacheSize), Some(50));
        assert_eq!(
            seq.text_property(SequenceProperty::DataType),
            Some("bigint")
        );
    }

    #[tokio::test]
    async fn test_uncached_sequence_maps_to_no_cache() {
        let conn = conn_with(vec![FixtureClient::row(vec![
            Some("dbo"),
            Some("Plain"),
            Some("1"),
            Some("1"),
            Some("100"),
            Some("1"),
            Some("1"),
            Some("0"),
            None,
            Some("int"),
        ])]);
        let reader = SqlServerSequenceReader::new();

        let seq = reader
            .get_sequence_definition(&conn, "dbo", "Plain")
            .await
            .unwrap();
        assert_eq!(seq.int_property(SequenceProperty::CacheSize), Some(0));
        assert_eq!(seq.bool_property(SequenceProperty::Cycle), Some(true));
    }

    #[tokio::test]
    async fn test_schema_names_keep_their_case() {
        let conn = conn_with(vec![]);
        // SQL Server identifiers are not folded to uppercase.
        assert_eq!(conn.adjust_object_name("Sales"), "Sales");
        let reader = SqlServerSequenceReader::new();
        assert!(reader.get_sequences(&conn, "Sales", "%").await.is_empty());
    }
}
