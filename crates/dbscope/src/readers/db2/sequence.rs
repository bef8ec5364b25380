//! DB2 sequence reader.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::{DbConnection, Row};
use crate::ddl::{build_sequence_ddl, DdlOptions};
use crate::dialect::DialectTag;
use crate::error::Result;
use crate::model::{PropertyValue, SequenceDefinition, SequenceProperty};
use crate::readers::SequenceReader;
use crate::sql::name_predicate;

/// Per-variant query shape. All three produce the same eleven-column
/// layout: schema, name, start, min, max, increment, cycle, order,
/// cache, data type, remarks.
struct SequenceQuery {
    select: &'static str,
    base_filter: Option<&'static str>,
    schema_col: &'static str,
    name_col: &'static str,
}

const LUW_SEQUENCES: SequenceQuery = SequenceQuery {
    select: "SELECT s.SEQSCHEMA, s.SEQNAME, s.START, s.MINVALUE, s.MAXVALUE, \
             s.INCREMENT, s.CYCLE, s.ORDER, s.CACHE, t.TYPENAME, s.REMARKS \
             FROM SYSCAT.SEQUENCES s \
             JOIN SYSCAT.DATATYPES t ON t.TYPEID = s.DATATYPEID",
    base_filter: Some("s.SEQTYPE = 'S'"),
    schema_col: "s.SEQSCHEMA",
    name_col: "s.SEQNAME",
};

const ZOS_SEQUENCES: SequenceQuery = SequenceQuery {
    select: "SELECT SCHEMA, NAME, START, MINVALUE, MAXVALUE, \
             INCREMENT, CYCLE, ORDER, CACHE, CAST(NULL AS VARCHAR(30)), REMARKS \
             FROM SYSIBM.SYSSEQUENCES",
    base_filter: Some("SEQTYPE = 'S'"),
    schema_col: "SCHEMA",
    name_col: "NAME",
};

const ISERIES_SEQUENCES: SequenceQuery = SequenceQuery {
    select: "SELECT SEQUENCE_SCHEMA, SEQUENCE_NAME, START, MINIMUM_VALUE, MAXIMUM_VALUE, \
             INCREMENT, CYCLE, ORDER, CACHE, DATA_TYPE, LONG_COMMENT \
             FROM QSYS2.SYSSEQUENCES",
    base_filter: None,
    schema_col: "SEQUENCE_SCHEMA",
    name_col: "SEQUENCE_NAME",
};

fn sequence_query(tag: DialectTag) -> &'static SequenceQuery {
    match tag {
        DialectTag::Db2ZOs => &ZOS_SEQUENCES,
        DialectTag::Db2ISeries => &ISERIES_SEQUENCES,
        _ => &LUW_SEQUENCES,
    }
}

/// Sequence reader for the DB2 family.
pub struct Db2SequenceReader {
    tag: DialectTag,
}

impl Db2SequenceReader {
    pub fn new(tag: DialectTag) -> Self {
        Self { tag }
    }

    async fn fetch(
        &self,
        conn: &DbConnection,
        schema: &str,
        name_pattern: &str,
    ) -> Result<Vec<SequenceDefinition>> {
        let schema = conn.resolve_schema(schema).await?;
        let query = sequence_query(self.tag);

        let mut conditions = Vec::new();
        if let Some(filter) = query.base_filter {
            conditions.push(filter.to_string());
        }
        conditions.push(format!(
            "{} = '{}'",
            query.schema_col,
            crate::sql::escape_literal(&schema)
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
        let mut result: Vec<SequenceDefinition> =
            rows.iter().filter_map(parse_sequence_row).collect();
        result.sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));

        debug!(
            "Retrieved {} sequences for {} ({})",
            result.len(),
            schema,
            self.tag
        );
        Ok(result)
    }
}

/// Map one catalog row onto a definition. Absent cells stay absent:
/// an unknown option must not turn into a zero.
fn parse_sequence_row(row: &Row) -> Option<SequenceDefinition> {
    let schema = row.get_string(0)?;
    let name = row.get_string(1)?;
    let mut seq = SequenceDefinition::new(schema, name);

    let int_keys = [
        (2, SequenceProperty::Start),
        (3, SequenceProperty::MinValue),
        (4, SequenceProperty::MaxValue),
        (5, SequenceProperty::Increment),
        (8, SequenceProperty::CacheSize),
    ];
    for (idx, key) in int_keys {
        if let Some(v) = row.get_i64(idx) {
            seq.set_property(key, PropertyValue::Int(v));
        }
    }

    // Cycle and order arrive as catalog flags (Y/N, YES/NO); keep them
    // as text so the loose typing survives round trips.
    for (idx, key) in [(6, SequenceProperty::Cycle), (7, SequenceProperty::Ordered)] {
        if let Some(v) = row.get_string(idx) {
            seq.set_property(key, PropertyValue::Text(v));
        }
    }

    if let Some(data_type) = row.get_string(9) {
        seq.set_property(SequenceProperty::DataType, PropertyValue::Text(data_type));
    }
    seq.comment = row.get_string(10);

    Some(seq)
}

#[async_trait]
impl SequenceReader for Db2SequenceReader {
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
        build_sequence_ddl(seq, self.tag, opts)
    }
}
