//! DB2 user-defined type reader.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::{DbConnection, Row};
use crate::dialect::DialectTag;
use crate::error::Result;
use crate::model::{MetaType, TypeAttribute, UserDefinedType};
use crate::readers::TypeReader;
use crate::sql::{escape_literal, name_predicate};

/// Per-variant type listing. Layout: schema, name, metatype code, base
/// type, length, array length, remarks.
struct TypeQuery {
    select: &'static str,
    base_filter: Option<&'static str>,
    schema_col: &'static str,
    name_col: &'static str,
}

const LUW_TYPES: TypeQuery = TypeQuery {
    select: "SELECT TYPESCHEMA, TYPENAME, METATYPE, SOURCENAME, LENGTH, ARRAY_LENGTH, REMARKS \
             FROM SYSCAT.DATATYPES",
    base_filter: Some("METATYPE <> 'S'"),
    schema_col: "TYPESCHEMA",
    name_col: "TYPENAME",
};

// z/OS only has distinct types; the catalog carries no metatype column.
const ZOS_TYPES: TypeQuery = TypeQuery {
    select: "SELECT SCHEMA, NAME, 'T', SOURCETYPE, LENGTH, CAST(NULL AS INTEGER), REMARKS \
             FROM SYSIBM.SYSDATATYPES",
    base_filter: None,
    schema_col: "SCHEMA",
    name_col: "NAME",
};

const ISERIES_TYPES: TypeQuery = TypeQuery {
    select: "SELECT USER_DEFINED_TYPE_SCHEMA, USER_DEFINED_TYPE_NAME, 'T', SOURCE_TYPE, \
             CHARACTER_MAXIMUM_LENGTH, CAST(NULL AS INTEGER), LONG_COMMENT \
             FROM QSYS2.SYSTYPES",
    base_filter: None,
    schema_col: "USER_DEFINED_TYPE_SCHEMA",
    name_col: "USER_DEFINED_TYPE_NAME",
};

fn type_query(tag: DialectTag) -> &'static TypeQuery {
    match tag {
        DialectTag::Db2ZOs => &ZOS_TYPES,
        DialectTag::Db2ISeries => &ISERIES_TYPES,
        _ => &LUW_TYPES,
    }
}

/// Attach the length to base types that carry one.
fn base_type_with_length(base: &str, length: Option<i64>) -> String {
    match length {
        Some(len) if len > 0 => {
            let upper = base.to_uppercase();
            if upper.contains("CHAR") || upper.ends_with("LOB") || upper == "GRAPHIC" {
                return format!("{}({})", base, len);
            }
            base.to_string()
        }
        _ => base.to_string(),
    }
}

fn parse_type_row(row: &Row) -> Option<UserDefinedType> {
    let schema = row.get_string(0)?;
    let name = row.get_string(1)?;
    let code = row.get(2).unwrap_or("R");
    let base = row
        .get(3)
        .map(|b| base_type_with_length(b, row.get_i64(4)));
    let meta = MetaType::from_catalog_code(code, base.as_deref(), row.get_i64(5));

    let mut udt = UserDefinedType::new(schema, name, meta);
    udt.comment = row.get_string(6);
    Some(udt)
}

/// User-defined type reader for the DB2 family.
pub struct Db2TypeReader {
    tag: DialectTag,
}

impl Db2TypeReader {
    pub fn new(tag: DialectTag) -> Self {
        Self { tag }
    }

    async fn fetch(
        &self,
        conn: &DbConnection,
        schema: &str,
        name_pattern: &str,
    ) -> Result<Vec<UserDefinedType>> {
        let schema = conn.resolve_schema(schema).await?;
        let query = type_query(self.tag);

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
        let mut result: Vec<UserDefinedType> = rows.iter().filter_map(parse_type_row).collect();
        result.sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));

        debug!("Retrieved {} types for {}", result.len(), schema);
        Ok(result)
    }
}

#[async_trait]
impl TypeReader for Db2TypeReader {
    async fn get_types(
        &self,
        conn: &DbConnection,
        schema: &str,
        name_pattern: &str,
    ) -> Vec<UserDefinedType> {
        match self.fetch(conn, schema, name_pattern).await {
            Ok(list) => list,
            Err(e) => {
                warn!("Could not retrieve user-defined types: {}", e);
                Vec::new()
            }
        }
    }

    async fn load_attributes(&self, conn: &DbConnection, udt: &mut UserDefinedType) {
        if udt.attributes_loaded() {
            return;
        }
        if !udt.meta_type.has_attributes() {
            udt.set_attributes(Vec::new());
            return;
        }
        // Attribute catalogs only exist on LUW; elsewhere this is an
        // intentional no-op, not a failure.
        if self.tag != DialectTag::Db2Luw {
            udt.set_attributes(Vec::new());
            return;
        }

        let sql = match &udt.meta_type {
            MetaType::Row { .. } => format!(
                "SELECT FIELDNAME, FIELDTYPENAME FROM SYSCAT.ROWFIELDS \
                 WHERE TYPESCHEMA = '{}' AND TYPENAME = '{}' ORDER BY ORDINAL",
                escape_literal(&udt.schema),
                escape_literal(&udt.name)
            ),
            _ => format!(
                "SELECT ATTR_NAME, ATTR_TYPENAME FROM SYSCAT.ATTRIBUTES \
                 WHERE TYPESCHEMA = '{}' AND TYPENAME = '{}' ORDER BY ORDINAL",
                escape_literal(&udt.schema),
                escape_literal(&udt.name)
            ),
        };

        match conn.client().query(&sql).await {
            Ok(rows) => {
                let attrs = rows
                    .iter()
                    .filter_map(|row| {
                        Some(TypeAttribute::new(row.get_string(0)?, row.get_string(1)?))
                    })
                    .collect();
                udt.set_attributes(attrs);
            }
            Err(e) => {
                warn!(
                    "Could not retrieve attributes for {}: {}",
                    udt.full_name(),
                    e
                );
                udt.set_attributes(Vec::new());
            }
        }
    }
}
