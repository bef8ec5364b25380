//! DB2 view grant reader.

use async_trait::async_trait;
use tracing::warn;

use crate::client::{DbConnection, Rows};
use crate::dialect::DialectTag;
use crate::error::Result;
use crate::model::{DbObject, Privilege, ViewGrant};
use crate::readers::ViewGrantReader;
use crate::sql::escape_literal;

/// LUW and z/OS report one row per grantee with one flag column per
/// privilege (`Y` granted, `G` granted with grant option); IBM i
/// reports one row per privilege.
fn grant_sql(tag: DialectTag, schema: &str, name: &str) -> String {
    let schema = escape_literal(schema);
    let name = escape_literal(name);
    match tag {
        DialectTag::Db2ZOs => format!(
            "SELECT GRANTEE, SELECTAUTH, INSERTAUTH, UPDATEAUTH, DELETEAUTH \
             FROM SYSIBM.SYSTABAUTH \
             WHERE TCREATOR = '{}' AND TTNAME = '{}'",
            schema, name
        ),
        DialectTag::Db2ISeries => format!(
            "SELECT GRANTEE, PRIVILEGE_TYPE, IS_GRANTABLE \
             FROM QSYS2.TABLE_PRIVILEGES \
             WHERE TABLE_SCHEMA = '{}' AND TABLE_NAME = '{}'",
            schema, name
        ),
        _ => format!(
            "SELECT GRANTEE, SELECTAUTH, INSERTAUTH, UPDATEAUTH, DELETEAUTH \
             FROM SYSCAT.TABAUTH \
             WHERE TABSCHEMA = '{}' AND TABNAME = '{}'",
            schema, name
        ),
    }
}

const FLAG_PRIVILEGES: [Privilege; 4] = [
    Privilege::Select,
    Privilege::Insert,
    Privilege::Update,
    Privilege::Delete,
];

fn parse_flag_rows(rows: &Rows) -> Vec<ViewGrant> {
    let mut grants = Vec::new();
    for row in rows {
        let Some(grantee) = row.get_string(0) else {
            continue;
        };
        for (i, privilege) in FLAG_PRIVILEGES.iter().enumerate() {
            match row.get(i + 1) {
                Some("Y") => grants.push(ViewGrant::new(grantee.clone(), *privilege, false)),
                Some("G") => grants.push(ViewGrant::new(grantee.clone(), *privilege, true)),
                _ => {}
            }
        }
    }
    grants
}

fn parse_privilege_rows(rows: &Rows) -> Vec<ViewGrant> {
    rows.iter()
        .filter_map(|row| {
            let grantee = row.get_string(0)?;
            let privilege = match row.get(1)? {
                "SELECT" => Privilege::Select,
                "INSERT" => Privilege::Insert,
                "UPDATE" => Privilege::Update,
                "DELETE" => Privilege::Delete,
                _ => return None,
            };
            Some(ViewGrant::new(grantee, privilege, row.get_flag(2)))
        })
        .collect()
}

/// View grant reader for the DB2 family.
pub struct Db2ViewGrantReader {
    tag: DialectTag,
}

impl Db2ViewGrantReader {
    pub fn new(tag: DialectTag) -> Self {
        Self { tag }
    }

    async fn fetch(&self, conn: &DbConnection, view: &DbObject) -> Result<Vec<ViewGrant>> {
        let schema = match &view.schema {
            Some(s) => s.clone(),
            None => conn.resolve_schema("").await?,
        };

        let sql = grant_sql(self.tag, &schema, &view.name);
        let rows = conn.client().query(&sql).await?;

        let mut grants = match self.tag {
            DialectTag::Db2ISeries => parse_privilege_rows(&rows),
            _ => parse_flag_rows(&rows),
        };
        grants.sort_by(|a, b| {
            (a.grantee.clone(), a.privilege.as_str()).cmp(&(b.grantee.clone(), b.privilege.as_str()))
        });
        Ok(grants)
    }
}

#[async_trait]
impl ViewGrantReader for Db2ViewGrantReader {
    async fn get_view_grants(&self, conn: &DbConnection, view: &DbObject) -> Vec<ViewGrant> {
        match self.fetch(conn, view).await {
            Ok(grants) => grants,
            Err(e) => {
                warn!(
                    "Could not retrieve grants for {}: {}",
                    view.full_name(),
                    e
                );
                Vec::new()
            }
        }
    }
}
