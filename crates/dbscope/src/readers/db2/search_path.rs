//! DB2 schema search-path reader.

use async_trait::async_trait;
use tracing::warn;

use crate::client::DbConnection;
use crate::dialect::DialectTag;
use crate::readers::SearchPathReader;

fn search_path_sql(tag: DialectTag) -> &'static str {
    match tag {
        // VALUES is not available on the host platforms.
        DialectTag::Db2ZOs | DialectTag::Db2ISeries => {
            "SELECT CURRENT PATH FROM SYSIBM.SYSDUMMY1"
        }
        _ => "VALUES CURRENT PATH",
    }
}

/// Split a path register value on commas that are outside quotes, then
/// strip the quoting.
fn parse_path(raw: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in raw.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                entries.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    entries.push(current);

    entries
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

/// Search-path reader for the DB2 family.
pub struct Db2SearchPathReader {
    tag: DialectTag,
}

impl Db2SearchPathReader {
    pub fn new(tag: DialectTag) -> Self {
        Self { tag }
    }
}

#[async_trait]
impl SearchPathReader for Db2SearchPathReader {
    async fn get_search_path(&self, conn: &DbConnection) -> Vec<String> {
        let sql = search_path_sql(self.tag);
        match conn.client().query(sql).await {
            Ok(rows) => rows
                .first()
                .and_then(|row| row.get(0))
                .map(parse_path)
                .unwrap_or_default(),
            Err(e) => {
                warn!("Could not retrieve the search path: {}", e);
                Vec::new()
            }
        }
    }
}
