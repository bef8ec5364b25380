//! DDL reconstruction for indexes.

use crate::model::IndexDefinition;
use crate::sql::qualify;

use super::{terminate, DdlOptions};

/// Render re-executable DDL for an index.
///
/// A primary-key backing index renders as `ALTER TABLE ... ADD PRIMARY
/// KEY`; everything else as `CREATE [UNIQUE] INDEX` with the source
/// options (when loaded) appended in the order the platform prints
/// them.
pub fn build_index_ddl(index: &IndexDefinition, opts: &DdlOptions) -> String {
    let table = qualify(
        index.table.schema.as_deref().unwrap_or(""),
        &index.table.name,
    );
    let columns = index
        .columns
        .iter()
        .map(|c| c.expression())
        .collect::<Vec<_>>()
        .join(", ");

    if index.primary_key {
        let names = index
            .columns
            .iter()
            .map(|c| c.name.clone())
            .collect::<Vec<_>>()
            .join(", ");
        let stmt = format!("ALTER TABLE {} ADD PRIMARY KEY ({})", table, names);
        return terminate(stmt, opts);
    }

    let mut stmt = format!(
        "CREATE {}INDEX {}\n  ON {} ({})",
        if index.unique { "UNIQUE " } else { "" },
        qualify(&index.schema, &index.name),
        table,
        columns
    );

    if let Some(options) = index.source_options() {
        if !options.include_columns.is_empty() {
            stmt.push_str(&format!(
                "\n  INCLUDE ({})",
                options.include_columns.join(", ")
            ));
        }
        if options.clustered {
            stmt.push_str("\n  CLUSTER");
        }
        if options.reverse_scans {
            stmt.push_str("\n  ALLOW REVERSE SCANS");
        }
        if options.compressed {
            stmt.push_str("\n  COMPRESS YES");
        }
    }

    terminate(stmt, opts)
}
