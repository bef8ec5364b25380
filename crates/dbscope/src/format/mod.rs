//! Bulk-load format-file writers.
//!
//! A format file is a sibling of an exported data file (same base name,
//! tool-specific extension) describing its column layout to an external
//! bulk-load tool. The layouts are byte-significant wire contracts, not
//! internal conveniences.

mod bcp;
mod db2;

pub use bcp::BcpFormatWriter;
pub use db2::Db2LoadWriter;

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::model::{ColumnIdentifier, DbObject};

/// Everything a writer needs to know about a finished data export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// The exported data file the format file sits beside.
    pub data_file: PathBuf,

    /// Target table of the load.
    pub table: DbObject,

    /// Exported columns, in file order.
    pub columns: Vec<ColumnIdentifier>,

    /// Field delimiter used in the data file.
    pub field_delimiter: String,

    /// Row terminator used in the data file.
    pub row_terminator: String,

    /// Quote character, if values were quoted.
    pub quote_char: Option<char>,

    /// Decimal symbol used for numeric values.
    pub decimal_symbol: char,

    /// Encoding name of the data file.
    pub encoding: String,

    /// Timestamp pattern the export used (`yyyy-MM-dd HH:mm:ss` style).
    pub timestamp_format: String,

    /// Date pattern the export used.
    pub date_format: String,

    /// Whether CLOB values were written as external files.
    pub clob_as_file: bool,
}

impl ExportOptions {
    /// A tab-separated export of `columns` into `data_file` with the
    /// common defaults.
    pub fn new(data_file: impl Into<PathBuf>, table: DbObject, columns: Vec<ColumnIdentifier>) -> Self {
        Self {
            data_file: data_file.into(),
            table,
            columns,
            field_delimiter: "\t".to_string(),
            row_terminator: "\r\n".to_string(),
            quote_char: None,
            decimal_symbol: '.',
            encoding: "UTF-8".to_string(),
            timestamp_format: "yyyy-MM-dd HH:mm:ss".to_string(),
            date_format: "yyyy-MM-dd".to_string(),
            clob_as_file: false,
        }
    }
}

/// Writes a bulk-load descriptor beside an exported data file.
pub trait FormatFileWriter: Send + Sync {
    /// Tool-specific extension of the sibling file.
    fn file_extension(&self) -> &str;

    /// Render the full format-file text.
    fn render(&self, export: &ExportOptions) -> String;

    /// Sibling path: same base name, writer extension.
    fn format_file_path(&self, export: &ExportOptions) -> PathBuf {
        export.data_file.with_extension(self.file_extension())
    }

    /// Write the sibling file. Errors are logged and swallowed: a
    /// missing format file must not abort the data export it belongs
    /// to — the caller treats absence as "format file generation
    /// failed".
    fn write_format_file(&self, export: &ExportOptions) {
        let path = self.format_file_path(export);
        let content = self.render(export);
        if let Err(e) = write_file(&path, &content) {
            error!("Could not write format file {}: {}", path.display(), e);
            return;
        }
        info!("Wrote format file {}", path.display());
    }
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    std::fs::write(path, content)
}
