//! SQL Server BCP format file writer.
//!
//! Layout (fixed-width, left-aligned columns):
//!
//! ```text
//! 12.0
//! 3
//! 1       SQLCHAR       0       0       "\t"       1     id
//! 2       SQLCHAR       0       0       "\t"       2     firstname
//! 3       SQLCHAR       0       0       "\r\n"     3     lastname
//! ```
//!
//! The first line is the format version token, the second the column
//! count. Every column line carries the field delimiter except the
//! last, which carries the row terminator.

use super::{ExportOptions, FormatFileWriter};

/// Version token the external tool accepts; never varied.
const FORMAT_VERSION: &str = "12.0";

/// Render control characters the way the tool spells them.
fn escape_delimiter(delimiter: &str) -> String {
    delimiter
        .replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

/// BCP format file writer.
#[derive(Default)]
pub struct BcpFormatWriter;

impl BcpFormatWriter {
    pub fn new() -> Self {
        Self
    }
}

impl FormatFileWriter for BcpFormatWriter {
    fn file_extension(&self) -> &str {
        "fmt"
    }

    fn render(&self, export: &ExportOptions) -> String {
        let mut out = String::new();
        out.push_str(FORMAT_VERSION);
        out.push('\n');
        out.push_str(&export.columns.len().to_string());
        out.push('\n');

        let field_delim = escape_delimiter(&export.field_delimiter);
        let row_term = escape_delimiter(&export.row_terminator);

        for (i, column) in export.columns.iter().enumerate() {
            let ordinal = i + 1;
            let delimiter = if i + 1 == export.columns.len() {
                &row_term
            } else {
                &field_delim
            };
            out.push_str(&format!(
                "{:<8}{:<14}{:<8}{:<8}{:<11}{:<6}{}\n",
                ordinal,
                "SQLCHAR",
                0,
                0,
                format!("\"{}\"", delimiter),
                ordinal,
                column.name
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnIdentifier, DbObject, ObjectType};

    fn sample_export() -> ExportOptions {
        ExportOptions::new(
            "/tmp/people.txt",
            DbObject::new("dbo", "people", ObjectType::Table),
            vec![
                ColumnIdentifier::new("id", "int"),
                ColumnIdentifier::new("firstname", "varchar(50)"),
                ColumnIdentifier::new("lastname", "varchar(50)"),
            ],
        )
    }

    #[test]
    fn test_layout_for_three_columns_with_tab_delimiter() {
        let writer = BcpFormatWriter::new();
        let out = writer.render(&sample_export());
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "12.0");
        assert_eq!(lines[1], "3");
        assert_eq!(lines.len(), 5);

        // The first two column lines carry the tab escape, the last the
        // row terminator escape.
        assert!(lines[2].contains("\"\\t\""));
        assert!(lines[3].contains("\"\\t\""));
        assert!(lines[4].contains("\"\\r\\n\""));
        assert!(!lines[4].contains("\"\\t\""));

        // Ordinals and column names in input order.
        assert!(lines[2].starts_with("1       SQLCHAR"));
        assert!(lines[2].ends_with("id"));
        assert!(lines[3].starts_with('2'));
        assert!(lines[3].ends_with("firstname"));
        assert!(lines[4].starts_with('3'));
        assert!(lines[4].ends_with("lastname"));
    }

    #[test]
    fn test_destination_ordinal_matches_source() {
        let writer = BcpFormatWriter::new();
        let out = writer.render(&sample_export());
        let line = out.lines().nth(3).unwrap();
        // ordinal SQLCHAR 0 0 "<delim>" destOrdinal name
        let fields: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(fields[0], "2");
        assert_eq!(fields[1], "SQLCHAR");
        assert_eq!(fields[2], "0");
        assert_eq!(fields[3], "0");
        assert_eq!(fields[5], "2");
        assert_eq!(fields[6], "firstname");
    }

    #[test]
    fn test_extension() {
        assert_eq!(BcpFormatWriter::new().file_extension(), "fmt");
    }
}
