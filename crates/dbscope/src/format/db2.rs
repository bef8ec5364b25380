//! DB2 load control-script writer.
//!
//! Emits a runnable `IMPORT` script beside the exported data file:
//!
//! ```text
//! IMPORT FROM orders.txt OF DEL
//! LOBS FROM .
//! MODIFIED BY coldel0x09 chardel"" decpt, codepage=1208 timestampformat="YYYY-MM-DD HH:MM:SS" dateformat="YYYY-MM-DD"
//! METHOD P(1, 2, 3)
//! INSERT INTO APP.ORDERS (ID, FIRSTNAME, LASTNAME);
//! ```
//!
//! The `LOBS FROM` clause only appears when a large-object column was
//! exported (or CLOBs were written as external files).

use super::{ExportOptions, FormatFileWriter};

/// Exact encoding names the drivers report, mapped to DB2 codepages.
const CODEPAGES: &[(&str, &str)] = &[
    ("UTF-8", "1208"),
    ("UTF-16", "1200"),
    ("ISO-8859-1", "819"),
    ("ISO-8859-15", "923"),
    ("US-ASCII", "367"),
    ("WINDOWS-1252", "1252"),
    ("CP437", "437"),
];

/// Condensed spellings (no punctuation) some drivers use instead.
const CODEPAGES_CONDENSED: &[(&str, &str)] = &[
    ("UTF8", "1208"),
    ("UTF16", "1200"),
    ("ISO88591", "819"),
    ("ISO885915", "923"),
    ("USASCII", "367"),
    ("CP1252", "1252"),
    ("WINDOWS1252", "1252"),
];

/// Resolve an encoding name to the DB2 codepage token.
fn codepage_for(encoding: &str) -> String {
    let upper = encoding.trim().to_uppercase();
    if let Some((_, cp)) = CODEPAGES.iter().find(|(name, _)| *name == upper) {
        return (*cp).to_string();
    }

    // Fallback: condense the name and try again.
    // TODO: an encoding missing from both tables panics here; pick a
    // neutral fallback codepage once the tool's behavior is confirmed.
    let condensed: String = upper.chars().filter(char::is_ascii_alphanumeric).collect();
    CODEPAGES_CONDENSED
        .iter()
        .find(|(name, _)| *name == condensed)
        .map(|(_, cp)| (*cp).to_string())
        .unwrap()
}

/// Render a delimiter character for the `MODIFIED BY` options. Tab and
/// the double quote have fixed spellings; anything else below code
/// point 32 becomes a two-hex-digit token.
fn render_delimiter(c: char) -> String {
    match c {
        '\t' => "0x09".to_string(),
        '"' => "\"\"".to_string(),
        c if (c as u32) < 32 => format!("0x{:02X}", c as u32),
        c => c.to_string(),
    }
}

/// Translate an export date/time pattern into the DB2 spelling. Most
/// letters fold to their upper-case counterpart; the minutes token
/// `mm` is the one two-letter substitution.
fn translate_datetime_pattern(pattern: &str) -> String {
    pattern
        .chars()
        .map(|c| match c {
            'y' => 'Y',
            'd' => 'D',
            'h' => 'H',
            's' => 'S',
            'm' => 'M',
            other => other,
        })
        .collect()
}

/// DB2 `IMPORT` control-script writer.
#[derive(Default)]
pub struct Db2LoadWriter;

impl Db2LoadWriter {
    pub fn new() -> Self {
        Self
    }
}

impl FormatFileWriter for Db2LoadWriter {
    fn file_extension(&self) -> &str {
        "clp"
    }

    fn render(&self, export: &ExportOptions) -> String {
        let mut out = String::new();

        let file_name = export
            .data_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        out.push_str(&format!("IMPORT FROM {} OF DEL\n", file_name));

        let has_lobs = export.columns.iter().any(|c| c.sql_type.is_lob()) || export.clob_as_file;
        if has_lobs {
            out.push_str("LOBS FROM .\n");
        }

        let mut modifiers: Vec<String> = Vec::new();
        if let Some(delim) = export.field_delimiter.chars().next() {
            modifiers.push(format!("coldel{}", render_delimiter(delim)));
        }
        if let Some(quote) = export.quote_char {
            modifiers.push(format!("chardel{}", render_delimiter(quote)));
        }
        if export.decimal_symbol != '.' {
            modifiers.push(format!("decpt{}", export.decimal_symbol));
        }
        modifiers.push(format!("codepage={}", codepage_for(&export.encoding)));
        modifiers.push(format!(
            "timestampformat=\"{}\"",
            translate_datetime_pattern(&export.timestamp_format)
        ));
        modifiers.push(format!(
            "dateformat=\"{}\"",
            translate_datetime_pattern(&export.date_format)
        ));
        out.push_str(&format!("MODIFIED BY {}\n", modifiers.join(" ")));

        let positions: Vec<String> = (1..=export.columns.len()).map(|i| i.to_string()).collect();
        out.push_str(&format!("METHOD P({})\n", positions.join(", ")));

        let column_names: Vec<&str> = export.columns.iter().map(|c| c.name.as_str()).collect();
        out.push_str(&format!(
            "INSERT INTO {} ({});\n",
            export.table.full_name(),
            column_names.join(", ")
        ));

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnIdentifier, DbObject, ObjectType};
    use indoc::indoc;

    fn sample_export() -> ExportOptions {
        ExportOptions::new(
            "/tmp/orders.txt",
            DbObject::new("APP", "ORDERS", ObjectType::Table),
            vec![
                ColumnIdentifier::new("ID", "INTEGER"),
                ColumnIdentifier::new("FIRSTNAME", "VARCHAR(50)"),
                ColumnIdentifier::new("LASTNAME", "VARCHAR(50)"),
            ],
        )
    }

    #[test]
    fn test_control_script_shape() {
        let writer = Db2LoadWriter::new();
        let out = writer.render(&sample_export());
        assert_eq!(
            out,
            indoc! {r#"
                IMPORT FROM orders.txt OF DEL
                MODIFIED BY coldel0x09 codepage=1208 timestampformat="YYYY-MM-DD HH:MM:SS" dateformat="YYYY-MM-DD"
                METHOD P(1, 2, 3)
                INSERT INTO APP.ORDERS (ID, FIRSTNAME, LASTNAME);
            "#}
        );
    }

    #[test]
    fn test_lobs_clause_only_with_lob_columns() {
        let writer = Db2LoadWriter::new();
        let mut export = sample_export();
        assert!(!writer.render(&export).contains("LOBS FROM ."));

        export.columns.push(ColumnIdentifier::new("NOTES", "CLOB(1M)"));
        assert!(writer.render(&export).contains("LOBS FROM .\n"));
    }

    #[test]
    fn test_clob_as_file_forces_lobs_clause() {
        let writer = Db2LoadWriter::new();
        let mut export = sample_export();
        export.clob_as_file = true;
        assert!(writer.render(&export).contains("LOBS FROM .\n"));
    }

    #[test]
    fn test_modifier_rendering() {
        let writer = Db2LoadWriter::new();
        let mut export = sample_export();
        export.field_delimiter = ";".to_string();
        export.quote_char = Some('"');
        export.decimal_symbol = ',';
        let out = writer.render(&export);
        assert!(out.contains("coldel;"));
        assert!(out.contains("chardel\"\""));
        assert!(out.contains("decpt,"));
    }

    #[test]
    fn test_control_characters_render_as_hex_tokens() {
        assert_eq!(render_delimiter('\t'), "0x09");
        assert_eq!(render_delimiter('\u{1}'), "0x01");
        assert_eq!(render_delimiter('\u{1f}'), "0x1F");
        assert_eq!(render_delimiter('"'), "\"\"");
        assert_eq!(render_delimiter(';'), ";");
    }

    #[test]
    fn test_datetime_pattern_translation() {
        assert_eq!(
            translate_datetime_pattern("yyyy-MM-dd HH:mm:ss"),
            "YYYY-MM-DD HH:MM:SS"
        );
        assert_eq!(translate_datetime_pattern("yyyy-MM-dd"), "YYYY-MM-DD");
        // The minutes token is the substituted one; literal separators
        // pass through unchanged.
        assert_eq!(translate_datetime_pattern("HH:mm"), "HH:MM");
        assert_eq!(translate_datetime_pattern("dd.MM.yyyy"), "DD.MM.YYYY");
    }

    #[test]
    fn test_known_codepages() {
        assert_eq!(codepage_for("UTF-8"), "1208");
        assert_eq!(codepage_for("utf-8"), "1208");
        assert_eq!(codepage_for("ISO-8859-15"), "923");
        // Condensed fallback spelling.
        assert_eq!(codepage_for("UTF8"), "1208");
    }

    /// Pins the known defect: an encoding missing from both lookup
    /// tables panics in the fallback branch instead of degrading.
    #[test]
    #[should_panic]
    fn unknown_encoding_panics_in_codepage_fallback() {
        codepage_for("KOI8-R");
    }

    #[test]
    fn test_extension() {
        assert_eq!(Db2LoadWriter::new().file_extension(), "clp");
    }
}
