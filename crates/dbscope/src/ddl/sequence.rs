//! Sequence option formatting, shared between `CREATE SEQUENCE` DDL
//! and identity-column clauses.

use crate::dialect::DialectTag;
use crate::model::{SequenceDefinition, SequenceProperty};
use crate::sql::qualify;

use super::{terminate, DdlOptions};

/// Cache size the platform uses when none was specified.
pub const DEFAULT_CACHE_SIZE: i64 = 20;

/// Render the option clauses of a sequence.
///
/// `pretty` produces one clause per line with every `NO ...` default
/// spelled out; compact mode produces a single line and omits clauses
/// whose value is the platform default. Absent properties are treated
/// as unknown, which per clause means either "emit the explicit NO
/// form" (pretty) or "say nothing" (compact) — never "assume zero".
pub fn format_sequence_options(
    seq: &SequenceDefinition,
    tag: DialectTag,
    pretty: bool,
) -> String {
    let mut clauses: Vec<String> = Vec::new();

    if let Some(start) = seq.int_property(SequenceProperty::Start) {
        if start > 0 {
            clauses.push(format!("START WITH {}", start));
        }
    }

    let increment = seq.int_property(SequenceProperty::Increment).unwrap_or(1);
    clauses.push(format!("INCREMENT BY {}", increment));

    // The "no minimum" sentinel is dialect data (1 on LUW/IBM i, 0 on
    // z/OS); a value equal to the sentinel renders as NO MINVALUE.
    match seq.int_property(SequenceProperty::MinValue) {
        Some(min) if min != tag.no_min_sentinel() => {
            clauses.push(format!("MINVALUE {}", min));
        }
        _ => {
            if pretty {
                clauses.push("NO MINVALUE".to_string());
            }
        }
    }

    // MAXVALUE equal to the platform maximum is suppressed.
    match seq.int_property(SequenceProperty::MaxValue) {
        Some(max) if max != tag.max_sentinel() => {
            clauses.push(format!("MAXVALUE {}", max));
        }
        _ => {
            if pretty {
                clauses.push("NO MAXVALUE".to_string());
            }
        }
    }

    match seq.int_property(SequenceProperty::CacheSize) {
        Some(0) => clauses.push("NO CACHE".to_string()),
        Some(cache) => {
            if pretty || cache != DEFAULT_CACHE_SIZE {
                clauses.push(format!("CACHE {}", cache));
            }
        }
        None => {
            if pretty {
                clauses.push("NO CACHE".to_string());
            }
        }
    }

    match seq.bool_property(SequenceProperty::Cycle) {
        Some(true) => clauses.push("CYCLE".to_string()),
        _ => {
            if pretty {
                clauses.push("NO CYCLE".to_string());
            }
        }
    }

    match seq.bool_property(SequenceProperty::Ordered) {
        Some(true) => clauses.push("ORDER".to_string()),
        _ => {
            if pretty {
                clauses.push("NO ORDER".to_string());
            }
        }
    }

    if pretty {
        clauses.join("\n  ")
    } else {
        clauses.join(" ")
    }
}

/// Render re-executable `CREATE SEQUENCE` DDL, followed by a
/// `COMMENT ON SEQUENCE` statement when the catalog carries remarks.
pub fn build_sequence_ddl(seq: &SequenceDefinition, tag: DialectTag, opts: &DdlOptions) -> String {
    let mut stmt = format!("CREATE SEQUENCE {}", qualify(&seq.schema, &seq.name));

    if let Some(data_type) = seq.text_property(SequenceProperty::DataType) {
        // INTEGER is the platform default and is not repeated.
        if !data_type.eq_ignore_ascii_case("INTEGER") {
            stmt.push_str(&format!("\n  AS {}", data_type));
        }
    }

    stmt.push_str("\n  ");
    stmt.push_str(&format_sequence_options(seq, tag, true));

    let mut out = terminate(stmt, opts);

    if let Some(comment) = &seq.comment {
        let stmt = format!(
            "COMMENT ON SEQUENCE {} IS '{}'",
            qualify(&seq.schema, &seq.name),
            crate::sql::escape_literal(comment)
        );
        out.push_str(&terminate(stmt, opts));
    }

    out
}

/// Render the identity clause of a column, reusing the compact option
/// format: `GENERATED {ALWAYS|BY DEFAULT} AS IDENTITY (<options>)`.
pub fn identity_clause(always: bool, seq: &SequenceDefinition, tag: DialectTag) -> String {
    format!(
        "GENERATED {} AS IDENTITY ({})",
        if always { "ALWAYS" } else { "BY DEFAULT" },
        format_sequence_options(seq, tag, false)
    )
}
