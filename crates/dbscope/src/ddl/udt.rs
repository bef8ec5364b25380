//! DDL reconstruction for user-defined types.
//!
//! Pure function of the [`MetaType`] classification: each variant has
//! exactly one output shape.

use crate::model::{MetaType, TypeAttribute, UserDefinedType};
use crate::sql::qualify;

use super::{terminate, DdlOptions};

/// Render `CREATE TYPE` DDL for a user-defined type.
pub fn build_type_ddl(udt: &UserDefinedType, opts: &DdlOptions) -> String {
    let name = qualify(&udt.schema, &udt.name);

    let stmt = match &udt.meta_type {
        MetaType::Cursor => format!("CREATE TYPE {} AS CURSOR", name),
        MetaType::Distinct { base_type } => {
            let mut stmt = format!("CREATE TYPE {} AS {}", name, base_type);
            if !is_lob_base(base_type) {
                stmt.push_str(" WITH COMPARISONS");
            }
            stmt
        }
        MetaType::Array { base_type, length } => {
            format!("CREATE TYPE {} AS {} ARRAY[{}]", name, base_type, length)
        }
        MetaType::Row { attributes } => {
            format!(
                "CREATE TYPE {} AS ROW (\n{}\n)",
                name,
                render_attributes(attributes)
            )
        }
        MetaType::Structured { attributes } => {
            format!(
                "CREATE TYPE {} AS (\n{}\n)",
                name,
                render_attributes(attributes)
            )
        }
    };

    terminate(stmt, opts)
}

/// The comparisons clause does not apply to LOB-based distinct types.
fn is_lob_base(base_type: &str) -> bool {
    base_type
        .split('(')
        .next()
        .unwrap_or("")
        .trim()
        .to_uppercase()
        .ends_with("LOB")
}

/// Attribute list with names left-aligned, padded to the longest name.
fn render_attributes(attributes: &[TypeAttribute]) -> String {
    let width = attributes.iter().map(|a| a.name.len()).max().unwrap_or(0);
    attributes
        .iter()
        .map(|a| format!("  {:<width$}  {}", a.name, a.type_name, width = width))
        .collect::<Vec<_>>()
        .join(",\n")
}
