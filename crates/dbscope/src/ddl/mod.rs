//! DDL text builders.
//!
//! Every builder in this module renders re-executable SQL and ends each
//! statement with `;` followed by the configured line terminator — the
//! one terminator convention shared across object kinds.

mod index;
mod sequence;
mod udt;

pub use index::build_index_ddl;
pub use sequence::{
    build_sequence_ddl, format_sequence_options, identity_clause, DEFAULT_CACHE_SIZE,
};
pub use udt::build_type_ddl;

use crate::model::{DbObject, ViewGrant};
use crate::sql::qualify;

/// Rendering options shared by all DDL builders.
#[derive(Debug, Clone)]
pub struct DdlOptions {
    /// Line terminator appended after the closing `;` of every
    /// statement.
    pub line_terminator: String,
}

impl Default for DdlOptions {
    fn default() -> Self {
        Self {
            line_terminator: "\n".to_string(),
        }
    }
}

/// Close a statement: `;` plus the configured line terminator.
pub fn terminate(mut stmt: String, opts: &DdlOptions) -> String {
    stmt.push(';');
    stmt.push_str(&opts.line_terminator);
    stmt
}

/// Render `GRANT` statements for a view's grant list, one per grant.
pub fn build_grant_ddl(view: &DbObject, grants: &[ViewGrant], opts: &DdlOptions) -> String {
    let mut out = String::new();
    let target = qualify(view.schema.as_deref().unwrap_or(""), &view.name);
    for grant in grants {
        let mut stmt = format!(
            "GRANT {} ON {} TO {}",
            grant.privilege, target, grant.grantee
        );
        if grant.grantable {
            stmt.push_str(" WITH GRANT OPTION");
        }
        out.push_str(&terminate(stmt, opts));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectType, Privilege};

    #[test]
    fn test_terminate_appends_semicolon_and_terminator() {
        let opts = DdlOptions {
            line_terminator: "\r\n".to_string(),
        };
        assert_eq!(terminate("CREATE X".to_string(), &opts), "CREATE X;\r\n");
    }

    #[test]
    fn test_grant_ddl() {
        let view = DbObject::new("APP", "V_ORDERS", ObjectType::View);
        let grants = vec![
            ViewGrant::new("REPORTING", Privilege::Select, false),
            ViewGrant::new("ADMIN", Privilege::Update, true),
        ];
        let ddl = build_grant_ddl(&view, &grants, &DdlOptions::default());
        assert_eq!(
            ddl,
            "GRANT SELECT ON APP.V_ORDERS TO REPORTING;\n\
             GRANT UPDATE ON APP.V_ORDERS TO ADMIN WITH GRANT OPTION;\n"
        );
    }
}
