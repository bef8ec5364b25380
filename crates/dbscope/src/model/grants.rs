//! View grant metadata.

use serde::{Deserialize, Serialize};

/// Privilege kinds surfaced for views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Privilege {
    Select,
    Insert,
    Update,
    Delete,
}

impl Privilege {
    pub fn as_str(self) -> &'static str {
        match self {
            Privilege::Select => "SELECT",
            Privilege::Insert => "INSERT",
            Privilege::Update => "UPDATE",
            Privilege::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Privilege {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One granted privilege on a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewGrant {
    /// Grantee (user, group or role name).
    pub grantee: String,

    /// The granted privilege.
    pub privilege: Privilege,

    /// Whether the grantee may grant the privilege onward.
    pub grantable: bool,
}

impl ViewGrant {
    pub fn new(grantee: impl Into<String>, privilege: Privilege, grantable: bool) -> Self {
        Self {
            grantee: grantee.into(),
            privilege,
            grantable,
        }
    }
}
