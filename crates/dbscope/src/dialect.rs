//! Dialect identification (Strategy selection).
//!
//! [`DialectTag`] is the single source of truth for dispatch: every
//! per-dialect decision downstream (reader selection, catalog SQL,
//! sentinel values) is a pure function of the tag. The tag is derived
//! once from the driver's product name/version and is stable for the
//! lifetime of the connection.

use serde::{Deserialize, Serialize};

use crate::error::{MetaError, Result};

/// Closed set of supported product/platform variants.
///
/// Three platform variants of the DB2 family plus SQL Server. No other
/// component may branch on raw product strings; anything that needs
/// dialect-specific behavior takes a `DialectTag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialectTag {
    /// DB2 for Linux, Unix and Windows.
    Db2Luw,
    /// DB2 for z/OS.
    Db2ZOs,
    /// DB2 for IBM i (AS/400, iSeries).
    Db2ISeries,
    /// Microsoft SQL Server.
    SqlServer,
}

impl DialectTag {
    /// Classify a live connection from the driver's product name and
    /// version strings.
    ///
    /// Recognized product names (as reported by the common drivers):
    ///
    /// - `DB2/LINUXX8664`, `DB2/NT64`, `DB2/AIX64`, ... → [`Db2Luw`](Self::Db2Luw)
    /// - product containing `z/OS`, or a `DSN`-prefixed version → [`Db2ZOs`](Self::Db2ZOs)
    /// - `DB2 UDB for AS/400`, or a `QSQ`-prefixed version → [`Db2ISeries`](Self::Db2ISeries)
    /// - `Microsoft SQL Server` → [`SqlServer`](Self::SqlServer)
    pub fn from_product(product: &str, version: &str) -> Result<Self> {
        let name = product.trim().to_uppercase();
        let ver = version.trim().to_uppercase();

        if name.starts_with("MICROSOFT SQL SERVER") {
            return Ok(DialectTag::SqlServer);
        }
        if name.contains("AS/400") || name.contains("DB2/400") || ver.starts_with("QSQ") {
            return Ok(DialectTag::Db2ISeries);
        }
        if name.contains("Z/OS") || ver.starts_with("DSN") {
            return Ok(DialectTag::Db2ZOs);
        }
        if name.starts_with("DB2") {
            return Ok(DialectTag::Db2Luw);
        }

        Err(MetaError::UnknownProduct {
            product: product.to_string(),
            version: version.to_string(),
        })
    }

    /// Stable identifier used in logs and settings keys.
    pub fn ident(self) -> &'static str {
        match self {
            DialectTag::Db2Luw => "db2luw",
            DialectTag::Db2ZOs => "db2zos",
            DialectTag::Db2ISeries => "db2i",
            DialectTag::SqlServer => "sqlserver",
        }
    }

    /// Whether this tag belongs to the DB2 product family.
    pub fn is_db2(self) -> bool {
        !matches!(self, DialectTag::SqlServer)
    }

    /// Sequence value reported by the catalog when no explicit minimum
    /// was given.
    ///
    /// This differs between platforms (1 on LUW and IBM i, 0 on z/OS)
    /// and is treated as dialect data, not normalized away.
    pub fn no_min_sentinel(self) -> i64 {
        match self {
            DialectTag::Db2ZOs => 0,
            _ => 1,
        }
    }

    /// Sequence value the catalog reports for "maximum possible".
    ///
    /// `MAXVALUE` clauses equal to this sentinel are suppressed when
    /// rendering DDL.
    pub fn max_sentinel(self) -> i64 {
        i64::MAX
    }
}

impl std::fmt::Display for DialectTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ident())
    }
}
