//! Catalog row transport and the connection wrapper.
//!
//! Readers never talk to a driver directly; they go through
//! [`CatalogClient`], a narrow trait that ships catalog rows as text
//! cells. This keeps the per-dialect readers testable against the
//! scripted [`fixture::FixtureClient`] and leaves the single live
//! implementation ([`odbc`], feature-gated) free to serialize driver
//! access however it needs to.

pub mod fixture;
#[cfg(feature = "odbc")]
pub mod odbc;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dialect::DialectTag;
use crate::error::{MetaError, Result};

/// Product name and version as reported by the driver, probed once per
/// connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    pub version: String,
}

impl ProductInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// One catalog row: text cells, `None` for SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<Option<String>>,
}

impl Row {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self { cells }
    }

    /// Cell as trimmed text. `None` for NULL, out-of-range, or blank.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.cells
            .get(idx)
            .and_then(|c| c.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Cell as an owned string.
    pub fn get_string(&self, idx: usize) -> Option<String> {
        self.get(idx).map(str::to_string)
    }

    /// Cell parsed as an integer. `None` for NULL or unparseable text.
    pub fn get_i64(&self, idx: usize) -> Option<i64> {
        self.get(idx).and_then(|s| s.parse().ok())
    }

    /// Cell as a catalog boolean flag (`Y`, `YES`, `1`, `TRUE`).
    pub fn get_flag(&self, idx: usize) -> bool {
        matches!(
            self.get(idx).map(str::to_uppercase).as_deref(),
            Some("Y") | Some("YES") | Some("1") | Some("TRUE")
        )
    }
}

/// A catalog result set.
pub type Rows = Vec<Row>;

/// Narrow transport for catalog metadata.
///
/// Implementations ship every cell as text — catalog reads are not a
/// data path, and text cells keep the trait object-safe and trivially
/// mockable.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Driver product info, probed once at connect time.
    fn product(&self) -> &ProductInfo;

    /// The escape string the driver uses in `LIKE` patterns.
    fn search_escape(&self) -> &str;

    /// Schema currently in effect for unqualified names.
    async fn current_schema(&self) -> Result<String>;

    /// Run one catalog query and fetch all rows.
    async fn query(&self, sql: &str) -> Result<Rows>;

    /// Driver-level procedure listing (the generic fallback path).
    ///
    /// Rows follow the classic driver catalog layout:
    /// `[catalog, schema, name, _, _, _, remarks, result_type, specific_name]`.
    async fn driver_procedures(
        &self,
        catalog: Option<&str>,
        schema_pattern: &str,
        name_pattern: &str,
    ) -> Result<Rows>;
}

fn default_true() -> bool {
    true
}

/// Per-connection behavior switches.
///
/// These are configuration, not dialect logic: the dialect tag decides
/// which reader runs, the settings decide how it behaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbSettings {
    /// Force the procedure reader onto the generic driver-level path
    /// from the start (static capability hint).
    #[serde(default)]
    pub use_generic_procedure_reader: bool,

    /// Include created global temporary tables in object lists.
    #[serde(default = "default_true")]
    pub retrieve_temp_tables: bool,

    /// Export CLOB columns as external files (affects the control-file
    /// writer's `LOBS FROM` clause).
    #[serde(default)]
    pub clob_as_file: bool,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            use_generic_procedure_reader: false,
            retrieve_temp_tables: true,
            clob_as_file: false,
        }
    }
}

/// RAII guard for the advisory busy flag.
///
/// Dropping the guard releases the connection.
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Connection wrapper: dialect tag, settings, busy flag and identifier
/// normalization.
///
/// The busy flag is an advisory mutex — the calling layer acquires it
/// for the duration of one catalog operation; readers assume no
/// concurrent call is issued against the same connection and implement
/// no locking of their own.
pub struct DbConnection {
    client: Arc<dyn CatalogClient>,
    dialect: DialectTag,
    settings: DbSettings,
    busy: AtomicBool,
}

impl DbConnection {
    /// Wrap a client, identifying the dialect from its product info.
    pub fn connect(client: Arc<dyn CatalogClient>) -> Result<Self> {
        let product = client.product().clone();
        let dialect = DialectTag::from_product(&product.name, &product.version)?;
        tracing::info!(
            "Identified {} {} as dialect {}",
            product.name,
            product.version,
            dialect
        );
        Ok(Self {
            client,
            dialect,
            settings: DbSettings::default(),
            busy: AtomicBool::new(false),
        })
    }

    /// Replace the default settings.
    pub fn with_settings(mut self, settings: DbSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn dialect(&self) -> DialectTag {
        self.dialect
    }

    pub fn settings(&self) -> &DbSettings {
        &self.settings
    }

    pub fn client(&self) -> &dyn CatalogClient {
        self.client.as_ref()
    }

    /// Whether a catalog operation currently owns this connection.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Acquire the advisory busy flag for one catalog operation.
    pub fn try_acquire(&self) -> Result<BusyGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(MetaError::ConnectionBusy);
        }
        Ok(BusyGuard { flag: &self.busy })
    }

    /// Remove one level of quoting and fold case the way the dialect
    /// stores identifiers. This is the only place name normalization
    /// happens; definition objects compare case-sensitively afterwards.
    pub fn adjust_object_name(&self, name: &str) -> String {
        let (inner, was_quoted) = crate::sql::clean_quotes(name);
        if was_quoted {
            return inner.to_string();
        }
        match self.dialect {
            // SQL Server preserves the case identifiers were created with.
            DialectTag::SqlServer => inner.to_string(),
            // The DB2 catalogs store unquoted identifiers in uppercase.
            _ => inner.to_uppercase(),
        }
    }

    /// Resolve a blank schema argument to the connection's current
    /// schema; non-blank arguments are normalized and passed through.
    pub async fn resolve_schema(&self, schema: &str) -> Result<String> {
        if schema.trim().is_empty() {
            self.client.current_schema().await
        } else {
            Ok(self.adjust_object_name(schema))
        }
    }
}

impl std::fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConnection")
            .field("product", self.client.product())
            .field("dialect", &self.dialect)
            .field("busy", &self.is_busy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::fixture::FixtureClient;
    use super::*;

    fn luw_connection() -> DbConnection {
        let client = FixtureClient::new("DB2/LINUXX8664", "SQL11055", "APP");
        DbConnection::connect(Arc::new(client)).unwrap()
    }

    #[test]
    fn test_row_accessors() {
        let row = Row::new(vec![
            Some(" ORDERS ".to_string()),
            None,
            Some("42".to_string()),
            Some("Y".to_string()),
            Some("".to_string()),
        ]);
        assert_eq!(row.get(0), Some("ORDERS"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get_i64(2), Some(42));
        assert!(row.get_flag(3));
        assert_eq!(row.get(4), None);
        assert_eq!(row.get(99), None);
    }

    #[test]
    fn test_dialect_identified_once() {
        let conn = luw_connection();
        assert_eq!(conn.dialect(), DialectTag::Db2Luw);
    }

    #[test]
    fn test_busy_flag_is_advisory_mutex() {
        let conn = luw_connection();
        assert!(!conn.is_busy());
        {
            let _guard = conn.try_acquire().unwrap();
            assert!(conn.is_busy());
            assert!(matches!(
                conn.try_acquire(),
                Err(MetaError::ConnectionBusy)
            ));
        }
        assert!(!conn.is_busy());
    }

    #[test]
    fn test_adjust_object_name_folds_unquoted_db2_names() {
        let conn = luw_connection();
        assert_eq!(conn.adjust_object_name("orders"), "ORDERS");
        assert_eq!(conn.adjust_object_name("\"MixedCase\""), "MixedCase");
    }

    #[tokio::test]
    async fn test_blank_schema_resolves_to_current_schema() {
        let conn = luw_connection();
        assert_eq!(conn.resolve_schema("  ").await.unwrap(), "APP");
        assert_eq!(conn.resolve_schema("other").await.unwrap(), "OTHER");
    }

    #[test]
    fn test_settings_defaults() {
        let settings: DbSettings = serde_json::from_str("{}").unwrap();
        assert!(!settings.use_generic_procedure_reader);
        assert!(settings.retrieve_temp_tables);
        assert!(!settings.clob_as_file);
    }
}
