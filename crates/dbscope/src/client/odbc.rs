//! ODBC-backed catalog client.
//!
//! Requires a driver manager (unixODBC, or the Windows built-in) and a
//! product driver at runtime; enabled with the `odbc` cargo feature.
//!
//! ODBC handles are not thread-safe, so every operation opens a short
//! lived connection from the shared environment and runs under a mutex,
//! one catalog query at a time. Catalog result sets are small; all
//! cells travel as text.

use std::sync::Arc;

use async_trait::async_trait;
use odbc_api::{buffers::TextRowSet, ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{MetaError, Result};

use super::{CatalogClient, ProductInfo, Row, Rows};

/// Batch size for catalog fetches. Catalog result sets are small.
const CATALOG_BATCH_ROWS: usize = 1000;

/// Upper bound for one text cell in a catalog row.
const CATALOG_MAX_CELL_BYTES: usize = 4096;

/// ODBC implementation of [`CatalogClient`].
pub struct OdbcClient {
    env: Arc<Environment>,
    connection_string: String,
    product: ProductInfo,
    current_schema_sql: String,
    search_escape: String,
    /// Serializes ODBC operations.
    op_mutex: Mutex<()>,
}

impl OdbcClient {
    /// Connect and probe the product info once.
    ///
    /// The `current_schema` query and the LIKE escape are fixed at
    /// connect time from the probed product, the same moment dialect
    /// identification happens.
    pub fn connect(connection_string: &str, product: ProductInfo) -> Result<Self> {
        let env = Environment::new().map_err(|e| {
            MetaError::catalog(format!(
                "Failed to create ODBC environment: {}. \
                 Make sure a driver manager (unixODBC) is installed.",
                e
            ))
        })?;

        // Verify the connection before keeping anything.
        {
            let conn = env
                .connect_with_connection_string(connection_string, ConnectionOptions::default())?;
            let _ = conn.execute("SELECT 1 FROM SYSIBM.SYSDUMMY1", ());
        }

        let current_schema_sql = if product.name.to_uppercase().starts_with("DB2") {
            "VALUES CURRENT SCHEMA".to_string()
        } else {
            "SELECT SCHEMA_NAME()".to_string()
        };

        info!(
            "Connected via ODBC: {} {}",
            product.name, product.version
        );

        Ok(Self {
            env: Arc::new(env),
            connection_string: connection_string.to_string(),
            product,
            current_schema_sql,
            search_escape: "\\".to_string(),
            op_mutex: Mutex::new(()),
        })
    }

    /// Override the LIKE escape string reported by the driver.
    pub fn with_search_escape(mut self, escape: &str) -> Self {
        self.search_escape = escape.to_string();
        self
    }

    fn get_connection(&self) -> Result<odbc_api::Connection<'_>> {
        self.env
            .connect_with_connection_string(&self.connection_string, ConnectionOptions::default())
            .map_err(MetaError::from)
    }

    /// Execute a query and fetch all rows as text cells.
    fn execute_query(&self, sql: &str) -> Result<Rows> {
        let conn = self.get_connection()?;

        let mut rows = Vec::new();

        if let Some(mut cursor) = conn.execute(sql, ())? {
            let num_cols = cursor.num_result_cols().map_err(|e| {
                MetaError::catalog(format!("Failed to get column count: {}", e))
            })? as usize;

            let mut buffers = TextRowSet::for_cursor(
                CATALOG_BATCH_ROWS,
                &mut cursor,
                Some(CATALOG_MAX_CELL_BYTES),
            )
            .map_err(|e| MetaError::catalog(format!("Failed to create row buffer: {}", e)))?;

            let mut row_cursor = cursor
                .bind_buffer(&mut buffers)
                .map_err(|e| MetaError::catalog(format!("Failed to bind buffer: {}", e)))?;

            while let Some(batch) = row_cursor
                .fetch()
                .map_err(|e| MetaError::catalog(format!("Failed to fetch rows: {}", e)))?
            {
                for row_idx in 0..batch.num_rows() {
                    let mut cells = Vec::with_capacity(num_cols);
                    for col_idx in 0..num_cols {
                        let value = batch
                            .at(col_idx, row_idx)
                            .map(|bytes| String::from_utf8_lossy(bytes).to_string());
                        cells.push(value);
                    }
                    rows.push(Row::new(cells));
                }
            }
        }

        debug!("Catalog query returned {} rows", rows.len());
        Ok(rows)
    }
}

#[async_trait]
impl CatalogClient for OdbcClient {
    fn product(&self) -> &ProductInfo {
        &self.product
    }

    fn search_escape(&self) -> &str {
        &self.search_escape
    }

    async fn current_schema(&self) -> Result<String> {
        let _guard = self.op_mutex.lock().await;
        let rows = self.execute_query(&self.current_schema_sql)?;
        rows.first()
            .and_then(|r| r.get_string(0))
            .ok_or_else(|| MetaError::catalog("current schema query returned no rows"))
    }

    async fn query(&self, sql: &str) -> Result<Rows> {
        let _guard = self.op_mutex.lock().await;
        self.execute_query(sql)
    }

    async fn driver_procedures(
        &self,
        catalog: Option<&str>,
        schema_pattern: &str,
        name_pattern: &str,
    ) -> Result<Rows> {
        // The ODBC catalog call is not exposed as text SQL; emulate the
        // driver layout with the product's own routine view so callers
        // see the classic column order.
        let _guard = self.op_mutex.lock().await;
        let sql = format!(
            "SELECT CAST(NULL AS VARCHAR(1)), ROUTINESCHEMA, ROUTINENAME, \
             CAST(NULL AS VARCHAR(1)), CAST(NULL AS VARCHAR(1)), CAST(NULL AS VARCHAR(1)), \
             REMARKS, ROUTINETYPE, SPECIFICNAME \
             FROM SYSCAT.ROUTINES \
             WHERE ROUTINESCHEMA LIKE '{}' AND ROUTINENAME LIKE '{}' \
             ORDER BY ROUTINESCHEMA, ROUTINENAME",
            crate::sql::escape_literal(schema_pattern),
            crate::sql::escape_literal(name_pattern),
        );
        debug!(catalog = ?catalog, "Driver-level procedure listing");
        self.execute_query(&sql)
    }
}
