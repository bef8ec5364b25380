//! Scripted in-memory catalog client.
//!
//! Result sets are registered against SQL fragments; a query returns
//! the rows of the first registered fragment it contains. Used by the
//! unit and integration tests, and handy for driving the browse layer
//! without a live database.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{MetaError, Result};

use super::{CatalogClient, ProductInfo, Row, Rows};

/// One registered script entry.
struct Script {
    fragment: String,
    rows: Rows,
}

/// Scripted [`CatalogClient`] implementation.
pub struct FixtureClient {
    product: ProductInfo,
    current_schema: String,
    escape: String,
    scripts: Mutex<Vec<Script>>,
    failures: Mutex<Vec<String>>,
    executed: Mutex<Vec<String>>,
    driver_procedures: Mutex<Rows>,
}

impl FixtureClient {
    /// Create a client reporting the given product/version and current
    /// schema. The LIKE escape defaults to a backslash.
    pub fn new(product: &str, version: &str, current_schema: &str) -> Self {
        Self {
            product: ProductInfo::new(product, version),
            current_schema: current_schema.to_string(),
            escape: "\\".to_string(),
            scripts: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
            driver_procedures: Mutex::new(Vec::new()),
        }
    }

    /// Override the LIKE escape string.
    pub fn with_escape(mut self, escape: &str) -> Self {
        self.escape = escape.to_string();
        self
    }

    /// Register a result set for queries containing `fragment`.
    /// Earlier registrations win, so register the most specific first.
    pub fn on(self, fragment: &str, rows: Rows) -> Self {
        self.scripts.lock().unwrap().push(Script {
            fragment: fragment.to_string(),
            rows,
        });
        self
    }

    /// Make queries containing `fragment` fail with a catalog error.
    /// Failures are checked before scripts.
    pub fn fail_on(self, fragment: &str) -> Self {
        self.failures.lock().unwrap().push(fragment.to_string());
        self
    }

    /// Canned result for the driver-level procedure listing.
    pub fn with_driver_procedures(self, rows: Rows) -> Self {
        *self.driver_procedures.lock().unwrap() = rows;
        self
    }

    /// Build a row from optional text cells.
    pub fn row(cells: Vec<Option<&str>>) -> Row {
        Row::new(cells.into_iter().map(|c| c.map(str::to_string)).collect())
    }

    /// Build a row where every cell is present.
    pub fn full_row(cells: Vec<&str>) -> Row {
        Row::new(cells.into_iter().map(|c| Some(c.to_string())).collect())
    }

    /// All SQL texts executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    /// How many executed queries contained `fragment`.
    pub fn executed_count(&self, fragment: &str) -> usize {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .filter(|sql| sql.contains(fragment))
            .count()
    }
}

#[async_trait]
impl CatalogClient for FixtureClient {
    fn product(&self) -> &ProductInfo {
        &self.product
    }

    fn search_escape(&self) -> &str {
        &self.escape
    }

    async fn current_schema(&self) -> Result<String> {
        Ok(self.current_schema.clone())
    }

    async fn query(&self, sql: &str) -> Result<Rows> {
        self.executed.lock().unwrap().push(sql.to_string());

        for fragment in self.failures.lock().unwrap().iter() {
            if sql.contains(fragment.as_str()) {
                return Err(MetaError::catalog(format!(
                    "scripted failure for fragment {:?}",
                    fragment
                )));
            }
        }

        let scripts = self.scripts.lock().unwrap();
        for script in scripts.iter() {
            if sql.contains(script.fragment.as_str()) {
                return Ok(script.rows.clone());
            }
        }
        Ok(Vec::new())
    }

    async fn driver_procedures(
        &self,
        _catalog: Option<&str>,
        _schema_pattern: &str,
        _name_pattern: &str,
    ) -> Result<Rows> {
        self.executed
            .lock()
            .unwrap()
            .push("<driver:procedures>".to_string());
        Ok(self.driver_procedures.lock().unwrap().clone())
    }
}
