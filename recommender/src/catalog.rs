//! Product catalog lookups used to route similarity queries and to decorate
//! recommendations with storefront metrics.

use std::collections::HashMap;
use std::path::Path;

use content_filter::Category;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::recommender_error::RecommenderError;
use crate::structs::product_tracking::ProductTracking;

/// Read-only product metadata. Unknown products yield `None`.
pub trait Catalog: Send + Sync {
    fn category_of(&self, product_id: u64) -> Option<Category>;

    fn tracking(&self, product_id: u64) -> Option<ProductTracking>;
}

/// One catalog line.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub product_id: u64,
    /// Category label; lines with labels outside the schema keep their
    /// tracking but route no similarity queries.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tracking: Option<ProductTracking>,
}

#[derive(Debug, Default)]
struct CatalogRow {
    category: Option<Category>,
    tracking: Option<ProductTracking>,
}

/// Catalog loaded once from a JSONL file and kept in memory.
#[derive(Debug, Default)]
pub struct JsonlCatalog {
    rows: HashMap<u64, CatalogRow>,
}

impl JsonlCatalog {
    /// Load `path`. A missing file yields an empty catalog; malformed lines
    /// are skipped with a warning.
    ///
    /// # Errors
    /// I/O failures other than not-found.
    pub async fn load(path: &Path) -> Result<Self, RecommenderError> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    target: "recommender::catalog",
                    path = %path.display(),
                    "catalog file not found, category lookups will be empty"
                );
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CatalogEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    target: "recommender::catalog",
                    line = lineno + 1,
                    error = %e,
                    "skipping malformed catalog line"
                ),
            }
        }

        let catalog = Self::from_entries(entries);
        info!(
            target: "recommender::catalog",
            path = %path.display(),
            products = catalog.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Later entries for the same product replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let rows = entries
            .into_iter()
            .map(|e| {
                let category = e.category.as_deref().and_then(Category::parse);
                (
                    e.product_id,
                    CatalogRow {
                        category,
                        tracking: e.tracking,
                    },
                )
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Catalog for JsonlCatalog {
    fn category_of(&self, product_id: u64) -> Option<Category> {
        self.rows.get(&product_id).and_then(|r| r.category)
    }

    fn tracking(&self, product_id: u64) -> Option<ProductTracking> {
        self.rows.get(&product_id).and_then(|r| r.tracking.clone())
    }
}
