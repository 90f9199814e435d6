//! Content-based filtering over per-category vector stores.
//!
//! Public API:
//! - [`ContentBasedFilter::load`]: read one vector file per configured category.
//! - [`ContentBasedFilter::recommend`]: nearest neighbours of a product by
//!   combined primary + secondary attribute distance.
//!
//! Queries fail closed: unknown category, unknown product or a malformed
//! store yield an empty list, never an error.

pub mod errors;
pub mod structs;
mod vector_file_reader;
mod vector_store;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use tracing::{debug, info, warn};

pub use errors::content_filter_error::ContentFilterError;
pub use structs::category::Category;
pub use structs::neighbor::Neighbor;
pub use structs::vector_columns::VectorColumns;
pub use vector_file_reader::read_vector_file;
pub use vector_store::{FlatL2Index, VectorStore};

/// How many primary-index neighbours to fetch per requested result. The
/// surplus absorbs candidates dropped by filtering.
const OVERFETCH_FACTOR: usize = 3;

/// One [`VectorStore`] per category, immutable after construction.
#[derive(Debug, Default)]
pub struct ContentBasedFilter {
    stores: HashMap<Category, VectorStore>,
}

impl ContentBasedFilter {
    /// Load every configured category.
    ///
    /// # Errors
    /// Any load failure is fatal for the whole filter: a missing or malformed
    /// file means the process must not serve a half-initialized filter.
    pub async fn load(files: &BTreeMap<Category, PathBuf>) -> Result<Self, ContentFilterError> {
        let mut stores = HashMap::with_capacity(files.len());
        for (category, path) in files {
            let store = read_vector_file(path, *category).await?;
            stores.insert(*category, store);
        }

        info!(
            target: "content_filter::load",
            categories = stores.len(),
            "content-based filter ready"
        );

        Ok(Self { stores })
    }

    /// Build a filter from already-constructed stores (later stores replace
    /// earlier ones of the same category).
    pub fn from_stores(stores: impl IntoIterator<Item = VectorStore>) -> Self {
        Self {
            stores: stores.into_iter().map(|s| (s.category(), s)).collect(),
        }
    }

    pub fn categories(&self) -> Vec<Category> {
        let mut out: Vec<Category> = self.stores.keys().copied().collect();
        out.sort();
        out
    }

    pub fn store(&self, category: Category) -> Option<&VectorStore> {
        self.stores.get(&category)
    }

    /// Recommend up to `top_k` product ids similar to `product_id`.
    ///
    /// The query product itself is never returned. With `exclude_seen`, every
    /// id in `seen_ids` is dropped as well.
    pub fn recommend(
        &self,
        product_id: u64,
        category: Category,
        top_k: usize,
        exclude_seen: bool,
        seen_ids: Option<&[u64]>,
    ) -> Vec<u64> {
        self.recommend_scored(product_id, category, top_k, exclude_seen, seen_ids)
            .into_iter()
            .map(|n| n.product_id)
            .collect()
    }

    /// Same as [`recommend`](Self::recommend) but addressed by a free-form
    /// category label; labels outside the schema yield an empty list.
    pub fn recommend_for_label(
        &self,
        product_id: u64,
        label: &str,
        top_k: usize,
        exclude_seen: bool,
        seen_ids: Option<&[u64]>,
    ) -> Vec<u64> {
        match Category::parse(label) {
            Some(category) => self.recommend(product_id, category, top_k, exclude_seen, seen_ids),
            None => {
                debug!(
                    target: "content_filter::recommend",
                    label,
                    "unknown category label"
                );
                Vec::new()
            }
        }
    }

    /// Neighbours sorted by non-decreasing combined distance.
    pub fn recommend_scored(
        &self,
        product_id: u64,
        category: Category,
        top_k: usize,
        exclude_seen: bool,
        seen_ids: Option<&[u64]>,
    ) -> Vec<Neighbor> {
        if top_k == 0 {
            return Vec::new();
        }

        let Some(store) = self.stores.get(&category) else {
            debug!(
                target: "content_filter::recommend",
                category = %category,
                "category not loaded"
            );
            return Vec::new();
        };

        let Some(query_pos) = store.position_of(product_id) else {
            return Vec::new();
        };

        if !store.row_in_bounds(query_pos) {
            warn!(
                target: "content_filter::recommend",
                category = %category,
                product_id,
                position = query_pos,
                "query row missing from attribute columns"
            );
            return Vec::new();
        }

        let Some(query_vec) = store.primary_index().get(query_pos) else {
            return Vec::new();
        };

        let excluded: HashSet<u64> = match (exclude_seen, seen_ids) {
            (true, Some(ids)) => ids.iter().copied().collect(),
            _ => HashSet::new(),
        };

        let candidates = store
            .primary_index()
            .search(query_vec, top_k.saturating_mul(OVERFETCH_FACTOR));

        let mut scored: Vec<Neighbor> = candidates
            .into_iter()
            .filter(|(pos, _)| store.row_in_bounds(*pos))
            .filter_map(|(pos, primary_distance)| {
                let id = store.product_id_at(pos)?;
                if id == product_id || excluded.contains(&id) {
                    return None;
                }
                let secondary = store.secondary_distance(query_pos, pos)?;
                Some(Neighbor {
                    product_id: id,
                    distance: primary_distance + secondary,
                })
            })
            .collect();

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(top_k);
        scored
    }
}
