//! In-memory vector store for one category: product ids, an exact L2 index
//! over the primary vectors, and the secondary attribute columns.
//!
//! Row *i* of every column belongs to `product_ids[i]`. Columns are kept as
//! loaded, so a malformed file can leave them with different lengths; every
//! lookup goes through [`VectorStore::row_in_bounds`] before touching data.

use std::collections::HashMap;

use crate::errors::content_filter_error::ContentFilterError;
use crate::structs::category::Category;
use crate::structs::vector_columns::VectorColumns;

/// Exact (brute-force) L2 index. Reports squared Euclidean distances.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatL2Index {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&[f32]> {
        self.vectors.get(pos).map(Vec::as_slice)
    }

    /// Append a vector; its position is the current length.
    pub fn add(&mut self, vector: Vec<f32>) -> Result<(), ContentFilterError> {
        if vector.len() != self.dim {
            return Err(ContentFilterError::DimensionMismatch {
                row: self.vectors.len(),
                got: vector.len(),
                want: self.dim,
            });
        }
        self.vectors.push(vector);
        Ok(())
    }

    /// Return up to `n` `(position, squared_distance)` pairs, nearest first.
    /// Ties keep index order.
    pub fn search(&self, query: &[f32], n: usize) -> Vec<(usize, f32)> {
        if n == 0 || query.len() != self.dim {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(pos, v)| (pos, squared_l2(query, v)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(n);
        scored
    }
}

/// A named secondary attribute column (category, brand, author, ...).
#[derive(Debug, Clone)]
pub struct AttributeColumn {
    pub name: &'static str,
    pub vectors: Vec<Vec<f32>>,
}

/// All vectors for one category plus the primary index.
#[derive(Debug, Clone)]
pub struct VectorStore {
    category: Category,
    product_ids: Vec<u64>,
    positions: HashMap<u64, usize>,
    primary: FlatL2Index,
    secondary: Vec<AttributeColumn>,
}

impl VectorStore {
    /// Build a store from raw columns according to the category schema.
    ///
    /// # Errors
    /// - `MissingColumn` if the primary or any secondary column is absent.
    /// - `EmptyStore` if the primary column is empty.
    /// - `DimensionMismatch` if primary vectors disagree on size.
    pub fn from_columns(
        category: Category,
        mut raw: VectorColumns,
    ) -> Result<Self, ContentFilterError> {
        let primary_name = category.primary_column();
        let primary_rows =
            raw.columns
                .remove(primary_name)
                .ok_or(ContentFilterError::MissingColumn {
                    category: category.label(),
                    column: primary_name,
                })?;

        let dim = primary_rows
            .first()
            .map(Vec::len)
            .ok_or(ContentFilterError::EmptyStore(category.label()))?;

        let mut primary = FlatL2Index::new(dim);
        for row in primary_rows {
            primary.add(row)?;
        }

        let mut secondary = Vec::with_capacity(category.secondary_columns().len());
        for &name in category.secondary_columns() {
            let vectors = raw
                .columns
                .remove(name)
                .ok_or(ContentFilterError::MissingColumn {
                    category: category.label(),
                    column: name,
                })?;
            secondary.push(AttributeColumn { name, vectors });
        }

        // First occurrence wins for duplicated ids.
        let mut positions = HashMap::with_capacity(raw.product_id.len());
        for (pos, id) in raw.product_id.iter().enumerate() {
            positions.entry(*id).or_insert(pos);
        }

        Ok(Self {
            category,
            product_ids: raw.product_id,
            positions,
            primary,
            secondary,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Number of product ids (not necessarily equal to any vector column length).
    pub fn len(&self) -> usize {
        self.product_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.primary.dim()
    }

    pub fn position_of(&self, product_id: u64) -> Option<usize> {
        self.positions.get(&product_id).copied()
    }

    pub fn product_id_at(&self, pos: usize) -> Option<u64> {
        self.product_ids.get(pos).copied()
    }

    pub fn primary_index(&self) -> &FlatL2Index {
        &self.primary
    }

    /// True when `pos` is addressable in the id column, the primary index
    /// and every secondary column.
    pub fn row_in_bounds(&self, pos: usize) -> bool {
        pos < self.product_ids.len()
            && pos < self.primary.len()
            && self.secondary.iter().all(|c| pos < c.vectors.len())
    }

    /// Sum of Euclidean distances between rows `a` and `b` over every
    /// secondary column. `None` if either row is out of bounds or a pair of
    /// vectors disagrees on size.
    pub fn secondary_distance(&self, a: usize, b: usize) -> Option<f32> {
        let mut total = 0.0_f32;
        for column in &self.secondary {
            let va = column.vectors.get(a)?;
            let vb = column.vectors.get(b)?;
            if va.len() != vb.len() {
                return None;
            }
            total += squared_l2(va, vb).sqrt();
        }
        Some(total)
    }
}

/// Squared Euclidean distance; callers guarantee equal lengths.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
