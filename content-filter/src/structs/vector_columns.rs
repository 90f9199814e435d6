//! On-disk shape of an offline-computed embedding file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One JSON document per category: parallel columns keyed by name.
///
/// ```json
/// { "product_id": [1, 2], "vector_image": [[..], [..]], "vector_category": [[..], [..]], ... }
/// ```
///
/// Columns are independent arrays and are **not** guaranteed to share a length.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorColumns {
    pub product_id: Vec<u64>,
    #[serde(flatten)]
    pub columns: HashMap<String, Vec<Vec<f32>>>,
}
