use serde::{Deserialize, Serialize};

/// A neighbour candidate with its combined distance to the query product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub product_id: u64,
    /// Primary (squared L2) distance plus Euclidean distance over every
    /// secondary attribute column.
    pub distance: f32,
}
