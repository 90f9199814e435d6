use serde::{Deserialize, Serialize};

/// The `state_size` most recent product ids of a user, most recent first,
/// right-padded with the sentinel `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    product_ids: Vec<u64>,
}

impl UserState {
    /// Build from ids already ordered most recent first.
    pub fn from_recent(recent: impl IntoIterator<Item = u64>, state_size: usize) -> Self {
        let mut product_ids: Vec<u64> = recent.into_iter().take(state_size).collect();
        product_ids.resize(state_size, 0);
        Self { product_ids }
    }

    pub fn product_ids(&self) -> &[u64] {
        &self.product_ids
    }

    pub fn len(&self) -> usize {
        self.product_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty()
    }

    /// Agent input: `ln(1 + id)` per slot, so the sentinel maps to `0.0`.
    pub fn features(&self) -> Vec<f32> {
        self.product_ids
            .iter()
            .map(|&p| (p as f64).ln_1p() as f32)
            .collect()
    }
}
