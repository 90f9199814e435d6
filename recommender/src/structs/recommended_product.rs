use content_filter::Category;
use serde::{Deserialize, Serialize};

use super::product_tracking::ProductTracking;

/// Which stage of the merge first contributed a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// The user interacted with it.
    Interacted,
    /// Chosen by the value-function agent and not already listed. The
    /// serving path picks from the interaction list, so there it always
    /// shows up as `Interacted` with `agent_endorsed` set; this tag only
    /// appears when [`merge_ranked`](crate::merge_ranked) gets a pick from
    /// outside that list.
    AgentPick,
    /// Neighbour of an interacted product.
    Similar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    pub product_id: u64,
    pub source: RecommendationSource,
    /// The agent's choice, regardless of which stage listed it first.
    pub agent_endorsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<ProductTracking>,
}
