//! Recommendation orchestration over the content filter, the value-function
//! agent and the activity log.
//!
//! - [`RecommendationOrchestrator::get_recommendations`]: ranked, deduplicated
//!   products for a user.
//! - [`RecommendationOrchestrator::run_training_cycle`]: one training sweep.
//! - [`TrainingScheduler::spawn`]: periodic sweeps with a stop handle.
//! - [`RecConfig::from_env`]: process configuration.

pub mod catalog;
pub mod errors;
mod orchestrator;
mod reward;
pub mod structs;
mod training;

pub use catalog::{Catalog, CatalogEntry, JsonlCatalog};
pub use errors::recommender_error::RecommenderError;
pub use orchestrator::{RecommendationOrchestrator, merge_ranked};
pub use reward::reward_for;
pub use structs::product_tracking::ProductTracking;
pub use structs::rec_config::{RecConfig, parse_category_files};
pub use structs::recommended_product::{RecommendationSource, RecommendedProduct};
pub use structs::training_report::TrainingReport;
pub use training::{TrainingHandle, TrainingScheduler};
