//! Composes activity signals, the agent's pick and neighbour expansion into
//! one ranked product list, and drives the agent's training sweep.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use activity_log::{ActivityAggregator, ActivityEvent, ActivityType};
use content_filter::ContentBasedFilter;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};
use value_agent::{ReplayOutcome, ValueFunctionAgent, write_snapshot};

use crate::catalog::Catalog;
use crate::errors::recommender_error::RecommenderError;
use crate::reward::reward_for;
use crate::structs::recommended_product::{RecommendationSource, RecommendedProduct};
use crate::structs::training_report::TrainingReport;

const DEFAULT_NEIGHBOR_SEEDS: usize = 5;
const DEFAULT_NEIGHBOR_TOP_K: usize = 15;

/// Home feed shape: seed count, neighbours per seed, total length.
const HOME_FEED_SEEDS: usize = 5;
const HOME_FEED_TOP_K: usize = 3;
const HOME_FEED_LIMIT: usize = 9;

pub struct RecommendationOrchestrator {
    filter: Arc<ContentBasedFilter>,
    aggregator: ActivityAggregator,
    agent: Arc<RwLock<ValueFunctionAgent>>,
    catalog: Arc<dyn Catalog>,
    neighbor_seeds: usize,
    neighbor_top_k: usize,
}

impl RecommendationOrchestrator {
    pub fn new(
        filter: Arc<ContentBasedFilter>,
        aggregator: ActivityAggregator,
        agent: Arc<RwLock<ValueFunctionAgent>>,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        Self {
            filter,
            aggregator,
            agent,
            catalog,
            neighbor_seeds: DEFAULT_NEIGHBOR_SEEDS,
            neighbor_top_k: DEFAULT_NEIGHBOR_TOP_K,
        }
    }

    /// Bound neighbour expansion: the first `seeds` interacted products, each
    /// contributing up to `top_k` neighbours.
    pub fn with_neighbors(mut self, seeds: usize, top_k: usize) -> Self {
        self.neighbor_seeds = seeds;
        self.neighbor_top_k = top_k;
        self
    }

    pub fn agent(&self) -> &Arc<RwLock<ValueFunctionAgent>> {
        &self.agent
    }

    pub fn filter(&self) -> &ContentBasedFilter {
        &self.filter
    }

    // ── Serving ─────────────────────────────────────────────────────────────

    /// Ranked, duplicate-free recommendations for `user_id`.
    ///
    /// Order: interaction list, then the agent-endorsed product, then
    /// neighbours of the leading interacted products. An empty history
    /// yields an empty list.
    ///
    /// # Errors
    /// Only when the activity log itself fails.
    pub async fn get_recommendations(
        &self,
        user_id: u64,
        limit: Option<usize>,
    ) -> Result<Vec<RecommendedProduct>, RecommenderError> {
        let (interactions, state) = self.aggregator.derive(user_id).await?;
        if interactions.is_empty() {
            debug!(target: "recommender::serve", user_id, "no interactions, nothing to personalize");
            return Ok(Vec::new());
        }

        let action = self.agent.read().await.act(&state.features());
        let pick = interactions[action % interactions.len()];

        let mut neighbours = Vec::new();
        for &seed in interactions.iter().take(self.neighbor_seeds) {
            let Some(category) = self.catalog.category_of(seed) else {
                continue;
            };
            neighbours.extend(self.filter.recommend(
                seed,
                category,
                self.neighbor_top_k,
                true,
                Some(interactions.as_slice()),
            ));
        }

        let mut merged = merge_ranked(&interactions, Some(pick), &neighbours);
        if let Some(limit) = limit {
            merged.truncate(limit);
        }

        debug!(
            target: "recommender::serve",
            user_id,
            interactions = interactions.len(),
            action,
            pick,
            neighbours = neighbours.len(),
            returned = merged.len(),
            "recommendations assembled"
        );

        Ok(merged
            .into_iter()
            .map(|(id, source)| self.decorate(id, source, id == pick))
            .collect())
    }

    /// Short feed of neighbours around the user's favourites and views,
    /// led by those of the agent's chosen seed. Viewed products never appear.
    pub async fn home_feed(&self, user_id: u64) -> Result<Vec<RecommendedProduct>, RecommenderError> {
        let mut events = self.aggregator.log().query(user_id).await?;
        events.sort_by_key(|e| e.timestamp);
        events.reverse();

        let favourites = distinct_of(&events, ActivityType::Favourite, &HashSet::new());
        let fav_set: HashSet<u64> = favourites.iter().copied().collect();
        let views = distinct_of(&events, ActivityType::View, &fav_set);
        let viewed: Vec<u64> = events
            .iter()
            .filter(|e| e.activity_type == ActivityType::View)
            .map(|e| e.product_id)
            .collect();

        let mut seeds: Vec<u64> = favourites.clone();
        seeds.extend(views.iter().take(HOME_FEED_SEEDS.saturating_sub(favourites.len())));
        if seeds.is_empty() {
            return Ok(Vec::new());
        }

        let state = activity_log::summarize(events, self.aggregator.state_size()).state;
        let action = self.agent.read().await.act(&state.features());
        let pick = seeds[action % seeds.len()];

        let expand = |id: u64| -> Vec<u64> {
            self.catalog
                .category_of(id)
                .map(|c| self.filter.recommend(id, c, HOME_FEED_TOP_K, true, Some(viewed.as_slice())))
                .unwrap_or_default()
        };

        let mut ids = expand(pick);
        for &id in views.iter().take(3).chain(favourites.iter().take(3)) {
            ids.extend(expand(id));
        }

        let mut seen = HashSet::new();
        Ok(ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .take(HOME_FEED_LIMIT)
            .map(|id| self.decorate(id, RecommendationSource::Similar, false))
            .collect())
    }

    /// Neighbours of `product_id` within its catalog category. Unknown
    /// products or categories yield an empty list.
    pub fn similar_products(&self, product_id: u64, top_k: usize) -> Vec<RecommendedProduct> {
        let Some(category) = self.catalog.category_of(product_id) else {
            return Vec::new();
        };
        self.filter
            .recommend(product_id, category, top_k, true, None)
            .into_iter()
            .map(|id| self.decorate(id, RecommendationSource::Similar, false))
            .collect()
    }

    pub async fn record_activity(&self, event: ActivityEvent) -> Result<(), RecommenderError> {
        self.aggregator.log().append(event).await?;
        Ok(())
    }

    fn decorate(&self, product_id: u64, source: RecommendationSource, endorsed: bool) -> RecommendedProduct {
        RecommendedProduct {
            product_id,
            source,
            agent_endorsed: endorsed,
            category: self.catalog.category_of(product_id),
            tracking: self.catalog.tracking(product_id),
        }
    }

    // ── Training ────────────────────────────────────────────────────────────

    /// One sweep over every known user: derive a transition from the user's
    /// latest event, remember it, replay. Checks `stop` between users.
    ///
    /// The transition's state excludes the latest event, its next state
    /// includes it, and its reward scores the latest event's type.
    pub async fn run_training_cycle(
        &self,
        stop: &watch::Receiver<bool>,
    ) -> Result<TrainingReport, RecommenderError> {
        let started = Instant::now();
        let users = self.aggregator.log().users().await?;
        let mut report = TrainingReport {
            users: users.len(),
            ..Default::default()
        };

        info!(target: "recommender::training", users = users.len(), "training cycle started");

        for user_id in users {
            if *stop.borrow() {
                report.interrupted = true;
                break;
            }

            let activity = match self.aggregator.derive_full(user_id).await {
                Ok(a) => a,
                Err(e) => {
                    warn!(target: "recommender::training", user_id, error = %e, "skipping user");
                    continue;
                }
            };
            if activity.is_empty() {
                continue;
            }

            let state = activity.previous_state.features();
            let next_state = activity.state.features();
            let reward = reward_for(activity.latest);

            let mut agent = self.agent.write().await;
            let action = agent.act(&state);
            agent.remember(state, action, reward, next_state, false);
            if let ReplayOutcome::Trained { .. } = agent.replay() {
                report.replays_trained += 1;
            }
            report.epsilon = agent.epsilon();
            report.transitions += 1;
        }

        if report.transitions == 0 {
            report.epsilon = self.agent.read().await.epsilon();
        }
        report.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            target: "recommender::training",
            users = report.users,
            transitions = report.transitions,
            replays = report.replays_trained,
            epsilon = report.epsilon,
            interrupted = report.interrupted,
            elapsed_ms = report.elapsed_ms,
            "training cycle finished"
        );
        Ok(report)
    }

    /// Persist the agent. The snapshot is taken under a read lock, written
    /// after the lock is released.
    pub async fn save_model(&self, path: &Path) -> Result<(), RecommenderError> {
        let snapshot = self.agent.read().await.snapshot();
        write_snapshot(path, &snapshot).await?;
        info!(
            target: "recommender::training",
            path = %path.display(),
            epsilon = snapshot.epsilon,
            "agent model saved"
        );
        Ok(())
    }
}

/// Concatenate the three stages, keeping each id's first occurrence.
pub fn merge_ranked(
    interactions: &[u64],
    pick: Option<u64>,
    neighbours: &[u64],
) -> Vec<(u64, RecommendationSource)> {
    let staged = interactions
        .iter()
        .map(|id| (*id, RecommendationSource::Interacted))
        .chain(pick.map(|id| (id, RecommendationSource::AgentPick)))
        .chain(neighbours.iter().map(|id| (*id, RecommendationSource::Similar)));

    let mut seen = HashSet::new();
    staged.filter(|(id, _)| seen.insert(*id)).collect()
}

/// Distinct products of one activity type, in the order of `events`,
/// skipping anything in `exclude`.
fn distinct_of(events: &[ActivityEvent], kind: ActivityType, exclude: &HashSet<u64>) -> Vec<u64> {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|e| e.activity_type == kind && !exclude.contains(&e.product_id))
        .map(|e| e.product_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_first_occurrence_and_stage_order() {
        let merged = merge_ranked(&[2, 3, 1], Some(3), &[4, 2, 5, 4]);
        let ids: Vec<u64> = merged.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![2, 3, 1, 4, 5]);
        assert_eq!(merged[1].1, RecommendationSource::Interacted);
        assert_eq!(merged[3].1, RecommendationSource::Similar);
    }

    #[test]
    fn merge_tags_fresh_agent_pick() {
        let merged = merge_ranked(&[1], Some(9), &[9, 8]);
        assert_eq!(
            merged,
            vec![
                (1, RecommendationSource::Interacted),
                (9, RecommendationSource::AgentPick),
                (8, RecommendationSource::Similar),
            ]
        );
    }

    #[test]
    fn distinct_of_filters_type_and_exclusions() {
        let events = vec![
            ActivityEvent::new(1, 5, ActivityType::View),
            ActivityEvent::new(1, 6, ActivityType::Favourite),
            ActivityEvent::new(1, 5, ActivityType::View),
            ActivityEvent::new(1, 7, ActivityType::View),
        ];
        let exclude = HashSet::from([7]);
        assert_eq!(distinct_of(&events, ActivityType::View, &exclude), vec![5]);
    }
}
