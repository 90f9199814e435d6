//! Per-user derivation of the interaction list and the agent state.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::errors::activity_log_error::ActivityLogError;
use crate::store::ActivityLog;
use crate::structs::activity_event::ActivityEvent;
use crate::structs::activity_type::ActivityType;
use crate::structs::user_state::UserState;

/// Everything derived from one user's history.
#[derive(Debug, Clone, PartialEq)]
pub struct UserActivity {
    /// Priority-ordered, duplicate-free product ids.
    pub interactions: Vec<u64>,
    /// State over the full history.
    pub state: UserState,
    /// State over the history minus the most recent event.
    pub previous_state: UserState,
    /// Type of the most recent event, if any.
    pub latest: Option<ActivityType>,
}

impl UserActivity {
    pub fn is_empty(&self) -> bool {
        self.latest.is_none()
    }
}

#[derive(Clone)]
pub struct ActivityAggregator {
    log: Arc<dyn ActivityLog>,
    state_size: usize,
}

impl ActivityAggregator {
    pub fn new(log: Arc<dyn ActivityLog>, state_size: usize) -> Self {
        Self { log, state_size }
    }

    pub fn log(&self) -> &Arc<dyn ActivityLog> {
        &self.log
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    /// `(interaction list, state)` for `user_id`.
    pub async fn derive(&self, user_id: u64) -> Result<(Vec<u64>, UserState), ActivityLogError> {
        let activity = self.derive_full(user_id).await?;
        Ok((activity.interactions, activity.state))
    }

    pub async fn derive_full(&self, user_id: u64) -> Result<UserActivity, ActivityLogError> {
        let events = self.log.query(user_id).await?;
        let activity = summarize(events, self.state_size);
        debug!(
            target: "activity_log::aggregate",
            user_id,
            interactions = activity.interactions.len(),
            latest = ?activity.latest,
            "user activity derived"
        );
        Ok(activity)
    }
}

/// Derive a [`UserActivity`] from raw events in append order.
pub fn summarize(mut events: Vec<ActivityEvent>, state_size: usize) -> UserActivity {
    newest_first(&mut events);

    let recent = events.iter().map(|e| e.product_id);
    UserActivity {
        interactions: interaction_list(&events),
        state: UserState::from_recent(recent.clone(), state_size),
        previous_state: UserState::from_recent(recent.skip(1), state_size),
        latest: events.first().map(|e| e.activity_type),
    }
}

/// Stable sort by timestamp, newest first; equal timestamps keep the later
/// appended event first.
fn newest_first(events: &mut [ActivityEvent]) {
    events.sort_by_key(|e| e.timestamp);
    events.reverse();
}

/// Groups by priority (select, favourite, view, search), recency within a
/// group, first occurrence wins across groups. `events` must be newest first.
fn interaction_list(events: &[ActivityEvent]) -> Vec<u64> {
    let mut ranked: Vec<(u8, &ActivityEvent)> = events
        .iter()
        .filter_map(|e| e.activity_type.priority().map(|p| (p, e)))
        .collect();
    ranked.sort_by_key(|(p, _)| *p);

    let mut seen = HashSet::with_capacity(ranked.len());
    ranked
        .into_iter()
        .map(|(_, e)| e.product_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ev(product: u64, kind: ActivityType, secs: i64) -> ActivityEvent {
        ActivityEvent::new(1, product, kind).at(Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap())
    }

    #[test]
    fn select_before_view_and_recency_within_group() {
        let events = vec![
            ev(1, ActivityType::View, 1),
            ev(2, ActivityType::Select, 2),
            ev(3, ActivityType::View, 3),
        ];
        assert_eq!(summarize(events, 10).interactions, vec![2, 3, 1]);
    }

    #[test]
    fn duplicates_keep_highest_priority_slot() {
        let events = vec![
            ev(4, ActivityType::Search, 1),
            ev(5, ActivityType::View, 2),
            ev(4, ActivityType::Favourite, 3),
            ev(5, ActivityType::Select, 4),
        ];
        assert_eq!(summarize(events, 10).interactions, vec![5, 4]);
    }

    #[test]
    fn purchase_and_cart_removal_do_not_enter_the_list() {
        let events = vec![
            ev(7, ActivityType::Purchase, 1),
            ev(8, ActivityType::RemoveFromCart, 2),
        ];
        let a = summarize(events, 3);
        assert!(a.interactions.is_empty());
        assert_eq!(a.state.product_ids(), &[8, 7, 0]);
        assert_eq!(a.latest, Some(ActivityType::RemoveFromCart));
    }

    #[test]
    fn state_is_recency_ordered_and_padded() {
        let events = vec![
            ev(1, ActivityType::View, 1),
            ev(2, ActivityType::Select, 2),
            ev(3, ActivityType::View, 3),
        ];
        let a = summarize(events, 10);
        assert_eq!(a.state.product_ids(), &[3, 2, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(a.previous_state.product_ids(), &[2, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn out_of_order_appends_sort_by_timestamp() {
        let events = vec![ev(9, ActivityType::View, 50), ev(8, ActivityType::View, 10)];
        let a = summarize(events, 2);
        assert_eq!(a.state.product_ids(), &[9, 8]);
    }

    #[test]
    fn empty_history() {
        let a = summarize(Vec::new(), 4);
        assert!(a.is_empty());
        assert!(a.interactions.is_empty());
        assert_eq!(a.state.product_ids(), &[0, 0, 0, 0]);
    }
}
