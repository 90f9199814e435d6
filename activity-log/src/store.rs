//! Activity log store abstraction and its in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::activity_log_error::ActivityLogError;
use crate::structs::activity_event::ActivityEvent;

/// Append-only source of user activity.
///
/// Implementations must make each `append` atomic: concurrent callers never
/// observe or persist a partially written event.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// All events of `user_id` in append order. Unknown users yield an empty `Vec`.
    async fn query(&self, user_id: u64) -> Result<Vec<ActivityEvent>, ActivityLogError>;

    async fn append(&self, event: ActivityEvent) -> Result<(), ActivityLogError>;

    /// Every user with at least one event, ascending.
    async fn users(&self) -> Result<Vec<u64>, ActivityLogError>;
}

/// Per-user index held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryActivityLog {
    by_user: RwLock<HashMap<u64, Vec<ActivityEvent>>>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: impl IntoIterator<Item = ActivityEvent>) -> Self {
        Self {
            by_user: RwLock::new(index_events(events)),
        }
    }
}

#[async_trait]
impl ActivityLog for MemoryActivityLog {
    async fn query(&self, user_id: u64) -> Result<Vec<ActivityEvent>, ActivityLogError> {
        Ok(self
            .by_user
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, event: ActivityEvent) -> Result<(), ActivityLogError> {
        event.validate()?;
        self.by_user
            .write()
            .await
            .entry(event.user_id)
            .or_default()
            .push(event);
        Ok(())
    }

    async fn users(&self) -> Result<Vec<u64>, ActivityLogError> {
        Ok(sorted_users(&*self.by_user.read().await))
    }
}

pub(crate) fn index_events(
    events: impl IntoIterator<Item = ActivityEvent>,
) -> HashMap<u64, Vec<ActivityEvent>> {
    let mut by_user: HashMap<u64, Vec<ActivityEvent>> = HashMap::new();
    for ev in events {
        by_user.entry(ev.user_id).or_default().push(ev);
    }
    by_user
}

pub(crate) fn sorted_users(by_user: &HashMap<u64, Vec<ActivityEvent>>) -> Vec<u64> {
    let mut users: Vec<u64> = by_user
        .iter()
        .filter(|(_, evs)| !evs.is_empty())
        .map(|(u, _)| *u)
        .collect();
    users.sort_unstable();
    users
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::activity_type::ActivityType;

    #[tokio::test]
    async fn query_returns_append_order_per_user() {
        let log = MemoryActivityLog::new();
        log.append(ActivityEvent::new(2, 10, ActivityType::View)).await.unwrap();
        log.append(ActivityEvent::new(1, 11, ActivityType::View)).await.unwrap();
        log.append(ActivityEvent::new(2, 12, ActivityType::Select)).await.unwrap();

        let ids: Vec<u64> = log.query(2).await.unwrap().iter().map(|e| e.product_id).collect();
        assert_eq!(ids, vec![10, 12]);
        assert_eq!(log.users().await.unwrap(), vec![1, 2]);
        assert!(log.query(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_rejects_zero_quantity() {
        let log = MemoryActivityLog::new();
        let ev = ActivityEvent::new(1, 1, ActivityType::Purchase).with_quantity(0);
        assert!(log.append(ev).await.is_err());
        assert!(log.users().await.unwrap().is_empty());
    }
}
