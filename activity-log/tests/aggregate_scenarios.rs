use std::sync::Arc;

use activity_log::{ActivityAggregator, ActivityEvent, ActivityLog, ActivityType, JsonlActivityLog, MemoryActivityLog};
use chrono::{Duration, Utc};

#[tokio::test]
async fn view_select_view_yields_select_first() {
    let log = Arc::new(MemoryActivityLog::new());
    let t0 = Utc::now();
    log.append(ActivityEvent::new(42, 1, ActivityType::View).at(t0)).await.unwrap();
    log.append(ActivityEvent::new(42, 2, ActivityType::Select).at(t0 + Duration::seconds(1)))
        .await
        .unwrap();
    log.append(ActivityEvent::new(42, 3, ActivityType::View).at(t0 + Duration::seconds(2)))
        .await
        .unwrap();

    let aggregator = ActivityAggregator::new(log, 10);
    let (interactions, state) = aggregator.derive(42).await.unwrap();

    assert_eq!(interactions, vec![2, 3, 1]);
    assert_eq!(state.product_ids(), &[3, 2, 1, 0, 0, 0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn unknown_user_derives_empty() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(JsonlActivityLog::open(dir.path().join("a.jsonl")).await.unwrap());
    let aggregator = ActivityAggregator::new(log, 5);

    let activity = aggregator.derive_full(7).await.unwrap();
    assert!(activity.is_empty());
    assert_eq!(activity.state.features(), vec![0.0; 5]);
}
