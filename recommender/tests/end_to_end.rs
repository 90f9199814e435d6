use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use activity_log::{ActivityAggregator, ActivityEvent, ActivityLog, ActivityType, MemoryActivityLog};
use chrono::Utc;
use content_filter::{Category, ContentBasedFilter, VectorColumns, VectorStore};
use recommender::{
    CatalogEntry, JsonlCatalog, ProductTracking, RecommendationOrchestrator, RecommendationSource,
    TrainingScheduler,
};
use tokio::sync::{RwLock, watch};
use value_agent::{AgentConfig, ValueFunctionAgent};

/// Books 1..=10 on a line; product n sits at x = n - 1.
fn book_filter() -> Arc<ContentBasedFilter> {
    let ids: Vec<u64> = (1..=10).collect();
    let mut raw = VectorColumns {
        product_id: ids.clone(),
        ..Default::default()
    };
    raw.columns.insert(
        "vector_name".into(),
        ids.iter().map(|i| vec![(*i - 1) as f32, 0.0]).collect(),
    );
    for col in ["vector_category", "vector_author", "vector_publisher"] {
        raw.columns.insert(col.into(), ids.iter().map(|_| vec![0.0]).collect());
    }
    let store = VectorStore::from_columns(Category::Book, raw).unwrap();
    Arc::new(ContentBasedFilter::from_stores([store]))
}

fn book_catalog() -> Arc<JsonlCatalog> {
    Arc::new(JsonlCatalog::from_entries((1..=10).map(|id| CatalogEntry {
        product_id: id,
        category: Some("book".into()),
        tracking: Some(ProductTracking {
            quantity_sold: id * 10,
            ..Default::default()
        }),
    })))
}

async fn seeded_log() -> Arc<MemoryActivityLog> {
    let log = Arc::new(MemoryActivityLog::new());
    let t0 = Utc::now();
    for (secs, product, kind) in [
        (0, 1, ActivityType::View),
        (1, 2, ActivityType::Select),
        (2, 3, ActivityType::View),
    ] {
        log.append(
            ActivityEvent::new(42, product, kind).at(t0 + chrono::Duration::seconds(secs)),
        )
        .await
        .unwrap();
    }
    log
}

fn orchestrator(log: Arc<MemoryActivityLog>, config: AgentConfig) -> RecommendationOrchestrator {
    let agent = ValueFunctionAgent::new(config).unwrap();
    RecommendationOrchestrator::new(
        book_filter(),
        ActivityAggregator::new(log, 10),
        Arc::new(RwLock::new(agent)),
        book_catalog(),
    )
    .with_neighbors(5, 15)
}

fn seeded_config() -> AgentConfig {
    AgentConfig {
        seed: Some(7),
        ..Default::default()
    }
}

#[tokio::test]
async fn recommendations_lead_with_interactions_then_neighbours() {
    let orch = orchestrator(seeded_log().await, seeded_config());
    let recs = orch.get_recommendations(42, None).await.unwrap();
    let ids: Vec<u64> = recs.iter().map(|r| r.product_id).collect();

    assert_eq!(&ids[..3], &[2, 3, 1]);
    assert_eq!(ids, vec![2, 3, 1, 4, 5, 6, 7, 8, 9, 10]);

    let unique: HashSet<u64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());

    assert!(recs[..3].iter().all(|r| r.source == RecommendationSource::Interacted));
    assert!(recs[3..].iter().all(|r| r.source == RecommendationSource::Similar));
    let endorsed: Vec<_> = recs.iter().filter(|r| r.agent_endorsed).collect();
    assert_eq!(endorsed.len(), 1);
    assert_eq!(endorsed[0].source, RecommendationSource::Interacted);
    assert_eq!(recs[0].category, Some(Category::Book));
    assert_eq!(recs[0].tracking.as_ref().unwrap().quantity_sold, 20);
}

#[tokio::test]
async fn limit_truncates_preserving_order() {
    let orch = orchestrator(seeded_log().await, seeded_config());
    let recs = orch.get_recommendations(42, Some(5)).await.unwrap();
    let ids: Vec<u64> = recs.iter().map(|r| r.product_id).collect();
    assert_eq!(ids, vec![2, 3, 1, 4, 5]);
}

#[tokio::test]
async fn unknown_user_gets_nothing() {
    let orch = orchestrator(seeded_log().await, seeded_config());
    assert!(orch.get_recommendations(7, Some(10)).await.unwrap().is_empty());
    assert!(orch.home_feed(7).await.unwrap().is_empty());
}

#[tokio::test]
async fn home_feed_never_shows_viewed_products() {
    let orch = orchestrator(seeded_log().await, seeded_config());
    let feed = orch.home_feed(42).await.unwrap();
    assert!(!feed.is_empty());
    assert!(feed.len() <= 9);
    assert!(feed.iter().all(|r| r.product_id != 1 && r.product_id != 3));
}

#[tokio::test]
async fn similar_products_route_through_catalog() {
    let orch = orchestrator(seeded_log().await, seeded_config());
    let ids: Vec<u64> = orch.similar_products(5, 2).iter().map(|r| r.product_id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&4) && ids.contains(&6));
    assert!(orch.similar_products(999, 2).is_empty());
}

#[tokio::test]
async fn training_cycle_below_batch_size_leaves_epsilon() {
    let orch = orchestrator(seeded_log().await, seeded_config());
    let (_tx, rx) = watch::channel(false);

    let report = orch.run_training_cycle(&rx).await.unwrap();
    assert_eq!(report.users, 1);
    assert_eq!(report.transitions, 1);
    assert_eq!(report.replays_trained, 0);
    assert_eq!(orch.agent().read().await.epsilon(), 1.0);
    assert_eq!(orch.agent().read().await.memory_len(), 1);
}

#[tokio::test]
async fn training_cycle_trains_and_decays() {
    let log = seeded_log().await;
    log.append(ActivityEvent::new(7, 9, ActivityType::Favourite)).await.unwrap();
    let orch = orchestrator(
        log,
        AgentConfig {
            batch_size: 1,
            memory_capacity: 8,
            seed: Some(3),
            ..Default::default()
        },
    );
    let (_tx, rx) = watch::channel(false);

    let report = orch.run_training_cycle(&rx).await.unwrap();
    assert_eq!(report.users, 2);
    assert_eq!(report.replays_trained, 2);
    assert!(!report.interrupted);
    assert!(orch.agent().read().await.epsilon() < 1.0);
}

#[tokio::test]
async fn stop_signal_interrupts_sweep() {
    let orch = orchestrator(seeded_log().await, seeded_config());
    let (_tx, rx) = watch::channel(true);

    let report = orch.run_training_cycle(&rx).await.unwrap();
    assert!(report.interrupted);
    assert_eq!(report.transitions, 0);
}

#[tokio::test]
async fn scheduler_saves_model_and_stops() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model").join("agent.json");
    let orch = Arc::new(orchestrator(seeded_log().await, seeded_config()));

    let handle = TrainingScheduler::spawn(orch, Duration::from_secs(3600), model_path.clone());

    for _ in 0..100 {
        if model_path.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    handle.stop().await.unwrap();

    assert!(model_path.exists());
    let snapshot = value_agent::read_snapshot(&model_path).await.unwrap().unwrap();
    assert_eq!(snapshot.config.state_size, 10);
}
