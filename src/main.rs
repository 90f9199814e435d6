use std::error::Error;
use std::sync::Arc;

use activity_log::{ActivityAggregator, JsonlActivityLog};
use anyhow::Context;
use api::AppState;
use colored::Colorize;
use content_filter::ContentBasedFilter;
use recommender::{JsonlCatalog, RecConfig, RecommendationOrchestrator, TrainingScheduler};
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use value_agent::ValueFunctionAgent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; the environment may already be populated.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()?;

    let config = RecConfig::from_env()?;
    let orchestrator = Arc::new(boot(&config).await?);

    print_banner(&config);

    let scheduler = TrainingScheduler::spawn(
        Arc::clone(&orchestrator),
        config.model_update_interval,
        config.model_path.clone(),
    );

    let served = api::start(AppState::new(orchestrator), &config.api_address).await;

    scheduler.stop().await?;
    served?;

    info!(target: "recsys_backend", "shutdown complete");
    Ok(())
}

/// Load every component before the listener opens. Vector files are
/// mandatory; the agent snapshot and catalog are not.
async fn boot(config: &RecConfig) -> anyhow::Result<RecommendationOrchestrator> {
    let filter = ContentBasedFilter::load(&config.category_files)
        .await
        .context("loading category vector files")?;

    let catalog = JsonlCatalog::load(&config.catalog_path)
        .await
        .with_context(|| format!("reading catalog {}", config.catalog_path.display()))?;
    if catalog.is_empty() {
        warn!(target: "recsys_backend", "catalog is empty, similarity routing disabled");
    }

    let log = JsonlActivityLog::open(&config.activity_log_path)
        .await
        .with_context(|| format!("opening activity log {}", config.activity_log_path.display()))?;

    let mut agent =
        ValueFunctionAgent::new(config.agent_config()).context("building value-function agent")?;
    let outcome = agent.load(&config.model_path).await;
    info!(target: "recsys_backend", ?outcome, "agent ready");

    Ok(RecommendationOrchestrator::new(
        Arc::new(filter),
        ActivityAggregator::new(Arc::new(log), config.state_size),
        Arc::new(RwLock::new(agent)),
        Arc::new(catalog),
    )
    .with_neighbors(config.neighbor_seeds, config.neighbor_top_k))
}

fn print_banner(config: &RecConfig) {
    let categories: Vec<&str> = config.category_files.keys().map(|c| c.label()).collect();
    println!(
        "{} {} {}",
        "recsys-backend".bold().green(),
        "listening on".dimmed(),
        config.api_address.cyan()
    );
    println!(
        "  {} {}  {} {}s",
        "categories:".dimmed(),
        categories.join(", ").yellow(),
        "retrain every".dimmed(),
        config.model_update_interval.as_secs()
    );
}
