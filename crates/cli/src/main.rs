use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skillpath_core::domain::course::CourseSummary;
use skillpath_core::domain::recommendation::RecommendationRequest;
use skillpath_core::orchestrator::Recommender;
use skillpath_core::storage::request_log::{BudgetStore, MemoryBudgetStore, PgBudgetStore};

/// One-shot recommendation run against the database catalog or a catalog
/// file, for operators and local testing.
#[derive(Debug, Parser)]
#[command(name = "skillpath_cli")]
struct Args {
    /// Free-text learner query.
    #[arg(long)]
    prompt: String,

    /// Maximum number of recommendations to return.
    #[arg(long, default_value_t = 5)]
    max_results: usize,

    /// Read the catalog from a JSON file (array of course summaries)
    /// instead of DATABASE_URL.
    #[arg(long)]
    catalog_file: Option<std::path::PathBuf>,

    /// Show provider/budget status instead of recommending.
    #[arg(long)]
    status: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = skillpath_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let (catalog, budget): (Vec<CourseSummary>, Arc<dyn BudgetStore>) =
        if let Some(path) = &args.catalog_file {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let catalog = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a course summary array", path.display()))?;
            (catalog, Arc::new(MemoryBudgetStore::new()))
        } else {
            let db_url = settings.require_database_url()?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(2)
                .connect(db_url)
                .await
                .context("connect DATABASE_URL failed")?;
            skillpath_core::storage::migrate(&pool).await?;
            let catalog = skillpath_core::storage::catalog::load_catalog(&pool).await?;
            (catalog, Arc::new(PgBudgetStore::load_or_init(pool).await?))
        };

    let recommender = Recommender::from_settings(&settings, budget);

    if args.status {
        let report = recommender.status().await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let request = RecommendationRequest::try_new(args.prompt, Some(args.max_results), catalog)?;

    match recommender
        .recommend(request, &CancellationToken::new())
        .await
    {
        Ok(outcome) => {
            tracing::info!(
                provider = %outcome.provider_used,
                recommended = outcome.recommendations.len(),
                remaining = outcome.remaining_requests,
                "recommendation run complete"
            );
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(err) => {
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            Err(err)
        }
    }
}

fn init_sentry(settings: &skillpath_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
