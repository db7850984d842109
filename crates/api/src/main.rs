use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skillpath_core::config::Settings;
use skillpath_core::domain::recommendation::{
    EnrichedRecommendation, EnrollmentRecord, RecommendationOutcome, RecommendationRequest,
};
use skillpath_core::orchestrator::{RecommendError, Recommender, StatusReport};
use skillpath_core::storage::request_log::{BudgetStore, MemoryBudgetStore, PgBudgetStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool: Option<PgPool> = match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => match skillpath_core::storage::migrate(&pool).await {
                Ok(()) => Some(pool),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "db migrations failed; starting API in degraded mode");
                    None
                }
            },
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    };

    let budget: Arc<dyn BudgetStore> = match &pool {
        Some(pool) => Arc::new(PgBudgetStore::load_or_init(pool.clone()).await?),
        None => {
            tracing::warn!("no database; request counters will not survive restarts");
            Arc::new(MemoryBudgetStore::new())
        }
    };

    let recommender = Arc::new(Recommender::from_settings(&settings, budget));
    let shutdown = CancellationToken::new();

    let state = AppState {
        pool,
        recommender,
        settings,
        shutdown: shutdown.clone(),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ai/recommend", post(recommend))
        .route("/ai/recommend/personalized", post(recommend_personalized))
        .route("/ai/status", get(ai_status))
        .route("/ai/reset-requests", post(reset_requests))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Abandon in-flight provider calls at their next await point.
            shutdown.cancel();
        })
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    pool: Option<PgPool>,
    recommender: Arc<Recommender>,
    settings: Settings,
    shutdown: CancellationToken,
}

#[derive(Debug, Deserialize)]
struct RecommendBody {
    prompt: String,
    #[serde(default, alias = "maxCourses")]
    max_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct PersonalizedBody {
    #[serde(default, alias = "enrollmentHistory")]
    enrollment_history: Vec<EnrollmentRecord>,
    #[serde(default, alias = "excludeIds")]
    exclude_ids: Vec<String>,
    #[serde(default, alias = "maxCourses")]
    max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
struct RecommendResponse {
    recommendations: Vec<EnrichedRecommendation>,
    summary: String,
    total_recommended: usize,
    total_available: usize,
    ai_provider: String,
    remaining_requests: u64,
}

impl From<RecommendationOutcome> for RecommendResponse {
    fn from(outcome: RecommendationOutcome) -> Self {
        Self {
            total_recommended: outcome.recommendations.len(),
            total_available: outcome.total_available,
            summary: outcome.summary,
            ai_provider: outcome.provider_used,
            remaining_requests: outcome.remaining_requests,
            recommendations: outcome.recommendations,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiError {
    message: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            message: message.into(),
        }),
    )
}

fn map_recommend_error(err: RecommendError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        RecommendError::Invalid(_) => StatusCode::BAD_REQUEST,
        RecommendError::EmptyCatalog => StatusCode::NOT_FOUND,
        RecommendError::BudgetExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        RecommendError::Cancelled => StatusCode::INTERNAL_SERVER_ERROR,
        RecommendError::Internal(e) => {
            sentry_anyhow::capture_anyhow(e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error(status, err.to_string())
}

async fn load_catalog(
    state: &AppState,
) -> Result<Vec<skillpath_core::domain::course::CourseSummary>, (StatusCode, Json<ApiError>)> {
    let Some(pool) = &state.pool else {
        return Err(error(
            StatusCode::SERVICE_UNAVAILABLE,
            "course catalog unavailable",
        ));
    };
    skillpath_core::storage::catalog::load_catalog(pool)
        .await
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            error(StatusCode::INTERNAL_SERVER_ERROR, "failed to load courses")
        })
}

async fn recommend(
    State(state): State<AppState>,
    Json(body): Json<RecommendBody>,
) -> ApiResult<RecommendResponse> {
    let catalog = load_catalog(&state).await?;
    let request = RecommendationRequest::try_new(body.prompt, body.max_results, catalog)
        .map_err(|e| error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let outcome = state
        .recommender
        .recommend(request, &state.shutdown)
        .await
        .map_err(map_recommend_error)?;

    Ok(Json(outcome.into()))
}

async fn recommend_personalized(
    State(state): State<AppState>,
    Json(body): Json<PersonalizedBody>,
) -> ApiResult<RecommendResponse> {
    let catalog = load_catalog(&state).await?;
    let exclude_ids: HashSet<String> = body.exclude_ids.into_iter().collect();

    let outcome = state
        .recommender
        .recommend_personalized(
            &body.enrollment_history,
            body.max_results,
            catalog,
            &exclude_ids,
            &state.shutdown,
        )
        .await
        .map_err(map_recommend_error)?;

    Ok(Json(outcome.into()))
}

async fn ai_status(State(state): State<AppState>) -> ApiResult<StatusReport> {
    let report = state.recommender.status().await.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        error(StatusCode::INTERNAL_SERVER_ERROR, "failed to read status")
    })?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
struct ResetResponse {
    message: &'static str,
}

async fn reset_requests(State(state): State<AppState>) -> ApiResult<ResetResponse> {
    if state.settings.is_production() {
        return Err(error(
            StatusCode::FORBIDDEN,
            "counter reset is disabled in production",
        ));
    }
    state.recommender.reset_counters().await.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        error(StatusCode::INTERNAL_SERVER_ERROR, "failed to reset counters")
    })?;
    Ok(Json(ResetResponse {
        message: "request counters reset",
    }))
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
