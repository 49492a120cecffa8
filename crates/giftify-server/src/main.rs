use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod adapters;
mod auth;
mod config;
mod models;
mod routes;

use adapters::{
    simulated_connectors, PgGiftRepository, PgPersonaRepository, PgSubscriptionRepository,
};
use config::GiftifyConfig;
use giftify::adapters::{SystemClock, ThreadRandom};
use giftify::domain::services::{DeliveryDispatcher, SelectionEngine};
use giftify::{
    Clock, GiftQueue, GiftService, GiftWorker, RandomSource, SubscriptionScheduler,
    SubscriptionService,
};

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub gifts: Arc<GiftService>,
    pub subscriptions: Arc<SubscriptionService>,
    pub scheduler: Arc<SubscriptionScheduler>,
    /// Bearer token for protected routes; `None` disables auth
    pub api_key: Option<String>,
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Giftify API is running - the agent is shopping".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    // Shuttle may already own the global subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();

    tracing::info!("🎁 Giftify API initializing...");

    let config = GiftifyConfig::from_secrets(&secrets).context("Invalid configuration")?;

    if config.api_key.is_some() {
        tracing::info!("🔐 API key authentication enabled");
    } else {
        tracing::warn!("⚠️  No GIFTIFY_API_KEY set - authentication disabled");
    }

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("✅ Database migrations completed");

    // Repositories
    let gift_repo = Arc::new(PgGiftRepository::new(pool.clone()));
    let subscription_repo = Arc::new(PgSubscriptionRepository::new(pool.clone()));
    let personas = Arc::new(PgPersonaRepository::new(pool));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let random: Arc<dyn RandomSource> = Arc::new(ThreadRandom);

    // Delivery platforms, attempted in configured order
    let connectors = simulated_connectors(&config.platforms, random.clone());
    if connectors.is_empty() {
        tracing::warn!("⚠️  No delivery connectors configured - every dispatch will fail");
    }
    let dispatcher = DeliveryDispatcher::new(connectors, config.dispatcher.clone());
    tracing::info!("🚚 Delivery platforms: {:?}", dispatcher.platforms());

    // Gift state machine and its background worker
    let (queue, jobs) = GiftQueue::channel();
    let gifts = Arc::new(GiftService::new(
        gift_repo,
        personas.clone(),
        personas.clone(),
        SelectionEngine::new(random),
        dispatcher,
        clock.clone(),
        queue,
    ));
    GiftWorker::new(gifts.clone(), jobs, config.worker.clone()).start();

    // Gifts a previous process left mid-flight
    let recovery = gifts
        .recover()
        .await
        .context("Failed to recover in-flight gifts")?;
    tracing::info!(
        "♻️ Recovery: {} picks re-queued, {} ordered gifts need manual handling",
        recovery.requeued.len(),
        recovery.needs_attention.len()
    );

    let subscriptions = Arc::new(SubscriptionService::new(
        subscription_repo.clone(),
        clock.clone(),
    ));

    // Subscription scheduler
    let scheduler = Arc::new(SubscriptionScheduler::new(
        subscription_repo,
        personas,
        gifts.clone(),
        clock,
        Some(config.scheduler.clone()),
    ));
    scheduler.clone().start();

    // Create application state
    let state = AppState {
        gifts,
        subscriptions,
        scheduler,
        api_key: config.api_key.clone(),
    };

    // Protected routes (require authentication)
    let protected_routes = Router::new()
        .merge(routes::gift::router())
        .merge(routes::subscription::router())
        .merge(routes::scheduler::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    // OpenAPI documentation
    let openapi = routes::swagger::ApiDoc::openapi();

    // Build router with shared state
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("✅ Giftify API ready");

    Ok(router.into())
}
