use axum::routing::{get, post};
use axum::Router;
use loanmatch_core::auth::{AuthVerifier, HttpAuthVerifier};
use loanmatch_core::llm::advisor::AdvisorService;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod error;
mod extract;
mod routes;

use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pool: Option<PgPool>,
    advisor: Option<AdvisorService>,
    auth: Option<Arc<dyn AuthVerifier>>,
}

impl AppState {
    fn pool(&self) -> Result<&PgPool, ApiError> {
        self.pool.as_ref().ok_or_else(ApiError::unavailable)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = loanmatch_core::config::Settings::from_env()?;
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
            Ok(pool) => match loanmatch_core::storage::migrate(&pool).await {
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

    let advisor = match AdvisorService::from_settings(&settings) {
        Ok(advisor) => Some(advisor),
        Err(e) => {
            tracing::warn!(error = %e, "advisor unavailable; /chat will report a configuration error");
            None
        }
    };

    let auth: Option<Arc<dyn AuthVerifier>> = match HttpAuthVerifier::from_settings(&settings) {
        Ok(verifier) => Some(Arc::new(verifier)),
        Err(e) => {
            tracing::warn!(error = %e, "auth verifier unavailable; authenticated routes will fail");
            None
        }
    };

    let state = AppState {
        pool,
        advisor,
        auth,
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/chat", post(routes::chat))
        .route("/products", get(routes::list_products))
        .route("/products/top", get(routes::top_products))
        .route("/products/personalized", get(routes::personalized_products))
        .route("/products/banks", get(routes::bank_names))
        .route(
            "/profile",
            get(routes::get_profile).put(routes::update_profile),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &loanmatch_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
