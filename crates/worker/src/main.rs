use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod seed;

#[derive(Debug, Parser)]
#[command(name = "loanmatch_worker")]
struct Args {
    /// Path to a JSON array of loan products to upsert into the catalog.
    #[arg(long)]
    file: PathBuf,

    /// Parse and validate the seed file without writing to the database.
    #[arg(long)]
    dry_run: bool,
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

    let args = Args::parse();

    let items = seed::load_seed_file(&args.file)?;

    if args.dry_run {
        tracing::info!(
            file = %args.file.display(),
            dry_run = true,
            products = items.len(),
            "seed file validated"
        );
        return Ok(());
    }

    let db_url = settings.require_database_url()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    loanmatch_core::storage::migrate(&pool).await?;

    let acquired = loanmatch_core::storage::lock::try_acquire_catalog_seed_lock(&pool).await?;
    if !acquired {
        tracing::warn!("catalog seed lock not acquired; another seed run in progress");
        return Ok(());
    }

    let result = seed::upsert_products(&pool, &items).await;

    match &result {
        Ok(affected) => {
            tracing::info!(
                file = %args.file.display(),
                products = items.len(),
                affected,
                "catalog seed complete"
            );
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(err);
            tracing::error!(file = %args.file.display(), error = %err, "catalog seed failed");
        }
    }

    let _ = loanmatch_core::storage::lock::release_catalog_seed_lock(&pool).await;
    result.map(|_| ())
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
