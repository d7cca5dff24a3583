use anyhow::Context;

// Advisory locks are scoped to the Postgres session. This guards against two
// seed runs rewriting the catalog at the same time.
const CATALOG_SEED_LOCK_KEY: i64 = 0x4C4F_414E_5345; // "LOANSE" as hex-ish namespace.

pub async fn try_acquire_catalog_seed_lock(pool: &sqlx::PgPool) -> anyhow::Result<bool> {
    let acquired: (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .persistent(false)
        .bind(CATALOG_SEED_LOCK_KEY)
        .fetch_one(pool)
        .await
        .context("failed to acquire catalog seed advisory lock")?;
    Ok(acquired.0)
}

pub async fn release_catalog_seed_lock(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .persistent(false)
        .bind(CATALOG_SEED_LOCK_KEY)
        .execute(pool)
        .await
        .context("failed to release catalog seed advisory lock")?;
    Ok(())
}
