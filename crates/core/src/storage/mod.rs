use anyhow::Context;

pub mod chat_history;
pub mod lock;
pub mod products;
pub mod profiles;

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}
