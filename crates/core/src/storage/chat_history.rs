use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

/// Appends one advisor exchange. Callers treat failures as best-effort: the
/// answer was already produced, so a lost history row is logged, never
/// surfaced.
pub async fn record(
    pool: &PgPool,
    user_id: Uuid,
    message: &str,
    response: &str,
) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO chat_history (user_id, message, response) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(message)
        .bind(response)
        .execute(pool)
        .await
        .context("insert chat_history failed")?;
    Ok(())
}
