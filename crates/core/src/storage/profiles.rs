use crate::domain::profile::UserProfile;
use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn fetch(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
    sqlx::query_as::<_, UserProfile>(
        "SELECT annual_income, credit_score, loan_type FROM profiles WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("fetch profile failed")
}

/// Creates the profile row on first save, otherwise updates it in place.
pub async fn upsert(
    pool: &PgPool,
    user_id: Uuid,
    profile: &UserProfile,
) -> anyhow::Result<UserProfile> {
    sqlx::query_as::<_, UserProfile>(
        "INSERT INTO profiles (id, annual_income, credit_score, loan_type) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (id) DO UPDATE \
         SET annual_income = EXCLUDED.annual_income, \
             credit_score = EXCLUDED.credit_score, \
             loan_type = EXCLUDED.loan_type, \
             updated_at = now() \
         RETURNING annual_income, credit_score, loan_type",
    )
    .bind(user_id)
    .bind(profile.annual_income)
    .bind(profile.credit_score)
    .bind(&profile.loan_type)
    .fetch_one(pool)
    .await
    .context("upsert profile failed")
}
