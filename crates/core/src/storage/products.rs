use crate::domain::product::{LoanProduct, ProductFilter};
use crate::domain::profile::Qualification;
use crate::recommend::CatalogReader;
use anyhow::Context;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

const COLUMNS: &str = "id, bank_name, product_name, loan_type, apr, min_apr, max_apr, \
                       loan_amount_min, loan_amount_max, min_credit_score, min_income, \
                       tenure_min_months, tenure_max_months, features, processing_time, \
                       description, summary";

/// Catalog listing for `GET /products`, APR ascending. `min_income` filters
/// for products that demand at least that income; `min_credit_score` for
/// products whose threshold the given score clears.
pub async fn list(pool: &PgPool, filter: &ProductFilter) -> anyhow::Result<Vec<LoanProduct>> {
    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM loan_products WHERE TRUE"));

    if let Some(bank) = filter.bank.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND bank_name ILIKE ");
        qb.push_bind(format!("%{bank}%"));
    }
    if let Some(min_apr) = filter.min_apr {
        qb.push(" AND apr >= ");
        qb.push_bind(min_apr);
    }
    if let Some(max_apr) = filter.max_apr {
        qb.push(" AND apr <= ");
        qb.push_bind(max_apr);
    }
    if let Some(min_income) = filter.min_income {
        qb.push(" AND min_income >= ");
        qb.push_bind(min_income);
    }
    if let Some(score) = filter.min_credit_score {
        qb.push(" AND min_credit_score <= ");
        qb.push_bind(score);
    }

    qb.push(" ORDER BY apr ASC");

    qb.build_query_as::<LoanProduct>()
        .fetch_all(pool)
        .await
        .context("list loan_products failed")
}

pub async fn by_id(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<LoanProduct>> {
    sqlx::query_as::<_, LoanProduct>(&format!(
        "SELECT {COLUMNS} FROM loan_products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("fetch loan_product by id failed")
}

/// Deduplicated, sorted, non-empty bank names.
pub async fn bank_names(pool: &PgPool) -> anyhow::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT bank_name FROM loan_products \
         WHERE bank_name <> '' ORDER BY bank_name ASC",
    )
    .fetch_all(pool)
    .await
    .context("fetch bank names failed")?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Postgres-backed catalog for the recommendation composer.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogReader for PgCatalog {
    async fn by_category(&self, category: &str, limit: i64) -> anyhow::Result<Vec<LoanProduct>> {
        sqlx::query_as::<_, LoanProduct>(&format!(
            "SELECT {COLUMNS} FROM loan_products \
             WHERE loan_type ILIKE $1 ORDER BY apr ASC LIMIT $2"
        ))
        .bind(format!("%{category}%"))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("fetch loan_products by category failed")
    }

    async fn qualified(
        &self,
        category: Option<&str>,
        qualification: Qualification,
        limit: i64,
    ) -> anyhow::Result<Vec<LoanProduct>> {
        let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM loan_products WHERE TRUE"));

        if let Some(category) = category {
            qb.push(" AND loan_type ILIKE ");
            qb.push_bind(format!("%{category}%"));
        }
        if let Some(score) = qualification.credit_score {
            qb.push(" AND min_credit_score <= ");
            qb.push_bind(score);
        }
        if let Some(income) = qualification.annual_income {
            qb.push(" AND (min_income IS NULL OR min_income <= ");
            qb.push_bind(income);
            qb.push(")");
        }

        qb.push(" ORDER BY apr ASC LIMIT ");
        qb.push_bind(limit);

        qb.build_query_as::<LoanProduct>()
            .fetch_all(&self.pool)
            .await
            .context("fetch qualified loan_products failed")
    }

    async fn top_by_apr(&self, limit: i64) -> anyhow::Result<Vec<LoanProduct>> {
        sqlx::query_as::<_, LoanProduct>(&format!(
            "SELECT {COLUMNS} FROM loan_products ORDER BY apr ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("fetch loan_products by apr failed")
    }
}
