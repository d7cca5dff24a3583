use anyhow::Context;
use loanmatch_core::domain::profile::{CREDIT_SCORE_MAX, CREDIT_SCORE_MIN};
use serde::Deserialize;
use sqlx::QueryBuilder;
use std::path::Path;

/// One catalog entry as it appears in a seed file. Identity is
/// `(bank_name, product_name)`; re-running a seed updates rows in place.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedProduct {
    pub bank_name: String,
    pub product_name: String,
    pub loan_type: Option<String>,
    pub apr: f64,
    pub min_apr: Option<f64>,
    pub max_apr: Option<f64>,
    pub loan_amount_min: f64,
    pub loan_amount_max: f64,
    pub min_credit_score: i32,
    pub min_income: Option<f64>,
    pub tenure_min_months: Option<i32>,
    pub tenure_max_months: Option<i32>,
    #[serde(default)]
    pub features: Vec<String>,
    pub processing_time: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
}

pub fn load_seed_file(path: &Path) -> anyhow::Result<Vec<SeedProduct>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    let items: Vec<SeedProduct> =
        serde_json::from_str(&raw).context("seed file is not a JSON array of products")?;

    anyhow::ensure!(!items.is_empty(), "seed file contains no products");
    for item in &items {
        validate(item)?;
    }
    Ok(items)
}

fn validate(p: &SeedProduct) -> anyhow::Result<()> {
    anyhow::ensure!(
        !p.bank_name.trim().is_empty(),
        "bank_name must be non-empty"
    );
    anyhow::ensure!(
        !p.product_name.trim().is_empty(),
        "product_name must be non-empty (bank={})",
        p.bank_name
    );
    anyhow::ensure!(
        p.apr >= 0.0,
        "apr must be non-negative ({} {})",
        p.bank_name,
        p.product_name
    );
    anyhow::ensure!(
        p.loan_amount_min <= p.loan_amount_max,
        "loan amount range inverted ({} {})",
        p.bank_name,
        p.product_name
    );
    anyhow::ensure!(
        (CREDIT_SCORE_MIN..=CREDIT_SCORE_MAX).contains(&p.min_credit_score),
        "min_credit_score out of range ({} {})",
        p.bank_name,
        p.product_name
    );
    if let (Some(lo), Some(hi)) = (p.min_apr, p.max_apr) {
        anyhow::ensure!(
            lo <= hi,
            "apr range inverted ({} {})",
            p.bank_name,
            p.product_name
        );
    }
    if let (Some(lo), Some(hi)) = (p.tenure_min_months, p.tenure_max_months) {
        anyhow::ensure!(
            lo <= hi,
            "tenure range inverted ({} {})",
            p.bank_name,
            p.product_name
        );
    }
    Ok(())
}

/// Transactional batch upsert keyed on `(bank_name, product_name)`.
pub async fn upsert_products(pool: &sqlx::PgPool, items: &[SeedProduct]) -> anyhow::Result<u64> {
    anyhow::ensure!(!items.is_empty(), "items must be non-empty");

    let mut tx = pool.begin().await.context("begin transaction failed")?;

    let chunk_size: usize = std::env::var("SEED_UPSERT_BATCH")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(100);
    anyhow::ensure!(chunk_size >= 1, "SEED_UPSERT_BATCH must be >= 1");

    let mut affected: u64 = 0;
    let mut batch_idx: usize = 0;
    for chunk in items.chunks(chunk_size) {
        batch_idx += 1;
        let t0 = std::time::Instant::now();
        let mut qb = QueryBuilder::new(
            "INSERT INTO loan_products (bank_name, product_name, loan_type, apr, min_apr, max_apr, \
             loan_amount_min, loan_amount_max, min_credit_score, min_income, tenure_min_months, \
             tenure_max_months, features, processing_time, description, summary) ",
        );
        qb.push_values(chunk, |mut b, item| {
            b.push_bind(item.bank_name.trim())
                .push_bind(item.product_name.trim())
                .push_bind(&item.loan_type)
                .push_bind(item.apr)
                .push_bind(item.min_apr)
                .push_bind(item.max_apr)
                .push_bind(item.loan_amount_min)
                .push_bind(item.loan_amount_max)
                .push_bind(item.min_credit_score)
                .push_bind(item.min_income)
                .push_bind(item.tenure_min_months)
                .push_bind(item.tenure_max_months)
                .push_bind(&item.features)
                .push_bind(&item.processing_time)
                .push_bind(&item.description)
                .push_bind(&item.summary);
        });
        qb.push(
            " ON CONFLICT (bank_name, product_name) DO UPDATE \
               SET loan_type = EXCLUDED.loan_type, apr = EXCLUDED.apr, \
                   min_apr = EXCLUDED.min_apr, max_apr = EXCLUDED.max_apr, \
                   loan_amount_min = EXCLUDED.loan_amount_min, \
                   loan_amount_max = EXCLUDED.loan_amount_max, \
                   min_credit_score = EXCLUDED.min_credit_score, \
                   min_income = EXCLUDED.min_income, \
                   tenure_min_months = EXCLUDED.tenure_min_months, \
                   tenure_max_months = EXCLUDED.tenure_max_months, \
                   features = EXCLUDED.features, \
                   processing_time = EXCLUDED.processing_time, \
                   description = EXCLUDED.description, \
                   summary = EXCLUDED.summary",
        );

        let res = qb
            .build()
            .persistent(false)
            .execute(&mut *tx)
            .await
            .context("batch upsert loan_products failed")?;
        affected += res.rows_affected();

        tracing::debug!(
            batch_idx,
            batch_size = chunk.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "loan_products batch upsert"
        );
    }

    tx.commit().await.context("commit transaction failed")?;
    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seed_json() -> serde_json::Value {
        json!([
            {
                "bank_name": "First National",
                "product_name": "Prime Personal Loan",
                "loan_type": "Personal",
                "apr": 6.2,
                "min_apr": 5.5,
                "max_apr": 9.9,
                "loan_amount_min": 2000.0,
                "loan_amount_max": 40000.0,
                "min_credit_score": 660,
                "min_income": 28000.0,
                "tenure_min_months": 12,
                "tenure_max_months": 60,
                "features": ["No origination fee"],
                "processing_time": "1-2 business days",
                "description": "Unsecured personal loan.",
                "summary": "Low-fee personal lending."
            }
        ])
    }

    #[test]
    fn parses_and_validates_a_seed_entry() {
        let items: Vec<SeedProduct> = serde_json::from_value(seed_json()).unwrap();
        assert_eq!(items.len(), 1);
        assert!(validate(&items[0]).is_ok());
        assert_eq!(items[0].features.len(), 1);
    }

    #[test]
    fn features_default_to_empty() {
        let mut v = seed_json();
        v[0].as_object_mut().unwrap().remove("features");
        let items: Vec<SeedProduct> = serde_json::from_value(v).unwrap();
        assert!(items[0].features.is_empty());
    }

    #[test]
    fn rejects_inverted_amount_range() {
        let mut v = seed_json();
        v[0]["loan_amount_min"] = json!(50_000.0);
        let items: Vec<SeedProduct> = serde_json::from_value(v).unwrap();
        assert!(validate(&items[0]).is_err());
    }

    #[test]
    fn rejects_credit_score_outside_bounds() {
        let mut v = seed_json();
        v[0]["min_credit_score"] = json!(200);
        let items: Vec<SeedProduct> = serde_json::from_value(v).unwrap();
        assert!(validate(&items[0]).is_err());
    }

    #[test]
    fn rejects_blank_bank_name() {
        let mut v = seed_json();
        v[0]["bank_name"] = json!("  ");
        let items: Vec<SeedProduct> = serde_json::from_value(v).unwrap();
        assert!(validate(&items[0]).is_err());
    }
}
