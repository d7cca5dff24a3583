use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the loan catalog. The catalog is maintained by the seeding
/// worker (or an external process) and is read-only from the API's
/// perspective.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LoanProduct {
    pub id: Uuid,
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
    pub features: Vec<String>,
    pub processing_time: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
}

/// Catalog listing filters for `GET /products`. All fields optional; an empty
/// filter lists the whole catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the bank name.
    pub bank: Option<String>,
    #[serde(rename = "minAPR")]
    pub min_apr: Option<f64>,
    #[serde(rename = "maxAPR")]
    pub max_apr: Option<f64>,
    #[serde(rename = "minIncome")]
    pub min_income: Option<f64>,
    #[serde(rename = "minCreditScore")]
    pub min_credit_score: Option<i32>,
}
