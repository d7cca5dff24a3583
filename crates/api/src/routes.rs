use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::AppState;
use axum::extract::State;
use axum::Json;
use loanmatch_core::domain::product::{LoanProduct, ProductFilter};
use loanmatch_core::domain::profile::{
    Qualification, UserProfile, CREDIT_SCORE_MAX, CREDIT_SCORE_MIN, LOAN_TYPE_OPTIONS,
};
use loanmatch_core::domain::recommendation::TopProducts;
use loanmatch_core::llm::prompt;
use loanmatch_core::recommend::CatalogReader;
use loanmatch_core::storage::{chat_history, products, profiles};
use loanmatch_core::storage::products::PgCatalog;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const PERSONALIZED_LIMIT: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    message: Option<String>,
    #[serde(rename = "productId")]
    product_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    response: String,
}

/// `POST /chat`: advisor conversation grounded in the catalog (or one
/// product). The history write afterwards is best-effort by design.
pub async fn chat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let pool = state.pool()?;

    let message = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("Message is required"))?;

    let Some(advisor) = &state.advisor else {
        return Err(ApiError::config("DeepSeek API key is not configured"));
    };

    let system_prompt = match body.product_id.as_deref() {
        Some(raw_id) => {
            let id: Uuid = raw_id
                .parse()
                .map_err(|_| ApiError::not_found("Product not found"))?;
            let product = products::by_id(pool, id)
                .await
                .map_err(|e| ApiError::upstream(e, "Failed to fetch product data"))?
                .ok_or_else(|| ApiError::not_found("Product not found"))?;
            prompt::product_system_prompt(&product)
        }
        None => {
            let catalog = products::list(pool, &ProductFilter::default())
                .await
                .map_err(|e| ApiError::upstream(e, "Failed to fetch product data"))?;
            if catalog.is_empty() {
                return Err(ApiError::not_found("No loan products found in database"));
            }
            prompt::catalog_system_prompt(&catalog)
                .map_err(|e| ApiError::upstream(e, "Failed to build advisor context"))?
        }
    };

    let response = advisor
        .ask(&system_prompt, message)
        .await
        .map_err(ApiError::from_advisor)?;

    if let Err(err) = chat_history::record(pool, user.id, message, &response).await {
        tracing::warn!(user_id = %user.id, error = %err, "failed to save chat history");
    }

    Ok(Json(ChatResponse { response }))
}

/// `GET /products`: filtered catalog listing, APR ascending.
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> Result<Json<Vec<LoanProduct>>, ApiError> {
    let pool = state.pool()?;
    let rows = products::list(pool, &filter)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to fetch products"))?;
    Ok(Json(rows))
}

/// `GET /products/top`: best match plus up to five alternates for the
/// caller's profile. An empty catalog is a 200 with `{null, []}`.
pub async fn top_products(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<TopProducts>, ApiError> {
    let pool = state.pool()?;

    let profile = profiles::fetch(pool, user.id)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to fetch user profile"))?;

    let catalog = PgCatalog::new(pool.clone());
    let result = loanmatch_core::recommend::top_products(&catalog, profile.as_ref())
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to fetch top products"))?;

    Ok(Json(result))
}

/// `GET /products/personalized`: qualified products only, limit 5. A missing
/// profile (or missing fields) applies no thresholds.
pub async fn personalized_products(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<LoanProduct>>, ApiError> {
    let pool = state.pool()?;

    let profile = profiles::fetch(pool, user.id)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to fetch user profile"))?;
    let qualification = Qualification::from_profile(profile.as_ref());

    let catalog = PgCatalog::new(pool.clone());
    let rows = catalog
        .qualified(None, qualification, PERSONALIZED_LIMIT)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to fetch personalized products"))?;

    Ok(Json(rows))
}

/// `GET /products/banks`: distinct, sorted, non-empty bank names.
pub async fn bank_names(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let pool = state.pool()?;
    let banks = products::bank_names(pool)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to fetch banks"))?;
    Ok(Json(banks))
}

/// `GET /profile`: the caller's profile, or an empty one before first save.
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserProfile>, ApiError> {
    let pool = state.pool()?;
    let profile = profiles::fetch(pool, user.id)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to fetch user profile"))?
        .unwrap_or_default();
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    annual_income: Option<f64>,
    credit_score: Option<i32>,
    loan_type: Option<String>,
}

/// `PUT /profile`: validates and upserts the caller's profile.
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
    let pool = state.pool()?;

    let update = validate_profile_update(body)?;
    let stored = profiles::upsert(pool, user.id, &update)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to update profile"))?;
    Ok(Json(stored))
}

fn validate_profile_update(body: ProfileUpdate) -> Result<UserProfile, ApiError> {
    if let Some(score) = body.credit_score {
        if !(CREDIT_SCORE_MIN..=CREDIT_SCORE_MAX).contains(&score) {
            return Err(ApiError::bad_request(format!(
                "Credit score must be between {CREDIT_SCORE_MIN} and {CREDIT_SCORE_MAX}"
            )));
        }
    }

    if let Some(income) = body.annual_income {
        if income < 0.0 {
            return Err(ApiError::bad_request("Annual income must not be negative"));
        }
    }

    let loan_type = body
        .loan_type
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());
    if let Some(t) = &loan_type {
        if !LOAN_TYPE_OPTIONS.contains(&t.as_str()) {
            return Err(ApiError::bad_request(format!(
                "Loan type must be one of: {}",
                LOAN_TYPE_OPTIONS.join(", ")
            )));
        }
    }

    Ok(UserProfile {
        annual_income: body.annual_income,
        credit_score: body.credit_score,
        loan_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_valid_profile_update() {
        let update = validate_profile_update(ProfileUpdate {
            annual_income: Some(55_000.0),
            credit_score: Some(710),
            loan_type: Some("Auto".to_string()),
        })
        .unwrap();
        assert_eq!(update.loan_type.as_deref(), Some("auto"));
    }

    #[test]
    fn rejects_out_of_range_credit_score() {
        assert!(validate_profile_update(ProfileUpdate {
            annual_income: None,
            credit_score: Some(299),
            loan_type: None,
        })
        .is_err());
        assert!(validate_profile_update(ProfileUpdate {
            annual_income: None,
            credit_score: Some(851),
            loan_type: None,
        })
        .is_err());
    }

    #[test]
    fn rejects_unknown_loan_type() {
        assert!(validate_profile_update(ProfileUpdate {
            annual_income: None,
            credit_score: None,
            loan_type: Some("boat".to_string()),
        })
        .is_err());
    }

    #[test]
    fn blank_loan_type_clears_the_field() {
        let update = validate_profile_update(ProfileUpdate {
            annual_income: None,
            credit_score: None,
            loan_type: Some("  ".to_string()),
        })
        .unwrap();
        assert!(update.loan_type.is_none());
    }
}
