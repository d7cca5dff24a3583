use crate::domain::product::LoanProduct;
use serde::{Deserialize, Serialize};

/// Result of the best-match composer: at most one headline recommendation and
/// up to five alternates, no product id repeated between the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProducts {
    #[serde(rename = "bestMatch")]
    pub best_match: Option<LoanProduct>,
    pub top5: Vec<LoanProduct>,
}
