use serde::{Deserialize, Serialize};

/// Loan types a user may declare on their profile.
pub const LOAN_TYPE_OPTIONS: [&str; 5] = ["personal", "auto", "home", "student", "business"];

pub const CREDIT_SCORE_MIN: i32 = 300;
pub const CREDIT_SCORE_MAX: i32 = 850;

/// Per-user financial attributes, owned one-to-one by an auth user. All fields
/// optional; a missing field never disqualifies a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub annual_income: Option<f64>,
    pub credit_score: Option<i32>,
    pub loan_type: Option<String>,
}

/// Qualification thresholds derived from a profile. Missing values mean
/// "no constraint": a product qualifies unless a known value falls below its
/// minimum.
#[derive(Debug, Clone, Copy, Default)]
pub struct Qualification {
    pub credit_score: Option<i32>,
    pub annual_income: Option<f64>,
}

impl Qualification {
    pub fn from_profile(profile: Option<&UserProfile>) -> Self {
        match profile {
            Some(p) => Self {
                credit_score: p.credit_score,
                annual_income: p.annual_income,
            },
            None => Self::default(),
        }
    }
}

/// Maps a user-facing loan type to the catalog's category vocabulary.
/// Case-insensitive; unknown input passes through unchanged.
pub fn map_loan_type(user_loan_type: &str) -> String {
    match user_loan_type.to_lowercase().as_str() {
        "student" => "Education".to_string(),
        "home" => "Home".to_string(),
        "personal" => "Personal".to_string(),
        "auto" => "Vehicle".to_string(),
        "vehicle" => "Vehicle".to_string(),
        "business" => "Business".to_string(),
        "education" => "Education".to_string(),
        _ => user_loan_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_types_case_insensitively() {
        assert_eq!(map_loan_type("auto"), "Vehicle");
        assert_eq!(map_loan_type("AUTO"), "Vehicle");
        assert_eq!(map_loan_type("Student"), "Education");
        assert_eq!(map_loan_type("home"), "Home");
        assert_eq!(map_loan_type("business"), "Business");
    }

    #[test]
    fn passes_unknown_types_through() {
        assert_eq!(map_loan_type("boat"), "boat");
        assert_eq!(map_loan_type(""), "");
    }

    #[test]
    fn idempotent_on_mapped_outputs() {
        for key in ["student", "home", "personal", "auto", "vehicle", "business", "education"] {
            let once = map_loan_type(key);
            assert_eq!(map_loan_type(&once), once);
        }
    }
}
