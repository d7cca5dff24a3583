use std::fmt;

/// Every configured model either failed or returned an empty response.
/// Carries the last provider error so the API can surface it verbatim.
#[derive(Debug, Clone)]
pub struct ProviderExhausted {
    pub models_tried: Vec<String>,
    pub last_error: Option<String>,
}

impl fmt::Display for ProviderExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.last_error {
            Some(detail) => write!(
                f,
                "no response available from completion provider (models tried: {}): {detail}",
                self.models_tried.join(", ")
            ),
            None => write!(
                f,
                "no response available from completion provider (models tried: {})",
                self.models_tried.join(", ")
            ),
        }
    }
}

impl std::error::Error for ProviderExhausted {}
