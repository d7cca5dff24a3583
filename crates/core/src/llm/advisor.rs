use crate::config::Settings;
use crate::llm::error::ProviderExhausted;
use crate::llm::openrouter::OpenRouterClient;
use crate::llm::ChatCompletionClient;
use std::sync::Arc;

/// Stateless advisor built once per process. Tries each configured model id in
/// order and accepts the first non-empty response; prompt content is passed in
/// by the caller, so the service itself holds no request state.
#[derive(Clone)]
pub struct AdvisorService {
    client: Arc<dyn ChatCompletionClient>,
    models: Vec<String>,
}

impl AdvisorService {
    pub fn new(client: Arc<dyn ChatCompletionClient>, models: Vec<String>) -> anyhow::Result<Self> {
        anyhow::ensure!(!models.is_empty(), "advisor model list must be non-empty");
        Ok(Self { client, models })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = OpenRouterClient::from_settings(settings)?;
        Self::new(Arc::new(client), settings.advisor_models())
    }

    /// Bounded sequential fallback over the configured models. An empty
    /// response moves on to the next model without recording an error; on
    /// exhaustion the last provider error (if any) is preserved.
    pub async fn ask(&self, system_prompt: &str, user_message: &str) -> anyhow::Result<String> {
        let mut last_error: Option<anyhow::Error> = None;

        for model in &self.models {
            match self
                .client
                .complete(model, system_prompt, user_message)
                .await
            {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::debug!(%model, "completion succeeded");
                    return Ok(text);
                }
                Ok(_) => {
                    tracing::warn!(%model, "model returned an empty response; trying next");
                }
                Err(err) => {
                    tracing::warn!(%model, error = %err, "model attempt failed; trying next");
                    last_error = Some(err);
                }
            }
        }

        Err(ProviderExhausted {
            models_tried: self.models.clone(),
            last_error: last_error.map(|e| format!("{e:#}")),
        }
        .into())
    }
}
