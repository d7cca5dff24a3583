pub mod advisor;
pub mod error;
pub mod openrouter;
pub mod prompt;

/// One chat-completion attempt against a single model. The advisor's fallback
/// loop drives this; implementations must not retry internally.
#[async_trait::async_trait]
pub trait ChatCompletionClient: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_message: &str,
    ) -> anyhow::Result<String>;
}
