use crate::config::Settings;
use crate::llm::ChatCompletionClient;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Chat-completions client for OpenRouter's OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenRouterClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_completion_api_key()?.to_string();
        let base_url = settings.openrouter_base_url().to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.openrouter_timeout_secs()))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    async fn send(&self, req: ChatCompletionRequest) -> anyhow::Result<ChatCompletionResponse> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );

        let url = format!(
            "{}/api/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("OpenRouter request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read OpenRouter response body")?;
        if !status.is_success() {
            anyhow::bail!("OpenRouter HTTP {status}: {text}");
        }

        serde_json::from_str::<ChatCompletionResponse>(&text)
            .with_context(|| format!("failed to parse OpenRouter response JSON: {text}"))
    }
}

#[async_trait::async_trait]
impl ChatCompletionClient for OpenRouterClient {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        user_message: &str,
    ) -> anyhow::Result<String> {
        let req = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                Message {
                    role: "user",
                    content: user_message.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let res = self.send(req).await?;
        let content = res
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        Ok(normalize_content(content))
    }
}

/// Flattens the provider's content shapes to plain text: strings pass through,
/// part arrays concatenate their text parts, anything else is coerced to its
/// JSON string form. Empty output signals the fallback loop to try the next
/// model.
fn normalize_content(content: Option<MessageContent>) -> String {
    match content {
        None => String::new(),
        Some(MessageContent::Text(s)) => s,
        Some(MessageContent::Parts(parts)) => parts
            .into_iter()
            .map(|part| match part {
                ContentPart::Text { text } => text,
                ContentPart::Other(_) => String::new(),
            })
            .collect(),
        Some(MessageContent::Other(v)) => {
            if v.is_null() {
                String::new()
            } else {
                v.to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<MessageContent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text { text: String },
    Other(serde_json::Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content_of(v: serde_json::Value) -> Option<MessageContent> {
        let res: ChatCompletionResponse = serde_json::from_value(v).unwrap();
        res.choices.into_iter().next().unwrap().message.content
    }

    #[test]
    fn plain_string_content_passes_through() {
        let content = content_of(json!({
            "choices": [{"message": {"role": "assistant", "content": "hello"}}]
        }));
        assert_eq!(normalize_content(content), "hello");
    }

    #[test]
    fn part_array_concatenates_text_parts_only() {
        let content = content_of(json!({
            "choices": [{"message": {"content": [
                {"type": "text", "text": "hello "},
                {"type": "image_url", "image_url": {"url": "https://x"}},
                {"type": "text", "text": "world"}
            ]}}]
        }));
        assert_eq!(normalize_content(content), "hello world");
    }

    #[test]
    fn null_content_normalizes_to_empty() {
        let content = content_of(json!({
            "choices": [{"message": {"content": null}}]
        }));
        assert_eq!(normalize_content(content), "");
    }

    #[test]
    fn missing_choices_default_to_empty() {
        let res: ChatCompletionResponse = serde_json::from_value(json!({})).unwrap();
        assert!(res.choices.is_empty());
    }

    #[test]
    fn unexpected_content_shape_is_coerced() {
        let content = content_of(json!({
            "choices": [{"message": {"content": 42}}]
        }));
        assert_eq!(normalize_content(content), "42");
    }
}
