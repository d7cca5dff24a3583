use crate::config::Settings;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Validates a bearer token against the external auth provider. `Ok(None)`
/// means the token was rejected; errors are provider/transport failures.
#[async_trait::async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(&self, bearer_token: &str) -> anyhow::Result<Option<AuthUser>>;
}

/// Supabase-shaped token introspection: GET {base}/auth/v1/user with the
/// project anon key and the user's bearer token.
#[derive(Debug, Clone)]
pub struct HttpAuthVerifier {
    http: reqwest::Client,
    base_url: String,
    anon_key: Option<String>,
}

impl HttpAuthVerifier {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings.require_auth_base_url()?.to_string();
        let anon_key = settings.auth_anon_key.clone();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.auth_timeout_secs()))
            .build()
            .context("failed to build auth http client")?;

        Ok(Self {
            http,
            base_url,
            anon_key,
        })
    }
}

#[async_trait::async_trait]
impl AuthVerifier for HttpAuthVerifier {
    async fn verify(&self, bearer_token: &str) -> anyhow::Result<Option<AuthUser>> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {bearer_token}"))?,
        );
        if let Some(anon_key) = &self.anon_key {
            headers.insert("apikey", HeaderValue::from_str(anon_key)?);
        }

        let url = format!("{}/auth/v1/user", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .context("auth provider request failed")?;

        let status = res.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Ok(None);
        }

        let text = res
            .text()
            .await
            .context("failed to read auth provider response")?;
        if !status.is_success() {
            anyhow::bail!("auth provider HTTP {status}: {text}");
        }

        let user = serde_json::from_str::<AuthUser>(&text)
            .with_context(|| format!("failed to parse auth provider response: {text}"))?;
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_payload() {
        let user: AuthUser = serde_json::from_str(
            r#"{"id": "6b1e0a5c-1111-4222-8333-444455556666", "email": "a@b.c", "role": "authenticated"}"#,
        )
        .unwrap();
        assert_eq!(
            user.id,
            "6b1e0a5c-1111-4222-8333-444455556666".parse::<Uuid>().unwrap()
        );
    }
}
