pub mod auth;
pub mod domain;
pub mod llm;
pub mod recommend;
pub mod storage;

pub mod config {
    use anyhow::Context;

    /// Fallback order for the advisor when ADVISOR_MODELS is unset.
    pub const DEFAULT_ADVISOR_MODELS: [&str; 3] = [
        "deepseek/deepseek-r1",
        "deepseek/deepseek-chat",
        "deepseek/deepseek-coder",
    ];

    pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai";
    pub const DEFAULT_OPENROUTER_TIMEOUT_SECS: u64 = 60;
    pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 10;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub completion_api_key: Option<String>,
        pub advisor_models: Option<String>,
        pub openrouter_base_url: Option<String>,
        pub openrouter_timeout_secs: Option<String>,
        pub auth_base_url: Option<String>,
        pub auth_anon_key: Option<String>,
        pub auth_timeout_secs: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                completion_api_key: std::env::var("DEEPSEEK_API_KEY").ok(),
                advisor_models: std::env::var("ADVISOR_MODELS").ok(),
                openrouter_base_url: std::env::var("OPENROUTER_BASE_URL").ok(),
                openrouter_timeout_secs: std::env::var("OPENROUTER_TIMEOUT_SECS").ok(),
                auth_base_url: std::env::var("AUTH_BASE_URL").ok(),
                auth_anon_key: std::env::var("AUTH_ANON_KEY").ok(),
                auth_timeout_secs: std::env::var("AUTH_TIMEOUT_SECS").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_completion_api_key(&self) -> anyhow::Result<&str> {
            self.completion_api_key
                .as_deref()
                .context("DEEPSEEK_API_KEY is required")
        }

        pub fn require_auth_base_url(&self) -> anyhow::Result<&str> {
            self.auth_base_url
                .as_deref()
                .context("AUTH_BASE_URL is required")
        }

        /// Ordered model ids for the fallback loop, from ADVISOR_MODELS
        /// (comma-separated) or the built-in default list.
        pub fn advisor_models(&self) -> Vec<String> {
            let configured: Vec<String> = self
                .advisor_models
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();

            if configured.is_empty() {
                DEFAULT_ADVISOR_MODELS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            } else {
                configured
            }
        }

        pub fn openrouter_base_url(&self) -> &str {
            self.openrouter_base_url
                .as_deref()
                .unwrap_or(DEFAULT_OPENROUTER_BASE_URL)
        }

        pub fn openrouter_timeout_secs(&self) -> u64 {
            parse_secs(
                self.openrouter_timeout_secs.as_deref(),
                DEFAULT_OPENROUTER_TIMEOUT_SECS,
            )
        }

        pub fn auth_timeout_secs(&self) -> u64 {
            parse_secs(self.auth_timeout_secs.as_deref(), DEFAULT_AUTH_TIMEOUT_SECS)
        }
    }

    fn parse_secs(raw: Option<&str>, default: u64) -> u64 {
        raw.and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(default)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn settings(models: Option<&str>) -> Settings {
            Settings {
                database_url: None,
                completion_api_key: None,
                advisor_models: models.map(str::to_string),
                openrouter_base_url: None,
                openrouter_timeout_secs: None,
                auth_base_url: None,
                auth_anon_key: None,
                auth_timeout_secs: None,
                sentry_dsn: None,
            }
        }

        #[test]
        fn default_model_list_when_unset() {
            assert_eq!(settings(None).advisor_models().len(), 3);
        }

        #[test]
        fn parses_comma_separated_models() {
            let models = settings(Some(" a/b , c/d ,")).advisor_models();
            assert_eq!(models, vec!["a/b".to_string(), "c/d".to_string()]);
        }

        #[test]
        fn timeouts_fall_back_to_defaults() {
            let s = settings(None);
            assert_eq!(s.openrouter_timeout_secs(), DEFAULT_OPENROUTER_TIMEOUT_SECS);
            assert_eq!(s.auth_timeout_secs(), DEFAULT_AUTH_TIMEOUT_SECS);
            assert_eq!(s.openrouter_base_url(), DEFAULT_OPENROUTER_BASE_URL);
        }

        #[test]
        fn parses_configured_timeouts_and_base_url() {
            let mut s = settings(None);
            s.openrouter_timeout_secs = Some(" 15 ".to_string());
            s.auth_timeout_secs = Some("not-a-number".to_string());
            s.openrouter_base_url = Some("https://gateway.example".to_string());
            assert_eq!(s.openrouter_timeout_secs(), 15);
            assert_eq!(s.auth_timeout_secs(), DEFAULT_AUTH_TIMEOUT_SECS);
            assert_eq!(s.openrouter_base_url(), "https://gateway.example");
        }
    }
}
