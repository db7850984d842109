pub mod domain;
pub mod llm;
pub mod orchestrator;
pub mod rank;
pub mod storage;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_MAX_AI_REQUESTS: u64 = 250;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub openai_api_key: Option<String>,
        pub ollama_base_url: Option<String>,
        pub huggingface_api_key: Option<String>,
        pub cohere_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub app_env: String,
        pub max_ai_requests: u64,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let max_ai_requests = std::env::var("MAX_AI_REQUESTS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_MAX_AI_REQUESTS);

            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
                ollama_base_url: std::env::var("OLLAMA_BASE_URL").ok(),
                huggingface_api_key: std::env::var("HUGGINGFACE_API_KEY").ok(),
                cohere_api_key: std::env::var("COHERE_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                max_ai_requests,
            })
        }

        pub fn is_production(&self) -> bool {
            self.app_env.eq_ignore_ascii_case("production")
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required")
        }

        pub fn require_ollama_base_url(&self) -> anyhow::Result<&str> {
            self.ollama_base_url
                .as_deref()
                .context("OLLAMA_BASE_URL is required")
        }

        pub fn require_huggingface_api_key(&self) -> anyhow::Result<&str> {
            self.huggingface_api_key
                .as_deref()
                .context("HUGGINGFACE_API_KEY is required")
        }

        pub fn require_cohere_api_key(&self) -> anyhow::Result<&str> {
            self.cohere_api_key
                .as_deref()
                .context("COHERE_API_KEY is required")
        }
    }
}
