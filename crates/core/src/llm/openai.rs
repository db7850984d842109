use crate::config::Settings;
use crate::domain::course::CourseSummary;
use crate::domain::recommendation::RecommendationCandidate;
use crate::llm::error::ProviderCallError;
use crate::llm::{parse, prompt, ProviderAdapter, ProviderKind};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f64 = 0.7;

const SYSTEM_PROMPT: &str =
    "You are a helpful course recommendation assistant. Always respond with valid JSON.";

#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiAdapter {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?.to_string();
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build openai http client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    async fn chat(&self, user_prompt: String) -> anyhow::Result<String> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );

        let req = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("openai request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read openai response body")?;
        if !status.is_success() {
            return Err(ProviderCallError {
                provider: ProviderKind::OpenAi,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
            }
            .into());
        }

        let parsed = serde_json::from_str::<ChatResponse>(&text)
            .with_context(|| format!("failed to decode openai response: {text}"))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderCallError {
                provider: ProviderKind::OpenAi,
                stage: "content",
                detail: "empty completion".to_string(),
                raw_output: Some(text),
            }
            .into());
        }
        Ok(content)
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn attempt(
        &self,
        user_prompt: &str,
        catalog: &[CourseSummary],
        max_results: usize,
    ) -> anyhow::Result<Vec<RecommendationCandidate>> {
        let instruction = prompt::build_instruction(user_prompt, catalog, max_results);
        let content = self.chat(instruction).await?;
        let candidates = parse::parse_candidates(&content, max_results)?;
        Ok(candidates)
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
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
    content: String,
}
