use crate::config::Settings;
use crate::domain::course::CourseSummary;
use crate::domain::recommendation::RecommendationCandidate;
use crate::llm::error::ProviderCallError;
use crate::llm::{parse, prompt, ProviderAdapter, ProviderKind};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";
const DEFAULT_MODEL: &str = "command-r";
const DEFAULT_TIMEOUT_SECS: u64 = 12;
const MAX_TOKENS: u32 = 600;
const TEMPERATURE: f64 = 0.3;

const PREAMBLE: &str =
    "You are a course recommendation assistant. Always respond with valid JSON only.";

#[derive(Debug, Clone)]
pub struct CohereAdapter {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl CohereAdapter {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_cohere_api_key()?.to_string();
        let base_url =
            std::env::var("COHERE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("COHERE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("COHERE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build cohere http client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    async fn chat(&self, message: String) -> anyhow::Result<String> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );

        let req = ChatRequest {
            model: self.model.clone(),
            message,
            preamble: PREAMBLE,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let url = format!("{}/v1/chat", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("cohere request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read cohere response body")?;
        if !status.is_success() {
            return Err(ProviderCallError {
                provider: ProviderKind::Cohere,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
            }
            .into());
        }

        let parsed = serde_json::from_str::<ChatResponse>(&text)
            .with_context(|| format!("failed to decode cohere response: {text}"))?;
        Ok(parsed.text)
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for CohereAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Cohere
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
    message: String,
    preamble: &'static str,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_chat_text() {
        let body = r#"{"response_id":"r1","text":"[{\"courseId\":\"a\"}]","finish_reason":"COMPLETE"}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text, "[{\"courseId\":\"a\"}]");
    }
}
