use crate::config::Settings;
use crate::domain::course::CourseSummary;
use crate::domain::recommendation::RecommendationCandidate;
use crate::llm::error::ProviderCallError;
use crate::llm::{parse, prompt, ProviderAdapter, ProviderKind};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_MODEL: &str = "google/flan-t5-base";
const DEFAULT_TIMEOUT_SECS: u64 = 12;
const MAX_NEW_TOKENS: u32 = 500;
const TEMPERATURE: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct HuggingFaceAdapter {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl HuggingFaceAdapter {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_huggingface_api_key()?.to_string();
        let base_url =
            std::env::var("HUGGINGFACE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("HUGGINGFACE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("HUGGINGFACE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build huggingface http client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    async fn text_generation(&self, inputs: String) -> anyhow::Result<String> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );

        let req = InferenceRequest {
            inputs,
            parameters: InferenceParameters {
                max_new_tokens: MAX_NEW_TOKENS,
                temperature: TEMPERATURE,
                return_full_text: false,
            },
        };

        let url = format!(
            "{}/models/{}",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("huggingface request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read huggingface response body")?;
        if !status.is_success() {
            return Err(ProviderCallError {
                provider: ProviderKind::HuggingFace,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
            }
            .into());
        }

        let generated = decode_generated_text(&text)
            .with_context(|| format!("failed to decode huggingface response: {text}"))?;
        Ok(generated)
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for HuggingFaceAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }

    async fn attempt(
        &self,
        user_prompt: &str,
        catalog: &[CourseSummary],
        max_results: usize,
    ) -> anyhow::Result<Vec<RecommendationCandidate>> {
        let instruction = prompt::build_instruction(user_prompt, catalog, max_results);
        let content = self.text_generation(instruction).await?;
        let candidates = parse::parse_candidates(&content, max_results)?;
        Ok(candidates)
    }
}

/// The inference API returns either `[{"generated_text": ...}]` or a bare
/// `{"generated_text": ...}` object depending on the model pipeline.
fn decode_generated_text(body: &str) -> anyhow::Result<String> {
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    enum Body {
        Many(Vec<Generated>),
        One(Generated),
    }

    let parsed = serde_json::from_str::<Body>(body)?;
    let generated = match parsed {
        Body::Many(items) => items
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .unwrap_or_default(),
        Body::One(g) => g.generated_text,
    };
    Ok(generated)
}

#[derive(Debug, Deserialize)]
struct Generated {
    #[serde(default)]
    generated_text: String,
}

#[derive(Debug, Clone, Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
}

#[derive(Debug, Clone, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f64,
    return_full_text: bool,
}
