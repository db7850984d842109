use crate::config::Settings;
use crate::domain::course::CourseSummary;
use crate::domain::recommendation::RecommendationCandidate;
use crate::llm::error::ProviderCallError;
use crate::llm::{parse, prompt, ProviderAdapter, ProviderKind};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const NUM_PREDICT: u32 = 700;
const TEMPERATURE: f64 = 0.3;

/// Model families tried in order when picking from the local tag list.
const PREFERRED_MODELS: [&str; 2] = ["llama3", "mistral"];

#[derive(Debug, Clone)]
pub struct OllamaAdapter {
    http: reqwest::Client,
    base_url: String,
    model_override: Option<String>,
}

impl OllamaAdapter {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings.require_ollama_base_url()?.to_string();
        let model_override = std::env::var("OLLAMA_MODEL").ok().filter(|s| !s.is_empty());
        let timeout_secs = std::env::var("OLLAMA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build ollama http client")?;

        Ok(Self {
            http,
            base_url,
            model_override,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Asks the local server which models are installed and picks one,
    /// preferring well-known instruct families over whatever comes first.
    async fn detect_model(&self) -> anyhow::Result<String> {
        if let Some(model) = &self.model_override {
            return Ok(model.clone());
        }

        let res = self
            .http
            .get(self.url("/api/tags"))
            .send()
            .await
            .context("ollama tags request failed")?;
        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read ollama tags response")?;
        if !status.is_success() {
            return Err(ProviderCallError {
                provider: ProviderKind::Ollama,
                stage: "tags",
                detail: format!("status={status}"),
                raw_output: Some(text),
            }
            .into());
        }

        let tags = serde_json::from_str::<TagsResponse>(&text)
            .with_context(|| format!("failed to decode ollama tags: {text}"))?;
        pick_model(&tags.models).ok_or_else(|| {
            ProviderCallError {
                provider: ProviderKind::Ollama,
                stage: "tags",
                detail: "no models installed".to_string(),
                raw_output: Some(text),
            }
            .into()
        })
    }

    async fn generate(&self, model: &str, full_prompt: String) -> anyhow::Result<String> {
        let req = GenerateRequest {
            model: model.to_string(),
            prompt: full_prompt,
            stream: false,
            options: GenerateOptions {
                temperature: TEMPERATURE,
                num_predict: NUM_PREDICT,
            },
        };

        let res = self
            .http
            .post(self.url("/api/generate"))
            .json(&req)
            .send()
            .await
            .context("ollama generate request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read ollama generate response")?;
        if !status.is_success() {
            return Err(ProviderCallError {
                provider: ProviderKind::Ollama,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
            }
            .into());
        }

        let parsed = serde_json::from_str::<GenerateResponse>(&text)
            .with_context(|| format!("failed to decode ollama response: {text}"))?;
        Ok(parsed.response)
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for OllamaAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    async fn attempt(
        &self,
        user_prompt: &str,
        catalog: &[CourseSummary],
        max_results: usize,
    ) -> anyhow::Result<Vec<RecommendationCandidate>> {
        let model = self.detect_model().await?;
        tracing::debug!(%model, "ollama model selected");
        let instruction = prompt::build_instruction(user_prompt, catalog, max_results);
        let content = self.generate(&model, instruction).await?;
        let candidates = parse::parse_candidates(&content, max_results)?;
        Ok(candidates)
    }
}

fn pick_model(models: &[TagModel]) -> Option<String> {
    for family in PREFERRED_MODELS {
        if let Some(m) = models.iter().find(|m| m.name.starts_with(family)) {
            return Some(m.name.clone());
        }
    }
    models.first().map(|m| m.name.clone())
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Clone, Deserialize)]
struct TagModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> TagModel {
        TagModel {
            name: name.to_string(),
        }
    }

    #[test]
    fn prefers_known_families_over_first_tag() {
        let models = vec![tag("qwen2:7b"), tag("mistral:latest"), tag("llama3:8b")];
        assert_eq!(pick_model(&models).as_deref(), Some("llama3:8b"));
    }

    #[test]
    fn falls_back_to_first_installed_model() {
        let models = vec![tag("qwen2:7b"), tag("phi3:mini")];
        assert_eq!(pick_model(&models).as_deref(), Some("qwen2:7b"));
    }

    #[test]
    fn none_when_no_models() {
        assert_eq!(pick_model(&[]), None);
    }

    #[test]
    fn decodes_generate_response() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"model":"llama3","response":"[]","done":true}"#).unwrap();
        assert_eq!(parsed.response, "[]");
    }
}
