use crate::domain::course::CourseSummary;
use crate::domain::recommendation::RecommendationCandidate;

pub mod cohere;
pub mod error;
pub mod huggingface;
pub mod ollama;
pub mod openai;
pub mod parse;
pub mod prompt;

/// Remote providers in declared priority order, plus the local keyword tier
/// used for request accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Ollama,
    HuggingFace,
    Cohere,
    Keyword,
}

impl ProviderKind {
    pub const REMOTE_PRIORITY: [ProviderKind; 4] = [
        ProviderKind::OpenAi,
        ProviderKind::Ollama,
        ProviderKind::HuggingFace,
        ProviderKind::Cohere,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::Cohere => "cohere",
            ProviderKind::Keyword => "keyword",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One external text-generation capability. Exactly one attempt per call;
/// retries and fallback ordering live in the orchestrator.
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn attempt(
        &self,
        prompt: &str,
        catalog: &[CourseSummary],
        max_results: usize,
    ) -> anyhow::Result<Vec<RecommendationCandidate>>;
}
