use crate::llm::ProviderKind;
use std::fmt;

/// Diagnostic error for a failed remote attempt. Carried up to the
/// orchestrator, logged, and never shown to end callers.
#[derive(Debug, Clone)]
pub struct ProviderCallError {
    pub provider: ProviderKind,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
}

impl fmt::Display for ProviderCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "provider error (provider={}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for ProviderCallError {}

/// The response text contained no extractable recommendation structure.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub detail: String,
}

impl ParseError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no recommendation structure in response: {}", self.detail)
    }
}

impl std::error::Error for ParseError {}
