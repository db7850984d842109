use crate::domain::course::{CourseSummary, Level};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RESULTS: usize = 5;

/// One recommendation request, built and validated at the boundary and
/// discarded after the call completes.
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub prompt: String,
    pub max_results: usize,
    pub catalog: Vec<CourseSummary>,
}

impl RecommendationRequest {
    pub fn try_new(
        prompt: impl Into<String>,
        max_results: Option<usize>,
        catalog: Vec<CourseSummary>,
    ) -> Result<Self, InvalidRequest> {
        let prompt = prompt.into().trim().to_string();
        if prompt.is_empty() {
            return Err(InvalidRequest::EmptyPrompt);
        }
        let max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        if max_results == 0 {
            return Err(InvalidRequest::ZeroMaxResults);
        }
        Ok(Self {
            prompt,
            max_results,
            catalog,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidRequest {
    EmptyPrompt,
    ZeroMaxResults,
}

impl std::fmt::Display for InvalidRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidRequest::EmptyPrompt => write!(f, "prompt must be non-empty"),
            InvalidRequest::ZeroMaxResults => write!(f, "max_results must be at least 1"),
        }
    }
}

impl std::error::Error for InvalidRequest {}

/// A `{courseId, reason}` pair as produced by a provider or the local
/// ranker, prior to enrichment. Candidates referencing ids outside the
/// catalog are dropped during enrichment and never surface to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationCandidate {
    #[serde(rename = "courseId", alias = "course_id")]
    pub course_id: String,
    #[serde(default)]
    pub reason: String,
}

/// Candidate joined with its catalog record; the unit returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedRecommendation {
    #[serde(rename = "courseId")]
    pub course_id: String,
    pub reason: String,
    pub course: CourseSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationOutcome {
    pub recommendations: Vec<EnrichedRecommendation>,
    pub provider_used: String,
    pub summary: String,
    pub total_available: usize,
    pub remaining_requests: u64,
}

/// One prior enrollment, used by the personalized variant to synthesize
/// its prompt and to drive the same-category fallback.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrollmentRecord {
    pub category: String,
    pub level: Level,
}

/// Join candidates against the catalog by id, dropping any candidate whose
/// id has no catalog entry.
pub fn enrich(
    candidates: Vec<RecommendationCandidate>,
    catalog: &[CourseSummary],
) -> Vec<EnrichedRecommendation> {
    let by_id: std::collections::HashMap<&str, &CourseSummary> =
        catalog.iter().map(|c| (c.id.as_str(), c)).collect();

    candidates
        .into_iter()
        .filter_map(|cand| {
            let course = by_id.get(cand.course_id.as_str())?;
            Some(EnrichedRecommendation {
                course_id: cand.course_id,
                reason: cand.reason,
                course: (*course).clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str, title: &str) -> CourseSummary {
        CourseSummary {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            category: "Programming".to_string(),
            level: Level::Beginner,
            duration: None,
            instructor_name: "Unknown Instructor".to_string(),
        }
    }

    #[test]
    fn try_new_rejects_blank_prompt() {
        let err = RecommendationRequest::try_new("   ", None, vec![]).unwrap_err();
        assert_eq!(err, InvalidRequest::EmptyPrompt);
    }

    #[test]
    fn try_new_defaults_max_results() {
        let req = RecommendationRequest::try_new("rust", None, vec![]).unwrap();
        assert_eq!(req.max_results, DEFAULT_MAX_RESULTS);
    }

    #[test]
    fn candidate_accepts_camel_case_course_id() {
        let cand: RecommendationCandidate =
            serde_json::from_str(r#"{"courseId":"abc","reason":"fit"}"#).unwrap();
        assert_eq!(cand.course_id, "abc");
    }

    #[test]
    fn enrich_drops_unknown_ids() {
        let catalog = vec![course("a1", "Rust"), course("b2", "Go")];
        let candidates = vec![
            RecommendationCandidate {
                course_id: "a1".to_string(),
                reason: "matches".to_string(),
            },
            RecommendationCandidate {
                course_id: "zz".to_string(),
                reason: "ghost".to_string(),
            },
        ];
        let enriched = enrich(candidates, &catalog);
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].course_id, "a1");
        assert_eq!(enriched[0].course.title, "Rust");
    }
}
