use crate::config::Settings;
use crate::domain::course::CourseSummary;
use crate::domain::recommendation::{
    enrich, EnrollmentRecord, InvalidRequest, RecommendationCandidate, RecommendationOutcome,
    RecommendationRequest,
};
use crate::llm::cohere::CohereAdapter;
use crate::llm::huggingface::HuggingFaceAdapter;
use crate::llm::ollama::OllamaAdapter;
use crate::llm::openai::OpenAiAdapter;
use crate::llm::{ProviderAdapter, ProviderKind};
use crate::rank;
use crate::storage::request_log::{BudgetSnapshot, BudgetStore};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Label reported when the personalized category fallback answers.
const CATEGORY_PROVIDER_LABEL: &str = "category";

/// One entry in the fixed provider priority chain. Availability is decided
/// once at startup from configuration presence; a failed call never flips
/// it.
pub struct ProviderSlot {
    pub kind: ProviderKind,
    pub adapter: Option<Arc<dyn ProviderAdapter>>,
    pub init_error: Option<String>,
}

impl ProviderSlot {
    pub fn available(kind: ProviderKind, adapter: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            kind,
            adapter: Some(adapter),
            init_error: None,
        }
    }

    pub fn unavailable(kind: ProviderKind, error: impl fmt::Display) -> Self {
        Self {
            kind,
            adapter: None,
            init_error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub name: &'static str,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub providers: Vec<ProviderStatus>,
    pub request_counts: BudgetSnapshot,
    pub max_requests: u64,
    pub remaining_requests: u64,
}

/// Errors visible to callers. All per-provider trouble is recovered inside
/// `recommend` and never propagates past it.
#[derive(Debug)]
pub enum RecommendError {
    Invalid(InvalidRequest),
    EmptyCatalog,
    BudgetExceeded { used: i64, ceiling: u64 },
    Cancelled,
    Internal(anyhow::Error),
}

impl fmt::Display for RecommendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendError::Invalid(e) => write!(f, "invalid request: {e}"),
            RecommendError::EmptyCatalog => {
                write!(f, "no courses available to recommend from")
            }
            RecommendError::BudgetExceeded { used, ceiling } => write!(
                f,
                "AI request budget exceeded ({used} of {ceiling} used)"
            ),
            RecommendError::Cancelled => write!(f, "request cancelled"),
            RecommendError::Internal(e) => write!(f, "internal error: {e:#}"),
        }
    }
}

impl std::error::Error for RecommendError {}

impl From<InvalidRequest> for RecommendError {
    fn from(e: InvalidRequest) -> Self {
        RecommendError::Invalid(e)
    }
}

/// Orchestrates the provider priority chain with a guaranteed local
/// fallback. Providers are tried strictly in declared order; the first
/// usable non-empty candidate list wins and is the only attempt counted.
pub struct Recommender {
    slots: Vec<ProviderSlot>,
    budget: Arc<dyn BudgetStore>,
    max_requests: u64,
}

impl Recommender {
    pub fn new(slots: Vec<ProviderSlot>, budget: Arc<dyn BudgetStore>, max_requests: u64) -> Self {
        Self {
            slots,
            budget,
            max_requests,
        }
    }

    /// Builds the fixed priority chain from configuration. Providers whose
    /// credentials are absent stay in the chain as unavailable so status
    /// reporting can name them.
    pub fn from_settings(settings: &Settings, budget: Arc<dyn BudgetStore>) -> Self {
        let mut slots = Vec::with_capacity(ProviderKind::REMOTE_PRIORITY.len());
        for kind in ProviderKind::REMOTE_PRIORITY {
            let slot = match kind {
                ProviderKind::OpenAi => Self::build_slot(kind, OpenAiAdapter::from_settings(settings)),
                ProviderKind::Ollama => Self::build_slot(kind, OllamaAdapter::from_settings(settings)),
                ProviderKind::HuggingFace => {
                    Self::build_slot(kind, HuggingFaceAdapter::from_settings(settings))
                }
                ProviderKind::Cohere => Self::build_slot(kind, CohereAdapter::from_settings(settings)),
                ProviderKind::Keyword => continue,
            };
            if slot.adapter.is_none() {
                tracing::info!(
                    provider = kind.name(),
                    error = slot.init_error.as_deref().unwrap_or("unknown"),
                    "provider not configured; will be skipped"
                );
            }
            slots.push(slot);
        }
        Self::new(slots, budget, settings.max_ai_requests)
    }

    fn build_slot<A>(kind: ProviderKind, built: anyhow::Result<A>) -> ProviderSlot
    where
        A: ProviderAdapter + 'static,
    {
        match built {
            Ok(adapter) => ProviderSlot::available(kind, Arc::new(adapter)),
            Err(e) => ProviderSlot::unavailable(kind, format!("{e:#}")),
        }
    }

    pub async fn recommend(
        &self,
        request: RecommendationRequest,
        cancel: &CancellationToken,
    ) -> Result<RecommendationOutcome, RecommendError> {
        self.check_budget().await?;
        if request.catalog.is_empty() {
            return Err(RecommendError::EmptyCatalog);
        }

        let (candidates, winner) = match self
            .try_providers(&request.prompt, &request.catalog, request.max_results, cancel)
            .await?
        {
            Some(win) => win,
            None => {
                let candidates = rank::rank(&request.prompt, &request.catalog, request.max_results);
                (candidates, ProviderKind::Keyword)
            }
        };

        let remaining = self.count_attempt(winner).await?;
        let recommendations = enrich(candidates, &request.catalog);
        let summary = format!(
            "Found {} courses matching your interest in \"{}\"",
            recommendations.len(),
            request.prompt
        );

        tracing::info!(
            provider = winner.name(),
            recommended = recommendations.len(),
            remaining,
            "recommendation served"
        );

        Ok(RecommendationOutcome {
            recommendations,
            provider_used: winner.name().to_string(),
            summary,
            total_available: request.catalog.len(),
            remaining_requests: remaining,
        })
    }

    /// Same state machine as `recommend`, but the prompt is synthesized
    /// from the learner's enrollment history and the final fallback is
    /// same-category courses not yet enrolled.
    pub async fn recommend_personalized(
        &self,
        history: &[EnrollmentRecord],
        max_results: Option<usize>,
        catalog: Vec<CourseSummary>,
        exclude_ids: &HashSet<String>,
        cancel: &CancellationToken,
    ) -> Result<RecommendationOutcome, RecommendError> {
        self.check_budget().await?;
        if catalog.is_empty() {
            return Err(RecommendError::EmptyCatalog);
        }
        let max_results =
            max_results.unwrap_or(crate::domain::recommendation::DEFAULT_MAX_RESULTS);
        if max_results == 0 {
            return Err(RecommendError::Invalid(InvalidRequest::ZeroMaxResults));
        }

        let prompt = crate::llm::prompt::personalized_prompt(history);

        let (candidates, winner, label) = match self
            .try_providers(&prompt, &catalog, max_results, cancel)
            .await?
        {
            Some((mut candidates, kind)) => {
                candidates.retain(|c| !exclude_ids.contains(&c.course_id));
                (candidates, kind, kind.name().to_string())
            }
            None => {
                let categories: BTreeSet<String> =
                    history.iter().map(|e| e.category.clone()).collect();
                let by_category =
                    rank::rank_same_category(&categories, &catalog, exclude_ids, max_results);
                if by_category.is_empty() {
                    // Nothing shares a category with the history; keep the
                    // non-empty guarantee via the keyword ranker over the
                    // courses the learner has not enrolled in yet.
                    let eligible: Vec<CourseSummary> = catalog
                        .iter()
                        .filter(|c| !exclude_ids.contains(&c.id))
                        .cloned()
                        .collect();
                    let ranked = rank::rank(&prompt, &eligible, max_results);
                    (ranked, ProviderKind::Keyword, ProviderKind::Keyword.name().to_string())
                } else {
                    (
                        by_category,
                        ProviderKind::Keyword,
                        CATEGORY_PROVIDER_LABEL.to_string(),
                    )
                }
            }
        };

        // An empty final list serves nothing, so it does not consume budget.
        let remaining = if candidates.is_empty() {
            let snapshot = self
                .budget
                .snapshot()
                .await
                .map_err(RecommendError::Internal)?;
            self.remaining(&snapshot)
        } else {
            self.count_attempt(winner).await?
        };
        let recommendations = enrich(candidates, &catalog);
        let summary = format!(
            "Recommended {} courses based on your {} enrollments",
            recommendations.len(),
            history.len()
        );

        tracing::info!(
            provider = %label,
            recommended = recommendations.len(),
            remaining,
            "personalized recommendation served"
        );

        Ok(RecommendationOutcome {
            recommendations,
            provider_used: label,
            summary,
            total_available: catalog.len(),
            remaining_requests: remaining,
        })
    }

    pub async fn status(&self) -> anyhow::Result<StatusReport> {
        let counts = self.budget.snapshot().await?;
        let remaining = self.remaining(&counts);
        Ok(StatusReport {
            providers: self
                .slots
                .iter()
                .map(|slot| ProviderStatus {
                    name: slot.kind.name(),
                    available: slot.adapter.is_some(),
                    last_error: slot.init_error.clone(),
                })
                .collect(),
            request_counts: counts,
            max_requests: self.max_requests,
            remaining_requests: remaining,
        })
    }

    pub async fn reset_counters(&self) -> anyhow::Result<()> {
        self.budget.reset().await
    }

    async fn check_budget(&self) -> Result<(), RecommendError> {
        let snapshot = self
            .budget
            .snapshot()
            .await
            .map_err(RecommendError::Internal)?;
        if snapshot.total >= self.max_requests as i64 {
            return Err(RecommendError::BudgetExceeded {
                used: snapshot.total,
                ceiling: self.max_requests,
            });
        }
        Ok(())
    }

    async fn count_attempt(&self, winner: ProviderKind) -> Result<u64, RecommendError> {
        let snapshot = self
            .budget
            .record(winner)
            .await
            .map_err(RecommendError::Internal)?;
        Ok(self.remaining(&snapshot))
    }

    fn remaining(&self, snapshot: &BudgetSnapshot) -> u64 {
        self.max_requests.saturating_sub(snapshot.total.max(0) as u64)
    }

    /// Walks the priority chain. Returns the first usable non-empty
    /// candidate list, or None when every provider is skipped, fails, or
    /// answers empty. Cancellation is honored between attempts and raced
    /// against each in-flight call.
    async fn try_providers(
        &self,
        prompt: &str,
        catalog: &[CourseSummary],
        max_results: usize,
        cancel: &CancellationToken,
    ) -> Result<Option<(Vec<RecommendationCandidate>, ProviderKind)>, RecommendError> {
        for slot in &self.slots {
            let Some(adapter) = &slot.adapter else {
                tracing::debug!(provider = slot.kind.name(), "skipping unconfigured provider");
                continue;
            };
            if cancel.is_cancelled() {
                return Err(RecommendError::Cancelled);
            }

            let attempt = adapter.attempt(prompt, catalog, max_results);
            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(RecommendError::Cancelled),
                result = attempt => result,
            };

            match result {
                Ok(candidates) if !candidates.is_empty() => {
                    return Ok(Some((candidates, slot.kind)));
                }
                Ok(_) => {
                    tracing::warn!(
                        provider = slot.kind.name(),
                        "provider returned no candidates; trying next"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        provider = slot.kind.name(),
                        error = %format!("{e:#}"),
                        "provider attempt failed; trying next"
                    );
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::Level;
    use crate::storage::request_log::MemoryBudgetStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockAdapter {
        kind: ProviderKind,
        outcome: MockOutcome,
        calls: AtomicUsize,
    }

    enum MockOutcome {
        Succeed(Vec<RecommendationCandidate>),
        Fail,
    }

    impl MockAdapter {
        fn succeeding(kind: ProviderKind, ids: &[&str]) -> Self {
            let candidates = ids
                .iter()
                .map(|id| RecommendationCandidate {
                    course_id: id.to_string(),
                    reason: "mock".to_string(),
                })
                .collect();
            Self {
                kind,
                outcome: MockOutcome::Succeed(candidates),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(kind: ProviderKind) -> Self {
            Self {
                kind,
                outcome: MockOutcome::Fail,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ProviderAdapter for MockAdapter {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn attempt(
            &self,
            _prompt: &str,
            _catalog: &[CourseSummary],
            _max_results: usize,
        ) -> anyhow::Result<Vec<RecommendationCandidate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                MockOutcome::Succeed(candidates) => Ok(candidates.clone()),
                MockOutcome::Fail => anyhow::bail!("mock provider down"),
            }
        }
    }

    fn course(id: &str, title: &str, category: &str) -> CourseSummary {
        CourseSummary {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{title} description"),
            category: category.to_string(),
            level: Level::Beginner,
            duration: None,
            instructor_name: "Unknown Instructor".to_string(),
        }
    }

    fn catalog() -> Vec<CourseSummary> {
        vec![
            course("a1", "Intro to Python", "Programming"),
            course("b2", "Oil Painting", "Art"),
            course("c3", "Data Analysis", "Data"),
        ]
    }

    fn recommender(slots: Vec<ProviderSlot>, max_requests: u64) -> Recommender {
        Recommender::new(slots, Arc::new(MemoryBudgetStore::new()), max_requests)
    }

    fn request(prompt: &str) -> RecommendationRequest {
        RecommendationRequest::try_new(prompt, Some(3), catalog()).unwrap()
    }

    #[tokio::test]
    async fn falls_back_to_keyword_when_all_providers_fail() {
        let rec = recommender(
            vec![
                ProviderSlot::available(
                    ProviderKind::OpenAi,
                    Arc::new(MockAdapter::failing(ProviderKind::OpenAi)),
                ),
                ProviderSlot::available(
                    ProviderKind::Cohere,
                    Arc::new(MockAdapter::failing(ProviderKind::Cohere)),
                ),
            ],
            10,
        );

        let out = rec
            .recommend(request("learn python programming"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(out.provider_used, "keyword");
        assert!(!out.recommendations.is_empty());
    }

    #[tokio::test]
    async fn first_provider_win_short_circuits_the_chain() {
        let first = Arc::new(MockAdapter::succeeding(ProviderKind::OpenAi, &["a1"]));
        let second = Arc::new(MockAdapter::succeeding(ProviderKind::Cohere, &["b2"]));
        let rec = recommender(
            vec![
                ProviderSlot::available(ProviderKind::OpenAi, first.clone()),
                ProviderSlot::available(ProviderKind::Cohere, second.clone()),
            ],
            10,
        );

        let out = rec
            .recommend(request("anything"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(out.provider_used, "openai");
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_provider_result_falls_through_to_next() {
        let first = Arc::new(MockAdapter::succeeding(ProviderKind::OpenAi, &[]));
        let second = Arc::new(MockAdapter::succeeding(ProviderKind::Cohere, &["b2"]));
        let rec = recommender(
            vec![
                ProviderSlot::available(ProviderKind::OpenAi, first.clone()),
                ProviderSlot::available(ProviderKind::Cohere, second.clone()),
            ],
            10,
        );

        let out = rec
            .recommend(request("anything"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(out.provider_used, "cohere");
        assert_eq!(first.call_count(), 1);
    }

    #[tokio::test]
    async fn enrichment_drops_ids_missing_from_catalog() {
        let adapter = Arc::new(MockAdapter::succeeding(
            ProviderKind::OpenAi,
            &["a1", "ghost"],
        ));
        let rec = recommender(
            vec![ProviderSlot::available(ProviderKind::OpenAi, adapter)],
            10,
        );

        let out = rec
            .recommend(request("anything"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(out.recommendations.len(), 1);
        assert_eq!(out.recommendations[0].course_id, "a1");
        assert_eq!(out.recommendations[0].course.title, "Intro to Python");
    }

    #[tokio::test]
    async fn budget_counts_only_the_winning_attempt() {
        let budget = Arc::new(MemoryBudgetStore::new());
        let rec = Recommender::new(
            vec![
                ProviderSlot::available(
                    ProviderKind::OpenAi,
                    Arc::new(MockAdapter::failing(ProviderKind::OpenAi)),
                ),
                ProviderSlot::available(
                    ProviderKind::Cohere,
                    Arc::new(MockAdapter::succeeding(ProviderKind::Cohere, &["a1"])),
                ),
            ],
            budget.clone(),
            10,
        );

        for _ in 0..3 {
            rec.recommend(request("anything"), &CancellationToken::new())
                .await
                .unwrap();
        }

        let snap = budget.snapshot().await.unwrap();
        assert_eq!(snap.total, 3);
        assert_eq!(snap.cohere, 3);
        assert_eq!(snap.openai, 0);
    }

    #[tokio::test]
    async fn budget_ceiling_rejects_and_leaves_counters_unchanged() {
        let budget = Arc::new(MemoryBudgetStore::new());
        let rec = Recommender::new(
            vec![ProviderSlot::available(
                ProviderKind::OpenAi,
                Arc::new(MockAdapter::succeeding(ProviderKind::OpenAi, &["a1"])),
            )],
            budget.clone(),
            2,
        );

        for _ in 0..2 {
            rec.recommend(request("anything"), &CancellationToken::new())
                .await
                .unwrap();
        }

        let err = rec
            .recommend(request("anything"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RecommendError::BudgetExceeded { used: 2, ceiling: 2 }
        ));

        let snap = budget.snapshot().await.unwrap();
        assert_eq!(snap.total, 2);
    }

    #[tokio::test]
    async fn empty_catalog_fails_before_any_adapter_call() {
        let adapter = Arc::new(MockAdapter::succeeding(ProviderKind::OpenAi, &["a1"]));
        let rec = recommender(
            vec![ProviderSlot::available(ProviderKind::OpenAi, adapter.clone())],
            10,
        );

        let req = RecommendationRequest::try_new("anything", Some(3), vec![]).unwrap();
        let err = rec.recommend(req, &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, RecommendError::EmptyCatalog));
        assert_eq!(adapter.call_count(), 0);
    }

    #[tokio::test]
    async fn unconfigured_slots_are_skipped_without_counting() {
        let budget = Arc::new(MemoryBudgetStore::new());
        let rec = Recommender::new(
            vec![
                ProviderSlot::unavailable(ProviderKind::OpenAi, "OPENAI_API_KEY is required"),
                ProviderSlot::available(
                    ProviderKind::HuggingFace,
                    Arc::new(MockAdapter::succeeding(ProviderKind::HuggingFace, &["c3"])),
                ),
            ],
            budget.clone(),
            10,
        );

        let out = rec
            .recommend(request("anything"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(out.provider_used, "huggingface");
        let snap = budget.snapshot().await.unwrap();
        assert_eq!(snap.openai, 0);
        assert_eq!(snap.huggingface, 1);
    }

    #[tokio::test]
    async fn cancelled_request_returns_cancelled_without_counting() {
        let budget = Arc::new(MemoryBudgetStore::new());
        let rec = Recommender::new(
            vec![ProviderSlot::available(
                ProviderKind::OpenAi,
                Arc::new(MockAdapter::succeeding(ProviderKind::OpenAi, &["a1"])),
            )],
            budget.clone(),
            10,
        );

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = rec.recommend(request("anything"), &cancel).await.unwrap_err();

        assert!(matches!(err, RecommendError::Cancelled));
        assert_eq!(budget.snapshot().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn personalized_category_fallback_skips_enrolled_courses() {
        let rec = recommender(
            vec![ProviderSlot::available(
                ProviderKind::OpenAi,
                Arc::new(MockAdapter::failing(ProviderKind::OpenAi)),
            )],
            10,
        );

        let history = vec![EnrollmentRecord {
            category: "Programming".to_string(),
            level: Level::Beginner,
        }];
        let exclude: HashSet<String> = HashSet::new();

        let out = rec
            .recommend_personalized(
                &history,
                Some(5),
                catalog(),
                &exclude,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(out.provider_used, "category");
        assert_eq!(out.recommendations.len(), 1);
        assert_eq!(out.recommendations[0].course_id, "a1");
    }

    #[tokio::test]
    async fn personalized_excludes_enrolled_ids_from_provider_results() {
        let adapter = Arc::new(MockAdapter::succeeding(
            ProviderKind::OpenAi,
            &["a1", "c3"],
        ));
        let rec = recommender(
            vec![ProviderSlot::available(ProviderKind::OpenAi, adapter)],
            10,
        );

        let history = vec![EnrollmentRecord {
            category: "Programming".to_string(),
            level: Level::Beginner,
        }];
        let exclude: HashSet<String> = ["a1".to_string()].into();

        let out = rec
            .recommend_personalized(
                &history,
                Some(5),
                catalog(),
                &exclude,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(out.recommendations.len(), 1);
        assert_eq!(out.recommendations[0].course_id, "c3");
    }

    #[tokio::test]
    async fn personalized_keyword_last_resort_skips_excluded_courses() {
        let rec = recommender(
            vec![ProviderSlot::available(
                ProviderKind::OpenAi,
                Arc::new(MockAdapter::failing(ProviderKind::OpenAi)),
            )],
            10,
        );

        // No catalog course shares this category, so the keyword ranker
        // answers; it must still honor the exclusion set.
        let history = vec![EnrollmentRecord {
            category: "Music".to_string(),
            level: Level::Beginner,
        }];
        let exclude: HashSet<String> = ["a1".to_string()].into();

        let out = rec
            .recommend_personalized(
                &history,
                Some(5),
                catalog(),
                &exclude,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(out.provider_used, "keyword");
        assert!(!out.recommendations.is_empty());
        assert!(out.recommendations.iter().all(|r| r.course_id != "a1"));
    }

    #[tokio::test]
    async fn personalized_with_everything_excluded_serves_nothing_and_counts_nothing() {
        let budget = Arc::new(MemoryBudgetStore::new());
        let rec = Recommender::new(
            vec![ProviderSlot::available(
                ProviderKind::OpenAi,
                Arc::new(MockAdapter::failing(ProviderKind::OpenAi)),
            )],
            budget.clone(),
            10,
        );

        let history = vec![EnrollmentRecord {
            category: "Music".to_string(),
            level: Level::Beginner,
        }];
        let exclude: HashSet<String> =
            ["a1".to_string(), "b2".to_string(), "c3".to_string()].into();

        let out = rec
            .recommend_personalized(
                &history,
                Some(5),
                catalog(),
                &exclude,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(out.recommendations.is_empty());
        assert_eq!(budget.snapshot().await.unwrap().total, 0);
    }
}
