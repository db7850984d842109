use crate::domain::course::CourseSummary;
use crate::domain::recommendation::RecommendationCandidate;
use rand::seq::index::sample;

const TOPIC_MATCH_WEIGHT: i32 = 10;
const WORD_MATCH_WEIGHT: i32 = 3;
const TITLE_MATCH_WEIGHT: i32 = 15;
const CATEGORY_MATCH_WEIGHT: i32 = 12;

const HIGH_SCORE: i32 = 25;
const MID_SCORE: i32 = 10;

/// Topical categories with their keyword synonyms. A topic counts when the
/// prompt and the course text each contain at least one synonym (not
/// necessarily the same one).
const TOPIC_SYNONYMS: [(&str, &[&str]); 8] = [
    (
        "programming",
        &[
            "programming",
            "code",
            "coding",
            "developer",
            "software",
            "python",
            "javascript",
            "java",
            "rust",
        ],
    ),
    (
        "web",
        &[
            "web", "website", "html", "css", "frontend", "backend", "react", "node",
        ],
    ),
    (
        "data",
        &[
            "data",
            "science",
            "analysis",
            "analytics",
            "statistics",
            "sql",
        ],
    ),
    (
        "ai",
        &[
            "ai",
            "machine",
            "learning",
            "neural",
            "intelligence",
            "model",
        ],
    ),
    ("design", &["design", "ux", "ui", "graphic", "figma"]),
    (
        "business",
        &[
            "business",
            "marketing",
            "finance",
            "management",
            "entrepreneur",
        ],
    ),
    (
        "beginner",
        &[
            "beginner",
            "basic",
            "basics",
            "intro",
            "introduction",
            "fundamentals",
        ],
    ),
    ("advanced", &["advanced", "expert", "deep", "mastery"]),
];

/// Scores every course against the prompt with weighted keyword matching.
/// Never fails; returns an empty list only for an empty catalog. When no
/// course scores, a randomized diverse sample is returned instead of always
/// surfacing the same leading catalog entries.
pub fn rank(prompt: &str, catalog: &[CourseSummary], max_results: usize) -> Vec<RecommendationCandidate> {
    if catalog.is_empty() {
        return Vec::new();
    }

    let prompt_lower = prompt.to_lowercase();
    let mut scored: Vec<(usize, i32)> = catalog
        .iter()
        .enumerate()
        .map(|(idx, course)| (idx, score_course(&prompt_lower, course)))
        .collect();

    if scored.iter().all(|(_, score)| *score == 0) {
        return diversity_sample(catalog, max_results);
    }

    // Stable sort keeps catalog order on ties.
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
        .into_iter()
        .take(max_results)
        .map(|(idx, score)| RecommendationCandidate {
            course_id: catalog[idx].id.clone(),
            reason: tiered_reason(score, prompt),
        })
        .collect()
}

fn score_course(prompt_lower: &str, course: &CourseSummary) -> i32 {
    let course_text = format!(
        "{} {} {}",
        course.title, course.description, course.category
    )
    .to_lowercase();

    let mut score = 0;

    for (_, synonyms) in TOPIC_SYNONYMS {
        let in_prompt = synonyms.iter().any(|kw| prompt_lower.contains(kw));
        let in_course = synonyms.iter().any(|kw| course_text.contains(kw));
        if in_prompt && in_course {
            score += TOPIC_MATCH_WEIGHT;
        }
    }

    for word in prompt_lower.split_whitespace() {
        if word.len() > 3 && course_text.contains(word) {
            score += WORD_MATCH_WEIGHT;
        }
    }

    if prompt_lower.contains(&course.title.to_lowercase()) {
        score += TITLE_MATCH_WEIGHT;
    }
    if prompt_lower.contains(&course.category.to_lowercase()) {
        score += CATEGORY_MATCH_WEIGHT;
    }

    score
}

fn tiered_reason(score: i32, prompt: &str) -> String {
    if score >= HIGH_SCORE {
        format!("Highly relevant to \"{prompt}\"")
    } else if score >= MID_SCORE {
        format!("Matches your interest in \"{prompt}\"")
    } else {
        format!("Related to your search for \"{prompt}\"")
    }
}

/// Random sample without replacement, in sampled order.
fn diversity_sample(catalog: &[CourseSummary], max_results: usize) -> Vec<RecommendationCandidate> {
    let take = max_results.min(catalog.len());
    let mut rng = rand::thread_rng();
    sample(&mut rng, catalog.len(), take)
        .into_iter()
        .map(|idx| RecommendationCandidate {
            course_id: catalog[idx].id.clone(),
            reason: "Available course that might interest you".to_string(),
        })
        .collect()
}

/// Final fallback for the personalized variant: courses sharing a category
/// with the learner's history, skipping ones they already enrolled in.
pub fn rank_same_category(
    categories: &std::collections::BTreeSet<String>,
    catalog: &[CourseSummary],
    exclude_ids: &std::collections::HashSet<String>,
    max_results: usize,
) -> Vec<RecommendationCandidate> {
    catalog
        .iter()
        .filter(|course| !exclude_ids.contains(&course.id))
        .filter(|course| {
            categories
                .iter()
                .any(|cat| cat.eq_ignore_ascii_case(&course.category))
        })
        .take(max_results)
        .map(|course| RecommendationCandidate {
            course_id: course.id.clone(),
            reason: format!("Similar to your interests in {}", course.category),
        })
        .collect()
}
