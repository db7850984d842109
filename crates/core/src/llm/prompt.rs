use crate::domain::course::CourseSummary;
use serde::Serialize;

/// Catalog entry as serialized into the provider instruction payload.
#[derive(Debug, Clone, Serialize)]
struct CourseContext<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    category: &'a str,
    level: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<&'a str>,
    instructor: &'a str,
}

fn catalog_context(catalog: &[CourseSummary]) -> serde_json::Value {
    let entries: Vec<CourseContext<'_>> = catalog
        .iter()
        .map(|c| CourseContext {
            id: &c.id,
            title: &c.title,
            description: &c.description,
            category: &c.category,
            level: c.level.as_str(),
            duration: c.duration.as_deref(),
            instructor: &c.instructor_name,
        })
        .collect();
    serde_json::to_value(entries).unwrap_or_else(|_| serde_json::Value::Array(vec![]))
}

/// Builds the single standardized instruction payload shared by every
/// provider adapter. Each adapter wraps this in its own request envelope.
pub fn build_instruction(prompt: &str, catalog: &[CourseSummary], max_results: usize) -> String {
    let catalog_json = serde_json::to_string_pretty(&catalog_context(catalog))
        .unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are a course recommendation assistant for an online learning platform.\n\
         \n\
         Available courses:\n\
         {catalog_json}\n\
         \n\
         User query: \"{prompt}\"\n\
         \n\
         Recommend the most relevant courses from the available list, considering \
         category, level, description, and how well each course matches the query.\n\
         \n\
         Return ONLY JSON, either an object of this shape:\n\
         {{\"recommendations\": [{{\"courseId\": \"<id>\", \"reason\": \"<short explanation>\"}}], \"summary\": \"<one sentence>\"}}\n\
         or a bare JSON array of the same recommendation objects.\n\
         No markdown, no prose outside the JSON.\n\
         \n\
         Recommend at most {max_results} courses. Only use courseId values that \
         exist in the available courses list."
    )
}

/// Synthesizes the free-text prompt for the personalized variant from a
/// learner's enrollment history.
pub fn personalized_prompt(history: &[crate::domain::recommendation::EnrollmentRecord]) -> String {
    if history.is_empty() {
        return "The learner has no enrollments yet. Suggest broadly useful starter courses."
            .to_string();
    }
    let enrolled = serde_json::to_string(history).unwrap_or_else(|_| "[]".to_string());
    format!(
        "A learner has already enrolled in courses with these categories and levels: \
         {enrolled}. Suggest complementary courses that extend their learning path."
    )
}
