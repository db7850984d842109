use serde::{Deserialize, Serialize};

/// Read-only projection of a course, snapshotted at request time for
/// recommendation purposes. The marketplace backend owns the full record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default = "default_instructor")]
    pub instructor_name: String,
}

fn default_instructor() -> String {
    "Unknown Instructor".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    /// Lenient parse for values coming from external storage. Unknown
    /// strings map to Beginner rather than failing the whole catalog read.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "intermediate" => Level::Intermediate,
            "advanced" => Level::Advanced,
            _ => Level::Beginner,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn instructor_defaults_when_absent() {
        let v = json!({
            "id": "64a1f2e9c3d4b5a6f7e8d9c0",
            "title": "Intro to Python",
            "description": "Learn python basics",
            "category": "Programming",
            "level": "beginner",
        });
        let course: CourseSummary = serde_json::from_value(v).unwrap();
        assert_eq!(course.instructor_name, "Unknown Instructor");
        assert!(course.duration.is_none());
    }

    #[test]
    fn level_parse_is_lenient() {
        assert_eq!(Level::parse_lenient("Advanced"), Level::Advanced);
        assert_eq!(Level::parse_lenient("  intermediate "), Level::Intermediate);
        assert_eq!(Level::parse_lenient("expert"), Level::Beginner);
    }
}
