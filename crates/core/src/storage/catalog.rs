use crate::domain::course::{CourseSummary, Level};
use anyhow::Context;

type CourseRow = (
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
);

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, category, level, duration, instructor_name FROM courses";

/// Read-only catalog projection. Published courses are preferred; when none
/// are published yet the whole table is used, matching the marketplace
/// backend's behavior for fresh deployments.
pub async fn load_catalog(pool: &sqlx::PgPool) -> anyhow::Result<Vec<CourseSummary>> {
    let published = sqlx::query_as::<_, CourseRow>(&format!(
        "{SELECT_COLUMNS} WHERE is_published ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await
    .context("failed to load published courses")?;

    let rows = if published.is_empty() {
        sqlx::query_as::<_, CourseRow>(&format!("{SELECT_COLUMNS} ORDER BY created_at ASC"))
            .fetch_all(pool)
            .await
            .context("failed to load courses")?
    } else {
        published
    };

    Ok(rows.into_iter().map(summary_from_row).collect())
}

fn summary_from_row(row: CourseRow) -> CourseSummary {
    let (id, title, description, category, level, duration, instructor_name) = row;
    CourseSummary {
        id,
        title,
        description,
        category,
        level: Level::parse_lenient(&level),
        duration,
        instructor_name: instructor_name.unwrap_or_else(|| "Unknown Instructor".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_mapping_applies_defaults() {
        let course = summary_from_row((
            "64a1f2e9c3d4b5a6f7e8d9c0".to_string(),
            "Intro to Python".to_string(),
            "Learn python basics".to_string(),
            "Programming".to_string(),
            "Expert".to_string(),
            None,
            None,
        ));
        assert_eq!(course.level, Level::Beginner);
        assert_eq!(course.instructor_name, "Unknown Instructor");
    }
}
