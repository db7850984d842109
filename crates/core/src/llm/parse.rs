use crate::domain::recommendation::RecommendationCandidate;
use crate::llm::error::ParseError;
use serde_json::Value;

/// Course ids are fixed-length lowercase-hex tokens (Mongo-style object ids).
const ID_HEX_LEN: usize = 24;

const SCANNED_ID_REASON: &str = "Suggested by the recommendation model";

/// Extracts a candidate list from unstructured provider output. Shared by
/// every adapter; there are no provider-specific parsing branches.
///
/// Order of attempts: fence stripping, greedy bracket extraction, the
/// `recommendations` field unwrap, then a raw scan for id-shaped tokens.
pub fn parse_candidates(
    raw: &str,
    max_results: usize,
) -> Result<Vec<RecommendationCandidate>, ParseError> {
    let stripped = strip_fences(raw);

    let mut candidates = extract_json(stripped)
        .and_then(|json| serde_json::from_str::<Value>(&json).ok())
        .map(candidates_from_value)
        .unwrap_or_default();

    if candidates.is_empty() {
        candidates = scan_for_ids(raw);
    }

    if candidates.is_empty() {
        return Err(ParseError::new(format!(
            "no JSON structure or id-shaped tokens in {} chars of output",
            raw.len()
        )));
    }

    candidates.truncate(max_results);
    Ok(candidates)
}

/// Removes Markdown code fences (```json ... ``` or ``` ... ```).
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the fence line (which may carry a language tag), then the
    // closing fence.
    let mut inner = rest;
    if let Some((_, after_first_line)) = inner.split_once('\n') {
        inner = after_first_line;
    }
    if let Some(end) = inner.rfind("```") {
        inner = &inner[..end];
    }
    inner.trim()
}

/// Best-effort extraction of the first balanced-looking JSON object or
/// array: from the earliest opening bracket to the matching last closer.
fn extract_json(text: &str) -> Option<String> {
    let obj_start = text.find('{');
    let arr_start = text.find('[');

    let (start, close) = match (obj_start, arr_start) {
        (Some(o), Some(a)) if a < o => (a, ']'),
        (Some(o), _) => (o, '}'),
        (None, Some(a)) => (a, ']'),
        (None, None) => return None,
    };

    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(text[start..=end].trim().to_string())
}

/// A bare array is the candidate list itself; an object contributes its
/// `recommendations` array; anything else yields nothing.
fn candidates_from_value(value: Value) -> Vec<RecommendationCandidate> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("recommendations") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RecommendationCandidate>(item).ok())
        .filter(|cand| !cand.course_id.trim().is_empty())
        .collect()
}

/// Last resort: scan the raw text for id-shaped hex runs and synthesize a
/// generic candidate per distinct id, in order of first appearance.
fn scan_for_ids(text: &str) -> Vec<RecommendationCandidate> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_hexdigit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_hexdigit() {
            i += 1;
        }
        let run = &text[start..i];
        if run.len() == ID_HEX_LEN && seen.insert(run) {
            out.push(RecommendationCandidate {
                course_id: run.to_string(),
                reason: SCANNED_ID_REASON.to_string(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(candidates: &[RecommendationCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.course_id.as_str()).collect()
    }

    #[test]
    fn parses_object_with_recommendations_field() {
        let raw = r#"{"recommendations":[{"courseId":"64a1f2e9c3d4b5a6f7e8d9c0","reason":"fits"}],"summary":"one match"}"#;
        let parsed = parse_candidates(raw, 5).unwrap();
        assert_eq!(ids(&parsed), vec!["64a1f2e9c3d4b5a6f7e8d9c0"]);
        assert_eq!(parsed[0].reason, "fits");
    }

    #[test]
    fn parses_bare_array() {
        let raw = r#"[{"courseId":"a","reason":"x"},{"courseId":"b","reason":"y"}]"#;
        let parsed = parse_candidates(raw, 5).unwrap();
        assert_eq!(ids(&parsed), vec!["a", "b"]);
    }

    #[test]
    fn tolerates_fences_and_surrounding_prose() {
        let raw = "Here you go!\n```json\n{\"recommendations\":[{\"courseId\":\"c1\",\"reason\":\"r\"}]}\n```\nHope that helps.";
        let parsed = parse_candidates(raw, 5).unwrap();
        assert_eq!(ids(&parsed), vec!["c1"]);
    }

    #[test]
    fn round_trips_serialized_candidates() {
        let original = vec![
            RecommendationCandidate {
                course_id: "aaaabbbbccccddddeeeeffff".to_string(),
                reason: "strong match".to_string(),
            },
            RecommendationCandidate {
                course_id: "111122223333444455556666".to_string(),
                reason: "related".to_string(),
            },
        ];
        let raw = serde_json::to_string(&original).unwrap();
        let parsed = parse_candidates(&raw, 5).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn falls_back_to_id_scan_with_dedup() {
        let raw = "I recommend 64a1f2e9c3d4b5a6f7e8d9c0 and also \
                   64a1f2e9c3d4b5a6f7e8d9c0, then 0123456789abcdef01234567.";
        let parsed = parse_candidates(raw, 5).unwrap();
        assert_eq!(
            ids(&parsed),
            vec!["64a1f2e9c3d4b5a6f7e8d9c0", "0123456789abcdef01234567"]
        );
        assert_eq!(parsed[0].reason, SCANNED_ID_REASON);
    }

    #[test]
    fn id_scan_ignores_wrong_length_runs() {
        let raw = "ids: deadbeef and 0123456789abcdef0123456789abcdef";
        assert!(parse_candidates(raw, 5).is_err());
    }

    #[test]
    fn truncates_to_max_results() {
        let raw = r#"[{"courseId":"a"},{"courseId":"b"},{"courseId":"c"}]"#;
        let parsed = parse_candidates(raw, 2).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn errors_on_empty_output() {
        assert!(parse_candidates("", 5).is_err());
        assert!(parse_candidates("Sorry, I cannot help with that.", 5).is_err());
    }

    #[test]
    fn object_without_recommendations_falls_through_to_scan() {
        let raw = r#"{"answer":"try course 64a1f2e9c3d4b5a6f7e8d9c0"}"#;
        let parsed = parse_candidates(raw, 5).unwrap();
        assert_eq!(ids(&parsed), vec!["64a1f2e9c3d4b5a6f7e8d9c0"]);
    }
}
