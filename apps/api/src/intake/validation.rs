//! Oracle payload coercion and profile auto-correction.
//!
//! Policy: never reject something that is structurally an object. Unknown keys
//! are dropped, missing keys defaulted, and out-of-range values corrected. The
//! only hard failure is a payload that cannot be read as an object at all.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::llm_client::strip_json_fences;
use crate::models::profile::dedup_case_insensitive;
use crate::models::{CandidateProfile, EducationEntry, Seniority};

const PROFILE_FIELDS: &[&str] = &[
    "name",
    "email",
    "phone",
    "skills",
    "experience_summary",
    "education",
    "seniority_level",
    "job_interests",
    "raw_text",
    "confidence",
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(String),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// A profile plus the corrections applied while validating it.
#[derive(Debug, Clone)]
pub struct ValidatedProfile {
    pub profile: CandidateProfile,
    pub corrections: Vec<String>,
}

/// Reads oracle output as a JSON object, tolerating markdown fences, prose
/// around the object, a JSON-encoded string, or a one-element array.
pub fn parse_payload(text: &str) -> Result<Map<String, Value>, ValidationError> {
    let body = strip_json_fences(text);

    match serde_json::from_str::<Value>(body) {
        Ok(value) => coerce_object(value),
        Err(parse_err) => {
            let start = body.find('{');
            let end = body.rfind('}');
            match (start, end) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str::<Value>(&body[start..=end])
                        .map_err(|e| ValidationError::Malformed(e.to_string()))
                        .and_then(coerce_object)
                }
                _ => Err(ValidationError::Malformed(parse_err.to_string())),
            }
        }
    }
}

pub fn coerce_object(value: Value) -> Result<Map<String, Value>, ValidationError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::String(inner) => match serde_json::from_str::<Value>(inner.trim()) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(ValidationError::NotAnObject("string")),
        },
        Value::Array(mut items) if items.len() == 1 && items[0].is_object() => {
            match items.pop() {
                Some(Value::Object(map)) => Ok(map),
                _ => Err(ValidationError::NotAnObject("array")),
            }
        }
        other => Err(ValidationError::NotAnObject(json_kind(&other))),
    }
}

/// Builds a schema-conformant profile from an arbitrary object.
pub fn validate_profile(payload: &Map<String, Value>) -> ValidatedProfile {
    let mut corrections = Vec::new();

    let unknown: Vec<&str> = payload
        .keys()
        .map(String::as_str)
        .filter(|k| !PROFILE_FIELDS.contains(k))
        .collect();
    if !unknown.is_empty() {
        corrections.push(format!("dropped unknown fields: {}", unknown.join(", ")));
    }

    let raw_skills = string_list(payload.get("skills"));
    let skills = dedup_case_insensitive(&raw_skills);
    if skills.len() < raw_skills.iter().filter(|s| !s.trim().is_empty()).count() {
        corrections.push("removed duplicate skills".to_string());
    }

    let seniority_level = match payload.get("seniority_level") {
        Some(Value::String(label)) => {
            let level = Seniority::coerce(label);
            if level == Seniority::Unknown && !label.trim().eq_ignore_ascii_case("unknown") {
                corrections.push(format!("seniority '{label}' coerced to Unknown"));
            }
            level
        }
        _ => Seniority::Unknown,
    };

    let confidence = match payload.get("confidence").and_then(number) {
        Some(c) if c.is_finite() => {
            let clamped = c.clamp(0.0, 1.0);
            if clamped != c {
                corrections.push(format!("confidence {c} clamped to {clamped}"));
            }
            clamped
        }
        _ => 0.0,
    };

    let profile = CandidateProfile {
        name: opt_string(payload.get("name")),
        email: opt_string(payload.get("email")),
        phone: opt_string(payload.get("phone")),
        skills,
        experience_summary: opt_string(payload.get("experience_summary")).unwrap_or_default(),
        education: education(payload.get("education")),
        seniority_level,
        job_interests: dedup_case_insensitive(string_list(payload.get("job_interests"))),
        raw_text: match payload.get("raw_text") {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        },
        confidence,
    };

    ValidatedProfile {
        profile,
        corrections,
    }
}

fn opt_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| opt_string(Some(item)))
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

fn education(value: Option<&Value>) -> Vec<EducationEntry> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| EducationEntry {
            degree: opt_string(entry.get("degree")),
            institution: opt_string(entry.get("institution")),
            start_date: opt_string(entry.get("start_date")),
            end_date: opt_string(entry.get("end_date")),
        })
        .collect()
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(value: Value) -> ValidatedProfile {
        validate_profile(value.as_object().unwrap())
    }

    #[test]
    fn test_complete_profile_passes_through() {
        let v = validate(json!({
            "name": "John Doe",
            "email": "john@example.com",
            "phone": "+1234567890",
            "skills": ["Python", "JavaScript"],
            "experience_summary": "5 years of software development",
            "education": [{"degree": "BS Computer Science", "institution": "MIT", "start_date": "2015", "end_date": "2019"}],
            "seniority_level": "Senior",
            "job_interests": ["Backend Developer", "ML Engineer"],
            "raw_text": "Sample resume text",
            "confidence": 0.85
        }));
        assert_eq!(v.profile.name.as_deref(), Some("John Doe"));
        assert_eq!(v.profile.seniority_level, Seniority::Senior);
        assert_eq!(v.profile.education[0].institution.as_deref(), Some("MIT"));
        assert!((v.profile.confidence - 0.85).abs() < f64::EPSILON);
        assert!(v.corrections.is_empty());
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let v = validate(json!({"name": "Jane Doe", "skills": ["React", "Node.js"]}));
        assert_eq!(v.profile.seniority_level, Seniority::Unknown);
        assert_eq!(v.profile.confidence, 0.0);
        assert!(v.profile.education.is_empty());
        assert_eq!(v.profile.experience_summary, "");
        assert!(v.profile.email.is_none());
    }

    #[test]
    fn test_empty_object_serializes_every_field() {
        let v = validate(json!({}));
        let out = serde_json::to_value(&v.profile).unwrap();
        for field in PROFILE_FIELDS {
            assert!(out.get(*field).is_some(), "missing {field}");
        }
    }

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(validate(json!({"confidence": 1.5})).profile.confidence, 1.0);
        assert_eq!(validate(json!({"confidence": -0.5})).profile.confidence, 0.0);
        assert_eq!(validate(json!({"confidence": "0.4"})).profile.confidence, 0.4);
        assert_eq!(validate(json!({"confidence": "high"})).profile.confidence, 0.0);
    }

    #[test]
    fn test_every_enum_level_preserved() {
        for level in Seniority::LADDER.iter().chain([Seniority::Unknown].iter()) {
            let v = validate(json!({"seniority_level": level.as_str()}));
            assert_eq!(v.profile.seniority_level, *level);
        }
    }

    #[test]
    fn test_unrecognised_seniority_coerced() {
        let v = validate(json!({"seniority_level": "Grand Wizard"}));
        assert_eq!(v.profile.seniority_level, Seniority::Unknown);
        assert!(v.corrections.iter().any(|c| c.contains("Grand Wizard")));
        let v = validate(json!({"seniority_level": 7}));
        assert_eq!(v.profile.seniority_level, Seniority::Unknown);
    }

    #[test]
    fn test_skills_deduplicated_case_insensitively() {
        let v = validate(json!({"skills": ["Python", "python", "SQL", "PYTHON", "sql"]}));
        assert_eq!(v.profile.skills, vec!["Python", "SQL"]);
        assert!(v.corrections.iter().any(|c| c.contains("duplicate")));
    }

    #[test]
    fn test_comma_separated_skills_split() {
        let v = validate(json!({"skills": "Rust, Go ,  , Kafka"}));
        assert_eq!(v.profile.skills, vec!["Rust", "Go", "Kafka"]);
    }

    #[test]
    fn test_unknown_fields_dropped() {
        let v = validate(json!({"name": "A", "favourite_colour": "blue"}));
        assert!(v.corrections[0].contains("favourite_colour"));
        let out = serde_json::to_value(&v.profile).unwrap();
        assert!(out.get("favourite_colour").is_none());
    }

    #[test]
    fn test_education_tolerates_numbers_and_junk() {
        let v = validate(json!({"education": [
            {"degree": "MSc", "start_date": 2015, "end_date": 2017},
            "not an object"
        ]}));
        assert_eq!(v.profile.education.len(), 1);
        assert_eq!(v.profile.education[0].start_date.as_deref(), Some("2015"));
    }

    #[test]
    fn test_parse_payload_plain_and_fenced() {
        assert!(parse_payload(r#"{"name": "A"}"#).is_ok());
        assert!(parse_payload("```json\n{\"name\": \"A\"}\n```").is_ok());
    }

    #[test]
    fn test_parse_payload_with_surrounding_prose() {
        let map = parse_payload("Here is the profile: {\"name\": \"A\"} hope it helps").unwrap();
        assert_eq!(map.get("name"), Some(&json!("A")));
    }

    #[test]
    fn test_parse_payload_unwraps_string_and_singleton_array() {
        assert!(parse_payload(r#""{\"name\": \"A\"}""#).is_ok());
        assert!(parse_payload(r#"[{"name": "A"}]"#).is_ok());
    }

    #[test]
    fn test_parse_payload_non_object_shapes() {
        assert_eq!(
            parse_payload("42"),
            Err(ValidationError::NotAnObject("number"))
        );
        assert_eq!(
            parse_payload(r#"["a", "b"]"#),
            Err(ValidationError::NotAnObject("array"))
        );
        assert_eq!(
            parse_payload(r#""just words""#),
            Err(ValidationError::NotAnObject("string"))
        );
    }

    #[test]
    fn test_parse_payload_malformed() {
        assert!(matches!(
            parse_payload("{name: broken"),
            Err(ValidationError::Malformed(_))
        ));
        assert!(matches!(
            parse_payload("no json here"),
            Err(ValidationError::Malformed(_))
        ));
    }
}
