use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Seniority ladder. `Unknown` sits outside the ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Seniority {
    Intern,
    Entry,
    Mid,
    Senior,
    Lead,
    Manager,
    Director,
    Executive,
    #[default]
    Unknown,
}

impl Seniority {
    pub const LADDER: [Seniority; 8] = [
        Seniority::Intern,
        Seniority::Entry,
        Seniority::Mid,
        Seniority::Senior,
        Seniority::Lead,
        Seniority::Manager,
        Seniority::Director,
        Seniority::Executive,
    ];

    /// Position on the ladder (Intern = 0). `None` for `Unknown`.
    pub fn ordinal(self) -> Option<u8> {
        Self::LADDER
            .iter()
            .position(|level| *level == self)
            .map(|idx| idx as u8)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Seniority::Intern => "Intern",
            Seniority::Entry => "Entry",
            Seniority::Mid => "Mid",
            Seniority::Senior => "Senior",
            Seniority::Lead => "Lead",
            Seniority::Manager => "Manager",
            Seniority::Director => "Director",
            Seniority::Executive => "Executive",
            Seniority::Unknown => "Unknown",
        }
    }

    /// Recognises the enum names case-insensitively plus the synonyms resumes
    /// and job boards commonly use. Returns `None` for anything else.
    pub fn parse(label: &str) -> Option<Seniority> {
        let normalized = label.trim().to_lowercase().replace(['_', '-'], " ");
        let level = match normalized.as_str() {
            "intern" | "internship" | "trainee" => Seniority::Intern,
            "entry" | "entry level" | "junior" | "jr" | "graduate" | "associate" => {
                Seniority::Entry
            }
            "mid" | "mid level" | "middle" | "intermediate" => Seniority::Mid,
            "senior" | "sr" => Seniority::Senior,
            "lead" | "tech lead" | "team lead" | "staff" | "principal" => Seniority::Lead,
            "manager" | "engineering manager" => Seniority::Manager,
            "director" | "head" => Seniority::Director,
            "executive" | "vp" | "vice president" | "c level" | "cto" | "ceo" | "cio" => {
                Seniority::Executive
            }
            "unknown" => Seniority::Unknown,
            _ => return None,
        };
        Some(level)
    }

    /// Like [`Seniority::parse`] but coerces unrecognised labels to `Unknown`.
    pub fn coerce(label: &str) -> Seniority {
        Self::parse(label).unwrap_or(Seniority::Unknown)
    }
}

/// Unrecognised labels, `null` and non-string values all become `Unknown`.
impl<'de> Deserialize<'de> for Seniority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(label)) => Seniority::coerce(&label),
            _ => Seniority::Unknown,
        })
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Structured candidate profile produced by the intake pipeline.
///
/// Invariants (enforced by `intake::validation`, not by the type):
/// - `skills` holds no case-insensitive duplicates and keeps first-seen casing
/// - `0.0 <= confidence <= 1.0`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub experience_summary: String,
    pub education: Vec<EducationEntry>,
    pub seniority_level: Seniority,
    pub job_interests: Vec<String>,
    pub raw_text: String,
    pub confidence: f64,
}

impl CandidateProfile {
    /// Profile carrying only mechanically-extractable fields.
    pub fn local(raw_text: &str, email: Option<String>, phone: Option<String>) -> Self {
        Self {
            email,
            phone,
            raw_text: raw_text.to_string(),
            ..Default::default()
        }
    }

    /// Text the semantic side of ranking is computed from.
    pub fn semantic_text(&self) -> String {
        match (self.experience_summary.trim(), self.raw_text.trim()) {
            ("", raw) => raw.to_string(),
            (summary, "") => summary.to_string(),
            (summary, raw) => format!("{summary}\n{raw}"),
        }
    }
}

/// Trims, drops empties, and removes case-insensitive duplicates while
/// keeping the first-seen spelling and order.
pub fn dedup_case_insensitive<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let trimmed = item.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seniority_ladder_is_totally_ordered() {
        let ordinals: Vec<u8> = Seniority::LADDER
            .iter()
            .filter_map(|s| s.ordinal())
            .collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(Seniority::Unknown.ordinal(), None);
    }

    #[test]
    fn test_seniority_parse_accepts_synonyms() {
        assert_eq!(Seniority::parse("senior"), Some(Seniority::Senior));
        assert_eq!(Seniority::parse("Junior"), Some(Seniority::Entry));
        assert_eq!(Seniority::parse("mid-level"), Some(Seniority::Mid));
        assert_eq!(Seniority::parse("Principal"), Some(Seniority::Lead));
        assert_eq!(Seniority::parse("VP"), Some(Seniority::Executive));
        assert_eq!(Seniority::parse("wizard"), None);
    }

    #[test]
    fn test_seniority_deserializes_leniently() {
        let level: Seniority = serde_json::from_str(r#""senior""#).unwrap();
        assert_eq!(level, Seniority::Senior);
        let level: Seniority = serde_json::from_str(r#""Grandmaster""#).unwrap();
        assert_eq!(level, Seniority::Unknown);
        for raw in ["null", "3", "true", r#"{"level": "Senior"}"#, r#"["Senior"]"#] {
            let level: Seniority = serde_json::from_str(raw).unwrap();
            assert_eq!(level, Seniority::Unknown, "{raw}");
        }
    }

    #[test]
    fn test_seniority_serializes_as_name() {
        assert_eq!(serde_json::to_string(&Seniority::Mid).unwrap(), r#""Mid""#);
    }

    #[test]
    fn test_dedup_keeps_first_seen_casing() {
        let skills = dedup_case_insensitive(["Python", "SQL", "python", " sql ", ""]);
        assert_eq!(skills, vec!["Python".to_string(), "SQL".to_string()]);
    }

    #[test]
    fn test_semantic_text_joins_summary_and_raw() {
        let profile = CandidateProfile {
            experience_summary: "Backend engineer".to_string(),
            raw_text: "Rust, Postgres".to_string(),
            ..Default::default()
        };
        assert_eq!(profile.semantic_text(), "Backend engineer\nRust, Postgres");
        assert_eq!(CandidateProfile::default().semantic_text(), "");
    }
}
