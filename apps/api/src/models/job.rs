use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A job posting extracted from a careers page. Lives for one submission only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: String,
    /// Free text such as "3-5 years" or "Senior".
    #[serde(default, deserialize_with = "lenient_string")]
    pub experience: String,
    #[serde(default, deserialize_with = "lenient_skills")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
}

impl JobRecord {
    pub fn skills_query(&self) -> SkillsQuery {
        SkillsQuery::List(self.skills.clone())
    }
}

/// Skills to match against the portfolio: one free-text string or a list of skills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillsQuery {
    Text(String),
    List(Vec<String>),
}

impl SkillsQuery {
    /// The trimmed text to search with, or `None` when there is nothing to search for.
    pub fn query_text(&self) -> Option<String> {
        let text = match self {
            SkillsQuery::Text(text) => text.trim().to_string(),
            SkillsQuery::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };
        (!text.is_empty()).then_some(text)
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_to_text(&Value::deserialize(deserializer)?))
}

fn lenient_skills<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let skills = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().map(value_to_text).collect(),
        other => vec![value_to_text(&other)],
    };
    Ok(skills.into_iter().filter(|s| !s.trim().is_empty()).collect())
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}
