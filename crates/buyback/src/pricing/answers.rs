use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One questionnaire answer as submitted by the seller.
///
/// Serialized untagged so the wire shape mirrors the questionnaire form:
/// `true`, `"refurbished"`, or `["crack", "dent"]`. Any other shape (`null`,
/// numbers, mixed lists) is kept as `Other` and never matches a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Text(String),
    Tags(Vec<String>),
    Other(serde_json::Value),
}

impl AnswerValue {
    /// Whether a rule keyed on `answer_key` applies to this answer.
    ///
    /// Booleans compare by their `"true"`/`"false"` spelling and tag lists by
    /// membership. Free-text answers never participate in rule matching.
    pub fn matches(&self, answer_key: &str) -> bool {
        match self {
            AnswerValue::Bool(value) => value.to_string() == answer_key,
            AnswerValue::Tags(tags) => tags.iter().any(|tag| tag == answer_key),
            AnswerValue::Text(_) | AnswerValue::Other(_) => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnswerValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_tags(&self) -> Option<&[String]> {
        match self {
            AnswerValue::Tags(tags) => Some(tags),
            _ => None,
        }
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for AnswerValue {
    fn from(tags: [&str; N]) -> Self {
        Self::Tags(tags.iter().map(|tag| tag.to_string()).collect())
    }
}

/// Questionnaire answers keyed by question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteAnswers(BTreeMap<String, AnswerValue>);

impl QuoteAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AnswerValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.0.get(key)
    }

    /// Boolean answer for `key`; `None` when absent or not a yes/no answer.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AnswerValue::as_bool)
    }

    /// Tags selected for `key`; empty when absent or not a multi-select answer.
    pub fn tags(&self, key: &str) -> &[String] {
        self.get(key).and_then(AnswerValue::as_tags).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for QuoteAnswers
where
    K: Into<String>,
    V: Into<AnswerValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerParseError {
    #[error("answer '{0}' must look like key=value")]
    MissingSeparator(String),
    #[error("answer '{0}' has an empty question key")]
    EmptyKey(String),
}

/// Parse a `key=value` answer from the command line.
///
/// `true`/`false` become booleans, `[a,b]` becomes a tag list (`[]` is an
/// empty list), and anything else is kept as free text.
pub fn parse_answer_pair(raw: &str) -> Result<(String, AnswerValue), AnswerParseError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| AnswerParseError::MissingSeparator(raw.to_string()))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(AnswerParseError::EmptyKey(raw.to_string()));
    }

    let value = value.trim();
    let answer = match value {
        "true" => AnswerValue::Bool(true),
        "false" => AnswerValue::Bool(false),
        _ => match value
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            Some(inner) => AnswerValue::Tags(
                inner
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            None => AnswerValue::Text(value.to_string()),
        },
    };

    Ok((key.to_string(), answer))
}
