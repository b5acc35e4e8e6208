use std::fmt;

use serde::{Deserialize, Serialize};

use super::answers::QuoteAnswers;

/// Product category used to select a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ProductCategory(String);

impl ProductCategory {
    pub const SMARTPHONE: &'static str = "smartphone";

    pub fn new(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProductCategory {
    fn default() -> Self {
        Self(Self::SMARTPHONE.to_string())
    }
}

impl From<String> for ProductCategory {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ProductCategory {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<ProductCategory> for String {
    fn from(value: ProductCategory) -> Self {
        value.0
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configured deduction for one questionnaire answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRule {
    pub question_key: String,
    pub answer_key: String,
    #[serde(default)]
    pub deduction_amount: f64,
    #[serde(default)]
    pub deduction_percent: f64,
}

impl EvaluationRule {
    pub fn flat(question_key: &str, answer_key: &str, amount: f64) -> Self {
        Self {
            question_key: question_key.to_string(),
            answer_key: answer_key.to_string(),
            deduction_amount: amount,
            deduction_percent: 0.0,
        }
    }

    pub fn percent(question_key: &str, answer_key: &str, percent: f64) -> Self {
        Self {
            question_key: question_key.to_string(),
            answer_key: answer_key.to_string(),
            deduction_amount: 0.0,
            deduction_percent: percent,
        }
    }

    /// A rule fires once per quote at most, however many tags equal its answer key.
    pub fn fires(&self, answers: &QuoteAnswers) -> bool {
        answers
            .get(&self.question_key)
            .map(|answer| answer.matches(&self.answer_key))
            .unwrap_or(false)
    }

    pub fn label(&self) -> String {
        format!("{}={}", self.question_key, self.answer_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_is_normalized() {
        assert_eq!(ProductCategory::new("  SmartPhone "), ProductCategory::default());
        let parsed: ProductCategory = serde_json::from_str("\"Tablet\"").expect("category");
        assert_eq!(parsed.as_str(), "tablet");
    }

    #[test]
    fn missing_answers_never_fire() {
        let rule = EvaluationRule::flat("calls", "false", 100.0);
        assert!(!rule.fires(&QuoteAnswers::new()));
    }

    #[test]
    fn deductions_default_to_zero() {
        let rule: EvaluationRule = serde_json::from_str(
            r#"{"question_key":"touch","answer_key":"false","deduction_amount":250}"#,
        )
        .expect("rule parses");
        assert_eq!(rule.deduction_amount, 250.0);
        assert_eq!(rule.deduction_percent, 0.0);
    }
}
