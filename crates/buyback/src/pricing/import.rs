use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::info;

use super::provider::{InMemoryRuleStore, RuleStoreError};
use super::rules::{EvaluationRule, ProductCategory};

/// Failure while seeding rules from a CSV export.
#[derive(Debug, thiserror::Error)]
pub enum RuleImportError {
    #[error("failed to read rule export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rule CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
    #[error(transparent)]
    Store(#[from] RuleStoreError),
}

/// Loads evaluation rules from a CSV export with the columns
/// `category,question_key,answer_key,deduction_amount,deduction_percent`.
pub struct RuleCsvImporter;

impl RuleCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<InMemoryRuleStore, RuleImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let store = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            rules = store.rule_count(),
            "loaded evaluation rules"
        );
        Ok(store)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<InMemoryRuleStore, RuleImportError> {
        let store = InMemoryRuleStore::new();
        Self::load_into(&store, reader)?;
        Ok(store)
    }

    /// Append rows to `store`, preserving file order within each category.
    pub fn load_into<R: Read>(
        store: &InMemoryRuleStore,
        reader: R,
    ) -> Result<usize, RuleImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut loaded = 0;

        for (index, record) in csv_reader.deserialize::<RuleRow>().enumerate() {
            let row = record?;
            // header is line 1
            let (category, rule) = row.into_rule(index + 2)?;
            store.push(category, rule)?;
            loaded += 1;
        }

        Ok(loaded)
    }
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    question_key: String,
    answer_key: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    deduction_amount: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    deduction_percent: Option<String>,
}

impl RuleRow {
    fn into_rule(self, row: usize) -> Result<(ProductCategory, EvaluationRule), RuleImportError> {
        if self.question_key.is_empty() || self.answer_key.is_empty() {
            return Err(RuleImportError::InvalidRow {
                row,
                reason: "question_key and answer_key are required".to_string(),
            });
        }

        let deduction_amount = parse_deduction(self.deduction_amount.as_deref(), row)?;
        let deduction_percent = parse_deduction(self.deduction_percent.as_deref(), row)?;
        let category = self
            .category
            .map(ProductCategory::new)
            .unwrap_or_default();

        Ok((
            category,
            EvaluationRule {
                question_key: self.question_key,
                answer_key: self.answer_key,
                deduction_amount,
                deduction_percent,
            },
        ))
    }
}

fn parse_deduction(raw: Option<&str>, row: usize) -> Result<f64, RuleImportError> {
    match raw {
        None => Ok(0.0),
        Some(value) => value
            .parse::<f64>()
            .ok()
            .filter(|parsed| parsed.is_finite())
            .ok_or_else(|| RuleImportError::InvalidRow {
                row,
                reason: format!("'{value}' is not a number"),
            }),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
