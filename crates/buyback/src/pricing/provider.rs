use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::rules::{EvaluationRule, ProductCategory};

/// Read-only port onto the store that owns evaluation rules.
///
/// Implementations return rules in the store's read order; an empty list
/// means the category has no configured rules.
pub trait RuleProvider: Send + Sync {
    fn evaluation_rules(
        &self,
        category: &ProductCategory,
    ) -> Result<Vec<EvaluationRule>, RuleStoreError>;
}

impl<P: RuleProvider + ?Sized> RuleProvider for Arc<P> {
    fn evaluation_rules(
        &self,
        category: &ProductCategory,
    ) -> Result<Vec<EvaluationRule>, RuleStoreError> {
        (**self).evaluation_rules(category)
    }
}

/// Error enumeration for rule-store failures.
#[derive(Debug, thiserror::Error)]
pub enum RuleStoreError {
    #[error("rule store unavailable: {0}")]
    Unavailable(String),
}

/// Process-local rule store, seeded at startup or by tests.
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    rules: RwLock<HashMap<ProductCategory, Vec<EvaluationRule>>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(
        mut self,
        category: impl Into<ProductCategory>,
        rules: Vec<EvaluationRule>,
    ) -> Self {
        if let Ok(map) = self.rules.get_mut() {
            map.insert(category.into(), rules);
        }
        self
    }

    /// Swap the rule set for a category, returning the previous one.
    pub fn replace(
        &self,
        category: ProductCategory,
        rules: Vec<EvaluationRule>,
    ) -> Result<Vec<EvaluationRule>, RuleStoreError> {
        let mut guard = self
            .rules
            .write()
            .map_err(|_| RuleStoreError::Unavailable("rule store lock poisoned".to_string()))?;
        Ok(guard.insert(category, rules).unwrap_or_default())
    }

    pub(crate) fn push(
        &self,
        category: ProductCategory,
        rule: EvaluationRule,
    ) -> Result<(), RuleStoreError> {
        let mut guard = self
            .rules
            .write()
            .map_err(|_| RuleStoreError::Unavailable("rule store lock poisoned".to_string()))?;
        guard.entry(category).or_default().push(rule);
        Ok(())
    }

    pub fn categories(&self) -> Result<Vec<ProductCategory>, RuleStoreError> {
        let guard = self
            .rules
            .read()
            .map_err(|_| RuleStoreError::Unavailable("rule store lock poisoned".to_string()))?;
        let mut categories: Vec<_> = guard.keys().cloned().collect();
        categories.sort();
        Ok(categories)
    }

    pub fn rule_count(&self) -> usize {
        self.rules
            .read()
            .map(|guard| guard.values().map(Vec::len).sum())
            .unwrap_or(0)
    }
}

impl RuleProvider for InMemoryRuleStore {
    fn evaluation_rules(
        &self,
        category: &ProductCategory,
    ) -> Result<Vec<EvaluationRule>, RuleStoreError> {
        let guard = self
            .rules
            .read()
            .map_err(|_| RuleStoreError::Unavailable("rule store lock poisoned".to_string()))?;
        Ok(guard.get(category).cloned().unwrap_or_default())
    }
}
