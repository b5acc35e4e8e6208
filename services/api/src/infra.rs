use buyback::error::AppError;
use buyback::pricing::{parse_answer_pair, AnswerValue, InMemoryRuleStore, RuleCsvImporter};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Seed the rule store from CSV, or start empty so every category prices
/// with the legacy policy.
pub(crate) fn load_rule_store(path: Option<&Path>) -> Result<InMemoryRuleStore, AppError> {
    match path {
        Some(path) => Ok(RuleCsvImporter::from_path(path)?),
        None => {
            warn!("no evaluation rules configured; quotes use the legacy policy");
            Ok(InMemoryRuleStore::new())
        }
    }
}

pub(crate) fn parse_answer(raw: &str) -> Result<(String, AnswerValue), String> {
    parse_answer_pair(raw).map_err(|err| err.to_string())
}
