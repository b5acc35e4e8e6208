use super::answers::QuoteAnswers;
use super::quote::{AdjustmentKind, PriceLedger};

/// Multiplicative penalties for functional checks answered `false`.
const FUNCTION_PENALTIES: [(&str, f64); 3] =
    [("calls", 0.8), ("touch", 0.7), ("screen_original", 0.9)];

/// Flat deductions applied once per reported entry.
const PER_ENTRY_DEDUCTIONS: [(&str, f64); 2] =
    [("screen_defects", 500.0), ("functional_problems", 300.0)];

const ACCESSORIES_KEY: &str = "accessories";
const ACCESSORY_BONUSES: [(&str, f64); 2] = [("charger", 200.0), ("box", 100.0)];

/// Hardcoded pricing used when a category has no configured rules.
///
/// Steps run in a fixed order: penalties multiply the running price first,
/// then defect deductions and accessory bonuses are added.
pub(crate) fn apply_legacy_policy(ledger: &mut PriceLedger, answers: &QuoteAnswers) {
    for (question, factor) in FUNCTION_PENALTIES {
        if answers.flag(question) == Some(false) {
            ledger.multiply(format!("{question}=false"), factor);
        }
    }

    for (question, per_entry) in PER_ENTRY_DEDUCTIONS {
        let entries = answers.tags(question).len();
        if entries > 0 {
            ledger.add(
                format!("{question} x{entries}"),
                AdjustmentKind::Flat,
                -(per_entry * entries as f64),
            );
        }
    }

    let accessories = answers.tags(ACCESSORIES_KEY);
    for (accessory, bonus) in ACCESSORY_BONUSES {
        if accessories.iter().any(|tag| tag == accessory) {
            ledger.add(
                format!("{ACCESSORIES_KEY} includes {accessory}"),
                AdjustmentKind::Flat,
                bonus,
            );
        }
    }
}
