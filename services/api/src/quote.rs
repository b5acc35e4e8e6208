use crate::infra::{load_rule_store, parse_answer};
use buyback::config::AppConfig;
use buyback::error::AppError;
use buyback::pricing::{
    AdjustmentKind, AnswerValue, EvaluationRule, PriceCalculator, PriceQuote, PricingPolicy,
    ProductCategory, QuoteAnswers, QuoteRequest, RuleProvider,
};
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Undamaged market value of the device variant
    #[arg(long)]
    pub(crate) base_price: f64,
    /// Questionnaire answer as key=value; repeatable (true/false, [a,b], or text)
    #[arg(long = "answer", value_parser = parse_answer)]
    pub(crate) answers: Vec<(String, AnswerValue)>,
    /// Questionnaire answers as a JSON object; --answer entries override keys
    #[arg(long)]
    pub(crate) answers_json: Option<String>,
    /// Product category (defaults to PRICING_DEFAULT_CATEGORY or smartphone)
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Evaluation rule CSV (overrides PRICING_RULES_PATH)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Print the quote as JSON instead of a breakdown
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RulesArgs {
    /// Evaluation rule CSV (overrides PRICING_RULES_PATH)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Only list rules for this category
    #[arg(long)]
    pub(crate) category: Option<String>,
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let QuoteArgs {
        base_price,
        answers,
        answers_json,
        category,
        rules,
        json,
    } = args;

    let config = AppConfig::load()?;
    let rules_path = rules.or(config.pricing.rules_path);
    let store = load_rule_store(rules_path.as_deref())?;
    let calculator =
        PriceCalculator::new(store).with_default_category(config.pricing.default_category);

    let request = QuoteRequest {
        base_price,
        answers: collect_answers(answers_json.as_deref(), answers)?,
        category: category.map(ProductCategory::new),
    };
    let quote = calculator.quote(&request)?;

    if json {
        match serde_json::to_string_pretty(&quote) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Quote JSON unavailable: {err}"),
        }
    } else {
        print!("{}", format_quote(&quote));
    }

    Ok(())
}

pub(crate) fn run_rules(args: RulesArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let rules_path = args.rules.or(config.pricing.rules_path);
    let store = load_rule_store(rules_path.as_deref())?;

    let categories = match args.category {
        Some(category) => vec![ProductCategory::new(category)],
        None => store.categories()?,
    };

    if categories.is_empty() {
        println!("No evaluation rules configured; every category uses the legacy policy");
        return Ok(());
    }

    for category in categories {
        let rules = store.evaluation_rules(&category)?;
        print!("{}", format_rules(&category, &rules));
    }

    Ok(())
}

fn collect_answers(
    json: Option<&str>,
    pairs: Vec<(String, AnswerValue)>,
) -> Result<QuoteAnswers, AppError> {
    let mut answers = match json {
        Some(raw) => serde_json::from_str::<QuoteAnswers>(raw)?,
        None => QuoteAnswers::new(),
    };
    for (key, value) in pairs {
        answers.insert(key, value);
    }
    Ok(answers)
}

pub(crate) fn format_quote(quote: &PriceQuote) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Buyback quote ({})", quote.category);
    let _ = writeln!(out, "Base price: {:.2}", quote.base_price);

    match quote.policy {
        PricingPolicy::ConfiguredRules { rule_count, fired } => {
            let _ = writeln!(out, "Policy: configured rules ({fired} of {rule_count} fired)");
        }
        PricingPolicy::LegacyFallback => {
            let _ = writeln!(out, "Policy: legacy fallback (no rules configured)");
        }
    }

    if quote.adjustments.is_empty() {
        let _ = writeln!(out, "Adjustments: none");
    } else {
        let _ = writeln!(out, "Adjustments");
        for adjustment in &quote.adjustments {
            let detail = match adjustment.kind {
                AdjustmentKind::Multiplier { factor } => format!(" (x{factor})"),
                AdjustmentKind::PercentOfBase { percent } => format!(" ({percent}% of base)"),
                AdjustmentKind::Flat => String::new(),
            };
            let _ = writeln!(
                out,
                "- {}{}: {:+.2}",
                adjustment.source, detail, adjustment.delta
            );
        }
    }

    let _ = writeln!(out, "Final offer: {}", quote.final_price);
    out
}

fn format_rules(category: &ProductCategory, rules: &[EvaluationRule]) -> String {
    let mut out = String::new();
    if rules.is_empty() {
        let _ = writeln!(out, "{category}: no rules (legacy policy)");
        return out;
    }

    let _ = writeln!(out, "{category}: {} rule(s)", rules.len());
    for rule in rules {
        let _ = writeln!(
            out,
            "- {} -> -{} flat, -{}% of base",
            rule.label(),
            rule.deduction_amount,
            rule.deduction_percent
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use buyback::pricing::{apply_legacy, apply_rules};

    #[test]
    fn cli_pairs_override_json_answers() {
        let answers = collect_answers(
            Some(r#"{"calls": true, "accessories": ["box"]}"#),
            vec![("calls".to_string(), AnswerValue::Bool(false))],
        )
        .expect("answers merge");

        assert_eq!(answers.flag("calls"), Some(false));
        assert_eq!(answers.tags("accessories"), ["box".to_string()]);
    }

    #[test]
    fn invalid_json_answers_are_rejected() {
        let err = collect_answers(Some("[true]"), Vec::new()).expect_err("not an object");
        assert!(matches!(err, AppError::InvalidAnswers(_)));
    }

    #[test]
    fn legacy_breakdown_lists_each_step() {
        let answers = QuoteAnswers::new()
            .with("calls", false)
            .with("accessories", ["charger"]);
        let quote = apply_legacy(10_000.0, &answers, ProductCategory::default());

        let rendered = format_quote(&quote);

        assert!(rendered.contains("Policy: legacy fallback"));
        assert!(rendered.contains("- calls=false (x0.8): -2000.00"));
        assert!(rendered.contains("- accessories includes charger: +200.00"));
        assert!(rendered.ends_with("Final offer: 8200\n"));
    }

    #[test]
    fn rule_breakdown_reports_fired_count() {
        let rules = vec![
            EvaluationRule::percent("screen_original", "false", 10.0),
            EvaluationRule::flat("touch", "false", 300.0),
        ];
        let answers = QuoteAnswers::new().with("screen_original", false);
        let quote = apply_rules(10_000.0, &answers, &rules, ProductCategory::default());

        let rendered = format_quote(&quote);

        assert!(rendered.contains("configured rules (1 of 2 fired)"));
        assert!(rendered.contains("screen_original=false (10% of base): -1000.00"));
        assert!(rendered.contains("Final offer: 9000"));
    }

    #[test]
    fn empty_rule_set_mentions_legacy_policy() {
        let rendered = format_rules(&ProductCategory::new("tablet"), &[]);
        assert_eq!(rendered, "tablet: no rules (legacy policy)\n");
    }
}
