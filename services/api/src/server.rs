use crate::cli::ServeArgs;
use crate::infra::{load_rule_store, AppState};
use crate::routes::with_pricing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use buyback::config::AppConfig;
use buyback::error::AppError;
use buyback::pricing::PriceCalculator;
use buyback::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(rules) = args.rules.take() {
        config.pricing.rules_path = Some(rules);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = load_rule_store(config.pricing.rules_path.as_deref())?;
    let categories = store.categories()?;
    let calculator = Arc::new(
        PriceCalculator::new(store).with_default_category(config.pricing.default_category.clone()),
    );

    let app = with_pricing_routes(calculator)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        rule_categories = categories.len(),
        default_category = %config.pricing.default_category,
        "buyback pricing service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
