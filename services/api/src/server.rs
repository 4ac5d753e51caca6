use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAmenitySource, InMemoryListingSource, TtlInsightsCache};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use listing_insights::config::AppConfig;
use listing_insights::error::AppError;
use listing_insights::listing::ListingInsightsService;
use listing_insights::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let tax_table = config.insights.tax_table()?;
    info!(
        regions = tax_table.len(),
        default_rate = tax_table.default_rate_percent(),
        "loaded property tax table"
    );

    let insights_service = Arc::new(ListingInsightsService::new(
        Arc::new(InMemoryListingSource::demo()),
        Arc::new(InMemoryAmenitySource::demo()),
        Arc::new(TtlInsightsCache::new(config.insights.cache_ttl_secs)),
        tax_table,
        config.insights.settings(),
    ));

    let app = with_operational_routes(insights_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "listing insights service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
