use crate::cli::ServeArgs;
use crate::infra::{AppState, RegistryState};
use crate::routes::with_registry_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use epr_dashboard::config::AppConfig;
use epr_dashboard::error::AppError;
use epr_dashboard::export::SpreadsheetExporter;
use epr_dashboard::registry::RegistryService;
use epr_dashboard::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    // The blocking HTTP client must be created and dropped outside the
    // runtime, so the service outlives it.
    let service = Arc::new(RegistryService::from_config(&config.registry)?);
    let registry = RegistryState {
        service: Arc::clone(&service),
        exporter: Arc::new(SpreadsheetExporter::with_default_engines()),
        default_record_limit: config.registry.default_record_limit,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(config, registry));
    drop(runtime);
    drop(service);
    result
}

async fn serve(config: AppConfig, registry: RegistryState) -> Result<(), AppError> {
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_registry_routes(registry)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        endpoint = %config.registry.api_url,
        "epr dashboard scraper ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
