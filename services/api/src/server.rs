use crate::cli::ServeArgs;
use crate::infra::{local_marketplace, AppState};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use taskconnect::auth::CredentialAuthority;
use taskconnect::config::AppConfig;
use taskconnect::error::AppError;
use taskconnect::telemetry;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let credentials = CredentialAuthority::from_config(&config.auth);
    let marketplace = Arc::new(local_marketplace(credentials));

    let app = with_marketplace_routes(marketplace)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        token_ttl_minutes = config.auth.token_ttl_minutes,
        "taskconnect marketplace ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
