use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredStore};
use crate::routes::with_directory_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use reciclativa::config::AppConfig;
use reciclativa::directory::{AdminGate, DirectoryService, EmailNotifier};
use reciclativa::error::AppError;
use reciclativa::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    if config.admin.session_token.is_none() {
        warn!("ADMIN_SESSION_TOKEN not set; moderation endpoints will deny every request");
    }

    let store = Arc::new(ConfiguredStore::from_config(&config.storage)?);
    let store_label = store.label();
    let notifier = Arc::new(EmailNotifier::new(config.notifier.clone())?);
    let service = Arc::new(DirectoryService::new(store, notifier));
    let gate = AdminGate::new(config.admin.clone());

    let app = with_directory_routes(service, gate)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, store = store_label, "reciclativa directory ready");

    axum::serve(listener, app).await?;
    Ok(())
}
