use crate::cli::ServeArgs;
use crate::infra::{AppState, ContractBook, InMemoryContractRepository};
use crate::routes::with_contract_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use haken_contracts::config::AppConfig;
use haken_contracts::contracts::{ContractService, ContractValidator};
use haken_contracts::error::AppError;
use haken_contracts::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        policy: Arc::new(config.policy.clone()),
    };

    let book = match args.seed.take() {
        Some(path) => ContractBook::from_path(&path)?,
        None => ContractBook::default(),
    };
    info!(
        factories = book.factories.len(),
        contracts = book.contracts.len(),
        "contract book loaded"
    );

    let repository = Arc::new(InMemoryContractRepository::from_book(book)?);
    let contract_service = Arc::new(ContractService::new(
        repository,
        ContractValidator::with_policy(config.policy.clone()),
    ));

    let app = with_contract_routes(contract_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "dispatch contract validator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
