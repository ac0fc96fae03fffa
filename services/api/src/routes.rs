use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use haken_contracts::contracts::{
    contract_router, AuditReport, ContractAudit, ContractRepository, ContractService,
    ContractSnapshot, FactorySnapshot,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Point-in-time audit over caller-supplied snapshots.
#[derive(Debug, Deserialize)]
pub(crate) struct AuditSnapshotRequest {
    pub(crate) as_of: NaiveDate,
    #[serde(default)]
    pub(crate) factories: Vec<FactorySnapshot>,
    #[serde(default)]
    pub(crate) contracts: Vec<ContractSnapshot>,
}

pub(crate) fn with_contract_routes<R>(service: Arc<ContractService<R>>) -> axum::Router
where
    R: ContractRepository + 'static,
{
    contract_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/compliance/audit/snapshot",
            axum::routing::post(audit_snapshot_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn audit_snapshot_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<AuditSnapshotRequest>,
) -> Json<AuditReport> {
    let AuditSnapshotRequest {
        as_of,
        factories,
        contracts,
    } = payload;

    let audit = ContractAudit::with_policy(state.policy.as_ref().clone());
    let report = audit.run(as_of, &factories, &contracts);
    info!(
        %as_of,
        findings = report.findings.len(),
        compliant = report.is_compliant(),
        "snapshot audit completed"
    );

    Json(report)
}
