use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ConflictCeiling, ContractId, ContractSnapshot, DateRange};
use super::renewal::{RenewalError, RenewalErrorCode};
use super::repository::{ContractRepository, RepositoryError};
use super::service::{ContractService, ContractServiceError, NewContract};
use super::terms::{ContractTerms, TermsReport};
use super::validation::ValidationResult;

/// Stateless validation request: the caller supplies every snapshot.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub candidate: ContractSnapshot,
    #[serde(default)]
    pub ceiling: ConflictCeiling,
    #[serde(default)]
    pub existing: Vec<ContractSnapshot>,
    #[serde(default)]
    pub terms: Option<ContractTerms>,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub dates: ValidationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<TermsReport>,
}

#[derive(Debug, Deserialize)]
pub struct RenewRequest {
    pub date_range: DateRange,
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub as_of: NaiveDate,
}

/// Router builder exposing contract validation, lifecycle, and audit endpoints.
pub fn contract_router<R>(service: Arc<ContractService<R>>) -> Router
where
    R: ContractRepository + 'static,
{
    Router::new()
        .route("/api/v1/contracts/validate", post(validate_handler::<R>))
        .route("/api/v1/contracts", post(create_handler::<R>))
        .route("/api/v1/contracts/:contract_id", get(fetch_handler::<R>))
        .route(
            "/api/v1/contracts/:contract_id/activate",
            post(activate_handler::<R>),
        )
        .route(
            "/api/v1/contracts/:contract_id/renew",
            post(renew_handler::<R>),
        )
        .route(
            "/api/v1/contracts/:contract_id/lineage",
            get(lineage_handler::<R>),
        )
        .route("/api/v1/compliance/audit", get(audit_handler::<R>))
        .with_state(service)
}

pub(crate) async fn validate_handler<R>(
    State(service): State<Arc<ContractService<R>>>,
    Json(request): Json<ValidateRequest>,
) -> Response
where
    R: ContractRepository + 'static,
{
    let validator = service.validator();
    let dates = validator.validate_creation(&request.candidate, &request.ceiling, &request.existing);
    let terms = request
        .terms
        .as_ref()
        .map(|terms| validator.validate_terms(terms));

    let valid = dates.is_valid()
        && terms
            .as_ref()
            .map(|report| report.result.is_valid())
            .unwrap_or(true);
    let status = if valid {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    (status, Json(ValidateResponse { dates, terms })).into_response()
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<ContractService<R>>>,
    Json(request): Json<NewContract>,
) -> Response
where
    R: ContractRepository + 'static,
{
    match service.create(request) {
        Ok(contract) => (StatusCode::CREATED, Json(contract)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<R>(
    State(service): State<Arc<ContractService<R>>>,
    Path(contract_id): Path<u64>,
) -> Response
where
    R: ContractRepository + 'static,
{
    match service.get(ContractId(contract_id)) {
        Ok(contract) => (StatusCode::OK, Json(contract)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn activate_handler<R>(
    State(service): State<Arc<ContractService<R>>>,
    Path(contract_id): Path<u64>,
) -> Response
where
    R: ContractRepository + 'static,
{
    match service.activate(ContractId(contract_id)) {
        Ok(contract) => (StatusCode::OK, Json(contract)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn renew_handler<R>(
    State(service): State<Arc<ContractService<R>>>,
    Path(contract_id): Path<u64>,
    Json(request): Json<RenewRequest>,
) -> Response
where
    R: ContractRepository + 'static,
{
    match service.renew(ContractId(contract_id), request.date_range) {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn lineage_handler<R>(
    State(service): State<Arc<ContractService<R>>>,
    Path(contract_id): Path<u64>,
) -> Response
where
    R: ContractRepository + 'static,
{
    match service.lineage(ContractId(contract_id)) {
        Ok(chain) => {
            let payload = json!({
                "contract_id": contract_id,
                "lineage": chain,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn audit_handler<R>(
    State(service): State<Arc<ContractService<R>>>,
    Query(query): Query<AuditQuery>,
) -> Response
where
    R: ContractRepository + 'static,
{
    match service.audit(query.as_of) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

fn renewal_status(error: &RenewalError) -> StatusCode {
    match error.code {
        RenewalErrorCode::InvalidPreviousStatus => StatusCode::CONFLICT,
        RenewalErrorCode::GapBeforePreviousEnd | RenewalErrorCode::BrokenLineage => {
            StatusCode::BAD_REQUEST
        }
    }
}

fn error_response(error: ContractServiceError) -> Response {
    match error {
        ContractServiceError::Rejected(result) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(result)).into_response()
        }
        ContractServiceError::Renewal(error) => {
            let payload = json!({
                "code": error.code,
                "error": error.message,
            });
            (renewal_status(&error), Json(payload)).into_response()
        }
        ContractServiceError::NotActivatable { .. } => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        ContractServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "contract not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        ContractServiceError::Repository(RepositoryError::UnknownFactory(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
