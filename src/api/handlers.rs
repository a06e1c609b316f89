//! HTTP request handlers for the time-bank engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::{Computation, CorrectionOutcome};
use crate::error::{EngineError, EngineResult};
use crate::models::{CapLimits, PunchRecord};

use super::request::{
    ActorQuery, CapRequest, CorrectionRequest, PunchRequest, RecalcRequest, RecordPunchesRequest,
};
use super::response::{ApiEnvelope, ApiError, ApiErrorResponse, RecalcResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/punches", post(record_punches_handler))
        .route("/punches/:id", get(get_punch_handler))
        .route("/punches/:id/compute", post(compute_stored_handler))
        .route(
            "/punches/:id/corrections",
            post(correct_punch_handler).get(correction_history_handler),
        )
        .route("/compute", post(compute_handler))
        .route("/results/:punch_id", get(get_result_handler))
        .route("/recalc", post(recalc_handler))
        .route(
            "/departments/:department/cap",
            get(get_cap_handler)
                .put(put_cap_handler)
                .delete(delete_cap_handler),
        )
        .route(
            "/departments/:department/cap/history",
            get(cap_history_handler),
        )
        .with_state(state)
}

/// Body of `POST /punches`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedPunches {
    /// How many punches were stored.
    pub recorded: usize,
}

/// Body of `GET /departments/:department/cap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentCapView {
    /// Department name.
    pub department: String,
    /// Caps in force.
    #[serde(flatten)]
    pub limits: CapLimits,
    /// False when the defaults apply.
    pub configured: bool,
}

/// Body of `DELETE /departments/:department/cap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedCap {
    /// Department name.
    pub department: String,
    /// The limits that were removed, if any were configured.
    pub removed: Option<CapLimits>,
}

/// Maps a JSON body rejection to a 400 error.
fn rejection_error(rejection: JsonRejection, correlation_id: Uuid) -> ApiErrorResponse {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    }
}

fn engine_failure(err: EngineError, correlation_id: Uuid) -> ApiErrorResponse {
    warn!(correlation_id = %correlation_id, error = %err, "Request failed");
    err.into()
}

fn enveloped_failure<T: Serialize>(
    err: EngineError,
    correlation_id: Uuid,
) -> Response {
    let invalid_input = err.is_invalid_input();
    engine_failure(err, correlation_id).into_envelope::<T>(invalid_input)
}

/// Handler for `POST /punches`.
async fn record_punches_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecordPunchesRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return rejection_error(rejection, correlation_id)
                .into_envelope::<RecordedPunches>(true);
        }
    };

    let punches: Vec<PunchRecord> = request.punches.into_iter().map(Into::into).collect();
    let engine = state.shared_engine();
    match run_blocking(move || engine.record_punches(punches)).await {
        Ok(recorded) => {
            info!(correlation_id = %correlation_id, recorded, "Punches recorded");
            (
                StatusCode::CREATED,
                Json(ApiEnvelope::ok(RecordedPunches { recorded })),
            )
                .into_response()
        }
        Err(err) => enveloped_failure::<RecordedPunches>(err, correlation_id),
    }
}

/// Handler for `GET /punches/:id`.
async fn get_punch_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.engine().current_punch(&id) {
        Ok(punch) => Json(punch).into_response(),
        Err(err) => engine_failure(err, correlation_id).into_response(),
    }
}

/// Handler for `POST /compute`.
///
/// Computes a posted punch without requiring it to be recorded first.
async fn compute_handler(
    State(state): State<AppState>,
    payload: Result<Json<PunchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing compute request");

    let punch: PunchRecord = match payload {
        Ok(Json(req)) => req.into(),
        Err(rejection) => {
            return rejection_error(rejection, correlation_id).into_envelope::<Computation>(true);
        }
    };

    let engine = state.shared_engine();
    let outcome = run_blocking(move || engine.compute_daily_hours(&punch)).await;
    respond_with_computation(outcome, correlation_id)
}

/// Handler for `POST /punches/:id/compute`.
async fn compute_stored_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, punch_id = %id, "Processing compute request");
    let engine = state.shared_engine();
    let outcome = run_blocking(move || engine.compute_stored(&id)).await;
    respond_with_computation(outcome, correlation_id)
}

/// Runs store-bound engine work on the blocking pool.
async fn run_blocking<T, F>(task: F) -> EngineResult<T>
where
    F: FnOnce() -> EngineResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(outcome) => outcome,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => Err(EngineError::Persistence {
            collection: "store".to_string(),
            message: format!("blocking task did not complete: {}", err),
        }),
    }
}

fn respond_with_computation(
    outcome: EngineResult<Computation>,
    correlation_id: Uuid,
) -> Response {
    match outcome {
        Ok(computation) => {
            info!(
                correlation_id = %correlation_id,
                punch_id = %computation.result.punch_id,
                persisted = computation.persisted,
                "Compute completed"
            );
            Json(ApiEnvelope::ok(computation)).into_response()
        }
        Err(err) => enveloped_failure::<Computation>(err, correlation_id),
    }
}

/// Handler for `GET /results/:punch_id`.
async fn get_result_handler(
    State(state): State<AppState>,
    Path(punch_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.engine().result_for(&punch_id) {
        Ok(Some(result)) => Json(result).into_response(),
        Ok(None) => ApiErrorResponse {
            status: StatusCode::NOT_FOUND,
            error: ApiError::not_found(
                "RESULT_NOT_FOUND",
                format!("No computed result for punch: {}", punch_id),
            ),
        }
        .into_response(),
        Err(err) => engine_failure(err, correlation_id).into_response(),
    }
}

/// Handler for `POST /punches/:id/corrections`.
async fn correct_punch_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CorrectionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (correction, actor) = match payload {
        Ok(Json(req)) => req.into_parts(),
        Err(rejection) => {
            return rejection_error(rejection, correlation_id)
                .into_envelope::<CorrectionOutcome>(true);
        }
    };

    let ledger = state.shared_ledger();
    let punch_id = id.clone();
    match run_blocking(move || ledger.correct_punch(&punch_id, &correction, &actor)).await {
        Ok(outcome) => {
            if let Some(message) = &outcome.recompute_warning {
                warn!(
                    correlation_id = %correlation_id,
                    punch_id = %id,
                    warning = %message,
                    "Correction stored with recompute warning"
                );
            }
            (StatusCode::CREATED, Json(ApiEnvelope::ok(outcome))).into_response()
        }
        Err(err) => enveloped_failure::<CorrectionOutcome>(err, correlation_id),
    }
}

/// Handler for `GET /punches/:id/corrections`.
async fn correction_history_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.ledger().get_history(&id) {
        Ok(history) => Json(history).into_response(),
        Err(err) => engine_failure(err, correlation_id).into_response(),
    }
}

/// Handler for `POST /recalc`.
async fn recalc_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecalcRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let failure = rejection_error(rejection, correlation_id);
            return (
                failure.status,
                Json(RecalcResponse {
                    success: false,
                    count: 0,
                    failures: Vec::new(),
                    error: Some(failure.error),
                }),
            )
                .into_response();
        }
    };

    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee_id,
        date_from = %request.date_from,
        date_to = %request.date_to,
        "Processing recalc request"
    );

    match state
        .engine()
        .recalc_range_cooperative(&request.employee_id, request.date_from, request.date_to)
        .await
    {
        Ok(summary) => Json(RecalcResponse {
            success: true,
            count: summary.count,
            failures: summary.failures,
            error: None,
        })
        .into_response(),
        Err(err) => {
            let failure = engine_failure(err, correlation_id);
            (
                failure.status,
                Json(RecalcResponse {
                    success: false,
                    count: 0,
                    failures: Vec::new(),
                    error: Some(failure.error),
                }),
            )
                .into_response()
        }
    }
}

/// Handler for `GET /departments/:department/cap`.
async fn get_cap_handler(
    State(state): State<AppState>,
    Path(department): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let caps = state.engine().caps();
    let configured = match caps.list_caps() {
        Ok(list) => list.iter().any(|c| c.department == department),
        Err(err) => return engine_failure(err, correlation_id).into_response(),
    };
    match caps.get_cap(Some(&department)) {
        Ok(limits) => Json(DepartmentCapView {
            department,
            limits,
            configured,
        })
        .into_response(),
        Err(err) => engine_failure(err, correlation_id).into_response(),
    }
}

/// Handler for `PUT /departments/:department/cap`.
async fn put_cap_handler(
    State(state): State<AppState>,
    Path(department): Path<String>,
    payload: Result<Json<CapRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_error(rejection, correlation_id).into_response(),
    };

    match state
        .engine()
        .caps()
        .set_cap(&department, request.limits(), &request.updated_by)
    {
        Ok(cap) => Json(cap).into_response(),
        Err(err) => engine_failure(err, correlation_id).into_response(),
    }
}

/// Handler for `DELETE /departments/:department/cap?actor=...`.
async fn delete_cap_handler(
    State(state): State<AppState>,
    Path(department): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.engine().caps().remove_cap(&department, &query.actor) {
        Ok(removed) => Json(RemovedCap {
            department,
            removed,
        })
        .into_response(),
        Err(err) => engine_failure(err, correlation_id).into_response(),
    }
}

/// Handler for `GET /departments/:department/cap/history`.
async fn cap_history_handler(
    State(state): State<AppState>,
    Path(department): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.engine().caps().change_log(Some(&department)) {
        Ok(entries) => Json(entries).into_response(),
        Err(err) => engine_failure(err, correlation_id).into_response(),
    }
}
