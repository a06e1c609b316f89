//! HTTP API module for the time-bank engine.
//!
//! This module exposes punch import, computation, corrections, batch
//! recalculation and department cap management over REST.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{DepartmentCapView, RecordedPunches, RemovedCap, create_router};
pub use request::{
    ActorQuery, CapRequest, CorrectionRequest, PunchRequest, RecalcRequest, RecordPunchesRequest,
};
pub use response::{ApiEnvelope, ApiError, ApiErrorResponse, RecalcResponse};
pub use state::AppState;
