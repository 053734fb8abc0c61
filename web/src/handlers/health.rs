//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check the record store.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    /// Component checked
    pub component: &'static str,
    /// `"ready"` or `"unavailable"`
    pub status: &'static str,
    /// Failure detail, when not ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Health check that pings the record store (for readiness).
///
/// # Status Codes
///
/// - 200 OK: the store answered
/// - 503 Service Unavailable: the store failed
///
/// # Endpoint
///
/// ```text
/// GET /health/ready
/// ```
///
/// # Response
///
/// ```json
/// { "component": "record_store", "status": "ready" }
/// ```
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    match state.repository.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Readiness {
                component: "record_store",
                status: "ready",
                message: None,
            }),
        ),
        Err(error) => {
            tracing::warn!(error = %error, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Readiness {
                    component: "record_store",
                    status: "unavailable",
                    message: Some(error.to_string()),
                }),
            )
        },
    }
}
