//! Custom Axum extractors.
//!
//! This module contains custom extractors for common HTTP patterns:
//! - `CorrelationId`: Extract or generate request correlation IDs
//! - `TodoIdPath`: Parse the `:id` path segment strictly
//! - `JsonBody`: Untyped JSON body whose rejections use the standard error body
//!
//! # Examples
//!
//! ```ignore
//! use checkmark_web::extractors::{CorrelationId, JsonBody, TodoIdPath};
//!
//! async fn handler(
//!     State(state): State<AppState>,
//!     correlation_id: CorrelationId,
//!     TodoIdPath(id): TodoIdPath,
//!     JsonBody(body): JsonBody,
//! ) -> Result<Json<Todo>, AppError> {
//!     tracing::info!(correlation_id = %correlation_id.0, %id, "Processing request");
//!     ...
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use checkmark_core::todo::TodoId;
use serde_json::Value;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Reuses the id stored by the correlation middleware when installed,
/// otherwise reads the `X-Correlation-ID` header, otherwise generates a new
/// UUID v4.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Uuid>() {
            return Ok(Self(*id));
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Todo id taken from the `:id` path segment.
///
/// Only ASCII digits are accepted; anything else is a 400 before any handler
/// logic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoIdPath(pub TodoId);

#[async_trait]
impl<S> FromRequestParts<S> for TodoIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        Ok(Self(raw.parse::<TodoId>()?))
    }
}

/// JSON request body, left untyped for field-by-field validation.
///
/// Missing content type, malformed JSON and empty bodies all become 400
/// with the `{code, message}` error body.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        Ok(Self(value))
    }
}
