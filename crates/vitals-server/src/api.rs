//! The `/test/{value}` endpoint.
//!
//! Type conversion happens here, before the record handler is invoked: a
//! missing or non-decimal segment is rejected with a 4xx and no metric moves.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde_json::json;

use vitals_core::error::VitalsError;

use crate::app_state::AppState;
use crate::handlers::CallerContext;

/// Handler errors rendered as HTTP. `NotFound` is the only documented
/// failure of the API surface; the rest fall through to the generic paths.
pub struct ApiError(pub VitalsError);

impl From<VitalsError> for ApiError {
    fn from(e: VitalsError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            VitalsError::NotFound => StatusCode::NOT_FOUND,
            VitalsError::BadRequest(_) => StatusCode::BAD_REQUEST,
            VitalsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "code": status.as_u16(),
            "type": self.0.client_code().as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

pub async fn test(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let value: Decimal = raw
        .parse()
        .map_err(|_| VitalsError::BadRequest(format!("value must be a decimal: {raw}")))?;

    let ctx = CallerContext {
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    };

    let msg = state.handler().record(value, &ctx).await?;
    Ok(Json(msg).into_response())
}
