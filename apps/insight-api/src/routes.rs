use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use insight_service::{
	DetectRequest, DetectResponse, Error, FulfillRequest, FulfillResponse, InsightResponse,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/insights/detect", post(detect))
		.route("/api/insights/fulfill", post(fulfill))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn detect(
	State(state): State<AppState>,
	payload: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<InsightResponse<DetectResponse>>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.detect(payload).await?;

	Ok(Json(response))
}

async fn fulfill(
	State(state): State<AppState>,
	payload: Result<Json<FulfillRequest>, JsonRejection>,
) -> Result<Json<InsightResponse<FulfillResponse>>, ApiError> {
	state.service.ensure_fulfillment_enabled()?;

	let Json(payload) = payload?;
	let response = state.service.fulfill(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message, fields } => ApiError::new(
				StatusCode::BAD_REQUEST,
				"INVALID_REQUEST",
				message,
				(!fields.is_empty()).then_some(fields),
			),
			Error::NotFound { message } =>
				ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			Error::Provider { message } => {
				tracing::error!(%message, "Collaborator failure surfaced to the caller.");

				ApiError::new(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message, None)
			},
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(err: JsonRejection) -> Self {
		ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.body_text(), None)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
