// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use vectix_server_auth::AuthError;
use vectix_server_db::DbError;

/// Message for every failed bearer authentication.
pub const CREDENTIALS_MESSAGE: &str = "Could not validate credentials";

/// Message for every authorization denial.
pub const DENIED_MESSAGE: &str = "Not enough permissions";

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Malformed request.
	#[error("Invalid request: {0}")]
	BadRequest(String),

	/// Authentication failed. Always answered with `WWW-Authenticate: Bearer`.
	#[error("Unauthorized: {0}")]
	Unauthorized(String),

	#[error("Forbidden: {0}")]
	Forbidden(String),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	/// Well-formed request with invalid content.
	#[error("Validation failed: {0}")]
	Validation(String),

	/// Body exceeds the byte limit given.
	#[error("Payload too large: limit is {0} bytes")]
	PayloadTooLarge(usize),

	#[error("Service unavailable: {0}")]
	ServiceUnavailable(String),

	#[error("Internal error: {0}")]
	Internal(String),

	#[error(transparent)]
	Auth(#[from] AuthError),

	#[error("Database error: {0}")]
	Db(#[from] DbError),
}

/// Error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ServerError {
	pub fn credentials() -> Self {
		ServerError::Unauthorized(CREDENTIALS_MESSAGE.to_string())
	}

	/// `(status, error code, message)` for this error. Internal details are
	/// logged here and replaced with a generic message.
	fn parts(&self) -> (StatusCode, &'static str, String) {
		match self {
			ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
			ServerError::Unauthorized(msg) => {
				tracing::debug!(reason = %msg, "unauthorized");
				(StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
			}
			ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
			ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
			ServerError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
			ServerError::Validation(msg) => (
				StatusCode::UNPROCESSABLE_ENTITY,
				"validation_error",
				msg.clone(),
			),
			ServerError::PayloadTooLarge(limit) => (
				StatusCode::PAYLOAD_TOO_LARGE,
				"payload_too_large",
				format!("Request body exceeds {limit} bytes"),
			),
			ServerError::ServiceUnavailable(msg) => {
				tracing::warn!(error = %msg, "service unavailable");
				(
					StatusCode::SERVICE_UNAVAILABLE,
					"service_unavailable",
					msg.clone(),
				)
			}
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				internal()
			}
			ServerError::Auth(e) if e.is_authentication_failure() => {
				tracing::debug!(reason = %e, "authentication failed");
				(
					StatusCode::UNAUTHORIZED,
					"unauthorized",
					CREDENTIALS_MESSAGE.to_string(),
				)
			}
			ServerError::Auth(AuthError::AccessDenied) => {
				(StatusCode::FORBIDDEN, "forbidden", DENIED_MESSAGE.to_string())
			}
			ServerError::Auth(AuthError::InactiveUser) => {
				(StatusCode::FORBIDDEN, "forbidden", "Inactive user".to_string())
			}
			ServerError::Auth(e) => {
				tracing::error!(error = %e, "authorization fault");
				internal()
			}
			ServerError::Db(DbError::NotFound(msg)) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
			ServerError::Db(DbError::Conflict(msg)) => (StatusCode::CONFLICT, "conflict", msg.clone()),
			ServerError::Db(e) => {
				tracing::error!(error = %e, "database error");
				internal()
			}
		}
	}
}

fn internal() -> (StatusCode, &'static str, String) {
	(
		StatusCode::INTERNAL_SERVER_ERROR,
		"internal_error",
		"An internal error occurred".to_string(),
	)
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, error, message) = self.parts();
		let mut response = (
			status,
			Json(ErrorResponse {
				error: error.to_string(),
				message,
			}),
		)
			.into_response();

		if status == StatusCode::UNAUTHORIZED {
			response
				.headers_mut()
				.insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
		}
		response
	}
}
