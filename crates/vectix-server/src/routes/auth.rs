// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login, token refresh and self-service registration.

use axum::{extract::State, http::StatusCode, Json};
use vectix_server_api::{LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, UserResponse};
use vectix_server_auth::{hash_password, verify_password};
use vectix_server_db::NewUser;

use crate::{
	api::AppState,
	error::{ErrorResponse, ServerError},
	validation::{sanitize_email, validate_new_account},
};

const BAD_LOGIN: &str = "Incorrect username or password";

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenResponse),
        (status = 401, description = "Incorrect username or password", body = ErrorResponse)
    ),
    tag = "auth"
)]
/// POST /api/v1/auth/login - Exchange credentials for an access/refresh pair.
pub async fn login(
	State(state): State<AppState>,
	Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ServerError> {
	let Some(credentials) = state.user_repo.get_credentials(&payload.username).await? else {
		tracing::info!("login failed: unknown user");
		return Err(ServerError::Unauthorized(BAD_LOGIN.to_string()));
	};

	if !verify_password(&payload.password, &credentials.hashed_password) {
		tracing::info!(user_id = %credentials.actor.id, "login failed: wrong password");
		return Err(ServerError::Unauthorized(BAD_LOGIN.to_string()));
	}

	let pair = state.tokens.issue_pair(&credentials.actor.username)?;
	tracing::info!(user_id = %credentials.actor.id, "login succeeded");
	Ok(Json(pair.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenResponse),
        (status = 401, description = "Could not validate credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
/// POST /api/v1/auth/refresh - Rotate a refresh token into a new pair.
pub async fn refresh(
	State(state): State<AppState>,
	Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ServerError> {
	match state
		.tokens
		.rotate(&payload.refresh_token, state.user_repo.as_ref())
		.await
	{
		Ok(pair) => Ok(Json(pair.into())),
		Err(e) if e.is_internal() => Err(e.into()),
		Err(e) => {
			tracing::debug!(error = %e, "refresh rejected");
			Err(ServerError::credentials())
		}
	}
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 403, description = "Signups are disabled", body = ErrorResponse),
        (status = 409, description = "Username or email taken", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    tag = "auth"
)]
/// POST /api/v1/auth/register - Create an active account with the default role.
pub async fn register(
	State(state): State<AppState>,
	Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ServerError> {
	if state.auth_config.signups_disabled {
		return Err(ServerError::Forbidden("Signups are disabled".to_string()));
	}
	validate_new_account(&payload.username, &payload.email, &payload.password)?;

	let default_role = state
		.role_repo
		.ensure_role(&state.auth_config.default_role, None)
		.await?;

	let actor = state
		.user_repo
		.create_user(&NewUser {
			name: payload.name,
			phone_number: payload.phone_number,
			email: sanitize_email(&payload.email),
			username: payload.username.trim().to_string(),
			hashed_password: hash_password(&payload.password)?,
			is_active: true,
			is_superuser: false,
			role_ids: vec![default_role.role_id],
		})
		.await?;

	tracing::info!(user_id = %actor.id, "account registered");
	Ok((StatusCode::CREATED, Json(actor.into())))
}
