// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User HTTP handlers.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	Json,
};
use vectix_server_api::{CreateUserRequest, UserResponse, UserWithRolesResponse};
use vectix_server_auth::{hash_password, RoleId};
use vectix_server_db::NewUser;

use crate::{
	api::AppState,
	auth_middleware::{require_active, RequireAuth},
	error::{ErrorResponse, ServerError},
	validation::{parse_user_id, sanitize_email, validate_new_account},
};

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "The caller", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Inactive user", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
/// GET /api/v1/users/me - The caller's public projection.
pub async fn get_me(RequireAuth(current_user): RequireAuth) -> Result<Json<UserResponse>, ServerError> {
	require_active(&current_user.actor)?;
	Ok(Json(current_user.actor.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Every user with role assignments", body = Vec<UserWithRolesResponse>),
        (status = 403, description = "Not enough permissions", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
/// GET /api/v1/users - Every user, each known role flagged `is_assigned`.
pub async fn list_users(
	State(state): State<AppState>,
) -> Result<Json<Vec<UserWithRolesResponse>>, ServerError> {
	let users = state.user_repo.list_users_with_role_assignments().await?;
	Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id or username")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
/// GET /api/v1/users/{id} - Look a user up by id, falling back to username.
pub async fn get_user(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<UserResponse>, ServerError> {
	let actor = match parse_user_id(&id) {
		Ok(user_id) => state.user_repo.get_actor_by_id(&user_id).await?,
		Err(_) => state.user_repo.get_actor_by_username(&id).await?,
	};
	actor
		.map(|actor| Json(actor.into()))
		.ok_or_else(|| ServerError::NotFound("User not found".to_string()))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 404, description = "Role not found", body = ErrorResponse),
        (status = 409, description = "Username or email taken", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
/// POST /api/v1/users - Administrative user creation.
pub async fn create_user(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ServerError> {
	validate_new_account(&payload.username, &payload.email, &payload.password)?;

	let actor = state
		.user_repo
		.create_user(&NewUser {
			name: payload.name,
			phone_number: payload.phone_number,
			email: sanitize_email(&payload.email),
			username: payload.username.trim().to_string(),
			hashed_password: hash_password(&payload.password)?,
			is_active: payload.is_active,
			is_superuser: payload.is_superuser,
			role_ids: payload.role_ids.into_iter().map(RoleId::new).collect(),
		})
		.await?;

	tracing::info!(
		user_id = %actor.id,
		created_by = %current_user.actor.id,
		"user created"
	);
	Ok((StatusCode::CREATED, Json(actor.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/roles/{role_id}",
    params(
        ("user_id" = String, Path, description = "User id"),
        ("role_id" = i64, Path, description = "Role id")
    ),
    responses(
        (status = 200, description = "Role assigned", body = UserResponse),
        (status = 404, description = "User or Role not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
/// POST /api/v1/users/{user_id}/roles/{role_id} - Assign a role. Idempotent.
pub async fn assign_role(
	State(state): State<AppState>,
	Path((user_id, role_id)): Path<(String, i64)>,
) -> Result<Json<UserResponse>, ServerError> {
	let user_id = parse_user_id(&user_id).map_err(|_| user_or_role_missing())?;
	let actor = state.user_repo.add_role(&user_id, RoleId::new(role_id)).await?;
	tracing::info!(user_id = %user_id, role_id, "role assigned");
	Ok(Json(actor.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/roles/{role_id}",
    params(
        ("user_id" = String, Path, description = "User id"),
        ("role_id" = i64, Path, description = "Role id")
    ),
    responses(
        (status = 200, description = "Role revoked", body = UserResponse),
        (status = 404, description = "User or Role not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
/// DELETE /api/v1/users/{user_id}/roles/{role_id} - Revoke a role. Idempotent.
pub async fn revoke_role(
	State(state): State<AppState>,
	Path((user_id, role_id)): Path<(String, i64)>,
) -> Result<Json<UserResponse>, ServerError> {
	let user_id = parse_user_id(&user_id).map_err(|_| user_or_role_missing())?;
	let actor = state
		.user_repo
		.remove_role(&user_id, RoleId::new(role_id))
		.await?;
	tracing::info!(user_id = %user_id, role_id, "role revoked");
	Ok(Json(actor.into()))
}

fn user_or_role_missing() -> ServerError {
	ServerError::NotFound("User or Role not found".to_string())
}
