// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role and permission administration.
//!
//! Duplicate role and permission names are reported as 400, not 409.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	Json,
};
use vectix_server_api::{
	CreatePermissionRequest, CreateRoleRequest, ListPermissionsParams, ListRolesParams,
	PermissionResponse, PermissionSelectionResponse, RoleResponse, UpdatePermissionRequest,
	UpdateRoleRequest,
};
use vectix_server_auth::{PermissionId, RoleId};
use vectix_server_db::{DbError, NewPermission, PermissionUpdate, RoleUpdate};

use crate::{
	api::AppState,
	error::{ErrorResponse, ServerError},
	validation::validate_expression,
};

fn role_not_found() -> ServerError {
	ServerError::NotFound("Role not found".to_string())
}

fn permission_not_found() -> ServerError {
	ServerError::NotFound("Permission not found".to_string())
}

/// Name clashes on roles and permissions surface as 400.
fn name_taken(err: DbError) -> ServerError {
	match err {
		DbError::Conflict(msg) => ServerError::BadRequest(msg),
		other => other.into(),
	}
}

// =============================================================================
// Roles
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/rbac/roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = RoleResponse),
        (status = 400, description = "Role with this name already exists", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// POST /api/v1/rbac/roles
pub async fn create_role(
	State(state): State<AppState>,
	Json(payload): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>), ServerError> {
	if payload.name.trim().is_empty() {
		return Err(ServerError::Validation("Role name must not be empty".to_string()));
	}
	let role = state
		.role_repo
		.create_role(payload.name.trim(), payload.description.as_deref())
		.await
		.map_err(name_taken)?;
	tracing::info!(role_id = %role.role_id, name = %role.name, "role created");
	Ok((StatusCode::CREATED, Json(role.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/rbac/roles",
    params(ListRolesParams),
    responses(
        (status = 200, description = "Roles by id", body = Vec<RoleResponse>)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// GET /api/v1/rbac/roles
pub async fn list_roles(
	State(state): State<AppState>,
	Query(params): Query<ListRolesParams>,
) -> Result<Json<Vec<RoleResponse>>, ServerError> {
	let roles = state
		.role_repo
		.list_roles(params.skip.max(0), params.limit.max(0))
		.await?;
	Ok(Json(roles.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/rbac/roles/{id}",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "The role", body = RoleResponse),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// GET /api/v1/rbac/roles/{id}
pub async fn get_role(
	State(state): State<AppState>,
	Path(id): Path<i64>,
) -> Result<Json<RoleResponse>, ServerError> {
	state
		.role_repo
		.get_role(RoleId::new(id))
		.await?
		.map(|role| Json(role.into()))
		.ok_or_else(role_not_found)
}

#[utoipa::path(
    put,
    path = "/api/v1/rbac/roles/{id}",
    params(("id" = i64, Path, description = "Role id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleResponse),
        (status = 400, description = "Role with this name already exists", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// PUT /api/v1/rbac/roles/{id} - Partial update.
pub async fn update_role(
	State(state): State<AppState>,
	Path(id): Path<i64>,
	Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<RoleResponse>, ServerError> {
	let update = RoleUpdate {
		name: payload.name.map(|name| name.trim().to_string()),
		description: payload.description,
	};
	if update.name.as_deref().is_some_and(str::is_empty) {
		return Err(ServerError::Validation("Role name must not be empty".to_string()));
	}
	state
		.role_repo
		.update_role(RoleId::new(id), &update)
		.await
		.map_err(name_taken)?
		.map(|role| Json(role.into()))
		.ok_or_else(role_not_found)
}

#[utoipa::path(
    delete,
    path = "/api/v1/rbac/roles/{id}",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// DELETE /api/v1/rbac/roles/{id} - Also drops its user, permission and route links.
pub async fn delete_role(
	State(state): State<AppState>,
	Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
	if !state.role_repo.delete_role(RoleId::new(id)).await? {
		return Err(role_not_found());
	}
	tracing::info!(role_id = id, "role deleted");
	Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/rbac/roles/{role_id}/permissions/all",
    params(("role_id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "Every permission flagged `selected`", body = Vec<PermissionSelectionResponse>),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// GET /api/v1/rbac/roles/{role_id}/permissions/all
pub async fn list_role_permissions(
	State(state): State<AppState>,
	Path(role_id): Path<i64>,
) -> Result<Json<Vec<PermissionSelectionResponse>>, ServerError> {
	let selections = state
		.role_repo
		.list_permissions_for_role(RoleId::new(role_id))
		.await?
		.ok_or_else(role_not_found)?;
	Ok(Json(selections.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/rbac/roles/{role_id}/permissions/{permission_id}",
    params(
        ("role_id" = i64, Path, description = "Role id"),
        ("permission_id" = i64, Path, description = "Permission id")
    ),
    responses(
        (status = 204, description = "Permission attached"),
        (status = 404, description = "Role or permission not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// POST /api/v1/rbac/roles/{role_id}/permissions/{permission_id} - Idempotent.
pub async fn add_role_permission(
	State(state): State<AppState>,
	Path((role_id, permission_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ServerError> {
	state
		.role_repo
		.add_permission(RoleId::new(role_id), PermissionId::new(permission_id))
		.await?;
	tracing::info!(role_id, permission_id, "permission attached to role");
	Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v1/rbac/roles/{role_id}/permissions/{permission_id}",
    params(
        ("role_id" = i64, Path, description = "Role id"),
        ("permission_id" = i64, Path, description = "Permission id")
    ),
    responses(
        (status = 204, description = "Permission detached"),
        (status = 404, description = "Role or permission not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// DELETE /api/v1/rbac/roles/{role_id}/permissions/{permission_id} - Idempotent.
pub async fn remove_role_permission(
	State(state): State<AppState>,
	Path((role_id, permission_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ServerError> {
	state
		.role_repo
		.remove_permission(RoleId::new(role_id), PermissionId::new(permission_id))
		.await?;
	tracing::info!(role_id, permission_id, "permission detached from role");
	Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Permissions
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/rbac/permissions",
    request_body = CreatePermissionRequest,
    responses(
        (status = 201, description = "Permission created", body = PermissionResponse),
        (status = 400, description = "Permission with this name already exists", body = ErrorResponse),
        (status = 422, description = "Expression does not parse", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// POST /api/v1/rbac/permissions
pub async fn create_permission(
	State(state): State<AppState>,
	Json(payload): Json<CreatePermissionRequest>,
) -> Result<(StatusCode, Json<PermissionResponse>), ServerError> {
	if let Some(expression) = &payload.expression {
		validate_expression(expression)?;
	}
	let permission = state
		.permission_repo
		.create_permission(&NewPermission {
			name: payload.name,
			description: payload.description,
			resource: payload.resource,
			action: payload.action,
			expression: payload.expression,
		})
		.await
		.map_err(name_taken)?;
	tracing::info!(
		permission_id = %permission.permission_id,
		resource = %permission.resource,
		action = %permission.action,
		"permission created"
	);
	Ok((StatusCode::CREATED, Json(permission.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/rbac/permissions",
    params(ListPermissionsParams),
    responses(
        (status = 200, description = "Permissions by id", body = Vec<PermissionResponse>)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// GET /api/v1/rbac/permissions
pub async fn list_permissions(
	State(state): State<AppState>,
	Query(params): Query<ListPermissionsParams>,
) -> Result<Json<Vec<PermissionResponse>>, ServerError> {
	let permissions = state
		.permission_repo
		.list_permissions(params.skip.max(0), params.limit.max(0))
		.await?;
	Ok(Json(permissions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/rbac/permissions/{id}",
    params(("id" = i64, Path, description = "Permission id")),
    responses(
        (status = 200, description = "The permission", body = PermissionResponse),
        (status = 404, description = "Permission not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// GET /api/v1/rbac/permissions/{id}
pub async fn get_permission(
	State(state): State<AppState>,
	Path(id): Path<i64>,
) -> Result<Json<PermissionResponse>, ServerError> {
	state
		.permission_repo
		.get_permission(PermissionId::new(id))
		.await?
		.map(|permission| Json(permission.into()))
		.ok_or_else(permission_not_found)
}

#[utoipa::path(
    put,
    path = "/api/v1/rbac/permissions/{id}",
    params(("id" = i64, Path, description = "Permission id")),
    request_body = UpdatePermissionRequest,
    responses(
        (status = 200, description = "Permission updated", body = PermissionResponse),
        (status = 400, description = "Permission with this name already exists", body = ErrorResponse),
        (status = 404, description = "Permission not found", body = ErrorResponse),
        (status = 422, description = "Expression does not parse", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// PUT /api/v1/rbac/permissions/{id} - Partial update; `"expression": null` clears it.
pub async fn update_permission(
	State(state): State<AppState>,
	Path(id): Path<i64>,
	Json(payload): Json<UpdatePermissionRequest>,
) -> Result<Json<PermissionResponse>, ServerError> {
	if let Some(Some(expression)) = &payload.expression {
		validate_expression(expression)?;
	}
	let update = PermissionUpdate {
		name: payload.name,
		description: payload.description,
		resource: payload.resource,
		action: payload.action,
		expression: payload.expression,
	};
	state
		.permission_repo
		.update_permission(PermissionId::new(id), &update)
		.await
		.map_err(name_taken)?
		.map(|permission| Json(permission.into()))
		.ok_or_else(permission_not_found)
}

#[utoipa::path(
    delete,
    path = "/api/v1/rbac/permissions/{id}",
    params(("id" = i64, Path, description = "Permission id")),
    responses(
        (status = 204, description = "Permission deleted"),
        (status = 404, description = "Permission not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "rbac"
)]
/// DELETE /api/v1/rbac/permissions/{id}
pub async fn delete_permission(
	State(state): State<AppState>,
	Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
	if !state
		.permission_repo
		.delete_permission(PermissionId::new(id))
		.await?
	{
		return Err(permission_not_found());
	}
	tracing::info!(permission_id = id, "permission deleted");
	Ok(StatusCode::NO_CONTENT)
}
