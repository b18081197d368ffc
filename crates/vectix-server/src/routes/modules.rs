// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Navigation modules and the sidebar assembled from them.

use std::collections::HashMap;

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	Json,
};
use vectix_server_api::{
	build_sidebar, CreateModuleRequest, ModuleResponse, SidebarModule, SidebarParams,
	UpdateModuleRequest,
};
use vectix_server_db::{ModuleUpdate, NewModule, RouteFilter};

use crate::{
	api::AppState,
	error::{ErrorResponse, ServerError},
};

fn module_not_found() -> ServerError {
	ServerError::NotFound("Module not found".to_string())
}

#[utoipa::path(
    post,
    path = "/api/v1/modules",
    request_body = CreateModuleRequest,
    responses(
        (status = 201, description = "Module created", body = ModuleResponse),
        (status = 409, description = "Module with this name already exists", body = ErrorResponse),
        (status = 422, description = "Blank name", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "modules"
)]
/// POST /api/v1/modules
pub async fn create_module(
	State(state): State<AppState>,
	Json(payload): Json<CreateModuleRequest>,
) -> Result<(StatusCode, Json<ModuleResponse>), ServerError> {
	if payload.name.trim().is_empty() {
		return Err(ServerError::Validation("Module name must not be empty".to_string()));
	}
	let module = state
		.module_repo
		.create_module(&NewModule {
			name: payload.name,
			label: payload.label,
			icon: payload.icon,
			is_active: payload.is_active,
		})
		.await?;
	tracing::info!(module_id = module.id, name = %module.name, "module created");
	Ok((StatusCode::CREATED, Json(module.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/modules",
    responses(
        (status = 200, description = "Every module", body = Vec<ModuleResponse>)
    ),
    security(("bearer" = [])),
    tag = "modules"
)]
/// GET /api/v1/modules
pub async fn list_modules(
	State(state): State<AppState>,
) -> Result<Json<Vec<ModuleResponse>>, ServerError> {
	let modules = state.module_repo.list_modules().await?;
	Ok(Json(modules.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/modules/{id}",
    params(("id" = i64, Path, description = "Module id")),
    responses(
        (status = 200, description = "The module", body = ModuleResponse),
        (status = 404, description = "Module not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "modules"
)]
/// GET /api/v1/modules/{id}
pub async fn get_module(
	State(state): State<AppState>,
	Path(id): Path<i64>,
) -> Result<Json<ModuleResponse>, ServerError> {
	state
		.module_repo
		.get_module(id)
		.await?
		.map(|module| Json(module.into()))
		.ok_or_else(module_not_found)
}

#[utoipa::path(
    put,
    path = "/api/v1/modules/{id}",
    params(("id" = i64, Path, description = "Module id")),
    request_body = UpdateModuleRequest,
    responses(
        (status = 200, description = "Module updated", body = ModuleResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 409, description = "Module with this name already exists", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "modules"
)]
/// PUT /api/v1/modules/{id}
pub async fn update_module(
	State(state): State<AppState>,
	Path(id): Path<i64>,
	Json(payload): Json<UpdateModuleRequest>,
) -> Result<Json<ModuleResponse>, ServerError> {
	let update = ModuleUpdate {
		name: payload.name,
		label: payload.label,
		icon: payload.icon,
		is_active: payload.is_active,
	};
	state
		.module_repo
		.update_module(id, &update)
		.await?
		.map(|module| Json(module.into()))
		.ok_or_else(module_not_found)
}

#[utoipa::path(
    delete,
    path = "/api/v1/modules/{id}",
    params(("id" = i64, Path, description = "Module id")),
    responses(
        (status = 204, description = "Module deleted; its routes are kept without a module"),
        (status = 404, description = "Module not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "modules"
)]
/// DELETE /api/v1/modules/{id}
pub async fn delete_module(
	State(state): State<AppState>,
	Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
	if !state.module_repo.delete_module(id).await? {
		return Err(module_not_found());
	}
	tracing::info!(module_id = id, "module deleted");
	Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/sidebar",
    params(SidebarParams),
    responses(
        (status = 200, description = "Modules with their nested routes", body = Vec<SidebarModule>),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "modules"
)]
/// GET /api/v1/sidebar - Every module with its routes nested by parent.
///
/// With `role`, only that role's sidebar routes are listed and empty modules
/// are dropped. `is_active` filters routes either way.
pub async fn get_sidebar(
	State(state): State<AppState>,
	Query(params): Query<SidebarParams>,
) -> Result<Json<Vec<SidebarModule>>, ServerError> {
	let routes = match params.role.as_deref() {
		Some(name) => {
			let role = state
				.role_repo
				.get_role_by_name(name)
				.await?
				.ok_or_else(|| ServerError::NotFound("Role not found".to_string()))?;
			let filter = RouteFilter {
				is_active: params.is_active,
				is_sidebar: Some(true),
			};
			state
				.route_repo
				.list_for_role_ids(&[role.role_id], filter)
				.await?
		}
		None => {
			let mut routes = state.route_repo.list_routes().await?;
			if let Some(is_active) = params.is_active {
				routes.retain(|route| route.is_active == is_active);
			}
			routes
		}
	};

	let role_names: HashMap<_, _> = state
		.role_repo
		.list_roles(0, i64::MAX)
		.await?
		.into_iter()
		.map(|role| (role.role_id, role.name))
		.collect();
	let modules = state.module_repo.list_modules().await?;

	Ok(Json(build_sidebar(
		modules,
		routes,
		&role_names,
		params.role.is_some(),
	)))
}
