// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! UI route visibility. A route is shown to callers holding any of its roles.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	Json,
};
use vectix_server_api::{CreateRouteRequest, MyRoutesParams, RouteResponse, UpdateRouteRequest};
use vectix_server_auth::RoleId;
use vectix_server_db::{NewRoute, RouteFilter, RouteUpdate};

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::{ErrorResponse, ServerError},
};

fn route_not_found() -> ServerError {
	ServerError::NotFound("Route not found".to_string())
}

fn role_ids(ids: Vec<i64>) -> Vec<RoleId> {
	ids.into_iter().map(RoleId::new).collect()
}

#[utoipa::path(
    post,
    path = "/api/v1/routes",
    request_body = CreateRouteRequest,
    responses(
        (status = 201, description = "Route created", body = RouteResponse),
        (status = 404, description = "Role not found", body = ErrorResponse),
        (status = 409, description = "Route with this path already exists", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "routes"
)]
/// POST /api/v1/routes
pub async fn create_route(
	State(state): State<AppState>,
	Json(payload): Json<CreateRouteRequest>,
) -> Result<(StatusCode, Json<RouteResponse>), ServerError> {
	if payload.path.trim().is_empty() {
		return Err(ServerError::Validation("Route path must not be empty".to_string()));
	}
	let route = state
		.route_repo
		.create_route(&NewRoute {
			path: payload.path,
			label: payload.label,
			icon: payload.icon,
			is_active: payload.is_active,
			is_sidebar: payload.is_sidebar,
			module_id: payload.module_id,
			parent_id: payload.parent_id,
			role_ids: role_ids(payload.role_ids),
		})
		.await?;
	tracing::info!(route_id = route.id, path = %route.path, "route created");
	Ok((StatusCode::CREATED, Json(route.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/routes",
    responses(
        (status = 200, description = "Every route", body = Vec<RouteResponse>)
    ),
    security(("bearer" = [])),
    tag = "routes"
)]
/// GET /api/v1/routes
pub async fn list_routes(
	State(state): State<AppState>,
) -> Result<Json<Vec<RouteResponse>>, ServerError> {
	let routes = state.route_repo.list_routes().await?;
	Ok(Json(routes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/routes/mine",
    params(MyRoutesParams),
    responses(
        (status = 200, description = "Routes visible to the caller", body = Vec<RouteResponse>)
    ),
    security(("bearer" = [])),
    tag = "routes"
)]
/// GET /api/v1/routes/mine - Routes linked to any of the caller's roles.
pub async fn my_routes(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Query(params): Query<MyRoutesParams>,
) -> Result<Json<Vec<RouteResponse>>, ServerError> {
	let caller_roles: Vec<RoleId> = current_user
		.actor
		.roles
		.iter()
		.map(|role| role.role_id)
		.collect();
	let filter = RouteFilter {
		is_active: params.is_active,
		is_sidebar: params.is_sidebar,
	};
	let routes = state
		.route_repo
		.list_for_role_ids(&caller_roles, filter)
		.await?;
	Ok(Json(routes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/routes/{id}",
    params(("id" = i64, Path, description = "Route id")),
    responses(
        (status = 200, description = "The route", body = RouteResponse),
        (status = 404, description = "Route not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "routes"
)]
/// GET /api/v1/routes/{id}
pub async fn get_route(
	State(state): State<AppState>,
	Path(id): Path<i64>,
) -> Result<Json<RouteResponse>, ServerError> {
	state
		.route_repo
		.get_route(id)
		.await?
		.map(|route| Json(route.into()))
		.ok_or_else(route_not_found)
}

#[utoipa::path(
    put,
    path = "/api/v1/routes/{id}",
    params(("id" = i64, Path, description = "Route id")),
    request_body = UpdateRouteRequest,
    responses(
        (status = 200, description = "Route updated", body = RouteResponse),
        (status = 404, description = "Route not found", body = ErrorResponse),
        (status = 409, description = "Route with this path already exists", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "routes"
)]
/// PUT /api/v1/routes/{id} - Partial update; `role_ids` replaces the set when given.
pub async fn update_route(
	State(state): State<AppState>,
	Path(id): Path<i64>,
	Json(payload): Json<UpdateRouteRequest>,
) -> Result<Json<RouteResponse>, ServerError> {
	let update = RouteUpdate {
		path: payload.path,
		label: payload.label,
		icon: payload.icon,
		is_active: payload.is_active,
		is_sidebar: payload.is_sidebar,
		module_id: payload.module_id,
		parent_id: payload.parent_id,
		role_ids: payload.role_ids.map(role_ids),
	};
	state
		.route_repo
		.update_route(id, &update)
		.await?
		.map(|route| Json(route.into()))
		.ok_or_else(route_not_found)
}

#[utoipa::path(
    delete,
    path = "/api/v1/routes/{id}",
    params(("id" = i64, Path, description = "Route id")),
    responses(
        (status = 204, description = "Route deleted"),
        (status = 404, description = "Route not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "routes"
)]
/// DELETE /api/v1/routes/{id}
pub async fn delete_route(
	State(state): State<AppState>,
	Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
	if !state.route_repo.delete_route(id).await? {
		return Err(route_not_found());
	}
	tracing::info!(route_id = id, "route deleted");
	Ok(StatusCode::NO_CONTENT)
}
