// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::sync::Arc;

use axum::{
	middleware::from_fn_with_state,
	routing::{delete, get, post, put},
	Router,
};
use vectix_common_secret::SecretString;
use vectix_server_auth::{AuthorizationGate, PolicyResolver, TokenConfig, TokenIssuer};
use vectix_server_config::{AuthConfig, ServerConfig};
use vectix_server_db::{
	ModuleRepository, PermissionRepository, RoleRepository, RouteRepository, SqlitePool,
	UserRepository,
};

use crate::{
	api_docs, auth_middleware::auth_layer, permission_middleware::RequirePermission, routes,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub user_repo: Arc<UserRepository>,
	pub role_repo: Arc<RoleRepository>,
	pub permission_repo: Arc<PermissionRepository>,
	pub route_repo: Arc<RouteRepository>,
	pub module_repo: Arc<ModuleRepository>,
	pub tokens: Arc<TokenIssuer>,
	pub gate: AuthorizationGate,
	pub auth_config: AuthConfig,
}

/// Build the application state from a migrated pool.
pub fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	let user_repo = Arc::new(UserRepository::new(pool.clone()));
	let role_repo = Arc::new(RoleRepository::new(pool.clone()));
	let permission_repo = Arc::new(PermissionRepository::new(pool.clone()));
	let route_repo = Arc::new(RouteRepository::new(pool.clone()));
	let module_repo = Arc::new(ModuleRepository::new(pool.clone()));

	let secret = config.auth.secret_key.clone().unwrap_or_else(|| {
		tracing::warn!(
			"VECTIX_SERVER_SECRET_KEY not set, signing tokens with a generated key; \
			 tokens will not survive a restart"
		);
		generate_secret()
	});
	let tokens = Arc::new(TokenIssuer::new(TokenConfig::new(
		secret,
		config.auth.access_token_expire_minutes,
		config.auth.refresh_token_expire_days,
	)));

	let gate = AuthorizationGate::new(
		PolicyResolver::new(permission_repo.clone()),
		user_repo.clone(),
	);

	AppState {
		pool,
		user_repo,
		role_repo,
		permission_repo,
		route_repo,
		module_repo,
		tokens,
		gate,
		auth_config: config.auth.clone(),
	}
}

fn generate_secret() -> SecretString {
	SecretString::new(hex::encode(rand::random::<[u8; 32]>()))
}

/// Create the API router with all routes.
pub fn create_router(state: AppState) -> Router {
	let gate = state.gate.clone();
	let require = |resource: &str, action: &str| RequirePermission::new(gate.clone(), resource, action);

	// Public routes - no authentication required
	let public_routes = Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/api/openapi.json", get(api_docs::openapi_json))
		.route("/api/v1/auth/login", post(routes::auth::login))
		.route("/api/v1/auth/refresh", post(routes::auth::refresh))
		.route("/api/v1/auth/register", post(routes::auth::register));

	let user_routes = Router::new()
		.route("/api/v1/users/me", get(routes::users::get_me))
		.route(
			"/api/v1/users",
			get(routes::users::list_users).route_layer(require("users", "read")),
		)
		.route(
			"/api/v1/users",
			post(routes::users::create_user).route_layer(require("users", "create")),
		)
		.route(
			"/api/v1/users/{id}",
			get(routes::users::get_user).route_layer(require("users", "read")),
		)
		.route(
			"/api/v1/users/{user_id}/roles/{role_id}",
			post(routes::users::assign_role).route_layer(require("users", "update")),
		)
		.route(
			"/api/v1/users/{user_id}/roles/{role_id}",
			delete(routes::users::revoke_role).route_layer(require("users", "update")),
		);

	let rbac_routes = Router::new()
		.route(
			"/api/v1/rbac/roles",
			post(routes::rbac::create_role).route_layer(require("roles", "create")),
		)
		.route(
			"/api/v1/rbac/roles",
			get(routes::rbac::list_roles).route_layer(require("roles", "read")),
		)
		.route(
			"/api/v1/rbac/roles/{id}",
			get(routes::rbac::get_role).route_layer(require("roles", "read")),
		)
		.route(
			"/api/v1/rbac/roles/{id}",
			put(routes::rbac::update_role).route_layer(require("roles", "update")),
		)
		.route(
			"/api/v1/rbac/roles/{id}",
			delete(routes::rbac::delete_role).route_layer(require("roles", "delete")),
		)
		.route(
			"/api/v1/rbac/roles/{role_id}/permissions/all",
			get(routes::rbac::list_role_permissions).route_layer(require("roles", "read")),
		)
		.route(
			"/api/v1/rbac/roles/{role_id}/permissions/{permission_id}",
			post(routes::rbac::add_role_permission).route_layer(require("roles", "update")),
		)
		.route(
			"/api/v1/rbac/roles/{role_id}/permissions/{permission_id}",
			delete(routes::rbac::remove_role_permission).route_layer(require("roles", "update")),
		)
		.route(
			"/api/v1/rbac/permissions",
			post(routes::rbac::create_permission).route_layer(require("permissions", "create")),
		)
		.route(
			"/api/v1/rbac/permissions",
			get(routes::rbac::list_permissions).route_layer(require("permissions", "read")),
		)
		.route(
			"/api/v1/rbac/permissions/{id}",
			get(routes::rbac::get_permission).route_layer(require("permissions", "read")),
		)
		.route(
			"/api/v1/rbac/permissions/{id}",
			put(routes::rbac::update_permission).route_layer(require("permissions", "update")),
		)
		.route(
			"/api/v1/rbac/permissions/{id}",
			delete(routes::rbac::delete_permission).route_layer(require("permissions", "delete")),
		);

	// Note: /routes/mine is a static segment and wins over /routes/{id}
	let navigation_routes = Router::new()
		.route(
			"/api/v1/routes",
			post(routes::navigation::create_route).route_layer(require("route", "create")),
		)
		.route(
			"/api/v1/routes",
			get(routes::navigation::list_routes).route_layer(require("route", "read")),
		)
		.route(
			"/api/v1/routes/mine",
			get(routes::navigation::my_routes).route_layer(require("route", "read")),
		)
		.route(
			"/api/v1/routes/{id}",
			get(routes::navigation::get_route).route_layer(require("route", "read")),
		)
		.route(
			"/api/v1/routes/{id}",
			put(routes::navigation::update_route).route_layer(require("route", "update")),
		)
		.route(
			"/api/v1/routes/{id}",
			delete(routes::navigation::delete_route).route_layer(require("route", "delete")),
		);

	let module_routes = Router::new()
		.route(
			"/api/v1/modules",
			post(routes::modules::create_module).route_layer(require("module", "create")),
		)
		.route(
			"/api/v1/modules",
			get(routes::modules::list_modules).route_layer(require("module", "read")),
		)
		.route(
			"/api/v1/modules/{id}",
			get(routes::modules::get_module).route_layer(require("module", "read")),
		)
		.route(
			"/api/v1/modules/{id}",
			put(routes::modules::update_module).route_layer(require("module", "update")),
		)
		.route(
			"/api/v1/modules/{id}",
			delete(routes::modules::delete_module).route_layer(require("module", "delete")),
		)
		.route(
			"/api/v1/sidebar",
			get(routes::modules::get_sidebar).route_layer(require("module", "read")),
		);

	Router::new()
		.merge(public_routes)
		.merge(user_routes)
		.merge(rbac_routes)
		.merge(navigation_routes)
		.merge(module_routes)
		.layer(from_fn_with_state(state.clone(), auth_layer))
		.with_state(state)
}
