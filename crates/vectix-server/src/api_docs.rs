// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI documentation for vectix-server, generated with utoipa and served
//! at `/api/openapi.json`.

use axum::Json;
use utoipa::{
	openapi::security::{Http, HttpAuthScheme, SecurityScheme},
	Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vectix Authorization API",
        version = "1.0.0",
        description = "Multi-tenant RBAC and expression-based ABAC: users, roles, permissions and UI route visibility.",
        license(name = "Proprietary")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "health", description = "Health checks"),
        (name = "auth", description = "Login, token refresh and registration"),
        (name = "users", description = "User administration and role assignment"),
        (name = "rbac", description = "Roles, permissions and their links"),
        (name = "routes", description = "UI route visibility by role"),
        (name = "modules", description = "Navigation modules and the sidebar")
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::login,
        crate::routes::auth::refresh,
        crate::routes::auth::register,
        crate::routes::users::get_me,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::create_user,
        crate::routes::users::assign_role,
        crate::routes::users::revoke_role,
        crate::routes::rbac::create_role,
        crate::routes::rbac::list_roles,
        crate::routes::rbac::get_role,
        crate::routes::rbac::update_role,
        crate::routes::rbac::delete_role,
        crate::routes::rbac::list_role_permissions,
        crate::routes::rbac::add_role_permission,
        crate::routes::rbac::remove_role_permission,
        crate::routes::rbac::create_permission,
        crate::routes::rbac::list_permissions,
        crate::routes::rbac::get_permission,
        crate::routes::rbac::update_permission,
        crate::routes::rbac::delete_permission,
        crate::routes::navigation::create_route,
        crate::routes::navigation::list_routes,
        crate::routes::navigation::my_routes,
        crate::routes::navigation::get_route,
        crate::routes::navigation::update_route,
        crate::routes::navigation::delete_route,
        crate::routes::modules::create_module,
        crate::routes::modules::list_modules,
        crate::routes::modules::get_module,
        crate::routes::modules::update_module,
        crate::routes::modules::delete_module,
        crate::routes::modules::get_sidebar,
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            vectix_server_api::HealthResponse,
            vectix_server_api::LoginRequest,
            vectix_server_api::RefreshRequest,
            vectix_server_api::RegisterRequest,
            vectix_server_api::TokenResponse,
            vectix_server_api::UserResponse,
            vectix_server_api::RoleRefResponse,
            vectix_server_api::RoleAssignmentResponse,
            vectix_server_api::UserWithRolesResponse,
            vectix_server_api::CreateUserRequest,
            vectix_server_api::RoleResponse,
            vectix_server_api::CreateRoleRequest,
            vectix_server_api::UpdateRoleRequest,
            vectix_server_api::PermissionResponse,
            vectix_server_api::CreatePermissionRequest,
            vectix_server_api::UpdatePermissionRequest,
            vectix_server_api::PermissionSelectionResponse,
            vectix_server_api::RouteResponse,
            vectix_server_api::CreateRouteRequest,
            vectix_server_api::UpdateRouteRequest,
            vectix_server_api::ModuleResponse,
            vectix_server_api::CreateModuleRequest,
            vectix_server_api::UpdateModuleRequest,
            vectix_server_api::SidebarModule,
            vectix_server_api::SidebarRoute,
            vectix_server_api::SidebarRole,
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
	fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
		if let Some(components) = openapi.components.as_mut() {
			components.add_security_scheme(
				"bearer",
				SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
			);
		}
	}
}

/// GET /api/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
	Json(ApiDoc::openapi())
}
