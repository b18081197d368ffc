// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod auth;
pub mod health;
pub mod navigation;
pub mod rbac;
pub mod sidebar;
pub mod users;

pub use auth::{LoginRequest, RefreshRequest, RegisterRequest, TokenResponse};
pub use health::HealthResponse;
pub use navigation::{CreateRouteRequest, MyRoutesParams, RouteResponse, UpdateRouteRequest};
pub use rbac::{
	CreatePermissionRequest, CreateRoleRequest, ListPermissionsParams, ListRolesParams,
	PermissionResponse, PermissionSelectionResponse, RoleResponse, UpdatePermissionRequest,
	UpdateRoleRequest,
};
pub use sidebar::{
	build_sidebar, CreateModuleRequest, ModuleResponse, SidebarModule, SidebarParams, SidebarRole,
	SidebarRoute, UpdateModuleRequest,
};
pub use users::{
	CreateUserRequest, RoleAssignmentResponse, RoleRefResponse, UserResponse,
	UserWithRolesResponse,
};

