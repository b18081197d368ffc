// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use vectix_server_auth::{Permission, Role};
use vectix_server_db::PermissionSelection;

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RoleResponse {
	pub role_id: i64,
	pub name: String,
	pub description: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<Role> for RoleResponse {
	fn from(role: Role) -> Self {
		Self {
			role_id: role.role_id.get(),
			name: role.name,
			description: role.description,
			created_at: role.created_at,
			updated_at: role.updated_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateRoleRequest {
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
}

/// Partial role update; omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateRoleRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PermissionResponse {
	pub permission_id: i64,
	pub name: String,
	pub description: Option<String>,
	pub resource: String,
	pub action: String,
	/// Stored expression tree, or `null` for an unconditional grant.
	#[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
	pub expression: Option<Value>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<Permission> for PermissionResponse {
	fn from(permission: Permission) -> Self {
		Self {
			permission_id: permission.permission_id.get(),
			name: permission.name,
			description: permission.description,
			resource: permission.resource,
			action: permission.action,
			expression: permission.expression,
			created_at: permission.created_at,
			updated_at: permission.updated_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreatePermissionRequest {
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	pub resource: String,
	pub action: String,
	#[serde(default)]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
	pub expression: Option<Value>,
}

/// Partial permission update.
///
/// `expression` distinguishes absent (unchanged) from explicit `null`
/// (cleared, making the grant unconditional).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdatePermissionRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub resource: Option<String>,
	#[serde(default)]
	pub action: Option<String>,
	#[serde(default, deserialize_with = "present")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
	pub expression: Option<Option<Value>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<Value>>, D::Error>
where
	D: Deserializer<'de>,
{
	Option::<Value>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PermissionSelectionResponse {
	#[serde(flatten)]
	pub permission: PermissionResponse,
	pub selected: bool,
}

impl From<PermissionSelection> for PermissionSelectionResponse {
	fn from(selection: PermissionSelection) -> Self {
		Self {
			permission: selection.permission.into(),
			selected: selection.selected,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListRolesParams {
	#[serde(default)]
	pub skip: i64,
	#[serde(default = "default_role_limit")]
	pub limit: i64,
}

fn default_role_limit() -> i64 {
	100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListPermissionsParams {
	#[serde(default)]
	pub skip: i64,
	#[serde(default = "default_permission_limit")]
	pub limit: i64,
}

fn default_permission_limit() -> i64 {
	300
}
