// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vectix_server_auth::{Actor, RoleRef};
use vectix_server_db::{RoleAssignment, UserWithRoles};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RoleRefResponse {
	pub role_id: i64,
	pub name: String,
}

impl From<&RoleRef> for RoleRefResponse {
	fn from(role: &RoleRef) -> Self {
		Self {
			role_id: role.role_id.get(),
			name: role.name.clone(),
		}
	}
}

/// The public projection of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserResponse {
	pub id: Uuid,
	pub name: String,
	pub phone_number: Option<String>,
	pub email: String,
	pub username: String,
	pub is_active: bool,
	pub is_superuser: bool,
	pub roles: Vec<RoleRefResponse>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<&Actor> for UserResponse {
	fn from(actor: &Actor) -> Self {
		Self {
			id: actor.id.into_inner(),
			name: actor.name.clone(),
			phone_number: actor.phone_number.clone(),
			email: actor.email.clone(),
			username: actor.username.clone(),
			is_active: actor.is_active,
			is_superuser: actor.is_superuser,
			roles: actor.roles.iter().map(RoleRefResponse::from).collect(),
			created_at: actor.created_at,
			updated_at: actor.updated_at,
		}
	}
}

impl From<Actor> for UserResponse {
	fn from(actor: Actor) -> Self {
		Self::from(&actor)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RoleAssignmentResponse {
	pub role_id: i64,
	pub name: String,
	pub is_assigned: bool,
}

impl From<RoleAssignment> for RoleAssignmentResponse {
	fn from(role: RoleAssignment) -> Self {
		Self {
			role_id: role.role_id.get(),
			name: role.name,
			is_assigned: role.is_assigned,
		}
	}
}

/// A user with every known role flagged `is_assigned`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserWithRolesResponse {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	pub username: String,
	pub is_active: bool,
	pub is_superuser: bool,
	pub roles: Vec<RoleAssignmentResponse>,
}

impl From<UserWithRoles> for UserWithRolesResponse {
	fn from(entry: UserWithRoles) -> Self {
		let user = entry.user;
		Self {
			id: user.id.into_inner(),
			name: user.name,
			email: user.email,
			username: user.username,
			is_active: user.is_active,
			is_superuser: user.is_superuser,
			roles: entry.roles.into_iter().map(Into::into).collect(),
		}
	}
}

/// Administrative user creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateUserRequest {
	pub name: String,
	#[serde(default)]
	pub phone_number: Option<String>,
	pub email: String,
	pub username: String,
	pub password: String,
	#[serde(default = "default_true")]
	pub is_active: bool,
	#[serde(default)]
	pub is_superuser: bool,
	#[serde(default)]
	pub role_ids: Vec<i64>,
}

fn default_true() -> bool {
	true
}
