// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authentication and authorization.
//!
//! - **ID newtypes**: [`UserId`] wraps a UUID; [`RoleId`] and [`PermissionId`]
//!   wrap the integer keys the role/permission graph is stored under.
//! - **Actor**: the authenticated identity ([`Actor`]) with its roles eagerly
//!   loaded. It carries no credentials and doubles as the public projection
//!   returned by the authorization gate.
//! - **Graph records**: [`Role`] and [`Permission`], the rows the policy
//!   resolver reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

macro_rules! define_serial_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(i64);

		impl $name {
			pub fn new(id: i64) -> Self {
				Self(id)
			}

			pub fn get(self) -> i64 {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<i64> for $name {
			fn from(id: i64) -> Self {
				Self(id)
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_serial_id_type!(RoleId, "Storage key of a role.");
define_serial_id_type!(PermissionId, "Storage key of a permission.");

// =============================================================================
// Actor
// =============================================================================

/// A role as attached to an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
	pub role_id: RoleId,
	pub name: String,
}

/// The identity making a request, with roles eagerly loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
	pub id: UserId,
	pub name: String,
	pub phone_number: Option<String>,
	pub email: String,
	pub username: String,
	pub is_active: bool,
	pub is_superuser: bool,
	pub roles: Vec<RoleRef>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Actor {
	pub fn role_names(&self) -> Vec<String> {
		self.roles.iter().map(|r| r.name.clone()).collect()
	}

	pub fn has_role(&self, name: &str) -> bool {
		self.roles.iter().any(|r| r.name == name)
	}

	/// The attributes policy expressions may read under `actor.*`.
	///
	/// Exactly `id`, `name`, `email`, `username`, `is_active`, `is_superuser`
	/// and `roles` (a list of role names). Timestamps and the phone number are
	/// not reachable from expressions.
	pub fn context_value(&self) -> Value {
		json!({
			"id": self.id.to_string(),
			"name": self.name,
			"email": self.email,
			"username": self.username,
			"is_active": self.is_active,
			"is_superuser": self.is_superuser,
			"roles": self.role_names(),
		})
	}
}

// =============================================================================
// Role / Permission graph
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
	pub role_id: RoleId,
	pub name: String,
	pub description: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A `(resource, action, expression?)` rule.
///
/// `expression` is kept in its stored JSON form and parsed fresh for every
/// decision. `None` is an unconditional grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
	pub permission_id: PermissionId,
	pub name: String,
	pub description: Option<String>,
	pub resource: String,
	pub action: String,
	pub expression: Option<Value>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Permission {
	pub fn is_unconditional(&self) -> bool {
		self.expression.is_none()
	}
}
