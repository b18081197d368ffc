// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role repository and the role↔permission side of the graph.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use vectix_server_auth::{Permission, PermissionId, Role, RoleId};

use crate::error::{parse_timestamp, DbError};
use crate::permission::parse_permission_row;

const ROLE_NAME_TAKEN: &str = "Role with this name already exists";

/// Partial update for a role. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct RoleUpdate {
	pub name: Option<String>,
	pub description: Option<String>,
}

/// A permission annotated with whether a given role carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionSelection {
	pub permission: Permission,
	pub selected: bool,
}

#[async_trait]
pub trait RoleStore: Send + Sync {
	async fn create_role(&self, name: &str, description: Option<&str>) -> Result<Role, DbError>;
	async fn get_role(&self, id: RoleId) -> Result<Option<Role>, DbError>;
	async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>, DbError>;
	async fn list_roles(&self, skip: i64, limit: i64) -> Result<Vec<Role>, DbError>;
	async fn update_role(&self, id: RoleId, update: &RoleUpdate) -> Result<Option<Role>, DbError>;
	async fn delete_role(&self, id: RoleId) -> Result<bool, DbError>;
	async fn add_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<(), DbError>;
	async fn remove_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<(), DbError>;
	async fn list_permissions_for_role(
		&self,
		role_id: RoleId,
	) -> Result<Option<Vec<PermissionSelection>>, DbError>;
	async fn ensure_role(&self, name: &str, description: Option<&str>) -> Result<Role, DbError>;
}

#[async_trait]
impl RoleStore for RoleRepository {
	async fn create_role(&self, name: &str, description: Option<&str>) -> Result<Role, DbError> {
		self.create_role(name, description).await
	}

	async fn get_role(&self, id: RoleId) -> Result<Option<Role>, DbError> {
		self.get_role(id).await
	}

	async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>, DbError> {
		self.get_role_by_name(name).await
	}

	async fn list_roles(&self, skip: i64, limit: i64) -> Result<Vec<Role>, DbError> {
		self.list_roles(skip, limit).await
	}

	async fn update_role(&self, id: RoleId, update: &RoleUpdate) -> Result<Option<Role>, DbError> {
		self.update_role(id, update).await
	}

	async fn delete_role(&self, id: RoleId) -> Result<bool, DbError> {
		self.delete_role(id).await
	}

	async fn add_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<(), DbError> {
		self.add_permission(role_id, permission_id).await
	}

	async fn remove_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<(), DbError> {
		self.remove_permission(role_id, permission_id).await
	}

	async fn list_permissions_for_role(
		&self,
		role_id: RoleId,
	) -> Result<Option<Vec<PermissionSelection>>, DbError> {
		self.list_permissions_for_role(role_id).await
	}

	async fn ensure_role(&self, name: &str, description: Option<&str>) -> Result<Role, DbError> {
		self.ensure_role(name, description).await
	}
}

/// Repository for roles and role↔permission links.
#[derive(Clone)]
pub struct RoleRepository {
	pool: SqlitePool,
}

impl RoleRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// # Errors
	/// `DbError::Conflict` if a role with `name` already exists.
	#[tracing::instrument(skip(self, description))]
	pub async fn create_role(&self, name: &str, description: Option<&str>) -> Result<Role, DbError> {
		let now = Utc::now().to_rfc3339();

		let role_id: i64 = sqlx::query_scalar(
			r#"
			INSERT INTO roles (name, description, created_at, updated_at)
			VALUES (?, ?, ?, ?)
			RETURNING role_id
			"#,
		)
		.bind(name)
		.bind(description)
		.bind(&now)
		.bind(&now)
		.fetch_one(&self.pool)
		.await
		.map_err(|e| DbError::unique(e, ROLE_NAME_TAKEN))?;

		tracing::debug!(role_id, "role created");
		self.get_role(RoleId::new(role_id))
			.await?
			.ok_or_else(|| DbError::Internal(format!("role {role_id} vanished after insert")))
	}

	#[tracing::instrument(skip(self), fields(role_id = %id))]
	pub async fn get_role(&self, id: RoleId) -> Result<Option<Role>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT role_id, name, description, created_at, updated_at
			FROM roles
			WHERE role_id = ?
			"#,
		)
		.bind(id.get())
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_role_row).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT role_id, name, description, created_at, updated_at
			FROM roles
			WHERE name = ?
			"#,
		)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_role_row).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_roles(&self, skip: i64, limit: i64) -> Result<Vec<Role>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT role_id, name, description, created_at, updated_at
			FROM roles
			ORDER BY role_id
			LIMIT ? OFFSET ?
			"#,
		)
		.bind(limit)
		.bind(skip)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(parse_role_row).collect()
	}

	/// Apply a partial update. Returns `None` if the role does not exist.
	///
	/// # Errors
	/// `DbError::Conflict` when renaming onto an existing role name.
	#[tracing::instrument(skip(self, update), fields(role_id = %id))]
	pub async fn update_role(&self, id: RoleId, update: &RoleUpdate) -> Result<Option<Role>, DbError> {
		let Some(current) = self.get_role(id).await? else {
			return Ok(None);
		};

		let name = update.name.as_deref().unwrap_or(&current.name);
		let description = update.description.as_deref().or(current.description.as_deref());

		sqlx::query(
			r#"
			UPDATE roles
			SET name = ?, description = ?, updated_at = ?
			WHERE role_id = ?
			"#,
		)
		.bind(name)
		.bind(description)
		.bind(Utc::now().to_rfc3339())
		.bind(id.get())
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::unique(e, ROLE_NAME_TAKEN))?;

		self.get_role(id).await
	}

	/// Delete a role and, by cascade, its user, permission and route links.
	/// Returns `false` if nothing was deleted.
	#[tracing::instrument(skip(self), fields(role_id = %id))]
	pub async fn delete_role(&self, id: RoleId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM roles WHERE role_id = ?")
			.bind(id.get())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Attach a permission to a role. Already attached is a no-op.
	///
	/// # Errors
	/// `DbError::NotFound` naming whichever side is missing.
	#[tracing::instrument(skip(self), fields(role_id = %role_id, permission_id = %permission_id))]
	pub async fn add_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<(), DbError> {
		self.ensure_link_ends(role_id, permission_id).await?;

		sqlx::query("INSERT OR IGNORE INTO role_permissions (role_id, permission_id) VALUES (?, ?)")
			.bind(role_id.get())
			.bind(permission_id.get())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	/// Detach a permission from a role. Not attached is a no-op.
	#[tracing::instrument(skip(self), fields(role_id = %role_id, permission_id = %permission_id))]
	pub async fn remove_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<(), DbError> {
		self.ensure_link_ends(role_id, permission_id).await?;

		sqlx::query("DELETE FROM role_permissions WHERE role_id = ? AND permission_id = ?")
			.bind(role_id.get())
			.bind(permission_id.get())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	/// Every known permission, flagged `selected` when attached to `role_id`.
	/// `None` if the role does not exist.
	#[tracing::instrument(skip(self), fields(role_id = %role_id))]
	pub async fn list_permissions_for_role(
		&self,
		role_id: RoleId,
	) -> Result<Option<Vec<PermissionSelection>>, DbError> {
		if self.get_role(role_id).await?.is_none() {
			return Ok(None);
		}

		let rows = sqlx::query(
			r#"
			SELECT p.permission_id, p.name, p.description, p.resource, p.action,
			       p.expression, p.created_at, p.updated_at,
			       rp.role_id IS NOT NULL AS selected
			FROM permissions p
			LEFT JOIN role_permissions rp
			       ON rp.permission_id = p.permission_id AND rp.role_id = ?
			ORDER BY p.permission_id
			"#,
		)
		.bind(role_id.get())
		.fetch_all(&self.pool)
		.await?;

		let selections = rows
			.iter()
			.map(|row| {
				Ok(PermissionSelection {
					permission: parse_permission_row(row)?,
					selected: row.get::<i64, _>("selected") != 0,
				})
			})
			.collect::<Result<Vec<_>, DbError>>()?;

		Ok(Some(selections))
	}

	/// Fetch a role by name, creating it if absent.
	#[tracing::instrument(skip(self, description))]
	pub async fn ensure_role(&self, name: &str, description: Option<&str>) -> Result<Role, DbError> {
		if let Some(role) = self.get_role_by_name(name).await? {
			return Ok(role);
		}
		match self.create_role(name, description).await {
			Err(DbError::Conflict(_)) => self
				.get_role_by_name(name)
				.await?
				.ok_or_else(|| DbError::NotFound("Role not found".to_string())),
			other => other,
		}
	}

	async fn ensure_link_ends(&self, role_id: RoleId, permission_id: PermissionId) -> Result<(), DbError> {
		if self.get_role(role_id).await?.is_none() {
			return Err(DbError::NotFound("Role not found".to_string()));
		}

		let exists: Option<i64> =
			sqlx::query_scalar("SELECT permission_id FROM permissions WHERE permission_id = ?")
				.bind(permission_id.get())
				.fetch_optional(&self.pool)
				.await?;
		if exists.is_none() {
			return Err(DbError::NotFound("Permission not found".to_string()));
		}
		Ok(())
	}
}

fn parse_role_row(row: &sqlx::sqlite::SqliteRow) -> Result<Role, DbError> {
	let created_at_str: String = row.get("created_at");
	let updated_at_str: String = row.get("updated_at");

	Ok(Role {
		role_id: RoleId::new(row.get("role_id")),
		name: row.get("name"),
		description: row.get("description"),
		created_at: parse_timestamp(&created_at_str, "created_at")?,
		updated_at: parse_timestamp(&updated_at_str, "updated_at")?,
	})
}
