// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission repository and the policy lookup the resolver runs per decision.
//!
//! Expressions are stored as JSON text and handed back as [`serde_json::Value`];
//! parsing into an expression tree happens in the auth crate at decision time.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{sqlite::SqlitePool, Row};
use vectix_server_auth::{AuthError, Permission, PermissionId, PolicySource};

use crate::error::{parse_timestamp, DbError};

const PERMISSION_NAME_TAKEN: &str = "Permission with this name already exists";

#[derive(Debug, Clone)]
pub struct NewPermission {
	pub name: String,
	pub description: Option<String>,
	pub resource: String,
	pub action: String,
	pub expression: Option<Value>,
}

/// Partial update for a permission. `None` leaves the field unchanged;
/// `expression: Some(None)` clears the expression, making the grant unconditional.
#[derive(Debug, Clone, Default)]
pub struct PermissionUpdate {
	pub name: Option<String>,
	pub description: Option<String>,
	pub resource: Option<String>,
	pub action: Option<String>,
	pub expression: Option<Option<Value>>,
}

#[async_trait]
pub trait PermissionStore: Send + Sync {
	async fn create_permission(&self, permission: &NewPermission) -> Result<Permission, DbError>;
	async fn get_permission(&self, id: PermissionId) -> Result<Option<Permission>, DbError>;
	async fn list_permissions(&self, skip: i64, limit: i64) -> Result<Vec<Permission>, DbError>;
	async fn update_permission(
		&self,
		id: PermissionId,
		update: &PermissionUpdate,
	) -> Result<Option<Permission>, DbError>;
	async fn delete_permission(&self, id: PermissionId) -> Result<bool, DbError>;
	async fn get_policies(
		&self,
		role_names: &[String],
		resource: &str,
		action: &str,
	) -> Result<Vec<Permission>, DbError>;
}

#[async_trait]
impl PermissionStore for PermissionRepository {
	async fn create_permission(&self, permission: &NewPermission) -> Result<Permission, DbError> {
		self.create_permission(permission).await
	}

	async fn get_permission(&self, id: PermissionId) -> Result<Option<Permission>, DbError> {
		self.get_permission(id).await
	}

	async fn list_permissions(&self, skip: i64, limit: i64) -> Result<Vec<Permission>, DbError> {
		self.list_permissions(skip, limit).await
	}

	async fn update_permission(
		&self,
		id: PermissionId,
		update: &PermissionUpdate,
	) -> Result<Option<Permission>, DbError> {
		self.update_permission(id, update).await
	}

	async fn delete_permission(&self, id: PermissionId) -> Result<bool, DbError> {
		self.delete_permission(id).await
	}

	async fn get_policies(
		&self,
		role_names: &[String],
		resource: &str,
		action: &str,
	) -> Result<Vec<Permission>, DbError> {
		self.get_policies(role_names, resource, action).await
	}
}

#[async_trait]
impl PolicySource for PermissionRepository {
	async fn get_policies(
		&self,
		role_names: &[String],
		resource: &str,
		action: &str,
	) -> Result<Vec<Permission>, AuthError> {
		PermissionRepository::get_policies(self, role_names, resource, action)
			.await
			.map_err(AuthError::from)
	}
}

#[derive(Clone)]
pub struct PermissionRepository {
	pool: SqlitePool,
}

impl PermissionRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// # Errors
	/// `DbError::Conflict` if a permission with the same name exists.
	#[tracing::instrument(skip(self, permission), fields(name = %permission.name, resource = %permission.resource, action = %permission.action))]
	pub async fn create_permission(&self, permission: &NewPermission) -> Result<Permission, DbError> {
		let now = Utc::now().to_rfc3339();
		let expression = encode_expression(permission.expression.as_ref())?;

		let permission_id: i64 = sqlx::query_scalar(
			r#"
			INSERT INTO permissions (
				name, description, resource, action, expression, created_at, updated_at
			) VALUES (?, ?, ?, ?, ?, ?, ?)
			RETURNING permission_id
			"#,
		)
		.bind(&permission.name)
		.bind(&permission.description)
		.bind(&permission.resource)
		.bind(&permission.action)
		.bind(&expression)
		.bind(&now)
		.bind(&now)
		.fetch_one(&self.pool)
		.await
		.map_err(|e| DbError::unique(e, PERMISSION_NAME_TAKEN))?;

		tracing::debug!(permission_id, "permission created");
		self.get_permission(PermissionId::new(permission_id))
			.await?
			.ok_or_else(|| DbError::Internal(format!("permission {permission_id} vanished after insert")))
	}

	#[tracing::instrument(skip(self), fields(permission_id = %id))]
	pub async fn get_permission(&self, id: PermissionId) -> Result<Option<Permission>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT permission_id, name, description, resource, action, expression,
			       created_at, updated_at
			FROM permissions
			WHERE permission_id = ?
			"#,
		)
		.bind(id.get())
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_permission_row).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_permissions(&self, skip: i64, limit: i64) -> Result<Vec<Permission>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT permission_id, name, description, resource, action, expression,
			       created_at, updated_at
			FROM permissions
			ORDER BY permission_id
			LIMIT ? OFFSET ?
			"#,
		)
		.bind(limit)
		.bind(skip)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(parse_permission_row).collect()
	}

	/// Apply a partial update. Returns `None` if the permission does not exist.
	#[tracing::instrument(skip(self, update), fields(permission_id = %id))]
	pub async fn update_permission(
		&self,
		id: PermissionId,
		update: &PermissionUpdate,
	) -> Result<Option<Permission>, DbError> {
		let Some(current) = self.get_permission(id).await? else {
			return Ok(None);
		};

		let expression = match &update.expression {
			Some(expression) => expression.as_ref(),
			None => current.expression.as_ref(),
		};
		let expression = encode_expression(expression)?;

		sqlx::query(
			r#"
			UPDATE permissions
			SET name = ?, description = ?, resource = ?, action = ?, expression = ?,
			    updated_at = ?
			WHERE permission_id = ?
			"#,
		)
		.bind(update.name.as_deref().unwrap_or(&current.name))
		.bind(update.description.as_deref().or(current.description.as_deref()))
		.bind(update.resource.as_deref().unwrap_or(&current.resource))
		.bind(update.action.as_deref().unwrap_or(&current.action))
		.bind(&expression)
		.bind(Utc::now().to_rfc3339())
		.bind(id.get())
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::unique(e, PERMISSION_NAME_TAKEN))?;

		self.get_permission(id).await
	}

	#[tracing::instrument(skip(self), fields(permission_id = %id))]
	pub async fn delete_permission(&self, id: PermissionId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM permissions WHERE permission_id = ?")
			.bind(id.get())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Permissions for `(resource, action)` attached to any role in `role_names`.
	///
	/// Each permission appears once, ordered by `permission_id`, so the resolver's
	/// first-match walk is deterministic.
	#[tracing::instrument(skip(self, role_names), fields(roles = role_names.len()))]
	pub async fn get_policies(
		&self,
		role_names: &[String],
		resource: &str,
		action: &str,
	) -> Result<Vec<Permission>, DbError> {
		if role_names.is_empty() {
			return Ok(Vec::new());
		}

		let placeholders = vec!["?"; role_names.len()].join(", ");
		let sql = format!(
			r#"
			SELECT DISTINCT p.permission_id, p.name, p.description, p.resource, p.action,
			       p.expression, p.created_at, p.updated_at
			FROM permissions p
			JOIN role_permissions rp ON rp.permission_id = p.permission_id
			JOIN roles r ON r.role_id = rp.role_id
			WHERE r.name IN ({placeholders})
			  AND p.resource = ?
			  AND p.action = ?
			ORDER BY p.permission_id
			"#
		);

		let mut query = sqlx::query(&sql);
		for name in role_names {
			query = query.bind(name);
		}
		let rows = query
			.bind(resource)
			.bind(action)
			.fetch_all(&self.pool)
			.await?;

		let policies = rows
			.iter()
			.map(parse_permission_row)
			.collect::<Result<Vec<_>, _>>()?;
		tracing::debug!(count = policies.len(), "policies resolved");
		Ok(policies)
	}
}

fn encode_expression(expression: Option<&Value>) -> Result<Option<String>, DbError> {
	expression
		.map(serde_json::to_string)
		.transpose()
		.map_err(DbError::from)
}

pub(crate) fn parse_permission_row(row: &sqlx::sqlite::SqliteRow) -> Result<Permission, DbError> {
	let expression_json: Option<String> = row.get("expression");
	let created_at_str: String = row.get("created_at");
	let updated_at_str: String = row.get("updated_at");

	let expression = expression_json
		.map(|s| serde_json::from_str::<Value>(&s))
		.transpose()?;

	Ok(Permission {
		permission_id: PermissionId::new(row.get("permission_id")),
		name: row.get("name"),
		description: row.get("description"),
		resource: row.get("resource"),
		action: row.get("action"),
		expression,
		created_at: parse_timestamp(&created_at_str, "created_at")?,
		updated_at: parse_timestamp(&updated_at_str, "updated_at")?,
	})
}
