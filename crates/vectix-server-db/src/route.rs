// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! UI route repository. Routes are linked to roles to decide which navigation
//! entries a user sees; they play no part in permission decisions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row, Sqlite, Transaction};
use vectix_server_auth::RoleId;

use crate::error::{parse_timestamp, DbError};

const ROUTE_PATH_TAKEN: &str = "Route with this path already exists";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
	pub id: i64,
	pub path: String,
	pub label: String,
	pub icon: Option<String>,
	pub is_active: bool,
	pub is_sidebar: bool,
	pub module_id: Option<i64>,
	pub parent_id: Option<i64>,
	pub role_ids: Vec<RoleId>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRoute {
	pub path: String,
	pub label: String,
	pub icon: Option<String>,
	pub is_active: bool,
	pub is_sidebar: bool,
	pub module_id: Option<i64>,
	pub parent_id: Option<i64>,
	pub role_ids: Vec<RoleId>,
}

/// Partial update. `role_ids: Some(..)` replaces the whole role set.
#[derive(Debug, Clone, Default)]
pub struct RouteUpdate {
	pub path: Option<String>,
	pub label: Option<String>,
	pub icon: Option<String>,
	pub is_active: Option<bool>,
	pub is_sidebar: Option<bool>,
	pub module_id: Option<i64>,
	pub parent_id: Option<i64>,
	pub role_ids: Option<Vec<RoleId>>,
}

/// Optional flags narrowing [`RouteRepository::list_for_role_ids`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteFilter {
	pub is_active: Option<bool>,
	pub is_sidebar: Option<bool>,
}

#[async_trait]
pub trait RouteStore: Send + Sync {
	async fn create_route(&self, route: &NewRoute) -> Result<Route, DbError>;
	async fn get_route(&self, id: i64) -> Result<Option<Route>, DbError>;
	async fn list_routes(&self) -> Result<Vec<Route>, DbError>;
	async fn update_route(&self, id: i64, update: &RouteUpdate) -> Result<Option<Route>, DbError>;
	async fn delete_route(&self, id: i64) -> Result<bool, DbError>;
	async fn list_for_role_ids(&self, role_ids: &[RoleId], filter: RouteFilter) -> Result<Vec<Route>, DbError>;
}

#[async_trait]
impl RouteStore for RouteRepository {
	async fn create_route(&self, route: &NewRoute) -> Result<Route, DbError> {
		self.create_route(route).await
	}

	async fn get_route(&self, id: i64) -> Result<Option<Route>, DbError> {
		self.get_route(id).await
	}

	async fn list_routes(&self) -> Result<Vec<Route>, DbError> {
		self.list_routes().await
	}

	async fn update_route(&self, id: i64, update: &RouteUpdate) -> Result<Option<Route>, DbError> {
		self.update_route(id, update).await
	}

	async fn delete_route(&self, id: i64) -> Result<bool, DbError> {
		self.delete_route(id).await
	}

	async fn list_for_role_ids(&self, role_ids: &[RoleId], filter: RouteFilter) -> Result<Vec<Route>, DbError> {
		self.list_for_role_ids(role_ids, filter).await
	}
}

#[derive(Clone)]
pub struct RouteRepository {
	pool: SqlitePool,
}

impl RouteRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// # Errors
	/// - `DbError::Conflict` if the path is taken.
	/// - `DbError::NotFound` if a role id or the module does not exist.
	#[tracing::instrument(skip(self, route), fields(path = %route.path))]
	pub async fn create_route(&self, route: &NewRoute) -> Result<Route, DbError> {
		let now = Utc::now().to_rfc3339();
		let mut tx = self.pool.begin().await?;

		if let Some(module_id) = route.module_id {
			ensure_module(&mut tx, module_id).await?;
		}

		let id: i64 = sqlx::query_scalar(
			r#"
			INSERT INTO routes (
				path, label, icon, is_active, is_sidebar, module_id, parent_id,
				created_at, updated_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
			RETURNING id
			"#,
		)
		.bind(&route.path)
		.bind(&route.label)
		.bind(&route.icon)
		.bind(route.is_active)
		.bind(route.is_sidebar)
		.bind(route.module_id)
		.bind(route.parent_id)
		.bind(&now)
		.bind(&now)
		.fetch_one(&mut *tx)
		.await
		.map_err(|e| DbError::unique(e, ROUTE_PATH_TAKEN))?;

		replace_roles(&mut tx, id, &route.role_ids).await?;
		tx.commit().await?;

		tracing::debug!(route_id = id, "route created");
		self.get_route(id)
			.await?
			.ok_or_else(|| DbError::Internal(format!("route {id} vanished after insert")))
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_route(&self, id: i64) -> Result<Option<Route>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, path, label, icon, is_active, is_sidebar, module_id, parent_id,
			       created_at, updated_at
			FROM routes
			WHERE id = ?
			"#,
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => Ok(Some(self.route_from_row(&row).await?)),
			None => Ok(None),
		}
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_routes(&self) -> Result<Vec<Route>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, path, label, icon, is_active, is_sidebar, module_id, parent_id,
			       created_at, updated_at
			FROM routes
			ORDER BY id
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		let mut routes = Vec::with_capacity(rows.len());
		for row in &rows {
			routes.push(self.route_from_row(row).await?);
		}
		Ok(routes)
	}

	/// Apply a partial update. Returns `None` if the route does not exist.
	#[tracing::instrument(skip(self, update))]
	pub async fn update_route(&self, id: i64, update: &RouteUpdate) -> Result<Option<Route>, DbError> {
		let Some(current) = self.get_route(id).await? else {
			return Ok(None);
		};

		let mut tx = self.pool.begin().await?;

		if let Some(module_id) = update.module_id {
			ensure_module(&mut tx, module_id).await?;
		}

		sqlx::query(
			r#"
			UPDATE routes
			SET path = ?, label = ?, icon = ?, is_active = ?, is_sidebar = ?,
			    module_id = ?, parent_id = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(update.path.as_deref().unwrap_or(&current.path))
		.bind(update.label.as_deref().unwrap_or(&current.label))
		.bind(update.icon.as_deref().or(current.icon.as_deref()))
		.bind(update.is_active.unwrap_or(current.is_active))
		.bind(update.is_sidebar.unwrap_or(current.is_sidebar))
		.bind(update.module_id.or(current.module_id))
		.bind(update.parent_id.or(current.parent_id))
		.bind(Utc::now().to_rfc3339())
		.bind(id)
		.execute(&mut *tx)
		.await
		.map_err(|e| DbError::unique(e, ROUTE_PATH_TAKEN))?;

		if let Some(role_ids) = &update.role_ids {
			sqlx::query("DELETE FROM route_roles WHERE route_id = ?")
				.bind(id)
				.execute(&mut *tx)
				.await?;
			replace_roles(&mut tx, id, role_ids).await?;
		}

		tx.commit().await?;
		self.get_route(id).await
	}

	#[tracing::instrument(skip(self))]
	pub async fn delete_route(&self, id: i64) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM routes WHERE id = ?")
			.bind(id)
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Routes linked to any of `role_ids`, each once, ordered by id.
	#[tracing::instrument(skip(self, role_ids), fields(roles = role_ids.len()))]
	pub async fn list_for_role_ids(&self, role_ids: &[RoleId], filter: RouteFilter) -> Result<Vec<Route>, DbError> {
		if role_ids.is_empty() {
			return Ok(Vec::new());
		}

		let placeholders = vec!["?"; role_ids.len()].join(", ");
		let mut sql = format!(
			r#"
			SELECT DISTINCT r.id, r.path, r.label, r.icon, r.is_active, r.is_sidebar,
			       r.module_id, r.parent_id, r.created_at, r.updated_at
			FROM routes r
			JOIN route_roles rr ON rr.route_id = r.id
			WHERE rr.role_id IN ({placeholders})
			"#
		);
		if filter.is_active.is_some() {
			sql.push_str(" AND r.is_active = ?");
		}
		if filter.is_sidebar.is_some() {
			sql.push_str(" AND r.is_sidebar = ?");
		}
		sql.push_str(" ORDER BY r.id");

		let mut query = sqlx::query(&sql);
		for role_id in role_ids {
			query = query.bind(role_id.get());
		}
		if let Some(is_active) = filter.is_active {
			query = query.bind(is_active);
		}
		if let Some(is_sidebar) = filter.is_sidebar {
			query = query.bind(is_sidebar);
		}

		let rows = query.fetch_all(&self.pool).await?;
		let mut routes = Vec::with_capacity(rows.len());
		for row in &rows {
			routes.push(self.route_from_row(row).await?);
		}
		Ok(routes)
	}

	async fn route_from_row(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Route, DbError> {
		let id: i64 = row.get("id");
		let role_ids: Vec<i64> =
			sqlx::query_scalar("SELECT role_id FROM route_roles WHERE route_id = ? ORDER BY role_id")
				.bind(id)
				.fetch_all(&self.pool)
				.await?;
		parse_route_row(row, role_ids.into_iter().map(RoleId::new).collect())
	}
}

async fn ensure_module(tx: &mut Transaction<'_, Sqlite>, module_id: i64) -> Result<(), DbError> {
	let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM modules WHERE id = ?")
		.bind(module_id)
		.fetch_optional(&mut **tx)
		.await?;
	match exists {
		Some(_) => Ok(()),
		None => Err(DbError::NotFound(format!("Module {module_id} not found"))),
	}
}

async fn replace_roles(
	tx: &mut Transaction<'_, Sqlite>,
	route_id: i64,
	role_ids: &[RoleId],
) -> Result<(), DbError> {
	for role_id in role_ids {
		let exists: Option<i64> = sqlx::query_scalar("SELECT role_id FROM roles WHERE role_id = ?")
			.bind(role_id.get())
			.fetch_optional(&mut **tx)
			.await?;
		if exists.is_none() {
			return Err(DbError::NotFound(format!("Role {role_id} not found")));
		}

		sqlx::query("INSERT OR IGNORE INTO route_roles (route_id, role_id) VALUES (?, ?)")
			.bind(route_id)
			.bind(role_id.get())
			.execute(&mut **tx)
			.await?;
	}
	Ok(())
}

fn parse_route_row(row: &sqlx::sqlite::SqliteRow, role_ids: Vec<RoleId>) -> Result<Route, DbError> {
	let created_at_str: String = row.get("created_at");
	let updated_at_str: String = row.get("updated_at");

	Ok(Route {
		id: row.get("id"),
		path: row.get("path"),
		label: row.get("label"),
		icon: row.get("icon"),
		is_active: row.get("is_active"),
		is_sidebar: row.get("is_sidebar"),
		module_id: row.get("module_id"),
		parent_id: row.get("parent_id"),
		role_ids,
		created_at: parse_timestamp(&created_at_str, "created_at")?,
		updated_at: parse_timestamp(&updated_at_str, "updated_at")?,
	})
}
