// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Navigation module repository. A module groups UI routes into one sidebar
//! section; routes point at it through `routes.module_id`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::{parse_timestamp, DbError};

const MODULE_NAME_TAKEN: &str = "Module with this name already exists";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
	pub id: i64,
	pub name: String,
	pub label: String,
	pub icon: Option<String>,
	pub is_active: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewModule {
	pub name: String,
	pub label: String,
	pub icon: Option<String>,
	pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleUpdate {
	pub name: Option<String>,
	pub label: Option<String>,
	pub icon: Option<String>,
	pub is_active: Option<bool>,
}

#[async_trait]
pub trait ModuleStore: Send + Sync {
	async fn create_module(&self, module: &NewModule) -> Result<Module, DbError>;
	async fn get_module(&self, id: i64) -> Result<Option<Module>, DbError>;
	async fn list_modules(&self) -> Result<Vec<Module>, DbError>;
	async fn update_module(&self, id: i64, update: &ModuleUpdate) -> Result<Option<Module>, DbError>;
	async fn delete_module(&self, id: i64) -> Result<bool, DbError>;
}

#[async_trait]
impl ModuleStore for ModuleRepository {
	async fn create_module(&self, module: &NewModule) -> Result<Module, DbError> {
		self.create_module(module).await
	}

	async fn get_module(&self, id: i64) -> Result<Option<Module>, DbError> {
		self.get_module(id).await
	}

	async fn list_modules(&self) -> Result<Vec<Module>, DbError> {
		self.list_modules().await
	}

	async fn update_module(&self, id: i64, update: &ModuleUpdate) -> Result<Option<Module>, DbError> {
		self.update_module(id, update).await
	}

	async fn delete_module(&self, id: i64) -> Result<bool, DbError> {
		self.delete_module(id).await
	}
}

#[derive(Clone)]
pub struct ModuleRepository {
	pool: SqlitePool,
}

impl ModuleRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// # Errors
	/// - `DbError::Conflict` if the name is taken.
	#[tracing::instrument(skip(self, module), fields(name = %module.name))]
	pub async fn create_module(&self, module: &NewModule) -> Result<Module, DbError> {
		let now = Utc::now().to_rfc3339();

		let id: i64 = sqlx::query_scalar(
			r#"
			INSERT INTO modules (name, label, icon, is_active, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
			RETURNING id
			"#,
		)
		.bind(&module.name)
		.bind(&module.label)
		.bind(&module.icon)
		.bind(module.is_active)
		.bind(&now)
		.bind(&now)
		.fetch_one(&self.pool)
		.await
		.map_err(|e| DbError::unique(e, MODULE_NAME_TAKEN))?;

		tracing::debug!(module_id = id, "module created");
		self.get_module(id)
			.await?
			.ok_or_else(|| DbError::Internal(format!("module {id} vanished after insert")))
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_module(&self, id: i64) -> Result<Option<Module>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, label, icon, is_active, created_at, updated_at
			FROM modules
			WHERE id = ?
			"#,
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_module_row).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_modules(&self) -> Result<Vec<Module>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, label, icon, is_active, created_at, updated_at
			FROM modules
			ORDER BY id
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(parse_module_row).collect()
	}

	/// Apply a partial update. Returns `None` if the module does not exist.
	#[tracing::instrument(skip(self, update))]
	pub async fn update_module(&self, id: i64, update: &ModuleUpdate) -> Result<Option<Module>, DbError> {
		let Some(current) = self.get_module(id).await? else {
			return Ok(None);
		};

		sqlx::query(
			r#"
			UPDATE modules
			SET name = ?, label = ?, icon = ?, is_active = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(update.name.as_deref().unwrap_or(&current.name))
		.bind(update.label.as_deref().unwrap_or(&current.label))
		.bind(update.icon.as_deref().or(current.icon.as_deref()))
		.bind(update.is_active.unwrap_or(current.is_active))
		.bind(Utc::now().to_rfc3339())
		.bind(id)
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::unique(e, MODULE_NAME_TAKEN))?;

		self.get_module(id).await
	}

	/// Delete a module. Its routes stay and lose their module link.
	#[tracing::instrument(skip(self))]
	pub async fn delete_module(&self, id: i64) -> Result<bool, DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query("UPDATE routes SET module_id = NULL WHERE module_id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await?;
		let result = sqlx::query("DELETE FROM modules WHERE id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		Ok(result.rows_affected() > 0)
	}
}

fn parse_module_row(row: &sqlx::sqlite::SqliteRow) -> Result<Module, DbError> {
	let created_at_str: String = row.get("created_at");
	let updated_at_str: String = row.get("updated_at");

	Ok(Module {
		id: row.get("id"),
		name: row.get("name"),
		label: row.get("label"),
		icon: row.get("icon"),
		is_active: row.get("is_active"),
		created_at: parse_timestamp(&created_at_str, "created_at")?,
		updated_at: parse_timestamp(&updated_at_str, "updated_at")?,
	})
}
