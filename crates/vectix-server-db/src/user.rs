// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository: accounts, credentials and the user↔role relation.
//!
//! Every read returns an [`Actor`] with its roles eagerly loaded, which is the
//! shape the authorization gate expects.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;
use vectix_server_auth::{Actor, ActorSource, AuthError, RoleId, RoleRef, UserId};

use crate::error::{parse_timestamp, DbError};

/// Input for [`UserRepository::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
	pub name: String,
	pub phone_number: Option<String>,
	pub email: String,
	pub username: String,
	pub hashed_password: String,
	pub is_active: bool,
	pub is_superuser: bool,
	pub role_ids: Vec<RoleId>,
}

/// An actor together with its stored password hash. Only the login path reads this.
#[derive(Debug, Clone)]
pub struct UserCredentials {
	pub actor: Actor,
	pub hashed_password: String,
}

/// One role as seen from a user: every known role, flagged when assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
	pub role_id: RoleId,
	pub name: String,
	pub is_assigned: bool,
}

#[derive(Debug, Clone)]
pub struct UserWithRoles {
	pub user: Actor,
	pub roles: Vec<RoleAssignment>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn create_user(&self, user: &NewUser) -> Result<Actor, DbError>;
	async fn get_actor_by_id(&self, id: &UserId) -> Result<Option<Actor>, DbError>;
	async fn get_actor_by_username(&self, username: &str) -> Result<Option<Actor>, DbError>;
	async fn get_credentials(&self, username: &str) -> Result<Option<UserCredentials>, DbError>;
	async fn list_users_with_role_assignments(&self) -> Result<Vec<UserWithRoles>, DbError>;
	async fn add_role(&self, user_id: &UserId, role_id: RoleId) -> Result<Actor, DbError>;
	async fn remove_role(&self, user_id: &UserId, role_id: RoleId) -> Result<Actor, DbError>;
	async fn set_active(&self, user_id: &UserId, is_active: bool) -> Result<bool, DbError>;
	async fn set_superuser(&self, user_id: &UserId, is_superuser: bool) -> Result<bool, DbError>;
}

#[async_trait]
impl UserStore for UserRepository {
	async fn create_user(&self, user: &NewUser) -> Result<Actor, DbError> {
		self.create_user(user).await
	}

	async fn get_actor_by_id(&self, id: &UserId) -> Result<Option<Actor>, DbError> {
		self.get_actor_by_id(id).await
	}

	async fn get_actor_by_username(&self, username: &str) -> Result<Option<Actor>, DbError> {
		self.get_actor_by_username(username).await
	}

	async fn get_credentials(&self, username: &str) -> Result<Option<UserCredentials>, DbError> {
		self.get_credentials(username).await
	}

	async fn list_users_with_role_assignments(&self) -> Result<Vec<UserWithRoles>, DbError> {
		self.list_users_with_role_assignments().await
	}

	async fn add_role(&self, user_id: &UserId, role_id: RoleId) -> Result<Actor, DbError> {
		self.add_role(user_id, role_id).await
	}

	async fn remove_role(&self, user_id: &UserId, role_id: RoleId) -> Result<Actor, DbError> {
		self.remove_role(user_id, role_id).await
	}

	async fn set_active(&self, user_id: &UserId, is_active: bool) -> Result<bool, DbError> {
		self.set_active(user_id, is_active).await
	}

	async fn set_superuser(&self, user_id: &UserId, is_superuser: bool) -> Result<bool, DbError> {
		self.set_superuser(user_id, is_superuser).await
	}
}

#[async_trait]
impl ActorSource for UserRepository {
	async fn get_actor_by_username(&self, username: &str) -> Result<Option<Actor>, AuthError> {
		UserRepository::get_actor_by_username(self, username)
			.await
			.map_err(AuthError::from)
	}
}

/// Repository for user accounts and their role assignments.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a user and attach `role_ids` in one transaction.
	///
	/// # Errors
	/// - `DbError::Conflict` if the username or email is taken.
	/// - `DbError::NotFound` if any role id does not exist.
	#[tracing::instrument(skip(self, user), fields(username = %user.username))]
	pub async fn create_user(&self, user: &NewUser) -> Result<Actor, DbError> {
		let id = UserId::generate();
		let now = Utc::now().to_rfc3339();

		let mut tx = self.pool.begin().await?;

		sqlx::query(
			r#"
			INSERT INTO users (
				id, name, phone_number, email, username, hashed_password,
				is_active, is_superuser, created_at, updated_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.to_string())
		.bind(&user.name)
		.bind(&user.phone_number)
		.bind(&user.email)
		.bind(&user.username)
		.bind(&user.hashed_password)
		.bind(user.is_active)
		.bind(user.is_superuser)
		.bind(&now)
		.bind(&now)
		.execute(&mut *tx)
		.await
		.map_err(|e| DbError::unique(e, "User with this username or email already exists"))?;

		for role_id in &user.role_ids {
			let exists: Option<i64> = sqlx::query_scalar("SELECT role_id FROM roles WHERE role_id = ?")
				.bind(role_id.get())
				.fetch_optional(&mut *tx)
				.await?;
			if exists.is_none() {
				return Err(DbError::NotFound(format!("Role {role_id} not found")));
			}

			sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)")
				.bind(id.to_string())
				.bind(role_id.get())
				.execute(&mut *tx)
				.await?;
		}

		tx.commit().await?;

		tracing::debug!(user_id = %id, "user created");
		self.get_actor_by_id(&id)
			.await?
			.ok_or_else(|| DbError::Internal(format!("user {id} vanished after insert")))
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_actor_by_id(&self, id: &UserId) -> Result<Option<Actor>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, phone_number, email, username, is_active, is_superuser,
			       created_at, updated_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => Ok(Some(self.actor_from_row(&row).await?)),
			None => Ok(None),
		}
	}

	/// Look up an actor by username, roles included. `None` if no such user.
	#[tracing::instrument(skip(self))]
	pub async fn get_actor_by_username(&self, username: &str) -> Result<Option<Actor>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, phone_number, email, username, is_active, is_superuser,
			       created_at, updated_at
			FROM users
			WHERE username = ?
			"#,
		)
		.bind(username)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => Ok(Some(self.actor_from_row(&row).await?)),
			None => Ok(None),
		}
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_credentials(&self, username: &str) -> Result<Option<UserCredentials>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, phone_number, email, username, hashed_password,
			       is_active, is_superuser, created_at, updated_at
			FROM users
			WHERE username = ?
			"#,
		)
		.bind(username)
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};

		let hashed_password: String = row.get("hashed_password");
		let actor = self.actor_from_row(&row).await?;
		Ok(Some(UserCredentials {
			actor,
			hashed_password,
		}))
	}

	/// Every user, each with every known role flagged `is_assigned`.
	#[tracing::instrument(skip(self))]
	pub async fn list_users_with_role_assignments(&self) -> Result<Vec<UserWithRoles>, DbError> {
		let role_rows = sqlx::query("SELECT role_id, name FROM roles ORDER BY role_id")
			.fetch_all(&self.pool)
			.await?;
		let all_roles: Vec<RoleRef> = role_rows
			.iter()
			.map(|row| RoleRef {
				role_id: RoleId::new(row.get("role_id")),
				name: row.get("name"),
			})
			.collect();

		let user_rows = sqlx::query(
			r#"
			SELECT id, name, phone_number, email, username, is_active, is_superuser,
			       created_at, updated_at
			FROM users
			ORDER BY created_at, username
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		let mut users = Vec::with_capacity(user_rows.len());
		for row in &user_rows {
			let user = self.actor_from_row(row).await?;
			let roles = all_roles
				.iter()
				.map(|role| RoleAssignment {
					role_id: role.role_id,
					name: role.name.clone(),
					is_assigned: user.roles.iter().any(|r| r.role_id == role.role_id),
				})
				.collect();
			users.push(UserWithRoles { user, roles });
		}

		Ok(users)
	}

	/// Assign a role. Assigning a role the user already holds is a no-op.
	///
	/// # Errors
	/// `DbError::NotFound` if either the user or the role is missing.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, role_id = %role_id))]
	pub async fn add_role(&self, user_id: &UserId, role_id: RoleId) -> Result<Actor, DbError> {
		self.ensure_user_and_role(user_id, role_id).await?;

		sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)")
			.bind(user_id.to_string())
			.bind(role_id.get())
			.execute(&self.pool)
			.await?;

		self.touch(user_id).await?;
		self.require_actor(user_id).await
	}

	/// Revoke a role. Revoking a role the user does not hold is a no-op.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, role_id = %role_id))]
	pub async fn remove_role(&self, user_id: &UserId, role_id: RoleId) -> Result<Actor, DbError> {
		self.ensure_user_and_role(user_id, role_id).await?;

		sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role_id = ?")
			.bind(user_id.to_string())
			.bind(role_id.get())
			.execute(&self.pool)
			.await?;

		self.touch(user_id).await?;
		self.require_actor(user_id).await
	}

	/// Returns `false` if the user does not exist.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn set_active(&self, user_id: &UserId, is_active: bool) -> Result<bool, DbError> {
		let result = sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
			.bind(is_active)
			.bind(Utc::now().to_rfc3339())
			.bind(user_id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn set_superuser(&self, user_id: &UserId, is_superuser: bool) -> Result<bool, DbError> {
		let result = sqlx::query("UPDATE users SET is_superuser = ?, updated_at = ? WHERE id = ?")
			.bind(is_superuser)
			.bind(Utc::now().to_rfc3339())
			.bind(user_id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	async fn ensure_user_and_role(&self, user_id: &UserId, role_id: RoleId) -> Result<(), DbError> {
		let found: i64 = sqlx::query_scalar(
			r#"
			SELECT (SELECT COUNT(*) FROM users WHERE id = ?)
			     + (SELECT COUNT(*) FROM roles WHERE role_id = ?)
			"#,
		)
		.bind(user_id.to_string())
		.bind(role_id.get())
		.fetch_one(&self.pool)
		.await?;

		if found < 2 {
			return Err(DbError::NotFound("User or Role not found".to_string()));
		}
		Ok(())
	}

	async fn touch(&self, user_id: &UserId) -> Result<(), DbError> {
		sqlx::query("UPDATE users SET updated_at = ? WHERE id = ?")
			.bind(Utc::now().to_rfc3339())
			.bind(user_id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	async fn require_actor(&self, user_id: &UserId) -> Result<Actor, DbError> {
		self.get_actor_by_id(user_id)
			.await?
			.ok_or_else(|| DbError::NotFound("User or Role not found".to_string()))
	}

	async fn roles_for(&self, user_id: &str) -> Result<Vec<RoleRef>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT r.role_id, r.name
			FROM roles r
			JOIN user_roles ur ON ur.role_id = r.role_id
			WHERE ur.user_id = ?
			ORDER BY r.role_id
			"#,
		)
		.bind(user_id)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows
			.iter()
			.map(|row| RoleRef {
				role_id: RoleId::new(row.get("role_id")),
				name: row.get("name"),
			})
			.collect())
	}

	async fn actor_from_row(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Actor, DbError> {
		let id_str: String = row.get("id");
		let roles = self.roles_for(&id_str).await?;
		parse_actor_row(row, roles)
	}
}

fn parse_actor_row(row: &sqlx::sqlite::SqliteRow, roles: Vec<RoleRef>) -> Result<Actor, DbError> {
	let id_str: String = row.get("id");
	let created_at_str: String = row.get("created_at");
	let updated_at_str: String = row.get("updated_at");

	let id = Uuid::parse_str(&id_str)
		.map_err(|e| DbError::Internal(format!("Invalid user id UUID: {e}")))?;

	Ok(Actor {
		id: UserId::new(id),
		name: row.get("name"),
		phone_number: row.get("phone_number"),
		email: row.get("email"),
		username: row.get("username"),
		is_active: row.get("is_active"),
		is_superuser: row.get("is_superuser"),
		roles,
		created_at: parse_timestamp(&created_at_str, "created_at")?,
		updated_at: parse_timestamp(&updated_at_str, "updated_at")?,
	})
}
