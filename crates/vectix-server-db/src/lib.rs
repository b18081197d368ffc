// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the Vectix authorization server.
//!
//! Repositories follow one shape: a `*Store` trait for consumers that want to
//! mock storage, and a `*Repository` wrapping a [`SqlitePool`] whose inherent
//! methods do the work. [`UserRepository`] and [`PermissionRepository`] also
//! implement the auth crate's [`ActorSource`](vectix_server_auth::ActorSource)
//! and [`PolicySource`](vectix_server_auth::PolicySource).

pub mod error;
pub mod migrations;
pub mod module;
pub mod permission;
pub mod pool;
pub mod role;
pub mod route;
pub mod testing;
pub mod user;

pub use error::{DbError, Result};
pub use migrations::run_migrations;
pub use module::{Module, ModuleRepository, ModuleStore, ModuleUpdate, NewModule};
pub use permission::{NewPermission, PermissionRepository, PermissionStore, PermissionUpdate};
pub use pool::{create_pool, ping};
pub use role::{PermissionSelection, RoleRepository, RoleStore, RoleUpdate};
pub use route::{NewRoute, Route, RouteFilter, RouteRepository, RouteStore, RouteUpdate};
pub use sqlx::sqlite::SqlitePool;
pub use user::{NewUser, RoleAssignment, UserCredentials, UserRepository, UserStore, UserWithRoles};
