// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	body::Body,
	http::{
		header::{HeaderName, HeaderValue, AUTHORIZATION},
		Method, Request, StatusCode,
	},
	response::Response,
	Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use vectix_server::{create_app_state, create_router, AppState};
use vectix_server_auth::{hash_password, Actor, Role};
use vectix_server_config::ServerConfig;
use vectix_server_db::{NewPermission, NewUser};

pub const PASSWORD: &str = "correct-horse-battery";

#[derive(Clone)]
pub struct TestUser {
	pub actor: Actor,
	pub access_token: String,
	pub refresh_token: String,
}

impl TestUser {
	pub fn auth_header(&self) -> (HeaderName, HeaderValue) {
		bearer(&self.access_token)
	}

	pub fn id(&self) -> String {
		self.actor.id.to_string()
	}
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
	(
		AUTHORIZATION,
		HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
	)
}

/// Seeded accounts and roles.
///
/// | user | roles | notes |
/// |------|-------|-------|
/// | admin | admin | superuser, no permissions attached |
/// | manager | manager | every users/roles/permissions/route action, unconditional |
/// | editor | editor | conditional grants, see below |
/// | nobody | none | |
/// | inactive | manager | `is_active = false` |
/// | broken | broken | permissions/read carries an unknown operator |
///
/// editor grants:
/// - users/read only for its own id
/// - roles/read only for listings
/// - roles/delete for any role except admin
/// - route/read unconditional
/// - route/create only for non-sidebar routes
#[derive(Clone)]
pub struct Fixtures {
	pub admin: TestUser,
	pub manager: TestUser,
	pub editor: TestUser,
	pub nobody: TestUser,
	pub inactive: TestUser,
	pub broken: TestUser,
	pub admin_role: Role,
	pub manager_role: Role,
	pub editor_role: Role,
}

pub struct TestApp {
	pub router: Router,
	pub fixtures: Fixtures,
	pub state: AppState,
	_temp_dir: TempDir,
}

impl TestApp {
	pub async fn new() -> Self {
		Self::with_config(ServerConfig::default()).await
	}

	pub async fn with_config(config: ServerConfig) -> Self {
		let temp_dir = tempfile::tempdir().unwrap();
		let db_path = temp_dir.path().join("test_authz.db");
		let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
		let pool = vectix_server_db::create_pool(&db_url).await.unwrap();
		vectix_server_db::run_migrations(&pool).await.unwrap();

		let state = create_app_state(pool, &config);
		let fixtures = create_fixtures(&state).await;
		let router = create_router(state.clone());

		Self {
			router,
			fixtures,
			state,
			_temp_dir: temp_dir,
		}
	}

	pub async fn get(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::GET, path, user, Option::<()>::None)
			.await
	}

	pub async fn post(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::POST, path, user, Some(body)).await
	}

	pub async fn put(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::PUT, path, user, Some(body)).await
	}

	pub async fn delete(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::DELETE, path, user, Option::<()>::None)
			.await
	}

	/// Send a request with an arbitrary bearer token.
	pub async fn get_with_token(&self, path: &str, token: &str) -> Response<Body> {
		let (name, value) = bearer(token);
		let request = Request::builder()
			.method(Method::GET)
			.uri(path)
			.header(name, value)
			.body(Body::empty())
			.unwrap();
		self.router.clone().oneshot(request).await.unwrap()
	}

	/// POST a raw body with the given content type.
	pub async fn post_raw(
		&self,
		path: &str,
		user: Option<&TestUser>,
		content_type: &str,
		body: impl Into<Body>,
	) -> Response<Body> {
		let mut builder = Request::builder()
			.method(Method::POST)
			.uri(path)
			.header("content-type", content_type);
		if let Some(test_user) = user {
			let (name, value) = test_user.auth_header();
			builder = builder.header(name, value);
		}
		let request = builder.body(body.into()).unwrap();
		self.router.clone().oneshot(request).await.unwrap()
	}

	async fn request<T: Serialize>(
		&self,
		method: Method,
		path: &str,
		user: Option<&TestUser>,
		body: Option<T>,
	) -> Response<Body> {
		let mut builder = Request::builder().method(method).uri(path);

		if let Some(test_user) = user {
			let (name, value) = test_user.auth_header();
			builder = builder.header(name, value);
		}

		let request_body = match body {
			Some(b) => {
				builder = builder.header("content-type", "application/json");
				Body::from(serde_json::to_string(&b).unwrap())
			}
			None => Body::empty(),
		};

		let request = builder.body(request_body).unwrap();

		self.router.clone().oneshot(request).await.unwrap()
	}
}

pub async fn body_json(response: Response<Body>) -> Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

pub struct AuthzCase {
	pub name: &'static str,
	pub method: Method,
	pub path: String,
	pub user: Option<TestUser>,
	pub body: Option<Value>,
	pub expected_status: StatusCode,
}

pub async fn run_authz_cases(app: &TestApp, cases: &[AuthzCase]) {
	for case in cases {
		let response = match (&case.method, &case.body) {
			(m, Some(body)) if *m == Method::POST => {
				app.post(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, Some(body)) if *m == Method::PUT => {
				app.put(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, _) if *m == Method::DELETE => app.delete(&case.path, case.user.as_ref()).await,
			_ => app.get(&case.path, case.user.as_ref()).await,
		};

		if response.status() != case.expected_status {
			let (parts, body) = response.into_parts();
			let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
			let body_str = String::from_utf8_lossy(&body_bytes);
			panic!(
				"Case '{}': {} {} - expected {}, got {}\nResponse body: {}",
				case.name, case.method, case.path, case.expected_status, parts.status, body_str
			);
		}
	}
}

async fn grant(
	state: &AppState,
	role: &Role,
	resource: &str,
	action: &str,
	expression: Option<Value>,
) {
	let permission = state
		.permission_repo
		.create_permission(&NewPermission {
			name: format!("{}:{resource}:{action}", role.name),
			description: None,
			resource: resource.to_string(),
			action: action.to_string(),
			expression,
		})
		.await
		.unwrap();
	state
		.role_repo
		.add_permission(role.role_id, permission.permission_id)
		.await
		.unwrap();
}

async fn create_user(
	state: &AppState,
	username: &str,
	hashed_password: &str,
	roles: &[&Role],
	is_active: bool,
	is_superuser: bool,
) -> TestUser {
	let actor = state
		.user_repo
		.create_user(&NewUser {
			name: format!("{username} user"),
			phone_number: None,
			email: format!("{username}@example.com"),
			username: username.to_string(),
			hashed_password: hashed_password.to_string(),
			is_active,
			is_superuser,
			role_ids: roles.iter().map(|r| r.role_id).collect(),
		})
		.await
		.unwrap();
	let pair = state.tokens.issue_pair(username).unwrap();
	TestUser {
		actor,
		access_token: pair.access_token,
		refresh_token: pair.refresh_token,
	}
}

async fn create_fixtures(state: &AppState) -> Fixtures {
	let hashed = hash_password(PASSWORD).unwrap();

	let admin_role = state.role_repo.create_role("admin", Some("Administrator")).await.unwrap();
	let manager_role = state.role_repo.create_role("manager", None).await.unwrap();
	let editor_role = state.role_repo.create_role("editor", None).await.unwrap();
	let broken_role = state.role_repo.create_role("broken", None).await.unwrap();

	for (resource, actions) in [
		("users", &["read", "create", "update"][..]),
		("roles", &["create", "read", "update", "delete"][..]),
		("permissions", &["create", "read", "update", "delete"][..]),
		("route", &["create", "read", "update", "delete"][..]),
		("module", &["create", "read", "update", "delete"][..]),
	] {
		for action in actions {
			grant(state, &manager_role, resource, action, None).await;
		}
	}

	grant(
		state,
		&editor_role,
		"users",
		"read",
		Some(json!({"eq": [{"var": "target.id"}, {"var": "actor.id"}]})),
	)
	.await;
	grant(
		state,
		&editor_role,
		"roles",
		"read",
		Some(json!({"eq": [{"var": "target.response"}, "all"]})),
	)
	.await;
	grant(
		state,
		&editor_role,
		"roles",
		"delete",
		Some(json!({"neq": [{"var": "target.id"}, admin_role.role_id.to_string()]})),
	)
	.await;
	grant(state, &editor_role, "route", "read", None).await;
	grant(
		state,
		&editor_role,
		"route",
		"create",
		Some(json!({"not": [{"var": "target.is_sidebar"}]})),
	)
	.await;

	// Stored without going through the API, which would reject it.
	grant(
		state,
		&broken_role,
		"permissions",
		"read",
		Some(json!({"explode": [1]})),
	)
	.await;

	let admin = create_user(state, "admin", &hashed, &[&admin_role], true, true).await;
	let manager = create_user(state, "manager", &hashed, &[&manager_role], true, false).await;
	let editor = create_user(state, "editor", &hashed, &[&editor_role], true, false).await;
	let nobody = create_user(state, "nobody", &hashed, &[], true, false).await;
	let inactive = create_user(state, "inactive", &hashed, &[&manager_role], false, false).await;
	let broken = create_user(state, "broken", &hashed, &[&broken_role], true, false).await;

	Fixtures {
		admin,
		manager,
		editor,
		nobody,
		inactive,
		broken,
		admin_role,
		manager_role,
		editor_role,
	}
}
