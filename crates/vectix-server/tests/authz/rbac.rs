// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role and permission administration tests.

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use super::support::{body_json, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn rbac_routes_authz_matrix() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let cases = [
		AuthzCase {
			name: "anonymous cannot list roles",
			method: Method::GET,
			path: "/api/v1/rbac/roles".to_string(),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "nobody cannot list roles",
			method: Method::GET,
			path: "/api/v1/rbac/roles".to_string(),
			user: Some(f.nobody.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "editor cannot create roles",
			method: Method::POST,
			path: "/api/v1/rbac/roles".to_string(),
			user: Some(f.editor.clone()),
			body: Some(json!({"name": "sneaky"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "manager can create roles",
			method: Method::POST,
			path: "/api/v1/rbac/roles".to_string(),
			user: Some(f.manager.clone()),
			body: Some(json!({"name": "reviewer", "description": "Reviews things"})),
			expected_status: StatusCode::CREATED,
		},
		AuthzCase {
			name: "duplicate role name is a bad request",
			method: Method::POST,
			path: "/api/v1/rbac/roles".to_string(),
			user: Some(f.manager.clone()),
			body: Some(json!({"name": "reviewer"})),
			expected_status: StatusCode::BAD_REQUEST,
		},
		AuthzCase {
			name: "missing role is 404",
			method: Method::GET,
			path: "/api/v1/rbac/roles/9999".to_string(),
			user: Some(f.manager.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "nobody cannot read permissions",
			method: Method::GET,
			path: "/api/v1/rbac/permissions".to_string(),
			user: Some(f.nobody.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "manager can read permissions",
			method: Method::GET,
			path: "/api/v1/rbac/permissions".to_string(),
			user: Some(f.manager.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn role_crud_round() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;

	let response = app
		.post("/api/v1/rbac/roles", Some(manager), json!({"name": "reviewer"}))
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let created = body_json(response).await;
	let id = created["role_id"].as_i64().unwrap();
	assert!(created["description"].is_null());

	let response = app
		.put(
			&format!("/api/v1/rbac/roles/{id}"),
			Some(manager),
			json!({"description": "Reviews things"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let updated = body_json(response).await;
	assert_eq!(updated["name"], "reviewer");
	assert_eq!(updated["description"], "Reviews things");

	let response = app
		.put(
			&format!("/api/v1/rbac/roles/{id}"),
			Some(manager),
			json!({"name": "editor"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		body_json(response).await["message"],
		"Role with this name already exists"
	);

	let response = app
		.delete(&format!("/api/v1/rbac/roles/{id}"), Some(manager))
		.await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);

	let response = app
		.get(&format!("/api/v1/rbac/roles/{id}"), Some(manager))
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(body_json(response).await["message"], "Role not found");
}

#[tokio::test]
async fn list_roles_honours_skip_and_limit() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;

	let response = app.get("/api/v1/rbac/roles?skip=1&limit=2", Some(manager)).await;
	assert_eq!(response.status(), StatusCode::OK);
	let names: Vec<Value> = body_json(response)
		.await
		.as_array()
		.unwrap()
		.iter()
		.map(|r| r["name"].clone())
		.collect();
	assert_eq!(names, vec![json!("manager"), json!("editor")]);
}

async fn create_permission(app: &TestApp, name: &str, expression: Value) -> i64 {
	let response = app
		.post(
			"/api/v1/rbac/permissions",
			Some(&app.fixtures.manager),
			json!({
				"name": name,
				"resource": "document",
				"action": "update",
				"expression": expression
			}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	body_json(response).await["permission_id"].as_i64().unwrap()
}

#[tokio::test]
async fn attach_and_detach_permissions_are_idempotent() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;
	let role_id = app.fixtures.editor_role.role_id.get();
	let permission_id = create_permission(&app, "document:update", Value::Null).await;
	let link = format!("/api/v1/rbac/roles/{role_id}/permissions/{permission_id}");
	let all = format!("/api/v1/rbac/roles/{role_id}/permissions/all");

	let selected = |body: &Value| {
		body.as_array()
			.unwrap()
			.iter()
			.find(|p| p["permission_id"] == permission_id)
			.map(|p| p["selected"].clone())
			.unwrap()
	};

	let body = body_json(app.get(&all, Some(manager)).await).await;
	assert_eq!(selected(&body), json!(false));

	for _ in 0..2 {
		let response = app.post(&link, Some(manager), json!({})).await;
		assert_eq!(response.status(), StatusCode::NO_CONTENT);
	}
	let body = body_json(app.get(&all, Some(manager)).await).await;
	assert_eq!(selected(&body), json!(true));

	for _ in 0..2 {
		let response = app.delete(&link, Some(manager)).await;
		assert_eq!(response.status(), StatusCode::NO_CONTENT);
	}
	let body = body_json(app.get(&all, Some(manager)).await).await;
	assert_eq!(selected(&body), json!(false));
}

#[tokio::test]
async fn links_report_missing_ends() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;
	let role_id = app.fixtures.editor_role.role_id.get();

	let response = app
		.post(
			&format!("/api/v1/rbac/roles/{role_id}/permissions/9999"),
			Some(manager),
			json!({}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(body_json(response).await["message"], "Permission not found");

	let response = app
		.get("/api/v1/rbac/roles/9999/permissions/all", Some(manager))
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn permission_expressions_are_validated_on_write() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;

	for (name, expression) in [
		("unknown-op", json!({"explode": [1]})),
		("bad-arity", json!({"not": [true, false]})),
		("if-arity", json!({"if": [true]})),
	] {
		let response = app
			.post(
				"/api/v1/rbac/permissions",
				Some(manager),
				json!({"name": name, "resource": "document", "action": "read", "expression": expression}),
			)
			.await;
		assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{name}");
	}

	let id = create_permission(
		&app,
		"owner-only",
		json!({"eq": [{"var": "target.owner_id"}, {"var": "actor.id"}]}),
	)
	.await;

	let response = app
		.put(
			&format!("/api/v1/rbac/permissions/{id}"),
			Some(manager),
			json!({"expression": {"bogus": []}}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn permission_update_can_clear_expression() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;
	let id = create_permission(&app, "owner-only", json!({"eq": [1, 1]})).await;
	let path = format!("/api/v1/rbac/permissions/{id}");

	let response = app
		.put(&path, Some(manager), json!({"description": "still conditional"}))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["expression"], json!({"eq": [1, 1]}));

	let response = app.put(&path, Some(manager), json!({"expression": null})).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert!(body_json(response).await["expression"].is_null());
}

#[tokio::test]
async fn permission_crud_and_duplicates() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;
	let id = create_permission(&app, "document:update", Value::Null).await;

	let response = app
		.post(
			"/api/v1/rbac/permissions",
			Some(manager),
			json!({"name": "document:update", "resource": "document", "action": "update"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		body_json(response).await["message"],
		"Permission with this name already exists"
	);

	let path = format!("/api/v1/rbac/permissions/{id}");
	let response = app.get(&path, Some(manager)).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["resource"], "document");

	let response = app.delete(&path, Some(manager)).await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);
	let response = app.get(&path, Some(manager)).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	let response = app.delete(&path, Some(manager)).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
