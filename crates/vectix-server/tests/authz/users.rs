// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization tests for user routes.

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use super::support::{body_json, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn user_routes_authz_matrix() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let new_user = json!({
		"name": "Created",
		"email": "created@example.com",
		"username": "created",
		"password": "long-enough-pw"
	});

	let cases = [
		AuthzCase {
			name: "anonymous cannot list users",
			method: Method::GET,
			path: "/api/v1/users".to_string(),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "user without roles cannot list users",
			method: Method::GET,
			path: "/api/v1/users".to_string(),
			user: Some(f.nobody.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "manager can list users",
			method: Method::GET,
			path: "/api/v1/users".to_string(),
			user: Some(f.manager.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "superuser can list users without any permission",
			method: Method::GET,
			path: "/api/v1/users".to_string(),
			user: Some(f.admin.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "editor cannot create users",
			method: Method::POST,
			path: "/api/v1/users".to_string(),
			user: Some(f.editor.clone()),
			body: Some(new_user.clone()),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "manager can create users",
			method: Method::POST,
			path: "/api/v1/users".to_string(),
			user: Some(f.manager.clone()),
			body: Some(new_user.clone()),
			expected_status: StatusCode::CREATED,
		},
		AuthzCase {
			name: "duplicate user is a conflict",
			method: Method::POST,
			path: "/api/v1/users".to_string(),
			user: Some(f.manager.clone()),
			body: Some(new_user),
			expected_status: StatusCode::CONFLICT,
		},
		AuthzCase {
			name: "nobody cannot assign roles",
			method: Method::POST,
			path: format!(
				"/api/v1/users/{}/roles/{}",
				f.nobody.id(),
				f.manager_role.role_id
			),
			user: Some(f.nobody.clone()),
			body: Some(json!({})),
			expected_status: StatusCode::FORBIDDEN,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn me_returns_public_projection() {
	let app = TestApp::new().await;
	let editor = &app.fixtures.editor;

	let response = app.get("/api/v1/users/me", Some(editor)).await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["id"], editor.id());
	assert_eq!(body["roles"], json!([{"role_id": app.fixtures.editor_role.role_id.get(), "name": "editor"}]));
	assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn me_rejects_inactive_user() {
	let app = TestApp::new().await;

	let response = app.get("/api/v1/users/me", Some(&app.fixtures.inactive)).await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(body_json(response).await["message"], "Inactive user");
}

#[tokio::test]
async fn permission_gate_does_not_consult_active_flag() {
	let app = TestApp::new().await;

	let response = app.get("/api/v1/users", Some(&app.fixtures.inactive)).await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_flags_every_role_per_user() {
	let app = TestApp::new().await;

	let response = app.get("/api/v1/users", Some(&app.fixtures.manager)).await;
	let body = body_json(response).await;
	let users = body.as_array().unwrap();
	assert_eq!(users.len(), 6);

	let manager = users.iter().find(|u| u["username"] == "manager").unwrap();
	let flags = manager["roles"].as_array().unwrap();
	assert_eq!(flags.len(), 4);
	for role in flags {
		assert_eq!(role["is_assigned"], role["name"] == "manager");
	}
}

#[tokio::test]
async fn get_user_by_id_or_username() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;
	let editor = &app.fixtures.editor;

	let response = app
		.get(&format!("/api/v1/users/{}", editor.id()), Some(manager))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["username"], "editor");

	let response = app.get("/api/v1/users/editor", Some(manager)).await;
	assert_eq!(response.status(), StatusCode::OK);

	let response = app
		.get(&format!("/api/v1/users/{}", Uuid::new_v4()), Some(manager))
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(body_json(response).await["message"], "User not found");
}

#[tokio::test]
async fn role_assignment_is_idempotent() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let path = format!("/api/v1/users/{}/roles/{}", f.nobody.id(), f.editor_role.role_id);

	for _ in 0..2 {
		let response = app.post(&path, Some(&f.manager), json!({})).await;
		assert_eq!(response.status(), StatusCode::OK);
		let body = body_json(response).await;
		assert_eq!(body["roles"], json!([{"role_id": f.editor_role.role_id.get(), "name": "editor"}]));
	}

	for _ in 0..2 {
		let response = app.delete(&path, Some(&f.manager)).await;
		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(body_json(response).await["roles"], json!([]));
	}
}

#[tokio::test]
async fn role_assignment_reports_missing_ends() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.post(
			&format!("/api/v1/users/{}/roles/9999", f.nobody.id()),
			Some(&f.manager),
			json!({}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(body_json(response).await["message"], "User or Role not found");

	let response = app
		.delete(
			&format!("/api/v1/users/{}/roles/{}", Uuid::new_v4(), f.editor_role.role_id),
			Some(&f.manager),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_user_holds_requested_roles() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.post(
			"/api/v1/users",
			Some(&f.manager),
			json!({
				"name": "Staff",
				"email": "staff@example.com",
				"username": "staff",
				"password": "long-enough-pw",
				"role_ids": [f.editor_role.role_id.get()]
			}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let body = body_json(response).await;
	assert_eq!(body["is_active"], true);
	assert_eq!(body["roles"][0]["name"], "editor");

	let response = app
		.post(
			"/api/v1/users",
			Some(&f.manager),
			json!({
				"name": "Ghost",
				"email": "ghost@example.com",
				"username": "ghost",
				"password": "long-enough-pw",
				"role_ids": [9999]
			}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
