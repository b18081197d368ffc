// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute conditions evaluated against the request target.
//!
//! The editor fixture holds only conditional grants, so each test here shows
//! one condition letting a request through and the same condition refusing
//! its neighbour.

use axum::http::{Method, StatusCode};
use serde_json::json;
use vectix_server::permission_middleware::MAX_BODY_BYTES;

use super::support::{body_json, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn editor_reads_only_its_own_user() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let cases = [
		AuthzCase {
			name: "editor reads itself",
			method: Method::GET,
			path: format!("/api/v1/users/{}", f.editor.id()),
			user: Some(f.editor.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "editor cannot read the manager",
			method: Method::GET,
			path: format!("/api/v1/users/{}", f.manager.id()),
			user: Some(f.editor.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "editor cannot list users",
			method: Method::GET,
			path: "/api/v1/users".to_string(),
			user: Some(f.editor.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn editor_lists_roles_but_cannot_fetch_one() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app.get("/api/v1/rbac/roles", Some(&f.editor)).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await.as_array().unwrap().len(), 4);

	let response = app
		.get(
			&format!("/api/v1/rbac/roles/{}", f.editor_role.role_id),
			Some(&f.editor),
		)
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(body_json(response).await["message"], "Not enough permissions");
}

#[tokio::test]
async fn editor_creates_only_non_sidebar_routes() {
	let app = TestApp::new().await;
	let editor = &app.fixtures.editor;

	let response = app
		.post(
			"/api/v1/routes",
			Some(editor),
			json!({"path": "/notes", "label": "Notes", "is_sidebar": false}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);

	let response = app
		.post(
			"/api/v1/routes",
			Some(editor),
			json!({"path": "/menu", "label": "Menu", "is_sidebar": true}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let response = app.get("/api/v1/routes", Some(editor)).await;
	let body = body_json(response).await;
	let paths: Vec<&str> = body
		.as_array()
		.unwrap()
		.iter()
		.map(|r| r["path"].as_str().unwrap())
		.collect();
	assert_eq!(paths, vec!["/notes"]);
}

#[tokio::test]
async fn editor_deletes_any_role_but_admin() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.delete(
			&format!("/api/v1/rbac/roles/{}", f.admin_role.role_id),
			Some(&f.editor),
		)
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let response = app
		.delete(
			&format!("/api/v1/rbac/roles/{}", f.manager_role.role_id),
			Some(&f.editor),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);

	let response = app
		.get(
			&format!("/api/v1/rbac/roles/{}", f.admin_role.role_id),
			Some(&f.admin),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn faulty_expression_is_a_server_error_without_details() {
	let app = TestApp::new().await;

	let response = app
		.get("/api/v1/rbac/permissions", Some(&app.fixtures.broken))
		.await;
	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	let body = body_json(response).await;
	assert_eq!(body["message"], "An internal error occurred");
	assert!(!body.to_string().contains("explode"));
}

#[tokio::test]
async fn superuser_bypasses_policies() {
	let app = TestApp::new().await;
	let admin = &app.fixtures.admin;

	let response = app.get("/api/v1/rbac/permissions", Some(admin)).await;
	assert_eq!(response.status(), StatusCode::OK);

	let response = app
		.post(
			"/api/v1/routes",
			Some(admin),
			json!({"path": "/console", "label": "Console", "is_sidebar": true}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn actor_without_roles_is_denied_everywhere() {
	let app = TestApp::new().await;
	let nobody = &app.fixtures.nobody;

	for path in [
		"/api/v1/users",
		"/api/v1/rbac/roles",
		"/api/v1/rbac/permissions",
		"/api/v1/routes",
	] {
		let response = app.get(path, Some(nobody)).await;
		assert_eq!(response.status(), StatusCode::FORBIDDEN, "{path}");
	}

	let response = app
		.post("/api/v1/rbac/roles", Some(nobody), json!({"name": "x"}))
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn granted_permission_applies_to_the_next_request() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app.get("/api/v1/users", Some(&f.editor)).await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let response = app
		.post(
			"/api/v1/rbac/permissions",
			Some(&f.manager),
			json!({"name": "editor:users:read:all", "resource": "users", "action": "read"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let permission_id = body_json(response).await["permission_id"].as_i64().unwrap();

	let response = app
		.post(
			&format!(
				"/api/v1/rbac/roles/{}/permissions/{permission_id}",
				f.editor_role.role_id
			),
			Some(&f.manager),
			json!({}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);

	let response = app.get("/api/v1/users", Some(&f.editor)).await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_json_body_is_rejected_before_evaluation() {
	let app = TestApp::new().await;

	let response = app
		.post_raw(
			"/api/v1/rbac/roles",
			Some(&app.fixtures.manager),
			"text/plain",
			"name=reviewer",
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_body_is_rejected_with_413() {
	let app = TestApp::new().await;

	let response = app
		.post_raw(
			"/api/v1/rbac/roles",
			Some(&app.fixtures.manager),
			"application/json",
			vec![b' '; MAX_BODY_BYTES + 1],
		)
		.await;
	assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
	let body = body_json(response).await;
	assert_eq!(body["error"], "payload_too_large");
}

#[tokio::test]
async fn empty_post_body_is_an_empty_target() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.post_raw(
			&format!(
				"/api/v1/rbac/roles/{}/permissions/1",
				f.editor_role.role_id
			),
			Some(&f.manager),
			"application/json",
			"",
		)
		.await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
