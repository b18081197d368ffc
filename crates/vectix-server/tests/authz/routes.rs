// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Navigation route management and per-caller route lists.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::support::{body_json, TestApp, TestUser};

async fn create_route(app: &TestApp, user: &TestUser, body: Value) -> Value {
	let response = app.post("/api/v1/routes", Some(user), body).await;
	assert_eq!(response.status(), StatusCode::CREATED);
	body_json(response).await
}

fn paths(body: &Value) -> Vec<String> {
	body.as_array()
		.unwrap()
		.iter()
		.map(|r| r["path"].as_str().unwrap().to_string())
		.collect()
}

#[tokio::test]
async fn route_crud_round() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;
	let editor_role = app.fixtures.editor_role.role_id.get();

	let created = create_route(
		&app,
		manager,
		json!({"path": "/reports", "label": "Reports", "role_ids": [editor_role]}),
	)
	.await;
	let id = created["id"].as_i64().unwrap();
	assert_eq!(created["is_active"], true);
	assert_eq!(created["is_sidebar"], false);
	assert_eq!(created["role_ids"], json!([editor_role]));

	let response = app
		.post(
			"/api/v1/routes",
			Some(manager),
			json!({"path": "/reports", "label": "Again"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CONFLICT);
	assert_eq!(
		body_json(response).await["message"],
		"Route with this path already exists"
	);

	let path = format!("/api/v1/routes/{id}");
	let response = app
		.put(&path, Some(manager), json!({"label": "All reports", "role_ids": []}))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let updated = body_json(response).await;
	assert_eq!(updated["label"], "All reports");
	assert_eq!(updated["path"], "/reports");
	assert_eq!(updated["role_ids"], json!([]));

	let response = app.delete(&path, Some(manager)).await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);

	let response = app.get(&path, Some(manager)).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(body_json(response).await["message"], "Route not found");
}

#[tokio::test]
async fn route_with_unknown_role_is_not_found() {
	let app = TestApp::new().await;
	let response = app
		.post(
			"/api/v1/routes",
			Some(&app.fixtures.manager),
			json!({"path": "/ghost", "label": "Ghost", "role_ids": [9999]}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_route_path_is_rejected() {
	let app = TestApp::new().await;
	let response = app
		.post(
			"/api/v1/routes",
			Some(&app.fixtures.manager),
			json!({"path": "  ", "label": "Blank"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn my_routes_follow_caller_roles_and_filters() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let editor_role = f.editor_role.role_id.get();
	let manager_role = f.manager_role.role_id.get();

	create_route(
		&app,
		&f.manager,
		json!({"path": "/drafts", "label": "Drafts", "is_sidebar": true, "role_ids": [editor_role]}),
	)
	.await;
	create_route(
		&app,
		&f.manager,
		json!({"path": "/archive", "label": "Archive", "is_active": false, "role_ids": [editor_role]}),
	)
	.await;
	create_route(
		&app,
		&f.manager,
		json!({"path": "/shared", "label": "Shared", "role_ids": [editor_role, manager_role]}),
	)
	.await;
	create_route(
		&app,
		&f.manager,
		json!({"path": "/admin", "label": "Admin", "is_sidebar": true, "role_ids": [manager_role]}),
	)
	.await;

	let body = body_json(app.get("/api/v1/routes/mine", Some(&f.editor)).await).await;
	assert_eq!(paths(&body), vec!["/drafts", "/archive", "/shared"]);

	let body = body_json(
		app.get("/api/v1/routes/mine?is_active=true", Some(&f.editor))
			.await,
	)
	.await;
	assert_eq!(paths(&body), vec!["/drafts", "/shared"]);

	let body = body_json(
		app.get(
			"/api/v1/routes/mine?is_active=true&is_sidebar=true",
			Some(&f.editor),
		)
		.await,
	)
	.await;
	assert_eq!(paths(&body), vec!["/drafts"]);

	let body = body_json(app.get("/api/v1/routes/mine", Some(&f.manager)).await).await;
	assert_eq!(paths(&body), vec!["/shared", "/admin"]);

	let body = body_json(app.get("/api/v1/routes", Some(&f.editor)).await).await;
	assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn my_routes_require_route_read() {
	let app = TestApp::new().await;

	let response = app.get("/api/v1/routes/mine", None).await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	let response = app
		.get("/api/v1/routes/mine", Some(&app.fixtures.nobody))
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
